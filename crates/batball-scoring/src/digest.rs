//! History digest.
//!
//! A SHA-256 root over the ordered delivery history. Persisted snapshots
//! carry it so a partially written or hand-edited history is detected on
//! rehydration; completed match records carry it for archival.

use batball_types::{Delivery, PlayerId};
use sha2::{Digest, Sha256};

/// Compute the history root.
///
/// Depends on delivery ids, innings, over, kind, wicket, runs, and the
/// players involved, in order. Timestamps and crease snapshots are left out.
#[must_use]
pub fn compute_history_root(history: &[Delivery]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(b"batball:history_root:v1:");
    hasher.update((history.len() as u64).to_le_bytes());

    for d in history {
        hasher.update(d.id.0.as_bytes());
        hasher.update([d.innings.number()]);
        hasher.update(d.over_index.to_le_bytes());
        hasher.update(d.kind.to_string().as_bytes());
        hasher.update(d.wicket.to_string().as_bytes());
        hasher.update(d.runs_off_bat.to_le_bytes());
        update_player(&mut hasher, Some(&d.striker_id));
        update_player(&mut hasher, Some(&d.bowler_id));
        update_player(&mut hasher, d.dismissed_id.as_ref());
    }

    let result = hasher.finalize();
    let mut root = [0u8; 32];
    root.copy_from_slice(&result);
    root
}

// Length-prefixed so adjacent ids cannot run together.
fn update_player(hasher: &mut Sha256, player: Option<&PlayerId>) {
    let bytes = player.map_or(&b""[..], |p| p.as_str().as_bytes());
    hasher.update((bytes.len() as u64).to_le_bytes());
    hasher.update(bytes);
}

/// Hex-encoded history root, as stored in snapshots and records.
#[must_use]
pub fn history_root_hex(history: &[Delivery]) -> String {
    hex::encode(compute_history_root(history))
}

/// Recompute the root and compare with a stored hex value.
#[must_use]
pub fn verify_history_root(history: &[Delivery], expected_hex: &str) -> bool {
    history_root_hex(history).eq_ignore_ascii_case(expected_hex)
}

#[cfg(test)]
mod tests {
    use batball_types::{DeliveryKind, WicketKind};

    use super::*;

    fn sample() -> Vec<Delivery> {
        vec![
            Delivery::dummy(4, DeliveryKind::Legal, WicketKind::None),
            Delivery::dummy(0, DeliveryKind::Wide, WicketKind::None),
            Delivery::dummy(0, DeliveryKind::Legal, WicketKind::Bowled),
        ]
    }

    #[test]
    fn empty_history_is_deterministic() {
        assert_eq!(compute_history_root(&[]), compute_history_root(&[]));
    }

    #[test]
    fn order_matters() {
        let h = sample();
        let mut reversed = h.clone();
        reversed.reverse();
        assert_ne!(compute_history_root(&h), compute_history_root(&reversed));
    }

    #[test]
    fn folded_run_out_victim_changes_root() {
        let d = Delivery::dummy(1, DeliveryKind::Legal, WicketKind::RunOut);
        let folded = d.clone().with_dismissed(PlayerId::new("partner"));
        assert_ne!(compute_history_root(&[d]), compute_history_root(&[folded]));
    }

    #[test]
    fn survives_json_round_trip() {
        let h = sample();
        let root = history_root_hex(&h);
        let json = serde_json::to_string(&h).unwrap();
        let back: Vec<Delivery> = serde_json::from_str(&json).unwrap();
        assert!(verify_history_root(&back, &root));
    }

    #[test]
    fn truncated_history_fails_verification() {
        let h = sample();
        let root = history_root_hex(&h);
        assert!(!verify_history_root(&h[..2], &root));
    }
}
