//! `batball-replay <script.json>`
//!
//! Replays a match script and prints the report as JSON on stdout.
//!
//! Logging goes to stderr. `RUST_LOG` sets the filter (default `info`);
//! `BATBALL_LOG_JSON=1` switches to JSON log lines.

use std::process::ExitCode;

use batball_replay::{ReplayError, Script, replay};
use batball_types::BatballError;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("BATBALL_LOG_JSON").is_ok_and(|v| v == "1");

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init();
    }
}

fn run(path: &str) -> Result<String, ReplayError> {
    let raw = std::fs::read_to_string(path).map_err(BatballError::from)?;
    let script: Script = serde_json::from_str(&raw).map_err(BatballError::from)?;
    tracing::info!(
        path,
        match_id = %script.settings.match_id,
        steps = script.steps.len(),
        "Replaying script"
    );
    let report = replay(&script)?;
    serde_json::to_string_pretty(&report).map_err(|e| BatballError::from(e).into())
}

fn main() -> ExitCode {
    init_tracing();

    let Some(path) = std::env::args().nth(1) else {
        eprintln!("usage: batball-replay <script.json>");
        return ExitCode::from(2);
    };

    match run(&path) {
        Ok(report) => {
            println!("{report}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Replay failed");
            ExitCode::FAILURE
        }
    }
}
