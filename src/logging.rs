use std::fs::OpenOptions;
use std::path::Path;

use log::LevelFilter;
use simplelog::{ConfigBuilder, WriteLogger};

use crate::engine::RunReport;

pub const LOG_FILE: &str = "transmute.log";

/// Install a file logger writing to `dir/transmute.log`.
/// Best-effort: failures are silently ignored (logging must never block a run).
pub fn init(level: LevelFilter, dir: &Path) {
    if level == LevelFilter::Off {
        return;
    }
    let _ = std::fs::create_dir_all(dir);
    let Ok(file) = OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join(LOG_FILE))
    else {
        return;
    };
    let config = ConfigBuilder::new()
        .set_thread_level(LevelFilter::Off)
        .set_target_level(LevelFilter::Off)
        .set_time_format_rfc3339()
        .build();
    let _ = WriteLogger::init(level, config, file);
}

/// One line per run: expression, then region counts and the first failure.
pub fn log_run(expression: &str, report: &RunReport) {
    let expr_oneline: String = expression.replace('\n', " ").chars().take(200).collect();
    match report.aborted.first() {
        None => log::info!("run\t{expr_oneline}\tapplied={}", report.applied),
        Some(first) => log::info!(
            "run\t{expr_oneline}\tapplied={}\taborted={}\tregion {}: {}",
            report.applied,
            report.aborted.len(),
            first.index,
            first.error
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_off_creates_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("logs");
        init(LevelFilter::Off, &target);
        assert!(!target.exists());
    }

    #[test]
    fn init_creates_log_file() {
        let dir = tempfile::tempdir().unwrap();
        init(LevelFilter::Warn, dir.path());
        assert!(dir.path().join(LOG_FILE).exists());
    }

    #[test]
    fn log_run_without_logger_is_harmless() {
        log_run("rev\n| dupl", &RunReport::default());
    }
}
