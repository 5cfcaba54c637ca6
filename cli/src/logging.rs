//! Logger configuration for the `cli` binary. `backend` never configures a
//! logger itself (see its crate docs); only the binary boundary does,
//! following `ttpgen`'s `logging.rs`.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use chrono::Local;
use env_logger::Builder;
use log::LevelFilter;

/// Initializes the global logger. When `log_file` is given, log lines are
/// written to both stdout and the file; otherwise stdout only. No-op when
/// `enable` is false (useful for tests that don't want log noise).
pub fn init_logger(log_file: Option<PathBuf>, enable: bool) {
    if !enable {
        return;
    }

    let mut builder = Builder::new();
    builder.filter_level(LevelFilter::Info);

    let file = log_file.map(|path| {
        let handle = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .unwrap_or_else(|e| panic!("opening log file {}: {e}", path.display()));
        std::sync::Mutex::new(handle)
    });

    builder.format(move |buf, record| {
        let timestamp = Local::now().format("%H:%M:%S");
        let line = format!("[{timestamp} {}] {}", record.level(), record.args());
        if let Some(file) = &file {
            if let Ok(mut f) = file.lock() {
                let _ = writeln!(f, "{line}");
            }
        }
        writeln!(buf, "{line}")
    });

    let _ = builder.try_init();
}
