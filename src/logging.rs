use std::fs::OpenOptions;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::settings::config_dir;

/// Log to `~/.config/bips/bips.log`; the terminal belongs to the TUI. Level
/// comes from `BIPS_LOG` (default `info`). If the file cannot be opened no
/// subscriber is installed and events are dropped.
pub fn init_logging() {
    let dir = config_dir();
    if std::fs::create_dir_all(&dir).is_err() {
        return;
    }
    let Ok(log_file) = OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("bips.log"))
    else {
        return;
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("BIPS_LOG").unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_ansi(false)
        .with_writer(Arc::new(log_file))
        .try_init();
}
