//! Severity-tagged diagnostic channel consumed by every component.
//!
//! The engine itself never prints directly; it calls `log::debug!` /
//! `log::info!` / `log::error!` at the three severities the format
//! requires. `debug!` is compiled out of release builds by the `log`
//! crate's release max-level cutoff; `info!` goes to stdout and
//! `warn!`/`error!` go to stderr. A single mutex serializes both streams
//! so a line from one rayon worker never interleaves with a line from
//! another.

use std::io::Write;
use std::sync::Mutex;

use log::{Level, LevelFilter, Log, Metadata, Record};

struct SplitLogger {
    lock: Mutex<()>,
}

impl Log for SplitLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= Level::Info
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        if record.level() <= Level::Warn {
            let _ = writeln!(std::io::stderr(), "{}", record.args());
        } else {
            let _ = writeln!(std::io::stdout(), "{}", record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stdout().flush();
        let _ = std::io::stderr().flush();
    }
}

/// Installs the process-wide logger. Idempotent: a second call is a no-op.
pub fn init() {
    static LOGGER: SplitLogger = SplitLogger {
        lock: Mutex::new(()),
    };
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(LevelFilter::Debug);
    }
}
