//! Logging setup.
//!
//! Every event goes through `tracing` under the `fuellog` target and is
//! written to stderr; stdout belongs to the chat transcript. Registry
//! changes and appended trips log at `info`, step transitions at `debug`,
//! abandoned flows and rejected answers at `warn`, and storage failures at
//! `error`.

use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Target prefix of every event the crate emits.
pub const LOG_TARGET: &str = "fuellog";

/// Verbosity level for logging output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Errors only.
    Quiet,
    /// Registry changes and recorded trips.
    #[default]
    Normal,
    /// Also every answer and step of a flow.
    Verbose,
    /// Everything the crate emits.
    Trace,
}

impl Verbosity {
    /// Convert verbosity to a tracing level.
    #[must_use]
    pub fn to_level_filter(&self) -> Level {
        match self {
            Self::Quiet => Level::ERROR,
            Self::Normal => Level::INFO,
            Self::Verbose => Level::DEBUG,
            Self::Trace => Level::TRACE,
        }
    }

    /// Filter directive used when `RUST_LOG` is not set.
    #[must_use]
    pub fn directive(&self) -> String {
        format!(
            "{LOG_TARGET}={}",
            self.to_level_filter().to_string().to_lowercase()
        )
    }
}

/// Install the stderr subscriber.
///
/// `RUST_LOG` takes precedence over `verbosity`. Later calls are no-ops.
///
/// # Examples
///
/// ```no_run
/// use fuellog::{init_logging, logging::Verbosity};
///
/// init_logging(Verbosity::Verbose);
/// ```
pub fn init_logging(verbosity: Verbosity) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.directive()));

    let subscriber = tracing_subscriber::registry().with(env_filter).with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false),
    );

    let _ = subscriber.try_init();
}

/// Initialize logging for tests.
#[cfg(test)]
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("warn")
        .with_test_writer()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    use crate::registry::{Norms, VehicleRegistry};
    use crate::session::{Flow, SessionId, Sessions};
    use crate::storage::MemoryStore;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn capture(verbosity: Verbosity, body: impl FnOnce()) -> String {
        let out = Captured::default();
        let writer = out.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(verbosity.directive())
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        tracing::subscriber::with_default(subscriber, body);
        let bytes = out.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_directive_per_verbosity() {
        assert_eq!(Verbosity::Quiet.directive(), "fuellog=error");
        assert_eq!(Verbosity::Normal.directive(), "fuellog=info");
        assert_eq!(Verbosity::Verbose.directive(), "fuellog=debug");
        assert_eq!(Verbosity::Trace.directive(), "fuellog=trace");
    }

    #[test]
    fn test_verbosity_default() {
        assert_eq!(Verbosity::default(), Verbosity::Normal);
    }

    #[test]
    fn test_registration_logged_at_normal() {
        let logs = capture(Verbosity::Normal, || {
            let store = MemoryStore::new();
            VehicleRegistry::new(&store)
                .register("X001", Norms::parse("8.5", "6.2", "7.1", "1.0").unwrap())
                .unwrap();
        });
        assert!(logs.contains("Registered vehicle X001"), "{logs}");
    }

    #[test]
    fn test_quiet_hides_abandoned_flow() {
        let abandon = || {
            let mut sessions = Sessions::default();
            let id = SessionId::new("s1");
            let _ = sessions.begin(&id, Flow::RegisterVehicle);
            let _ = sessions.begin(&id, Flow::RegisterVehicle);
        };

        assert!(capture(Verbosity::Normal, abandon).contains("abandoned"));
        assert!(capture(Verbosity::Quiet, abandon).is_empty());
    }

    #[test]
    fn test_init_logging_twice() {
        init_logging(Verbosity::Quiet);
        init_logging(Verbosity::Trace);
        init_test_logging();
    }
}
