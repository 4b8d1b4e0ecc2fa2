//! Test logging utilities.
//!
//! [`init_test_logging`] installs a global `tracing` subscriber writing
//! through the test harness, filtered by `RUST_LOG`. [`capture_logs`]
//! collects the events emitted by a closure so tests can assert on them.

use std::fmt;
use std::sync::{Arc, Mutex, Once, PoisonError};

use tracing::field::{Field, Visit};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::{Context, Layer, SubscriberExt as _};
use tracing_subscriber::util::SubscriberInitExt as _;

static INIT: Once = Once::new();

/// Initialize logging for tests (call once)
///
/// Uses `RUST_LOG` when set and `warn` otherwise.
///
/// # Examples
///
/// ```
/// use fabrica_test::logging::init_test_logging;
///
/// // In your test:
/// init_test_logging();
/// // Your test code
/// ```
pub fn init_test_logging() {
	INIT.call_once(|| {
		let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
		let _ = tracing_subscriber::fmt()
			.with_env_filter(filter)
			.with_test_writer()
			.try_init();
	});
}

/// Runs `f` with a thread-local subscriber and returns the events it
/// emitted, formatted as `[LEVEL] message key=value ...`.
///
/// ```
/// use fabrica_test::logging::capture_logs;
///
/// let (_, logs) = capture_logs(|| tracing::warn!(factory = "a_person", "rejected"));
/// assert_eq!(logs, ["[WARN] rejected factory=a_person"]);
/// ```
pub fn capture_logs<R>(f: impl FnOnce() -> R) -> (R, Vec<String>) {
	let logs = Arc::new(Mutex::new(Vec::new()));
	let capture = LogCapture { logs: logs.clone() };

	let result = {
		let _guard = tracing_subscriber::registry().with(capture).set_default();
		f()
	};

	let logs = logs.lock().unwrap_or_else(PoisonError::into_inner).clone();
	(result, logs)
}

/// A tracing layer that captures events into a shared vector.
struct LogCapture {
	logs: Arc<Mutex<Vec<String>>>,
}

impl<S: tracing::Subscriber> Layer<S> for LogCapture {
	fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
		let mut visitor = EventVisitor::default();
		event.record(&mut visitor);

		let mut line = format!("[{}] {}", event.metadata().level(), visitor.message);
		for (name, value) in visitor.fields {
			line.push_str(&format!(" {}={}", name, value));
		}

		self.logs
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.push(line);
	}
}

#[derive(Default)]
struct EventVisitor {
	message: String,
	fields: Vec<(&'static str, String)>,
}

impl Visit for EventVisitor {
	fn record_str(&mut self, field: &Field, value: &str) {
		if field.name() == "message" {
			self.message = value.to_string();
		} else {
			self.fields.push((field.name(), value.to_string()));
		}
	}

	fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
		if field.name() == "message" {
			self.message = format!("{:?}", value);
		} else {
			self.fields.push((field.name(), format!("{:?}", value)));
		}
	}
}
