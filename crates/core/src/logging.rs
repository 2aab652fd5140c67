//! Logging initialization and the host log relay.
//!
//! Internal diagnostics go through `tracing`. Messages the embedding
//! host must see additionally travel through a process-wide relay that
//! holds a single optional callback. When no callback is installed, the
//! [`relay_error!`](crate::relay_error), [`relay_warn!`](crate::relay_warn)
//! and [`relay_info!`](crate::relay_info) macros skip message
//! construction entirely.
//!
//! # Example
//! ```
//! use framelock_core::{relay_active, set_log_callback, LogLevel};
//!
//! fn sink(level: LogLevel, message: &str) {
//!     eprintln!("[{}] {message}", level.code());
//! }
//!
//! assert!(!relay_active());
//! set_log_callback(Some(sink));
//! assert!(relay_active());
//! set_log_callback(None);
//! ```

use parking_lot::RwLock;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Severity of a relayed message.
///
/// The numeric values are part of the host contract and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum LogLevel {
    /// Used for errors.
    Error = 0,
    /// Used for assertion failures.
    Assert = 1,
    /// Used for warnings.
    Warning = 2,
    /// Used for regular messages.
    Log = 3,
    /// Used for exceptional failures.
    Exception = 4,
}

impl LogLevel {
    /// Integer value the host consumes.
    #[inline]
    pub fn code(self) -> i32 {
        self as i32
    }
}

/// Callback the host installs to receive relayed messages.
///
/// A plain function pointer: replacement is a single slot write and the
/// callback is expected to stay valid for the life of the process.
pub type LogCallback = fn(LogLevel, &str);

static RELAY: RwLock<Option<LogCallback>> = RwLock::new(None);

/// Installs or replaces the host log callback.
///
/// Passing `None` detaches the relay; relayed messages are then dropped
/// before they are even formatted.
pub fn set_log_callback(callback: Option<LogCallback>) {
    *RELAY.write() = callback;
}

/// Returns whether anyone is listening to relayed messages.
///
/// The `relay_*!` macros consult this before building a message, so
/// formatting cost is only paid when a callback is installed.
#[inline]
pub fn relay_active() -> bool {
    RELAY.read().is_some()
}

/// Delivers a message to the host callback, when one is installed.
///
/// Prefer the `relay_*!` macros, which guard message construction.
pub fn relay_message(level: LogLevel, message: &str) {
    if let Some(callback) = *RELAY.read() {
        callback(level, message);
    }
}

/// Relays an error to the host and mirrors it to `tracing`.
#[macro_export]
macro_rules! relay_error {
    ($($arg:tt)*) => {{
        $crate::tracing::error!($($arg)*);
        if $crate::relay_active() {
            $crate::relay_message($crate::LogLevel::Error, &format!($($arg)*));
        }
    }};
}

/// Relays a warning to the host and mirrors it to `tracing`.
#[macro_export]
macro_rules! relay_warn {
    ($($arg:tt)*) => {{
        $crate::tracing::warn!($($arg)*);
        if $crate::relay_active() {
            $crate::relay_message($crate::LogLevel::Warning, &format!($($arg)*));
        }
    }};
}

/// Relays a regular message to the host and mirrors it to `tracing`.
#[macro_export]
macro_rules! relay_info {
    ($($arg:tt)*) => {{
        $crate::tracing::info!($($arg)*);
        if $crate::relay_active() {
            $crate::relay_message($crate::LogLevel::Log, &format!($($arg)*));
        }
    }};
}

/// Initialize the logging system with tracing.
///
/// This sets up tracing-subscriber with:
/// - Environment-based filtering (RUST_LOG)
/// - Pretty printing for development
///
/// Hosts that already install a global subscriber should skip this and
/// rely on the relay alone.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,framelock=debug"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .init();
}
