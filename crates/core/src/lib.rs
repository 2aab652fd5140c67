//! Core utilities for the frame-lock presentation sidecar.
//!
//! This crate provides the foundational pieces used across the workspace:
//! - The host log relay and the tracing bootstrap
//! - Present-flag definitions shared by the driver facade and the
//!   graphics-device adapters

mod flags;
mod logging;

pub use flags::PresentFlags;
pub use logging::{
    init_logging, relay_active, relay_message, set_log_callback, LogCallback, LogLevel,
};

// The relay macros expand in downstream crates; they reach tracing
// through this re-export so callers need no direct dependency.
#[doc(hidden)]
pub use tracing;
