//! Swap-group / swap-barrier controller and host command surface.
//!
//! This crate drives cluster-synchronized presentation on top of the
//! driver facade and the graphics-device adapters:
//!
//! - [`SwapGroupClient`] owns the join/leave and bind/unbind state
//!   machine, the frame counters, and the warm-up present protocol.
//! - [`SyncContext`] is what an embedding host talks to: integer render
//!   events in, presentation override and a [`StatusSnapshot`] out.
//! - [`StatusSurface`] is the lock-free read path any host thread may
//!   poll while the render thread owns all mutation.
//!
//! # Present flow
//!
//! ```text
//! host render event ──▶ SyncContext::dispatch ──▶ SwapGroupClient
//!                                                   │
//!                                 warm-up? ─────────┤
//!                              ┌────────────────────┘
//!                              ▼
//!                    PresentBackend (save / repeat / conclude)
//!                              │
//!                              ▼
//!                    FrameLockDriver::present  (barrier stall)
//! ```

pub mod client;
pub mod context;
pub mod events;
pub mod oracle;
pub mod status;

pub use client::SwapGroupClient;
pub use context::{BackendBinding, SyncContext};
pub use events::{EventData, RenderEvent};
pub use oracle::{default_oracle, WarmupAction, WarmupOracle};
pub use status::{InitStatus, InitializationState, StatusSnapshot, StatusSurface};
