//! Graphics-device adapters for barrier warm-up.
//!
//! While a freshly bound swap barrier engages, the visible image must
//! not change or every node in the cluster would flash intermediate
//! content. The adapters in this crate freeze the image by saving the
//! current back buffer and copying it forward before every repeated
//! present. Two backends cover the two kinds of native graphics APIs:
//!
//! - [`ImmediateDevice`] for internally synchronized APIs: repeats are
//!   plain copies through the immediate context, no fences involved.
//! - [`ExplicitDevice`] for command-recording APIs: repeats are recorded
//!   command lists paced by a monotonic GPU fence and an OS event.
//!
//! The native API itself is reached through the seam traits in [`api`];
//! the host implements them over whatever library owns its device. The
//! controller drives either backend through [`PresentBackend`].

pub mod api;
pub mod backend;
pub mod explicit;
pub mod immediate;

pub use api::{ExplicitApi, GraphicsApi, ImmediateApi, ResourceState};
pub use backend::{GraphicsBackend, PresentBackend};
pub use explicit::ExplicitDevice;
pub use immediate::ImmediateDevice;
