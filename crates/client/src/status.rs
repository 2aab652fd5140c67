//! Status surface polled by the host.
//!
//! The render thread owns all mutation; any other thread may pull a
//! [`StatusSnapshot`] through a [`StatusSurface`]. Loads and stores are
//! relaxed: the snapshot is telemetry, and consistency between fields
//! is explicitly not guaranteed.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;

/// Initialization outcome exposed to the host.
///
/// The numeric values are part of the host contract and must not
/// change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum InitializationState {
    /// Synchronization has not been initialized yet.
    NotInitialized = 0,
    /// Synchronization is initialized and should be usable.
    Initialized = 1,
    /// The host never handed over its graphics bindings.
    HostInterfacesMissing = 2,
    /// The host runs a graphics API neither adapter covers.
    UnsupportedGraphicsApi = 3,
    /// The device handle could not be retrieved.
    MissingDevice = 4,
    /// The swap-chain handle could not be retrieved.
    MissingSwapChain = 5,
    /// A generic failure while setting up the group or barrier.
    GenericFailure = 6,
    /// No swap-group support was detected. Is the hardware present?
    NoSwapGroupDetected = 7,
    /// Querying swap-group information failed.
    QuerySwapGroupFailed = 8,
    /// Joining the swap group failed.
    FailedToJoinSwapGroup = 9,
    /// The requested group id does not fit the available swap groups.
    SwapGroupMismatch = 10,
    /// Binding the swap barrier failed.
    FailedToBindSwapBarrier = 11,
    /// The requested barrier id does not fit the available barriers.
    SwapBarrierIdMismatch = 12,
}

impl InitializationState {
    /// Integer value the host consumes.
    #[inline]
    pub fn code(self) -> u32 {
        self as u32
    }
}

/// Outcome of the controller's boot protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitStatus {
    /// Joined and bound as requested.
    Success,
    /// The driver never became usable.
    Failed,
    /// The driver reports no swap-group support at all.
    NoSwapGroupDetected,
    /// A swap-group query was rejected.
    QuerySwapGroupFailed,
    /// The join call was rejected.
    FailedToJoinSwapGroup,
    /// A group was requested but none is available.
    SwapGroupMismatch,
    /// The bind call was rejected.
    FailedToBindSwapBarrier,
    /// A barrier was requested but none is available.
    SwapBarrierIdMismatch,
}

impl InitStatus {
    /// Whether the boot protocol completed.
    #[inline]
    pub fn is_success(self) -> bool {
        self == InitStatus::Success
    }

    /// The host-facing state this outcome maps to.
    pub fn initialization_state(self) -> InitializationState {
        match self {
            InitStatus::Success => InitializationState::Initialized,
            InitStatus::Failed => InitializationState::GenericFailure,
            InitStatus::NoSwapGroupDetected => InitializationState::NoSwapGroupDetected,
            InitStatus::QuerySwapGroupFailed => InitializationState::QuerySwapGroupFailed,
            InitStatus::FailedToJoinSwapGroup => InitializationState::FailedToJoinSwapGroup,
            InitStatus::SwapGroupMismatch => InitializationState::SwapGroupMismatch,
            InitStatus::FailedToBindSwapBarrier => InitializationState::FailedToBindSwapBarrier,
            InitStatus::SwapBarrierIdMismatch => InitializationState::SwapBarrierIdMismatch,
        }
    }
}

/// One coherent-enough view of the synchronization state.
///
/// Each field is an individual relaxed load; the struct as a whole is
/// telemetry, not a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusSnapshot {
    /// Value of the current [`InitializationState`].
    pub initialization_state: u32,
    /// Swap group this node is in (0 = none).
    pub swap_group_id: u32,
    /// Barrier the group is bound to (0 = none).
    pub swap_barrier_id: u32,
    /// Presents the driver accepted since the last dispose.
    pub presented_frames_success: u64,
    /// Presents the driver rejected since the last dispose.
    pub presented_frames_failed: u64,
}

/// Shared atomics behind the status surface.
#[derive(Debug, Default)]
pub(crate) struct SharedStatus {
    pub(crate) initialization_state: AtomicU32,
    pub(crate) group_id: AtomicU32,
    pub(crate) barrier_id: AtomicU32,
    pub(crate) present_ok: AtomicU64,
    pub(crate) present_fail: AtomicU64,
}

/// Cloneable read handle over the shared status.
///
/// Safe to poll from any thread while the render thread mutates.
#[derive(Debug, Clone)]
pub struct StatusSurface {
    shared: Arc<SharedStatus>,
}

impl StatusSurface {
    pub(crate) fn new(shared: Arc<SharedStatus>) -> Self {
        Self { shared }
    }

    /// Fetches a fresh snapshot; nothing is cached between calls.
    pub fn snapshot(&self) -> StatusSnapshot {
        StatusSnapshot {
            initialization_state: self.shared.initialization_state.load(Ordering::Relaxed),
            swap_group_id: self.shared.group_id.load(Ordering::Relaxed),
            swap_barrier_id: self.shared.barrier_id.load(Ordering::Relaxed),
            presented_frames_success: self.shared.present_ok.load(Ordering::Relaxed),
            presented_frames_failed: self.shared.present_fail.load(Ordering::Relaxed),
        }
    }
}
