//! Frame-lock driver facade.
//!
//! The vendor frame-lock facility is reached exclusively through the
//! [`FrameLockDriver`] trait: a thin, deterministic interface over the
//! small set of named vendor calls the controller needs. Every call
//! returns a [`DriverResult`]; failures carry the vendor status code and
//! its human-readable message so callers can log both.
//!
//! Graphics handles are borrowed from the host for the duration of each
//! call and are never stored by implementations of this trait.

mod status;

pub use status::{DriverError, DriverResult, DriverStatus, StatusKind};

use framelock_core::PresentFlags;

/// Opaque identifier of a physical GPU enumerated by the vendor driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GpuHandle(pub u32);

/// Driver-reported swap-group capabilities, cached after initialization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SwapGroupCaps {
    /// Highest joinable swap-group id; 0 means no swap-group support.
    pub max_groups: u32,
    /// Highest bindable barrier id; 0 means no barrier support.
    pub max_barriers: u32,
}

/// Swap-group membership as confirmed by the driver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SwapGroupBinding {
    /// Swap group the swap chain currently belongs to (0 = none).
    pub group: u32,
    /// Barrier the group is currently bound to (0 = none).
    pub barrier: u32,
}

/// Interface to the vendor frame-lock facility.
///
/// Implementations wrap the real vendor library; tests substitute
/// scripted mocks. All calls execute on the render thread.
pub trait FrameLockDriver {
    /// Native device handle the vendor calls take (host-owned, cheap to
    /// clone).
    type Device: Clone;
    /// Native swap-chain handle the vendor calls take (host-owned,
    /// cheap to clone).
    type SwapChain: Clone;

    /// Prepares the vendor library for use in this process.
    fn initialize(&mut self) -> DriverResult<()>;

    /// Lists the physical GPUs the vendor library can see.
    fn enumerate_gpus(&mut self) -> DriverResult<Vec<GpuHandle>>;

    /// Toggles the workstation swap-group feature on one GPU.
    fn enable_workstation_feature(&mut self, gpu: GpuHandle, enable: bool) -> DriverResult<()>;

    /// Queries how many swap groups and barriers the device supports.
    fn query_max_swap_group(&mut self, device: &Self::Device) -> DriverResult<SwapGroupCaps>;

    /// Joins a swap group, or leaves the current one when `group` is 0.
    ///
    /// `bind` tells the driver whether the swap chain should take part
    /// in synchronized presents right away.
    fn join_swap_group(
        &mut self,
        device: &Self::Device,
        swap_chain: &Self::SwapChain,
        group: u32,
        bind: bool,
    ) -> DriverResult<()>;

    /// Binds the group to a barrier, or unbinds it when `barrier` is 0.
    fn bind_swap_barrier(
        &mut self,
        device: &Self::Device,
        group: u32,
        barrier: u32,
    ) -> DriverResult<()>;

    /// Reads back the driver-confirmed group and barrier membership.
    fn query_swap_group(
        &mut self,
        device: &Self::Device,
        swap_chain: &Self::SwapChain,
    ) -> DriverResult<SwapGroupBinding>;

    /// Reads the cluster-wide frame counter. Heavy; callers cache it.
    fn query_frame_count(&mut self, device: &Self::Device) -> DriverResult<u32>;

    /// Resets the cluster-wide frame counter.
    fn reset_frame_count(&mut self, device: &Self::Device) -> DriverResult<()>;

    /// Presents through the vendor's synchronized path.
    ///
    /// Blocks until the swap barrier releases when one is bound; that
    /// stall is the synchronization feature itself.
    fn present(
        &mut self,
        device: &Self::Device,
        swap_chain: &Self::SwapChain,
        sync_interval: u32,
        flags: PresentFlags,
    ) -> DriverResult<()>;
}
