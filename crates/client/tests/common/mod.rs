//! Shared mock driver and backend for the controller test suites.
#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::rc::Rc;

use framelock_core::PresentFlags;
use framelock_driver::{
    DriverResult, DriverStatus, FrameLockDriver, GpuHandle, SwapGroupBinding, SwapGroupCaps,
};
use framelock_hal::PresentBackend;

/// Stand-in for the host's device handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Device;

/// Stand-in for the host's swap-chain handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapChain;

/// Shared scripting and observation state for the mock driver and
/// backend. Tests keep a handle to it after both are moved into the
/// controller.
#[derive(Default)]
pub struct Cluster {
    /// Interleaved call log of driver and backend operations.
    pub log: RefCell<Vec<String>>,
    /// Driver calls that should be rejected.
    pub fail: RefCell<HashSet<&'static str>>,
    /// Membership as the driver sees it.
    pub binding: Cell<SwapGroupBinding>,
    /// Vendor frame counter.
    pub frame_count: Cell<u32>,
    /// Number of upcoming presents to reject.
    pub present_failures: Cell<u32>,
}

impl Cluster {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn fail_call(&self, name: &'static str) {
        self.fail.borrow_mut().insert(name);
    }

    pub fn heal_call(&self, name: &'static str) {
        self.fail.borrow_mut().remove(name);
    }

    pub fn log_entries(&self) -> Vec<String> {
        self.log.borrow().clone()
    }

    pub fn take_log(&self) -> Vec<String> {
        std::mem::take(&mut self.log.borrow_mut())
    }

    pub fn count_in_log(&self, entry: &str) -> usize {
        self.log.borrow().iter().filter(|e| *e == entry).count()
    }

    fn record(&self, entry: impl Into<String>) {
        self.log.borrow_mut().push(entry.into());
    }

    fn check(&self, name: &'static str) -> DriverResult<()> {
        if self.fail.borrow().contains(name) {
            DriverStatus::Error.into_result(name)
        } else {
            Ok(())
        }
    }
}

/// Scripted frame-lock driver recording every call.
pub struct MockDriver {
    pub cluster: Rc<Cluster>,
    pub caps: SwapGroupCaps,
    pub gpu_count: u32,
}

impl MockDriver {
    pub fn new(cluster: &Rc<Cluster>, max_groups: u32, max_barriers: u32) -> Self {
        Self {
            cluster: Rc::clone(cluster),
            caps: SwapGroupCaps {
                max_groups,
                max_barriers,
            },
            gpu_count: 1,
        }
    }
}

impl FrameLockDriver for MockDriver {
    type Device = Device;
    type SwapChain = SwapChain;

    fn initialize(&mut self) -> DriverResult<()> {
        self.cluster.record("initialize");
        self.cluster.check("initialize")
    }

    fn enumerate_gpus(&mut self) -> DriverResult<Vec<GpuHandle>> {
        self.cluster.record("enumerate_gpus");
        self.cluster.check("enumerate_gpus")?;
        Ok((0..self.gpu_count).map(GpuHandle).collect())
    }

    fn enable_workstation_feature(&mut self, gpu: GpuHandle, enable: bool) -> DriverResult<()> {
        self.cluster
            .record(format!("workstation({}, {enable})", gpu.0));
        self.cluster.check("enable_workstation_feature")
    }

    fn query_max_swap_group(&mut self, _: &Device) -> DriverResult<SwapGroupCaps> {
        self.cluster.record("query_max_swap_group");
        self.cluster.check("query_max_swap_group")?;
        Ok(self.caps)
    }

    fn join_swap_group(
        &mut self,
        _: &Device,
        _: &SwapChain,
        group: u32,
        bind: bool,
    ) -> DriverResult<()> {
        self.cluster.record(format!("join({group}, {bind})"));
        self.cluster.check("join_swap_group")?;
        let mut binding = self.cluster.binding.get();
        binding.group = group;
        if group == 0 {
            // Leaving the group dissolves the barrier binding too.
            binding.barrier = 0;
        }
        self.cluster.binding.set(binding);
        Ok(())
    }

    fn bind_swap_barrier(&mut self, _: &Device, group: u32, barrier: u32) -> DriverResult<()> {
        self.cluster.record(format!("bind({group}, {barrier})"));
        self.cluster.check("bind_swap_barrier")?;
        let mut binding = self.cluster.binding.get();
        binding.barrier = barrier;
        self.cluster.binding.set(binding);
        Ok(())
    }

    fn query_swap_group(&mut self, _: &Device, _: &SwapChain) -> DriverResult<SwapGroupBinding> {
        self.cluster.record("query_swap_group");
        self.cluster.check("query_swap_group")?;
        Ok(self.cluster.binding.get())
    }

    fn query_frame_count(&mut self, _: &Device) -> DriverResult<u32> {
        self.cluster.record("query_frame_count");
        self.cluster.check("query_frame_count")?;
        Ok(self.cluster.frame_count.get())
    }

    fn reset_frame_count(&mut self, _: &Device) -> DriverResult<()> {
        self.cluster.record("reset_frame_count");
        self.cluster.check("reset_frame_count")?;
        self.cluster.frame_count.set(0);
        Ok(())
    }

    fn present(
        &mut self,
        _: &Device,
        _: &SwapChain,
        _: u32,
        _: PresentFlags,
    ) -> DriverResult<()> {
        self.cluster.record("present");
        let failures = self.cluster.present_failures.get();
        if failures > 0 {
            self.cluster.present_failures.set(failures - 1);
            return DriverStatus::Error.into_result("present");
        }
        Ok(())
    }
}

/// Backend that records warm-up operations into the shared log.
pub struct MockBackend {
    pub cluster: Rc<Cluster>,
}

impl MockBackend {
    pub fn new(cluster: &Rc<Cluster>) -> Self {
        Self {
            cluster: Rc::clone(cluster),
        }
    }
}

impl PresentBackend for MockBackend {
    type Device = Device;
    type SwapChain = SwapChain;

    fn device(&self) -> Device {
        Device
    }

    fn swap_chain(&self) -> SwapChain {
        SwapChain
    }

    fn sync_interval(&self) -> u32 {
        1
    }

    fn present_flags(&self) -> PresentFlags {
        PresentFlags::empty()
    }

    fn initiate_repeats(&mut self) {
        self.cluster.record("initiate_repeats");
    }

    fn prepare_single_repeat(&mut self) {
        self.cluster.record("prepare_single_repeat");
    }

    fn conclude_repeats(&mut self) {
        self.cluster.record("conclude_repeats");
    }
}
