//! Swap-group / swap-barrier controller.
//!
//! [`SwapGroupClient`] owns the node-local synchronization state: group
//! and barrier membership, the frame counter, present statistics, and
//! the warm-up flag. It turns host requests into the strict driver call
//! sequences the vendor expects, and drives a graphics-device adapter
//! through barrier warm-up.
//!
//! Membership is tracked twice: the *requested* ids (what the boot
//! protocol asks the driver for) and the *published* ids (what the
//! driver last confirmed, visible through the [`StatusSurface`]).
//! Disposing clears the published state but not the request, so a
//! later re-initialization joins the same group again.
//!
//! Everything here runs on the host's render thread; the only
//! cross-thread path is the [`StatusSurface`] served by relaxed
//! atomics.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use tracing::{debug, info};

use framelock_core::{relay_error, relay_info};
use framelock_driver::{FrameLockDriver, SwapGroupCaps};
use framelock_hal::PresentBackend;

use crate::oracle::{default_oracle, WarmupAction, WarmupOracle};
use crate::status::{InitStatus, InitializationState, SharedStatus, StatusSurface};

/// The one swap group this node ever joins.
const ACTIVE_GROUP_ID: u32 = 1;
/// The one barrier that group is ever bound to.
const ACTIVE_BARRIER_ID: u32 = 1;

/// Controller for one node's swap-group and swap-barrier membership.
///
/// Construction does not touch the driver; [`prepare`](Self::prepare)
/// (called implicitly by every driver-facing operation) initializes the
/// vendor library once. If that fails, every subsequent operation is a
/// logged no-op and the status surface reports a failed initialization.
pub struct SwapGroupClient<D: FrameLockDriver> {
    driver: D,
    shared: Arc<SharedStatus>,
    /// Group id the boot protocol requests (0 = stay out).
    desired_group: u32,
    /// Barrier id the boot protocol requests (0 = stay unbound).
    desired_barrier: u32,
    /// Driver capabilities cached by `initialize`.
    caps: SwapGroupCaps,
    /// Local frame counter used when the vendor counter is unavailable.
    frame_count: u32,
    /// Whether this node resets the cluster frame counter.
    is_master: bool,
    /// Whether `query_frame_count` consults the vendor counter.
    sync_counter_enabled: bool,
    /// Aggregate "system on" flag.
    active: bool,
    /// Armed by a successful barrier bind; cleared once the oracle
    /// reports the barrier engaged.
    need_warmup: bool,
    /// One-shot bypass of the synchronized present path.
    skip_next_synced_present: bool,
    /// Consulted between warm-up presents.
    warmup_oracle: WarmupOracle,
    /// Outcome of the one-time vendor library initialization.
    prepared: Option<bool>,
}

impl<D: FrameLockDriver> SwapGroupClient<D> {
    /// Creates a controller with the cluster defaults: group and
    /// barrier 1 requested, master node, local frame counter.
    pub fn new(driver: D) -> Self {
        let shared = Arc::new(SharedStatus::default());
        shared.group_id.store(ACTIVE_GROUP_ID, Ordering::Relaxed);
        shared
            .barrier_id
            .store(ACTIVE_BARRIER_ID, Ordering::Relaxed);

        Self {
            driver,
            shared,
            desired_group: ACTIVE_GROUP_ID,
            desired_barrier: ACTIVE_BARRIER_ID,
            caps: SwapGroupCaps::default(),
            frame_count: 0,
            is_master: true,
            sync_counter_enabled: false,
            active: false,
            need_warmup: false,
            skip_next_synced_present: false,
            warmup_oracle: default_oracle,
            prepared: None,
        }
    }

    /// Read handle for host-side polling from any thread.
    pub fn status_surface(&self) -> StatusSurface {
        StatusSurface::new(Arc::clone(&self.shared))
    }

    /// Whether the system is switched on.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Whether the next synchronized present will run the warm-up loop.
    pub fn needs_warmup(&self) -> bool {
        self.need_warmup
    }

    fn group_id(&self) -> u32 {
        self.shared.group_id.load(Ordering::Relaxed)
    }

    fn set_group_id(&self, group: u32) {
        self.shared.group_id.store(group, Ordering::Relaxed);
    }

    fn barrier_id(&self) -> u32 {
        self.shared.barrier_id.load(Ordering::Relaxed)
    }

    fn set_barrier_id(&self, barrier: u32) {
        self.shared.barrier_id.store(barrier, Ordering::Relaxed);
    }

    pub(crate) fn set_initialization_state(&self, state: InitializationState) {
        self.shared
            .initialization_state
            .store(state.code(), Ordering::Relaxed);
    }

    /// Initializes the vendor library once; idempotent.
    ///
    /// Returns whether the driver is usable. On failure the status
    /// surface reports a generic failure and every driver-facing
    /// operation no-ops from here on.
    pub fn prepare(&mut self) -> bool {
        if let Some(ready) = self.prepared {
            return ready;
        }
        let ready = match self.driver.initialize() {
            Ok(()) => {
                info!("frame-lock driver initialized");
                true
            }
            Err(error) => {
                relay_error!("frame-lock driver initialization failed: {error}");
                false
            }
        };
        self.prepared = Some(ready);
        if !ready {
            self.set_initialization_state(InitializationState::GenericFailure);
        }
        ready
    }

    /// Requests workstation swap-group resources on every GPU.
    ///
    /// Per-GPU failures are logged and skipped; the cluster may still
    /// function on the remaining GPUs.
    pub fn setup_workstation(&mut self) {
        self.toggle_workstation(true);
    }

    /// Releases the workstation swap-group resources again.
    pub fn dispose_workstation(&mut self) {
        self.toggle_workstation(false);
    }

    fn toggle_workstation(&mut self, enable: bool) {
        if !self.prepare() {
            return;
        }
        let gpus = match self.driver.enumerate_gpus() {
            Ok(gpus) => gpus,
            Err(error) => {
                relay_error!("GPU enumeration failed: {error}");
                return;
            }
        };
        for gpu in gpus {
            match self.driver.enable_workstation_feature(gpu, enable) {
                Ok(()) => relay_info!(
                    "workstation swap-group feature {} on {gpu:?}",
                    if enable { "enabled" } else { "disabled" }
                ),
                Err(error) => {
                    relay_error!("workstation swap-group feature setup failed on {gpu:?}: {error}")
                }
            }
        }
    }

    /// Runs the boot protocol: query capabilities, join the requested
    /// group, bind the requested barrier, and read back the
    /// driver-confirmed membership.
    ///
    /// On any non-success outcome the published ids are reset to 0 and
    /// warm-up is disarmed.
    pub fn initialize(&mut self, device: &D::Device, swap_chain: &D::SwapChain) -> InitStatus {
        let status = if self.prepare() {
            self.run_boot_protocol(device, swap_chain)
        } else {
            InitStatus::Failed
        };

        if !status.is_success() {
            self.set_group_id(0);
            self.set_barrier_id(0);
            self.need_warmup = false;
        }
        self.set_initialization_state(status.initialization_state());
        status
    }

    fn run_boot_protocol(&mut self, device: &D::Device, swap_chain: &D::SwapChain) -> InitStatus {
        // A fresh boot decides warm-up from scratch.
        self.need_warmup = false;

        self.caps = match self.driver.query_max_swap_group(device) {
            Ok(caps) => caps,
            Err(error) => {
                relay_error!("swap-group capability query failed: {error}");
                return InitStatus::QuerySwapGroupFailed;
            }
        };
        debug!(
            max_groups = self.caps.max_groups,
            max_barriers = self.caps.max_barriers,
            "swap-group capabilities"
        );

        if self.caps.max_groups == 0 {
            if self.desired_group > 0 {
                relay_error!(
                    "driver reports no swap groups but group {} was requested",
                    self.desired_group
                );
                self.desired_group = 0;
                return InitStatus::SwapGroupMismatch;
            }
            relay_error!("no swap-group support detected");
            return InitStatus::NoSwapGroupDetected;
        }

        let group = self.desired_group;
        if group <= self.caps.max_groups {
            if let Err(error) = self
                .driver
                .join_swap_group(device, swap_chain, group, group > 0)
            {
                relay_error!("failed to join swap group {group}: {error}");
                return InitStatus::FailedToJoinSwapGroup;
            }
            relay_info!("joined swap group {group} of {}", self.caps.max_groups);
        }

        if self.caps.max_barriers > 0 {
            // Opportunistic probe; barrier support usually means the
            // vendor frame counter works too. The query is heavy, so
            // its verdict decides the counter mode once.
            self.sync_counter_enabled = self.driver.query_frame_count(device).is_ok();

            if self.is_master && self.sync_counter_enabled {
                if let Err(error) = self.driver.reset_frame_count(device) {
                    relay_error!("cluster frame-counter reset failed: {error}");
                }
            }

            let barrier = self.desired_barrier;
            if barrier <= self.caps.max_barriers && group <= self.caps.max_groups {
                if let Err(error) = self.driver.bind_swap_barrier(device, group, barrier) {
                    relay_error!("failed to bind barrier {barrier} to group {group}: {error}");
                    return InitStatus::FailedToBindSwapBarrier;
                }
                relay_info!("bound swap barrier {barrier} of {}", self.caps.max_barriers);
                if barrier > 0 {
                    // The barrier takes a few presents to engage.
                    self.need_warmup = true;
                }
            }
        } else if self.desired_barrier > 0 {
            relay_error!(
                "driver reports no barriers but barrier {} was requested",
                self.desired_barrier
            );
            self.desired_barrier = 0;
            return InitStatus::SwapBarrierIdMismatch;
        }

        let binding = match self.driver.query_swap_group(device, swap_chain) {
            Ok(binding) => binding,
            Err(error) => {
                relay_error!("swap-group membership query failed: {error}");
                return InitStatus::QuerySwapGroupFailed;
            }
        };
        self.set_group_id(binding.group);
        self.set_barrier_id(binding.barrier);
        debug!(
            group = binding.group,
            barrier = binding.barrier,
            "driver-confirmed membership"
        );

        InitStatus::Success
    }

    /// Unbinds the barrier, leaves the group, and zeroes the present
    /// counters. The requested ids survive, so a later
    /// [`initialize`](Self::initialize) joins the same group again.
    pub fn dispose(&mut self, device: &D::Device, swap_chain: &D::SwapChain) {
        if self.prepare() {
            if self.barrier_id() > 0 {
                match self.driver.bind_swap_barrier(device, self.group_id(), 0) {
                    Ok(()) => self.set_barrier_id(0),
                    Err(error) => relay_error!("barrier unbind failed during dispose: {error}"),
                }
            }
            if self.group_id() > 0 {
                match self.driver.join_swap_group(device, swap_chain, 0, false) {
                    Ok(()) => self.set_group_id(0),
                    Err(error) => relay_error!("swap-group leave failed during dispose: {error}"),
                }
            }
        }

        self.active = false;
        self.need_warmup = false;
        self.shared.present_ok.store(0, Ordering::Relaxed);
        self.shared.present_fail.store(0, Ordering::Relaxed);
    }

    /// Joins or leaves both systems in the order the driver requires:
    /// group first, then barrier. Must not be reversed.
    pub fn enable_system(&mut self, device: &D::Device, swap_chain: &D::SwapChain, enable: bool) {
        self.active = enable;
        self.enable_swap_group(device, swap_chain, enable);
        self.enable_swap_barrier(device, enable);
    }

    /// Joins the active swap group, or leaves it.
    ///
    /// Leaving dissolves the barrier binding along with the membership,
    /// so the published barrier id is zeroed on a successful leave.
    pub fn enable_swap_group(
        &mut self,
        device: &D::Device,
        swap_chain: &D::SwapChain,
        enable: bool,
    ) {
        if !self.prepare() {
            return;
        }
        let new_group = if enable { ACTIVE_GROUP_ID } else { 0 };
        relay_info!("enable swap group: {enable}, new group id {new_group}");

        if new_group == self.group_id() || new_group > self.caps.max_groups {
            debug!("swap group already in the requested state");
            return;
        }
        match self
            .driver
            .join_swap_group(device, swap_chain, new_group, new_group > 0)
        {
            Ok(()) => {
                self.desired_group = new_group;
                self.set_group_id(new_group);
                if new_group == 0 {
                    self.set_barrier_id(0);
                }
            }
            Err(error) => relay_error!("failed to join swap group {new_group}: {error}"),
        }
    }

    /// Binds the group to the active barrier, or unbinds it.
    ///
    /// Only meaningful while this node is in the active swap group. A
    /// successful bind arms warm-up for the next synchronized present.
    pub fn enable_swap_barrier(&mut self, device: &D::Device, enable: bool) {
        if !self.prepare() {
            return;
        }
        if self.group_id() != ACTIVE_GROUP_ID {
            debug!("swap barrier toggle ignored, not in the active swap group");
            return;
        }
        let new_barrier = if enable { ACTIVE_BARRIER_ID } else { 0 };
        relay_info!("enable swap barrier: {enable}, new barrier id {new_barrier}");

        if new_barrier == self.barrier_id() || new_barrier > self.caps.max_barriers {
            debug!("swap barrier already in the requested state");
            return;
        }
        match self
            .driver
            .bind_swap_barrier(device, self.group_id(), new_barrier)
        {
            Ok(()) => {
                self.desired_barrier = new_barrier;
                self.set_barrier_id(new_barrier);
                if new_barrier > 0 {
                    self.need_warmup = true;
                }
            }
            Err(error) => relay_error!("failed to bind barrier {new_barrier}: {error}"),
        }
    }

    /// Chooses between the vendor frame counter and the local one.
    pub fn enable_sync_counter(&mut self, enable: bool) {
        self.sync_counter_enabled = enable;
    }

    /// Marks this node as the one that resets the cluster counter.
    pub fn set_master(&mut self, master: bool) {
        self.is_master = master;
    }

    /// Reads the frame count.
    ///
    /// In vendor mode the cluster counter is fetched and cached; in
    /// local mode every read hands out the next number.
    pub fn query_frame_count(&mut self, device: &D::Device) -> u32 {
        if self.sync_counter_enabled {
            if self.prepare() {
                match self.driver.query_frame_count(device) {
                    Ok(count) => self.frame_count = count,
                    Err(error) => relay_error!("cluster frame-count query failed: {error}"),
                }
            }
        } else {
            self.frame_count = self.frame_count.wrapping_add(1);
        }
        self.frame_count
    }

    /// Resets the frame count: the cluster counter on the master node,
    /// the local counter elsewhere.
    pub fn reset_frame_count(&mut self, device: &D::Device) {
        if self.is_master {
            if !self.prepare() {
                return;
            }
            if let Err(error) = self.driver.reset_frame_count(device) {
                relay_error!("cluster frame-counter reset failed: {error}");
            }
        } else {
            self.frame_count = 0;
        }
    }

    /// Skips the synchronized present path for exactly one frame.
    ///
    /// The next [`render`](Self::render) returns `false` immediately,
    /// telling the host to present on its own; the frame after behaves
    /// normally again.
    pub fn skip_synchronized_present_of_next_frame(&mut self) {
        self.skip_next_synced_present = true;
    }

    /// Installs the warm-up oracle; `None` restores the default, which
    /// imposes no warm-up.
    pub fn set_warmup_oracle(&mut self, oracle: Option<WarmupOracle>) {
        self.warmup_oracle = oracle.unwrap_or(default_oracle);
    }

    /// The synchronized present path.
    ///
    /// Returns whether this call presented the frame; on `false` the
    /// host must fall back to its own presentation. While warm-up is
    /// armed, the oracle decides between immediate repeats of the saved
    /// frame, handing the frame back, and declaring the barrier
    /// engaged.
    pub fn render<B>(&mut self, backend: &mut B) -> bool
    where
        B: PresentBackend<Device = D::Device, SwapChain = D::SwapChain>,
    {
        if self.skip_next_synced_present {
            self.skip_next_synced_present = false;
            debug!("skipping the synchronized present for this frame");
            return false;
        }
        if !self.prepare() {
            return false;
        }

        let device = backend.device();
        let swap_chain = backend.swap_chain();
        let sync_interval = backend.sync_interval();
        let flags = backend.present_flags();

        if self.need_warmup {
            backend.initiate_repeats();
        }

        loop {
            if let Err(error) = self
                .driver
                .present(&device, &swap_chain, sync_interval, flags)
            {
                self.shared.present_fail.fetch_add(1, Ordering::Relaxed);
                relay_error!("synchronized present failed: {error}");
                return false;
            }
            self.shared.present_ok.fetch_add(1, Ordering::Relaxed);

            if self.need_warmup {
                match (self.warmup_oracle)() {
                    WarmupAction::RepeatPresent => {
                        backend.prepare_single_repeat();
                        continue;
                    }
                    WarmupAction::BarrierWarmedUp => {
                        backend.conclude_repeats();
                        self.need_warmup = false;
                        info!("swap barrier warmed up");
                    }
                    WarmupAction::ContinueToNextFrame => {}
                }
            }
            break;
        }

        true
    }
}
