//! Embedding surface consumed by the host.
//!
//! A [`SyncContext`] pairs the controller with the graphics-device
//! adapter built over the host's renderer, checks context validity the
//! way hosts expect (device present, swap chain present, recognised
//! renderer), and translates integer render events into controller
//! calls.

use tracing::debug;

use framelock_core::relay_error;
use framelock_driver::FrameLockDriver;
use framelock_hal::PresentBackend;

use crate::client::SwapGroupClient;
use crate::events::{EventData, RenderEvent};
use crate::oracle::WarmupOracle;
use crate::status::{InitializationState, StatusSnapshot, StatusSurface};

/// Outcome of the host handing over its graphics layer.
///
/// Anything but [`Bound`](Self::Bound) records why presentation cannot
/// be taken over; the host then keeps its own present path and the
/// status surface reports the reason.
pub enum BackendBinding<B> {
    /// The host renderer is supported and fully wired.
    Bound(B),
    /// The host never provided its interface table.
    InterfacesMissing,
    /// The host runs a renderer neither adapter covers.
    UnsupportedApi,
    /// The device handle was missing.
    DeviceMissing,
    /// The swap-chain handle was missing.
    SwapChainMissing,
}

/// What an embedding host talks to.
///
/// Lives on the render thread; the only thing other threads may touch
/// is the [`StatusSurface`].
pub struct SyncContext<D, B>
where
    D: FrameLockDriver,
    B: PresentBackend<Device = D::Device, SwapChain = D::SwapChain>,
{
    client: SwapGroupClient<D>,
    backend: Option<B>,
}

impl<D, B> SyncContext<D, B>
where
    D: FrameLockDriver,
    B: PresentBackend<Device = D::Device, SwapChain = D::SwapChain>,
{
    /// Creates an unbound context; the host binds its graphics layer
    /// once the renderer is up.
    pub fn new(client: SwapGroupClient<D>) -> Self {
        Self {
            client,
            backend: None,
        }
    }

    /// Read handle for host-side polling from any thread.
    pub fn status_surface(&self) -> StatusSurface {
        self.client.status_surface()
    }

    /// Fetches the current state; nothing is cached between calls.
    pub fn state(&self) -> StatusSnapshot {
        self.client.status_surface().snapshot()
    }

    /// Accepts (or records the failure of) the host's graphics layer.
    pub fn bind_graphics(&mut self, binding: BackendBinding<B>) {
        match binding {
            BackendBinding::Bound(backend) => {
                self.backend = Some(backend);
                self.client
                    .set_initialization_state(InitializationState::NotInitialized);
            }
            BackendBinding::InterfacesMissing => {
                relay_error!("host interface table was not provided");
                self.fail_binding(InitializationState::HostInterfacesMissing);
            }
            BackendBinding::UnsupportedApi => {
                relay_error!("host renderer is not supported");
                self.fail_binding(InitializationState::UnsupportedGraphicsApi);
            }
            BackendBinding::DeviceMissing => {
                relay_error!("host device handle is missing");
                self.fail_binding(InitializationState::MissingDevice);
            }
            BackendBinding::SwapChainMissing => {
                relay_error!("host swap-chain handle is missing");
                self.fail_binding(InitializationState::MissingSwapChain);
            }
        }
    }

    fn fail_binding(&mut self, state: InitializationState) {
        self.backend = None;
        self.client.set_initialization_state(state);
    }

    /// Validity check every host command runs first: a recognised
    /// renderer with both handles present.
    pub fn is_context_valid(&self) -> bool {
        self.backend.is_some()
    }

    /// Whether the core wants to own frame presentation.
    ///
    /// `false` on any unhealthy state, which makes the host fall back
    /// to its own presentation path.
    pub fn wants_present_override(&self) -> bool {
        self.is_context_valid()
    }

    /// Presents this frame through the synchronized path.
    ///
    /// Returns `false` when the context is invalid, when the present
    /// was skipped, or when the driver rejected it; the host must then
    /// present on its own.
    pub fn present_frame(&mut self) -> bool {
        let Some(backend) = self.backend.as_mut() else {
            return false;
        };
        self.client.render(backend)
    }

    /// Installs the warm-up oracle; `None` restores the default.
    pub fn set_warmup_oracle(&mut self, oracle: Option<WarmupOracle>) {
        self.client.set_warmup_oracle(oracle);
    }

    /// Skips the synchronized present path for exactly one frame.
    pub fn skip_synchronized_present_of_next_frame(&mut self) {
        self.client.skip_synchronized_present_of_next_frame();
    }

    /// Handles one host render event.
    pub fn dispatch(&mut self, event: RenderEvent, data: EventData<'_>) {
        match event {
            RenderEvent::Initialize => self.initialize(),
            RenderEvent::QueryFrameCount => self.query_frame_count(data),
            RenderEvent::ResetFrameCount => self.reset_frame_count(),
            RenderEvent::Dispose => self.dispose(),
            RenderEvent::EnableSystem => {
                let enable = data.as_toggle();
                self.with_handles(|client, device, swap_chain| {
                    client.enable_system(&device, &swap_chain, enable);
                });
            }
            RenderEvent::EnableSwapGroup => {
                let enable = data.as_toggle();
                self.with_handles(|client, device, swap_chain| {
                    client.enable_swap_group(&device, &swap_chain, enable);
                });
            }
            RenderEvent::EnableSwapBarrier => {
                let enable = data.as_toggle();
                self.with_handles(|client, device, _| {
                    client.enable_swap_barrier(&device, enable);
                });
            }
            RenderEvent::EnableSyncCounter => {
                if self.is_context_valid() {
                    self.client.enable_sync_counter(data.as_toggle());
                }
            }
        }
    }

    /// Runs `operation` with the bound handles, or quietly drops the
    /// command when the context is invalid.
    fn with_handles(
        &mut self,
        operation: impl FnOnce(&mut SwapGroupClient<D>, D::Device, D::SwapChain),
    ) {
        let Some(backend) = self.backend.as_ref() else {
            debug!("host command dropped, graphics context not valid");
            return;
        };
        let device = backend.device();
        let swap_chain = backend.swap_chain();
        operation(&mut self.client, device, swap_chain);
    }

    fn initialize(&mut self) {
        if self.backend.is_none() {
            relay_error!("initialize requested without a bound graphics backend");
            if self.state().initialization_state == InitializationState::NotInitialized.code() {
                self.client
                    .set_initialization_state(InitializationState::HostInterfacesMissing);
            }
            return;
        }
        self.client.setup_workstation();
        self.with_handles(|client, device, swap_chain| {
            client.initialize(&device, &swap_chain);
        });
    }

    fn query_frame_count(&mut self, data: EventData<'_>) {
        let EventData::FrameCountOut(out) = data else {
            debug!("frame-count query without an out-slot");
            return;
        };
        let Some(backend) = self.backend.as_ref() else {
            debug!("host command dropped, graphics context not valid");
            return;
        };
        let device = backend.device();
        *out = self.client.query_frame_count(&device) as i32;
    }

    fn reset_frame_count(&mut self) {
        self.with_handles(|client, device, _| {
            client.reset_frame_count(&device);
        });
    }

    fn dispose(&mut self) {
        self.with_handles(|client, device, swap_chain| {
            client.dispose(&device, &swap_chain);
        });
        if self.is_context_valid() {
            self.client.dispose_workstation();
        }
    }
}
