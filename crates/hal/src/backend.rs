//! The capability surface the controller drives.

use framelock_core::PresentFlags;

use crate::api::{ExplicitApi, ImmediateApi};
use crate::explicit::ExplicitDevice;
use crate::immediate::ImmediateDevice;

/// Capability set every graphics-device adapter provides.
///
/// The handle accessors expose what the controller forwards to the
/// frame-lock driver; the three repeat operations implement barrier
/// warm-up. Errors inside the repeat operations never escape: adapters
/// log them, roll back what they created, and degrade to no-ops so the
/// host can keep rendering, merely without synchronization.
pub trait PresentBackend {
    /// Borrowed device handle type, matching the driver facade's.
    type Device: Clone;
    /// Borrowed swap-chain handle type, matching the driver facade's.
    type SwapChain: Clone;

    /// Device handle for driver calls.
    fn device(&self) -> Self::Device;

    /// Swap-chain handle for driver calls.
    fn swap_chain(&self) -> Self::SwapChain;

    /// Sync interval the host presents with.
    fn sync_interval(&self) -> u32;

    /// Present flags the host presents with.
    fn present_flags(&self) -> PresentFlags;

    /// Saves the current back buffer so repeats can restore it.
    fn initiate_repeats(&mut self);

    /// Copies the saved frame into the current back buffer, so the next
    /// present shows the frozen image again.
    fn prepare_single_repeat(&mut self);

    /// Ends the repeat sequence and releases its transient resources.
    fn conclude_repeats(&mut self);
}

/// The two concrete adapters as one sealed dispatch point.
///
/// Dispatch happens once per present, so an enum match costs the same
/// as a vtable and keeps the set of backends closed.
pub enum GraphicsBackend<I, E>
where
    I: ImmediateApi,
    E: ExplicitApi<Device = I::Device, SwapChain = I::SwapChain>,
{
    /// Internally synchronized backend.
    Immediate(ImmediateDevice<I>),
    /// Command-recording backend with explicit fences.
    Explicit(ExplicitDevice<E>),
}

impl<I, E> PresentBackend for GraphicsBackend<I, E>
where
    I: ImmediateApi,
    E: ExplicitApi<Device = I::Device, SwapChain = I::SwapChain>,
{
    type Device = I::Device;
    type SwapChain = I::SwapChain;

    fn device(&self) -> Self::Device {
        match self {
            GraphicsBackend::Immediate(device) => device.device(),
            GraphicsBackend::Explicit(device) => device.device(),
        }
    }

    fn swap_chain(&self) -> Self::SwapChain {
        match self {
            GraphicsBackend::Immediate(device) => device.swap_chain(),
            GraphicsBackend::Explicit(device) => device.swap_chain(),
        }
    }

    fn sync_interval(&self) -> u32 {
        match self {
            GraphicsBackend::Immediate(device) => device.sync_interval(),
            GraphicsBackend::Explicit(device) => device.sync_interval(),
        }
    }

    fn present_flags(&self) -> PresentFlags {
        match self {
            GraphicsBackend::Immediate(device) => device.present_flags(),
            GraphicsBackend::Explicit(device) => device.present_flags(),
        }
    }

    fn initiate_repeats(&mut self) {
        match self {
            GraphicsBackend::Immediate(device) => device.initiate_repeats(),
            GraphicsBackend::Explicit(device) => device.initiate_repeats(),
        }
    }

    fn prepare_single_repeat(&mut self) {
        match self {
            GraphicsBackend::Immediate(device) => device.prepare_single_repeat(),
            GraphicsBackend::Explicit(device) => device.prepare_single_repeat(),
        }
    }

    fn conclude_repeats(&mut self) {
        match self {
            GraphicsBackend::Immediate(device) => device.conclude_repeats(),
            GraphicsBackend::Explicit(device) => device.conclude_repeats(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{GraphicsApi, ResourceState};

    use std::cell::{Cell, RefCell};
    use std::fmt;
    use std::rc::Rc;

    #[derive(Debug)]
    struct MockError;

    impl fmt::Display for MockError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("mock failure")
        }
    }

    impl std::error::Error for MockError {}

    /// One api implementing both seams, so the enum can hold either
    /// adapter flavour over the same handle types.
    #[derive(Default)]
    struct DualState {
        log: RefCell<Vec<&'static str>>,
        completed: Cell<u64>,
        signaled: Cell<u64>,
    }

    struct DualApi {
        state: Rc<DualState>,
    }

    impl GraphicsApi for DualApi {
        type Device = ();
        type SwapChain = ();
        type Texture = u32;
        type Error = MockError;
    }

    impl ImmediateApi for DualApi {
        fn back_buffer(&self, _: &()) -> Result<u32, MockError> {
            self.state.log.borrow_mut().push("immediate.back_buffer");
            Ok(0)
        }

        fn create_texture_like(&self, _: &(), template: &u32) -> Result<u32, MockError> {
            Ok(template + 100)
        }

        fn bind_render_target(&self, _: &u32) {}

        fn copy_texture(&self, _: &u32, _: &u32) {
            self.state.log.borrow_mut().push("immediate.copy");
        }
    }

    impl ExplicitApi for DualApi {
        type CommandQueue = ();
        type CommandAllocator = u8;
        type CommandList = u8;
        type Fence = u8;
        type Event = u8;

        fn buffer_count(&self, _: &()) -> Result<u32, MockError> {
            Ok(2)
        }

        fn current_back_buffer_index(&self, _: &()) -> Result<u32, MockError> {
            Ok(0)
        }

        fn back_buffer(&self, _: &(), index: u32) -> Result<u32, MockError> {
            Ok(index)
        }

        fn create_command_allocator(&self, _: &()) -> Result<u8, MockError> {
            Ok(0)
        }

        fn create_command_list(&self, _: &(), _: &u8, _: &str) -> Result<u8, MockError> {
            Ok(0)
        }

        fn create_texture_like(&self, _: &(), template: &u32) -> Result<u32, MockError> {
            Ok(template + 100)
        }

        fn create_fence(&self, _: &(), initial_value: u64) -> Result<u8, MockError> {
            self.state.completed.set(initial_value);
            self.state.signaled.set(initial_value);
            Ok(0)
        }

        fn create_event(&self) -> Result<u8, MockError> {
            Ok(0)
        }

        fn reset_allocator(&self, _: &mut u8) -> Result<(), MockError> {
            Ok(())
        }

        fn reset_list(&self, _: &mut u8, _: &u8) -> Result<(), MockError> {
            Ok(())
        }

        fn record_copy(&self, _: &mut u8, _: &u32, _: &u32) {
            self.state.log.borrow_mut().push("explicit.copy");
        }

        fn record_transition(&self, _: &mut u8, _: &u32, _: ResourceState, _: ResourceState) {}

        fn close_list(&self, _: &mut u8) -> Result<(), MockError> {
            Ok(())
        }

        fn execute(&self, _: &(), _: &u8) {
            self.state.log.borrow_mut().push("explicit.execute");
        }

        fn signal(&self, _: &(), _: &u8, value: u64) -> Result<(), MockError> {
            self.state.signaled.set(value);
            Ok(())
        }

        fn fence_completed_value(&self, _: &u8) -> u64 {
            self.state.completed.get()
        }

        fn arm_fence_event(&self, _: &u8, _: u64, _: &u8) -> Result<(), MockError> {
            Ok(())
        }

        fn wait_event(&self, _: &u8) {
            self.state.completed.set(self.state.signaled.get());
        }

        fn present(&self, _: &(), _: u32, _: PresentFlags) -> Result<(), MockError> {
            Ok(())
        }
    }

    fn dual_api(state: &Rc<DualState>) -> DualApi {
        DualApi {
            state: Rc::clone(state),
        }
    }

    #[test]
    fn enum_dispatches_to_the_immediate_adapter() {
        let state = Rc::new(DualState::default());
        let inner = ImmediateDevice::new(dual_api(&state), (), (), 2, PresentFlags::TEST);
        let mut backend: GraphicsBackend<DualApi, DualApi> = GraphicsBackend::Immediate(inner);

        assert_eq!(backend.sync_interval(), 2);
        assert_eq!(backend.present_flags(), PresentFlags::TEST);
        backend.initiate_repeats();
        backend.conclude_repeats();
        assert_eq!(
            *state.log.borrow(),
            vec!["immediate.back_buffer", "immediate.copy"]
        );
    }

    #[test]
    fn enum_dispatches_to_the_explicit_adapter() {
        let state = Rc::new(DualState::default());
        let inner = ExplicitDevice::new(dual_api(&state), (), (), (), 1, PresentFlags::empty());
        let mut backend: GraphicsBackend<DualApi, DualApi> = GraphicsBackend::Explicit(inner);

        backend.initiate_repeats();
        backend.prepare_single_repeat();
        backend.conclude_repeats();
        let log = state.log.borrow();
        assert!(log.contains(&"explicit.copy"));
        assert!(log.contains(&"explicit.execute"));
    }
}
