//! Seam traits over the host's native graphics API.
//!
//! The host owns the device, swap chain, and command queue; the
//! adapters borrow them and drive only the small set of operations the
//! warm-up protocol needs. Production implementations wrap the real
//! graphics library; tests substitute recording mocks.

use std::error::Error as StdError;

use framelock_core::PresentFlags;

/// Handle and resource types shared by both backend flavours.
///
/// Handle types are cheap clones of host-owned objects (the adapters
/// never release them); resource types are owned by the adapter that
/// created them and are released by dropping.
pub trait GraphicsApi {
    /// Borrowed device handle.
    type Device: Clone;
    /// Borrowed swap-chain handle.
    type SwapChain: Clone;
    /// A texture-like resource: a back buffer or a saved frame.
    type Texture;
    /// Error type the native API produces.
    type Error: StdError + Send + Sync + 'static;
}

/// Logical state of a resource, for transition barriers.
///
/// Only the states the warm-up command streams move through are
/// modeled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceState {
    /// Ready for presentation.
    Present,
    /// Destination of a copy.
    CopyDest,
    /// Source of a copy.
    CopySource,
}

/// Operations of an internally synchronized graphics API.
///
/// The driver orders copies against rendering and presentation on its
/// own, so no fences appear at this seam.
pub trait ImmediateApi: GraphicsApi {
    /// Fetches the swap chain's first back buffer.
    fn back_buffer(&self, swap_chain: &Self::SwapChain) -> Result<Self::Texture, Self::Error>;

    /// Creates a texture with the same layout as `template` but none of
    /// its GPU-visible usage flags.
    fn create_texture_like(
        &self,
        device: &Self::Device,
        template: &Self::Texture,
    ) -> Result<Self::Texture, Self::Error>;

    /// Binds `target` as the sole render target of the immediate
    /// context.
    fn bind_render_target(&self, target: &Self::Texture);

    /// Copies `src` into `dst` through the immediate context.
    fn copy_texture(&self, dst: &Self::Texture, src: &Self::Texture);
}

/// Operations of a graphics API with explicit command recording, GPU
/// fences, and OS-event waits.
pub trait ExplicitApi: GraphicsApi {
    /// Borrowed command-queue handle.
    type CommandQueue: Clone;
    /// Allocator backing recorded command lists.
    type CommandAllocator;
    /// A recordable command list.
    type CommandList;
    /// Monotonically increasing GPU fence.
    type Fence;
    /// Auto-reset OS event used to wait for fence completion.
    type Event;

    /// Number of buffers in the swap chain.
    fn buffer_count(&self, swap_chain: &Self::SwapChain) -> Result<u32, Self::Error>;

    /// Index of the buffer the swap chain will render to next.
    ///
    /// Fails when the swap chain does not expose a back-buffer cursor
    /// (older interface generations); the explicit adapter then runs
    /// degraded, with every warm-up operation an early-out.
    fn current_back_buffer_index(&self, swap_chain: &Self::SwapChain)
        -> Result<u32, Self::Error>;

    /// Fetches back buffer `index`.
    fn back_buffer(
        &self,
        swap_chain: &Self::SwapChain,
        index: u32,
    ) -> Result<Self::Texture, Self::Error>;

    /// Creates a command allocator for direct lists.
    fn create_command_allocator(
        &self,
        device: &Self::Device,
    ) -> Result<Self::CommandAllocator, Self::Error>;

    /// Creates a direct command list in the recording state. `name` is
    /// attached so the list shows up readably in graphics debuggers.
    fn create_command_list(
        &self,
        device: &Self::Device,
        allocator: &Self::CommandAllocator,
        name: &str,
    ) -> Result<Self::CommandList, Self::Error>;

    /// Creates a committed texture matching `template`'s descriptor
    /// with all usage flags removed and identical heap properties.
    fn create_texture_like(
        &self,
        device: &Self::Device,
        template: &Self::Texture,
    ) -> Result<Self::Texture, Self::Error>;

    /// Creates a fence starting at `initial_value`.
    fn create_fence(
        &self,
        device: &Self::Device,
        initial_value: u64,
    ) -> Result<Self::Fence, Self::Error>;

    /// Creates an auto-reset event for fence waits.
    fn create_event(&self) -> Result<Self::Event, Self::Error>;

    /// Recycles `allocator` for a new recording pass.
    ///
    /// Callers must have waited for every list submitted against it.
    fn reset_allocator(&self, allocator: &mut Self::CommandAllocator) -> Result<(), Self::Error>;

    /// Re-opens `list` for recording against `allocator`.
    fn reset_list(
        &self,
        list: &mut Self::CommandList,
        allocator: &Self::CommandAllocator,
    ) -> Result<(), Self::Error>;

    /// Records a whole-resource copy into `list`.
    fn record_copy(&self, list: &mut Self::CommandList, dst: &Self::Texture, src: &Self::Texture);

    /// Records a state transition barrier for `texture` into `list`.
    fn record_transition(
        &self,
        list: &mut Self::CommandList,
        texture: &Self::Texture,
        from: ResourceState,
        to: ResourceState,
    );

    /// Closes `list`, making it submittable.
    fn close_list(&self, list: &mut Self::CommandList) -> Result<(), Self::Error>;

    /// Submits a closed list to the queue.
    fn execute(&self, queue: &Self::CommandQueue, list: &Self::CommandList);

    /// Tells the queue to signal `fence` with `value` once all prior
    /// work on it completes.
    fn signal(
        &self,
        queue: &Self::CommandQueue,
        fence: &Self::Fence,
        value: u64,
    ) -> Result<(), Self::Error>;

    /// Last value the GPU has signalled on `fence`.
    fn fence_completed_value(&self, fence: &Self::Fence) -> u64;

    /// Arms `event` to fire when `fence` reaches `value`.
    fn arm_fence_event(
        &self,
        fence: &Self::Fence,
        value: u64,
        event: &Self::Event,
    ) -> Result<(), Self::Error>;

    /// Blocks until `event` fires.
    ///
    /// The wait is unbounded but is only armed behind a pending fence
    /// signal, so it is bounded in practice by GPU completion.
    fn wait_event(&self, event: &Self::Event);

    /// Presents through the native, non-synchronized path.
    ///
    /// Used only by the conclude-time re-alignment walk; ordinary
    /// presentation goes through the frame-lock driver.
    fn present(
        &self,
        swap_chain: &Self::SwapChain,
        sync_interval: u32,
        flags: PresentFlags,
    ) -> Result<(), Self::Error>;
}
