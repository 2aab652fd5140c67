//! Warm-up adapter for command-recording graphics APIs.
//!
//! Every repeat is a small recorded command list: transition the
//! current back buffer out of its presentable state, copy the saved
//! frame into it, transition it back. Submissions are paced by a
//! monotonic fence so the allocator and list are never reset while the
//! GPU still reads them.
//!
//! The sequence has one extra obligation the immediate backend does not:
//! the host assumes a specific back-buffer cursor position after the
//! repeat sequence ends, so [`conclude_repeats`] walks the swap chain
//! forward (through the native present path) until the cursor is back
//! where the sequence started.
//!
//! [`conclude_repeats`]: crate::backend::PresentBackend::conclude_repeats

use framelock_core::{relay_error, PresentFlags};
use tracing::{debug, warn};

use crate::api::{ExplicitApi, ResourceState};
use crate::backend::PresentBackend;

/// Debug name attached to the repeat command list.
const REPEAT_LIST_NAME: &str = "framelock warm-up repeats";

/// Sentinel for "no repeat sequence index captured yet".
const NO_REPEAT_INDEX: i32 = -1;

/// Transient resources of one repeat sequence.
///
/// Fields are declared in reverse acquisition order: dropping the
/// struct releases the event first and the allocator last.
struct RepeatResources<A: ExplicitApi> {
    event: A::Event,
    fence: A::Fence,
    saved_frame: A::Texture,
    back_buffers: Vec<A::Texture>,
    list: A::CommandList,
    allocator: A::CommandAllocator,
}

/// Adapter over a command-recording API with explicit fences.
pub struct ExplicitDevice<A: ExplicitApi> {
    api: A,
    device: A::Device,
    swap_chain: A::SwapChain,
    queue: A::CommandQueue,
    sync_interval: u32,
    present_flags: PresentFlags,
    repeat: Option<RepeatResources<A>>,
    /// Next value the GPU will signal; incremented before every signal.
    fence_next: u64,
    /// Back-buffer cursor captured when the first repeat was prepared.
    first_repeat_index: i32,
    /// Set when the swap chain exposes no back-buffer cursor; every
    /// warm-up operation then early-outs.
    degraded: bool,
}

impl<A: ExplicitApi> ExplicitDevice<A> {
    /// Wraps host-owned handles, probing the swap chain for the
    /// back-buffer cursor the repeat machinery needs.
    ///
    /// When the probe fails the adapter still constructs, but in a
    /// degraded state where all warm-up operations are no-ops; the host
    /// keeps presenting, merely without the frozen-image warm-up.
    pub fn new(
        api: A,
        device: A::Device,
        swap_chain: A::SwapChain,
        queue: A::CommandQueue,
        sync_interval: u32,
        present_flags: PresentFlags,
    ) -> Self {
        let degraded = match api.current_back_buffer_index(&swap_chain) {
            Ok(_) => false,
            Err(error) => {
                relay_error!("swap chain exposes no back-buffer cursor, warm-up disabled: {error}");
                true
            }
        };

        Self {
            api,
            device,
            swap_chain,
            queue,
            sync_interval,
            present_flags,
            repeat: None,
            fence_next: 0,
            first_repeat_index: NO_REPEAT_INDEX,
            degraded,
        }
    }

    /// Whether a repeat sequence is currently holding resources.
    pub fn repeats_active(&self) -> bool {
        self.repeat.is_some()
    }

    /// Whether the adapter runs with warm-up disabled.
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    /// Blocks until `fence` reaches `target`.
    ///
    /// Cheap when the GPU is already there; otherwise arms the event
    /// and parks the render thread on it.
    fn wait_for_fence(api: &A, fence: &A::Fence, event: &A::Event, target: u64) {
        if api.fence_completed_value(fence) >= target {
            return;
        }
        if let Err(error) = api.arm_fence_event(fence, target, event) {
            relay_error!("failed to arm the fence event: {error}");
            return;
        }
        api.wait_event(event);
    }

    /// Acquires every transient resource and submits the initial
    /// capture of the current back buffer into the saved frame.
    ///
    /// On any failure the already-created resources unwind in reverse
    /// acquisition order and the error is returned for logging.
    /// `Ok(None)` flags an inconsistent swap chain, already logged.
    fn acquire_and_capture(&mut self) -> Result<Option<RepeatResources<A>>, A::Error> {
        let api = &self.api;

        let allocator = api.create_command_allocator(&self.device)?;
        let mut list = api.create_command_list(&self.device, &allocator, REPEAT_LIST_NAME)?;

        let buffer_count = api.buffer_count(&self.swap_chain)?;
        let mut back_buffers = Vec::with_capacity(buffer_count as usize);
        for index in 0..buffer_count {
            back_buffers.push(api.back_buffer(&self.swap_chain, index)?);
        }

        let index = api.current_back_buffer_index(&self.swap_chain)? as usize;
        let Some(current) = back_buffers.get(index) else {
            relay_error!("back-buffer cursor {index} outside the {buffer_count}-buffer swap chain");
            return Ok(None);
        };
        let saved_frame = api.create_texture_like(&self.device, current)?;

        let fence = api.create_fence(&self.device, self.fence_next)?;
        let event = api.create_event()?;

        api.record_copy(&mut list, &saved_frame, current);
        api.record_transition(
            &mut list,
            &saved_frame,
            ResourceState::CopyDest,
            ResourceState::CopySource,
        );
        api.close_list(&mut list)?;
        api.execute(&self.queue, &list);

        self.fence_next += 1;
        api.signal(&self.queue, &fence, self.fence_next)?;
        Self::wait_for_fence(api, &fence, &event, self.fence_next);

        Ok(Some(RepeatResources {
            event,
            fence,
            saved_frame,
            back_buffers,
            list,
            allocator,
        }))
    }
}

impl<A: ExplicitApi> PresentBackend for ExplicitDevice<A> {
    type Device = A::Device;
    type SwapChain = A::SwapChain;

    fn device(&self) -> A::Device {
        self.device.clone()
    }

    fn swap_chain(&self) -> A::SwapChain {
        self.swap_chain.clone()
    }

    fn sync_interval(&self) -> u32 {
        self.sync_interval
    }

    fn present_flags(&self) -> PresentFlags {
        self.present_flags
    }

    fn initiate_repeats(&mut self) {
        if self.degraded {
            return;
        }
        if self.repeat.is_some() {
            relay_error!("repeat sequence already active, ignoring initiate request");
            return;
        }

        match self.acquire_and_capture() {
            Ok(Some(repeat)) => {
                debug!(
                    back_buffers = repeat.back_buffers.len(),
                    "explicit warm-up repeats initiated"
                );
                self.repeat = Some(repeat);
            }
            Ok(None) => {}
            Err(error) => relay_error!("warm-up resource acquisition failed: {error}"),
        }
    }

    fn prepare_single_repeat(&mut self) {
        if self.degraded {
            return;
        }
        // Only meaningful while a repeat sequence holds its resources.
        let Some(repeat) = self.repeat.as_mut() else {
            return;
        };
        let api = &self.api;

        let index = match api.current_back_buffer_index(&self.swap_chain) {
            Ok(index) => index as usize,
            Err(error) => {
                relay_error!("back-buffer cursor query failed: {error}");
                return;
            }
        };
        if self.first_repeat_index == NO_REPEAT_INDEX {
            // The sequence must end on the same cursor it started on.
            self.first_repeat_index = index as i32;
        }

        Self::wait_for_fence(api, &repeat.fence, &repeat.event, self.fence_next);

        if let Err(error) = api.reset_allocator(&mut repeat.allocator) {
            relay_error!("command allocator reset failed: {error}");
            return;
        }
        if let Err(error) = api.reset_list(&mut repeat.list, &repeat.allocator) {
            relay_error!("command list reset failed: {error}");
            return;
        }

        let Some(back_buffer) = repeat.back_buffers.get(index) else {
            relay_error!("back-buffer cursor {index} outside the cached back-buffer set");
            return;
        };
        api.record_transition(
            &mut repeat.list,
            back_buffer,
            ResourceState::Present,
            ResourceState::CopyDest,
        );
        api.record_copy(&mut repeat.list, back_buffer, &repeat.saved_frame);
        api.record_transition(
            &mut repeat.list,
            back_buffer,
            ResourceState::CopyDest,
            ResourceState::Present,
        );
        if let Err(error) = api.close_list(&mut repeat.list) {
            relay_error!("command list close failed: {error}");
            return;
        }
        api.execute(&self.queue, &repeat.list);

        self.fence_next += 1;
        if let Err(error) = api.signal(&self.queue, &repeat.fence, self.fence_next) {
            relay_error!("fence signal failed: {error}");
        }
    }

    fn conclude_repeats(&mut self) {
        if self.degraded {
            return;
        }
        if let Some(repeat) = self.repeat.as_ref() {
            Self::wait_for_fence(&self.api, &repeat.fence, &repeat.event, self.fence_next);
        } else {
            return;
        }

        // Walk the swap chain forward until the cursor is back where
        // the sequence started; the host assumes that index on return.
        if self.first_repeat_index != NO_REPEAT_INDEX {
            loop {
                match self.api.current_back_buffer_index(&self.swap_chain) {
                    Ok(index) if index as i32 == self.first_repeat_index => break,
                    Ok(_) => {}
                    Err(error) => {
                        relay_error!("back-buffer cursor query failed during re-align: {error}");
                        break;
                    }
                }
                self.prepare_single_repeat();
                if let Err(error) =
                    self.api
                        .present(&self.swap_chain, self.sync_interval, self.present_flags)
                {
                    relay_error!("re-alignment present failed: {error}");
                    break;
                }
                if let Some(repeat) = self.repeat.as_ref() {
                    Self::wait_for_fence(&self.api, &repeat.fence, &repeat.event, self.fence_next);
                }
            }
        }

        // Drops the transient resources in reverse acquisition order.
        self.repeat = None;
        self.first_repeat_index = NO_REPEAT_INDEX;
        debug!("explicit warm-up repeats concluded");
    }
}

impl<A: ExplicitApi> Drop for ExplicitDevice<A> {
    fn drop(&mut self) {
        // Tolerate teardown mid-sequence: drain the fence so the GPU is
        // done with the allocator and list before they are released.
        if let Some(repeat) = self.repeat.as_ref() {
            warn!("explicit adapter dropped mid-repeat, draining the fence");
            Self::wait_for_fence(&self.api, &repeat.fence, &repeat.event, self.fence_next);
        }
    }
}
