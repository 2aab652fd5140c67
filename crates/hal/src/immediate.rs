//! Warm-up adapter for internally synchronized graphics APIs.

use framelock_core::{relay_error, PresentFlags};
use tracing::debug;

use crate::api::ImmediateApi;
use crate::backend::PresentBackend;

/// Transient resources of one repeat sequence.
struct RepeatResources<A: ImmediateApi> {
    /// Back buffer the host keeps rendering into.
    back_buffer: A::Texture,
    /// Copy of the back buffer taken when repeats began.
    saved_frame: A::Texture,
}

/// Adapter over an immediate-mode API.
///
/// The API orders copies internally, so repeats are plain copies with
/// no fences, and there is no back-buffer cursor to re-align after the
/// sequence ends.
pub struct ImmediateDevice<A: ImmediateApi> {
    api: A,
    device: A::Device,
    swap_chain: A::SwapChain,
    sync_interval: u32,
    present_flags: PresentFlags,
    repeat: Option<RepeatResources<A>>,
}

impl<A: ImmediateApi> ImmediateDevice<A> {
    /// Wraps host-owned handles. The handles are borrowed for the life
    /// of the adapter and never released by it.
    pub fn new(
        api: A,
        device: A::Device,
        swap_chain: A::SwapChain,
        sync_interval: u32,
        present_flags: PresentFlags,
    ) -> Self {
        Self {
            api,
            device,
            swap_chain,
            sync_interval,
            present_flags,
            repeat: None,
        }
    }

    /// Whether a repeat sequence is currently holding resources.
    pub fn repeats_active(&self) -> bool {
        self.repeat.is_some()
    }
}

impl<A: ImmediateApi> PresentBackend for ImmediateDevice<A> {
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
        if self.repeat.is_some() {
            relay_error!("repeat sequence already active, ignoring initiate request");
            return;
        }

        let back_buffer = match self.api.back_buffer(&self.swap_chain) {
            Ok(texture) => texture,
            Err(error) => {
                relay_error!("failed to fetch the back buffer: {error}");
                return;
            }
        };
        let saved_frame = match self.api.create_texture_like(&self.device, &back_buffer) {
            Ok(texture) => texture,
            Err(error) => {
                relay_error!("failed to create the saved-frame texture: {error}");
                return;
            }
        };

        // The host keeps rendering into this target; what the next
        // presents show is whatever the saved frame holds right now.
        self.api.bind_render_target(&back_buffer);
        self.api.copy_texture(&saved_frame, &back_buffer);

        debug!("immediate warm-up repeats initiated");
        self.repeat = Some(RepeatResources {
            back_buffer,
            saved_frame,
        });
    }

    fn prepare_single_repeat(&mut self) {
        // Only meaningful while a repeat sequence holds its resources.
        let Some(repeat) = &self.repeat else { return };
        self.api
            .copy_texture(&repeat.back_buffer, &repeat.saved_frame);
    }

    fn conclude_repeats(&mut self) {
        if self.repeat.take().is_some() {
            debug!("immediate warm-up repeats concluded");
        }
    }
}
