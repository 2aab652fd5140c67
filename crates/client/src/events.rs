//! Integer event codes of the host command surface.
//!
//! Hosts issue synchronization commands through their render-event
//! channel as an integer code plus a small payload. The codes and
//! payload shapes here are part of the host contract.

/// Commands the host issues on its render thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum RenderEvent {
    /// Enable the workstation feature and join group and barrier.
    Initialize = 0,
    /// Read the frame count into the payload's out-slot.
    QueryFrameCount = 1,
    /// Reset the cluster or local frame count.
    ResetFrameCount = 2,
    /// Leave the barrier and group, release workstation resources.
    Dispose = 3,
    /// Toggle group and barrier together.
    EnableSystem = 4,
    /// Toggle swap-group membership.
    EnableSwapGroup = 5,
    /// Toggle the barrier binding.
    EnableSwapBarrier = 6,
    /// Toggle vendor versus local frame counting.
    EnableSyncCounter = 7,
}

impl RenderEvent {
    /// Decodes a raw host event code.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(RenderEvent::Initialize),
            1 => Some(RenderEvent::QueryFrameCount),
            2 => Some(RenderEvent::ResetFrameCount),
            3 => Some(RenderEvent::Dispose),
            4 => Some(RenderEvent::EnableSystem),
            5 => Some(RenderEvent::EnableSwapGroup),
            6 => Some(RenderEvent::EnableSwapBarrier),
            7 => Some(RenderEvent::EnableSyncCounter),
            _ => None,
        }
    }

    /// Integer value the host sends.
    #[inline]
    pub fn code(self) -> i32 {
        self as i32
    }
}

/// Payload accompanying a host command.
///
/// Toggle commands read the low bit of the host's data word; a missing
/// payload reads as `false`, mirroring how hosts pass a null pointer
/// for "off".
#[derive(Debug)]
pub enum EventData<'a> {
    /// No payload.
    None,
    /// Toggle payload.
    Toggle(bool),
    /// Out-slot receiving the frame count.
    FrameCountOut(&'a mut i32),
}

impl EventData<'_> {
    /// Reads the payload as a toggle; anything but an explicit `true`
    /// is off.
    pub(crate) fn as_toggle(&self) -> bool {
        matches!(self, EventData::Toggle(true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip() {
        for code in 0..=7 {
            let event = RenderEvent::from_code(code).expect("known event code");
            assert_eq!(event.code(), code);
        }
    }

    #[test]
    fn unknown_codes_are_rejected() {
        assert_eq!(RenderEvent::from_code(-1), None);
        assert_eq!(RenderEvent::from_code(8), None);
    }

    #[test]
    fn missing_payload_reads_as_off() {
        assert!(!EventData::None.as_toggle());
        assert!(!EventData::Toggle(false).as_toggle());
        assert!(EventData::Toggle(true).as_toggle());
    }
}
