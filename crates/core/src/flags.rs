//! Present-flag definitions.

use bitflags::bitflags;

bitflags! {
    /// Flags the host presents with, forwarded verbatim to the driver.
    ///
    /// The controller and the adapters never interpret these beyond
    /// passing them through to the present call, together with the sync
    /// interval. The values match the swap-chain API the host uses.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct PresentFlags: u32 {
        /// Probe presentation without actually presenting.
        const TEST = 0x1;
        /// Present without waiting for ordering against prior presents.
        const DO_NOT_SEQUENCE = 0x2;
        /// Discard queued presents and start over.
        const RESTART = 0x4;
        /// Fail instead of blocking when the present queue is full.
        const DO_NOT_WAIT = 0x8;
        /// Allow tearing in windowed flip-model presentation.
        const ALLOW_TEARING = 0x200;
    }
}

impl PresentFlags {
    /// Reinterprets a raw flag word from the host, keeping unknown bits.
    #[inline]
    pub fn from_host(bits: u32) -> Self {
        Self::from_bits_retain(bits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_bits_survive_the_host_round_trip() {
        let flags = PresentFlags::from_host(0x200 | 0x4000);
        assert!(flags.contains(PresentFlags::ALLOW_TEARING));
        assert_eq!(flags.bits(), 0x4200);
    }

    #[test]
    fn default_is_empty() {
        assert!(PresentFlags::default().is_empty());
    }
}
