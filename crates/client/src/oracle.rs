//! Warm-up oracle callback types.
//!
//! The vendor barrier takes a few presents to engage after a bind. The
//! oracle is the host's barometer for that convergence: the controller
//! consults it between warm-up presents, and the host typically answers
//! from cluster-wide state it polls elsewhere.

/// Verdict the host's oracle returns between warm-up presents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarmupAction {
    /// Copy the saved frame forward and present again, immediately.
    RepeatPresent,
    /// Leave warm-up where it is and give the frame back to the host.
    ContinueToNextFrame,
    /// The barrier is engaged; stop repeating.
    BarrierWarmedUp,
}

/// Oracle consulted between warm-up presents.
///
/// A plain function pointer: installing one is a single pointer-sized
/// write, and the callback must stay valid for the life of the process.
pub type WarmupOracle = fn() -> WarmupAction;

/// Default oracle, imposing no warm-up.
pub fn default_oracle() -> WarmupAction {
    WarmupAction::ContinueToNextFrame
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_oracle_never_asks_for_repeats() {
        assert_eq!(default_oracle(), WarmupAction::ContinueToNextFrame);
    }
}
