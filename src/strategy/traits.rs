use crate::strategy::types::{SignalDecision, TimeframeFrames};

/// Entry and exit rule set
///
/// Implementations are stateless: the same frames must always yield the
/// same decision and rationale, so a cycle can be re-evaluated safely.
///
/// # Implementation Notes
///
/// - Entry checks see all three timeframes; exit checks are free to use
///   only the ones they need
/// - Position state is owned by the state machine, never by the rules
/// - Sizing and execution are handled separately
pub trait SignalRules: Send + Sync {
    /// Identifier used in logs
    fn name(&self) -> &str;

    /// Should an IDLE monitor open a long position?
    fn check_long_entry(&self, frames: &TimeframeFrames) -> SignalDecision;

    /// Should an IDLE monitor open a short position?
    fn check_short_entry(&self, frames: &TimeframeFrames) -> SignalDecision;

    /// Should an open long be closed?
    fn check_long_exit(&self, frames: &TimeframeFrames) -> SignalDecision;

    /// Should an open short be closed?
    fn check_short_exit(&self, frames: &TimeframeFrames) -> SignalDecision;
}
