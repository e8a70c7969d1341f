// =============================================================================
// Signals Module
// =============================================================================
//
// Fuses the indicator set and trend classification into a buy / sell / hold
// recommendation with a confidence score and an ordered list of messages.

pub mod synthesizer;

pub use synthesizer::{IndicatorVote, KeyLevels, SignalResult, SignalSynthesizer, VoteDirection};
