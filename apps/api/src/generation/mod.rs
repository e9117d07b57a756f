// Deterministic content generation: strategic bets and the 90-day plan.
// Same input, same output; no randomness and no clock reads.

pub mod bets;
pub mod handlers;
pub mod input;
pub mod plan;
pub mod policy;
pub mod stable_index;
