pub mod evaluator;
pub mod handlers;
