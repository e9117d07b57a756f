//! Career strategy copilot: context capture, forced-tradeoff decisions,
//! deterministic 90-day plan generation and checklist gating.
//!
//! The binary in `main.rs` only wires configuration, storage and the router;
//! everything else lives here so it can be exercised from tests.

pub mod checklist;
pub mod config;
pub mod context;
pub mod db;
pub mod decision;
pub mod errors;
pub mod generation;
pub mod llm_client;
pub mod models;
pub mod render;
pub mod routes;
pub mod state;
pub mod store;
