//! Bridge between a host process and a Tatar morphological-analysis engine.
//!
//! The host writes one JSON request per line on the bridge's stdin and reads
//! exactly one JSON response per line from its stdout. See [`bridge::Bridge`]
//! for the loop and [`engine::Engine`] for the analysis contract.

pub mod bridge;
pub mod compat;
pub mod consts;
pub mod engine;
pub mod protocol;
