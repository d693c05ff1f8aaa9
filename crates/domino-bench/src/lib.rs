//! Deterministic scenario harness for the domino inference engine.

pub mod config;
pub mod logging;
pub mod replay;
pub mod report;
