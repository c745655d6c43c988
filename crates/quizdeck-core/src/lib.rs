//! quizdeck-core — Session state machine, scoring, and collaborator traits.
//!
//! This crate defines the fundamental data model, the timed session
//! lifecycle, and the engine that the entire quizdeck system builds on.

pub mod attempt;
pub mod engine;
pub mod error;
pub mod host;
pub mod metrics;
pub mod model;
pub mod parser;
pub mod retake;
pub mod session;
pub mod timer;
pub mod traits;
