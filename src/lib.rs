//! Retrieval-augmented generation over external collaborators.
//!
//! A query runs through a fixed chain of steps (fetch secret, embed, search,
//! build prompt, generate) that share a per-query [`pipeline::Stash`]. The
//! first failing step aborts the chain and its error reaches the caller
//! unchanged.

pub mod api;
pub mod cli;
pub mod config;
pub mod errors;
pub mod logging;
pub mod pipeline;
pub mod service;
pub mod steps;
pub mod transport;

#[cfg(test)]
mod config_tests;
#[cfg(test)]
mod errors_tests;

pub use config::AppConfig;
pub use errors::*;
pub use service::Answer;
pub use service::RagService;
pub use service::StoreAck;
