//! Stateless building blocks: configuration records, discovery, probing, planning and validation.
//!
//! Nothing in this layer runs an installation. The only processes spawned here are the
//! short-lived activation probes in [`probe`].

pub mod command;
pub mod config;
pub mod descriptor;
pub mod plan;
pub mod probe;
pub mod resolve;
pub mod validate;
