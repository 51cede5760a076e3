//! # BepiPred Environment Library
//!
//! Locates, installs, validates and launches the BepiPred B-cell epitope predictor on behalf
//! of a scientific-workflow host. No prediction logic lives here: every scientific step is
//! delegated to the tool's own scripts running inside an isolated conda environment.
//!
//! ## Architectural Philosophy
//!
//! The library follows the same three-layer split used across the project:
//!
//! - **[`core`]: The Foundation.** Stateless records and decisions: the [`core::descriptor::ToolDescriptor`],
//!   the explicit [`core::config::PluginConfig`], home discovery, the activation probe, the
//!   installation planner and the validator.
//!
//! - **[`engine`]: The Execution Layer.** Consumes an installation plan step by step, reports
//!   progress, and launches the tool's scripts. All process spawning happens here.
//!
//! - **[`workflows`]: The Public API.** The plugin capability interface a host calls into, and the
//!   prediction step built on top of it.

pub mod core;
pub mod engine;
pub mod workflows;
