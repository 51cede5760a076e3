//! # Workflows Module
//!
//! Entry points a workflow host calls into.
//!
//! - **Plugin** ([`plugin`]) - the capability interface (variables, binaries, validation, script
//!   launching) and its BepiPred implementation
//! - **Prediction** ([`predict`]) - the B-cell epitope prediction step, expressed as a launch of
//!   the tool's command-line script

pub mod plugin;
pub mod predict;
