//! # Engine Module
//!
//! Everything that changes the filesystem or spawns long-running processes.
//!
//! - **Installation** ([`install`]) - executes an [`InstallationPlan`](crate::core::plan::InstallationPlan)
//!   step by step under an advisory lock
//! - **Launching** ([`launch`]) - composes and dispatches script invocations inside the activated environment
//! - **Progress Monitoring** ([`progress`]) - callback-based progress reporting for hosts with a UI
//! - **Error Handling** ([`error`]) - the error taxonomy for execution failures

pub mod error;
pub mod install;
pub mod launch;
pub mod progress;
