pub mod check;
pub mod config;
pub mod env;
pub mod install;
pub mod predict;
pub mod run;
