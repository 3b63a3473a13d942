//! CLI command implementations

pub mod clean;
pub mod install;
pub mod list;
pub mod run;
pub mod sample;
pub mod validate;
