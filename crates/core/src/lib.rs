//! Core types shared across sekisho crates
//!
//! This crate is dependency-light on purpose: it provides the base error
//! type and the git lifecycle stage enum that every other crate speaks.

pub mod error;
pub mod stage;

pub use error::{Error, Result};
pub use stage::Stage;
