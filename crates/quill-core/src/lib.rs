//! # quill-core
//!
//! Core crate for Quill's extension-point subsystem. Contains configuration
//! schemas and the unified error system.
//!
//! This crate has **no** internal dependencies on other Quill crates.

pub mod config;
pub mod error;
pub mod result;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
