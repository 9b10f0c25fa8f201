//! Shared utilities

pub mod url;
