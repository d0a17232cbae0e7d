//! Parsers for the file formats found in a solution tree.
//!
//! Solution manifests, project manifests (legacy and SDK-style), package
//! manifests, assembly attribute files, semantic-versioning configs and the
//! four configuration dialects. Every parser takes the full text of one file
//! and returns a value from [`slnmeta_core::model`].

pub mod assembly_info;
pub mod classify;
pub mod config;
pub mod error;
pub mod gitversion;
pub mod packages;
pub mod project;
pub mod solution;

pub use error::ParseError;
