//! Core types and storage for slnmeta.
//!
//! Provides the metadata graph ([`model::SolutionMetadata`] → [`model::ProjectMetadata`] →
//! setting records), generic source locators, deploy-environment mapping,
//! scan configuration, and JSON inventory persistence.

pub mod config;
pub mod environment;
pub mod error;
pub mod locator;
pub mod model;
pub mod schema;
pub mod storage;
