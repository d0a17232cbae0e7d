//! Traversal pipeline for slnmeta.
//!
//! A [`Scanner`] enumerates a source tree once through a [`SourceAccess`]
//! provider, finds solution manifests and fans out over solutions and their
//! projects on two bounded worker pools. Per-unit failures are reported to a
//! [`ScanObserver`] and collected in the [`ScanReport`] instead of aborting
//! the run.

pub mod error;
pub mod events;
pub mod orchestrator;
pub mod source;

pub use error::{ScanError, SourceError, UnitFailure};
pub use events::{NoopObserver, ScanEvent, ScanObserver, UnitKind};
pub use orchestrator::{ScanReport, Scanner};
pub use source::{RawItem, SourceAccess, open_source};
