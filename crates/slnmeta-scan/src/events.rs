//! Progress and failure notifications raised during a scan.

use crate::error::ScanError;
use slnmeta_core::locator::SourceLocator;

/// The granularity of a unit of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitKind {
    Solution,
    Project,
}

/// A notification from a running scan. Events are raised from worker threads.
#[derive(Debug, Clone, Copy)]
pub enum ScanEvent<'a> {
    /// Raised just before a unit's content is fetched.
    Processing {
        locator: &'a SourceLocator,
        kind: UnitKind,
    },
    /// A unit failed; the failure is also recorded in the report.
    Failed {
        locator: &'a SourceLocator,
        error: &'a ScanError,
    },
}

/// Receives scan events. Any `Fn(ScanEvent) + Sync` closure is an observer.
pub trait ScanObserver: Sync {
    fn on_event(&self, event: ScanEvent<'_>);
}

impl<F> ScanObserver for F
where
    F: Fn(ScanEvent<'_>) + Sync,
{
    fn on_event(&self, event: ScanEvent<'_>) {
        self(event);
    }
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl ScanObserver for NoopObserver {
    fn on_event(&self, _event: ScanEvent<'_>) {}
}
