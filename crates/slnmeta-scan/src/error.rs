//! Source and scan errors.

use slnmeta_core::error::ModelError;
use slnmeta_core::locator::SourceLocator;
use slnmeta_parser::ParseError;
use std::fmt;

/// Errors raised by a [`SourceAccess`](crate::SourceAccess) provider.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("git error: {0}")]
    Git(#[from] git2::Error),
    #[error("unsupported source: {0}")]
    Unsupported(String),
    #[error(transparent)]
    Locator(#[from] ModelError),
}

/// Errors raised while scanning. `Aggregate` collects per-unit failures.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error("invalid ignore pattern: {0}")]
    Pattern(#[from] globset::Error),
    #[error("failed to build worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
    #[error("{} unit(s) failed", .0.len())]
    Aggregate(Vec<UnitFailure>),
}

/// One unit of work (a solution or a project) that failed.
#[derive(Debug)]
pub struct UnitFailure {
    pub locator: SourceLocator,
    pub error: ScanError,
}

impl fmt::Display for UnitFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.locator, self.error)
    }
}

impl ScanError {
    /// The failures directly held by an aggregate; empty for any other error.
    pub fn failures(&self) -> &[UnitFailure] {
        match self {
            ScanError::Aggregate(failures) => failures,
            _ => &[],
        }
    }

    /// Every non-aggregate failure reachable from this error.
    pub fn leaves(&self) -> Vec<&UnitFailure> {
        let mut leaves = Vec::new();
        collect_leaves(self.failures(), &mut leaves);
        leaves
    }
}

fn collect_leaves<'a>(failures: &'a [UnitFailure], out: &mut Vec<&'a UnitFailure>) {
    for failure in failures {
        match &failure.error {
            ScanError::Aggregate(nested) => collect_leaves(nested, out),
            _ => out.push(failure),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failure(path: &str, error: ScanError) -> UnitFailure {
        UnitFailure {
            locator: SourceLocator::version_control(path, false).unwrap(),
            error,
        }
    }

    #[test]
    fn test_leaves_flatten_nested_aggregates() {
        let nested = ScanError::Aggregate(vec![
            failure("$/A/A.sln", ScanError::Aggregate(vec![
                failure("$/A/P1.csproj", SourceError::NotFound("P1".into()).into()),
                failure("$/A/P2.csproj", SourceError::NotFound("P2".into()).into()),
            ])),
            failure("$/B/B.sln", SourceError::Unsupported("x".into()).into()),
        ]);
        assert_eq!(nested.failures().len(), 2);
        let leaves: Vec<String> = nested
            .leaves()
            .iter()
            .map(|f| f.locator.path().to_string())
            .collect();
        assert_eq!(leaves, vec!["$/A/P1.csproj", "$/A/P2.csproj", "$/B/B.sln"]);
    }

    #[test]
    fn test_display() {
        let err = ScanError::Aggregate(vec![failure(
            "$/A/A.sln",
            SourceError::NotFound("$/A/A.sln".into()).into(),
        )]);
        assert_eq!(err.to_string(), "1 unit(s) failed");
        assert_eq!(
            err.failures()[0].to_string(),
            "$/A/A.sln: not found: $/A/A.sln"
        );
    }
}
