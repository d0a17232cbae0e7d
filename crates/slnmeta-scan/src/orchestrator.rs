//! The traversal pipeline.
//!
//! 1. Enumerate the root once, map items to locators and drop ignored paths.
//! 2. Classify and index the remaining files.
//! 3. Fan out over solutions, then over each solution's projects.
//! 4. Overlay package manifest, config files and assembly attributes onto
//!    each project, in that order.
//! 5. Collect failures per unit without stopping sibling work.

use crate::error::{ScanError, SourceError, UnitFailure};
use crate::events::{ScanEvent, ScanObserver, UnitKind};
use crate::source::SourceAccess;
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use slnmeta_core::config::ScanConfig;
use slnmeta_core::locator::SourceLocator;
use slnmeta_core::model::{GitVersionConfig, ProjectMetadata, ProjectStub, SolutionMetadata};
use slnmeta_parser::assembly_info::parse_assembly_info;
use slnmeta_parser::classify::{FileKind, classify};
use slnmeta_parser::config::parse_config_file;
use slnmeta_parser::gitversion::{GITVERSION_FILE_NAMES, parse_gitversion};
use slnmeta_parser::packages::{PACKAGE_MANIFEST_NAME, parse_packages};
use slnmeta_parser::project::{is_project_file, parse_project};
use slnmeta_parser::solution::parse_solution;
use std::collections::HashMap;

/// Conventional locations of the assembly attribute file, relative to the project directory.
const ASSEMBLY_INFO_PATHS: [&str; 2] = ["Properties/AssemblyInfo.cs", "My Project/AssemblyInfo.vb"];

/// Everything a scan produced: the solutions that could be read, and every unit that failed.
#[derive(Debug, Default)]
pub struct ScanReport {
    pub solutions: Vec<SolutionMetadata>,
    pub failures: Vec<UnitFailure>,
}

impl ScanReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn project_count(&self) -> usize {
        self.solutions.iter().map(|s| s.projects.len()).sum()
    }

    pub fn setting_count(&self) -> usize {
        self.solutions.iter().map(SolutionMetadata::setting_count).sum()
    }

    /// The solutions, or an aggregate of every failure when any unit failed.
    pub fn into_result(self) -> Result<Vec<SolutionMetadata>, ScanError> {
        if self.failures.is_empty() {
            Ok(self.solutions)
        } else {
            Err(ScanError::Aggregate(self.failures))
        }
    }
}

/// Files found under the scan root, keyed case-insensitively by `/`-normalised path.
struct SourceIndex {
    files: Vec<(SourceLocator, FileKind)>,
    by_path: HashMap<String, usize>,
}

fn index_key(locator: &SourceLocator) -> String {
    locator.normalized_path().to_ascii_lowercase()
}

impl SourceIndex {
    fn build(mut locators: Vec<SourceLocator>) -> Self {
        locators.sort_by(|a, b| a.path().cmp(b.path()));
        let files: Vec<(SourceLocator, FileKind)> = locators
            .into_iter()
            .map(|l| {
                let kind = classify(l.path());
                (l, kind)
            })
            .collect();
        let by_path = files
            .iter()
            .enumerate()
            .map(|(i, (l, _))| (index_key(l), i))
            .collect();
        Self { files, by_path }
    }

    fn of_kind(&self, kind: FileKind) -> impl Iterator<Item = &SourceLocator> {
        self.files
            .iter()
            .filter(move |(_, k)| *k == kind)
            .map(|(l, _)| l)
    }

    fn lookup(&self, locator: &SourceLocator) -> Option<&SourceLocator> {
        self.by_path
            .get(&index_key(locator))
            .map(|&i| &self.files[i].0)
    }

    fn configs_under<'a>(
        &'a self,
        directory: &'a SourceLocator,
    ) -> impl Iterator<Item = &'a SourceLocator> + 'a {
        self.files
            .iter()
            .filter(move |(l, k)| k.is_config() && l.is_under(directory))
            .map(|(l, _)| l)
    }
}

/// Ignore globs matched against the `/`-normalised path relative to the scan
/// root. Ancestors of the root never take part in a match.
struct IgnoreFilter {
    set: GlobSet,
    root: String,
}

impl IgnoreFilter {
    fn new<'p>(
        root: &SourceLocator,
        patterns: impl IntoIterator<Item = &'p String>,
    ) -> Result<Self, ScanError> {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            builder.add(GlobBuilder::new(pattern).case_insensitive(true).build()?);
        }
        Ok(Self {
            set: builder.build()?,
            root: root.normalized_path().trim_end_matches('/').to_string(),
        })
    }

    fn is_ignored(&self, locator: &SourceLocator) -> bool {
        let path = locator.normalized_path();
        match self.relative(&path) {
            Some(relative) => self.set.is_match(relative),
            None => self.set.is_match(&path),
        }
    }

    /// The part of `path` below the root, if `path` is under it.
    fn relative<'p>(&self, path: &'p str) -> Option<&'p str> {
        let rest = path.strip_prefix(&self.root)?;
        if self.root.is_empty() || rest.is_empty() || rest.starts_with('/') {
            Some(rest.trim_start_matches('/'))
        } else {
            None
        }
    }
}

/// Shared, read-only state for one run.
struct ScanContext<'a> {
    index: &'a SourceIndex,
    observer: &'a dyn ScanObserver,
    projects: &'a ThreadPool,
}

impl ScanContext<'_> {
    fn fail(&self, locator: &SourceLocator, error: ScanError) -> UnitFailure {
        self.observer.on_event(ScanEvent::Failed {
            locator,
            error: &error,
        });
        tracing::warn!(locator = %locator, error = %error, "unit failed");
        UnitFailure {
            locator: locator.clone(),
            error,
        }
    }
}

/// Drives a scan over one [`SourceAccess`] provider.
pub struct Scanner {
    source: Box<dyn SourceAccess>,
    config: ScanConfig,
}

impl Scanner {
    pub fn new(source: Box<dyn SourceAccess>, config: ScanConfig) -> Self {
        Self { source, config }
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Scan every solution under `root`.
    ///
    /// `ignore_patterns` are added to the configured ignore list. Errors that
    /// prevent the run from starting (enumeration, invalid patterns, pool
    /// setup) are returned directly; failures of individual solutions and
    /// projects are reported to `observer` and collected in the report.
    pub fn process_source(
        &self,
        root: &SourceLocator,
        ignore_patterns: &[String],
        observer: &dyn ScanObserver,
    ) -> Result<ScanReport, ScanError> {
        if root.kind() != self.source.kind() {
            return Err(SourceError::Unsupported(format!(
                "{:?} root '{}' given to a {:?} source",
                root.kind(),
                root,
                self.source.kind()
            ))
            .into());
        }

        let filter = IgnoreFilter::new(
            root,
            self.config.filters.ignore.iter().chain(ignore_patterns),
        )?;

        let items = self.source.enumerate(root)?;
        let mut locators = Vec::with_capacity(items.len());
        for item in items.iter().filter(|i| !i.is_directory) {
            let locator = self.source.map(item, root.repository(), root.branch())?;
            if !filter.is_ignored(&locator) {
                locators.push(locator);
            }
        }
        let index = SourceIndex::build(locators);
        let solutions: Vec<&SourceLocator> = index.of_kind(FileKind::Solution).collect();

        tracing::info!(
            root = %root,
            items = items.len(),
            files = index.files.len(),
            solutions = solutions.len(),
            "scanning source"
        );

        let performance = &self.config.performance;
        let solution_pool = ThreadPoolBuilder::new()
            .num_threads(performance.solution_parallelism)
            .thread_name(|i| format!("slnmeta-solution-{}", i))
            .build()?;
        let project_pool = ThreadPoolBuilder::new()
            .num_threads(performance.project_parallelism)
            .thread_name(|i| format!("slnmeta-project-{}", i))
            .build()?;

        let ctx = ScanContext {
            index: &index,
            observer,
            projects: &project_pool,
        };

        let outcomes: Vec<(Option<SolutionMetadata>, Option<UnitFailure>)> =
            solution_pool.install(|| {
                solutions
                    .par_iter()
                    .map(|solution| self.process_solution(&ctx, solution))
                    .collect()
            });

        let mut report = ScanReport::default();
        for (metadata, failure) in outcomes {
            report.solutions.extend(metadata);
            report.failures.extend(failure);
        }

        tracing::info!(
            solutions = report.solutions.len(),
            projects = report.project_count(),
            settings = report.setting_count(),
            failures = report.failures.len(),
            "scan finished"
        );
        Ok(report)
    }

    fn process_solution(
        &self,
        ctx: &ScanContext<'_>,
        solution: &SourceLocator,
    ) -> (Option<SolutionMetadata>, Option<UnitFailure>) {
        match self.scan_solution(ctx, solution) {
            Ok((metadata, failures)) if failures.is_empty() => (Some(metadata), None),
            Ok((metadata, failures)) => (
                Some(metadata),
                Some(UnitFailure {
                    locator: solution.clone(),
                    error: ScanError::Aggregate(failures),
                }),
            ),
            Err(error) => (None, Some(ctx.fail(solution, error))),
        }
    }

    fn scan_solution(
        &self,
        ctx: &ScanContext<'_>,
        solution: &SourceLocator,
    ) -> Result<(SolutionMetadata, Vec<UnitFailure>), ScanError> {
        ctx.observer.on_event(ScanEvent::Processing {
            locator: solution,
            kind: UnitKind::Solution,
        });
        let content = self.fetch_required(solution)?;
        let record = parse_solution(&content)?;

        let mut metadata = SolutionMetadata::new(solution.file_stem(), Some(solution.clone()));
        metadata.update_from_solution(record);
        if self.config.overlays.git_version {
            metadata.git_version = self.git_version_for(ctx, solution)?;
        }

        let directory = solution.parent();
        let stubs: Vec<&ProjectStub> = metadata
            .project_stubs
            .iter()
            .filter(|stub| is_project_file(&stub.path))
            .collect();
        let results: Vec<Result<ProjectMetadata, UnitFailure>> = ctx.projects.install(|| {
            stubs
                .par_iter()
                .map(|stub| self.process_project(ctx, &directory, stub))
                .collect()
        });

        let mut failures = Vec::new();
        for result in results {
            match result {
                Ok(project) => metadata.projects.push(project),
                Err(failure) => failures.push(failure),
            }
        }

        tracing::debug!(
            solution = %solution,
            projects = metadata.projects.len(),
            failed = failures.len(),
            "scanned solution"
        );
        Ok((metadata, failures))
    }

    fn git_version_for(
        &self,
        ctx: &ScanContext<'_>,
        solution: &SourceLocator,
    ) -> Result<Option<GitVersionConfig>, ScanError> {
        for name in GITVERSION_FILE_NAMES {
            let candidate = solution.sibling(name, false)?;
            if let Some(content) = self.fetch_indexed(ctx, &candidate)? {
                return Ok(Some(parse_gitversion(&content)?));
            }
        }
        Ok(None)
    }

    fn process_project(
        &self,
        ctx: &ScanContext<'_>,
        directory: &SourceLocator,
        stub: &ProjectStub,
    ) -> Result<ProjectMetadata, UnitFailure> {
        let locator = directory
            .child(&stub.path, false)
            .map_err(|err| ctx.fail(directory, err.into()))?;
        // Solution files often disagree with the store on case.
        let locator = match ctx.index.lookup(&locator) {
            Some(indexed) => indexed.clone(),
            None => locator,
        };
        self.scan_project(ctx, stub, &locator)
            .map_err(|err| ctx.fail(&locator, err))
    }

    fn scan_project(
        &self,
        ctx: &ScanContext<'_>,
        stub: &ProjectStub,
        locator: &SourceLocator,
    ) -> Result<ProjectMetadata, ScanError> {
        ctx.observer.on_event(ScanEvent::Processing {
            locator,
            kind: UnitKind::Project,
        });
        let content = self.fetch_required(locator)?;
        let document = parse_project(&content, locator.file_name())?;

        let mut project = ProjectMetadata::from_stub(stub, Some(locator.clone()));
        project.update_from_project(document);

        let overlays = &self.config.overlays;
        let directory = locator.parent();

        if overlays.packages {
            let manifest = locator.sibling(PACKAGE_MANIFEST_NAME, false)?;
            if let Some(content) = self.fetch_indexed(ctx, &manifest)? {
                project.update_from_packages(parse_packages(&content)?);
            }
        }

        if overlays.config_files {
            let strict = self.config.filters.strict_environments;
            for config in ctx.index.configs_under(&directory) {
                if let Some(content) = self.fetch_optional(config)? {
                    let settings = parse_config_file(config.file_name(), &content, strict)?;
                    project.update(settings.into());
                }
            }
        }

        if overlays.assembly_info {
            for relative in ASSEMBLY_INFO_PATHS {
                let candidate = directory.child(relative, false)?;
                if let Some(content) = self.fetch_indexed(ctx, &candidate)? {
                    project.update_from_assembly_info(parse_assembly_info(&content)?);
                }
            }
        }

        tracing::debug!(
            project = %locator,
            packages = project.package_references.len(),
            settings = project.setting_count(),
            "scanned project"
        );
        Ok(project)
    }

    /// Content of a unit that must exist.
    fn fetch_required(&self, locator: &SourceLocator) -> Result<String, ScanError> {
        self.source
            .fetch_content(locator)?
            .ok_or_else(|| SourceError::NotFound(locator.to_string()).into())
    }

    /// Content of an optional file. Missing or blank content is `None`.
    fn fetch_optional(&self, locator: &SourceLocator) -> Result<Option<String>, ScanError> {
        Ok(self
            .source
            .fetch_content(locator)?
            .filter(|content| !content.trim().is_empty()))
    }

    /// Like [`fetch_optional`](Self::fetch_optional), for a candidate that is
    /// only fetched when the enumeration listed it.
    fn fetch_indexed(
        &self,
        ctx: &ScanContext<'_>,
        candidate: &SourceLocator,
    ) -> Result<Option<String>, ScanError> {
        match ctx.index.lookup(candidate) {
            Some(indexed) => self.fetch_optional(indexed),
            None => Ok(None),
        }
    }
}
