//! Document-wide table extraction.
//!
//! Detection is delegated to [`TableBackend`] adapters run in a fixed order:
//! the primary pass first, then each follow-up pass. A failing primary pass
//! ends extraction; a failing follow-up pass is recorded and skipped.

use std::path::Path;

use crate::error::Result;
use crate::model::{Diagnostic, DiagnosticSource, ExtractionMethod, TableData, TableRecord};
use crate::parser::{LopdfBackend, PdfBackend, TableDetector};

use super::camelot::CamelotCli;
use super::tabula::TabulaCli;

/// One table detection pass over a whole document.
pub trait TableBackend {
    /// Short name used in log lines.
    fn name(&self) -> &str;

    /// Diagnostic source recorded when this pass fails.
    fn source(&self) -> DiagnosticSource;

    /// Push the tables found in `source` into `sink`.
    ///
    /// Tables pushed before an error are kept.
    fn extract(&self, source: &Path, sink: &mut Vec<TableRecord>) -> Result<()>;
}

impl<T: TableBackend + ?Sized> TableBackend for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn source(&self) -> DiagnosticSource {
        (**self).source()
    }

    fn extract(&self, source: &Path, sink: &mut Vec<TableRecord>) -> Result<()> {
        (**self).extract(source, sink)
    }
}

/// Tables collected from all passes plus the failures met on the way.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableOutcome {
    /// Non-empty tables in pass order
    pub tables: Vec<TableRecord>,

    /// One entry per failed pass
    pub diagnostics: Vec<Diagnostic>,
}

/// Runs the primary pass and the follow-up passes in order.
pub struct TableExtractor {
    primary: Option<Box<dyn TableBackend>>,
    followups: Vec<Box<dyn TableBackend>>,
}

impl TableExtractor {
    /// Start with `primary` as the first pass.
    pub fn new(primary: impl TableBackend + 'static) -> Self {
        Self {
            primary: Some(Box::new(primary)),
            followups: Vec::new(),
        }
    }

    /// An extractor that finds nothing.
    pub fn disabled() -> Self {
        Self {
            primary: None,
            followups: Vec::new(),
        }
    }

    /// The built-in passes: tabula, camelot, then the in-crate page detector.
    pub fn builtin() -> Self {
        Self::new(TabulaCli::from_env())
            .then(CamelotCli::from_env())
            .then(PagedTables::new())
    }

    /// Append a follow-up pass.
    pub fn then(mut self, backend: impl TableBackend + 'static) -> Self {
        self.followups.push(Box::new(backend));
        self
    }

    /// Run every pass over `source`. Never fails.
    pub fn extract_tables(&self, source: &Path) -> TableOutcome {
        let mut outcome = TableOutcome::default();
        let Some(primary) = &self.primary else {
            return outcome;
        };

        if !run_pass(primary, source, &mut outcome) {
            return outcome;
        }
        for backend in &self.followups {
            run_pass(backend, source, &mut outcome);
        }
        outcome
    }
}

impl Default for TableExtractor {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Run one pass, keeping its non-empty tables. Returns whether it succeeded.
fn run_pass(backend: &dyn TableBackend, source: &Path, outcome: &mut TableOutcome) -> bool {
    let mut found = Vec::new();
    let result = backend.extract(source, &mut found);

    let before = outcome.tables.len();
    outcome
        .tables
        .extend(found.into_iter().filter(|t| !t.data.is_empty()));
    log::debug!(
        "{}: {} tables kept",
        backend.name(),
        outcome.tables.len() - before
    );

    match result {
        Ok(()) => true,
        Err(e) => {
            log::warn!("{} extraction error: {}", backend.name(), e);
            outcome
                .diagnostics
                .push(Diagnostic::new(backend.source(), format!("{}: {}", backend.name(), e)));
            false
        }
    }
}

/// Page-by-page pass over the text layer using [`TableDetector`].
///
/// Each record carries its page number.
#[derive(Debug, Clone, Default)]
pub struct PagedTables {
    detector: TableDetector,
}

impl PagedTables {
    /// Create the pass with the default detector settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a specific detector.
    pub fn with_detector(detector: TableDetector) -> Self {
        Self { detector }
    }

    /// Run the detector over every page of an opened document.
    pub fn extract_from(
        &self,
        backend: &dyn PdfBackend,
        sink: &mut Vec<TableRecord>,
    ) -> Result<()> {
        for page in 1..=backend.page_count() {
            let spans = backend.page_spans(page)?;
            for grid in self.detector.detect_grids(spans) {
                sink.push(TableRecord::on_page(
                    TableData::from_grid(grid),
                    ExtractionMethod::PerPage,
                    page,
                ));
            }
        }
        Ok(())
    }
}

impl TableBackend for PagedTables {
    fn name(&self) -> &str {
        "pdfplumber"
    }

    fn source(&self) -> DiagnosticSource {
        DiagnosticSource::TablesPaged
    }

    fn extract(&self, source: &Path, sink: &mut Vec<TableRecord>) -> Result<()> {
        let backend = LopdfBackend::load_file(source)?;
        self.extract_from(&backend, sink)
    }
}
