//! Page orchestration.
//!
//! [`Pipeline`] opens a document, extracts each page's text blocks and
//! images, falls back to full-page OCR for pages without a text layer, and
//! attaches the document-wide tables and elements to their pages.

use std::fs;
use std::path::{Path, PathBuf};

use crate::detect::has_extension;
use crate::error::Result;
use crate::extract::{
    extract_text_blocks, extract_unstructured_elements, ImageExtractor, LayoutPartitioner,
    Partitioner, TableExtractor,
};
use crate::model::{
    Diagnostic, DiagnosticSource, DocumentSummary, TableRecord, TextBlock, UnstructuredElement,
};
use crate::ocr::{recognize_bytes, OcrEngine, PageRenderer, PdftoppmRenderer, TesseractCli};
use crate::options::{ExtractOptions, TableRouting};
use crate::parser::{LopdfBackend, PdfBackend};
use crate::render::summary_lines;

/// Outcome of one file in a directory run.
#[derive(Debug)]
pub struct ProcessedFile {
    /// Path of the processed PDF
    pub path: PathBuf,
    /// Summary, or the error that prevented opening the file
    pub result: Result<DocumentSummary>,
}

/// Document processing pipeline with swappable collaborators.
///
/// # Example
///
/// ```no_run
/// use docingest::{ExtractOptions, Pipeline};
///
/// let pipeline = Pipeline::new(ExtractOptions::default().in_memory());
/// let summary = pipeline.process_pdf("report.pdf")?;
/// for line in summary.count_lines() {
///     println!("{}", line);
/// }
/// # Ok::<(), docingest::Error>(())
/// ```
pub struct Pipeline {
    options: ExtractOptions,
    ocr: Box<dyn OcrEngine>,
    renderer: Box<dyn PageRenderer>,
    tables: TableExtractor,
    partitioner: Box<dyn Partitioner>,
}

impl Pipeline {
    /// Create a pipeline with the built-in collaborators.
    pub fn new(options: ExtractOptions) -> Self {
        Self {
            ocr: Box::new(TesseractCli::new(options.ocr.clone())),
            renderer: Box::new(PdftoppmRenderer::new(options.render.clone())),
            tables: TableExtractor::builtin(),
            partitioner: Box::new(LayoutPartitioner::new()),
            options,
        }
    }

    /// Replace the OCR engine.
    pub fn with_ocr_engine(mut self, engine: impl OcrEngine + 'static) -> Self {
        self.ocr = Box::new(engine);
        self
    }

    /// Replace the page renderer.
    pub fn with_renderer(mut self, renderer: impl PageRenderer + 'static) -> Self {
        self.renderer = Box::new(renderer);
        self
    }

    /// Replace the table extractor.
    pub fn with_table_extractor(mut self, tables: TableExtractor) -> Self {
        self.tables = tables;
        self
    }

    /// Replace the partitioner.
    pub fn with_partitioner(mut self, partitioner: impl Partitioner + 'static) -> Self {
        self.partitioner = Box::new(partitioner);
        self
    }

    /// Current options.
    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    pub(crate) fn ocr_engine(&self) -> &dyn OcrEngine {
        &*self.ocr
    }

    pub(crate) fn image_extractor(&self) -> ImageExtractor {
        ImageExtractor::from_options(&self.options)
    }

    /// Process the PDF at `path`.
    ///
    /// Only a failure to open the document is returned as an error; every
    /// later failure is logged and recorded in the summary's diagnostics.
    pub fn process_pdf<P: AsRef<Path>>(&self, path: P) -> Result<DocumentSummary> {
        let path = path.as_ref();
        let filename = display_name(path);
        log::info!("Processing: {}", filename);

        let backend = LopdfBackend::load_file(path)?;
        self.process_backend(&filename, &backend, path)
    }

    /// Process an opened document. `source` is handed to the renderer, the
    /// table passes and the partitioner.
    pub fn process_backend(
        &self,
        filename: &str,
        backend: &dyn PdfBackend,
        source: &Path,
    ) -> Result<DocumentSummary> {
        let mut summary = DocumentSummary::new(filename, backend.page_count());
        let images = self.image_extractor();
        let mut diagnostics = Vec::new();

        for page_summary in &mut summary.pages {
            let page = page_summary.page_number;
            let mut text_blocks = extract_text_blocks(backend, page)?;

            let (records, image_diagnostics) = images.extract(backend, self.ocr_engine(), page);
            diagnostics.extend(image_diagnostics);

            if text_blocks.is_empty() {
                match self.fallback_text(source, page) {
                    Ok(Some(text)) => text_blocks.push(TextBlock::fallback(text)),
                    Ok(None) => {}
                    Err(e) => {
                        log::warn!("Full-page OCR error on page {}: {}", page, e);
                        diagnostics.push(Diagnostic::on_page(
                            DiagnosticSource::FallbackOcr,
                            page,
                            e,
                        ));
                    }
                }
            }

            page_summary.text_blocks = text_blocks;
            page_summary.images = records;
        }
        summary.diagnostics = diagnostics;

        let outcome = self.tables.extract_tables(source);
        summary.diagnostics.extend(outcome.diagnostics);
        route_tables(&mut summary, outcome.tables, self.options.table_routing);

        let (elements, diagnostic) = extract_unstructured_elements(&*self.partitioner, source);
        summary.diagnostics.extend(diagnostic);
        route_elements(&mut summary, elements);

        log::info!("Summary for {}:", summary.filename);
        for line in summary_lines(&summary) {
            log::info!("  {}", line);
        }
        Ok(summary)
    }

    /// Render `page` and OCR it. `None` when the recognized text is blank.
    pub(crate) fn fallback_text(&self, source: &Path, page: u32) -> Result<Option<String>> {
        let png = self.renderer.render_page(source, page)?;
        let text = recognize_bytes(self.ocr_engine(), &png)?;
        let text = text.trim();
        Ok((!text.is_empty()).then(|| text.to_string()))
    }

    /// Process every `.pdf` file directly inside `dir`, in name order.
    ///
    /// Files are independent: one failing does not stop the others.
    pub fn process_directory<P: AsRef<Path>>(&self, dir: P) -> Result<Vec<ProcessedFile>> {
        Ok(pdf_files_in(dir)?
            .into_iter()
            .map(|path| {
                let result = self.process_pdf(&path);
                if let Err(e) = &result {
                    log::warn!("Skipping {}: {}", path.display(), e);
                }
                ProcessedFile { path, result }
            })
            .collect())
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(ExtractOptions::default())
    }
}

/// Files in `dir` with a case-insensitive `.pdf` extension, sorted by name.
pub fn pdf_files_in<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && has_extension(&path, "pdf") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// Attach document-wide tables to pages according to `routing`.
///
/// Tables without a usable page go to page 1. A document without pages
/// drops them.
pub fn route_tables(summary: &mut DocumentSummary, tables: Vec<TableRecord>, routing: TableRouting) {
    if tables.is_empty() {
        return;
    }
    let page_count = summary.page_count();
    if page_count == 0 {
        log::warn!(
            "{} has no pages; dropping {} tables",
            summary.filename,
            tables.len()
        );
        return;
    }

    for table in tables {
        let target = match routing {
            TableRouting::FirstPage => 1,
            TableRouting::ByPage => table
                .metadata
                .page
                .filter(|p| (1..=page_count).contains(p))
                .unwrap_or(1),
        };
        if let Some(page) = summary.page_mut(target) {
            page.tables.push(table);
        }
    }
}

/// Attach elements to their page, or to page 1 when the page is unknown or
/// out of range. A document without pages drops them.
pub fn route_elements(summary: &mut DocumentSummary, elements: Vec<UnstructuredElement>) {
    if elements.is_empty() {
        return;
    }
    let page_count = summary.page_count();
    if page_count == 0 {
        log::warn!(
            "{} has no pages; dropping {} elements",
            summary.filename,
            elements.len()
        );
        return;
    }

    for element in elements {
        let target = element
            .page_number
            .filter(|p| (1..=page_count).contains(p))
            .unwrap_or(1);
        if let Some(page) = summary.page_mut(target) {
            page.unstructured_elements.push(element);
        }
    }
}
