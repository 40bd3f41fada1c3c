//! Lattice and stream table passes through the camelot command line.

use std::ffi::OsStr;
use std::fs;
use std::path::Path;

use regex::Regex;
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::model::{DiagnosticSource, ExtractionMethod, TableData, TableRecord};
use crate::ocr::non_empty_env;
use crate::tools;

use super::tables::TableBackend;

/// Environment variable naming the camelot executable.
pub const CAMELOT_CMD_ENV: &str = "CAMELOT_CMD";

/// Runs `camelot lattice` and then `camelot stream` over all pages.
///
/// A lattice failure ends the pass before the stream flavor runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CamelotCli {
    program: String,
}

impl Default for CamelotCli {
    fn default() -> Self {
        Self {
            program: "camelot".to_string(),
        }
    }
}

impl CamelotCli {
    /// Use `program` as the camelot executable.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Read `CAMELOT_CMD`.
    pub fn from_env() -> Self {
        non_empty_env(CAMELOT_CMD_ENV)
            .map(Self::new)
            .unwrap_or_default()
    }

    fn run_flavor(&self, flavor: &str, source: &Path) -> Result<Vec<TableData>> {
        let temp_dir = tempfile::tempdir()?;
        let output = temp_dir.path().join("tables.json");

        let args: Vec<&OsStr> = vec![
            OsStr::new("--format"),
            OsStr::new("json"),
            OsStr::new("--output"),
            output.as_os_str(),
            OsStr::new("--pages"),
            OsStr::new("all"),
            OsStr::new(flavor),
            source.as_os_str(),
        ];
        tools::run(&self.program, args, None)?;
        read_exported_tables(temp_dir.path())
    }
}

impl TableBackend for CamelotCli {
    fn name(&self) -> &str {
        "camelot"
    }

    fn source(&self) -> DiagnosticSource {
        DiagnosticSource::TablesFlavored
    }

    fn extract(&self, source: &Path, sink: &mut Vec<TableRecord>) -> Result<()> {
        for (flavor, method) in [
            ("lattice", ExtractionMethod::FlavorLattice),
            ("stream", ExtractionMethod::FlavorStream),
        ] {
            let tables = self.run_flavor(flavor, source)?;
            sink.extend(tables.into_iter().map(|t| TableRecord::new(t, method)));
        }
        Ok(())
    }
}

/// Read `tables-page-{p}-table-{n}.json` files from `dir` in (page, n) order.
pub(crate) fn read_exported_tables(dir: &Path) -> Result<Vec<TableData>> {
    let pattern = Regex::new(r"-page-(\d+)-table-(\d+)\.json$")
        .map_err(|e| Error::Other(e.to_string()))?;

    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if let Some(caps) = pattern.captures(name) {
            let page: u32 = caps[1].parse().unwrap_or(0);
            let table: u32 = caps[2].parse().unwrap_or(0);
            files.push(((page, table), path));
        }
    }
    files.sort_by_key(|(key, _)| *key);

    files
        .into_iter()
        .map(|(_, path)| {
            let bytes = fs::read(&path)?;
            parse_records(&bytes).map_err(|e| {
                Error::Table(format!("unreadable camelot output {}: {}", path.display(), e))
            })
        })
        .collect()
}

/// Parse one table exported as JSON records: `[{"0": "a", "1": "b"}, ...]`.
fn parse_records(bytes: &[u8]) -> std::result::Result<TableData, serde_json::Error> {
    let records: Vec<Map<String, Value>> = serde_json::from_slice(bytes)?;

    let grid = records
        .into_iter()
        .map(|record| {
            let mut cells: Vec<(usize, String)> = record
                .into_iter()
                .map(|(key, value)| (key.parse().unwrap_or(usize::MAX), cell_text(value)))
                .collect();
            cells.sort_by_key(|(column, _)| *column);
            cells.into_iter().map(|(_, text)| text).collect()
        })
        .collect();
    Ok(TableData::from_grid(grid))
}

fn cell_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
