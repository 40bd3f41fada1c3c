//! Primary table pass through the tabula-java command line.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::model::{DiagnosticSource, ExtractionMethod, TableData, TableRecord};
use crate::ocr::non_empty_env;
use crate::tools;

use super::tables::TableBackend;

/// Environment variable naming the Java launcher.
pub const JAVA_CMD_ENV: &str = "JAVA_CMD";

/// Environment variable pointing at the tabula-java jar.
pub const TABULA_JAR_ENV: &str = "TABULA_JAR";

/// Runs `java -jar tabula.jar` with lattice and stream detection on all pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabulaCli {
    java: String,
    jar: Option<PathBuf>,
}

impl Default for TabulaCli {
    fn default() -> Self {
        Self {
            java: "java".to_string(),
            jar: None,
        }
    }
}

impl TabulaCli {
    /// Use `jar` with the default Java launcher.
    pub fn new(jar: impl Into<PathBuf>) -> Self {
        Self {
            jar: Some(jar.into()),
            ..Self::default()
        }
    }

    /// Read `JAVA_CMD` and `TABULA_JAR`.
    pub fn from_env() -> Self {
        Self {
            java: non_empty_env(JAVA_CMD_ENV).unwrap_or_else(|| "java".to_string()),
            jar: non_empty_env(TABULA_JAR_ENV).map(PathBuf::from),
        }
    }

    /// Set the Java launcher.
    pub fn with_java(mut self, java: impl Into<String>) -> Self {
        self.java = java.into();
        self
    }
}

impl TableBackend for TabulaCli {
    fn name(&self) -> &str {
        "tabula"
    }

    fn source(&self) -> DiagnosticSource {
        DiagnosticSource::TablesPrimary
    }

    fn extract(&self, source: &Path, sink: &mut Vec<TableRecord>) -> Result<()> {
        let jar = self
            .jar
            .as_ref()
            .ok_or_else(|| Error::Table(format!("{} is not set", TABULA_JAR_ENV)))?;

        let args: Vec<&OsStr> = vec![
            OsStr::new("-jar"),
            jar.as_os_str(),
            OsStr::new("--pages"),
            OsStr::new("all"),
            OsStr::new("--lattice"),
            OsStr::new("--stream"),
            OsStr::new("--format"),
            OsStr::new("JSON"),
            source.as_os_str(),
        ];
        let output = tools::run(&self.java, args, None)?;
        sink.extend(parse_tabula_json(&output)?);
        Ok(())
    }
}

#[derive(Deserialize)]
struct TabulaTable {
    #[serde(default)]
    data: Vec<Vec<TabulaCell>>,
}

#[derive(Deserialize)]
struct TabulaCell {
    #[serde(default)]
    text: String,
}

/// Parse tabula's JSON table list. The first row of each table is its header.
pub(crate) fn parse_tabula_json(bytes: &[u8]) -> Result<Vec<TableRecord>> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }
    let tables: Vec<TabulaTable> = serde_json::from_slice(bytes)
        .map_err(|e| Error::Table(format!("unreadable tabula output: {}", e)))?;

    Ok(tables
        .into_iter()
        .map(|table| {
            let grid = table
                .data
                .into_iter()
                .map(|row| row.into_iter().map(|cell| cell.text).collect())
                .collect();
            TableRecord::new(
                TableData::from_grid_with_header(grid),
                ExtractionMethod::LatticeStream,
            )
        })
        .collect())
}
