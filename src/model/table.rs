//! Table records.

use serde::{Deserialize, Serialize};

/// Column-oriented table payload: column labels, row index and row values.
///
/// This is the "split" layout of a data frame. It converts to and from a
/// plain grid of cell strings without loss.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TableData {
    /// Column labels
    pub columns: Vec<String>,

    /// Row labels (0-based positions)
    pub index: Vec<usize>,

    /// Row values, one inner vector per row
    pub data: Vec<Vec<String>>,
}

impl TableData {
    /// Build from a grid, labelling columns `0..n`.
    ///
    /// Ragged rows are padded with empty cells to the widest row.
    pub fn from_grid(grid: Vec<Vec<String>>) -> Self {
        let width = grid.iter().map(Vec::len).max().unwrap_or(0);
        let columns = (0..width).map(|i| i.to_string()).collect();
        Self::with_columns(columns, grid)
    }

    /// Build from a grid whose first row holds the column labels.
    pub fn from_grid_with_header(mut grid: Vec<Vec<String>>) -> Self {
        if grid.is_empty() {
            return Self::default();
        }
        let header = grid.remove(0);
        let width = grid.iter().map(Vec::len).max().unwrap_or(0).max(header.len());
        let mut columns = header;
        while columns.len() < width {
            columns.push(format!("Unnamed: {}", columns.len()));
        }
        Self::with_columns(columns, grid)
    }

    fn with_columns(columns: Vec<String>, grid: Vec<Vec<String>>) -> Self {
        let width = columns.len();
        let data: Vec<Vec<String>> = grid
            .into_iter()
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .collect();
        let index = (0..data.len()).collect();
        Self {
            columns,
            index,
            data,
        }
    }

    /// The row values as a grid.
    pub fn to_grid(&self) -> Vec<Vec<String>> {
        self.data.clone()
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.data.len()
    }

    /// Number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// A table is empty unless it has at least one row and one column.
    pub fn is_empty(&self) -> bool {
        self.row_count() == 0 || self.column_count() == 0
    }

    /// Tab-separated text of the rows.
    pub fn plain_text(&self) -> String {
        self.data
            .iter()
            .map(|row| row.join("\t"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Which table pass produced a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExtractionMethod {
    /// Combined lattice + stream pass over the whole document
    #[serde(rename = "tabula-lattice/stream")]
    LatticeStream,
    /// Ruling-line ("lattice") flavor of the flavored pass
    #[serde(rename = "camelot-lattice")]
    FlavorLattice,
    /// Text-alignment ("stream") flavor of the flavored pass
    #[serde(rename = "camelot-stream")]
    FlavorStream,
    /// Page-by-page pass; the only one that knows the page
    #[serde(rename = "pdfplumber")]
    PerPage,
}

impl ExtractionMethod {
    /// The provenance tag as it appears in serialized output.
    pub fn tag(&self) -> &'static str {
        match self {
            ExtractionMethod::LatticeStream => "tabula-lattice/stream",
            ExtractionMethod::FlavorLattice => "camelot-lattice",
            ExtractionMethod::FlavorStream => "camelot-stream",
            ExtractionMethod::PerPage => "pdfplumber",
        }
    }
}

impl std::fmt::Display for ExtractionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// Provenance of a table record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableMetadata {
    /// Pass that produced the table
    pub extraction_method: ExtractionMethod,

    /// 1-based page of origin, known only for [`ExtractionMethod::PerPage`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
}

/// A detected table with its provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRecord {
    /// Table payload
    pub data: TableData,

    /// Provenance
    pub metadata: TableMetadata,
}

impl TableRecord {
    /// Create a record without page information.
    pub fn new(data: TableData, method: ExtractionMethod) -> Self {
        Self {
            data,
            metadata: TableMetadata {
                extraction_method: method,
                page: None,
            },
        }
    }

    /// Create a record that knows its page of origin.
    pub fn on_page(data: TableData, method: ExtractionMethod, page: u32) -> Self {
        Self {
            data,
            metadata: TableMetadata {
                extraction_method: method,
                page: Some(page),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_from_grid_numeric_labels() {
        let data = TableData::from_grid(grid(&[&["a", "b"], &["c"]]));
        assert_eq!(data.columns, vec!["0", "1"]);
        assert_eq!(data.index, vec![0, 1]);
        assert_eq!(data.to_grid(), grid(&[&["a", "b"], &["c", ""]]));
        assert!(!data.is_empty());
    }

    #[test]
    fn test_from_grid_with_header() {
        let data = TableData::from_grid_with_header(grid(&[
            &["Name", "Age"],
            &["Alice", "30"],
            &["Bob", "25"],
        ]));
        assert_eq!(data.columns, vec!["Name", "Age"]);
        assert_eq!(data.row_count(), 2);
        assert_eq!(data.plain_text(), "Alice\t30\nBob\t25");
    }

    #[test]
    fn test_header_only_table_is_empty() {
        let data = TableData::from_grid_with_header(grid(&[&["Name", "Age"]]));
        assert!(data.is_empty());
        assert!(TableData::from_grid(Vec::new()).is_empty());
        assert!(TableData::from_grid(vec![Vec::new()]).is_empty());
    }

    #[test]
    fn test_split_serialization() {
        let record = TableRecord::on_page(
            TableData::from_grid(grid(&[&["x"]])),
            ExtractionMethod::PerPage,
            2,
        );
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["data"]["columns"][0], "0");
        assert_eq!(json["data"]["index"][0], 0);
        assert_eq!(json["data"]["data"][0][0], "x");
        assert_eq!(json["metadata"]["extraction_method"], "pdfplumber");
        assert_eq!(json["metadata"]["page"], 2);

        let record = TableRecord::new(record.data, ExtractionMethod::LatticeStream);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["metadata"]["extraction_method"], "tabula-lattice/stream");
        assert!(json["metadata"].get("page").is_none());
    }

    #[test]
    fn test_method_tags() {
        assert_eq!(ExtractionMethod::FlavorLattice.tag(), "camelot-lattice");
        assert_eq!(ExtractionMethod::FlavorStream.to_string(), "camelot-stream");
    }
}
