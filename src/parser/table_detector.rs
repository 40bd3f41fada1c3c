//! Stream-style table detection from text alignment.
//!
//! Spans are bucketed into rows by baseline, rows that start on shared X
//! edges form regions, and each region becomes a grid of cell strings.
//! Ruling lines are ignored.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};
use std::ops::Range;

use super::layout::TextSpan;

/// Width of the X buckets that vote for column edges.
const EDGE_BUCKET: f32 = 5.0;

/// How far a span may start from an edge and still count as aligned.
const EDGE_TOLERANCE: f32 = 5.0;

/// Spans may start this far left of a column edge and still belong to it.
const CELL_SLACK: f32 = 10.0;

/// A table found on a page.
#[derive(Debug, Clone)]
pub struct DetectedTable {
    /// Column start positions, ascending
    pub columns: Vec<f32>,
    /// Rows top to bottom, spans left to right
    pub rows: Vec<Vec<TextSpan>>,
    /// Rightmost span edge of the region
    pub right_edge: f32,
}

impl DetectedTable {
    /// Index of the column a span starting at `x` falls into.
    pub fn column_of(&self, x: f32) -> usize {
        let open_end = self.right_edge + 100.0;
        let within = (0..self.columns.len()).find(|&i| {
            let end = self.columns.get(i + 1).copied().unwrap_or(open_end);
            x >= self.columns[i] - CELL_SLACK && x < end - CELL_SLACK
        });

        within
            .or_else(|| {
                self.columns
                    .iter()
                    .enumerate()
                    .min_by(|(_, a), (_, b)| cmp_f32((x - **a).abs(), (x - **b).abs()))
                    .map(|(i, _)| i)
            })
            .unwrap_or(0)
    }

    /// Cell text as `rows × columns` strings; spans sharing a cell are
    /// joined with a space.
    pub fn to_grid(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|row| {
                let mut cells = vec![String::new(); self.columns.len()];
                for span in row {
                    if let Some(cell) = cells.get_mut(self.column_of(span.x)) {
                        if !cell.is_empty() {
                            cell.push(' ');
                        }
                        cell.push_str(span.text.trim());
                    }
                }
                cells
            })
            .collect()
    }
}

/// Table detector configuration.
#[derive(Debug, Clone)]
pub struct TableDetectorConfig {
    /// Minimum rows in a table
    pub min_rows: usize,
    /// Minimum columns in a table
    pub min_columns: usize,
    /// Regions with more columns are word-split prose, not tables
    pub max_columns: usize,
    /// Baseline tolerance for one row, as a fraction of the font size
    pub row_tolerance: f32,
    /// Share of a row's spans that must sit on column edges (0.0-1.0)
    pub min_alignment: f32,
    /// Minimum distance between two column edges (points)
    pub min_column_gap: f32,
}

impl Default for TableDetectorConfig {
    fn default() -> Self {
        Self {
            min_rows: 2,
            min_columns: 2,
            max_columns: 6,
            row_tolerance: 0.4,
            min_alignment: 0.3,
            min_column_gap: 15.0,
        }
    }
}

/// A row under construction: the baseline it was opened at and the indices
/// of its spans.
struct Row {
    baseline: f32,
    members: Vec<usize>,
}

/// Finds aligned tables in a page's spans.
#[derive(Debug, Clone, Default)]
pub struct TableDetector {
    config: TableDetectorConfig,
}

impl TableDetector {
    /// Create a detector with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a detector with custom settings.
    pub fn with_config(config: TableDetectorConfig) -> Self {
        Self { config }
    }

    /// Split `spans` into detected tables and the spans left over.
    pub fn detect(&self, spans: Vec<TextSpan>) -> (Vec<DetectedTable>, Vec<TextSpan>) {
        let config = &self.config;
        if spans.len() < config.min_rows * config.min_columns {
            return (Vec::new(), spans);
        }

        let rows = self.rows_of(&spans);
        let edges = self.column_edges(&spans, &rows);
        log::debug!(
            "TableDetector: {} spans, {} rows, edges at {:?}",
            spans.len(),
            rows.len(),
            edges
        );
        if rows.len() < config.min_rows || edges.len() < config.min_columns {
            return (Vec::new(), spans);
        }

        let mut claimed = vec![false; spans.len()];
        let mut tables = Vec::new();
        for region in self.regions(&spans, &rows, &edges) {
            let region_rows = &rows[region];
            // Each region gets its own edges
            let columns = self.column_edges(&spans, region_rows);
            if columns.len() < config.min_columns || columns.len() > config.max_columns {
                log::debug!("TableDetector: skipping region with {} columns", columns.len());
                continue;
            }
            if self.looks_like_list(&spans, region_rows, &columns) {
                log::debug!("TableDetector: skipping list-shaped region");
                continue;
            }

            for &i in region_rows.iter().flat_map(|row| &row.members) {
                claimed[i] = true;
            }
            tables.push(build_table(&spans, region_rows, columns));
        }

        let rest = spans
            .into_iter()
            .zip(claimed)
            .filter_map(|(span, used)| (!used).then_some(span))
            .collect();
        (tables, rest)
    }

    /// Grids of every table in `spans`.
    pub fn detect_grids(&self, spans: Vec<TextSpan>) -> Vec<Vec<Vec<String>>> {
        let (tables, _) = self.detect(spans);
        tables.iter().map(DetectedTable::to_grid).collect()
    }

    /// Rows top to bottom; a span joins the open row when its baseline is
    /// within tolerance of the row's first baseline.
    fn rows_of(&self, spans: &[TextSpan]) -> Vec<Row> {
        let mut order: Vec<usize> = (0..spans.len()).collect();
        order.sort_by(|&a, &b| {
            cmp_f32(spans[b].y, spans[a].y).then(cmp_f32(spans[a].x, spans[b].x))
        });

        let mut rows: Vec<Row> = Vec::new();
        for i in order {
            let span = &spans[i];
            let tolerance = span.font_size * self.config.row_tolerance;
            match rows.last_mut() {
                Some(row) if (span.y - row.baseline).abs() <= tolerance => row.members.push(i),
                _ => rows.push(Row {
                    baseline: span.y,
                    members: vec![i],
                }),
            }
        }
        rows
    }

    /// Column edges voted for by the left edges of spans.
    ///
    /// Rows with two or more spans vote once per bucket; when there are too
    /// few of them every span votes.
    fn column_edges(&self, spans: &[TextSpan], rows: &[Row]) -> Vec<f32> {
        let bucket = |i: usize| (spans[i].x / EDGE_BUCKET).round() as i32;
        let multi: Vec<&Row> = rows.iter().filter(|row| row.members.len() >= 2).collect();

        let mut votes: BTreeMap<i32, usize> = BTreeMap::new();
        let voters = if multi.len() >= self.config.min_rows {
            for row in &multi {
                let buckets: HashSet<i32> = row.members.iter().map(|&i| bucket(i)).collect();
                for b in buckets {
                    *votes.entry(b).or_default() += 1;
                }
            }
            multi.len()
        } else {
            for &i in rows.iter().flat_map(|row| &row.members) {
                *votes.entry(bucket(i)).or_default() += 1;
            }
            rows.len()
        };

        let quorum = ((voters as f32 * self.config.min_alignment) as usize).max(2);
        let mut edges: Vec<f32> = Vec::new();
        for (b, count) in votes {
            if count < quorum {
                continue;
            }
            let edge = b as f32 * EDGE_BUCKET;
            if edges
                .last()
                .map_or(true, |&last| edge - last >= self.config.min_column_gap)
            {
                edges.push(edge);
            }
        }
        edges
    }

    /// Runs of consecutive aligned rows, at least `min_rows` long.
    fn regions(&self, spans: &[TextSpan], rows: &[Row], edges: &[f32]) -> Vec<Range<usize>> {
        let mut regions = Vec::new();
        let mut start = None;
        for (i, row) in rows.iter().enumerate() {
            let aligned = alignment(spans, row, edges) >= self.config.min_alignment;
            match (aligned, start) {
                (true, None) => start = Some(i),
                (false, Some(s)) => {
                    regions.push(s..i);
                    start = None;
                }
                _ => {}
            }
        }
        if let Some(s) = start {
            regions.push(s..rows.len());
        }
        regions.retain(|r| r.len() >= self.config.min_rows);
        regions
    }

    /// Whether a region is really a bulleted or numbered list whose markers
    /// landed in their own spans.
    fn looks_like_list(&self, spans: &[TextSpan], rows: &[Row], columns: &[f32]) -> bool {
        if rows.is_empty() {
            return false;
        }

        let (mut bullets, mut numbers) = (0usize, 0usize);
        for row in rows {
            let first = row
                .members
                .iter()
                .map(|&i| &spans[i])
                .min_by(|a, b| cmp_f32(a.x, b.x));
            match first.map(|span| span.text.trim()) {
                Some(text) if is_bullet_marker(text) => bullets += 1,
                Some(text) if is_number_marker(text) => numbers += 1,
                _ => {}
            }
        }
        log::debug!(
            "TableDetector: {} bullet and {} number markers in {} rows",
            bullets,
            numbers,
            rows.len()
        );

        let rows = rows.len() as f32;
        // Numbered first columns are common in real tables; only two-column
        // regions are rejected for them
        bullets as f32 / rows >= 0.5
            || (columns.len() == 2 && (bullets + numbers) as f32 / rows >= 0.5)
    }
}

fn cmp_f32(a: f32, b: f32) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

/// Share of a row's spans that start on a column edge.
fn alignment(spans: &[TextSpan], row: &Row, edges: &[f32]) -> f32 {
    if row.members.is_empty() || edges.is_empty() {
        return 0.0;
    }
    let aligned = row
        .members
        .iter()
        .filter(|&&i| edges.iter().any(|e| (spans[i].x - e).abs() <= EDGE_TOLERANCE))
        .count();
    aligned as f32 / row.members.len() as f32
}

fn build_table(spans: &[TextSpan], rows: &[Row], columns: Vec<f32>) -> DetectedTable {
    let rows: Vec<Vec<TextSpan>> = rows
        .iter()
        .map(|row| {
            let mut cells: Vec<TextSpan> = row.members.iter().map(|&i| spans[i].clone()).collect();
            cells.sort_by(|a, b| cmp_f32(a.x, b.x));
            cells
        })
        .collect();
    let right_edge = rows
        .iter()
        .flatten()
        .map(TextSpan::right)
        .fold(f32::NEG_INFINITY, f32::max);

    DetectedTable {
        columns,
        rows,
        right_edge,
    }
}

/// Bullet glyphs that open list items.
pub(crate) fn is_bullet_marker(text: &str) -> bool {
    matches!(
        text.trim(),
        "-" | "–" | "—" | "•" | "·" | "*" | "○" | "▪" | "◦" | "▸" | "▹" | "►" | "■" | "●" | "※" | "□" | "◆" | "◇" | "▶" | "▷" | "☞" | "➤" | "➜"
    )
}

/// Enumerators such as `1.`, `12)`, `a.`, `B)` or a bare `3`.
pub(crate) fn is_number_marker(text: &str) -> bool {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    match compact.strip_suffix(['.', ')']) {
        Some(body) => {
            let mut chars = body.chars();
            match (chars.next(), chars.next()) {
                (None, _) => false,
                (Some(c), None) if c.is_alphabetic() => true,
                _ => body.chars().all(|c| c.is_ascii_digit()),
            }
        }
        None => compact.parse::<u32>().is_ok(),
    }
}

pub(crate) fn is_list_marker(text: &str) -> bool {
    is_bullet_marker(text) || is_number_marker(text)
}
