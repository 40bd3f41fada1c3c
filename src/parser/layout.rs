//! Layout analysis for PDF pages.
//!
//! Walks a decoded content stream once, tracking the graphics state (CTM) and
//! the text matrices, and reports positioned text spans plus the places where
//! XObjects are drawn. Spans are then grouped into lines and column-aware
//! blocks with heading detection.

use std::cmp::{Ordering, Reverse};
use std::collections::HashMap;
use std::ops::Range;

use super::backend::{get_number_from_value, ContentOp, PdfValue};

/// Average glyph advance as a fraction of the font size, used when no
/// glyph widths are available.
const AVG_GLYPH_ADVANCE: f32 = 0.5;

/// Default text leading before any `TL`/`TD` operator.
const DEFAULT_LEADING: f32 = 12.0;

/// A text span with position and style information.
///
/// Coordinates are PDF user space (origin bottom-left).
#[derive(Debug, Clone)]
pub struct TextSpan {
    /// The text content
    pub text: String,
    /// X position (left edge)
    pub x: f32,
    /// Y position (baseline)
    pub y: f32,
    /// Estimated width of the text
    pub width: f32,
    /// Font size in points
    pub font_size: f32,
    /// Font name (e.g., "Helvetica-Bold")
    pub font_name: String,
    /// Whether the font appears to be bold
    pub is_bold: bool,
    /// Whether the font appears to be italic
    pub is_italic: bool,
}

impl TextSpan {
    /// Create a new text span with a width estimated from its length.
    pub fn new(text: String, x: f32, y: f32, font_size: f32, font_name: String) -> Self {
        let lower = font_name.to_lowercase();
        let is_bold = lower.contains("bold") || lower.contains("black") || lower.contains("heavy");
        let is_italic = lower.contains("italic") || lower.contains("oblique");
        let width = text.chars().count() as f32 * font_size * AVG_GLYPH_ADVANCE;

        Self {
            text,
            x,
            y,
            width,
            font_size,
            font_name,
            is_bold,
            is_italic,
        }
    }

    /// Get the bottom Y coordinate (approximate, based on font size).
    pub fn bottom(&self) -> f32 {
        self.y - self.font_size * 0.2 // Approximate descender
    }

    /// Get the top Y coordinate (approximate, based on font size).
    pub fn top(&self) -> f32 {
        self.y + self.font_size * 0.8 // Approximate ascender
    }

    /// Right edge.
    pub fn right(&self) -> f32 {
        self.x + self.width
    }
}

/// Where an XObject was drawn on the page.
#[derive(Debug, Clone, PartialEq)]
pub struct XObjectPlacement {
    /// Resource name used with `Do`
    pub name: Vec<u8>,
    /// Bounds `(left, bottom, right, top)` in user space
    pub bounds: (f32, f32, f32, f32),
}

/// Everything the content walker found on one page.
#[derive(Debug, Clone, Default)]
pub struct PageContent {
    /// Text spans in content-stream order
    pub spans: Vec<TextSpan>,
    /// XObject placements in content-stream order
    pub placements: Vec<XObjectPlacement>,
}

impl PageContent {
    /// First placement of the named XObject.
    pub fn placement_of(&self, name: &[u8]) -> Option<&XObjectPlacement> {
        self.placements.iter().find(|p| p.name == name)
    }
}

/// Font lookup used while walking a content stream.
pub trait FontResolver {
    /// Base font name for a font resource (e.g. `F1` → `Helvetica-Bold`).
    fn base_font(&self, resource: &[u8]) -> String;

    /// Decode a string operand shown with the given font resource.
    fn decode(&self, resource: &[u8], bytes: &[u8]) -> String;
}

/// Share of the font size by which spans may differ in baseline and still
/// form one line.
const LINE_TOLERANCE: f32 = 0.3;

/// Largest page side PDF allows (200 inches), in points.
const MAX_PAGE_EXTENT: f32 = 14_400.0;

/// Lines this many points above the body size are headings.
const HEADING_MARGIN: f32 = 1.5;

/// Spans sharing a baseline, left to right.
#[derive(Debug, Clone)]
pub struct TextLine {
    /// Spans sorted by X
    pub spans: Vec<TextSpan>,
    /// Baseline of the leftmost span
    pub baseline: f32,
    /// Left edge
    pub left: f32,
    /// Font size weighted by text length
    pub font_size: f32,
    /// Whether the line's size stands out from the body text
    pub is_heading: bool,
}

impl TextLine {
    /// Build a line from its spans; `None` when there are none.
    pub fn from_spans(mut spans: Vec<TextSpan>) -> Option<Self> {
        spans.sort_by(|a, b| cmp_f32(a.x, b.x));
        let first = spans.first()?;
        let (baseline, left, first_size) = (first.y, first.x, first.font_size);

        let chars: usize = spans.iter().map(|s| s.text.len()).sum();
        let font_size = if chars == 0 {
            first_size
        } else {
            spans
                .iter()
                .map(|s| s.font_size * s.text.len() as f32)
                .sum::<f32>()
                / chars as f32
        };

        Some(Self {
            spans,
            baseline,
            left,
            font_size,
            is_heading: false,
        })
    }

    /// Text of the line, with a space wherever neighbouring spans are
    /// visibly apart.
    pub fn text(&self) -> String {
        let mut out = String::new();
        let mut prev: Option<&TextSpan> = None;
        for span in &self.spans {
            if prev.is_some_and(|prev| needs_space(prev, span)) {
                out.push(' ');
            }
            out.push_str(&span.text);
            prev = Some(span);
        }
        out
    }
}

/// No space goes between two CJK glyphs or next to one already present.
fn needs_space(prev: &TextSpan, next: &TextSpan) -> bool {
    let is_space = |c: char| c == ' ' || c == '\u{00A0}';
    if prev.text.ends_with(is_space) || next.text.starts_with(is_space) {
        return false;
    }

    let chars = next.text.chars().count();
    let glyph = if chars > 0 && next.width > 0.0 {
        next.width / chars as f32
    } else {
        next.font_size * AVG_GLYPH_ADVANCE
    };
    if next.x - prev.right() <= glyph * 0.2 {
        return false;
    }

    let spaceless = |c: Option<char>| c.is_some_and(is_spaceless_script_char);
    !(spaceless(prev.text.chars().last()) && spaceless(next.text.chars().next()))
}

/// Type of layout block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockType {
    Heading,
    Paragraph,
}

/// Consecutive lines read as one unit.
#[derive(Debug, Clone)]
pub struct LayoutBlock {
    pub lines: Vec<TextLine>,
    pub block_type: BlockType,
}

impl LayoutBlock {
    fn from_lines(lines: Vec<TextLine>) -> Self {
        let block_type = if lines.iter().any(|l| l.is_heading) {
            BlockType::Heading
        } else {
            BlockType::Paragraph
        };
        Self { lines, block_type }
    }

    /// Line texts joined with spaces.
    pub fn text(&self) -> String {
        self.lines
            .iter()
            .map(TextLine::text)
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn is_empty(&self) -> bool {
        self.text().trim().is_empty()
    }

    /// Bounds `(left, bottom, right, top)` in user space.
    pub fn bounds(&self) -> Option<(f32, f32, f32, f32)> {
        let mut spans = self.lines.iter().flat_map(|l| l.spans.iter());
        let first = spans.next()?;
        let init = (first.x, first.bottom(), first.right(), first.top());
        Some(spans.fold(init, |(l, b, r, t), s| {
            (l.min(s.x), b.min(s.bottom()), r.max(s.right()), t.max(s.top()))
        }))
    }
}

/// Font size distribution of a page, in tenths of a point.
#[derive(Debug, Clone, Default)]
pub struct FontProfile {
    histogram: HashMap<i32, usize>,
}

impl FontProfile {
    pub fn observe(&mut self, size: f32) {
        *self.histogram.entry((size * 10.0) as i32).or_default() += 1;
    }

    /// Most common size; the smaller one on ties, 12pt when nothing was seen.
    pub fn body_size(&self) -> f32 {
        self.histogram
            .iter()
            .max_by_key(|(size, count)| (**count, Reverse(**size)))
            .map_or(12.0, |(size, _)| *size as f32 / 10.0)
    }

    /// Smallest font size treated as a heading.
    pub fn heading_threshold(&self) -> f32 {
        self.body_size() + HEADING_MARGIN
    }
}

/// Groups positioned spans into lines and blocks.
#[derive(Debug, Default)]
pub struct LayoutAnalyzer {
    fonts: FontProfile,
}

impl LayoutAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Font sizes seen so far.
    pub fn fonts(&self) -> &FontProfile {
        &self.fonts
    }

    /// Turn a page's spans into blocks in reading order: column by column,
    /// top to bottom within each.
    pub fn analyze(&mut self, spans: Vec<TextSpan>) -> Vec<LayoutBlock> {
        for span in &spans {
            self.fonts.observe(span.font_size);
        }
        let threshold = self.fonts.heading_threshold();

        let mut lines = match find_gutter(&spans) {
            Some(gutter) => {
                let (left, right): (Vec<_>, Vec<_>) =
                    spans.into_iter().partition(|s| s.x <= gutter);
                let mut lines = lines_of(left);
                lines.extend(lines_of(right));
                lines
            }
            None => lines_of(spans),
        };
        for line in &mut lines {
            line.is_heading = line.font_size >= threshold;
        }
        blocks_of(lines)
    }
}

fn cmp_f32(a: f32, b: f32) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

/// X of the gutter between two text columns, if the page has one.
///
/// The text area is cut into thin vertical slices; the widest empty run in
/// its middle 70% is the gutter candidate, the one nearest the center on
/// ties. Both sides must be wide enough and hold a fair share of the spans.
fn find_gutter(spans: &[TextSpan]) -> Option<f32> {
    const SLICE: f32 = 3.0;

    let left = spans.iter().map(|s| s.x).fold(f32::INFINITY, f32::min);
    let right = spans.iter().map(TextSpan::right).fold(f32::NEG_INFINITY, f32::max);
    let width = right - left;
    // Text spread wider than the largest PDF page is not a column layout
    if !(250.0..=MAX_PAGE_EXTENT).contains(&width) {
        return None;
    }

    let slices = (width / SLICE) as usize + 1;
    let slice_of = |x: f32| (((x - left) / SLICE).clamp(0.0, (slices - 1) as f32)) as usize;
    let mut occupied = vec![false; slices];
    for span in spans {
        let (from, to) = (slice_of(span.x), slice_of(span.right()));
        for slot in occupied.iter_mut().take(to + 1).skip(from) {
            *slot = true;
        }
    }

    let (lo, hi) = (slices * 15 / 100, slices * 85 / 100);
    let center = slices as f32 / 2.0;
    let off_center = |r: &Range<usize>| ((r.start + r.end) as f32 / 2.0 - center).abs();
    let mut best: Option<Range<usize>> = None;
    let mut run_start = None;
    for i in lo..=hi {
        let empty = i < hi && !occupied[i];
        match (empty, run_start) {
            (true, None) => run_start = Some(i),
            (false, Some(start)) => {
                let run = start..i;
                let wins = best.as_ref().map_or(true, |b| {
                    run.len() > b.len() || (run.len() == b.len() && off_center(&run) < off_center(b))
                });
                if wins {
                    best = Some(run);
                }
                run_start = None;
            }
            _ => {}
        }
    }

    let run = best?;
    let gap = run.len() as f32 * SLICE;
    let gutter = left + (run.start as f32 + run.len() as f32 / 2.0) * SLICE;
    log::debug!("Widest gutter {:.1}pt at x={:.1} over {:.1}pt of text", gap, gutter, width);
    if gap < 12.0 || gutter - left < 80.0 || right - gutter < 80.0 {
        return None;
    }

    let on_left = spans.iter().filter(|s| s.x + s.width / 2.0 < gutter).count();
    let quota = (spans.len() / 10).max(2);
    if on_left < quota || spans.len() - on_left < quota {
        log::debug!("Columns too imbalanced ({} left of {}), reading as one", on_left, spans.len());
        return None;
    }
    Some(gutter)
}

/// Baseline grouping within one column, top to bottom.
fn lines_of(mut spans: Vec<TextSpan>) -> Vec<TextLine> {
    // PDF Y grows upward
    spans.sort_by(|a, b| cmp_f32(b.y, a.y).then(cmp_f32(a.x, b.x)));

    let mut groups: Vec<(f32, Vec<TextSpan>)> = Vec::new();
    for span in spans {
        let tolerance = span.font_size * LINE_TOLERANCE;
        match groups.last_mut() {
            Some((baseline, members)) if (span.y - *baseline).abs() <= tolerance => {
                members.push(span)
            }
            _ => groups.push((span.y, vec![span])),
        }
    }

    groups
        .into_iter()
        .filter_map(|(_, members)| TextLine::from_spans(members))
        .collect()
}

fn blocks_of(lines: Vec<TextLine>) -> Vec<LayoutBlock> {
    let spacing = mean_line_spacing(&lines);
    let mut blocks = Vec::new();
    let mut current: Vec<TextLine> = Vec::new();

    for line in lines {
        if current.last().is_some_and(|prev| breaks_block(prev, &line, spacing)) {
            blocks.push(LayoutBlock::from_lines(std::mem::take(&mut current)));
        }
        current.push(line);
    }
    if !current.is_empty() {
        blocks.push(LayoutBlock::from_lines(current));
    }
    blocks
}

fn mean_line_spacing(lines: &[TextLine]) -> f32 {
    let gaps: Vec<f32> = lines
        .windows(2)
        .map(|w| (w[0].baseline - w[1].baseline).abs())
        .filter(|gap| *gap > 0.1)
        .collect();
    if gaps.is_empty() {
        DEFAULT_LEADING
    } else {
        gaps.iter().sum::<f32>() / gaps.len() as f32
    }
}

fn breaks_block(prev: &TextLine, line: &TextLine, spacing: f32) -> bool {
    prev.is_heading
        || line.is_heading
        // Moving up the page starts the next column
        || line.baseline > prev.baseline + 0.1
        || prev.baseline - line.baseline > spacing * 1.5
        || (prev.font_size - line.font_size).abs() > 1.0
        || (prev.left - line.left).abs() > 20.0
}

/// A 2D affine transform `[a b c d e f]` as used by PDF.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32,
    f: f32,
}

impl Default for Matrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Matrix {
    /// Identity transform.
    pub const IDENTITY: Matrix = Matrix {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    /// Build from the six PDF operands.
    pub fn new(a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) -> Self {
        Self { a, b, c, d, e, f }
    }

    fn translation(tx: f32, ty: f32) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    /// `self × other`: apply `self` first, then `other`.
    pub fn then(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    /// Transform a point.
    pub fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        (
            x * self.a + y * self.c + self.e,
            x * self.b + y * self.d + self.f,
        )
    }

    fn horizontal_scale(&self) -> f32 {
        (self.a * self.a + self.b * self.b).sqrt()
    }

    fn vertical_scale(&self) -> f32 {
        (self.c * self.c + self.d * self.d).sqrt()
    }

    /// Bounds of the unit square under this transform.
    fn unit_square_bounds(&self) -> (f32, f32, f32, f32) {
        let corners = [
            self.apply(0.0, 0.0),
            self.apply(1.0, 0.0),
            self.apply(0.0, 1.0),
            self.apply(1.0, 1.0),
        ];
        corners.iter().fold(
            (f32::INFINITY, f32::INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY),
            |(l, b, r, t), &(x, y)| (l.min(x), b.min(y), r.max(x), t.max(y)),
        )
    }
}

/// Text object state: text matrix, line matrix and leading.
#[derive(Debug, Clone)]
struct TextState {
    matrix: Matrix,
    line: Matrix,
    leading: f32,
    font_resource: Vec<u8>,
    font_name: String,
    font_size: f32,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            matrix: Matrix::IDENTITY,
            line: Matrix::IDENTITY,
            leading: DEFAULT_LEADING,
            font_resource: Vec::new(),
            font_name: String::new(),
            font_size: 12.0,
        }
    }
}

impl TextState {
    fn begin(&mut self) {
        self.matrix = Matrix::IDENTITY;
        self.line = Matrix::IDENTITY;
    }

    fn set_matrix(&mut self, m: Matrix) {
        self.matrix = m;
        self.line = m;
    }

    /// `Td`: move to the start of the next line, offset from the current one.
    fn move_line(&mut self, tx: f32, ty: f32) {
        self.line = Matrix::translation(tx, ty).then(&self.line);
        self.matrix = self.line;
    }

    /// `T*`
    fn next_line(&mut self) {
        self.move_line(0.0, -self.leading);
    }

    /// Advance the text matrix after showing glyphs.
    fn advance(&mut self, tx: f32) {
        self.matrix = Matrix::translation(tx, 0.0).then(&self.matrix);
    }
}

/// Walk decoded content operations and collect spans and XObject placements.
pub fn walk_content(ops: &[ContentOp], fonts: &dyn FontResolver) -> PageContent {
    let mut content = PageContent::default();
    let mut ctm = Matrix::IDENTITY;
    let mut ctm_stack: Vec<Matrix> = Vec::new();
    let mut text = TextState::default();
    let mut in_text_block = false;

    for op in ops {
        let num = |i: usize, default: f32| {
            op.operands
                .get(i)
                .and_then(get_number_from_value)
                .unwrap_or(default)
        };

        match op.operator.as_str() {
            "q" => ctm_stack.push(ctm),
            "Q" => {
                if let Some(saved) = ctm_stack.pop() {
                    ctm = saved;
                }
            }
            "cm" if op.operands.len() >= 6 => {
                let m = Matrix::new(
                    num(0, 1.0),
                    num(1, 0.0),
                    num(2, 0.0),
                    num(3, 1.0),
                    num(4, 0.0),
                    num(5, 0.0),
                );
                ctm = m.then(&ctm);
            }
            "Do" => {
                if let Some(PdfValue::Name(name)) = op.operands.first() {
                    content.placements.push(XObjectPlacement {
                        name: name.clone(),
                        bounds: ctm.unit_square_bounds(),
                    });
                }
            }
            "BT" => {
                in_text_block = true;
                text.begin();
            }
            "ET" => in_text_block = false,
            "Tf" if op.operands.len() >= 2 => {
                if let Some(PdfValue::Name(resource)) = op.operands.first() {
                    text.font_name = fonts.base_font(resource);
                    text.font_resource = resource.clone();
                }
                text.font_size = num(1, 12.0);
            }
            "TL" => text.leading = num(0, DEFAULT_LEADING),
            "Td" if op.operands.len() >= 2 => text.move_line(num(0, 0.0), num(1, 0.0)),
            "TD" if op.operands.len() >= 2 => {
                let ty = num(1, 0.0);
                text.leading = -ty;
                text.move_line(num(0, 0.0), ty);
            }
            "Tm" if op.operands.len() >= 6 => text.set_matrix(Matrix::new(
                num(0, 1.0),
                num(1, 0.0),
                num(2, 0.0),
                num(3, 1.0),
                num(4, 0.0),
                num(5, 0.0),
            )),
            "T*" => text.next_line(),
            "Tj" if in_text_block => {
                if let Some(PdfValue::Str(bytes)) = op.operands.first() {
                    let shown = fonts.decode(&text.font_resource, bytes);
                    show_text(&mut content, &mut text, &ctm, shown, 0.0);
                }
            }
            "TJ" if in_text_block => {
                if let Some(PdfValue::Array(items)) = op.operands.first() {
                    let (shown, adjust) = decode_tj_array(items, &text, fonts);
                    show_text(&mut content, &mut text, &ctm, shown, adjust);
                }
            }
            "'" | "\"" => {
                text.next_line();
                if in_text_block {
                    let text_idx = if op.operator == "\"" { 2 } else { 0 };
                    if let Some(PdfValue::Str(bytes)) = op.operands.get(text_idx) {
                        let shown = fonts.decode(&text.font_resource, bytes);
                        show_text(&mut content, &mut text, &ctm, shown, 0.0);
                    }
                }
            }
            _ => {}
        }
    }

    content
}

/// Decode a `TJ` array, inserting spaces for large negative adjustments.
///
/// Returns the text and the total positioning adjustment in text-space units.
fn decode_tj_array(items: &[PdfValue], text: &TextState, fonts: &dyn FontResolver) -> (String, f32) {
    // 200 thousandths of an em reads as a word break in most fonts
    let space_threshold = 200.0;
    let mut combined = String::new();
    let mut adjust = 0.0;

    for item in items {
        match item {
            PdfValue::Str(bytes) => combined.push_str(&fonts.decode(&text.font_resource, bytes)),
            PdfValue::Integer(_) | PdfValue::Real(_) => {
                let n = get_number_from_value(item).unwrap_or(0.0);
                adjust -= n / 1000.0 * text.font_size;
                if -n > space_threshold
                    && !combined.is_empty()
                    && !combined.ends_with(' ')
                    && !combined.ends_with('\u{00A0}')
                {
                    if let Some(c) = combined.chars().last() {
                        if !is_spaceless_script_char(c) {
                            combined.push(' ');
                        }
                    }
                }
            }
            _ => {}
        }
    }

    (combined, adjust)
}

fn show_text(content: &mut PageContent, text: &mut TextState, ctm: &Matrix, shown: String, adjust: f32) {
    let glyphs = shown.chars().count() as f32;
    let advance = glyphs * text.font_size * AVG_GLYPH_ADVANCE + adjust;

    if !shown.trim().is_empty() {
        let rendering = text.matrix.then(ctm);
        let (x, y) = rendering.apply(0.0, 0.0);
        let effective_size = text.font_size * rendering.vertical_scale();
        let mut span = TextSpan::new(shown, x, y, effective_size, text.font_name.clone());
        span.width = advance.max(0.0) * rendering.horizontal_scale();
        content.spans.push(span);
    }

    text.advance(advance);
}

/// Check if character is from a script that doesn't use word spaces.
///
/// Chinese and Japanese don't use spaces between words, but Korean does.
pub(crate) fn is_spaceless_script_char(c: char) -> bool {
    let code = c as u32;

    // CJK Unified Ideographs
    (0x4E00..=0x9FFF).contains(&code)
    // Extension A
    || (0x3400..=0x4DBF).contains(&code)
    // Extensions B-F
    || (0x20000..=0x2A6DF).contains(&code)
    || (0x2A700..=0x2B73F).contains(&code)
    || (0x2B740..=0x2B81F).contains(&code)
    || (0x2B820..=0x2CEAF).contains(&code)
    || (0x2CEB0..=0x2EBEF).contains(&code)
    // Hiragana
    || (0x3040..=0x309F).contains(&code)
    // Katakana
    || (0x30A0..=0x30FF).contains(&code)
    // CJK Symbols and Punctuation
    || (0x3000..=0x303F).contains(&code)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct PlainFonts;

    impl FontResolver for PlainFonts {
        fn base_font(&self, resource: &[u8]) -> String {
            match resource {
                b"F2" => "Helvetica-Bold".to_string(),
                _ => "Helvetica".to_string(),
            }
        }

        fn decode(&self, _resource: &[u8], bytes: &[u8]) -> String {
            String::from_utf8_lossy(bytes).to_string()
        }
    }

    fn op(operator: &str, operands: Vec<PdfValue>) -> ContentOp {
        ContentOp {
            operator: operator.to_string(),
            operands,
        }
    }

    fn int(i: i64) -> PdfValue {
        PdfValue::Integer(i)
    }

    fn s(text: &str) -> PdfValue {
        PdfValue::Str(text.as_bytes().to_vec())
    }

    fn name(n: &str) -> PdfValue {
        PdfValue::Name(n.as_bytes().to_vec())
    }

    #[test]
    fn test_font_profile() {
        let mut fonts = FontProfile::default();
        for (size, n) in [(12.0, 100), (18.0, 5), (24.0, 3)] {
            for _ in 0..n {
                fonts.observe(size);
            }
        }

        assert!((fonts.body_size() - 12.0).abs() < 0.1);
        assert_eq!(fonts.heading_threshold(), 13.5);
        assert_eq!(FontProfile::default().body_size(), 12.0);
    }

    #[test]
    fn test_text_span_style_detection() {
        let span = TextSpan::new("Test".into(), 0.0, 0.0, 12.0, "Helvetica-Bold".into());
        assert!(span.is_bold);
        assert!(!span.is_italic);
        assert_eq!(span.width, 24.0);

        let span = TextSpan::new("Test".into(), 0.0, 0.0, 12.0, "Helvetica-Oblique".into());
        assert!(!span.is_bold);
        assert!(span.is_italic);
    }

    #[test]
    fn test_two_columns_read_one_after_the_other() {
        let mut spans = Vec::new();
        for i in 0..6 {
            let y = 700.0 - i as f32 * 14.0;
            spans.push(TextSpan::new(format!("left column line {}", i), 72.0, y, 10.0, "Helvetica".into()));
            spans.push(TextSpan::new(format!("right column line {}", i), 320.0, y, 10.0, "Helvetica".into()));
        }

        let blocks = LayoutAnalyzer::new().analyze(spans);
        let texts: Vec<String> = blocks.iter().map(LayoutBlock::text).collect();
        assert_eq!(texts.len(), 2);
        assert!(texts[0].starts_with("left column line 0 left column line 1"));
        assert!(texts[1].starts_with("right column line 0"));
    }

    #[test]
    fn test_far_off_span_skips_gutter_search() {
        let spans = vec![
            TextSpan::new("Hello".into(), 10.0, 700.0, 12.0, "Helvetica".into()),
            TextSpan::new("far".into(), 1e12, 650.0, 12.0, "Helvetica".into()),
        ];
        assert!(find_gutter(&spans).is_none());

        let blocks = LayoutAnalyzer::new().analyze(spans);
        let text: Vec<String> = blocks.iter().map(LayoutBlock::text).collect();
        assert!(text.iter().any(|t| t.contains("Hello")));
        assert!(text.iter().any(|t| t.contains("far")));
    }

    #[test]
    fn test_line_text_spacing() {
        let line = TextLine::from_spans(vec![
            TextSpan::new("world".into(), 40.0, 0.0, 10.0, "Helvetica".into()),
            TextSpan::new("Hello".into(), 10.0, 0.0, 10.0, "Helvetica".into()),
            TextSpan::new("!".into(), 65.0, 0.0, 10.0, "Helvetica".into()),
        ])
        .unwrap();
        assert_eq!(line.text(), "Hello world!");
        assert!(TextLine::from_spans(Vec::new()).is_none());
    }

    #[test]
    fn test_walk_positions_with_ctm_and_leading() {
        let ops = vec![
            op("q", vec![]),
            op("cm", vec![int(2), int(0), int(0), int(2), int(10), int(20)]),
            op("BT", vec![]),
            op("Tf", vec![name("F1"), int(10)]),
            op("TL", vec![int(15)]),
            op("Td", vec![int(5), int(100)]),
            op("Tj", vec![s("Hello")]),
            op("T*", vec![]),
            op("Tj", vec![s("World")]),
            op("ET", vec![]),
            op("Q", vec![]),
        ];
        let content = walk_content(&ops, &PlainFonts);
        assert_eq!(content.spans.len(), 2);

        let first = &content.spans[0];
        assert_eq!((first.x, first.y), (20.0, 220.0));
        assert_eq!(first.font_size, 20.0);
        assert_eq!(first.font_name, "Helvetica");
        // 5 glyphs * 10pt * 0.5, scaled by 2
        assert_eq!(first.width, 50.0);

        let second = &content.spans[1];
        assert_eq!((second.x, second.y), (20.0, 190.0));
    }

    #[test]
    fn test_consecutive_shows_advance() {
        let ops = vec![
            op("BT", vec![]),
            op("Tf", vec![name("F2"), int(10)]),
            op("Td", vec![int(100), int(700)]),
            op("Tj", vec![s("ab")]),
            op("Tj", vec![s("cd")]),
            op("ET", vec![]),
        ];
        let content = walk_content(&ops, &PlainFonts);
        assert_eq!(content.spans[0].x, 100.0);
        assert_eq!(content.spans[1].x, 110.0);
        assert!(content.spans[1].is_bold);
    }

    #[test]
    fn test_tj_array_inserts_word_space() {
        let ops = vec![
            op("BT", vec![]),
            op("Tf", vec![name("F1"), int(12)]),
            op(
                "TJ",
                vec![PdfValue::Array(vec![s("Hello"), int(-300), s("World"), int(-50), s("!")])],
            ),
            op("ET", vec![]),
        ];
        let content = walk_content(&ops, &PlainFonts);
        assert_eq!(content.spans[0].text, "Hello World!");
    }

    #[test]
    fn test_image_placement_bounds() {
        let ops = vec![
            op("q", vec![]),
            op("cm", vec![int(200), int(0), int(0), int(100), int(50), int(600)]),
            op("Do", vec![name("Im0")]),
            op("Q", vec![]),
            op("Do", vec![name("Im1")]),
        ];
        let content = walk_content(&ops, &PlainFonts);
        assert_eq!(
            content.placement_of(b"Im0").map(|p| p.bounds),
            Some((50.0, 600.0, 250.0, 700.0))
        );
        assert_eq!(
            content.placement_of(b"Im1").map(|p| p.bounds),
            Some((0.0, 0.0, 1.0, 1.0))
        );
        assert!(content.placement_of(b"Im2").is_none());
    }

    #[test]
    fn test_analyze_splits_heading_and_paragraph() {
        let mut spans = vec![TextSpan::new(
            "Introduction".into(),
            72.0,
            720.0,
            24.0,
            "Helvetica-Bold".into(),
        )];
        for i in 0..4 {
            spans.push(TextSpan::new(
                format!("body line {}", i),
                72.0,
                690.0 - i as f32 * 14.0,
                12.0,
                "Helvetica".into(),
            ));
        }

        let mut analyzer = LayoutAnalyzer::new();
        let blocks = analyzer.analyze(spans);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].block_type, BlockType::Heading);
        assert_eq!(blocks[0].text(), "Introduction");
        assert_eq!(blocks[1].block_type, BlockType::Paragraph);
        assert_eq!(blocks[1].lines.len(), 4);

        let (left, bottom, right, top) = blocks[1].bounds().unwrap();
        assert_eq!(left, 72.0);
        assert!(top > 690.0 && bottom < 648.0);
        assert!(right > left);
    }
}
