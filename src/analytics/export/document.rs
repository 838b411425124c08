//! Paginated A4 report document
//!
//! Layout produces a [`PdfDocument`] page model in points with a top-left
//! origin; [`PdfDocument::to_bytes`] serializes it as PDF 1.4 using the
//! built-in Helvetica faces, so no fonts are embedded.

use super::{ExportContext, ExportFormat, ReportEncoder};
use crate::analytics::tabular::TabularModel;
use crate::core::Result;
use chrono::{DateTime, Utc};
use tracing::debug;

const MM: f64 = 72.0 / 25.4;

pub const PAGE_WIDTH: f64 = 595.28;
pub const PAGE_HEIGHT: f64 = 841.89;

const MARGIN: f64 = 14.0 * MM;
const HEADER_BAND: f64 = 38.0 * MM;
const ACCENT_HEIGHT: f64 = 2.0 * MM;
const TABLE_TOP: f64 = 46.0 * MM;
const FOOTER_BAND: f64 = 16.0 * MM;
const TABLE_BOTTOM: f64 = PAGE_HEIGHT - FOOTER_BAND - 4.0 * MM;

const BODY_SIZE: f64 = 9.0;
const HEAD_SIZE: f64 = 9.5;
const FOOTER_SIZE: f64 = 8.0;
const CELL_PADDING: f64 = 2.5 * MM;
const GRID_WIDTH: f64 = 0.25 * MM;
const RULE_WIDTH: f64 = 0.2 * MM;
const LINE_HEIGHT: f64 = 1.15;

/// 8-bit RGB colour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

const BRAND: Rgb = Rgb(79, 70, 229);
const ACCENT: Rgb = Rgb(245, 158, 11);
const GRID: Rgb = Rgb(229, 231, 235);
const STRIPE: Rgb = Rgb(248, 247, 255);
const BODY_TEXT: Rgb = Rgb(30, 30, 47);
const FOOTER_FILL: Rgb = Rgb(249, 250, 251);
const FOOTER_TEXT: Rgb = Rgb(107, 114, 128);
const WHITE: Rgb = Rgb(255, 255, 255);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Regular,
    Bold,
}

// Advance widths for ' '..='~' in 1/1000 em
#[rustfmt::skip]
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

impl Font {
    fn resource(&self) -> &'static str {
        match self {
            Font::Regular => "F1",
            Font::Bold => "F2",
        }
    }

    fn base_font(&self) -> &'static str {
        match self {
            Font::Regular => "Helvetica",
            Font::Bold => "Helvetica-Bold",
        }
    }

    fn advance(&self, ch: char) -> u16 {
        let table = match self {
            Font::Regular => &HELVETICA,
            Font::Bold => &HELVETICA_BOLD,
        };
        match ch {
            ' '..='~' => table[ch as usize - 32],
            '\u{2014}' | '\u{2026}' | '\u{2030}' => 1000,
            '\u{2022}' => 350,
            '\u{2018}' | '\u{2019}' => match self {
                Font::Regular => 222,
                Font::Bold => 278,
            },
            _ => 556,
        }
    }

    /// Rendered width of `text` in points
    pub fn width(&self, text: &str, size: f64) -> f64 {
        let units: u32 = text.chars().map(|ch| u32::from(self.advance(ch))).sum();
        f64::from(units) * size / 1000.0
    }
}

/// One drawing instruction; `y` grows downward and is a baseline for text
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    FillRect {
        x: f64,
        y: f64,
        w: f64,
        h: f64,
        color: Rgb,
    },
    StrokeRect {
        x: f64,
        y: f64,
        w: f64,
        h: f64,
        color: Rgb,
        width: f64,
    },
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        color: Rgb,
        width: f64,
    },
    Text {
        x: f64,
        y: f64,
        size: f64,
        font: Font,
        color: Rgb,
        text: String,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub ops: Vec<DrawOp>,
}

impl Page {
    /// Every text run on the page, in drawing order
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    fn text(&mut self, x: f64, y: f64, size: f64, font: Font, color: Rgb, text: impl Into<String>) {
        self.ops.push(DrawOp::Text {
            x,
            y,
            size,
            font,
            color,
            text: text.into(),
        });
    }

    fn text_right(&mut self, right: f64, y: f64, size: f64, font: Font, color: Rgb, text: &str) {
        let x = right - font.width(text, size);
        self.text(x, y, size, font, color, text);
    }

    fn fill(&mut self, x: f64, y: f64, w: f64, h: f64, color: Rgb) {
        self.ops.push(DrawOp::FillRect { x, y, w, h, color });
    }
}

/// Laid-out document ready for serialization
#[derive(Debug, Clone, PartialEq)]
pub struct PdfDocument {
    pub pages: Vec<Page>,
    pub title: String,
    pub author: String,
    pub created: DateTime<Utc>,
}

/// A4 portrait report with a branded header, striped table and page footers
#[derive(Debug, Clone, Default)]
pub struct DocumentEncoder;

/// Wrapped cell lines of one table row
#[derive(Debug, Clone)]
struct LaidRow {
    lines: Vec<Vec<String>>,
    line_height: f64,
    height: f64,
}

impl LaidRow {
    fn new(lines: Vec<Vec<String>>, line_height: f64) -> Self {
        let tallest = lines.iter().map(Vec::len).max().unwrap_or(1).max(1);
        Self {
            height: tallest as f64 * line_height + 2.0 * CELL_PADDING,
            lines,
            line_height,
        }
    }

    /// Whole lines that fit in `room` points
    fn lines_fitting(&self, room: f64) -> usize {
        let usable = room - 2.0 * CELL_PADDING;
        if usable < self.line_height {
            0
        } else {
            (usable / self.line_height).floor() as usize
        }
    }

    /// Keep the first `count` lines of every cell and return the rest
    fn split_off(&mut self, count: usize) -> LaidRow {
        let rest: Vec<Vec<String>> = self
            .lines
            .iter_mut()
            .map(|cell| cell.split_off(count.min(cell.len())))
            .collect();
        *self = LaidRow::new(std::mem::take(&mut self.lines), self.line_height);
        LaidRow::new(rest, self.line_height)
    }

    fn is_exhausted(&self) -> bool {
        self.lines.iter().all(Vec::is_empty)
    }
}

impl DocumentEncoder {
    pub fn new() -> Self {
        Self
    }

    pub fn layout(&self, table: &TabularModel, ctx: &ExportContext) -> PdfDocument {
        // Helvetica has no rupee glyph
        let table = table.map_text(|s| s.replace('\u{20B9}', "Rs."));

        let available = PAGE_WIDTH - 2.0 * MARGIN;
        let body: Vec<Vec<String>> = table
            .rows()
            .iter()
            .map(|row| row.iter().map(ToString::to_string).collect())
            .collect();
        let widths = column_widths(table.header(), &body, available);

        let head = lay_row(table.header(), &widths, Font::Bold, HEAD_SIZE);
        let rows: Vec<LaidRow> = body
            .iter()
            .map(|cells| lay_row(cells, &widths, Font::Regular, BODY_SIZE))
            .collect();

        let title = format!("{} Report", ctx.kind.title());
        let mut first = Page::default();
        draw_header_band(&mut first, ctx, &title, table.len());

        let mut pages = vec![first];
        let mut y = TABLE_TOP;
        let mut on_page = 0usize;
        if let Some(page) = pages.last_mut() {
            draw_row(page, &head, &widths, y, Some(BRAND), Font::Bold, HEAD_SIZE, WHITE);
        }
        y += head.height;
        let fresh_room = TABLE_BOTTOM - MARGIN - head.height;

        'rows: for (index, row) in rows.into_iter().enumerate() {
            let fill = if index % 2 == 1 { Some(STRIPE) } else { None };
            let mut part = row;

            loop {
                if y + part.height <= TABLE_BOTTOM {
                    if let Some(page) = pages.last_mut() {
                        draw_row(page, &part, &widths, y, fill, Font::Regular, BODY_SIZE, BODY_TEXT);
                    }
                    y += part.height;
                    on_page += 1;
                    continue 'rows;
                }

                // Rows that cannot fit a fresh page continue on the next one
                if on_page == 0 || part.height > fresh_room {
                    let fits = part
                        .lines_fitting(TABLE_BOTTOM - y)
                        .max(usize::from(on_page == 0));
                    if fits > 0 {
                        let rest = part.split_off(fits);
                        if let Some(page) = pages.last_mut() {
                            draw_row(page, &part, &widths, y, fill, Font::Regular, BODY_SIZE, BODY_TEXT);
                        }
                        on_page += 1;
                        if rest.is_exhausted() {
                            y += part.height;
                            continue 'rows;
                        }
                        part = rest;
                    }
                }

                let mut page = Page::default();
                y = MARGIN;
                draw_row(&mut page, &head, &widths, y, Some(BRAND), Font::Bold, HEAD_SIZE, WHITE);
                y += head.height;
                pages.push(page);
                on_page = 0;
            }
        }

        let total = pages.len();
        for (i, page) in pages.iter_mut().enumerate() {
            draw_footer(page, &ctx.brand, i + 1, total);
        }

        PdfDocument {
            pages,
            title: format!("{} {}", ctx.brand, title),
            author: ctx.brand.clone(),
            created: ctx.generated_at,
        }
    }
}

impl ReportEncoder for DocumentEncoder {
    fn format(&self) -> ExportFormat {
        ExportFormat::Pdf
    }

    fn encode(&self, table: &TabularModel, ctx: &ExportContext) -> Result<Vec<u8>> {
        let document = self.layout(table, ctx);
        let bytes = document.to_bytes();
        debug!(
            rows = table.len(),
            pages = document.pages.len(),
            bytes = bytes.len(),
            "encoded document"
        );
        Ok(bytes)
    }
}

fn draw_header_band(page: &mut Page, ctx: &ExportContext, title: &str, records: usize) {
    let right = PAGE_WIDTH - MARGIN;
    page.fill(0.0, 0.0, PAGE_WIDTH, HEADER_BAND, BRAND);
    page.text(MARGIN, 16.0 * MM, 20.0, Font::Bold, WHITE, ctx.brand.as_str());
    page.text(MARGIN, 26.0 * MM, 11.0, Font::Regular, WHITE, title);

    let generated = format!(
        "Generated: {}",
        ctx.timestamps.format_instant(ctx.generated_at)
    );
    page.text_right(right, 16.0 * MM, 9.0, Font::Regular, WHITE, &generated);
    let count = format!("Total Records: {}", records);
    page.text_right(right, 24.0 * MM, 9.0, Font::Regular, WHITE, &count);

    page.fill(0.0, HEADER_BAND, PAGE_WIDTH, ACCENT_HEIGHT, ACCENT);
}

fn draw_footer(page: &mut Page, brand: &str, number: usize, total: usize) {
    let top = PAGE_HEIGHT - FOOTER_BAND;
    let baseline = PAGE_HEIGHT - 6.0 * MM;
    page.fill(0.0, top, PAGE_WIDTH, FOOTER_BAND, FOOTER_FILL);
    page.ops.push(DrawOp::Line {
        x1: 0.0,
        y1: top,
        x2: PAGE_WIDTH,
        y2: top,
        color: GRID,
        width: RULE_WIDTH,
    });

    let notice = format!("{} \u{2014} Confidential", brand);
    page.text(MARGIN, baseline, FOOTER_SIZE, Font::Regular, FOOTER_TEXT, notice);
    let counter = format!("Page {} of {}", number, total);
    page.text_right(
        PAGE_WIDTH - MARGIN,
        baseline,
        FOOTER_SIZE,
        Font::Regular,
        FOOTER_TEXT,
        &counter,
    );
}

/// Natural content widths fitted to the printable width
///
/// Narrow tables stretch proportionally. Wide tables keep every column at
/// least as wide as its longest word (capped at an even share) and split the
/// remaining space in proportion to how much each column wants.
fn column_widths(header: &[String], body: &[Vec<String>], available: f64) -> Vec<f64> {
    if header.is_empty() {
        return Vec::new();
    }
    let fair_share = available / header.len() as f64;

    let mut natural = Vec::with_capacity(header.len());
    let mut minimum = Vec::with_capacity(header.len());
    for (c, title) in header.iter().enumerate() {
        let cells = body.iter().filter_map(|row| row.get(c));

        let widest = cells
            .clone()
            .flat_map(|cell| cell.split('\n'))
            .map(|line| Font::Regular.width(line, BODY_SIZE))
            .fold(Font::Bold.width(title, HEAD_SIZE), f64::max);
        let longest_word = cells
            .flat_map(|cell| cell.split_whitespace())
            .map(|word| Font::Regular.width(word, BODY_SIZE))
            .chain(title.split_whitespace().map(|w| Font::Bold.width(w, HEAD_SIZE)))
            .fold(0.0, f64::max);

        natural.push(widest + 2.0 * CELL_PADDING);
        minimum.push((longest_word + 2.0 * CELL_PADDING).min(fair_share));
    }

    let total: f64 = natural.iter().sum();
    if total <= available {
        return natural.iter().map(|w| w * available / total).collect();
    }

    let spare = available - minimum.iter().sum::<f64>();
    let wanted: f64 = natural.iter().zip(&minimum).map(|(n, m)| n - m).sum();
    natural
        .iter()
        .zip(&minimum)
        .map(|(n, m)| {
            if wanted > 0.0 {
                m + (n - m) * spare / wanted
            } else {
                *m
            }
        })
        .collect()
}

fn lay_row(cells: &[String], widths: &[f64], font: Font, size: f64) -> LaidRow {
    let lines: Vec<Vec<String>> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| wrap(cell, font, size, width - 2.0 * CELL_PADDING))
        .collect();
    LaidRow::new(lines, size * LINE_HEIGHT)
}

/// Greedy word wrap; words wider than the column are split by character
fn wrap(text: &str, font: Font, size: f64, max_width: f64) -> Vec<String> {
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{} {}", current, word)
            };
            if font.width(&candidate, size) <= max_width {
                current = candidate;
                continue;
            }

            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            if font.width(word, size) <= max_width {
                current = word.to_string();
                continue;
            }
            for ch in word.chars() {
                let mut next = current.clone();
                next.push(ch);
                if !current.is_empty() && font.width(&next, size) > max_width {
                    lines.push(std::mem::take(&mut current));
                    current.push(ch);
                } else {
                    current = next;
                }
            }
        }
        lines.push(current);
    }

    lines
}

#[allow(clippy::too_many_arguments)]
fn draw_row(
    page: &mut Page,
    row: &LaidRow,
    widths: &[f64],
    top: f64,
    fill: Option<Rgb>,
    font: Font,
    size: f64,
    color: Rgb,
) {
    let line_height = size * LINE_HEIGHT;
    let first_baseline = top + CELL_PADDING + (line_height + size * 0.7) / 2.0;
    let mut x = MARGIN;

    for (lines, &width) in row.lines.iter().zip(widths) {
        if let Some(fill) = fill {
            page.fill(x, top, width, row.height, fill);
        }
        page.ops.push(DrawOp::StrokeRect {
            x,
            y: top,
            w: width,
            h: row.height,
            color: GRID,
            width: GRID_WIDTH,
        });
        for (k, line) in lines.iter().enumerate() {
            if line.is_empty() {
                continue;
            }
            let y = first_baseline + k as f64 * line_height;
            page.text(x + CELL_PADDING, y, size, font, color, line.as_str());
        }
        x += width;
    }
}

impl PdfDocument {
    /// Serialize to PDF 1.4
    ///
    /// Object numbers: 1 catalog, 2 page tree, 3 and 4 fonts, 5 info, then a
    /// page object followed by its content stream for every page.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(4096 * self.pages.len().max(1));
        out.extend_from_slice(b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n");
        let mut offsets: Vec<usize> = Vec::new();

        let kids: Vec<String> = (0..self.pages.len())
            .map(|i| format!("{} 0 R", 6 + 2 * i))
            .collect();

        push_object(&mut out, &mut offsets, b"<< /Type /Catalog /Pages 2 0 R >>");
        push_object(
            &mut out,
            &mut offsets,
            format!(
                "<< /Type /Pages /Kids [{}] /Count {} >>",
                kids.join(" "),
                self.pages.len()
            )
            .as_bytes(),
        );
        for font in [Font::Regular, Font::Bold] {
            push_object(
                &mut out,
                &mut offsets,
                format!(
                    "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
                    font.base_font()
                )
                .as_bytes(),
            );
        }
        push_object(
            &mut out,
            &mut offsets,
            format!(
                "<< /Title ({}) /Author ({}) /Producer ({}) /CreationDate ({}) >>",
                pdf_string(&self.title),
                pdf_string(&self.author),
                env!("CARGO_PKG_NAME"),
                self.created.format("D:%Y%m%d%H%M%SZ")
            )
            .as_bytes(),
        );

        for (i, page) in self.pages.iter().enumerate() {
            let contents = 7 + 2 * i;
            push_object(
                &mut out,
                &mut offsets,
                format!(
                    "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {} {}] \
                     /Resources << /Font << /F1 3 0 R /F2 4 0 R >> >> /Contents {} 0 R >>",
                    num(PAGE_WIDTH),
                    num(PAGE_HEIGHT),
                    contents
                )
                .as_bytes(),
            );

            let stream = content_stream(page);
            let mut body = format!("<< /Length {} >>\nstream\n", stream.len()).into_bytes();
            body.extend_from_slice(stream.as_bytes());
            body.extend_from_slice(b"\nendstream");
            push_object(&mut out, &mut offsets, &body);
        }

        let xref_at = out.len();
        out.extend_from_slice(format!("xref\n0 {}\n", offsets.len() + 1).as_bytes());
        out.extend_from_slice(b"0000000000 65535 f \n");
        for offset in &offsets {
            out.extend_from_slice(format!("{:010} 00000 n \n", offset).as_bytes());
        }
        out.extend_from_slice(
            format!(
                "trailer\n<< /Size {} /Root 1 0 R /Info 5 0 R >>\nstartxref\n{}\n%%EOF\n",
                offsets.len() + 1,
                xref_at
            )
            .as_bytes(),
        );

        out
    }
}

fn push_object(out: &mut Vec<u8>, offsets: &mut Vec<usize>, body: &[u8]) {
    offsets.push(out.len());
    out.extend_from_slice(format!("{} 0 obj\n", offsets.len()).as_bytes());
    out.extend_from_slice(body);
    out.extend_from_slice(b"\nendobj\n");
}

fn content_stream(page: &Page) -> String {
    let mut s = String::new();
    for op in &page.ops {
        match op {
            DrawOp::FillRect { x, y, w, h, color } => {
                s.push_str(&format!(
                    "{} rg\n{} {} {} {} re\nf\n",
                    rgb(*color),
                    num(*x),
                    num(PAGE_HEIGHT - y - h),
                    num(*w),
                    num(*h)
                ));
            }
            DrawOp::StrokeRect {
                x,
                y,
                w,
                h,
                color,
                width,
            } => {
                s.push_str(&format!(
                    "{} RG\n{} w\n{} {} {} {} re\nS\n",
                    rgb(*color),
                    num(*width),
                    num(*x),
                    num(PAGE_HEIGHT - y - h),
                    num(*w),
                    num(*h)
                ));
            }
            DrawOp::Line {
                x1,
                y1,
                x2,
                y2,
                color,
                width,
            } => {
                s.push_str(&format!(
                    "{} RG\n{} w\n{} {} m\n{} {} l\nS\n",
                    rgb(*color),
                    num(*width),
                    num(*x1),
                    num(PAGE_HEIGHT - y1),
                    num(*x2),
                    num(PAGE_HEIGHT - y2)
                ));
            }
            DrawOp::Text {
                x,
                y,
                size,
                font,
                color,
                text,
            } => {
                s.push_str(&format!(
                    "BT\n/{} {} Tf\n{} rg\n{} {} Td\n({}) Tj\nET\n",
                    font.resource(),
                    num(*size),
                    rgb(*color),
                    num(*x),
                    num(PAGE_HEIGHT - y),
                    pdf_string(text)
                ));
            }
        }
    }
    s
}

/// Up to two decimals, trailing zeros dropped
fn num(value: f64) -> String {
    let s = format!("{:.2}", value);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    match s {
        "-0" | "" => "0".to_string(),
        other => other.to_string(),
    }
}

fn rgb(color: Rgb) -> String {
    let component = |c: u8| {
        let s = format!("{:.3}", f64::from(c) / 255.0);
        let s = s.trim_end_matches('0').trim_end_matches('.');
        if s.is_empty() {
            "0".to_string()
        } else {
            s.to_string()
        }
    };
    format!("{} {} {}", component(color.0), component(color.1), component(color.2))
}

/// WinAnsi code for `ch`, `?` when the encoding has no slot for it
fn win_ansi(ch: char) -> u8 {
    match ch {
        ' '..='~' | '\u{A0}'..='\u{FF}' => ch as u8,
        '\t' => b' ',
        '\u{20AC}' => 0x80,
        '\u{201A}' => 0x82,
        '\u{0192}' => 0x83,
        '\u{201E}' => 0x84,
        '\u{2026}' => 0x85,
        '\u{2020}' => 0x86,
        '\u{2021}' => 0x87,
        '\u{02C6}' => 0x88,
        '\u{2030}' => 0x89,
        '\u{0160}' => 0x8A,
        '\u{2039}' => 0x8B,
        '\u{0152}' => 0x8C,
        '\u{017D}' => 0x8E,
        '\u{2018}' => 0x91,
        '\u{2019}' => 0x92,
        '\u{201C}' => 0x93,
        '\u{201D}' => 0x94,
        '\u{2022}' => 0x95,
        '\u{2013}' => 0x96,
        '\u{2014}' => 0x97,
        '\u{02DC}' => 0x98,
        '\u{2122}' => 0x99,
        '\u{0161}' => 0x9A,
        '\u{203A}' => 0x9B,
        '\u{0153}' => 0x9C,
        '\u{017E}' => 0x9E,
        '\u{0178}' => 0x9F,
        _ => b'?',
    }
}

/// Body of a PDF literal string; bytes outside printable ASCII are octal escaped
fn pdf_string(text: &str) -> String {
    let mut s = String::with_capacity(text.len());
    for ch in text.chars() {
        match win_ansi(ch) {
            b'(' => s.push_str("\\("),
            b')' => s.push_str("\\)"),
            b'\\' => s.push_str("\\\\"),
            byte @ 0x20..=0x7E => s.push(byte as char),
            byte => s.push_str(&format!("\\{:03o}", byte)),
        }
    }
    s
}
