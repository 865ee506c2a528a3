//! # Page Layout
//!
//! Pure pagination: reports are computed as pages of draw operations in
//! PDF points (origin bottom-left, A4 = 595 × 842) and only then rendered.
//!
//! ## Page Anatomy
//! ```text
//!  842 ┌──────────────────────────────────────────────────────────┐
//!      │ ┌────────┐                                               │
//!  800 │ │ Empresa│   (extra header, e.g. invoice customer)       │
//!      │ │ CIF ...│                                               │
//!  700 │ └────────┘                                               │
//!  675 │                     TITLE                                │
//!  665 │ ──────────────────────────────────────────────────────── │
//!  650 │ COL_A    COL_B      COL_C    ...                         │
//!  645 │ ──────────────────────────────────────────────────────── │
//!  630 │ row 1                                                    │
//!  605 │ row 2                        rows every 25pt             │
//!  ... │ ...                                                      │
//!  ≤90 │                               Página siguiente...  (75)  │
//!   50 │ ──────────────────────────────────────────────────────── │
//!   40 │ 01/03/2025 10:30:00     TITLE              Page: N       │
//!    0 └──────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A4 width in points.
pub const PAGE_WIDTH_PT: f32 = 595.0;
/// A4 height in points.
pub const PAGE_HEIGHT_PT: f32 = 842.0;

/// Baseline of the first data row on every page.
pub const FIRST_ROW_Y: f32 = 630.0;
/// Vertical distance between rows.
pub const ROW_STEP: f32 = 25.0;
/// A row is never drawn at or below this baseline.
pub const PAGE_BREAK_Y: f32 = 90.0;

/// Printed at the bottom of every page that continues on the next one.
pub const NEXT_PAGE_MARKER: &str = "Página siguiente...";

const MAX_CELL_CHARS: usize = 15;

// =============================================================================
// Draw Operations
// =============================================================================

/// Built-in font variants used by reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontStyle {
    Regular,
    Bold,
    Oblique,
}

/// One primitive on a page, in points.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Text {
        x: f32,
        y: f32,
        size: f32,
        style: FontStyle,
        text: String,
    },
    Line {
        from: (f32, f32),
        to: (f32, f32),
    },
}

/// A laid-out page.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// 1-based page number.
    pub number: usize,
    pub ops: Vec<DrawOp>,
}

impl Page {
    fn new(number: usize) -> Self {
        Page {
            number,
            ops: Vec::new(),
        }
    }

    /// Every text drawn on the page, in drawing order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            DrawOp::Line { .. } => None,
        })
    }

    /// True if some text on the page equals `needle`.
    pub fn has_text(&self, needle: &str) -> bool {
        self.texts().any(|t| t == needle)
    }

    fn text(&mut self, x: f32, y: f32, size: f32, style: FontStyle, text: impl Into<String>) {
        self.ops.push(DrawOp::Text {
            x,
            y,
            size,
            style,
            text: text.into(),
        });
    }

    /// Approximates Helvetica's average advance of half the font size.
    fn centered(&mut self, cx: f32, y: f32, size: f32, text: &str) {
        let width = text.chars().count() as f32 * size * 0.5;
        self.text(cx - width / 2.0, y, size, FontStyle::Regular, text);
    }

    fn line(&mut self, from: (f32, f32), to: (f32, f32)) {
        self.ops.push(DrawOp::Line { from, to });
    }
}

/// A complete report ready to render.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportLayout {
    pub title: String,
    pub pages: Vec<Page>,
}

// =============================================================================
// Company Block
// =============================================================================

/// Business details printed in the header box of every page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyInfo {
    pub name: String,
    pub cif: String,
    pub address: String,
    pub city: String,
    pub phone: String,
    pub email: String,
}

impl Default for CompanyInfo {
    fn default() -> Self {
        CompanyInfo {
            name: "Empresa Teis".to_string(),
            cif: "A12345678".to_string(),
            address: "Avda. de Galicia, 101".to_string(),
            city: "Vigo - 36215- España".to_string(),
            phone: "986123456".to_string(),
            email: "teis@mail.com".to_string(),
        }
    }
}

// =============================================================================
// Cell Formatting
// =============================================================================

/// Masks a national ID as `****` + characters 4..7 + `****`.
///
/// ```rust
/// use teis_reports::layout::mask_dni;
///
/// assert_eq!(mask_dni("12345678Z"), "****567****");
/// ```
pub fn mask_dni(dni: &str) -> String {
    let middle: String = dni.chars().skip(4).take(3).collect();
    format!("****{middle}****")
}

/// Cuts text longer than 15 characters to 15 + `...`.
pub fn truncate_cell(text: &str) -> String {
    truncate_to(text, MAX_CELL_CHARS)
}

/// Cuts text longer than `max` characters to `max` + `...`.
pub fn truncate_to(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let head: String = text.chars().take(max).collect();
        format!("{head}...")
    } else {
        text.to_string()
    }
}

// =============================================================================
// Paginator
// =============================================================================

/// A table column: title position and cell position.
#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub title: &'static str,
    pub title_x: f32,
    pub cell_x: f32,
}

/// Builds pages row by row, redrawing header, column titles and footer on
/// every new page.
pub(crate) struct Paginator<'a> {
    title: &'a str,
    company: &'a CompanyInfo,
    columns: &'a [Column],
    generated_at: NaiveDateTime,
    extra_header: Vec<DrawOp>,
    pages: Vec<Page>,
    current: Page,
    y: f32,
}

impl<'a> Paginator<'a> {
    pub(crate) fn new(
        title: &'a str,
        company: &'a CompanyInfo,
        columns: &'a [Column],
        generated_at: NaiveDateTime,
        extra_header: Vec<DrawOp>,
    ) -> Self {
        let mut paginator = Paginator {
            title,
            company,
            columns,
            generated_at,
            extra_header,
            pages: Vec::new(),
            current: Page::new(1),
            y: FIRST_ROW_Y,
        };
        paginator.decorate_current();
        paginator
    }

    /// Draws one table row, one value per column.
    pub(crate) fn row(&mut self, values: Vec<String>) {
        self.ensure_room(1);
        let y = self.y;
        for (column, value) in self.columns.iter().zip(values) {
            self.current
                .text(column.cell_x, y, 8.0, FontStyle::Regular, value);
        }
        self.y -= ROW_STEP;
    }

    /// Draws a row of free-positioned cells.
    pub(crate) fn cells(&mut self, cells: &[(f32, String)], style: FontStyle) {
        self.ensure_room(1);
        let y = self.y;
        for (x, text) in cells {
            self.current.text(*x, y, 9.0, style, text.clone());
        }
        self.y -= ROW_STEP;
    }

    /// Draws a horizontal rule just above the next row.
    pub(crate) fn rule(&mut self, from_x: f32, to_x: f32) {
        let y = self.y + ROW_STEP / 2.0;
        self.current.line((from_x, y), (to_x, y));
    }

    /// Starts a new page unless `rows` more rows fit on this one.
    pub(crate) fn ensure_room(&mut self, rows: usize) {
        let last_row_y = self.y - ROW_STEP * rows.saturating_sub(1) as f32;
        if last_row_y <= PAGE_BREAK_Y {
            self.break_page();
        }
    }

    pub(crate) fn finish(mut self) -> Vec<Page> {
        self.pages.push(self.current);
        self.pages
    }

    fn break_page(&mut self) {
        self.current
            .text(450.0, 75.0, 8.0, FontStyle::Oblique, NEXT_PAGE_MARKER);
        let next = Page::new(self.current.number + 1);
        let done = std::mem::replace(&mut self.current, next);
        self.pages.push(done);
        self.y = FIRST_ROW_Y;
        self.decorate_current();
    }

    fn decorate_current(&mut self) {
        self.draw_header();
        self.draw_column_titles();
        self.draw_footer();
    }

    fn draw_header(&mut self) {
        let page = &mut self.current;
        let company = self.company;

        // business box
        page.line((20.0, 800.0), (120.0, 800.0));
        page.line((20.0, 700.0), (120.0, 700.0));
        page.line((20.0, 700.0), (20.0, 800.0));
        page.line((120.0, 700.0), (120.0, 800.0));
        page.centered(70.0, 785.0, 10.0, &company.name);

        let details = [
            format!("CIF: {}", company.cif),
            company.address.clone(),
            company.city.clone(),
            format!("Tlfo: {}", company.phone),
            format!("email: {}", company.email),
        ];
        for (i, detail) in details.into_iter().enumerate() {
            page.text(25.0, 755.0 - 10.0 * i as f32, 9.0, FontStyle::Regular, detail);
        }

        page.ops.extend(self.extra_header.iter().cloned());

        page.centered(300.0, 675.0, 10.0, self.title);
        page.line((35.0, 665.0), (525.0, 665.0));
    }

    fn draw_column_titles(&mut self) {
        for column in self.columns {
            self.current
                .text(column.title_x, 650.0, 10.0, FontStyle::Regular, column.title);
        }
        self.current.line((35.0, 645.0), (525.0, 645.0));
    }

    fn draw_footer(&mut self) {
        let page = &mut self.current;
        page.line((35.0, 50.0), (525.0, 50.0));
        page.text(
            45.0,
            40.0,
            7.0,
            FontStyle::Regular,
            self.generated_at.format("%d/%m/%Y %H:%M:%S").to_string(),
        );
        page.text(250.0, 40.0, 7.0, FontStyle::Regular, self.title);
        let number = page.number;
        page.text(450.0, 40.0, 7.0, FontStyle::Regular, format!("Page: {number}"));
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
