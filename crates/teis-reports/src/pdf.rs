//! # PDF Rendering
//!
//! Replays a [`ReportLayout`] onto a printpdf document. Layout works in
//! points, printpdf in millimetres.

use std::io::BufWriter;
use std::path::Path;

use printpdf::{
    BuiltinFont, IndirectFontRef, Line, Mm, PdfDocument, PdfLayerReference, Point,
};
use tracing::{debug, info};

use crate::error::{ReportError, ReportResult};
use crate::layout::{DrawOp, FontStyle, ReportLayout, PAGE_HEIGHT_PT, PAGE_WIDTH_PT};

fn mm(pt: f32) -> Mm {
    Mm(pt * 25.4 / 72.0)
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    oblique: IndirectFontRef,
}

impl Fonts {
    fn get(&self, style: FontStyle) -> &IndirectFontRef {
        match style {
            FontStyle::Regular => &self.regular,
            FontStyle::Bold => &self.bold,
            FontStyle::Oblique => &self.oblique,
        }
    }
}

/// Renders the layout into PDF bytes.
pub fn render_pdf(layout: &ReportLayout) -> ReportResult<Vec<u8>> {
    let (doc, page1, layer1) = PdfDocument::new(
        &layout.title,
        mm(PAGE_WIDTH_PT),
        mm(PAGE_HEIGHT_PT),
        "Layer 1",
    );

    let fonts = Fonts {
        regular: doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| ReportError::Pdf(e.to_string()))?,
        bold: doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| ReportError::Pdf(e.to_string()))?,
        oblique: doc
            .add_builtin_font(BuiltinFont::HelveticaOblique)
            .map_err(|e| ReportError::Pdf(e.to_string()))?,
    };

    for (i, page) in layout.pages.iter().enumerate() {
        let layer = if i == 0 {
            doc.get_page(page1).get_layer(layer1)
        } else {
            let (page_idx, layer_idx) =
                doc.add_page(mm(PAGE_WIDTH_PT), mm(PAGE_HEIGHT_PT), "Layer 1");
            doc.get_page(page_idx).get_layer(layer_idx)
        };
        draw_ops(&layer, &fonts, &page.ops);
    }

    debug!(title = %layout.title, pages = layout.pages.len(), "Rendered report");

    let mut writer = BufWriter::new(Vec::<u8>::new());
    doc.save(&mut writer)
        .map_err(|e| ReportError::Pdf(e.to_string()))?;
    writer
        .into_inner()
        .map_err(|e| ReportError::Pdf(e.to_string()))
}

/// Renders the layout and writes it to `path`.
pub fn write_pdf(layout: &ReportLayout, path: &Path) -> ReportResult<()> {
    let bytes = render_pdf(layout)?;
    std::fs::write(path, &bytes)?;
    info!(path = %path.display(), bytes = bytes.len(), "Report written");
    Ok(())
}

fn draw_ops(layer: &PdfLayerReference, fonts: &Fonts, ops: &[DrawOp]) {
    for op in ops {
        match op {
            DrawOp::Text {
                x,
                y,
                size,
                style,
                text,
            } => {
                layer.use_text(text.as_str(), *size, mm(*x), mm(*y), fonts.get(*style));
            }
            DrawOp::Line { from, to } => {
                layer.add_line(Line {
                    points: vec![
                        (Point::new(mm(from.0), mm(from.1)), false),
                        (Point::new(mm(to.0), mm(to.1)), false),
                    ],
                    is_closed: false,
                });
            }
        }
    }
}
