//! Paints an [`ExportPlan`] into a PDF document with printpdf.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use printpdf::path::{PaintMode, WindingOrder};
use printpdf::*;
use tracing::info;

use crate::color::Color;
use crate::error::{ChartError, Result};
use crate::export::{ExportPlan, Font, PlacedSeat, Shape, PAGE_HEIGHT_MM, PAGE_WIDTH_MM, SEAT_STROKE_PT};

/// Static name of the exported artifact.
pub const DEFAULT_OUTPUT: &str = "orchestra-seats.pdf";

const DOCUMENT_TITLE: &str = "Orchestra Seating";

/// Straight segments used to approximate a circle
const CIRCLE_SEGMENTS: usize = 48;

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    italic: IndirectFontRef,
}

impl Fonts {
    fn get(&self, font: Font) -> &IndirectFontRef {
        match font {
            Font::Regular => &self.regular,
            Font::Bold => &self.bold,
            Font::Italic => &self.italic,
        }
    }
}

/// Write `plan` to `output_path`, one PDF page per plan page.
pub fn write_pdf(plan: &ExportPlan, output_path: impl AsRef<Path>) -> Result<()> {
    let output_path = output_path.as_ref();
    let doc = build_document(plan)?;

    let file = File::create(output_path)?;
    let mut writer = BufWriter::new(file);
    doc.save(&mut writer)
        .map_err(|e| ChartError::Pdf(e.to_string()))?;

    info!(path = %output_path.display(), pages = plan.pages.len(), "PDF written");
    Ok(())
}

/// Render `plan` into an in-memory PDF.
pub fn render_pdf_bytes(plan: &ExportPlan) -> Result<Vec<u8>> {
    let doc = build_document(plan)?;
    let mut writer = BufWriter::new(Vec::new());
    doc.save(&mut writer)
        .map_err(|e| ChartError::Pdf(e.to_string()))?;
    writer
        .into_inner()
        .map_err(|e| ChartError::Pdf(e.to_string()))
}

fn build_document(plan: &ExportPlan) -> Result<PdfDocumentReference> {
    let (doc, page1, layer1) = PdfDocument::new(
        DOCUMENT_TITLE,
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        "Layer 1",
    );

    let fonts = Fonts {
        regular: doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| ChartError::Pdf(e.to_string()))?,
        bold: doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| ChartError::Pdf(e.to_string()))?,
        italic: doc
            .add_builtin_font(BuiltinFont::HelveticaOblique)
            .map_err(|e| ChartError::Pdf(e.to_string()))?,
    };

    for (i, page) in plan.pages.iter().enumerate() {
        let layer = if i == 0 {
            doc.get_page(page1).get_layer(layer1)
        } else {
            let (new_page, new_layer) =
                doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
            doc.get_page(new_page).get_layer(new_layer)
        };
        for shape in &page.shapes {
            draw_shape(&layer, &fonts, shape);
        }
    }

    Ok(doc)
}

// ============================================================================
// Shapes
// ============================================================================

fn draw_shape(layer: &PdfLayerReference, fonts: &Fonts, shape: &Shape) {
    match shape {
        Shape::Arc {
            cx,
            cy,
            radius,
            color,
            thickness_pt,
        } => {
            layer.set_outline_color(pdf_color(*color));
            layer.set_outline_thickness(*thickness_pt);
            let points = (0..=CIRCLE_SEGMENTS / 2)
                .map(|i| {
                    let t = std::f32::consts::PI * i as f32 / (CIRCLE_SEGMENTS / 2) as f32;
                    (Point::new(Mm(cx + radius * t.cos()), Mm(cy + radius * t.sin())), false)
                })
                .collect();
            layer.add_line(Line {
                points,
                is_closed: false,
            });
        }
        Shape::Seat(seat) => draw_seat(layer, fonts, seat),
        Shape::Rect {
            x,
            y,
            width,
            height,
            fill,
            stroke,
        } => {
            let points = vec![
                (Point::new(Mm(*x), Mm(*y)), false),
                (Point::new(Mm(x + width), Mm(*y)), false),
                (Point::new(Mm(x + width), Mm(y + height)), false),
                (Point::new(Mm(*x), Mm(y + height)), false),
            ];
            draw_polygon(layer, points, *fill, *stroke, 0.5);
        }
        Shape::Text {
            x,
            y,
            size_pt,
            text,
            font,
            color,
        } => {
            layer.set_fill_color(pdf_color(*color));
            layer.use_text(text.as_str(), *size_pt, Mm(*x), Mm(*y), fonts.get(*font));
        }
    }
}

fn draw_seat(layer: &PdfLayerReference, fonts: &Fonts, seat: &PlacedSeat) {
    if !seat.visible {
        return;
    }
    let points = (0..CIRCLE_SEGMENTS)
        .map(|i| {
            let t = std::f32::consts::TAU * i as f32 / CIRCLE_SEGMENTS as f32;
            (
                Point::new(Mm(seat.cx + seat.radius * t.cos()), Mm(seat.cy + seat.radius * t.sin())),
                false,
            )
        })
        .collect();
    draw_polygon(layer, points, Some(seat.fill), Some(seat.stroke), SEAT_STROKE_PT);

    if !seat.label.is_empty() {
        let (x, y) = seat.label_origin;
        layer.set_fill_color(pdf_color(seat.text_color));
        layer.use_text(seat.label.as_str(), seat.label_size_pt, Mm(x), Mm(y), &fonts.bold);
    }
}

// ============================================================================
// Drawing Utilities
// ============================================================================

fn draw_polygon(
    layer: &PdfLayerReference,
    points: Vec<(Point, bool)>,
    fill: Option<Color>,
    stroke: Option<Color>,
    thickness: f32,
) {
    let mode = match (fill, stroke) {
        (Some(_), Some(_)) => PaintMode::FillStroke,
        (Some(_), None) => PaintMode::Fill,
        (None, Some(_)) => PaintMode::Stroke,
        (None, None) => return,
    };
    if let Some(fill) = fill {
        layer.set_fill_color(pdf_color(fill));
    }
    if let Some(stroke) = stroke {
        layer.set_outline_color(pdf_color(stroke));
        layer.set_outline_thickness(thickness);
    }
    layer.add_polygon(Polygon {
        rings: vec![points],
        mode,
        winding_order: WindingOrder::NonZero,
    });
}

fn pdf_color(color: Color) -> printpdf::Color {
    let (r, g, b) = color.to_unit_rgb();
    printpdf::Color::Rgb(Rgb::new(r, g, b, None))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::Pagination;
    use crate::session::Session;

    #[test]
    fn renders_a_pdf_document() {
        let session = Session::new();
        let plan = ExportPlan::build(&session.projection(), &session.legend(), Pagination::Flow).unwrap();
        let bytes = render_pdf_bytes(&plan).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert!(bytes.len() > 1000);
    }
}
