//! Page layout of the printable chart.
//!
//! Builds an [`ExportPlan`]: landscape pages of shapes positioned in
//! millimetres (origin bottom-left, `y` up). The plan is plain data; the
//! [`crate::pdf`] writer only has to paint it.

use tracing::debug;

use crate::color::Color;
use crate::error::{ChartError, Result};
use crate::geometry::SeatId;
use crate::legend::{Legend, LegendEntry};
use crate::projector::Projection;

// ============================================================================
// Constants
// ============================================================================

/// A4 landscape dimensions in mm
pub const PAGE_WIDTH_MM: f32 = 297.0;
pub const PAGE_HEIGHT_MM: f32 = 210.0;

/// Margins
pub const MARGIN_MM: f32 = 15.0;

/// Vertical gap between the chart and the legend
const BLOCK_GAP_MM: f32 = 8.0;

const PT_PER_MM: f32 = 72.0 / 25.4;
/// Average Helvetica glyph width as a share of the font size
const GLYPH_WIDTH_RATIO: f32 = 0.55;

/// Font sizes in points
const LEGEND_TITLE_FONT_SIZE: f32 = 14.0;
const LEGEND_HEADER_FONT_SIZE: f32 = 11.0;
const LEGEND_FONT_SIZE: f32 = 10.0;
const LEGEND_SMALL_FONT_SIZE: f32 = 9.0;

/// Legend table and entry metrics in mm
const LEGEND_LINE_MM: f32 = 6.0;
const ROW_LABEL_COL_MM: f32 = 28.0;
const ROW_VALUE_COL_MM: f32 = 12.0;
const SWATCH_MM: f32 = 4.0;
const ENTRY_COL_MM: f32 = 80.0;

/// Faint reference ring behind each row of seats
const RING_COLOR: Color = Color::new(0xe0, 0xe0, 0xe0);
const RING_THICKNESS_PT: f32 = 0.5;
pub const SEAT_STROKE_PT: f32 = 1.0;

// ============================================================================
// Plan data
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Regular,
    Bold,
    Italic,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedSeat {
    pub id: SeatId,
    pub cx: f32,
    pub cy: f32,
    pub radius: f32,
    pub fill: Color,
    pub stroke: Color,
    pub text_color: Color,
    pub label: String,
    pub label_size_pt: f32,
    /// Baseline start that centres the label on the seat.
    pub label_origin: (f32, f32),
    /// Invisible seats keep their place in the plan but are not painted.
    pub visible: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// Upper half circle, decoration only.
    Arc {
        cx: f32,
        cy: f32,
        radius: f32,
        color: Color,
        thickness_pt: f32,
    },
    Seat(PlacedSeat),
    /// `x`, `y` is the lower-left corner.
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        fill: Option<Color>,
        stroke: Option<Color>,
    },
    /// `x`, `y` is the start of the baseline.
    Text {
        x: f32,
        y: f32,
        size_pt: f32,
        text: String,
        font: Font,
        color: Color,
    },
}

impl Shape {
    fn shifted(mut self, dy: f32) -> Self {
        match &mut self {
            Shape::Arc { cy, .. } => *cy += dy,
            Shape::Seat(seat) => {
                seat.cy += dy;
                seat.label_origin.1 += dy;
            }
            Shape::Rect { y, .. } | Shape::Text { y, .. } => *y += dy,
        }
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub shapes: Vec<Shape>,
}

impl Page {
    pub fn seats(&self) -> impl Iterator<Item = &PlacedSeat> {
        self.shapes.iter().filter_map(|s| match s {
            Shape::Seat(seat) => Some(seat),
            _ => None,
        })
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.shapes.iter().filter_map(|s| match s {
            Shape::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

/// How content taller than one page is spread over pages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Pagination {
    /// Chart and legend are kept whole; a block that does not fit on the
    /// current page moves to a new one.
    #[default]
    Flow,
    /// One tall image; every extra page repeats it shifted up by a page.
    Slice,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportPlan {
    pub scale: f32,
    pub pages: Vec<Page>,
}

impl ExportPlan {
    /// Lay out the chart and its legend.
    ///
    /// Fails with [`ChartError::EmptyLayout`] when no seat would be painted.
    pub fn build(projection: &Projection, legend: &Legend, pagination: Pagination) -> Result<Self> {
        if !projection.seats().any(|s| s.is_visible()) {
            return Err(ChartError::EmptyLayout);
        }

        let content_width = PAGE_WIDTH_MM - 2.0 * MARGIN_MM;
        let scale = content_width / projection.stage_diameter as f32;
        let blocks = [chart_block(projection, scale), legend_block(legend)];

        let pages = match pagination {
            Pagination::Flow => flow(blocks),
            Pagination::Slice => slice(blocks),
        };
        debug!(scale, pages = pages.len(), ?pagination, "export plan built");
        Ok(Self { scale, pages })
    }

    pub fn seats(&self) -> impl Iterator<Item = &PlacedSeat> {
        self.pages.iter().flat_map(Page::seats)
    }

    /// Seat as placed on the first page that shows it.
    pub fn seat(&self, id: SeatId) -> Option<&PlacedSeat> {
        self.seats().find(|s| s.id == id)
    }
}

/// Shapes laid out from `y = 0` downwards, to be shifted into place.
struct Block {
    height: f32,
    shapes: Vec<Shape>,
}

fn flow(blocks: [Block; 2]) -> Vec<Page> {
    let top = PAGE_HEIGHT_MM - MARGIN_MM;

    let mut pages = Vec::new();
    let mut current = Page::default();
    let mut y_pos = top;
    for block in blocks {
        // Keep blocks together - don't split across pages
        if !current.shapes.is_empty() && y_pos - block.height < MARGIN_MM {
            pages.push(std::mem::take(&mut current));
            y_pos = top;
        }
        current
            .shapes
            .extend(block.shapes.into_iter().map(|s| s.shifted(y_pos)));
        y_pos -= block.height + BLOCK_GAP_MM;
    }
    pages.push(current);
    pages
}

fn slice(blocks: [Block; 2]) -> Vec<Page> {
    let mut image = Vec::new();
    let mut y_pos = PAGE_HEIGHT_MM - MARGIN_MM;
    let mut total = MARGIN_MM;
    for block in blocks {
        image.extend(block.shapes.into_iter().map(|s| s.shifted(y_pos)));
        y_pos -= block.height + BLOCK_GAP_MM;
        total += block.height + BLOCK_GAP_MM;
    }

    let extra_pages = (total / PAGE_HEIGHT_MM).floor() as usize;
    (0..=extra_pages)
        .map(|k| Page {
            shapes: image
                .iter()
                .cloned()
                .map(|s| s.shifted(k as f32 * PAGE_HEIGHT_MM))
                .collect(),
        })
        .collect()
}

// ============================================================================
// Chart block
// ============================================================================

fn chart_block(projection: &Projection, scale: f32) -> Block {
    let (top, bottom) = projection.extent;
    let height = (bottom - top) as f32 * scale;

    let cx = MARGIN_MM + (PAGE_WIDTH_MM - 2.0 * MARGIN_MM) / 2.0;
    let cy = top as f32 * scale;

    let mut shapes = Vec::new();

    for row in &projection.rows {
        shapes.push(Shape::Arc {
            cx,
            cy,
            radius: row.radius as f32 * scale,
            color: RING_COLOR,
            thickness_pt: RING_THICKNESS_PT,
        });
    }

    for seat in projection.seats() {
        let seat_x = cx + seat.x as f32 * scale;
        let seat_y = cy - seat.y as f32 * scale;
        let label_size_pt = seat.font_size as f32 * scale * PT_PER_MM;
        shapes.push(Shape::Seat(PlacedSeat {
            id: seat.id,
            cx: seat_x,
            cy: seat_y,
            radius: seat.diameter as f32 * scale / 2.0,
            fill: seat.fill,
            stroke: seat.stroke,
            text_color: seat.text_color,
            label: seat.label.clone(),
            label_size_pt,
            label_origin: centered_origin(&seat.label, seat_x, seat_y, label_size_pt),
            visible: seat.is_visible(),
        }));
    }

    let c = &projection.conductor;
    let width = c.width as f32 * scale;
    let rect_height = c.height as f32 * scale;
    let rect_top = cy - c.top as f32 * scale;
    shapes.push(Shape::Rect {
        x: cx - width / 2.0,
        y: rect_top - rect_height,
        width,
        height: rect_height,
        fill: Some(c.fill),
        stroke: None,
    });
    let label_size = c.font_size as f32 * scale * PT_PER_MM;
    shapes.push(centered_text(
        c.label,
        cx,
        rect_top - rect_height / 2.0,
        label_size,
        Font::Bold,
        c.text_color,
    ));

    Block { height, shapes }
}

// ============================================================================
// Legend block
// ============================================================================

fn legend_block(legend: &Legend) -> Block {
    let x = MARGIN_MM;
    let mut shapes = Vec::new();
    let mut y = 0.0;

    y -= LEGEND_LINE_MM;
    shapes.push(text("Legend", x, y, LEGEND_TITLE_FONT_SIZE, Font::Bold, Color::BLACK));

    y -= LEGEND_LINE_MM;
    shapes.push(text("Seats per row", x, y, LEGEND_HEADER_FONT_SIZE, Font::Bold, Color::BLACK));

    y -= LEGEND_LINE_MM;
    shapes.push(text("Row:", x, y, LEGEND_FONT_SIZE, Font::Regular, Color::BLACK));
    for (i, row) in legend.rows.iter().enumerate() {
        let col_x = x + ROW_LABEL_COL_MM + i as f32 * ROW_VALUE_COL_MM;
        shapes.push(text(&row.label.to_string(), col_x, y, LEGEND_FONT_SIZE, Font::Regular, Color::BLACK));
    }

    y -= LEGEND_LINE_MM;
    shapes.push(text("Seats:", x, y, LEGEND_FONT_SIZE, Font::Bold, Color::BLACK));
    for (i, row) in legend.rows.iter().enumerate() {
        let col_x = x + ROW_LABEL_COL_MM + i as f32 * ROW_VALUE_COL_MM;
        shapes.push(text(&row.active.to_string(), col_x, y, LEGEND_FONT_SIZE, Font::Bold, Color::BLACK));
    }
    let total_x = x + ROW_LABEL_COL_MM + legend.rows.len() as f32 * ROW_VALUE_COL_MM + 4.0;
    shapes.push(text(
        &format!("Total: {}", legend.total_active()),
        total_x,
        y,
        LEGEND_FONT_SIZE,
        Font::Regular,
        Color::MUTED_GRAY,
    ));

    if !legend.entries.is_empty() {
        y -= LEGEND_LINE_MM * 1.5;
        shapes.push(text("Groups", x, y, LEGEND_HEADER_FONT_SIZE, Font::Bold, Color::BLACK));

        // Columns that fit across the page; further columns wrap to a
        // new band below.
        let per_band = ((PAGE_WIDTH_MM - MARGIN_MM - ENTRY_COL_MM - x) / ENTRY_COL_MM) as usize + 1;
        let mut band_top = y;
        let mut lowest = y;
        for (col, entries) in legend.columns().enumerate() {
            if col > 0 && col % per_band == 0 {
                band_top = lowest - LEGEND_LINE_MM / 2.0;
            }
            let col_x = x + (col % per_band) as f32 * ENTRY_COL_MM;
            let mut entry_y = band_top;
            for entry in entries {
                entry_y -= LEGEND_LINE_MM;
                legend_entry(&mut shapes, entry, col_x, entry_y);
            }
            lowest = lowest.min(entry_y);
        }
        y = lowest;
    }

    Block {
        height: -y + LEGEND_LINE_MM / 2.0,
        shapes,
    }
}

fn legend_entry(shapes: &mut Vec<Shape>, entry: &LegendEntry, x: f32, baseline: f32) {
    let (stroke, font) = if entry.hidden {
        (Some(Color::LIGHT_GRAY), Font::Italic)
    } else {
        (None, Font::Regular)
    };
    shapes.push(Shape::Rect {
        x,
        y: baseline - 0.5,
        width: SWATCH_MM,
        height: SWATCH_MM,
        fill: Some(entry.color),
        stroke,
    });

    let name_x = x + SWATCH_MM + 2.0;
    shapes.push(text(&entry.name, name_x, baseline, LEGEND_FONT_SIZE, font, Color::BLACK));

    let count_x = name_x + text_width_mm(&entry.name, LEGEND_FONT_SIZE) + 3.0;
    let seats = if entry.seats == 1 { "seat" } else { "seats" };
    shapes.push(text(
        &format!("({} {})", entry.seats, seats),
        count_x,
        baseline,
        LEGEND_SMALL_FONT_SIZE,
        Font::Regular,
        Color::MUTED_GRAY,
    ));
}

// ============================================================================
// Text helpers
// ============================================================================

fn text(s: &str, x: f32, y: f32, size_pt: f32, font: Font, color: Color) -> Shape {
    Shape::Text {
        x,
        y,
        size_pt,
        text: s.to_string(),
        font,
        color,
    }
}

/// Text centred on `(cx, cy)`, using an estimated glyph width since the
/// builtin fonts carry no metrics.
fn centered_text(s: &str, cx: f32, cy: f32, size_pt: f32, font: Font, color: Color) -> Shape {
    let (x, y) = centered_origin(s, cx, cy, size_pt);
    text(s, x, y, size_pt, font, color)
}

fn centered_origin(s: &str, cx: f32, cy: f32, size_pt: f32) -> (f32, f32) {
    let size_mm = size_pt / PT_PER_MM;
    (cx - text_width_mm(s, size_pt) / 2.0, cy - size_mm * 0.35)
}

fn text_width_mm(s: &str, size_pt: f32) -> f32 {
    s.chars().count() as f32 * size_pt * GLYPH_WIDTH_RATIO / PT_PER_MM
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::PALETTE;
    use crate::session::Session;

    fn plan_for(session: &Session, pagination: Pagination) -> ExportPlan {
        ExportPlan::build(&session.projection(), &session.legend(), pagination).unwrap()
    }

    #[test]
    fn stage_fills_content_width() {
        let plan = plan_for(&Session::new(), Pagination::Flow);
        assert!((plan.scale - 267.0 / 600.0).abs() < 1e-6);
    }

    #[test]
    fn seats_stay_inside_the_page_width() {
        let mut session = Session::new();
        session.set_num_rows(10);
        for row in 0..10 {
            session.set_seats(row, 30);
        }
        let plan = plan_for(&session, Pagination::Flow);
        for seat in plan.seats() {
            assert!(seat.cx - seat.radius >= MARGIN_MM - 0.01);
            assert!(seat.cx + seat.radius <= PAGE_WIDTH_MM - MARGIN_MM + 0.01);
            assert!(seat.cy - seat.radius >= MARGIN_MM);
            assert!(seat.cy + seat.radius <= PAGE_HEIGHT_MM - MARGIN_MM + 0.01);
        }
    }

    #[test]
    fn positions_are_the_projection_scaled() {
        let session = Session::new();
        let projection = session.projection();
        let plan = plan_for(&session, Pagination::Flow);
        let a = projection.seat(SeatId::new(3, 0)).unwrap();
        let b = projection.seat(SeatId::new(3, 9)).unwrap();
        let pa = plan.seat(a.id).unwrap();
        let pb = plan.seat(b.id).unwrap();
        let expected = ((b.x - a.x) as f32) * plan.scale;
        assert!((pb.cx - pa.cx - expected).abs() < 1e-3);
        assert!((pa.radius - a.diameter as f32 * plan.scale / 2.0).abs() < 1e-4);
    }

    #[test]
    fn conductor_marker_is_present() {
        let plan = plan_for(&Session::new(), Pagination::Flow);
        let first = &plan.pages[0];
        assert!(first.texts().any(|t| t == "D"));
        assert!(first
            .shapes
            .iter()
            .any(|s| matches!(s, Shape::Rect { fill: Some(_), stroke: None, .. })));
    }

    #[test]
    fn legend_moves_to_next_page_when_chart_is_tall() {
        let plan = plan_for(&Session::new(), Pagination::Flow);
        assert_eq!(plan.pages.len(), 2);
        assert_eq!(plan.pages[0].seats().count(), 40);
        assert!(plan.pages[1].texts().any(|t| t == "Legend"));
        assert_eq!(plan.pages[1].seats().count(), 0);
    }

    #[test]
    fn slice_repeats_the_whole_image_on_every_page() {
        let plan = plan_for(&Session::new(), Pagination::Slice);
        assert!(plan.pages.len() >= 2);
        let first = &plan.pages[0];
        let second = &plan.pages[1];
        assert_eq!(first.shapes.len(), second.shapes.len());
        let a = first.seats().next().unwrap();
        let b = second.seats().next().unwrap();
        assert!((b.cy - a.cy - PAGE_HEIGHT_MM).abs() < 1e-3);
    }

    #[test]
    fn legend_lists_groups_and_hidden_entry() {
        let mut session = Session::new();
        session.add_group("Violins", PALETTE[0]);
        session.materialize_hidden_group();
        let plan = plan_for(&session, Pagination::Flow);
        let texts: Vec<&str> = plan.pages.iter().flat_map(Page::texts).collect();
        assert!(texts.contains(&"Violins"));
        assert!(texts.contains(&"Hidden"));
        assert!(texts.contains(&"(0 seats)"));
        assert!(texts.contains(&"Total: 40"));
        let italic = plan.pages.iter().flat_map(|p| &p.shapes).any(|s| {
            matches!(s, Shape::Text { text, font: Font::Italic, .. } if text == "Hidden")
        });
        assert!(italic);
    }

    #[test]
    fn many_groups_wrap_the_legend_inside_the_page() {
        let mut session = Session::new();
        session.set_num_rows(1);
        for i in 0..13 {
            session.add_group(&format!("Group {}", i), PALETTE[i % PALETTE.len()]);
        }
        session.materialize_hidden_group();
        let plan = plan_for(&session, Pagination::Flow);

        let texts: Vec<&str> = plan.pages.iter().flat_map(Page::texts).collect();
        assert!(texts.contains(&"Group 12"));
        for shape in plan.pages.iter().flat_map(|p| &p.shapes) {
            let (x, y, width) = match shape {
                Shape::Rect { x, y, width, .. } => (*x, *y, *width),
                Shape::Text { x, y, text, size_pt, .. } => (*x, *y, text_width_mm(text, *size_pt)),
                _ => continue,
            };
            assert!(x + width <= PAGE_WIDTH_MM - MARGIN_MM + 0.01, "x = {}", x);
            assert!(y >= MARGIN_MM - 1.0, "y = {}", y);
        }
    }

    #[test]
    fn fully_hidden_layout_cannot_be_exported() {
        let mut session = Session::new();
        session.set_num_rows(1);
        session.set_seats(0, 2);
        session.materialize_hidden_group();
        session.toggle_selection(0);
        session.toggle_seat(SeatId::new(0, 0));
        session.toggle_seat(SeatId::new(0, 1));
        session.clear_selection();

        let result = ExportPlan::build(&session.projection(), &session.legend(), Pagination::Flow);
        assert!(matches!(result, Err(ChartError::EmptyLayout)));
    }
}
