//! SVG rendering of the projection for on-screen preview.
//!
//! The document is `stage_diameter` units square with the arc centre in the
//! middle, the same frame the editor works in. Every seat carries
//! `data-row`/`data-seat` attributes so a host page can route clicks back to
//! [`crate::session::Session::toggle_seat`].

use crate::projector::{Cursor, Projection, SeatDescriptor};

const SEAT_STROKE_WIDTH: f64 = 2.0;
const FONT_WEIGHT: u32 = 500;

/// Render a complete SVG document for `projection`.
pub fn render_stage_svg(projection: &Projection) -> String {
    let d = projection.stage_diameter;
    let cx = d / 2.0;
    let cy = d / 2.0;

    let mut svg = String::with_capacity(8192);
    svg.push_str(&format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}">"#,
        d as u32, d as u32, d, d
    ));
    svg.push('\n');
    svg.push_str(
        r##"<style>
  text { font-family: Helvetica, Arial, sans-serif; text-anchor: middle; dominant-baseline: central; }
</style>
"##,
    );

    for row in &projection.rows {
        svg.push_str(&format!(r#"<g class="row" data-row="{}">"#, row.index));
        svg.push('\n');
        for seat in &row.seats {
            render_seat(&mut svg, seat, cx, cy);
        }
        svg.push_str("</g>\n");
    }

    let c = &projection.conductor;
    svg.push_str(&format!(
        r#"<g class="conductor"><rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="{}"/><text x="{:.2}" y="{:.2}" font-size="{:.2}" fill="{}">{}</text></g>"#,
        cx - c.width / 2.0,
        cy + c.top,
        c.width,
        c.height,
        c.fill,
        cx,
        cy + c.top + c.height / 2.0,
        c.font_size,
        c.text_color,
        c.label,
    ));
    svg.push('\n');
    svg.push_str("</svg>\n");
    svg
}

fn render_seat(svg: &mut String, seat: &SeatDescriptor, cx: f64, cy: f64) {
    let cursor = match seat.cursor {
        Cursor::Pointer => "pointer",
        Cursor::Default => "default",
    };
    let x = cx + seat.x;
    let y = cy + seat.y;
    svg.push_str(&format!(
        r#"<g class="seat" data-row="{}" data-seat="{}" opacity="{}" style="cursor: {}">"#,
        seat.id.row, seat.id.seat, seat.opacity, cursor
    ));
    svg.push_str(&format!(
        r#"<circle cx="{:.2}" cy="{:.2}" r="{:.2}" fill="{}" stroke="{}" stroke-width="{}"/>"#,
        x,
        y,
        seat.diameter / 2.0,
        seat.fill,
        seat.stroke,
        SEAT_STROKE_WIDTH
    ));
    if !seat.label.is_empty() {
        svg.push_str(&format!(
            r#"<text x="{:.2}" y="{:.2}" font-size="{:.2}" font-weight="{}" fill="{}">{}</text>"#,
            x,
            y,
            seat.font_size,
            FONT_WEIGHT,
            seat.text_color,
            escape_xml(&seat.label)
        ));
    }
    svg.push_str("</g>\n");
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::PALETTE;
    use crate::geometry::SeatId;
    use crate::session::Session;

    #[test]
    fn svg_has_every_seat_and_the_conductor() {
        let session = Session::new();
        let svg = render_stage_svg(&session.projection());
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>\n"));
        assert_eq!(svg.matches("<circle").count(), 40);
        assert!(svg.contains(r#"data-row="3" data-seat="9""#));
        assert!(svg.contains(">D</text>"));
        assert!(svg.contains(r#"width="600""#));
    }

    #[test]
    fn labels_are_escaped() {
        let mut session = Session::new();
        session.add_group("<&>", PALETTE[0]);
        session.toggle_selection(0);
        session.toggle_seat(SeatId::new(0, 0));
        let svg = render_stage_svg(&session.projection());
        assert!(svg.contains("&lt;&amp;&gt;"));
        assert!(!svg.contains("<&>"));
    }

    #[test]
    fn hidden_seats_render_transparent() {
        let mut session = Session::new();
        session.materialize_hidden_group();
        session.toggle_selection(0);
        session.toggle_seat(SeatId::new(1, 2));
        session.clear_selection();
        let svg = render_stage_svg(&session.projection());
        assert!(svg.contains(r#"data-row="1" data-seat="2" opacity="0""#));
    }
}
