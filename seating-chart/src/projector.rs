//! Turns geometry plus group state into renderer-agnostic draw descriptors.
//!
//! The screen preview and the PDF export both draw from the same
//! [`Projection`], so what gets exported is what was edited.

use crate::color::{Color, DEFAULT_DARKEN};
use crate::geometry::{SeatId, StageGeometry};
use crate::groups::{Group, GroupModel};

/// Marker drawn on hidden seats while the hidden group is being edited.
pub const HIDDEN_MARK: &str = "X";
/// Characters of a group name shown on its seats.
const LABEL_CHARS: usize = 3;
/// Seat label size relative to the seat diameter.
const LABEL_SIZE_DIVISOR: f64 = 2.5;

pub const CONDUCTOR_LABEL: &str = "D";
const CONDUCTOR_FILL: Color = Color::new(0x33, 0x33, 0x33);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cursor {
    Default,
    /// Only while the hidden group is selected.
    Pointer,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeatDescriptor {
    pub id: SeatId,
    /// Centre offset from the arc centre, `y` growing downwards.
    pub x: f64,
    pub y: f64,
    pub diameter: f64,
    pub fill: Color,
    pub stroke: Color,
    pub text_color: Color,
    pub label: String,
    pub font_size: f64,
    /// 0.0 hides the seat entirely, 1.0 shows it.
    pub opacity: f64,
    pub cursor: Cursor,
}

impl SeatDescriptor {
    pub fn is_visible(&self) -> bool {
        self.opacity > 0.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RowProjection {
    pub index: usize,
    pub radius: f64,
    pub seats: Vec<SeatDescriptor>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConductorDescriptor {
    /// Top edge below the arc centre; the marker is centred on `x = 0`.
    pub top: f64,
    pub width: f64,
    pub height: f64,
    pub fill: Color,
    pub text_color: Color,
    pub label: &'static str,
    pub font_size: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    pub stage_diameter: f64,
    pub seat_size: f64,
    pub hidden_selected: bool,
    pub rows: Vec<RowProjection>,
    pub conductor: ConductorDescriptor,
    /// `(top, bottom)` of the drawing relative to the arc centre.
    pub extent: (f64, f64),
}

impl Projection {
    pub fn seats(&self) -> impl Iterator<Item = &SeatDescriptor> {
        self.rows.iter().flat_map(|r| r.seats.iter())
    }

    pub fn seat(&self, id: SeatId) -> Option<&SeatDescriptor> {
        self.rows.get(id.row)?.seats.get(id.seat)
    }

    /// Seat under a point given relative to the arc centre, for routing a
    /// click to [`crate::session::Session::toggle_seat`]. Invisible seats
    /// still answer, the way an invisible element still takes clicks.
    pub fn seat_at(&self, x: f64, y: f64) -> Option<SeatId> {
        self.seats()
            .map(|s| (s, (s.x - x).hypot(s.y - y)))
            .filter(|(s, d)| *d <= s.diameter / 2.0)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(s, _)| s.id)
    }
}

/// Describe every seat of `stage` as it should be drawn given `groups` and
/// the selected group index.
pub fn project(stage: &StageGeometry, groups: &GroupModel, selected: Option<usize>) -> Projection {
    let hidden_selected = selected
        .and_then(|i| groups.get(i))
        .is_some_and(Group::is_hidden);

    let rows = stage
        .rows
        .iter()
        .map(|row| RowProjection {
            index: row.index,
            radius: row.radius,
            seats: row
                .seats
                .iter()
                .map(|seat| {
                    let style = SeatStyle::resolve(groups, seat.id, hidden_selected);
                    SeatDescriptor {
                        id: seat.id,
                        x: seat.x,
                        y: seat.y,
                        diameter: row.seat_size,
                        font_size: row.seat_size / LABEL_SIZE_DIVISOR,
                        fill: style.fill,
                        stroke: style.stroke,
                        text_color: style.text_color,
                        label: style.label,
                        opacity: style.opacity,
                        cursor: if hidden_selected {
                            Cursor::Pointer
                        } else {
                            Cursor::Default
                        },
                    }
                })
                .collect(),
        })
        .collect();

    let c = &stage.conductor;
    Projection {
        stage_diameter: stage.diameter,
        seat_size: stage.seat_size,
        hidden_selected,
        rows,
        conductor: ConductorDescriptor {
            top: c.top,
            width: c.width,
            height: c.height,
            fill: CONDUCTOR_FILL,
            text_color: Color::WHITE,
            label: CONDUCTOR_LABEL,
            font_size: c.font_size,
        },
        extent: stage.vertical_extent(),
    }
}

struct SeatStyle {
    fill: Color,
    stroke: Color,
    text_color: Color,
    label: String,
    opacity: f64,
}

impl SeatStyle {
    fn resolve(groups: &GroupModel, id: SeatId, hidden_selected: bool) -> Self {
        match groups.group_of(id).map(|(_, g)| g) {
            Some(Group::Hidden { .. }) => Self {
                fill: Color::WHITE,
                stroke: Color::LIGHT_GRAY,
                text_color: Color::WHITE,
                label: if hidden_selected {
                    HIDDEN_MARK.to_string()
                } else {
                    String::new()
                },
                opacity: if hidden_selected { 1.0 } else { 0.0 },
            },
            Some(Group::Colored { name, color, .. }) => Self {
                fill: *color,
                stroke: color.darken(DEFAULT_DARKEN),
                text_color: Color::BLACK,
                label: name.chars().take(LABEL_CHARS).collect(),
                opacity: 1.0,
            },
            None => Self {
                fill: Color::NEUTRAL_GRAY,
                stroke: Color::BLACK,
                text_color: Color::BLACK,
                label: (id.seat + 1).to_string(),
                opacity: 1.0,
            },
        }
    }
}
