//! Polar layout of the seat arc.
//!
//! Rows are concentric half rings opening towards the conductor. All
//! lengths are in stage units (screen pixels); the PDF export scales them
//! uniformly into millimetres.
//!
//! ```
//! use seating_chart::geometry::{RowConfig, StageGeometry};
//!
//! let stage = StageGeometry::compute(&RowConfig::default());
//! assert_eq!(stage.diameter, 600.0);
//! assert_eq!(stage.rows[0].radius, 105.0);
//! ```

use serde::{Deserialize, Serialize};

// ============================================================================
// Constants
// ============================================================================

pub const MIN_ROWS: usize = 1;
pub const MAX_ROWS: usize = 10;
pub const DEFAULT_ROWS: usize = 4;

pub const MIN_SEATS: u32 = 1;
pub const MAX_SEATS: u32 = 30;
/// Seat count given to rows created by growing the row count.
pub const DEFAULT_SEATS: u32 = 10;

/// Stage diameter for up to four rows; every extra row adds `STAGE_GROWTH`.
const BASE_STAGE_DIAMETER: f64 = 600.0;
const STAGE_GROWTH: f64 = 50.0;
/// Rows beyond this count grow the stage and shrink the seats.
const COMPACT_ROWS: usize = 4;
const OUTER_PADDING: f64 = 30.0;
pub const MIN_RADIUS: f64 = 50.0;

const BASE_SEAT_SIZE: f64 = 40.0;
const MIN_SEAT_SIZE: f64 = 20.0;
const SEAT_SHRINK_PER_ROW: f64 = 2.0;
/// Share of the arc distance a crowded seat may occupy.
const CROWDED_SEAT_RATIO: f64 = 0.9;

/// Gap between the arc centre and the top edge of the conductor marker.
const CONDUCTOR_OFFSET: f64 = 20.0;

// ============================================================================
// Seat identity and row configuration
// ============================================================================

/// Stable identity of a seat: its row and its position within the row,
/// both zero-based and counted from the left end of the arc.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "(usize, usize)", into = "(usize, usize)")]
pub struct SeatId {
    pub row: usize,
    pub seat: usize,
}

impl SeatId {
    pub const fn new(row: usize, seat: usize) -> Self {
        Self { row, seat }
    }
}

impl From<(usize, usize)> for SeatId {
    fn from((row, seat): (usize, usize)) -> Self {
        Self::new(row, seat)
    }
}

impl From<SeatId> for (usize, usize) {
    fn from(id: SeatId) -> Self {
        (id.row, id.seat)
    }
}

/// Seat count per row. Always holds between [`MIN_ROWS`] and [`MAX_ROWS`]
/// entries, each between [`MIN_SEATS`] and [`MAX_SEATS`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowConfig {
    seats_per_row: Vec<u32>,
}

impl Default for RowConfig {
    fn default() -> Self {
        Self {
            seats_per_row: vec![DEFAULT_SEATS; DEFAULT_ROWS],
        }
    }
}

impl RowConfig {
    /// Build from raw counts, clamping the row count and every seat count.
    pub fn from_counts(counts: &[i64]) -> Self {
        let mut config = Self {
            seats_per_row: counts
                .iter()
                .take(MAX_ROWS)
                .map(|&c| clamp_seats(c))
                .collect(),
        };
        if config.seats_per_row.is_empty() {
            config.seats_per_row.push(DEFAULT_SEATS);
        }
        config
    }

    pub fn num_rows(&self) -> usize {
        self.seats_per_row.len()
    }

    pub fn seats_per_row(&self) -> &[u32] {
        &self.seats_per_row
    }

    pub fn seats_in_row(&self, row: usize) -> Option<u32> {
        self.seats_per_row.get(row).copied()
    }

    /// Change the number of rows. Retained rows keep their seat counts,
    /// new rows get [`DEFAULT_SEATS`]. Returns the clamped row count.
    pub fn resize(&mut self, num_rows: i64) -> usize {
        let n = num_rows.clamp(MIN_ROWS as i64, MAX_ROWS as i64) as usize;
        self.seats_per_row.resize(n, DEFAULT_SEATS);
        n
    }

    /// Set the seat count of an existing row, clamped to
    /// `[MIN_SEATS, MAX_SEATS]`. Returns `None` when the row does not exist.
    pub fn set_seats(&mut self, row: usize, seats: i64) -> Option<u32> {
        let slot = self.seats_per_row.get_mut(row)?;
        *slot = clamp_seats(seats);
        Some(*slot)
    }

    /// Whether `id` names a seat of the current layout.
    pub fn contains(&self, id: SeatId) -> bool {
        self.seats_in_row(id.row)
            .is_some_and(|n| (id.seat as u64) < n as u64)
    }

    /// Every seat of the layout, row by row.
    pub fn seat_ids(&self) -> impl Iterator<Item = SeatId> + '_ {
        self.seats_per_row
            .iter()
            .enumerate()
            .flat_map(|(row, &n)| (0..n as usize).map(move |seat| SeatId::new(row, seat)))
    }

    pub fn total_seats(&self) -> u32 {
        self.seats_per_row.iter().sum()
    }
}

fn clamp_seats(seats: i64) -> u32 {
    seats.clamp(MIN_SEATS as i64, MAX_SEATS as i64) as u32
}

// ============================================================================
// Derived geometry
// ============================================================================

/// One seat's position relative to the arc centre. `y` grows downwards,
/// so seats on the arc have `y <= 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeatGeometry {
    pub id: SeatId,
    pub angle_deg: f64,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RowGeometry {
    pub index: usize,
    pub radius: f64,
    pub angle_step_deg: f64,
    /// Draw diameter of every seat in this row.
    pub seat_size: f64,
    pub seats: Vec<SeatGeometry>,
}

/// Conductor marker, a rectangle centred horizontally below the arc.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConductorGeometry {
    /// Offset of the top edge below the arc centre.
    pub top: f64,
    pub width: f64,
    pub height: f64,
    pub font_size: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StageGeometry {
    pub diameter: f64,
    pub min_radius: f64,
    pub max_radius: f64,
    /// Seat diameter before per-row crowding is applied.
    pub seat_size: f64,
    pub rows: Vec<RowGeometry>,
    pub conductor: ConductorGeometry,
}

impl StageGeometry {
    /// Place every seat of `config` on its ring.
    pub fn compute(config: &RowConfig) -> Self {
        let num_rows = config.num_rows();
        let extra_rows = num_rows.saturating_sub(COMPACT_ROWS) as f64;

        let diameter = BASE_STAGE_DIAMETER + extra_rows * STAGE_GROWTH;
        let max_radius = diameter / 2.0 - OUTER_PADDING;
        let seat_size = (BASE_SEAT_SIZE - extra_rows * SEAT_SHRINK_PER_ROW).max(MIN_SEAT_SIZE);
        let ring_step = (max_radius - MIN_RADIUS) / num_rows as f64;

        let rows = config
            .seats_per_row()
            .iter()
            .enumerate()
            .map(|(index, &seats)| {
                let radius = MIN_RADIUS + (index + 1) as f64 * ring_step;
                layout_row(index, seats, radius, seat_size)
            })
            .collect();

        Self {
            diameter,
            min_radius: MIN_RADIUS,
            max_radius,
            seat_size,
            rows,
            conductor: ConductorGeometry {
                top: CONDUCTOR_OFFSET,
                width: seat_size * 2.0,
                height: seat_size * 1.7,
                font_size: seat_size * 0.8,
            },
        }
    }

    /// Look up one seat, if it exists in this layout.
    pub fn seat(&self, id: SeatId) -> Option<&SeatGeometry> {
        self.rows.get(id.row)?.seats.get(id.seat)
    }

    /// Vertical extent of the drawing relative to the arc centre:
    /// `(top, bottom)` with `top < 0`.
    pub fn vertical_extent(&self) -> (f64, f64) {
        let top = self
            .rows
            .iter()
            .flat_map(|row| row.seats.iter().map(move |s| s.y - row.seat_size / 2.0))
            .fold(0.0_f64, f64::min);
        (top, self.conductor.top + self.conductor.height)
    }
}

fn layout_row(index: usize, seats: u32, radius: f64, base_seat_size: f64) -> RowGeometry {
    // A lone seat sits at the top of the arc and has no neighbour to crowd.
    let angle_step_deg = if seats > 1 {
        180.0 / (seats - 1) as f64
    } else {
        0.0
    };
    let start_deg = if seats > 1 { -90.0 } else { 0.0 };

    let arc_distance = radius * angle_step_deg.to_radians();
    let seat_size = if seats > 1 && arc_distance <= base_seat_size {
        arc_distance * CROWDED_SEAT_RATIO
    } else {
        base_seat_size
    };

    let seats = (0..seats as usize)
        .map(|seat| {
            let angle_deg = start_deg + angle_step_deg * seat as f64;
            let rad = angle_deg.to_radians();
            SeatGeometry {
                id: SeatId::new(index, seat),
                angle_deg,
                x: radius * rad.sin(),
                y: -radius * rad.cos(),
            }
        })
        .collect();

    RowGeometry {
        index,
        radius,
        angle_step_deg,
        seat_size,
        seats,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn four_rows_of_ten() {
        let stage = StageGeometry::compute(&RowConfig::default());
        assert_eq!(stage.diameter, 600.0);
        assert_eq!(stage.max_radius, 270.0);
        assert_eq!(stage.min_radius, 50.0);
        assert_eq!(stage.seat_size, 40.0);
        assert_eq!(stage.rows[0].radius, 105.0);
        assert_eq!(stage.rows[3].radius, 270.0);

        let row = &stage.rows[0];
        assert_eq!(row.angle_step_deg, 20.0);
        assert_eq!(row.seats.len(), 10);
        assert_eq!(row.seats[0].angle_deg, -90.0);
        assert!(close(row.seats[9].angle_deg, 90.0));
        for pair in row.seats.windows(2) {
            assert!(close(pair[1].angle_deg - pair[0].angle_deg, 20.0));
        }
    }

    #[test]
    fn arc_ends_and_top() {
        let config = RowConfig::from_counts(&[3]);
        let stage = StageGeometry::compute(&config);
        let row = &stage.rows[0];
        let r = row.radius;
        assert!(close(row.seats[0].x, -r) && close(row.seats[0].y, 0.0));
        assert!(close(row.seats[1].x, 0.0) && close(row.seats[1].y, -r));
        assert!(close(row.seats[2].x, r) && close(row.seats[2].y, 0.0));
    }

    #[test]
    fn single_row_single_seat() {
        let stage = StageGeometry::compute(&RowConfig::from_counts(&[1]));
        assert_eq!(stage.rows.len(), 1);
        let row = &stage.rows[0];
        assert_eq!(row.radius, 50.0 + 220.0);
        assert_eq!(row.angle_step_deg, 0.0);
        assert_eq!(row.seats[0].angle_deg, 0.0);
        assert!(close(row.seats[0].x, 0.0));
        assert!(close(row.seats[0].y, -row.radius));
        assert_eq!(row.seat_size, stage.seat_size);
    }

    #[test]
    fn crowded_rows_shrink_independently() {
        let stage = StageGeometry::compute(&RowConfig::from_counts(&[10, 4, 10, 10]));
        // 105 * 20deg is about 36.65, under the 40 base size.
        let expected = 105.0 * 20f64.to_radians() * 0.9;
        assert!(close(stage.rows[0].seat_size, expected));
        // 160 * 60deg leaves plenty of room.
        assert_eq!(stage.rows[1].seat_size, 40.0);
    }

    #[test]
    fn larger_stages_use_smaller_seats() {
        let stage = StageGeometry::compute(&RowConfig::from_counts(&[10; 10]));
        assert_eq!(stage.diameter, 900.0);
        assert_eq!(stage.max_radius, 420.0);
        assert_eq!(stage.seat_size, 28.0);
        assert_eq!(stage.conductor.width, 56.0);
    }

    #[test]
    fn resize_truncates_and_extends() {
        let mut config = RowConfig::from_counts(&[3, 7, 12, 9]);
        config.resize(2);
        assert_eq!(config.seats_per_row(), &[3, 7]);

        let mut config = RowConfig::from_counts(&[3, 7, 12, 9]);
        config.resize(6);
        assert_eq!(config.seats_per_row(), &[3, 7, 12, 9, 10, 10]);
    }

    #[test]
    fn counts_are_clamped() {
        let mut config = RowConfig::default();
        assert_eq!(config.resize(0), 1);
        assert_eq!(config.resize(25), 10);
        assert_eq!(config.set_seats(0, 0), Some(1));
        assert_eq!(config.set_seats(0, 99), Some(30));
        assert_eq!(config.set_seats(10, 5), None);
        assert_eq!(RowConfig::from_counts(&[]).seats_per_row(), &[10]);
    }

    #[test]
    fn membership_and_enumeration() {
        let config = RowConfig::from_counts(&[2, 1]);
        let ids: Vec<SeatId> = config.seat_ids().collect();
        assert_eq!(ids, vec![SeatId::new(0, 0), SeatId::new(0, 1), SeatId::new(1, 0)]);
        assert!(config.contains(SeatId::new(1, 0)));
        assert!(!config.contains(SeatId::new(1, 1)));
        assert!(!config.contains(SeatId::new(2, 0)));
        assert_eq!(config.total_seats(), 3);
    }
}
