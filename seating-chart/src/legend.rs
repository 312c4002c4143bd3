//! Per-row seat statistics and group swatches printed under the chart.

use crate::color::Color;
use crate::geometry::RowConfig;
use crate::groups::{Group, GroupModel};

/// Legend entries per column before wrapping to the next one.
pub const ENTRIES_PER_COLUMN: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowStat {
    /// One-based row number as printed.
    pub label: usize,
    pub total: u32,
    pub hidden: u32,
    /// Seats that are not hidden.
    pub active: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegendEntry {
    pub name: String,
    pub color: Color,
    pub seats: usize,
    /// Hidden group entries print in italics with an outlined swatch.
    pub hidden: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Legend {
    pub rows: Vec<RowStat>,
    /// Hidden group first, then colored groups in storage order.
    pub entries: Vec<LegendEntry>,
}

impl Legend {
    /// Only seats inside the current layout are counted, so memberships
    /// kept for rows or seats that were removed do not inflate the totals.
    pub fn build(rows: &RowConfig, groups: &GroupModel) -> Self {
        let in_layout = |g: &Group| g.seats().iter().filter(|s| rows.contains(**s)).count();

        let row_stats = rows
            .seats_per_row()
            .iter()
            .enumerate()
            .map(|(index, &total)| {
                let hidden = groups.hidden().map_or(0, |g| {
                    g.seats()
                        .iter()
                        .filter(|s| s.row == index && rows.contains(**s))
                        .count() as u32
                });
                RowStat {
                    label: index + 1,
                    total,
                    hidden,
                    active: total.saturating_sub(hidden),
                }
            })
            .collect();

        let entries = groups
            .display_order()
            .into_iter()
            .filter_map(|i| groups.get(i))
            .map(|g| LegendEntry {
                name: g.name().to_string(),
                color: g.color(),
                seats: in_layout(g),
                hidden: g.is_hidden(),
            })
            .collect();

        Self {
            rows: row_stats,
            entries,
        }
    }

    pub fn total_active(&self) -> u32 {
        self.rows.iter().map(|r| r.active).sum()
    }

    /// Entries split into columns of at most [`ENTRIES_PER_COLUMN`].
    pub fn columns(&self) -> impl Iterator<Item = &[LegendEntry]> {
        self.entries.chunks(ENTRIES_PER_COLUMN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::PALETTE;
    use crate::geometry::SeatId;

    #[test]
    fn hidden_seats_reduce_active_counts() {
        let rows = RowConfig::from_counts(&[5, 5, 5]);
        let groups = GroupModel::new()
            .with_group_added("Violins", PALETTE[0])
            .unwrap()
            .with_hidden_group()
            .unwrap()
            .with_seat_toggled(0, SeatId::new(1, 0))
            .unwrap()
            .with_seat_toggled(0, SeatId::new(1, 4))
            .unwrap()
            .with_seat_toggled(1, SeatId::new(0, 0))
            .unwrap();

        let legend = Legend::build(&rows, &groups);
        let active: Vec<u32> = legend.rows.iter().map(|r| r.active).collect();
        assert_eq!(active, vec![5, 3, 5]);
        assert_eq!(legend.total_active(), 13);

        assert_eq!(legend.entries.len(), 2);
        assert!(legend.entries[0].hidden);
        assert_eq!(legend.entries[0].seats, 2);
        assert_eq!(legend.entries[1].name, "Violins");
        assert_eq!(legend.entries[1].seats, 1);
    }

    #[test]
    fn seats_outside_the_layout_are_not_counted() {
        let groups = GroupModel::new()
            .with_group_added("Horns", PALETTE[1])
            .unwrap()
            .with_seat_toggled(0, SeatId::new(3, 9))
            .unwrap()
            .with_seat_toggled(0, SeatId::new(0, 0))
            .unwrap();
        let legend = Legend::build(&RowConfig::from_counts(&[4, 4]), &groups);
        assert_eq!(legend.entries[0].seats, 1);
        assert_eq!(legend.rows.len(), 2);
    }

    #[test]
    fn entries_wrap_every_three() {
        let mut groups = GroupModel::new();
        for (i, c) in PALETTE.iter().take(7).enumerate() {
            groups = groups.with_group_added(&format!("G{i}"), *c).unwrap();
        }
        let legend = Legend::build(&RowConfig::default(), &groups);
        let sizes: Vec<usize> = legend.columns().map(<[LegendEntry]>::len).collect();
        assert_eq!(sizes, vec![3, 3, 1]);
    }
}
