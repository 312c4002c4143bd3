//! JSON chart files.
//!
//! A chart file describes the rows and the seat assignments to start from.
//! It is applied by replaying ordinary session operations, so an entry that
//! breaks a membership rule is corrected (or skipped) the same way it would
//! be in the editor.
//!
//! ```json
//! {
//!   "seats_per_row": [5, 5, 5],
//!   "hidden": [[1, 0]],
//!   "groups": [
//!     { "name": "Violins", "color": "#E74C3C", "seats": [[0, 0], [0, 1], [0, 2]] }
//!   ]
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::color::Color;
use crate::error::{ChartError, Result};
use crate::geometry::SeatId;
use crate::groups::Group;
use crate::session::{Outcome, Session};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChartFile {
    #[serde(default)]
    pub seats_per_row: Vec<i64>,
    #[serde(default)]
    pub hidden: Option<Vec<SeatId>>,
    #[serde(default)]
    pub groups: Vec<GroupEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GroupEntry {
    pub name: String,
    /// Falls back to the suggested color when absent.
    #[serde(default)]
    pub color: Option<Color>,
    #[serde(default)]
    pub seats: Vec<SeatId>,
}

impl ChartFile {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ChartError::ChartFile(format!("{}: {}", path.display(), e)))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        serde_json::from_str(content)
            .map_err(|e| ChartError::ChartFile(format!("Invalid JSON: {}", e)))
    }

    /// Snapshot of `session` as a chart file. Memberships kept for seats
    /// outside the current layout are left out.
    pub fn from_session(session: &Session) -> Self {
        let rows = session.rows();
        let groups = session.groups();
        let in_layout = |g: &Group| -> Vec<SeatId> {
            g.seats().iter().copied().filter(|&s| rows.contains(s)).collect()
        };
        Self {
            seats_per_row: rows.seats_per_row().iter().map(|&n| n as i64).collect(),
            hidden: groups.hidden().map(in_layout),
            groups: groups
                .colored()
                .map(|(_, g)| GroupEntry {
                    name: g.name().to_string(),
                    color: Some(g.color()),
                    seats: in_layout(g),
                })
                .collect(),
        }
    }

    /// Replay this file into `session`. Returns how many operations were
    /// rejected; each one is logged.
    pub fn apply(&self, session: &mut Session) -> usize {
        let mut rejected = 0;
        let mut check = |what: &str, outcome: Outcome| {
            if let Outcome::Rejected(reason) = outcome {
                warn!(entry = what, %reason, "chart file entry rejected");
                rejected += 1;
            }
        };

        if !self.seats_per_row.is_empty() {
            check("seats_per_row", session.set_num_rows(self.seats_per_row.len() as i64));
            for (row, &seats) in self.seats_per_row.iter().enumerate() {
                check("seats_per_row", session.set_seats(row, seats));
            }
        }

        if let Some(hidden) = &self.hidden {
            check("hidden", session.materialize_hidden_group());
            if let Some(index) = session.groups().hidden_index() {
                select(session, index);
                for &seat in hidden {
                    if !session.groups().is_hidden_seat(seat) {
                        check("hidden", session.toggle_seat(seat));
                    }
                }
            }
        }

        for entry in &self.groups {
            let color = entry.color.unwrap_or_else(|| session.suggested_color());
            let before = session.groups().len();
            check(&entry.name, session.add_group(&entry.name, color));
            if session.groups().len() == before {
                continue;
            }
            select(session, before);
            for &seat in &entry.seats {
                // Toggling twice would undo the assignment.
                let already = session
                    .groups()
                    .get(before)
                    .is_some_and(|g| g.contains(seat));
                if !already {
                    check(&entry.name, session.toggle_seat(seat));
                }
            }
        }

        session.clear_selection();
        rejected
    }
}

fn select(session: &mut Session, index: usize) {
    if session.selected() != Some(index) {
        let _ = session.toggle_selection(index);
    }
}
