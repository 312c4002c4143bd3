//! Editing session: the single owner of all mutable chart state.
//!
//! Every operation runs to completion before the next one starts and
//! returns an [`Outcome`]. A rejected operation leaves the session exactly
//! as it was, so callers that do not care may simply ignore the result.

use tracing::debug;

use crate::color::{self, Color};
use crate::geometry::{RowConfig, SeatId, StageGeometry};
use crate::groups::{Group, GroupModel, Rejection};
use crate::legend::Legend;
use crate::projector::{self, Projection};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    Rejected(Rejection),
}

impl Outcome {
    pub fn is_applied(self) -> bool {
        self == Outcome::Applied
    }
}

/// Pending rename of a group: the text typed so far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditState {
    pub index: usize,
    pub text: String,
}

#[derive(Debug, Clone, Default)]
pub struct Session {
    rows: RowConfig,
    groups: GroupModel,
    selected: Option<usize>,
    editing: Option<EditState>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> &RowConfig {
        &self.rows
    }

    pub fn groups(&self) -> &GroupModel {
        &self.groups
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn editing(&self) -> Option<&EditState> {
        self.editing.as_ref()
    }

    pub fn hidden_selected(&self) -> bool {
        self.selected
            .and_then(|i| self.groups.get(i))
            .is_some_and(Group::is_hidden)
    }

    // ========================================================================
    // Layout
    // ========================================================================

    /// Set the row count, clamped to `[1, 10]`. Group memberships of rows
    /// that disappear are kept and come back if the rows do.
    pub fn set_num_rows(&mut self, num_rows: i64) -> Outcome {
        let n = self.rows.resize(num_rows);
        debug!(requested = num_rows, rows = n, "row count set");
        Outcome::Applied
    }

    /// Set one row's seat count, clamped to `[1, 30]`.
    pub fn set_seats(&mut self, row: usize, seats: i64) -> Outcome {
        match self.rows.set_seats(row, seats) {
            Some(n) => {
                debug!(row, seats = n, "seat count set");
                Outcome::Applied
            }
            None => self.reject("set_seats", Rejection::NoSuchRow),
        }
    }

    // ========================================================================
    // Groups
    // ========================================================================

    /// Color to offer for the next new group: a palette entry no colored
    /// group uses yet, or any palette entry once all are taken.
    pub fn suggested_color(&self) -> Color {
        color::suggest_color(&self.groups.used_colors())
    }

    pub fn add_group(&mut self, name: &str, color: Color) -> Outcome {
        let result = self.groups.with_group_added(name, color);
        self.commit("add_group", result)
    }

    pub fn recolor_group(&mut self, index: usize, color: Color) -> Outcome {
        let result = self.groups.with_recolored(index, color);
        self.commit("recolor_group", result)
    }

    /// Rename in one step; the same rules as [`Session::commit_edit`].
    pub fn rename_group(&mut self, index: usize, new_name: &str) -> Outcome {
        let result = self.groups.with_renamed(index, new_name);
        self.commit("rename_group", result)
    }

    pub fn delete_group(&mut self, index: usize) -> Outcome {
        match self.groups.without_group(index) {
            Ok(groups) => {
                self.groups = groups;
                self.selected = shift_after_removal(self.selected, index);
                self.editing = self.editing.take().and_then(|mut edit| {
                    edit.index = shift_after_removal(Some(edit.index), index)?;
                    Some(edit)
                });
                debug!(index, "group deleted");
                Outcome::Applied
            }
            Err(reason) => self.reject("delete_group", reason),
        }
    }

    /// Create the hidden group in front of the others. Selection and edit
    /// state move along with the groups they point at.
    pub fn materialize_hidden_group(&mut self) -> Outcome {
        match self.groups.with_hidden_group() {
            Ok(groups) => {
                self.groups = groups;
                self.selected = self.selected.map(|i| i + 1);
                if let Some(edit) = self.editing.as_mut() {
                    edit.index += 1;
                }
                debug!("hidden group created");
                Outcome::Applied
            }
            Err(reason) => self.reject("materialize_hidden_group", reason),
        }
    }

    // ========================================================================
    // Rename transaction
    // ========================================================================

    /// Start renaming a colored group, seeding the text with its name.
    pub fn begin_edit(&mut self, index: usize) -> Outcome {
        match self.groups.get(index) {
            None => self.reject("begin_edit", Rejection::NoSuchGroup),
            Some(g) if g.is_hidden() => self.reject("begin_edit", Rejection::HiddenGroupImmutable),
            Some(g) => {
                self.editing = Some(EditState {
                    index,
                    text: g.name().to_string(),
                });
                Outcome::Applied
            }
        }
    }

    pub fn set_edit_text(&mut self, text: &str) -> Outcome {
        match self.editing.as_mut() {
            Some(edit) => {
                edit.text = text.to_string();
                Outcome::Applied
            }
            None => self.reject("set_edit_text", Rejection::NotEditing),
        }
    }

    /// Finish the rename (blur or Enter). The edit ends either way; the
    /// name only changes when the typed text is acceptable.
    pub fn commit_edit(&mut self) -> Outcome {
        let Some(edit) = self.editing.take() else {
            return self.reject("commit_edit", Rejection::NotEditing);
        };
        self.rename_group(edit.index, &edit.text)
    }

    pub fn cancel_edit(&mut self) -> Outcome {
        match self.editing.take() {
            Some(_) => Outcome::Applied,
            None => self.reject("cancel_edit", Rejection::NotEditing),
        }
    }

    // ========================================================================
    // Selection and seat assignment
    // ========================================================================

    /// Select a group, or unselect it if it already is the selection.
    pub fn toggle_selection(&mut self, index: usize) -> Outcome {
        if index >= self.groups.len() {
            return self.reject("toggle_selection", Rejection::NoSuchGroup);
        }
        self.selected = if self.selected == Some(index) {
            None
        } else {
            Some(index)
        };
        debug!(selected = ?self.selected, "selection changed");
        Outcome::Applied
    }

    pub fn clear_selection(&mut self) -> Outcome {
        self.selected = None;
        Outcome::Applied
    }

    /// Toggle a seat in the selected group.
    pub fn toggle_seat(&mut self, seat: SeatId) -> Outcome {
        let Some(selected) = self.selected else {
            return self.reject("toggle_seat", Rejection::NoSelection);
        };
        if !self.rows.contains(seat) {
            return self.reject("toggle_seat", Rejection::SeatOutsideLayout);
        }
        let result = self.groups.with_seat_toggled(selected, seat);
        self.commit("toggle_seat", result)
    }

    // ========================================================================
    // Derived views
    // ========================================================================

    pub fn geometry(&self) -> StageGeometry {
        StageGeometry::compute(&self.rows)
    }

    pub fn projection(&self) -> Projection {
        projector::project(&self.geometry(), &self.groups, self.selected)
    }

    pub fn legend(&self) -> Legend {
        Legend::build(&self.rows, &self.groups)
    }

    fn commit(&mut self, op: &'static str, result: Result<GroupModel, Rejection>) -> Outcome {
        match result {
            Ok(groups) => {
                self.groups = groups;
                debug!(op, groups = self.groups.len(), "applied");
                Outcome::Applied
            }
            Err(reason) => self.reject(op, reason),
        }
    }

    fn reject(&self, op: &'static str, reason: Rejection) -> Outcome {
        debug!(op, %reason, "rejected");
        Outcome::Rejected(reason)
    }
}

/// Index that pointed at the same group before `removed` was taken out,
/// or `None` if it pointed at the removed group.
fn shift_after_removal(index: Option<usize>, removed: usize) -> Option<usize> {
    match index? {
        i if i == removed => None,
        i if i > removed => Some(i - 1),
        i => Some(i),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::PALETTE;
    use crate::groups::HIDDEN_GROUP_NAME;

    fn seat(row: usize, seat: usize) -> SeatId {
        SeatId::new(row, seat)
    }

    #[test]
    fn toggling_without_selection_is_rejected() {
        let mut session = Session::new();
        session.add_group("Flutes", PALETTE[0]);
        assert_eq!(
            session.toggle_seat(seat(0, 0)),
            Outcome::Rejected(Rejection::NoSelection)
        );
        assert!(session.groups().get(0).unwrap().seats().is_empty());
    }

    #[test]
    fn seats_outside_the_layout_are_rejected() {
        let mut session = Session::new();
        session.add_group("Flutes", PALETTE[0]);
        session.toggle_selection(0);
        assert_eq!(
            session.toggle_seat(seat(0, 10)),
            Outcome::Rejected(Rejection::SeatOutsideLayout)
        );
        assert_eq!(
            session.toggle_seat(seat(4, 0)),
            Outcome::Rejected(Rejection::SeatOutsideLayout)
        );
    }

    #[test]
    fn reserved_name_add_leaves_group_count_unchanged() {
        let mut session = Session::new();
        session.add_group("Oboes", PALETTE[0]);
        let outcome = session.add_group(HIDDEN_GROUP_NAME, PALETTE[1]);
        assert_eq!(outcome, Outcome::Rejected(Rejection::ReservedName));
        assert_eq!(session.groups().len(), 1);
    }

    #[test]
    fn renaming_hidden_group_changes_nothing() {
        let mut session = Session::new();
        session.add_group("Oboes", PALETTE[0]);
        session.materialize_hidden_group();
        session.toggle_selection(0);
        session.toggle_seat(seat(1, 1));
        let before = session.groups().clone();

        assert_eq!(
            session.rename_group(0, "Visible"),
            Outcome::Rejected(Rejection::HiddenGroupImmutable)
        );
        assert_eq!(
            session.begin_edit(0),
            Outcome::Rejected(Rejection::HiddenGroupImmutable)
        );
        assert_eq!(session.groups(), &before);
        assert!(session.editing().is_none());
    }

    #[test]
    fn edit_transaction_commits_valid_names_only() {
        let mut session = Session::new();
        session.add_group("Oboes", PALETTE[0]);

        session.begin_edit(0);
        assert_eq!(session.editing().unwrap().text, "Oboes");
        session.set_edit_text("Horns");
        assert!(session.commit_edit().is_applied());
        assert_eq!(session.groups().get(0).unwrap().name(), "Horns");
        assert!(session.editing().is_none());

        session.begin_edit(0);
        session.set_edit_text("  ");
        assert_eq!(session.commit_edit(), Outcome::Rejected(Rejection::EmptyName));
        assert_eq!(session.groups().get(0).unwrap().name(), "Horns");
        assert!(session.editing().is_none());

        assert_eq!(session.commit_edit(), Outcome::Rejected(Rejection::NotEditing));
    }

    #[test]
    fn deleting_clears_selection_and_edit_of_that_group() {
        let mut session = Session::new();
        session.add_group("Oboes", PALETTE[0]);
        session.add_group("Horns", PALETTE[1]);
        session.toggle_selection(1);
        session.begin_edit(1);

        assert!(session.delete_group(1).is_applied());
        assert_eq!(session.selected(), None);
        assert!(session.editing().is_none());
    }

    #[test]
    fn deleting_an_earlier_group_keeps_selection_on_the_same_group() {
        let mut session = Session::new();
        session.add_group("Oboes", PALETTE[0]);
        session.add_group("Horns", PALETTE[1]);
        session.toggle_selection(1);
        session.begin_edit(1);

        session.delete_group(0);
        assert_eq!(session.selected(), Some(0));
        assert_eq!(session.editing().unwrap().index, 0);
        assert_eq!(session.groups().get(0).unwrap().name(), "Horns");
    }

    #[test]
    fn materializing_hidden_group_keeps_selection_on_the_same_group() {
        let mut session = Session::new();
        session.add_group("Oboes", PALETTE[0]);
        session.toggle_selection(0);

        assert!(session.materialize_hidden_group().is_applied());
        assert_eq!(session.selected(), Some(1));
        assert_eq!(
            session.materialize_hidden_group(),
            Outcome::Rejected(Rejection::HiddenGroupExists)
        );
        assert_eq!(session.groups().len(), 2);
    }

    #[test]
    fn selection_toggles() {
        let mut session = Session::new();
        session.add_group("Oboes", PALETTE[0]);
        session.toggle_selection(0);
        assert_eq!(session.selected(), Some(0));
        session.toggle_selection(0);
        assert_eq!(session.selected(), None);
        assert_eq!(
            session.toggle_selection(3),
            Outcome::Rejected(Rejection::NoSuchGroup)
        );
    }

    #[test]
    fn hidden_selection_is_reported() {
        let mut session = Session::new();
        session.materialize_hidden_group();
        assert!(!session.hidden_selected());
        session.toggle_selection(0);
        assert!(session.hidden_selected());
    }

    #[test]
    fn resizing_rows() {
        let mut session = Session::new();
        session.set_num_rows(2);
        assert_eq!(session.rows().seats_per_row(), &[10, 10]);
        session.set_seats(1, 7);
        session.set_num_rows(6);
        assert_eq!(session.rows().seats_per_row(), &[10, 7, 10, 10, 10, 10]);
        assert_eq!(session.set_seats(6, 3), Outcome::Rejected(Rejection::NoSuchRow));
    }

    #[test]
    fn suggested_color_avoids_used_colors() {
        let mut session = Session::new();
        for (i, c) in PALETTE.iter().take(9).enumerate() {
            session.add_group(&format!("G{i}"), *c);
        }
        assert_eq!(session.suggested_color(), PALETTE[9]);
    }
}
