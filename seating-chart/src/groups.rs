//! Seat groups and the membership rules between them.
//!
//! A [`GroupModel`] is an immutable snapshot: every mutation builds a new
//! snapshot (or reports why it was rejected) and leaves the old one intact.
//! Two invariants hold for every snapshot reachable through these
//! transforms:
//!
//! * a seat belongs to at most one colored group;
//! * a seat in the hidden group belongs to no colored group.

use std::collections::BTreeSet;
use std::fmt;

use crate::color::Color;
use crate::geometry::SeatId;

/// Display name of the hidden group. No colored group may use it.
pub const HIDDEN_GROUP_NAME: &str = "Hidden";

/// Longest group name accepted; longer input is cut to this many chars.
pub const MAX_NAME_CHARS: usize = 15;

/// Why an editing operation was not applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    EmptyName,
    ReservedName,
    /// The hidden group cannot be renamed, recolored, edited or deleted.
    HiddenGroupImmutable,
    NoSuchGroup,
    NoSelection,
    HiddenGroupExists,
    SeatOutsideLayout,
    NoSuchRow,
    NotEditing,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Rejection::EmptyName => "group name is empty",
            Rejection::ReservedName => "group name is reserved for the hidden group",
            Rejection::HiddenGroupImmutable => "the hidden group cannot be changed",
            Rejection::NoSuchGroup => "no group at that index",
            Rejection::NoSelection => "no group is selected",
            Rejection::HiddenGroupExists => "the hidden group already exists",
            Rejection::SeatOutsideLayout => "seat is not part of the layout",
            Rejection::NoSuchRow => "row is not part of the layout",
            Rejection::NotEditing => "no group is being edited",
        };
        f.write_str(msg)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Group {
    Hidden {
        seats: BTreeSet<SeatId>,
    },
    Colored {
        name: String,
        color: Color,
        seats: BTreeSet<SeatId>,
    },
}

impl Group {
    pub fn colored(name: impl Into<String>, color: Color) -> Self {
        Group::Colored {
            name: name.into(),
            color,
            seats: BTreeSet::new(),
        }
    }

    pub fn is_hidden(&self) -> bool {
        matches!(self, Group::Hidden { .. })
    }

    pub fn name(&self) -> &str {
        match self {
            Group::Hidden { .. } => HIDDEN_GROUP_NAME,
            Group::Colored { name, .. } => name,
        }
    }

    /// Swatch color; the hidden group shows as white.
    pub fn color(&self) -> Color {
        match self {
            Group::Hidden { .. } => Color::WHITE,
            Group::Colored { color, .. } => *color,
        }
    }

    pub fn seats(&self) -> &BTreeSet<SeatId> {
        match self {
            Group::Hidden { seats } | Group::Colored { seats, .. } => seats,
        }
    }

    pub fn contains(&self, seat: SeatId) -> bool {
        self.seats().contains(&seat)
    }

    fn with_seats(&self, seats: BTreeSet<SeatId>) -> Self {
        match self {
            Group::Hidden { .. } => Group::Hidden { seats },
            Group::Colored { name, color, .. } => Group::Colored {
                name: name.clone(),
                color: *color,
                seats,
            },
        }
    }
}

/// Trim, reject empty or reserved names, and cut to [`MAX_NAME_CHARS`].
pub fn validate_name(raw: &str) -> Result<String, Rejection> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(Rejection::EmptyName);
    }
    if name == HIDDEN_GROUP_NAME {
        return Err(Rejection::ReservedName);
    }
    let cut: String = name.chars().take(MAX_NAME_CHARS).collect();
    Ok(cut.trim_end().to_string())
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupModel {
    groups: Vec<Group>,
}

impl GroupModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Group> {
        self.groups.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Group> {
        self.groups.iter()
    }

    pub fn hidden_index(&self) -> Option<usize> {
        self.groups.iter().position(Group::is_hidden)
    }

    pub fn hidden(&self) -> Option<&Group> {
        self.groups.iter().find(|g| g.is_hidden())
    }

    pub fn is_hidden_seat(&self, seat: SeatId) -> bool {
        self.hidden().is_some_and(|g| g.contains(seat))
    }

    /// Colored groups with their storage index, in storage order.
    pub fn colored(&self) -> impl Iterator<Item = (usize, &Group)> {
        self.groups.iter().enumerate().filter(|(_, g)| !g.is_hidden())
    }

    /// Storage indices in display order: the hidden group first, then the
    /// colored groups as stored.
    pub fn display_order(&self) -> Vec<usize> {
        self.hidden_index()
            .into_iter()
            .chain(self.colored().map(|(i, _)| i))
            .collect()
    }

    /// First group holding `seat`, with its index.
    pub fn group_of(&self, seat: SeatId) -> Option<(usize, &Group)> {
        self.groups.iter().enumerate().find(|(_, g)| g.contains(seat))
    }

    pub fn used_colors(&self) -> Vec<Color> {
        self.colored().map(|(_, g)| g.color()).collect()
    }

    // ------------------------------------------------------------------------
    // Transforms
    // ------------------------------------------------------------------------

    pub fn with_group_added(&self, name: &str, color: Color) -> Result<Self, Rejection> {
        let name = validate_name(name)?;
        let mut groups = self.groups.clone();
        groups.push(Group::colored(name, color));
        Ok(Self { groups })
    }

    pub fn with_renamed(&self, index: usize, new_name: &str) -> Result<Self, Rejection> {
        let name = validate_name(new_name)?;
        self.map_colored(index, |g| {
            if let Group::Colored { name: current, .. } = g {
                *current = name;
            }
        })
    }

    pub fn with_recolored(&self, index: usize, new_color: Color) -> Result<Self, Rejection> {
        self.map_colored(index, |g| {
            if let Group::Colored { color, .. } = g {
                *color = new_color;
            }
        })
    }

    pub fn without_group(&self, index: usize) -> Result<Self, Rejection> {
        match self.groups.get(index) {
            None => Err(Rejection::NoSuchGroup),
            Some(g) if g.is_hidden() => Err(Rejection::HiddenGroupImmutable),
            Some(_) => {
                let mut groups = self.groups.clone();
                groups.remove(index);
                Ok(Self { groups })
            }
        }
    }

    /// Insert an empty hidden group in front of all other groups.
    pub fn with_hidden_group(&self) -> Result<Self, Rejection> {
        if self.hidden_index().is_some() {
            return Err(Rejection::HiddenGroupExists);
        }
        let groups = std::iter::once(Group::Hidden {
            seats: BTreeSet::new(),
        })
        .chain(self.groups.iter().cloned())
        .collect();
        Ok(Self { groups })
    }

    /// Toggle `seat` in the group at `selected`.
    ///
    /// With the hidden group selected the seat always leaves every colored
    /// group, whichever way it toggles. With a colored group selected, a
    /// seat joining it leaves every other group; a seat leaving it touches
    /// nothing else.
    pub fn with_seat_toggled(&self, selected: usize, seat: SeatId) -> Result<Self, Rejection> {
        let target = self.groups.get(selected).ok_or(Rejection::NoSuchGroup)?;
        let joining = !target.contains(seat);
        let claims_seat = target.is_hidden() || joining;

        let groups = self
            .groups
            .iter()
            .enumerate()
            .map(|(i, g)| {
                let mut seats = g.seats().clone();
                if i == selected {
                    if joining {
                        seats.insert(seat);
                    } else {
                        seats.remove(&seat);
                    }
                } else if claims_seat {
                    seats.remove(&seat);
                }
                g.with_seats(seats)
            })
            .collect();
        Ok(Self { groups })
    }

    fn map_colored(&self, index: usize, f: impl FnOnce(&mut Group)) -> Result<Self, Rejection> {
        match self.groups.get(index) {
            None => Err(Rejection::NoSuchGroup),
            Some(g) if g.is_hidden() => Err(Rejection::HiddenGroupImmutable),
            Some(_) => {
                let mut groups = self.groups.clone();
                f(&mut groups[index]);
                Ok(Self { groups })
            }
        }
    }
}
