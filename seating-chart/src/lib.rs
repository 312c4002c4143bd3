//! seating-chart: arc-shaped orchestra seating charts.
//!
//! Seats are laid out on concentric half rings ([`geometry`]), assigned to
//! named, colored groups or hidden ([`groups`], edited through a
//! [`session::Session`]), described as draw instructions ([`projector`]) and
//! finally drawn either as an SVG preview ([`screen`]) or as a printable PDF
//! ([`export`], [`pdf`]).
//!
//! ```
//! use seating_chart::color::PALETTE;
//! use seating_chart::geometry::SeatId;
//! use seating_chart::session::Session;
//!
//! let mut session = Session::new();
//! session.add_group("Violins", PALETTE[0]);
//! session.toggle_selection(0);
//! session.toggle_seat(SeatId::new(0, 0));
//!
//! let projection = session.projection();
//! assert_eq!(projection.seat(SeatId::new(0, 0)).unwrap().label, "Vio");
//! ```

pub mod chart_file;
pub mod color;
pub mod error;
pub mod export;
pub mod geometry;
pub mod groups;
pub mod legend;
pub mod pdf;
pub mod projector;
pub mod screen;
pub mod session;

pub use error::{ChartError, Result};
