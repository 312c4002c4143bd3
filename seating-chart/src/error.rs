use thiserror::Error;

/// Errors surfaced while loading a chart or producing an export artifact.
///
/// Invalid editing input is not an error: session operations report it as
/// [`crate::session::Outcome::Rejected`] and leave the state untouched.
#[derive(Error, Debug)]
pub enum ChartError {
    #[error("Nothing to export: every seat in the layout is hidden")]
    EmptyLayout,
    #[error("Failed to create PDF: {0}")]
    Pdf(String),
    #[error("Failed to read chart file: {0}")]
    ChartFile(String),
    #[error("Invalid color: {0}")]
    InvalidColor(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ChartError>;
