// seating-chart: Generate printable orchestra seating charts

use clap::Parser;
use tracing::{debug, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use seating_chart::chart_file::ChartFile;
use seating_chart::error::ChartError;
use seating_chart::export::{ExportPlan, Pagination};
use seating_chart::pdf::{self, DEFAULT_OUTPUT};
use seating_chart::screen;
use seating_chart::session::{Outcome, Session};

// ============================================================================
// Data Structures
// ============================================================================

/// CLI Arguments
#[derive(Parser, Debug)]
#[command(author, version, about = "Generate printable orchestra seating charts")]
struct Args {
    /// Chart file (JSON rows, hidden seats and groups)
    #[arg(short, long)]
    chart: Option<String>,

    /// Number of rows (1-10), overrides the chart file
    #[arg(short, long)]
    rows: Option<i64>,

    /// Seats per row, comma separated (1-30 each), overrides the chart file
    #[arg(short, long, value_delimiter = ',')]
    seats: Vec<i64>,

    /// Output filename
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    output: String,

    /// Also write the on-screen layout as SVG
    #[arg(long)]
    svg: Option<String>,

    /// Write the resulting chart back out as JSON
    #[arg(long)]
    save_chart: Option<String>,

    /// How content taller than one page is paginated
    #[arg(long, value_enum, default_value_t = Pagination::Flow)]
    pagination: Pagination,

    /// Export with the hidden group selected, marking hidden seats with X
    #[arg(long)]
    show_hidden: bool,

    /// Log every editing operation
    #[arg(short, long)]
    verbose: bool,
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "seating_chart=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run(args: Args) -> Result<(), ChartError> {
    let mut session = Session::new();

    // Load chart file if provided
    if let Some(path) = &args.chart {
        let chart = ChartFile::load(path)?;
        let rejected = chart.apply(&mut session);
        if rejected > 0 {
            warn!(rejected, chart = %path, "some chart entries were not applied");
        }
    }

    let rejected = apply_layout_overrides(&mut session, args.rows, &args.seats);
    if rejected > 0 {
        warn!(rejected, "some layout overrides were not applied");
    }

    if args.show_hidden {
        match session.groups().hidden_index() {
            Some(index) => {
                let _ = session.toggle_selection(index);
            }
            None => debug!("no hidden group to show"),
        }
    }

    // Generate PDF
    let projection = session.projection();
    let legend = session.legend();
    let plan = ExportPlan::build(&projection, &legend, args.pagination)?;
    pdf::write_pdf(&plan, &args.output)?;

    if let Some(svg_path) = &args.svg {
        std::fs::write(svg_path, screen::render_stage_svg(&projection))?;
    }

    if let Some(chart_path) = &args.save_chart {
        let json = serde_json::to_string_pretty(&ChartFile::from_session(&session))
            .map_err(|e| ChartError::ChartFile(e.to_string()))?;
        std::fs::write(chart_path, json)?;
    }

    println!("✓ Generated: {}", args.output);
    println!("  Rows: {}", session.rows().num_rows());
    println!("  Active seats: {}", legend.total_active());
    println!("  Groups: {}", session.groups().colored().count());
    println!("  Pages: {}", plan.pages.len());

    Ok(())
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Returns how many overrides were rejected; each one is logged.
fn apply_layout_overrides(session: &mut Session, rows: Option<i64>, seats: &[i64]) -> usize {
    let mut rejected = 0;
    let mut check = |what: &str, outcome: Outcome| {
        if let Outcome::Rejected(reason) = outcome {
            warn!(entry = what, %reason, "layout override rejected");
            rejected += 1;
        }
    };

    let num_rows = rows.or_else(|| (!seats.is_empty()).then_some(seats.len() as i64));
    if let Some(n) = num_rows {
        check("rows", session.set_num_rows(n));
    }
    for (row, &count) in seats.iter().enumerate() {
        check("seats", session.set_seats(row, count));
    }
    rejected
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seats_beyond_the_row_count_are_rejected() {
        let mut session = Session::new();
        assert_eq!(apply_layout_overrides(&mut session, Some(2), &[5, 6, 7]), 1);
        assert_eq!(session.rows().seats_per_row(), &[5, 6]);
    }

    #[test]
    fn seat_list_sets_the_row_count() {
        let mut session = Session::new();
        assert_eq!(apply_layout_overrides(&mut session, None, &[3, 4, 5]), 0);
        assert_eq!(session.rows().seats_per_row(), &[3, 4, 5]);
    }
}
