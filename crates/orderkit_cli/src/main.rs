use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "orderkit")]
#[command(about = "Export order-report tables to a formatted Excel workbook.")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(long_about = "Write one or more tables to an .xlsx workbook.

Each --sheet NAME=FILE becomes one tab, in the order given. FILE may be
.csv, .ipc/.arrow/.feather (Arrow IPC) or .json (array of objects).

Every tab gets:
  - the header row frozen
  - an autofilter over the full table
  - a red/yellow/green color scale on each column whose first value is numeric

EXAMPLE:
  orderkit export -o exports/olist_report.xlsx \\
      --sheet top_categories=out/pie.csv \\
      --sheet top_sellers=out/bar.csv \\
      --sheet monthly_revenue=out/line.json")]
    /// Export tables to a formatted workbook
    Export {
        /// Output workbook path (parent directories are created)
        #[arg(short, long)]
        output: PathBuf,

        /// Sheet as NAME=FILE; repeat for more tabs
        #[arg(short, long = "sheet", value_name = "NAME=FILE", value_parser = commands::parse_sheet_arg)]
        sheets: Vec<(String, PathBuf)>,

        /// Color for the column minimum
        #[arg(long, default_value = orderkit_io_xlsx::conf::C_COLOR_SCALE_MIN)]
        min_color: String,

        /// Color for the mid percentile
        #[arg(long, default_value = orderkit_io_xlsx::conf::C_COLOR_SCALE_MID)]
        mid_color: String,

        /// Color for the column maximum
        #[arg(long, default_value = orderkit_io_xlsx::conf::C_COLOR_SCALE_MAX)]
        max_color: String,

        /// Percentile of the middle color stop
        #[arg(long, default_value_t = orderkit_io_xlsx::conf::N_COLOR_SCALE_MID_PERCENTILE)]
        mid_percentile: u8,

        /// Write NA/NaN/Inf text instead of blank cells
        #[arg(long)]
        keep_missing: bool,

        /// Plan and report without writing the workbook
        #[arg(short = 'n', long)]
        dry_run: bool,
    },
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Export {
            output,
            sheets,
            min_color,
            mid_color,
            max_color,
            mid_percentile,
            keep_missing,
            dry_run,
        } => commands::export(commands::ExportArgs {
            output,
            sheets,
            min_color,
            mid_color,
            max_color,
            mid_percentile,
            keep_missing,
            dry_run,
        }),
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "orderkit=info,orderkit_io_xlsx=info".into()),
        )
        .init();
}
