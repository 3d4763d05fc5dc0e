//! comunicado - turn pasted report text into a printable PDF

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use report::ReportType;

#[derive(Parser, Debug)]
#[command(name = "comunicado")]
#[command(version)]
#[command(about = "Generate comunicado PDFs from BR INTERIOR and SP CAPITAL reports", long_about = None)]
struct Cli {
    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Export one PDF page per unit of quantity
    Generate {
        /// Report layout (br-interior or sp-capital)
        #[arg(short, long)]
        report: ReportType,

        /// Report text file, or - for stdin
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Background image (PNG/JPEG) or PDF [default: poster.png]
        #[arg(short, long, value_name = "FILE")]
        background: Option<PathBuf>,

        /// TrueType font for the footer (overrides the template)
        #[arg(short, long, value_name = "FILE")]
        font: Option<PathBuf>,

        /// Page template JSON
        #[arg(short, long, value_name = "FILE")]
        template: Option<PathBuf>,

        /// Output file or directory [default: comunicado_<report>.pdf]
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },

    /// Parse report text and show the records without rendering
    Parse {
        /// Report layout (br-interior or sp-capital)
        #[arg(short, long)]
        report: ReportType,

        /// Report text file, or - for stdin
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Print records and skipped lines as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.quiet { "warn" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match cli.command {
        Commands::Generate {
            report,
            input,
            background,
            font,
            template,
            output,
        } => commands::generate(&commands::GenerateArgs {
            report,
            input,
            background,
            font,
            template,
            output,
        }),
        Commands::Parse {
            report,
            input,
            json,
        } => commands::parse(report, &input, json),
    }
}
