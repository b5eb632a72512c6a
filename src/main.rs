use clap::Parser;
use office_utils_rs::cli::{run_dump, run_export, ExportArgs, ReadArgs};
use office_utils_rs::{get_input_extensions, get_output_types};

use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Type of output (tsv, xlsx)
    #[arg(short = 't', long, value_name = "TYPE", default_value = "tsv")]
    to_type: String,

    /// Sheet index to read (0-based).
    #[arg(long, default_value_t = 0)]
    sheet: usize,
    /// Number of leading rows to skip.
    #[arg(long = "start-row", default_value_t = 0)]
    start_row: usize,
    /// Render every numeric as text with this many decimal places.
    #[arg(long)]
    decimals: Option<usize>,

    /// Title for the merged header row of the xlsx output.
    #[arg(long = "to-title")]
    title: Option<String>,
    /// Treat the first row as column names in the xlsx output.
    #[arg(long = "to-header", default_value_t = false)]
    header: bool,
    /// A comma-separated list of column widths for the xlsx output.
    #[arg(long = "to-col-width")]
    col_width: Option<String>,

    /// Input spreadsheet (.xls or .xlsx)
    input: Option<PathBuf>,

    /// Output file (default: stdout)
    output: Option<String>,

    /// List available input/output types
    #[arg(short = 'l', long)]
    list_type: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.list_type {
        println!("type of input:");
        println!("{}", get_input_extensions().join(" "));
        println!();
        println!("type of output:");
        println!("{}", get_output_types().join(" "));
        println!();
        return Ok(());
    }

    let input = cli
        .input
        .ok_or_else(|| anyhow::anyhow!("no input file given"))?;

    let mut output_writer: Box<dyn Write> = match cli.output {
        Some(path) if path != "-" => Box::new(File::create(path)?),
        _ => Box::new(io::stdout()),
    };

    let read_args = ReadArgs {
        sheet: cli.sheet,
        start_row: cli.start_row,
        decimals: cli.decimals,
    };

    match cli.to_type.as_str() {
        "tsv" => run_dump(&input, &mut output_writer, &read_args)?,
        "xlsx" => {
            let col_widths = cli.col_width.map(|s| {
                s.split(',')
                    .map(|w| w.trim().parse::<f64>().unwrap_or(10.0))
                    .collect::<Vec<_>>()
            });
            let export = ExportArgs {
                title: cli.title,
                header: cli.header,
                col_widths,
            };
            run_export(&input, &mut output_writer, &read_args, &export)?;
        }
        _ => anyhow::bail!(
            "Unsupported to_type: {}. Supported types are: {}",
            cli.to_type,
            get_output_types().join(", ")
        ),
    }

    Ok(())
}
