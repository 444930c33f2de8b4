use avstats::aggregate::InjuryPolicy;
use avstats::driver::{self, ReportArgs};
use avstats::errors::Result;
use avstats::input;
use avstats::months::MonthPolicy;
use avstats::output;
use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};
use log::{error, info};
use std::path::PathBuf;
use std::{io, process};

#[derive(Parser)]
#[command(author, version, about)]
struct Args {
    /// Input file
    #[arg(default_value = "AviationData.txt")]
    infile: PathBuf,
    /// Field delimiter
    #[arg(short, long, default_value_t = '|')]
    delimiter: char,
    /// Value to look up (may be repeated)
    #[arg(long, default_value = "LAX94LA336")]
    find: Vec<String>,
    /// Only look for the values in this field
    #[arg(long)]
    field: Option<String>,
    /// Country whose accidents are counted per state
    #[arg(long, default_value = "United States")]
    country: String,
    /// Length of the ranked lists
    #[arg(long, default_value_t = 3)]
    top: usize,
    /// How to combine injuries of the same month
    #[arg(long, value_enum, default_value_t = InjuryPolicy::Sum)]
    injuries: InjuryPolicy,
    /// What to do with records without a month
    #[arg(long, value_enum, default_value_t = MonthPolicy::Skip)]
    months: MonthPolicy,
    /// Write the report also as JSON
    #[arg(long)]
    json: Option<PathBuf>,
    /// Write the report also as a spreadsheet
    #[arg(long)]
    xlsx: Option<PathBuf>,
    /// Pretty print JSON
    #[arg(short, long)]
    pretty: bool,
    #[command(flatten)]
    verbose: Verbosity<InfoLevel>,
}

fn process(args: &Args) -> Result<()> {
    let text = input::read_text(&args.infile)?;
    let set = input::load(&text, args.delimiter)?;
    let report_args = ReportArgs {
        find: &args.find,
        field: args.field.as_deref(),
        country: &args.country,
        top: args.top,
        injury_policy: args.injuries,
        month_policy: args.months,
    };
    let report = driver::run(&report_args, &text, &set)?;
    output::print_report(&mut io::stdout().lock(), &report)?;
    if let Some(path) = &args.json {
        info!("write: {}", path.display());
        output::write_json(path, &report, args.pretty)?;
    }
    if let Some(path) = &args.xlsx {
        info!("write: {}", path.display());
        output::write_xlsx(path, &report)?;
    }
    Ok(())
}

fn main() {
    let args = Args::parse();
    pretty_env_logger::formatted_timed_builder()
        .filter_level(args.verbose.log_level_filter())
        .init();
    match process(&args) {
        Ok(()) => (),
        Err(e) => {
            error!("{e}");
            process::exit(1);
        }
    }
}
