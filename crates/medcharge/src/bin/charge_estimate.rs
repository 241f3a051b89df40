//! Command-line estimate for a single applicant.
//!
//! ```text
//! charge_estimate --age 30 --sex Male --bmi 30.0 --children 0 --smoker No
//! ```

use std::process::ExitCode;

use clap::Parser;
use medcharge::inference::format_estimate;
use medcharge::model::DEFAULT_DATASET_LOCATION;
use medcharge::{PredictionRequest, Sex, Smoker, pipeline};
use tracing_subscriber::EnvFilter;

/// Estimate an annual medical insurance charge.
#[derive(Parser, Debug)]
#[command(name = "charge_estimate", version, about)]
struct Args {
    /// Age in years (5 to 80)
    #[arg(long)]
    age: u32,

    /// Male or Female
    #[arg(long, value_parser = parse_sex)]
    sex: Sex,

    /// Body-mass index (1.0 to 80.0)
    #[arg(long)]
    bmi: f32,

    /// Number of dependent children (0 to 10)
    #[arg(long, default_value_t = 0)]
    children: u32,

    /// Yes or No
    #[arg(long, value_parser = parse_smoker)]
    smoker: Smoker,

    /// Dataset to train on
    #[arg(long, env = "MEDCHARGE_DATASET", default_value = DEFAULT_DATASET_LOCATION)]
    dataset: String,

    /// Print the request and estimate as JSON
    #[arg(long)]
    json: bool,

    /// Log filter directive, e.g. `debug` or `medcharge=trace`
    #[arg(long, env = "MEDCHARGE_LOG", default_value = "info")]
    log: String,
}

fn parse_sex(value: &str) -> Result<Sex, String> {
    Sex::from_display(value).ok_or_else(|| format!("expected Male or Female, got '{value}'"))
}

fn parse_smoker(value: &str) -> Result<Smoker, String> {
    Smoker::from_display(value).ok_or_else(|| format!("expected Yes or No, got '{value}'"))
}

fn init_logging(directive: &str) {
    let filter = EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(&args.log);

    let request =
        PredictionRequest::from_categories(args.age, args.sex, args.bmi, args.children, args.smoker);

    let estimate = match pipeline::global().estimate(&args.dataset, &request) {
        Ok(value) => value,
        Err(err) => {
            eprintln!("Error: {err}");
            return ExitCode::FAILURE;
        }
    };

    if args.json {
        let body = serde_json::json!({
            "request": request,
            "estimate": estimate,
            "dataset": args.dataset,
        });
        match serde_json::to_string_pretty(&body) {
            Ok(text) => println!("{text}"),
            Err(err) => {
                eprintln!("Error: {err}");
                return ExitCode::FAILURE;
            }
        }
    } else {
        println!("{}", format_estimate(estimate));
    }
    ExitCode::SUCCESS
}
