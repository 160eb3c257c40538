//! calcfmt - compute, display and grade calculated answers

mod config;

use anyhow::{bail, Context, Result};
use calcformat::prelude::*;
use calcformat::{
    find_dataset_names, find_embedded_formula_errors, find_formula_errors, require_wildcards,
    CheckOutcome, PipelineState,
};
use clap::{ArgAction, Parser, Subcommand};
use config::{parse_binding, ConfigArgs};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "calcfmt")]
#[command(
    author,
    version,
    about = "Compute, display and grade calculated numeric answers"
)]
struct Cli {
    /// Log more (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check answer formulas and the answers they display for one dataset item
    Check {
        /// Answer formulas
        #[arg(required = true)]
        formulas: Vec<String>,

        /// Dataset values as name=value
        #[arg(short = 'd', long = "data", value_parser = parse_binding)]
        data: Vec<(String, f64)>,

        /// Question text whose {=formula} parts are checked too
        #[arg(long)]
        text: Option<String>,

        #[command(flatten)]
        config: ConfigArgs,
    },

    /// Compute the displayed correct answer of a formula
    Eval {
        formula: String,

        #[arg(short = 'd', long = "data", value_parser = parse_binding)]
        data: Vec<(String, f64)>,

        /// Print every pipeline step
        #[arg(long)]
        trace: bool,

        #[command(flatten)]
        config: ConfigArgs,
    },

    /// Grade a response against the answer a formula computes
    Grade {
        formula: String,

        #[arg(allow_hyphen_values = true)]
        response: String,

        #[arg(short = 'd', long = "data", value_parser = parse_binding)]
        data: Vec<(String, f64)>,

        #[command(flatten)]
        config: ConfigArgs,
    },

    /// Show how a response is read
    Parse {
        #[arg(allow_hyphen_values = true)]
        response: String,

        /// Unit entered separately from the number
        #[arg(short, long)]
        unit: Option<String>,

        #[command(flatten)]
        config: ConfigArgs,
    },

    /// List the dataset names a formula uses
    Names { formula: String },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Check {
            formulas,
            data,
            text,
            config,
        } => check(&formulas, data, text.as_deref(), &config),
        Commands::Eval {
            formula,
            data,
            trace,
            config,
        } => eval(&formula, data, trace, &config),
        Commands::Grade {
            formula,
            response,
            data,
            config,
        } => grade(&formula, &response, data, &config),
        Commands::Parse {
            response,
            unit,
            config,
        } => parse(&response, unit.as_deref(), &config),
        Commands::Names { formula } => names(&formula),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn pipeline(config: &ConfigArgs) -> Result<AnswerPipeline> {
    let record = config.record()?;
    debug!(?record, "answer record");
    AnswerPipeline::from_record(&record).context("Invalid answer configuration")
}

fn check(
    formulas: &[String],
    data: Vec<(String, f64)>,
    text: Option<&str>,
    config: &ConfigArgs,
) -> Result<()> {
    let record = config.record()?;
    let (answer_config, tolerance) = record.resolve().context("Invalid answer configuration")?;
    let data: DatasetItem = data.into_iter().collect();

    let mut problems = 0;
    for formula in formulas {
        if let Some(err) = find_formula_errors(formula) {
            println!("{}: {}", formula, err);
            problems += 1;
        }
    }
    if let Err(err) = require_wildcards(formulas.iter().map(String::as_str)) {
        println!("{}", err);
        problems += 1;
    }
    if let Some(text) = text {
        for (formula, err) in find_embedded_formula_errors(text) {
            println!("{{={}}}: {}", formula, err);
            problems += 1;
        }
    }

    let answers = formulas.iter().map(|f| (f.as_str(), tolerance));
    let result = check_dataset_item(answers, &data, &answer_config)?;

    for (i, answer) in result.answers.iter().enumerate() {
        match &answer.outcome {
            CheckOutcome::AnyValue => println!("{}\t{}\tany value", i, answer.formula),
            CheckOutcome::Failed(err) => {
                println!("{}\t{}\terror: {}", i, answer.formula, err);
            }
            CheckOutcome::Checked {
                displayed,
                interval,
                within_limits,
                ..
            } => {
                let status = if *within_limits {
                    "ok"
                } else {
                    "outside limits"
                };
                println!(
                    "{}\t{}\t{}\t{}\t{}",
                    i, answer.formula, displayed, interval, status
                );
            }
        }
    }

    problems += result.outside_answers().len() + result.failed_answers().len();
    if problems > 0 {
        bail!("{} problem(s) found", problems);
    }
    Ok(())
}

fn eval(formula: &str, data: Vec<(String, f64)>, trace: bool, config: &ConfigArgs) -> Result<()> {
    let pipeline = pipeline(config)?;
    let data: DatasetItem = data.into_iter().collect();

    if !trace {
        match pipeline.compute(formula, &data)? {
            CalculatedAnswer::AnyValue => println!("*"),
            CalculatedAnswer::Value(answer) => println!("{}", answer.text),
        }
        return Ok(());
    }

    let mut state = pipeline.start(formula, &data);
    loop {
        match &state {
            PipelineState::Substituted(s) | PipelineState::Validated(s) => {
                println!("{}: {}", state.name(), s)
            }
            PipelineState::Evaluated(v) => println!("{}: {}", state.name(), v),
            PipelineState::Formatted(answer) => println!("{}: {}", state.name(), answer.text),
            PipelineState::AnyValueAccepted => println!("{}", state.name()),
            PipelineState::Failed(err) => bail!("{}: {}", state.name(), err),
        }
        if state.is_terminal() {
            return Ok(());
        }
        state = pipeline.step(state);
    }
}

fn grade(
    formula: &str,
    response: &str,
    data: Vec<(String, f64)>,
    config: &ConfigArgs,
) -> Result<()> {
    let pipeline = pipeline(config)?;
    let data: DatasetItem = data.into_iter().collect();

    let grade = pipeline
        .grade(formula, &data, response)
        .with_context(|| format!("Failed to grade '{}'", response))?;

    if let Some(value) = grade.normalized_value {
        println!("value: {}", value);
    }
    if let Some(interval) = grade.interval {
        println!("interval: {}", interval);
    }
    println!(
        "{}",
        if grade.within_tolerance {
            "correct"
        } else {
            "incorrect"
        }
    );
    Ok(())
}

fn parse(response: &str, unit: Option<&str>, config: &ConfigArgs) -> Result<()> {
    let pipeline = pipeline(config)?;
    let processor = pipeline.processor();

    let parsed = processor
        .parse_response(response)
        .with_context(|| format!("'{}' is not a number in the configured format", response))?;
    println!("negative: {}", parsed.negative);
    println!("prefix: {}", parsed.base_prefix);
    println!("integer: {}", parsed.integer_part);
    println!("fraction: {}", parsed.fraction_part);

    let applied = processor
        .apply_units(response, unit)
        .with_context(|| format!("'{}' has the wrong digits for this format", response))?;
    println!("unit: {}", applied.unit);
    println!("value: {}", applied.value);
    match applied.multiplier {
        Some(_) => println!("normalized: {}", applied.normalized()),
        None if !applied.unit.is_empty() => println!("normalized: unknown unit"),
        None => println!("normalized: {}", applied.value),
    }
    Ok(())
}

fn names(formula: &str) -> Result<()> {
    for name in find_dataset_names(formula) {
        println!("{}", name);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_grade_args() {
        let cli = Cli::try_parse_from([
            "calcfmt", "-v", "grade", "{x}*2", "6.0", "-d", "x=3", "-f", "2", "-t", "0.01", "-k",
            "nominal",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 1);
        match cli.command {
            Commands::Grade {
                formula,
                response,
                data,
                config,
            } => {
                assert_eq!(formula, "{x}*2");
                assert_eq!(response, "6.0");
                assert_eq!(data, vec![("x".to_string(), 3.0)]);
                let record = config.record().unwrap();
                assert_eq!(record.fraction_digits, 2);
                assert_eq!(record.tolerance_kind, ToleranceKind::Nominal);
            }
            _ => panic!("Expected grade"),
        }
    }

    #[test]
    fn test_bad_binding_rejected() {
        assert!(Cli::try_parse_from(["calcfmt", "eval", "{x}", "-d", "x"]).is_err());
    }
}
