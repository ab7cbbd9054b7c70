//! One-shot prediction from the command line.
//!
//! Builds the same raw inputs the form would, runs a single prediction and
//! prints the outcome.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin predict -- age=63 sex=Male cp=Asymptomatic trestbps=145 \
//!     chol=233 fbs=No restecg=Normal thalach=150 exang=No oldpeak=2.3 \
//!     slope=Flat ca=0 thal=Normal
//! cargo run --bin predict -- --list
//! ```
//!
//! Exit status: 0 on a prediction, 2 when the input is incomplete or
//! invalid, 1 on unknown keys or model faults.

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use heartcheck::adapters::sanitize::SanitizingMakeWriter;
use heartcheck::adapters::ModelArtifacts;
use heartcheck::application::PredictionService;
use heartcheck::config::AppConfig;
use heartcheck::domain::catalog::{feature_index, FeatureKind, FEATURE_CATALOG};
use heartcheck::{HeartcheckError, RawInput};

const EXIT_FAULT: u8 = 1;
const EXIT_INVALID: u8 = 2;

#[derive(Debug, Default)]
struct Args {
    model_dir: Option<PathBuf>,
    list: bool,
    assignments: Vec<String>,
}

fn usage() -> String {
    "Usage: predict [--model-dir DIR] [--list] key=value ...".to_string()
}

fn parse_args<I>(args: I) -> Result<Args, String>
where
    I: IntoIterator<Item = String>,
{
    let mut parsed = Args::default();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => return Err(usage()),
            "--list" => parsed.list = true,
            "--model-dir" => {
                let dir = args.next().ok_or_else(usage)?;
                parsed.model_dir = Some(PathBuf::from(dir));
            }
            _ if arg.contains('=') => parsed.assignments.push(arg),
            _ => return Err(format!("Unexpected argument: {arg}\n{}", usage())),
        }
    }

    Ok(parsed)
}

/// Turn `key=value` pairs into one raw input per catalog field.
///
/// Numeric fields left out start from their control default; categorical
/// fields left out stay unselected.
fn build_inputs(assignments: &[String]) -> Result<Vec<RawInput>, String> {
    let mut inputs: Vec<RawInput> = FEATURE_CATALOG
        .iter()
        .map(|spec| match spec.kind {
            FeatureKind::Numeric(_) => RawInput::Numeric(spec.numeric_default()),
            FeatureKind::Categorical(_) => RawInput::unselected(),
        })
        .collect();

    for assignment in assignments {
        let (key, value) = assignment
            .split_once('=')
            .ok_or_else(|| format!("Expected key=value, got {assignment:?}"))?;
        let key = key.trim();
        let index = feature_index(key).ok_or_else(|| format!("Unknown field: {key}"))?;

        inputs[index] = match FEATURE_CATALOG[index].kind {
            FeatureKind::Numeric(_) => {
                let not_a_number = || format!("{} must be a number", FEATURE_CATALOG[index].label);
                let number: f64 = value.trim().parse().map_err(|_| not_a_number())?;
                if !number.is_finite() {
                    return Err(not_a_number());
                }
                RawInput::Numeric(number)
            }
            FeatureKind::Categorical(_) => RawInput::choice(value.trim()),
        };
    }

    Ok(inputs)
}

fn print_catalog() {
    for spec in &FEATURE_CATALOG {
        match spec.kind {
            FeatureKind::Numeric(_) => println!("{:<10} {} (number)", spec.key, spec.label),
            FeatureKind::Categorical(choices) => {
                let labels: Vec<&str> = choices.iter().map(|c| c.label).collect();
                println!("{:<10} {} [{}]", spec.key, spec.label, labels.join(" | "));
            }
        }
    }
}

fn init_logging() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(SanitizingMakeWriter::new(std::io::stderr)),
        )
        .init();
}

/// How a one-shot run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunOutcome {
    Predicted,
    /// Incomplete or invalid input the user can correct
    Invalid,
    /// Unknown field, malformed number, or model fault
    Fault,
}

impl RunOutcome {
    fn exit_code(self) -> ExitCode {
        match self {
            Self::Predicted => ExitCode::SUCCESS,
            Self::Invalid => ExitCode::from(EXIT_INVALID),
            Self::Fault => ExitCode::from(EXIT_FAULT),
        }
    }
}

fn run(args: Args, config: AppConfig) -> RunOutcome {
    let model_dir = args.model_dir.unwrap_or(config.model_dir);

    let inputs = match build_inputs(&args.assignments) {
        Ok(inputs) => inputs,
        Err(message) => {
            eprintln!("{message}");
            return RunOutcome::Fault;
        }
    };

    let artifacts = match ModelArtifacts::load(&model_dir, config.require_manifest) {
        Ok(artifacts) => artifacts,
        Err(e) => {
            tracing::error!("Failed to load model from {:?}: {}", model_dir, e);
            eprintln!("Failed to load model from {model_dir:?}: {e}");
            return RunOutcome::Fault;
        }
    };
    let service = PredictionService::new(artifacts.scaler, artifacts.classifier);

    match service.submit(&inputs) {
        Ok(result) => {
            println!("{}", result.message());
            RunOutcome::Predicted
        }
        Err(e @ HeartcheckError::Validation(_)) => {
            eprintln!("{e}");
            RunOutcome::Invalid
        }
        Err(e) => {
            eprintln!("{e}");
            RunOutcome::Fault
        }
    }
}

fn main() -> ExitCode {
    let args = match parse_args(env::args().skip(1)) {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{message}");
            return ExitCode::from(EXIT_FAULT);
        }
    };

    if args.list {
        print_catalog();
        return ExitCode::SUCCESS;
    }

    init_logging();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::from(EXIT_FAULT);
        }
    };

    run(args, config).exit_code()
}

#[cfg(test)]
mod tests {
    use super::*;
    use heartcheck::domain::catalog::FEATURE_COUNT;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_parse_args() {
        let args = parse_args(strings(&["--model-dir", "m", "age=63", "sex=Male"])).unwrap();
        assert_eq!(args.model_dir, Some(PathBuf::from("m")));
        assert!(!args.list);
        assert_eq!(args.assignments, strings(&["age=63", "sex=Male"]));

        assert!(parse_args(strings(&["--list"])).unwrap().list);
        assert!(parse_args(strings(&["--model-dir"])).is_err());
        assert!(parse_args(strings(&["bogus"])).is_err());
    }

    #[test]
    fn test_build_inputs_defaults() {
        let inputs = build_inputs(&[]).unwrap();
        assert_eq!(inputs.len(), FEATURE_COUNT);
        assert_eq!(inputs[0], RawInput::Numeric(0.0));
        assert_eq!(inputs[6], RawInput::unselected());
    }

    #[test]
    fn test_build_inputs_assignments() {
        let inputs = build_inputs(&strings(&["oldpeak=2.3", "cp=Typical Angina"])).unwrap();
        let oldpeak = feature_index("oldpeak").unwrap();
        let cp = feature_index("cp").unwrap();
        assert_eq!(inputs[oldpeak], RawInput::Numeric(2.3));
        assert_eq!(inputs[cp], RawInput::choice("Typical Angina"));
    }

    #[test]
    fn test_build_inputs_rejects_unknown_key_and_bad_number() {
        let err = build_inputs(&strings(&["weight=80"])).unwrap_err();
        assert!(err.contains("weight"));

        let err = build_inputs(&strings(&["age=old"])).unwrap_err();
        assert!(err.contains("number"));
    }

    #[test]
    fn test_build_inputs_rejects_non_finite_numbers() {
        for value in ["age=NaN", "chol=inf", "oldpeak=-infinity"] {
            let err = build_inputs(&strings(&[value])).unwrap_err();
            assert!(err.ends_with("must be a number"), "{value}: {err}");
        }
    }

    const SCENARIO_A: [&str; 13] = [
        "age=63",
        "trestbps=145",
        "chol=233",
        "thalach=150",
        "oldpeak=2.3",
        "ca=0",
        "sex=Male",
        "cp=Asymptomatic",
        "fbs=No",
        "restecg=Normal",
        "exang=No",
        "slope=Flat",
        "thal=Normal",
    ];

    fn run_with(assignments: &[&str]) -> RunOutcome {
        let args = Args {
            model_dir: Some(PathBuf::from("models")),
            list: false,
            assignments: strings(assignments),
        };
        run(args, AppConfig::default())
    }

    #[test]
    fn test_run_complete_input_predicts() {
        assert_eq!(run_with(&SCENARIO_A), RunOutcome::Predicted);
    }

    #[test]
    fn test_run_unselected_thal_is_invalid() {
        assert_eq!(run_with(&SCENARIO_A[..12]), RunOutcome::Invalid);
    }

    #[test]
    fn test_run_unknown_key_is_fault() {
        let mut assignments = SCENARIO_A.to_vec();
        assignments.push("weight=80");
        assert_eq!(run_with(&assignments), RunOutcome::Fault);
    }

    #[test]
    fn test_run_missing_model_dir_is_fault() {
        let args = Args {
            model_dir: Some(PathBuf::from("does/not/exist")),
            list: false,
            assignments: strings(&SCENARIO_A),
        };
        assert_eq!(run(args, AppConfig::default()), RunOutcome::Fault);
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(
            format!("{:?}", RunOutcome::Invalid.exit_code()),
            format!("{:?}", ExitCode::from(2))
        );
        assert_eq!(
            format!("{:?}", RunOutcome::Fault.exit_code()),
            format!("{:?}", ExitCode::from(1))
        );
        assert_eq!(
            format!("{:?}", RunOutcome::Predicted.exit_code()),
            format!("{:?}", ExitCode::SUCCESS)
        );
    }
}
