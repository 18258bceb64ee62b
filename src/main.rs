//! GlucoGuard CLI
//!
//! Assess one patient from the command line and write the report file.
//!
//!   glucoguard assess --glucose 140 --bmi 32.5 --age 50 --format csv
//!   glucoguard fields

use clap::{Args, Parser, Subcommand};
use eyre::Result;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use glucoguard::core::report::today;
use glucoguard::models::types::FieldKind;
use glucoguard::utils::constants::{APP_NAME, DEFAULT_MODEL_PATH, DEFAULT_SCALER_PATH};
use glucoguard::{
    Artifacts, ModelConfig, PatientMeasurement, ReportFormat, RiskPipeline, FIELD_SPECS,
};

#[derive(Parser)]
#[command(name = "glucoguard", version, about = "Diabetes risk assessment from eight clinical measurements")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Assess one patient and write the report
    Assess(AssessArgs),
    /// Print the measurement field table
    Fields,
}

#[derive(Args)]
struct AssessArgs {
    #[arg(long, default_value_t = 1)]
    pregnancies: u32,
    /// Plasma glucose (mg/dL)
    #[arg(long, default_value_t = 120)]
    glucose: u32,
    /// Diastolic blood pressure (mm Hg)
    #[arg(long, default_value_t = 70)]
    blood_pressure: u32,
    /// Triceps skin fold thickness (mm)
    #[arg(long, default_value_t = 20)]
    skin_thickness: u32,
    /// 2-hour serum insulin (mu U/ml)
    #[arg(long, default_value_t = 80)]
    insulin: u32,
    #[arg(long, default_value_t = 25.0)]
    bmi: f64,
    #[arg(long, default_value_t = 0.5)]
    diabetes_pedigree: f64,
    #[arg(long, default_value_t = 30)]
    age: u32,

    /// Model artifact
    #[arg(long, env = "GLUCOGUARD_MODEL_PATH", default_value = DEFAULT_MODEL_PATH)]
    model: PathBuf,
    /// Scaler artifact
    #[arg(long, env = "GLUCOGUARD_SCALER_PATH", default_value = DEFAULT_SCALER_PATH)]
    scaler: PathBuf,

    /// Report format: txt or csv
    #[arg(long, default_value = "txt")]
    format: ReportFormat,
    /// Report file or directory (default: current directory)
    #[arg(long, short)]
    output: Option<PathBuf>,
}

impl AssessArgs {
    fn measurement(&self) -> PatientMeasurement {
        PatientMeasurement {
            pregnancies: self.pregnancies,
            glucose: self.glucose,
            blood_pressure: self.blood_pressure,
            skin_thickness: self.skin_thickness,
            insulin: self.insulin,
            bmi: self.bmi,
            diabetes_pedigree: self.diabetes_pedigree,
            age: self.age,
        }
        .clamped()
    }
}

fn main() -> Result<()> {
    // Logs go to stderr so stdout carries only the result
    FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    match Cli::parse().command {
        Command::Assess(args) => assess(args),
        Command::Fields => {
            print_fields();
            Ok(())
        }
    }
}

fn assess(args: AssessArgs) -> Result<()> {
    let config = ModelConfig {
        model_path: args.model.clone(),
        scaler_path: args.scaler.clone(),
    };
    let artifacts = Artifacts::load(&config)?;

    let measurement = args.measurement();
    let outcome = RiskPipeline::from_artifacts(&artifacts).run(&measurement)?;
    let assessment = &outcome.assessment;

    println!("{}", APP_NAME);
    println!("{}", assessment.summary());
    println!("Main contributing factors: {}", assessment.explanation());

    let report = outcome.report(args.format, today());
    let target = args.output.unwrap_or_else(|| PathBuf::from("."));
    let path = report.write_to(&target)?;
    info!("✅ Done");
    println!("Report: {}", path.display());

    Ok(())
}

fn print_fields() {
    println!(
        "{:<20}{:<32}{:<10}{:>8}{:>8}{:>10}{:>8}",
        "key", "label", "unit", "min", "max", "default", "step"
    );
    for spec in FIELD_SPECS.iter() {
        let step = match spec.kind {
            FieldKind::Integer => "1".to_string(),
            FieldKind::Real => spec.step.to_string(),
        };
        println!(
            "{:<20}{:<32}{:<10}{:>8}{:>8}{:>10}{:>8}",
            spec.key, spec.label, spec.unit, spec.min, spec.max, spec.default, step
        );
    }
}
