//! Integration tests for GlucoGuard: artifacts on disk through to reports

use chrono::NaiveDate;
use glucoguard::{
    AppError, Artifacts, ContributingFactor, ModelConfig, PatientMeasurement, ReportFormat,
    RiskLabel, RiskPipeline, FIELD_SPECS,
};
use std::fs;
use std::path::Path;

const IDENTITY_SCALER: &str = r#"{
    "mean": [0, 0, 0, 0, 0, 0, 0, 0],
    "scale": [1, 1, 1, 1, 1, 1, 1, 1]
}"#;

// p = sigmoid(0.1 * glucose - 12.5): glucose 120 -> ~0.38, glucose 150 -> ~0.92
const GLUCOSE_MODEL: &str = r#"{
    "layers": [{
        "kernel": [[0.0], [0.1], [0.0], [0.0], [0.0], [0.0], [0.0], [0.0]],
        "bias": [-12.5],
        "activation": "sigmoid"
    }]
}"#;

fn write_artifacts(dir: &Path, scaler: &str, model: &str) -> ModelConfig {
    let scaler_path = dir.join("scaler.json");
    let model_path = dir.join("model.json");
    fs::write(&scaler_path, scaler).unwrap();
    fs::write(&model_path, model).unwrap();
    ModelConfig {
        model_path,
        scaler_path,
    }
}

fn report_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
}

#[test]
fn test_load_and_assess_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_artifacts(dir.path(), IDENTITY_SCALER, GLUCOSE_MODEL);
    let artifacts = Artifacts::load(&config).unwrap();
    let pipeline = RiskPipeline::from_artifacts(&artifacts);

    let low = pipeline.assess(&PatientMeasurement::default()).unwrap();
    assert_eq!(low.label, RiskLabel::Low);
    assert!((low.probability - 0.377_540_668_798_145_4).abs() < 1e-9);
    assert!(low.factors.is_empty());

    let high = pipeline
        .assess(&PatientMeasurement {
            glucose: 150,
            age: 52,
            ..Default::default()
        })
        .unwrap();
    assert_eq!(high.label, RiskLabel::High);
    assert_eq!(
        high.factors,
        vec![ContributingFactor::ElevatedGlucose, ContributingFactor::AgeOver45]
    );
}

#[test]
fn test_missing_artifact_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let config = ModelConfig {
        model_path: dir.path().join("nope.json"),
        scaler_path: dir.path().join("also_nope.json"),
    };
    let err: AppError = Artifacts::load(&config).err().unwrap();
    assert_eq!(err.code_str(), "ART_MISSING");
    assert!(err.code.is_fatal());
}

#[test]
fn test_scaler_dimension_mismatch_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_artifacts(
        dir.path(),
        r#"{"mean": [0, 0, 0], "scale": [1, 1, 1]}"#,
        GLUCOSE_MODEL,
    );
    let err = Artifacts::load(&config).err().unwrap();
    assert_eq!(err.code_str(), "ART_SHAPE_MISMATCH");
}

#[test]
fn test_bundled_demo_artifacts_load() {
    let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("artifacts");
    let config = ModelConfig {
        model_path: root.join("diabetes_model.json"),
        scaler_path: root.join("scaler.json"),
    };
    let artifacts = Artifacts::load(&config).unwrap();
    let pipeline = RiskPipeline::from_artifacts(&artifacts);

    let typical = pipeline.assess(&PatientMeasurement::default()).unwrap();
    let elevated = pipeline
        .assess(&PatientMeasurement {
            glucose: 190,
            bmi: 38.0,
            age: 55,
            ..Default::default()
        })
        .unwrap();

    assert!((0.0..=1.0).contains(&typical.probability));
    assert!(elevated.probability > typical.probability);
    assert_eq!(elevated.label, RiskLabel::High);
}

#[test]
fn test_reports_carry_every_field_value() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_artifacts(dir.path(), IDENTITY_SCALER, GLUCOSE_MODEL);
    let artifacts = Artifacts::load(&config).unwrap();

    let m = PatientMeasurement {
        pregnancies: 6,
        glucose: 148,
        blood_pressure: 72,
        skin_thickness: 35,
        insulin: 0,
        bmi: 33.6,
        diabetes_pedigree: 0.627,
        age: 50,
    };
    let outcome = RiskPipeline::from_artifacts(&artifacts).run(&m).unwrap();

    let text = outcome.report(ReportFormat::Txt, report_date());
    assert!(text.content.contains("Date:                 October 2026\n"));
    assert!(text.content.contains("Risk classification:  High Risk\n"));

    // One "  • Label: value unit" row per field, in feature order
    let rows: Vec<(&str, &str)> = text
        .content
        .lines()
        .skip_while(|line| *line != "Patient data:")
        .skip(1)
        .map_while(|line| line.strip_prefix("  • "))
        .filter_map(|row| row.split_once(':'))
        .map(|(label, value)| (label, value.trim()))
        .collect();
    assert_eq!(
        rows,
        vec![
            ("Pregnancies", "6"),
            ("Glucose", "148 mg/dL"),
            ("Blood Pressure", "72 mm Hg"),
            ("Skin Thickness", "35 mm"),
            ("Insulin", "0 mu U/ml"),
            ("BMI", "33.6"),
            ("Diabetes Pedigree Function", "0.627"),
            ("Age", "50 years"),
        ]
    );

    let csv = outcome.report(ReportFormat::Csv, report_date());
    let lines: Vec<&str> = csv.content.lines().collect();
    assert_eq!(lines.len(), 2 + FIELD_SPECS.len() + 4);
    assert_eq!(
        lines[..2 + FIELD_SPECS.len()],
        [
            "Field,Value",
            "Report Date,October 2026",
            "Pregnancies,6",
            "Glucose (mg/dL),148",
            "Blood Pressure (mm Hg),72",
            "Skin Thickness (mm),35",
            "Insulin (mu U/ml),0",
            "BMI,33.6",
            "Diabetes Pedigree Function,0.627",
            "Age (years),50",
        ]
    );
    assert!(lines[10].starts_with("Risk Probability,0.908"));
    assert_eq!(
        lines[11..],
        [
            "Risk Percentage (%),90.9",
            "Risk Classification,High Risk",
            "Contributing Factors,Elevated glucose; High BMI; Age > 45",
        ]
    );
}

#[test]
fn test_report_written_into_directory() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_artifacts(dir.path(), IDENTITY_SCALER, GLUCOSE_MODEL);
    let artifacts = Artifacts::load(&config).unwrap();
    let outcome = RiskPipeline::from_artifacts(&artifacts)
        .run(&PatientMeasurement::default())
        .unwrap();

    let out_dir = dir.path().join("reports");
    fs::create_dir(&out_dir).unwrap();

    let path = outcome
        .report(ReportFormat::Csv, report_date())
        .write_to(&out_dir)
        .unwrap();
    assert_eq!(path.file_name().unwrap(), "diabetes_report.csv");

    let path = outcome
        .report(ReportFormat::Txt, report_date())
        .write_to(&out_dir)
        .unwrap();
    assert_eq!(path.file_name().unwrap(), "GlucoGuard_Report.txt");
    assert!(fs::read_to_string(path).unwrap().contains("Low Risk"));
}
