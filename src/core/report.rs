//! Report Renderer
//!
//! Produces the downloadable summary of one assessment, either as plain
//! text (`GlucoGuard_Report.txt`) or as a flat two-column CSV table
//! (`diabetes_report.csv`). Every measurement is printed with its exact
//! value; reals use the shortest representation that round-trips.
//!
//! The report date is passed in so identical inputs on the same date
//! render byte-identical files.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::models::errors::{AppError, AppResult, ErrorCode};
use crate::models::types::{FieldKind, PatientMeasurement, RiskAssessment, FIELD_SPECS};
use crate::utils::constants::{
    APP_FOOTER, CSV_REPORT_FILENAME, CSV_REPORT_MIME, NO_FACTORS_MESSAGE, TEXT_REPORT_FILENAME,
    TEXT_REPORT_MIME,
};

/// Download format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Txt,
    Csv,
}

impl ReportFormat {
    pub fn filename(&self) -> &'static str {
        match self {
            ReportFormat::Txt => TEXT_REPORT_FILENAME,
            ReportFormat::Csv => CSV_REPORT_FILENAME,
        }
    }

    pub fn mime(&self) -> &'static str {
        match self {
            ReportFormat::Txt => TEXT_REPORT_MIME,
            ReportFormat::Csv => CSV_REPORT_MIME,
        }
    }
}

impl std::str::FromStr for ReportFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "txt" | "text" => Ok(ReportFormat::Txt),
            "csv" => Ok(ReportFormat::Csv),
            other => Err(AppError::bad_request(format!(
                "Unknown report format '{}', expected txt or csv",
                other
            ))),
        }
    }
}

/// Rendered report ready for download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub format: ReportFormat,
    pub content: String,
}

impl Report {
    pub fn render(
        format: ReportFormat,
        measurement: &PatientMeasurement,
        assessment: &RiskAssessment,
        date: NaiveDate,
    ) -> Self {
        let content = match format {
            ReportFormat::Txt => render_text(measurement, assessment, date),
            ReportFormat::Csv => render_csv(measurement, assessment, date),
        };
        Self { format, content }
    }

    pub fn filename(&self) -> &'static str {
        self.format.filename()
    }

    /// Write into `dir` (or to `path` if it names a file) and return the path
    pub fn write_to(&self, target: &Path) -> AppResult<PathBuf> {
        let path = if target.is_dir() {
            target.join(self.filename())
        } else {
            target.to_path_buf()
        };

        std::fs::write(&path, &self.content).map_err(|e| {
            AppError::with_source(
                ErrorCode::ReportExportFailed,
                format!("Cannot write report to {}", path.display()),
                e,
            )
        })?;

        info!("📄 Report written to {}", path.display());
        Ok(path)
    }
}

/// Shortest round-trip text for a real, always with a decimal point
pub fn format_real(value: f64) -> String {
    let text = value.to_string();
    if value.is_finite() && !text.contains('.') {
        format!("{}.0", text)
    } else {
        text
    }
}

/// Display value of every field, in feature order
pub fn field_values(m: &PatientMeasurement) -> [String; 8] {
    let features = m.to_features();
    std::array::from_fn(|i| match FIELD_SPECS[i].kind {
        FieldKind::Integer => format!("{}", features[i] as u64),
        FieldKind::Real => format_real(features[i]),
    })
}

/// Local calendar date used for served and CLI reports
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

fn report_date(date: NaiveDate) -> String {
    date.format("%B %Y").to_string()
}

fn factors_line(assessment: &RiskAssessment) -> String {
    if assessment.factors.is_empty() {
        NO_FACTORS_MESSAGE.to_string()
    } else {
        assessment.factor_labels().join(", ")
    }
}

/// Plain-text report
pub fn render_text(m: &PatientMeasurement, assessment: &RiskAssessment, date: NaiveDate) -> String {
    let mut out = String::with_capacity(768);

    let _ = writeln!(out, "GLUCOGUARD AI REPORT");
    let _ = writeln!(out, "=============================");
    let _ = writeln!(out, "Date:                 {}", report_date(date));
    let _ = writeln!(out, "Risk probability:     {:.1}%", assessment.percent());
    let _ = writeln!(out, "Risk classification:  {}", assessment.label);
    let _ = writeln!(out, "Contributing factors: {}", factors_line(assessment));
    let _ = writeln!(out);
    let _ = writeln!(out, "Patient data:");

    for (spec, value) in FIELD_SPECS.iter().zip(field_values(m)) {
        let label = format!("{}:", spec.label);
        if spec.unit.is_empty() {
            let _ = writeln!(out, "  • {:<28}{}", label, value);
        } else {
            let _ = writeln!(out, "  • {:<28}{} {}", label, value, spec.unit);
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "{}", APP_FOOTER);
    out
}

/// Flat `Field,Value` CSV report
pub fn render_csv(m: &PatientMeasurement, assessment: &RiskAssessment, date: NaiveDate) -> String {
    let mut out = String::with_capacity(512);

    let _ = writeln!(out, "Field,Value");
    let _ = writeln!(out, "Report Date,{}", csv_escape(&report_date(date)));
    for (spec, value) in FIELD_SPECS.iter().zip(field_values(m)) {
        let _ = writeln!(out, "{},{}", csv_escape(&spec.display_label()), value);
    }
    let _ = writeln!(out, "Risk Probability,{}", format_real(assessment.probability));
    let _ = writeln!(out, "Risk Percentage (%),{:.1}", assessment.percent());
    let _ = writeln!(out, "Risk Classification,{}", assessment.label);
    let factors = if assessment.factors.is_empty() {
        "None".to_string()
    } else {
        assessment.factor_labels().join("; ")
    };
    let _ = writeln!(out, "Contributing Factors,{}", csv_escape(&factors));
    out
}

fn csv_escape(field: &str) -> String {
    if field.contains(&[',', '"', '\n', '\r'][..]) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::classifier::classify;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, 14).unwrap()
    }

    #[test]
    fn test_format_real() {
        assert_eq!(format_real(25.0), "25.0");
        assert_eq!(format_real(0.5), "0.5");
        assert_eq!(format_real(0.627), "0.627");
        assert_eq!(format_real(33.6), "33.6");
    }

    #[test]
    fn test_text_report_contents() {
        let m = PatientMeasurement::default();
        let a = classify(0.8, &m);
        let text = render_text(&m, &a, date());

        assert!(text.starts_with("GLUCOGUARD AI REPORT\n"));
        assert!(text.contains("Date:                 February 2026"));
        assert!(text.contains("Risk probability:     80.0%"));
        assert!(text.contains("Risk classification:  High Risk"));
        assert!(text.contains("No major alerting factors detected."));
        assert!(text.contains("Glucose:"));
        assert!(text.contains("120 mg/dL"));
        assert!(text.contains("25.0\n"));
        assert!(text.contains("30 years"));
    }

    #[test]
    fn test_csv_report_is_two_columns() {
        let m = PatientMeasurement {
            glucose: 130,
            bmi: 33.6,
            ..Default::default()
        };
        let a = classify(0.35, &m);
        let csv = render_csv(&m, &a, date());

        for line in csv.lines() {
            assert_eq!(line.split(',').count(), 2, "line {:?}", line);
        }
        assert!(csv.contains("Glucose (mg/dL),130\n"));
        assert!(csv.contains("BMI,33.6\n"));
        assert!(csv.contains("Risk Classification,Low Risk\n"));
        assert!(csv.contains("Contributing Factors,Elevated glucose; High BMI\n"));
    }

    #[test]
    fn test_format_parse() {
        assert_eq!("CSV".parse::<ReportFormat>().unwrap(), ReportFormat::Csv);
        assert_eq!("txt".parse::<ReportFormat>().unwrap(), ReportFormat::Txt);
        assert!("pdf".parse::<ReportFormat>().is_err());
        assert_eq!(ReportFormat::Csv.filename(), "diabetes_report.csv");
    }

    #[test]
    fn test_write_to_directory() {
        let dir = tempfile::tempdir().unwrap();
        let m = PatientMeasurement::default();
        let report = Report::render(ReportFormat::Txt, &m, &classify(0.2, &m), date());
        let path = report.write_to(dir.path()).unwrap();
        assert!(path.ends_with("GlucoGuard_Report.txt"));
        assert_eq!(std::fs::read_to_string(path).unwrap(), report.content);
    }

    #[test]
    fn test_csv_escape() {
        assert_eq!(csv_escape("plain"), "plain");
        assert_eq!(csv_escape("a,b"), "\"a,b\"");
        assert_eq!(csv_escape("say \"hi\""), "\"say \"\"hi\"\"\"");
    }
}
