//! Telemetry Module for GlucoGuard
//!
//! Aggregate, anonymous statistics about served assessments:
//! - how many assessments ran, and how many were high risk
//! - how often each contributing factor fired
//! - inference failures and average latency
//!
//! Privacy-first: no measurements, probabilities or client addresses are kept.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::models::types::RiskAssessment;

/// Aggregated statistics for reporting
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct TelemetryStats {
    /// Successful assessments
    pub total_assessed: u64,
    pub high_risk: u64,
    pub low_risk: u64,
    /// Requests whose inference failed
    pub failures: u64,
    /// Times each contributing factor fired
    pub factor_counts: HashMap<String, u64>,
    /// Average assessment latency (ms)
    pub avg_latency_ms: f64,
    /// Period start timestamp
    pub period_start: u64,
    /// Period end timestamp
    pub period_end: u64,
}

impl TelemetryStats {
    /// Share of assessments labelled high risk, in percent
    pub fn high_risk_rate(&self) -> f64 {
        if self.total_assessed == 0 {
            0.0
        } else {
            self.high_risk as f64 / self.total_assessed as f64 * 100.0
        }
    }

    /// Export as JSON for API
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// Export as CSV row
    pub fn to_csv_row(&self) -> String {
        format!(
            "{},{},{},{},{},{},{:.2}\n",
            self.period_start,
            self.period_end,
            self.total_assessed,
            self.high_risk,
            self.low_risk,
            self.failures,
            self.avg_latency_ms,
        )
    }

    /// Console summary printed on shutdown
    pub fn summary(&self) -> String {
        format!(
            r#"
╔══════════════════════════════════════════════════════════════════╗
║           🛡️ GLUCOGUARD AI - SESSION REPORT                      ║
╠══════════════════════════════════════════════════════════════════╣
║   🩺 Assessments served:       {:>10}                           ║
║   🔴 High risk:                {:>10}                           ║
║   ✅ Low risk:                 {:>10}                           ║
║   ❌ Inference failures:       {:>10}                           ║
║   📈 High-risk rate:           {:>10.1}%                         ║
║   ⚡ Avg latency:              {:>10.2}ms                        ║
╚══════════════════════════════════════════════════════════════════╝
"#,
            self.total_assessed,
            self.high_risk,
            self.low_risk,
            self.failures,
            self.high_risk_rate(),
            self.avg_latency_ms,
        )
    }
}

/// Main telemetry collector
pub struct AssessmentTelemetry {
    /// Atomic counters for fast updates
    total_assessed: AtomicU64,
    high_risk: AtomicU64,
    low_risk: AtomicU64,
    failures: AtomicU64,
    total_latency_us: AtomicU64,
    /// Factor counters by key
    factor_counts: RwLock<HashMap<&'static str, u64>>,
    /// Session start time
    session_start: u64,
    /// Export directory
    export_dir: PathBuf,
}

impl AssessmentTelemetry {
    /// Create collector exporting into `export_dir`
    pub fn new(export_dir: impl Into<PathBuf>) -> Self {
        Self {
            total_assessed: AtomicU64::new(0),
            high_risk: AtomicU64::new(0),
            low_risk: AtomicU64::new(0),
            failures: AtomicU64::new(0),
            total_latency_us: AtomicU64::new(0),
            factor_counts: RwLock::new(HashMap::new()),
            session_start: current_timestamp(),
            export_dir: export_dir.into(),
        }
    }

    /// Record a successful assessment
    pub fn record_assessment(&self, assessment: &RiskAssessment, latency_us: u64) {
        self.total_assessed.fetch_add(1, Ordering::Relaxed);
        self.total_latency_us.fetch_add(latency_us, Ordering::Relaxed);

        if assessment.is_high_risk() {
            self.high_risk.fetch_add(1, Ordering::Relaxed);
        } else {
            self.low_risk.fetch_add(1, Ordering::Relaxed);
        }

        if !assessment.factors.is_empty() {
            if let Ok(mut counts) = self.factor_counts.write() {
                for factor in &assessment.factors {
                    *counts.entry(factor.key()).or_insert(0) += 1;
                }
            }
        }
    }

    /// Record an inference failure
    pub fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current statistics
    pub fn get_stats(&self) -> TelemetryStats {
        let total_assessed = self.total_assessed.load(Ordering::Relaxed);
        let total_latency_us = self.total_latency_us.load(Ordering::Relaxed);

        let avg_latency_ms = if total_assessed > 0 {
            total_latency_us as f64 / total_assessed as f64 / 1000.0
        } else {
            0.0
        };

        let factor_counts = self
            .factor_counts
            .read()
            .map(|counts| counts.iter().map(|(k, v)| (k.to_string(), *v)).collect())
            .unwrap_or_default();

        TelemetryStats {
            total_assessed,
            high_risk: self.high_risk.load(Ordering::Relaxed),
            low_risk: self.low_risk.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            factor_counts,
            avg_latency_ms,
            period_start: self.session_start,
            period_end: current_timestamp(),
        }
    }

    /// Export current stats to JSON file
    pub fn export_stats_json(&self) -> Result<PathBuf, std::io::Error> {
        fs::create_dir_all(&self.export_dir)?;
        let stats = self.get_stats();
        let filename = format!("stats_{}.json", current_timestamp());
        let path = self.export_dir.join(filename);

        let json = serde_json::to_string_pretty(&stats)?;
        fs::write(&path, json)?;

        Ok(path)
    }

    /// Export stats to CSV (append mode)
    pub fn export_stats_csv(&self) -> Result<PathBuf, std::io::Error> {
        fs::create_dir_all(&self.export_dir)?;
        let stats = self.get_stats();
        let path = self.export_dir.join("assessment_history.csv");

        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;

        // Write header if new file
        if file.metadata()?.len() == 0 {
            writeln!(file, "period_start,period_end,total_assessed,high_risk,low_risk,failures,avg_latency_ms")?;
        }

        write!(file, "{}", stats.to_csv_row())?;

        Ok(path)
    }
}

fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::types::{ContributingFactor, RiskLabel};

    fn assessment(label: RiskLabel, factors: Vec<ContributingFactor>) -> RiskAssessment {
        RiskAssessment {
            probability: if label == RiskLabel::High { 0.9 } else { 0.1 },
            label,
            factors,
        }
    }

    #[test]
    fn test_collector_basic() {
        let dir = tempfile::tempdir().unwrap();
        let telemetry = AssessmentTelemetry::new(dir.path());

        telemetry.record_assessment(&assessment(RiskLabel::Low, vec![]), 1000);
        telemetry.record_assessment(
            &assessment(
                RiskLabel::High,
                vec![ContributingFactor::ElevatedGlucose, ContributingFactor::HighBmi],
            ),
            3000,
        );
        telemetry.record_assessment(
            &assessment(RiskLabel::High, vec![ContributingFactor::ElevatedGlucose]),
            2000,
        );
        telemetry.record_failure();

        let stats = telemetry.get_stats();
        assert_eq!(stats.total_assessed, 3);
        assert_eq!(stats.high_risk, 2);
        assert_eq!(stats.low_risk, 1);
        assert_eq!(stats.failures, 1);
        assert_eq!(stats.factor_counts["elevated_glucose"], 2);
        assert_eq!(stats.factor_counts["high_bmi"], 1);
        assert!((stats.avg_latency_ms - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_exports() {
        let dir = tempfile::tempdir().unwrap();
        let telemetry = AssessmentTelemetry::new(dir.path().join("nested"));
        telemetry.record_assessment(&assessment(RiskLabel::Low, vec![]), 500);

        let json_path = telemetry.export_stats_json().unwrap();
        let json = std::fs::read_to_string(json_path).unwrap();
        assert!(json.contains("\"total_assessed\": 1"));

        let csv_path = telemetry.export_stats_csv().unwrap();
        telemetry.export_stats_csv().unwrap();
        let csv = std::fs::read_to_string(csv_path).unwrap();
        assert_eq!(csv.lines().count(), 3);
        assert!(csv.starts_with("period_start,"));
    }

    #[test]
    fn test_summary_and_rate() {
        let stats = TelemetryStats {
            total_assessed: 200,
            high_risk: 50,
            low_risk: 150,
            avg_latency_ms: 0.75,
            ..Default::default()
        };
        assert!((stats.high_risk_rate() - 25.0).abs() < 1e-9);
        let summary = stats.summary();
        assert!(summary.contains("200"));
        assert!(summary.contains("25.0%"));
        assert!(stats.to_json().contains("high_risk"));
    }
}
