//! Assessment Pipeline
//!
//! measurement -> feature vector -> scaler -> model -> classifier/explainer
//!
//! Runs synchronously to completion for every request. The scaler and model
//! are borrowed; nothing is cached between calls.

use chrono::NaiveDate;
use std::time::Instant;
use tracing::{debug, warn};

use super::classifier::classify;
use super::gauge::Gauge;
use super::report::{Report, ReportFormat};
use crate::models::errors::AppResult;
use crate::models::types::{PatientMeasurement, RiskAssessment};
use crate::providers::artifacts::{Artifacts, RiskModel, Scaler};

/// Borrowed scaler/model pair
#[derive(Clone, Copy)]
pub struct RiskPipeline<'a> {
    scaler: &'a dyn Scaler,
    model: &'a dyn RiskModel,
}

/// Everything rendered for one request
#[derive(Debug, Clone, PartialEq)]
pub struct AssessmentOutcome {
    pub measurement: PatientMeasurement,
    pub assessment: RiskAssessment,
    pub gauge: Gauge,
}

impl AssessmentOutcome {
    pub fn report(&self, format: ReportFormat, date: NaiveDate) -> Report {
        Report::render(format, &self.measurement, &self.assessment, date)
    }
}

impl<'a> RiskPipeline<'a> {
    pub fn new(scaler: &'a dyn Scaler, model: &'a dyn RiskModel) -> Self {
        Self { scaler, model }
    }

    pub fn from_artifacts(artifacts: &'a Artifacts) -> Self {
        Self::new(artifacts.scaler.as_ref(), artifacts.model.as_ref())
    }

    /// Probability for one measurement
    pub fn probability(&self, measurement: &PatientMeasurement) -> AppResult<f64> {
        let features = measurement.to_features();
        let scaled = self.scaler.transform(&features)?;
        self.model.predict(&scaled)
    }

    /// Full assessment: probability, label, factors
    pub fn assess(&self, measurement: &PatientMeasurement) -> AppResult<RiskAssessment> {
        let start = Instant::now();

        let probability = self.probability(measurement).map_err(|e| {
            warn!("⚠️ Inference failed: {}", e);
            e
        })?;
        let assessment = classify(probability, measurement);

        debug!(
            "⚡ Assessment done in {:.3}ms: {}",
            start.elapsed().as_secs_f64() * 1000.0,
            assessment.summary()
        );

        Ok(assessment)
    }

    /// Assessment plus gauge, ready for rendering
    pub fn run(&self, measurement: &PatientMeasurement) -> AppResult<AssessmentOutcome> {
        let assessment = self.assess(measurement)?;
        let gauge = Gauge::for_assessment(&assessment);
        Ok(AssessmentOutcome {
            measurement: *measurement,
            assessment,
            gauge,
        })
    }
}
