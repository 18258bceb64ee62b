//! Risk Gauge
//!
//! Needle value is probability x 100 on a 0-100 axis with a threshold
//! marker at 50. Color policy (three bands):
//! - below 40          -> green
//! - 40 up to 70       -> amber
//! - 70 and above      -> red

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt::Write;

use crate::models::types::RiskAssessment;
use crate::utils::constants::{
    COLOR_AMBER, COLOR_GREEN, COLOR_RED, GAUGE_AMBER_FROM_PCT, GAUGE_MAX, GAUGE_MIN,
    GAUGE_RED_FROM_PCT, GAUGE_THRESHOLD_PCT, GAUGE_TITLE,
};

/// Cosmetic display theme; never affects computed results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn background(&self) -> &'static str {
        match self {
            Theme::Light => "#ffffff",
            Theme::Dark => "#0f1117",
        }
    }

    pub fn foreground(&self) -> &'static str {
        match self {
            Theme::Light => "#111827",
            Theme::Dark => "#e2e8f0",
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

/// Color band of the gauge bar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GaugeBand {
    Green,
    Amber,
    Red,
}

impl GaugeBand {
    pub fn from_percent(percent: f64) -> Self {
        if percent < GAUGE_AMBER_FROM_PCT {
            GaugeBand::Green
        } else if percent < GAUGE_RED_FROM_PCT {
            GaugeBand::Amber
        } else {
            GaugeBand::Red
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            GaugeBand::Green => COLOR_GREEN,
            GaugeBand::Amber => COLOR_AMBER,
            GaugeBand::Red => COLOR_RED,
        }
    }
}

/// Gauge description, serializable for API clients
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Gauge {
    pub title: &'static str,
    pub value: f64,
    pub min: f64,
    pub max: f64,
    pub threshold: f64,
    pub band: GaugeBand,
    pub color: &'static str,
}

impl Gauge {
    pub fn from_percent(percent: f64) -> Self {
        let band = GaugeBand::from_percent(percent);
        Self {
            title: GAUGE_TITLE,
            value: percent,
            min: GAUGE_MIN,
            max: GAUGE_MAX,
            threshold: GAUGE_THRESHOLD_PCT,
            band,
            color: band.color(),
        }
    }

    pub fn for_assessment(assessment: &RiskAssessment) -> Self {
        Self::from_percent(assessment.percent())
    }

    /// Standalone semicircle SVG
    pub fn to_svg(&self, theme: Theme) -> String {
        const CX: f64 = 150.0;
        const CY: f64 = 150.0;
        const R: f64 = 110.0;
        const STROKE: f64 = 24.0;

        let point = |pct: f64, radius: f64| {
            let clamped = pct.clamp(self.min, self.max);
            let theta = PI * (1.0 - (clamped - self.min) / (self.max - self.min));
            (CX + radius * theta.cos(), CY - radius * theta.sin())
        };

        let (sx, sy) = point(self.min, R);
        let (ex, ey) = point(self.max, R);
        let (vx, vy) = point(self.value, R);
        let (t_in_x, t_in_y) = point(self.threshold, R - STROKE);
        let (t_out_x, t_out_y) = point(self.threshold, R + STROKE);

        let mut svg = String::with_capacity(1024);
        let _ = write!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 300 200" width="300" height="200" role="img" aria-label="{title}">"#,
            title = self.title
        );
        let _ = write!(
            svg,
            r#"<rect width="300" height="200" fill="{}"/>"#,
            theme.background()
        );
        let _ = write!(
            svg,
            r#"<text x="150" y="22" text-anchor="middle" font-size="15" fill="{}">{}</text>"#,
            theme.foreground(),
            self.title
        );
        // track
        let _ = write!(
            svg,
            r##"<path d="M {sx:.2} {sy:.2} A {R} {R} 0 0 1 {ex:.2} {ey:.2}" fill="none" stroke="#e5e7eb" stroke-width="{STROKE}"/>"##
        );
        // value bar
        if self.value > self.min {
            let _ = write!(
                svg,
                r#"<path d="M {sx:.2} {sy:.2} A {R} {R} 0 0 1 {vx:.2} {vy:.2}" fill="none" stroke="{color}" stroke-width="{STROKE}"/>"#,
                color = self.color
            );
        }
        // threshold marker
        let _ = write!(
            svg,
            r#"<line x1="{t_in_x:.2}" y1="{t_in_y:.2}" x2="{t_out_x:.2}" y2="{t_out_y:.2}" stroke="red" stroke-width="5"/>"#
        );
        let _ = write!(
            svg,
            r#"<text x="150" y="145" text-anchor="middle" font-size="42" fill="{}">{:.1}</text>"#,
            theme.foreground(),
            self.value
        );
        svg.push_str("</svg>");
        svg
    }
}
