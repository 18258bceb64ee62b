//! Interactive HTML Form
//!
//! One slider per measurement field, an Analyze Risk button, and after
//! submission the result banner, contributing factors, gauge and report
//! download links. Form values are clamped into their widget ranges.

use axum::{
    extract::{Form, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use std::fmt::Write;
use std::sync::Arc;

use super::handlers::{attachment, AppState};
use super::types::ThemeQuery;
use crate::core::gauge::Theme;
use crate::core::pipeline::AssessmentOutcome;
use crate::core::report::{field_values, today, ReportFormat};
use crate::models::errors::AppError;
use crate::models::types::{FieldKind, PatientMeasurement, FIELD_SPECS};
use crate::utils::constants::{APP_NAME, APP_TAGLINE, APP_VERSION};

// ============================================
// Handlers
// ============================================

/// `GET /`
pub async fn index_page(Query(query): Query<ThemeQuery>) -> Html<String> {
    Html(render_page(
        query.theme,
        &PatientMeasurement::default(),
        PageResult::Empty,
    ))
}

/// `POST /assess`
pub async fn assess_form(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ThemeQuery>,
    Form(measurement): Form<PatientMeasurement>,
) -> Response {
    let measurement = measurement.clamped();

    match state.assess(&measurement) {
        Ok(outcome) => Html(render_page(
            query.theme,
            &measurement,
            PageResult::Assessed(&outcome),
        ))
        .into_response(),
        Err(e) => (
            StatusCode::from_u16(e.code.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            Html(render_page(query.theme, &measurement, PageResult::Failed(&e))),
        )
            .into_response(),
    }
}

/// `GET /report.txt?<fields>`
pub async fn report_txt(
    State(state): State<Arc<AppState>>,
    Query(measurement): Query<PatientMeasurement>,
) -> Response {
    form_report(&state, measurement, ReportFormat::Txt)
}

/// `GET /report.csv?<fields>`
pub async fn report_csv(
    State(state): State<Arc<AppState>>,
    Query(measurement): Query<PatientMeasurement>,
) -> Response {
    form_report(&state, measurement, ReportFormat::Csv)
}

fn form_report(state: &AppState, measurement: PatientMeasurement, format: ReportFormat) -> Response {
    let measurement = measurement.clamped();
    match state.assess(&measurement) {
        Ok(outcome) => attachment(outcome.report(format, today())),
        Err(e) => (
            StatusCode::from_u16(e.code.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            e.to_string(),
        )
            .into_response(),
    }
}

// ============================================
// Rendering
// ============================================

pub enum PageResult<'a> {
    Empty,
    Assessed(&'a AssessmentOutcome),
    Failed(&'a AppError),
}

/// Query string that reproduces a measurement for the report links
pub fn measurement_query(m: &PatientMeasurement) -> String {
    FIELD_SPECS
        .iter()
        .zip(field_values(m))
        .map(|(spec, value)| format!("{}={}", spec.key, value))
        .collect::<Vec<_>>()
        .join("&")
}

fn escape_html(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

pub fn render_page(theme: Theme, measurement: &PatientMeasurement, result: PageResult<'_>) -> String {
    let mut out = String::with_capacity(8 * 1024);
    let toggled = theme.toggled();

    let _ = write!(
        out,
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{name}</title>
<style>
body {{ background: {bg}; color: {fg}; font-family: system-ui, sans-serif; max-width: 760px; margin: 2rem auto; padding: 0 1rem; }}
header {{ text-align: center; }}
.field {{ display: flex; flex-direction: column; margin: 0.8rem 0; }}
.field label {{ display: flex; justify-content: space-between; }}
button {{ padding: 0.6rem 1.4rem; font-size: 1rem; cursor: pointer; }}
.banner {{ padding: 1rem; border-radius: 8px; font-size: 1.2rem; color: #ffffff; }}
.banner.high {{ background: #ef4444; }}
.banner.low {{ background: #22c55e; }}
.error {{ padding: 1rem; border-radius: 8px; background: #7f1d1d; color: #ffffff; }}
footer {{ margin-top: 3rem; text-align: center; opacity: 0.7; font-size: 0.85rem; }}
a {{ color: inherit; }}
</style>
</head>
<body class="{theme}">
<header>
<h1>{name} 🛡️</h1>
<h3>{tagline}</h3>
<p>Deep Learning · Accurate · Reliable</p>
<a href="/?theme={toggled}">{toggle_label}</a>
</header>
<form method="post" action="/assess?theme={theme}">
"#,
        name = APP_NAME,
        tagline = APP_TAGLINE,
        bg = theme.background(),
        fg = theme.foreground(),
        theme = theme.as_str(),
        toggled = toggled.as_str(),
        toggle_label = match toggled {
            Theme::Dark => "🌙 Dark mode",
            Theme::Light => "☀️ Light mode",
        },
    );

    for (spec, value) in FIELD_SPECS.iter().zip(field_values(measurement)) {
        let step = match spec.kind {
            FieldKind::Integer => "1".to_string(),
            FieldKind::Real => spec.step.to_string(),
        };
        let _ = writeln!(
            out,
            r#"<div class="field"><label for="{key}">{label} <output id="{key}_out">{value}</output></label><input type="range" id="{key}" name="{key}" min="{min}" max="{max}" step="{step}" value="{value}" oninput="document.getElementById('{key}_out').value=this.value"></div>"#,
            key = spec.key,
            label = escape_html(&spec.display_label()),
            min = spec.min,
            max = spec.max,
            step = step,
            value = value,
        );
    }

    let _ = writeln!(out, r#"<button type="submit">🔍 Analyze Risk</button>"#);
    let _ = writeln!(out, "</form>");

    match result {
        PageResult::Empty => {}
        PageResult::Assessed(outcome) => render_result(&mut out, theme, outcome),
        PageResult::Failed(err) => {
            let _ = writeln!(
                out,
                r#"<section class="error"><h2>⚠️ Prediction failed</h2><p>{}</p></section>"#,
                escape_html(&err.to_string())
            );
        }
    }

    let _ = write!(
        out,
        "<footer>© {} • v{} • Built with Rust &amp; axum</footer>\n</body>\n</html>\n",
        APP_NAME, APP_VERSION
    );
    out
}

fn render_result(out: &mut String, theme: Theme, outcome: &AssessmentOutcome) {
    let assessment = &outcome.assessment;
    let class = if assessment.is_high_risk() { "high" } else { "low" };

    let _ = writeln!(out, r#"<section class="result">"#);
    let _ = writeln!(out, "<h2>📊 Risk Assessment</h2>");
    let _ = writeln!(
        out,
        r#"<div class="banner {}">{} <strong>{}</strong> of Diabetes — {:.1}%</div>"#,
        class,
        assessment.label.emoji(),
        assessment.label,
        assessment.percent()
    );

    let _ = writeln!(out, "<h4>Main Contributing Factors</h4>");
    if assessment.factors.is_empty() {
        let _ = writeln!(out, "<p>{}</p>", assessment.explanation());
    } else {
        let _ = writeln!(out, "<ul>");
        for label in assessment.factor_labels() {
            let _ = writeln!(out, "<li>{}</li>", escape_html(label));
        }
        let _ = writeln!(out, "</ul>");
    }

    let _ = writeln!(out, "<h4>Risk Level Gauge</h4>");
    let _ = writeln!(out, "{}", outcome.gauge.to_svg(theme));

    let query = measurement_query(&outcome.measurement);
    let _ = writeln!(
        out,
        r#"<p><a href="/report.txt?{q}" download>📄 Download Report (.txt)</a> · <a href="/report.csv?{q}" download>📊 Download Report (.csv)</a></p>"#,
        q = query
    );
    let _ = writeln!(out, "</section>");
}
