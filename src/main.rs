use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_prometheus::PrometheusMetricLayer;
use chrono::Local;
use clap::{Args, Parser, Subcommand};
use metrics_exporter_prometheus::PrometheusHandle;
use ppa_validator::config::{AppConfig, AssessmentConfig};
use ppa_validator::error::AppError;
use ppa_validator::geo::GeoLookupClient;
use ppa_validator::telemetry;
use ppa_validator::workflows::assessment::domain::{
    quick_locations, Compliance, Coordinates, NigerianState, RecordPatch, Savings, SiteInfo,
    SitePreset, UsagePreset, WizardStep,
};
use ppa_validator::workflows::assessment::{
    assemble, calculators, AssessmentReport, AssessmentWizard, ComplianceBlueprint, ResolvedSite,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Clone)]
struct AppState {
    readiness: Arc<AtomicBool>,
    metrics: PrometheusHandle,
    assessment: AssessmentConfig,
}

#[derive(Parser, Debug)]
#[command(
    name = "Solar PPA Validator",
    about = "Assess solar PPA site viability from the command line or over HTTP",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Run a full site assessment and print the report
    Assess(AssessArgs),
    /// List the regulatory compliance checklist
    Requirements,
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    port: Option<u16>,
}

#[derive(Args, Debug)]
struct AssessArgs {
    /// Site address used in the report
    #[arg(long)]
    address: Option<String>,
    /// Nigerian state name (e.g. "FCT", "Akwa Ibom")
    #[arg(long)]
    state: Option<String>,
    /// Popular city shortcut (Lagos, Abuja, Kano, Port Harcourt, Ibadan, Kaduna)
    #[arg(long, conflicts_with_all = ["lat", "lng"])]
    city: Option<String>,
    /// Site latitude; together with --lng triggers an online geo lookup
    #[arg(long, requires = "lng")]
    lat: Option<f64>,
    /// Site longitude
    #[arg(long, requires = "lat")]
    lng: Option<f64>,
    /// Available roof area in m²
    #[arg(long, default_value_t = 100.0)]
    roof_area: f64,
    /// Panel efficiency percentage in [15, 25]
    #[arg(long, default_value_t = 20.0)]
    efficiency: f64,
    /// Roof configuration preset overriding --roof-area/--efficiency
    #[arg(long, value_parser = parse_site_preset)]
    site_preset: Option<SitePreset>,
    /// Monthly electricity usage in kWh
    #[arg(long)]
    usage: Option<f64>,
    /// Monthly electricity bill in ₦
    #[arg(long)]
    bill: Option<f64>,
    /// Usage pattern preset overriding --usage/--bill
    #[arg(long, value_parser = parse_usage_preset)]
    usage_preset: Option<UsagePreset>,
    /// Compliance requirement key to mark satisfied (repeatable)
    #[arg(long = "satisfy")]
    satisfied: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct AssessmentRequest {
    #[serde(default)]
    address: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    coordinates: Option<Coordinates>,
    roof_area_m2: f64,
    #[serde(default)]
    panel_efficiency_pct: Option<f64>,
    current_usage_kwh: f64,
    current_bill_ngn: f64,
    #[serde(default)]
    satisfied_requirements: Vec<String>,
    /// Measured irradiance from a prior geo lookup; the static state table is
    /// used when absent.
    #[serde(default)]
    irradiance_kwh_m2_day: Option<f64>,
}

#[derive(Debug, Serialize)]
struct AssessmentResponse {
    gate_satisfied: bool,
    compliance_score: u8,
    mandatory_score: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    report: Option<AssessmentReport>,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => run_server(args).await,
        Command::Assess(args) => run_assess(args).await,
        Command::Requirements => {
            render_requirements();
            Ok(())
        }
    }
}

fn parse_site_preset(raw: &str) -> Result<SitePreset, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "small" | "small-residential" => Ok(SitePreset::SmallResidential),
        "medium" | "medium-commercial" => Ok(SitePreset::MediumCommercial),
        "large" | "large-industrial" => Ok(SitePreset::LargeIndustrial),
        other => Err(format!("unknown site preset '{other}'")),
    }
}

fn parse_usage_preset(raw: &str) -> Result<UsagePreset, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "residential" => Ok(UsagePreset::Residential),
        "commercial" => Ok(UsagePreset::Commercial),
        "industrial" => Ok(UsagePreset::Industrial),
        other => Err(format!("unknown usage preset '{other}'")),
    }
}

async fn run_server(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let state = AppState {
        readiness: readiness_flag.clone(),
        metrics: prometheus_handle,
        assessment: config.assessment.clone(),
    };

    let app = Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/v1/assessment/report", post(assessment_report_endpoint))
        .layer(prometheus_layer)
        .with_state(state);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "solar PPA validator ready");

    axum::serve(listener, app).await?;
    Ok(())
}

async fn run_assess(args: AssessArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let AssessArgs {
        address,
        state,
        city,
        lat,
        lng,
        roof_area,
        efficiency,
        site_preset,
        usage,
        bill,
        usage_preset,
        satisfied,
    } = args;

    let parsed_state = state.as_deref().and_then(|name| {
        let parsed = NigerianState::from_label(name);
        if parsed.is_none() {
            warn!(%name, "unknown state name, using default irradiance");
        }
        parsed
    });

    let site = resolve_cli_site(&config.assessment, address, parsed_state, city, lat, lng).await;

    let (roof_area_m2, panel_efficiency_pct) = match site_preset {
        Some(preset) => preset.dimensions(),
        None => (roof_area, efficiency),
    };
    let (current_usage_kwh, current_bill_ngn) = match usage_preset {
        Some(preset) => preset.profile(),
        None => {
            let (default_usage, default_bill) = UsagePreset::Residential.profile();
            (usage.unwrap_or(default_usage), bill.unwrap_or(default_bill))
        }
    };

    let outcome = run_assessment(
        &config.assessment,
        site,
        roof_area_m2,
        panel_efficiency_pct,
        current_usage_kwh,
        current_bill_ngn,
        &satisfied,
    );

    match outcome.report {
        Some(report) => println!("{}", report.render_text()),
        None => {
            println!(
                "Compliance gate not satisfied: {}% of mandatory requirements met, {}% required.",
                outcome.mandatory_score, config.assessment.mandatory_gate_pct
            );
            println!(
                "Mark more mandatory requirements with --satisfy (see the `requirements` command) and rerun."
            );
        }
    }

    Ok(())
}

/// Pick the site for the CLI path: online lookup when lat/lng were given,
/// otherwise a quick-location shortcut. Lookup failures degrade to the static
/// irradiance table rather than aborting the run.
async fn resolve_cli_site(
    assessment: &AssessmentConfig,
    address: Option<String>,
    state: Option<NigerianState>,
    city: Option<String>,
    lat: Option<f64>,
    lng: Option<f64>,
) -> ResolvedSite {
    if let (Some(lat), Some(lng)) = (lat, lng) {
        match GeoLookupClient::new(assessment.geo_timeout()) {
            Ok(client) => match client.resolve_site(lat, lng).await {
                Ok(mut site) => {
                    if let Some(address) = address {
                        site.address = address;
                    }
                    if state.is_some() {
                        site.state = state;
                    }
                    return site;
                }
                Err(err) => {
                    warn!(error = %err, "geo lookup failed, deferring to state table");
                    return ResolvedSite {
                        address: address.unwrap_or_else(|| format!("{lat:.4}, {lng:.4}")),
                        state,
                        coordinates: Coordinates { lat, lng },
                        irradiance_kwh_m2_day: None,
                        ambient_temp_c: None,
                    };
                }
            },
            Err(err) => warn!(error = %err, "geo client unavailable, deferring to state table"),
        }
    }

    let quick = city
        .as_deref()
        .and_then(|name| {
            quick_locations()
                .into_iter()
                .find(|location| location.name.eq_ignore_ascii_case(name.trim()))
        })
        .or_else(|| {
            state.and_then(|state| {
                quick_locations()
                    .into_iter()
                    .find(|location| location.state == state)
            })
        });

    match quick {
        Some(location) => ResolvedSite {
            address: address.unwrap_or_else(|| {
                format!("{}, {} State, Nigeria", location.name, location.state.label())
            }),
            state: state.or(Some(location.state)),
            coordinates: location.coordinates,
            irradiance_kwh_m2_day: None,
            ambient_temp_c: None,
        },
        // No usable hint: pin the capital so the wizard still has coordinates.
        None => ResolvedSite {
            address: address.unwrap_or_else(|| "Abuja, FCT, Nigeria".to_string()),
            state,
            coordinates: Coordinates {
                lat: 9.0765,
                lng: 7.3986,
            },
            irradiance_kwh_m2_day: None,
            ambient_temp_c: None,
        },
    }
}

struct AssessmentOutcome {
    gate_satisfied: bool,
    compliance_score: u8,
    mandatory_score: u8,
    report: Option<AssessmentReport>,
}

/// Drive the wizard through all six steps with the collected inputs. The
/// report is assembled only when the compliance gate lets the wizard reach
/// the terminal step.
fn run_assessment(
    assessment: &AssessmentConfig,
    site: ResolvedSite,
    roof_area_m2: f64,
    panel_efficiency_pct: f64,
    current_usage_kwh: f64,
    current_bill_ngn: f64,
    satisfied: &[String],
) -> AssessmentOutcome {
    let mut wizard = AssessmentWizard::with_gate(assessment.gate_policy());

    let token = wizard.begin_location_lookup();
    wizard.complete_location_lookup(token, site);
    wizard.advance();

    let system_size_kw = calculators::system_size_kw(roof_area_m2, panel_efficiency_pct);
    wizard.update(RecordPatch {
        site_info: Some(SiteInfo {
            roof_area_m2: roof_area_m2.max(0.0),
            panel_efficiency_pct,
            system_size_kw,
        }),
        ..RecordPatch::default()
    });
    wizard.advance();

    let irradiance = wizard.record().solar_data.irradiance_kwh_m2_day;
    let output = calculators::solar_output(system_size_kw, irradiance);
    let mut solar_data = wizard.record().solar_data;
    solar_data.daily_output_kwh = output.daily_kwh;
    solar_data.annual_output_kwh = output.annual_kwh;
    wizard.update(RecordPatch {
        solar_data: Some(solar_data),
        ..RecordPatch::default()
    });
    wizard.advance();

    let estimate = calculators::ppa_savings(
        output.daily_kwh,
        current_usage_kwh,
        assessment.grid_tariff_ngn,
        assessment.ppa_rate_ngn,
    );
    wizard.update(RecordPatch {
        savings: Some(Savings {
            current_usage_kwh: current_usage_kwh.max(0.0),
            current_bill_ngn: current_bill_ngn.max(0.0),
            ppa_rate_ngn: assessment.ppa_rate_ngn,
            monthly_savings_ngn: estimate.monthly_ngn,
            annual_savings_ngn: estimate.annual_ngn,
            computed: true,
        }),
        ..RecordPatch::default()
    });
    wizard.advance();

    let blueprint = ComplianceBlueprint::standard();
    let checklist = blueprint.checklist_with_satisfied(satisfied);
    let scores = calculators::compliance_scores(&checklist);
    wizard.update(RecordPatch {
        compliance: Some(Compliance {
            checklist,
            score: scores.score,
            mandatory_score: scores.mandatory_score,
        }),
        ..RecordPatch::default()
    });
    let gate_satisfied = wizard.advance();

    let report = (wizard.current_step() == WizardStep::Results)
        .then(|| assemble(wizard.record(), Local::now().date_naive()));

    AssessmentOutcome {
        gate_satisfied,
        compliance_score: scores.score,
        mandatory_score: scores.mandatory_score,
        report,
    }
}

fn render_requirements() {
    let blueprint = ComplianceBlueprint::standard();
    println!("Regulatory compliance checklist");
    for requirement in blueprint.requirements() {
        let flag = if requirement.mandatory {
            "mandatory"
        } else {
            "optional"
        };
        println!("\n- {} [{}]", requirement.key, flag);
        println!("  {} | {}", requirement.category, requirement.requirement);
        println!("  {}", requirement.description);
        if let Some(link) = requirement.link {
            println!("  {link}");
        }
    }
}

async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn readiness_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

async fn metrics_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

async fn assessment_report_endpoint(
    State(state): State<AppState>,
    Json(payload): Json<AssessmentRequest>,
) -> Json<AssessmentResponse> {
    let AssessmentRequest {
        address,
        state: state_name,
        coordinates,
        roof_area_m2,
        panel_efficiency_pct,
        current_usage_kwh,
        current_bill_ngn,
        satisfied_requirements,
        irradiance_kwh_m2_day,
    } = payload;

    let parsed_state = state_name.as_deref().and_then(NigerianState::from_label);
    let coordinates = coordinates.unwrap_or(Coordinates {
        lat: 9.0765,
        lng: 7.3986,
    });

    let site = ResolvedSite {
        address: address.unwrap_or_default(),
        state: parsed_state,
        coordinates,
        irradiance_kwh_m2_day,
        ambient_temp_c: None,
    };

    let outcome = run_assessment(
        &state.assessment,
        site,
        roof_area_m2,
        panel_efficiency_pct.unwrap_or(20.0),
        current_usage_kwh,
        current_bill_ngn,
        &satisfied_requirements,
    );

    Json(AssessmentResponse {
        gate_satisfied: outcome.gate_satisfied,
        compliance_score: outcome.compliance_score,
        mandatory_score: outcome.mandatory_score,
        report: outcome.report,
    })
}
