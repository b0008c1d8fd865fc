//! Pure derivation functions shared by the wizard steps. No I/O, no hidden
//! state; out-of-range inputs are clamped rather than rejected so a bad form
//! value can never take the wizard down.

use serde::Serialize;

use super::domain::{ChecklistItem, PerformanceBand, Viability};

/// kW of installable capacity per m² of roof at 100% panel efficiency.
const CAPACITY_PER_M2_KW: f64 = 0.15;

pub const PANEL_EFFICIENCY_MIN_PCT: f64 = 15.0;
pub const PANEL_EFFICIENCY_MAX_PCT: f64 = 25.0;

fn round0(value: f64) -> f64 {
    value.round()
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Installable system size from roof area and panel efficiency, one decimal.
/// Negative roof area clamps to zero; efficiency clamps into [15, 25].
pub fn system_size_kw(roof_area_m2: f64, panel_efficiency_pct: f64) -> f64 {
    let area = roof_area_m2.max(0.0);
    let efficiency =
        panel_efficiency_pct.clamp(PANEL_EFFICIENCY_MIN_PCT, PANEL_EFFICIENCY_MAX_PCT);
    round1(area * efficiency / 100.0 * CAPACITY_PER_M2_KW)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SolarOutput {
    pub daily_kwh: f64,
    pub annual_kwh: f64,
}

/// Daily output = system size × irradiance; annual spreads the unrounded
/// daily figure over 365 days so the two stay consistent.
pub fn solar_output(system_size_kw: f64, irradiance_kwh_m2_day: f64) -> SolarOutput {
    let daily = system_size_kw.max(0.0) * irradiance_kwh_m2_day.max(0.0);
    SolarOutput {
        daily_kwh: round2(daily),
        annual_kwh: round0(daily * 365.0),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SavingsEstimate {
    pub monthly_ngn: i64,
    pub annual_ngn: i64,
    /// Share of monthly usage covered by solar output, capped at 100.
    pub coverage_pct: u8,
}

/// PPA savings: solar coverage is the lesser of monthly solar output and
/// actual usage, priced at the grid/PPA rate difference. Never negative —
/// coverage is clamped to usage and a PPA rate above the grid tariff yields
/// zero savings rather than a charge.
pub fn ppa_savings(
    daily_output_kwh: f64,
    current_usage_kwh: f64,
    grid_tariff_ngn: u32,
    ppa_rate_ngn: u32,
) -> SavingsEstimate {
    let monthly_output = daily_output_kwh.max(0.0) * 30.0;
    let usage = current_usage_kwh.max(0.0);
    let coverage = monthly_output.min(usage);
    let margin = grid_tariff_ngn.saturating_sub(ppa_rate_ngn) as f64;

    let monthly = round0(coverage * margin) as i64;
    let coverage_pct = if usage > 0.0 {
        (monthly_output / usage * 100.0).min(100.0).round() as u8
    } else {
        0
    };

    SavingsEstimate {
        monthly_ngn: monthly,
        annual_ngn: monthly * 12,
        coverage_pct,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ComplianceScores {
    pub score: u8,
    pub mandatory_score: u8,
}

/// Percentage of satisfied items, overall and among mandatory items only.
/// An empty checklist (or one with no mandatory items) scores zero.
pub fn compliance_scores(checklist: &[ChecklistItem]) -> ComplianceScores {
    ComplianceScores {
        score: percentage(
            checklist.iter().filter(|item| item.satisfied).count(),
            checklist.len(),
        ),
        mandatory_score: percentage(
            checklist
                .iter()
                .filter(|item| item.mandatory && item.satisfied)
                .count(),
            checklist.iter().filter(|item| item.mandatory).count(),
        ),
    }
}

fn percentage(part: usize, whole: usize) -> u8 {
    if whole == 0 {
        return 0;
    }
    (part as f64 / whole as f64 * 100.0).round() as u8
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ViabilityAssessment {
    pub points: f64,
    pub rating: Viability,
}

/// The single place where solar potential, savings, and compliance combine
/// into one classification. Irradiance and savings contribute up to 25
/// points each in tiers; compliance contributes half its score (max 50).
pub fn viability(
    irradiance_kwh_m2_day: f64,
    monthly_savings_ngn: i64,
    compliance_score: u8,
) -> ViabilityAssessment {
    let solar_points = if irradiance_kwh_m2_day >= 5.5 {
        25.0
    } else if irradiance_kwh_m2_day >= 4.5 {
        15.0
    } else {
        5.0
    };

    let savings_points = if monthly_savings_ngn >= 50_000 {
        25.0
    } else if monthly_savings_ngn >= 20_000 {
        15.0
    } else {
        5.0
    };

    let compliance_points = compliance_score as f64 * 0.5;
    let points = solar_points + savings_points + compliance_points;

    let rating = if points >= 70.0 {
        Viability::HighlyViable
    } else if points >= 50.0 {
        Viability::Viable
    } else {
        Viability::NeedsAttention
    };

    ViabilityAssessment { points, rating }
}

pub fn performance_band(irradiance_kwh_m2_day: f64) -> PerformanceBand {
    if irradiance_kwh_m2_day >= 5.5 {
        PerformanceBand::Excellent
    } else if irradiance_kwh_m2_day >= 4.5 {
        PerformanceBand::Good
    } else if irradiance_kwh_m2_day >= 3.5 {
        PerformanceBand::Fair
    } else {
        PerformanceBand::Poor
    }
}
