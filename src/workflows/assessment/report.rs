use chrono::NaiveDate;
use serde::Serialize;

use super::calculators::{self, ViabilityAssessment};
use super::domain::{AssessmentRecord, Coordinates, PerformanceBand, Viability};

/// Fully interpolated assessment summary. Pure data: callers pass the
/// generation date in so assembly stays deterministic, and handing the
/// rendered text to a file or email sink happens outside the core.
#[derive(Debug, Clone, Serialize)]
pub struct AssessmentReport {
    pub generated_on: NaiveDate,
    pub address: String,
    pub state_label: Option<&'static str>,
    pub coordinates: Option<Coordinates>,
    pub roof_area_m2: f64,
    pub panel_efficiency_pct: f64,
    pub system_size_kw: f64,
    pub daily_output_kwh: f64,
    pub annual_output_kwh: f64,
    pub irradiance_kwh_m2_day: f64,
    pub performance: PerformanceBand,
    pub performance_label: String,
    pub current_usage_kwh: f64,
    pub ppa_rate_ngn: u32,
    pub monthly_savings_ngn: i64,
    pub annual_savings_ngn: i64,
    pub compliance_score: u8,
    pub mandatory_score: u8,
    pub satisfied_items: usize,
    pub total_items: usize,
    pub viability: ViabilityAssessment,
    pub viability_label: String,
    pub headline: &'static str,
    pub next_steps: Vec<&'static str>,
}

/// Merge the accumulated record into the final report. Runs only on the
/// terminal wizard step; reads everything, mutates nothing.
pub fn assemble(record: &AssessmentRecord, generated_on: NaiveDate) -> AssessmentReport {
    let irradiance = record.solar_data.irradiance_kwh_m2_day;
    let performance = calculators::performance_band(irradiance);
    let viability = calculators::viability(
        irradiance,
        record.savings.monthly_savings_ngn,
        record.compliance.score,
    );

    AssessmentReport {
        generated_on,
        address: record.location.address.clone(),
        state_label: record.location.state.map(|state| state.label()),
        coordinates: record.location.coordinates,
        roof_area_m2: record.site_info.roof_area_m2,
        panel_efficiency_pct: record.site_info.panel_efficiency_pct,
        system_size_kw: record.site_info.system_size_kw,
        daily_output_kwh: record.solar_data.daily_output_kwh,
        annual_output_kwh: record.solar_data.annual_output_kwh,
        irradiance_kwh_m2_day: irradiance,
        performance,
        performance_label: performance.label().to_string(),
        current_usage_kwh: record.savings.current_usage_kwh,
        ppa_rate_ngn: record.savings.ppa_rate_ngn,
        monthly_savings_ngn: record.savings.monthly_savings_ngn,
        annual_savings_ngn: record.savings.annual_savings_ngn,
        compliance_score: record.compliance.score,
        mandatory_score: record.compliance.mandatory_score,
        satisfied_items: record
            .compliance
            .checklist
            .iter()
            .filter(|item| item.satisfied)
            .count(),
        total_items: record.compliance.checklist.len(),
        viability_label: viability.rating.label().to_string(),
        headline: viability.rating.headline(),
        next_steps: next_steps(viability.rating),
        viability,
    }
}

fn next_steps(rating: Viability) -> Vec<&'static str> {
    match rating {
        Viability::HighlyViable => vec![
            "Proceed with detailed engineering assessment",
            "Begin regulatory application process",
            "Develop customer PPA proposal",
        ],
        Viability::Viable => vec![
            "Address compliance gaps before proceeding",
            "Consider system optimization opportunities",
            "Prepare preliminary customer discussions",
        ],
        Viability::NeedsAttention => vec![
            "Focus on mandatory compliance requirements first",
            "Consider alternative sites or system configurations",
            "Review economic assumptions and projections",
        ],
    }
}

impl AssessmentReport {
    /// Sectioned plain-text rendering, the payload handed to the report sink.
    pub fn render_text(&self) -> String {
        let mut out = String::new();

        out.push_str("SOLAR PPA VALIDATOR - ASSESSMENT REPORT\n");
        out.push_str("=======================================\n\n");

        out.push_str("SITE INFORMATION\n");
        out.push_str(&format!("Location: {}\n", self.address));
        out.push_str(&format!(
            "State: {}\n",
            self.state_label.unwrap_or("Unknown")
        ));
        if let Some(coordinates) = self.coordinates {
            out.push_str(&format!(
                "Coordinates: {:.4}, {:.4}\n",
                coordinates.lat, coordinates.lng
            ));
        }
        out.push_str(&format!("System Size: {} kW\n", self.system_size_kw));
        out.push_str(&format!("Roof Area: {} m²\n", self.roof_area_m2));
        out.push_str(&format!(
            "Panel Efficiency: {}%\n\n",
            self.panel_efficiency_pct
        ));

        out.push_str("SOLAR POTENTIAL\n");
        out.push_str(&format!("Daily Output: {} kWh/day\n", self.daily_output_kwh));
        out.push_str(&format!(
            "Annual Output: {} kWh/year\n",
            self.annual_output_kwh
        ));
        out.push_str(&format!(
            "Solar Irradiance: {} kWh/m²/day\n",
            self.irradiance_kwh_m2_day
        ));
        out.push_str(&format!(
            "Performance Rating: {}\n\n",
            self.performance_label
        ));

        out.push_str("PPA SAVINGS\n");
        out.push_str(&format!(
            "Monthly Savings: ₦{}\n",
            self.monthly_savings_ngn
        ));
        out.push_str(&format!("Annual Savings: ₦{}\n", self.annual_savings_ngn));
        out.push_str(&format!(
            "Current Usage: {} kWh/month\n",
            self.current_usage_kwh
        ));
        out.push_str(&format!("PPA Rate: ₦{}/kWh\n\n", self.ppa_rate_ngn));

        out.push_str("COMPLIANCE SCORE\n");
        out.push_str(&format!("Overall Score: {}%\n", self.compliance_score));
        out.push_str(&format!("Mandatory Score: {}%\n", self.mandatory_score));
        out.push_str(&format!(
            "Completed Requirements: {}/{}\n\n",
            self.satisfied_items, self.total_items
        ));

        out.push_str("VIABILITY\n");
        out.push_str(&format!(
            "Assessment: {} ({} points)\n",
            self.viability_label, self.viability.points
        ));
        out.push_str(&format!("{}\n\n", self.headline));

        out.push_str("RECOMMENDED NEXT STEPS\n");
        for step in &self.next_steps {
            out.push_str(&format!("- {step}\n"));
        }

        out.push_str(&format!("\nGenerated on: {}\n", self.generated_on));
        out
    }
}
