use chrono::NaiveDate;
use ppa_validator::workflows::assessment::calculators;
use ppa_validator::workflows::assessment::domain::{
    Compliance, Coordinates, NigerianState, RecordPatch, Savings, SiteInfo, Viability, WizardStep,
};
use ppa_validator::workflows::assessment::{
    assemble, AssessmentWizard, ComplianceBlueprint, GatePolicy, ResolvedSite,
};

const GRID_TARIFF_NGN: u32 = 225;
const PPA_RATE_NGN: u32 = 180;

fn resolved_site(state: Option<NigerianState>, lat: f64, lng: f64) -> ResolvedSite {
    ResolvedSite {
        address: "assessment test site".to_string(),
        state,
        coordinates: Coordinates { lat, lng },
        irradiance_kwh_m2_day: None,
        ambient_temp_c: None,
    }
}

/// Walk the wizard from location through compliance with the given inputs,
/// leaving it on the compliance step ready for the final advance.
fn walk_to_compliance(
    wizard: &mut AssessmentWizard,
    site: ResolvedSite,
    roof_area_m2: f64,
    panel_efficiency_pct: f64,
    current_usage_kwh: f64,
    satisfied_keys: &[String],
) {
    let token = wizard.begin_location_lookup();
    assert!(wizard.complete_location_lookup(token, site));
    assert!(wizard.advance(), "location step should release the wizard");

    let system_size_kw = calculators::system_size_kw(roof_area_m2, panel_efficiency_pct);
    wizard.update(RecordPatch {
        site_info: Some(SiteInfo {
            roof_area_m2,
            panel_efficiency_pct,
            system_size_kw,
        }),
        ..RecordPatch::default()
    });
    assert!(wizard.advance(), "site info step should release the wizard");

    let irradiance = wizard.record().solar_data.irradiance_kwh_m2_day;
    let output = calculators::solar_output(system_size_kw, irradiance);
    let mut solar_data = wizard.record().solar_data;
    solar_data.daily_output_kwh = output.daily_kwh;
    solar_data.annual_output_kwh = output.annual_kwh;
    wizard.update(RecordPatch {
        solar_data: Some(solar_data),
        ..RecordPatch::default()
    });
    assert!(wizard.advance(), "solar step should release the wizard");

    let estimate = calculators::ppa_savings(
        output.daily_kwh,
        current_usage_kwh,
        GRID_TARIFF_NGN,
        PPA_RATE_NGN,
    );
    wizard.update(RecordPatch {
        savings: Some(Savings {
            current_usage_kwh,
            current_bill_ngn: current_usage_kwh * GRID_TARIFF_NGN as f64,
            ppa_rate_ngn: PPA_RATE_NGN,
            monthly_savings_ngn: estimate.monthly_ngn,
            annual_savings_ngn: estimate.annual_ngn,
            computed: true,
        }),
        ..RecordPatch::default()
    });
    assert!(wizard.advance(), "savings step should release the wizard");

    let blueprint = ComplianceBlueprint::standard();
    let checklist = blueprint.checklist_with_satisfied(satisfied_keys);
    let scores = calculators::compliance_scores(&checklist);
    wizard.update(RecordPatch {
        compliance: Some(Compliance {
            checklist,
            score: scores.score,
            mandatory_score: scores.mandatory_score,
        }),
        ..RecordPatch::default()
    });
    assert_eq!(wizard.current_step(), WizardStep::Compliance);
}

fn mandatory_keys(count: usize) -> Vec<String> {
    ComplianceBlueprint::standard()
        .requirements()
        .iter()
        .filter(|req| req.mandatory)
        .take(count)
        .map(|req| req.key.to_string())
        .collect()
}

fn all_keys() -> Vec<String> {
    ComplianceBlueprint::standard()
        .requirements()
        .iter()
        .map(|req| req.key.to_string())
        .collect()
}

fn report_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 8, 26).expect("valid report date")
}

#[test]
fn abuja_commercial_site_matches_worked_figures() {
    let mut wizard = AssessmentWizard::new();
    walk_to_compliance(
        &mut wizard,
        resolved_site(Some(NigerianState::Fct), 9.0765, 7.3986),
        150.0,
        20.0,
        2_000.0,
        &mandatory_keys(4),
    );

    assert!(wizard.advance(), "80% of mandatory items passes the gate");
    assert_eq!(wizard.current_step(), WizardStep::Results);

    let record = wizard.record();
    assert_eq!(record.site_info.system_size_kw, 4.5);
    assert_eq!(record.solar_data.irradiance_kwh_m2_day, 5.1);
    assert_eq!(record.solar_data.daily_output_kwh, 22.95);
    assert_eq!(record.solar_data.annual_output_kwh, 8377.0);
    assert_eq!(record.savings.monthly_savings_ngn, 30_983);
    assert_eq!(record.savings.annual_savings_ngn, 30_983 * 12);
    assert_eq!(record.compliance.mandatory_score, 80);
    assert_eq!(record.compliance.score, 57);

    let report = assemble(record, report_date());
    assert_eq!(report.viability.rating, Viability::Viable);
    assert_eq!(report.viability.points, 58.5);

    let text = report.render_text();
    assert!(text.contains("State: FCT"));
    assert!(text.contains("Monthly Savings: ₦30983"));
    assert!(text.contains("Generated on: 2026-08-26"));
}

#[test]
fn compliance_gate_blocks_the_results_step() {
    let mut wizard = AssessmentWizard::new();
    walk_to_compliance(
        &mut wizard,
        resolved_site(Some(NigerianState::Fct), 9.0765, 7.3986),
        150.0,
        20.0,
        2_000.0,
        &mandatory_keys(3),
    );

    // 3 of 5 mandatory items is 60%, under the default 80% gate.
    assert_eq!(wizard.record().compliance.mandatory_score, 60);
    assert!(!wizard.advance());
    assert_eq!(wizard.current_step(), WizardStep::Compliance);

    // A relaxed gate accepts the same record.
    let mut relaxed = AssessmentWizard::with_gate(GatePolicy {
        mandatory_gate_pct: 60,
    });
    walk_to_compliance(
        &mut relaxed,
        resolved_site(Some(NigerianState::Fct), 9.0765, 7.3986),
        150.0,
        20.0,
        2_000.0,
        &mandatory_keys(3),
    );
    assert!(relaxed.advance());
    assert_eq!(relaxed.current_step(), WizardStep::Results);
}

#[test]
fn unknown_state_falls_back_to_default_irradiance() {
    let mut wizard = AssessmentWizard::new();
    walk_to_compliance(
        &mut wizard,
        resolved_site(None, 8.0, 8.0),
        100.0,
        20.0,
        500.0,
        &mandatory_keys(5),
    );

    assert_eq!(wizard.record().solar_data.irradiance_kwh_m2_day, 4.5);
    assert!(wizard.advance());
    let report = assemble(wizard.record(), report_date());
    assert_eq!(report.state_label, None);
    assert!(report.render_text().contains("State: Unknown"));
}

#[test]
fn large_kano_site_rates_highly_viable() {
    let mut wizard = AssessmentWizard::new();
    walk_to_compliance(
        &mut wizard,
        resolved_site(Some(NigerianState::Kano), 12.0022, 8.5920),
        300.0,
        22.0,
        10_000.0,
        &all_keys(),
    );

    assert!(wizard.advance());
    let record = wizard.record();
    assert_eq!(record.site_info.system_size_kw, 9.9);
    assert_eq!(record.solar_data.irradiance_kwh_m2_day, 5.8);
    assert_eq!(record.solar_data.daily_output_kwh, 57.42);
    assert_eq!(record.compliance.score, 100);

    let report = assemble(record, report_date());
    // 25 (irradiance) + 25 (savings) + 50 (compliance) = 100 points.
    assert_eq!(report.viability.points, 100.0);
    assert_eq!(report.viability.rating, Viability::HighlyViable);
    assert_eq!(report.next_steps.len(), 3);
    assert!(report.next_steps[0].contains("engineering assessment"));
}

#[test]
fn superseded_lookup_cannot_overwrite_the_chosen_location() {
    let mut wizard = AssessmentWizard::new();

    let first = wizard.begin_location_lookup();
    let second = wizard.begin_location_lookup();

    assert!(wizard.complete_location_lookup(
        second,
        resolved_site(Some(NigerianState::Lagos), 6.5244, 3.3792)
    ));
    assert!(!wizard.complete_location_lookup(
        first,
        resolved_site(Some(NigerianState::Kano), 12.0022, 8.5920)
    ));

    assert_eq!(wizard.record().location.state, Some(NigerianState::Lagos));
    assert_eq!(wizard.record().solar_data.irradiance_kwh_m2_day, 4.2);
}

#[test]
fn revisiting_a_step_preserves_downstream_data() {
    let mut wizard = AssessmentWizard::new();
    walk_to_compliance(
        &mut wizard,
        resolved_site(Some(NigerianState::Fct), 9.0765, 7.3986),
        150.0,
        20.0,
        2_000.0,
        &mandatory_keys(4),
    );
    assert!(wizard.advance());

    // Walk back to the savings step and forward again; nothing recomputes
    // implicitly, so the record is untouched.
    let snapshot = wizard.record().clone();
    assert!(wizard.retreat());
    assert!(wizard.retreat());
    assert_eq!(wizard.current_step(), WizardStep::Savings);
    assert!(wizard.advance());
    assert!(wizard.advance());
    assert_eq!(wizard.current_step(), WizardStep::Results);
    assert_eq!(wizard.record(), &snapshot);
}
