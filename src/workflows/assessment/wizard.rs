use serde::{Deserialize, Serialize};

use super::calculators;
use super::domain::{
    AssessmentRecord, Coordinates, Location, NigerianState, RecordPatch, SolarData, WizardStep,
};
use super::irradiance;

pub const DEFAULT_MANDATORY_GATE_PCT: u8 = 80;

/// Gate threshold for the compliance step. Product has flip-flopped between
/// 60% and 80% of mandatory items; it is a configuration value so the choice
/// never needs a code change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatePolicy {
    pub mandatory_gate_pct: u8,
}

impl Default for GatePolicy {
    fn default() -> Self {
        Self {
            mandatory_gate_pct: DEFAULT_MANDATORY_GATE_PCT,
        }
    }
}

/// Handle identifying one in-flight geo lookup. Completing a lookup with a
/// superseded token is ignored, so only the latest request can touch the
/// record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookupToken(u64);

/// Outcome of a geo lookup for a picked coordinate pair.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSite {
    pub address: String,
    pub state: Option<NigerianState>,
    pub coordinates: Coordinates,
    pub irradiance_kwh_m2_day: Option<f64>,
    pub ambient_temp_c: Option<f64>,
}

/// Sequential six-step wizard owning the assessment record. All mutation
/// funnels through `update`, `advance`, `retreat`, and the location-lookup
/// pair; nothing else may touch the record.
#[derive(Debug)]
pub struct AssessmentWizard {
    record: AssessmentRecord,
    current: usize,
    gate: GatePolicy,
    lookup_seq: u64,
}

impl Default for AssessmentWizard {
    fn default() -> Self {
        Self::new()
    }
}

impl AssessmentWizard {
    pub fn new() -> Self {
        Self::with_gate(GatePolicy::default())
    }

    pub fn with_gate(gate: GatePolicy) -> Self {
        Self {
            record: AssessmentRecord::default(),
            current: 0,
            gate,
            lookup_seq: 0,
        }
    }

    pub fn current_step(&self) -> WizardStep {
        WizardStep::ordered()[self.current]
    }

    pub fn record(&self) -> &AssessmentRecord {
        &self.record
    }

    pub fn gate(&self) -> GatePolicy {
        self.gate
    }

    /// Move to the next step if the current step's gate holds. A refused
    /// advance is a no-op, not an error: the UI disables the control, and
    /// the gate is re-checked here regardless.
    pub fn advance(&mut self) -> bool {
        let steps = WizardStep::ordered();
        if self.current >= steps.len() - 1 {
            return false;
        }
        if !self.step_satisfied(steps[self.current]) {
            return false;
        }
        self.current += 1;
        true
    }

    /// Going back is always allowed (except off the front).
    pub fn retreat(&mut self) -> bool {
        if self.current == 0 {
            return false;
        }
        self.current -= 1;
        true
    }

    /// Shallow-merge a patch into the record. Never changes the current step.
    pub fn update(&mut self, patch: RecordPatch) {
        self.record.apply(patch);
    }

    /// Gate predicate for a step against the current record.
    pub fn step_satisfied(&self, step: WizardStep) -> bool {
        match step {
            WizardStep::Location => self.record.location.coordinates.is_some(),
            WizardStep::SiteInfo => {
                self.record.site_info.roof_area_m2 > 0.0
                    && self.record.site_info.system_size_kw > 0.0
            }
            WizardStep::SolarPotential => self.record.solar_data.daily_output_kwh > 0.0,
            WizardStep::Savings => self.record.savings.computed,
            WizardStep::Compliance => {
                self.record.compliance.mandatory_score >= self.gate.mandatory_gate_pct
            }
            WizardStep::Results => true,
        }
    }

    /// Register a new location lookup. Any lookup issued earlier becomes
    /// stale; its completion will be dropped.
    pub fn begin_location_lookup(&mut self) -> LookupToken {
        self.lookup_seq += 1;
        LookupToken(self.lookup_seq)
    }

    /// Commit a resolved site if the token is still current. Stale responses
    /// return false and leave the record untouched. Irradiance falls back to
    /// the static state table when the provider produced none.
    pub fn complete_location_lookup(&mut self, token: LookupToken, site: ResolvedSite) -> bool {
        if token.0 != self.lookup_seq {
            return false;
        }

        let irradiance_kwh_m2_day = site.irradiance_kwh_m2_day.unwrap_or_else(|| {
            site.state
                .map(irradiance::state_irradiance)
                .unwrap_or(irradiance::DEFAULT_IRRADIANCE_KWH_M2_DAY)
        });

        // Outputs are derived on the solar step once system size is known.
        let solar_data = SolarData {
            irradiance_kwh_m2_day,
            ambient_temp_c: site.ambient_temp_c,
            ..self.record.solar_data
        };
        self.record.apply(RecordPatch {
            location: Some(Location {
                address: site.address,
                state: site.state,
                coordinates: Some(site.coordinates),
            }),
            solar_data: Some(solar_data),
            ..RecordPatch::default()
        });
        true
    }

    /// Recompute this record's compliance scores from its checklist and merge
    /// them back. Convenience for callers that edit the checklist directly.
    pub fn rescore_compliance(&mut self) {
        let scores = calculators::compliance_scores(&self.record.compliance.checklist);
        let mut compliance = self.record.compliance.clone();
        compliance.score = scores.score;
        compliance.mandatory_score = scores.mandatory_score;
        self.record.apply(RecordPatch {
            compliance: Some(compliance),
            ..RecordPatch::default()
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::assessment::domain::{Savings, SiteInfo};

    fn located_wizard() -> AssessmentWizard {
        let mut wizard = AssessmentWizard::new();
        let token = wizard.begin_location_lookup();
        wizard.complete_location_lookup(
            token,
            ResolvedSite {
                address: "Garki District, Abuja".to_string(),
                state: Some(NigerianState::Fct),
                coordinates: Coordinates {
                    lat: 9.0765,
                    lng: 7.3986,
                },
                irradiance_kwh_m2_day: None,
                ambient_temp_c: None,
            },
        );
        wizard
    }

    #[test]
    fn starts_on_location_step() {
        let wizard = AssessmentWizard::new();
        assert_eq!(wizard.current_step(), WizardStep::Location);
    }

    #[test]
    fn advance_refused_without_coordinates() {
        let mut wizard = AssessmentWizard::new();
        assert!(!wizard.advance());
        assert_eq!(wizard.current_step(), WizardStep::Location);
    }

    #[test]
    fn advance_refused_on_zero_roof_area() {
        let mut wizard = located_wizard();
        assert!(wizard.advance());
        assert_eq!(wizard.current_step(), WizardStep::SiteInfo);

        wizard.update(RecordPatch {
            site_info: Some(SiteInfo {
                roof_area_m2: 0.0,
                panel_efficiency_pct: 20.0,
                system_size_kw: 0.0,
            }),
            ..RecordPatch::default()
        });
        assert!(!wizard.advance());
        assert_eq!(wizard.current_step(), WizardStep::SiteInfo);
    }

    #[test]
    fn retreat_is_never_gated() {
        let mut wizard = located_wizard();
        assert!(wizard.advance());
        assert!(wizard.retreat());
        assert_eq!(wizard.current_step(), WizardStep::Location);
        assert!(!wizard.retreat());
    }

    #[test]
    fn savings_gate_requires_computation_not_amount() {
        let mut wizard = AssessmentWizard::new();
        assert!(!wizard.step_satisfied(WizardStep::Savings));

        wizard.update(RecordPatch {
            savings: Some(Savings {
                monthly_savings_ngn: 0,
                computed: true,
                ..Savings::default()
            }),
            ..RecordPatch::default()
        });
        assert!(wizard.step_satisfied(WizardStep::Savings));
    }

    #[test]
    fn compliance_gate_honours_configured_threshold() {
        let mut strict = AssessmentWizard::with_gate(GatePolicy {
            mandatory_gate_pct: 100,
        });
        let mut relaxed = AssessmentWizard::with_gate(GatePolicy {
            mandatory_gate_pct: 60,
        });

        for wizard in [&mut strict, &mut relaxed] {
            let mut compliance = wizard.record().compliance.clone();
            for item in compliance.checklist.iter_mut().filter(|i| i.mandatory).take(4) {
                item.satisfied = true;
            }
            wizard.update(RecordPatch {
                compliance: Some(compliance),
                ..RecordPatch::default()
            });
            wizard.rescore_compliance();
        }

        assert_eq!(strict.record().compliance.mandatory_score, 80);
        assert!(!strict.step_satisfied(WizardStep::Compliance));
        assert!(relaxed.step_satisfied(WizardStep::Compliance));
    }

    #[test]
    fn stale_lookup_responses_are_ignored() {
        let mut wizard = AssessmentWizard::new();
        let first = wizard.begin_location_lookup();
        let second = wizard.begin_location_lookup();

        let stale = ResolvedSite {
            address: "Somewhere old".to_string(),
            state: Some(NigerianState::Lagos),
            coordinates: Coordinates {
                lat: 6.5244,
                lng: 3.3792,
            },
            irradiance_kwh_m2_day: Some(4.2),
            ambient_temp_c: None,
        };
        assert!(!wizard.complete_location_lookup(first, stale));
        assert!(wizard.record().location.coordinates.is_none());

        let fresh = ResolvedSite {
            address: "Kano Municipal".to_string(),
            state: Some(NigerianState::Kano),
            coordinates: Coordinates {
                lat: 12.0022,
                lng: 8.5920,
            },
            irradiance_kwh_m2_day: None,
            ambient_temp_c: Some(28.4),
        };
        assert!(wizard.complete_location_lookup(second, fresh));
        assert_eq!(wizard.record().location.state, Some(NigerianState::Kano));
        // No provider irradiance: static table value for Kano.
        assert_eq!(wizard.record().solar_data.irradiance_kwh_m2_day, 5.8);
    }

    #[test]
    fn update_never_moves_the_step_pointer() {
        let mut wizard = located_wizard();
        let before = wizard.current_step();
        wizard.update(RecordPatch {
            site_info: Some(SiteInfo {
                roof_area_m2: 150.0,
                panel_efficiency_pct: 20.0,
                system_size_kw: 4.5,
            }),
            ..RecordPatch::default()
        });
        assert_eq!(wizard.current_step(), before);
    }

    #[test]
    fn terminal_step_only_leaves_via_retreat() {
        let mut wizard = located_wizard();
        // Walk the happy path to the end.
        wizard.advance();
        wizard.update(RecordPatch {
            site_info: Some(SiteInfo {
                roof_area_m2: 150.0,
                panel_efficiency_pct: 20.0,
                system_size_kw: 4.5,
            }),
            ..RecordPatch::default()
        });
        wizard.advance();
        let mut solar = wizard.record().solar_data;
        solar.daily_output_kwh = 22.95;
        solar.annual_output_kwh = 8377.0;
        wizard.update(RecordPatch {
            solar_data: Some(solar),
            ..RecordPatch::default()
        });
        wizard.advance();
        wizard.update(RecordPatch {
            savings: Some(Savings {
                computed: true,
                ..Savings::default()
            }),
            ..RecordPatch::default()
        });
        wizard.advance();
        let mut compliance = wizard.record().compliance.clone();
        for item in compliance.checklist.iter_mut() {
            item.satisfied = true;
        }
        wizard.update(RecordPatch {
            compliance: Some(compliance),
            ..RecordPatch::default()
        });
        wizard.rescore_compliance();
        wizard.advance();

        assert_eq!(wizard.current_step(), WizardStep::Results);
        assert!(!wizard.advance());
        assert_eq!(wizard.current_step(), WizardStep::Results);
        assert!(wizard.retreat());
        assert_eq!(wizard.current_step(), WizardStep::Compliance);
    }
}
