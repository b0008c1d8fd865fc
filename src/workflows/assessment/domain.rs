use serde::{Deserialize, Serialize};

use super::checklist::ComplianceBlueprint;

pub const DEFAULT_PANEL_EFFICIENCY_PCT: f64 = 20.0;
pub const DEFAULT_PPA_RATE_NGN: u32 = 180;

/// The 36 Nigerian states plus the Federal Capital Territory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NigerianState {
    Abia,
    Adamawa,
    AkwaIbom,
    Anambra,
    Bauchi,
    Bayelsa,
    Benue,
    Borno,
    CrossRiver,
    Delta,
    Ebonyi,
    Edo,
    Ekiti,
    Enugu,
    Gombe,
    Imo,
    Jigawa,
    Kaduna,
    Kano,
    Katsina,
    Kebbi,
    Kogi,
    Kwara,
    Lagos,
    Nasarawa,
    Niger,
    Ogun,
    Ondo,
    Osun,
    Oyo,
    Plateau,
    Rivers,
    Sokoto,
    Taraba,
    Yobe,
    Zamfara,
    Fct,
}

impl NigerianState {
    pub const fn ordered() -> [Self; 37] {
        [
            Self::Abia,
            Self::Adamawa,
            Self::AkwaIbom,
            Self::Anambra,
            Self::Bauchi,
            Self::Bayelsa,
            Self::Benue,
            Self::Borno,
            Self::CrossRiver,
            Self::Delta,
            Self::Ebonyi,
            Self::Edo,
            Self::Ekiti,
            Self::Enugu,
            Self::Gombe,
            Self::Imo,
            Self::Jigawa,
            Self::Kaduna,
            Self::Kano,
            Self::Katsina,
            Self::Kebbi,
            Self::Kogi,
            Self::Kwara,
            Self::Lagos,
            Self::Nasarawa,
            Self::Niger,
            Self::Ogun,
            Self::Ondo,
            Self::Osun,
            Self::Oyo,
            Self::Plateau,
            Self::Rivers,
            Self::Sokoto,
            Self::Taraba,
            Self::Yobe,
            Self::Zamfara,
            Self::Fct,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Abia => "Abia",
            Self::Adamawa => "Adamawa",
            Self::AkwaIbom => "Akwa Ibom",
            Self::Anambra => "Anambra",
            Self::Bauchi => "Bauchi",
            Self::Bayelsa => "Bayelsa",
            Self::Benue => "Benue",
            Self::Borno => "Borno",
            Self::CrossRiver => "Cross River",
            Self::Delta => "Delta",
            Self::Ebonyi => "Ebonyi",
            Self::Edo => "Edo",
            Self::Ekiti => "Ekiti",
            Self::Enugu => "Enugu",
            Self::Gombe => "Gombe",
            Self::Imo => "Imo",
            Self::Jigawa => "Jigawa",
            Self::Kaduna => "Kaduna",
            Self::Kano => "Kano",
            Self::Katsina => "Katsina",
            Self::Kebbi => "Kebbi",
            Self::Kogi => "Kogi",
            Self::Kwara => "Kwara",
            Self::Lagos => "Lagos",
            Self::Nasarawa => "Nasarawa",
            Self::Niger => "Niger",
            Self::Ogun => "Ogun",
            Self::Ondo => "Ondo",
            Self::Osun => "Osun",
            Self::Oyo => "Oyo",
            Self::Plateau => "Plateau",
            Self::Rivers => "Rivers",
            Self::Sokoto => "Sokoto",
            Self::Taraba => "Taraba",
            Self::Yobe => "Yobe",
            Self::Zamfara => "Zamfara",
            Self::Fct => "FCT",
        }
    }

    /// Parse a state from its display label, case-insensitively.
    pub fn from_label(value: &str) -> Option<Self> {
        let trimmed = value.trim();
        Self::ordered()
            .into_iter()
            .find(|state| state.label().eq_ignore_ascii_case(trimmed))
    }

    /// Scan free text (e.g. a geocoded display name) for a state label.
    /// The country name is stripped first so "Niger" cannot match inside
    /// "Nigeria".
    pub fn find_in(text: &str) -> Option<Self> {
        let lowered = text.to_lowercase().replace("nigeria", "");
        Self::ordered()
            .into_iter()
            .find(|state| lowered.contains(&state.label().to_lowercase()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Location {
    pub address: String,
    pub state: Option<NigerianState>,
    pub coordinates: Option<Coordinates>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SiteInfo {
    pub roof_area_m2: f64,
    pub panel_efficiency_pct: f64,
    pub system_size_kw: f64,
}

impl Default for SiteInfo {
    fn default() -> Self {
        Self {
            roof_area_m2: 0.0,
            panel_efficiency_pct: DEFAULT_PANEL_EFFICIENCY_PCT,
            system_size_kw: 0.0,
        }
    }
}

/// Common roof configurations offered as quick-fill presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SitePreset {
    SmallResidential,
    MediumCommercial,
    LargeIndustrial,
}

impl SitePreset {
    /// Roof area (m²) and panel efficiency (%) for the preset.
    pub const fn dimensions(self) -> (f64, f64) {
        match self {
            Self::SmallResidential => (50.0, 18.0),
            Self::MediumCommercial => (150.0, 20.0),
            Self::LargeIndustrial => (300.0, 22.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SolarData {
    pub daily_output_kwh: f64,
    pub annual_output_kwh: f64,
    pub irradiance_kwh_m2_day: f64,
    pub ambient_temp_c: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Savings {
    pub current_usage_kwh: f64,
    pub current_bill_ngn: f64,
    pub ppa_rate_ngn: u32,
    pub monthly_savings_ngn: i64,
    pub annual_savings_ngn: i64,
    /// Set once the savings calculation has actually run; a zero amount is a
    /// valid computed result and must not be mistaken for "not yet run".
    #[serde(default)]
    pub computed: bool,
}

impl Default for Savings {
    fn default() -> Self {
        Self {
            current_usage_kwh: 0.0,
            current_bill_ngn: 0.0,
            ppa_rate_ngn: DEFAULT_PPA_RATE_NGN,
            monthly_savings_ngn: 0,
            annual_savings_ngn: 0,
            computed: false,
        }
    }
}

/// Typical monthly usage patterns offered as quick-fill presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsagePreset {
    Residential,
    Commercial,
    Industrial,
}

impl UsagePreset {
    /// Monthly usage (kWh) and bill (₦) at the Band A reference tariff.
    pub const fn profile(self) -> (f64, f64) {
        match self {
            Self::Residential => (500.0, 112_500.0),
            Self::Commercial => (2_000.0, 450_000.0),
            Self::Industrial => (10_000.0, 2_250_000.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub key: String,
    pub mandatory: bool,
    pub satisfied: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Compliance {
    pub checklist: Vec<ChecklistItem>,
    pub score: u8,
    pub mandatory_score: u8,
}

impl Default for Compliance {
    fn default() -> Self {
        Self {
            checklist: ComplianceBlueprint::standard().empty_checklist(),
            score: 0,
            mandatory_score: 0,
        }
    }
}

/// Single mutable aggregate accumulated across the wizard steps. Lives for
/// one session; each step overwrites only the slice it owns via
/// [`RecordPatch`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AssessmentRecord {
    pub location: Location,
    pub site_info: SiteInfo,
    pub solar_data: SolarData,
    pub savings: Savings,
    pub compliance: Compliance,
}

/// Shallow merge payload: each populated top-level slice replaces the
/// record's slice wholesale, everything else is left untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RecordPatch {
    #[serde(default)]
    pub location: Option<Location>,
    #[serde(default)]
    pub site_info: Option<SiteInfo>,
    #[serde(default)]
    pub solar_data: Option<SolarData>,
    #[serde(default)]
    pub savings: Option<Savings>,
    #[serde(default)]
    pub compliance: Option<Compliance>,
}

impl AssessmentRecord {
    pub fn apply(&mut self, patch: RecordPatch) {
        if let Some(location) = patch.location {
            self.location = location;
        }
        if let Some(site_info) = patch.site_info {
            self.site_info = site_info;
        }
        if let Some(solar_data) = patch.solar_data {
            self.solar_data = solar_data;
        }
        if let Some(savings) = patch.savings {
            self.savings = savings;
        }
        if let Some(compliance) = patch.compliance {
            self.compliance = compliance;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    Location,
    SiteInfo,
    SolarPotential,
    Savings,
    Compliance,
    Results,
}

impl WizardStep {
    pub const fn ordered() -> [Self; 6] {
        [
            Self::Location,
            Self::SiteInfo,
            Self::SolarPotential,
            Self::Savings,
            Self::Compliance,
            Self::Results,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Location => "Location",
            Self::SiteInfo => "Site Info",
            Self::SolarPotential => "Solar Potential",
            Self::Savings => "Savings",
            Self::Compliance => "Compliance",
            Self::Results => "Results",
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            Self::Location => "Select location on interactive map",
            Self::SiteInfo => "Enter site specifications",
            Self::SolarPotential => "Calculate solar output",
            Self::Savings => "Estimate PPA savings",
            Self::Compliance => "Check regulatory requirements",
            Self::Results => "View assessment report",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Viability {
    HighlyViable,
    Viable,
    NeedsAttention,
}

impl Viability {
    pub const fn label(self) -> &'static str {
        match self {
            Self::HighlyViable => "Highly Viable",
            Self::Viable => "Viable",
            Self::NeedsAttention => "Needs Attention",
        }
    }

    pub const fn headline(self) -> &'static str {
        match self {
            Self::HighlyViable => {
                "This site shows excellent potential for a successful PPA project."
            }
            Self::Viable => "This site has good potential with some considerations needed.",
            Self::NeedsAttention => {
                "This site requires attention to key areas before proceeding."
            }
        }
    }
}

/// Solar performance rating bands by irradiance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceBand {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl PerformanceBand {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Fair => "Fair",
            Self::Poor => "Poor",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QuickLocation {
    pub name: &'static str,
    pub state: NigerianState,
    pub coordinates: Coordinates,
}

/// Popular cities offered as one-click location shortcuts.
pub const fn quick_locations() -> [QuickLocation; 6] {
    [
        QuickLocation {
            name: "Lagos",
            state: NigerianState::Lagos,
            coordinates: Coordinates {
                lat: 6.5244,
                lng: 3.3792,
            },
        },
        QuickLocation {
            name: "Abuja",
            state: NigerianState::Fct,
            coordinates: Coordinates {
                lat: 9.0765,
                lng: 7.3986,
            },
        },
        QuickLocation {
            name: "Kano",
            state: NigerianState::Kano,
            coordinates: Coordinates {
                lat: 12.0022,
                lng: 8.5920,
            },
        },
        QuickLocation {
            name: "Port Harcourt",
            state: NigerianState::Rivers,
            coordinates: Coordinates {
                lat: 4.8156,
                lng: 7.0498,
            },
        },
        QuickLocation {
            name: "Ibadan",
            state: NigerianState::Oyo,
            coordinates: Coordinates {
                lat: 7.3775,
                lng: 3.9470,
            },
        },
        QuickLocation {
            name: "Kaduna",
            state: NigerianState::Kaduna,
            coordinates: Coordinates {
                lat: 10.5105,
                lng: 7.4165,
            },
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_labels_round_trip() {
        for state in NigerianState::ordered() {
            assert_eq!(NigerianState::from_label(state.label()), Some(state));
        }
    }

    #[test]
    fn from_label_is_case_insensitive() {
        assert_eq!(
            NigerianState::from_label("akwa ibom"),
            Some(NigerianState::AkwaIbom)
        );
        assert_eq!(NigerianState::from_label("fct"), Some(NigerianState::Fct));
        assert_eq!(NigerianState::from_label("Atlantis"), None);
    }

    #[test]
    fn find_in_scans_display_names() {
        let display = "Garki, Municipal Area Council, FCT, 900103, Nigeria";
        assert_eq!(NigerianState::find_in(display), Some(NigerianState::Fct));
        assert_eq!(NigerianState::find_in("somewhere else entirely"), None);
        // The country suffix alone must not resolve to Niger state.
        assert_eq!(NigerianState::find_in("Gwagwalada, Nigeria"), None);
        assert_eq!(
            NigerianState::find_in("Minna, Niger, Nigeria"),
            Some(NigerianState::Niger)
        );
    }

    #[test]
    fn record_defaults_match_session_start() {
        let record = AssessmentRecord::default();
        assert_eq!(record.site_info.panel_efficiency_pct, 20.0);
        assert_eq!(record.savings.ppa_rate_ngn, 180);
        assert_eq!(record.compliance.checklist.len(), 7);
        assert!(record.compliance.checklist.iter().all(|item| !item.satisfied));
        assert!(!record.savings.computed);
    }

    #[test]
    fn apply_replaces_only_named_slices() {
        let mut record = AssessmentRecord::default();
        record.site_info.roof_area_m2 = 150.0;

        record.apply(RecordPatch {
            savings: Some(Savings {
                current_usage_kwh: 500.0,
                current_bill_ngn: 112_500.0,
                ..Savings::default()
            }),
            ..RecordPatch::default()
        });

        assert_eq!(record.site_info.roof_area_m2, 150.0);
        assert_eq!(record.savings.current_usage_kwh, 500.0);
    }

    #[test]
    fn apply_is_idempotent_for_identical_patches() {
        let patch = RecordPatch {
            site_info: Some(SiteInfo {
                roof_area_m2: 150.0,
                panel_efficiency_pct: 20.0,
                system_size_kw: 4.5,
            }),
            ..RecordPatch::default()
        };

        let mut once = AssessmentRecord::default();
        once.apply(patch.clone());

        let mut twice = AssessmentRecord::default();
        twice.apply(patch.clone());
        twice.apply(patch);

        assert_eq!(once, twice);
    }
}
