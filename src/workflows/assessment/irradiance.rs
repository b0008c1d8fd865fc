use super::domain::NigerianState;

/// Applied when a free-text state name does not match any known state.
pub const DEFAULT_IRRADIANCE_KWH_M2_DAY: f64 = 4.5;

/// Average daily solar irradiance (kWh/m²/day) per state.
///
/// Values span 3.5 (Bayelsa, coastal south) to 6.2 (Sokoto, arid north).
pub const fn state_irradiance(state: NigerianState) -> f64 {
    match state {
        NigerianState::Lagos => 4.2,
        NigerianState::Fct => 5.1,
        NigerianState::Rivers => 4.0,
        NigerianState::Kaduna => 5.3,
        NigerianState::Kano => 5.8,
        NigerianState::Ogun => 4.3,
        NigerianState::Oyo => 4.7,
        NigerianState::Plateau => 5.4,
        NigerianState::Delta => 3.9,
        NigerianState::Imo => 4.1,
        NigerianState::CrossRiver => 3.8,
        NigerianState::Enugu => 4.4,
        NigerianState::Anambra => 4.2,
        NigerianState::Edo => 4.0,
        NigerianState::Ondo => 4.5,
        NigerianState::Osun => 4.6,
        NigerianState::Ekiti => 4.8,
        NigerianState::Kwara => 5.0,
        NigerianState::Kogi => 4.9,
        NigerianState::Niger => 5.2,
        NigerianState::Benue => 4.9,
        NigerianState::Nasarawa => 5.0,
        NigerianState::Taraba => 4.7,
        NigerianState::Adamawa => 5.1,
        NigerianState::Bauchi => 5.4,
        NigerianState::Gombe => 5.6,
        NigerianState::Yobe => 5.9,
        NigerianState::Borno => 6.1,
        NigerianState::Jigawa => 5.7,
        NigerianState::Katsina => 5.8,
        NigerianState::Kebbi => 6.0,
        NigerianState::Sokoto => 6.2,
        NigerianState::Zamfara => 5.9,
        NigerianState::Abia => 4.0,
        NigerianState::AkwaIbom => 3.7,
        NigerianState::Bayelsa => 3.5,
        NigerianState::Ebonyi => 4.3,
    }
}

/// Irradiance for a free-text state name, falling back to the default when
/// the name is unrecognised.
pub fn irradiance_for_name(name: &str) -> f64 {
    NigerianState::from_label(name)
        .map(state_irradiance)
        .unwrap_or(DEFAULT_IRRADIANCE_KWH_M2_DAY)
}
