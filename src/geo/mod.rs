//! Geo lookup adapter: forward/reverse geocoding via Nominatim and daily
//! irradiance via the NASA POWER point API. Every failure here is retryable;
//! callers fall back to the static state irradiance table so a provider
//! outage never blocks the wizard.

use std::collections::HashMap;
use std::time::Duration;

use serde::Deserialize;
use tracing::warn;

use crate::workflows::assessment::domain::{Coordinates, NigerianState};
use crate::workflows::assessment::ResolvedSite;

const NOMINATIM_BASE: &str = "https://nominatim.openstreetmap.org";
const NASA_POWER_BASE: &str = "https://power.larc.nasa.gov";
const USER_AGENT: &str = concat!("ppa-validator/", env!("CARGO_PKG_VERSION"));

// Nigeria bounding box; picks outside it are rejected before any request.
const NIGERIA_LNG_MIN: f64 = 2.5;
const NIGERIA_LNG_MAX: f64 = 15.0;
const NIGERIA_LAT_MIN: f64 = 4.0;
const NIGERIA_LAT_MAX: f64 = 14.0;

// Fallbacks when the satellite feed returns no usable samples.
const FALLBACK_IRRADIANCE_KWH_M2_DAY: f64 = 4.5;
const FALLBACK_TEMPERATURE_C: f64 = 25.0;

#[derive(Debug, thiserror::Error)]
pub enum GeoLookupError {
    #[error("geo provider request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("no results for query '{query}'")]
    NoResults { query: String },
    #[error("coordinates ({lat}, {lng}) are outside Nigeria")]
    OutsideCoverage { lat: f64, lng: f64 },
    #[error("geo provider returned an unusable payload: {0}")]
    Provider(String),
}

/// One forward-geocoding candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoMatch {
    pub lat: f64,
    pub lng: f64,
    pub display_name: String,
}

/// Reverse-geocoding result for a picked coordinate pair.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedAddress {
    pub display_name: String,
    pub state: Option<NigerianState>,
}

/// Averaged satellite conditions at a site.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SiteConditions {
    pub irradiance_kwh_m2_day: f64,
    pub ambient_temp_c: f64,
}

pub fn within_nigeria(lat: f64, lng: f64) -> bool {
    (NIGERIA_LAT_MIN..=NIGERIA_LAT_MAX).contains(&lat)
        && (NIGERIA_LNG_MIN..=NIGERIA_LNG_MAX).contains(&lng)
}

#[derive(Debug, Clone)]
pub struct GeoLookupClient {
    http: reqwest::Client,
    nominatim_base: String,
    power_base: String,
}

impl GeoLookupClient {
    pub fn new(timeout: Duration) -> Result<Self, GeoLookupError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            http,
            nominatim_base: NOMINATIM_BASE.to_string(),
            power_base: NASA_POWER_BASE.to_string(),
        })
    }

    /// Point the client at alternative endpoints (local stubs in tests).
    pub fn with_endpoints(
        timeout: Duration,
        nominatim_base: impl Into<String>,
        power_base: impl Into<String>,
    ) -> Result<Self, GeoLookupError> {
        let mut client = Self::new(timeout)?;
        client.nominatim_base = nominatim_base.into();
        client.power_base = power_base.into();
        Ok(client)
    }

    /// Forward search for an address, restricted to Nigeria.
    pub async fn search(&self, query: &str) -> Result<Vec<GeoMatch>, GeoLookupError> {
        let url = format!("{}/search", self.nominatim_base);
        let places: Vec<NominatimPlace> = self
            .http
            .get(url)
            .query(&[
                ("q", format!("{query}, Nigeria").as_str()),
                ("format", "json"),
                ("countrycodes", "ng"),
                ("limit", "5"),
                ("addressdetails", "1"),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if places.is_empty() {
            return Err(GeoLookupError::NoResults {
                query: query.to_string(),
            });
        }

        places.into_iter().map(NominatimPlace::into_match).collect()
    }

    /// Reverse-geocode a coordinate pair into a display name and state.
    pub async fn reverse(&self, lat: f64, lng: f64) -> Result<ResolvedAddress, GeoLookupError> {
        let url = format!("{}/reverse", self.nominatim_base);
        let place: NominatimReverse = self
            .http
            .get(url)
            .query(&[
                ("lat", format!("{lat:.6}").as_str()),
                ("lon", format!("{lng:.6}").as_str()),
                ("format", "json"),
                ("countrycodes", "ng"),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        match place.display_name {
            Some(display_name) => {
                let state = NigerianState::find_in(&display_name);
                Ok(ResolvedAddress {
                    display_name,
                    state,
                })
            }
            None => Err(GeoLookupError::NoResults {
                query: format!("{lat:.4}, {lng:.4}"),
            }),
        }
    }

    /// Average daily irradiance and temperature over calendar year 2023 from
    /// the NASA POWER satellite feed.
    pub async fn site_conditions(
        &self,
        lat: f64,
        lng: f64,
    ) -> Result<SiteConditions, GeoLookupError> {
        let url = format!("{}/api/temporal/daily/point", self.power_base);
        let response: PowerResponse = self
            .http
            .get(url)
            .query(&[
                ("start", "20230101"),
                ("end", "20231231"),
                ("latitude", format!("{lat:.6}").as_str()),
                ("longitude", format!("{lng:.6}").as_str()),
                ("community", "SB"),
                ("parameters", "ALLSKY_SFC_SW_DWN,T2M"),
                ("format", "JSON"),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(response.into_conditions())
    }

    /// Resolve everything the wizard needs for a picked coordinate pair.
    ///
    /// Only an out-of-coverage pick is an error; provider failures degrade to
    /// a coordinate-string address and table-backed irradiance so the lookup
    /// always yields a usable site.
    pub async fn resolve_site(&self, lat: f64, lng: f64) -> Result<ResolvedSite, GeoLookupError> {
        if !within_nigeria(lat, lng) {
            return Err(GeoLookupError::OutsideCoverage { lat, lng });
        }

        let (address, state) = match self.reverse(lat, lng).await {
            Ok(resolved) => (resolved.display_name, resolved.state),
            Err(err) => {
                warn!(%lat, %lng, error = %err, "reverse geocoding failed, using coordinates");
                (format!("{lat:.4}, {lng:.4}"), None)
            }
        };

        let (irradiance, temperature) = match self.site_conditions(lat, lng).await {
            Ok(conditions) => (
                Some(conditions.irradiance_kwh_m2_day),
                Some(conditions.ambient_temp_c),
            ),
            Err(err) => {
                warn!(%lat, %lng, error = %err, "irradiance lookup failed, deferring to state table");
                (None, None)
            }
        };

        Ok(ResolvedSite {
            address,
            state,
            coordinates: Coordinates { lat, lng },
            irradiance_kwh_m2_day: irradiance,
            ambient_temp_c: temperature,
        })
    }
}

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    display_name: String,
    lat: String,
    lon: String,
}

impl NominatimPlace {
    // Nominatim serialises coordinates as strings.
    fn into_match(self) -> Result<GeoMatch, GeoLookupError> {
        let lat = self
            .lat
            .parse::<f64>()
            .map_err(|_| GeoLookupError::Provider(format!("bad latitude '{}'", self.lat)))?;
        let lng = self
            .lon
            .parse::<f64>()
            .map_err(|_| GeoLookupError::Provider(format!("bad longitude '{}'", self.lon)))?;
        Ok(GeoMatch {
            lat,
            lng,
            display_name: self.display_name,
        })
    }
}

#[derive(Debug, Deserialize)]
struct NominatimReverse {
    #[serde(default)]
    display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PowerResponse {
    properties: PowerProperties,
}

#[derive(Debug, Deserialize)]
struct PowerProperties {
    parameter: PowerParameters,
}

#[derive(Debug, Deserialize)]
struct PowerParameters {
    #[serde(rename = "ALLSKY_SFC_SW_DWN", default)]
    irradiance: HashMap<String, f64>,
    #[serde(rename = "T2M", default)]
    temperature: HashMap<String, f64>,
}

impl PowerResponse {
    fn into_conditions(self) -> SiteConditions {
        let irradiance = match average(self.properties.parameter.irradiance.values()) {
            // Wh/m²/day from the feed; convert to kWh/m²/day.
            Some(avg) => round2(avg / 1000.0 * 24.0),
            None => FALLBACK_IRRADIANCE_KWH_M2_DAY,
        };

        let temperature = match average(self.properties.parameter.temperature.values()) {
            // Feed reports Kelvin.
            Some(avg) => round1(avg - 273.15),
            None => FALLBACK_TEMPERATURE_C,
        };

        SiteConditions {
            irradiance_kwh_m2_day: irradiance,
            ambient_temp_c: temperature,
        }
    }
}

// -999 is the feed's fill value for missing days.
fn average<'a>(values: impl Iterator<Item = &'a f64>) -> Option<f64> {
    let usable: Vec<f64> = values
        .copied()
        .filter(|v| v.is_finite() && *v > -900.0)
        .collect();
    if usable.is_empty() {
        return None;
    }
    Some(usable.iter().sum::<f64>() / usable.len() as f64)
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
