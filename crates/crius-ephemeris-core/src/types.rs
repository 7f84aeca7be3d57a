//! Record types shared by adapters, services and callers.
//!
//! Every record is a plain value: no identity beyond its fields, no
//! invariants enforced at construction. Range and cross-field checks live in
//! [`crate::validation`].

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// House cusp keys, in house order.
pub const HOUSE_CUSP_KEYS: [&str; 12] = [
    "1", "2", "3", "4", "5", "6", "7", "8", "9", "10", "11", "12",
];

/// Angle keys: ascendant, midheaven, imum coeli, descendant.
pub const ANGLE_KEYS: [&str; 4] = ["asc", "mc", "ic", "dc"];

/// Map an angle in degrees onto `[0, 360)`.
pub fn normalize_degrees(degrees: f64) -> f64 {
    let normalized = degrees.rem_euclid(360.0);
    // rem_euclid rounds tiny negative inputs up to exactly 360.0
    if normalized >= 360.0 {
        0.0
    } else {
        normalized
    }
}

/// Geographic location coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct GeoLocation {
    /// Latitude in degrees, north positive
    pub lat: f64,
    /// Longitude in degrees, east positive
    pub lon: f64,
}

impl GeoLocation {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ZodiacType {
    Tropical,
    Sidereal,
}

impl ZodiacType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ZodiacType::Tropical => "tropical",
            ZodiacType::Sidereal => "sidereal",
        }
    }
}

impl fmt::Display for ZodiacType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How deep a dasha breakdown should go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum DashaLevel {
    Mahadasha,
    Antardasha,
    Pratyantardasha,
}

/// Optional Vedic sub-configuration. Every field may be omitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct VedicOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_nakshatras: Option<bool>,
    /// Divisional chart identifiers, e.g. "d9"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled_vargas: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_dashas: Option<bool>,
    /// Dasha system identifiers, e.g. "vimshottari"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dasha_systems: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dashas_depth: Option<DashaLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_yogas: Option<bool>,
}

/// Settings for ephemeris calculations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct EphemerisSettings {
    pub zodiac_type: ZodiacType,
    /// Ayanamsa name; required when `zodiac_type` is sidereal
    #[serde(default)]
    pub ayanamsa: Option<String>,
    /// House system name, e.g. "placidus" or "whole_sign"
    pub house_system: String,
    /// Object identifiers to compute, in caller order
    pub include_objects: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vedic_options: Option<VedicOptions>,
}

impl EphemerisSettings {
    pub fn tropical<I, S>(house_system: impl Into<String>, include_objects: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            zodiac_type: ZodiacType::Tropical,
            ayanamsa: None,
            house_system: house_system.into(),
            include_objects: include_objects.into_iter().map(Into::into).collect(),
            vedic_options: None,
        }
    }

    pub fn sidereal<I, S>(
        ayanamsa: impl Into<String>,
        house_system: impl Into<String>,
        include_objects: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            zodiac_type: ZodiacType::Sidereal,
            ayanamsa: Some(ayanamsa.into()),
            ..Self::tropical(house_system, include_objects)
        }
    }

    pub fn with_vedic_options(mut self, options: VedicOptions) -> Self {
        self.vedic_options = Some(options);
        self
    }
}

/// Planetary position data
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct PlanetPosition {
    /// Longitude in degrees (0-360)
    pub lon: f64,
    /// Latitude in degrees
    pub lat: f64,
    /// Speed in longitude (degrees per day)
    pub speed_lon: f64,
    /// Whether the planet is retrograde
    pub retrograde: bool,
}

/// House system positions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct HousePositions {
    /// House system name
    pub system: String,
    /// House cusps: "1".."12" -> degrees
    pub cusps: BTreeMap<String, f64>,
    /// Angles: "asc", "mc", "ic", "dc" -> degrees
    pub angles: BTreeMap<String, f64>,
}

impl HousePositions {
    /// Cusp degrees in house order. `None` if any cusp is missing.
    pub fn cusp_degrees(&self) -> Option<[f64; 12]> {
        let mut degrees = [0.0; 12];
        for (slot, key) in degrees.iter_mut().zip(HOUSE_CUSP_KEYS) {
            *slot = *self.cusps.get(key)?;
        }
        Some(degrees)
    }

    pub fn angle(&self, key: &str) -> Option<f64> {
        self.angles.get(key).copied()
    }
}

/// Complete position data for a chart layer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct LayerPositions {
    /// Planet ID -> position
    pub planets: BTreeMap<String, PlanetPosition>,
    /// House positions (None if no location provided)
    #[serde(default)]
    pub houses: Option<HousePositions>,
}

/// Context for calculating positions for a chart layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct LayerContext {
    pub layer_id: String,
    /// Layer kind, e.g. "natal" or "transit"
    pub kind: String,
    pub datetime: DateTime<Utc>,
    #[serde(default)]
    pub location: Option<GeoLocation>,
    pub settings: EphemerisSettings,
}

impl LayerContext {
    pub fn new(
        layer_id: impl Into<String>,
        kind: impl Into<String>,
        datetime: DateTime<Utc>,
        location: Option<GeoLocation>,
        settings: EphemerisSettings,
    ) -> Self {
        Self {
            layer_id: layer_id.into(),
            kind: kind.into(),
            datetime,
            location,
            settings,
        }
    }

    /// Houses can only be computed when a location is present.
    pub fn wants_houses(&self) -> bool {
        self.location.is_some()
    }
}
