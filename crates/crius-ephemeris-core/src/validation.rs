//! Runtime validation for ephemeris records.
//!
//! Opt-in: nothing in the crate calls these checks implicitly. Each check
//! returns a list of human-readable messages; an empty list means valid.
//! Messages for nested records are prefixed with their path, e.g.
//! `planets.sun.lon ...` or `settings.ayanamsa ...`.

use crate::error::ValidationError;
use crate::types::{
    EphemerisSettings, GeoLocation, HousePositions, LayerContext, LayerPositions, PlanetPosition,
    VedicOptions, ZodiacType, ANGLE_KEYS, HOUSE_CUSP_KEYS,
};
use serde::de::DeserializeOwned;
use std::collections::{BTreeMap, HashSet};

/// A record that can check its own structural invariants.
pub trait Validate {
    fn validate(&self) -> Vec<String>;
}

impl Validate for GeoLocation {
    fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if !(-90.0..=90.0).contains(&self.lat) {
            errors.push(format!("lat must be between -90 and 90, got {}", self.lat));
        }
        if !(-180.0..=180.0).contains(&self.lon) {
            errors.push(format!("lon must be between -180 and 180, got {}", self.lon));
        }
        errors
    }
}

impl Validate for VedicOptions {
    fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if let Some(vargas) = &self.enabled_vargas {
            check_identifiers("enabled_vargas", vargas, &mut errors);
        }
        if let Some(systems) = &self.dasha_systems {
            check_identifiers("dasha_systems", systems, &mut errors);
        }
        errors
    }
}

impl Validate for EphemerisSettings {
    fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.zodiac_type == ZodiacType::Sidereal {
            match self.ayanamsa.as_deref() {
                None => errors.push(
                    "ayanamsa is required when zodiac_type is 'sidereal'".to_string(),
                ),
                Some(a) if a.trim().is_empty() => errors.push(
                    "ayanamsa must be a non-empty string when zodiac_type is 'sidereal'"
                        .to_string(),
                ),
                Some(_) => {}
            }
        }

        if self.house_system.trim().is_empty() {
            errors.push("house_system must be a non-empty string".to_string());
        }

        // repeated objects are allowed; they map to one position
        check_non_empty("include_objects", &self.include_objects, &mut errors);

        if let Some(vedic) = &self.vedic_options {
            nest("vedic_options", vedic.validate(), &mut errors);
        }
        errors
    }
}

impl Validate for PlanetPosition {
    fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if !(0.0..360.0).contains(&self.lon) {
            errors.push(format!("lon must be in [0, 360), got {}", self.lon));
        }
        if !self.lat.is_finite() {
            errors.push(format!("lat must be finite, got {}", self.lat));
        }
        if !self.speed_lon.is_finite() {
            errors.push(format!("speed_lon must be finite, got {}", self.speed_lon));
        }
        errors
    }
}

impl Validate for HousePositions {
    fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.system.trim().is_empty() {
            errors.push("system must be a non-empty string".to_string());
        }
        check_degree_map("cusps", &self.cusps, &HOUSE_CUSP_KEYS, &mut errors);
        check_degree_map("angles", &self.angles, &ANGLE_KEYS, &mut errors);
        errors
    }
}

impl Validate for LayerPositions {
    fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        for (id, position) in &self.planets {
            if id.trim().is_empty() {
                errors.push("planets: planet IDs must be non-empty strings".to_string());
            }
            nest(&format!("planets.{id}"), position.validate(), &mut errors);
        }
        if let Some(houses) = &self.houses {
            nest("houses", houses.validate(), &mut errors);
        }
        errors
    }
}

impl Validate for LayerContext {
    fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.layer_id.trim().is_empty() {
            errors.push("layer_id must be a non-empty string".to_string());
        }
        if self.kind.trim().is_empty() {
            errors.push("kind must be a non-empty string".to_string());
        }
        if let Some(location) = &self.location {
            nest("location", location.validate(), &mut errors);
        }
        nest("settings", self.settings.validate(), &mut errors);
        errors
    }
}

pub fn validate_geo_location(location: &GeoLocation) -> Vec<String> {
    location.validate()
}

pub fn validate_vedic_options(options: &VedicOptions) -> Vec<String> {
    options.validate()
}

pub fn validate_ephemeris_settings(settings: &EphemerisSettings) -> Vec<String> {
    settings.validate()
}

pub fn validate_planet_position(position: &PlanetPosition) -> Vec<String> {
    position.validate()
}

pub fn validate_house_positions(houses: &HousePositions) -> Vec<String> {
    houses.validate()
}

pub fn validate_layer_positions(positions: &LayerPositions) -> Vec<String> {
    positions.validate()
}

pub fn validate_layer_context(context: &LayerContext) -> Vec<String> {
    context.validate()
}

/// Check an adapter result against the request that produced it.
///
/// Houses must be present exactly when the context carries a location, and
/// must be computed for the requested house system.
pub fn validate_positions_for_context(
    context: &LayerContext,
    positions: &LayerPositions,
) -> Vec<String> {
    let mut errors = Vec::new();
    match (&context.location, &positions.houses) {
        (None, Some(_)) => {
            errors.push("houses must be absent when no location is supplied".to_string())
        }
        (Some(_), None) => {
            errors.push("houses must be present when a location is supplied".to_string())
        }
        (Some(_), Some(houses)) if houses.system != context.settings.house_system => {
            errors.push(format!(
                "houses.system must match requested house_system '{}', got '{}'",
                context.settings.house_system, houses.system
            ))
        }
        _ => {}
    }
    errors
}

/// Deserialize `value` into `T` and run its checks.
///
/// Deserialization failures (unknown enum values, missing or unknown fields)
/// are reported as a single message.
pub fn validate_json<T>(value: serde_json::Value) -> Result<T, ValidationError>
where
    T: DeserializeOwned + Validate,
{
    let record: T = serde_json::from_value(value)
        .map_err(|e| ValidationError::new(vec![format!("invalid structure: {e}")]))?;
    let errors = record.validate();
    if errors.is_empty() {
        Ok(record)
    } else {
        Err(ValidationError::new(errors))
    }
}

fn nest(prefix: &str, nested: Vec<String>, errors: &mut Vec<String>) {
    errors.extend(nested.into_iter().map(|e| format!("{prefix}.{e}")));
}

fn check_non_empty(field: &str, ids: &[String], errors: &mut Vec<String>) {
    for (index, id) in ids.iter().enumerate() {
        if id.trim().is_empty() {
            errors.push(format!("{field}[{index}] must be a non-empty string"));
        }
    }
}

/// Non-empty and unique.
fn check_identifiers(field: &str, ids: &[String], errors: &mut Vec<String>) {
    check_non_empty(field, ids, errors);
    let mut seen = HashSet::new();
    for id in ids.iter().filter(|id| !id.trim().is_empty()) {
        if !seen.insert(id.as_str()) {
            errors.push(format!("{field} contains duplicate entry '{id}'"));
        }
    }
}

fn check_degree_map(
    field: &str,
    map: &BTreeMap<String, f64>,
    expected: &[&str],
    errors: &mut Vec<String>,
) {
    for key in expected {
        match map.get(*key) {
            None => errors.push(format!("{field} is missing key '{key}'")),
            Some(deg) if !(0.0..360.0).contains(deg) => {
                errors.push(format!("{field}.{key} must be in [0, 360), got {deg}"))
            }
            Some(_) => {}
        }
    }
    for key in map.keys() {
        if !expected.contains(&key.as_str()) {
            errors.push(format!("{field} has unexpected key '{key}'"));
        }
    }
}
