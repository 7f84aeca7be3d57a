use crate::adapter::EphemerisAdapter;
use crate::error::EphemerisError;
use crate::types::{
    normalize_degrees, EphemerisSettings, GeoLocation, HousePositions, LayerPositions,
    PlanetPosition, ZodiacType, ANGLE_KEYS, HOUSE_CUSP_KEYS,
};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// (id, mean longitude at J2000 in degrees, mean daily motion in degrees)
const MEAN_ELEMENTS: &[(&str, f64, f64)] = &[
    ("sun", 280.460, 0.985_647_4),
    ("moon", 218.316, 13.176_396),
    ("mercury", 252.251, 4.092_339),
    ("venus", 181.980, 1.602_130),
    ("mars", 355.433, 0.524_033),
    ("jupiter", 34.351, 0.083_091),
    ("saturn", 50.077, 0.033_460),
    ("uranus", 314.055, 0.011_733),
    ("neptune", 304.349, 0.005_990),
    ("pluto", 238.929, 0.003_970),
    ("north_node", 125.045, -0.052_954),
    ("south_node", 305.045, -0.052_954),
];

const SIDEREAL_DAY_MOTION: f64 = 360.985_647_366_29;
const GMST_AT_J2000: f64 = 280.460_618_37;
/// Rough Lahiri offset; the mock only needs sidereal output to differ.
const MOCK_AYANAMSA: f64 = 24.0;

/// 2000-01-01T12:00:00Z as Unix milliseconds
const J2000_UNIX_MS: i64 = 946_728_000_000;

fn days_since_j2000(dt: DateTime<Utc>) -> f64 {
    (dt.timestamp_millis() - J2000_UNIX_MS) as f64 / 86_400_000.0
}

fn mean_elements(id: &str) -> (f64, f64) {
    MEAN_ELEMENTS
        .iter()
        .find(|(name, _, _)| *name == id)
        .map(|(_, lon, speed)| (*lon, *speed))
        .unwrap_or_else(|| {
            // stable stand-in for unknown bodies
            let seed = id.bytes().fold(17u32, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u32));
            ((seed % 360) as f64, 1.0)
        })
}

fn synthetic_positions(
    dt_utc: DateTime<Utc>,
    location: Option<&GeoLocation>,
    settings: &EphemerisSettings,
) -> LayerPositions {
    let days = days_since_j2000(dt_utc);
    let offset = match settings.zodiac_type {
        ZodiacType::Tropical => 0.0,
        ZodiacType::Sidereal => MOCK_AYANAMSA,
    };

    let planets = settings
        .include_objects
        .iter()
        .map(|id| {
            let (epoch_lon, speed) = mean_elements(&id.to_lowercase());
            let position = PlanetPosition {
                lon: normalize_degrees(epoch_lon + speed * days - offset),
                lat: 0.0,
                speed_lon: speed,
                retrograde: speed < 0.0,
            };
            (id.clone(), position)
        })
        .collect();

    let houses = location.map(|loc| {
        let mc = normalize_degrees(GMST_AT_J2000 + SIDEREAL_DAY_MOTION * days + loc.lon - offset);
        let asc = normalize_degrees(mc + 90.0);
        let cusps = HOUSE_CUSP_KEYS
            .iter()
            .enumerate()
            .map(|(i, key)| (key.to_string(), normalize_degrees(asc + 30.0 * i as f64)))
            .collect();
        let angles = ANGLE_KEYS
            .iter()
            .zip([asc, mc, mc + 180.0, asc + 180.0])
            .map(|(key, deg)| (key.to_string(), normalize_degrees(deg)))
            .collect();
        HousePositions {
            system: settings.house_system.clone(),
            cusps,
            angles,
        }
    });

    LayerPositions { planets, houses }
}

enum Behavior {
    Synthetic,
    Fixed(LayerPositions),
    Fail(EphemerisError),
}

/// Arguments of one `calc_positions` call.
#[derive(Debug, Clone, PartialEq)]
pub struct MockCall {
    pub dt_utc: DateTime<Utc>,
    pub location: Option<GeoLocation>,
    pub settings: EphemerisSettings,
}

/// Deterministic adapter for tests.
///
/// By default positions come from mean daily motions measured from J2000:
/// exactly the requested objects, plus equal houses anchored on the
/// location's longitude when a location is given. Every call is recorded,
/// failing ones included.
pub struct MockEphemerisAdapter {
    behavior: Behavior,
    call_count: AtomicUsize,
    last_call: Mutex<Option<MockCall>>,
}

impl Default for MockEphemerisAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl MockEphemerisAdapter {
    pub fn new() -> Self {
        Self::with_behavior(Behavior::Synthetic)
    }

    /// Always return `positions`, whatever the inputs.
    pub fn with_return_value(positions: LayerPositions) -> Self {
        Self::with_behavior(Behavior::Fixed(positions))
    }

    /// Always fail with `error`.
    pub fn failing(error: EphemerisError) -> Self {
        Self::with_behavior(Behavior::Fail(error))
    }

    fn with_behavior(behavior: Behavior) -> Self {
        Self {
            behavior,
            call_count: AtomicUsize::new(0),
            last_call: Mutex::new(None),
        }
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    pub fn last_call(&self) -> Option<MockCall> {
        self.last_call
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn last_dt(&self) -> Option<DateTime<Utc>> {
        self.last_call().map(|c| c.dt_utc)
    }

    pub fn last_location(&self) -> Option<GeoLocation> {
        self.last_call().and_then(|c| c.location)
    }

    pub fn last_settings(&self) -> Option<EphemerisSettings> {
        self.last_call().map(|c| c.settings)
    }
}

impl EphemerisAdapter for MockEphemerisAdapter {
    type Error = EphemerisError;

    fn calc_positions(
        &self,
        dt_utc: DateTime<Utc>,
        location: Option<&GeoLocation>,
        settings: &EphemerisSettings,
    ) -> Result<LayerPositions, EphemerisError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        *self.last_call.lock().unwrap_or_else(|e| e.into_inner()) = Some(MockCall {
            dt_utc,
            location: location.copied(),
            settings: settings.clone(),
        });

        match &self.behavior {
            Behavior::Synthetic => Ok(synthetic_positions(dt_utc, location, settings)),
            Behavior::Fixed(positions) => Ok(positions.clone()),
            Behavior::Fail(error) => Err(error.clone()),
        }
    }
}

/// Mock adapter returning the given planets and houses on every call.
pub fn create_test_adapter(
    planets: Option<BTreeMap<String, PlanetPosition>>,
    houses: Option<HousePositions>,
) -> MockEphemerisAdapter {
    MockEphemerisAdapter::with_return_value(LayerPositions {
        planets: planets.unwrap_or_default(),
        houses,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn j2000() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2000, 1, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_sun_at_j2000() {
        let settings = EphemerisSettings::tropical("placidus", ["sun"]);
        let positions = synthetic_positions(j2000(), None, &settings);
        let sun = positions.planets["sun"];
        assert!((sun.lon - 280.460).abs() < 1e-9);
        assert!(!sun.retrograde);
    }

    #[test]
    fn test_nodes_are_retrograde() {
        let settings = EphemerisSettings::tropical("placidus", ["north_node", "south_node"]);
        let positions = synthetic_positions(j2000(), None, &settings);
        assert!(positions.planets["north_node"].retrograde);
        let diff = normalize_degrees(
            positions.planets["south_node"].lon - positions.planets["north_node"].lon,
        );
        assert!((diff - 180.0).abs() < 1e-9);
    }

    #[test]
    fn test_sidereal_shifts_longitudes() {
        let tropical = EphemerisSettings::tropical("placidus", ["moon"]);
        let sidereal = EphemerisSettings::sidereal("lahiri", "placidus", ["moon"]);
        let t = synthetic_positions(j2000(), None, &tropical).planets["moon"].lon;
        let s = synthetic_positions(j2000(), None, &sidereal).planets["moon"].lon;
        assert!((normalize_degrees(t - s) - MOCK_AYANAMSA).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_body_is_stable() {
        assert_eq!(mean_elements("ceres"), mean_elements("ceres"));
        let (lon, _) = mean_elements("ceres");
        assert!((0.0..360.0).contains(&lon));
    }

    #[test]
    fn test_equal_houses_follow_ascendant() {
        let settings = EphemerisSettings::tropical("equal", ["sun"]);
        let loc = GeoLocation::new(51.48, 0.0);
        let houses = synthetic_positions(j2000(), Some(&loc), &settings).houses.unwrap();
        let asc = houses.angle("asc").unwrap();
        assert_eq!(houses.cusps["1"], asc);
        assert!((normalize_degrees(houses.cusps["4"] - asc) - 90.0).abs() < 1e-9);
    }
}
