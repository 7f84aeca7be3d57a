use chrono::{DateTime, Utc};
use crius_ephemeris_core::validation::{validate_ephemeris_settings, validate_geo_location};
use crius_ephemeris_core::{
    create_ephemeris_service, CacheProvider, EphemerisAdapter, EphemerisService,
    EphemerisSettings, GeoLocation, InMemoryCache, LayerContext, ZodiacType,
};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "CRIUS_EPHEMERIS_CONFIG";

const DEFAULT_CONFIG_PATHS: [&str; 2] =
    ["configs/ephemeris.toml", "../../configs/ephemeris.toml"];

const DEFAULT_OBJECTS: [&str; 10] = [
    "sun", "moon", "mercury", "venus", "mars", "jupiter", "saturn", "uranus", "neptune", "pluto",
];

/// Service configuration after defaults are applied and values validated.
#[derive(Debug, Clone, PartialEq)]
pub struct EphemerisServiceConfig {
    pub enable_cache: bool,
    pub settings: EphemerisSettings,
    /// Filled into contexts built by [`EphemerisServiceConfig::context_for`]
    /// when the request has no location
    pub default_location: Option<GeoLocation>,
}

impl EphemerisServiceConfig {
    /// Build a service over `adapter`, cached in memory when `enable_cache` is set.
    pub fn build_service<A>(
        &self,
        adapter: A,
    ) -> anyhow::Result<Box<dyn EphemerisService<Error = A::Error>>>
    where
        A: EphemerisAdapter + 'static,
    {
        let cache = self
            .enable_cache
            .then(|| Box::new(InMemoryCache::new()) as Box<dyn CacheProvider>);
        log::debug!("Building ephemeris service (cache: {})", self.enable_cache);
        Ok(create_ephemeris_service(adapter, self.enable_cache, cache)?)
    }

    /// Context for one layer using the configured settings.
    pub fn context_for(
        &self,
        layer_id: impl Into<String>,
        kind: impl Into<String>,
        datetime: DateTime<Utc>,
        location: Option<GeoLocation>,
    ) -> LayerContext {
        LayerContext::new(
            layer_id,
            kind,
            datetime,
            location.or(self.default_location),
            self.settings.clone(),
        )
    }
}

impl Default for EphemerisServiceConfig {
    fn default() -> Self {
        Self {
            enable_cache: false,
            settings: default_settings(),
            default_location: None,
        }
    }
}

fn default_settings() -> EphemerisSettings {
    EphemerisSettings::tropical("placidus", DEFAULT_OBJECTS)
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct EphemerisToml {
    #[serde(default)]
    enable_cache: bool,
    #[serde(default)]
    settings: Option<EphemerisSettings>,
    #[serde(default)]
    location: Option<GeoLocation>,
}

#[derive(Debug, Clone, Deserialize)]
struct RootConfigToml {
    #[serde(default)]
    ephemeris: Option<EphemerisToml>,
}

/// Read the config text from `$CRIUS_EPHEMERIS_CONFIG`, or else the first
/// readable default path.
pub fn read_config_text() -> anyhow::Result<String> {
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        return fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("Could not read {CONFIG_PATH_ENV}={path}: {e}"));
    }
    for p in &DEFAULT_CONFIG_PATHS {
        if let Ok(c) = fs::read_to_string(p) {
            log::info!("Loaded ephemeris config from {}", p);
            return Ok(c);
        }
    }
    anyhow::bail!("Could not load ephemeris.toml from {:?}", DEFAULT_CONFIG_PATHS);
}

/// Parse a config document. A missing `[ephemeris]` table yields defaults.
pub fn parse_service_config(text: &str) -> anyhow::Result<EphemerisServiceConfig> {
    let root: RootConfigToml = toml::from_str(text)
        .map_err(|e| anyhow::anyhow!("Failed to parse ephemeris config: {e}"))?;
    let Some(cfg) = root.ephemeris else {
        log::debug!("No [ephemeris] table, using defaults");
        return Ok(EphemerisServiceConfig::default());
    };
    let EphemerisToml {
        enable_cache,
        settings,
        location,
    } = cfg;

    let settings = settings.unwrap_or_else(default_settings);
    let errors = validate_ephemeris_settings(&settings);
    if !errors.is_empty() {
        anyhow::bail!("Invalid [ephemeris.settings]: {}", errors.join("; "));
    }
    if let Some(loc) = &location {
        let errors = validate_geo_location(loc);
        if !errors.is_empty() {
            anyhow::bail!("Invalid [ephemeris.location]: {}", errors.join("; "));
        }
    }
    if settings.zodiac_type == ZodiacType::Sidereal {
        log::debug!(
            "Sidereal zodiac configured with ayanamsa {:?}",
            settings.ayanamsa
        );
    }

    Ok(EphemerisServiceConfig {
        enable_cache,
        settings,
        default_location: location,
    })
}

pub fn load_service_config_from(path: &Path) -> anyhow::Result<EphemerisServiceConfig> {
    let text = fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Could not read {}: {e}", path.display()))?;
    parse_service_config(&text)
}

pub fn load_service_config() -> anyhow::Result<EphemerisServiceConfig> {
    let text = read_config_text()?;
    parse_service_config(&text)
}

/// Where [`load_service_config`] would look, in order.
pub fn candidate_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        paths.push(PathBuf::from(path));
    }
    paths.extend(DEFAULT_CONFIG_PATHS.iter().map(PathBuf::from));
    paths
}
