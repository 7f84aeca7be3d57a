//! Service layer on top of adapters.
//!
//! [`BaseEphemerisService`] forwards to one adapter. [`CachedEphemerisService`]
//! decorates any service with a [`CacheProvider`]. Both implement
//! [`EphemerisService`], so caching layers compose.

use crate::adapter::EphemerisAdapter;
use crate::cache::CacheProvider;
use crate::error::ServiceError;
use crate::types::{
    EphemerisSettings, GeoLocation, LayerContext, LayerPositions, VedicOptions, ZodiacType,
};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

/// Computes positions for a [`LayerContext`].
pub trait EphemerisService {
    type Error: std::error::Error + Send + Sync + 'static;

    fn compute(&self, context: &LayerContext) -> Result<LayerPositions, Self::Error>;
}

impl<S: EphemerisService + ?Sized> EphemerisService for &S {
    type Error = S::Error;

    fn compute(&self, context: &LayerContext) -> Result<LayerPositions, Self::Error> {
        (**self).compute(context)
    }
}

impl<S: EphemerisService + ?Sized> EphemerisService for Box<S> {
    type Error = S::Error;

    fn compute(&self, context: &LayerContext) -> Result<LayerPositions, Self::Error> {
        (**self).compute(context)
    }
}

/// Pass-through service wrapping exactly one adapter.
pub struct BaseEphemerisService<A> {
    adapter: A,
}

impl<A: EphemerisAdapter> BaseEphemerisService<A> {
    pub fn new(adapter: A) -> Self {
        Self { adapter }
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    pub fn into_adapter(self) -> A {
        self.adapter
    }

    /// Forward loose arguments straight to the adapter.
    pub fn get_positions(
        &self,
        dt_utc: DateTime<Utc>,
        location: Option<&GeoLocation>,
        settings: &EphemerisSettings,
    ) -> Result<LayerPositions, A::Error> {
        self.adapter.calc_positions(dt_utc, location, settings)
    }
}

impl<A: EphemerisAdapter> EphemerisService for BaseEphemerisService<A> {
    type Error = A::Error;

    fn compute(&self, context: &LayerContext) -> Result<LayerPositions, A::Error> {
        log::trace!(
            "BaseEphemerisService: forwarding layer '{}' ({}) at {}",
            context.layer_id,
            context.kind,
            context.datetime
        );
        self.get_positions(context.datetime, context.location.as_ref(), &context.settings)
    }
}

/// Signature of a cache key derivation function.
pub type CacheKeyFn = fn(&LayerContext) -> String;

/// Fields that identify a computation. Serialized to JSON so every string
/// is quoted and escaped, and absent values stay distinct from any text.
#[derive(Debug, Serialize)]
struct CacheKey<'a> {
    kind: &'a str,
    datetime: String,
    location: Option<(f64, f64)>,
    zodiac_type: ZodiacType,
    ayanamsa: Option<&'a str>,
    house_system: &'a str,
    include_objects: Vec<&'a str>,
    vedic_options: Option<&'a VedicOptions>,
}

/// Canonical cache key for a context.
///
/// Covers kind, timestamp, location, and every settings field. The layer id
/// is left out so layers with identical inputs share an entry. Object order
/// and duplicates in `include_objects` do not change the key: positions are
/// keyed by object id, so both requests yield the same result.
pub fn cache_key(context: &LayerContext) -> String {
    let settings = &context.settings;

    let mut include_objects: Vec<&str> =
        settings.include_objects.iter().map(String::as_str).collect();
    include_objects.sort_unstable();
    include_objects.dedup();

    let key = CacheKey {
        kind: &context.kind,
        datetime: context.datetime.to_rfc3339_opts(SecondsFormat::AutoSi, true),
        // adding 0.0 folds -0.0 into 0.0
        location: context.location.map(|loc| (loc.lat + 0.0, loc.lon + 0.0)),
        zodiac_type: settings.zodiac_type,
        ayanamsa: settings.ayanamsa.as_deref(),
        house_system: &settings.house_system,
        include_objects,
        vedic_options: settings.vedic_options.as_ref(),
    };

    serde_json::to_string(&key).unwrap_or_else(|e| {
        log::warn!("cache_key: JSON encoding failed, using debug encoding: {}", e);
        format!("{key:?}")
    })
}

/// Caching decorator over any [`EphemerisService`].
///
/// A hit returns the stored value without touching the wrapped service. A
/// miss computes, stores, then returns. Errors are returned as-is and never
/// stored.
pub struct CachedEphemerisService<S, C> {
    inner: S,
    cache: C,
    key_fn: CacheKeyFn,
}

impl<S: EphemerisService, C: CacheProvider> CachedEphemerisService<S, C> {
    pub fn new(inner: S, cache: C) -> Self {
        Self {
            inner,
            cache,
            key_fn: cache_key,
        }
    }

    /// Replace the key derivation. The function must be canonical: equal
    /// inputs must give equal keys.
    pub fn with_key_fn(mut self, key_fn: CacheKeyFn) -> Self {
        self.key_fn = key_fn;
        self
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    pub fn key_for(&self, context: &LayerContext) -> String {
        (self.key_fn)(context)
    }
}

impl<S: EphemerisService, C: CacheProvider> EphemerisService for CachedEphemerisService<S, C> {
    type Error = S::Error;

    fn compute(&self, context: &LayerContext) -> Result<LayerPositions, S::Error> {
        let key = self.key_for(context);
        if let Some(cached) = self.cache.get(&key) {
            log::debug!("CachedEphemerisService: hit for layer '{}' ({})", context.layer_id, key);
            return Ok(cached);
        }

        log::debug!("CachedEphemerisService: miss for layer '{}' ({})", context.layer_id, key);
        let positions = self.inner.compute(context)?;
        self.cache.set(&key, positions.clone());
        Ok(positions)
    }
}

/// Build a service for `adapter`, optionally behind a cache.
///
/// `enable_cache` without a cache is rejected with
/// [`ServiceError::MissingCache`]. A cache passed with `enable_cache` false
/// is ignored.
pub fn create_ephemeris_service<A>(
    adapter: A,
    enable_cache: bool,
    cache: Option<Box<dyn CacheProvider>>,
) -> Result<Box<dyn EphemerisService<Error = A::Error>>, ServiceError>
where
    A: EphemerisAdapter + 'static,
{
    let base = BaseEphemerisService::new(adapter);
    if !enable_cache {
        return Ok(Box::new(base));
    }
    let cache = cache.ok_or(ServiceError::MissingCache)?;
    Ok(Box::new(CachedEphemerisService::new(base, cache)))
}
