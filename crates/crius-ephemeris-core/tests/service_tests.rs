use chrono::{TimeZone, Utc};
use crius_ephemeris_core::testing::MockEphemerisAdapter;
use crius_ephemeris_core::{
    create_ephemeris_service, BaseEphemerisService, CacheProvider, CachedEphemerisService,
    EphemerisError, EphemerisService, EphemerisSettings, GeoLocation, InMemoryCache,
    LayerContext, LayerPositions, ServiceError,
};
use std::sync::Arc;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn natal_context() -> LayerContext {
    LayerContext::new(
        "natal",
        "natal",
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap(),
        Some(GeoLocation::new(40.7128, -74.0060)),
        EphemerisSettings::tropical("placidus", ["sun", "moon"]),
    )
}

#[test]
fn test_base_service_forwards_context_fields() {
    let adapter = MockEphemerisAdapter::new();
    let service = BaseEphemerisService::new(&adapter);
    let context = natal_context();

    let positions = service.compute(&context).unwrap();

    assert_eq!(adapter.call_count(), 1);
    assert_eq!(adapter.last_dt(), Some(context.datetime));
    assert_eq!(adapter.last_location(), context.location);
    assert_eq!(adapter.last_settings(), Some(context.settings.clone()));
    assert_eq!(positions.planets.len(), 2);
}

#[test]
fn test_base_service_get_positions_matches_compute() {
    let service = BaseEphemerisService::new(MockEphemerisAdapter::new());
    let context = natal_context();

    let via_context = service.compute(&context).unwrap();
    let via_args = service
        .get_positions(context.datetime, context.location.as_ref(), &context.settings)
        .unwrap();

    assert_eq!(via_context, via_args);
    assert_eq!(service.adapter().call_count(), 2);
}

#[test]
fn test_base_service_propagates_adapter_error() {
    let error = EphemerisError::InvalidHouseSystem {
        system: "topocentric".to_string(),
        valid: vec!["placidus".to_string()],
    };
    let service = BaseEphemerisService::new(MockEphemerisAdapter::failing(error.clone()));

    let result = service.compute(&natal_context());

    assert_eq!(result.unwrap_err(), error);
}

#[test]
fn test_cached_service_invokes_adapter_once() {
    init_logging();
    let adapter = MockEphemerisAdapter::new();
    let service =
        CachedEphemerisService::new(BaseEphemerisService::new(&adapter), InMemoryCache::new());

    let first = service.compute(&natal_context()).unwrap();
    let second = service.compute(&natal_context()).unwrap();

    assert_eq!(adapter.call_count(), 1);
    assert_eq!(first, second);
    assert_eq!(service.cache().len(), 1);
}

#[test]
fn test_cached_service_returns_stored_value_unchanged() {
    let adapter = MockEphemerisAdapter::new();
    let cache = InMemoryCache::new();
    let context = natal_context();
    let service = CachedEphemerisService::new(BaseEphemerisService::new(&adapter), &cache);

    // seed the cache with something the adapter would never produce
    let sentinel = LayerPositions::default();
    cache.set(&service.key_for(&context), sentinel.clone());

    let result = service.compute(&context).unwrap();

    assert_eq!(result, sentinel);
    assert_eq!(adapter.call_count(), 0);
}

#[test]
fn test_cached_service_shares_entry_across_object_order() {
    let adapter = MockEphemerisAdapter::new();
    let service =
        CachedEphemerisService::new(BaseEphemerisService::new(&adapter), InMemoryCache::new());

    let first = natal_context();
    let mut reordered = natal_context();
    reordered.layer_id = "natal-copy".to_string();
    reordered.settings.include_objects = vec!["moon".to_string(), "sun".to_string()];

    service.compute(&first).unwrap();
    service.compute(&reordered).unwrap();

    assert_eq!(adapter.call_count(), 1);
}

#[test]
fn test_cached_service_separates_kinds() {
    let adapter = MockEphemerisAdapter::new();
    let service =
        CachedEphemerisService::new(BaseEphemerisService::new(&adapter), InMemoryCache::new());

    let natal = natal_context();
    let mut transit = natal_context();
    transit.kind = "transit".to_string();

    service.compute(&natal).unwrap();
    service.compute(&transit).unwrap();

    assert_eq!(adapter.call_count(), 2);
    assert_eq!(service.cache().len(), 2);
}

#[test]
fn test_cached_service_does_not_cache_errors() {
    let adapter = MockEphemerisAdapter::failing(EphemerisError::HouseCalculationFailed {
        message: "polar latitude".to_string(),
    });
    let service =
        CachedEphemerisService::new(BaseEphemerisService::new(&adapter), InMemoryCache::new());

    assert!(service.compute(&natal_context()).is_err());
    assert!(service.compute(&natal_context()).is_err());

    assert_eq!(adapter.call_count(), 2);
    assert!(service.cache().is_empty());
}

#[test]
fn test_cached_services_compose() {
    let adapter = MockEphemerisAdapter::new();
    let outer_cache = Arc::new(InMemoryCache::new());
    let inner =
        CachedEphemerisService::new(BaseEphemerisService::new(&adapter), InMemoryCache::new());
    let outer = CachedEphemerisService::new(inner, Arc::clone(&outer_cache));

    outer.compute(&natal_context()).unwrap();
    outer.compute(&natal_context()).unwrap();

    assert_eq!(adapter.call_count(), 1);
    assert_eq!(outer_cache.len(), 1);
    assert_eq!(outer.inner().cache().len(), 1);
}

#[test]
fn test_custom_key_fn() {
    fn by_layer_id(context: &LayerContext) -> String {
        context.layer_id.clone()
    }

    let adapter = MockEphemerisAdapter::new();
    let service =
        CachedEphemerisService::new(BaseEphemerisService::new(&adapter), InMemoryCache::new())
            .with_key_fn(by_layer_id);

    let natal = natal_context();
    let mut later = natal_context();
    later.datetime = Utc.with_ymd_and_hms(2030, 6, 1, 0, 0, 0).unwrap();

    service.compute(&natal).unwrap();
    service.compute(&later).unwrap();

    assert_eq!(adapter.call_count(), 1);
    assert!(service.cache().contains_key("natal"));
}

#[test]
fn test_cached_service_keeps_comma_in_object_id_apart() {
    let adapter = MockEphemerisAdapter::new();
    let service =
        CachedEphemerisService::new(BaseEphemerisService::new(&adapter), InMemoryCache::new());
    let mut joined = natal_context();
    joined.settings.include_objects = vec!["moon,sun".to_string()];
    let mut split = natal_context();
    split.settings.include_objects = vec!["moon".to_string(), "sun".to_string()];

    service.compute(&joined).unwrap();
    let positions = service.compute(&split).unwrap();

    assert_eq!(adapter.call_count(), 2);
    let ids: Vec<&str> = positions.planets.keys().map(String::as_str).collect();
    assert_eq!(ids, vec!["moon", "sun"]);
}

#[test]
fn test_cached_service_keeps_ayanamsa_none_apart() {
    let adapter = MockEphemerisAdapter::new();
    let service =
        CachedEphemerisService::new(BaseEphemerisService::new(&adapter), InMemoryCache::new());
    let absent = natal_context();
    let mut named = natal_context();
    named.settings.ayanamsa = Some("none".to_string());

    service.compute(&absent).unwrap();
    service.compute(&named).unwrap();

    assert_eq!(adapter.call_count(), 2);
    assert_eq!(service.cache().len(), 2);
}

#[test]
fn test_factory_without_cache() {
    let service = create_ephemeris_service(MockEphemerisAdapter::new(), false, None).unwrap();
    let positions = service.compute(&natal_context()).unwrap();
    assert!(positions.houses.is_some());
}

#[test]
fn test_factory_with_cache() {
    let adapter = Arc::new(MockEphemerisAdapter::new());
    let cache = Arc::new(InMemoryCache::new());
    let service = create_ephemeris_service(
        Arc::clone(&adapter),
        true,
        Some(Box::new(Arc::clone(&cache))),
    )
    .unwrap();

    service.compute(&natal_context()).unwrap();
    service.compute(&natal_context()).unwrap();

    assert_eq!(adapter.call_count(), 1);
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_factory_requires_cache_when_enabled() {
    let result = create_ephemeris_service(MockEphemerisAdapter::new(), true, None);
    assert_eq!(result.err(), Some(ServiceError::MissingCache));
}
