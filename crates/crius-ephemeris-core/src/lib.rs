//! Ephemeris data contracts and adapter interface.
//!
//! This crate holds no calculation logic. It defines the records that
//! describe a calculation request ([`LayerContext`], [`EphemerisSettings`],
//! [`GeoLocation`]) and its result ([`LayerPositions`]), the
//! [`EphemerisAdapter`] trait concrete engines implement, and a thin service
//! layer ([`BaseEphemerisService`], [`CachedEphemerisService`]) callers can
//! program against without picking a backend.
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use crius_ephemeris_core::testing::MockEphemerisAdapter;
//! use crius_ephemeris_core::{
//!     BaseEphemerisService, EphemerisService, EphemerisSettings, GeoLocation, LayerContext,
//! };
//!
//! let service = BaseEphemerisService::new(MockEphemerisAdapter::new());
//! let context = LayerContext::new(
//!     "natal",
//!     "natal",
//!     Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap(),
//!     Some(GeoLocation::new(40.7128, -74.0060)),
//!     EphemerisSettings::tropical("placidus", ["sun", "moon"]),
//! );
//! let positions = service.compute(&context).unwrap();
//! assert_eq!(positions.planets.len(), 2);
//! assert!(positions.houses.is_some());
//! ```

pub mod adapter;
pub mod cache;
pub mod error;
pub mod schema;
pub mod service;
pub mod testing;
pub mod types;
pub mod validation;

pub use adapter::EphemerisAdapter;
pub use cache::{CacheProvider, InMemoryCache};
pub use error::{EphemerisError, ProtocolConformanceError, ServiceError, ValidationError};
pub use service::{
    cache_key, create_ephemeris_service, BaseEphemerisService, CacheKeyFn,
    CachedEphemerisService, EphemerisService,
};
pub use types::{
    normalize_degrees, DashaLevel, EphemerisSettings, GeoLocation, HousePositions, LayerContext,
    LayerPositions, PlanetPosition, VedicOptions, ZodiacType, ANGLE_KEYS, HOUSE_CUSP_KEYS,
};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
