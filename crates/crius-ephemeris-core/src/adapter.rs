use crate::types::{EphemerisSettings, GeoLocation, LayerPositions};
use chrono::{DateTime, Utc};
use std::rc::Rc;
use std::sync::Arc;

/// Capability every ephemeris engine exposes (Swiss Ephemeris, JPL DE430t
/// bindings, ...).
///
/// When `location` is `None` the returned [`LayerPositions::houses`] must be
/// `None`; otherwise houses must be computed for `settings.house_system`.
/// Failures (missing data files, unsupported house system, dates outside the
/// ephemeris range) are reported through the implementation's own error type.
pub trait EphemerisAdapter {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Calculate planetary and house positions
    fn calc_positions(
        &self,
        dt_utc: DateTime<Utc>,
        location: Option<&GeoLocation>,
        settings: &EphemerisSettings,
    ) -> Result<LayerPositions, Self::Error>;
}

impl<A: EphemerisAdapter + ?Sized> EphemerisAdapter for &A {
    type Error = A::Error;

    fn calc_positions(
        &self,
        dt_utc: DateTime<Utc>,
        location: Option<&GeoLocation>,
        settings: &EphemerisSettings,
    ) -> Result<LayerPositions, Self::Error> {
        (**self).calc_positions(dt_utc, location, settings)
    }
}

impl<A: EphemerisAdapter + ?Sized> EphemerisAdapter for Box<A> {
    type Error = A::Error;

    fn calc_positions(
        &self,
        dt_utc: DateTime<Utc>,
        location: Option<&GeoLocation>,
        settings: &EphemerisSettings,
    ) -> Result<LayerPositions, Self::Error> {
        (**self).calc_positions(dt_utc, location, settings)
    }
}

impl<A: EphemerisAdapter + ?Sized> EphemerisAdapter for Rc<A> {
    type Error = A::Error;

    fn calc_positions(
        &self,
        dt_utc: DateTime<Utc>,
        location: Option<&GeoLocation>,
        settings: &EphemerisSettings,
    ) -> Result<LayerPositions, Self::Error> {
        (**self).calc_positions(dt_utc, location, settings)
    }
}

impl<A: EphemerisAdapter + ?Sized> EphemerisAdapter for Arc<A> {
    type Error = A::Error;

    fn calc_positions(
        &self,
        dt_utc: DateTime<Utc>,
        location: Option<&GeoLocation>,
        settings: &EphemerisSettings,
    ) -> Result<LayerPositions, Self::Error> {
        (**self).calc_positions(dt_utc, location, settings)
    }
}
