use crate::adapter::EphemerisAdapter;
use crate::error::ProtocolConformanceError;
use crate::types::{EphemerisSettings, GeoLocation, LayerContext};
use crate::validation::{validate_layer_positions, validate_positions_for_context};
use chrono::{DateTime, Utc};

/// Inputs for [`verify_adapter_runtime`].
#[derive(Debug, Clone)]
pub struct RuntimeProbe {
    pub dt_utc: DateTime<Utc>,
    /// Used for the with-location call; the adapter is also probed without one.
    pub location: GeoLocation,
    pub settings: EphemerisSettings,
}

impl Default for RuntimeProbe {
    fn default() -> Self {
        Self {
            dt_utc: Utc::now(),
            location: GeoLocation::new(40.7128, -74.0060),
            settings: EphemerisSettings::tropical("placidus", ["sun"]),
        }
    }
}

/// Structural conformance check.
///
/// The `EphemerisAdapter` bound already proves `calc_positions` exists with
/// the right signature; this also requires the adapter to be usable as a
/// trait object. A type that compiles here yields no mismatches.
pub fn verify_adapter_protocol<A: EphemerisAdapter>(adapter: &A) -> Vec<String> {
    let _object: &dyn EphemerisAdapter<Error = A::Error> = adapter;
    Vec::new()
}

/// Behavioral conformance check.
///
/// Calls the adapter with and without a location and checks each result:
/// houses present exactly when a location was given and computed for the
/// requested system, every record passes validation, and no planet outside
/// `include_objects` is returned. Adapter errors are reported, not raised.
pub fn verify_adapter_runtime<A: EphemerisAdapter>(
    adapter: &A,
    probe: &RuntimeProbe,
) -> Vec<String> {
    let mut errors = Vec::new();

    for (label, location) in [("with location", Some(probe.location)), ("without location", None)] {
        let context = LayerContext::new(
            "conformance",
            "probe",
            probe.dt_utc,
            location,
            probe.settings.clone(),
        );

        let positions = match adapter.calc_positions(
            context.datetime,
            context.location.as_ref(),
            &context.settings,
        ) {
            Ok(positions) => positions,
            Err(e) => {
                errors.push(format!("{label}: runtime error calling calc_positions: {e}"));
                continue;
            }
        };

        let problems = validate_positions_for_context(&context, &positions)
            .into_iter()
            .chain(validate_layer_positions(&positions))
            .chain(positions.planets.keys().filter_map(|id| {
                let requested = context
                    .settings
                    .include_objects
                    .iter()
                    .any(|o| o.eq_ignore_ascii_case(id));
                (!requested).then(|| format!("planet '{id}' was not requested"))
            }));
        errors.extend(problems.map(|e| format!("{label}: {e}")));
    }

    if !errors.is_empty() {
        log::debug!("verify_adapter_runtime: {} mismatch(es)", errors.len());
    }
    errors
}

/// Run both checks and fail with the combined mismatch list.
pub fn assert_adapter_conforms<A: EphemerisAdapter>(
    adapter: &A,
    probe: &RuntimeProbe,
) -> Result<(), ProtocolConformanceError> {
    let mut errors = verify_adapter_protocol(adapter);
    errors.extend(verify_adapter_runtime(adapter, probe));
    ProtocolConformanceError::check("adapter does not conform to EphemerisAdapter", errors)
}
