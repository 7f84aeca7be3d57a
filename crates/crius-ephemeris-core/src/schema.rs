//! JSON Schema documents for the record types, for callers that validate
//! payloads outside Rust.

use crate::types::{EphemerisSettings, GeoLocation, LayerContext, LayerPositions};
use schemars::schema::RootSchema;
use schemars::schema_for;

pub fn geo_location_schema() -> RootSchema {
    schema_for!(GeoLocation)
}

pub fn settings_schema() -> RootSchema {
    schema_for!(EphemerisSettings)
}

pub fn layer_context_schema() -> RootSchema {
    schema_for!(LayerContext)
}

pub fn layer_positions_schema() -> RootSchema {
    schema_for!(LayerPositions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_schema_lists_fields() {
        let schema = serde_json::to_value(settings_schema()).unwrap();
        let properties = schema["properties"].as_object().unwrap();
        let fields = [
            "zodiac_type",
            "ayanamsa",
            "house_system",
            "include_objects",
            "vedic_options",
        ];
        for field in fields {
            assert!(properties.contains_key(field), "missing {field}");
        }
        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|v| v.as_str())
            .collect();
        assert!(required.contains(&"zodiac_type"));
        assert!(required.contains(&"house_system"));
        assert!(!required.contains(&"ayanamsa"));
    }

    #[test]
    fn test_schemas_forbid_extra_fields() {
        let schema = serde_json::to_value(geo_location_schema()).unwrap();
        assert_eq!(schema["additionalProperties"], serde_json::Value::Bool(false));
    }

    #[test]
    fn test_layer_schemas_have_titles() {
        let context = serde_json::to_value(layer_context_schema()).unwrap();
        assert_eq!(context["title"], "LayerContext");
        let positions = serde_json::to_value(layer_positions_schema()).unwrap();
        assert_eq!(positions["title"], "LayerPositions");
    }
}
