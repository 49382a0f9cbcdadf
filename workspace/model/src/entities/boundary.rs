use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::error::{ModelError, Result};

/// A GeoJSON FeatureCollection of region boundaries, keyed by one of the
/// feature properties (`properties.name` by default).
///
/// The raw document is kept as-is so the presentation layer can hand it to
/// the map renderer without re-encoding geometries.
#[derive(Debug, Clone)]
pub struct BoundaryCollection {
    name_property: String,
    names: BTreeSet<String>,
    raw: Value,
}

impl BoundaryCollection {
    #[instrument(fields(path = %path.display()))]
    pub fn load(path: &Path, name_property: &str) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| ModelError::io(path, e))?;
        let raw: Value = serde_json::from_str(&content).map_err(|source| ModelError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_value(raw, name_property)
    }

    pub fn from_value(raw: Value, name_property: &str) -> Result<Self> {
        if raw.get("type").and_then(Value::as_str) != Some("FeatureCollection") {
            return Err(ModelError::Boundary(
                "top-level object is not a FeatureCollection".to_string(),
            ));
        }
        let features = raw
            .get("features")
            .and_then(Value::as_array)
            .ok_or_else(|| ModelError::Boundary("missing 'features' array".to_string()))?;

        let mut names = BTreeSet::new();
        for (index, feature) in features.iter().enumerate() {
            match feature
                .get("properties")
                .and_then(|p| p.get(name_property))
                .and_then(Value::as_str)
            {
                Some(name) => {
                    names.insert(name.to_string());
                }
                None => warn!(
                    "Boundary feature #{} has no '{}' property and cannot be joined",
                    index, name_property
                ),
            }
        }
        debug!("Boundary file lists {} named regions", names.len());

        Ok(Self {
            name_property: name_property.to_string(),
            names,
            raw,
        })
    }

    /// Region names found in the boundary file, sorted.
    pub fn region_names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn contains(&self, region: &str) -> bool {
        self.names.contains(region)
    }

    /// Property path the map renderer joins locations against.
    pub fn feature_id_key(&self) -> String {
        format!("properties.{}", self.name_property)
    }

    pub fn raw(&self) -> &Value {
        &self.raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::PathBuf;

    fn collection() -> Value {
        json!({
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "properties": {"name": "Madrid"}, "geometry": null},
                {"type": "Feature", "properties": {"name": "Cataluña"}, "geometry": null},
                {"type": "Feature", "properties": {"cod": "XX"}, "geometry": null}
            ]
        })
    }

    #[test]
    fn test_names_are_collected() {
        let boundaries = BoundaryCollection::from_value(collection(), "name").unwrap();

        let names: Vec<&str> = boundaries.region_names().collect();
        assert_eq!(names, vec!["Cataluña", "Madrid"]);
        assert!(boundaries.contains("Madrid"));
        assert!(!boundaries.contains("Galicia"));
        assert_eq!(boundaries.feature_id_key(), "properties.name");
    }

    #[test]
    fn test_rejects_non_collection() {
        let err = BoundaryCollection::from_value(json!({"type": "Feature"}), "name").unwrap_err();
        assert!(matches!(err, ModelError::Boundary(_)));
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let err = BoundaryCollection::load(Path::new("/nonexistent/spain.geojson"), "name")
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_load_sample_geojson() {
        let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("../../data/sample/spain_communities.geojson");
        let boundaries = BoundaryCollection::load(&path, "name").unwrap();
        assert!(boundaries.contains("Madrid"));
    }
}
