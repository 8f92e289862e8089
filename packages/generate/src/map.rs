//! GeoJSON map layers.
//!
//! Marker features put each country at `[longitude, latitude]` (GeoJSON
//! axis order) with its counts as properties and a `popup` label. The
//! choropleth layer maps country names to one count plus a threshold scale;
//! it matches boundary features through their `name` property.

use std::collections::BTreeMap;

use covid_map_analytics::threshold_scale;
use covid_map_case_models::{CaseField, ReportRow};
use geojson::{Feature, FeatureCollection, GeoJson, Geometry, JsonObject, Value};
use serde::{Deserialize, Serialize};

use crate::GenerateError;

/// Boundary feature property holding the country name.
pub const NAME_PROPERTY: &str = "name";

/// Path a map renderer uses to find the join key on boundary features.
pub const KEY_ON: &str = "feature.properties.name";

/// Default number of thresholds in a choropleth scale.
pub const DEFAULT_THRESHOLD_STEPS: usize = 6;

/// Builds one point feature per row with counts and a popup label.
///
/// `label_field` selects which count becomes the `popup` property.
#[must_use]
pub fn markers(rows: &[ReportRow], label_field: CaseField) -> FeatureCollection {
    let features = rows
        .iter()
        .map(|row| {
            let mut properties = JsonObject::new();
            properties.insert(NAME_PROPERTY.to_owned(), row.country.clone().into());
            properties.insert("cases".to_owned(), row.cases.into());
            properties.insert("deaths".to_owned(), row.deaths.into());
            properties.insert("recovered".to_owned(), row.recovered.into());
            properties.insert("popup".to_owned(), row.value(label_field).into());

            Feature {
                bbox: None,
                geometry: Some(Geometry::new(Value::Point(vec![
                    row.longitude,
                    row.latitude,
                ]))),
                id: None,
                properties: Some(properties),
                foreign_members: None,
            }
        })
        .collect();

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

/// Choropleth data: one value per country plus the coloring scale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoroplethLayer {
    /// Which count is being shaded.
    pub field: CaseField,
    /// Property path of the join key on boundary features.
    pub key_on: String,
    /// Count per country name.
    pub values: BTreeMap<String, u64>,
    /// Ascending bucket edges; the last edge exceeds the maximum value.
    pub thresholds: Vec<u64>,
}

/// Result of applying a [`ChoroplethLayer`] to boundary features.
#[derive(Debug, Clone)]
pub struct AppliedChoropleth {
    /// Boundary features annotated with `value` and `bucket` properties.
    pub boundaries: FeatureCollection,
    /// Boundary names that have no value in the layer.
    pub missing: Vec<String>,
}

impl ChoroplethLayer {
    /// Builds a layer shading `field` with `steps` thresholds.
    #[must_use]
    pub fn build(rows: &[ReportRow], field: CaseField, steps: usize) -> Self {
        let values: BTreeMap<String, u64> = rows
            .iter()
            .map(|row| (row.country.clone(), row.value(field)))
            .collect();
        let counts: Vec<u64> = rows.iter().map(|row| row.value(field)).collect();

        Self {
            field,
            key_on: KEY_ON.to_owned(),
            values,
            thresholds: threshold_scale(&counts, steps),
        }
    }

    /// Returns the index of the bucket containing `value`, or `None` if it
    /// falls outside the scale.
    #[must_use]
    pub fn bucket(&self, value: u64) -> Option<usize> {
        self.thresholds
            .windows(2)
            .position(|edge| edge[0] <= value && value < edge[1])
    }

    /// Annotates each boundary feature whose `name` property matches a
    /// country in the layer with `value` and `bucket` properties.
    ///
    /// Features without a match get `null` for both and are listed in
    /// [`AppliedChoropleth::missing`].
    #[must_use]
    pub fn apply(&self, mut boundaries: FeatureCollection) -> AppliedChoropleth {
        let mut missing = Vec::new();

        for feature in &mut boundaries.features {
            let name = feature
                .property(NAME_PROPERTY)
                .and_then(|v| v.as_str())
                .map(str::to_owned);

            match name.as_deref().and_then(|n| self.values.get(n)) {
                Some(&value) => {
                    feature.set_property("value", value);
                    feature.set_property("bucket", self.bucket(value));
                }
                None => {
                    feature.set_property("value", serde_json::Value::Null);
                    feature.set_property("bucket", serde_json::Value::Null);
                    missing.push(name.unwrap_or_default());
                }
            }
        }

        if !missing.is_empty() {
            log::debug!("{} boundary features have no data", missing.len());
        }

        AppliedChoropleth {
            boundaries,
            missing,
        }
    }
}

/// Parses a boundary file's contents as a GeoJSON feature collection.
///
/// # Errors
///
/// Returns [`GenerateError::GeoJson`] for invalid GeoJSON and
/// [`GenerateError::Boundaries`] if the document is not a feature
/// collection.
pub fn parse_boundaries(contents: &str) -> Result<FeatureCollection, GenerateError> {
    match contents.parse::<GeoJson>()? {
        GeoJson::FeatureCollection(collection) => Ok(collection),
        GeoJson::Feature(_) | GeoJson::Geometry(_) => Err(GenerateError::Boundaries {
            message: "expected a FeatureCollection".to_owned(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(country: &str, latitude: f64, longitude: f64, cases: u64, deaths: u64) -> ReportRow {
        ReportRow {
            country: country.to_owned(),
            latitude,
            longitude,
            cases,
            deaths,
            recovered: 0,
        }
    }

    #[test]
    fn markers_use_lng_lat_order_and_popup_label() {
        let rows = vec![row("Alpha", 1.0, 2.0, 1_000, 10)];
        let layer = markers(&rows, CaseField::Deaths);

        assert_eq!(layer.features.len(), 1);
        let feature = &layer.features[0];
        match &feature.geometry.as_ref().unwrap().value {
            Value::Point(position) => assert_eq!(position.as_slice(), &[2.0, 1.0]),
            other => panic!("unexpected geometry: {other:?}"),
        }
        assert_eq!(feature.property("name").unwrap(), "Alpha");
        assert_eq!(feature.property("cases").unwrap(), 1_000);
        assert_eq!(feature.property("popup").unwrap(), 10);
    }

    #[test]
    fn choropleth_buckets_values() {
        let rows = vec![
            row("Alpha", 0.0, 0.0, 0, 0),
            row("Beta", 0.0, 0.0, 500, 0),
            row("Gamma", 0.0, 0.0, 1_000, 0),
        ];
        let layer = ChoroplethLayer::build(&rows, CaseField::Cases, DEFAULT_THRESHOLD_STEPS);

        assert_eq!(layer.key_on, KEY_ON);
        assert_eq!(layer.thresholds, vec![0, 200, 400, 600, 800, 1_001]);
        assert_eq!(layer.bucket(0), Some(0));
        assert_eq!(layer.bucket(500), Some(2));
        assert_eq!(layer.bucket(1_000), Some(4));
        assert_eq!(layer.bucket(5_000), None);
    }

    #[test]
    fn apply_annotates_matching_boundaries() {
        let boundaries = parse_boundaries(
            r#"{
                "type": "FeatureCollection",
                "features": [
                    {"type": "Feature", "properties": {"name": "Alpha"},
                     "geometry": {"type": "Point", "coordinates": [0.0, 0.0]}},
                    {"type": "Feature", "properties": {"name": "Atlantis"},
                     "geometry": {"type": "Point", "coordinates": [1.0, 1.0]}}
                ]
            }"#,
        )
        .unwrap();
        let rows = vec![row("Alpha", 0.0, 0.0, 10, 0), row("Beta", 0.0, 0.0, 20, 0)];
        let layer = ChoroplethLayer::build(&rows, CaseField::Cases, DEFAULT_THRESHOLD_STEPS);

        let applied = layer.apply(boundaries);

        assert_eq!(applied.missing, vec!["Atlantis".to_owned()]);
        let alpha = &applied.boundaries.features[0];
        assert_eq!(alpha.property("value").unwrap(), 10);
        assert_eq!(alpha.property("bucket").unwrap(), 0);
        assert!(applied.boundaries.features[1]
            .property("value")
            .unwrap()
            .is_null());
    }

    #[test]
    fn rejects_non_collection_boundaries() {
        let err = parse_boundaries(r#"{"type": "Point", "coordinates": [0.0, 0.0]}"#).unwrap_err();
        assert!(matches!(err, GenerateError::Boundaries { .. }));
    }
}
