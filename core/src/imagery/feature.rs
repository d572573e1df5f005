use crate::geo::Boundary;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Attribute-equality filter over a reference polygon dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureQuery {
    pub dataset: String,
    pub property: String,
    pub value: String,
}

/// Polygon feature with string attributes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feature {
    pub properties: BTreeMap<String, String>,
    pub geometry: Boundary,
}

impl Feature {
    pub fn new(geometry: Boundary) -> Self {
        Self {
            properties: BTreeMap::new(),
            geometry,
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn matches(&self, query: &FeatureQuery) -> bool {
        self.properties
            .get(&query.property)
            .is_some_and(|value| *value == query.value)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeatureCollection {
    pub name: String,
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new(name: impl Into<String>, features: Vec<Feature>) -> Self {
        Self {
            name: name.into(),
            features,
        }
    }

    /// Union of every matching feature's rings, named after the filter value.
    pub fn select(&self, query: &FeatureQuery) -> Option<Boundary> {
        let rings: Vec<_> = self
            .features
            .iter()
            .filter(|feature| feature.matches(query))
            .flat_map(|feature| feature.geometry.rings.iter().cloned())
            .collect();
        (!rings.is_empty()).then(|| Boundary::new(query.value.clone(), rings))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::GeoPoint;

    fn triangle(offset: f64) -> Boundary {
        Boundary::new(
            "t",
            vec![vec![
                GeoPoint::new(offset, 0.0),
                GeoPoint::new(offset + 1.0, 0.0),
                GeoPoint::new(offset, 1.0),
            ]],
        )
    }

    #[test]
    fn select_merges_matching_features() {
        let collection = FeatureCollection::new(
            "level0",
            vec![
                Feature::new(triangle(0.0)).with_property("ADM0_NAME", "Bangladesh"),
                Feature::new(triangle(5.0)).with_property("ADM0_NAME", "Bangladesh"),
                Feature::new(triangle(9.0)).with_property("ADM0_NAME", "Bhutan"),
            ],
        );
        let query = FeatureQuery {
            dataset: "level0".into(),
            property: "ADM0_NAME".into(),
            value: "Bangladesh".into(),
        };
        let boundary = collection.select(&query).unwrap();
        assert_eq!(boundary.name, "Bangladesh");
        assert_eq!(boundary.rings.len(), 2);
    }

    #[test]
    fn select_without_match_is_none() {
        let collection = FeatureCollection::new("level0", Vec::new());
        let query = FeatureQuery {
            dataset: "level0".into(),
            property: "ADM0_NAME".into(),
            value: "Nowhere".into(),
        };
        assert!(collection.select(&query).is_none());
    }
}
