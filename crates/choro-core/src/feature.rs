//! GeoJSON-shaped feature collections.
//!
//! Only `features[].properties` is interpreted. Geometry, ids, `type` and any
//! foreign members are carried through untouched so a classified collection
//! can be handed straight back to the map layer.
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::classify::{classify, ClassificationResult};
use crate::error::{ChoroError, Result};
use crate::observation::coerce_value;
use crate::params::ClassifyParams;

/// Property written by [`FeatureCollection::apply_levels`] unless told otherwise.
pub const DEFAULT_LEVEL_KEY: &str = "level";

// ── Serde helpers ─────────────────────────────────────────────────────────────

fn null_as_empty_map<'de, D: serde::Deserializer<'de>>(
    d: D,
) -> std::result::Result<Map<String, Value>, D::Error> {
    let m: Option<Map<String, Value>> = Option::deserialize(d)?;
    Ok(m.unwrap_or_default())
}

// ── Types ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(default, deserialize_with = "null_as_empty_map")]
    pub properties: Map<String, Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Feature {
    /// Numeric value of `attribute`, `None` when absent or not a number.
    pub fn value(&self, attribute: &str) -> Option<f64> {
        self.properties.get(attribute).and_then(coerce_value)
    }
}

impl FeatureCollection {
    /// Parse a FeatureCollection document.
    ///
    /// A `type` member, when present, must be `"FeatureCollection"`, and
    /// `features` must be an array.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(s)?;
        let type_name = value.get("type").map(|t| t.as_str().map(str::to_owned));
        let is_collection = match &type_name {
            None => true,
            Some(Some(t)) => t == "FeatureCollection",
            Some(None) => false,
        };
        let has_features = value.get("features").is_some_and(Value::is_array);
        if !is_collection || !has_features {
            return Err(ChoroError::NotACollection { found: type_name.flatten() });
        }
        Ok(serde_json::from_value(value)?)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_string_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Classify the features by `properties[attribute]`.
    pub fn classify(&self, attribute: &str, params: &ClassifyParams) -> ClassificationResult {
        classify(&self.features, |f| f.value(attribute), params)
    }

    /// Write each feature's level into `properties[level_key]`.
    ///
    /// Levels are matched to features by position; `result` must come from
    /// this collection. Returns the number of features updated. Applying the
    /// same result again leaves the collection unchanged.
    pub fn apply_levels(&mut self, result: &ClassificationResult, level_key: &str) -> usize {
        let mut n = 0;
        for (feature, level) in self.features.iter_mut().zip(result.levels()) {
            feature
                .properties
                .insert(level_key.to_owned(), Value::from(level.get()));
            n += 1;
        }
        n
    }

    /// Classify several attributes of the same collection. Results are in
    /// the order of `attributes`. Runs in parallel with the `threading` feature.
    pub fn classify_attributes(
        &self,
        attributes: &[&str],
        params: &ClassifyParams,
    ) -> Vec<(String, ClassificationResult)> {
        #[cfg(feature = "threading")]
        {
            use rayon::prelude::*;
            attributes
                .par_iter()
                .map(|a| (a.to_string(), self.classify(a, params)))
                .collect()
        }
        #[cfg(not(feature = "threading"))]
        {
            attributes
                .iter()
                .map(|a| (a.to_string(), self.classify(a, params)))
                .collect()
        }
    }
}
