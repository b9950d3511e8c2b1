//! Browser bindings for the map renderer.
//!
//! The renderer hands over the loaded FeatureCollection as JSON text and gets
//! back the same collection with a level property on every feature, plus the
//! breaks and legend it needs for the colour scale.
use serde::Serialize;
use wasm_bindgen::prelude::*;

use choro_core::{
    ClassificationResult, ClassifyParams, FeatureCollection, LegendEntry, DEFAULT_LEVEL_KEY,
};

/// Payload returned by [`classify`].
#[derive(Debug, Serialize)]
pub struct ClassifyOutput {
    pub collection: FeatureCollection,
    pub result: ClassificationResult,
    pub legend: Vec<LegendEntry>,
}

/// Parse, classify and annotate. Shared by the JS entry point and tests.
pub fn classify_json(
    collection_json: &str,
    attribute: &str,
    params_json: Option<&str>,
    level_key: Option<&str>,
) -> Result<ClassifyOutput, String> {
    let params: ClassifyParams = match params_json {
        Some(p) if !p.trim().is_empty() => {
            serde_json::from_str(p).map_err(|e| format!("Invalid params: {e}"))?
        }
        _ => ClassifyParams::default(),
    };
    params.validate().map_err(|e| e.to_string())?;

    let mut collection =
        FeatureCollection::from_json_str(collection_json).map_err(|e| e.to_string())?;
    let result = collection.classify(attribute, &params);
    collection.apply_levels(&result, level_key.unwrap_or(DEFAULT_LEVEL_KEY));
    let legend = result.legend();

    Ok(ClassifyOutput { collection, result, legend })
}

/// Classify `attribute` over a FeatureCollection JSON string.
///
/// `params_json` is an optional `ClassifyParams` object, e.g.
/// `{"class_count": 6, "method": "natural-breaks"}`.
#[wasm_bindgen]
pub fn classify(
    collection_json: &str,
    attribute: &str,
    params_json: Option<String>,
    level_key: Option<String>,
) -> Result<JsValue, JsValue> {
    let output = classify_json(
        collection_json,
        attribute,
        params_json.as_deref(),
        level_key.as_deref(),
    )
    .map_err(|e| JsValue::from_str(&e))?;

    output
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| JsValue::from_str(&format!("Serialization failed: {e}")))
}

/// Natural breaks for a plain array of values; `undefined` when no value is
/// positive.
#[wasm_bindgen(js_name = computeBreaks)]
pub fn compute_breaks(values: &[f64], class_count: usize) -> Option<Vec<f64>> {
    choro_core::compute_breaks(values, class_count).map(|b| b.into_vec())
}

/// Level of a single value against previously computed breaks.
#[wasm_bindgen(js_name = levelFor)]
pub fn level_for(value: f64, breaks: Vec<f64>) -> u8 {
    let breaks = choro_core::Breaks::new(breaks);
    choro_core::level_for(Some(value), breaks.as_ref()).get()
}
