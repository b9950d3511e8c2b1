//! Natural-breaks classification for choropleth hex and grid maps.
//!
//! A numeric attribute attached to map cells is bucketed into `k` classes
//! (six on the standard map) and each cell gets a level in `0..=k` that the
//! renderer turns into a colour or an extrusion height. Level 0 marks cells
//! with no usable value.
//!
//! ```
//! use choro_core::{classify, ClassifyParams};
//!
//! let cells = [Some(1.0), Some(2.0), Some(3.0), Some(10.0), Some(11.0),
//!              Some(12.0), Some(50.0), Some(51.0), Some(52.0), None];
//! let result = classify(&cells, |c| *c, &ClassifyParams::with_class_count(3));
//!
//! assert_eq!(result.breaks().unwrap().values(), &[1.0, 3.0, 12.0, 52.0]);
//! assert_eq!(result.level_of(4).unwrap().get(), 2);
//! assert!(result.level_of(9).unwrap().is_excluded());
//! ```
pub mod breaks;
pub mod classify;
pub mod error;
pub mod feature;
pub mod levels;
pub mod observation;
pub mod params;

pub use breaks::{
    compute_breaks, compute_breaks_with, equal_interval_breaks, goodness_of_variance_fit, Breaks,
    BreaksMethod,
};
pub use classify::{classify, ClassificationResult, LegendEntry};
pub use error::{ChoroError, Result};
pub use feature::{Feature, FeatureCollection, DEFAULT_LEVEL_KEY};
pub use levels::{assign_levels, level_for, Level};
pub use observation::{coerce_value, extract_observations, positive, Summary};
pub use params::{ClassifyParams, Method, DEFAULT_CLASS_COUNT};
