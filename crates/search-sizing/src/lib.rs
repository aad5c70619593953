//! # Search Index Sizing
//!
//! This crate estimates the hardware needed to host a search index described by
//! its document schema and workload. It covers:
//!
//! - Inverted-index ("lexical") storage from typed fields, nested documents included
//! - Vector index storage and RAM under none, scalar or binary quantization
//! - vCPU requirements from query rate and latency target
//! - The smallest instance class that fits all of the above
//!
//! Estimates are closed-form and deterministic: the same request always yields
//! the same result, and nothing is measured or persisted.
//!
//! ## Example
//!
//! ```
//! use search_sizing::{FieldSpec, SizingEngine, SizingRequest};
//!
//! let engine = SizingEngine::default();
//! let lexical = SizingRequest::new(1_000_000, 100.0, 0.05)
//!     .with_field(FieldSpec::String { byte_size: 150, count: 2 });
//!
//! let result = engine.evaluate(Some(&lexical), None).unwrap();
//! assert_eq!(result.recommended_instance.name, "S30");
//! ```

pub mod capacity;
pub mod config;
pub mod embedded;
pub mod engine;
pub mod error;
pub mod field_cost;
pub mod lexical;
pub mod types;
pub mod vector;

// Re-export commonly used types
pub use capacity::{CapacityPlan, CapacityPlanner};
pub use config::{CapacityConfig, ConfigError, CostTable, SizingConfig, VectorIndexConfig};
pub use embedded::EmbeddedExpander;
pub use engine::SizingEngine;
pub use error::{Result, SizingError};
pub use field_cost::FieldCostModel;
pub use lexical::LexicalIndexSizer;
pub use types::{
    AutocompleteVariant, DocumentSchema, FieldSpec, IndexFootprint, IndexSize, InstanceProfile,
    QuantizationMethod, QuantizationSettings, QuantizationType, SizingInput, SizingRequest,
    SizingResult,
};
pub use vector::VectorIndexSizer;
