use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::CostTable;
use crate::error::{Result, SizingError};

fn default_count() -> u64 {
    1
}

fn default_embedded_documents() -> u64 {
    1000
}

/// One field of a document schema, tagged by `field_type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field_type", try_from = "FieldSpecRepr")]
pub enum FieldSpec {
    /// Full-text string field, `count` same-shaped values per document
    String { byte_size: u64, count: u64 },
    /// String field indexed for prefix or infix completion
    Autocomplete {
        variant: AutocompleteVariant,
        #[serde(skip_serializing_if = "Option::is_none")]
        min_size: Option<u32>,
        #[serde(skip_serializing_if = "Option::is_none")]
        max_size: Option<u32>,
        /// Reference string length the grams are cut from
        #[serde(skip_serializing_if = "Option::is_none")]
        avg_chars: Option<u32>,
        count: u64,
    },
    Numeric,
    Boolean,
    Date,
    /// Dense vector field, `count` vectors per document
    Vector { dimensions: u32, count: u64 },
    /// Nested documents, `count` instances per parent document
    Embedded { count: u64, schema: DocumentSchema },
}

/// Accepted input shapes, including the `embedded_sizing` form of nested documents.
#[derive(Deserialize)]
#[serde(tag = "field_type")]
enum FieldSpecRepr {
    String {
        #[serde(alias = "size")]
        byte_size: u64,
        #[serde(default = "default_count")]
        count: u64,
    },
    Autocomplete {
        #[serde(alias = "autocomplete_type")]
        variant: AutocompleteVariant,
        #[serde(default, alias = "min_grams")]
        min_size: Option<u32>,
        #[serde(default, alias = "max_grams")]
        max_size: Option<u32>,
        #[serde(default)]
        avg_chars: Option<u32>,
        #[serde(default = "default_count")]
        count: u64,
    },
    Numeric,
    Boolean,
    Date,
    Vector {
        dimensions: u32,
        #[serde(default = "default_count")]
        count: u64,
    },
    Embedded {
        #[serde(default = "default_count")]
        count: u64,
        #[serde(default, alias = "fields")]
        schema: Option<DocumentSchema>,
        #[serde(default)]
        embedded_sizing: Option<EmbeddedSizing>,
    },
}

/// `num_documents` nested documents per instance, each shaped like `fields`
#[derive(Deserialize)]
struct EmbeddedSizing {
    #[serde(default = "default_embedded_documents")]
    num_documents: u64,
    #[serde(default)]
    fields: DocumentSchema,
}

impl TryFrom<FieldSpecRepr> for FieldSpec {
    type Error = String;

    fn try_from(repr: FieldSpecRepr) -> std::result::Result<Self, Self::Error> {
        Ok(match repr {
            FieldSpecRepr::String { byte_size, count } => FieldSpec::String { byte_size, count },
            FieldSpecRepr::Autocomplete { variant, min_size, max_size, avg_chars, count } => {
                FieldSpec::Autocomplete { variant, min_size, max_size, avg_chars, count }
            }
            FieldSpecRepr::Numeric => FieldSpec::Numeric,
            FieldSpecRepr::Boolean => FieldSpec::Boolean,
            FieldSpecRepr::Date => FieldSpec::Date,
            FieldSpecRepr::Vector { dimensions, count } => FieldSpec::Vector { dimensions, count },
            FieldSpecRepr::Embedded { count, schema, embedded_sizing } => match (schema, embedded_sizing) {
                (Some(schema), None) => FieldSpec::Embedded { count, schema },
                (None, Some(sizing)) => FieldSpec::Embedded {
                    count: count.saturating_mul(sizing.num_documents),
                    schema: sizing.fields,
                },
                (Some(_), Some(_)) => {
                    return Err("embedded field takes either `schema` or `embedded_sizing`, not both".to_string())
                }
                (None, None) => return Err("embedded field is missing `schema`".to_string()),
            },
        })
    }
}

impl FieldSpec {
    pub fn kind(&self) -> &'static str {
        match self {
            FieldSpec::String { .. } => "String",
            FieldSpec::Autocomplete { .. } => "Autocomplete",
            FieldSpec::Numeric => "Numeric",
            FieldSpec::Boolean => "Boolean",
            FieldSpec::Date => "Date",
            FieldSpec::Vector { .. } => "Vector",
            FieldSpec::Embedded { .. } => "Embedded",
        }
    }

    /// Checks the field against `costs`, which supply omitted gram bounds.
    fn validate(&self, path: &str, costs: &CostTable) -> Result<()> {
        match self {
            FieldSpec::Autocomplete { min_size, max_size, .. } => {
                let min = min_size.unwrap_or(costs.autocomplete_min_gram);
                let max = max_size.unwrap_or(costs.autocomplete_max_gram);
                if min == 0 {
                    return Err(SizingError::validation(
                        format!("{path}.min_size"),
                        "minimum gram size must be at least 1",
                    ));
                }
                if max < min {
                    // Blame the bound the caller actually set
                    let bound = if max_size.is_some() { "max_size" } else { "min_size" };
                    return Err(SizingError::validation(
                        format!("{path}.{bound}"),
                        format!("maximum gram size {max} is smaller than minimum {min}"),
                    ));
                }
                Ok(())
            }
            FieldSpec::Vector { dimensions, .. } if *dimensions == 0 => Err(
                SizingError::validation(format!("{path}.dimensions"), "must be at least 1"),
            ),
            FieldSpec::Embedded { schema, .. } => schema.validate_at(&format!("{path}.schema"), costs),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AutocompleteVariant {
    /// Prefixes anchored at the start of each token
    #[serde(rename = "edgeGram")]
    EdgeGram,
    /// Every contiguous substring within the gram bounds
    #[serde(rename = "nGram")]
    NGram,
}

/// Ordered list of fields. Order only matters for presentation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentSchema {
    fields: Vec<FieldSpec>,
}

impl DocumentSchema {
    pub fn new(fields: Vec<FieldSpec>) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FieldSpec> {
        self.fields.iter()
    }

    pub fn push(&mut self, field: FieldSpec) {
        self.fields.push(field);
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn validate(&self, costs: &CostTable) -> Result<()> {
        self.validate_at("fields", costs)
    }

    fn validate_at(&self, path: &str, costs: &CostTable) -> Result<()> {
        for (i, field) in self.fields.iter().enumerate() {
            field.validate(&format!("{path}[{i}]"), costs)?;
        }
        Ok(())
    }
}

impl From<Vec<FieldSpec>> for DocumentSchema {
    fn from(fields: Vec<FieldSpec>) -> Self {
        Self::new(fields)
    }
}

impl FromIterator<FieldSpec> for DocumentSchema {
    fn from_iter<I: IntoIterator<Item = FieldSpec>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a DocumentSchema {
    type Item = &'a FieldSpec;
    type IntoIter = std::slice::Iter<'a, FieldSpec>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuantizationType {
    /// Native 32-bit floats
    #[default]
    None,
    /// One byte per dimension
    Scalar,
    /// One bit per dimension
    Binary,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuantizationMethod {
    /// Only the quantized representation is kept
    #[default]
    Database,
    /// Raw vectors are also kept on disk to re-rank quantized candidates
    Query,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuantizationSettings {
    #[serde(rename = "type", default)]
    pub kind: QuantizationType,
    #[serde(default)]
    pub method: QuantizationMethod,
}

impl QuantizationSettings {
    pub fn new(kind: QuantizationType, method: QuantizationMethod) -> Self {
        Self { kind, method }
    }

    /// Whether raw float vectors must be stored next to the quantized index
    pub fn retains_raw_vectors(&self) -> bool {
        self.method == QuantizationMethod::Query
    }
}

/// Workload description for one lexical or vector index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizingRequest {
    pub num_documents: u64,
    #[serde(default)]
    pub qps: f64,
    #[serde(alias = "latency")]
    pub latency_target_seconds: f64,
    #[serde(default)]
    pub fields: DocumentSchema,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantization_settings: Option<QuantizationSettings>,
}

impl SizingRequest {
    pub fn new(num_documents: u64, qps: f64, latency_target_seconds: f64) -> Self {
        Self {
            num_documents,
            qps,
            latency_target_seconds,
            fields: DocumentSchema::default(),
            quantization_settings: None,
        }
    }

    pub fn with_field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_quantization(mut self, settings: QuantizationSettings) -> Self {
        self.quantization_settings = Some(settings);
        self
    }

    pub fn quantization(&self) -> QuantizationSettings {
        self.quantization_settings.unwrap_or_default()
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| SizingError::validation("request", e.to_string()))
    }

    /// Checks workload bounds and every field; `costs` resolves omitted gram bounds.
    pub fn validate(&self, costs: &CostTable) -> Result<()> {
        if self.num_documents == 0 {
            return Err(SizingError::validation("num_documents", "must be at least 1"));
        }
        if !self.qps.is_finite() || self.qps < 0.0 {
            return Err(SizingError::validation(
                "qps",
                format!("must be a non-negative number, got {}", self.qps),
            ));
        }
        if !self.latency_target_seconds.is_finite() || self.latency_target_seconds <= 0.0 {
            return Err(SizingError::validation(
                "latency_target_seconds",
                format!("must be greater than zero, got {}", self.latency_target_seconds),
            ));
        }
        self.fields.validate(costs)
    }
}

/// The document a front-end submits: either or both index workloads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SizingInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lexical_sizing: Option<SizingRequest>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vector_sizing: Option<SizingRequest>,
}

impl SizingInput {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| SizingError::validation("input", e.to_string()))
    }
}

/// A row of the static instance capability table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceProfile {
    pub name: String,
    pub vcpu: u32,
    pub ram_gb: u64,
    pub max_storage_gb: u64,
    /// Informational list price, never used for selection
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_per_hour: Option<f64>,
}

pub const BYTES_PER_GB: u64 = 1_000_000_000;

impl InstanceProfile {
    pub fn new(name: impl Into<String>, vcpu: u32, ram_gb: u64, max_storage_gb: u64) -> Self {
        Self {
            name: name.into(),
            vcpu,
            ram_gb,
            max_storage_gb,
            price_per_hour: None,
        }
    }

    pub fn with_price(mut self, price_per_hour: f64) -> Self {
        self.price_per_hour = Some(price_per_hour);
        self
    }

    pub fn ram_bytes(&self) -> u64 {
        self.ram_gb.saturating_mul(BYTES_PER_GB)
    }

    pub fn storage_bytes(&self) -> u64 {
        self.max_storage_gb.saturating_mul(BYTES_PER_GB)
    }
}

impl fmt::Display for InstanceProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} vCPU, {} GB RAM, {} GB storage)",
            self.name, self.vcpu, self.ram_gb, self.max_storage_gb
        )
    }
}

/// Storage and RAM of one index, in bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexSize {
    pub storage_bytes: u64,
    pub ram_bytes: u64,
}

impl IndexSize {
    pub fn new(storage_bytes: u64, ram_bytes: u64) -> Self {
        Self { storage_bytes, ram_bytes }
    }

    pub fn saturating_add(self, other: IndexSize) -> IndexSize {
        IndexSize {
            storage_bytes: self.storage_bytes.saturating_add(other.storage_bytes),
            ram_bytes: self.ram_bytes.saturating_add(other.ram_bytes),
        }
    }
}

/// Per-workload share of a sizing result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexFootprint {
    pub storage_bytes: u64,
    pub ram_bytes: u64,
    pub required_vcpu: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizingResult {
    /// Combined storage of both indexes
    pub estimated_storage_bytes: u64,
    /// Disk needed while a full reindex runs next to the live index
    pub reindex_storage_bytes: u64,
    pub estimated_ram_bytes: u64,
    pub required_vcpu: u32,
    pub recommended_instance: InstanceProfile,
    /// Indexed documents including embedded ones
    pub lexical_documents: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lexical: Option<IndexFootprint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vector: Option<IndexFootprint>,
}

impl SizingResult {
    pub fn storage_gb(&self) -> f64 {
        self.estimated_storage_bytes as f64 / BYTES_PER_GB as f64
    }

    pub fn ram_gb(&self) -> f64 {
        self.estimated_ram_bytes as f64 / BYTES_PER_GB as f64
    }

    pub fn reindex_storage_gb(&self) -> f64 {
        self.reindex_storage_bytes as f64 / BYTES_PER_GB as f64
    }
}
