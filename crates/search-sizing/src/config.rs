use serde::{Deserialize, Serialize};

use crate::types::InstanceProfile;

/// Static tables driving every estimate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SizingConfig {
    /// Per-kind field costs
    pub costs: CostTable,
    /// Vector index encoding and graph constants
    pub vector: VectorIndexConfig,
    /// Workload and headroom constants
    pub capacity: CapacityConfig,
    /// Instance classes to choose from
    pub instances: Vec<InstanceProfile>,
}

/// Per-document byte costs of lexical fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostTable {
    /// Token and posting overhead added to every string value
    pub string_overhead_bytes: u64,
    pub boolean_bytes: u64,
    pub numeric_bytes: u64,
    pub date_bytes: u64,
    /// Gram bounds used when an autocomplete field leaves them out
    pub autocomplete_min_gram: u32,
    pub autocomplete_max_gram: u32,
    /// Length of the reference string autocomplete grams are cut from
    pub autocomplete_reference_chars: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorIndexConfig {
    /// Bytes per dimension of an unquantized vector
    pub float_bytes_per_dimension: u64,
    /// Proximity-graph edge lists, as a multiple of the raw float vector size
    pub graph_overhead_factor: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CapacityConfig {
    /// Share of lexical index storage expected to stay resident in RAM
    pub ram_working_set_fraction: f64,
    /// Queries per second a single vCPU absorbs per second of allowed latency
    pub queries_per_vcpu_per_second: f64,
    /// Storage headroom so a full reindex fits next to the live index
    pub reindex_space_multiplier: f64,
}

impl Default for SizingConfig {
    fn default() -> Self {
        Self {
            costs: CostTable::default(),
            vector: VectorIndexConfig::default(),
            capacity: CapacityConfig::default(),
            instances: default_instances(),
        }
    }
}

impl Default for CostTable {
    fn default() -> Self {
        Self {
            string_overhead_bytes: 24,
            boolean_bytes: 2,
            numeric_bytes: 16,
            date_bytes: 16,
            autocomplete_min_gram: 3,
            autocomplete_max_gram: 15,
            autocomplete_reference_chars: 30,
        }
    }
}

impl Default for VectorIndexConfig {
    fn default() -> Self {
        Self {
            float_bytes_per_dimension: 4,
            graph_overhead_factor: 1.0,
        }
    }
}

impl Default for CapacityConfig {
    fn default() -> Self {
        Self {
            ram_working_set_fraction: 0.125,
            queries_per_vcpu_per_second: 500.0,
            reindex_space_multiplier: 2.25,
        }
    }
}

/// The search tier instance classes, smallest first
pub fn default_instances() -> Vec<InstanceProfile> {
    vec![
        InstanceProfile::new("S20", 2, 4, 80).with_price(0.16),
        InstanceProfile::new("S30", 4, 8, 161).with_price(0.33),
        InstanceProfile::new("S40", 8, 16, 322).with_price(0.68),
        InstanceProfile::new("S50", 16, 32, 644).with_price(1.40),
        InstanceProfile::new("S60", 32, 64, 1288).with_price(2.52),
        InstanceProfile::new("S70", 48, 96, 1932).with_price(3.57),
        InstanceProfile::new("S80", 64, 128, 2576).with_price(4.66),
    ]
}

impl SizingConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.instances.is_empty() {
            return Err(ConfigError::InvalidConfig(
                "At least one instance profile is required".to_string(),
            ));
        }

        if let Some(profile) = self.instances.iter().find(|p| p.vcpu == 0) {
            return Err(ConfigError::InvalidConfig(format!(
                "Instance profile {} must have at least one vCPU",
                profile.name
            )));
        }

        let costs = &self.costs;
        if costs.autocomplete_min_gram == 0 || costs.autocomplete_max_gram < costs.autocomplete_min_gram {
            return Err(ConfigError::InvalidConfig(format!(
                "Autocomplete gram bounds {}..={} are invalid",
                costs.autocomplete_min_gram, costs.autocomplete_max_gram
            )));
        }

        if !(self.vector.graph_overhead_factor >= 0.0 && self.vector.graph_overhead_factor.is_finite()) {
            return Err(ConfigError::InvalidConfig(
                "Graph overhead factor must be a non-negative number".to_string(),
            ));
        }

        let capacity = &self.capacity;
        if !(capacity.ram_working_set_fraction > 0.0 && capacity.ram_working_set_fraction <= 1.0) {
            return Err(ConfigError::InvalidConfig(
                "RAM working-set fraction must be in (0, 1]".to_string(),
            ));
        }

        if !(capacity.queries_per_vcpu_per_second > 0.0 && capacity.queries_per_vcpu_per_second.is_finite()) {
            return Err(ConfigError::InvalidConfig(
                "Queries per vCPU must be greater than 0".to_string(),
            ));
        }

        if !(capacity.reindex_space_multiplier >= 1.0 && capacity.reindex_space_multiplier.is_finite()) {
            return Err(ConfigError::InvalidConfig(
                "Reindex space multiplier must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
