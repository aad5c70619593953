use std::path::Path;

use crate::capacity::{sort_instances, CapacityPlanner};
use crate::config::{CostTable, SizingConfig};
use crate::error::{Result, SizingError};
use crate::lexical::{fraction_of, LexicalIndexSizer};
use crate::types::{IndexFootprint, IndexSize, InstanceProfile, SizingInput, SizingRequest, SizingResult};
use crate::vector::VectorIndexSizer;

/// Entry point for sizing requests.
///
/// Holds only the immutable configuration, so one engine can be shared
/// across threads and every call is independent of the previous ones.
#[derive(Debug, Clone)]
pub struct SizingEngine {
    config: SizingConfig,
}

impl SizingEngine {
    /// Create an engine after validating `config`
    pub fn new(mut config: SizingConfig) -> Result<Self> {
        config.validate()?;
        sort_instances(&mut config.instances);
        Ok(Self { config })
    }

    /// Create an engine from a TOML configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        Self::new(SizingConfig::from_file(path)?)
    }

    pub fn config(&self) -> &SizingConfig {
        &self.config
    }

    /// Instance table in ascending resource order
    pub fn instances(&self) -> &[InstanceProfile] {
        &self.config.instances
    }

    pub fn evaluate_input(&self, input: &SizingInput) -> Result<SizingResult> {
        self.evaluate(input.lexical_sizing.as_ref(), input.vector_sizing.as_ref())
    }

    /// Size a lexical index, a vector index, or both on one instance.
    ///
    /// Storage and RAM of the two indexes add up; the vCPU requirement is the
    /// larger of the two workloads. The instance is chosen on those totals;
    /// reindex headroom is reported alongside but never drives selection.
    /// Either the whole result is returned or an error, never a partial estimate.
    #[tracing::instrument(level = "trace", skip_all, target = "sizing::engine")]
    pub fn evaluate(&self, lexical: Option<&SizingRequest>, vector: Option<&SizingRequest>) -> Result<SizingResult> {
        if lexical.is_none() && vector.is_none() {
            return Err(SizingError::validation(
                "request",
                "at least one of lexical or vector sizing is required",
            ));
        }
        if let Some(request) = lexical {
            validate_labelled(request, &self.config.costs, "lexical_sizing")?;
        }
        if let Some(request) = vector {
            validate_labelled(request, &self.config.costs, "vector_sizing")?;
        }

        let planner = CapacityPlanner::new(&self.config.capacity, &self.config.instances);
        let lexical_sizer = LexicalIndexSizer::new(&self.config.costs, &self.config.capacity);
        let vector_sizer = VectorIndexSizer::new(&self.config.vector);

        let footprint = |size: IndexSize, request: &SizingRequest| IndexFootprint {
            storage_bytes: size.storage_bytes,
            ram_bytes: size.ram_bytes,
            required_vcpu: planner.required_vcpu(request.qps, request.latency_target_seconds),
        };

        let lexical_footprint = lexical.map(|request| footprint(lexical_sizer.size(request), request));
        let vector_footprint = vector.map(|request| footprint(vector_sizer.size(request), request));

        let mut combined = IndexSize::default();
        let mut required_vcpu = 1;
        for part in lexical_footprint.iter().chain(vector_footprint.iter()) {
            combined = combined.saturating_add(IndexSize::new(part.storage_bytes, part.ram_bytes));
            required_vcpu = required_vcpu.max(part.required_vcpu);
        }
        let reindex_storage_bytes =
            fraction_of(combined.storage_bytes, self.config.capacity.reindex_space_multiplier);

        let plan = planner.plan_for_vcpu(combined, required_vcpu)?;
        let lexical_documents = lexical.map_or(0, |request| lexical_sizer.document_count(request));

        tracing::debug!(
            target: "sizing::engine",
            storage_bytes = combined.storage_bytes,
            ram_bytes = combined.ram_bytes,
            reindex_storage_bytes,
            required_vcpu,
            lexical_documents,
            instance = %plan.recommended_instance.name,
            "sizing complete"
        );

        Ok(SizingResult {
            estimated_storage_bytes: combined.storage_bytes,
            reindex_storage_bytes,
            estimated_ram_bytes: combined.ram_bytes,
            required_vcpu: plan.required_vcpu,
            recommended_instance: plan.recommended_instance,
            lexical_documents,
            lexical: lexical_footprint,
            vector: vector_footprint,
        })
    }
}

impl Default for SizingEngine {
    fn default() -> Self {
        let mut config = SizingConfig::default();
        sort_instances(&mut config.instances);
        Self { config }
    }
}

fn validate_labelled(request: &SizingRequest, costs: &CostTable, label: &str) -> Result<()> {
    request.validate(costs).map_err(|err| match err {
        SizingError::Validation { field, message } => SizingError::Validation {
            field: format!("{label}.{field}"),
            message,
        },
        other => other,
    })
}
