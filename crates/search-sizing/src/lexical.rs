use crate::config::{CapacityConfig, CostTable};
use crate::embedded::embedded_document_count;
use crate::field_cost::FieldCostModel;
use crate::types::{IndexSize, SizingRequest};

/// Sizes the inverted index of a request's lexical fields
pub struct LexicalIndexSizer<'a> {
    model: FieldCostModel<'a>,
    capacity: &'a CapacityConfig,
}

impl<'a> LexicalIndexSizer<'a> {
    pub fn new(costs: &'a CostTable, capacity: &'a CapacityConfig) -> Self {
        Self {
            model: FieldCostModel::new(costs),
            capacity,
        }
    }

    /// Storage is the per-document cost over all documents; RAM is the
    /// configured working-set share of it.
    #[tracing::instrument(level = "trace", skip_all, target = "sizing::lexical")]
    pub fn size(&self, request: &SizingRequest) -> IndexSize {
        let per_document = self.model.schema_cost(&request.fields);
        let storage_bytes = per_document.saturating_mul(request.num_documents);
        let ram_bytes = fraction_of(storage_bytes, self.capacity.ram_working_set_fraction);

        tracing::trace!(
            target: "sizing::lexical",
            per_document,
            storage_bytes,
            ram_bytes,
            "sized lexical index"
        );

        IndexSize::new(storage_bytes, ram_bytes)
    }

    /// Top-level plus embedded documents the index will hold
    pub fn document_count(&self, request: &SizingRequest) -> u64 {
        request
            .num_documents
            .saturating_add(embedded_document_count(request.num_documents, &request.fields))
    }
}

/// `bytes * fraction`, rounded up. Float-to-int casts saturate.
pub(crate) fn fraction_of(bytes: u64, fraction: f64) -> u64 {
    (bytes as f64 * fraction).ceil() as u64
}
