//! Vector index sizing.
//!
//! A stored vector costs its encoded bytes plus the proximity-graph edge lists
//! pointing at it. The graph share depends only on dimensionality, so it is
//! the same under every quantization type.

use crate::config::VectorIndexConfig;
use crate::embedded::for_each_leaf;
use crate::types::{FieldSpec, IndexSize, QuantizationType, SizingRequest};

pub struct VectorIndexSizer<'a> {
    config: &'a VectorIndexConfig,
}

impl<'a> VectorIndexSizer<'a> {
    pub fn new(config: &'a VectorIndexConfig) -> Self {
        Self { config }
    }

    /// Bytes of one unquantized vector
    pub fn raw_vector_bytes(&self, dimensions: u32) -> u64 {
        u64::from(dimensions).saturating_mul(self.config.float_bytes_per_dimension)
    }

    /// Bytes of one vector once encoded with `kind`
    pub fn encoded_vector_bytes(&self, dimensions: u32, kind: QuantizationType) -> u64 {
        let dimensions = u64::from(dimensions);
        match kind {
            QuantizationType::None => dimensions.saturating_mul(self.config.float_bytes_per_dimension),
            QuantizationType::Scalar => dimensions,
            // One bit per dimension, padded to a whole byte
            QuantizationType::Binary => dimensions.div_ceil(8),
        }
    }

    pub fn graph_overhead_bytes(&self, dimensions: u32) -> u64 {
        (self.raw_vector_bytes(dimensions) as f64 * self.config.graph_overhead_factor).ceil() as u64
    }

    /// Index bytes per vector: encoded vector plus graph overhead
    pub fn per_vector_bytes(&self, dimensions: u32, kind: QuantizationType) -> u64 {
        self.encoded_vector_bytes(dimensions, kind)
            .saturating_add(self.graph_overhead_bytes(dimensions))
    }

    /// Storage and RAM of every vector field in the request, nested ones included.
    ///
    /// With re-ranking at query time the raw vectors are kept on disk next to
    /// the quantized index; RAM only ever holds the quantized index.
    #[tracing::instrument(level = "trace", skip_all, target = "sizing::vector")]
    pub fn size(&self, request: &SizingRequest) -> IndexSize {
        let quantization = request.quantization();
        let mut index_bytes = 0u64;
        let mut raw_bytes = 0u64;

        for_each_leaf(&request.fields, 1, &mut |field, multiplier| {
            if let FieldSpec::Vector { dimensions, count } = field {
                let vectors = request
                    .num_documents
                    .saturating_mul(*count)
                    .saturating_mul(multiplier);
                index_bytes = index_bytes
                    .saturating_add(vectors.saturating_mul(self.per_vector_bytes(*dimensions, quantization.kind)));
                raw_bytes = raw_bytes.saturating_add(vectors.saturating_mul(self.raw_vector_bytes(*dimensions)));
            }
        });

        let storage_bytes = if quantization.retains_raw_vectors() {
            index_bytes.saturating_add(raw_bytes)
        } else {
            index_bytes
        };

        tracing::trace!(
            target: "sizing::vector",
            kind = ?quantization.kind,
            method = ?quantization.method,
            index_bytes,
            storage_bytes,
            "sized vector index"
        );

        IndexSize::new(storage_bytes, index_bytes)
    }
}
