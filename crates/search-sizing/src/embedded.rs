//! Recursive expansion of embedded documents.
//!
//! An embedded schema is an owned value inside its parent field, so a schema
//! is always a finite tree. Total cost is the sum over the tree of each
//! field's local cost times the product of its ancestors' counts.

use crate::field_cost::FieldCostModel;
use crate::types::{DocumentSchema, FieldSpec};

#[derive(Debug, Clone, Copy)]
pub struct EmbeddedExpander<'a> {
    model: FieldCostModel<'a>,
}

impl<'a> EmbeddedExpander<'a> {
    pub fn new(model: FieldCostModel<'a>) -> Self {
        Self { model }
    }

    /// Bytes per parent document of `count` embedded instances of `schema`.
    pub fn expand(&self, count: u64, schema: &DocumentSchema) -> u64 {
        if count == 0 {
            return 0;
        }
        self.model.schema_cost(schema).saturating_mul(count)
    }
}

/// Calls `visit` for every non-embedded field in the tree together with the
/// number of times it occurs per top-level document.
pub fn for_each_leaf<F>(schema: &DocumentSchema, multiplier: u64, visit: &mut F)
where
    F: FnMut(&FieldSpec, u64),
{
    for field in schema {
        match field {
            FieldSpec::Embedded { count, schema } => {
                for_each_leaf(schema, multiplier.saturating_mul(*count), visit);
            }
            leaf => visit(leaf, multiplier),
        }
    }
}

/// Number of embedded documents indexed alongside `num_documents` parents.
pub fn embedded_document_count(num_documents: u64, schema: &DocumentSchema) -> u64 {
    schema.iter().fold(0u64, |total, field| match field {
        FieldSpec::Embedded { count, schema } => {
            let direct = num_documents.saturating_mul(*count);
            total
                .saturating_add(direct)
                .saturating_add(embedded_document_count(direct, schema))
        }
        _ => total,
    })
}
