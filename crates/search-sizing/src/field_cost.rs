//! Per-document byte cost of a single lexical field.
//!
//! Costs are integers and every operation saturates, so a pathological schema
//! degrades into an estimate no instance can hold instead of wrapping around.

use crate::config::CostTable;
use crate::embedded::EmbeddedExpander;
use crate::types::{AutocompleteVariant, DocumentSchema, FieldSpec};

#[derive(Debug, Clone, Copy)]
pub struct FieldCostModel<'a> {
    costs: &'a CostTable,
}

impl<'a> FieldCostModel<'a> {
    pub fn new(costs: &'a CostTable) -> Self {
        Self { costs }
    }

    pub fn costs(&self) -> &'a CostTable {
        self.costs
    }

    /// Bytes one document spends on `field` in the inverted index.
    ///
    /// Vector fields cost nothing here: their size depends on the request's
    /// quantization settings and is computed by the vector sizer.
    pub fn cost(&self, field: &FieldSpec) -> u64 {
        match field {
            FieldSpec::String { byte_size, count } => self.string_cost(*byte_size, *count),
            FieldSpec::Autocomplete { variant, min_size, max_size, avg_chars, count } => {
                let min = min_size.unwrap_or(self.costs.autocomplete_min_gram);
                let max = max_size.unwrap_or(self.costs.autocomplete_max_gram);
                let reference = avg_chars.unwrap_or(self.costs.autocomplete_reference_chars);
                self.autocomplete_cost(*variant, reference, min, max)
                    .saturating_mul(*count)
            }
            FieldSpec::Numeric => self.costs.numeric_bytes,
            FieldSpec::Boolean => self.costs.boolean_bytes,
            FieldSpec::Date => self.costs.date_bytes,
            FieldSpec::Vector { .. } => 0,
            FieldSpec::Embedded { count, schema } => EmbeddedExpander::new(*self).expand(*count, schema),
        }
    }

    /// Sum of field costs over a schema, nested documents included.
    pub fn schema_cost(&self, schema: &DocumentSchema) -> u64 {
        schema
            .iter()
            .fold(0u64, |total, field| total.saturating_add(self.cost(field)))
    }

    pub fn string_cost(&self, byte_size: u64, count: u64) -> u64 {
        byte_size
            .saturating_add(self.costs.string_overhead_bytes)
            .saturating_mul(count)
    }

    /// Cost of one autocomplete value: every gram is indexed like a token of
    /// the reference string.
    ///
    /// An edgeGram reference shorter than `min` yields no prefix at all and
    /// costs nothing. nGram references are stretched to `max` first, so they
    /// always yield grams.
    pub fn autocomplete_cost(&self, variant: AutocompleteVariant, reference_chars: u32, min: u32, max: u32) -> u64 {
        let reference_chars = match variant {
            AutocompleteVariant::EdgeGram => reference_chars,
            AutocompleteVariant::NGram => reference_chars.max(max),
        };
        let token_cost = self.string_cost(u64::from(reference_chars), 1);
        gram_count(variant, reference_chars, min, max).saturating_mul(token_cost)
    }
}

/// Number of grams a string of `len` characters decomposes into.
///
/// Zero when `len` is below the minimum gram size.
pub fn gram_count(variant: AutocompleteVariant, len: u32, min: u32, max: u32) -> u64 {
    let min = u64::from(min.max(1));
    let top = u64::from(max.min(len));
    if top < min {
        return 0;
    }
    match variant {
        // One prefix per length in min..=top
        AutocompleteVariant::EdgeGram => top - min + 1,
        // sum over k in min..=top of (len - k + 1)
        AutocompleteVariant::NGram => {
            let len = u64::from(len);
            let lengths = top - min + 1;
            let sum_k = (min + top) * lengths / 2;
            (len + 1) * lengths - sum_k
        }
    }
}
