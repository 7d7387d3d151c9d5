//! Delimiter packing for multi-valued aggregate bindings.
//!
//! The graph engine concatenates one token per sub-entity, each token being
//! `label::entity-url`, joined with `||`. Decoding splits records first, then
//! takes the first `::` in each record as the label/url boundary. Labels must
//! not contain `::`.

use std::collections::HashSet;

pub const FIELD_SEPARATOR: &str = "::";
pub const RECORD_SEPARATOR: &str = "||";

/// A sub-entity decoded from a packed aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedEntity {
    pub label: String,
    pub entity_url: String,
}

/// Splits a packed aggregate back into entities, deduplicated by url with first-seen order.
///
/// Records without a separator, an empty label, or an empty url are dropped.
pub fn unpack_entities(raw: &str) -> Vec<PackedEntity> {
    let mut seen_urls = HashSet::new();
    let mut entities = Vec::new();
    for record in raw.split(RECORD_SEPARATOR) {
        let Some((label, entity_url)) = record.split_once(FIELD_SEPARATOR) else {
            continue;
        };
        let label = label.trim();
        let entity_url = entity_url.trim();
        if label.is_empty() || entity_url.is_empty() {
            continue;
        }
        if seen_urls.insert(entity_url.to_string()) {
            entities.push(PackedEntity {
                label: label.to_string(),
                entity_url: entity_url.to_string(),
            });
        }
    }
    entities
}

/// Labels of a packed aggregate in first-seen order. Empty input gives an empty list.
pub fn unpack_labels(raw: &str) -> Vec<String> {
    unpack_entities(raw)
        .into_iter()
        .map(|entity| entity.label)
        .collect()
}

/// SPARQL expression building one token from a label variable and an entity variable.
pub fn pack_expression(label_var: &str, entity_var: &str) -> String {
    format!("CONCAT(?{label_var}, \"{FIELD_SEPARATOR}\", STR(?{entity_var}))")
}

/// SPARQL projection concatenating all tokens of `pack_var` into `output_var`.
pub fn group_concat_projection(pack_var: &str, output_var: &str) -> String {
    format!("(GROUP_CONCAT(DISTINCT ?{pack_var}; separator=\"{RECORD_SEPARATOR}\") AS ?{output_var})")
}
