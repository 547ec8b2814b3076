use crate::traits::EligibilityService;
use crate::types::ContentItem;
use serde_json::Value;

/// Eligibility read from a per-item metadata field holding destination ids.
///
/// The field is either a JSON array of ids or a serialized list string in
/// which every id appears double-quoted (`a:2:{i:0;s:4:"line";...}`).
#[derive(Debug, Clone)]
pub struct MetaEligibility {
    meta_key: String,
}

impl MetaEligibility {
    pub fn new(meta_key: impl Into<String>) -> Self {
        Self {
            meta_key: meta_key.into(),
        }
    }

}

impl Default for MetaEligibility {
    fn default() -> Self {
        Self::new(interfaces::defs::meta::DELIVERY_SERVICES)
    }
}

impl EligibilityService for MetaEligibility {
    fn is_eligible(&self, item: &ContentItem, destination_id: &str) -> bool {
        match item.meta(&self.meta_key) {
            Some(Value::Array(ids)) => ids.iter().any(|id| id.as_str() == Some(destination_id)),
            Some(Value::String(encoded)) => encoded.contains(&format!("\"{}\"", destination_id)),
            _ => false,
        }
    }
}
