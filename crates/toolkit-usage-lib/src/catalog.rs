use crate::data_structures::{ToolDescriptor, ToolVariant};
use std::collections::HashMap;
use tracing::debug;

pub const HASH_GENERATOR: &str = "hash-generator";
pub const JSON_FORMATTER: &str = "json-formatter";
pub const CASE_CONVERTER: &str = "case-converter";
pub const WORD_COUNTER: &str = "word-counter";
pub const BASE64_ENCODER: &str = "base64-encoder";

pub struct ToolCatalog {
    tools: HashMap<String, ToolDescriptor>,
}

impl ToolCatalog {
    pub fn new() -> Self {
        let mut catalog = Self::empty();

        catalog.register(ToolDescriptor::new(
            HASH_GENERATOR,
            "Hash Generator",
            15,
            vec![
                ToolVariant::free("sha256"),
                ToolVariant::free("sha224"),
                ToolVariant::pro("sha384"),
                ToolVariant::pro("sha512"),
            ],
        ));

        catalog.register(ToolDescriptor::new(
            JSON_FORMATTER,
            "JSON Formatter",
            20,
            vec![
                ToolVariant::free("pretty"),
                ToolVariant::free("minify"),
                ToolVariant::pro("sort-keys"),
            ],
        ));

        catalog.register(ToolDescriptor::new(
            CASE_CONVERTER,
            "Case Converter",
            25,
            vec![
                ToolVariant::free("upper"),
                ToolVariant::free("lower"),
                ToolVariant::pro("title"),
                ToolVariant::pro("snake"),
                ToolVariant::pro("kebab"),
            ],
        ));

        catalog.register(ToolDescriptor::new(
            WORD_COUNTER,
            "Word Counter",
            30,
            vec![ToolVariant::free("words"), ToolVariant::pro("detailed")],
        ));

        catalog.register(ToolDescriptor::new(
            BASE64_ENCODER,
            "Base64 Encoder",
            20,
            vec![ToolVariant::free("encode"), ToolVariant::pro("decode")],
        ));

        catalog
    }

    pub fn empty() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Adds or replaces a descriptor keyed by its identifier.
    pub fn register(&mut self, descriptor: ToolDescriptor) {
        self.tools.insert(descriptor.id().to_string(), descriptor);
    }

    pub fn get(&self, tool_id: &str) -> Option<&ToolDescriptor> {
        self.tools.get(tool_id)
    }

    pub fn daily_limit(&self, tool_id: &str) -> Option<u32> {
        self.tools.get(tool_id).map(|tool| tool.daily_limit())
    }

    /// Applies configured limits. Unknown identifiers are ignored.
    pub fn apply_limit_overrides(&mut self, overrides: &HashMap<String, u32>) {
        for (tool_id, limit) in overrides {
            match self.tools.get_mut(tool_id) {
                Some(tool) => {
                    debug!(tool_id = %tool_id, limit = *limit, "Overriding daily limit");
                    tool.set_daily_limit(*limit);
                }
                None => debug!(tool_id = %tool_id, "Ignoring limit override for unknown tool"),
            }
        }
    }

    /// Descriptors sorted by identifier, for stable listings.
    pub fn tools(&self) -> Vec<&ToolDescriptor> {
        let mut tools: Vec<_> = self.tools.values().collect();
        tools.sort_by(|a, b| a.id().cmp(b.id()));
        tools
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_structures::Access;

    #[test]
    fn test_builtin_limits() {
        let catalog = ToolCatalog::new();
        assert_eq!(catalog.daily_limit(HASH_GENERATOR), Some(15));
        assert_eq!(catalog.daily_limit(JSON_FORMATTER), Some(20));
        assert_eq!(catalog.daily_limit("color-picker"), None);
    }

    #[test]
    fn test_variants_are_tagged() {
        let catalog = ToolCatalog::new();
        let hash = catalog.get(HASH_GENERATOR).unwrap();
        assert_eq!(hash.variant("sha256").unwrap().access(), Access::Free);
        assert_eq!(hash.variant("sha512").unwrap().access(), Access::Pro);
        assert_eq!(hash.default_variant().unwrap().id(), "sha256");
    }

    #[test]
    fn test_limit_overrides() {
        let mut catalog = ToolCatalog::new();
        let mut overrides = HashMap::new();
        overrides.insert(HASH_GENERATOR.to_string(), 3);
        overrides.insert("unknown-tool".to_string(), 99);

        catalog.apply_limit_overrides(&overrides);
        assert_eq!(catalog.daily_limit(HASH_GENERATOR), Some(3));
        assert!(catalog.get("unknown-tool").is_none());
    }

    #[test]
    fn test_tools_sorted() {
        let catalog = ToolCatalog::new();
        let ids: Vec<_> = catalog.tools().iter().map(|t| t.id()).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
        assert_eq!(catalog.len(), 5);
    }
}
