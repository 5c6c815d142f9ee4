use super::{EmlParser, MboxParser, ParserCapability, TextParser};
use crate::config::ParsersConfig;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Extension -> parsers lookup table.
///
/// Built once at startup and shared read-only (`Arc<ParserRegistry>`) for the
/// duration of a run. A parser is identified by its name: registering the same
/// name twice under one extension is a no-op.
#[derive(Default)]
pub struct ParserRegistry {
    /// Extension -> parsers in registration order
    by_extension: HashMap<String, Vec<Arc<dyn ParserCapability>>>,
    /// Every distinct parser in registration order
    parsers: Vec<Arc<dyn ParserCapability>>,
}

impl ParserRegistry {
    /// Create new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create registry with the built-in parsers
    pub fn with_defaults() -> Self {
        Self::from_config(&ParsersConfig::default())
    }

    /// Create registry with the built-in parsers, honouring `config`
    pub fn from_config(config: &ParsersConfig) -> Self {
        let builtins: Vec<Arc<dyn ParserCapability>> = vec![
            Arc::new(EmlParser::new()),
            Arc::new(MboxParser::new()),
            Arc::new(TextParser::new()),
        ];

        let mut registry = Self::new();
        for parser in builtins {
            if config.is_enabled(parser.name()) {
                registry.register(parser);
            } else {
                tracing::debug!("Parser '{}' disabled by configuration", parser.name());
            }
        }

        for (name, extensions) in &config.extra_extensions {
            match registry.get(name) {
                Some(parser) => {
                    for ext in extensions {
                        registry.register_for(parser.clone(), ext);
                    }
                }
                None => tracing::warn!(
                    "Ignoring extra extensions for unknown or disabled parser '{}'",
                    name
                ),
            }
        }

        registry
    }

    /// Register a parser under each of its supported extensions
    pub fn register(&mut self, parser: Arc<dyn ParserCapability>) {
        for ext in parser.supported_extensions() {
            self.register_for(parser.clone(), ext);
        }
        // A parser with no extensions is still listed
        self.remember(&parser);
    }

    /// Register a parser under one extension, returns false if it already was
    pub fn register_for(&mut self, parser: Arc<dyn ParserCapability>, extension: &str) -> bool {
        let ext = normalize_extension(extension);
        let list = self.by_extension.entry(ext.clone()).or_default();

        if list.iter().any(|p| p.name() == parser.name()) {
            tracing::debug!("Parser '{}' already registered for '{}'", parser.name(), ext);
            return false;
        }

        list.push(parser.clone());
        self.remember(&parser);
        true
    }

    fn remember(&mut self, parser: &Arc<dyn ParserCapability>) {
        if !self.parsers.iter().any(|p| p.name() == parser.name()) {
            self.parsers.push(parser.clone());
        }
    }

    /// Parsers registered for an extension; empty when none match
    pub fn parsers_for(&self, extension: &str) -> &[Arc<dyn ParserCapability>] {
        self.by_extension
            .get(&normalize_extension(extension))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Parsers registered for a file's extension
    pub fn parsers_for_path(&self, path: &Path) -> &[Arc<dyn ParserCapability>] {
        self.parsers_for(&Self::extension_of(path))
    }

    /// Get parser by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn ParserCapability>> {
        self.parsers.iter().find(|p| p.name() == name).cloned()
    }

    /// Lowercased extension without the dot; empty when the file has none
    pub fn extension_of(path: &Path) -> String {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|s| s.to_lowercase())
            .unwrap_or_default()
    }

    /// All registered parsers in registration order
    pub fn parsers(&self) -> &[Arc<dyn ParserCapability>] {
        &self.parsers
    }

    /// Parser names in registration order
    pub fn parser_names(&self) -> Vec<&str> {
        self.parsers.iter().map(|p| p.name()).collect()
    }

    /// Extensions a parser is registered under, sorted
    pub fn extensions_of(&self, name: &str) -> Vec<&str> {
        let mut exts: Vec<&str> = self
            .by_extension
            .iter()
            .filter(|(_, parsers)| parsers.iter().any(|p| p.name() == name))
            .map(|(ext, _)| ext.as_str())
            .collect();
        exts.sort_unstable();
        exts
    }

    /// List all registered extensions, sorted
    pub fn extensions(&self) -> Vec<&str> {
        let mut exts: Vec<&str> = self.by_extension.keys().map(|s| s.as_str()).collect();
        exts.sort_unstable();
        exts
    }

    pub fn len(&self) -> usize {
        self.parsers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parsers.is_empty()
    }
}

fn normalize_extension(extension: &str) -> String {
    extension.trim().trim_start_matches('.').to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::parser::ExtractionContext;

    struct Named(&'static str, &'static [&'static str]);

    #[async_trait::async_trait]
    impl ParserCapability for Named {
        fn name(&self) -> &str {
            self.0
        }

        fn supported_extensions(&self) -> &[&str] {
            self.1
        }

        async fn parse(
            &self,
            _file: &Path,
            ctx: ExtractionContext,
            _expected: usize,
        ) -> Result<()> {
            ctx.report_complete()?;
            Ok(())
        }
    }

    #[test]
    fn test_lookup_miss_is_empty() {
        let registry = ParserRegistry::new();
        assert!(registry.parsers_for("xyz").is_empty());
        assert!(registry.parsers_for("").is_empty());
    }

    #[test]
    fn test_case_insensitive_lookup() {
        let mut registry = ParserRegistry::new();
        registry.register(Arc::new(Named("p1", &["EML"])));

        assert_eq!(registry.parsers_for("eml").len(), 1);
        assert_eq!(registry.parsers_for(".Eml").len(), 1);
        assert_eq!(
            registry.parsers_for_path(Path::new("/e/MESSAGE.EML")).len(),
            1
        );
    }

    #[test]
    fn test_registration_order_is_kept() {
        let mut registry = ParserRegistry::new();
        registry.register(Arc::new(Named("first", &["zip"])));
        registry.register(Arc::new(Named("second", &["zip"])));

        let names: Vec<_> = registry.parsers_for("zip").iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["first", "second"]);
    }

    #[test]
    fn test_double_registration_is_idempotent() {
        let mut registry = ParserRegistry::new();
        let parser: Arc<dyn ParserCapability> = Arc::new(Named("p1", &["eml"]));
        registry.register(parser.clone());
        registry.register(parser.clone());
        assert!(!registry.register_for(parser, "eml"));

        assert_eq!(registry.parsers_for("eml").len(), 1);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(ParserRegistry::extension_of(Path::new("/e/a.EML")), "eml");
        assert_eq!(ParserRegistry::extension_of(Path::new("/e/archive.tar.gz")), "gz");
        assert_eq!(ParserRegistry::extension_of(Path::new("/e/README")), "");
    }

    #[test]
    fn test_defaults() {
        let registry = ParserRegistry::with_defaults();
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.parser_names(), vec!["eml", "mbox", "text"]);
        assert_eq!(registry.parsers_for("eml")[0].name(), "eml");
        assert_eq!(registry.parsers_for("mbox")[0].name(), "mbox");
        assert_eq!(registry.parsers_for("txt")[0].name(), "text");
    }

    #[test]
    fn test_from_config() {
        let mut config = ParsersConfig {
            disabled: vec!["mbox".to_string()],
            ..Default::default()
        };
        config
            .extra_extensions
            .insert("text".to_string(), vec![".NFO".to_string()]);
        config
            .extra_extensions
            .insert("mbox".to_string(), vec!["mbx2".to_string()]);

        let registry = ParserRegistry::from_config(&config);
        assert!(registry.get("mbox").is_none());
        assert!(registry.parsers_for("mbox").is_empty());
        assert!(registry.parsers_for("mbx2").is_empty());
        assert_eq!(registry.parsers_for("nfo")[0].name(), "text");
        assert!(registry.extensions_of("text").contains(&"nfo"));
    }
}
