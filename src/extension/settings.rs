use super::{ExtensionType, NamespaceMatching};

/// Options controlling which extensions a load considers.
///
/// Owned by the caller and only read by the adapter.
#[derive(Debug, Clone)]
pub struct LoadSettings {
    /// Consider every built-in extension whose namespace is in scope at the
    /// entity. When `false`, only `extension_types` are considered.
    pub auto_detect_extensions: bool,

    /// Extension types considered in addition to (or, without auto-detection,
    /// instead of) the built-in catalog. They bypass namespace filtering.
    pub extension_types: Vec<ExtensionType>,

    /// How built-in descriptors are matched against namespaces in scope.
    pub namespace_matching: NamespaceMatching,

    /// Maximum number of items a document load fills (0 = unlimited).
    pub retrieval_limit: usize,
}

impl Default for LoadSettings {
    fn default() -> Self {
        Self {
            auto_detect_extensions: true,
            extension_types: Vec::new(),
            namespace_matching: NamespaceMatching::default(),
            retrieval_limit: 0,
        }
    }
}

impl LoadSettings {
    /// Settings that consider only `types`, with auto-detection off.
    pub fn only(types: Vec<ExtensionType>) -> Self {
        Self {
            auto_detect_extensions: false,
            extension_types: types,
            ..Self::default()
        }
    }

    /// Adds a type unless one of the same kind is already registered.
    pub fn with_extension_type(mut self, ty: ExtensionType) -> Self {
        if !self.extension_types.iter().any(|t| t.kind() == ty.kind()) {
            self.extension_types.push(ty);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::{DublinCoreExtension, SlashExtension};

    #[test]
    fn test_default_settings() {
        let settings = LoadSettings::default();
        assert!(settings.auto_detect_extensions);
        assert!(settings.extension_types.is_empty());
        assert_eq!(settings.namespace_matching, NamespaceMatching::UriOrPrefix);
        assert_eq!(settings.retrieval_limit, 0);
    }

    #[test]
    fn test_only_disables_auto_detection() {
        let settings = LoadSettings::only(vec![ExtensionType::of::<SlashExtension>()]);
        assert!(!settings.auto_detect_extensions);
        assert_eq!(settings.extension_types.len(), 1);
    }

    #[test]
    fn test_with_extension_type_ignores_duplicates() {
        let settings = LoadSettings::default()
            .with_extension_type(ExtensionType::of::<DublinCoreExtension>())
            .with_extension_type(ExtensionType::of::<DublinCoreExtension>())
            .with_extension_type(ExtensionType::of::<SlashExtension>());
        assert_eq!(settings.extension_types.len(), 2);
    }
}
