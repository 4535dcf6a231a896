//! Turns extension types into candidate instances for a load.
//!
//! Built-in types are filtered by the namespaces in scope at the entity, so
//! an extension whose namespace is declared nowhere above the entity is never
//! attempted. Host-supplied types are trusted and bypass that filter.

use super::{catalog, ExtensionType, NamespaceMatching, SyndicationExtension};
use crate::xml::NamespaceScope;

/// Default-constructs one instance per type, in input order.
///
/// Types that cannot be instantiated are skipped.
pub fn instantiate(types: &[ExtensionType]) -> Vec<Box<dyn SyndicationExtension>> {
    types.iter().filter_map(ExtensionType::instantiate).collect()
}

/// Built-in extensions matching `scope`, followed by every type in `types`.
///
/// Built-ins come first in catalog order, then `types` in input order. An
/// extension whose kind is already in the list is not added again.
pub fn instantiate_in_scope(
    types: &[ExtensionType],
    scope: &NamespaceScope,
    matching: NamespaceMatching,
) -> Vec<Box<dyn SyndicationExtension>> {
    let mut resolved: Vec<Box<dyn SyndicationExtension>> =
        instantiate(catalog::builtin_extension_types())
            .into_iter()
            .filter(|e| e.descriptor().matches_scope(scope, matching))
            .collect();

    for extension in instantiate(types) {
        if resolved.iter().any(|r| r.same_kind(extension.as_ref())) {
            tracing::debug!(kind = %extension.kind(), "Extension type already resolved, skipping");
            continue;
        }
        resolved.push(extension);
    }

    tracing::debug!(
        count = resolved.len(),
        kinds = ?resolved.iter().map(|e| e.kind()).collect::<Vec<_>>(),
        "Resolved candidate extensions"
    );
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::{DublinCoreExtension, PingbackExtension, SlashExtension};
    use crate::extension::ExtensionKind;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    const DC: &str = "http://purl.org/dc/elements/1.1/";
    const SLASH: &str = "http://purl.org/rss/1.0/modules/slash/";

    fn kinds(list: &[Box<dyn SyndicationExtension>]) -> Vec<ExtensionKind> {
        list.iter().map(|e| e.kind()).collect()
    }

    #[test]
    fn test_instantiate_preserves_order_and_skips_broken() {
        let types = vec![
            ExtensionType::of::<SlashExtension>(),
            ExtensionType::custom("broken", || None),
            ExtensionType::of::<DublinCoreExtension>(),
        ];
        assert_eq!(
            kinds(&instantiate(&types)),
            vec![ExtensionKind::SiteSummarySlash, ExtensionKind::DublinCore]
        );
    }

    #[test]
    fn test_instantiate_empty() {
        assert!(instantiate(&[]).is_empty());
    }

    #[test]
    fn test_scope_filters_catalog_in_catalog_order() {
        let scope: NamespaceScope = [("slash", SLASH), ("dc", DC)].into_iter().collect();
        let resolved = instantiate_in_scope(&[], &scope, NamespaceMatching::UriOrPrefix);
        assert_eq!(
            kinds(&resolved),
            vec![ExtensionKind::DublinCore, ExtensionKind::SiteSummarySlash]
        );
    }

    #[test]
    fn test_prefix_alone_matches_by_default() {
        let scope: NamespaceScope = [("dc", "http://example.com/not-dublin-core")]
            .into_iter()
            .collect();
        let loose = instantiate_in_scope(&[], &scope, NamespaceMatching::UriOrPrefix);
        assert_eq!(kinds(&loose), vec![ExtensionKind::DublinCore]);

        let strict = instantiate_in_scope(&[], &scope, NamespaceMatching::Uri);
        assert!(strict.is_empty());
    }

    #[test]
    fn test_explicit_types_bypass_filter_and_come_last() {
        let scope: NamespaceScope = [("dc", DC)].into_iter().collect();
        let types = vec![ExtensionType::of::<PingbackExtension>()];
        let resolved = instantiate_in_scope(&types, &scope, NamespaceMatching::UriOrPrefix);
        assert_eq!(
            kinds(&resolved),
            vec![ExtensionKind::DublinCore, ExtensionKind::Pingback]
        );
    }

    #[test]
    fn test_explicit_duplicates_of_matched_builtins_are_dropped() {
        let scope: NamespaceScope = [("dc", DC)].into_iter().collect();
        let types = vec![
            ExtensionType::of::<DublinCoreExtension>(),
            ExtensionType::of::<SlashExtension>(),
            ExtensionType::of::<SlashExtension>(),
        ];
        let resolved = instantiate_in_scope(&types, &scope, NamespaceMatching::UriOrPrefix);
        assert_eq!(
            kinds(&resolved),
            vec![ExtensionKind::DublinCore, ExtensionKind::SiteSummarySlash]
        );
    }

    #[test]
    fn test_broken_custom_type_omitted() {
        let scope = NamespaceScope::new();
        let types = vec![
            ExtensionType::custom("broken", || None),
            ExtensionType::of::<SlashExtension>(),
        ];
        let resolved = instantiate_in_scope(&types, &scope, NamespaceMatching::UriOrPrefix);
        assert_eq!(kinds(&resolved), vec![ExtensionKind::SiteSummarySlash]);
    }

    fn catalog_bindings() -> Vec<(ExtensionKind, String, String)> {
        catalog::builtin_extension_types()
            .iter()
            .map(|t| {
                let e = t.instantiate().unwrap();
                (
                    t.kind(),
                    e.descriptor().prefix().to_string(),
                    e.descriptor().namespace().to_string(),
                )
            })
            .collect()
    }

    proptest! {
        #[test]
        fn prop_only_declared_builtins_resolve(mask in proptest::collection::vec(any::<bool>(), 12)) {
            let bindings = catalog_bindings();
            // Bind each selected namespace to an unrelated prefix so only URI matching applies.
            let scope: NamespaceScope = bindings
                .iter()
                .zip(&mask)
                .enumerate()
                .filter(|(_, (_, keep))| **keep)
                .map(|(i, ((_, _, ns), _))| (format!("ns{}", i), ns.clone()))
                .collect();

            let expected: Vec<ExtensionKind> = bindings
                .iter()
                .zip(&mask)
                .filter(|(_, keep)| **keep)
                .map(|((kind, _, _), _)| *kind)
                .collect();

            let resolved = instantiate_in_scope(&[], &scope, NamespaceMatching::UriOrPrefix);
            prop_assert_eq!(kinds(&resolved), expected);
        }
    }
}
