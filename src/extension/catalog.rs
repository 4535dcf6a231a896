//! The fixed set of built-in extension types.
//!
//! The catalog is built once, on first use, and never changes afterwards, so
//! it can be read concurrently from any number of loads.

use std::sync::OnceLock;

use super::{ExtensionKind, ExtensionType};
use crate::builtin::{
    CreativeCommonsExtension, DublinCoreExtension, FeedSyncExtension, LiveJournalExtension,
    PheedExtension, PingbackExtension, SimpleListExtension, SiteSummaryContentExtension,
    SiteSummaryUpdateExtension, SlashExtension, TrackbackExtension, WellFormedWebExtension,
};

static CATALOG: OnceLock<Vec<ExtensionType>> = OnceLock::new();

/// Every built-in extension type, in catalog order.
pub fn builtin_extension_types() -> &'static [ExtensionType] {
    CATALOG.get_or_init(|| {
        let types = vec![
            ExtensionType::of::<CreativeCommonsExtension>(),
            ExtensionType::of::<DublinCoreExtension>(),
            ExtensionType::of::<FeedSyncExtension>(),
            ExtensionType::of::<LiveJournalExtension>(),
            ExtensionType::of::<PheedExtension>(),
            ExtensionType::of::<PingbackExtension>(),
            ExtensionType::of::<SimpleListExtension>(),
            ExtensionType::of::<SiteSummaryContentExtension>(),
            ExtensionType::of::<SlashExtension>(),
            ExtensionType::of::<SiteSummaryUpdateExtension>(),
            ExtensionType::of::<TrackbackExtension>(),
            ExtensionType::of::<WellFormedWebExtension>(),
        ];
        tracing::debug!(count = types.len(), "Built extension catalog");
        types
    })
}

/// Built-in type of `kind`, if there is one.
pub fn find(kind: ExtensionKind) -> Option<&'static ExtensionType> {
    builtin_extension_types().iter().find(|t| t.kind() == kind)
}

/// Built-in type whose descriptor uses `prefix` (case-insensitive).
pub fn find_by_prefix(prefix: &str) -> Option<&'static ExtensionType> {
    builtin_extension_types().iter().find(|t| {
        t.instantiate()
            .is_some_and(|e| e.descriptor().prefix().eq_ignore_ascii_case(prefix))
    })
}

/// Built-in type whose descriptor declares `namespace`.
pub fn find_by_namespace(namespace: &str) -> Option<&'static ExtensionType> {
    builtin_extension_types()
        .iter()
        .find(|t| t.instantiate().is_some_and(|e| e.descriptor().namespace() == namespace))
}
