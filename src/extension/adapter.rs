use super::{resolver, LoadSettings};
use crate::entity::Extensible;
use crate::xml::{NamespaceScope, XmlNavigator};

/// Loads syndication extensions from an element into an extensible entity.
///
/// The adapter holds no state between calls besides its navigator and
/// settings. Each [`fill`](Self::fill) appends to the entity's collection, so
/// filling the same entity twice yields duplicates; clear the collection
/// first if the entity is being reloaded.
#[derive(Debug, Clone, Copy)]
pub struct ExtensionAdapter<'a> {
    navigator: XmlNavigator<'a>,
    settings: &'a LoadSettings,
}

impl<'a> ExtensionAdapter<'a> {
    pub fn new(navigator: XmlNavigator<'a>, settings: &'a LoadSettings) -> Self {
        Self {
            navigator,
            settings,
        }
    }

    pub fn navigator(&self) -> XmlNavigator<'a> {
        self.navigator
    }

    pub fn settings(&self) -> &'a LoadSettings {
        self.settings
    }

    /// Fills `entity` using the namespaces in scope at the navigator.
    ///
    /// Returns the number of extensions added.
    pub fn fill<E: Extensible + ?Sized>(&self, entity: &mut E) -> usize {
        let scope = self.navigator.namespaces_in_scope();
        self.fill_with_scope(entity, &scope)
    }

    /// Fills `entity`, resolving candidate extensions against `scope`.
    ///
    /// Candidates of the entity's own kind are skipped, as are candidates
    /// whose presence test fails. Every remaining candidate is loaded into a
    /// fresh instance, which is kept only if its load finds something.
    pub fn fill_with_scope<E: Extensible + ?Sized>(
        &self,
        entity: &mut E,
        scope: &NamespaceScope,
    ) -> usize {
        let candidates = if self.settings.auto_detect_extensions {
            resolver::instantiate_in_scope(
                &self.settings.extension_types,
                scope,
                self.settings.namespace_matching,
            )
        } else {
            resolver::instantiate(&self.settings.extension_types)
        };

        let own_kind = entity.extension_kind();
        let mut added = 0;

        for candidate in &candidates {
            let kind = candidate.kind();
            if own_kind == Some(kind) {
                tracing::debug!(kind = %kind, "Skipping extension of the entity's own kind");
                continue;
            }
            if !candidate.exists_in_source(&self.navigator) {
                tracing::trace!(
                    kind = %kind,
                    element = %self.navigator.name(),
                    "Extension not in scope"
                );
                continue;
            }

            let mut extension = candidate.create_default();
            if extension.kind() != kind {
                tracing::warn!(
                    expected = %kind,
                    actual = %extension.kind(),
                    "Extension created an instance of another kind, skipping"
                );
                continue;
            }
            if extension.load(&self.navigator) {
                tracing::debug!(kind = %kind, element = %self.navigator.name(), "Loaded extension");
                entity.add_extension(extension);
                added += 1;
            } else {
                tracing::trace!(
                    kind = %kind,
                    element = %self.navigator.name(),
                    "Extension declared but absent"
                );
            }
        }

        added
    }
}
