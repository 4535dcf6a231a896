//! Feeds and items that carry extensions.

use crate::extension::{ExtensionCollection, ExtensionKind, SyndicationExtension};

/// An entity (feed, channel or item) that owns a collection of extensions.
pub trait Extensible {
    /// The kind this entity has when it is itself an extension.
    ///
    /// Loading never adds an extension of this kind to the entity.
    fn extension_kind(&self) -> Option<ExtensionKind> {
        None
    }

    fn extensions(&self) -> &ExtensionCollection;

    fn extensions_mut(&mut self) -> &mut ExtensionCollection;

    fn add_extension(&mut self, extension: Box<dyn SyndicationExtension>) {
        self.extensions_mut().push(extension);
    }
}

/// A feed-level or item-level element and the extensions loaded from it.
#[derive(Debug, Default)]
pub struct SyndicationEntity {
    /// Qualified element name, e.g. `channel`, `entry`.
    pub name: String,
    pub extensions: ExtensionCollection,
}

impl SyndicationEntity {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            extensions: ExtensionCollection::new(),
        }
    }
}

impl Extensible for SyndicationEntity {
    fn extensions(&self) -> &ExtensionCollection {
        &self.extensions
    }

    fn extensions_mut(&mut self) -> &mut ExtensionCollection {
        &mut self.extensions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::SlashExtension;

    #[test]
    fn test_add_extension_appends() {
        let mut entity = SyndicationEntity::new("item");
        assert!(entity.extension_kind().is_none());
        entity.add_extension(Box::new(SlashExtension::default()));
        entity.add_extension(Box::new(SlashExtension::default()));
        assert_eq!(entity.extensions().len(), 2);
        assert_eq!(entity.name, "item");
    }
}
