//! Syndication extension plumbing.
//!
//! An *extension* is a plugin that reads and writes XML-namespace-qualified
//! metadata attached to a feed or item (Dublin Core, FeedSync, Slash, ...).
//! This module holds the machinery that discovers and drives them:
//!
//! - [`ExtensionDescriptor`] - Immutable identity of an extension (prefix, namespace)
//! - [`catalog`] - Fixed, process-wide set of built-in extension types
//! - [`resolver`] - Filters the catalog by namespaces in scope and merges
//!   host-supplied types
//! - [`ExtensionAdapter`] - Loads the resolved extensions into an entity
//! - [`serialize`] - Writes extensions and their namespace declarations
//!
//! # Example
//!
//! ```
//! use synext::entity::{Extensible, SyndicationEntity};
//! use synext::extension::{ExtensionAdapter, LoadSettings};
//! use synext::xml::XmlDocument;
//!
//! let doc = XmlDocument::parse(
//!     r#"<item xmlns:dc="http://purl.org/dc/elements/1.1/"><dc:creator>Jane</dc:creator></item>"#,
//! ).unwrap();
//! let settings = LoadSettings::default();
//! let mut item = SyndicationEntity::new("item");
//! ExtensionAdapter::new(doc.root(), &settings).fill(&mut item);
//! assert_eq!(item.extensions().len(), 1);
//! ```

mod adapter;
pub mod catalog;
mod descriptor;
pub mod resolver;
pub mod serialize;
mod settings;

pub use adapter::ExtensionAdapter;
pub use descriptor::{DescriptorError, ExtensionDescriptor, NamespaceMatching};
pub use settings::LoadSettings;

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::xml::{XmlNavigator, XmlWriteError, XmlWriter};

/// Identity of a concrete extension kind.
///
/// Two extension instances are "the same extension" when their kinds are
/// equal, regardless of their field contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ExtensionKind {
    CreativeCommons,
    DublinCore,
    FeedSync,
    LiveJournal,
    Pheed,
    Pingback,
    SimpleList,
    SiteSummaryContent,
    SiteSummarySlash,
    SiteSummaryUpdate,
    Trackback,
    WellFormedWeb,
    /// A host-defined extension, identified by a unique static name.
    Custom(&'static str),
}

impl fmt::Display for ExtensionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreativeCommons => f.write_str("creative-commons"),
            Self::DublinCore => f.write_str("dublin-core"),
            Self::FeedSync => f.write_str("feed-sync"),
            Self::LiveJournal => f.write_str("live-journal"),
            Self::Pheed => f.write_str("pheed"),
            Self::Pingback => f.write_str("pingback"),
            Self::SimpleList => f.write_str("simple-list"),
            Self::SiteSummaryContent => f.write_str("site-summary-content"),
            Self::SiteSummarySlash => f.write_str("site-summary-slash"),
            Self::SiteSummaryUpdate => f.write_str("site-summary-update"),
            Self::Trackback => f.write_str("trackback"),
            Self::WellFormedWeb => f.write_str("well-formed-web"),
            Self::Custom(name) => write!(f, "custom:{}", name),
        }
    }
}

/// The uniform contract every extension kind implements.
///
/// An implementation pairs a static [`ExtensionDescriptor`] with a mutable
/// context holding the extension's fields. Instances start out
/// default-constructed and are populated by [`load`](Self::load).
pub trait SyndicationExtension: fmt::Debug + Send + Sync + 'static {
    fn kind(&self) -> ExtensionKind;

    fn descriptor(&self) -> &ExtensionDescriptor;

    /// Cheap presence test: is this extension's namespace or prefix in scope
    /// at `source`? Does not look for actual elements.
    fn exists_in_source(&self, source: &XmlNavigator<'_>) -> bool {
        self.descriptor()
            .matches_scope(&source.namespaces_in_scope(), NamespaceMatching::UriOrPrefix)
    }

    /// Populates the context from the element at `source`.
    ///
    /// Returns `false` when none of this extension's elements were found.
    fn load(&mut self, source: &XmlNavigator<'_>) -> bool;

    /// Writes the context into the currently open element of `writer`,
    /// skipping fields that are still at their default.
    fn write_to(&self, writer: &mut XmlWriter) -> Result<(), XmlWriteError>;

    /// A fresh, default-constructed instance of the same kind.
    fn create_default(&self) -> Box<dyn SyndicationExtension>;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl dyn SyndicationExtension {
    pub fn downcast_ref<T: SyndicationExtension>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    pub fn downcast_mut<T: SyndicationExtension>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }

    /// True if `other` is the same concrete kind, independent of content.
    pub fn same_kind(&self, other: &dyn SyndicationExtension) -> bool {
        self.kind() == other.kind()
    }
}

type CustomFactory = dyn Fn() -> Option<Box<dyn SyndicationExtension>> + Send + Sync;

#[derive(Clone)]
enum Factory {
    Default(fn() -> Box<dyn SyndicationExtension>),
    Custom(Arc<CustomFactory>),
}

/// An extension *type*: a kind identity plus the means to construct it.
///
/// Built-in types come from the [`catalog`]; hosts register their own with
/// [`ExtensionType::of`] or [`ExtensionType::custom`].
#[derive(Clone)]
pub struct ExtensionType {
    kind: ExtensionKind,
    factory: Factory,
}

impl fmt::Debug for ExtensionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ExtensionType").field(&self.kind).finish()
    }
}

impl PartialEq for ExtensionType {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

impl Eq for ExtensionType {}

fn boxed_default<T: SyndicationExtension + Default>() -> Box<dyn SyndicationExtension> {
    Box::new(T::default())
}

impl ExtensionType {
    /// Type for any default-constructible extension.
    pub fn of<T: SyndicationExtension + Default>() -> Self {
        Self {
            kind: T::default().kind(),
            factory: Factory::Default(boxed_default::<T>),
        }
    }

    /// Type for a host-defined kind built by `factory`.
    ///
    /// A factory that returns `None`, or an instance whose kind is not
    /// `Custom(id)`, makes the type unusable; it is skipped wherever it is
    /// instantiated.
    pub fn custom<F>(id: &'static str, factory: F) -> Self
    where
        F: Fn() -> Option<Box<dyn SyndicationExtension>> + Send + Sync + 'static,
    {
        Self {
            kind: ExtensionKind::Custom(id),
            factory: Factory::Custom(Arc::new(factory)),
        }
    }

    pub fn kind(&self) -> ExtensionKind {
        self.kind
    }

    /// Builds a default instance, or `None` if this type cannot be instantiated.
    pub fn instantiate(&self) -> Option<Box<dyn SyndicationExtension>> {
        let instance = match &self.factory {
            Factory::Default(make) => make(),
            Factory::Custom(make) => match make() {
                Some(instance) => instance,
                None => {
                    tracing::warn!(
                        kind = %self.kind,
                        "Extension factory produced no instance, skipping"
                    );
                    return None;
                }
            },
        };
        if instance.kind() != self.kind {
            tracing::warn!(
                kind = %self.kind,
                produced = %instance.kind(),
                "Extension factory produced a different kind, skipping"
            );
            return None;
        }
        Some(instance)
    }
}

/// Ordered extensions owned by a feed or item.
///
/// Duplicates are allowed; callers decide whether a kind may repeat.
#[derive(Debug, Default)]
pub struct ExtensionCollection(Vec<Box<dyn SyndicationExtension>>);

impl ExtensionCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, extension: Box<dyn SyndicationExtension>) {
        self.0.push(extension);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn SyndicationExtension> {
        self.0.iter().map(|e| e.as_ref())
    }

    /// Removes and returns every extension of `kind`.
    pub fn remove_kind(&mut self, kind: ExtensionKind) -> Vec<Box<dyn SyndicationExtension>> {
        let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.0)
            .into_iter()
            .partition(|e| e.kind() == kind);
        self.0 = kept;
        removed
    }

    /// Kinds in collection order, duplicates included.
    pub fn kinds(&self) -> Vec<ExtensionKind> {
        self.0.iter().map(|e| e.kind()).collect()
    }

    pub fn contains_kind(&self, kind: ExtensionKind) -> bool {
        self.0.iter().any(|e| e.kind() == kind)
    }

    /// First extension of `kind`.
    pub fn find_kind(&self, kind: ExtensionKind) -> Option<&dyn SyndicationExtension> {
        self.iter().find(|e| e.kind() == kind)
    }

    /// First extension of concrete type `T`.
    pub fn find<T: SyndicationExtension>(&self) -> Option<&T> {
        self.0.iter().find_map(|e| e.downcast_ref::<T>())
    }

    pub fn find_mut<T: SyndicationExtension>(&mut self) -> Option<&mut T> {
        self.0.iter_mut().find_map(|e| e.downcast_mut::<T>())
    }
}

impl<'a> IntoIterator for &'a ExtensionCollection {
    type Item = &'a Box<dyn SyndicationExtension>;
    type IntoIter = std::slice::Iter<'a, Box<dyn SyndicationExtension>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<Box<dyn SyndicationExtension>> for ExtensionCollection {
    fn from_iter<T: IntoIterator<Item = Box<dyn SyndicationExtension>>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
