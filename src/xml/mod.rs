//! XML reading and writing.
//!
//! - `document` - Parsed, read-only element tree and the [`XmlNavigator`]
//!   cursor extensions load from
//! - `writer` - [`XmlWriter`], the sink extensions serialize into
//!
//! Both sides are built on `quick-xml`.

mod document;
mod writer;

pub use document::{
    NamespaceScope, XmlAttribute, XmlDocument, XmlError, XmlNavigator, MAX_XML_DEPTH,
    XML_NAMESPACE,
};
pub use writer::{XmlWriteError, XmlWriter};
