//! Feed documents: the channel and items of an Atom, RSS 2.0 or RSS 1.0
//! feed, each filled with the extensions found on its element.
//!
//! Only extension data is modelled. Core feed fields (titles, links, ...)
//! are left to the host's own feed model.

use std::fmt;
use std::path::Path;

use thiserror::Error;

use crate::entity::{Extensible, SyndicationEntity};
use crate::extension::{catalog, serialize, ExtensionAdapter, ExtensionType, LoadSettings};
use crate::xml::{XmlDocument, XmlError, XmlNavigator, XmlWriteError, XmlWriter};

pub const ATOM_NAMESPACE: &str = "http://www.w3.org/2005/Atom";
pub const RDF_NAMESPACE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
pub const RSS1_NAMESPACE: &str = "http://purl.org/rss/1.0/";

/// Default upper bound on documents read from disk (10 MiB).
pub const DEFAULT_MAX_DOCUMENT_SIZE: u64 = 10 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Unrecognized feed root element: {0}")]
    UnrecognizedRoot(String),

    #[error("Missing channel element in {0} feed")]
    MissingChannel(DocumentFormat),

    #[error("Invalid XML: {0}")]
    Xml(#[from] XmlError),

    #[error("Failed to write document: {0}")]
    Write(#[from] XmlWriteError),

    #[error("Failed to read document: {0}")]
    Io(#[from] std::io::Error),

    #[error("Document too large: {size} bytes (max {max} bytes)")]
    TooLarge { size: u64, max: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Atom,
    /// RSS 2.0 (`<rss><channel>`).
    Rss,
    /// RSS 1.0 (`<rdf:RDF>`).
    Rdf,
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentFormat::Atom => f.write_str("Atom"),
            DocumentFormat::Rss => f.write_str("RSS 2.0"),
            DocumentFormat::Rdf => f.write_str("RSS 1.0"),
        }
    }
}

impl DocumentFormat {
    fn detect(root: &XmlNavigator<'_>) -> Option<Self> {
        match root.local_name() {
            "feed" => Some(DocumentFormat::Atom),
            "rss" => Some(DocumentFormat::Rss),
            "RDF" if root.namespace_uri() == Some(RDF_NAMESPACE) => Some(DocumentFormat::Rdf),
            _ => None,
        }
    }
}

/// A parsed feed with its extensions loaded.
#[derive(Debug)]
pub struct SyndicationDocument {
    pub format: DocumentFormat,
    pub channel: SyndicationEntity,
    pub items: Vec<SyndicationEntity>,
    /// Host-supplied types the document was loaded with, kept so that
    /// [`extension_types`](Self::extension_types) can resolve custom kinds.
    custom_types: Vec<ExtensionType>,
}

impl SyndicationDocument {
    /// An empty document of the given format.
    pub fn new(format: DocumentFormat) -> Self {
        let (channel, item) = match format {
            DocumentFormat::Atom => ("feed", "entry"),
            DocumentFormat::Rss | DocumentFormat::Rdf => ("channel", "item"),
        };
        tracing::trace!(%format, item, "Creating empty document");
        Self {
            format,
            channel: SyndicationEntity::new(channel),
            items: Vec::new(),
            custom_types: Vec::new(),
        }
    }

    /// Parses feed text and loads the extensions of the channel and every item.
    pub fn parse(content: &str, settings: &LoadSettings) -> Result<Self, DocumentError> {
        let xml = XmlDocument::parse(content)?;
        let root = xml.root();
        let format = DocumentFormat::detect(&root)
            .ok_or_else(|| DocumentError::UnrecognizedRoot(root.name()))?;

        let (channel_nav, item_navs): (XmlNavigator<'_>, Vec<XmlNavigator<'_>>) = match format {
            DocumentFormat::Atom => (
                root,
                root.children().filter(|c| c.local_name() == "entry").collect(),
            ),
            DocumentFormat::Rss => {
                let channel = root
                    .children()
                    .find(|c| c.local_name() == "channel")
                    .ok_or(DocumentError::MissingChannel(format))?;
                let items = channel.children().filter(|c| c.local_name() == "item").collect();
                (channel, items)
            }
            DocumentFormat::Rdf => {
                let channel = root
                    .children()
                    .find(|c| c.local_name() == "channel")
                    .ok_or(DocumentError::MissingChannel(format))?;
                // RSS 1.0 items are siblings of the channel.
                let items = root.children().filter(|c| c.local_name() == "item").collect();
                (channel, items)
            }
        };

        let limit = match settings.retrieval_limit {
            0 => usize::MAX,
            n => n,
        };

        let mut channel = SyndicationEntity::new(channel_nav.name());
        ExtensionAdapter::new(channel_nav, settings).fill(&mut channel);

        let items: Vec<SyndicationEntity> = item_navs
            .into_iter()
            .take(limit)
            .map(|nav| {
                let mut item = SyndicationEntity::new(nav.name());
                ExtensionAdapter::new(nav, settings).fill(&mut item);
                item
            })
            .collect();

        tracing::debug!(
            %format,
            items = items.len(),
            channel_extensions = channel.extensions().len(),
            "Loaded syndication document"
        );

        Ok(Self {
            format,
            channel,
            items,
            custom_types: settings.extension_types.clone(),
        })
    }

    /// Reads and parses a feed file, rejecting files larger than `max_size` bytes.
    pub fn load(
        path: &Path,
        settings: &LoadSettings,
        max_size: u64,
    ) -> Result<Self, DocumentError> {
        let size = std::fs::metadata(path)?.len();
        if size > max_size {
            return Err(DocumentError::TooLarge {
                size,
                max: max_size,
            });
        }
        let content = std::fs::read_to_string(path)?;
        tracing::debug!(path = %path.display(), size, "Read feed file");
        Self::parse(&content, settings)
    }

    /// The channel followed by every item.
    pub fn entities(&self) -> impl Iterator<Item = &SyndicationEntity> {
        std::iter::once(&self.channel).chain(self.items.iter())
    }

    /// Distinct extension types used anywhere in the document, first-seen order.
    pub fn extension_types(&self) -> Vec<ExtensionType> {
        let mut types: Vec<ExtensionType> = Vec::new();
        for kind in self.entities().flat_map(|e| e.extensions().kinds()) {
            if types.iter().any(|t| t.kind() == kind) {
                continue;
            }
            let ty = catalog::find(kind)
                .cloned()
                .or_else(|| self.custom_types.iter().find(|t| t.kind() == kind).cloned());
            match ty {
                Some(ty) => types.push(ty),
                None => tracing::warn!(kind = %kind, "No registered type for extension kind"),
            }
        }
        types
    }

    /// Writes the document's extensions as a skeleton feed.
    ///
    /// The root element declares the namespace of every extension type in
    /// use, so the entity elements below it carry no declarations of their own.
    pub fn to_xml(&self) -> Result<String, DocumentError> {
        let mut writer = XmlWriter::new();
        writer.write_declaration()?;

        match self.format {
            DocumentFormat::Atom => {
                writer.start_element(None, "feed", Some(ATOM_NAMESPACE))?;
                serialize::write_namespace_declarations(&self.extension_types(), &mut writer)?;
                serialize::write_all(self.channel.extensions(), &mut writer)?;
                self.write_items(&mut writer, "entry")?;
                writer.end_element()?;
            }
            DocumentFormat::Rss => {
                writer.start_element(None, "rss", None)?;
                writer.attribute("version", "2.0")?;
                serialize::write_namespace_declarations(&self.extension_types(), &mut writer)?;
                writer.start_element(None, "channel", None)?;
                serialize::write_all(self.channel.extensions(), &mut writer)?;
                self.write_items(&mut writer, "item")?;
                writer.end_element()?;
                writer.end_element()?;
            }
            DocumentFormat::Rdf => {
                writer.start_element(Some("rdf"), "RDF", Some(RDF_NAMESPACE))?;
                writer.namespace_declaration("", RSS1_NAMESPACE)?;
                serialize::write_namespace_declarations(&self.extension_types(), &mut writer)?;
                writer.start_element(None, "channel", None)?;
                serialize::write_all(self.channel.extensions(), &mut writer)?;
                writer.end_element()?;
                self.write_items(&mut writer, "item")?;
                writer.end_element()?;
            }
        }

        Ok(writer.finish()?)
    }

    fn write_items(&self, writer: &mut XmlWriter, element: &str) -> Result<(), XmlWriteError> {
        for item in &self.items {
            writer.start_element(None, element, None)?;
            serialize::write_all(item.extensions(), writer)?;
            writer.end_element()?;
        }
        Ok(())
    }
}
