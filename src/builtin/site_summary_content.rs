use semver::Version;

use super::child_text;
use crate::extension::{ExtensionDescriptor, ExtensionKind, SyndicationExtension};
use crate::xml::{XmlNavigator, XmlWriteError, XmlWriter};

static DESCRIPTOR: ExtensionDescriptor = ExtensionDescriptor::from_static(
    "content",
    "http://purl.org/rss/1.0/modules/content/",
    Version::new(1, 0, 0),
    "RDF Site Summary Content",
    Some("Full item content, usually entity-encoded or CDATA-wrapped HTML."),
    Some("http://web.resource.org/rss/1.0/modules/content/"),
);

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SiteSummaryContentContext {
    /// Body of `content:encoded`.
    pub encoded: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SiteSummaryContentExtension {
    pub context: SiteSummaryContentContext,
}

impl SyndicationExtension for SiteSummaryContentExtension {
    fn kind(&self) -> ExtensionKind {
        ExtensionKind::SiteSummaryContent
    }

    fn descriptor(&self) -> &ExtensionDescriptor {
        &DESCRIPTOR
    }

    fn load(&mut self, source: &XmlNavigator<'_>) -> bool {
        self.context.encoded = child_text(source, &DESCRIPTOR, "encoded");
        self.context.encoded.is_some()
    }

    fn write_to(&self, writer: &mut XmlWriter) -> Result<(), XmlWriteError> {
        match self.context.encoded.as_deref() {
            Some(encoded) if !encoded.is_empty() => {
                writer.start_element(
                    Some(DESCRIPTOR.prefix()),
                    "encoded",
                    Some(DESCRIPTOR.namespace()),
                )?;
                writer.cdata(encoded)?;
                writer.end_element()
            }
            _ => Ok(()),
        }
    }

    impl_extension_basics!();
}
