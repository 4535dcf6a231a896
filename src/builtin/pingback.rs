use semver::Version;
use url::Url;

use super::{child_url, write_text};
use crate::extension::{ExtensionDescriptor, ExtensionKind, SyndicationExtension};
use crate::xml::{XmlNavigator, XmlWriteError, XmlWriter};

static DESCRIPTOR: ExtensionDescriptor = ExtensionDescriptor::from_static(
    "pingback",
    "http://madskills.com/public/xml/rss/module/pingback/",
    Version::new(1, 0, 0),
    "Pingback",
    Some("Advertises the Pingback server and target for an item."),
    Some("http://madskills.com/public/xml/rss/module/pingback/"),
);

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PingbackContext {
    /// XML-RPC endpoint accepting pings for this item.
    pub server: Option<Url>,
    /// Resource being pinged.
    pub target: Option<Url>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PingbackExtension {
    pub context: PingbackContext,
}

impl SyndicationExtension for PingbackExtension {
    fn kind(&self) -> ExtensionKind {
        ExtensionKind::Pingback
    }

    fn descriptor(&self) -> &ExtensionDescriptor {
        &DESCRIPTOR
    }

    fn load(&mut self, source: &XmlNavigator<'_>) -> bool {
        self.context.server = child_url(source, &DESCRIPTOR, "server");
        self.context.target = child_url(source, &DESCRIPTOR, "target");
        self.context.server.is_some() || self.context.target.is_some()
    }

    fn write_to(&self, writer: &mut XmlWriter) -> Result<(), XmlWriteError> {
        let c = &self.context;
        write_text(writer, &DESCRIPTOR, "server", c.server.as_ref().map(Url::as_str))?;
        write_text(writer, &DESCRIPTOR, "target", c.target.as_ref().map(Url::as_str))?;
        Ok(())
    }

    impl_extension_basics!();
}
