use semver::Version;
use url::Url;

use super::{parse_url, write_text};
use crate::extension::{ExtensionDescriptor, ExtensionKind, SyndicationExtension};
use crate::xml::{XmlNavigator, XmlWriteError, XmlWriter};

static DESCRIPTOR: ExtensionDescriptor = ExtensionDescriptor::from_static(
    "creativeCommons",
    "http://backend.userland.com/creativeCommonsRssModule",
    Version::new(1, 0, 0),
    "Creative Commons",
    Some("Licenses a feed or item is published under."),
    Some("http://backend.userland.com/creativeCommonsRssModule"),
);

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreativeCommonsContext {
    pub licenses: Vec<Url>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreativeCommonsExtension {
    pub context: CreativeCommonsContext,
}

impl SyndicationExtension for CreativeCommonsExtension {
    fn kind(&self) -> ExtensionKind {
        ExtensionKind::CreativeCommons
    }

    fn descriptor(&self) -> &ExtensionDescriptor {
        &DESCRIPTOR
    }

    fn load(&mut self, source: &XmlNavigator<'_>) -> bool {
        self.context.licenses = source
            .children_named("license", Some(DESCRIPTOR.namespace()))
            .filter_map(|n| n.text())
            .filter_map(|v| parse_url(&v, "license"))
            .collect();
        !self.context.licenses.is_empty()
    }

    fn write_to(&self, writer: &mut XmlWriter) -> Result<(), XmlWriteError> {
        for license in &self.context.licenses {
            write_text(writer, &DESCRIPTOR, "license", Some(license.as_str()))?;
        }
        Ok(())
    }

    impl_extension_basics!();
}
