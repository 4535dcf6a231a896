use semver::Version;
use url::Url;

use super::{child_url, write_text};
use crate::extension::{ExtensionDescriptor, ExtensionKind, SyndicationExtension};
use crate::xml::{XmlNavigator, XmlWriteError, XmlWriter};

static DESCRIPTOR: ExtensionDescriptor = ExtensionDescriptor::from_static(
    "wfw",
    "http://wellformedweb.org/CommentAPI/",
    Version::new(1, 0, 0),
    "Well-Formed Web Comment API",
    Some("Comment posting endpoint and per-item comment feed."),
    Some("http://wellformedweb.org/news/wfw_namespace_elements/"),
);

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WellFormedWebContext {
    /// Endpoint accepting new comments.
    pub comment: Option<Url>,
    /// Feed of the item's comments (`wfw:commentRss`).
    pub comment_rss: Option<Url>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WellFormedWebExtension {
    pub context: WellFormedWebContext,
}

impl SyndicationExtension for WellFormedWebExtension {
    fn kind(&self) -> ExtensionKind {
        ExtensionKind::WellFormedWeb
    }

    fn descriptor(&self) -> &ExtensionDescriptor {
        &DESCRIPTOR
    }

    fn load(&mut self, source: &XmlNavigator<'_>) -> bool {
        self.context.comment = child_url(source, &DESCRIPTOR, "comment");
        self.context.comment_rss = child_url(source, &DESCRIPTOR, "commentRss");
        self.context != WellFormedWebContext::default()
    }

    fn write_to(&self, writer: &mut XmlWriter) -> Result<(), XmlWriteError> {
        let c = &self.context;
        write_text(writer, &DESCRIPTOR, "comment", c.comment.as_ref().map(Url::as_str))?;
        write_text(writer, &DESCRIPTOR, "commentRss", c.comment_rss.as_ref().map(Url::as_str))?;
        Ok(())
    }

    impl_extension_basics!();
}
