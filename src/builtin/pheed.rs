use semver::Version;
use url::Url;

use super::{child_url, write_text};
use crate::extension::{ExtensionDescriptor, ExtensionKind, SyndicationExtension};
use crate::xml::{XmlNavigator, XmlWriteError, XmlWriter};

static DESCRIPTOR: ExtensionDescriptor = ExtensionDescriptor::from_static(
    "pheed",
    "http://www.pheed.com/pheed/",
    Version::new(1, 0, 0),
    "Pheed",
    Some("Photo feed thumbnails and image sources."),
    None,
);

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PheedContext {
    pub thumbnail: Option<Url>,
    /// Full-size image (`pheed:imgsrc`).
    pub image_source: Option<Url>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PheedExtension {
    pub context: PheedContext,
}

impl SyndicationExtension for PheedExtension {
    fn kind(&self) -> ExtensionKind {
        ExtensionKind::Pheed
    }

    fn descriptor(&self) -> &ExtensionDescriptor {
        &DESCRIPTOR
    }

    fn load(&mut self, source: &XmlNavigator<'_>) -> bool {
        self.context.thumbnail = child_url(source, &DESCRIPTOR, "thumbnail");
        self.context.image_source = child_url(source, &DESCRIPTOR, "imgsrc");
        self.context != PheedContext::default()
    }

    fn write_to(&self, writer: &mut XmlWriter) -> Result<(), XmlWriteError> {
        let c = &self.context;
        write_text(writer, &DESCRIPTOR, "thumbnail", c.thumbnail.as_ref().map(Url::as_str))?;
        write_text(writer, &DESCRIPTOR, "imgsrc", c.image_source.as_ref().map(Url::as_str))?;
        Ok(())
    }

    impl_extension_basics!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::{load_from, round_trip};

    #[test]
    fn test_load_image_source() {
        let (ext, found) = load_from::<PheedExtension>(
            r#"<item xmlns:pheed="http://www.pheed.com/pheed/">
  <pheed:imgsrc>http://example.com/full.jpg</pheed:imgsrc>
</item>"#,
        );
        assert!(found);
        assert!(ext.context.thumbnail.is_none());
        assert_eq!(
            ext.context.image_source.unwrap().as_str(),
            "http://example.com/full.jpg"
        );
    }

    #[test]
    fn test_round_trip() {
        let mut ext = PheedExtension::default();
        ext.context.thumbnail = Url::parse("http://example.com/t.jpg").ok();
        ext.context.image_source = Url::parse("http://example.com/f.jpg").ok();
        let (loaded, found) = round_trip(&ext);
        assert!(found);
        assert_eq!(loaded, ext);
    }
}
