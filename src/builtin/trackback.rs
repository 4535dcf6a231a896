use semver::Version;
use url::Url;

use super::{child_url, parse_url, write_text};
use crate::extension::{ExtensionDescriptor, ExtensionKind, SyndicationExtension};
use crate::xml::{XmlNavigator, XmlWriteError, XmlWriter};

const RDF_NAMESPACE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";

static DESCRIPTOR: ExtensionDescriptor = ExtensionDescriptor::from_static(
    "trackback",
    "http://madskills.com/public/xml/rss/module/trackback/",
    Version::new(1, 0, 0),
    "Trackback",
    Some("Trackback ping endpoint of an item and the resources it pinged."),
    Some("http://madskills.com/public/xml/rss/module/trackback/"),
);

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackbackContext {
    /// Where to send trackback pings for this item.
    pub ping: Option<Url>,
    /// Trackback URLs this item has pinged.
    pub about: Vec<Url>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackbackExtension {
    pub context: TrackbackContext,
}

impl SyndicationExtension for TrackbackExtension {
    fn kind(&self) -> ExtensionKind {
        ExtensionKind::Trackback
    }

    fn descriptor(&self) -> &ExtensionDescriptor {
        &DESCRIPTOR
    }

    fn load(&mut self, source: &XmlNavigator<'_>) -> bool {
        self.context.ping = child_url(source, &DESCRIPTOR, "ping");
        // RSS 1.0 feeds carry the URL in rdf:resource, RSS 2.0 feeds as text.
        self.context.about = source
            .children_named("about", Some(DESCRIPTOR.namespace()))
            .filter_map(|node| {
                let value = node
                    .attribute("resource", Some(RDF_NAMESPACE))
                    .map(str::to_string)
                    .or_else(|| node.text())?;
                parse_url(&value, "about")
            })
            .collect();
        self.context.ping.is_some() || !self.context.about.is_empty()
    }

    fn write_to(&self, writer: &mut XmlWriter) -> Result<(), XmlWriteError> {
        let c = &self.context;
        write_text(writer, &DESCRIPTOR, "ping", c.ping.as_ref().map(Url::as_str))?;
        for about in &c.about {
            write_text(writer, &DESCRIPTOR, "about", Some(about.as_str()))?;
        }
        Ok(())
    }

    impl_extension_basics!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::{load_from, round_trip};

    #[test]
    fn test_load_rss2_text_form() {
        let (ext, found) = load_from::<TrackbackExtension>(
            r#"<item xmlns:trackback="http://madskills.com/public/xml/rss/module/trackback/">
  <trackback:ping>http://example.com/tb/1</trackback:ping>
  <trackback:about>http://other.example/tb/7</trackback:about>
  <trackback:about>http://third.example/tb/9</trackback:about>
</item>"#,
        );
        assert!(found);
        assert!(ext.context.ping.is_some());
        assert_eq!(ext.context.about.len(), 2);
    }

    #[test]
    fn test_load_rdf_resource_form() {
        let (ext, found) = load_from::<TrackbackExtension>(
            r#"<item xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
      xmlns:trackback="http://madskills.com/public/xml/rss/module/trackback/">
  <trackback:about rdf:resource="http://other.example/tb/7"/>
</item>"#,
        );
        assert!(found);
        assert_eq!(ext.context.about[0].as_str(), "http://other.example/tb/7");
    }

    #[test]
    fn test_round_trip() {
        let mut ext = TrackbackExtension::default();
        ext.context.ping = Url::parse("http://example.com/tb/1").ok();
        ext.context.about = vec![Url::parse("http://a.example/").unwrap()];
        let (loaded, found) = round_trip(&ext);
        assert!(found);
        assert_eq!(loaded, ext);
    }
}
