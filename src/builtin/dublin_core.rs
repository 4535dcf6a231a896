use chrono::{DateTime, FixedOffset};
use semver::Version;

use super::{child_datetime, child_text, write_datetime, write_text};
use crate::extension::{ExtensionDescriptor, ExtensionKind, SyndicationExtension};
use crate::xml::{XmlNavigator, XmlWriteError, XmlWriter};

static DESCRIPTOR: ExtensionDescriptor = ExtensionDescriptor::from_static(
    "dc",
    "http://purl.org/dc/elements/1.1/",
    Version::new(1, 1, 0),
    "Dublin Core Metadata Element Set",
    Some("Fifteen generic elements for describing resources."),
    Some("http://dublincore.org/documents/dces/"),
);

/// The fifteen Dublin Core elements.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DublinCoreContext {
    pub title: Option<String>,
    pub creator: Option<String>,
    pub subject: Option<String>,
    pub description: Option<String>,
    pub publisher: Option<String>,
    pub contributor: Option<String>,
    pub date: Option<DateTime<FixedOffset>>,
    pub type_: Option<String>,
    pub format: Option<String>,
    pub identifier: Option<String>,
    pub source: Option<String>,
    pub language: Option<String>,
    pub relation: Option<String>,
    pub coverage: Option<String>,
    pub rights: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DublinCoreExtension {
    pub context: DublinCoreContext,
}

impl SyndicationExtension for DublinCoreExtension {
    fn kind(&self) -> ExtensionKind {
        ExtensionKind::DublinCore
    }

    fn descriptor(&self) -> &ExtensionDescriptor {
        &DESCRIPTOR
    }

    fn load(&mut self, source: &XmlNavigator<'_>) -> bool {
        let d = &DESCRIPTOR;
        let text = |name: &str| child_text(source, d, name);

        self.context = DublinCoreContext {
            title: text("title"),
            creator: text("creator"),
            subject: text("subject"),
            description: text("description"),
            publisher: text("publisher"),
            contributor: text("contributor"),
            date: child_datetime(source, d, "date"),
            type_: text("type"),
            format: text("format"),
            identifier: text("identifier"),
            source: text("source"),
            language: text("language"),
            relation: text("relation"),
            coverage: text("coverage"),
            rights: text("rights"),
        };
        self.context != DublinCoreContext::default()
    }

    fn write_to(&self, writer: &mut XmlWriter) -> Result<(), XmlWriteError> {
        let c = &self.context;
        let d = &DESCRIPTOR;
        write_text(writer, d, "title", c.title.as_deref())?;
        write_text(writer, d, "creator", c.creator.as_deref())?;
        write_text(writer, d, "subject", c.subject.as_deref())?;
        write_text(writer, d, "description", c.description.as_deref())?;
        write_text(writer, d, "publisher", c.publisher.as_deref())?;
        write_text(writer, d, "contributor", c.contributor.as_deref())?;
        write_datetime(writer, d, "date", c.date.as_ref())?;
        write_text(writer, d, "type", c.type_.as_deref())?;
        write_text(writer, d, "format", c.format.as_deref())?;
        write_text(writer, d, "identifier", c.identifier.as_deref())?;
        write_text(writer, d, "source", c.source.as_deref())?;
        write_text(writer, d, "language", c.language.as_deref())?;
        write_text(writer, d, "relation", c.relation.as_deref())?;
        write_text(writer, d, "coverage", c.coverage.as_deref())?;
        write_text(writer, d, "rights", c.rights.as_deref())?;
        Ok(())
    }

    impl_extension_basics!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::{load_from, round_trip};
    use crate::util::parse_datetime;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn test_load_fields() {
        let (dc, found) = load_from::<DublinCoreExtension>(
            r#"<item xmlns:dc="http://purl.org/dc/elements/1.1/">
  <dc:title> Release notes </dc:title>
  <dc:creator>Jane Doe</dc:creator>
  <dc:date>2024-05-01T08:00:00Z</dc:date>
  <dc:language>en</dc:language>
  <title>Not Dublin Core</title>
</item>"#,
        );
        assert!(found);
        assert_eq!(dc.context.title.as_deref(), Some("Release notes"));
        assert_eq!(dc.context.creator.as_deref(), Some("Jane Doe"));
        assert_eq!(dc.context.language.as_deref(), Some("en"));
        assert_eq!(dc.context.date, parse_datetime("2024-05-01T08:00:00Z"));
        assert!(dc.context.rights.is_none());
    }

    #[test]
    fn test_declared_but_absent_reports_not_found() {
        let (dc, found) = load_from::<DublinCoreExtension>(
            r#"<item xmlns:dc="http://purl.org/dc/elements/1.1/"><title>x</title></item>"#,
        );
        assert!(!found);
        assert_eq!(dc, DublinCoreExtension::default());
    }

    #[test]
    fn test_blank_elements_are_ignored() {
        let (_, found) = load_from::<DublinCoreExtension>(
            r#"<item xmlns:dc="http://purl.org/dc/elements/1.1/"><dc:title>  </dc:title></item>"#,
        );
        assert!(!found);
    }

    #[test]
    fn test_default_context_writes_nothing() {
        let mut w = XmlWriter::compact();
        w.start_element(None, "item", None).unwrap();
        DublinCoreExtension::default().write_to(&mut w).unwrap();
        w.end_element().unwrap();
        assert_eq!(w.finish().unwrap(), "<item/>");
    }

    #[test]
    fn test_round_trip_all_fields() {
        let mut dc = DublinCoreExtension::default();
        dc.context = DublinCoreContext {
            title: Some("T".into()),
            creator: Some("C".into()),
            subject: Some("S".into()),
            description: Some("D & more".into()),
            publisher: Some("P".into()),
            contributor: Some("Co".into()),
            date: parse_datetime("2020-01-02T03:04:05+01:00"),
            type_: Some("Text".into()),
            format: Some("text/html".into()),
            identifier: Some("urn:x".into()),
            source: Some("Src".into()),
            language: Some("fr".into()),
            relation: Some("R".into()),
            coverage: Some("Cov".into()),
            rights: Some("CC0".into()),
        };
        let (loaded, found) = round_trip(&dc);
        assert!(found);
        assert_eq!(loaded, dc);
    }

    proptest! {
        #[test]
        fn prop_round_trip_text_fields(
            title in proptest::option::of("[A-Za-z0-9<>&\" ]*[A-Za-z0-9]"),
            creator in proptest::option::of("[A-Za-z]{1,12}"),
            rights in proptest::option::of("[ -~]*[!-~]"),
        ) {
            let mut dc = DublinCoreExtension::default();
            dc.context.title = title.map(|t| t.trim().to_string()).filter(|t| !t.is_empty());
            dc.context.creator = creator;
            dc.context.rights = rights.map(|r| r.trim().to_string()).filter(|r| !r.is_empty());

            let (loaded, _) = round_trip(&dc);
            prop_assert_eq!(loaded, dc);
        }
    }
}
