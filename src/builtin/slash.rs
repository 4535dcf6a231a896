use semver::Version;

use super::{child_number, child_text, parse_number, write_text};
use crate::extension::{ExtensionDescriptor, ExtensionKind, SyndicationExtension};
use crate::xml::{XmlNavigator, XmlWriteError, XmlWriter};

static DESCRIPTOR: ExtensionDescriptor = ExtensionDescriptor::from_static(
    "slash",
    "http://purl.org/rss/1.0/modules/slash/",
    Version::new(1, 0, 0),
    "RDF Site Summary Slash",
    Some("Slashcode-style section, department and comment statistics."),
    Some("http://web.resource.org/rss/1.0/modules/slash/"),
);

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SlashContext {
    pub section: Option<String>,
    pub department: Option<String>,
    pub comments: Option<u32>,
    /// Comment counts at each threshold, from `slash:hit_parade`.
    pub hit_parade: Vec<u32>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SlashExtension {
    pub context: SlashContext,
}

impl SyndicationExtension for SlashExtension {
    fn kind(&self) -> ExtensionKind {
        ExtensionKind::SiteSummarySlash
    }

    fn descriptor(&self) -> &ExtensionDescriptor {
        &DESCRIPTOR
    }

    fn load(&mut self, source: &XmlNavigator<'_>) -> bool {
        let d = &DESCRIPTOR;
        self.context = SlashContext {
            section: child_text(source, d, "section"),
            department: child_text(source, d, "department"),
            comments: child_number(source, d, "comments"),
            hit_parade: child_text(source, d, "hit_parade")
                .map(|v| {
                    v.split(',')
                        .filter_map(|n| parse_number(n, "hit_parade"))
                        .collect()
                })
                .unwrap_or_default(),
        };
        self.context != SlashContext::default()
    }

    fn write_to(&self, writer: &mut XmlWriter) -> Result<(), XmlWriteError> {
        let c = &self.context;
        let d = &DESCRIPTOR;
        write_text(writer, d, "section", c.section.as_deref())?;
        write_text(writer, d, "department", c.department.as_deref())?;
        let comments = c.comments.map(|n| n.to_string());
        write_text(writer, d, "comments", comments.as_deref())?;
        let hit_parade = c
            .hit_parade
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(",");
        write_text(writer, d, "hit_parade", Some(&hit_parade))?;
        Ok(())
    }

    impl_extension_basics!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::{load_from, round_trip};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_load() {
        let (ext, found) = load_from::<SlashExtension>(
            r#"<item xmlns:slash="http://purl.org/rss/1.0/modules/slash/">
  <slash:section>articles</slash:section>
  <slash:department>not-an-ocean-unless-there-are-lobsters</slash:department>
  <slash:comments>177</slash:comments>
  <slash:hit_parade>177,155,105,33,6,3,0</slash:hit_parade>
</item>"#,
        );
        assert!(found);
        assert_eq!(ext.context.section.as_deref(), Some("articles"));
        assert_eq!(ext.context.comments, Some(177));
        assert_eq!(ext.context.hit_parade, vec![177, 155, 105, 33, 6, 3, 0]);
    }

    #[test]
    fn test_bad_numbers_are_skipped() {
        let (ext, found) = load_from::<SlashExtension>(
            r#"<item xmlns:slash="http://purl.org/rss/1.0/modules/slash/">
  <slash:comments>many</slash:comments>
  <slash:hit_parade>4, x ,2</slash:hit_parade>
</item>"#,
        );
        assert!(found);
        assert_eq!(ext.context.comments, None);
        assert_eq!(ext.context.hit_parade, vec![4, 2]);
    }

    #[test]
    fn test_round_trip() {
        let mut ext = SlashExtension::default();
        ext.context.department = Some("dept".into());
        ext.context.comments = Some(0);
        ext.context.hit_parade = vec![3, 2, 1];
        let (loaded, found) = round_trip(&ext);
        assert!(found);
        assert_eq!(loaded, ext);
    }
}
