use std::fmt;
use std::str::FromStr;

use semver::Version;

use super::{child_number, child_text, write_text};
use crate::extension::{ExtensionDescriptor, ExtensionKind, SyndicationExtension};
use crate::xml::{XmlNavigator, XmlWriteError, XmlWriter};

static DESCRIPTOR: ExtensionDescriptor = ExtensionDescriptor::from_static(
    "lj",
    "http://www.livejournal.org/rss/lj/1.0/",
    Version::new(1, 0, 0),
    "LiveJournal",
    Some("Journal entry mood, music, security level and reply count."),
    None,
);

/// Visibility of a journal entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Security {
    Public,
    Private,
    /// Visible to a custom friends group.
    UseMask,
}

impl Security {
    pub fn as_str(&self) -> &'static str {
        match self {
            Security::Public => "public",
            Security::Private => "private",
            Security::UseMask => "usemask",
        }
    }
}

impl fmt::Display for Security {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Security {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "public" => Ok(Security::Public),
            "private" => Ok(Security::Private),
            "usemask" => Ok(Security::UseMask),
            other => Err(format!("unknown security level: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LiveJournalContext {
    pub mood: Option<String>,
    pub music: Option<String>,
    pub security: Option<Security>,
    /// From `lj:reply-count`.
    pub reply_count: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LiveJournalExtension {
    pub context: LiveJournalContext,
}

impl SyndicationExtension for LiveJournalExtension {
    fn kind(&self) -> ExtensionKind {
        ExtensionKind::LiveJournal
    }

    fn descriptor(&self) -> &ExtensionDescriptor {
        &DESCRIPTOR
    }

    fn load(&mut self, source: &XmlNavigator<'_>) -> bool {
        let d = &DESCRIPTOR;
        let security = child_text(source, d, "security").and_then(|v| {
            v.parse::<Security>()
                .map_err(|e: String| tracing::warn!(error = %e, "Ignoring lj:security"))
                .ok()
        });
        self.context = LiveJournalContext {
            mood: child_text(source, d, "mood"),
            music: child_text(source, d, "music"),
            security,
            reply_count: child_number(source, d, "reply-count"),
        };
        self.context != LiveJournalContext::default()
    }

    fn write_to(&self, writer: &mut XmlWriter) -> Result<(), XmlWriteError> {
        let c = &self.context;
        let d = &DESCRIPTOR;
        write_text(writer, d, "mood", c.mood.as_deref())?;
        write_text(writer, d, "music", c.music.as_deref())?;
        write_text(writer, d, "security", c.security.map(|s| s.as_str()))?;
        let replies = c.reply_count.map(|n| n.to_string());
        write_text(writer, d, "reply-count", replies.as_deref())?;
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
        let (ext, found) = load_from::<LiveJournalExtension>(
            r#"<item xmlns:lj="http://www.livejournal.org/rss/lj/1.0/">
  <lj:mood>content</lj:mood>
  <lj:music>Boards of Canada</lj:music>
  <lj:security>UseMask</lj:security>
  <lj:reply-count>12</lj:reply-count>
</item>"#,
        );
        assert!(found);
        assert_eq!(ext.context.mood.as_deref(), Some("content"));
        assert_eq!(ext.context.security, Some(Security::UseMask));
        assert_eq!(ext.context.reply_count, Some(12));
    }

    #[test]
    fn test_security_parse() {
        assert_eq!("public".parse::<Security>(), Ok(Security::Public));
        assert_eq!(" PRIVATE ".parse::<Security>(), Ok(Security::Private));
        assert!("friends".parse::<Security>().is_err());
    }

    #[test]
    fn test_round_trip() {
        let mut ext = LiveJournalExtension::default();
        ext.context.music = Some("Song".into());
        ext.context.security = Some(Security::Public);
        ext.context.reply_count = Some(3);
        let (loaded, found) = round_trip(&ext);
        assert!(found);
        assert_eq!(loaded, ext);
    }
}
