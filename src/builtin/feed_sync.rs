use chrono::{DateTime, FixedOffset};
use semver::Version;

use super::parse_number;
use crate::extension::{ExtensionDescriptor, ExtensionKind, SyndicationExtension};
use crate::util::{format_datetime, parse_datetime};
use crate::xml::{XmlNavigator, XmlWriteError, XmlWriter};

static DESCRIPTOR: ExtensionDescriptor = ExtensionDescriptor::from_static(
    "sx",
    "http://feedsync.org/2007/feedsync",
    Version::new(1, 0, 0),
    "FeedSync",
    Some("Bidirectional synchronization of items across feeds."),
    Some("http://feedsync.org/"),
);

/// Feed-level `sx:sharing` window.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncSharing {
    pub since: Option<String>,
    pub until: Option<String>,
    pub expires: Option<DateTime<FixedOffset>>,
}

/// One `sx:history` entry: an update made by an endpoint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncHistory {
    pub sequence: u32,
    pub when: Option<DateTime<FixedOffset>>,
    pub by: Option<String>,
}

/// Item-level `sx:sync` state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncItem {
    pub id: String,
    pub updates: u32,
    pub deleted: bool,
    pub no_conflicts: bool,
    /// Most recent first, as written in the feed.
    pub history: Vec<SyncHistory>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedSyncContext {
    pub sharing: Option<SyncSharing>,
    pub sync: Option<SyncItem>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedSyncExtension {
    pub context: FeedSyncContext,
}

fn parse_bool(value: Option<&str>) -> bool {
    matches!(value.map(str::trim), Some("true") | Some("1"))
}

fn load_sharing(node: &XmlNavigator<'_>) -> SyncSharing {
    SyncSharing {
        since: node.attribute("since", None).map(str::to_string),
        until: node.attribute("until", None).map(str::to_string),
        expires: node.attribute("expires", None).and_then(parse_datetime),
    }
}

fn load_sync(node: &XmlNavigator<'_>) -> Option<SyncItem> {
    let Some(id) = node.attribute("id", None).map(str::trim).filter(|id| !id.is_empty()) else {
        tracing::warn!("Ignoring sx:sync element without an id");
        return None;
    };

    let history = node
        .children_named("history", Some(DESCRIPTOR.namespace()))
        .map(|h| SyncHistory {
            sequence: h
                .attribute("sequence", None)
                .and_then(|s| parse_number(s, "sequence"))
                .unwrap_or_default(),
            when: h.attribute("when", None).and_then(parse_datetime),
            by: h.attribute("by", None).map(str::to_string),
        })
        .collect();

    Some(SyncItem {
        id: id.to_string(),
        updates: node
            .attribute("updates", None)
            .and_then(|s| parse_number(s, "updates"))
            .unwrap_or_default(),
        deleted: parse_bool(node.attribute("deleted", None)),
        no_conflicts: parse_bool(node.attribute("noconflicts", None)),
        history,
    })
}

impl SyndicationExtension for FeedSyncExtension {
    fn kind(&self) -> ExtensionKind {
        ExtensionKind::FeedSync
    }

    fn descriptor(&self) -> &ExtensionDescriptor {
        &DESCRIPTOR
    }

    fn load(&mut self, source: &XmlNavigator<'_>) -> bool {
        let ns = Some(DESCRIPTOR.namespace());
        self.context.sharing = source.child("sharing", ns).map(|n| load_sharing(&n));
        self.context.sync = source.child("sync", ns).and_then(|n| load_sync(&n));
        self.context.sharing.is_some() || self.context.sync.is_some()
    }

    fn write_to(&self, writer: &mut XmlWriter) -> Result<(), XmlWriteError> {
        let prefix = Some(DESCRIPTOR.prefix());
        let ns = Some(DESCRIPTOR.namespace());

        if let Some(sharing) = &self.context.sharing {
            writer.start_element(prefix, "sharing", ns)?;
            if let Some(since) = &sharing.since {
                writer.attribute("since", since)?;
            }
            if let Some(until) = &sharing.until {
                writer.attribute("until", until)?;
            }
            if let Some(expires) = &sharing.expires {
                writer.attribute("expires", &format_datetime(expires))?;
            }
            writer.end_element()?;
        }

        if let Some(sync) = &self.context.sync {
            writer.start_element(prefix, "sync", ns)?;
            writer.attribute("id", &sync.id)?;
            writer.attribute("updates", &sync.updates.to_string())?;
            if sync.deleted {
                writer.attribute("deleted", "true")?;
            }
            if sync.no_conflicts {
                writer.attribute("noconflicts", "true")?;
            }
            for entry in &sync.history {
                writer.start_element(prefix, "history", ns)?;
                writer.attribute("sequence", &entry.sequence.to_string())?;
                if let Some(when) = &entry.when {
                    writer.attribute("when", &format_datetime(when))?;
                }
                if let Some(by) = &entry.by {
                    writer.attribute("by", by)?;
                }
                writer.end_element()?;
            }
            writer.end_element()?;
        }
        Ok(())
    }

    impl_extension_basics!();
}
