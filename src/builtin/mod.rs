//! Built-in extension kinds.
//!
//! Each kind pairs a static [`ExtensionDescriptor`](crate::extension::ExtensionDescriptor)
//! with a context struct holding its fields. Loading reads the direct
//! children of the entity element; writing skips every field still at its
//! default.

macro_rules! impl_extension_basics {
    () => {
        fn create_default(&self) -> Box<dyn crate::extension::SyndicationExtension> {
            Box::new(Self::default())
        }

        fn as_any(&self) -> &dyn std::any::Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
            self
        }
    };
}

mod creative_commons;
mod dublin_core;
mod feed_sync;
mod live_journal;
mod pheed;
mod pingback;
mod simple_list;
mod site_summary_content;
mod site_summary_update;
mod slash;
mod trackback;
mod well_formed_web;

pub use creative_commons::{CreativeCommonsContext, CreativeCommonsExtension};
pub use dublin_core::{DublinCoreContext, DublinCoreExtension};
pub use feed_sync::{FeedSyncContext, FeedSyncExtension, SyncHistory, SyncItem, SyncSharing};
pub use live_journal::{LiveJournalContext, LiveJournalExtension, Security};
pub use pheed::{PheedContext, PheedExtension};
pub use pingback::{PingbackContext, PingbackExtension};
pub use simple_list::{GroupProperty, SimpleListContext, SimpleListExtension, SortProperty};
pub use site_summary_content::{SiteSummaryContentContext, SiteSummaryContentExtension};
pub use site_summary_update::{SiteSummaryUpdateContext, SiteSummaryUpdateExtension, UpdatePeriod};
pub use slash::{SlashContext, SlashExtension};
pub use trackback::{TrackbackContext, TrackbackExtension};
pub use well_formed_web::{WellFormedWebContext, WellFormedWebExtension};

use chrono::{DateTime, FixedOffset};
use std::str::FromStr;
use url::Url;

use crate::extension::ExtensionDescriptor;
use crate::util::{format_datetime, parse_datetime};
use crate::xml::{XmlNavigator, XmlWriteError, XmlWriter};

/// Trimmed text of the first `local_name` child in the descriptor's namespace.
fn child_text(
    source: &XmlNavigator<'_>,
    descriptor: &ExtensionDescriptor,
    local_name: &str,
) -> Option<String> {
    source
        .child(local_name, Some(descriptor.namespace()))
        .and_then(|n| n.text())
}

fn parse_url(value: &str, field: &str) -> Option<Url> {
    match Url::parse(value.trim()) {
        Ok(url) => Some(url),
        Err(e) => {
            tracing::warn!(field, value, error = %e, "Ignoring invalid URL in extension");
            None
        }
    }
}

fn child_url(
    source: &XmlNavigator<'_>,
    descriptor: &ExtensionDescriptor,
    local_name: &str,
) -> Option<Url> {
    child_text(source, descriptor, local_name).and_then(|v| parse_url(&v, local_name))
}

fn child_datetime(
    source: &XmlNavigator<'_>,
    descriptor: &ExtensionDescriptor,
    local_name: &str,
) -> Option<DateTime<FixedOffset>> {
    let value = child_text(source, descriptor, local_name)?;
    let parsed = parse_datetime(&value);
    if parsed.is_none() {
        tracing::warn!(field = local_name, value = %value, "Ignoring unparsable date in extension");
    }
    parsed
}

fn parse_number<T: FromStr>(value: &str, field: &str) -> Option<T> {
    match value.trim().parse() {
        Ok(n) => Some(n),
        Err(_) => {
            tracing::warn!(field, value, "Ignoring non-numeric value in extension");
            None
        }
    }
}

fn child_number<T: FromStr>(
    source: &XmlNavigator<'_>,
    descriptor: &ExtensionDescriptor,
    local_name: &str,
) -> Option<T> {
    child_text(source, descriptor, local_name).and_then(|v| parse_number(&v, local_name))
}

/// Writes `<prefix:local_name>value</prefix:local_name>` when `value` is set.
fn write_text(
    writer: &mut XmlWriter,
    descriptor: &ExtensionDescriptor,
    local_name: &str,
    value: Option<&str>,
) -> Result<(), XmlWriteError> {
    match value {
        Some(value) if !value.is_empty() => writer.element_text(
            Some(descriptor.prefix()),
            local_name,
            Some(descriptor.namespace()),
            value,
        ),
        _ => Ok(()),
    }
}

fn write_datetime(
    writer: &mut XmlWriter,
    descriptor: &ExtensionDescriptor,
    local_name: &str,
    value: Option<&DateTime<FixedOffset>>,
) -> Result<(), XmlWriteError> {
    let formatted = value.map(format_datetime);
    write_text(writer, descriptor, local_name, formatted.as_deref())
}

/// Writes `extension` inside an `<item>` element, then loads a fresh `T` from it.
#[cfg(test)]
pub(crate) fn round_trip<T>(extension: &T) -> (T, bool)
where
    T: crate::extension::SyndicationExtension + Default,
{
    let mut writer = XmlWriter::new();
    writer.start_element(None, "item", None).unwrap();
    extension.write_to(&mut writer).unwrap();
    writer.end_element().unwrap();
    let xml = writer.finish().unwrap();

    let doc = crate::xml::XmlDocument::parse(&xml).unwrap();
    let mut loaded = T::default();
    let found = loaded.load(&doc.root());
    (loaded, found)
}

/// Loads a fresh `T` from the root element of `xml`.
#[cfg(test)]
pub(crate) fn load_from<T>(xml: &str) -> (T, bool)
where
    T: crate::extension::SyndicationExtension + Default,
{
    let doc = crate::xml::XmlDocument::parse(xml).unwrap();
    let mut loaded = T::default();
    let found = loaded.load(&doc.root());
    (loaded, found)
}
