use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset};
use semver::Version;

use super::{child_datetime, child_number, child_text, write_datetime, write_text};
use crate::extension::{ExtensionDescriptor, ExtensionKind, SyndicationExtension};
use crate::xml::{XmlNavigator, XmlWriteError, XmlWriter};

static DESCRIPTOR: ExtensionDescriptor = ExtensionDescriptor::from_static(
    "sy",
    "http://purl.org/rss/1.0/modules/syndication/",
    Version::new(1, 0, 0),
    "RDF Site Summary Syndication",
    Some("How often a feed is expected to update."),
    Some("http://web.resource.org/rss/1.0/modules/syndication/"),
);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdatePeriod {
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl UpdatePeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            UpdatePeriod::Hourly => "hourly",
            UpdatePeriod::Daily => "daily",
            UpdatePeriod::Weekly => "weekly",
            UpdatePeriod::Monthly => "monthly",
            UpdatePeriod::Yearly => "yearly",
        }
    }
}

impl fmt::Display for UpdatePeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UpdatePeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hourly" => Ok(UpdatePeriod::Hourly),
            "daily" => Ok(UpdatePeriod::Daily),
            "weekly" => Ok(UpdatePeriod::Weekly),
            "monthly" => Ok(UpdatePeriod::Monthly),
            "yearly" => Ok(UpdatePeriod::Yearly),
            other => Err(format!("unknown update period: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SiteSummaryUpdateContext {
    pub period: Option<UpdatePeriod>,
    /// Updates per period.
    pub frequency: Option<u32>,
    /// Reference point for computing update times.
    pub base: Option<DateTime<FixedOffset>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SiteSummaryUpdateExtension {
    pub context: SiteSummaryUpdateContext,
}

impl SyndicationExtension for SiteSummaryUpdateExtension {
    fn kind(&self) -> ExtensionKind {
        ExtensionKind::SiteSummaryUpdate
    }

    fn descriptor(&self) -> &ExtensionDescriptor {
        &DESCRIPTOR
    }

    fn load(&mut self, source: &XmlNavigator<'_>) -> bool {
        let d = &DESCRIPTOR;
        let period = child_text(source, d, "updatePeriod").and_then(|v| {
            v.parse::<UpdatePeriod>()
                .map_err(|e: String| tracing::warn!(error = %e, "Ignoring sy:updatePeriod"))
                .ok()
        });
        self.context = SiteSummaryUpdateContext {
            period,
            frequency: child_number(source, d, "updateFrequency"),
            base: child_datetime(source, d, "updateBase"),
        };
        self.context != SiteSummaryUpdateContext::default()
    }

    fn write_to(&self, writer: &mut XmlWriter) -> Result<(), XmlWriteError> {
        let c = &self.context;
        let d = &DESCRIPTOR;
        write_text(writer, d, "updatePeriod", c.period.map(|p| p.as_str()))?;
        let frequency = c.frequency.map(|n| n.to_string());
        write_text(writer, d, "updateFrequency", frequency.as_deref())?;
        write_datetime(writer, d, "updateBase", c.base.as_ref())?;
        Ok(())
    }

    impl_extension_basics!();
}
