//! Report grouping dimensions.

use std::fmt;

use crate::domain::entities::{ChildRecord, ParentRecord};

/// One grouping axis of a rollup report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    /// Origin address of the click.
    SourceIp,
    /// Time of day of the click (`HH:MM`).
    TimeInterval,
    /// Destination URL with its short code.
    Destination,
}

impl Dimension {
    /// Parses a dimension by its wire name. Unknown names yield `None`.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "SourceIP" => Some(Self::SourceIp),
            "TimeInterval" => Some(Self::TimeInterval),
            "Destination" => Some(Self::Destination),
            _ => None,
        }
    }

    /// Wire name of the dimension.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SourceIp => "SourceIP",
            Self::TimeInterval => "TimeInterval",
            Self::Destination => "Destination",
        }
    }

    /// Grouping key of `click` along this dimension.
    pub fn value_of(&self, click: &ChildRecord, parent: &ParentRecord) -> String {
        match self {
            Self::SourceIp => click.source_ip.clone(),
            Self::TimeInterval => click.time_of_day().to_string(),
            Self::Destination => parent.destination_label(),
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolves requested names into dimensions, keeping order and repeats.
///
/// Unrecognized names are dropped, which makes the resulting tree flatter
/// than requested rather than failing the request.
pub fn parse_dimensions<S: AsRef<str>>(names: &[S]) -> Vec<Dimension> {
    names
        .iter()
        .filter_map(|name| {
            let parsed = Dimension::parse(name.as_ref());
            if parsed.is_none() {
                tracing::debug!("Ignoring unknown report dimension '{}'", name.as_ref());
            }
            parsed
        })
        .collect()
}
