//! Hierarchical rollup reports over click records.
//!
//! A report is a tree with one level per requested [`Dimension`]. Every node
//! counts the clicks whose path passes through it, so a node's `sum` equals
//! the sum of its children's. The root carries no counter of its own.
//!
//! # JSON shape
//!
//! ```json
//! {
//!   "1.2.3.4": { "sum": 2, "groups": { "10:30": { "sum": 2 } } },
//!   "5.6.7.8": { "sum": 1, "groups": { "10:31": { "sum": 1 } } }
//! }
//! ```
//!
//! The counter is a structural field next to `groups`, so a grouping value
//! that happens to be the literal `"sum"` cannot clobber it. Leaves omit
//! `groups`. Keys come out sorted, though callers should not rely on order.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::domain::dimension::Dimension;
use crate::domain::entities::{ParentRecord, Record};

/// One grouping node: the count of clicks through it and its sub-groups.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportNode {
    pub sum: u64,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub groups: BTreeMap<String, ReportNode>,
}

impl ReportNode {
    pub fn group(&self, key: &str) -> Option<&ReportNode> {
        self.groups.get(key)
    }
}

/// Root of a rollup tree, keyed by first-level grouping values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Report {
    groups: BTreeMap<String, ReportNode>,
}

impl Report {
    pub fn groups(&self) -> &BTreeMap<String, ReportNode> {
        &self.groups
    }

    pub fn group(&self, key: &str) -> Option<&ReportNode> {
        self.groups.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Number of clicks counted in the report (sum of first-level groups).
    pub fn total(&self) -> u64 {
        self.groups.values().map(|node| node.sum).sum()
    }
}

/// Builds a rollup tree from a record snapshot.
///
/// Orphan clicks (`parent_id == 0`) are excluded, as are clicks whose parent
/// id does not resolve to a stored [`ParentRecord`]. Dimensions are applied
/// root-to-leaf in the given order and may repeat.
pub fn build_report(dimensions: &[Dimension], records: &[Record]) -> Report {
    let parents: HashMap<u64, &ParentRecord> = records
        .iter()
        .filter_map(Record::as_parent)
        .map(|parent| (parent.id, parent))
        .collect();

    let mut report = Report::default();
    let mut dangling = 0usize;

    for click in records.iter().filter_map(Record::as_child) {
        if click.is_orphan() {
            continue;
        }
        let Some(parent) = parents.get(&click.parent_id) else {
            dangling += 1;
            continue;
        };

        let mut level = &mut report.groups;
        for dimension in dimensions {
            let node = level
                .entry(dimension.value_of(click, parent))
                .or_default();
            node.sum += 1;
            level = &mut node.groups;
        }
    }

    if dangling > 0 {
        tracing::warn!(
            clicks = dangling,
            "Clicks reference missing parent records, skipped"
        );
    }

    report
}
