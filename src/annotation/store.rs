//! Per-tiling tile annotations
//!
//! Ignored and labeled tiles are edited by hand. Duplicate tiles are only
//! ever written by a compile pass and are read-only everywhere else.

use crate::io::configuration::{LABEL_SEPARATOR, UNDEFINED_LABEL};
use crate::spatial::lattice::LatticePos;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Result of flipping a tile's ignore state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreToggle {
    /// The tile is now ignored
    Ignored,
    /// The tile is included again
    Included,
    /// The tile is a known duplicate; ignore state cannot be edited
    Rejected,
}

impl IgnoreToggle {
    /// New ignore state, or `None` when the toggle was rejected
    pub const fn new_state(self) -> Option<bool> {
        match self {
            Self::Ignored => Some(true),
            Self::Included => Some(false),
            Self::Rejected => None,
        }
    }
}

/// Ignore, duplicate and label sets of one tiling
///
/// Empty sets are omitted when serialized and empty label entries are
/// dropped when deserialized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileAnnotations {
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    ignore: BTreeSet<LatticePos>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    duplicates: BTreeSet<LatticePos>,
    #[serde(
        default,
        skip_serializing_if = "BTreeMap::is_empty",
        deserialize_with = "non_empty_labels"
    )]
    labels: BTreeMap<String, BTreeSet<LatticePos>>,
}

fn non_empty_labels<'de, D>(
    deserializer: D,
) -> std::result::Result<BTreeMap<String, BTreeSet<LatticePos>>, D::Error>
where
    D: Deserializer<'de>,
{
    let mut labels = BTreeMap::<String, BTreeSet<LatticePos>>::deserialize(deserializer)?;
    labels.retain(|_, positions| !positions.is_empty());
    Ok(labels)
}

impl TileAnnotations {
    /// Whether the tile is excluded by hand
    pub fn is_ignored(&self, pos: LatticePos) -> bool {
        self.ignore.contains(&pos)
    }

    /// Whether a compile pass found the tile to be a duplicate
    pub fn is_duplicate(&self, pos: LatticePos) -> bool {
        self.duplicates.contains(&pos)
    }

    /// Ignored positions
    pub const fn ignored(&self) -> &BTreeSet<LatticePos> {
        &self.ignore
    }

    /// Duplicate positions
    pub const fn duplicates(&self) -> &BTreeSet<LatticePos> {
        &self.duplicates
    }

    /// Label name to positions map
    pub const fn labels(&self) -> &BTreeMap<String, BTreeSet<LatticePos>> {
        &self.labels
    }

    /// Flip the ignore state of a tile
    ///
    /// Duplicate tiles are rejected and left unchanged.
    pub fn toggle_ignore(&mut self, pos: LatticePos) -> IgnoreToggle {
        let next = !self.is_ignored(pos);
        match self.set_ignore(pos, next) {
            None => IgnoreToggle::Rejected,
            Some(_) if next => IgnoreToggle::Ignored,
            Some(_) => IgnoreToggle::Included,
        }
    }

    /// Force the ignore state of a tile, as done while painting over tiles
    ///
    /// Returns `None` for duplicate tiles, otherwise whether anything changed.
    pub fn set_ignore(&mut self, pos: LatticePos, ignored: bool) -> Option<bool> {
        if self.is_duplicate(pos) {
            return None;
        }

        Some(if ignored {
            self.ignore.insert(pos)
        } else {
            self.ignore.remove(&pos)
        })
    }

    /// Add or remove a label from a tile
    ///
    /// A label whose last position is removed disappears. Returns whether
    /// anything changed.
    pub fn assign_label(&mut self, pos: LatticePos, label: &str, remove: bool) -> bool {
        if remove {
            let Some(positions) = self.labels.get_mut(label) else {
                return false;
            };
            let changed = positions.remove(&pos);
            if positions.is_empty() {
                self.labels.remove(label);
            }
            changed
        } else {
            self.labels.entry(label.to_string()).or_default().insert(pos)
        }
    }

    /// Sorted names of all labels on a tile
    pub fn labels_at(&self, pos: LatticePos) -> Vec<&str> {
        // BTreeMap keys are already sorted
        self.labels
            .iter()
            .filter(|(_, positions)| positions.contains(&pos))
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Slash-joined sorted label names, or the undefined sentinel
    pub fn composite_label(&self, pos: LatticePos) -> String {
        let names = self.labels_at(pos);
        if names.is_empty() {
            UNDEFINED_LABEL.to_string()
        } else {
            names.join(LABEL_SEPARATOR)
        }
    }

    /// Replace the duplicate overlay with the output of a compile pass
    pub fn replace_duplicates(&mut self, positions: impl IntoIterator<Item = LatticePos>) {
        self.duplicates = positions.into_iter().collect();
    }

    /// Drop the duplicate overlay before a pass that recomputes it
    pub fn clear_duplicates(&mut self) {
        self.duplicates.clear();
    }

    /// One-line description of a tile for status displays
    ///
    /// `tiling_index` is zero-based and shown one-based.
    pub fn describe(&self, tiling_index: usize, pos: LatticePos) -> String {
        let mut parts = vec![format!(
            "tiling #{}, pos x={} y={}",
            tiling_index + 1,
            pos.col,
            pos.row
        )];

        if self.is_duplicate(pos) {
            parts.push("duplicate".to_string());
        }
        if self.is_ignored(pos) {
            parts.push("ignored".to_string());
        }

        let labels = self.labels_at(pos);
        if !labels.is_empty() {
            let quoted: Vec<String> = labels.iter().map(|l| format!("\"{l}\"")).collect();
            parts.push(format!("labels: {}", quoted.join(", ")));
        }

        parts.join(", ")
    }
}
