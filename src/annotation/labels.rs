//! Label preset shared by all tilings

use crate::io::error::{DatasetError, Result, file_system};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A named label with its display color
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    /// Unique label name
    pub name: String,
    /// RGB display color
    pub color: [u8; 3],
}

impl Label {
    /// Create a label
    pub fn new(name: impl Into<String>, color: [u8; 3]) -> Self {
        Self {
            name: name.into(),
            color,
        }
    }
}

/// The list of known labels, kept sorted by name once saved
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelPreset {
    labels: Vec<Label>,
}

impl LabelPreset {
    /// Create a preset from labels, sorted by name
    pub fn new(mut labels: Vec<Label>) -> Self {
        labels.sort_by(|a, b| a.name.cmp(&b.name));
        Self { labels }
    }

    /// Load the preset; a missing or malformed file yields an empty preset
    pub fn load(path: &Path) -> Self {
        match Self::read(path) {
            Ok(preset) => preset,
            Err(DatasetError::FileSystem { source, .. })
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                Self::default()
            }
            Err(error) => {
                log::warn!("{error}; starting with no labels");
                Self::default()
            }
        }
    }

    /// Strictly read a preset file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a label list
    pub fn read(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| file_system(path, "read", e))?;
        let labels: Vec<Label> =
            serde_json::from_str(&text).map_err(|e| DatasetError::Serialization {
                path: path.to_path_buf(),
                source: e,
            })?;
        Ok(Self { labels })
    }

    /// Write the preset sorted by name
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory or the file cannot be written
    pub fn save(&mut self, path: &Path) -> Result<()> {
        self.labels.sort_by(|a, b| a.name.cmp(&b.name));
        let text =
            serde_json::to_string_pretty(&self.labels).map_err(|e| DatasetError::Serialization {
                path: path.to_path_buf(),
                source: e,
            })?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| file_system(parent, "create directory", e))?;
        }
        std::fs::write(path, text).map_err(|e| file_system(path, "write", e))
    }

    /// Insert a label, replacing any label of the same name
    ///
    /// Returns the label's index in the sorted preset.
    pub fn add(&mut self, label: Label) -> usize {
        if let Some(existing) = self.labels.iter_mut().find(|l| l.name == label.name) {
            *existing = label.clone();
        } else {
            self.labels.push(label.clone());
        }
        self.labels.sort_by(|a, b| a.name.cmp(&b.name));
        self.labels
            .iter()
            .position(|l| l.name == label.name)
            .unwrap_or_default()
    }

    /// Look up a label by name
    pub fn get(&self, name: &str) -> Option<&Label> {
        self.labels.iter().find(|l| l.name == name)
    }

    /// All labels in preset order
    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// All label names in preset order
    pub fn names(&self) -> Vec<&str> {
        self.labels.iter().map(|l| l.name.as_str()).collect()
    }

    /// Names sharing a prefix with `text`, longest shared prefix first
    ///
    /// Ties are ordered by name; names sharing nothing are left out.
    pub fn autocomplete(&self, text: &str) -> Vec<&str> {
        let mut candidates: Vec<(usize, &str)> = self
            .labels
            .iter()
            .map(|l| (shared_prefix_len(text, &l.name), l.name.as_str()))
            .filter(|&(shared, _)| shared > 0)
            .collect();

        candidates.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(b.1)));
        candidates.into_iter().map(|(_, name)| name).collect()
    }
}

fn shared_prefix_len(a: &str, b: &str) -> usize {
    a.chars().zip(b.chars()).take_while(|(x, y)| x == y).count()
}
