use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::artifacts::ArtifactError;

/// One labeled row of the course catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseCatalogEntry {
    pub course_title: String,
    pub job_role: String,
}

/// Read-only table of (course_title, job_role) rows. Rows may repeat.
#[derive(Debug, Clone, Default)]
pub struct CourseCatalog {
    entries: Vec<CourseCatalogEntry>,
}

impl CourseCatalog {
    pub fn from_csv_path(path: &Path) -> Result<Self, ArtifactError> {
        let file = std::fs::File::open(path).map_err(|source| ArtifactError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_csv_reader(file).map_err(|source| ArtifactError::Csv {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parses CSV with a header row. Columns other than `course_title` and
    /// `job_role` are ignored; rows with a blank title or role are skipped.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, csv::Error> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut entries = Vec::new();
        let mut skipped = 0usize;
        for row in rdr.deserialize::<CourseCatalogEntry>() {
            let entry = row?;
            if entry.course_title.is_empty() || entry.job_role.is_empty() {
                skipped += 1;
                continue;
            }
            entries.push(entry);
        }

        if skipped > 0 {
            warn!("Skipped {skipped} catalog rows with a blank course_title or job_role");
        }

        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[cfg(test)]
    pub fn entries(&self) -> &[CourseCatalogEntry] {
        &self.entries
    }

    /// Distinct titles labeled with `role`, in table order (first occurrence wins).
    pub fn titles_for_role(&self, role: &str) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.entries
            .iter()
            .filter(|e| e.job_role == role)
            .map(|e| e.course_title.as_str())
            .filter(|title| seen.insert(*title))
            .collect()
    }

    /// Distinct roles in table order.
    pub fn roles(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.entries
            .iter()
            .map(|e| e.job_role.as_str())
            .filter(|role| seen.insert(*role))
            .collect()
    }

    #[cfg(test)]
    pub fn has_entry(&self, title: &str, role: &str) -> bool {
        self.entries
            .iter()
            .any(|e| e.course_title == title && e.job_role == role)
    }
}
