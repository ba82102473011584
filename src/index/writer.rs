use crate::error::{MatchError, Result};
use crate::index::build::ClosestMatch;
use crate::index::types::{CandidateEntry, CandidateId};
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tempfile::NamedTempFile;
use tracing::debug;

/// Borrowed view of an index in snapshot layout.
///
/// BTreeMaps keep the JSON byte-stable for the same index.
#[derive(Serialize)]
struct SnapshotRef<'a, D> {
    substring_sizes: &'a [usize],
    substring_to_ids: BTreeMap<&'a str, &'a [CandidateId]>,
    entries: BTreeMap<CandidateId, &'a CandidateEntry<D>>,
}

impl<D: Serialize> ClosestMatch<D> {
    /// Write the index as a gzip-compressed JSON snapshot.
    ///
    /// Data goes to a temporary file next to `path` which then replaces
    /// `path` in one rename, so readers never observe a partial snapshot.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let start = Instant::now();

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let temp = NamedTempFile::new_in(dir).map_err(|e| MatchError::io(dir, e))?;

        {
            let mut writer = BufWriter::new(temp.as_file());
            self.write_to(&mut writer).map_err(|e| e.at_path(path))?;
            writer.flush().map_err(|e| MatchError::io(path, e))?;
        }

        temp.persist(path)
            .map_err(|e| MatchError::io(path, e.error))?;

        debug!(
            path = %path.display(),
            candidates = self.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "saved snapshot"
        );
        Ok(())
    }

    /// Encode the snapshot into any writer
    pub fn write_to<W: Write>(&self, writer: W) -> Result<()> {
        let snapshot = SnapshotRef {
            substring_sizes: &self.substring_sizes,
            substring_to_ids: self
                .substring_to_ids
                .iter()
                .map(|(substring, ids)| (substring.as_str(), ids.as_slice()))
                .collect(),
            entries: self.entries().collect(),
        };

        let mut encoder = GzEncoder::new(writer, Compression::default());
        serde_json::to_writer(&mut encoder, &snapshot).map_err(|e| {
            if e.is_io() {
                MatchError::io(PathBuf::from("<writer>"), e.into())
            } else {
                MatchError::Encode(e.to_string())
            }
        })?;
        encoder
            .finish()
            .map_err(|e| MatchError::io(PathBuf::from("<writer>"), e))?;
        Ok(())
    }
}
