use crate::error::{MatchError, Result};
use crate::index::build::ClosestMatch;
use crate::index::types::{validate_sizes, CandidateEntry, CandidateId, DEFAULT_WORKERS};
use flate2::read::GzDecoder;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, warn};

/// Owned snapshot as decoded from disk, before validation
#[derive(Deserialize)]
struct Snapshot<D> {
    substring_sizes: Vec<usize>,
    substring_to_ids: BTreeMap<String, Vec<CandidateId>>,
    entries: BTreeMap<CandidateId, CandidateEntry<D>>,
}

impl<D: DeserializeOwned + Send + Sync> ClosestMatch<D> {
    /// Load an index previously written with [`ClosestMatch::save`].
    ///
    /// The snapshot does not record a worker count; the default is used.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::load_with_workers(path, DEFAULT_WORKERS)
    }

    /// Load a snapshot and score it with `workers` threads (0 = one per CPU)
    pub fn load_with_workers(path: impl AsRef<Path>, workers: usize) -> Result<Self> {
        let path = path.as_ref();
        let start = Instant::now();

        let file = File::open(path).map_err(|e| MatchError::io(path, e))?;
        let index = Self::read_from_with_workers(BufReader::new(file), workers).inspect_err(|e| {
            warn!(path = %path.display(), error = %e, "rejected snapshot");
        })?;

        debug!(
            path = %path.display(),
            candidates = index.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "loaded snapshot"
        );
        Ok(index)
    }

    /// Decode and validate a snapshot from any reader
    pub fn read_from<R: Read>(reader: R) -> Result<Self> {
        Self::read_from_with_workers(reader, DEFAULT_WORKERS)
    }

    pub fn read_from_with_workers<R: Read>(reader: R, workers: usize) -> Result<Self> {
        let decoder = BufReader::new(GzDecoder::new(reader));
        let snapshot: Snapshot<D> =
            serde_json::from_reader(decoder).map_err(|e| MatchError::Decode(e.to_string()))?;
        Self::from_snapshot(snapshot, workers)
    }

    fn from_snapshot(snapshot: Snapshot<D>, workers: usize) -> Result<Self> {
        validate_sizes(&snapshot.substring_sizes)
            .map_err(|e| MatchError::Corrupt(e.to_string()))?;

        // Stored ids may have gaps; renumber densely in ascending order
        let mut remap: FxHashMap<CandidateId, CandidateId> = FxHashMap::default();
        let mut entries = Vec::with_capacity(snapshot.entries.len());
        let mut keys = FxHashSet::default();

        for (stored_id, entry) in snapshot.entries {
            if !keys.insert(entry.key.clone()) {
                return Err(MatchError::Corrupt(format!(
                    "duplicate key {:?}",
                    entry.key
                )));
            }
            remap.insert(stored_id, entries.len() as CandidateId);
            entries.push(entry);
        }

        let mut substring_to_ids = FxHashMap::default();
        let mut reachable = vec![false; entries.len()];

        for (substring, stored_ids) in snapshot.substring_to_ids {
            let mut ids = stored_ids
                .into_iter()
                .map(|stored| {
                    remap.get(&stored).copied().ok_or_else(|| {
                        MatchError::Corrupt(format!(
                            "substring {:?} references unknown id {}",
                            substring, stored
                        ))
                    })
                })
                .collect::<Result<Vec<CandidateId>>>()?;

            if ids.is_empty() {
                continue;
            }
            ids.sort_unstable();
            ids.dedup();
            for &id in &ids {
                reachable[id as usize] = true;
            }
            substring_to_ids.insert(substring, ids);
        }

        let unreachable = reachable.iter().filter(|&&r| !r).count();
        if unreachable > 0 {
            warn!(unreachable, "snapshot has entries no substring points to");
        }

        Self::from_parts(
            snapshot.substring_sizes,
            substring_to_ids,
            entries,
            workers,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    fn gzip(json: &str) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(json.as_bytes()).unwrap();
        encoder.finish().unwrap()
    }

    fn sample() -> ClosestMatch<String> {
        ClosestMatch::new(
            vec![
                ("Paris".to_string(), "FR".to_string()),
                ("Berlin".to_string(), "DE".to_string()),
                ("Bern".to_string(), "CH".to_string()),
            ],
            &[2, 3],
        )
        .unwrap()
    }

    #[test]
    fn test_round_trip_in_memory() {
        let index = sample();
        let mut bytes = Vec::new();
        index.write_to(&mut bytes).unwrap();

        let loaded = ClosestMatch::<String>::read_from(bytes.as_slice()).unwrap();
        assert_eq!(loaded.len(), 3);
        assert_eq!(loaded.substring_sizes(), &[2, 3]);
        for query in ["pari", "bern", "berln", "xyz", ""] {
            assert_eq!(loaded.score(query), index.score(query));
            assert_eq!(loaded.closest_n(query, 3), index.closest_n(query, 3));
        }
    }

    #[test]
    fn test_round_trip_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cities.json.gz");
        let index = sample();
        index.save(&path).unwrap();

        let loaded = ClosestMatch::<String>::load(&path).unwrap();
        assert_eq!(loaded.closest("Berlni"), index.closest("Berlni"));
        assert_eq!(loaded.get(1).unwrap().data, "DE");
    }

    #[test]
    fn test_load_with_workers_sizes_pool() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cities.json.gz");
        sample().save(&path).unwrap();

        let loaded = ClosestMatch::<String>::load_with_workers(&path, 2).unwrap();
        assert_eq!(loaded.workers(), 2);
        assert_eq!(loaded.pool.current_num_threads(), 2);
        assert_eq!(loaded.closest("Berlni").as_deref(), Some("Berlin"));

        let default = ClosestMatch::<String>::load(&path).unwrap();
        assert_eq!(default.workers(), DEFAULT_WORKERS);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ClosestMatch::<String>::load(dir.path().join("nope.gz")).unwrap_err();
        assert!(err.is_io());
    }

    #[test]
    fn test_not_gzip_is_decode_error() {
        let err = ClosestMatch::<String>::read_from(&b"plain text"[..]).unwrap_err();
        assert!(matches!(err, MatchError::Decode(_)));
    }

    #[test]
    fn test_wrong_shape_is_decode_error() {
        let bytes = gzip(r#"{"substring_sizes": "two"}"#);
        let err = ClosestMatch::<String>::read_from(bytes.as_slice()).unwrap_err();
        assert!(matches!(err, MatchError::Decode(_)));
    }

    #[test]
    fn test_wrong_payload_type_is_decode_error() {
        let mut bytes = Vec::new();
        sample().write_to(&mut bytes).unwrap();
        let err = ClosestMatch::<u64>::read_from(bytes.as_slice()).unwrap_err();
        assert!(matches!(err, MatchError::Decode(_)));
    }

    #[test]
    fn test_dangling_id_is_corrupt() {
        let bytes = gzip(
            r#"{"substring_sizes":[2],
                "substring_to_ids":{"ab":[0,7]},
                "entries":{"0":{"key":"ab","substring_count":1,"data":null}}}"#,
        );
        let err = ClosestMatch::<()>::read_from(bytes.as_slice()).unwrap_err();
        assert!(matches!(err, MatchError::Corrupt(_)));
    }

    #[test]
    fn test_duplicate_key_is_corrupt() {
        let bytes = gzip(
            r#"{"substring_sizes":[2],
                "substring_to_ids":{"ab":[0,1]},
                "entries":{"0":{"key":"ab","substring_count":1,"data":null},
                           "1":{"key":"ab","substring_count":1,"data":null}}}"#,
        );
        let err = ClosestMatch::<()>::read_from(bytes.as_slice()).unwrap_err();
        assert!(matches!(err, MatchError::Corrupt(_)));
    }

    #[test]
    fn test_invalid_sizes_are_corrupt() {
        let bytes = gzip(r#"{"substring_sizes":[],"substring_to_ids":{},"entries":{}}"#);
        let err = ClosestMatch::<()>::read_from(bytes.as_slice()).unwrap_err();
        assert!(matches!(err, MatchError::Corrupt(_)));
    }

    #[test]
    fn test_sparse_ids_are_renumbered() {
        let bytes = gzip(
            r#"{"substring_sizes":[2],
                "substring_to_ids":{"ab":[10,4],"cd":[10]},
                "entries":{"4":{"key":"ab","substring_count":1,"data":1},
                           "10":{"key":"abcd","substring_count":3,"data":2}}}"#,
        );
        let index = ClosestMatch::<u8>::read_from(bytes.as_slice()).unwrap();
        assert_eq!(index.get(0).unwrap().key, "ab");
        assert_eq!(index.get(1).unwrap().key, "abcd");
        assert_eq!(index.postings("ab"), &[0, 1]);
        assert_eq!(index.postings("cd"), &[1]);
        assert_eq!(index.closest("ab").as_deref(), Some("ab"));
    }
}
