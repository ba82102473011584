use crate::index::build::ClosestMatch;
use serde::Serialize;

/// Summary of an index's shape
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexStats {
    pub candidates: usize,
    /// Distinct substrings
    pub substrings: usize,
    /// Total (substring, candidate) pairs
    pub postings: usize,
    pub substring_sizes: Vec<usize>,
    /// Most shared substring and how many candidates contain it
    pub largest_posting: Option<(String, usize)>,
    pub avg_substrings_per_candidate: f64,
}

impl<D> ClosestMatch<D> {
    pub fn stats(&self) -> IndexStats {
        let postings = self.substring_to_ids.values().map(Vec::len).sum();

        let largest_posting = self
            .substring_to_ids
            .iter()
            .max_by(|a, b| a.1.len().cmp(&b.1.len()).then_with(|| b.0.cmp(a.0)))
            .map(|(substring, ids)| (substring.clone(), ids.len()));

        let avg_substrings_per_candidate = if self.entries.is_empty() {
            0.0
        } else {
            let total: usize = self.entries.iter().map(|e| e.substring_count).sum();
            total as f64 / self.entries.len() as f64
        };

        IndexStats {
            candidates: self.entries.len(),
            substrings: self.substring_to_ids.len(),
            postings,
            substring_sizes: self.substring_sizes.clone(),
            largest_posting,
            avg_substrings_per_candidate,
        }
    }
}

/// Format byte size to human readable
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats() {
        let index = ClosestMatch::new(vec![("abc", 0), ("abd", 1)], &[2]).unwrap();
        let stats = index.stats();
        assert_eq!(stats.candidates, 2);
        // ab, bc, bd
        assert_eq!(stats.substrings, 3);
        assert_eq!(stats.postings, 4);
        assert_eq!(stats.largest_posting, Some(("ab".to_string(), 2)));
        assert_eq!(stats.avg_substrings_per_candidate, 2.0);
    }

    #[test]
    fn test_stats_empty() {
        let index = ClosestMatch::<()>::new(Vec::<(String, ())>::new(), &[2]).unwrap();
        let stats = index.stats();
        assert_eq!(stats.candidates, 0);
        assert_eq!(stats.largest_posting, None);
        assert_eq!(stats.avg_substrings_per_candidate, 0.0);
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 bytes");
        assert_eq!(format_size(2048), "2.00 KB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.00 MB");
    }
}
