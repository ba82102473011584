use anyhow::{Context, Result};
use rustc_hash::FxHashSet;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

/// Dictionary parsed from a word list file
#[derive(Debug, Default)]
pub struct WordList {
    /// `(key, payload)` in file order
    pub entries: Vec<(String, String)>,
    /// Lines dropped because their key was already seen
    pub duplicates: usize,
}

/// Read a word list: one key per line, optionally followed by a tab and a
/// payload string. Blank lines are skipped; a repeated key keeps its first
/// occurrence.
pub fn read_word_list(path: &Path) -> Result<WordList> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    parse_word_list(file).with_context(|| format!("Failed to read {}", path.display()))
}

pub fn parse_word_list<R: Read>(reader: R) -> Result<WordList> {
    let mut list = WordList::default();
    let mut seen = FxHashSet::default();

    for line in BufReader::new(reader).lines() {
        let line = line?;
        let line = line.trim_end_matches('\r');
        let (key, payload) = match line.split_once('\t') {
            Some((key, payload)) => (key, payload),
            None => (line, ""),
        };
        if key.trim().is_empty() {
            continue;
        }
        if !seen.insert(key.to_string()) {
            list.duplicates += 1;
            continue;
        }
        list.entries.push((key.to_string(), payload.to_string()));
    }

    Ok(list)
}
