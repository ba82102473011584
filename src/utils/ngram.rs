use rustc_hash::FxHashSet;

/// Split a (lowercased) word into the set of its n-grams for every size in
/// `sizes`.
///
/// Lengths and offsets are counted in code points, not bytes, so multi-byte
/// characters are never cut. N-grams made only of whitespace are dropped.
/// If nothing survives (the word is shorter than every size, or blank), the
/// word itself is the only member, so every key and query maps to at least
/// one index entry.
pub fn split_word(word: &str, sizes: &[usize]) -> FxHashSet<String> {
    // Byte offset of every char boundary, including the end of the string
    let boundaries: Vec<usize> = word
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(word.len()))
        .collect();
    let char_count = boundaries.len() - 1;

    let mut ngrams = FxHashSet::default();
    for &size in sizes {
        if size == 0 || size > char_count {
            continue;
        }
        for start in 0..=(char_count - size) {
            let ngram = &word[boundaries[start]..boundaries[start + size]];
            if !ngram.trim().is_empty() {
                ngrams.insert(ngram.to_string());
            }
        }
    }

    if ngrams.is_empty() {
        ngrams.insert(word.to_string());
    }
    ngrams
}

/// Lowercase `word` and split it, the form used for both keys and queries.
pub fn split_lowercase(word: &str, sizes: &[usize]) -> FxHashSet<String> {
    split_word(&word.to_lowercase(), sizes)
}
