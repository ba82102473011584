#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|input: (String, Vec<u8>)| {
    let (word, sizes) = input;
    let sizes: Vec<usize> = sizes.into_iter().map(usize::from).collect();
    let ngrams = closest::utils::split_word(&word, &sizes);
    assert!(!ngrams.is_empty() || word.is_empty());
    for ngram in &ngrams {
        assert!(word.contains(ngram.as_str()));
    }
});
