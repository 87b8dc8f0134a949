//! Edit-distance similarity between a transcription and the expected text.
//!
//! Distances are computed over grapheme clusters so an Arabic letter with
//! its harakat counts as a single unit.

use lazy_static::lazy_static;
use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;

lazy_static! {
    static ref WHITESPACE: Regex = Regex::new(r"\s+").expect("valid whitespace regex");
}

/// Lowercases, trims and collapses internal whitespace.
pub fn normalize_text(text: &str) -> String {
    WHITESPACE
        .replace_all(text.trim(), " ")
        .to_lowercase()
}

/// Levenshtein distance over grapheme clusters.
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a: Vec<&str> = a.graphemes(true).collect();
    let b: Vec<&str> = b.graphemes(true).collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev_row: Vec<usize> = (0..=b.len()).collect();
    let mut curr_row: Vec<usize> = vec![0; b.len() + 1];

    for (i, a_g) in a.iter().enumerate() {
        curr_row[0] = i + 1;
        for (j, b_g) in b.iter().enumerate() {
            let cost = usize::from(a_g != b_g);
            curr_row[j + 1] = (prev_row[j + 1] + 1)
                .min(curr_row[j] + 1)
                .min(prev_row[j] + cost);
        }
        std::mem::swap(&mut prev_row, &mut curr_row);
    }

    prev_row[b.len()]
}

/// Similarity in `0..=100`. Empty input on either side scores 0.
pub fn similarity(a: &str, b: &str) -> u8 {
    let a = normalize_text(a);
    let b = normalize_text(b);

    if a.is_empty() || b.is_empty() {
        return 0;
    }
    if a == b {
        return 100;
    }

    let max_len = a.graphemes(true).count().max(b.graphemes(true).count());
    let distance = levenshtein_distance(&a, &b).min(max_len);
    (((max_len - distance) as f64 / max_len as f64) * 100.0).round() as u8
}
