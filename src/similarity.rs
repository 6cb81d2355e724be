// 📏 Similarity - name normalization and sequence similarity
//
// ratio() is the Ratcliff/Obershelp "gestalt" score: 2·M / (|a| + |b|),
// where M counts characters in recursively found longest common blocks.
// Range 0.0-1.0, 1.0 for two empty strings.
//
// Second sequences of 200+ characters get the "autojunk" rule: a character
// occurring more than 1% + 1 times is popular and may only extend a block,
// never anchor one. Long texts full of spaces and vowels score far lower
// than they would by raw character overlap, so the argument order matters.

use std::collections::HashMap;

/// Shortest second sequence the popular-character rule applies to
const AUTOJUNK_MIN_LEN: usize = 200;

/// Whole-token words removed from product names before comparison
pub const STOP_WORDS: [&str; 14] = [
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
];

/// Lowercase, collapse whitespace, trim, drop stop words
pub fn normalize_name(name: &str) -> String {
    name.to_lowercase()
        .split_whitespace()
        .filter(|word| !STOP_WORDS.contains(word))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Sequence similarity of two strings (character based)
pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    ratio_chars(&a, &b)
}

pub fn ratio_chars(a: &[char], b: &[char]) -> f64 {
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    let popular = popular_mask(b);
    2.0 * matching_chars(a, b, &popular) as f64 / total as f64
}

/// Per position of `b`: is its character too common to anchor a match
fn popular_mask(b: &[char]) -> Vec<bool> {
    if b.len() < AUTOJUNK_MIN_LEN {
        return vec![false; b.len()];
    }
    let limit = b.len() / 100 + 1;
    let counts = char_counts(b);
    b.iter()
        .map(|c| counts.get(c).is_some_and(|&n| n > limit))
        .collect()
}

/// Upper bound on ratio() from lengths alone (holds with autojunk too)
pub fn length_bound(len_a: usize, len_b: usize) -> f64 {
    let total = len_a + len_b;
    if total == 0 {
        return 1.0;
    }
    2.0 * len_a.min(len_b) as f64 / total as f64
}

/// Character multiset of a string, for `multiset_bound`
pub fn char_counts(chars: &[char]) -> HashMap<char, usize> {
    let mut counts = HashMap::new();
    for c in chars {
        *counts.entry(*c).or_insert(0) += 1;
    }
    counts
}

/// Upper bound on ratio() from shared characters, ignoring order
pub fn multiset_bound(
    a: &HashMap<char, usize>,
    len_a: usize,
    b: &HashMap<char, usize>,
    len_b: usize,
) -> f64 {
    let total = len_a + len_b;
    if total == 0 {
        return 1.0;
    }
    let shared: usize = a
        .iter()
        .map(|(c, n)| (*n).min(b.get(c).copied().unwrap_or(0)))
        .sum();
    2.0 * shared as f64 / total as f64
}

fn matching_chars(a: &[char], b: &[char], popular: &[bool]) -> usize {
    let mut total = 0;
    let mut pending = vec![(0, a.len(), 0, b.len())];

    while let Some((alo, ahi, blo, bhi)) = pending.pop() {
        let (i, j, size) = longest_match(a, b, popular, (alo, ahi), (blo, bhi));
        if size == 0 {
            continue;
        }
        total += size;
        if alo < i && blo < j {
            pending.push((alo, i, blo, j));
        }
        if i + size < ahi && j + size < bhi {
            pending.push((i + size, ahi, j + size, bhi));
        }
    }

    total
}

/// Longest common block in a[alo..ahi] × b[blo..bhi].
/// Ties go to the block starting earliest in `a`, then earliest in `b`.
/// Blocks are anchored on non-popular characters, then grown over any
/// equal neighbours.
fn longest_match(
    a: &[char],
    b: &[char],
    popular: &[bool],
    (alo, ahi): (usize, usize),
    (blo, bhi): (usize, usize),
) -> (usize, usize, usize) {
    let (mut best_i, mut best_j, mut best_size) = (alo, blo, 0);
    let width = bhi - blo;
    let mut prev = vec![0usize; width + 1];
    let mut curr = vec![0usize; width + 1];

    for i in alo..ahi {
        for j in blo..bhi {
            let k = if a[i] == b[j] && !popular[j] {
                prev[j - blo] + 1
            } else {
                0
            };
            curr[j - blo + 1] = k;
            if k > best_size {
                best_i = i + 1 - k;
                best_j = j + 1 - k;
                best_size = k;
            }
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    while best_i > alo && best_j > blo && a[best_i - 1] == b[best_j - 1] {
        best_i -= 1;
        best_j -= 1;
        best_size += 1;
    }
    while best_i + best_size < ahi
        && best_j + best_size < bhi
        && a[best_i + best_size] == b[best_j + best_size]
    {
        best_size += 1;
    }

    (best_i, best_j, best_size)
}
