//! Gestalt pattern matching (Ratcliff/Obershelp) similarity.
//!
//! The score is `2 * M / T`, where `T` is the combined length of both
//! strings and `M` the number of characters covered by matching blocks. Blocks
//! are found by taking the longest common substring, then recursing into the
//! unmatched text on either side of it. When several longest substrings exist
//! the one starting earliest in `a` wins, then earliest in `b`.
//!
//! Lengths are counted in characters so Hebrew and Latin names score alike.

/// Similarity of two strings in `[0.0, 1.0]`.
///
/// Two empty strings are identical (`1.0`); an empty string against a
/// non-empty one scores `0.0`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matching_characters(&a, &b) as f64 / total as f64
}

fn matching_characters(a: &[char], b: &[char]) -> usize {
    let mut matched = 0;
    let mut pending = vec![(0, a.len(), 0, b.len())];

    while let Some((a_lo, a_hi, b_lo, b_hi)) = pending.pop() {
        let (i, j, len) = longest_match(a, b, a_lo, a_hi, b_lo, b_hi);
        if len == 0 {
            continue;
        }
        matched += len;
        if a_lo < i && b_lo < j {
            pending.push((a_lo, i, b_lo, j));
        }
        if i + len < a_hi && j + len < b_hi {
            pending.push((i + len, a_hi, j + len, b_hi));
        }
    }

    matched
}

/// Longest common substring of `a[a_lo..a_hi]` and `b[b_lo..b_hi]` as
/// `(start_in_a, start_in_b, len)`.
fn longest_match(
    a: &[char],
    b: &[char],
    a_lo: usize,
    a_hi: usize,
    b_lo: usize,
    b_hi: usize,
) -> (usize, usize, usize) {
    let width = b_hi - b_lo + 1;
    let mut best = (a_lo, b_lo, 0);
    // run[k + 1] = length of the common run ending at a[i], b[b_lo + k]
    let mut prev = vec![0usize; width];
    let mut curr = vec![0usize; width];

    for i in a_lo..a_hi {
        for j in b_lo..b_hi {
            let k = j - b_lo + 1;
            if a[i] == b[j] {
                let run = prev[k - 1] + 1;
                curr[k] = run;
                if run > best.2 {
                    best = (i + 1 - run, j + 1 - run, run);
                }
            } else {
                curr[k] = 0;
            }
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    best
}
