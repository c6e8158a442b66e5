//! Ranked fuzzy search over arbitrary records.
//!
//! Scoring reuses [`bstack_util::fuzzy_score`] (ordered subsequence with
//! boundary and prefix bonuses) and layers a substring bonus on top. Exact
//! matches score [`EXACT_SCORE`], above any fuzzy score. Misspellings that
//! break the subsequence still match when they are within a small edit
//! distance of the whole field and carry the same digits, so "Pixel 9" never
//! lands on "Pixel 7".

use bstack_util::fuzzy_score;

/// Score of a case-insensitive exact match. Fuzzy scores never reach it.
pub const EXACT_SCORE: i64 = i64::MAX;
const SUBSTRING_BONUS: i64 = 50;
const TYPO_BASE_SCORE: i64 = 10;

/// A record that exposes named text fields to the matcher.
pub trait CandidateRecord {
    /// Text for `field`, or `None` when the record has no such field.
    fn field_text(&self, field: &str) -> Option<&str>;
}

/// One scored hit, pointing back at the record it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchResult<'a, T> {
    pub record: &'a T,
    pub score: i64,
    /// Position of the record in the input slice.
    pub index: usize,
}

impl<T> MatchResult<'_, T> {
    /// Whether some field equals the query, ignoring case.
    pub fn is_exact(&self) -> bool {
        self.score == EXACT_SCORE
    }
}

/// Returns up to `limit` records matching `query` on any of `fields`, best first.
///
/// Each record takes its best score across the requested fields. Equal
/// scores keep input order. A blank query or a zero limit matches nothing.
pub fn search<'a, T: CandidateRecord>(candidates: &'a [T], fields: &[&str], query: &str, limit: usize) -> Vec<MatchResult<'a, T>> {
    let query = query.trim();
    if query.is_empty() || limit == 0 {
        return Vec::new();
    }

    let mut results: Vec<MatchResult<'a, T>> = candidates
        .iter()
        .enumerate()
        .filter_map(|(index, record)| {
            fields
                .iter()
                .filter_map(|field| record.field_text(field))
                .filter_map(|text| score_text(text, query))
                .max()
                .map(|score| MatchResult { record, score, index })
        })
        .collect();

    results.sort_by(|left, right| right.score.cmp(&left.score).then(left.index.cmp(&right.index)));
    results.truncate(limit);
    results
}

/// Score of `query` against a single field value.
pub fn score_text(text: &str, query: &str) -> Option<i64> {
    let text_lower = text.trim().to_lowercase();
    let query_lower = query.trim().to_lowercase();
    if text_lower.is_empty() || query_lower.is_empty() {
        return None;
    }
    if text_lower == query_lower {
        return Some(EXACT_SCORE);
    }

    if let Some(score) = fuzzy_score(&text_lower, &query_lower) {
        let bonus = if text_lower.contains(&query_lower) { SUBSTRING_BONUS } else { 0 };
        return Some(score + bonus);
    }

    if !same_digits(&text_lower, &query_lower) {
        return None;
    }
    let distance = edit_distance(&text_lower, &query_lower);
    let tolerance = (query_lower.chars().count() / 4).max(1);
    (distance <= tolerance).then(|| TYPO_BASE_SCORE - distance as i64)
}

fn same_digits(left: &str, right: &str) -> bool {
    left.chars().filter(char::is_ascii_digit).eq(right.chars().filter(char::is_ascii_digit))
}

fn edit_distance(left: &str, right: &str) -> usize {
    let right: Vec<char> = right.chars().collect();
    let mut previous: Vec<usize> = (0..=right.len()).collect();
    let mut current = vec![0; right.len() + 1];
    for (row, left_char) in left.chars().enumerate() {
        current[0] = row + 1;
        for (column, right_char) in right.iter().enumerate() {
            let substitution = previous[column] + usize::from(left_char != *right_char);
            current[column + 1] = substitution.min(previous[column + 1] + 1).min(current[column] + 1);
        }
        std::mem::swap(&mut previous, &mut current);
    }
    previous[right.len()]
}
