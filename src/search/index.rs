use std::{cmp::Ordering, fmt::Display, str::FromStr};

use anyhow::anyhow;
use nucleo::{
    pattern::{CaseMatching, Normalization, Pattern},
    Config, Matcher, Utf32String,
};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

use crate::{bookmarks::Bookmark, config::SearchConfig};

use super::highlight::merge_ranges;

/// Searchable bookmark field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Title,
    Url,
}

impl Field {
    pub const ALL: [Field; 2] = [Field::Title, Field::Url];

    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Title => "title",
            Field::Url => "url",
        }
    }
}

impl Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Field {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "title" => Ok(Field::Title),
            "url" => Ok(Field::Url),
            _ => Err(anyhow!("unknown field {s:?}")),
        }
    }
}

/// Inclusive `(start, end)` character offsets.
pub type Span = (usize, usize);

#[derive(Debug, Clone, PartialEq)]
pub struct FieldMatch {
    pub field: Field,
    pub spans: Vec<Span>,
}

/// How a hit was found. Subsequence hits always rank above typo hits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MatchKind {
    Subsequence,
    Approximate,
}

#[derive(Debug, Clone)]
pub struct SearchHit {
    pub bookmark: Bookmark,
    pub kind: MatchKind,
    pub score: f32,
    pub matches: Vec<FieldMatch>,
}

/// One searchable field of one bookmark.
struct Haystack {
    /// Pre-normalized for nucleo, one element per grapheme.
    graphemes: Utf32String,
    /// Char offset where each grapheme starts, plus the total char count.
    grapheme_starts: Vec<usize>,
    /// Lowercased chars for the typo fallback, one per source char.
    lowered: Vec<char>,
}

impl Haystack {
    fn new(text: &str) -> Self {
        let mut grapheme_starts = Vec::new();
        let mut offset = 0;
        for grapheme in text.graphemes(true) {
            grapheme_starts.push(offset);
            offset += grapheme.chars().count();
        }
        grapheme_starts.push(offset);

        Self {
            graphemes: Utf32String::from(text),
            grapheme_starts,
            lowered: text
                .chars()
                .map(|c| c.to_lowercase().next().unwrap_or(c))
                .collect(),
        }
    }

    /// Grapheme span to char span.
    fn char_span(&self, (start, end): Span) -> Span {
        let first = self.grapheme_starts.get(start).copied().unwrap_or(start);
        let last = self
            .grapheme_starts
            .get(end + 1)
            .map_or(end, |next| next.saturating_sub(1));
        (first, last.max(first))
    }
}

struct Entry {
    bookmark: Bookmark,
    /// In `Field::ALL` order.
    haystacks: [Haystack; 2],
}

/// Fuzzy index over one snapshot of the bookmark list.
pub struct SearchIndex {
    entries: Vec<Entry>,
    config: SearchConfig,
    matcher: Mutex<Matcher>,
}

impl SearchIndex {
    pub fn build(list: &[Bookmark], config: &SearchConfig) -> Self {
        let entries = list
            .iter()
            .map(|bookmark| Entry {
                haystacks: [Haystack::new(&bookmark.title), Haystack::new(&bookmark.url)],
                bookmark: bookmark.clone(),
            })
            .collect();

        Self {
            entries,
            config: config.clone(),
            matcher: Mutex::new(Matcher::new(Config::DEFAULT)),
        }
    }

    fn weight(&self, field: Field) -> f32 {
        match field {
            Field::Title => self.config.title_weight,
            Field::Url => self.config.url_weight,
        }
    }

    /// Ranked hits, best first. Ties keep the order the index was built in.
    ///
    /// A field first tries a subsequence match of the whole query. If that
    /// fails, every whitespace separated token must land within
    /// `typo_threshold` normalized edit distance of some stretch of the field.
    /// Either way a field also needs at least one run of
    /// `min_match_char_length` matched characters.
    pub fn search(&self, query: &str) -> Vec<SearchHit> {
        let query = query.trim();
        if query.is_empty() {
            return vec![];
        }

        let pattern = Pattern::parse(query, CaseMatching::Ignore, Normalization::Smart);
        let tokens = query
            .split_whitespace()
            .map(|token| token.chars().flat_map(char::to_lowercase).collect::<Vec<_>>())
            .collect::<Vec<_>>();
        let mut matcher = self.matcher.lock();
        let mut indices = Vec::new();

        let mut hits = self
            .entries
            .iter()
            .filter_map(|entry| {
                let mut exact = (0.0, vec![]);
                let mut approximate = (0.0, vec![]);

                for (field, haystack) in Field::ALL.iter().zip(entry.haystacks.iter()) {
                    indices.clear();
                    let found = pattern.indices(
                        haystack.graphemes.slice(..),
                        &mut matcher,
                        &mut indices,
                    );

                    if let Some(raw) = found {
                        let spans = runs(&mut indices, self.config.min_match_char_length)
                            .into_iter()
                            .map(|span| haystack.char_span(span))
                            .collect::<Vec<_>>();
                        if !spans.is_empty() {
                            exact.0 += self.weight(*field) * raw as f32;
                            exact.1.push(FieldMatch { field: *field, spans });
                        }
                        continue;
                    }

                    if let Some((closeness, spans)) = self.approximate(&tokens, haystack) {
                        approximate.0 += self.weight(*field) * closeness;
                        approximate.1.push(FieldMatch { field: *field, spans });
                    }
                }

                let (kind, (score, matches)) = if !exact.1.is_empty() {
                    (MatchKind::Subsequence, exact)
                } else if !approximate.1.is_empty() {
                    (MatchKind::Approximate, approximate)
                } else {
                    return None;
                };

                Some(SearchHit {
                    bookmark: entry.bookmark.clone(),
                    kind,
                    score,
                    matches,
                })
            })
            .collect::<Vec<_>>();

        hits.sort_by(|a, b| {
            a.kind
                .cmp(&b.kind)
                .then_with(|| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal))
        });

        hits
    }

    /// Typo tolerant match of every token. Returns closeness in `0..=1` and
    /// the matched char spans.
    fn approximate(&self, tokens: &[Vec<char>], haystack: &Haystack) -> Option<(f32, Vec<Span>)> {
        let mut spans = vec![];
        let mut distance = 0.0;

        for token in tokens {
            let (span, dist) = closest_window(token, &haystack.lowered)?;
            if dist > self.config.typo_threshold {
                return None;
            }
            distance += dist;
            if span.1 - span.0 + 1 >= self.config.min_match_char_length {
                spans.push(span);
            }
        }

        if spans.is_empty() {
            return None;
        }
        let closeness = 1.0 - distance / tokens.len() as f64;
        Some((closeness as f32, merge_ranges(&spans)))
    }
}

/// The stretch of `text` closest to `token` by normalized Damerau-Levenshtein
/// distance, as an inclusive char span. Windows are one char shorter than the
/// token up to one char longer.
fn closest_window(token: &[char], text: &[char]) -> Option<(Span, f64)> {
    if token.is_empty() || text.is_empty() {
        return None;
    }

    let needle = token.iter().collect::<String>();
    let shortest = token.len().saturating_sub(1).max(1).min(text.len());
    let longest = (token.len() + 1).min(text.len());

    let mut best: Option<(Span, f64)> = None;
    for len in shortest..=longest {
        for start in 0..=text.len() - len {
            let window = text[start..start + len].iter().collect::<String>();
            let dist = strsim::damerau_levenshtein(&needle, &window) as f64
                / token.len().max(len) as f64;

            if best.map_or(true, |(_, best_dist)| dist < best_dist) {
                best = Some(((start, start + len - 1), dist));
                if dist == 0.0 {
                    return best;
                }
            }
        }
    }
    best
}

/// Group matched positions into runs of consecutive characters, dropping runs
/// shorter than `min_len`.
fn runs(indices: &mut Vec<u32>, min_len: usize) -> Vec<Span> {
    indices.sort_unstable();
    indices.dedup();

    let mut spans = vec![];
    let mut positions = indices.iter().map(|&i| i as usize);
    let Some(first) = positions.next() else {
        return spans;
    };

    let (mut start, mut end) = (first, first);
    for pos in positions {
        if pos == end + 1 {
            end = pos;
            continue;
        }
        if end - start + 1 >= min_len {
            spans.push((start, end));
        }
        start = pos;
        end = pos;
    }
    if end - start + 1 >= min_len {
        spans.push((start, end));
    }

    spans
}
