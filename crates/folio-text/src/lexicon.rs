//! The word-frequency collaborator behind the dictionary steps.

use std::io::BufRead;
use std::path::Path;

use log::debug;
use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use crate::TextError;

const ALPHABET: &str = "abcdefghijklmnopqrstuvwxyz";

/// What the spacing and spelling steps need from a dictionary. Keeping it a
/// trait isolates the pipeline from any particular spelling library.
pub trait Vocab {
    fn is_word(&self, word: &str) -> bool;

    /// Corpus frequency; 0 for unknown words.
    fn freq(&self, word: &str) -> u64;

    /// Best correction for `word`, or `word` itself when nothing better is
    /// known.
    fn correct(&self, word: &str) -> String;
}

/// Case-insensitive word-frequency list with Norvig-style correction:
/// a known word stands; otherwise the best-ranked known candidate one edit
/// away, then two edits away; otherwise the input unchanged.
#[derive(Debug, Default, Clone)]
pub struct Lexicon {
    words: FxHashMap<SmolStr, u64>,
}

impl Lexicon {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `word [count]` lines; a missing count is 1. Blank lines and
    /// `#` comments are skipped.
    pub fn from_reader(reader: impl BufRead) -> Result<Self, TextError> {
        let mut lexicon = Self::new();
        for (at, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut fields = line.split_whitespace();
            let Some(word) = fields.next() else {
                continue;
            };
            let count = match fields.next() {
                Some(count) => count
                    .parse()
                    .map_err(|_| TextError::BadCount { line: at + 1, text: line.to_string() })?,
                None => 1,
            };
            lexicon.add(word, count);
        }
        debug!("loaded {} lexicon words", lexicon.len());
        Ok(lexicon)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, TextError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    pub fn add(&mut self, word: &str, count: u64) {
        *self.words.entry(SmolStr::new(word.to_lowercase())).or_insert(0) += count;
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// The best-ranked known word among `candidates`: highest frequency,
    /// ties to the lexicographically smallest so corrections are stable.
    fn best_known<'a>(&self, candidates: impl Iterator<Item = &'a str>) -> Option<&'a str> {
        candidates
            .filter(|word| self.words.contains_key(*word))
            .max_by_key(|word| (self.freq(word), std::cmp::Reverse(*word)))
    }
}

impl Vocab for Lexicon {
    fn is_word(&self, word: &str) -> bool {
        self.words.contains_key(word.to_lowercase().as_str())
    }

    fn freq(&self, word: &str) -> u64 {
        self.words.get(word.to_lowercase().as_str()).copied().unwrap_or(0)
    }

    fn correct(&self, word: &str) -> String {
        if word.is_empty() || self.is_word(word) {
            return word.to_string();
        }

        let lower = word.to_lowercase();
        let once = edits1(&lower);
        let corrected = match self.best_known(once.iter().map(SmolStr::as_str)) {
            Some(found) => found.to_string(),
            None => {
                let twice: Vec<SmolStr> = once.iter().flat_map(|e| edits1(e)).collect();
                match self.best_known(twice.iter().map(SmolStr::as_str)) {
                    Some(found) => found.to_string(),
                    None => return word.to_string(),
                }
            }
        };

        // Corrections come back lowercase; keep a leading capital.
        if word.chars().next().is_some_and(char::is_uppercase) {
            let mut chars = corrected.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => corrected,
            }
        } else {
            corrected
        }
    }
}

/// Every string one edit away: deletes, adjacent transposes, replaces, and
/// inserts over a lowercase ASCII alphabet.
fn edits1(word: &str) -> Vec<SmolStr> {
    let chars: Vec<char> = word.chars().collect();
    let mut edits = Vec::with_capacity((chars.len() + 1) * (ALPHABET.len() + 2));

    let splice = |head: &[char], middle: Option<char>, tail: &[char]| -> SmolStr {
        let mut edited = String::with_capacity(word.len() + 4);
        edited.extend(head);
        if let Some(ch) = middle {
            edited.push(ch);
        }
        edited.extend(tail);
        SmolStr::new(edited)
    };

    for at in 0..chars.len() {
        // delete
        edits.push(splice(&chars[..at], None, &chars[at + 1..]));
        // transpose
        if at + 1 < chars.len() {
            let mut swapped = chars.clone();
            swapped.swap(at, at + 1);
            edits.push(SmolStr::new(swapped.iter().collect::<String>()));
        }
        // replace
        for letter in ALPHABET.chars() {
            edits.push(splice(&chars[..at], Some(letter), &chars[at + 1..]));
        }
    }
    // insert
    for at in 0..=chars.len() {
        for letter in ALPHABET.chars() {
            edits.push(splice(&chars[..at], Some(letter), &chars[at..]));
        }
    }
    edits
}
