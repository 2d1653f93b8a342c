//! Dictionary-guided spacing and spelling repair.
//!
//! OCR engines tear words apart ("w est") and run them together
//! ("SouthFlorida"). Both fixes lean on the lexicon: a split or merge only
//! happens when it produces a known word out of unknown pieces.

use smol_str::SmolStr;

use crate::lexicon::Vocab;
use crate::substitute::substitute;

/// Tokens shorter than this are never candidates for splitting.
pub const DEFAULT_VOCAB_LEN: usize = 3;

#[derive(PartialEq, Clone, Copy)]
enum Class {
    Letter,
    Space,
    Other,
}

fn class(ch: char) -> Class {
    if ch.is_alphabetic() {
        Class::Letter
    } else if ch.is_whitespace() {
        Class::Space
    } else {
        Class::Other
    }
}

/// Split a line into maximal runs of letters, whitespace, and everything
/// else. Concatenating the tokens reproduces the line.
fn tokenize(line: &str) -> Vec<SmolStr> {
    let mut tokens = Vec::new();
    let mut start = 0;
    let mut run: Option<Class> = None;
    for (at, ch) in line.char_indices() {
        let current = class(ch);
        if run.is_some_and(|r| r != current) {
            tokens.push(SmolStr::new(&line[start..at]));
            start = at;
        }
        run = Some(current);
    }
    if run.is_some() {
        tokens.push(SmolStr::new(&line[start..]));
    }
    tokens
}

fn is_space(token: &str) -> bool {
    token.chars().next().is_some_and(char::is_whitespace)
}

fn is_letters(token: &str) -> bool {
    !token.is_empty() && token.chars().all(char::is_alphabetic)
}

/// Insert a space inside tokens that are not words but split into one or
/// two known words: "SouthFlorida" becomes "South Florida".
///
/// The split point maximizes how many halves are known words, then the
/// summed frequency of the halves, then the split position itself.
pub fn add_spaces(line: &str, vocab: &impl Vocab, vocab_len: usize) -> String {
    let mut fixed = String::with_capacity(line.len() + 8);
    for token in tokenize(line) {
        let length = token.chars().count();
        if is_space(&token) || vocab.is_word(&token) || length < vocab_len {
            fixed.push_str(&token);
            continue;
        }

        let chars: Vec<char> = token.chars().collect();
        let mut best: Option<(usize, u64, usize)> = None;
        for at in 1..length.saturating_sub(1) {
            let head: String = chars[..at].iter().collect();
            let tail: String = chars[at..].iter().collect();
            let (head_freq, tail_freq) = (vocab.freq(&head), vocab.freq(&tail));
            if head_freq == 0 && tail_freq == 0 {
                continue;
            }
            let hits = usize::from(head_freq > 0) + usize::from(tail_freq > 0);
            let candidate = (hits, head_freq + tail_freq, at);
            if best.map_or(true, |b| candidate > b) {
                best = Some(candidate);
            }
        }

        match best {
            Some((_, _, at)) => {
                fixed.extend(&chars[..at]);
                fixed.push(' ');
                fixed.extend(&chars[at..]);
            }
            None => fixed.push_str(&token),
        }
    }
    fixed
}

/// Merge token triples where dropping the whitespace between two non-words
/// makes a word: "w est" becomes "west".
pub fn remove_spaces(line: &str, vocab: &impl Vocab) -> String {
    let tokens = tokenize(line);
    if tokens.len() <= 2 {
        return line.to_string();
    }

    let mut merged: Vec<SmolStr> = tokens[..2].to_vec();
    for at in 2..tokens.len() {
        let prev = &tokens[at - 2];
        let between = &tokens[at - 1];
        let curr = &tokens[at];

        let joined = format!("{prev}{curr}");
        if is_space(between)
            && vocab.is_word(&joined)
            && !(vocab.is_word(prev) || vocab.is_word(curr))
        {
            merged.pop();
            merged.pop();
            merged.push(SmolStr::new(joined));
        } else {
            merged.push(curr.clone());
        }
    }
    merged.iter().map(SmolStr::as_str).collect()
}

/// Run the spell corrector over letter-only tokens, leaving numbers,
/// punctuation, and mixed tokens untouched.
pub fn spell_correct(line: &str, vocab: &impl Vocab) -> String {
    tokenize(line)
        .iter()
        .map(|token| {
            if is_letters(token) {
                vocab.correct(token)
            } else {
                token.to_string()
            }
        })
        .collect()
}

/// The whole cleanup pipeline: rewrites, then spacing repair, then
/// spelling.
pub fn post_process(line: &str, vocab: &impl Vocab) -> String {
    let line = substitute(line);
    let line = add_spaces(&line, vocab, DEFAULT_VOCAB_LEN);
    let line = remove_spaces(&line, vocab);
    spell_correct(&line, vocab)
}
