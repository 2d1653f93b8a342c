//! Post-processing of fused OCR text.
//!
//! A consensus line still carries typical OCR damage: leftover gap marks,
//! stray punctuation, words run together or torn apart, and misspellings.
//! This crate fixes what it can with ordered regex rewrites and a
//! word-frequency lexicon.

use thiserror::Error;

mod lexicon;
mod spacing;
mod substitute;

pub use lexicon::{Lexicon, Vocab};
pub use spacing::{add_spaces, post_process, remove_spaces, spell_correct, DEFAULT_VOCAB_LEN};
pub use substitute::substitute;

/// Errors from loading the lexicon.
#[derive(Error, Debug)]
pub enum TextError {
    #[error("could not read the lexicon: {0}")]
    Read(#[from] std::io::Error),

    #[error("malformed count on lexicon line {line}: {text:?}")]
    BadCount { line: usize, text: String },
}
