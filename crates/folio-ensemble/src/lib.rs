//! Fusing one label's OCR variants into a single transcription.
//!
//! An external runner reads the same label image through several (image
//! transform, OCR engine) pipelines and hands the resulting lines to
//! [`Ensemble::fuse`], which filters outliers, aligns the survivors, votes
//! a consensus, and optionally cleans it up. Image work and engine
//! invocation stay outside this crate; the pipe list only tells the runner
//! which variants to prepare and tells the ensemble which text steps run.

use std::str::FromStr;
use std::sync::Once;

use log::warn;
use thiserror::Error;

use folio_align::{consensus, filter_lines, AlignError, LineAligner, MultipleAligner, DEFAULT_THRESHOLD};
use folio_matrix::CharSubMatrix;
use folio_text::{post_process, substitute, Vocab};

mod pipe;

pub use pipe::Pipe;

/// Errors raised while configuring or running the ensemble.
#[derive(Error, Debug)]
pub enum EnsembleError {
    #[error("no pipelines enabled")]
    NoPipes,

    #[error("character set {0:?} has no substitution matrix")]
    EmptyMatrix(String),

    #[error("unknown pipeline {0:?}")]
    UnknownPipe(String),

    #[error(transparent)]
    Align(#[from] AlignError),
}

/// A configured fusion pipeline over one substitution matrix.
pub struct Ensemble<V> {
    pipes: Vec<Pipe>,
    aligner: MultipleAligner<CharSubMatrix>,
    vocab: Option<V>,
    threshold: usize,
}

impl<V: Vocab> Ensemble<V> {
    /// Build an ensemble from the enabled pipes. The pipe list must not be
    /// empty and the matrix must actually hold the named character set.
    pub fn new(
        pipes: &[Pipe],
        matrix: CharSubMatrix,
        vocab: Option<V>,
    ) -> Result<Self, EnsembleError> {
        let enabled: Vec<Pipe> =
            Pipe::ALL.iter().copied().filter(|pipe| pipes.contains(pipe)).collect();
        if enabled.is_empty() {
            return Err(EnsembleError::NoPipes);
        }
        if matrix.is_empty() {
            return Err(EnsembleError::EmptyMatrix(matrix.char_set().to_string()));
        }

        let aligner = MultipleAligner::new(LineAligner::new(matrix));
        Ok(Self { pipes: enabled, aligner, vocab, threshold: DEFAULT_THRESHOLD })
    }

    fn has(&self, pipe: Pipe) -> bool {
        self.pipes.contains(&pipe)
    }

    /// Whether the runner must deskew the image. Binarize and denoise
    /// build on a deskewed image, so they imply it.
    pub fn needs_deskew(&self) -> bool {
        self.pipes.iter().any(|p| matches!(p, Pipe::DeskewEasyocr | Pipe::DeskewTesseract))
            || self.needs_binarize()
    }

    pub fn needs_binarize(&self) -> bool {
        self.pipes.iter().any(|p| matches!(p, Pipe::BinarizeEasyocr | Pipe::BinarizeTesseract))
            || self.needs_denoise()
    }

    pub fn needs_denoise(&self) -> bool {
        self.pipes.iter().any(|p| matches!(p, Pipe::DenoiseEasyocr | Pipe::DenoiseTesseract))
    }

    /// Comma-joined labels of the enabled pipes, for run records.
    pub fn pipeline(&self) -> String {
        let labels: Vec<&str> = self.pipes.iter().map(|p| p.label()).collect();
        labels.join(",")
    }

    /// Fuse the lines the enabled pipelines produced for one label.
    ///
    /// Gap characters survive in the output unless the post-process pipe
    /// is enabled; its first rewrite strips them.
    pub fn fuse(&self, lines: &[String]) -> String {
        let lines: Vec<String> = if self.has(Pipe::PreProcess) {
            lines.iter().map(|line| substitute(line)).collect()
        } else {
            lines.to_vec()
        };

        let lines = filter_lines(&lines, self.threshold);
        let rows = self.aligner.align(&lines);
        let fused = consensus(&rows);

        if self.has(Pipe::PostProcess) {
            self.post(&fused)
        } else {
            fused
        }
    }

    fn post(&self, fused: &str) -> String {
        match &self.vocab {
            Some(vocab) => post_process(fused, vocab),
            None => {
                // Degrade to the regex rewrites alone rather than failing
                // the whole fusion.
                static MISSING_VOCAB: Once = Once::new();
                MISSING_VOCAB.call_once(|| {
                    warn!("post_process enabled without a lexicon; dictionary steps skipped");
                });
                substitute(fused)
            }
        }
    }
}

impl FromStr for Pipe {
    type Err = EnsembleError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Pipe::ALL
            .iter()
            .copied()
            .find(|pipe| pipe.name() == name)
            .ok_or_else(|| EnsembleError::UnknownPipe(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_matrix::{MatrixEntry, IDENTITY_SUB};
    use folio_text::Lexicon;
    use pretty_assertions::assert_eq;

    fn identity_matrix(lines: &[&str]) -> CharSubMatrix {
        let mut matrix = CharSubMatrix::new("default");
        for ch in lines.iter().flat_map(|l| l.chars()) {
            matrix.insert(ch, ch, MatrixEntry { score: None, sub: IDENTITY_SUB });
        }
        matrix
    }

    fn strings(lines: &[&str]) -> Vec<String> {
        lines.iter().map(|l| l.to_string()).collect()
    }

    #[test]
    fn test_no_pipes_rejected() {
        let err = Ensemble::<Lexicon>::new(&[], identity_matrix(&["a"]), None).err();
        assert!(matches!(err, Some(EnsembleError::NoPipes)));
    }

    #[test]
    fn test_empty_matrix_rejected() {
        let matrix = CharSubMatrix::new("default");
        let err = Ensemble::<Lexicon>::new(&[Pipe::NoneTesseract], matrix, None).err();
        assert!(matches!(err, Some(EnsembleError::EmptyMatrix(name)) if name == "default"));
    }

    #[test]
    fn test_transform_implications() {
        let matrix = identity_matrix(&["a"]);
        let ensemble =
            Ensemble::<Lexicon>::new(&[Pipe::DenoiseEasyocr], matrix, None).expect("config");
        assert!(ensemble.needs_denoise());
        assert!(ensemble.needs_binarize());
        assert!(ensemble.needs_deskew());
    }

    #[test]
    fn test_deskew_alone() {
        let matrix = identity_matrix(&["a"]);
        let ensemble =
            Ensemble::<Lexicon>::new(&[Pipe::DeskewTesseract], matrix, None).expect("config");
        assert!(ensemble.needs_deskew());
        assert!(!ensemble.needs_binarize());
        assert!(!ensemble.needs_denoise());
    }

    #[test]
    fn test_pipeline_labels_in_canonical_order() {
        let matrix = identity_matrix(&["a"]);
        let ensemble = Ensemble::<Lexicon>::new(
            &[Pipe::PostProcess, Pipe::NoneEasyocr, Pipe::DeskewTesseract],
            matrix,
            None,
        )
        .expect("config");
        assert_eq!(ensemble.pipeline(), "[,easyocr],[deskew,tesseract],[post_process]");
    }

    #[test]
    fn test_pipe_parsing() {
        assert!(matches!("none_easyocr".parse(), Ok(Pipe::NoneEasyocr)));
        assert!(matches!("denoise_tesseract".parse(), Ok(Pipe::DenoiseTesseract)));
        let err = "upscale_easyocr".parse::<Pipe>().err();
        assert!(matches!(err, Some(EnsembleError::UnknownPipe(name)) if name == "upscale_easyocr"));
    }

    #[test]
    fn test_fuse_votes_out_single_engine_errors() {
        let lines = strings(&[
            "North Carolina NORTH CAROLINA Guilford County",
            "North Carolina OT CAROLINA Guilford County",
        ]);
        let matrix = identity_matrix(&["North Carolina NORTH CAROLINA Guilford County"]);
        let ensemble = Ensemble::<Lexicon>::new(
            &[Pipe::NoneEasyocr, Pipe::NoneTesseract],
            matrix,
            None,
        )
        .expect("config");
        assert_eq!(ensemble.fuse(&lines), "North Carolina NORTH CAROLINA Guilford County");
    }

    #[test]
    fn test_fuse_single_line_passes_through() {
        let matrix = identity_matrix(&["Guilford County"]);
        let ensemble =
            Ensemble::<Lexicon>::new(&[Pipe::NoneEasyocr], matrix, None).expect("config");
        assert_eq!(ensemble.fuse(&strings(&["Guilford County"])), "Guilford County");
        assert_eq!(ensemble.fuse(&[]), "");
    }

    #[test]
    fn test_fuse_post_process_cleans_consensus() {
        let lines = strings(&["Guilford  County", "Guilford  County", "Guilford Bounty"]);
        let matrix = identity_matrix(&["Guilford County B"]);
        let mut lexicon = Lexicon::new();
        lexicon.add("guilford", 5);
        lexicon.add("county", 60);
        let ensemble = Ensemble::new(
            &[Pipe::NoneEasyocr, Pipe::PostProcess],
            matrix,
            Some(lexicon),
        )
        .expect("config");
        assert_eq!(ensemble.fuse(&lines), "Guilford County");
    }

    #[test]
    fn test_fuse_without_lexicon_degrades_to_rewrites() {
        let lines = strings(&["a  b", "a  b"]);
        let matrix = identity_matrix(&["a b"]);
        let ensemble =
            Ensemble::<Lexicon>::new(&[Pipe::NoneEasyocr, Pipe::PostProcess], matrix, None)
                .expect("config");
        assert_eq!(ensemble.fuse(&lines), "a b");
    }

    #[test]
    fn test_pre_process_applies_to_raw_lines() {
        let lines = strings(&["x ,y", "x ,y"]);
        let matrix = identity_matrix(&["x,y"]);
        let ensemble =
            Ensemble::<Lexicon>::new(&[Pipe::NoneEasyocr, Pipe::PreProcess], matrix, None)
                .expect("config");
        assert_eq!(ensemble.fuse(&lines), "x,y");
    }
}
