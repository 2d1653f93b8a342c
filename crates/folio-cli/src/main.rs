//! Command-line front end for the folio OCR ensemble.

use std::fs;
use std::path::PathBuf;

use anyhow::{ensure, Context, Result};
use clap::{Parser, Subcommand};
use log::info;

use folio_align::GAP;
use folio_ensemble::{Ensemble, Pipe};
use folio_matrix::{extend_matrix, MatrixStore, RenderConfig};
use folio_text::Lexicon;

/// Characters a herbarium-label matrix should cover: letters, digits, the
/// punctuation OCR engines actually emit, and both whitespace kinds.
const DEFAULT_CHARS: &str = "abcdefghijklmnopqrstuvwxyz\
                             ABCDEFGHIJKLMNOPQRSTUVWXYZ\
                             0123456789 \n\
                             .,:;!?\"'`*/\\%&#@$()[]{}<>=+-_~\u{00B0}";

#[derive(Parser)]
#[command(name = "folio", version, about = "Fuse noisy OCR transcriptions of herbarium labels")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Add characters to a named character-substitution matrix
    AddChars {
        /// SQLite database holding the matrices
        #[arg(long, value_name = "PATH")]
        db: PathBuf,

        /// Character set to update
        #[arg(long, default_value = "default")]
        char_set: String,

        /// Characters to add; existing pair scores are kept
        #[arg(long, default_value = DEFAULT_CHARS)]
        chars: String,

        /// TrueType font the characters are rendered with
        #[arg(long, value_name = "PATH")]
        font: PathBuf,

        /// Side of the square canvas, in pixels
        #[arg(long, default_value_t = 40)]
        canvas: usize,

        /// Point size of the rendered characters
        #[arg(long, default_value_t = 24.0)]
        point_size: f32,
    },

    /// Fuse per-engine transcriptions of one label into a consensus
    Fuse {
        /// SQLite database holding the matrices
        #[arg(long, value_name = "PATH")]
        db: PathBuf,

        /// Character set to align with
        #[arg(long, default_value = "default")]
        char_set: String,

        /// Word-frequency list for the dictionary post-processing steps
        #[arg(long, value_name = "PATH")]
        lexicon: Option<PathBuf>,

        /// Enabled pipelines, comma separated
        #[arg(
            long,
            value_delimiter = ',',
            default_value = "none_easyocr,none_tesseract,post_process"
        )]
        pipes: Vec<Pipe>,

        /// Files holding one engine's transcription each
        #[arg(value_name = "FILE", required = true)]
        files: Vec<PathBuf>,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    match Cli::parse().command {
        Command::AddChars { db, char_set, chars, font, canvas, point_size } => {
            add_chars(&db, &char_set, &chars, &font, canvas, point_size)
        }
        Command::Fuse { db, char_set, lexicon, pipes, files } => {
            fuse(&db, &char_set, lexicon.as_deref(), &pipes, &files)
        }
    }
}

fn add_chars(
    db: &PathBuf,
    char_set: &str,
    chars: &str,
    font: &PathBuf,
    canvas: usize,
    point_size: f32,
) -> Result<()> {
    ensure!(canvas > 0, "canvas must be at least one pixel");
    let font_data =
        fs::read(font).with_context(|| format!("reading font {}", font.display()))?;

    let mut store = MatrixStore::open(db)
        .with_context(|| format!("opening matrix store {}", db.display()))?;
    let existing = store.load(char_set)?;

    let cfg = RenderConfig { canvas, point_size };
    let matrix = extend_matrix(&existing, chars, &font_data, &cfg)?;
    store.replace(&matrix)?;

    info!("stored {} pairs for character set {char_set}", matrix.len());
    Ok(())
}

fn fuse(
    db: &PathBuf,
    char_set: &str,
    lexicon: Option<&std::path::Path>,
    pipes: &[Pipe],
    files: &[PathBuf],
) -> Result<()> {
    let store = MatrixStore::open(db)
        .with_context(|| format!("opening matrix store {}", db.display()))?;
    let matrix = store.load(char_set)?;

    let vocab = match lexicon {
        Some(path) => Some(
            Lexicon::from_path(path)
                .with_context(|| format!("reading lexicon {}", path.display()))?,
        ),
        None => None,
    };

    let ensemble = Ensemble::new(pipes, matrix, vocab)?;

    let mut lines = Vec::with_capacity(files.len());
    for file in files {
        let text = fs::read_to_string(file)
            .with_context(|| format!("reading transcription {}", file.display()))?;
        lines.push(text.trim_end_matches('\n').to_string());
    }

    let fused: String = ensemble.fuse(&lines).chars().filter(|&ch| ch != GAP).collect();
    println!("{fused}");
    Ok(())
}
