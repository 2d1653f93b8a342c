//! SQLite persistence for named matrices.

use std::path::Path;

use log::debug;
use rusqlite::{params, Connection};

use crate::{CharSubMatrix, MatrixEntry, MatrixError};

const CREATE_TABLE: &str = "
    create table if not exists char_sub_matrix (
        char1    text not null,
        char2    text not null,
        char_set text not null,
        score    real,
        sub      real not null,
        primary key (char1, char2, char_set)
    )";

/// Store for substitution matrices, one row per character pair. Rows keep
/// `char1 <= char2`, mirroring the in-memory key normalization.
pub struct MatrixStore {
    conn: Connection,
}

impl MatrixStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, MatrixError> {
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, MatrixError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, MatrixError> {
        conn.execute(CREATE_TABLE, [])?;
        Ok(Self { conn })
    }

    /// Load the named matrix. A name with no rows loads as an empty
    /// matrix; whether that is an error is the caller's call.
    pub fn load(&self, char_set: &str) -> Result<CharSubMatrix, MatrixError> {
        let mut stmt = self
            .conn
            .prepare("select char1, char2, score, sub from char_sub_matrix where char_set = ?1")?;
        let mut rows = stmt.query([char_set])?;

        let mut matrix = CharSubMatrix::new(char_set);
        while let Some(row) = rows.next()? {
            let char1: String = row.get(0)?;
            let char2: String = row.get(1)?;
            let score: Option<f64> = row.get(2)?;
            let sub: f64 = row.get(3)?;
            if let (Some(c1), Some(c2)) = (char1.chars().next(), char2.chars().next()) {
                matrix.insert(c1, c2, MatrixEntry { score, sub });
            }
        }
        debug!("loaded {} pairs for character set {char_set}", matrix.len());
        Ok(matrix)
    }

    /// Replace the stored matrix for this character set: delete the old
    /// rows and insert the new ones in a single transaction, so a reader
    /// sees the old matrix or the new one, never a mix.
    pub fn replace(&mut self, matrix: &CharSubMatrix) -> Result<(), MatrixError> {
        let tx = self.conn.transaction()?;
        tx.execute("delete from char_sub_matrix where char_set = ?1", [matrix.char_set()])?;
        {
            let mut stmt = tx.prepare(
                "insert into char_sub_matrix (char1, char2, char_set, score, sub)
                 values (?1, ?2, ?3, ?4, ?5)",
            )?;
            for ((c1, c2), entry) in matrix.iter() {
                stmt.execute(params![
                    c1.to_string(),
                    c2.to_string(),
                    matrix.char_set(),
                    entry.score,
                    entry.sub,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }
}
