//! Append-only JSONL session journal with a SHA-256 hash chain.
//!
//! Line 1 holds the header (format version, build id, run seed, config).
//! Every following line is one applied [`SessionInput`] plus the hash of its
//! body chained to the previous record's hash. Each append is flushed, so a
//! crash loses at most the line being written; loading stops with an error at
//! the first line that is incomplete, malformed or breaks the chain.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::mem;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::config::DungeonConfig;
use crate::journal::{InputJournal, InputRecord, JOURNAL_FORMAT_VERSION, SessionInput};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
struct FileHeader {
    format_version: u16,
    build_id: String,
    seed: u64,
    config: DungeonConfig,
}

/// Hash input for one record, serialized as JSON.
#[derive(Serialize)]
struct RecordBody<'a> {
    seq: u64,
    tick: u64,
    input: &'a SessionInput,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
struct FileRecord {
    seq: u64,
    tick: u64,
    input: SessionInput,
    prev_sha256_hex: String,
    sha256_hex: String,
}

const INITIAL_HASH: &str = "0000000000000000000000000000000000000000000000000000000000000000";

fn chain_hash(body_json: &str, prev_sha256_hex: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(body_json.as_bytes());
    hasher.update(prev_sha256_hex.as_bytes());
    format!("{:064x}", hasher.finalize())
}

pub struct JournalWriter {
    writer: BufWriter<File>,
    last_sha256_hex: String,
    next_seq: u64,
}

impl JournalWriter {
    /// Creates (or truncates) `path` and writes the header line.
    pub fn create(
        path: &Path,
        seed: u64,
        build_id: &str,
        config: &DungeonConfig,
    ) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut writer = BufWriter::new(File::create(path)?);

        let header = FileHeader {
            format_version: JOURNAL_FORMAT_VERSION,
            build_id: build_id.to_string(),
            seed,
            config: config.clone(),
        };
        let header_json = serde_json::to_string(&header).map_err(io::Error::other)?;
        writeln!(writer, "{header_json}")?;
        writer.flush()?;

        Ok(Self { writer, last_sha256_hex: INITIAL_HASH.to_string(), next_seq: 0 })
    }

    /// Continues a journal previously read with [`load_journal_from_file`].
    pub fn resume(path: &Path, loaded: &LoadedJournal) -> io::Result<Self> {
        let file = OpenOptions::new().append(true).open(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
            last_sha256_hex: loaded.last_sha256_hex.clone(),
            next_seq: loaded.next_seq,
        })
    }

    pub fn append(&mut self, tick: u64, input: &SessionInput) -> io::Result<()> {
        let seq = self.next_seq;
        let body_json =
            serde_json::to_string(&RecordBody { seq, tick, input }).map_err(io::Error::other)?;
        let sha256_hex = chain_hash(&body_json, &self.last_sha256_hex);

        let record = FileRecord {
            seq,
            tick,
            input: *input,
            prev_sha256_hex: mem::take(&mut self.last_sha256_hex),
            sha256_hex: sha256_hex.clone(),
        };
        let record_json = serde_json::to_string(&record).map_err(io::Error::other)?;
        writeln!(self.writer, "{record_json}")?;
        self.writer.flush()?;

        self.last_sha256_hex = sha256_hex;
        self.next_seq += 1;
        Ok(())
    }
}

#[derive(Debug)]
pub struct LoadedJournal {
    pub journal: InputJournal,
    /// Hash of the last valid record, or the all-zero hash when there is none.
    pub last_sha256_hex: String,
    pub next_seq: u64,
}

#[derive(Debug, Error)]
pub enum JournalLoadError {
    #[error("journal I/O error")]
    Io(#[from] io::Error),

    #[error("journal file is empty")]
    EmptyFile,

    #[error("invalid journal header at line {line}: {message}")]
    InvalidHeader { line: usize, message: String },

    #[error("invalid journal record at line {line}: {message}")]
    InvalidRecord { line: usize, message: String },

    #[error("incomplete journal line at line {line}")]
    IncompleteLine { line: usize },

    #[error("SHA-256 hash chain broken at line {line}")]
    HashChainBroken { line: usize },
}

pub fn load_journal_from_file(path: &Path) -> Result<LoadedJournal, JournalLoadError> {
    let content = fs::read_to_string(path)?;
    let lines: Vec<&str> = content.lines().collect();
    if lines.is_empty() {
        return Err(JournalLoadError::EmptyFile);
    }
    if !content.ends_with('\n') {
        return Err(JournalLoadError::IncompleteLine { line: lines.len() });
    }

    let header: FileHeader = serde_json::from_str(lines[0])
        .map_err(|e| JournalLoadError::InvalidHeader { line: 1, message: e.to_string() })?;
    let mut journal = InputJournal {
        format_version: header.format_version,
        build_id: header.build_id,
        seed: header.seed,
        config: header.config,
        inputs: Vec::new(),
    };

    let mut prev_sha256_hex = INITIAL_HASH.to_string();
    let mut next_seq: u64 = 0;

    for (offset, line) in lines.iter().enumerate().skip(1) {
        let line_number = offset + 1;
        let invalid = |message: String| JournalLoadError::InvalidRecord { line: line_number, message };

        let record: FileRecord =
            serde_json::from_str(line).map_err(|e| invalid(e.to_string()))?;
        if record.seq != next_seq {
            return Err(invalid(format!("expected seq {next_seq}, found {}", record.seq)));
        }
        if record.prev_sha256_hex != prev_sha256_hex {
            return Err(JournalLoadError::HashChainBroken { line: line_number });
        }

        let body = RecordBody { seq: record.seq, tick: record.tick, input: &record.input };
        let body_json = serde_json::to_string(&body).map_err(|e| invalid(e.to_string()))?;
        if record.sha256_hex != chain_hash(&body_json, &prev_sha256_hex) {
            return Err(JournalLoadError::HashChainBroken { line: line_number });
        }

        journal.inputs.push(InputRecord { seq: record.seq, tick: record.tick, input: record.input });
        prev_sha256_hex = record.sha256_hex;
        next_seq += 1;
    }

    Ok(LoadedJournal { journal, last_sha256_hex: prev_sha256_hex, next_seq })
}

#[cfg(test)]
mod tests;
