use std::collections::HashMap;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use crate::normalize::normalize;
use crate::types::{Chunk, TranscriptItem, CHUNK_WINDOW_WORDS};

#[derive(Error, Debug)]
pub enum ScriptError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("{what} list is empty")]
    Empty { what: &'static str },

    #[error("Transcript at position {position} has index {found}, expected dense index {expected}")]
    NonDenseTranscriptIndex {
        position: usize,
        expected: u32,
        found: u32,
    },

    #[error("Chunk at position {position} has index {found}, expected dense index {expected}")]
    NonDenseChunkIndex {
        position: usize,
        expected: u32,
        found: u32,
    },

    #[error("Duplicate {what} id: {id}")]
    DuplicateId { what: &'static str, id: String },

    #[error("Chunk {chunk_id} lists {count} source transcripts, expected 1 or 2")]
    BadSourceCount { chunk_id: String, count: usize },

    #[error("Chunk {chunk_id} references unknown transcript {transcript_id}")]
    UnknownSourceTranscript {
        chunk_id: String,
        transcript_id: String,
    },

    #[error("Chunk {chunk_id} lists source transcripts out of word order")]
    UnorderedSources { chunk_id: String },

    #[error("Chunk {chunk_id} has {tokens} words, expected {expected}")]
    BadWindowWidth {
        chunk_id: String,
        tokens: usize,
        expected: usize,
    },

    #[error("Chunks {previous} and {next} do not overlap by a one-word slide")]
    WindowOverlapMismatch { previous: String, next: String },
}

/// The immutable session corpus: ordered transcripts, ordered chunks and the
/// lookup indexes derived from them. Loaded once at session start and shared
/// read-only between pipeline threads.
#[derive(Debug)]
pub struct ScriptCorpus {
    transcripts: Vec<TranscriptItem>,
    chunks: Vec<Chunk>,
    chunk_pos_by_id: HashMap<String, usize>,
    transcript_pos_by_id: HashMap<String, usize>,
}

impl ScriptCorpus {
    /// Load and validate a corpus from the two prepared JSON files.
    ///
    /// Any violated invariant is a startup configuration error with a
    /// diagnostic naming the offending entity.
    pub fn load(
        transcripts_path: impl AsRef<Path>,
        chunks_path: impl AsRef<Path>,
    ) -> Result<Self, ScriptError> {
        let transcripts: Vec<TranscriptItem> = read_json(transcripts_path.as_ref())?;
        let chunks: Vec<Chunk> = read_json(chunks_path.as_ref())?;
        let corpus = Self::from_parts(transcripts, chunks)?;
        info!(
            transcripts = corpus.transcripts.len(),
            chunks = corpus.chunks.len(),
            "Script corpus loaded"
        );
        Ok(corpus)
    }

    /// Build a corpus from already-parsed items. Texts are re-normalized
    /// defensively; normalization is idempotent on well-prepared input.
    pub fn from_parts(
        mut transcripts: Vec<TranscriptItem>,
        mut chunks: Vec<Chunk>,
    ) -> Result<Self, ScriptError> {
        if transcripts.is_empty() {
            return Err(ScriptError::Empty {
                what: "transcript",
            });
        }
        if chunks.is_empty() {
            return Err(ScriptError::Empty { what: "chunk" });
        }

        for t in &mut transcripts {
            t.transcript = normalize(&t.transcript);
        }
        for c in &mut chunks {
            c.chunk = normalize(&c.chunk);
        }

        let mut transcript_pos_by_id = HashMap::with_capacity(transcripts.len());
        for (position, t) in transcripts.iter().enumerate() {
            if t.transcript_index as usize != position {
                return Err(ScriptError::NonDenseTranscriptIndex {
                    position,
                    expected: position as u32,
                    found: t.transcript_index,
                });
            }
            if transcript_pos_by_id
                .insert(t.transcript_id.clone(), position)
                .is_some()
            {
                return Err(ScriptError::DuplicateId {
                    what: "transcript",
                    id: t.transcript_id.clone(),
                });
            }
        }

        let mut chunk_pos_by_id = HashMap::with_capacity(chunks.len());
        for (position, c) in chunks.iter().enumerate() {
            if c.chunk_index as usize != position {
                return Err(ScriptError::NonDenseChunkIndex {
                    position,
                    expected: position as u32,
                    found: c.chunk_index,
                });
            }
            if chunk_pos_by_id.insert(c.chunk_id.clone(), position).is_some() {
                return Err(ScriptError::DuplicateId {
                    what: "chunk",
                    id: c.chunk_id.clone(),
                });
            }

            if c.source_transcripts.is_empty() || c.source_transcripts.len() > 2 {
                return Err(ScriptError::BadSourceCount {
                    chunk_id: c.chunk_id.clone(),
                    count: c.source_transcripts.len(),
                });
            }
            let mut previous_pos = None;
            for source_id in &c.source_transcripts {
                let Some(&pos) = transcript_pos_by_id.get(source_id) else {
                    return Err(ScriptError::UnknownSourceTranscript {
                        chunk_id: c.chunk_id.clone(),
                        transcript_id: source_id.clone(),
                    });
                };
                if let Some(prev) = previous_pos {
                    if pos <= prev {
                        return Err(ScriptError::UnorderedSources {
                            chunk_id: c.chunk_id.clone(),
                        });
                    }
                }
                previous_pos = Some(pos);
            }

            let tokens = c.tokens().count();
            if tokens != CHUNK_WINDOW_WORDS {
                return Err(ScriptError::BadWindowWidth {
                    chunk_id: c.chunk_id.clone(),
                    tokens,
                    expected: CHUNK_WINDOW_WORDS,
                });
            }
        }

        // Consecutive windows differ by a one-word slide.
        for pair in chunks.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            let a_tail: Vec<&str> = a.tokens().skip(1).collect();
            let b_head: Vec<&str> = b.tokens().take(CHUNK_WINDOW_WORDS - 1).collect();
            if a_tail != b_head {
                return Err(ScriptError::WindowOverlapMismatch {
                    previous: a.chunk_id.clone(),
                    next: b.chunk_id.clone(),
                });
            }
        }

        Ok(Self {
            transcripts,
            chunks,
            chunk_pos_by_id,
            transcript_pos_by_id,
        })
    }

    pub fn transcripts(&self) -> &[TranscriptItem] {
        &self.transcripts
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn transcript_at(&self, index: u32) -> Option<&TranscriptItem> {
        self.transcripts.get(index as usize)
    }

    pub fn chunk_at(&self, index: u32) -> Option<&Chunk> {
        self.chunks.get(index as usize)
    }

    pub fn chunk_by_id(&self, id: &str) -> Option<&Chunk> {
        self.chunk_pos_by_id.get(id).map(|&pos| &self.chunks[pos])
    }

    pub fn transcript_by_id(&self, id: &str) -> Option<&TranscriptItem> {
        self.transcript_pos_by_id
            .get(id)
            .map(|&pos| &self.transcripts[pos])
    }

    /// Position of a transcript in slide order.
    pub fn transcript_index_of(&self, id: &str) -> Option<u32> {
        self.transcript_pos_by_id.get(id).map(|&pos| pos as u32)
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ScriptError> {
    let bytes = std::fs::read(path).map_err(|source| ScriptError::Read {
        path: path.to_owned(),
        source,
    })?;
    serde_json::from_slice(&bytes).map_err(|source| ScriptError::Parse {
        path: path.to_owned(),
        source,
    })
}
