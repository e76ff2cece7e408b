use serde::{Deserialize, Serialize};

/// Width of the sliding chunk window, in words. Fixed by the prepared input
/// data.
pub const CHUNK_WINDOW_WORDS: usize = 7;

/// One slide's worth of normalized speech text plus metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptItem {
    /// Dense 0-based position; coincides with the slide index.
    pub transcript_index: u32,
    /// Stable opaque identifier.
    pub transcript_id: String,
    /// Normalized transcript text.
    pub transcript: String,
    /// Marks a transcript whose end is a fluid transition point. Missing in
    /// the input means `false`.
    #[serde(default)]
    pub early_forward: bool,
}

/// A fixed-width window of concatenated transcript words, tagged with the
/// transcripts whose words appear in it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub chunk_index: u32,
    pub chunk_id: String,
    /// Distinct source transcripts in word order: one element for a window
    /// strictly inside a transcript, two for a window straddling a boundary.
    pub source_transcripts: Vec<String>,
    /// Normalized window text, `CHUNK_WINDOW_WORDS` space-separated words.
    pub chunk: String,
}

impl Chunk {
    /// Transcript id of the first word in the window.
    pub fn first_source(&self) -> &str {
        // Validated non-empty at corpus load.
        &self.source_transcripts[0]
    }

    pub fn straddles_boundary(&self) -> bool {
        self.source_transcripts.len() > 1
    }

    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.chunk.split_whitespace()
    }
}
