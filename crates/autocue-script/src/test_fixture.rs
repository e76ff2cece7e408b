//! Canonical three-slide corpus used across the workspace's tests.
//!
//! The transcripts come from the prepared demo deck; chunks are derived the
//! same way the offline preparation step derives them: a 7-word window slid
//! one word at a time over the concatenated transcript stream, each window
//! tagged with the distinct transcripts its words came from, in word order.

use crate::types::{Chunk, TranscriptItem, CHUNK_WINDOW_WORDS};

pub const T0_TEXT: &str = "the ability to say no";
pub const T1_TEXT: &str = "have you ever struggled when you tried to say no to someone";
pub const T2_TEXT: &str = "or perhaps you couldnt say no to a person because you felt bad for them";

pub fn fixture_transcripts() -> Vec<TranscriptItem> {
    [T0_TEXT, T1_TEXT, T2_TEXT]
        .iter()
        .enumerate()
        .map(|(i, text)| TranscriptItem {
            transcript_index: i as u32,
            transcript_id: format!("t{i}"),
            transcript: (*text).to_owned(),
            early_forward: true,
        })
        .collect()
}

pub fn fixture_chunks() -> Vec<Chunk> {
    sliding_chunks(&fixture_transcripts())
}

/// Derive the sliding-window chunk list for a transcript sequence.
pub fn sliding_chunks(transcripts: &[TranscriptItem]) -> Vec<Chunk> {
    let mut words: Vec<(&str, &str)> = Vec::new();
    for t in transcripts {
        for word in t.transcript.split_whitespace() {
            words.push((word, t.transcript_id.as_str()));
        }
    }

    let mut chunks = Vec::new();
    if words.len() < CHUNK_WINDOW_WORDS {
        return chunks;
    }
    for (start, window) in words.windows(CHUNK_WINDOW_WORDS).enumerate() {
        let text: Vec<&str> = window.iter().map(|(w, _)| *w).collect();
        let mut sources: Vec<String> = Vec::new();
        for (_, source) in window {
            if sources.last().map(String::as_str) != Some(*source) {
                sources.push((*source).to_owned());
            }
        }
        chunks.push(Chunk {
            chunk_index: start as u32,
            chunk_id: format!("c{start}"),
            source_transcripts: sources,
            chunk: text.join(" "),
        });
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixture_has_expected_shape() {
        let chunks = fixture_chunks();
        // 32 words total, so 26 windows of 7.
        assert_eq!(chunks.len(), 26);
        assert_eq!(chunks[0].chunk, "the ability to say no have you");
        assert_eq!(chunks[0].source_transcripts, vec!["t0", "t1"]);
        // First window entirely inside t2.
        assert_eq!(chunks[17].chunk, "or perhaps you couldnt say no to");
        assert_eq!(chunks[17].source_transcripts, vec!["t2"]);
    }

    #[test]
    fn last_window_before_boundary_is_detected() {
        let chunks = fixture_chunks();
        // Window 16 is the last one whose first word is still in t1.
        assert_eq!(chunks[16].source_transcripts[0], "t1");
        assert_eq!(chunks[17].source_transcripts[0], "t2");
    }
}
