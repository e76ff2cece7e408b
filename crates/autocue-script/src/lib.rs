pub mod corpus;
pub mod normalize;
pub mod test_fixture;
pub mod types;

pub use corpus::{ScriptCorpus, ScriptError};
pub use normalize::normalize;
pub use types::{Chunk, TranscriptItem, CHUNK_WINDOW_WORDS};
