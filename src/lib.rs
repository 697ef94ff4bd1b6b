pub mod audio;
pub mod clipboard;
pub mod config;
pub mod pipeline;
pub mod segment;
pub mod stt;
pub mod telemetry;

pub use pipeline::{transcribe_chunked, transcribe_file};
pub use segment::{split_on_silence, Segment, SegmenterConfig};
pub use stt::{SpeechToText, Transcriber};
