//! Speech-to-text and text-to-speech results.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::serde_util::null_as_default;

/// A transcribed word with timings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Word {
    /// The word.
    #[serde(deserialize_with = "null_as_default")]
    pub word: String,
    /// Start offset in seconds.
    pub start: f32,
    /// End offset in seconds.
    pub end: f32,
}

/// A transcribed segment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Segment {
    /// Segment ID.
    pub id: u32,
    /// Mean token log-probability.
    #[serde(rename = "avg_logprob")]
    pub avg_log_prob: f32,
    /// Text compression ratio.
    pub compression_ratio: f32,
    /// Probability the segment is silence.
    pub no_speech_prob: f32,
    /// Seek offset.
    pub seek: u32,
    /// Start offset in seconds.
    pub start: f32,
    /// End offset in seconds.
    pub end: f32,
    /// Decoding temperature.
    pub temperature: f32,
    /// Segment text.
    #[serde(deserialize_with = "null_as_default")]
    pub text: String,
    /// Token IDs.
    #[serde(deserialize_with = "null_as_default")]
    pub tokens: Vec<u32>,
}

/// Body returned by `POST /audio/transcriptions`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Transcription {
    /// Full transcript.
    #[serde(deserialize_with = "null_as_default")]
    pub text: String,
    /// Detected language.
    #[serde(deserialize_with = "null_as_default")]
    pub language: String,
    /// `"transcribe"` or `"translate"`.
    #[serde(deserialize_with = "null_as_default")]
    pub task: String,
    /// Audio duration in seconds.
    pub duration: f32,
    /// Word timings, when requested.
    #[serde(deserialize_with = "null_as_default")]
    pub words: Vec<Word>,
    /// Segment breakdown.
    #[serde(deserialize_with = "null_as_default")]
    pub segments: Vec<Segment>,
}

/// Location of a synthesized speech file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Speech {
    /// Full path of the file.
    pub full: PathBuf,
    /// File name, e.g. `speech_<uuid>.mp3`.
    pub name: String,
    /// Directory holding the file.
    pub directory: PathBuf,
    /// Extension without the dot.
    pub extension: String,
}

impl Speech {
    /// Describe the file `name` in `directory`.
    #[must_use]
    pub fn new(directory: &Path, name: impl Into<String>, extension: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            full: directory.join(&name),
            name,
            directory: directory.to_path_buf(),
            extension: extension.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_transcription_with_null_words() {
        let t: Transcription = serde_json::from_str(
            r#"{"text": "Make me a story.", "language": "english", "task": "transcribe",
                "duration": 11.45, "words": null,
                "segments": [{"id": 0, "avg_logprob": -0.65, "compression_ratio": 0.94,
                    "end": 11.5, "no_speech_prob": 0.15, "seek": 0, "start": 0.0,
                    "temperature": 0.0, "text": " Make me a story.", "tokens": [50364, 4387]}]}"#,
        )
        .unwrap();
        assert_eq!(t.text, "Make me a story.");
        assert!(t.words.is_empty());
        assert_eq!(t.segments[0].tokens, vec![50364, 4387]);
    }

    #[test]
    fn speech_paths() {
        let s = Speech::new(Path::new("/tmp"), "speech_x.wav", "wav");
        assert_eq!(s.full, PathBuf::from("/tmp/speech_x.wav"));
        assert_eq!(s.directory, PathBuf::from("/tmp"));
    }
}
