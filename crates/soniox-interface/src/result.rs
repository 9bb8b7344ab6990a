/// One recognized word with timing, finality and speaker attribution.
///
/// Words in a [`RecognitionResult`] are chronological. Final words are
/// settled; a trailing run of non-final words is speculative and may be
/// replaced wholesale by the next partial update.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Word {
    pub text: String,
    pub start_ms: i32,
    pub duration_ms: i32,
    pub is_final: bool,
    pub speaker: i32,
}

/// Speaker-label metadata attached to a result. Replaced as a whole on
/// every update, never merged element-wise.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Speaker {
    pub id: i32,
    pub name: String,
}

/// Transcription of one audio channel. Channel 0 carries the whole
/// session when separate recognition per channel is disabled.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RecognitionResult {
    pub channel: i32,
    pub words: Vec<Word>,
    pub final_proc_time_ms: i32,
    pub total_proc_time_ms: i32,
    pub speakers: Vec<Speaker>,
}

impl RecognitionResult {
    /// Concatenated word text, mostly useful for display and tests.
    pub fn text(&self) -> String {
        self.words
            .iter()
            .map(|w| w.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Outcome of a completed session.
///
/// The variant mirrors `enable_separate_recognition_per_channel`
/// bit-for-bit: `Single` when separation was off, `SeparateRecognition`
/// (channel results sorted ascending) when it was on.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CompleteResult {
    Single { result: RecognitionResult },
    SeparateRecognition { channel_results: Vec<RecognitionResult> },
}

impl CompleteResult {
    /// All channel results in channel order, regardless of variant.
    pub fn results(&self) -> &[RecognitionResult] {
        match self {
            CompleteResult::Single { result } => std::slice::from_ref(result),
            CompleteResult::SeparateRecognition { channel_results } => channel_results,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn results_is_uniform_over_both_variants() {
        let single = CompleteResult::Single {
            result: RecognitionResult::default(),
        };
        assert_eq!(single.results().len(), 1);

        let separate = CompleteResult::SeparateRecognition {
            channel_results: vec![
                RecognitionResult {
                    channel: 0,
                    ..Default::default()
                },
                RecognitionResult {
                    channel: 1,
                    ..Default::default()
                },
            ],
        };
        assert_eq!(separate.results().len(), 2);
    }

    #[test]
    fn text_joins_words() {
        let result = RecognitionResult {
            words: vec![
                Word {
                    text: "hello".into(),
                    is_final: true,
                    ..Default::default()
                },
                Word {
                    text: "world".into(),
                    is_final: true,
                    ..Default::default()
                },
            ],
            ..Default::default()
        };
        assert_eq!(result.text(), "hello world");
    }
}
