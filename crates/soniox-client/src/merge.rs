//! Folding partial per-channel results into a complete transcript.
//!
//! Each partial update carries everything the server has recognized
//! since the last *final* word on that channel: already-final words plus
//! a speculative non-final tail. Merging therefore drops the previous
//! speculative tail and appends the update's words verbatim. The
//! operation is order-sensitive; updates for one channel must be applied
//! in arrival order (the protocol delivers them in order per channel).

use std::collections::BTreeMap;

use soniox_interface::stream::PartialResult;
use soniox_interface::{CompleteResult, RecognitionResult};

use crate::{Error, Result};

/// Folds `incoming` into `accumulated`.
///
/// Both results must belong to the same channel. Trailing non-final
/// words of `accumulated` are retracted, incoming words are appended,
/// and processing times and speaker labels are replaced wholesale.
pub fn update(accumulated: &mut RecognitionResult, incoming: RecognitionResult) {
    debug_assert_eq!(accumulated.channel, incoming.channel);

    while accumulated.words.last().is_some_and(|w| !w.is_final) {
        accumulated.words.pop();
    }
    accumulated.words.extend(incoming.words);
    accumulated.final_proc_time_ms = incoming.final_proc_time_ms;
    accumulated.total_proc_time_ms = incoming.total_proc_time_ms;
    accumulated.speakers = incoming.speakers;
}

/// Per-channel accumulator for one session.
///
/// Owned by the single task consuming the read side of a session, so it
/// needs no locking. At session end, [`finalize`](Self::finalize) hands
/// the merged results to the caller.
pub struct ResultAccumulator {
    separate: bool,
    channels: BTreeMap<i32, RecognitionResult>,
}

impl ResultAccumulator {
    pub fn new(separate: bool) -> Self {
        Self {
            separate,
            channels: BTreeMap::new(),
        }
    }

    /// Applies one partial update, returning the accumulated result for
    /// its channel. A partial whose separation flag contradicts the
    /// session's is a protocol error.
    pub fn apply(&mut self, partial: PartialResult) -> Result<&RecognitionResult> {
        if partial.separate_recognition_per_channel != self.separate {
            return Err(Error::Protocol(format!(
                "partial result separation flag ({}) does not match the session ({})",
                partial.separate_recognition_per_channel, self.separate,
            )));
        }

        let incoming = partial.result;
        let channel = incoming.channel;
        match self.channels.entry(channel) {
            std::collections::btree_map::Entry::Vacant(entry) => {
                Ok(&*entry.insert(incoming))
            }
            std::collections::btree_map::Entry::Occupied(entry) => {
                let accumulated = entry.into_mut();
                update(accumulated, incoming);
                Ok(&*accumulated)
            }
        }
    }

    /// Consumes the accumulator into the session outcome, enforcing that
    /// the observed channels match the separation flag.
    pub fn finalize(self) -> Result<CompleteResult> {
        if self.separate {
            if self.channels.is_empty() {
                return Err(Error::Protocol(
                    "separate recognition produced no channel results".to_string(),
                ));
            }
            // BTreeMap iteration gives ascending, duplicate-free channels.
            Ok(CompleteResult::SeparateRecognition {
                channel_results: self.channels.into_values().collect(),
            })
        } else {
            let mut results = self.channels.into_values();
            match (results.next(), results.next()) {
                (Some(result), None) => Ok(CompleteResult::Single { result }),
                (Some(_), Some(_)) => Err(Error::Protocol(
                    "multiple channels observed without separate recognition".to_string(),
                )),
                (None, _) => Err(Error::Protocol(
                    "no result received before the stream ended".to_string(),
                )),
            }
        }
    }
}
