//! Streams a file to the live transcription endpoint and prints each
//! merged snapshot as it arrives.
//!
//! ```sh
//! SONIOX_API_KEY=... cargo run --example transcribe_file_stream -- audio.pcm
//! ```

use anyhow::Context;
use futures_util::StreamExt;
use soniox_client::{DEFAULT_CHUNK_SIZE, SpeechClient};
use soniox_client::interface::TranscriptionConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let path = std::env::args()
        .nth(1)
        .context("usage: transcribe_file_stream <audio-file>")?;

    let client = SpeechClient::new()?;
    let config = TranscriptionConfig {
        include_nonfinal: true,
        ..Default::default()
    };

    let mut session = client
        .transcribe_file_stream(&path, &config, DEFAULT_CHUNK_SIZE)
        .await?;
    while let Some(snapshot) = (&mut session).next().await {
        let snapshot = snapshot?;
        println!("[channel {}] {}", snapshot.channel, snapshot.text());
    }

    let complete = session.finish().await?;
    for result in complete.results() {
        println!("final, channel {}: {}", result.channel, result.text());
    }
    Ok(())
}
