//! Transcribes a short audio file in one unary call.
//!
//! ```sh
//! SONIOX_API_KEY=... cargo run --example transcribe_file_short -- audio.pcm
//! ```

use anyhow::Context;
use soniox_client::SpeechClient;
use soniox_client::interface::TranscriptionConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let path = std::env::args()
        .nth(1)
        .context("usage: transcribe_file_short <audio-file>")?;

    let client = SpeechClient::new()?;
    let config = TranscriptionConfig {
        include_nonfinal: false,
        ..Default::default()
    };

    let complete = client.transcribe_file_short(&path, &config).await?;
    for result in complete.results() {
        println!("channel {}: {}", result.channel, result.text());
    }
    Ok(())
}
