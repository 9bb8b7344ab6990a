//! Submits a file as an async transcription job, polls it to completion,
//! fetches the result, and deletes the job.
//!
//! ```sh
//! SONIOX_API_KEY=... cargo run --example transcribe_file_async -- audio.pcm
//! ```

use std::time::Duration;

use anyhow::Context;
use soniox_client::{ASYNC_FILE_CHUNK_SIZE, SpeechClient};
use soniox_client::interface::{JobStatus, TranscriptionConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let path = std::env::args()
        .nth(1)
        .context("usage: transcribe_file_async <audio-file>")?;

    let client = SpeechClient::new()?;
    let config = TranscriptionConfig::default();

    let file_id = client
        .transcribe_file_async(&path, &config, ASYNC_FILE_CHUNK_SIZE)
        .await?;
    println!("submitted as {file_id}");

    let status = loop {
        let status = client.get_status(&file_id).await?;
        println!("status: {}", status.status);
        if status.status.is_terminal() {
            break status;
        }
        tokio::time::sleep(Duration::from_secs(2)).await;
    };

    if status.status == JobStatus::Completed {
        let complete = client.get_result(&file_id).await?;
        for result in complete.results() {
            println!("channel {}: {}", result.channel, result.text());
        }
    } else {
        eprintln!("transcription failed");
    }

    // The job keeps occupying server-side storage until deleted.
    client.delete_file(&file_id).await?;
    Ok(())
}
