//! # alarmvisor
//!
//! Interactive alarm prompt.
//!
//! ```text
//! Alarm> 5 Message(1) stretch
//! DISPLAY THREAD CREATED FOR: Message(1) stretch
//! Message(1) stretch
//! Alarm> Cancel: Message(1)
//! CANCEL: Message(1) stretch
//! ```
//!
//! Diagnostics go to stderr and are controlled with `RUST_LOG`
//! (for example `RUST_LOG=alarmvisor=debug`).

use std::sync::Arc;

use alarmvisor::{Alarms, Command, Config, ConsoleWriter, ParseError};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let alarms = Alarms::builder(Config::default())
        .with_subscriber(Arc::new(ConsoleWriter::new()))
        .build();

    tokio::select! {
        res = prompt_loop(&alarms) => res?,
        res = alarmvisor::wait_for_shutdown_signal() => {
            res?;
            tracing::info!("shutdown signal received");
        }
    }

    alarms.shutdown().await;
    Ok(())
}

/// Reads commands until EOF.
async fn prompt_loop(alarms: &Alarms) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        stdout.write_all(b"Alarm> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            return Ok(());
        };

        match Command::parse(&line) {
            Ok(cmd) => alarms.submit(cmd).await?,
            Err(ParseError::Empty) => {}
            Err(e) => {
                tracing::debug!(error = %e, label = e.as_label(), "rejected command");
                eprintln!("Bad command");
            }
        }
    }
}
