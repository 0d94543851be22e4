// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]
#![allow(clippy::multiple_crate_versions)]

use clap::Parser;
use lahja::{
    DeliveryError, SystemClock, TextMessageSender, dispatch_event, expire_stale_reservations,
    send_pending_messages,
};
use lahja_store::{ChangeEvent, DocumentStore, MemoryStore};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

/// Lahja Server - reaction engine for the Lahja gift system
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Seconds between sweeps that expire abandoned reservations
    #[arg(long, default_value_t = 60)]
    expiry_interval_secs: u64,

    /// Seconds between sweeps over the outbound message queue
    #[arg(long, default_value_t = 120)]
    send_interval_secs: u64,
}

/// Stand-in transport used until the external SMS gateway is wired in:
/// logs the message and reports success.
#[derive(Debug, Clone, Copy, Default)]
struct LoggingTextSender;

impl TextMessageSender for LoggingTextSender {
    fn send_text_message(&self, body: &str, to_number: &str) -> Result<(), DeliveryError> {
        info!(to = %to_number, body = %body, "Dispatching text message");
        Ok(())
    }
}

/// Pumps the change feed into the core dispatcher.
///
/// A handler failure is fatal for that event only; the feed keeps
/// flowing. A lag means the feed buffer overflowed and events were
/// dropped, which breaks at-least-once delivery and is logged loudly.
async fn run_dispatcher(
    store: &MemoryStore,
    clock: SystemClock,
    mut feed: broadcast::Receiver<ChangeEvent>,
) {
    loop {
        match feed.recv().await {
            Ok(event) => {
                if let Err(err) = dispatch_event(store, &clock, &event) {
                    error!(doc = %event.doc, error = %err, "Event handler failed");
                }
            }
            Err(RecvError::Lagged(skipped)) => {
                warn!(skipped, "Change feed lagged; events were dropped");
            }
            Err(RecvError::Closed) => break,
        }
    }
}

async fn run_expiry_sweep(store: &MemoryStore, clock: SystemClock, interval_secs: u64) {
    let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        if let Err(err) = expire_stale_reservations(store, &clock) {
            error!(error = %err, "Expiry sweep failed");
        }
    }
}

async fn run_send_sweep(store: &MemoryStore, clock: SystemClock, interval_secs: u64) {
    let sender = LoggingTextSender;
    let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        if let Err(err) = send_pending_messages(store, &clock, &sender) {
            error!(error = %err, "Send sweep failed");
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Initializing Lahja server");

    let store: Arc<MemoryStore> = Arc::new(MemoryStore::new());
    let clock = SystemClock;

    let feed = store.subscribe();
    {
        let store = Arc::clone(&store);
        tokio::spawn(async move { run_dispatcher(&store, clock, feed).await });
    }
    {
        let store = Arc::clone(&store);
        let interval_secs = args.expiry_interval_secs;
        tokio::spawn(async move { run_expiry_sweep(&store, clock, interval_secs).await });
    }
    {
        let store = Arc::clone(&store);
        let interval_secs = args.send_interval_secs;
        tokio::spawn(async move { run_send_sweep(&store, clock, interval_secs).await });
    }

    info!(
        expiry_interval_secs = args.expiry_interval_secs,
        send_interval_secs = args.send_interval_secs,
        "Lahja server running; press Ctrl-C to stop"
    );

    tokio::signal::ctrl_c().await?;
    info!("Shutting down");

    Ok(())
}
