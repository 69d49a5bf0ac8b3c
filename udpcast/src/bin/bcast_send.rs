//! Broadcast sender: send a counter-stamped message every 5 seconds.
//!
//! Run: cargo run -p udpcast --bin bcast_send -- 192.168.1.255 7777 probe

use std::process;
use std::sync::atomic::AtomicBool;
use udpcast::{BroadcastConfig, BroadcastSender, Result};

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let config = BroadcastConfig::from_args(&args)?;

    let mut sender = BroadcastSender::new(&config)?;

    // No shutdown signal; runs until a send fails.
    let running = AtomicBool::new(true);
    sender.run(&running, |payload| println!("sent: {}", payload))
}
