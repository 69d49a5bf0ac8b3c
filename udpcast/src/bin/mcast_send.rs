//! Multicast sender: send a fixed message to a group every 5 seconds.
//!
//! Run: cargo run -p udpcast --bin mcast_send -- 239.255.0.1 5555 hello
//!
//! On multi-homed hosts pass the outbound interface address explicitly:
//!
//!   mcast_send 239.255.0.1 5555 hello 192.168.1.11

use std::process;
use std::sync::atomic::AtomicBool;
use udpcast::{MulticastSender, Result, SendConfig};

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let config = SendConfig::from_args(&args)?;

    let sender = MulticastSender::new(&config)?;
    println!("sending '{}' to {} every 5s", sender.message(), sender.dest());

    // No shutdown signal; runs until a send fails.
    let running = AtomicBool::new(true);
    sender.run(&running)
}
