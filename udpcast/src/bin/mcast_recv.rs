//! Multicast receiver: join a group, print one datagram, exit.
//!
//! Run: cargo run -p udpcast --bin mcast_recv -- 239.255.0.1 5555

use std::process;
use udpcast::{MulticastReceiver, RecvConfig, Result};

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let config = RecvConfig::from_args(&args)?;

    let receiver = MulticastReceiver::join(&config)?;
    let text = receiver.recv_once()?;
    println!("Received: {}", text);

    Ok(())
}
