//! Broadcast sender/receiver: send, block for a reply, sleep, repeat.
//!
//! Run: cargo run -p udpcast --bin bcast_sendrecv -- 192.168.1.255 7777 probe
//!
//! The reply wait has no timeout; a cycle with no peer blocks forever.

use std::process;
use std::thread;
use udpcast::{BroadcastConfig, BroadcastEndpoint, Result, SEND_INTERVAL};

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let config = BroadcastConfig::from_args(&args)?;

    let mut endpoint = BroadcastEndpoint::new(&config)?;

    loop {
        let sent = endpoint.send_cycle()?;
        println!("sent: {}", sent);

        let reply = endpoint.recv_reply()?;
        println!("Received: {}", reply);

        thread::sleep(SEND_INTERVAL);
    }
}
