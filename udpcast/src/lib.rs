//! # udpcast
//!
//! UDP multicast and broadcast send/receive on a local network.
//!
//! Four small programs built on one socket layer:
//!
//! - `mcast_recv`: join a group, receive one datagram, print it
//! - `mcast_send`: send a fixed message to a group every 5 seconds
//! - `bcast_send`: send a counter-stamped message to a broadcast address
//! - `bcast_sendrecv`: send, block for a reply, sleep, repeat
//!
//! ```rust,no_run
//! use udpcast::{BroadcastConfig, BroadcastSender};
//! use std::sync::atomic::AtomicBool;
//!
//! let config = BroadcastConfig {
//!     addr: "192.168.1.255".parse().unwrap(),
//!     port: 5555,
//!     message: "probe".into(),
//! };
//! let mut sender = BroadcastSender::new(&config).unwrap();
//!
//! // Sends "probe 0", "probe 1", ... until the flag is cleared.
//! let running = AtomicBool::new(true);
//! sender.run(&running, |_payload| {}).unwrap();
//! ```

use std::net::UdpSocket;
use std::time::Duration;

/// Longest payload accepted on receive; datagrams beyond this are truncated.
pub const MAX_RECV_LEN: usize = 255;

/// Interval between transmissions in the sender loops.
pub const SEND_INTERVAL: Duration = Duration::from_secs(5);

// Tracing macros - no-op when feature disabled
#[cfg(feature = "tracing")]
macro_rules! trace_debug { ($($arg:tt)*) => { tracing::debug!($($arg)*) } }
#[cfg(not(feature = "tracing"))]
macro_rules! trace_debug { ($($arg:tt)*) => {} }

#[cfg(feature = "tracing")]
macro_rules! trace_warn { ($($arg:tt)*) => { tracing::warn!($($arg)*) } }
#[cfg(not(feature = "tracing"))]
macro_rules! trace_warn { ($($arg:tt)*) => {} }

pub mod broadcast;
pub mod config;
pub mod error;
pub mod multicast;

pub use broadcast::{BroadcastEndpoint, BroadcastListener, BroadcastSender};
pub use config::{BroadcastConfig, RecvConfig, SendConfig};
pub use error::{CastError, Result};
pub use multicast::{MulticastReceiver, MulticastSender};

/// Blocking receive bounded to [`MAX_RECV_LEN`], decoded as text.
pub(crate) fn recv_text(socket: &UdpSocket) -> Result<String> {
    let mut buf = [0u8; MAX_RECV_LEN];
    let (len, _from) = socket.recv_from(&mut buf)?;
    trace_debug!("received {} bytes from {}", len, _from);
    Ok(String::from_utf8_lossy(&buf[..len]).into_owned())
}
