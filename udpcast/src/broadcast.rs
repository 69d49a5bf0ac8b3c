//! UDP broadcast send and receive.
//!
//! The sender stamps every payload with a monotonically increasing counter
//! (`"<message> <counter>"`). The combined [`BroadcastEndpoint`] pairs each
//! send with one blocking receive before sleeping, a simple request/response
//! probe over two sockets.

use crate::config::BroadcastConfig;
use crate::error::{CastError, Result};
use std::net::{Ipv4Addr, SocketAddrV4, UdpSocket};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Create a broadcast-permitted sender socket (SO_BROADCAST).
fn create_broadcast_socket() -> Result<UdpSocket> {
    let socket2 = socket2::Socket::new(
        socket2::Domain::IPV4,
        socket2::Type::DGRAM,
        Some(socket2::Protocol::UDP),
    )?;
    socket2.set_broadcast(true)?;

    Ok(socket2.into())
}

/// Create a receive socket bound to the wildcard address on `port`.
fn create_bound_socket(port: u16) -> Result<UdpSocket> {
    let socket2 = socket2::Socket::new(
        socket2::Domain::IPV4,
        socket2::Type::DGRAM,
        Some(socket2::Protocol::UDP),
    )?;
    socket2.set_reuse_address(true)?;

    let addr = SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, port);
    socket2.bind(&addr.into())?;

    Ok(socket2.into())
}

/// Periodic broadcast sender with a per-process send counter.
pub struct BroadcastSender {
    socket: UdpSocket,
    dest: SocketAddrV4,
    message: String,
    counter: u64,
    interval: Duration,
}

impl BroadcastSender {
    /// Create a sender for the configured broadcast address.
    pub fn new(config: &BroadcastConfig) -> Result<Self> {
        let socket = create_broadcast_socket()?;
        Ok(Self {
            socket,
            dest: SocketAddrV4::new(config.addr, config.port),
            message: config.message.clone(),
            counter: 0,
            interval: crate::SEND_INTERVAL,
        })
    }

    /// Override the sleep between cycles (tests shorten it).
    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }

    /// Payload for the current cycle: `"<message> <counter>"`.
    pub fn payload(&self) -> String {
        format!("{} {}", self.message, self.counter)
    }

    /// Send one counter-stamped datagram; the counter advances only on a
    /// complete send. A partial send is an error.
    pub fn send_cycle(&mut self) -> Result<String> {
        let payload = self.payload();
        let bytes = payload.as_bytes();
        let sent = self.socket.send_to(bytes, self.dest)?;
        if sent != bytes.len() {
            trace_warn!("short send: {} of {} bytes", sent, bytes.len());
            return Err(CastError::ShortSend {
                sent,
                expected: bytes.len(),
            });
        }
        trace_debug!("sent {} bytes to {}", sent, self.dest);
        self.counter += 1;
        Ok(payload)
    }

    /// Send every cycle until the flag is cleared or a send fails. The
    /// handler sees each payload as it goes out.
    pub fn run<F: FnMut(&str)>(&mut self, running: &AtomicBool, mut handler: F) -> Result<()> {
        while running.load(Ordering::Relaxed) {
            let payload = self.send_cycle()?;
            handler(&payload);
            std::thread::sleep(self.interval);
        }
        Ok(())
    }

    /// Datagrams sent so far.
    pub fn counter(&self) -> u64 {
        self.counter
    }

    /// Destination address and port.
    pub fn dest(&self) -> SocketAddrV4 {
        self.dest
    }
}

/// Blocking receiver bound to a broadcast port.
pub struct BroadcastListener {
    socket: UdpSocket,
}

impl BroadcastListener {
    /// Bind to the wildcard address on `port` (0 for ephemeral).
    pub fn bind(port: u16) -> Result<Self> {
        let socket = create_bound_socket(port)?;
        Ok(Self { socket })
    }

    /// Block for one datagram, decoded as text.
    pub fn recv_text(&self) -> Result<String> {
        crate::recv_text(&self.socket)
    }

    /// Port the socket is bound to.
    pub fn local_port(&self) -> Result<u16> {
        Ok(self.socket.local_addr()?.port())
    }
}

/// Combined sender/receiver: send, block for a reply, sleep, repeat.
///
/// There is no timeout on the reply; a cycle with no peer blocks
/// indefinitely, matching the blocking-socket model of the rest of the
/// crate.
pub struct BroadcastEndpoint {
    sender: BroadcastSender,
    listener: BroadcastListener,
}

impl BroadcastEndpoint {
    /// Sender toward the broadcast address, listener on the same port.
    pub fn new(config: &BroadcastConfig) -> Result<Self> {
        Ok(Self {
            sender: BroadcastSender::new(config)?,
            listener: BroadcastListener::bind(config.port)?,
        })
    }

    /// Override the sleep between cycles (tests shorten it).
    pub fn set_interval(&mut self, interval: Duration) {
        self.sender.set_interval(interval);
    }

    /// Send one counter-stamped datagram. A failed send aborts the cycle
    /// before any receive is attempted.
    pub fn send_cycle(&mut self) -> Result<String> {
        self.sender.send_cycle()
    }

    /// Block for the reply to the last send.
    pub fn recv_reply(&self) -> Result<String> {
        self.listener.recv_text()
    }

    /// Cycle until the flag is cleared or an I/O call fails. The handler
    /// sees `(sent payload, reply)` once per cycle, before the sleep.
    pub fn run<F: FnMut(&str, &str)>(&mut self, running: &AtomicBool, mut handler: F) -> Result<()> {
        while running.load(Ordering::Relaxed) {
            let sent = self.send_cycle()?;
            let reply = self.recv_reply()?;
            handler(&sent, &reply);
            std::thread::sleep(self.sender.interval);
        }
        Ok(())
    }

    /// Datagrams sent so far.
    pub fn counter(&self) -> u64 {
        self.sender.counter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loopback_config(port: u16, message: &str) -> BroadcastConfig {
        BroadcastConfig {
            addr: Ipv4Addr::LOCALHOST,
            port,
            message: message.into(),
        }
    }

    #[test]
    fn payload_is_message_space_counter() {
        let listener = BroadcastListener::bind(0).unwrap();
        let port = listener.local_port().unwrap();
        let mut sender = BroadcastSender::new(&loopback_config(port, "probe")).unwrap();

        assert_eq!(sender.send_cycle().unwrap(), "probe 0");
        assert_eq!(sender.send_cycle().unwrap(), "probe 1");
        assert_eq!(sender.send_cycle().unwrap(), "probe 2");

        assert_eq!(listener.recv_text().unwrap(), "probe 0");
        assert_eq!(listener.recv_text().unwrap(), "probe 1");
        assert_eq!(listener.recv_text().unwrap(), "probe 2");
    }

    #[test]
    fn counter_advances_once_per_successful_send() {
        let listener = BroadcastListener::bind(0).unwrap();
        let port = listener.local_port().unwrap();
        let mut sender = BroadcastSender::new(&loopback_config(port, "x")).unwrap();

        assert_eq!(sender.counter(), 0);
        sender.send_cycle().unwrap();
        sender.send_cycle().unwrap();
        assert_eq!(sender.counter(), 2);
    }

    #[test]
    fn oversized_datagram_fails_without_advancing_counter() {
        let listener = BroadcastListener::bind(0).unwrap();
        let port = listener.local_port().unwrap();
        // Larger than the maximum UDP payload, so sendto must fail.
        let big = "y".repeat(70_000);
        let mut sender = BroadcastSender::new(&loopback_config(port, &big)).unwrap();

        assert!(sender.send_cycle().is_err());
        assert_eq!(sender.counter(), 0);
    }

    #[test]
    fn run_stops_when_flag_cleared() {
        let listener = BroadcastListener::bind(0).unwrap();
        let port = listener.local_port().unwrap();
        let mut sender = BroadcastSender::new(&loopback_config(port, "tick")).unwrap();
        sender.set_interval(Duration::ZERO);

        let running = AtomicBool::new(true);
        let mut seen = Vec::new();
        sender
            .run(&running, |payload| {
                seen.push(payload.to_string());
                if seen.len() == 3 {
                    running.store(false, Ordering::Relaxed);
                }
            })
            .unwrap();

        assert_eq!(seen, ["tick 0", "tick 1", "tick 2"]);
    }

    #[test]
    fn endpoint_send_failure_aborts_before_receive() {
        let listener = BroadcastListener::bind(0).unwrap();
        let port = listener.local_port().unwrap();
        drop(listener);
        let big = "z".repeat(70_000);
        let mut endpoint = BroadcastEndpoint::new(&loopback_config(port, &big)).unwrap();

        // If the failed send did not abort the cycle, the reply wait would
        // block forever; an immediate error proves the ordering.
        let running = AtomicBool::new(true);
        let err = endpoint
            .run(&running, |_, _| panic!("cycle completed despite send failure"))
            .unwrap_err();
        assert!(matches!(err, CastError::Io(_)));
        assert_eq!(endpoint.counter(), 0);
    }
}
