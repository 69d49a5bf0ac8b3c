//! UDP multicast send and receive.
//!
//! ```rust,no_run
//! use udpcast::{MulticastReceiver, RecvConfig};
//!
//! let config = RecvConfig { group: "239.255.0.1".parse().unwrap(), port: 5555 };
//! let receiver = MulticastReceiver::join(&config).unwrap();
//! let text = receiver.recv_once().unwrap();
//! println!("Received: {}", text);
//! ```

use crate::config::{RecvConfig, SendConfig};
use crate::error::{CastError, Result};
use std::net::{Ipv4Addr, SocketAddrV4, UdpSocket};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Create a group-member socket: SO_REUSEADDR, bound to the wildcard
/// address on `port`, joined to `group` on the unspecified interface.
fn create_member_socket(group: Ipv4Addr, port: u16) -> Result<UdpSocket> {
    let socket2 = socket2::Socket::new(
        socket2::Domain::IPV4,
        socket2::Type::DGRAM,
        Some(socket2::Protocol::UDP),
    )?;
    socket2.set_reuse_address(true)?;

    let addr = SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, port);
    socket2.bind(&addr.into())?;

    let socket: UdpSocket = socket2.into();
    socket.join_multicast_v4(&group, &Ipv4Addr::UNSPECIFIED)?;

    Ok(socket)
}

/// Create a sender socket with the outbound interface and TTL configured.
/// Never bound for receiving; the kernel assigns the source port on send.
fn create_sender_socket(iface: Ipv4Addr, ttl: u32) -> Result<UdpSocket> {
    let socket2 = socket2::Socket::new(
        socket2::Domain::IPV4,
        socket2::Type::DGRAM,
        Some(socket2::Protocol::UDP),
    )?;
    socket2.set_multicast_if_v4(&iface)?;
    socket2.set_multicast_ttl_v4(ttl)?;

    Ok(socket2.into())
}

/// One-shot multicast receiver. Leaves the group on drop.
pub struct MulticastReceiver {
    socket: UdpSocket,
    group: Ipv4Addr,
}

impl MulticastReceiver {
    /// Bind and join the configured group.
    pub fn join(config: &RecvConfig) -> Result<Self> {
        let socket = create_member_socket(config.group, config.port)?;
        trace_debug!("joined {} on port {}", config.group, config.port);
        Ok(Self {
            socket,
            group: config.group,
        })
    }

    /// Block for a single datagram and decode it as text.
    pub fn recv_once(&self) -> Result<String> {
        crate::recv_text(&self.socket)
    }

    /// Group this receiver is a member of.
    pub fn group(&self) -> Ipv4Addr {
        self.group
    }

    /// Port the socket is bound to.
    pub fn local_port(&self) -> Result<u16> {
        Ok(self.socket.local_addr()?.port())
    }
}

impl Drop for MulticastReceiver {
    fn drop(&mut self) {
        let _ = self
            .socket
            .leave_multicast_v4(&self.group, &Ipv4Addr::UNSPECIFIED);
    }
}

/// Periodic multicast sender. Retransmits the same message every cycle.
pub struct MulticastSender {
    socket: UdpSocket,
    dest: SocketAddrV4,
    message: String,
    interval: Duration,
}

impl MulticastSender {
    /// Create a sender for the configured group, interface and TTL.
    pub fn new(config: &SendConfig) -> Result<Self> {
        let socket = create_sender_socket(config.iface, config.ttl)?;
        Ok(Self {
            socket,
            dest: SocketAddrV4::new(config.group, config.port),
            message: config.message.clone(),
            interval: crate::SEND_INTERVAL,
        })
    }

    /// Override the sleep between cycles (tests shorten it).
    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }

    /// Send one datagram; a partial send is an error.
    pub fn send_cycle(&self) -> Result<()> {
        let payload = self.message.as_bytes();
        let sent = self.socket.send_to(payload, self.dest)?;
        if sent != payload.len() {
            trace_warn!("short send: {} of {} bytes", sent, payload.len());
            return Err(CastError::ShortSend {
                sent,
                expected: payload.len(),
            });
        }
        trace_debug!("sent {} bytes to {}", sent, self.dest);
        Ok(())
    }

    /// Send every cycle until the flag is cleared or a send fails.
    pub fn run(&self, running: &AtomicBool) -> Result<()> {
        while running.load(Ordering::Relaxed) {
            self.send_cycle()?;
            std::thread::sleep(self.interval);
        }
        Ok(())
    }

    /// Message transmitted each cycle (identical every time).
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Destination group and port.
    pub fn dest(&self) -> SocketAddrV4 {
        self.dest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GROUP: Ipv4Addr = Ipv4Addr::new(239, 255, 0, 1);

    fn send_config(message: &str) -> SendConfig {
        SendConfig {
            group: GROUP,
            port: 0,
            message: message.into(),
            iface: Ipv4Addr::UNSPECIFIED,
            ttl: 1,
        }
    }

    #[test]
    fn receiver_joins_group() {
        // May fail in sandboxed environments
        if let Ok(r) = MulticastReceiver::join(&RecvConfig {
            group: GROUP,
            port: 0,
        }) {
            assert_eq!(r.group(), GROUP);
            assert_ne!(r.local_port().unwrap(), 0);
        }
    }

    #[test]
    fn sender_message_is_stable_across_cycles() {
        if let Ok(s) = MulticastSender::new(&send_config("hello")) {
            assert_eq!(s.message(), "hello");
            assert_eq!(s.message(), "hello");
            assert_eq!(*s.dest().ip(), GROUP);
        }
    }

    #[test]
    fn sender_ttl_is_one() {
        if let Ok(s) = MulticastSender::new(&send_config("x")) {
            assert_eq!(s.socket.multicast_ttl_v4().unwrap(), 1);
        }
    }

    #[test]
    fn cancelled_loop_returns_ok_without_sending() {
        if let Ok(s) = MulticastSender::new(&send_config("x")) {
            let running = AtomicBool::new(false);
            s.run(&running).unwrap();
        }
    }
}
