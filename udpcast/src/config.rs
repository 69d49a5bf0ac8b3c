//! Command-line configuration for the four programs.
//!
//! Arguments are positional and parsed before any socket is touched, so a
//! usage error never reaches the network layer.

use crate::error::{CastError, Result};
use std::net::Ipv4Addr;

/// Hop limit for outgoing multicast datagrams (local segment only).
pub const MULTICAST_TTL: u32 = 1;

/// Multicast receiver: group to join and port to bind.
#[derive(Debug, Clone)]
pub struct RecvConfig {
    pub group: Ipv4Addr,
    pub port: u16,
}

impl RecvConfig {
    /// Parse `<prog> <multicast-ip> <port>`.
    pub fn from_args(args: &[String]) -> Result<Self> {
        if args.len() != 3 {
            return Err(CastError::usage(format!(
                "Usage: {} <multicast-ip> <port>",
                prog_name(args)
            )));
        }
        Ok(Self {
            group: parse_ipv4(&args[1])?,
            port: parse_port(&args[2])?,
        })
    }
}

/// Multicast sender: group, port, message, outbound interface, TTL.
#[derive(Debug, Clone)]
pub struct SendConfig {
    pub group: Ipv4Addr,
    pub port: u16,
    pub message: String,
    /// Local interface address the datagrams leave from. `0.0.0.0` lets the
    /// kernel pick; multi-homed hosts should pass one explicitly.
    pub iface: Ipv4Addr,
    pub ttl: u32,
}

impl SendConfig {
    /// Parse `<prog> <multicast-ip> <port> <message> [iface-ip]`.
    pub fn from_args(args: &[String]) -> Result<Self> {
        if args.len() != 4 && args.len() != 5 {
            return Err(CastError::usage(format!(
                "Usage: {} <multicast-ip> <port> <message> [iface-ip]",
                prog_name(args)
            )));
        }
        let iface = match args.get(4) {
            Some(s) => parse_ipv4(s)?,
            None => Ipv4Addr::UNSPECIFIED,
        };
        Ok(Self {
            group: parse_ipv4(&args[1])?,
            port: parse_port(&args[2])?,
            message: args[3].clone(),
            iface,
            ttl: MULTICAST_TTL,
        })
    }
}

/// Broadcast sender (and sender/receiver): destination, port, base message.
#[derive(Debug, Clone)]
pub struct BroadcastConfig {
    pub addr: Ipv4Addr,
    pub port: u16,
    pub message: String,
}

impl BroadcastConfig {
    /// Parse `<prog> <ip> <port> <message>`.
    pub fn from_args(args: &[String]) -> Result<Self> {
        if args.len() != 4 {
            return Err(CastError::usage(format!(
                "Usage: {} <ip> <port> <message>",
                prog_name(args)
            )));
        }
        Ok(Self {
            addr: parse_ipv4(&args[1])?,
            port: parse_port(&args[2])?,
            message: args[3].clone(),
        })
    }
}

fn prog_name(args: &[String]) -> &str {
    args.first().map(String::as_str).unwrap_or("udpcast")
}

fn parse_ipv4(s: &str) -> Result<Ipv4Addr> {
    s.parse().map_err(|source| CastError::Addr {
        addr: s.to_string(),
        source,
    })
}

fn parse_port(s: &str) -> Result<u16> {
    s.parse().map_err(|_| CastError::Port(s.to_string()))
}
