use std::io;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, UdpSocket};

/// Somewhere to deliver a formatted spectrum. Sends are single, best-effort attempts.
pub trait Transport: Send {
    /// Returns the number of bytes handed to the network.
    fn send(&mut self, payload: &[u8]) -> io::Result<usize>;

    fn destination(&self) -> SocketAddr;
}

/// Sends each payload as one datagram to a fixed address.
pub struct UdpTransport {
    socket: UdpSocket,
    destination: SocketAddr,
}

impl UdpTransport {
    /// Binds an ephemeral local port of the same address family as `destination`.
    pub fn new(destination: SocketAddr) -> io::Result<Self> {
        let local: IpAddr = match destination {
            SocketAddr::V4(_) => Ipv4Addr::UNSPECIFIED.into(),
            SocketAddr::V6(_) => Ipv6Addr::UNSPECIFIED.into(),
        };
        let socket = UdpSocket::bind((local, 0))?;
        Ok(Self {
            socket,
            destination,
        })
    }
}

impl Transport for UdpTransport {
    fn send(&mut self, payload: &[u8]) -> io::Result<usize> {
        self.socket.send_to(payload, self.destination)
    }

    fn destination(&self) -> SocketAddr {
        self.destination
    }
}
