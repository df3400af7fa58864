// Listener module
// Creates TCP listeners with address reuse enabled

use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::TcpListener;

/// Create a `TcpListener` with `SO_REUSEPORT` and `SO_REUSEADDR` enabled.
///
/// Address reuse lets a replacement process bind the same address while the
/// old one is still draining, and avoids bind failures against ports left in
/// TIME_WAIT after a restart. The backlog queue size comes from
/// `performance.backlog`.
///
/// # Arguments
///
/// * `addr` - The socket address to bind to
/// * `backlog` - Listen backlog queue size
///
/// # Returns
///
/// * `Ok(TcpListener)` - Successfully created and bound listener
/// * `Err(std::io::Error)` - Failed to create or bind socket
pub fn create_reusable_listener(
    addr: std::net::SocketAddr,
    backlog: i32,
) -> std::io::Result<TcpListener> {
    let domain = if addr.is_ipv4() {
        Domain::IPV4
    } else {
        Domain::IPV6
    };

    let socket = Socket::new(domain, Type::STREAM, Some(Protocol::TCP))?;

    socket.set_reuse_port(true)?;
    socket.set_reuse_address(true)?;

    // Non-blocking mode is required for tokio
    socket.set_nonblocking(true)?;

    socket.bind(&addr.into())?;
    socket.listen(backlog)?;

    // Convert socket2::Socket to std::net::TcpListener, then to tokio::net::TcpListener
    let std_listener: std::net::TcpListener = socket.into();
    TcpListener::from_std(std_listener)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bind_ephemeral_port() {
        let addr = "127.0.0.1:0".parse().unwrap();
        let listener = create_reusable_listener(addr, 16).unwrap();
        assert_ne!(listener.local_addr().unwrap().port(), 0);
    }

    #[tokio::test]
    async fn test_same_port_can_be_rebound() {
        let addr = "127.0.0.1:0".parse().unwrap();
        let first = create_reusable_listener(addr, 16).unwrap();
        let bound = first.local_addr().unwrap();

        // SO_REUSEPORT allows a second listener on the same address
        let second = create_reusable_listener(bound, 16).unwrap();
        assert_eq!(second.local_addr().unwrap().port(), bound.port());
    }
}
