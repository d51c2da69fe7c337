use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

/// Opens the byte stream an [`SmtpSession`](super::session::SmtpSession)
/// talks over.
///
/// A `None` timeout means "no deadline".
pub trait Connector {
    type Stream: Read + Write;

    fn connect(
        &self,
        host: &str,
        port: u16,
        connect_timeout: Option<Duration>,
        read_timeout: Option<Duration>,
    ) -> io::Result<Self::Stream>;
}

impl<C: Connector + ?Sized> Connector for &C {
    type Stream = C::Stream;

    fn connect(
        &self,
        host: &str,
        port: u16,
        connect_timeout: Option<Duration>,
        read_timeout: Option<Duration>,
    ) -> io::Result<Self::Stream> {
        (**self).connect(host, port, connect_timeout, read_timeout)
    }
}

/// Plain TCP. Resolved socket addresses are tried in turn and share one
/// deadline, so a host with several A/AAAA records never gets more than
/// the connect timeout in total.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpConnector;

impl Connector for TcpConnector {
    type Stream = TcpStream;

    fn connect(
        &self,
        host: &str,
        port: u16,
        connect_timeout: Option<Duration>,
        read_timeout: Option<Duration>,
    ) -> io::Result<TcpStream> {
        let deadline = connect_timeout.map(|timeout| Instant::now() + timeout);
        let addrs = resolve_socket_addrs(host, port, deadline)?;
        let stream = connect_before(&addrs, deadline, |addr, timeout| match timeout {
            Some(timeout) => TcpStream::connect_timeout(addr, timeout),
            None => TcpStream::connect(addr),
        })?;
        stream.set_read_timeout(read_timeout)?;
        stream.set_write_timeout(read_timeout)?;
        Ok(stream)
    }
}

/// Name resolution charged to the same deadline. The lookup runs on a
/// helper thread; once the deadline passes it is abandoned, not joined.
fn resolve_socket_addrs(
    host: &str,
    port: u16,
    deadline: Option<Instant>,
) -> io::Result<Vec<SocketAddr>> {
    let Some(deadline) = deadline else {
        return lookup(host, port);
    };
    let (tx, rx) = mpsc::channel();
    let owned = host.to_string();
    thread::Builder::new()
        .name("mailprobe-resolve".into())
        .spawn(move || {
            let _ = tx.send(lookup(&owned, port));
        })?;
    let remaining = deadline.saturating_duration_since(Instant::now());
    match rx.recv_timeout(remaining) {
        Ok(result) => result,
        Err(mpsc::RecvTimeoutError::Timeout) => Err(io::Error::new(
            io::ErrorKind::TimedOut,
            format!("resolving {host} timed out"),
        )),
        Err(mpsc::RecvTimeoutError::Disconnected) => Err(io::Error::other(format!(
            "resolver thread for {host} exited"
        ))),
    }
}

fn lookup(host: &str, port: u16) -> io::Result<Vec<SocketAddr>> {
    (host, port).to_socket_addrs().map(|iter| iter.collect())
}

/// Tries `addrs` in order with whatever time is left before `deadline`.
/// Stops at the first success, or once the deadline has passed.
fn connect_before<T, F>(
    addrs: &[SocketAddr],
    deadline: Option<Instant>,
    mut attempt: F,
) -> io::Result<T>
where
    F: FnMut(&SocketAddr, Option<Duration>) -> io::Result<T>,
{
    let mut last_err = None;
    for addr in addrs {
        let remaining = match deadline {
            Some(deadline) => {
                let left = deadline.saturating_duration_since(Instant::now());
                if left.is_zero() {
                    break;
                }
                Some(left)
            }
            None => None,
        };
        match attempt(addr, remaining) {
            Ok(stream) => return Ok(stream),
            Err(err) => last_err = Some(err),
        }
    }
    Err(last_err.unwrap_or_else(|| {
        if addrs.is_empty() {
            io::Error::new(
                io::ErrorKind::AddrNotAvailable,
                "no socket address available",
            )
        } else {
            io::Error::new(io::ErrorKind::TimedOut, "connect timeout exhausted")
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{Ipv4Addr, TcpListener};

    fn addrs(count: u8) -> Vec<SocketAddr> {
        (1..=count)
            .map(|last| SocketAddr::from((Ipv4Addr::new(192, 0, 2, last), 25)))
            .collect()
    }

    #[test]
    fn addresses_share_one_deadline() {
        let timeout = Duration::from_millis(150);
        let deadline = Some(Instant::now() + timeout);
        let mut granted = Vec::new();
        let result: io::Result<()> = connect_before(&addrs(3), deadline, |_, timeout| {
            let timeout = timeout.expect("deadline set");
            granted.push(timeout);
            thread::sleep(timeout);
            Err(io::Error::new(io::ErrorKind::TimedOut, "blackholed"))
        });
        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::TimedOut);
        assert_eq!(granted.len(), 1);
        let total: Duration = granted.iter().sum();
        assert!(total <= timeout, "{granted:?}");
    }

    #[test]
    fn refused_addresses_get_the_remaining_time() {
        let timeout = Duration::from_secs(30);
        let deadline = Some(Instant::now() + timeout);
        let mut granted = Vec::new();
        let result: io::Result<()> = connect_before(&addrs(3), deadline, |_, timeout| {
            granted.push(timeout.expect("deadline set"));
            Err(io::Error::new(io::ErrorKind::ConnectionRefused, "refused"))
        });
        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::ConnectionRefused);
        assert_eq!(granted.len(), 3);
        assert!(granted.iter().all(|t| *t <= timeout));
        assert!(granted.windows(2).all(|w| w[1] <= w[0]));
    }

    #[test]
    fn first_success_stops_the_walk() {
        let mut tried = Vec::new();
        let result = connect_before(&addrs(3), None, |addr, timeout| {
            assert_eq!(timeout, None);
            tried.push(*addr);
            if tried.len() == 2 {
                Ok(*addr)
            } else {
                Err(io::Error::new(io::ErrorKind::ConnectionRefused, "refused"))
            }
        });
        assert_eq!(result.unwrap(), addrs(3)[1]);
        assert_eq!(tried.len(), 2);
    }

    #[test]
    fn literal_address_resolves_within_deadline() {
        let deadline = Some(Instant::now() + Duration::from_secs(5));
        let addrs = resolve_socket_addrs("127.0.0.1", 25, deadline).unwrap();
        assert_eq!(addrs, vec![SocketAddr::from((Ipv4Addr::LOCALHOST, 25))]);
    }

    #[test]
    fn no_addresses_is_an_error() {
        let result: io::Result<()> = connect_before(&[], None, |_, _| Ok(()));
        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::AddrNotAvailable);
    }

    #[test]
    #[ignore = "requires loopback TCP binding"]
    fn unknown_port_on_loopback_is_refused() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().expect("addr").port();
        drop(listener);
        let result = TcpConnector.connect(
            "127.0.0.1",
            port,
            Some(Duration::from_secs(1)),
            Some(Duration::from_secs(1)),
        );
        assert!(result.is_err());
    }

    #[test]
    #[ignore = "requires loopback TCP binding"]
    fn connects_and_applies_read_timeout() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().expect("addr").port();
        let stream = TcpConnector
            .connect(
                "127.0.0.1",
                port,
                Some(Duration::from_secs(1)),
                Some(Duration::from_secs(2)),
            )
            .expect("connect");
        assert_eq!(
            stream.read_timeout().expect("timeout"),
            Some(Duration::from_secs(2))
        );
    }
}
