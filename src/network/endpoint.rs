use std::io::{Read, Write};
use std::net::{Shutdown, TcpStream};
use std::time::Duration;

use errors::{ErrorKind, Result};
use network::ServerKey;

/// A hard retry cap on WouldBlock/Interrupted spins, so a socket stuck in a
/// pathological state cannot spin the calling thread forever.
const MAX_RETRIES: u32 = 30;

/// Which address family to prefer when a hostname resolves to both.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IpVersionPref {
    /// Prefer an A record, fall back to AAAA.
    Any,
    V4Only,
    V6Only,
}

/// One blocking TCP socket to one broker. Used by at most one in-flight
/// request at a time -- the dispatcher never issues a second send on an
/// endpoint before the first's response (or failure) has been observed.
pub struct Endpoint {
    server: ServerKey,
    stream: Option<TcpStream>,
}

impl Endpoint {
    /// Resolves `server`, connects within `connect_timeout`, and leaves the
    /// socket blocking with no read/write timeout set yet -- callers set
    /// per-call timeouts via `send`/`receive`.
    pub fn connect(server: ServerKey, ip_pref: IpVersionPref, connect_timeout: Duration) -> Result<Endpoint> {
        use std::net::ToSocketAddrs;

        let mut addrs: Vec<_> = server
            .to_socket_addrs()
            .map_err(|_| ErrorKind::CannotBind(server.to_string()))?
            .collect();

        match ip_pref {
            IpVersionPref::V4Only => addrs.retain(|a| a.is_ipv4()),
            IpVersionPref::V6Only => addrs.retain(|a| a.is_ipv6()),
            IpVersionPref::Any => addrs.sort_by_key(|a| if a.is_ipv4() { 0 } else { 1 }),
        }

        if addrs.is_empty() {
            bail!(ErrorKind::CannotBind(server.to_string()));
        }

        let mut last_err = None;
        for addr in &addrs {
            match TcpStream::connect_timeout(addr, connect_timeout) {
                Ok(stream) => {
                    return Ok(Endpoint {
                                  server: server,
                                  stream: Some(stream),
                              });
                }
                Err(e) => last_err = Some(e),
            }
        }

        let _ = last_err;
        bail!(ErrorKind::CannotBind(server.to_string()))
    }

    pub fn server(&self) -> &ServerKey {
        &self.server
    }

    pub fn is_open(&self) -> bool {
        self.stream.is_some()
    }

    /// Writes every byte of `bytes`, tolerating interrupted and
    /// would-block conditions. If the peer has already closed the
    /// connection, detected by peeking the read side before the first
    /// write, fails with `NoConnection` without writing anything.
    pub fn send(&mut self, bytes: &[u8], timeout: Duration) -> Result<()> {
        let server = self.server.to_string();
        let stream = self.stream
            .as_mut()
            .ok_or_else(|| ErrorKind::NoConnection(server.clone()))?;

        stream.set_write_timeout(Some(timeout)).map_err(|_| ErrorKind::CannotSend(server.clone()))?;
        stream.set_read_timeout(Some(timeout)).map_err(|_| ErrorKind::CannotSend(server.clone()))?;

        let mut peek_buf = [0u8; 1];
        match stream.peek(&mut peek_buf) {
            Ok(0) => bail!(ErrorKind::NoConnection(server)),
            Ok(_) => {}
            Err(ref e) if would_block_or_interrupted(e) => {}
            Err(_) => bail!(ErrorKind::CannotSend(server)),
        }

        let mut written = 0;
        let mut retries = 0;
        while written < bytes.len() {
            match stream.write(&bytes[written..]) {
                Ok(0) => bail!(ErrorKind::CannotSend(server)),
                Ok(n) => written += n,
                Err(ref e) if e.kind() == ::std::io::ErrorKind::Interrupted => continue,
                Err(ref e) if would_block_or_interrupted(e) => {
                    retries += 1;
                    if retries > MAX_RETRIES {
                        bail!(ErrorKind::CannotSend(server));
                    }
                }
                Err(_) => bail!(ErrorKind::CannotSend(server)),
            }
        }

        Ok(())
    }

    /// Reads exactly `length` bytes, tolerating interrupted and
    /// would-block conditions. An EOF before any byte of this call arrived
    /// is reported as `NoConnection` (eligible for reconnect); an EOF
    /// partway through is `CannotRecv` (this request is lost).
    pub fn receive(&mut self, length: usize, timeout: Duration) -> Result<Vec<u8>> {
        let server = self.server.to_string();
        let stream = self.stream
            .as_mut()
            .ok_or_else(|| ErrorKind::NoConnection(server.clone()))?;

        stream.set_read_timeout(Some(timeout)).map_err(|_| ErrorKind::CannotRecv(server.clone()))?;

        let mut buf = vec![0u8; length];
        let mut read = 0;
        let mut retries = 0;

        while read < length {
            match stream.read(&mut buf[read..]) {
                Ok(0) => {
                    if read == 0 {
                        bail!(ErrorKind::NoConnection(server));
                    } else {
                        bail!(ErrorKind::CannotRecv(server));
                    }
                }
                Ok(n) => read += n,
                Err(ref e) if e.kind() == ::std::io::ErrorKind::Interrupted => continue,
                Err(ref e) if would_block_or_interrupted(e) => {
                    retries += 1;
                    if retries > MAX_RETRIES {
                        bail!(ErrorKind::CannotRecv(server));
                    }
                }
                Err(_) => bail!(ErrorKind::CannotRecv(server)),
            }
        }

        Ok(buf)
    }

    /// Idempotent: a second call on an already-closed endpoint is a no-op.
    pub fn close(&mut self) {
        if let Some(stream) = self.stream.take() {
            let _ = stream.shutdown(Shutdown::Both);
        }
    }
}

fn would_block_or_interrupted(e: &::std::io::Error) -> bool {
    e.kind() == ::std::io::ErrorKind::WouldBlock || e.kind() == ::std::io::ErrorKind::TimedOut ||
    e.kind() == ::std::io::ErrorKind::Interrupted
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;
    use std::thread;

    #[test]
    fn test_connect_send_receive_roundtrip() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut buf = [0u8; 5];
            stream.read_exact(&mut buf).unwrap();
            assert_eq!(&buf, b"hello");
            stream.write_all(b"world").unwrap();
        });

        let server = ServerKey::new(addr.ip().to_string(), addr.port());
        let mut endpoint = Endpoint::connect(server, IpVersionPref::Any, Duration::from_secs(2)).unwrap();
        endpoint.send(b"hello", Duration::from_secs(2)).unwrap();
        let response = endpoint.receive(5, Duration::from_secs(2)).unwrap();
        assert_eq!(response, b"world");

        handle.join().unwrap();
    }

    #[test]
    fn test_receive_on_closed_peer_before_any_byte_is_no_connection() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            drop(stream);
        });

        let server = ServerKey::new(addr.ip().to_string(), addr.port());
        let mut endpoint = Endpoint::connect(server, IpVersionPref::Any, Duration::from_secs(2)).unwrap();
        handle.join().unwrap();

        // Give the FIN a moment to arrive before reading.
        thread::sleep(Duration::from_millis(50));

        let result = endpoint.receive(5, Duration::from_secs(1));
        assert!(result.is_err());
    }

    #[test]
    fn test_close_is_idempotent() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let _handle = thread::spawn(move || {
            let _ = listener.accept();
        });

        let server = ServerKey::new(addr.ip().to_string(), addr.port());
        let mut endpoint = Endpoint::connect(server, IpVersionPref::Any, Duration::from_secs(2)).unwrap();
        endpoint.close();
        endpoint.close();
        assert!(!endpoint.is_open());
    }
}
