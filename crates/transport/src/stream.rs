//! Raw TCP/TLS streams handed out by `Transport::connect`

use std::io::{self, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::sync::Arc;
use std::time::Duration;

use rustls::pki_types::ServerName;
use rustls::{ClientConfig, ClientConnection, StreamOwned};
use splunkd_core::{Error, Result};

/// A plain or TLS-wrapped socket
pub enum Stream {
    Plain(TcpStream),
    Tls(Box<StreamOwned<ClientConnection, TcpStream>>),
}

impl Stream {
    /// Connect to `host:port`; `tls` wraps the socket in a TLS session.
    pub(crate) fn open(
        host: &str,
        port: u16,
        timeout: Option<Duration>,
        tls: Option<Arc<ClientConfig>>,
    ) -> Result<Self> {
        let host = host.trim_start_matches('[').trim_end_matches(']');
        let socket = tcp_connect(host, port, timeout)?;

        let Some(config) = tls else {
            return Ok(Stream::Plain(socket));
        };

        let server_name = ServerName::try_from(host.to_string())
            .map_err(|e| Error::InvalidArgument(format!("invalid server name {host}: {e}")))?;
        let connection = ClientConnection::new(config, server_name)
            .map_err(|e| Error::Network(format!("TLS setup failed: {e}")))?;
        Ok(Stream::Tls(Box::new(StreamOwned::new(connection, socket))))
    }

    pub fn is_tls(&self) -> bool {
        matches!(self, Stream::Tls(_))
    }
}

fn tcp_connect(host: &str, port: u16, timeout: Option<Duration>) -> Result<TcpStream> {
    let addrs = (host, port)
        .to_socket_addrs()
        .map_err(|e| Error::Network(format!("cannot resolve {host}: {e}")))?;

    let mut last_error = None;
    for addr in addrs {
        let attempt = match timeout {
            Some(timeout) => TcpStream::connect_timeout(&addr, timeout),
            None => TcpStream::connect(addr),
        };
        match attempt {
            Ok(socket) => {
                socket.set_read_timeout(timeout)?;
                socket.set_write_timeout(timeout)?;
                tracing::debug!(%addr, "raw connection opened");
                return Ok(socket);
            }
            Err(e) => last_error = Some(e),
        }
    }

    Err(Error::Network(match last_error {
        Some(e) => format!("cannot connect to {host}:{port}: {e}"),
        None => format!("no addresses found for {host}"),
    }))
}

impl Read for Stream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Stream::Plain(s) => s.read(buf),
            Stream::Tls(s) => s.read(buf),
        }
    }
}

impl Write for Stream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Stream::Plain(s) => s.write(buf),
            Stream::Tls(s) => s.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Stream::Plain(s) => s.flush(),
            Stream::Tls(s) => s.flush(),
        }
    }
}
