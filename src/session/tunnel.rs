//! Proxy tunnel handshakes.
//!
//! Establishes a raw TCP stream to the target through a SOCKS v5 proxy
//! (RFC 1928, username/password subnegotiation per RFC 1929) or an HTTP
//! CONNECT proxy. The WebSocket handshake, and TLS for `wss`, run over the
//! returned stream.
//!
//! Authentication follows default handling: the first attempt is bare, a
//! challenge from the proxy surfaces an auth-challenge event, and the
//! configured credential answers it when the mechanism allows.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::net::{Ipv4Addr, SocketAddr};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::debug;

use crate::config::Credential;
use crate::error::{Error, Result};
use crate::session::event::{EventSink, SessionEvent};

// ============================================================================
// Constants
// ============================================================================

/// Upper bound on a CONNECT response head.
const MAX_RESPONSE_HEAD: usize = 8192;

// ============================================================================
// ProxyServer
// ============================================================================

/// Address of a proxy to tunnel through.
///
/// Modern descriptors carry a resolved socket address; legacy entries carry
/// a hostname resolved at connect time.
#[derive(Debug, Clone)]
pub(crate) enum ProxyServer {
    /// Resolved socket address.
    Addr(SocketAddr),
    /// Hostname plus port, resolved by the connect call.
    Named {
        /// Proxy hostname.
        host: String,
        /// Proxy port.
        port: u16,
    },
}

impl ProxyServer {
    /// Opens a TCP connection to the proxy.
    async fn open(&self) -> Result<TcpStream> {
        let stream = match self {
            Self::Addr(addr) => TcpStream::connect(addr).await?,
            Self::Named { host, port } => TcpStream::connect((host.as_str(), *port)).await?,
        };
        Ok(stream)
    }
}

impl fmt::Display for ProxyServer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Addr(addr) => write!(f, "{addr}"),
            Self::Named { host, port } => write!(f, "{host}:{port}"),
        }
    }
}

// ============================================================================
// HTTP CONNECT
// ============================================================================

/// Tunnels to `host:port` through an HTTP CONNECT proxy.
///
/// A 407 response surfaces an auth-challenge event; when a Basic credential
/// is available the CONNECT is retried once on a fresh connection with
/// `Proxy-Authorization`.
pub(crate) async fn http_connect_tunnel(
    proxy: &ProxyServer,
    host: &str,
    port: u16,
    basic: Option<&Credential>,
    events: &EventSink,
) -> Result<TcpStream> {
    debug!(%proxy, host, port, "opening HTTP CONNECT tunnel");

    let mut stream = proxy.open().await?;
    let status = connect_exchange(&mut stream, host, port, None).await?;
    if (200..300).contains(&status) {
        return Ok(stream);
    }

    if status == 407 {
        events.emit(SessionEvent::AuthChallenge);

        let Some(credential) = basic else {
            return Err(Error::proxy(format!(
                "proxy {proxy} requires authentication"
            )));
        };

        // The proxy may close the challenged connection, so retry fresh.
        let mut retry = proxy.open().await?;
        let status = connect_exchange(&mut retry, host, port, Some(credential)).await?;
        if (200..300).contains(&status) {
            return Ok(retry);
        }
        return Err(Error::proxy(format!(
            "proxy {proxy} rejected authenticated CONNECT with status {status}"
        )));
    }

    Err(Error::proxy(format!(
        "proxy {proxy} rejected CONNECT with status {status}"
    )))
}

/// Writes one CONNECT request and parses the response status.
async fn connect_exchange(
    stream: &mut TcpStream,
    host: &str,
    port: u16,
    auth: Option<&Credential>,
) -> Result<u16> {
    let mut request = format!("CONNECT {host}:{port} HTTP/1.1\r\nHost: {host}:{port}\r\n");
    if let Some(credential) = auth {
        request.push_str(&format!(
            "Proxy-Authorization: {}\r\n",
            credential.basic_authorization()
        ));
    }
    request.push_str("\r\n");

    stream.write_all(request.as_bytes()).await?;

    let head = read_response_head(stream).await?;
    head.lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|status| status.parse().ok())
        .ok_or_else(|| Error::proxy("malformed CONNECT response"))
}

/// Reads the response head up to the blank line.
async fn read_response_head(stream: &mut TcpStream) -> Result<String> {
    let mut head = Vec::with_capacity(256);
    let mut buf = [0u8; 256];

    loop {
        let n = stream.read(&mut buf).await?;
        if n == 0 {
            return Err(Error::proxy("proxy closed the connection mid-CONNECT"));
        }
        head.extend_from_slice(&buf[..n]);

        if head.windows(4).any(|window| window == b"\r\n\r\n") {
            return Ok(String::from_utf8_lossy(&head).into_owned());
        }
        if head.len() > MAX_RESPONSE_HEAD {
            return Err(Error::proxy("CONNECT response head too large"));
        }
    }
}

// ============================================================================
// SOCKS v5
// ============================================================================

/// Tunnels to `host:port` through a SOCKS v5 proxy.
///
/// The greeting offers no-auth, plus username/password when a credential is
/// configured. A proxy that selects username/password surfaces an
/// auth-challenge event before the subnegotiation runs.
pub(crate) async fn socks5_tunnel(
    proxy: &ProxyServer,
    host: &str,
    port: u16,
    credential: Option<&Credential>,
    events: &EventSink,
) -> Result<TcpStream> {
    debug!(%proxy, host, port, "opening SOCKS5 tunnel");

    let mut stream = proxy.open().await?;

    // Method selection.
    let greeting: &[u8] = if credential.is_some() {
        &[0x05, 0x02, 0x00, 0x02]
    } else {
        &[0x05, 0x01, 0x00]
    };
    stream.write_all(greeting).await?;

    let mut choice = [0u8; 2];
    stream.read_exact(&mut choice).await?;
    if choice[0] != 0x05 {
        return Err(Error::proxy("invalid SOCKS5 version in method selection"));
    }

    match choice[1] {
        0x00 => {}
        0x02 => {
            events.emit(SessionEvent::AuthChallenge);
            let Some(credential) = credential else {
                return Err(Error::proxy(format!(
                    "proxy {proxy} demands authentication"
                )));
            };
            userpass_subnegotiation(&mut stream, credential).await?;
        }
        0xFF => {
            return Err(Error::proxy(format!(
                "proxy {proxy} accepted none of the offered methods"
            )));
        }
        other => {
            return Err(Error::proxy(format!(
                "proxy {proxy} selected unsupported method {other:#04x}"
            )));
        }
    }

    // Connect request.
    let mut request = vec![0x05, 0x01, 0x00];
    match host.parse::<Ipv4Addr>() {
        Ok(ip) => {
            request.push(0x01);
            request.extend_from_slice(&ip.octets());
        }
        Err(_) => {
            let name = host.as_bytes();
            if name.len() > 255 {
                return Err(Error::proxy("target hostname too long for SOCKS5"));
            }
            request.push(0x03);
            request.push(name.len() as u8);
            request.extend_from_slice(name);
        }
    }
    request.extend_from_slice(&port.to_be_bytes());
    stream.write_all(&request).await?;

    // Reply header, then the bound address to drain.
    let mut reply = [0u8; 4];
    stream.read_exact(&mut reply).await?;
    if reply[0] != 0x05 {
        return Err(Error::proxy("invalid SOCKS5 version in reply"));
    }
    if reply[1] != 0x00 {
        return Err(Error::proxy(format!(
            "SOCKS5 connect rejected: {}",
            reply_name(reply[1])
        )));
    }

    match reply[3] {
        0x01 => {
            let mut rest = [0u8; 6];
            stream.read_exact(&mut rest).await?;
        }
        0x04 => {
            let mut rest = [0u8; 18];
            stream.read_exact(&mut rest).await?;
        }
        0x03 => {
            let mut len = [0u8; 1];
            stream.read_exact(&mut len).await?;
            let mut rest = vec![0u8; len[0] as usize + 2];
            stream.read_exact(&mut rest).await?;
        }
        other => {
            return Err(Error::proxy(format!(
                "unknown SOCKS5 address type {other:#04x} in reply"
            )));
        }
    }

    Ok(stream)
}

/// Runs the RFC 1929 username/password subnegotiation.
async fn userpass_subnegotiation(stream: &mut TcpStream, credential: &Credential) -> Result<()> {
    let username = credential.username.as_bytes();
    let password = credential.password.as_bytes();
    if username.len() > 255 || password.len() > 255 {
        return Err(Error::proxy("credential field too long for SOCKS5"));
    }

    let mut request = Vec::with_capacity(3 + username.len() + password.len());
    request.push(0x01);
    request.push(username.len() as u8);
    request.extend_from_slice(username);
    request.push(password.len() as u8);
    request.extend_from_slice(password);
    stream.write_all(&request).await?;

    let mut reply = [0u8; 2];
    stream.read_exact(&mut reply).await?;
    if reply[1] != 0x00 {
        return Err(Error::proxy("SOCKS5 authentication rejected"));
    }
    Ok(())
}

/// Human-readable names for RFC 1928 reply codes.
fn reply_name(code: u8) -> &'static str {
    match code {
        0x01 => "general failure",
        0x02 => "connection not allowed by ruleset",
        0x03 => "network unreachable",
        0x04 => "host unreachable",
        0x05 => "connection refused",
        0x06 => "TTL expired",
        0x07 => "command not supported",
        0x08 => "address type not supported",
        _ => "unknown failure",
    }
}

// ============================================================================
// Tests
// ============================================================================
