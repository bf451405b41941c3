//! Production transport built on tokio-tungstenite.
//!
//! Opens the raw stream according to the session configuration (modern proxy
//! list first, then the legacy group, then direct), performs the WebSocket
//! opening handshake with TLS for `wss`, follows handshake redirects, and
//! answers Basic authentication challenges with the configured credential.

// ============================================================================
// Imports
// ============================================================================

use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Error as WsError;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::handshake::client::Request;
use tokio_tungstenite::tungstenite::http::{HeaderValue, StatusCode, header};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, client_async_tls_with_config};
use tracing::{debug, warn};
use url::Url;

use crate::config::{Credential, LegacyProxyConfig, ProxyDescriptor, SessionConfig};
use crate::error::{Error, Result};
use crate::session::event::{EventSink, SessionEvent};
use crate::session::transport::{Connector, Frame, FrameSink, FrameSource, HandshakeInfo};
use crate::session::tunnel::{ProxyServer, http_connect_tunnel, socks5_tunnel};
use crate::settings::AuthMethod;

// ============================================================================
// Constants
// ============================================================================

/// Redirects followed before giving up.
const MAX_REDIRECTS: u32 = 10;

// ============================================================================
// Types
// ============================================================================

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// One way of reaching the endpoint's TCP layer.
enum ProxyRoute {
    /// Plain TCP, no proxy.
    Direct,
    /// SOCKS v5 tunnel.
    Socks5(ProxyServer),
    /// HTTP CONNECT tunnel.
    HttpConnect(ProxyServer),
}

// ============================================================================
// TungsteniteConnector
// ============================================================================

/// The production [`Connector`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TungsteniteConnector;

impl TungsteniteConnector {
    /// Creates the connector.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Opens the raw stream for `url`, trying each configured route in order.
    async fn open_stream(
        &self,
        url: &Url,
        config: &SessionConfig,
        events: &EventSink,
    ) -> Result<TcpStream> {
        let host = url
            .host_str()
            .ok_or_else(|| Error::invalid_url(url.as_str()))?;
        let port = endpoint_port(url);
        let basic = basic_credential(config);

        let mut last_error = None;
        for route in routes_for(url, config) {
            let attempt = match &route {
                ProxyRoute::Direct => {
                    debug!(host, port, "connecting directly");
                    TcpStream::connect((host, port)).await.map_err(Error::from)
                }
                ProxyRoute::Socks5(proxy) => {
                    socks5_tunnel(proxy, host, port, config.credential.as_ref(), events).await
                }
                ProxyRoute::HttpConnect(proxy) => {
                    http_connect_tunnel(proxy, host, port, basic, events).await
                }
            };

            match attempt {
                Ok(stream) => return Ok(stream),
                Err(error) => {
                    warn!(%error, "connection route failed");
                    last_error = Some(error);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| Error::connection("no usable connection route")))
    }
}

#[async_trait]
impl Connector for TungsteniteConnector {
    async fn connect(
        &self,
        url: &Url,
        config: &SessionConfig,
        events: &EventSink,
    ) -> Result<(Box<dyn FrameSink>, Box<dyn FrameSource>, HandshakeInfo)> {
        let mut target = url.clone();
        let mut authorization: Option<String> = None;
        let mut redirects = 0u32;

        loop {
            let stream = self.open_stream(&target, config, events).await?;
            let request = build_request(&target, authorization.as_deref())?;

            match client_async_tls_with_config(request, stream, None, None).await {
                Ok((ws_stream, response)) => {
                    let subprotocol = response
                        .headers()
                        .get(header::SEC_WEBSOCKET_PROTOCOL)
                        .and_then(|value| value.to_str().ok())
                        .map(str::to_owned);
                    let (sink, stream) = ws_stream.split();

                    return Ok((
                        Box::new(WsFrameSink { sink }),
                        Box::new(WsFrameSource { stream }),
                        HandshakeInfo { subprotocol },
                    ));
                }

                Err(WsError::Http(response)) => {
                    let status = response.status();

                    if status.is_redirection() {
                        redirects += 1;
                        if redirects > MAX_REDIRECTS {
                            return Err(Error::too_many_redirects(MAX_REDIRECTS));
                        }
                        let location = response
                            .headers()
                            .get(header::LOCATION)
                            .and_then(|value| value.to_str().ok())
                            .ok_or_else(|| {
                                Error::connection(format!(
                                    "redirect without a Location header (status {status})"
                                ))
                            })?;
                        let next = target.join(location).map_err(|_| {
                            Error::connection(format!("unusable redirect target \"{location}\""))
                        })?;
                        events.emit(SessionEvent::Redirect {
                            location: next.to_string(),
                        });
                        target = next;
                        continue;
                    }

                    if status == StatusCode::UNAUTHORIZED
                        || status == StatusCode::PROXY_AUTHENTICATION_REQUIRED
                    {
                        events.emit(SessionEvent::AuthChallenge);
                        if authorization.is_none()
                            && let Some(credential) = basic_credential(config)
                        {
                            authorization = Some(credential.basic_authorization());
                            continue;
                        }
                        return Err(Error::connection(format!(
                            "endpoint requires authentication (status {status})"
                        )));
                    }

                    return Err(Error::connection(format!(
                        "handshake rejected with status {status}"
                    )));
                }

                Err(error) => return Err(error.into()),
            }
        }
    }
}

// ============================================================================
// Route Selection
// ============================================================================

/// Routes to attempt, in order.
///
/// The modern list takes precedence over the legacy group; within the legacy
/// group, `wss` prefers the HTTPS entry, `ws` the HTTP entry, with SOCKS as
/// the fallback for both.
fn routes_for(url: &Url, config: &SessionConfig) -> Vec<ProxyRoute> {
    if let Some(modern) = &config.modern {
        return modern
            .proxies
            .iter()
            .map(|descriptor| match descriptor {
                ProxyDescriptor::Socks5 { addr } => {
                    ProxyRoute::Socks5(ProxyServer::Addr((*addr).into()))
                }
                ProxyDescriptor::HttpConnect { addr } => {
                    ProxyRoute::HttpConnect(ProxyServer::Addr((*addr).into()))
                }
            })
            .collect();
    }

    if let Some(legacy) = &config.legacy {
        return vec![legacy_route(url, legacy)];
    }

    vec![ProxyRoute::Direct]
}

fn legacy_route(url: &Url, legacy: &LegacyProxyConfig) -> ProxyRoute {
    let connect_entry = if url.scheme() == "wss" {
        legacy.https.as_ref().or(legacy.http.as_ref())
    } else {
        legacy.http.as_ref()
    };

    if let Some(entry) = connect_entry {
        return ProxyRoute::HttpConnect(ProxyServer::Named {
            host: entry.host.clone(),
            port: entry.port,
        });
    }

    if let Some(entry) = &legacy.socks {
        return ProxyRoute::Socks5(ProxyServer::Named {
            host: entry.host.clone(),
            port: entry.port,
        });
    }

    ProxyRoute::Direct
}

// ============================================================================
// Helpers
// ============================================================================

fn endpoint_port(url: &Url) -> u16 {
    url.port_or_known_default()
        .unwrap_or(if url.scheme() == "wss" { 443 } else { 80 })
}

/// The credential, but only when the Basic method was selected.
fn basic_credential(config: &SessionConfig) -> Option<&Credential> {
    match config.auth_method {
        Some(AuthMethod::Basic) => config.credential.as_ref(),
        _ => None,
    }
}

fn build_request(url: &Url, authorization: Option<&str>) -> Result<Request> {
    let mut request = url.as_str().into_client_request()?;
    if let Some(value) = authorization {
        let value = HeaderValue::from_str(value)
            .map_err(|_| Error::connection("credential not representable in a header"))?;
        request.headers_mut().insert(header::AUTHORIZATION, value);
    }
    Ok(request)
}

// ============================================================================
// Frame Adapters
// ============================================================================

struct WsFrameSink {
    sink: SplitSink<WsStream, Message>,
}

#[async_trait]
impl FrameSink for WsFrameSink {
    async fn send_text(&mut self, text: &str) -> Result<()> {
        self.sink
            .send(Message::Text(text.into()))
            .await
            .map_err(Error::from)
    }

    async fn close(&mut self) -> Result<()> {
        self.sink.close().await.map_err(Error::from)
    }
}

struct WsFrameSource {
    stream: SplitStream<WsStream>,
}

#[async_trait]
impl FrameSource for WsFrameSource {
    async fn receive(&mut self) -> Result<Option<Frame>> {
        loop {
            return match self.stream.next().await {
                Some(Ok(Message::Text(text))) => Ok(Some(Frame::Text(text.as_str().to_owned()))),
                Some(Ok(Message::Binary(data))) => Ok(Some(Frame::Binary(data.to_vec()))),
                Some(Ok(Message::Close(frame))) => {
                    Ok(Some(Frame::Close(frame.map(|f| u16::from(f.code)))))
                }
                // Keepalives are answered by the protocol layer.
                Some(Ok(Message::Ping(_) | Message::Pong(_))) => continue,
                Some(Ok(_)) => Ok(Some(Frame::Other)),
                Some(Err(error)) => Err(error.into()),
                None => Ok(None),
            };
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
