//! Per-interface TCP connector used to pin a worker's egress NIC.
//!
//! Spec §4.4/§5/§9: "pin egress by constructing a dedicated client per
//! interface rather than by socket options at the application layer" is the
//! spec's *caller-visible* framing (one client per NIC); this module is the
//! one place that actually touches a socket option (`SO_BINDTODEVICE`),
//! building the dedicated low-level connector each such client is
//! constructed around.

use std::io;
use std::net::SocketAddr;
use std::pin::Pin;
use std::task::{Context, Poll};

use hyper::client::connect::{Connected, Connection};
use hyper::service::Service;
use hyper::Uri;
use pin_project_lite::pin_project;
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::net::TcpStream;

/// Connects plain TCP sockets bound to a named network interface
/// (`SO_BINDTODEVICE`, Linux-only), or the default route if `interface` is
/// `None`. Wrapped in `hyper_rustls::HttpsConnector` to add TLS on top, the
/// same layering `hyper::client::HttpConnector` normally provides.
#[derive(Clone)]
pub struct InterfaceConnector {
    interface: Option<String>,
}

impl InterfaceConnector {
    pub fn new(interface: Option<String>) -> Self {
        Self { interface }
    }
}

pin_project! {
    pub struct InterfaceStream {
        #[pin]
        inner: TcpStream,
    }
}

impl Connection for InterfaceStream {
    fn connected(&self) -> Connected {
        Connected::new()
    }
}

impl AsyncRead for InterfaceStream {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        self.project().inner.poll_read(cx, buf)
    }
}

impl AsyncWrite for InterfaceStream {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        self.project().inner.poll_write(cx, buf)
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        self.project().inner.poll_flush(cx)
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        self.project().inner.poll_shutdown(cx)
    }
}

fn resolve_first(uri: &Uri) -> io::Result<(String, u16)> {
    let host = uri
        .host()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "URI has no host"))?
        .to_string();
    let port = uri.port_u16().unwrap_or(if uri.scheme_str() == Some("https") {
        443
    } else {
        80
    });
    Ok((host, port))
}

#[cfg(target_os = "linux")]
fn bind_to_device(socket: &socket2::Socket, interface: &str) -> io::Result<()> {
    socket.bind_device(Some(interface.as_bytes()))
}

#[cfg(not(target_os = "linux"))]
fn bind_to_device(_socket: &socket2::Socket, interface: &str) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        format!("binding egress to interface '{interface}' requires Linux (SO_BINDTODEVICE)"),
    ))
}

async fn connect_pinned(addr: SocketAddr, interface: Option<&str>) -> io::Result<TcpStream> {
    use socket2::{Domain, Socket, Type};

    let domain = if addr.is_ipv6() { Domain::IPV6 } else { Domain::IPV4 };
    let socket = Socket::new(domain, Type::STREAM, None)?;
    socket.set_nonblocking(true)?;
    if let Some(iface) = interface {
        bind_to_device(&socket, iface)?;
    }

    match socket.connect(&addr.into()) {
        Ok(()) => {}
        Err(e) if e.raw_os_error() == Some(libc::EINPROGRESS) => {}
        Err(e) if e.kind() == io::ErrorKind::WouldBlock => {}
        Err(e) => return Err(e),
    }

    let std_stream: std::net::TcpStream = socket.into();
    let stream = TcpStream::from_std(std_stream)?;
    stream.writable().await?;
    if let Some(err) = stream.take_error()? {
        return Err(err);
    }
    Ok(stream)
}

impl Service<Uri> for InterfaceConnector {
    type Response = InterfaceStream;
    type Error = io::Error;
    type Future = Pin<Box<dyn std::future::Future<Output = io::Result<InterfaceStream>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, uri: Uri) -> Self::Future {
        let interface = self.interface.clone();
        Box::pin(async move {
            let (host, port) = resolve_first(&uri)?;
            let mut addrs = tokio::net::lookup_host((host.as_str(), port)).await?;
            let addr = addrs
                .next()
                .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "DNS resolution returned no addresses"))?;
            let stream = connect_pinned(addr, interface.as_deref()).await?;
            Ok(InterfaceStream { inner: stream })
        })
    }
}
