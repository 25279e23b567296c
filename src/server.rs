//! Listener setup and optional TLS termination

use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use axum::Router;
use hyper::{body::Incoming, Request};
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto;
use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use tokio::net::TcpListener;
use tokio_rustls::TlsAcceptor;
use tower::Service;

use crate::config::ServerConfig;

/// Bind the configured address and serve the router, terminating TLS when a
/// certificate/key pair is configured.
pub async fn serve(config: &ServerConfig, router: Router) -> Result<()> {
    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind to {}", addr))?;

    match config.tls.identity()? {
        Some((cert, key)) => {
            tracing::info!(%addr, "Listening for HTTPS traffic");
            serve_tls(listener, router, cert, key).await
        }
        None => {
            tracing::info!(%addr, "Listening for HTTP traffic");
            axum::serve(listener, router).await?;
            Ok(())
        }
    }
}

/// Accept loop for TLS connections. Handshake and per-connection failures
/// are logged and dropped without affecting the listener.
async fn serve_tls(listener: TcpListener, router: Router, cert: &str, key: &str) -> Result<()> {
    let cert_chain = load_cert_chain(cert)?;
    let private_key = load_private_key(key)?;

    let mut tls_config = rustls::ServerConfig::builder()
        .with_no_client_auth()
        .with_single_cert(cert_chain, private_key)
        .context("invalid TLS certificate/key pair")?;
    tls_config.alpn_protocols = vec![b"h2".to_vec(), b"http/1.1".to_vec()];

    let acceptor = TlsAcceptor::from(Arc::new(tls_config));

    loop {
        let (stream, peer) = match listener.accept().await {
            Ok(conn) => conn,
            Err(err) => {
                tracing::warn!(error = %err, "failed to accept connection");
                continue;
            }
        };

        let acceptor = acceptor.clone();
        let router = router.clone();

        tokio::spawn(async move {
            let stream = match acceptor.accept(stream).await {
                Ok(stream) => stream,
                Err(err) => {
                    tracing::warn!(%peer, error = %err, "TLS handshake failed");
                    return;
                }
            };

            let service = hyper::service::service_fn(move |request: Request<Incoming>| {
                router.clone().call(request)
            });

            if let Err(err) = auto::Builder::new(TokioExecutor::new())
                .serve_connection(TokioIo::new(stream), service)
                .await
            {
                tracing::warn!(%peer, error = %err, "failed to serve connection");
            }
        });
    }
}

fn load_cert_chain(path: &str) -> Result<Vec<CertificateDer<'static>>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("failed to open certificate file {}", path))?;
    let mut reader = std::io::BufReader::new(file);

    let cert_chain = rustls_pemfile::certs(&mut reader)
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("failed to parse certificate file {}", path))?;

    if cert_chain.is_empty() {
        bail!("no certificates found in {}", path);
    }

    Ok(cert_chain)
}

fn load_private_key(path: &str) -> Result<PrivateKeyDer<'static>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("failed to open private key file {}", path))?;
    let mut reader = std::io::BufReader::new(file);

    rustls_pemfile::private_key(&mut reader)
        .with_context(|| format!("failed to parse private key file {}", path))?
        .ok_or_else(|| anyhow!("no private key found in {}", path))
}
