//! TLS listener support.
//!
//! Both listeners optionally terminate TLS from a PEM certificate/key
//! pair. The accept loop drives the Axum router over each handshaken
//! stream through hyper, so WebSocket upgrades work the same as on the
//! plain listener.

use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto;
use hyper_util::service::TowerToHyperService;
use rustls_pki_types::CertificateDer;
use tokio::net::TcpListener;
use tokio_rustls::TlsAcceptor;
use tokio_rustls::rustls::ServerConfig;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Paths to a PEM certificate chain and private key.
#[derive(Clone, Debug)]
pub struct TlsSettings {
    /// Certificate chain, leaf first.
    pub cert_path: PathBuf,
    /// PKCS#8, PKCS#1, or SEC1 private key.
    pub key_path: PathBuf,
}

/// Load the cert/key pair and build a TLS acceptor.
pub fn build_acceptor(settings: &TlsSettings) -> io::Result<TlsAcceptor> {
    let mut cert_reader = BufReader::new(File::open(&settings.cert_path)?);
    let certs: Vec<CertificateDer<'static>> =
        rustls_pemfile::certs(&mut cert_reader).collect::<Result<_, _>>()?;
    if certs.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("no certificates found in {}", settings.cert_path.display()),
        ));
    }

    let mut key_reader = BufReader::new(File::open(&settings.key_path)?);
    let key = rustls_pemfile::private_key(&mut key_reader)?.ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("no private key found in {}", settings.key_path.display()),
        )
    })?;

    let config = ServerConfig::builder()
        .with_no_client_auth()
        .with_single_cert(certs, key)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

    Ok(TlsAcceptor::from(Arc::new(config)))
}

/// Accept loop for a TLS listener.
///
/// Each accepted stream is handshaken and served on its own task, so a
/// stalled handshake never blocks the listener. Returns when `cancel`
/// fires.
pub async fn serve(
    listener: TcpListener,
    acceptor: TlsAcceptor,
    router: Router,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            () = cancel.cancelled() => break,
            accepted = listener.accept() => {
                let (stream, peer) = match accepted {
                    Ok(pair) => pair,
                    Err(e) => {
                        warn!(error = %e, "accept failed");
                        continue;
                    }
                };
                let acceptor = acceptor.clone();
                let service = TowerToHyperService::new(router.clone());
                let _ = tokio::spawn(async move {
                    let tls_stream = match acceptor.accept(stream).await {
                        Ok(s) => s,
                        Err(e) => {
                            debug!(peer = %peer, error = %e, "tls handshake failed");
                            return;
                        }
                    };
                    let io = TokioIo::new(tls_stream);
                    if let Err(e) = auto::Builder::new(TokioExecutor::new())
                        .serve_connection_with_upgrades(io, service)
                        .await
                    {
                        debug!(peer = %peer, error = %e, "connection closed with error");
                    }
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn missing_cert_file_errors() {
        let tmp = tempfile::tempdir().unwrap();
        let settings = TlsSettings {
            cert_path: tmp.path().join("absent.pem"),
            key_path: tmp.path().join("absent-key.pem"),
        };
        assert!(build_acceptor(&settings).is_err());
    }

    #[test]
    fn cert_file_without_pem_blocks_errors() {
        let tmp = tempfile::tempdir().unwrap();
        let cert_path = tmp.path().join("cert.pem");
        let key_path = tmp.path().join("key.pem");
        let mut f = File::create(&cert_path).unwrap();
        f.write_all(b"this is not a certificate").unwrap();
        let mut f = File::create(&key_path).unwrap();
        f.write_all(b"this is not a key").unwrap();

        let settings = TlsSettings { cert_path, key_path };
        let err = build_acceptor(&settings).map(|_| ()).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn missing_key_file_errors() {
        let tmp = tempfile::tempdir().unwrap();
        let cert_path = tmp.path().join("cert.pem");
        // A syntactically valid PEM block so cert parsing succeeds
        let mut f = File::create(&cert_path).unwrap();
        f.write_all(b"-----BEGIN CERTIFICATE-----\nAAAA\n-----END CERTIFICATE-----\n")
            .unwrap();

        let settings = TlsSettings {
            cert_path,
            key_path: tmp.path().join("absent-key.pem"),
        };
        assert!(build_acceptor(&settings).is_err());
    }
}
