//! Client certificate material and the rustls configuration for raw streams

use std::path::Path;
use std::sync::Arc;

use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::pki_types::{CertificateDer, PrivateKeyDer, ServerName, UnixTime};
use rustls::{ClientConfig, DigitallySignedStruct, RootCertStore, SignatureScheme};
use splunkd_core::{Error, Result};

/// PEM-encoded client certificate chain and private key, read once
#[derive(Clone)]
pub(crate) struct ClientIdentity {
    cert_pem: Vec<u8>,
    key_pem: Vec<u8>,
}

impl ClientIdentity {
    /// Read the identity files. `key_file` defaults to `cert_file`, for PEM
    /// bundles holding both.
    pub(crate) fn load(cert_file: Option<&Path>, key_file: Option<&Path>) -> Result<Option<Self>> {
        let cert_file = match (cert_file, key_file) {
            (None, None) => return Ok(None),
            (None, Some(_)) => {
                return Err(Error::InvalidArgument(
                    "a key file was given without a certificate file".into(),
                ));
            }
            (Some(cert_file), _) => cert_file,
        };
        let key_file = key_file.unwrap_or(cert_file);

        let cert_pem = read(cert_file, "certificate")?;
        let key_pem = if key_file == cert_file {
            cert_pem.clone()
        } else {
            read(key_file, "key")?
        };

        tracing::debug!(cert = %cert_file.display(), key = %key_file.display(), "loaded client identity");
        Ok(Some(Self { cert_pem, key_pem }))
    }

    /// The identity in the form ureq's TLS configuration takes
    pub(crate) fn ureq_cert(&self) -> Result<ureq::tls::ClientCert> {
        let cert = ureq::tls::Certificate::from_pem(&self.cert_pem)
            .map_err(|e| Error::InvalidArgument(format!("invalid client certificate: {e}")))?;
        let key = ureq::tls::PrivateKey::from_pem(&self.key_pem)
            .map_err(|e| Error::InvalidArgument(format!("invalid client key: {e}")))?;
        Ok(ureq::tls::ClientCert::new_with_certs(&[cert], key))
    }

    /// The full certificate chain and key for rustls
    pub(crate) fn rustls_parts(&self) -> Result<(Vec<CertificateDer<'static>>, PrivateKeyDer<'static>)> {
        let chain = rustls_pemfile::certs(&mut &self.cert_pem[..])
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| Error::InvalidArgument(format!("invalid client certificate: {e}")))?;
        if chain.is_empty() {
            return Err(Error::InvalidArgument(
                "no certificate found in the certificate file".into(),
            ));
        }

        let key = rustls_pemfile::private_key(&mut &self.key_pem[..])
            .map_err(|e| Error::InvalidArgument(format!("invalid client key: {e}")))?
            .ok_or_else(|| Error::InvalidArgument("no private key found in the key file".into()))?;

        Ok((chain, key))
    }
}

fn read(path: &Path, what: &str) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|e| {
        Error::InvalidArgument(format!("cannot read {what} {}: {e}", path.display()))
    })
}

/// rustls configuration for raw `https` streams
pub(crate) fn client_config(identity: Option<&ClientIdentity>, verify: bool) -> Result<Arc<ClientConfig>> {
    let builder =
        ClientConfig::builder_with_provider(Arc::new(rustls::crypto::ring::default_provider()))
            .with_safe_default_protocol_versions()
            .map_err(tls_error)?;

    let builder = if verify {
        let roots = RootCertStore {
            roots: webpki_roots::TLS_SERVER_ROOTS.to_vec(),
        };
        builder.with_root_certificates(roots)
    } else {
        builder
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(SkipServerVerification))
    };

    let config = match identity {
        Some(identity) => {
            let (chain, key) = identity.rustls_parts()?;
            builder.with_client_auth_cert(chain, key).map_err(tls_error)?
        }
        None => builder.with_no_client_auth(),
    };
    Ok(Arc::new(config))
}

fn tls_error(err: rustls::Error) -> Error {
    Error::InvalidArgument(format!("TLS configuration error: {err}"))
}

/// Accepts any server certificate.
///
/// splunkd installs with a self-signed certificate; verification is only
/// enabled when asked for.
#[derive(Debug)]
struct SkipServerVerification;

impl ServerCertVerifier for SkipServerVerification {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> std::result::Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn verify_tls13_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        vec![
            SignatureScheme::ED25519,
            SignatureScheme::ECDSA_NISTP256_SHA256,
            SignatureScheme::ECDSA_NISTP384_SHA384,
            SignatureScheme::RSA_PSS_SHA256,
            SignatureScheme::RSA_PSS_SHA384,
            SignatureScheme::RSA_PSS_SHA512,
            SignatureScheme::RSA_PKCS1_SHA256,
            SignatureScheme::RSA_PKCS1_SHA384,
            SignatureScheme::RSA_PKCS1_SHA512,
        ]
    }
}
