// File: ./src/client.rs
// Fetches the school document and calendar feeds over http(s) or from disk
use crate::cache::Cache;
use crate::model::SchoolData;

use anyhow::{Context, Result, anyhow, bail};
use http::{Request, Uri, header};
use http_body_util::BodyExt;
use hyper_rustls::HttpsConnectorBuilder;
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

const MAX_REDIRECTS: usize = 5;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

type HttpsClient = Client<hyper_rustls::HttpsConnector<HttpConnector>, String>;

#[derive(Clone, Debug)]
pub struct HttpClient {
    client: HttpsClient,
    timeout: Duration,
}

impl HttpClient {
    pub fn new(insecure: bool) -> Result<Self> {
        let tls_config = if insecure {
            rustls::ClientConfig::builder()
                .dangerous()
                .with_custom_certificate_verifier(Arc::new(NoVerifier))
                .with_no_client_auth()
        } else {
            let mut root_store = rustls::RootCertStore::empty();
            let result = rustls_native_certs::load_native_certs();
            root_store.add_parsable_certificates(result.certs);

            // Plain http sources still work without any roots.
            if root_store.is_empty() {
                tracing::warn!("no system certificates found, https sources will fail");
            }

            rustls::ClientConfig::builder()
                .with_root_certificates(root_store)
                .with_no_client_auth()
        };

        let https_connector = HttpsConnectorBuilder::new()
            .with_tls_config(tls_config)
            .https_or_http()
            .enable_http1()
            .build();

        Ok(Self {
            client: Client::builder(TokioExecutor::new()).build(https_connector),
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Upper bound for one `fetch_text`, redirects and body included.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// GET `url` and return the body as text. Follows a few redirects; any
    /// other non-2xx status is an error, and so is a server that stays silent
    /// past the timeout.
    pub async fn fetch_text(&self, url: &str) -> Result<String> {
        tokio::time::timeout(self.timeout, self.get_following_redirects(url))
            .await
            .map_err(|_| anyhow!("{} timed out after {:?}", url, self.timeout))?
    }

    async fn get_following_redirects(&self, url: &str) -> Result<String> {
        let mut uri: Uri = url.parse().with_context(|| format!("invalid url '{}'", url))?;

        for _ in 0..=MAX_REDIRECTS {
            let req = Request::get(uri.clone())
                .header(header::USER_AGENT, concat!("jikanwari/", env!("CARGO_PKG_VERSION")))
                .body(String::new())?;
            let resp = self.client.request(req).await?;
            let status = resp.status();

            if status.is_redirection() {
                let location = resp
                    .headers()
                    .get(header::LOCATION)
                    .and_then(|v| v.to_str().ok())
                    .ok_or_else(|| anyhow!("redirect without location from {}", uri))?;
                uri = resolve_location(&uri, location)?;
                tracing::debug!(%uri, "following redirect");
                continue;
            }
            if !status.is_success() {
                bail!("{} returned {}", uri, status);
            }

            let body = resp.into_body().collect().await?.to_bytes();
            return Ok(String::from_utf8_lossy(&body).into_owned());
        }
        bail!("too many redirects for {}", url)
    }
}

fn resolve_location(base: &Uri, location: &str) -> Result<Uri> {
    if location.starts_with("http://") || location.starts_with("https://") {
        return Ok(location.parse()?);
    }
    let scheme = base.scheme_str().unwrap_or("https");
    let authority = base
        .authority()
        .ok_or_else(|| anyhow!("relative redirect from {} without authority", base))?;
    Ok(format!("{}://{}{}", scheme, authority, location).parse()?)
}

/// Where the school document comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    Url(String),
    Path(PathBuf),
}

impl DataSource {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.starts_with("http://") || raw.starts_with("https://") {
            DataSource::Url(raw.to_string())
        } else {
            DataSource::Path(PathBuf::from(raw))
        }
    }

    pub fn key(&self) -> String {
        match self {
            DataSource::Url(u) => u.clone(),
            DataSource::Path(p) => p.display().to_string(),
        }
    }

    pub async fn fetch(&self, http: &HttpClient) -> Result<SchoolData> {
        let text = match self {
            DataSource::Url(url) => http.fetch_text(url).await?,
            DataSource::Path(path) => tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("reading {}", path.display()))?,
        };
        Ok(SchoolData::from_json(&text)?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataOrigin {
    Source,
    Cache,
    Empty,
}

impl DataOrigin {
    pub fn status_text(&self) -> &'static str {
        match self {
            DataOrigin::Source => "Timetable loaded.",
            DataOrigin::Cache => "Offline: showing last loaded timetable.",
            DataOrigin::Empty => "Could not load timetable, using empty data.",
        }
    }
}

/// One attempt, no retry. On failure the cached copy is used, then an empty document.
pub async fn load_school_data(source: &DataSource, http: &HttpClient) -> (SchoolData, DataOrigin) {
    let key = source.key();
    match source.fetch(http).await {
        Ok(data) => {
            tracing::info!(source = %key, "loaded school data");
            if let Err(e) = Cache::save(&key, &data) {
                tracing::warn!(error = %e, "failed to cache school data");
            }
            (data, DataOrigin::Source)
        }
        Err(e) => {
            tracing::warn!(source = %key, error = %e, "data load failed");
            match Cache::load(&key) {
                Ok(Some(data)) => (data, DataOrigin::Cache),
                Ok(None) => (SchoolData::default(), DataOrigin::Empty),
                Err(e) => {
                    tracing::warn!(error = %e, "cached school data unreadable");
                    (SchoolData::default(), DataOrigin::Empty)
                }
            }
        }
    }
}

#[derive(Debug)]
struct NoVerifier;
impl rustls::client::danger::ServerCertVerifier for NoVerifier {
    fn verify_server_cert(
        &self,
        _: &rustls::pki_types::CertificateDer<'_>,
        _: &[rustls::pki_types::CertificateDer<'_>],
        _: &rustls::pki_types::ServerName<'_>,
        _: &[u8],
        _: rustls::pki_types::UnixTime,
    ) -> Result<rustls::client::danger::ServerCertVerified, rustls::Error> {
        Ok(rustls::client::danger::ServerCertVerified::assertion())
    }
    fn verify_tls12_signature(
        &self,
        _: &[u8],
        _: &rustls::pki_types::CertificateDer<'_>,
        _: &rustls::DigitallySignedStruct,
    ) -> Result<rustls::client::danger::HandshakeSignatureValid, rustls::Error> {
        Ok(rustls::client::danger::HandshakeSignatureValid::assertion())
    }
    fn verify_tls13_signature(
        &self,
        _: &[u8],
        _: &rustls::pki_types::CertificateDer<'_>,
        _: &rustls::DigitallySignedStruct,
    ) -> Result<rustls::client::danger::HandshakeSignatureValid, rustls::Error> {
        Ok(rustls::client::danger::HandshakeSignatureValid::assertion())
    }
    fn supported_verify_schemes(&self) -> Vec<rustls::SignatureScheme> {
        use rustls::SignatureScheme::*;
        vec![
            RSA_PKCS1_SHA256,
            RSA_PKCS1_SHA384,
            RSA_PKCS1_SHA512,
            ECDSA_NISTP256_SHA256,
            RSA_PSS_SHA256,
            ED25519,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_kind() {
        assert_eq!(
            DataSource::parse("https://example.com/data.json"),
            DataSource::Url("https://example.com/data.json".to_string())
        );
        assert_eq!(
            DataSource::parse(" ./data.json "),
            DataSource::Path(PathBuf::from("./data.json"))
        );
    }

    #[test]
    fn relative_redirects() {
        let base: Uri = "https://example.com/a/b.json".parse().unwrap();
        assert_eq!(
            resolve_location(&base, "/c.json").unwrap().to_string(),
            "https://example.com/c.json"
        );
        assert_eq!(
            resolve_location(&base, "http://other.org/x").unwrap().to_string(),
            "http://other.org/x"
        );
    }
}
