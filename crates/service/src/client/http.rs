use std::time::Duration;

use async_trait::async_trait;
use rand::{distributions::Alphanumeric, Rng};
use reqwest::{Certificate, Identity};
use tracing::{debug, instrument};

use configs::{AppConfig, AuthMode};

use super::{Client, ClientError, Method, QrsRequest, QrsResponse};

const XRFKEY_HEADER: &str = "X-Qlik-Xrfkey";
const XRFKEY_LEN: usize = 16;

/// reqwest-backed client for a QRS endpoint.
///
/// Every call carries a fresh cross-site request forgery key, sent both as the
/// `xrfkey` query parameter and the `X-Qlik-Xrfkey` header, plus the
/// authentication header selected by the configuration.
#[derive(Clone, Debug)]
pub struct HttpClient {
    http: reqwest::Client,
    base_url: String,
    auth_header: (String, String),
}

impl HttpClient {
    /// Build a client from validated configuration, loading certificates from
    /// disk when certificate authentication is selected.
    pub fn from_config(cfg: &AppConfig) -> Result<Self, ClientError> {
        let mut builder = reqwest::Client::builder()
            .use_rustls_tls()
            .timeout(Duration::from_secs(cfg.client.timeout_secs))
            .connect_timeout(Duration::from_secs(cfg.client.connect_timeout_secs))
            .danger_accept_invalid_certs(cfg.auth.accept_invalid_certs);

        if let Some(root) = cfg.auth.root_cert.as_deref() {
            let pem = read_pem(root)?;
            let cert = Certificate::from_pem(&pem).map_err(|e| ClientError::Config(format!("root certificate {root}: {e}")))?;
            builder = builder.add_root_certificate(cert);
        }

        let auth_header = match cfg.auth.mode {
            AuthMode::Certificate => {
                let (cert, key) = match (cfg.auth.client_cert.as_deref(), cfg.auth.client_key.as_deref()) {
                    (Some(cert), Some(key)) => (cert, key),
                    _ => return Err(ClientError::Config("certificate auth needs client_cert and client_key".into())),
                };
                builder = builder.identity(client_identity(cert, key)?);
                impersonation_header(&cfg.auth.user_directory, &cfg.auth.user_id)
            }
            AuthMode::Header => {
                let name = cfg
                    .auth
                    .header_name
                    .clone()
                    .ok_or_else(|| ClientError::Config("header auth needs header_name".into()))?;
                (name, cfg.auth.user_id.clone())
            }
        };

        let http = builder.build()?;
        Ok(Self { http, base_url: cfg.base_url(), auth_header })
    }

    /// Client without TLS identity, authenticating with a single header. Used
    /// for virtual proxies with header authentication and for local servers.
    pub fn with_header_auth(
        base_url: impl Into<String>,
        header_name: impl Into<String>,
        header_value: impl Into<String>,
    ) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().use_rustls_tls().timeout(Duration::from_secs(30)).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            auth_header: (header_name.into(), header_value.into()),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl Client for HttpClient {
    #[instrument(skip(self, request), fields(method = %request.method, path = %request.url))]
    async fn call(&self, request: QrsRequest) -> Result<QrsResponse, ClientError> {
        let xrfkey = xrfkey();
        let url = format!("{}{}", self.base_url, request.url);
        let mut builder = self
            .http
            .request(request.method.into(), &url)
            .query(&request.params)
            .query(&[("xrfkey", xrfkey.as_str())])
            .header(XRFKEY_HEADER, xrfkey.as_str())
            .header(self.auth_header.0.as_str(), self.auth_header.1.as_str());
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let resp = builder.send().await?;
        let status = resp.status().as_u16();
        let body = resp.text().await?;
        debug!(status, bytes = body.len(), "qrs_response");
        Ok(QrsResponse { status, body })
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// `X-Qlik-User` header impersonating a directory user.
pub(crate) fn impersonation_header(user_directory: &str, user_id: &str) -> (String, String) {
    ("X-Qlik-User".to_string(), format!("UserDirectory={user_directory}; UserId={user_id}"))
}

/// Random alphanumeric key, fresh per request.
pub(crate) fn xrfkey() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(XRFKEY_LEN)
        .map(char::from)
        .collect()
}

/// Client certificate plus private key. The key may be PKCS#1 (the format
/// Qlik Sense exports), PKCS#8 or SEC1.
fn client_identity(cert: &str, key: &str) -> Result<Identity, ClientError> {
    let mut pem = read_pem(cert)?;
    if !pem.ends_with(b"\n") {
        pem.push(b'\n');
    }
    pem.extend(read_pem(key)?);
    Identity::from_pem(&pem).map_err(|e| ClientError::Config(format!("client identity {cert}, {key}: {e}")))
}

fn read_pem(path: &str) -> Result<Vec<u8>, ClientError> {
    std::fs::read(path).map_err(|e| ClientError::Config(format!("cannot read {path}: {e}")))
}
