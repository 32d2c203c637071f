use std::{fmt, sync::Arc};

use reqwest::{
    header::{self, HeaderMap, HeaderName, HeaderValue},
    redirect, Method, Response, StatusCode,
};
use serde::{de::DeserializeOwned, Serialize};
use tokio::time::sleep;

use crate::{
    BackoffPolicy, ClientConfig, ClientError, ErrorMapping, ErrorResponse, Result, ServiceError,
};

/// Sink for non-fatal cleanup failures, such as a discarded response body
/// that could not be drained.
pub type ErrorLogger = Arc<dyn Fn(&str) + Send + Sync>;

const JSON_CONTENT_TYPE: &str = "application/json";

#[derive(Clone)]
/// JSON HTTP client with linear retry backoff and upstream error mapping.
///
/// Register error mappings once at startup, then clone the client or share it
/// behind an `Arc`; calls only need `&self`.
pub struct HttpClient {
    http: reqwest::Client,
    config: ClientConfig,
    backoff: BackoffPolicy,
    error_map: Arc<ErrorMapping>,
    error_logger: ErrorLogger,
}

impl fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpClient")
            .field("config", &self.config)
            .field("backoff", &self.backoff)
            .field("error_map", &self.error_map)
            .finish_non_exhaustive()
    }
}

impl HttpClient {
    /// Creates a client for `config`, rejecting it when
    /// [`ClientConfig::validate`] fails.
    ///
    /// Redirects are never followed: a 3xx answer is classified like any other
    /// non-retryable status.
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;

        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .redirect(redirect::Policy::none())
            .build()
            .map_err(ClientError::Build)?;

        Ok(Self {
            http,
            backoff: config.backoff(),
            config,
            error_map: Arc::default(),
            error_logger: Arc::new(default_error_logger),
        })
    }

    /// Replaces the sink used for non-fatal cleanup failures.
    pub fn with_error_logger<F>(mut self, logger: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.error_logger = Arc::new(logger);
        self
    }

    /// Registers wire code → domain error pairs. Additive; the last value
    /// registered for a code wins.
    ///
    /// Clones made before this call keep their previous mapping.
    pub fn add_error_mappings<I, K>(&mut self, mappings: I)
    where
        I: IntoIterator<Item = (K, ServiceError)>,
        K: Into<String>,
    {
        Arc::make_mut(&mut self.error_map).extend(mappings);
    }

    /// Builder form of [`HttpClient::add_error_mappings`].
    pub fn with_error_mappings<I, K>(mut self, mappings: I) -> Self
    where
        I: IntoIterator<Item = (K, ServiceError)>,
        K: Into<String>,
    {
        self.add_error_mappings(mappings);
        self
    }

    pub fn error_mapping(&self) -> &ErrorMapping {
        &self.error_map
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn host(&self) -> &str {
        &self.config.host
    }

    /// `"{host}/v1"`
    pub fn v1_url(&self) -> String {
        self.url("v1")
    }

    /// Joins the configured host and `path` with a single `/`.
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.config.host.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Sends a GET request and decodes the JSON response into `T`.
    pub async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        self.get_with_headers(url, no_headers()).await
    }

    /// Like [`HttpClient::get`], with extra headers merged over the JSON content type.
    pub async fn get_with_headers<T, I, K, V>(&self, url: &str, headers: I) -> Result<T>
    where
        T: DeserializeOwned,
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let headers = build_headers(headers)?;
        self.execute(Method::GET, url, headers, None).await
    }

    /// Sends `body` as JSON with POST and decodes the JSON response into `T`.
    pub async fn post<B, T>(&self, url: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.post_with_headers(url, no_headers(), body).await
    }

    pub async fn post_with_headers<B, T, I, K, V>(
        &self,
        url: &str,
        headers: I,
        body: &B,
    ) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let body = serde_json::to_vec(body).map_err(ClientError::Encode)?;
        let headers = build_headers(headers)?;
        self.execute(Method::POST, url, headers, Some(body)).await
    }

    /// Sends `body` as JSON with PATCH and decodes the JSON response into `T`.
    pub async fn patch<B, T>(&self, url: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.patch_with_headers(url, no_headers(), body).await
    }

    pub async fn patch_with_headers<B, T, I, K, V>(
        &self,
        url: &str,
        headers: I,
        body: &B,
    ) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let body = serde_json::to_vec(body).map_err(ClientError::Encode)?;
        let headers = build_headers(headers)?;
        self.execute(Method::PATCH, url, headers, Some(body)).await
    }

    /// Runs the retry loop: at most `retries + 1` attempts, retrying only on
    /// statuses above 499. Transport failures and every other status end the
    /// call on the spot.
    async fn execute<T: DeserializeOwned>(
        &self,
        method: Method,
        url: &str,
        headers: HeaderMap,
        body: Option<Vec<u8>>,
    ) -> Result<T> {
        let attempts = self.config.retries.saturating_add(1);
        let mut attempt = 0usize;
        let mut last_status = StatusCode::INTERNAL_SERVER_ERROR;

        while attempt < attempts {
            let mut request = self
                .http
                .request(method.clone(), url)
                .headers(headers.clone());
            if let Some(body) = &body {
                request = request.body(body.clone());
            }

            let response = request.send().await.map_err(ClientError::Transport)?;
            let status = response.status();

            if status.is_success() {
                return decode_success(response).await;
            }
            if status.as_u16() <= 499 {
                return Err(self.decode_failure(status, response).await);
            }

            last_status = status;
            self.release(response).await;

            if attempt + 1 < attempts {
                let delay = self.backoff.wait(attempt);

                #[cfg(feature = "tracing")]
                tracing::debug!(
                    "retrying {} {} after status {} in {} ms",
                    method,
                    url,
                    status.as_u16(),
                    delay.as_millis()
                );

                sleep(delay).await;
            }
            attempt += 1;
        }

        Err(ClientError::RetriesExhausted {
            attempts,
            last_status: last_status.as_u16(),
        })
    }

    async fn decode_failure(&self, status: StatusCode, response: Response) -> ClientError {
        let body = match response.text().await {
            Ok(body) => body,
            Err(err) => return ClientError::Transport(err),
        };

        match serde_json::from_str::<ErrorResponse>(&body) {
            Ok(payload) => self.error_map.resolve(status.as_u16(), payload),
            Err(err) => ClientError::Decode(format!(
                "invalid error response JSON for status {}: {err}; body: {body}",
                status.as_u16()
            )),
        }
    }

    /// Drains a response that is about to be discarded.
    async fn release(&self, response: Response) {
        if let Err(err) = response.bytes().await {
            (self.error_logger)(&format!("failed to release response body: {err}"));
        }
    }
}

async fn decode_success<T: DeserializeOwned>(response: Response) -> Result<T> {
    let bytes = response.bytes().await.map_err(ClientError::Transport)?;
    // 204 and friends carry no body.
    let body: &[u8] = if bytes.is_empty() { b"null" } else { &bytes };

    serde_json::from_slice(body).map_err(|err| {
        ClientError::Decode(format!(
            "invalid response JSON: {err}; body: {}",
            String::from_utf8_lossy(body)
        ))
    })
}

fn no_headers() -> std::iter::Empty<(&'static str, &'static str)> {
    std::iter::empty()
}

fn build_headers<I, K, V>(extra: I) -> Result<HeaderMap>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(JSON_CONTENT_TYPE),
    );

    for (name, value) in extra {
        let name = name.as_ref();
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| ClientError::InvalidHeader(name.to_owned()))?;
        let header_value = HeaderValue::from_str(value.as_ref())
            .map_err(|_| ClientError::InvalidHeader(name.to_owned()))?;
        headers.insert(header_name, header_value);
    }

    Ok(headers)
}

fn default_error_logger(message: &str) {
    #[cfg(feature = "tracing")]
    tracing::warn!("{}", message);

    #[cfg(not(feature = "tracing"))]
    let _ = message;
}
