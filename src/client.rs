//! HTTP access to the FoodData Central search endpoint
//!
//! [`FoodSource`] is the seam between the extractor and the network: the
//! extractor only needs a page count and the raw foods of a page.
//! [`ApiClient`] implements it with blocking `reqwest` calls, one request at a
//! time.

use crate::error::EtlError;
use crate::types::EtlConfig;
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::error::Error as _;

static API_KEY_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"api_key=[^&\s)]*").unwrap()
});

/// Somewhere paginated raw food records can be read from
pub trait FoodSource {
    /// Number of result pages the search reports
    fn total_pages(&self) -> Result<u32, EtlError>;

    /// Raw food objects of one 1-based page
    fn fetch_page(&self, page: u32) -> Result<Vec<Value>, EtlError>;
}

/// Blocking client for the search endpoint.
///
/// The credential is handed over at construction and sent as `api_key` on
/// every request.
pub struct ApiClient {
    client: reqwest::blocking::Client,
    base_url: String,
    api_key: String,
    page_size: u32,
}

impl ApiClient {
    pub fn new(config: &EtlConfig) -> Self {
        Self::with_client(reqwest::blocking::Client::new(), config)
    }

    pub fn with_client(client: reqwest::blocking::Client, config: &EtlConfig) -> Self {
        ApiClient {
            client,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            page_size: config.page_size,
        }
    }

    fn get(&self, params: &[(&str, String)]) -> Result<Value, EtlError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(params)
            .send()
            .map_err(request_error)?
            .error_for_status()
            .map_err(request_error)?;

        let body = response.bytes().map_err(request_error)?;
        decode_body(&body)
    }
}

impl FoodSource for ApiClient {
    fn total_pages(&self) -> Result<u32, EtlError> {
        let body = self.get(&[
            ("api_key", self.api_key.clone()),
            ("pageSize", self.page_size.to_string()),
        ])?;
        parse_total_pages(&body)
    }

    fn fetch_page(&self, page: u32) -> Result<Vec<Value>, EtlError> {
        debug!("Requesting page {} (pageSize={})", page, self.page_size);
        let body = self.get(&[
            ("api_key", self.api_key.clone()),
            ("pageNumber", page.to_string()),
            ("pageSize", self.page_size.to_string()),
        ])?;
        parse_foods(body)
    }
}

/// Wrap a transport or status failure, keeping the whole cause chain but not
/// the credential.
fn request_error(err: reqwest::Error) -> EtlError {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    EtlError::Request(redact_api_key(&message))
}

pub(crate) fn redact_api_key(message: &str) -> String {
    API_KEY_REGEX.replace_all(message, "api_key=REDACTED").into_owned()
}

/// Decode a response body, SIMD first and `serde_json` if that parser refuses
fn decode_body(body: &[u8]) -> Result<Value, EtlError> {
    // simd-json parses in place, so it gets a scratch copy
    let mut scratch = body.to_vec();
    match simd_json::serde::from_slice::<Value>(&mut scratch) {
        Ok(value) => Ok(value),
        Err(_) => serde_json::from_slice(body)
            .map_err(|e| EtlError::malformed("response body", e.to_string())),
    }
}

fn parse_total_pages(body: &Value) -> Result<u32, EtlError> {
    let total = body
        .get("totalPages")
        .ok_or_else(|| EtlError::malformed("totalPages", "key is missing"))?;

    total
        .as_u64()
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(|| {
            EtlError::malformed("totalPages", format!("expected a page count, found {}", total))
        })
}

fn parse_foods(body: Value) -> Result<Vec<Value>, EtlError> {
    let Value::Object(mut body) = body else {
        return Err(EtlError::malformed("foods", "response is not a JSON object"));
    };

    match body.remove("foods") {
        Some(Value::Array(foods)) => Ok(foods),
        Some(other) => Err(EtlError::malformed(
            "foods",
            format!("expected an array, found {}", other),
        )),
        None => Err(EtlError::malformed("foods", "key is missing")),
    }
}
