//! Platform HTTP client construction.
//!
//! Every platform API call carries the app key and token as headers. The
//! token header is marked sensitive so it never shows up in debug output.

use std::time::Duration;

use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, InvalidHeaderValue};
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

pub const APP_KEY_HEADER: &str = "X-VTEX-API-AppKey";
pub const APP_TOKEN_HEADER: &str = "X-VTEX-API-AppToken";

/// Errors building the platform client.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid app key: {0}")]
    InvalidAppKey(InvalidHeaderValue),

    #[error("invalid app token: {0}")]
    InvalidAppToken(InvalidHeaderValue),

    #[error("failed to build HTTP client: {0}")]
    Build(#[from] reqwest::Error),
}

/// Build an HTTP client carrying the app key/token headers.
///
/// # Errors
///
/// Returns an error if a credential isn't a valid header value or the client
/// fails to build.
pub fn platform_client(
    app_key: &str,
    app_token: &SecretString,
    timeout: Duration,
) -> Result<reqwest::Client, ClientError> {
    let mut headers = HeaderMap::new();

    headers.insert(
        APP_KEY_HEADER,
        HeaderValue::from_str(app_key).map_err(ClientError::InvalidAppKey)?,
    );

    let mut token =
        HeaderValue::from_str(app_token.expose_secret()).map_err(ClientError::InvalidAppToken)?;
    token.set_sensitive(true);
    headers.insert(APP_TOKEN_HEADER, token);

    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    Ok(reqwest::Client::builder()
        .default_headers(headers)
        .timeout(timeout)
        .build()?)
}
