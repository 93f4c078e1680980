// ABOUTME: Blocking HTTP GET used to verify a freshly started site.
// ABOUTME: Speaks http and https through reqwest's blocking client, bounded by a timeout.

use reqwest::Url;
use reqwest::blocking::Client;
use reqwest::redirect;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    #[error("invalid URI '{uri}': {reason}")]
    InvalidUri { uri: String, reason: String },

    #[error("unsupported scheme '{0}' (expected http or https)")]
    UnsupportedScheme(String),

    #[error("failed to build HTTP client")]
    Client(#[source] reqwest::Error),

    #[error("GET request failed")]
    Request(#[source] reqwest::Error),

    #[error("no response within {} seconds", .0.as_secs())]
    Timeout(Duration),
}

/// Issue `GET uri` and return the response status code.
///
/// Redirects are not followed: the status compared is the one the site
/// itself answers with.
pub fn get_status(uri: &str, timeout: Duration) -> Result<u16, HttpError> {
    let url = Url::parse(uri).map_err(|e| HttpError::InvalidUri {
        uri: uri.to_string(),
        reason: e.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => {}
        other => return Err(HttpError::UnsupportedScheme(other.to_string())),
    }

    let client = Client::builder()
        .timeout(timeout)
        .redirect(redirect::Policy::none())
        .build()
        .map_err(HttpError::Client)?;

    let response = client.get(url).send().map_err(|e| {
        if e.is_timeout() {
            HttpError::Timeout(timeout)
        } else {
            HttpError::Request(e)
        }
    })?;

    Ok(response.status().as_u16())
}
