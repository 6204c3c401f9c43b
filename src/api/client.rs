use color_eyre::{eyre::eyre, Result};
use std::time::Duration;
use url::Url;

use crate::loader::{HttpClient, HttpResponse};

/// reqwest-backed transport for the feed API.
#[derive(Clone)]
pub struct ReqwestHttpClient {
  client: reqwest::Client,
}

impl ReqwestHttpClient {
  pub fn new(timeout: Duration) -> Result<Self> {
    let client = reqwest::Client::builder()
      .timeout(timeout)
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self { client })
  }
}

impl HttpClient for ReqwestHttpClient {
  async fn get(&self, url: &Url) -> Result<HttpResponse> {
    let response = self
      .client
      .get(url.clone())
      .send()
      .await
      .map_err(|e| eyre!("Failed to GET {}: {}", url, e))?;

    let status = response.status().as_u16();
    let body = response
      .bytes()
      .await
      .map_err(|e| eyre!("Failed to read body from {}: {}", url, e))?;

    Ok(HttpResponse { status, body })
  }
}
