//! HTTP transport to the collector

use crate::error::{RecorderError, Result};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use std::time::Duration;

#[cfg(test)]
use mockall::automock;

/// A fully prepared upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    /// `{collector}/session/{session_id}`
    pub url: String,
    /// Complete `Authorization` header value
    pub authorization: String,
    /// Encoded payload, sent as `text/plain`
    pub body: String,
}

/// Issues one upload attempt; never retries
#[cfg_attr(test, automock)]
pub trait Transport: Send {
    fn post(&self, request: &UploadRequest) -> Result<()>;
}

/// Blocking reqwest client; meant to run on the delivery worker thread
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn post(&self, request: &UploadRequest) -> Result<()> {
        let response = self
            .client
            .post(&request.url)
            .header(CONTENT_TYPE, "text/plain")
            .header(AUTHORIZATION, &request.authorization)
            .body(request.body.clone())
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(RecorderError::Delivery(format!(
                "collector returned {} for {}",
                status, request.url
            )));
        }

        Ok(())
    }
}
