//! # Recognition Daemon Client
//!
//! Sends line images to the recognition daemon and decodes its suggested
//! transcriptions.

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{Client, Url};
use tracing::{debug, info};

use crate::clients::http::{build_client, decode_json, endpoint, expect_ok, parse_base_url, send};
use crate::config::BridgeConfig;
use crate::error::{Result, Upstream};
use crate::sync::traits::Recognizer;
use crate::sync::types::{RecognitionRequest, RecognitionResult};

/// HTTP client for the recognition daemon
#[derive(Debug)]
pub struct RecognizerClient {
    client: Client,
    recognize_url: Url,
}

impl RecognizerClient {
    pub fn new(config: &BridgeConfig) -> Result<Self> {
        let base_url = parse_base_url(Upstream::Recognizer, &config.recognizer.base_url)?;
        let recognize_url = endpoint(&base_url, &["laiaDaemon", "recognizeImgs"]);
        let client = build_client(
            Upstream::Recognizer,
            config.web.http_timeout(),
            HeaderMap::new(),
        )?;

        info!(url = %recognize_url, "Created RecognizerClient");

        Ok(Self {
            client,
            recognize_url,
        })
    }
}

#[async_trait]
impl Recognizer for RecognizerClient {
    async fn recognize(&self, request: &RecognitionRequest) -> Result<RecognitionResult> {
        debug!(
            url = %self.recognize_url,
            images = request.len(),
            "Sending images to recognizer"
        );

        // The daemon reads the image list from the body of a GET
        let response = send(
            Upstream::Recognizer,
            "GET",
            &self.recognize_url,
            self.client.get(self.recognize_url.clone()).json(request),
        )
        .await?;
        let response = expect_ok(Upstream::Recognizer, response).await?;

        decode_json(Upstream::Recognizer, response).await
    }
}
