use async_trait::async_trait;
use reqwest::header::{HeaderMap, AUTHORIZATION};
use reqwest::{Client, StatusCode, Url};
use tracing::{debug, error};

use crate::auth::{IdentityProvider, UserIdentity};
use crate::clients::http::{build_client, decode_json, endpoint, parse_base_url, reject, send};
use crate::config::BridgeConfig;
use crate::error::{Result, SyncError, Upstream};

/// Resolves user tokens through the identity service
#[derive(Debug)]
pub struct HttpIdentityProvider {
    client: Client,
    user_url: Url,
}

impl HttpIdentityProvider {
    pub fn new(config: &BridgeConfig) -> Result<Self> {
        let base_url = parse_base_url(Upstream::Identity, &config.auth.identity_url)?;
        let client = build_client(Upstream::Identity, config.web.http_timeout(), HeaderMap::new())?;

        Ok(Self {
            client,
            user_url: endpoint(&base_url, &["auth", "user"]),
        })
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    async fn identify(&self, token: &str) -> Result<UserIdentity> {
        debug!(url = %self.user_url, "Verifying user token");

        let response = send(
            Upstream::Identity,
            "GET",
            &self.user_url,
            self.client
                .get(self.user_url.clone())
                .header(AUTHORIZATION, token),
        )
        .await?;

        match response.status() {
            StatusCode::OK => decode_json(Upstream::Identity, response).await,
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                error!(status = response.status().as_u16(), "Couldn't verify identity");
                Err(SyncError::unauthorized("couldn't verify identity"))
            }
            _ => Err(reject(Upstream::Identity, response).await),
        }
    }
}
