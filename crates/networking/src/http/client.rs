//! REST client for the hosted account store

use super::rows::{GiftRow, GiftRowPatch, ProfileRow, ProfileUpsert};
use ascend_core::{
    AccountPatch, AccountRecord, AccountStore, Error, Gift, GiftId, GiftPatch, Result, UserId,
};
use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    Client, Response,
};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, error, instrument};

const REST_PATH: &str = "rest/v1";

/// Connection settings shared by the account and generator clients
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend root, e.g. `https://project.example.co`
    pub base_url: String,
    /// Public API key sent as the `apikey` header
    pub api_key: String,
    /// Signed-in user's access token from the identity provider
    pub access_token: String,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(base_url: &str, api_key: &str, access_token: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            access_token: access_token.to_string(),
            timeout: Duration::from_secs(15),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build the reqwest client with the configured timeout
    pub(crate) fn build_http(&self) -> Result<Client> {
        Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))
    }

    /// Headers required by every backend request
    pub(crate) fn default_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            "apikey",
            HeaderValue::from_str(&self.api_key)
                .map_err(|e| Error::Config(format!("Invalid API key header: {}", e)))?,
        );
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.access_token))
                .map_err(|e| Error::Config(format!("Invalid access token header: {}", e)))?,
        );
        Ok(headers)
    }
}

/// Check if response indicates authentication failure
pub(crate) fn check_auth_error(response: &Response) -> Option<Error> {
    match response.status().as_u16() {
        401 => Some(Error::TokenExpired),
        403 => Some(Error::AuthenticationError("Access forbidden".to_string())),
        _ => None,
    }
}

/// HTTP implementation of `AccountStore` against a PostgREST-style backend
pub struct AccountClient {
    http: Client,
    config: ClientConfig,
    headers: HeaderMap,
}

impl AccountClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http = config.build_http()?;
        let headers = config.default_headers()?;
        Ok(Self {
            http,
            config,
            headers,
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/{}/{}", self.config.base_url, REST_PATH, table)
    }

    /// Turn a response into parsed JSON, mapping HTTP failures
    async fn read_json<T: DeserializeOwned>(response: Response, what: &str) -> Result<T> {
        if let Some(err) = check_auth_error(&response) {
            return Err(err);
        }

        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            let body = response.text().await.unwrap_or_default();
            error!("{} request failed: HTTP {}: {}", what, status, body);
            return Err(Error::ApiError(format!("HTTP {}: {}", status, body)));
        }

        response.json().await.map_err(|e| {
            error!("Failed to parse {} response: {}", what, e);
            Error::InvalidData(e.to_string())
        })
    }

    /// Fetch the single profile row for a user
    #[instrument(skip(self))]
    pub async fn get_profile(&self, user_id: &UserId) -> Result<Option<ProfileRowView>> {
        let response = self
            .http
            .get(self.table_url("profiles"))
            .headers(self.headers.clone())
            .query(&[
                ("id", format!("eq.{}", user_id)),
                ("select", "character,is_onboarded".to_string()),
            ])
            .send()
            .await?;

        let rows: Vec<ProfileRow> = Self::read_json(response, "Profile").await?;
        Ok(rows.into_iter().next().map(|row| ProfileRowView {
            character: row.character,
            is_onboarded: row.is_onboarded,
        }))
    }

    /// Fetch all gift rows owned by a user
    #[instrument(skip(self))]
    pub async fn list_gifts(&self, user_id: &UserId) -> Result<Vec<Gift>> {
        let response = self
            .http
            .get(self.table_url("gifts"))
            .headers(self.headers.clone())
            .query(&[
                ("user_id", format!("eq.{}", user_id)),
                ("select", "*".to_string()),
            ])
            .send()
            .await?;

        let rows: Vec<GiftRow> = Self::read_json(response, "Gift list").await?;
        debug!("Fetched {} gifts for {}", rows.len(), user_id);
        Ok(rows.into_iter().map(Gift::from).collect())
    }
}

/// Decoded profile row returned by [`AccountClient::get_profile`]
#[derive(Debug, Clone)]
pub struct ProfileRowView {
    pub character: Option<ascend_core::Character>,
    pub is_onboarded: bool,
}

#[async_trait]
impl AccountStore for AccountClient {
    async fn load(&self, user_id: &UserId) -> Result<AccountRecord> {
        let profile = self.get_profile(user_id).await?;
        let gifts = self.list_gifts(user_id).await?;

        let (character, is_onboarded) = match profile {
            Some(p) => (p.character, p.is_onboarded),
            None => {
                debug!("No profile row for {}, using defaults", user_id);
                (None, false)
            }
        };

        Ok(AccountRecord {
            character,
            is_onboarded,
            gifts,
        })
    }

    #[instrument(skip(self, patch))]
    async fn save(&self, user_id: &UserId, patch: &AccountPatch) -> Result<()> {
        let body = ProfileUpsert {
            id: user_id.as_str(),
            character: patch.character.as_ref(),
            is_onboarded: patch.is_onboarded,
        };

        let response = self
            .http
            .post(self.table_url("profiles"))
            .headers(self.headers.clone())
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(&body)
            .send()
            .await?;

        if let Some(err) = check_auth_error(&response) {
            return Err(err);
        }

        response.error_for_status().map_err(|e| {
            error!("Profile save failed: {}", e);
            Error::ApiError(e.to_string())
        })?;

        debug!("Profile saved for {}", user_id);
        Ok(())
    }

    #[instrument(skip(self, gift), fields(gift_id = %gift.id))]
    async fn create_gift(&self, user_id: &UserId, gift: &Gift) -> Result<Gift> {
        if &gift.owner_id != user_id {
            return Err(Error::InvalidData(format!(
                "gift owner {} does not match {}",
                gift.owner_id, user_id
            )));
        }

        let response = self
            .http
            .post(self.table_url("gifts"))
            .headers(self.headers.clone())
            .header("Prefer", "return=representation")
            .json(&GiftRow::from(gift))
            .send()
            .await?;

        let rows: Vec<GiftRow> = Self::read_json(response, "Gift create").await?;
        rows.into_iter()
            .next()
            .map(Gift::from)
            .ok_or_else(|| Error::InvalidData("Gift create returned no rows".to_string()))
    }

    #[instrument(skip(self, patch))]
    async fn update_gift(&self, gift_id: &GiftId, patch: &GiftPatch) -> Result<Gift> {
        let response = self
            .http
            .patch(self.table_url("gifts"))
            .headers(self.headers.clone())
            .header("Prefer", "return=representation")
            .query(&[("id", format!("eq.{}", gift_id))])
            .json(&GiftRowPatch::from(patch))
            .send()
            .await?;

        let rows: Vec<GiftRow> = Self::read_json(response, "Gift update").await?;
        rows.into_iter()
            .next()
            .map(Gift::from)
            .ok_or_else(|| Error::NotFound(format!("gift {}", gift_id)))
    }

    #[instrument(skip(self))]
    async fn delete_gift(&self, gift_id: &GiftId) -> Result<()> {
        let response = self
            .http
            .delete(self.table_url("gifts"))
            .headers(self.headers.clone())
            .header("Prefer", "return=representation")
            .query(&[("id", format!("eq.{}", gift_id))])
            .send()
            .await?;

        let rows: Vec<GiftRow> = Self::read_json(response, "Gift delete").await?;
        if rows.is_empty() {
            return Err(Error::NotFound(format!("gift {}", gift_id)));
        }

        debug!("Deleted gift {}", gift_id);
        Ok(())
    }
}
