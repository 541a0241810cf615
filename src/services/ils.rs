//! ILS web API client
//!
//! Sierra-style REST client: client-key token auth, item-level hold
//! placement, and hold listing/cleanup on the batch account. The core only
//! consumes the trait; the HTTP details stay here.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::{
    config::IlsConfig,
    error::{AppError, AppResult},
};

/// One hold as reported by the ILS
#[derive(Debug, Clone, Deserialize)]
pub struct IlsHold {
    pub id: String,
    #[serde(default)]
    pub record: Option<String>,
    #[serde(default)]
    pub pickup_location: Option<String>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IlsService: Send + Sync {
    /// Place an item-level hold for the account, to be picked up at (i.e.
    /// shipped to) the destination branch
    async fn place_hold_on_item(
        &self,
        account_id: i64,
        item_id: i64,
        branch_code: &str,
    ) -> AppResult<()>;

    /// Holds currently on the account
    async fn list_holds(&self, account_id: i64, limit: usize) -> AppResult<Vec<IlsHold>>;

    /// Remove every hold from the account
    async fn delete_all_holds(&self, account_id: i64) -> AppResult<()>;
}

/// Sierra REST implementation
#[derive(Clone)]
pub struct SierraService {
    http: reqwest::Client,
    config: IlsConfig,
}

impl SierraService {
    pub fn new(config: IlsConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// Client-credentials token exchange
    async fn access_token(&self) -> AppResult<String> {
        #[derive(Deserialize)]
        struct TokenResponse {
            access_token: String,
        }

        let response = self
            .http
            .post(self.url("/token"))
            .basic_auth(&self.config.client_key, Some(&self.config.client_secret))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(AppError::Ils(format!(
                "token request failed: {}",
                response.status()
            )));
        }
        let token: TokenResponse = response.json().await?;
        Ok(token.access_token)
    }
}

#[async_trait]
impl IlsService for SierraService {
    async fn place_hold_on_item(
        &self,
        account_id: i64,
        item_id: i64,
        branch_code: &str,
    ) -> AppResult<()> {
        let token = self.access_token().await?;
        let body = json!({
            "recordType": "i",
            "recordNumber": item_id,
            "pickupLocation": branch_code,
        });
        let response = self
            .http
            .post(self.url(&format!("/patrons/{account_id}/holds/requests")))
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(AppError::Ils(format!(
                "hold on i{item_id} at {branch_code} rejected: {status} {detail}"
            )));
        }
        Ok(())
    }

    async fn list_holds(&self, account_id: i64, limit: usize) -> AppResult<Vec<IlsHold>> {
        #[derive(Deserialize)]
        struct HoldsResponse {
            #[serde(default)]
            entries: Vec<IlsHold>,
        }

        let token = self.access_token().await?;
        let response = self
            .http
            .get(self.url(&format!("/patrons/{account_id}/holds?limit={limit}")))
            .bearer_auth(&token)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(AppError::Ils(format!(
                "hold listing failed: {}",
                response.status()
            )));
        }
        let holds: HoldsResponse = response.json().await?;
        Ok(holds.entries)
    }

    async fn delete_all_holds(&self, account_id: i64) -> AppResult<()> {
        let token = self.access_token().await?;
        let response = self
            .http
            .delete(self.url(&format!("/patrons/{account_id}/holds")))
            .bearer_auth(&token)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(AppError::Ils(format!(
                "hold cleanup failed: {}",
                response.status()
            )));
        }
        Ok(())
    }
}
