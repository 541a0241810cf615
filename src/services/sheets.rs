//! Spreadsheet service adapter
//!
//! The cart pipeline only ever needs four operations against the document
//! service: create a spreadsheet with named tabs, file it in the shared
//! folder, append rows, and read a tab back. Everything else (formatting,
//! data validation) lives on the service side.

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::{
    config::SheetsConfig,
    error::{AppError, AppResult},
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SheetService: Send + Sync {
    /// Create a spreadsheet with the given tabs and return its sheet id
    async fn create_spreadsheet(&self, title: &str, tabs: &[String]) -> AppResult<String>;

    /// Move a spreadsheet into a drive folder
    async fn move_to_folder(&self, sheet_id: &str, folder_id: &str) -> AppResult<()>;

    /// Append rows to one tab
    async fn append_rows(&self, sheet_id: &str, tab: &str, rows: Vec<Vec<String>>) -> AppResult<()>;

    /// All rows of one tab, header included
    async fn read_rows(&self, sheet_id: &str, tab: &str) -> AppResult<Vec<Vec<String>>>;
}

/// Google Sheets REST implementation
#[derive(Clone)]
pub struct GoogleSheetsService {
    http: reqwest::Client,
    config: SheetsConfig,
}

impl GoogleSheetsService {
    pub fn new(config: SheetsConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.api_base.trim_end_matches('/'), path)
    }

    async fn check(response: reqwest::Response) -> AppResult<Value> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Sheets(format!("{status}: {body}")));
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl SheetService for GoogleSheetsService {
    async fn create_spreadsheet(&self, title: &str, tabs: &[String]) -> AppResult<String> {
        let sheets: Vec<Value> = tabs
            .iter()
            .map(|tab| json!({"properties": {"title": tab}}))
            .collect();
        let body = json!({
            "properties": {"title": title},
            "sheets": sheets,
        });
        let response = self
            .http
            .post(self.url("/v4/spreadsheets"))
            .bearer_auth(&self.config.access_token)
            .json(&body)
            .send()
            .await?;
        let value = Self::check(response).await?;
        value["spreadsheetId"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| AppError::Sheets("create response missing spreadsheetId".to_string()))
    }

    async fn move_to_folder(&self, sheet_id: &str, folder_id: &str) -> AppResult<()> {
        let response = self
            .http
            .patch(self.url(&format!(
                "/drive/v3/files/{sheet_id}?addParents={folder_id}"
            )))
            .bearer_auth(&self.config.access_token)
            .json(&json!({}))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn append_rows(
        &self,
        sheet_id: &str,
        tab: &str,
        rows: Vec<Vec<String>>,
    ) -> AppResult<()> {
        let body = json!({"values": rows});
        let response = self
            .http
            .post(self.url(&format!(
                "/v4/spreadsheets/{sheet_id}/values/{tab}:append?valueInputOption=USER_ENTERED"
            )))
            .bearer_auth(&self.config.access_token)
            .json(&body)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn read_rows(&self, sheet_id: &str, tab: &str) -> AppResult<Vec<Vec<String>>> {
        let response = self
            .http
            .get(self.url(&format!("/v4/spreadsheets/{sheet_id}/values/{tab}")))
            .bearer_auth(&self.config.access_token)
            .send()
            .await?;
        let value = Self::check(response).await?;
        let values = value["values"].as_array().cloned().unwrap_or_default();
        Ok(values
            .into_iter()
            .map(|row| {
                row.as_array()
                    .map(|cells| {
                        cells
                            .iter()
                            .map(|c| c.as_str().unwrap_or_default().to_string())
                            .collect()
                    })
                    .unwrap_or_default()
            })
            .collect())
    }
}
