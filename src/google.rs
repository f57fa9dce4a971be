//! Google Sheets backed [`SheetStore`].
//!
//! Authenticates as a service account (JWT bearer grant) and talks to the
//! Sheets API v4 values endpoints. The access token and the worksheet title
//! are fetched on first use and cached for the life of the client.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tokio::sync::Mutex;

use crate::config;
use crate::sheets::{SheetError, SheetStore};

/// Service-account key as found in `service_account.json` or the secrets
/// bundle; unknown fields are ignored
#[derive(Clone, Debug, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub token_uri: Option<String>,
}

/// Load the service-account key
///
/// The secrets bundle wins when it exists and carries a
/// `[gcp_service_account]` table; otherwise the local key file is used.
pub fn load_credentials(
    secrets_path: impl AsRef<Path>,
    key_path: impl AsRef<Path>,
) -> Result<ServiceAccountKey, SheetError> {
    let secrets_path = secrets_path.as_ref();
    if secrets_path.exists() {
        let text = fs::read_to_string(secrets_path)?;
        let secrets: toml::Table =
            toml::from_str(&text).map_err(|e| SheetError::InvalidCredentials(e.to_string()))?;
        if let Some(section) = secrets.get(config::SECRETS_KEY) {
            debug!("Using service account from {}", secrets_path.display());
            return section
                .clone()
                .try_into()
                .map_err(|e: toml::de::Error| SheetError::InvalidCredentials(e.to_string()));
        }
    }

    let key_path = key_path.as_ref();
    if !key_path.exists() {
        return Err(SheetError::MissingCredentials);
    }
    debug!("Using service account from {}", key_path.display());
    let text = fs::read_to_string(key_path)?;
    serde_json::from_str(&text).map_err(|e| SheetError::InvalidCredentials(e.to_string()))
}

#[derive(Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: String,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetMeta>,
}

#[derive(Deserialize)]
struct SheetMeta {
    properties: SheetProperties,
}

#[derive(Deserialize)]
struct SheetProperties {
    title: String,
}

#[derive(Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

struct AccessToken {
    value: String,
    expires_at: DateTime<Utc>,
}

#[derive(Default)]
struct Cache {
    token: Option<AccessToken>,
    title: Option<String>,
}

pub struct GoogleSheetsClient {
    http: reqwest::Client,
    client_email: String,
    token_uri: String,
    signing_key: EncodingKey,
    api_base: String,
    spreadsheet_id: String,
    worksheet_index: usize,
    cache: Mutex<Cache>,
}

impl GoogleSheetsClient {
    /// Build the client for the fixed spreadsheet from the configured
    /// credential sources
    pub fn connect() -> Result<Self, SheetError> {
        let key = load_credentials(config::SECRETS_FILE, config::SERVICE_ACCOUNT_FILE)?;
        let client = GoogleSheetsClient::new(
            key,
            config::SHEETS_API_BASE,
            config::SHEET_ID,
            config::WORKSHEET_INDEX,
        )?;
        info!(
            "Sheets client ready for {} as {}",
            client.spreadsheet_id, client.client_email
        );
        Ok(client)
    }

    /// `api_base` is the spreadsheets collection URL, without a trailing slash
    pub fn new(
        key: ServiceAccountKey,
        api_base: &str,
        spreadsheet_id: &str,
        worksheet_index: usize,
    ) -> Result<Self, SheetError> {
        let signing_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .map_err(|e| SheetError::InvalidCredentials(e.to_string()))?;
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config::HTTP_TIMEOUT_SECS))
            .build()
            .map_err(|e| SheetError::Connection(e.to_string()))?;

        Ok(GoogleSheetsClient {
            http,
            client_email: key.client_email,
            token_uri: key
                .token_uri
                .unwrap_or_else(|| config::DEFAULT_TOKEN_URI.to_string()),
            signing_key,
            api_base: api_base.trim_end_matches('/').to_string(),
            spreadsheet_id: spreadsheet_id.to_string(),
            worksheet_index,
            cache: Mutex::new(Cache::default()),
        })
    }

    /// Valid access token, exchanging a fresh JWT assertion when needed
    async fn access_token(&self) -> Result<String, SheetError> {
        let mut cache = self.cache.lock().await;
        let now = Utc::now();
        if let Some(token) = &cache.token {
            if token.expires_at - Duration::seconds(config::TOKEN_REFRESH_MARGIN) > now {
                return Ok(token.value.clone());
            }
        }

        let claims = Claims {
            iss: &self.client_email,
            scope: config::SCOPES.join(" "),
            aud: &self.token_uri,
            iat: now.timestamp(),
            exp: now.timestamp() + config::TOKEN_LIFETIME,
        };
        let assertion = jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &self.signing_key)
            .map_err(|e| SheetError::Connection(e.to_string()))?;

        let response = self
            .http
            .post(&self.token_uri)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await
            .map_err(|e| SheetError::Connection(e.to_string()))?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SheetError::Connection(format!("{}: {}", status, body)));
        }
        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| SheetError::Connection(e.to_string()))?;
        debug!("Obtained access token valid for {}s", token.expires_in);

        cache.token = Some(AccessToken {
            value: token.access_token.clone(),
            expires_at: now + Duration::seconds(token.expires_in),
        });
        Ok(token.access_token)
    }

    /// Quoted A1 range covering the whole worksheet
    ///
    /// Failing to resolve the worksheet counts as a connection failure.
    async fn range(&self) -> Result<String, SheetError> {
        if let Some(title) = &self.cache.lock().await.title {
            return Ok(quote_title(title));
        }

        let token = self.access_token().await?;
        let url = format!(
            "{}/{}?fields=sheets.properties.title",
            self.api_base, self.spreadsheet_id
        );
        let meta: SpreadsheetMeta = self
            .fetch_meta(&url, &token)
            .await
            .map_err(|e| SheetError::Connection(e.to_string()))?;
        let title = meta
            .sheets
            .into_iter()
            .nth(self.worksheet_index)
            .map(|s| s.properties.title)
            .unwrap_or_else(|| config::WORKSHEET_NAME.to_string());

        info!("Using worksheet '{}'", title);
        let range = quote_title(&title);
        self.cache.lock().await.title = Some(title);
        Ok(range)
    }

    async fn fetch_meta(&self, url: &str, token: &str) -> Result<SpreadsheetMeta, SheetError> {
        let response = self.http.get(url).bearer_auth(token).send().await?;
        Ok(check(response).await?.json().await?)
    }

    fn values_url(&self, range: &str, suffix: &str) -> String {
        format!(
            "{}/{}/values/{}{}",
            self.api_base,
            self.spreadsheet_id,
            urlencoding::encode(range),
            suffix
        )
    }
}

impl SheetStore for GoogleSheetsClient {
    async fn fetch_values(&self) -> Result<Vec<Vec<String>>, SheetError> {
        let range = self.range().await?;
        let token = self.access_token().await?;
        let response = self
            .http
            .get(self.values_url(&range, ""))
            .bearer_auth(token)
            .send()
            .await?;
        let body: ValueRange = check(response).await?.json().await?;
        Ok(body.values)
    }

    async fn append_row(&self, row: Vec<String>) -> Result<(), SheetError> {
        let range = self.range().await?;
        let token = self.access_token().await?;
        let response = self
            .http
            .post(self.values_url(
                &range,
                ":append?valueInputOption=RAW&insertDataOption=INSERT_ROWS",
            ))
            .bearer_auth(token)
            .json(&serde_json::json!({ "values": [row] }))
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), SheetError> {
        let range = self.range().await?;
        let token = self.access_token().await?;
        let response = self
            .http
            .post(self.values_url(&range, ":clear"))
            .bearer_auth(token)
            .json(&serde_json::json!({}))
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    async fn write_values(&self, values: Vec<Vec<String>>) -> Result<(), SheetError> {
        let range = format!("{}!A1", self.range().await?);
        let token = self.access_token().await?;
        let response = self
            .http
            .put(self.values_url(&range, "?valueInputOption=RAW"))
            .bearer_auth(token)
            .json(&serde_json::json!({ "majorDimension": "ROWS", "values": values }))
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }
}

fn quote_title(title: &str) -> String {
    format!("'{}'", title.replace('\'', "''"))
}

async fn check(response: reqwest::Response) -> Result<reqwest::Response, SheetError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(SheetError::Api {
        status: status.as_u16(),
        body,
    })
}
