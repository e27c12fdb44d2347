//! Enable Banking client
//!
//! Signed REST client for the open-banking provider. Every call builds a
//! fresh RS256 bearer token (see `token`), performs one HTTP round trip and
//! decodes a typed JSON response. The client never retries; callers decide
//! what a failure means for the wider operation.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use rand::{distributions::Alphanumeric, Rng};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::credentials::{CredentialStore, APP_ID_KEY, PRIVATE_KEY_KEY};
use crate::error::{Error, Result};

pub mod token;
pub mod types;

pub use types::{
    AccountDetails, Institution, ProviderBalance, ProviderTransaction, Session, TransactionsPage,
};

/// Production API endpoint
pub const API_BASE_URL: &str = "https://api.enablebanking.com";

/// Access grant lifetime requested during authorization
const ACCESS_VALID_DAYS: i64 = 90;

/// Seam between the sync machinery and the provider, so tests can substitute
/// a scripted backend for the HTTP client
#[async_trait]
pub trait BankingProvider: Send + Sync {
    /// List institutions available in a country (ISO 3166 two-letter code)
    async fn list_institutions(&self, country: &str) -> Result<Vec<Institution>>;

    /// Begin the consent flow; returns the provider-hosted URL the user
    /// must visit in a browser
    async fn start_authorization(
        &self,
        institution: &str,
        country: &str,
        redirect_url: &str,
    ) -> Result<String>;

    /// Exchange an authorization code for a session over the granted accounts
    async fn create_session(&self, authorization_code: &str) -> Result<Session>;

    async fn get_account_details(&self, account_uid: &str) -> Result<AccountDetails>;

    async fn get_account_balances(&self, account_uid: &str) -> Result<Vec<ProviderBalance>>;

    /// One page of transactions; pass the previous page's continuation key
    /// to fetch the next
    async fn get_account_transactions(
        &self,
        account_uid: &str,
        continuation_key: Option<&str>,
    ) -> Result<TransactionsPage>;
}

/// HTTP client for the Enable Banking API
pub struct EnableBankingClient {
    http_client: Client,
    base_url: String,
    app_id: String,
    private_key_pem: String,
}

impl EnableBankingClient {
    /// Build a client from stored credentials
    ///
    /// Fails with `NotConfigured` when either the application id or the
    /// private key has not been saved yet.
    pub fn from_credentials(store: &CredentialStore) -> Result<Self> {
        let app_id = store.read(APP_ID_KEY).ok_or(Error::NotConfigured)?;
        let private_key_pem = store.read(PRIVATE_KEY_KEY).ok_or(Error::NotConfigured)?;
        Ok(Self::new(API_BASE_URL, &app_id, &private_key_pem))
    }

    pub fn new(base_url: &str, app_id: &str, private_key_pem: &str) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            app_id: app_id.to_string(),
            private_key_pem: private_key_pem.to_string(),
        }
    }

    /// Authenticated GET with typed response decoding
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        let token = token::bearer_token(&self.app_id, &self.private_key_pem)?;
        let response = self
            .http_client
            .get(format!("{}{}", self.base_url, path))
            .bearer_auth(token)
            .query(query)
            .send()
            .await?;
        Self::decode(response).await
    }

    /// Authenticated POST with typed response decoding
    async fn post_json<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let token = token::bearer_token(&self.app_id, &self.private_key_pem)?;
        let response = self
            .http_client
            .post(format!("{}{}", self.base_url, path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }
        response
            .json()
            .await
            .map_err(|e| Error::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl BankingProvider for EnableBankingClient {
    async fn list_institutions(&self, country: &str) -> Result<Vec<Institution>> {
        let response: types::InstitutionsResponse =
            self.get_json("/aspsps", &[("country", country)]).await?;
        debug!(
            "Listed {} institutions for {}",
            response.aspsps.len(),
            country
        );
        Ok(response.aspsps)
    }

    async fn start_authorization(
        &self,
        institution: &str,
        country: &str,
        redirect_url: &str,
    ) -> Result<String> {
        // Opaque state value echoed back through the redirect
        let state: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(32)
            .map(char::from)
            .collect();

        let request = types::StartAuthorizationRequest {
            access: types::AccessRequest {
                valid_until: (Utc::now() + Duration::days(ACCESS_VALID_DAYS)).to_rfc3339(),
                balances: true,
                transactions: true,
            },
            aspsp: types::AspspRef {
                name: institution.to_string(),
                country: country.to_string(),
            },
            state,
            redirect_url: redirect_url.to_string(),
            psu_type: "personal".to_string(),
        };

        let response: types::StartAuthorizationResponse =
            self.post_json("/auth", &request).await?;
        Ok(response.url)
    }

    async fn create_session(&self, authorization_code: &str) -> Result<Session> {
        let request = types::CreateSessionRequest {
            code: authorization_code.to_string(),
        };
        let session: Session = self.post_json("/sessions", &request).await?;
        if session.accounts.is_empty() {
            return Err(Error::NoAccounts);
        }
        debug!(
            "Created session {} with {} accounts",
            session.session_id,
            session.accounts.len()
        );
        Ok(session)
    }

    async fn get_account_details(&self, account_uid: &str) -> Result<AccountDetails> {
        self.get_json(&format!("/accounts/{}/details", account_uid), &[])
            .await
    }

    async fn get_account_balances(&self, account_uid: &str) -> Result<Vec<ProviderBalance>> {
        let response: types::BalancesResponse = self
            .get_json(&format!("/accounts/{}/balances", account_uid), &[])
            .await?;
        Ok(response.balances)
    }

    async fn get_account_transactions(
        &self,
        account_uid: &str,
        continuation_key: Option<&str>,
    ) -> Result<TransactionsPage> {
        let path = format!("/accounts/{}/transactions", account_uid);
        let query: Vec<(&str, &str)> = match continuation_key {
            Some(key) => vec![("continuation_key", key)],
            None => vec![],
        };
        self.get_json(&path, &query).await
    }
}
