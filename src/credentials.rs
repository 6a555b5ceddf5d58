use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::http::ApiRequest;
use crate::models::Store;

/// Read-only token lookup. Storage and encryption live outside this crate.
#[async_trait::async_trait]
pub trait CredentialProvider: Send + Sync {
    async fn token(&self, store: Store) -> Option<String>;
}

/// How a store expects its token to travel with a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialStyle {
    /// Form field, e.g. `usertoken=<token>`.
    FormField(&'static str),
    /// Token appended to the `User-Agent` value.
    UserAgent { base: &'static str },
    /// `Authorization: Bearer <token>`.
    Bearer,
}

impl CredentialStyle {
    /// Attaches the token if there is one. Anonymous requests go out unchanged,
    /// except that a `UserAgent` style always sets its base agent.
    pub fn attach(&self, request: &mut ApiRequest, token: Option<&str>) {
        let token = token.map(str::trim).filter(|t| !t.is_empty());
        match (self, token) {
            (CredentialStyle::FormField(field), Some(token)) => {
                request.push_form_field(field, token.to_string());
            }
            (CredentialStyle::UserAgent { base }, Some(token)) => {
                request.set_header("User-Agent", format!("{} Token/{}", base, token));
            }
            (CredentialStyle::UserAgent { base }, None) => {
                request.set_header("User-Agent", *base);
            }
            (CredentialStyle::Bearer, Some(token)) => {
                request.set_header("Authorization", format!("Bearer {}", token));
            }
            (_, None) => {}
        }
    }
}

/// In-memory token table, filled by whoever owns the real credential store.
#[derive(Clone, Default)]
pub struct MemoryCredentials {
    tokens: Arc<RwLock<HashMap<Store, String>>>,
}

impl MemoryCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set(&self, store: Store, token: impl Into<String>) {
        self.tokens.write().await.insert(store, token.into());
    }

    pub async fn clear(&self, store: Store) {
        self.tokens.write().await.remove(&store);
    }

    /// Seeds tokens from `UNISTORE_<STORE>_TOKEN` variables.
    pub async fn from_env() -> Self {
        let creds = Self::new();
        for store in Store::ALL {
            let var = format!("UNISTORE_{}_TOKEN", store.key().to_uppercase());
            if let Ok(token) = std::env::var(&var) {
                if !token.trim().is_empty() {
                    log::debug!("Using token for {} from {}", store, var);
                    creds.set(store, token).await;
                }
            }
        }
        creds
    }
}

#[async_trait::async_trait]
impl CredentialProvider for MemoryCredentials {
    async fn token(&self, store: Store) -> Option<String> {
        self.tokens.read().await.get(&store).cloned()
    }
}
