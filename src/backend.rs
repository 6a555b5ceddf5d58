//! Pieces every store client shares: the `{code, msg, data}` envelope, the
//! paged body, and a thin client core that attaches credentials and unwraps
//! the envelope according to the store's own success code.
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;

use crate::credentials::{CredentialProvider, CredentialStyle};
use crate::error::RepoError;
use crate::executor::RequestExecutor;
use crate::http::{join_url, ApiRequest};
use crate::models::{Page, Store};

#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub code: i64,
    #[serde(default)]
    pub msg: Option<String>,
    pub data: Option<T>,
    #[serde(default)]
    pub timestamp: Option<i64>,
}

impl<T> Envelope<T> {
    /// Splits the envelope by the store's success code. `data` may legitimately be
    /// null on success (mutations), so it stays optional here.
    pub fn into_data(self, store: Store, success_code: i64) -> Result<Option<T>, RepoError> {
        if self.code == success_code {
            Ok(self.data)
        } else {
            Err(RepoError::Business {
                store,
                code: self.code,
                msg: self.msg.unwrap_or_default(),
            })
        }
    }
}

fn default_page_count() -> i64 {
    1
}

#[derive(Debug, Deserialize)]
pub struct PagedData<T> {
    #[serde(default = "Vec::new")]
    pub list: Vec<T>,
    #[serde(default = "default_page_count")]
    pub pagecount: i64,
    #[serde(default)]
    pub current_number: i64,
}

impl<T> From<PagedData<T>> for Page<T> {
    fn from(data: PagedData<T>) -> Self {
        Page::new(data.list, data.pagecount)
    }
}

/// Fixed facts about a store's wire convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackendProfile {
    pub store: Store,
    pub success_code: i64,
    pub credential: CredentialStyle,
}

pub struct BackendClient {
    profile: BackendProfile,
    base_url: String,
    executor: Arc<RequestExecutor>,
    credentials: Arc<dyn CredentialProvider>,
}

impl BackendClient {
    pub fn new(
        profile: BackendProfile,
        base_url: impl Into<String>,
        executor: Arc<RequestExecutor>,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Self {
        Self {
            profile,
            base_url: base_url.into(),
            executor,
            credentials,
        }
    }

    pub fn store(&self) -> Store {
        self.profile.store
    }

    pub fn url(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }

    async fn attach_credential(&self, mut request: ApiRequest) -> ApiRequest {
        let token = self.credentials.token(self.profile.store).await;
        self.profile.credential.attach(&mut request, token.as_deref());
        request
    }

    /// Executes and unwraps the envelope; `data` is optional. A failure is judged
    /// by its code alone, and `data` is typed only on success.
    pub async fn call<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<Option<T>, RepoError> {
        let request = self.attach_credential(request).await;
        let envelope: Envelope<serde_json::Value> = self.executor.execute(&request).await?;
        match envelope.into_data(self.profile.store, self.profile.success_code)? {
            Some(data) => serde_json::from_value(data).map(Some).map_err(|e| {
                log::warn!("Parse error for {}: {}", request.url, e);
                RepoError::Parse(e.to_string())
            }),
            None => Ok(None),
        }
    }

    /// Like [`call`](Self::call) but a success without `data` is a contract break.
    pub async fn fetch<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, RepoError> {
        let url = request.url.clone();
        self.call(request)
            .await?
            .ok_or_else(|| RepoError::Parse(format!("missing data in response from {}", url)))
    }

    pub async fn fetch_page<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<Page<T>, RepoError> {
        let data: PagedData<T> = self.fetch(request).await?;
        Ok(data.into())
    }

    /// For mutations: only the envelope code matters.
    pub async fn send(&self, request: ApiRequest) -> Result<(), RepoError> {
        self.call::<serde_json::Value>(request).await.map(|_| ())
    }
}
