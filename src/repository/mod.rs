//! Store-agnostic capability interface and the hub that routes each call to
//! the repository of an explicitly named store.
pub mod community;
pub mod open;
pub mod shop;

use moka::future::Cache;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::backend::BackendClient;
use crate::community_api::{self, CommunityApi};
use crate::config::AppConfig;
use crate::credentials::CredentialProvider;
use crate::error::RepoError;
use crate::executor::RequestExecutor;
use crate::http::{HttpTransport, ReqwestTransport};
use crate::models::{
    CommentDraft, Page, ReleaseDraft, ReleaseReceipt, Store, UnifiedAppDetail, UnifiedAppItem,
    UnifiedCategory, UnifiedComment, UnifiedDownloadSource,
};
use crate::open_api::{self, OpenApi};
use crate::shop_api::{self, ShopApi};

pub use community::CommunityRepository;
pub use open::OpenRepository;
pub use shop::ShopRepository;

/// Everything a screen can ask of a store. Operations a store lacks keep the
/// default body and fail with [`RepoError::Unsupported`] before any I/O.
#[async_trait::async_trait]
pub trait AppRepository: Send + Sync {
    fn store(&self) -> Store;

    async fn get_categories(&self) -> Result<Vec<UnifiedCategory>, RepoError>;

    /// `category_id` may be a virtual sentinel (`-3`, `-4`, `-5`).
    async fn list_apps(
        &self,
        category_id: &str,
        page: u32,
        user_id: Option<&str>,
    ) -> Result<Page<UnifiedAppItem>, RepoError>;

    async fn search_apps(
        &self,
        query: &str,
        page: u32,
        user_id: Option<&str>,
    ) -> Result<Page<UnifiedAppItem>, RepoError>;

    async fn get_app_detail(&self, id: &str, version_id: &str) -> Result<UnifiedAppDetail, RepoError>;

    async fn get_download_sources(
        &self,
        id: &str,
        version_id: &str,
    ) -> Result<Vec<UnifiedDownloadSource>, RepoError>;

    async fn get_comments(
        &self,
        _id: &str,
        _version_id: &str,
        _page: u32,
    ) -> Result<Page<UnifiedComment>, RepoError> {
        Err(RepoError::unsupported(self.store(), "comments"))
    }

    async fn post_comment(&self, _draft: &CommentDraft) -> Result<(), RepoError> {
        Err(RepoError::unsupported(self.store(), "posting comments"))
    }

    async fn delete_comment(&self, _id: &str) -> Result<(), RepoError> {
        Err(RepoError::unsupported(self.store(), "deleting comments"))
    }

    async fn get_reviews(&self, _page: u32) -> Result<Page<UnifiedComment>, RepoError> {
        Err(RepoError::unsupported(self.store(), "my reviews"))
    }

    async fn delete_review(&self, _id: &str) -> Result<(), RepoError> {
        Err(RepoError::unsupported(self.store(), "deleting reviews"))
    }

    async fn delete_app(&self, _id: &str, _version_id: &str) -> Result<(), RepoError> {
        Err(RepoError::unsupported(self.store(), "deleting apps"))
    }

    async fn release_app(&self, _draft: &ReleaseDraft) -> Result<ReleaseReceipt, RepoError> {
        Err(RepoError::unsupported(self.store(), "releasing apps"))
    }
}

fn check_page(page: u32) -> Result<(), RepoError> {
    if page == 0 {
        Err(RepoError::InvalidArgument("pages start at 1".to_string()))
    } else {
        Ok(())
    }
}

/// One repository per store, chosen by the caller's `Store` argument.
pub struct StoreHub {
    repos: HashMap<Store, Arc<dyn AppRepository>>,
    category_cache: Cache<Store, Arc<Vec<UnifiedCategory>>>,
}

impl Default for StoreHub {
    fn default() -> Self {
        Self::new()
    }
}

impl StoreHub {
    pub fn new() -> Self {
        Self {
            repos: HashMap::new(),
            // Categories change rarely; keep them for an hour in memory only
            category_cache: Cache::builder()
                .time_to_live(Duration::from_secs(3600))
                .build(),
        }
    }

    pub fn with_repository(mut self, repo: Arc<dyn AppRepository>) -> Self {
        self.repos.insert(repo.store(), repo);
        self
    }

    /// Wires the real HTTP stack for every enabled store in `config`.
    pub fn from_config(config: &AppConfig, credentials: Arc<dyn CredentialProvider>) -> Self {
        let transport: Arc<dyn HttpTransport> = Arc::new(ReqwestTransport::new(
            &config.user_agent,
            Duration::from_secs(config.timeout_secs),
        ));
        Self::with_transport(config, transport, credentials)
    }

    pub fn with_transport(
        config: &AppConfig,
        transport: Arc<dyn HttpTransport>,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Self {
        let executor = Arc::new(RequestExecutor::new(transport, config.retry.policy()));
        let mut hub = Self::new();
        for backend in config.backends.iter().filter(|b| b.enabled) {
            let repo: Arc<dyn AppRepository> = match backend.store {
                Store::Community => Arc::new(CommunityRepository::new(CommunityApi::new(
                    BackendClient::new(
                        community_api::PROFILE,
                        backend.base_url.clone(),
                        executor.clone(),
                        credentials.clone(),
                    ),
                ))),
                Store::Shop => Arc::new(ShopRepository::new(ShopApi::new(BackendClient::new(
                    shop_api::PROFILE,
                    backend.base_url.clone(),
                    executor.clone(),
                    credentials.clone(),
                )))),
                Store::Open => Arc::new(OpenRepository::new(OpenApi::new(BackendClient::new(
                    open_api::PROFILE,
                    backend.base_url.clone(),
                    executor.clone(),
                    credentials.clone(),
                )))),
            };
            log::debug!("Registered store {} at {}", backend.store, backend.base_url);
            hub = hub.with_repository(repo);
        }
        hub
    }

    pub fn stores(&self) -> Vec<Store> {
        Store::ALL
            .into_iter()
            .filter(|s| self.repos.contains_key(s))
            .collect()
    }

    pub fn repository(&self, store: Store) -> Result<&Arc<dyn AppRepository>, RepoError> {
        self.repos
            .get(&store)
            .ok_or_else(|| RepoError::unsupported(store, "any operation (store not configured)"))
    }

    pub async fn get_categories(&self, store: Store) -> Result<Arc<Vec<UnifiedCategory>>, RepoError> {
        let repo = self.repository(store)?;
        if let Some(cached) = self.category_cache.get(&store).await {
            return Ok(cached);
        }
        let categories = Arc::new(repo.get_categories().await?);
        self.category_cache.insert(store, categories.clone()).await;
        Ok(categories)
    }

    pub fn invalidate_categories(&self) {
        self.category_cache.invalidate_all();
    }

    pub async fn list_apps(
        &self,
        store: Store,
        category_id: &str,
        page: u32,
        user_id: Option<&str>,
    ) -> Result<Page<UnifiedAppItem>, RepoError> {
        check_page(page)?;
        self.repository(store)?
            .list_apps(category_id, page, user_id)
            .await
    }

    pub async fn search_apps(
        &self,
        store: Store,
        query: &str,
        page: u32,
        user_id: Option<&str>,
    ) -> Result<Page<UnifiedAppItem>, RepoError> {
        check_page(page)?;
        let query = query.trim();
        if query.is_empty() {
            return Err(RepoError::InvalidArgument("search query is empty".to_string()));
        }
        self.repository(store)?
            .search_apps(query, page, user_id)
            .await
    }

    /// Runs the same search on every registered store at once. Each store's
    /// outcome is reported on its own; one failure never hides another store's results.
    pub async fn search_everywhere(
        &self,
        query: &str,
        page: u32,
    ) -> Vec<(Store, Result<Page<UnifiedAppItem>, RepoError>)> {
        let searches = self.stores().into_iter().map(|store| async move {
            (store, self.search_apps(store, query, page, None).await)
        });
        futures::future::join_all(searches).await
    }

    pub async fn get_app_detail(
        &self,
        store: Store,
        id: &str,
        version_id: &str,
    ) -> Result<UnifiedAppDetail, RepoError> {
        self.repository(store)?.get_app_detail(id, version_id).await
    }

    pub async fn get_comments(
        &self,
        store: Store,
        id: &str,
        version_id: &str,
        page: u32,
    ) -> Result<Page<UnifiedComment>, RepoError> {
        check_page(page)?;
        self.repository(store)?
            .get_comments(id, version_id, page)
            .await
    }

    pub async fn post_comment(&self, store: Store, draft: &CommentDraft) -> Result<(), RepoError> {
        if draft.content.trim().is_empty() {
            return Err(RepoError::InvalidArgument("comment is empty".to_string()));
        }
        self.repository(store)?.post_comment(draft).await
    }

    pub async fn delete_comment(&self, store: Store, id: &str) -> Result<(), RepoError> {
        self.repository(store)?.delete_comment(id).await
    }

    pub async fn get_reviews(&self, store: Store, page: u32) -> Result<Page<UnifiedComment>, RepoError> {
        check_page(page)?;
        self.repository(store)?.get_reviews(page).await
    }

    pub async fn delete_review(&self, store: Store, id: &str) -> Result<(), RepoError> {
        self.repository(store)?.delete_review(id).await
    }

    pub async fn get_download_sources(
        &self,
        store: Store,
        id: &str,
        version_id: &str,
    ) -> Result<Vec<UnifiedDownloadSource>, RepoError> {
        self.repository(store)?
            .get_download_sources(id, version_id)
            .await
    }

    pub async fn delete_app(&self, store: Store, id: &str, version_id: &str) -> Result<(), RepoError> {
        self.repository(store)?.delete_app(id, version_id).await
    }

    pub async fn release_app(&self, store: Store, draft: &ReleaseDraft) -> Result<ReleaseReceipt, RepoError> {
        self.repository(store)?.release_app(draft).await
    }
}
