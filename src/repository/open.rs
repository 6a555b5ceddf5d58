use crate::error::RepoError;
use crate::mapper::open as map;
use crate::models::{
    Page, ReleaseDraft, ReleaseReceipt, Store, UnifiedAppDetail, UnifiedAppItem, UnifiedCategory,
    UnifiedDownloadSource, VirtualCategory,
};
use crate::open_api::OpenApi;

use super::AppRepository;

pub struct OpenRepository {
    api: OpenApi,
}

impl OpenRepository {
    pub fn new(api: OpenApi) -> Self {
        Self { api }
    }
}

#[async_trait::async_trait]
impl AppRepository for OpenRepository {
    fn store(&self) -> Store {
        Store::Open
    }

    async fn get_categories(&self) -> Result<Vec<UnifiedCategory>, RepoError> {
        Ok(self
            .api
            .categories()
            .await?
            .into_iter()
            .map(map::category)
            .collect())
    }

    async fn list_apps(
        &self,
        category_id: &str,
        page: u32,
        _user_id: Option<&str>,
    ) -> Result<Page<UnifiedAppItem>, RepoError> {
        if VirtualCategory::from_id(category_id).is_some() {
            return Err(RepoError::unsupported(Store::Open, "user-scoped listings"));
        }
        Ok(self.api.apps(category_id, page).await?.map(map::item))
    }

    async fn search_apps(
        &self,
        query: &str,
        page: u32,
        _user_id: Option<&str>,
    ) -> Result<Page<UnifiedAppItem>, RepoError> {
        Ok(self.api.search(query, page).await?.map(map::item))
    }

    async fn get_app_detail(&self, id: &str, version_id: &str) -> Result<UnifiedAppDetail, RepoError> {
        Ok(map::detail(self.api.version(id, version_id).await?))
    }

    async fn get_download_sources(
        &self,
        id: &str,
        version_id: &str,
    ) -> Result<Vec<UnifiedDownloadSource>, RepoError> {
        Ok(self
            .api
            .files(id, version_id)
            .await?
            .into_iter()
            .map(map::file)
            .collect())
    }

    async fn delete_app(&self, id: &str, version_id: &str) -> Result<(), RepoError> {
        self.api.delete_version(id, version_id).await
    }

    async fn release_app(&self, draft: &ReleaseDraft) -> Result<ReleaseReceipt, RepoError> {
        let result = self.api.release(draft).await?;
        Ok(ReleaseReceipt {
            store: Store::Open,
            app_id: result.as_ref().and_then(|r| r.app_id).map(|v| v.to_string()),
            version_id: result
                .as_ref()
                .and_then(|r| r.version_id)
                .map(|v| v.to_string()),
            message: "Uploaded".to_string(),
        })
    }
}
