use crate::error::RepoError;
use crate::mapper::shop as map;
use crate::models::{
    CommentDraft, Page, Store, UnifiedAppDetail, UnifiedAppItem, UnifiedCategory, UnifiedComment,
    UnifiedDownloadSource, VirtualCategory,
};
use crate::shop_api::ShopApi;

use super::AppRepository;

pub struct ShopRepository {
    api: ShopApi,
}

impl ShopRepository {
    pub fn new(api: ShopApi) -> Self {
        Self { api }
    }
}

#[async_trait::async_trait]
impl AppRepository for ShopRepository {
    fn store(&self) -> Store {
        Store::Shop
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
            return Err(RepoError::unsupported(Store::Shop, "user-scoped listings"));
        }
        Ok(self.api.goods_list(category_id, page).await?.map(map::item))
    }

    async fn search_apps(
        &self,
        query: &str,
        page: u32,
        _user_id: Option<&str>,
    ) -> Result<Page<UnifiedAppItem>, RepoError> {
        Ok(self.api.search(query, page).await?.map(map::item))
    }

    async fn get_app_detail(&self, id: &str, _version_id: &str) -> Result<UnifiedAppDetail, RepoError> {
        Ok(map::detail(self.api.detail(id).await?))
    }

    async fn get_download_sources(
        &self,
        id: &str,
        _version_id: &str,
    ) -> Result<Vec<UnifiedDownloadSource>, RepoError> {
        Ok(self
            .api
            .downloads(id)
            .await?
            .into_iter()
            .map(map::download)
            .collect())
    }

    async fn get_comments(
        &self,
        id: &str,
        _version_id: &str,
        page: u32,
    ) -> Result<Page<UnifiedComment>, RepoError> {
        Ok(self.api.reviews(id, page).await?.map(map::review))
    }

    /// Top-level reviews need a 1..=5 rating; replies may omit it.
    async fn post_comment(&self, draft: &CommentDraft) -> Result<(), RepoError> {
        let parent = match draft.parent_id.as_deref().map(str::trim) {
            None | Some("") => -1,
            Some(raw) => raw.parse::<i64>().map_err(|_| {
                RepoError::InvalidArgument(format!("invalid parent review id '{}'", raw))
            })?,
        };
        if parent <= 0 && !matches!(draft.rating, Some(1..=5)) {
            return Err(RepoError::InvalidArgument(
                "a review needs a rating between 1 and 5".to_string(),
            ));
        }
        self.api
            .post_review(&draft.app_id, &draft.content, draft.rating, parent)
            .await
    }

    async fn delete_comment(&self, id: &str) -> Result<(), RepoError> {
        self.api.delete_review(id).await
    }

    async fn get_reviews(&self, page: u32) -> Result<Page<UnifiedComment>, RepoError> {
        Ok(self.api.my_reviews(page).await?.map(map::review))
    }

    async fn delete_review(&self, id: &str) -> Result<(), RepoError> {
        self.api.delete_review(id).await
    }
}
