use crate::community_api::{CommunityApi, ROOT_REPLY_ID};
use crate::error::RepoError;
use crate::mapper::community as map;
use crate::models::{
    CommentDraft, Page, ReleaseDraft, ReleaseReceipt, Store, UnifiedAppDetail, UnifiedAppItem,
    UnifiedCategory, UnifiedComment, UnifiedDownloadSource, VirtualCategory,
};

use super::AppRepository;

pub struct CommunityRepository {
    api: CommunityApi,
}

impl CommunityRepository {
    pub fn new(api: CommunityApi) -> Self {
        Self { api }
    }
}

fn parse_parent(parent_id: Option<&str>) -> Result<i64, RepoError> {
    match parent_id.map(str::trim).filter(|p| !p.is_empty()) {
        None => Ok(ROOT_REPLY_ID),
        Some(raw) => raw
            .parse::<i64>()
            .map_err(|_| RepoError::InvalidArgument(format!("invalid parent comment id '{}'", raw))),
    }
}

#[async_trait::async_trait]
impl AppRepository for CommunityRepository {
    fn store(&self) -> Store {
        Store::Community
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
        user_id: Option<&str>,
    ) -> Result<Page<UnifiedAppItem>, RepoError> {
        let raw = match VirtualCategory::from_id(category_id) {
            Some(kind) => self.api.user_list(kind, page, user_id).await?,
            None => self.api.app_list(category_id, page).await?,
        };
        Ok(raw.map(map::item))
    }

    async fn search_apps(
        &self,
        query: &str,
        page: u32,
        user_id: Option<&str>,
    ) -> Result<Page<UnifiedAppItem>, RepoError> {
        Ok(self.api.search(query, page, user_id).await?.map(map::item))
    }

    async fn get_app_detail(&self, id: &str, version_id: &str) -> Result<UnifiedAppDetail, RepoError> {
        Ok(map::detail(self.api.app_info(id, version_id).await?))
    }

    async fn get_download_sources(
        &self,
        id: &str,
        version_id: &str,
    ) -> Result<Vec<UnifiedDownloadSource>, RepoError> {
        Ok(self
            .api
            .downloads(id, version_id)
            .await?
            .into_iter()
            .map(map::download)
            .collect())
    }

    async fn get_comments(
        &self,
        id: &str,
        version_id: &str,
        page: u32,
    ) -> Result<Page<UnifiedComment>, RepoError> {
        Ok(self
            .api
            .comments(id, version_id, page)
            .await?
            .map(map::comment))
    }

    async fn post_comment(&self, draft: &CommentDraft) -> Result<(), RepoError> {
        let parent = parse_parent(draft.parent_id.as_deref())?;
        self.api
            .post_comment(&draft.app_id, &draft.version_id, &draft.content, parent)
            .await
    }

    async fn delete_comment(&self, id: &str) -> Result<(), RepoError> {
        self.api.delete_comment(id).await
    }

    async fn delete_app(&self, id: &str, version_id: &str) -> Result<(), RepoError> {
        self.api.delete_app(id, version_id).await
    }

    async fn release_app(&self, draft: &ReleaseDraft) -> Result<ReleaseReceipt, RepoError> {
        let result = self.api.release(draft).await?;
        Ok(ReleaseReceipt {
            store: Store::Community,
            app_id: result.as_ref().and_then(|r| r.app_id).map(|v| v.to_string()),
            version_id: result
                .as_ref()
                .and_then(|r| r.apps_version_id)
                .map(|v| v.to_string()),
            message: "Submitted for review".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parent_id_parsing() {
        assert_eq!(parse_parent(None).unwrap(), -1);
        assert_eq!(parse_parent(Some(" ")).unwrap(), -1);
        assert_eq!(parse_parent(Some("17")).unwrap(), 17);
        assert!(parse_parent(Some("abc")).is_err());
    }
}
