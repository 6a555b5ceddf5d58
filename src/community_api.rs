use serde::{Deserialize, Serialize};

use crate::backend::{BackendClient, BackendProfile};
use crate::credentials::CredentialStyle;
use crate::error::RepoError;
use crate::http::ApiRequest;
use crate::models::{Page, ReleaseDraft, Store, VirtualCategory};

pub const PROFILE: BackendProfile = BackendProfile {
    store: Store::Community,
    success_code: 1,
    credential: CredentialStyle::FormField("usertoken"),
};

const PAGE_SIZE: u32 = 20;

/// Parent id the community API uses for top-level comments.
pub const ROOT_REPLY_ID: i64 = -1;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CommunityCategory {
    pub id: i64,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CommunityApp {
    pub id: i64,
    #[serde(default)]
    pub apps_version_id: i64,
    #[serde(default)]
    pub appname: String,
    pub app_icon: Option<String>,
    pub app_size: Option<String>,
    pub app_version: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct CommunityUser {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub username: String,
    pub usericon: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CommunityAppDetail {
    pub id: i64,
    #[serde(default)]
    pub apps_version_id: i64,
    #[serde(default)]
    pub appname: String,
    pub app_icon: Option<String>,
    pub app_size: Option<String>,
    pub app_version: Option<String>,
    pub app_explain: Option<String>,
    pub app_update: Option<String>,
    #[serde(default)]
    pub app_previews: Vec<String>,
    pub package_name: Option<String>,
    #[serde(default)]
    pub download_count: u64,
    #[serde(default)]
    pub comment_count: u64,
    pub user: Option<CommunityUser>,
    pub app_source: Option<String>,
    #[serde(default)]
    pub app_tags: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CommunityComment {
    pub id: i64,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub sendtime: i64,
    pub user: Option<CommunityUser>,
    pub father_replyid: Option<i64>,
    pub father_reply: Option<Box<CommunityComment>>,
    pub app_id: Option<i64>,
    pub apps_version_id: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CommunityDownload {
    #[serde(default)]
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub official: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CommunityReleaseResult {
    pub app_id: Option<i64>,
    pub apps_version_id: Option<i64>,
}

/// Form-encoded POST client for the community store.
pub struct CommunityApi {
    client: BackendClient,
}

impl CommunityApi {
    pub fn new(client: BackendClient) -> Self {
        Self { client }
    }

    fn endpoint(&self, path: &str) -> ApiRequest {
        ApiRequest::post(self.client.url(path))
    }

    pub async fn categories(&self) -> Result<Vec<CommunityCategory>, RepoError> {
        Ok(self
            .client
            .call(self.endpoint("category/list"))
            .await?
            .unwrap_or_default())
    }

    pub async fn app_list(&self, category_id: &str, page: u32) -> Result<Page<CommunityApp>, RepoError> {
        let req = self
            .endpoint("app/list")
            .form("category_id", category_id)
            .form("page", page)
            .form("limit", PAGE_SIZE);
        self.client.fetch_page(req).await
    }

    pub async fn search(
        &self,
        keyword: &str,
        page: u32,
        user_id: Option<&str>,
    ) -> Result<Page<CommunityApp>, RepoError> {
        let mut req = self
            .endpoint("app/search")
            .form("keyword", keyword)
            .form("page", page)
            .form("limit", PAGE_SIZE);
        if let Some(uid) = user_id {
            req = req.form("user_id", uid);
        }
        self.client.fetch_page(req).await
    }

    /// Listings behind the virtual categories; these never touch `app/list`.
    pub async fn user_list(
        &self,
        kind: VirtualCategory,
        page: u32,
        user_id: Option<&str>,
    ) -> Result<Page<CommunityApp>, RepoError> {
        let path = match kind {
            VirtualCategory::MyUploads => "user/uploads",
            VirtualCategory::MyFavourites => "user/favourites",
            VirtualCategory::MyHistory => "user/history",
        };
        let mut req = self
            .endpoint(path)
            .form("page", page)
            .form("limit", PAGE_SIZE);
        if let Some(uid) = user_id {
            req = req.form("user_id", uid);
        }
        self.client.fetch_page(req).await
    }

    pub async fn app_info(&self, app_id: &str, version_id: &str) -> Result<CommunityAppDetail, RepoError> {
        let req = self
            .endpoint("app/info")
            .form("app_id", app_id)
            .form("version_id", version_id);
        self.client.fetch(req).await
    }

    pub async fn downloads(&self, app_id: &str, version_id: &str) -> Result<Vec<CommunityDownload>, RepoError> {
        let req = self
            .endpoint("app/download")
            .form("app_id", app_id)
            .form("version_id", version_id);
        Ok(self.client.call(req).await?.unwrap_or_default())
    }

    pub async fn comments(
        &self,
        app_id: &str,
        version_id: &str,
        page: u32,
    ) -> Result<Page<CommunityComment>, RepoError> {
        let req = self
            .endpoint("comment/list")
            .form("app_id", app_id)
            .form("version_id", version_id)
            .form("page", page);
        self.client.fetch_page(req).await
    }

    pub async fn post_comment(
        &self,
        app_id: &str,
        version_id: &str,
        content: &str,
        father_reply_id: i64,
    ) -> Result<(), RepoError> {
        let req = self
            .endpoint("comment/post")
            .form("app_id", app_id)
            .form("version_id", version_id)
            .form("content", content)
            .form("father_reply_id", father_reply_id);
        self.client.send(req).await
    }

    pub async fn delete_comment(&self, comment_id: &str) -> Result<(), RepoError> {
        let req = self.endpoint("comment/delete").form("comment_id", comment_id);
        self.client.send(req).await
    }

    pub async fn delete_app(&self, app_id: &str, version_id: &str) -> Result<(), RepoError> {
        let req = self
            .endpoint("app/delete")
            .form("app_id", app_id)
            .form("version_id", version_id);
        self.client.send(req).await
    }

    /// Single multipart request carrying metadata, icon, screenshots and the package.
    pub async fn release(&self, draft: &ReleaseDraft) -> Result<Option<CommunityReleaseResult>, RepoError> {
        let mut req = self
            .endpoint("app/release")
            .text_part("appname", &draft.name)
            .text_part("package_name", &draft.package_name)
            .text_part("app_version", &draft.version_name)
            .text_part("version_code", draft.version_code)
            .text_part("app_explain", &draft.description)
            .text_part("category_id", &draft.category_id)
            .text_part("app_update", draft.update_log.as_deref().unwrap_or_default())
            .file_part("icon", draft.icon.clone());
        for shot in &draft.screenshots {
            req = req.file_part("screenshot[]", shot.clone());
        }
        req = req.file_part("apk", draft.package.clone());
        self.client.call(req).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comment_parses_nested_parent_and_missing_app() {
        let raw = r#"{
            "id": 9, "content": "reply", "sendtime": 1700000000,
            "user": {"id": 3, "username": "ann"},
            "father_replyid": 4,
            "father_reply": {"id": 4, "content": "root", "father_replyid": -1},
            "app_id": null
        }"#;
        let c: CommunityComment = serde_json::from_str(raw).unwrap();
        assert_eq!(c.father_reply.as_ref().map(|f| f.id), Some(4));
        assert_eq!(c.app_id, None);
    }

    #[test]
    fn detail_tolerates_sparse_payload() {
        let d: CommunityAppDetail = serde_json::from_str(r#"{"id": 1}"#).unwrap();
        assert!(d.app_previews.is_empty());
        assert_eq!(d.download_count, 0);
        assert!(d.user.is_none());
    }
}
