use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::backend::{BackendClient, BackendProfile};
use crate::credentials::CredentialStyle;
use crate::error::RepoError;
use crate::http::ApiRequest;
use crate::models::{Page, ReleaseDraft, Store};

pub const PROFILE: BackendProfile = BackendProfile {
    store: Store::Open,
    success_code: 200,
    credential: CredentialStyle::Bearer,
};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OpenCategory {
    pub id: i64,
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OpenApp {
    pub id: i64,
    #[serde(default)]
    pub latest_version_id: i64,
    #[serde(default)]
    pub name: String,
    pub icon_url: Option<String>,
    pub size: Option<u64>,
    pub version_name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct OpenUser {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub display_name: String,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OpenScreenshot {
    pub url: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OpenAppDetail {
    pub id: i64,
    #[serde(default)]
    pub version_id: i64,
    #[serde(default)]
    pub name: String,
    pub icon_url: Option<String>,
    pub size: Option<u64>,
    pub version_name: Option<String>,
    pub package_name: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub screenshots: Vec<OpenScreenshot>,
    pub changelog: Option<String>,
    #[serde(default)]
    pub downloads: u64,
    #[serde(default)]
    pub review_count: u64,
    pub owner: Option<OpenUser>,
    /// Moderation status, e.g. `published` or `pending`.
    pub status: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OpenFile {
    #[serde(default)]
    pub label: String,
    pub url: String,
    #[serde(default)]
    pub mirror: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OpenLoginResult {
    pub token: String,
    pub user: Option<OpenUser>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OpenPreUpload {
    pub upload_id: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OpenUploadResult {
    pub app_id: Option<i64>,
    pub version_id: Option<i64>,
}

/// Upload-oriented open platform client.
pub struct OpenApi {
    client: BackendClient,
}

impl OpenApi {
    pub fn new(client: BackendClient) -> Self {
        Self { client }
    }

    fn version_path(app_id: &str, version_id: &str) -> String {
        format!("apps/{}/versions/{}", app_id, version_id)
    }

    /// The caller stores the returned token; this crate never persists it.
    pub async fn login(&self, account: &str, password: &str) -> Result<OpenLoginResult, RepoError> {
        let req = ApiRequest::post(self.client.url("auth/login")).json(json!({
            "account": account,
            "password": password,
        }));
        self.client.fetch(req).await
    }

    pub async fn categories(&self) -> Result<Vec<OpenCategory>, RepoError> {
        let req = ApiRequest::get(self.client.url("categories"));
        Ok(self.client.call(req).await?.unwrap_or_default())
    }

    pub async fn apps(&self, category: &str, page: u32) -> Result<Page<OpenApp>, RepoError> {
        let req = ApiRequest::get(self.client.url("apps"))
            .query("category", category)
            .query("page", page);
        self.client.fetch_page(req).await
    }

    pub async fn search(&self, q: &str, page: u32) -> Result<Page<OpenApp>, RepoError> {
        let req = ApiRequest::get(self.client.url("apps/search"))
            .query("q", q)
            .query("page", page);
        self.client.fetch_page(req).await
    }

    pub async fn version(&self, app_id: &str, version_id: &str) -> Result<OpenAppDetail, RepoError> {
        let req = ApiRequest::get(self.client.url(&Self::version_path(app_id, version_id)));
        self.client.fetch(req).await
    }

    pub async fn files(&self, app_id: &str, version_id: &str) -> Result<Vec<OpenFile>, RepoError> {
        let path = format!("{}/files", Self::version_path(app_id, version_id));
        let req = ApiRequest::get(self.client.url(&path));
        Ok(self.client.call(req).await?.unwrap_or_default())
    }

    pub async fn delete_version(&self, app_id: &str, version_id: &str) -> Result<(), RepoError> {
        let req = ApiRequest::delete(self.client.url(&Self::version_path(app_id, version_id)));
        self.client.send(req).await
    }

    /// Two steps: JSON pre-upload reserves an upload id, then the files go up as multipart.
    pub async fn release(&self, draft: &ReleaseDraft) -> Result<Option<OpenUploadResult>, RepoError> {
        let pre = ApiRequest::post(self.client.url("apps/pre-upload")).json(json!({
            "name": draft.name,
            "package_name": draft.package_name,
            "version_name": draft.version_name,
            "version_code": draft.version_code,
            "size": draft.package.bytes.len(),
        }));
        let reserved: OpenPreUpload = self.client.fetch(pre).await?;
        log::info!(
            "Open platform reserved upload {} for {}",
            reserved.upload_id,
            draft.package_name
        );

        let mut upload = ApiRequest::post(self.client.url(&format!("apps/upload/{}", reserved.upload_id)))
            .text_part("description", &draft.description)
            .text_part("changelog", draft.update_log.as_deref().unwrap_or_default())
            .text_part("category", &draft.category_id)
            .file_part("icon", draft.icon.clone());
        for shot in &draft.screenshots {
            upload = upload.file_part("screenshots", shot.clone());
        }
        upload = upload.file_part("package", draft.package.clone());
        self.client.call(upload).await
    }
}
