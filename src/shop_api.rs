use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::backend::{BackendClient, BackendProfile};
use crate::credentials::CredentialStyle;
use crate::error::RepoError;
use crate::http::ApiRequest;
use crate::models::{Page, Store};

pub const USER_AGENT_BASE: &str = "UniStore/0.1 (Shop; Rust)";

pub const PROFILE: BackendProfile = BackendProfile {
    store: Store::Shop,
    success_code: 0,
    credential: CredentialStyle::UserAgent {
        base: USER_AGENT_BASE,
    },
};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ShopCategory {
    pub cid: i64,
    #[serde(default)]
    pub cname: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ShopApp {
    pub app_id: i64,
    #[serde(default)]
    pub version_code: i64,
    #[serde(default)]
    pub app_name: String,
    pub app_icon: Option<String>,
    /// Bytes.
    pub app_size: Option<u64>,
    pub version_name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct ShopUser {
    #[serde(default)]
    pub user_id: i64,
    #[serde(default)]
    pub nickname: String,
    pub avatar: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ShopAppDetail {
    pub app_id: i64,
    #[serde(default)]
    pub version_code: i64,
    #[serde(default)]
    pub app_name: String,
    pub app_icon: Option<String>,
    pub app_size: Option<u64>,
    pub version_name: Option<String>,
    pub package_name: Option<String>,
    /// HTML.
    pub describe: Option<String>,
    /// Comma separated image URLs.
    pub screenshots: Option<String>,
    pub update_log: Option<String>,
    #[serde(default)]
    pub download_count: u64,
    #[serde(default)]
    pub review_count: u64,
    pub rating_average: Option<f64>,
    pub developer: Option<ShopUser>,
    pub min_sdk: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ShopReview {
    pub id: i64,
    #[serde(default)]
    pub content: String,
    pub rating: Option<u8>,
    /// `YYYY-MM-DD HH:MM:SS`, UTC.
    pub time: Option<String>,
    pub user: Option<ShopUser>,
    pub parent_id: Option<i64>,
    pub parent: Option<Box<ShopReview>>,
    pub app_id: Option<i64>,
    pub version_code: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ShopDownload {
    #[serde(default)]
    pub title: String,
    pub link: String,
    #[serde(default)]
    pub official: bool,
}

/// Commerce-style JSON client: GET for reads, JSON POST for writes.
pub struct ShopApi {
    client: BackendClient,
}

impl ShopApi {
    pub fn new(client: BackendClient) -> Self {
        Self { client }
    }

    pub async fn categories(&self) -> Result<Vec<ShopCategory>, RepoError> {
        let req = ApiRequest::get(self.client.url("category/list"));
        Ok(self.client.call(req).await?.unwrap_or_default())
    }

    pub async fn goods_list(&self, cid: &str, page: u32) -> Result<Page<ShopApp>, RepoError> {
        let req = ApiRequest::get(self.client.url("goods/list"))
            .query("cid", cid)
            .query("page", page);
        self.client.fetch_page(req).await
    }

    pub async fn search(&self, keyword: &str, page: u32) -> Result<Page<ShopApp>, RepoError> {
        let req = ApiRequest::get(self.client.url("goods/search"))
            .query("keyword", keyword)
            .query("page", page);
        self.client.fetch_page(req).await
    }

    pub async fn detail(&self, app_id: &str) -> Result<ShopAppDetail, RepoError> {
        let req = ApiRequest::get(self.client.url("goods/detail")).query("app_id", app_id);
        self.client.fetch(req).await
    }

    pub async fn downloads(&self, app_id: &str) -> Result<Vec<ShopDownload>, RepoError> {
        let req = ApiRequest::get(self.client.url("goods/download")).query("app_id", app_id);
        Ok(self.client.call(req).await?.unwrap_or_default())
    }

    pub async fn reviews(&self, app_id: &str, page: u32) -> Result<Page<ShopReview>, RepoError> {
        let req = ApiRequest::get(self.client.url("goods/reviews"))
            .query("app_id", app_id)
            .query("page", page);
        self.client.fetch_page(req).await
    }

    pub async fn post_review(
        &self,
        app_id: &str,
        content: &str,
        rating: Option<u8>,
        parent_id: i64,
    ) -> Result<(), RepoError> {
        let req = ApiRequest::post(self.client.url("goods/review")).json(json!({
            "app_id": app_id,
            "content": content,
            "rating": rating,
            "parent_id": parent_id,
        }));
        self.client.send(req).await
    }

    pub async fn delete_review(&self, id: &str) -> Result<(), RepoError> {
        let req = ApiRequest::post(self.client.url("goods/review/delete")).json(json!({ "id": id }));
        self.client.send(req).await
    }

    pub async fn my_reviews(&self, page: u32) -> Result<Page<ShopReview>, RepoError> {
        let req = ApiRequest::get(self.client.url("user/reviews")).query("page", page);
        self.client.fetch_page(req).await
    }
}
