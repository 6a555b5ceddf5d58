use serde::{Deserialize, Serialize};

use crate::community_api::CommunityAppDetail;
use crate::open_api::OpenAppDetail;
use crate::shop_api::ShopAppDetail;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Store {
    #[serde(rename = "community")]
    Community,
    #[serde(rename = "shop")]
    Shop,
    #[serde(rename = "open")]
    Open,
}

impl Store {
    pub const ALL: [Store; 3] = [Store::Community, Store::Shop, Store::Open];

    /// The only store with user-scoped listings (my uploads / favourites / history).
    pub const USER_RESOURCE_STORE: Store = Store::Community;

    pub fn key(&self) -> &'static str {
        match self {
            Store::Community => "community",
            Store::Shop => "shop",
            Store::Open => "open",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Store::Community => "Community",
            Store::Shop => "Shop",
            Store::Open => "Open Platform",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key.trim().to_lowercase().as_str() {
            "community" => Some(Store::Community),
            "shop" => Some(Store::Shop),
            "open" | "open-platform" => Some(Store::Open),
            _ => None,
        }
    }
}

impl std::fmt::Display for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Client-side filters that have no server-side category behind them.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VirtualCategory {
    MyUploads,
    MyFavourites,
    MyHistory,
}

impl VirtualCategory {
    pub fn sentinel_id(&self) -> &'static str {
        match self {
            VirtualCategory::MyUploads => "-3",
            VirtualCategory::MyFavourites => "-4",
            VirtualCategory::MyHistory => "-5",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        match id.trim() {
            "-3" => Some(VirtualCategory::MyUploads),
            "-4" => Some(VirtualCategory::MyFavourites),
            "-5" => Some(VirtualCategory::MyHistory),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            VirtualCategory::MyUploads => "My uploads",
            VirtualCategory::MyFavourites => "My favourites",
            VirtualCategory::MyHistory => "My history",
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UnifiedCategory {
    pub id: String,
    pub name: String,
}

impl UnifiedCategory {
    pub fn is_virtual(&self) -> bool {
        VirtualCategory::from_id(&self.id).is_some()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct UnifiedUserLite {
    pub id: String,
    pub name: String,
    pub avatar_url: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UnifiedAppItem {
    pub id: String,
    pub navigation_id: String,
    pub navigation_version_id: String,
    pub name: String,
    pub icon_url: String,
    pub size: Option<String>,
    pub store: Store,
    pub unique_id: String,
}

impl UnifiedAppItem {
    pub fn new(
        store: Store,
        id: impl Into<String>,
        version_id: impl Into<String>,
        name: impl Into<String>,
        icon_url: impl Into<String>,
        size: Option<String>,
    ) -> Self {
        let id = id.into();
        let version_id = version_id.into();
        Self {
            unique_id: unique_id(store, &id, &version_id),
            navigation_id: id.clone(),
            navigation_version_id: version_id,
            id,
            name: name.into(),
            icon_url: icon_url.into(),
            size,
            store,
        }
    }
}

/// Raw ids from different stores collide freely; the store key keeps them apart.
pub fn unique_id(store: Store, id: &str, version_id: &str) -> String {
    format!("{}-{}-{}", store.key(), id, version_id)
}

/// Store-specific detail payload kept for fields that have no unified shape.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub enum RawAppDetail {
    Community(CommunityAppDetail),
    Shop(ShopAppDetail),
    Open(OpenAppDetail),
}

impl RawAppDetail {
    pub fn store(&self) -> Store {
        match self {
            RawAppDetail::Community(_) => Store::Community,
            RawAppDetail::Shop(_) => Store::Shop,
            RawAppDetail::Open(_) => Store::Open,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct UnifiedAppDetail {
    pub item: UnifiedAppItem,
    pub description: String,
    pub previews: Vec<String>,
    pub update_log: Option<String>,
    pub download_count: u64,
    pub review_count: u64,
    pub uploader: UnifiedUserLite,
    pub raw: RawAppDetail,
}

impl UnifiedAppDetail {
    pub fn store(&self) -> Store {
        self.item.store
    }
}

/// Where a comment points back to. `Missing` is the degraded "app was deleted" state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParentApp {
    Available {
        app_id: String,
        version_id: Option<String>,
    },
    Missing,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct UnifiedComment {
    pub id: String,
    pub content: String,
    /// Unix seconds.
    pub send_time: i64,
    pub sender: UnifiedUserLite,
    /// One level only; a parent never carries its own parent.
    pub father_reply: Option<Box<UnifiedComment>>,
    pub app_id: Option<String>,
    pub version_id: Option<String>,
    pub rating: Option<u8>,
    pub store: Store,
}

impl UnifiedComment {
    pub fn parent_app(&self) -> ParentApp {
        match &self.app_id {
            Some(app_id) if !app_id.is_empty() => ParentApp::Available {
                app_id: app_id.clone(),
                version_id: self.version_id.clone(),
            },
            _ => ParentApp::Missing,
        }
    }

    pub fn is_review(&self) -> bool {
        self.rating.is_some()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UnifiedDownloadSource {
    pub name: String,
    pub url: String,
    pub is_official: bool,
}

/// One page of a paged listing.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_pages: u32,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total_pages: i64) -> Self {
        Self {
            items,
            total_pages: total_pages.clamp(1, u32::MAX as i64) as u32,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total_pages: self.total_pages,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CommentDraft {
    pub app_id: String,
    pub version_id: String,
    pub content: String,
    pub parent_id: Option<String>,
    pub rating: Option<u8>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ReleaseDraft {
    pub name: String,
    pub package_name: String,
    pub version_name: String,
    pub version_code: u64,
    pub description: String,
    pub update_log: Option<String>,
    pub category_id: String,
    pub icon: Attachment,
    pub screenshots: Vec<Attachment>,
    pub package: Attachment,
}

/// What a store reports back after accepting a release.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ReleaseReceipt {
    pub store: Store,
    pub app_id: Option<String>,
    pub version_id: Option<String>,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_id_separates_colliding_raw_ids() {
        let a = UnifiedAppItem::new(Store::Community, "42", "7", "A", "", None);
        let b = UnifiedAppItem::new(Store::Shop, "42", "7", "B", "", None);
        assert_ne!(a.unique_id, b.unique_id);
        assert_eq!(a.unique_id, "community-42-7");
    }

    #[test]
    fn virtual_category_sentinels() {
        assert_eq!(VirtualCategory::MyFavourites.sentinel_id(), "-4");
        assert_eq!(
            VirtualCategory::from_id("-5"),
            Some(VirtualCategory::MyHistory)
        );
        assert_eq!(VirtualCategory::from_id("12"), None);
    }

    #[test]
    fn page_total_is_never_below_one() {
        let page: Page<u8> = Page::new(vec![], 0);
        assert_eq!(page.total_pages, 1);
        let page: Page<u8> = Page::new(vec![], -3);
        assert_eq!(page.total_pages, 1);
    }

    #[test]
    fn comment_without_app_id_is_degraded() {
        let comment = UnifiedComment {
            id: "1".into(),
            content: "hi".into(),
            send_time: 0,
            sender: UnifiedUserLite::default(),
            father_reply: None,
            app_id: None,
            version_id: None,
            rating: None,
            store: Store::Community,
        };
        assert_eq!(comment.parent_app(), ParentApp::Missing);
    }
}
