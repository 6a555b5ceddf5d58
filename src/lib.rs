pub mod backend;
pub mod community_api;
pub mod config;
pub mod credentials;
pub mod download;
pub mod error;
pub mod executor;
pub mod http;
pub mod mapper;
pub mod models;
pub mod open_api;
pub mod pagination;
pub mod repository;
pub mod shop_api;
pub mod utils;

#[cfg(test)]
mod mocks;

pub use config::AppConfig;
pub use credentials::{CredentialProvider, MemoryCredentials};
pub use download::{request_download, DownloadChoice, DownloadStarter};
pub use error::{ErrorKind, RepoError};
pub use models::{
    Page, Store, UnifiedAppDetail, UnifiedAppItem, UnifiedCategory, UnifiedComment,
    UnifiedDownloadSource, VirtualCategory,
};
pub use pagination::{AttachParams, ListController, ListOptions, PaginationState, ScreenMode};
pub use repository::{AppRepository, StoreHub};
