use crate::error::RepoError;
use crate::models::{Store, UnifiedDownloadSource};
use crate::repository::StoreHub;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadChoice {
    /// Exactly one source: start right away.
    Start(UnifiedDownloadSource),
    /// Several sources, official ones first: the caller picks.
    Choose(Vec<UnifiedDownloadSource>),
}

/// Hands a URL to whatever performs the actual download.
pub trait DownloadStarter: Send + Sync {
    fn start(&self, source: &UnifiedDownloadSource);
}

pub fn resolve_sources(mut sources: Vec<UnifiedDownloadSource>) -> Result<DownloadChoice, RepoError> {
    sources.retain(|s| !s.url.trim().is_empty());
    match sources.len() {
        0 => Err(RepoError::NoDownloadSource),
        1 => Ok(DownloadChoice::Start(sources.remove(0))),
        _ => {
            // Stable: keeps the store's order within each group
            sources.sort_by_key(|s| !s.is_official);
            Ok(DownloadChoice::Choose(sources))
        }
    }
}

/// Fetches sources and, when there is only one, starts it without asking.
pub async fn request_download(
    hub: &StoreHub,
    store: Store,
    id: &str,
    version_id: &str,
    starter: &dyn DownloadStarter,
) -> Result<DownloadChoice, RepoError> {
    let sources = hub.get_download_sources(store, id, version_id).await?;
    let choice = resolve_sources(sources)?;
    if let DownloadChoice::Start(source) = &choice {
        log::info!("Starting download of {}/{} from {}", store, id, source.url);
        starter.start(source);
    }
    Ok(choice)
}
