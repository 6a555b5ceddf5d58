//! Test doubles: a scripted HTTP transport and an in-memory repository.
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

use crate::error::{RepoError, TransportError};
use crate::http::{ApiRequest, HttpResponse, HttpTransport};
use crate::models::{
    Page, Store, UnifiedAppDetail, UnifiedAppItem, UnifiedCategory, UnifiedDownloadSource,
};
use crate::repository::AppRepository;

#[derive(Clone, Debug)]
pub enum ScriptedReply {
    Body { status: u16, body: Vec<u8> },
    Status(u16),
    Fail(TransportError),
}

impl ScriptedReply {
    pub fn json(body: &str) -> Self {
        ScriptedReply::Body {
            status: 200,
            body: body.as_bytes().to_vec(),
        }
    }
}

/// Replies come from the queue first, then from path routes, then the fallback.
#[derive(Default)]
pub struct MockTransport {
    queue: Mutex<VecDeque<ScriptedReply>>,
    routes: Mutex<Vec<(String, ScriptedReply)>>,
    fallback: Mutex<Option<ScriptedReply>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, reply: ScriptedReply) {
        self.queue.lock().unwrap().push_back(reply);
    }

    /// Answers every request whose URL ends with `path`.
    pub fn route(&self, path: &str, reply: ScriptedReply) {
        self.routes.lock().unwrap().push((path.to_string(), reply));
    }

    pub fn fallback(&self, reply: ScriptedReply) {
        *self.fallback.lock().unwrap() = Some(reply);
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> ApiRequest {
        self.requests
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no request was sent")
    }
}

#[async_trait::async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: &ApiRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().unwrap().push(request.clone());
        let reply = self
            .queue
            .lock()
            .unwrap()
            .pop_front()
            .or_else(|| {
                self.routes
                    .lock()
                    .unwrap()
                    .iter()
                    .find(|(path, _)| request.url.ends_with(path.as_str()))
                    .map(|(_, reply)| reply.clone())
            })
            .or_else(|| self.fallback.lock().unwrap().clone())
            .unwrap_or(ScriptedReply::Status(404));
        match reply {
            ScriptedReply::Body { status, body } => Ok(HttpResponse { status, body }),
            ScriptedReply::Status(status) => Ok(HttpResponse {
                status,
                body: Vec::new(),
            }),
            ScriptedReply::Fail(e) => Err(e),
        }
    }
}

pub fn fake_item(store: Store, name: &str) -> UnifiedAppItem {
    UnifiedAppItem::new(store, name, "1", name, "", None)
}

pub fn names(items: &[UnifiedAppItem]) -> Vec<&str> {
    items.iter().map(|i| i.name.as_str()).collect()
}

type PageResult = Result<Page<UnifiedAppItem>, RepoError>;

/// Repository whose pages are set up front. Every call is recorded as
/// `categories`, `list:<category>:<page>` or `search:<query>:<page>`.
pub struct FakeRepository {
    store: Store,
    categories: Mutex<Result<Vec<UnifiedCategory>, RepoError>>,
    pages: Mutex<HashMap<String, PageResult>>,
    calls: Mutex<Vec<String>>,
    gates: Mutex<VecDeque<oneshot::Receiver<()>>>,
}

impl FakeRepository {
    pub fn new(store: Store) -> Self {
        Self {
            store,
            categories: Mutex::new(Ok(Vec::new())),
            pages: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            gates: Mutex::new(VecDeque::new()),
        }
    }

    pub fn with_categories(self, ids: &[(&str, &str)]) -> Self {
        *self.categories.lock().unwrap() = Ok(ids
            .iter()
            .map(|(id, name)| UnifiedCategory {
                id: id.to_string(),
                name: name.to_string(),
            })
            .collect());
        self
    }

    pub fn fail_categories(&self, err: RepoError) {
        *self.categories.lock().unwrap() = Err(err);
    }

    fn key(kind: &str, filter: &str, page: u32) -> String {
        format!("{}:{}:{}", kind, filter, page)
    }

    pub fn set_list(&self, category: &str, page: u32, items: &[&str], total_pages: i64) {
        let items = items.iter().map(|n| fake_item(self.store, n)).collect();
        self.pages.lock().unwrap().insert(
            Self::key("list", category, page),
            Ok(Page::new(items, total_pages)),
        );
    }

    pub fn set_search(&self, query: &str, page: u32, items: &[&str], total_pages: i64) {
        let items = items.iter().map(|n| fake_item(self.store, n)).collect();
        self.pages.lock().unwrap().insert(
            Self::key("search", query, page),
            Ok(Page::new(items, total_pages)),
        );
    }

    pub fn fail_list(&self, category: &str, page: u32, err: RepoError) {
        self.pages
            .lock()
            .unwrap()
            .insert(Self::key("list", category, page), Err(err));
    }

    /// The next list/search call waits until the returned sender fires.
    pub fn gate(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().push_back(rx);
        tx
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    async fn answer(&self, key: String) -> PageResult {
        self.calls.lock().unwrap().push(key.clone());
        let gate = self.gates.lock().unwrap().pop_front();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        self.pages
            .lock()
            .unwrap()
            .get(&key)
            .cloned()
            .unwrap_or_else(|| Ok(Page::new(Vec::new(), 1)))
    }
}

#[async_trait::async_trait]
impl AppRepository for FakeRepository {
    fn store(&self) -> Store {
        self.store
    }

    async fn get_categories(&self) -> Result<Vec<UnifiedCategory>, RepoError> {
        self.calls.lock().unwrap().push("categories".to_string());
        self.categories.lock().unwrap().clone()
    }

    async fn list_apps(
        &self,
        category_id: &str,
        page: u32,
        _user_id: Option<&str>,
    ) -> Result<Page<UnifiedAppItem>, RepoError> {
        self.answer(Self::key("list", category_id, page)).await
    }

    async fn search_apps(
        &self,
        query: &str,
        page: u32,
        _user_id: Option<&str>,
    ) -> Result<Page<UnifiedAppItem>, RepoError> {
        self.answer(Self::key("search", query, page)).await
    }

    async fn get_app_detail(&self, _id: &str, _version_id: &str) -> Result<UnifiedAppDetail, RepoError> {
        Err(RepoError::unsupported(self.store, "details"))
    }

    async fn get_download_sources(
        &self,
        _id: &str,
        _version_id: &str,
    ) -> Result<Vec<UnifiedDownloadSource>, RepoError> {
        Ok(Vec::new())
    }
}

pub fn hub_with(repos: Vec<Arc<FakeRepository>>) -> crate::repository::StoreHub {
    repos
        .into_iter()
        .fold(crate::repository::StoreHub::new(), |hub, repo| {
            hub.with_repository(repo)
        })
}

// Tests for the doubles themselves
#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn transport_prefers_queue_then_routes() {
        let t = MockTransport::new();
        t.route("app/list", ScriptedReply::Status(500));
        t.push(ScriptedReply::json("{}"));

        let first = t.send(&ApiRequest::get("https://x/app/list")).await.unwrap();
        let second = t.send(&ApiRequest::get("https://x/app/list")).await.unwrap();
        let third = t.send(&ApiRequest::get("https://x/other")).await.unwrap();

        assert_eq!(first.status, 200);
        assert_eq!(second.status, 500);
        assert_eq!(third.status, 404);
        assert_eq!(t.call_count(), 3);
    }

    #[tokio::test]
    async fn fake_repository_records_calls() {
        let repo = FakeRepository::new(Store::Shop);
        repo.set_list("7", 1, &["a"], 2);
        let page = repo.list_apps("7", 1, None).await.unwrap();
        assert_eq!(names(&page.items), vec!["a"]);
        assert_eq!(repo.calls(), vec!["list:7:1".to_string()]);
    }
}
