//! List screen state: which store and filter is active, which page is loaded,
//! and whether a load is running.
//!
//! Transitions are pure functions on [`PaginationState`]. Every transition that
//! starts a load bumps `generation` and hands out a [`LoadTicket`]; a result is
//! applied only while its ticket still matches the current generation, so a
//! slow response for an old filter can never overwrite a newer list.
use std::sync::Arc;
use tokio::sync::watch;

use crate::config::AppConfig;
use crate::error::RepoError;
use crate::models::{Page, Store, UnifiedAppItem, UnifiedCategory, VirtualCategory};
use crate::repository::StoreHub;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScreenMode {
    Normal,
    MyUploads,
    MyFavourites,
    MyHistory,
}

impl ScreenMode {
    pub fn virtual_category(&self) -> Option<VirtualCategory> {
        match self {
            ScreenMode::Normal => None,
            ScreenMode::MyUploads => Some(VirtualCategory::MyUploads),
            ScreenMode::MyFavourites => Some(VirtualCategory::MyFavourites),
            ScreenMode::MyHistory => Some(VirtualCategory::MyHistory),
        }
    }
}

/// What a screen attaches with. Re-attaching with equal params is a no-op.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachParams {
    pub store: Store,
    pub mode: ScreenMode,
    pub user_id: Option<String>,
    /// A user's resource page: lists that user's uploads.
    pub my_resource: bool,
}

impl AttachParams {
    pub fn browse(store: Store) -> Self {
        Self {
            store,
            mode: ScreenMode::Normal,
            user_id: None,
            my_resource: false,
        }
    }

    pub fn virtual_mode(mode: ScreenMode) -> Self {
        Self {
            store: Store::USER_RESOURCE_STORE,
            mode,
            user_id: None,
            my_resource: false,
        }
    }

    /// Explicit modes win; a resource page in normal mode means uploads.
    pub fn virtual_category(&self) -> Option<VirtualCategory> {
        self.mode
            .virtual_category()
            .or(self.my_resource.then_some(VirtualCategory::MyUploads))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListMode {
    Browse,
    Search,
    Virtual(VirtualCategory),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPhase {
    Idle,
    Loading,
    Loaded,
    Failed,
}

/// Why a request was turned away without touching the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardReason {
    Unchanged,
    AlreadyLoading,
    OutOfRange,
    NoMorePages,
    NotNearEnd,
    AutoScrollOff,
    EmptyQuery,
    NotSearching,
    SearchActive,
    VirtualMode,
    NotReady,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied,
    Ignored(GuardReason),
    /// The result arrived after a newer load started and was dropped.
    Stale,
    /// The load failed; the message is what the screen should show.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListQuery {
    Category(String),
    Search(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    pub generation: u64,
    pub store: Store,
    pub query: ListQuery,
    pub page: u32,
    pub append: bool,
    pub user_id: Option<String>,
}

/// What the controller has to do after a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Done(LoadOutcome),
    Categories {
        generation: u64,
        store: Store,
        preselected: Option<String>,
    },
    Run(LoadTicket),
}

impl Step {
    fn ignored(reason: GuardReason) -> Self {
        log::debug!("List request ignored: {:?}", reason);
        Step::Done(LoadOutcome::Ignored(reason))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PaginationState {
    pub params: Option<AttachParams>,
    pub store: Store,
    pub mode: ListMode,
    pub categories: Vec<UnifiedCategory>,
    /// Selected category, or the sentinel id in a virtual mode. Kept during a
    /// search so cancelling it can return there.
    pub active_filter_id: Option<String>,
    pub search_query: Option<String>,
    pub user_id: Option<String>,
    pub items: Vec<UnifiedAppItem>,
    pub current_page: u32,
    pub total_pages: u32,
    pub phase: LoadPhase,
    pub error: Option<String>,
    pub initialized: bool,
    pub generation: u64,
}

impl Default for PaginationState {
    fn default() -> Self {
        Self {
            params: None,
            store: Store::Community,
            mode: ListMode::Browse,
            categories: Vec::new(),
            active_filter_id: None,
            search_query: None,
            user_id: None,
            items: Vec::new(),
            current_page: 1,
            total_pages: 1,
            phase: LoadPhase::Idle,
            error: None,
            initialized: false,
            generation: 0,
        }
    }
}

impl PaginationState {
    pub fn is_loading(&self) -> bool {
        self.phase == LoadPhase::Loading
    }

    pub fn has_more(&self) -> bool {
        self.current_page < self.total_pages
    }

    fn query(&self) -> Option<ListQuery> {
        match (&self.mode, &self.search_query, &self.active_filter_id) {
            (ListMode::Search, Some(q), _) => Some(ListQuery::Search(q.clone())),
            (ListMode::Search, None, _) => None,
            (_, _, Some(id)) => Some(ListQuery::Category(id.clone())),
            (_, _, None) => None,
        }
    }

    fn ticket(&self, query: ListQuery, page: u32, append: bool) -> LoadTicket {
        LoadTicket {
            generation: self.generation,
            store: self.store,
            query,
            page,
            append,
            user_id: self.user_id.clone(),
        }
    }

    /// Copy with a fresh generation, marked as loading.
    fn next_load(&self) -> Self {
        Self {
            generation: self.generation + 1,
            phase: LoadPhase::Loading,
            error: None,
            ..self.clone()
        }
    }

    pub fn begin_attach(
        &self,
        params: &AttachParams,
        preselected: Option<String>,
    ) -> (Option<Self>, Step) {
        let settled = self.initialized && self.phase != LoadPhase::Failed;
        if self.params.as_ref() == Some(params) && (settled || self.is_loading()) {
            return (None, Step::ignored(GuardReason::Unchanged));
        }

        let mut next = Self {
            params: Some(params.clone()),
            user_id: params.user_id.clone(),
            generation: self.generation + 1,
            phase: LoadPhase::Loading,
            ..Self::default()
        };
        match params.virtual_category() {
            Some(kind) => {
                // User-scoped lists live on one store only and need no categories
                next.store = Store::USER_RESOURCE_STORE;
                next.mode = ListMode::Virtual(kind);
                next.active_filter_id = Some(kind.sentinel_id().to_string());
                let ticket = next.ticket(ListQuery::Category(kind.sentinel_id().to_string()), 1, false);
                (Some(next), Step::Run(ticket))
            }
            None => {
                next.store = params.store;
                let step = Step::Categories {
                    generation: next.generation,
                    store: params.store,
                    preselected,
                };
                (Some(next), step)
            }
        }
    }

    pub fn apply_categories(
        &self,
        generation: u64,
        result: Result<Vec<UnifiedCategory>, RepoError>,
        preselected: Option<String>,
    ) -> (Option<Self>, Step) {
        if generation != self.generation {
            return (None, Step::Done(LoadOutcome::Stale));
        }
        let categories = match result {
            Ok(categories) => categories,
            Err(e) => return self.fail(e),
        };

        let mut next = self.clone();
        let filter = preselected
            .filter(|id| !id.trim().is_empty())
            .or_else(|| categories.first().map(|c| c.id.clone()));
        next.categories = categories;
        match filter {
            Some(id) => {
                next.active_filter_id = Some(id.clone());
                let ticket = next.ticket(ListQuery::Category(id), 1, false);
                (Some(next), Step::Run(ticket))
            }
            None => {
                // A store without categories has nothing to list
                next.phase = LoadPhase::Loaded;
                next.initialized = true;
                (Some(next), Step::Done(LoadOutcome::Applied))
            }
        }
    }

    pub fn select_category(&self, id: &str) -> (Option<Self>, Step) {
        match self.mode {
            ListMode::Search => return (None, Step::ignored(GuardReason::SearchActive)),
            ListMode::Virtual(_) => return (None, Step::ignored(GuardReason::VirtualMode)),
            ListMode::Browse => {}
        }
        if self.params.is_none() {
            return (None, Step::ignored(GuardReason::NotReady));
        }
        if VirtualCategory::from_id(id).is_some() {
            return (None, Step::ignored(GuardReason::VirtualMode));
        }
        if self.active_filter_id.as_deref() == Some(id) && self.phase == LoadPhase::Loaded {
            return (None, Step::ignored(GuardReason::Unchanged));
        }
        let mut next = self.next_load();
        next.active_filter_id = Some(id.to_string());
        next.current_page = 1;
        next.total_pages = 1;
        let ticket = next.ticket(ListQuery::Category(id.to_string()), 1, false);
        (Some(next), Step::Run(ticket))
    }

    pub fn search(&self, query: &str) -> (Option<Self>, Step) {
        let query = query.trim();
        if query.is_empty() {
            return (None, Step::ignored(GuardReason::EmptyQuery));
        }
        if self.params.is_none() {
            return (None, Step::ignored(GuardReason::NotReady));
        }
        if self.mode == ListMode::Search
            && self.search_query.as_deref() == Some(query)
            && self.phase == LoadPhase::Loaded
        {
            return (None, Step::ignored(GuardReason::Unchanged));
        }
        let mut next = self.next_load();
        next.mode = ListMode::Search;
        next.search_query = Some(query.to_string());
        next.items.clear();
        next.current_page = 1;
        next.total_pages = 1;
        let ticket = next.ticket(ListQuery::Search(query.to_string()), 1, false);
        (Some(next), Step::Run(ticket))
    }

    pub fn cancel_search(&self) -> (Option<Self>, Step) {
        if self.mode != ListMode::Search {
            return (None, Step::ignored(GuardReason::NotSearching));
        }
        let mut next = self.next_load();
        next.mode = match next.active_filter_id.as_deref().and_then(VirtualCategory::from_id) {
            Some(kind) => ListMode::Virtual(kind),
            None => ListMode::Browse,
        };
        next.search_query = None;
        next.items.clear();
        next.current_page = 1;
        next.total_pages = 1;
        match next.query() {
            Some(query) => {
                let ticket = next.ticket(query, 1, false);
                (Some(next), Step::Run(ticket))
            }
            None => {
                // The search overtook the first category load; fetch them again
                let step = Step::Categories {
                    generation: next.generation,
                    store: next.store,
                    preselected: None,
                };
                (Some(next), step)
            }
        }
    }

    /// `append` loads must ask for exactly the next page. Replacing loads may
    /// jump to any page the store reported.
    pub fn load_page(&self, page: u32, append: bool) -> (Option<Self>, Step) {
        if self.is_loading() {
            return (None, Step::ignored(GuardReason::AlreadyLoading));
        }
        let Some(query) = self.query() else {
            return (None, Step::ignored(GuardReason::NotReady));
        };
        let in_range = if append {
            page == self.current_page + 1 && page <= self.total_pages
        } else {
            (1..=self.total_pages).contains(&page)
        };
        if !in_range {
            return (None, Step::ignored(GuardReason::OutOfRange));
        }
        let next = self.next_load();
        let ticket = next.ticket(query, page, append);
        (Some(next), Step::Run(ticket))
    }

    pub fn refresh(&self) -> (Option<Self>, Step) {
        let Some(query) = self.query() else {
            return (None, Step::ignored(GuardReason::NotReady));
        };
        let next = self.next_load();
        let ticket = next.ticket(query, 1, false);
        (Some(next), Step::Run(ticket))
    }

    pub fn on_scroll(&self, last_visible_index: usize, prefetch_distance: usize) -> (Option<Self>, Step) {
        if self.is_loading() {
            return (None, Step::ignored(GuardReason::AlreadyLoading));
        }
        if !self.has_more() {
            return (None, Step::ignored(GuardReason::NoMorePages));
        }
        if last_visible_index.saturating_add(prefetch_distance) < self.items.len() {
            return (None, Step::ignored(GuardReason::NotNearEnd));
        }
        self.load_page(self.current_page + 1, true)
    }

    pub fn complete(
        &self,
        ticket: &LoadTicket,
        result: Result<Page<UnifiedAppItem>, RepoError>,
    ) -> (Option<Self>, Step) {
        if ticket.generation != self.generation {
            log::debug!(
                "Dropping stale page {} (generation {}, now {})",
                ticket.page,
                ticket.generation,
                self.generation
            );
            return (None, Step::Done(LoadOutcome::Stale));
        }
        let page = match result {
            Ok(page) => page,
            Err(e) => return self.fail(e),
        };

        let mut next = self.clone();
        if ticket.append {
            for item in page.items {
                if !next.items.iter().any(|i| i.unique_id == item.unique_id) {
                    next.items.push(item);
                }
            }
        } else {
            next.items = page.items;
        }
        next.current_page = ticket.page;
        next.total_pages = page.total_pages.max(1);
        next.phase = LoadPhase::Loaded;
        next.error = None;
        next.initialized = true;
        (Some(next), Step::Done(LoadOutcome::Applied))
    }

    /// Keeps whatever items were already shown.
    fn fail(&self, e: RepoError) -> (Option<Self>, Step) {
        let message = e.user_message();
        log::warn!("Loading {} list failed: {}", self.store, e);
        let mut next = self.clone();
        next.phase = LoadPhase::Failed;
        next.error = Some(message.clone());
        (Some(next), Step::Done(LoadOutcome::Failed(message)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListOptions {
    pub auto_scroll: bool,
    pub prefetch_distance: usize,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            auto_scroll: true,
            prefetch_distance: 5,
        }
    }
}

impl From<&AppConfig> for ListOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            auto_scroll: config.auto_scroll,
            prefetch_distance: config.prefetch_distance,
        }
    }
}

/// Drives [`PaginationState`] against a [`StoreHub`] and publishes every
/// new state on a watch channel.
pub struct ListController {
    hub: Arc<StoreHub>,
    options: ListOptions,
    state: watch::Sender<PaginationState>,
}

impl ListController {
    pub fn new(hub: Arc<StoreHub>, options: ListOptions) -> Self {
        let (state, _) = watch::channel(PaginationState::default());
        Self { hub, options, state }
    }

    pub fn subscribe(&self) -> watch::Receiver<PaginationState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> PaginationState {
        self.state.borrow().clone()
    }

    fn update(&self, transition: impl FnOnce(&PaginationState) -> (Option<PaginationState>, Step)) -> Step {
        let mut step = Step::Done(LoadOutcome::Ignored(GuardReason::Unchanged));
        self.state.send_if_modified(|state| {
            let (next, s) = transition(state);
            step = s;
            match next {
                Some(next) => {
                    *state = next;
                    true
                }
                None => false,
            }
        });
        step
    }

    async fn drive(&self, mut step: Step) -> LoadOutcome {
        loop {
            step = match step {
                Step::Done(outcome) => return outcome,
                Step::Categories {
                    generation,
                    store,
                    preselected,
                } => {
                    let result = self
                        .hub
                        .get_categories(store)
                        .await
                        .map(|c| c.as_ref().clone());
                    self.update(|s| s.apply_categories(generation, result, preselected))
                }
                Step::Run(ticket) => {
                    let result = self.fetch(&ticket).await;
                    self.update(|s| s.complete(&ticket, result))
                }
            };
        }
    }

    async fn fetch(&self, ticket: &LoadTicket) -> Result<Page<UnifiedAppItem>, RepoError> {
        let user_id = ticket.user_id.as_deref();
        match &ticket.query {
            ListQuery::Category(id) => self.hub.list_apps(ticket.store, id, ticket.page, user_id).await,
            ListQuery::Search(q) => self.hub.search_apps(ticket.store, q, ticket.page, user_id).await,
        }
    }

    /// Binds the list to a store and mode. Calling it again with the same
    /// params after the first load does nothing.
    pub async fn attach(&self, params: AttachParams, preselected_category: Option<String>) -> LoadOutcome {
        let step = self.update(|s| s.begin_attach(&params, preselected_category));
        if !matches!(step, Step::Done(_)) {
            log::info!("List attached to {} ({:?})", self.snapshot().store, params.mode);
        }
        self.drive(step).await
    }

    pub async fn select_category(&self, id: &str) -> LoadOutcome {
        let step = self.update(|s| s.select_category(id));
        self.drive(step).await
    }

    pub async fn search(&self, query: &str) -> LoadOutcome {
        let step = self.update(|s| s.search(query));
        self.drive(step).await
    }

    pub async fn cancel_search(&self) -> LoadOutcome {
        let step = self.update(|s| s.cancel_search());
        self.drive(step).await
    }

    pub async fn load_page(&self, page: u32, append: bool) -> LoadOutcome {
        let step = self.update(|s| s.load_page(page, append));
        self.drive(step).await
    }

    pub async fn refresh(&self) -> LoadOutcome {
        let step = self.update(|s| s.refresh());
        self.drive(step).await
    }

    pub async fn on_scroll(&self, last_visible_index: usize) -> LoadOutcome {
        if !self.options.auto_scroll {
            return LoadOutcome::Ignored(GuardReason::AutoScrollOff);
        }
        let distance = self.options.prefetch_distance;
        let step = self.update(|s| s.on_scroll(last_visible_index, distance));
        self.drive(step).await
    }
}
