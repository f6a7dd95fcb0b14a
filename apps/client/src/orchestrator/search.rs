//! Search Orchestrator: drives one internship search from query to result set.
//!
//! `Idle → Searching → {Success, SuccessWithFallback, Failed}`
//!
//! The live search service is tried first. Any failure there (transport,
//! non-2xx, malformed body) switches to the bundled offline dataset, filtered
//! client-side. Only when that also fails does the search end in `Failed`.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{info, warn};

use crate::backend::SearchBackend;
use crate::errors::ClientError;
use crate::jobs::fallback::{filter_listings, FallbackSource};
use crate::jobs::normalizer::JobRecordNormalizer;
use crate::models::job::JobRecord;
use crate::models::search::SearchQuery;
use crate::orchestrator::token::{Completion, RequestTokens};

pub const OFFLINE_ADVISORY: &str =
    "Using offline data - live internship search is unavailable right now.";

#[derive(Debug, Clone, PartialEq)]
pub enum SearchState {
    Idle,
    Searching {
        query: SearchQuery,
    },
    Success {
        query: SearchQuery,
        jobs: Vec<JobRecord>,
    },
    SuccessWithFallback {
        query: SearchQuery,
        jobs: Vec<JobRecord>,
        advisory: String,
    },
    Failed {
        query: SearchQuery,
        message: String,
    },
}

impl SearchState {
    /// Results to display. Empty while idle, searching, or failed.
    pub fn jobs(&self) -> &[JobRecord] {
        match self {
            SearchState::Success { jobs, .. } | SearchState::SuccessWithFallback { jobs, .. } => {
                jobs
            }
            _ => &[],
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, SearchState::Searching { .. })
    }
}

pub struct SearchOrchestrator {
    backend: Arc<dyn SearchBackend>,
    fallback: Arc<dyn FallbackSource>,
    normalizer: JobRecordNormalizer,
    state: watch::Sender<SearchState>,
    tokens: RequestTokens,
}

impl SearchOrchestrator {
    pub fn new(
        backend: Arc<dyn SearchBackend>,
        fallback: Arc<dyn FallbackSource>,
        normalizer: JobRecordNormalizer,
    ) -> Self {
        let (state, _) = watch::channel(SearchState::Idle);
        Self {
            backend,
            fallback,
            normalizer,
            state,
            tokens: RequestTokens::default(),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> SearchState {
        self.state.borrow().clone()
    }

    /// Runs a search. A blank keyword is rejected before any state change.
    ///
    /// If another search is started before this one resolves, this one's
    /// response is dropped and `Completion::Superseded` is returned.
    pub async fn search(&self, query: SearchQuery) -> Result<Completion<SearchState>, ClientError> {
        let keyword = query.keyword.trim();
        if keyword.is_empty() {
            return Err(ClientError::Validation(
                "Please enter a search keyword".to_string(),
            ));
        }
        let query = SearchQuery::new(keyword, query.location);

        let token = self.tokens.begin(
            &self.state,
            SearchState::Searching {
                query: query.clone(),
            },
        );
        info!(keyword = %query.keyword, location = %query.location, "search started");

        let outcome = self.run(query).await;
        let completion = self.tokens.settle(&self.state, token, outcome);
        if completion == Completion::Superseded {
            info!("Discarding response from a superseded search");
        }
        Ok(completion)
    }

    async fn run(&self, query: SearchQuery) -> SearchState {
        match self
            .backend
            .search_jobs(&query.keyword, query.location.as_str())
            .await
        {
            Ok(raw_jobs) => {
                let jobs = self.normalizer.normalize_all(&raw_jobs, &query.keyword);
                info!("Search returned {} jobs", jobs.len());
                SearchState::Success { query, jobs }
            }
            Err(e) => {
                warn!("Search service failed, falling back to offline data: {e}");
                self.run_offline(query).await
            }
        }
    }

    async fn run_offline(&self, query: SearchQuery) -> SearchState {
        match self.fallback.load().await {
            Ok(listings) => {
                let survivors = filter_listings(listings, &query);
                let jobs = self.normalizer.normalize_all(&survivors, &query.keyword);
                info!("Offline search matched {} jobs", jobs.len());
                SearchState::SuccessWithFallback {
                    query,
                    jobs,
                    advisory: OFFLINE_ADVISORY.to_string(),
                }
            }
            Err(e) => SearchState::Failed {
                query,
                message: e.user_message(),
            },
        }
    }
}
