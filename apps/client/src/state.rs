use std::sync::Arc;
use std::time::Duration;

use crate::backend::ServiceClient;
use crate::config::Config;
use crate::errors::ClientError;
use crate::jobs::fallback::FileFallback;
use crate::jobs::normalizer::{placeholder_from_setting, JobRecordNormalizer};
use crate::orchestrator::analysis::AnalysisOrchestrator;
use crate::orchestrator::search::SearchOrchestrator;
use crate::profile::store::ProfileStore;

/// Shared application state handed to every command.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub store: Arc<ProfileStore>,
    pub search_service: ServiceClient,
    pub analysis_service: ServiceClient,
    pub search: Arc<SearchOrchestrator>,
    pub analysis: Arc<AnalysisOrchestrator>,
}

impl AppState {
    pub fn build(config: Config) -> Result<Self, ClientError> {
        let timeout = Duration::from_secs(config.request_timeout_secs);
        let search_service = ServiceClient::new(&config.search_api_url, timeout)?;
        let analysis_service = ServiceClient::new(&config.analysis_api_url, timeout)?;

        let store = Arc::new(ProfileStore::new(config.profile_path.clone()));
        let normalizer = JobRecordNormalizer::new(placeholder_from_setting(config.match_placeholder))
            .with_search_link_base(config.job_board_url.clone());

        let search = Arc::new(SearchOrchestrator::new(
            Arc::new(search_service.clone()),
            Arc::new(FileFallback::new(config.fallback_dataset_path.clone())),
            normalizer.clone(),
        ));
        let analysis = Arc::new(AnalysisOrchestrator::new(
            Arc::new(analysis_service.clone()),
            store.clone(),
            normalizer,
        ));

        Ok(Self {
            config,
            store,
            search_service,
            analysis_service,
            search,
            analysis,
        })
    }
}
