//! Application State
//!
//! Shared state accessible by all API handlers.
//! The session sits behind an async mutex that is released while the
//! dataset is fetched, so passes may overlap; their tickets sort it out.

use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;

use crate::chart::CanvasSize;
use crate::dataset::Loader;
use crate::session::{ChartSession, PassOutcome, SceneSummary};

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// The chart page
    pub session: Arc<Mutex<ChartSession>>,
    /// Cached dataset loader
    pub loader: Arc<Loader>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
}

impl AppState {
    pub fn new(session: ChartSession, loader: Arc<Loader>) -> Self {
        Self {
            session: Arc::new(Mutex::new(session)),
            loader,
            start_time: Instant::now(),
        }
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Run one pipeline pass without holding the session across the fetch
    ///
    /// `size` applies a resize first; `reload` drops the cached dataset.
    pub async fn run_pass(
        &self,
        size: Option<CanvasSize>,
        reload: bool,
    ) -> (PassOutcome, SceneSummary) {
        let ticket = {
            let mut session = self.session.lock().await;
            if let Some(size) = size {
                session.set_size(size);
            }
            session.begin_pass()
        };

        if reload {
            self.loader.invalidate().await;
        }
        let result = self.loader.records().await;

        let mut session = self.session.lock().await;
        let outcome = session.complete_pass(ticket, result);
        (outcome, session.summary())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::dataset::fixtures::CountingSource;

    fn state(source: Arc<CountingSource>) -> AppState {
        AppState::new(
            ChartSession::from_config(&Config::default()),
            Arc::new(Loader::new(source)),
        )
    }

    #[tokio::test]
    async fn test_run_pass_resize_uses_cache() {
        let source = CountingSource::new();
        let state = state(source.clone());

        let (outcome, _) = state.run_pass(None, false).await;
        assert_eq!(outcome, PassOutcome::Rendered { markers: 5 });

        let (_, summary) = state
            .run_pass(Some(CanvasSize::new(640.0, 480.0)), false)
            .await;
        assert_eq!(summary.width, 640.0);
        assert_eq!(source.fetch_count(), 1);

        state.run_pass(None, true).await;
        assert_eq!(source.fetch_count(), 2);
    }

    #[tokio::test]
    async fn test_failed_resize_reports_rendered_size() {
        let source = CountingSource::new();
        let state = state(source.clone());
        let (_, before) = state.run_pass(None, false).await;

        source.set_failing(true);
        let (outcome, summary) = state
            .run_pass(Some(CanvasSize::new(400.0, 300.0)), true)
            .await;
        assert_eq!(outcome, PassOutcome::Failed);
        assert_eq!(summary.width, before.width);
        assert_eq!(summary.height, before.height);
        assert_eq!(summary.markers, 5);
    }

    #[tokio::test]
    async fn test_concurrent_passes_settle_on_one_chart() {
        let source = CountingSource::new();
        let state = state(source);

        let a = state.run_pass(Some(CanvasSize::new(700.0, 500.0)), false);
        let b = state.run_pass(Some(CanvasSize::new(900.0, 500.0)), false);
        let ((first, _), (second, _)) = tokio::join!(a, b);

        let rendered = [first, second]
            .iter()
            .filter(|o| matches!(o, PassOutcome::Rendered { .. }))
            .count();
        assert!(rendered >= 1);

        let summary = state.session.lock().await.summary();
        assert_eq!(summary.markers, 5);
        assert_eq!(summary.axis_groups, 2);
        assert_eq!(summary.legends, 1);
    }
}
