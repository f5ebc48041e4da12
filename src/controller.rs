//! Event-driven page controller.
//!
//! Owns the two pieces of persistent UI state (active insights tab,
//! selected date), routes named UI events to the backend calls they
//! trigger, and hands back rendered region updates for the host to apply.
//! Network calls are the only suspension points; hosts holding the
//! controller in an `Arc` may issue overlapping events, so each region
//! carries a monotonically increasing request ticket and responses that are
//! no longer the latest for their region are discarded instead of
//! clobbering newer content.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::client::{HttpMealApi, MealApi};
use crate::config::Config;
use crate::error::{INSIGHTS_FETCH_ERROR, RECOMMENDATIONS_FETCH_ERROR};
use crate::format;
use crate::model::RecommendationRequest;
use crate::render;

/// One of the three mutually exclusive insight views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Tab {
    #[default]
    History,
    Predictions,
    Stats,
}

/// Output region of the page. Recommendation results and recommendation
/// errors go to one region, insights content and insights errors to the
/// other; the two never clobber each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Region {
    Recommendations,
    Insights,
}

/// A rendered HTML fragment to swap into one output region.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionUpdate {
    pub region: Region,
    pub html: String,
}

/// UI events a host can feed to the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    /// The page finished loading; renders the default tab for today.
    PageLoaded,
    /// A tab selector was activated.
    TabSelected(Tab),
    /// The date field was edited. Takes effect on the next fetch.
    DateChanged(String),
    /// The recommendation form was submitted. The host is responsible for
    /// suppressing the default form navigation.
    FormSubmitted { goal: String, diet_type: String },
}

/// Persistent UI state, mutated exclusively by events.
#[derive(Debug, Clone, PartialEq)]
pub struct UiState {
    pub active_tab: Tab,
    pub selected_date: String,
}

pub struct PageController {
    api: Arc<dyn MealApi>,
    user_id: String,
    state: Mutex<UiState>,
    insights_ticket: AtomicU64,
    recommend_ticket: AtomicU64,
}

impl PageController {
    /// Build a controller over an arbitrary backend seam. The default tab
    /// is history and the date field starts at today's date.
    pub fn new(api: Arc<dyn MealApi>, user_id: impl Into<String>) -> Self {
        Self {
            api,
            user_id: user_id.into(),
            state: Mutex::new(UiState {
                active_tab: Tab::default(),
                selected_date: format::today_iso(),
            }),
            insights_ticket: AtomicU64::new(0),
            recommend_ticket: AtomicU64::new(0),
        }
    }

    /// Build a controller backed by the configured HTTP backend.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Arc::new(HttpMealApi::new(&config.backend)),
            config.user.user_id.clone(),
        )
    }

    /// Snapshot of the current UI state, for hosts that mirror it into the
    /// document (e.g. which tab button carries the active style).
    pub fn state(&self) -> UiState {
        self.lock_state().clone()
    }

    /// Route one UI event and return the region updates it produced. A
    /// stale response discarded by the race guard produces no update.
    pub async fn handle(&self, event: UiEvent) -> Vec<RegionUpdate> {
        match event {
            UiEvent::PageLoaded => self.load_insights().await.into_iter().collect(),
            UiEvent::TabSelected(tab) => {
                self.lock_state().active_tab = tab;
                tracing::debug!(%tab, "tab selected");
                self.load_insights().await.into_iter().collect()
            }
            UiEvent::DateChanged(date) => {
                self.lock_state().selected_date = date;
                Vec::new()
            }
            UiEvent::FormSubmitted { goal, diet_type } => self.submit(goal, diet_type).await,
        }
    }

    /// Fetch insights for the active tab and selected date and render the
    /// matching view, passing only that slice of the payload.
    async fn load_insights(&self) -> Option<RegionUpdate> {
        let (tab, date) = {
            let state = self.lock_state();
            (state.active_tab, state.selected_date.clone())
        };

        let ticket = self.issue_ticket(&self.insights_ticket);
        let result = self.api.user_insights(&self.user_id, &date).await;
        if !self.is_latest(&self.insights_ticket, ticket) {
            tracing::debug!(ticket, %tab, "discarding stale insights response");
            return None;
        }

        let html = match result {
            Ok(response) if response.is_success() => match tab {
                Tab::History => render::history(&response.insights.history),
                Tab::Predictions => render::predictions(&response.insights.predictions),
                Tab::Stats => render::stats(&response.insights.stats),
            },
            Ok(response) => {
                let message = response
                    .message
                    .unwrap_or_else(|| INSIGHTS_FETCH_ERROR.to_string());
                tracing::warn!(%message, "backend rejected insights request");
                render::error(&message)
            }
            Err(err) => {
                tracing::warn!(error = %err, "insights request failed");
                render::error(INSIGHTS_FETCH_ERROR)
            }
        };

        Some(RegionUpdate {
            region: Region::Insights,
            html,
        })
    }

    /// Submit a recommendation request built from the form fields, the
    /// fixed user and the selected date. On success the recommendations
    /// region is redrawn and the insights for the active tab are refreshed
    /// to reflect the newly logged meal; any failure lands in the
    /// recommendations region only.
    async fn submit(&self, goal: String, diet_type: String) -> Vec<RegionUpdate> {
        let request = RecommendationRequest {
            goal,
            diet_type,
            date: self.lock_state().selected_date.clone(),
            user_id: self.user_id.clone(),
        };

        let ticket = self.issue_ticket(&self.recommend_ticket);
        let result = self.api.recommend(&request).await;
        if !self.is_latest(&self.recommend_ticket, ticket) {
            tracing::debug!(ticket, "discarding stale recommendation response");
            return Vec::new();
        }

        match result {
            Ok(response) if response.is_success() => {
                let mut updates = vec![RegionUpdate {
                    region: Region::Recommendations,
                    html: render::recommendations(
                        &response.recommendations,
                        &response.meal_details,
                    ),
                }];
                updates.extend(self.load_insights().await);
                updates
            }
            Ok(response) => {
                let message = response
                    .message
                    .unwrap_or_else(|| RECOMMENDATIONS_FETCH_ERROR.to_string());
                tracing::warn!(%message, "backend rejected recommendation request");
                vec![RegionUpdate {
                    region: Region::Recommendations,
                    html: render::error(&message),
                }]
            }
            Err(err) => {
                tracing::warn!(error = %err, "recommendation request failed");
                vec![RegionUpdate {
                    region: Region::Recommendations,
                    html: render::error(RECOMMENDATIONS_FETCH_ERROR),
                }]
            }
        }
    }

    fn issue_ticket(&self, region_ticket: &AtomicU64) -> u64 {
        region_ticket.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_latest(&self, region_ticket: &AtomicU64, ticket: u64) -> bool {
        region_ticket.load(Ordering::SeqCst) == ticket
    }

    fn lock_state(&self) -> MutexGuard<'_, UiState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
