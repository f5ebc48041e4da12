//! Integration tests for the page controller, driven through a scripted
//! backend so no network is involved.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;
use tokio::sync::oneshot;

use mealboard::client::MealApi;
use mealboard::controller::{PageController, Region, Tab, UiEvent};
use mealboard::error::ApiError;
use mealboard::model::{InsightsResponse, RecommendationRequest, RecommendationResponse};

/// Scripted backend: queued responses are handed out in order, and every
/// incoming request is recorded for assertions.
#[derive(Default)]
struct StubApi {
    recommend_responses: Mutex<VecDeque<Result<RecommendationResponse, ApiError>>>,
    insights_responses: Mutex<VecDeque<Result<InsightsResponse, ApiError>>>,
    recommend_requests: Mutex<Vec<RecommendationRequest>>,
    insights_requests: Mutex<Vec<(String, String)>>,
}

impl StubApi {
    fn queue_recommend(&self, response: Result<RecommendationResponse, ApiError>) {
        self.recommend_responses.lock().unwrap().push_back(response);
    }

    fn queue_insights(&self, response: Result<InsightsResponse, ApiError>) {
        self.insights_responses.lock().unwrap().push_back(response);
    }

    fn recommend_requests(&self) -> Vec<RecommendationRequest> {
        self.recommend_requests.lock().unwrap().clone()
    }

    fn insights_requests(&self) -> Vec<(String, String)> {
        self.insights_requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl MealApi for StubApi {
    async fn recommend(
        &self,
        request: &RecommendationRequest,
    ) -> Result<RecommendationResponse, ApiError> {
        self.recommend_requests.lock().unwrap().push(request.clone());
        self.recommend_responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ApiError::Transport("no scripted response".to_string())))
    }

    async fn user_insights(
        &self,
        user_id: &str,
        date: &str,
    ) -> Result<InsightsResponse, ApiError> {
        self.insights_requests
            .lock()
            .unwrap()
            .push((user_id.to_string(), date.to_string()));
        self.insights_responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ApiError::Transport("no scripted response".to_string())))
    }
}

fn insights_response(value: serde_json::Value) -> InsightsResponse {
    serde_json::from_value(value).expect("valid insights fixture")
}

fn recommendation_response(value: serde_json::Value) -> RecommendationResponse {
    serde_json::from_value(value).expect("valid recommendation fixture")
}

fn empty_insights() -> InsightsResponse {
    insights_response(json!({"status": "success", "insights": {}}))
}

fn controller_with(api: Arc<StubApi>) -> PageController {
    PageController::new(api, "default_user")
}

#[tokio::test]
async fn page_load_renders_history_placeholder_when_empty() {
    let api = Arc::new(StubApi::default());
    api.queue_insights(Ok(empty_insights()));
    let controller = controller_with(api.clone());

    let updates = controller.handle(UiEvent::PageLoaded).await;

    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].region, Region::Insights);
    assert!(updates[0].html.contains("No meal history available yet."));

    let requests = api.insights_requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].0, "default_user");
}

#[tokio::test]
async fn submit_success_renders_cards_and_refreshes_insights() {
    let api = Arc::new(StubApi::default());
    api.queue_recommend(Ok(recommendation_response(json!({
        "status": "success",
        "recommendations": {
            "breakfast": "Oatmeal",
            "lunch": "No valid meal found",
            "dinner": "Grilled salmon"
        },
        "meal_details": {
            "breakfast": {"total_calories": 350.0},
            "dinner": {"total_calories": 620.0}
        }
    }))));
    api.queue_insights(Ok(empty_insights()));
    let controller = controller_with(api.clone());

    controller
        .handle(UiEvent::DateChanged("2024-01-15".to_string()))
        .await;
    let updates = controller
        .handle(UiEvent::FormSubmitted {
            goal: "lose_weight".to_string(),
            diet_type: "vegan".to_string(),
        })
        .await;

    assert_eq!(updates.len(), 2);

    assert_eq!(updates[0].region, Region::Recommendations);
    assert!(updates[0].html.contains("Breakfast"));
    assert!(updates[0].html.contains("Oatmeal"));
    assert!(updates[0].html.contains("Calories:</strong> 350"));
    assert!(updates[0].html.contains("No valid meal found"));

    assert_eq!(updates[1].region, Region::Insights);

    let requests = api.recommend_requests();
    assert_eq!(
        requests,
        vec![RecommendationRequest {
            goal: "lose_weight".to_string(),
            diet_type: "vegan".to_string(),
            date: "2024-01-15".to_string(),
            user_id: "default_user".to_string(),
        }]
    );

    // The refresh reuses the edited date.
    assert_eq!(
        api.insights_requests(),
        vec![("default_user".to_string(), "2024-01-15".to_string())]
    );
}

#[tokio::test]
async fn rejected_submit_shows_backend_message_in_recommendations_only() {
    let api = Arc::new(StubApi::default());
    api.queue_recommend(Ok(recommendation_response(json!({
        "status": "error",
        "message": "Model not loaded"
    }))));
    let controller = controller_with(api.clone());

    let updates = controller
        .handle(UiEvent::FormSubmitted {
            goal: "gain_muscle".to_string(),
            diet_type: "keto".to_string(),
        })
        .await;

    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].region, Region::Recommendations);
    assert!(updates[0].html.contains("Model not loaded"));

    // A failed submit must not touch the insights region.
    assert!(api.insights_requests().is_empty());
}

#[tokio::test]
async fn transport_failure_on_submit_shows_generic_message() {
    let api = Arc::new(StubApi::default());
    api.queue_recommend(Err(ApiError::Transport("connection refused".to_string())));
    let controller = controller_with(api.clone());

    let updates = controller
        .handle(UiEvent::FormSubmitted {
            goal: "lose_weight".to_string(),
            diet_type: "vegan".to_string(),
        })
        .await;

    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].region, Region::Recommendations);
    assert!(
        updates[0]
            .html
            .contains("An error occurred while fetching recommendations.")
    );
}

#[tokio::test]
async fn transport_failure_on_insights_shows_generic_message() {
    let api = Arc::new(StubApi::default());
    api.queue_insights(Err(ApiError::Transport("connection refused".to_string())));
    let controller = controller_with(api.clone());

    let updates = controller.handle(UiEvent::PageLoaded).await;

    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].region, Region::Insights);
    assert!(
        updates[0]
            .html
            .contains("An error occurred while loading insights.")
    );
}

#[tokio::test]
async fn rejected_insights_without_message_fall_back_to_generic() {
    let api = Arc::new(StubApi::default());
    api.queue_insights(Ok(insights_response(json!({"status": "error"}))));
    let controller = controller_with(api.clone());

    let updates = controller.handle(UiEvent::PageLoaded).await;

    assert_eq!(updates.len(), 1);
    assert!(
        updates[0]
            .html
            .contains("An error occurred while loading insights.")
    );
}

#[tokio::test]
async fn tab_selection_renders_only_the_matching_slice() {
    let api = Arc::new(StubApi::default());
    api.queue_insights(Ok(insights_response(json!({
        "status": "success",
        "insights": {
            "history": {
                "2024-01-15": {"breakfast": "Oatmeal", "lunch": "Salad", "dinner": "Soup"}
            },
            "stats": {
                "breakfast": {"avg_calories": 612.6, "total_meals": 12,
                              "most_common": [["Oatmeal", 5]]}
            }
        }
    }))));
    let controller = controller_with(api.clone());

    let updates = controller.handle(UiEvent::TabSelected(Tab::Stats)).await;

    assert_eq!(controller.state().active_tab, Tab::Stats);
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].region, Region::Insights);
    assert!(updates[0].html.contains("Your Meal Statistics"));
    assert!(updates[0].html.contains("Average Calories: 613"));
    assert!(!updates[0].html.contains("Your Meal History"));
}

#[tokio::test]
async fn date_change_updates_state_without_fetching() {
    let api = Arc::new(StubApi::default());
    let controller = controller_with(api.clone());

    let updates = controller
        .handle(UiEvent::DateChanged("2024-02-01".to_string()))
        .await;

    assert!(updates.is_empty());
    assert_eq!(controller.state().selected_date, "2024-02-01");
    assert!(api.insights_requests().is_empty());
}

/// Backend whose insight responses are released manually, to interleave
/// two in-flight requests.
#[derive(Default)]
struct GatedApi {
    pending: Mutex<Vec<Option<oneshot::Sender<InsightsResponse>>>>,
}

impl GatedApi {
    fn pending_count(&self) -> usize {
        self.pending.lock().unwrap().len()
    }

    fn release(&self, index: usize, response: InsightsResponse) {
        let sender = self.pending.lock().unwrap()[index]
            .take()
            .expect("request already released");
        let _ = sender.send(response);
    }
}

#[async_trait]
impl MealApi for GatedApi {
    async fn recommend(
        &self,
        _request: &RecommendationRequest,
    ) -> Result<RecommendationResponse, ApiError> {
        Err(ApiError::Transport("recommend not scripted".to_string()))
    }

    async fn user_insights(
        &self,
        _user_id: &str,
        _date: &str,
    ) -> Result<InsightsResponse, ApiError> {
        let (sender, receiver) = oneshot::channel();
        self.pending.lock().unwrap().push(Some(sender));
        receiver
            .await
            .map_err(|_| ApiError::Transport("gate dropped".to_string()))
    }
}

async fn wait_for_pending(api: &GatedApi, count: usize) {
    for _ in 0..1000 {
        if api.pending_count() >= count {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("backend never saw {count} request(s)");
}

#[tokio::test]
async fn stale_insights_response_is_discarded() {
    let api = Arc::new(GatedApi::default());
    let controller = Arc::new(PageController::new(api.clone(), "default_user"));

    let first = {
        let controller = controller.clone();
        tokio::spawn(async move { controller.handle(UiEvent::PageLoaded).await })
    };
    wait_for_pending(&api, 1).await;

    let second = {
        let controller = controller.clone();
        tokio::spawn(async move { controller.handle(UiEvent::TabSelected(Tab::Stats)).await })
    };
    wait_for_pending(&api, 2).await;

    // Resolve the newer request first, then the outdated one.
    api.release(
        1,
        insights_response(json!({
            "status": "success",
            "insights": {
                "stats": {
                    "breakfast": {"avg_calories": 500.0, "total_meals": 3, "most_common": []}
                }
            }
        })),
    );
    api.release(
        0,
        insights_response(json!({
            "status": "success",
            "insights": {
                "history": {
                    "2024-01-15": {"breakfast": "Oatmeal", "lunch": "Salad", "dinner": "Soup"}
                }
            }
        })),
    );

    let first_updates = first.await.expect("first task panicked");
    let second_updates = second.await.expect("second task panicked");

    assert!(
        first_updates.is_empty(),
        "outdated response must not produce a region update"
    );
    assert_eq!(second_updates.len(), 1);
    assert!(second_updates[0].html.contains("Your Meal Statistics"));
    assert!(!second_updates[0].html.contains("Your Meal History"));
}
