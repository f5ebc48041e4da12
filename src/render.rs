//! Pure renderers mapping payload slices to HTML fragments.
//!
//! Each renderer first folds the payload into a flat view model, then feeds
//! it to an askama template. All defensive handling (sentinel filtering,
//! capitalization, date formatting, rounding) happens in the mapping step so
//! the templates stay declarative. Renderers never fail: a template error is
//! logged and degrades to a plain-text fallback.

use askama::Template;

use crate::format::{capitalize_first, format_long_date};
use crate::model::{
    MealDetail, MealSlot, MealSlots, MealTimeStats, PayloadMap, PredictedMeal,
};

/// One labelled sub-entry of a history card.
pub struct MealEntryView {
    pub label: String,
    pub text: String,
}

/// One per-date card of the history view.
pub struct HistoryDayView {
    pub date: String,
    pub meals: Vec<MealEntryView>,
}

pub struct PredictedMealView {
    pub label: String,
    pub meal: String,
    pub calories: f64,
    pub diet_type: String,
    pub goal: String,
}

pub struct PredictionDayView {
    pub date: String,
    pub meals: Vec<PredictedMealView>,
}

pub struct MostCommonView {
    pub name: String,
    pub count: u64,
}

pub struct MealTimeStatsView {
    pub label: String,
    pub avg_calories: i64,
    pub total_meals: u64,
    pub most_common: Vec<MostCommonView>,
}

/// One of the three fixed recommendation cards. `unavailable` carries the
/// sentinel text when the slot has no usable meal; otherwise `meal` holds
/// the meal name and `calories` the per-slot detail when the backend sent
/// one.
pub struct RecommendationCardView {
    pub label: String,
    pub meal: String,
    pub calories: Option<f64>,
    pub unavailable: Option<String>,
}

#[derive(Template)]
#[template(path = "history.html")]
struct HistoryTemplate {
    days: Vec<HistoryDayView>,
}

#[derive(Template)]
#[template(path = "predictions.html")]
struct PredictionsTemplate {
    days: Vec<PredictionDayView>,
}

#[derive(Template)]
#[template(path = "stats.html")]
struct StatsTemplate {
    entries: Vec<MealTimeStatsView>,
}

#[derive(Template)]
#[template(path = "recommendations.html")]
struct RecommendationsTemplate {
    cards: Vec<RecommendationCardView>,
}

#[derive(Template)]
#[template(path = "error.html")]
struct ErrorTemplate<'a> {
    message: &'a str,
}

fn render_to_string<T: Template>(template: T) -> String {
    match template.render() {
        Ok(html) => html,
        Err(err) => {
            tracing::error!("Failed to render template: {err}");
            format!("Failed to render template. Error: {err}")
        }
    }
}

/// Render the meal history view. Slots holding a sentinel are omitted from
/// their day card rather than shown as errors.
pub fn history(history: &PayloadMap<MealSlots<MealSlot>>) -> String {
    let days = history
        .iter()
        .map(|(date, meals)| HistoryDayView {
            date: format_long_date(date),
            meals: meals
                .iter()
                .filter_map(|(meal_time, slot)| match slot {
                    MealSlot::Planned(text) => Some(MealEntryView {
                        label: capitalize_first(meal_time.as_str()),
                        text: text.clone(),
                    }),
                    MealSlot::Unavailable(_) => None,
                })
                .collect(),
        })
        .collect();

    render_to_string(HistoryTemplate { days })
}

/// Render the predictions view. All three slots of a day are always shown.
pub fn predictions(predictions: &PayloadMap<MealSlots<PredictedMeal>>) -> String {
    let days = predictions
        .iter()
        .map(|(date, meals)| PredictionDayView {
            date: format_long_date(date),
            meals: meals
                .iter()
                .map(|(meal_time, predicted)| PredictedMealView {
                    label: capitalize_first(meal_time.as_str()),
                    meal: predicted.meal.clone(),
                    calories: predicted.calories,
                    diet_type: capitalize_first(&predicted.diet_type),
                    goal: capitalize_first(&predicted.goal),
                })
                .collect(),
        })
        .collect();

    render_to_string(PredictionsTemplate { days })
}

/// Render the statistics view in payload order, averages rounded to the
/// nearest integer.
pub fn stats(stats: &PayloadMap<MealTimeStats>) -> String {
    let entries = stats
        .iter()
        .map(|(meal_time, stat)| MealTimeStatsView {
            label: capitalize_first(meal_time),
            avg_calories: stat.avg_calories.round() as i64,
            total_meals: stat.total_meals,
            most_common: stat
                .most_common
                .iter()
                .map(|(name, count)| MostCommonView {
                    name: name.clone(),
                    count: *count,
                })
                .collect(),
        })
        .collect();

    render_to_string(StatsTemplate { entries })
}

/// Render the recommendations region: exactly one card per meal time, in
/// the fixed order, regardless of payload content.
pub fn recommendations(
    meals: &MealSlots<MealSlot>,
    details: &MealSlots<Option<MealDetail>>,
) -> String {
    let cards = meals
        .iter()
        .map(|(meal_time, slot)| {
            let label = capitalize_first(meal_time.as_str());
            match slot {
                MealSlot::Planned(meal) => RecommendationCardView {
                    label,
                    meal: meal.clone(),
                    calories: details
                        .get(meal_time)
                        .as_ref()
                        .map(|detail| detail.total_calories),
                    unavailable: None,
                },
                MealSlot::Unavailable(reason) => RecommendationCardView {
                    label,
                    meal: String::new(),
                    calories: None,
                    unavailable: Some(reason.to_string()),
                },
            }
        })
        .collect();

    render_to_string(RecommendationsTemplate { cards })
}

/// Render a single error-message block for whichever region owns the
/// failed request.
pub fn error(message: &str) -> String {
    render_to_string(ErrorTemplate { message })
}
