//! Typed payload model for the recommendation and insights endpoints.
//!
//! The backend speaks loosely-typed JSON: meal slots are free-text strings
//! that may hold one of two sentinel values standing in for "no data", and
//! object keys carry meaning in their order. The types here absorb that at
//! the serde boundary so the rest of the crate branches on variants instead
//! of comparing against magic strings.

use std::fmt;
use std::marker::PhantomData;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Response status value the backend uses to signal success.
const STATUS_SUCCESS: &str = "success";

/// Sentinel the backend emits when no meal matched the request.
pub const NO_VALID_MEAL: &str = "No valid meal found";

/// Sentinel the backend emits when its prediction model is unavailable.
pub const MODEL_NOT_LOADED: &str = "Model not loaded";

/// One of the three fixed meal slots, in their canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum MealTime {
    Breakfast,
    Lunch,
    Dinner,
}

impl MealTime {
    /// All slots in the fixed breakfast/lunch/dinner order. The single
    /// source of slot ordering for rendering.
    pub const ALL: [MealTime; 3] = [MealTime::Breakfast, MealTime::Lunch, MealTime::Dinner];

    pub fn as_str(self) -> &'static str {
        match self {
            MealTime::Breakfast => "breakfast",
            MealTime::Lunch => "lunch",
            MealTime::Dinner => "dinner",
        }
    }
}

/// Why a meal slot carries no usable meal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unavailability {
    NoValidMeal,
    ModelNotLoaded,
}

impl Unavailability {
    /// The verbatim sentinel text the backend uses for this reason.
    pub fn as_str(self) -> &'static str {
        match self {
            Unavailability::NoValidMeal => NO_VALID_MEAL,
            Unavailability::ModelNotLoaded => MODEL_NOT_LOADED,
        }
    }
}

impl fmt::Display for Unavailability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A meal slot value: either an actual meal description or a tagged
/// "no data" marker decoded from one of the backend's sentinel strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MealSlot {
    Planned(String),
    Unavailable(Unavailability),
}

impl MealSlot {
    fn from_raw(raw: String) -> Self {
        match raw.as_str() {
            NO_VALID_MEAL => MealSlot::Unavailable(Unavailability::NoValidMeal),
            MODEL_NOT_LOADED => MealSlot::Unavailable(Unavailability::ModelNotLoaded),
            _ => MealSlot::Planned(raw),
        }
    }

    /// The wire text of the slot, sentinel text included.
    pub fn as_text(&self) -> &str {
        match self {
            MealSlot::Planned(meal) => meal,
            MealSlot::Unavailable(reason) => reason.as_str(),
        }
    }

    pub fn is_planned(&self) -> bool {
        matches!(self, MealSlot::Planned(_))
    }
}

/// A missing slot key renders the same as an explicit "no meal" sentinel,
/// keeping the three-cards-per-response invariant.
impl Default for MealSlot {
    fn default() -> Self {
        MealSlot::Unavailable(Unavailability::NoValidMeal)
    }
}

impl<'de> Deserialize<'de> for MealSlot {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(MealSlot::from_raw(String::deserialize(deserializer)?))
    }
}

impl Serialize for MealSlot {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_text())
    }
}

/// Per-slot container with exactly the three fixed meal-time keys.
///
/// Missing keys fall back to `T::default()` and unknown keys are ignored,
/// so a partial payload still produces all three slots.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MealSlots<T> {
    #[serde(default)]
    pub breakfast: T,
    #[serde(default)]
    pub lunch: T,
    #[serde(default)]
    pub dinner: T,
}

impl<T> MealSlots<T> {
    pub fn get(&self, meal_time: MealTime) -> &T {
        match meal_time {
            MealTime::Breakfast => &self.breakfast,
            MealTime::Lunch => &self.lunch,
            MealTime::Dinner => &self.dinner,
        }
    }

    /// Slots paired with their meal time, in the fixed canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (MealTime, &T)> {
        [
            (MealTime::Breakfast, &self.breakfast),
            (MealTime::Lunch, &self.lunch),
            (MealTime::Dinner, &self.dinner),
        ]
        .into_iter()
    }
}

/// String-keyed map that keeps the key order of the JSON payload.
///
/// History and prediction entries are keyed by date and the backend already
/// orders them; rendering follows that order rather than re-sorting.
#[derive(Debug, Clone, PartialEq)]
pub struct PayloadMap<T>(Vec<(String, T)>);

impl<T> PayloadMap<T> {
    pub fn new() -> Self {
        PayloadMap(Vec::new())
    }

    pub fn insert(&mut self, key: impl Into<String>, value: T) {
        self.0.push((key.into(), value));
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value))
    }
}

impl<T> Default for PayloadMap<T> {
    fn default() -> Self {
        PayloadMap::new()
    }
}

impl<T> FromIterator<(String, T)> for PayloadMap<T> {
    fn from_iter<I: IntoIterator<Item = (String, T)>>(iter: I) -> Self {
        PayloadMap(iter.into_iter().collect())
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for PayloadMap<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct PayloadMapVisitor<T>(PhantomData<T>);

        impl<'de, T: Deserialize<'de>> Visitor<'de> for PayloadMapVisitor<T> {
            type Value = PayloadMap<T>;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a JSON object")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((key, value)) = access.next_entry::<String, T>()? {
                    entries.push((key, value));
                }
                Ok(PayloadMap(entries))
            }
        }

        deserializer.deserialize_map(PayloadMapVisitor(PhantomData))
    }
}

impl<T: Serialize> Serialize for PayloadMap<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in &self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Body of `POST /recommend`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationRequest {
    pub goal: String,
    pub diet_type: String,
    pub date: String,
    pub user_id: String,
}

/// Per-slot detail attached to a recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealDetail {
    pub total_calories: f64,
}

/// Response of `POST /recommend`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationResponse {
    pub status: String,
    #[serde(default)]
    pub recommendations: MealSlots<MealSlot>,
    #[serde(default)]
    pub meal_details: MealSlots<Option<MealDetail>>,
    #[serde(default)]
    pub message: Option<String>,
}

impl RecommendationResponse {
    /// `status == "success"` is the sole success discriminator.
    pub fn is_success(&self) -> bool {
        self.status == STATUS_SUCCESS
    }
}

/// A single predicted meal for a future date.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PredictedMeal {
    #[serde(default)]
    pub meal: String,
    #[serde(default)]
    pub calories: f64,
    #[serde(default)]
    pub diet_type: String,
    #[serde(default)]
    pub goal: String,
}

/// Aggregated statistics for one meal time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MealTimeStats {
    #[serde(default)]
    pub avg_calories: f64,
    #[serde(default)]
    pub total_meals: u64,
    /// `(meal name, occurrence count)` pairs in the backend's order.
    #[serde(default)]
    pub most_common: Vec<(String, u64)>,
}

/// The per-user, per-date insights bundle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Insights {
    #[serde(default)]
    pub history: PayloadMap<MealSlots<MealSlot>>,
    #[serde(default)]
    pub predictions: PayloadMap<MealSlots<PredictedMeal>>,
    #[serde(default)]
    pub stats: PayloadMap<MealTimeStats>,
}

/// Response of `GET /user_insights/{user_id}?date={date}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightsResponse {
    pub status: String,
    #[serde(default)]
    pub insights: Insights,
    #[serde(default)]
    pub message: Option<String>,
}

impl InsightsResponse {
    pub fn is_success(&self) -> bool {
        self.status == STATUS_SUCCESS
    }
}
