//! mealboard - client-side controller for a meal recommendation dashboard.
//!
//! The crate owns the page's UI state (active insights tab, selected date),
//! talks to the recommendation backend over HTTP, and renders HTML fragments
//! for the two output regions of the page. The embedding host feeds
//! [`controller::UiEvent`]s to a [`controller::PageController`] and applies
//! the returned [`controller::RegionUpdate`]s to the document.

pub mod client;
pub mod config;
pub mod controller;
pub mod error;
pub mod format;
pub mod model;
pub mod observability;
pub mod render;

pub use controller::{PageController, Region, RegionUpdate, Tab, UiEvent, UiState};
