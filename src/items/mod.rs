//! Normalized contact items and the paginated listing that produces them

pub mod fetcher;
pub mod mapper;

pub use fetcher::{DEFAULT_MAX_ITEMS, ItemFetcher, MAX_PAGE_SIZE};
pub use mapper::{CONTACT_PROPERTIES, map_contact};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One normalized record handed back to the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegrationItem {
    pub id: String,
    #[serde(rename = "type")]
    pub item_type: String,
    pub name: String,
    pub parameters: Vec<ItemParameter>,
    /// The record exactly as HubSpot returned it
    pub raw: Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemParameter {
    pub name: String,
    pub value: String,
}
