//! Convoy domain models.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A scheduled shipment customers can drop parcels into.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Convoy {
    pub id: String,
    /// Departure date as stored by the backend (ISO 8601).
    pub departure_date: String,
    pub price_per_kg: Decimal,
    pub carrier_address: String,
    pub carrier_name: String,
    pub destination: String,
    /// Remaining capacity, in percent.
    pub available_space: f64,
}

/// Row shape of the `convoys` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConvoyRow {
    pub id: String,
    pub departure_date: String,
    pub price_per_kg: Decimal,
    pub carrier_address: String,
    pub carrier_name: String,
    pub destination: String,
    pub available_space: f64,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

fn default_active() -> bool {
    true
}

impl From<ConvoyRow> for Convoy {
    fn from(row: ConvoyRow) -> Self {
        Self {
            id: row.id,
            departure_date: row.departure_date,
            price_per_kg: row.price_per_kg,
            carrier_address: row.carrier_address,
            carrier_name: row.carrier_name,
            destination: row.destination,
            available_space: row.available_space,
        }
    }
}
