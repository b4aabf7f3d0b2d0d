//! Order Model

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::ParseStatusError;

pub type OrderId = i64;
pub type ItemId = i64;

/// Fulfillment status of an order (`uma_status` on the wire)
///
/// This is the authoritative status the backend pushes upstream. It only
/// moves on explicit operator action or sync reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FulfillmentStatus {
    #[default]
    Processing,
    Packed,
    LabelPending,
    LabelCreated,
    LabelPrinted,
    Completed,
    Cancelled,
    Error,
}

impl FulfillmentStatus {
    pub const ALL: [FulfillmentStatus; 8] = [
        Self::Processing,
        Self::Packed,
        Self::LabelPending,
        Self::LabelCreated,
        Self::LabelPrinted,
        Self::Completed,
        Self::Cancelled,
        Self::Error,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Processing => "processing",
            Self::Packed => "packed",
            Self::LabelPending => "label_pending",
            Self::LabelCreated => "label_created",
            Self::LabelPrinted => "label_printed",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for FulfillmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FulfillmentStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ParseStatusError {
                kind: "fulfillment",
                value: s.to_string(),
            })
    }
}

/// Pick status of a single order item (`uma_picked` on the wire)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PickStatus {
    #[default]
    NotPicked,
    PartiallyPicked,
    Picked,
}

impl PickStatus {
    /// Derive the status from a picked quantity and the required quantity.
    ///
    /// Zero (or less) is always `NotPicked`, so an item that requires zero
    /// units stays `NotPicked` until something is entered for it.
    pub fn derive(picked: Decimal, required: Decimal) -> Self {
        if picked <= Decimal::ZERO {
            Self::NotPicked
        } else if picked >= required {
            Self::Picked
        } else {
            Self::PartiallyPicked
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotPicked => "not_picked",
            Self::PartiallyPicked => "partially_picked",
            Self::Picked => "picked",
        }
    }
}

impl fmt::Display for PickStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Clamp a requested picked quantity into `[0, required]`
pub fn clamp_picked(requested: Decimal, required: Decimal) -> Decimal {
    let ceiling = required.max(Decimal::ZERO);
    requested.max(Decimal::ZERO).min(ceiling)
}

/// Order item
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderItem {
    pub id: ItemId,
    /// Parent order, when the backend includes it
    #[serde(default)]
    pub order: Option<OrderId>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub ean: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    pub quantity: Decimal,
    #[serde(rename = "uma_picked", default)]
    pub pick_status: PickStatus,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub stock_position: Option<String>,
    #[serde(default)]
    pub parameters: Option<serde_json::Value>,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Order entity as served by `GET /orders/`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    pub id: OrderId,
    pub order_number: String,
    #[serde(rename = "uma_status")]
    pub fulfillment_status: FulfillmentStatus,
    /// Free-text status from the upstream platform, display only
    #[serde(rename = "status", default)]
    pub display_status: Option<String>,
    #[serde(default)]
    pub internal_note: Option<String>,
    #[serde(default)]
    pub order_total: Option<Decimal>,
    #[serde(default)]
    pub customer: Option<serde_json::Value>,
    #[serde(default)]
    pub shipment: Option<serde_json::Value>,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    #[serde(rename = "uma_created_at", default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "uma_updated_at", default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Integer embedded in the order number after its one-letter prefix
    /// (`"O1042"` → `1042`). Only the leading digits count.
    pub fn number_suffix(&self) -> Option<i64> {
        let digits: String = self
            .order_number
            .chars()
            .skip(1)
            .take_while(|c| c.is_ascii_digit())
            .collect();
        digits.parse().ok()
    }

    /// Ascending by numeric suffix; unparseable numbers sort last.
    pub fn cmp_by_number(&self, other: &Order) -> Ordering {
        match (self.number_suffix(), other.number_suffix()) {
            (Some(a), Some(b)) => a.cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.order_number.cmp(&other.order_number),
        }
    }

    pub fn item(&self, item_id: ItemId) -> Option<&OrderItem> {
        self.items.iter().find(|item| item.id == item_id)
    }

    pub fn item_mut(&mut self, item_id: ItemId) -> Option<&mut OrderItem> {
        self.items.iter_mut().find(|item| item.id == item_id)
    }

    /// First item carrying exactly this EAN
    pub fn item_by_ean(&self, ean: &str) -> Option<&OrderItem> {
        self.items
            .iter()
            .find(|item| item.ean.as_deref() == Some(ean))
    }

    pub fn total_quantity(&self) -> Decimal {
        self.items.iter().map(|item| item.quantity).sum()
    }

    /// Items ordered by their code for display; storage order is untouched.
    pub fn items_for_display(&self) -> Vec<&OrderItem> {
        let mut items: Vec<&OrderItem> = self.items.iter().collect();
        items.sort_by(|a, b| a.code.cmp(&b.code));
        items
    }
}
