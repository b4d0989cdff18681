//! Order domain model.
//!
//! This module contains the Order entity, its owned images and the value
//! enums whose allowed values mirror the database check constraints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::error::ExistingOrder;

/// Channel through which an order was received.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString, AsRefStr, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Source {
    #[default]
    Amazon,
    Whatsapp,
    Sms,
    Call,
}

/// Cover thickness.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString, AsRefStr, EnumIter,
)]
pub enum Thickness {
    #[serde(rename = "2mm")]
    #[strum(serialize = "2mm")]
    Mm2,
    #[default]
    #[serde(rename = "3mm")]
    #[strum(serialize = "3mm")]
    Mm3,
    #[serde(rename = "5mm")]
    #[strum(serialize = "5mm")]
    Mm5,
    #[serde(rename = "8mm")]
    #[strum(serialize = "8mm")]
    Mm8,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString, AsRefStr, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CornerStyle {
    #[default]
    Sharp,
    Rounded,
    Custom,
}

/// Lifecycle status of an order.
///
/// The lifecycle reads `new → in-progress → done`, but transitions are not
/// enforced: any status may be set to any other in one step.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString, AsRefStr, EnumIter,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum OrderStatus {
    #[default]
    New,
    InProgress,
    Done,
}

impl OrderStatus {
    /// Whether an order in this status may move to `next`.
    ///
    /// Always true; kept as the single place to tighten the lifecycle.
    pub fn can_transition_to(self, _next: OrderStatus) -> bool {
        true
    }
}

/// An image attached to an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderImage {
    pub id: i64,
    pub order_id: i64,
    pub filename: String,
    /// Public path, `/uploads/<filename>`
    pub path: String,
    pub size: i64,
    pub mime_type: String,
    pub created_at: DateTime<Utc>,
}

/// An image row that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewOrderImage {
    pub filename: String,
    pub path: String,
    pub size: i64,
    pub mime_type: String,
}

/// Validated, user-editable fields of an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderFields {
    pub order_id: String,
    pub customer_name: String,
    pub source: Source,
    pub phone_number: String,
    pub length: f64,
    pub width: f64,
    pub thickness: Thickness,
    pub corner_style: CornerStyle,
    pub notes: String,
    pub special_notes: String,
}

/// An order ready to be inserted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewOrder {
    pub fields: OrderFields,
    pub created_by: i64,
}

/// One order placed by a customer, with its images.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub order_id: String,
    pub customer_name: String,
    pub source: Source,
    pub phone_number: String,
    pub length: f64,
    pub width: f64,
    pub thickness: Thickness,
    pub corner_style: CornerStyle,
    pub notes: String,
    pub special_notes: String,
    pub status: OrderStatus,
    pub images: Vec<OrderImage>,
    pub created_by: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Overwrites the editable fields, leaving status, owner and timestamps alone.
    pub fn apply_fields(&mut self, fields: OrderFields) {
        self.order_id = fields.order_id;
        self.customer_name = fields.customer_name;
        self.source = fields.source;
        self.phone_number = fields.phone_number;
        self.length = fields.length;
        self.width = fields.width;
        self.thickness = fields.thickness;
        self.corner_style = fields.corner_style;
        self.notes = fields.notes;
        self.special_notes = fields.special_notes;
    }

    /// Summary used in duplicate-identifier conflicts.
    pub fn summary(&self) -> ExistingOrder {
        ExistingOrder {
            id: self.id,
            order_id: self.order_id.clone(),
            created_at: self.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            status: self.status.to_string(),
        }
    }
}
