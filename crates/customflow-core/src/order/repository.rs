//! Order repository trait.
//!
//! Defines the interface for order persistence operations together with the
//! filter and pagination values it accepts.

use serde::{Deserialize, Serialize};

use super::model::{NewOrder, NewOrderImage, Order, OrderFields, OrderStatus};
use crate::error::Result;

pub const DEFAULT_PAGE_LIMIT: u32 = 20;
pub const MAX_PAGE_LIMIT: u32 = 100;

/// Optional filters applied by [`OrderRepository::list`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    /// Case-insensitive substring matched against order identifier or customer name.
    pub search: Option<String>,
}

impl OrderFilter {
    /// Blank search terms are dropped.
    pub fn new(status: Option<OrderStatus>, search: Option<String>) -> Self {
        let search = search
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        Self { status, search }
    }
}

/// A clamped page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    /// Builds a page request from raw values.
    ///
    /// Limits above 100 become 100, missing or non-positive limits become 20,
    /// and page numbers below 1 become 1.
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        let page = match page {
            Some(p) if p >= 1 => p.min(u32::MAX as i64) as u32,
            _ => 1,
        };
        let limit = match limit {
            Some(l) if l > MAX_PAGE_LIMIT as i64 => MAX_PAGE_LIMIT,
            Some(l) if l >= 1 => l as u32,
            _ => DEFAULT_PAGE_LIMIT,
        };
        Self { page, limit }
    }

    pub fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.limit as u64
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// One page of orders plus the total number of matches.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderPage {
    pub orders: Vec<Order>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
}

/// Pagination block returned next to a page of orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub pages: u64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl OrderPage {
    pub fn pagination(&self) -> Pagination {
        let limit = self.limit.max(1) as u64;
        let pages = self.total.div_ceil(limit);
        Pagination {
            total: self.total,
            page: self.page,
            limit: self.limit,
            pages,
            has_next: (self.page as u64) < pages,
            has_prev: self.page > 1,
        }
    }
}

/// An abstract repository for managing order persistence.
///
/// Every multi-row write (an order with its images) is atomic: either all
/// rows are written or none are.
#[async_trait::async_trait]
pub trait OrderRepository: Send + Sync {
    /// Inserts a new order in status `new` together with its images.
    ///
    /// # Returns
    ///
    /// - `Ok(Order)`: The stored order with generated ids and timestamps
    /// - `Err(CustomFlowError::Conflict)`: The order identifier is taken
    /// - `Err(CustomFlowError::Storage)`: Any other persistence failure
    async fn create(&self, order: NewOrder, images: Vec<NewOrderImage>) -> Result<Order>;

    /// Loads an order with its images.
    ///
    /// Fails with `NotFound` when no order has this id.
    async fn get(&self, id: i64) -> Result<Order>;

    /// Finds an order by its external identifier.
    async fn find_by_order_id(&self, order_id: &str) -> Result<Option<Order>>;

    /// Lists orders newest first.
    ///
    /// # Arguments
    ///
    /// * `filter` - Optional status and search filters
    /// * `page` - Already clamped page request
    async fn list(&self, filter: &OrderFilter, page: PageRequest) -> Result<OrderPage>;

    /// Overwrites the editable fields of an order.
    ///
    /// When `images` is `Some`, the existing image set is deleted and replaced
    /// by the given one in the same transaction. `None` leaves images alone.
    ///
    /// # Returns
    ///
    /// - `Err(CustomFlowError::NotFound)`: No order has this id
    /// - `Err(CustomFlowError::Conflict)`: The new identifier belongs to another order
    async fn update(
        &self,
        id: i64,
        fields: OrderFields,
        images: Option<Vec<NewOrderImage>>,
    ) -> Result<Order>;

    /// Sets the status of an order and bumps its update timestamp.
    async fn update_status(&self, id: i64, status: OrderStatus) -> Result<Order>;

    /// Deletes an order and its images.
    async fn delete(&self, id: i64) -> Result<()>;

    /// Cheap round trip to the backing store.
    async fn ping(&self) -> Result<()>;
}
