//! Process-local OrderRepository implementation.
//!
//! State lives behind a single `tokio::sync::RwLock`. Every operation runs in
//! one critical section, so an order and its images are always written
//! together.

use async_trait::async_trait;
use chrono::Utc;
use customflow_core::error::{CustomFlowError, Result};
use customflow_core::order::{
    NewOrder, NewOrderImage, Order, OrderFields, OrderFilter, OrderImage, OrderPage,
    OrderRepository, OrderStatus, PageRequest,
};
use std::collections::BTreeMap;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct MemoryState {
    next_order_id: i64,
    next_image_id: i64,
    orders: BTreeMap<i64, Order>,
}

impl MemoryState {
    fn ensure_unique(&self, order_id: &str, except: Option<i64>) -> Result<()> {
        let taken = self
            .orders
            .values()
            .any(|o| o.order_id == order_id && Some(o.id) != except);
        if taken {
            return Err(CustomFlowError::conflict(format!(
                "Order ID '{order_id}' already exists"
            )));
        }
        Ok(())
    }

    fn build_images(&mut self, order_id: i64, images: Vec<NewOrderImage>) -> Vec<OrderImage> {
        let now = Utc::now();
        images
            .into_iter()
            .map(|image| {
                self.next_image_id += 1;
                OrderImage {
                    id: self.next_image_id,
                    order_id,
                    filename: image.filename,
                    path: image.path,
                    size: image.size,
                    mime_type: image.mime_type,
                    created_at: now,
                }
            })
            .collect()
    }
}

/// In-memory order repository, used for development and tests.
#[derive(Debug, Default)]
pub struct InMemoryOrderRepository {
    state: RwLock<MemoryState>,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn matches(order: &Order, filter: &OrderFilter) -> bool {
    if filter.status.is_some_and(|status| order.status != status) {
        return false;
    }
    match &filter.search {
        Some(term) => {
            let term = term.to_lowercase();
            order.order_id.to_lowercase().contains(&term)
                || order.customer_name.to_lowercase().contains(&term)
        }
        None => true,
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn create(&self, order: NewOrder, images: Vec<NewOrderImage>) -> Result<Order> {
        let mut state = self.state.write().await;
        state.ensure_unique(&order.fields.order_id, None)?;

        state.next_order_id += 1;
        let id = state.next_order_id;
        let now = Utc::now();
        let fields = order.fields;
        let images = state.build_images(id, images);
        let stored = Order {
            id,
            order_id: fields.order_id,
            customer_name: fields.customer_name,
            source: fields.source,
            phone_number: fields.phone_number,
            length: fields.length,
            width: fields.width,
            thickness: fields.thickness,
            corner_style: fields.corner_style,
            notes: fields.notes,
            special_notes: fields.special_notes,
            status: OrderStatus::New,
            images,
            created_by: order.created_by,
            created_at: now,
            updated_at: now,
        };
        state.orders.insert(id, stored.clone());
        Ok(stored)
    }

    async fn get(&self, id: i64) -> Result<Order> {
        let state = self.state.read().await;
        state
            .orders
            .get(&id)
            .cloned()
            .ok_or_else(|| CustomFlowError::not_found("order", id.to_string()))
    }

    async fn find_by_order_id(&self, order_id: &str) -> Result<Option<Order>> {
        let state = self.state.read().await;
        Ok(state
            .orders
            .values()
            .find(|o| o.order_id == order_id)
            .cloned())
    }

    async fn list(&self, filter: &OrderFilter, page: PageRequest) -> Result<OrderPage> {
        let state = self.state.read().await;
        let mut matching: Vec<&Order> = state
            .orders
            .values()
            .filter(|o| matches(o, filter))
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let total = matching.len() as u64;
        let orders = matching
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit as usize)
            .cloned()
            .collect();
        Ok(OrderPage {
            orders,
            total,
            page: page.page,
            limit: page.limit,
        })
    }

    async fn update(
        &self,
        id: i64,
        fields: OrderFields,
        images: Option<Vec<NewOrderImage>>,
    ) -> Result<Order> {
        let mut state = self.state.write().await;
        if !state.orders.contains_key(&id) {
            return Err(CustomFlowError::not_found("order", id.to_string()));
        }
        state.ensure_unique(&fields.order_id, Some(id))?;

        let new_images = images.map(|images| state.build_images(id, images));
        let order = state
            .orders
            .get_mut(&id)
            .ok_or_else(|| CustomFlowError::not_found("order", id.to_string()))?;
        order.apply_fields(fields);
        if let Some(new_images) = new_images {
            order.images = new_images;
        }
        order.updated_at = Utc::now();
        Ok(order.clone())
    }

    async fn update_status(&self, id: i64, status: OrderStatus) -> Result<Order> {
        let mut state = self.state.write().await;
        let order = state
            .orders
            .get_mut(&id)
            .ok_or_else(|| CustomFlowError::not_found("order", id.to_string()))?;
        order.status = status;
        order.updated_at = Utc::now();
        Ok(order.clone())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let mut state = self.state.write().await;
        state
            .orders
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| CustomFlowError::not_found("order", id.to_string()))
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}
