//! Order Service
//!
//! Coordinates validation, duplicate detection, image resolution and the
//! order repository. Every operation validates its input completely before
//! the first persistence call.

use customflow_core::auth::Principal;
use customflow_core::error::{CustomFlowError, Result};
use customflow_core::image::ImageResolver;
use customflow_core::order::{
    NewOrder, NewOrderImage, Order, OrderDraft, OrderFilter, OrderPage, OrderRepository,
    PageRequest, parse_status,
};
use serde::Deserialize;
use std::sync::Arc;

/// Raw list parameters as they arrive in a query string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListOrdersQuery {
    pub status: Option<String>,
    pub search: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl ListOrdersQuery {
    fn into_parts(self) -> Result<(OrderFilter, PageRequest)> {
        let status = match self.status.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(parse_status(raw)?),
        };
        let number = |raw: Option<String>| raw.and_then(|v| v.trim().parse::<i64>().ok());
        Ok((
            OrderFilter::new(status, self.search),
            PageRequest::new(number(self.page), number(self.limit)),
        ))
    }
}

/// Service for order lifecycle operations.
#[derive(Clone)]
pub struct OrderService {
    repository: Arc<dyn OrderRepository>,
    images: ImageResolver,
}

impl OrderService {
    pub fn new(repository: Arc<dyn OrderRepository>, images: ImageResolver) -> Self {
        Self { repository, images }
    }

    /// Lists orders newest first. An unknown status filter is a validation error.
    pub async fn list(&self, query: ListOrdersQuery) -> Result<OrderPage> {
        let (filter, page) = query.into_parts()?;
        self.repository.list(&filter, page).await
    }

    pub async fn get(&self, id: i64) -> Result<Order> {
        self.repository.get(id).await
    }

    /// Creates an order owned by the caller.
    ///
    /// A duplicate identifier is reported with the colliding order's summary.
    /// Referenced images that do not exist are skipped.
    pub async fn create(&self, draft: OrderDraft, principal: &Principal) -> Result<Order> {
        let (fields, image_files) = draft.validate()?;

        if let Some(existing) = self.repository.find_by_order_id(&fields.order_id).await? {
            return Err(CustomFlowError::conflict_with(
                format!("Order ID '{}' already exists", fields.order_id),
                existing.summary(),
            ));
        }

        let images = self.resolve_images(&image_files).await;
        let order = self
            .repository
            .create(
                NewOrder {
                    fields,
                    created_by: principal.user_id,
                },
                images,
            )
            .await?;

        tracing::info!(
            id = order.id,
            order_id = %order.order_id,
            images = order.images.len(),
            user_id = principal.user_id,
            "Order created"
        );
        Ok(order)
    }

    /// Replaces the editable fields of an order.
    ///
    /// The image set is replaced only when the draft lists at least one filename.
    pub async fn update(&self, id: i64, draft: OrderDraft) -> Result<Order> {
        let (fields, image_files) = draft.validate()?;

        let current = self.repository.get(id).await?;
        if current.order_id != fields.order_id {
            if let Some(other) = self.repository.find_by_order_id(&fields.order_id).await? {
                if other.id != id {
                    return Err(CustomFlowError::conflict_with(
                        format!("Order ID '{}' already exists", fields.order_id),
                        other.summary(),
                    ));
                }
            }
        }

        let images = if image_files.is_empty() {
            None
        } else {
            Some(self.resolve_images(&image_files).await)
        };
        let order = self.repository.update(id, fields, images).await?;

        tracing::info!(id, order_id = %order.order_id, "Order updated");
        Ok(order)
    }

    pub async fn update_status(&self, id: i64, raw_status: &str) -> Result<Order> {
        let status = parse_status(raw_status)?;
        let current = self.repository.get(id).await?;
        if !current.status.can_transition_to(status) {
            return Err(CustomFlowError::validation(
                "status",
                format!("cannot move from {} to {}", current.status, status),
            ));
        }

        let order = self.repository.update_status(id, status).await?;
        tracing::info!(id, from = %current.status, to = %status, "Order status changed");
        Ok(order)
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        self.repository.delete(id).await?;
        tracing::info!(id, "Order deleted");
        Ok(())
    }

    /// Round trip to the order store, used by the health endpoint.
    pub async fn ping(&self) -> Result<()> {
        self.repository.ping().await
    }

    async fn resolve_images(&self, filenames: &[String]) -> Vec<NewOrderImage> {
        let outcome = self.images.resolve(filenames).await;
        for failed in &outcome.failed {
            tracing::warn!(filename = %failed.item, reason = %failed.reason, "Skipping order image");
        }
        outcome.succeeded
    }
}
