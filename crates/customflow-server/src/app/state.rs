use std::sync::Arc;

use customflow_application::{AssistantService, OrderService};
use customflow_core::ai::{AiAuditRepository, AiGateway};
use customflow_core::auth::Authenticator;
use customflow_core::image::{ImageResolver, ImageStore};
use customflow_core::order::OrderRepository;

/// Application state shared across HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub orders: Arc<OrderService>,
    pub assistant: Arc<AssistantService>,
    pub images: Arc<dyn ImageStore>,
    pub authenticator: Arc<dyn Authenticator>,
}

impl AppState {
    /// Wires the services on top of the given adapters.
    pub fn new(
        order_repository: Arc<dyn OrderRepository>,
        audit_repository: Arc<dyn AiAuditRepository>,
        images: Arc<dyn ImageStore>,
        gateway: Arc<dyn AiGateway>,
        authenticator: Arc<dyn Authenticator>,
    ) -> Self {
        let orders = OrderService::new(order_repository, ImageResolver::new(images.clone()));
        let assistant = AssistantService::new(gateway, images.clone(), audit_repository);
        Self {
            orders: Arc::new(orders),
            assistant: Arc::new(assistant),
            images,
            authenticator,
        }
    }
}
