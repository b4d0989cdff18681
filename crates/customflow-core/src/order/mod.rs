//! Order domain module.
//!
//! # Module Structure
//!
//! - `model`: The `Order` entity, its images and value enums
//! - `validation`: Field rules applied before any persistence call
//! - `repository`: Repository trait with filter and pagination values
//!
//! # Usage
//!
//! ```ignore
//! use customflow_core::order::{OrderDraft, OrderRepository, PageRequest};
//! ```

mod model;
mod repository;
pub mod validation;

pub use model::{
    CornerStyle, NewOrder, NewOrderImage, Order, OrderFields, OrderImage, OrderStatus, Source,
    Thickness,
};
pub use repository::{
    DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT, OrderFilter, OrderPage, OrderRepository, PageRequest,
    Pagination,
};
pub use validation::{OrderDraft, parse_status};
