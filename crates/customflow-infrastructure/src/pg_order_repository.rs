//! PostgreSQL-backed OrderRepository implementation.
//!
//! Enum columns are stored as text guarded by check constraints and parsed
//! back on read. Decimal columns are cast to `float8` in every select.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use customflow_core::error::{CustomFlowError, Result};
use customflow_core::order::{
    NewOrder, NewOrderImage, Order, OrderFields, OrderFilter, OrderImage, OrderPage,
    OrderRepository, OrderStatus, PageRequest,
};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder, Transaction};
use std::collections::HashMap;
use std::str::FromStr;

use crate::database::{db_error, is_unique_violation};

const ORDER_COLUMNS: &str = "id, order_id, customer_name, source, phone_number, \
     length::float8 AS length, width::float8 AS width, thickness, corner_style, \
     notes, special_notes, status, created_by, created_at, updated_at";

const IMAGE_COLUMNS: &str = "id, order_id, filename, path, size, mime_type, created_at";

#[derive(Debug, FromRow)]
struct OrderRow {
    id: i64,
    order_id: String,
    customer_name: String,
    source: String,
    phone_number: String,
    length: f64,
    width: f64,
    thickness: String,
    corner_style: String,
    notes: String,
    special_notes: String,
    status: String,
    created_by: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct ImageRow {
    id: i64,
    order_id: i64,
    filename: String,
    path: String,
    size: i64,
    mime_type: String,
    created_at: DateTime<Utc>,
}

impl From<ImageRow> for OrderImage {
    fn from(row: ImageRow) -> Self {
        Self {
            id: row.id,
            order_id: row.order_id,
            filename: row.filename,
            path: row.path,
            size: row.size,
            mime_type: row.mime_type,
            created_at: row.created_at,
        }
    }
}

fn column<T: FromStr>(name: &str, raw: &str) -> Result<T> {
    T::from_str(raw)
        .map_err(|_| CustomFlowError::storage(format!("Unexpected value '{raw}' in column {name}")))
}

impl OrderRow {
    fn into_order(self, images: Vec<OrderImage>) -> Result<Order> {
        Ok(Order {
            id: self.id,
            source: column("source", &self.source)?,
            thickness: column("thickness", &self.thickness)?,
            corner_style: column("corner_style", &self.corner_style)?,
            status: column("status", &self.status)?,
            order_id: self.order_id,
            customer_name: self.customer_name,
            phone_number: self.phone_number,
            length: self.length,
            width: self.width,
            notes: self.notes,
            special_notes: self.special_notes,
            images,
            created_by: self.created_by,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Escapes `ILIKE` wildcards so the search term matches literally.
fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, filter: &OrderFilter) {
    builder.push(" WHERE TRUE");
    if let Some(status) = filter.status {
        builder.push(" AND status = ").push_bind(status.to_string());
    }
    if let Some(term) = &filter.search {
        let pattern = like_pattern(term);
        builder
            .push(" AND (order_id ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR customer_name ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

fn duplicate(order_id: &str) -> CustomFlowError {
    CustomFlowError::conflict(format!("Order ID '{order_id}' already exists"))
}

/// Order repository over a PostgreSQL pool.
#[derive(Debug, Clone)]
pub struct PgOrderRepository {
    pool: PgPool,
}

impl PgOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn load_images(&self, order_ids: &[i64]) -> Result<HashMap<i64, Vec<OrderImage>>> {
        if order_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows: Vec<ImageRow> = sqlx::query_as(&format!(
            "SELECT {IMAGE_COLUMNS} FROM order_images WHERE order_id = ANY($1) ORDER BY id"
        ))
        .bind(order_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("load order images", e))?;

        let mut by_order: HashMap<i64, Vec<OrderImage>> = HashMap::new();
        for row in rows {
            by_order.entry(row.order_id).or_default().push(row.into());
        }
        Ok(by_order)
    }

    async fn insert_images(
        tx: &mut Transaction<'_, Postgres>,
        order_id: i64,
        images: Vec<NewOrderImage>,
    ) -> Result<Vec<OrderImage>> {
        let mut stored = Vec::with_capacity(images.len());
        for image in images {
            let row: ImageRow = sqlx::query_as(&format!(
                "INSERT INTO order_images (order_id, filename, path, size, mime_type) \
                 VALUES ($1, $2, $3, $4, $5) RETURNING {IMAGE_COLUMNS}"
            ))
            .bind(order_id)
            .bind(&image.filename)
            .bind(&image.path)
            .bind(image.size)
            .bind(&image.mime_type)
            .fetch_one(&mut **tx)
            .await
            .map_err(|e| db_error("insert order image", e))?;
            stored.push(row.into());
        }
        Ok(stored)
    }
}

#[async_trait]
impl OrderRepository for PgOrderRepository {
    async fn create(&self, order: NewOrder, images: Vec<NewOrderImage>) -> Result<Order> {
        let fields = &order.fields;
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("begin transaction", e))?;

        let row: OrderRow = sqlx::query_as(&format!(
            "INSERT INTO orders (order_id, customer_name, source, phone_number, length, width, \
             thickness, corner_style, notes, special_notes, status, created_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(&fields.order_id)
        .bind(&fields.customer_name)
        .bind(fields.source.as_ref())
        .bind(&fields.phone_number)
        .bind(fields.length)
        .bind(fields.width)
        .bind(fields.thickness.as_ref())
        .bind(fields.corner_style.as_ref())
        .bind(&fields.notes)
        .bind(&fields.special_notes)
        .bind(OrderStatus::New.as_ref())
        .bind(order.created_by)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                duplicate(&fields.order_id)
            } else {
                db_error("insert order", e)
            }
        })?;

        let images = Self::insert_images(&mut tx, row.id, images).await?;
        tx.commit()
            .await
            .map_err(|e| db_error("commit order", e))?;

        tracing::debug!(id = row.id, order_id = %row.order_id, "Order inserted");
        row.into_order(images)
    }

    async fn get(&self, id: i64) -> Result<Order> {
        let row: Option<OrderRow> =
            sqlx::query_as(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| db_error("load order", e))?;
        let row = row.ok_or_else(|| CustomFlowError::not_found("order", id.to_string()))?;
        let mut images = self.load_images(&[row.id]).await?;
        let own = images.remove(&row.id).unwrap_or_default();
        row.into_order(own)
    }

    async fn find_by_order_id(&self, order_id: &str) -> Result<Option<Order>> {
        let row: Option<OrderRow> = sqlx::query_as(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE order_id = $1"
        ))
        .bind(order_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("find order by identifier", e))?;

        match row {
            Some(row) => {
                let mut images = self.load_images(&[row.id]).await?;
                let own = images.remove(&row.id).unwrap_or_default();
                row.into_order(own).map(Some)
            }
            None => Ok(None),
        }
    }

    async fn list(&self, filter: &OrderFilter, page: PageRequest) -> Result<OrderPage> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM orders");
        push_filters(&mut count, filter);
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| db_error("count orders", e))?;

        let mut query = QueryBuilder::<Postgres>::new(format!("SELECT {ORDER_COLUMNS} FROM orders"));
        push_filters(&mut query, filter);
        query
            .push(" ORDER BY created_at DESC, id DESC LIMIT ")
            .push_bind(page.limit as i64)
            .push(" OFFSET ")
            .push_bind(page.offset() as i64);
        let rows: Vec<OrderRow> = query
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error("list orders", e))?;

        let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
        let mut images = self.load_images(&ids).await?;
        let orders = rows
            .into_iter()
            .map(|row| {
                let own = images.remove(&row.id).unwrap_or_default();
                row.into_order(own)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(OrderPage {
            orders,
            total: total.max(0) as u64,
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
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("begin transaction", e))?;

        let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM orders WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| db_error("lock order", e))?;
        if exists.is_none() {
            return Err(CustomFlowError::not_found("order", id.to_string()));
        }

        let clash: Option<i64> =
            sqlx::query_scalar("SELECT id FROM orders WHERE order_id = $1 AND id <> $2")
                .bind(&fields.order_id)
                .bind(id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| db_error("check order identifier", e))?;
        if clash.is_some() {
            return Err(duplicate(&fields.order_id));
        }

        sqlx::query(
            "UPDATE orders SET order_id = $1, customer_name = $2, source = $3, phone_number = $4, \
             length = $5, width = $6, thickness = $7, corner_style = $8, notes = $9, \
             special_notes = $10, updated_at = NOW() WHERE id = $11",
        )
        .bind(&fields.order_id)
        .bind(&fields.customer_name)
        .bind(fields.source.as_ref())
        .bind(&fields.phone_number)
        .bind(fields.length)
        .bind(fields.width)
        .bind(fields.thickness.as_ref())
        .bind(fields.corner_style.as_ref())
        .bind(&fields.notes)
        .bind(&fields.special_notes)
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                duplicate(&fields.order_id)
            } else {
                db_error("update order", e)
            }
        })?;

        if let Some(images) = images {
            sqlx::query("DELETE FROM order_images WHERE order_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(|e| db_error("delete order images", e))?;
            Self::insert_images(&mut tx, id, images).await?;
        }

        tx.commit()
            .await
            .map_err(|e| db_error("commit order update", e))?;
        self.get(id).await
    }

    async fn update_status(&self, id: i64, status: OrderStatus) -> Result<Order> {
        let result = sqlx::query("UPDATE orders SET status = $1, updated_at = NOW() WHERE id = $2")
            .bind(status.as_ref())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("update order status", e))?;
        if result.rows_affected() == 0 {
            return Err(CustomFlowError::not_found("order", id.to_string()));
        }
        self.get(id).await
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("begin transaction", e))?;

        sqlx::query("DELETE FROM order_images WHERE order_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("delete order images", e))?;
        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("delete order", e))?;
        if result.rows_affected() == 0 {
            return Err(CustomFlowError::not_found("order", id.to_string()));
        }

        tx.commit()
            .await
            .map_err(|e| db_error("commit order delete", e))
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(|e| db_error("ping", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("acme"), "%acme%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
    }

    #[test]
    fn test_filters_bind_status_and_search() {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM orders");
        push_filters(
            &mut builder,
            &OrderFilter::new(Some(OrderStatus::Done), Some("acme".to_string())),
        );
        assert_eq!(
            builder.sql(),
            "SELECT COUNT(*) FROM orders WHERE TRUE AND status = $1 \
             AND (order_id ILIKE $2 OR customer_name ILIKE $3)"
        );
    }

    #[test]
    fn test_row_with_unknown_enum_is_storage_error() {
        let row = OrderRow {
            id: 1,
            order_id: "ORD-1".to_string(),
            customer_name: String::new(),
            source: "fax".to_string(),
            phone_number: String::new(),
            length: 1.0,
            width: 1.0,
            thickness: "3mm".to_string(),
            corner_style: "sharp".to_string(),
            notes: String::new(),
            special_notes: String::new(),
            status: "new".to_string(),
            created_by: 1,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(matches!(
            row.into_order(Vec::new()),
            Err(CustomFlowError::Storage(_))
        ));
    }
}
