//! Order Repository

use super::RepoResult;
use shared::models::{Order, OrderCreate, OrderStatus};
use sqlx::PgConnection;
use sqlx::postgres::PgExecutor;
use sqlx::types::Json;

const ORDER_SELECT: &str = "SELECT id, order_code, command_id, user_id, package_id, title, order_type, status, execution_date, execution_duration, delivery_date, picking_hours, delivery_type, capacity_kg, merchant_id, merchant_payment_status, user_kg, delivery_cost, merchant_kg_cost, merchant_total_cost, total_cost, margin, customer_order_kg_price, customer_order_initial_price, customer_order_final_price, customer_fees_to_pay, addons, invoice_id, command_execution_index, order_execution_index, created_at, updated_at FROM orders";

pub async fn find_by_id<'e>(ex: impl PgExecutor<'e>, id: i64) -> RepoResult<Option<Order>> {
    let order = sqlx::query_as::<_, Order>(&format!("{ORDER_SELECT} WHERE id = $1"))
        .bind(id)
        .fetch_optional(ex)
        .await?;
    Ok(order)
}

pub async fn find_by_code<'e>(
    ex: impl PgExecutor<'e>,
    code: &str,
    status: OrderStatus,
) -> RepoResult<Option<Order>> {
    let order = sqlx::query_as::<_, Order>(&format!(
        "{ORDER_SELECT} WHERE order_code = $1 AND status = $2 ORDER BY id DESC LIMIT 1"
    ))
    .bind(code)
    .bind(status)
    .fetch_optional(ex)
    .await?;
    Ok(order)
}

pub async fn find_by_command<'e>(ex: impl PgExecutor<'e>, command_id: i64) -> RepoResult<Vec<Order>> {
    let orders = sqlx::query_as::<_, Order>(&format!(
        "{ORDER_SELECT} WHERE command_id = $1 ORDER BY command_execution_index, order_execution_index"
    ))
    .bind(command_id)
    .fetch_all(ex)
    .await?;
    Ok(orders)
}

/// Row-locked read, held until the surrounding transaction ends
pub async fn lock_by_id(conn: &mut PgConnection, id: i64) -> RepoResult<Option<Order>> {
    let order = sqlx::query_as::<_, Order>(&format!("{ORDER_SELECT} WHERE id = $1 FOR UPDATE"))
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(order)
}

pub async fn insert(conn: &mut PgConnection, data: &OrderCreate, now: i64) -> RepoResult<Order> {
    let order = sqlx::query_as::<_, Order>(
        r#"
        INSERT INTO orders (
            command_id, user_id, package_id, title, order_type, status,
            execution_date, execution_duration, delivery_date, picking_hours, delivery_type,
            capacity_kg, delivery_cost, merchant_kg_cost, customer_order_kg_price,
            customer_order_initial_price, addons, command_execution_index, order_execution_index,
            created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, 'CREATED', $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $19)
        RETURNING *
        "#,
    )
    .bind(data.command_id)
    .bind(data.user_id)
    .bind(data.package_id)
    .bind(&data.title)
    .bind(data.order_type)
    .bind(data.execution_date)
    .bind(data.execution_duration)
    .bind(data.delivery_date)
    .bind(Json(&data.picking_hours))
    .bind(&data.delivery_type)
    .bind(data.capacity_kg)
    .bind(data.delivery_cost)
    .bind(data.merchant_kg_cost)
    .bind(data.customer_order_kg_price)
    .bind(data.customer_order_initial_price)
    .bind(Json(&data.addons))
    .bind(data.command_execution_index)
    .bind(data.order_execution_index)
    .bind(now)
    .fetch_one(conn)
    .await?;
    Ok(order)
}

/// Write back every mutable column of an order
pub async fn update(conn: &mut PgConnection, order: &Order) -> RepoResult<()> {
    sqlx::query(
        r#"
        UPDATE orders SET
            order_code = $2, status = $3, merchant_id = $4, merchant_payment_status = $5,
            user_kg = $6, delivery_cost = $7, merchant_kg_cost = $8, merchant_total_cost = $9,
            total_cost = $10, margin = $11, customer_order_kg_price = $12,
            customer_order_initial_price = $13, customer_order_final_price = $14,
            customer_fees_to_pay = $15, addons = $16, invoice_id = $17, updated_at = $18
        WHERE id = $1
        "#,
    )
    .bind(order.id)
    .bind(&order.order_code)
    .bind(order.status)
    .bind(order.merchant_id)
    .bind(order.merchant_payment_status)
    .bind(order.user_kg)
    .bind(order.delivery_cost)
    .bind(order.merchant_kg_cost)
    .bind(order.merchant_total_cost)
    .bind(order.total_cost)
    .bind(order.margin)
    .bind(order.customer_order_kg_price)
    .bind(order.customer_order_initial_price)
    .bind(order.customer_order_final_price)
    .bind(order.customer_fees_to_pay)
    .bind(Json(&order.addons))
    .bind(order.invoice_id)
    .bind(order.updated_at)
    .execute(conn)
    .await?;
    Ok(())
}
