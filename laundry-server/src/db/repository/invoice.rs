//! Invoice Repository

use super::RepoResult;
use rust_decimal::Decimal;
use shared::models::{Invoice, InvoiceStatus, InvoiceUpsert};
use sqlx::PgConnection;
use sqlx::postgres::PgExecutor;

const INVOICE_SELECT: &str = "SELECT id, user_id, meta, amount, margin, status, invoice_type, payment_account_id, created_at, updated_at FROM invoices";

pub async fn find_by_id<'e>(ex: impl PgExecutor<'e>, id: i64) -> RepoResult<Option<Invoice>> {
    let invoice = sqlx::query_as::<_, Invoice>(&format!("{INVOICE_SELECT} WHERE id = $1"))
        .bind(id)
        .fetch_optional(ex)
        .await?;
    Ok(invoice)
}

pub async fn find_by_meta<'e>(
    ex: impl PgExecutor<'e>,
    user_id: i64,
    meta: &str,
) -> RepoResult<Vec<Invoice>> {
    let invoices = sqlx::query_as::<_, Invoice>(&format!(
        "{INVOICE_SELECT} WHERE user_id = $1 AND meta = $2 ORDER BY id"
    ))
    .bind(user_id)
    .bind(meta)
    .fetch_all(ex)
    .await?;
    Ok(invoices)
}

pub async fn sum_amount(
    conn: &mut PgConnection,
    user_id: i64,
    meta: &str,
    status: InvoiceStatus,
) -> RepoResult<Decimal> {
    let total = sqlx::query_scalar::<_, Decimal>(
        "SELECT COALESCE(SUM(amount), 0) FROM invoices WHERE user_id = $1 AND meta = $2 AND status = $3",
    )
    .bind(user_id)
    .bind(meta)
    .bind(status)
    .fetch_one(conn)
    .await?;
    Ok(total)
}

pub async fn cancel(
    conn: &mut PgConnection,
    user_id: i64,
    meta: &str,
    from: InvoiceStatus,
    now: i64,
) -> RepoResult<u64> {
    let result = sqlx::query(
        "UPDATE invoices SET status = 'CANCELED', updated_at = $4 WHERE user_id = $1 AND meta = $2 AND status = $3",
    )
    .bind(user_id)
    .bind(meta)
    .bind(from)
    .bind(now)
    .execute(conn)
    .await?;
    Ok(result.rows_affected())
}

/// Update the open invoice for `(user_id, meta)` in place, or insert one
///
/// Settled (SUCCESS) and CANCELED invoices are never rewritten.
pub async fn upsert(conn: &mut PgConnection, data: &InvoiceUpsert, now: i64) -> RepoResult<Invoice> {
    let open: Option<i64> = sqlx::query_scalar(
        r#"
        SELECT id FROM invoices
        WHERE user_id = $1 AND meta = $2 AND status IN ('CREATED', 'PENDING')
        ORDER BY id DESC LIMIT 1
        FOR UPDATE
        "#,
    )
    .bind(data.user_id)
    .bind(&data.meta)
    .fetch_optional(&mut *conn)
    .await?;

    let invoice = match open {
        Some(id) => {
            sqlx::query_as::<_, Invoice>(
                r#"
                UPDATE invoices SET
                    amount = $2, margin = $3, status = $4, invoice_type = $5,
                    payment_account_id = $6, updated_at = $7
                WHERE id = $1
                RETURNING id, user_id, meta, amount, margin, status, invoice_type, payment_account_id, created_at, updated_at
                "#,
            )
            .bind(id)
            .bind(data.amount)
            .bind(data.margin)
            .bind(data.status)
            .bind(data.invoice_type)
            .bind(data.payment_account_id)
            .bind(now)
            .fetch_one(&mut *conn)
            .await?
        }
        None => {
            sqlx::query_as::<_, Invoice>(
                r#"
                INSERT INTO invoices (user_id, meta, amount, margin, status, invoice_type, payment_account_id, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
                RETURNING id, user_id, meta, amount, margin, status, invoice_type, payment_account_id, created_at, updated_at
                "#,
            )
            .bind(data.user_id)
            .bind(&data.meta)
            .bind(data.amount)
            .bind(data.margin)
            .bind(data.status)
            .bind(data.invoice_type)
            .bind(data.payment_account_id)
            .bind(now)
            .fetch_one(&mut *conn)
            .await?
        }
    };
    Ok(invoice)
}

pub async fn delete(conn: &mut PgConnection, id: i64) -> RepoResult<bool> {
    let result = sqlx::query("DELETE FROM invoices WHERE id = $1")
        .bind(id)
        .execute(conn)
        .await?;
    Ok(result.rows_affected() > 0)
}
