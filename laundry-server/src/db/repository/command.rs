//! Command Repository

use super::RepoResult;
use shared::models::{Command, MAX_COMMAND_EXECUTIONS};
use sqlx::PgConnection;
use sqlx::postgres::PgExecutor;

const COMMAND_SELECT: &str = "SELECT id, user_id, package_id, command_type, description, order_min_price, merchant_kg_unit_cost, delivery_per_day_cost, command_kg, command_spent_kg, picking_days_times, command_start_at, last_execution_at, total_execution, addons, status, created_at, updated_at FROM commands";

pub async fn find_by_id<'e>(ex: impl PgExecutor<'e>, id: i64) -> RepoResult<Option<Command>> {
    let command = sqlx::query_as::<_, Command>(&format!("{COMMAND_SELECT} WHERE id = $1"))
        .bind(id)
        .fetch_optional(ex)
        .await?;
    Ok(command)
}

pub async fn find_materializable<'e>(ex: impl PgExecutor<'e>) -> RepoResult<Vec<i64>> {
    let ids = sqlx::query_scalar::<_, i64>(
        "SELECT id FROM commands WHERE status = 'ACTIVE' AND total_execution < $1 ORDER BY id",
    )
    .bind(MAX_COMMAND_EXECUTIONS)
    .fetch_all(ex)
    .await?;
    Ok(ids)
}

pub async fn lock_by_id(conn: &mut PgConnection, id: i64) -> RepoResult<Option<Command>> {
    let command =
        sqlx::query_as::<_, Command>(&format!("{COMMAND_SELECT} WHERE id = $1 FOR UPDATE"))
            .bind(id)
            .fetch_optional(conn)
            .await?;
    Ok(command)
}

/// Persist progress fields touched by weight reporting and materialization
pub async fn update(conn: &mut PgConnection, command: &Command) -> RepoResult<()> {
    sqlx::query(
        r#"
        UPDATE commands SET
            command_spent_kg = $2, last_execution_at = $3, total_execution = $4,
            status = $5, updated_at = $6
        WHERE id = $1
        "#,
    )
    .bind(command.id)
    .bind(command.command_spent_kg)
    .bind(command.last_execution_at)
    .bind(command.total_execution)
    .bind(command.status)
    .bind(command.updated_at)
    .execute(conn)
    .await?;
    Ok(())
}
