//! Catalog Repository (packages, service addons, payment accounts)

use super::RepoResult;
use rust_decimal::Decimal;
use shared::models::{AddonKind, Package, PaymentAccount, ServiceAddon};
use sqlx::postgres::PgExecutor;
use sqlx::types::Json;

#[derive(sqlx::FromRow)]
struct AddonRow {
    code: String,
    price: Decimal,
    kind: Json<AddonKind>,
}

impl From<AddonRow> for ServiceAddon {
    fn from(row: AddonRow) -> Self {
        ServiceAddon {
            code: row.code,
            price: row.price,
            kind: row.kind.0,
        }
    }
}

pub async fn find_package<'e>(ex: impl PgExecutor<'e>, id: i64) -> RepoResult<Option<Package>> {
    let package =
        sqlx::query_as::<_, Package>("SELECT id, code, name, amount, kg FROM packages WHERE id = $1")
            .bind(id)
            .fetch_optional(ex)
            .await?;
    Ok(package)
}

pub async fn find_addon<'e>(ex: impl PgExecutor<'e>, code: &str) -> RepoResult<Option<ServiceAddon>> {
    let row = sqlx::query_as::<_, AddonRow>(
        "SELECT code, price, kind FROM service_addons WHERE code = $1",
    )
    .bind(code)
    .fetch_optional(ex)
    .await?;
    Ok(row.map(ServiceAddon::from))
}

pub async fn find_default_payment_account<'e>(
    ex: impl PgExecutor<'e>,
    country: &str,
) -> RepoResult<Option<PaymentAccount>> {
    let account = sqlx::query_as::<_, PaymentAccount>(
        "SELECT id, country, label, is_default FROM payment_accounts WHERE is_default AND upper(country) = upper($1) LIMIT 1",
    )
    .bind(country)
    .fetch_optional(ex)
    .await?;
    Ok(account)
}
