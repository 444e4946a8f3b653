//! Invoice bookkeeping inside an order transaction

use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{Invoice, InvoiceStatus, InvoiceUpsert, Order};

use crate::db::StoreTx;
use crate::pricing::{OverweightCharge, amount_due};

/// Book an overweight / standalone charge for `order`
///
/// Settled invoices for the same order are credited, pending ones are
/// canceled, and the open invoice is updated in place (or created). The
/// order is linked to the resulting invoice.
pub async fn bill_order<T: StoreTx>(
    tx: &mut T,
    order: &mut Order,
    charge: &OverweightCharge,
    country: &str,
    now: i64,
) -> AppResult<Invoice> {
    let account = tx.find_payment_account(country).await?.ok_or_else(|| {
        AppError::with_message(
            ErrorCode::PaymentAccountNotFound,
            format!("No default payment account for country {}", country),
        )
        .with_detail("country", country)
    })?;

    let meta = order.invoice_meta();
    let prior_paid = tx
        .sum_invoices(order.user_id, &meta, InvoiceStatus::Success)
        .await?;
    let canceled = tx
        .cancel_invoices(order.user_id, &meta, InvoiceStatus::Pending, now)
        .await?;

    let amount = amount_due(charge.fees, prior_paid);
    let invoice = tx
        .upsert_invoice(
            &InvoiceUpsert {
                user_id: order.user_id,
                meta,
                amount,
                margin: charge.margin,
                status: InvoiceStatus::Created,
                invoice_type: charge.invoice_type,
                payment_account_id: account.id,
            },
            now,
        )
        .await?;

    tracing::debug!(
        order_id = order.id,
        invoice_id = invoice.id,
        %amount,
        %prior_paid,
        canceled,
        "Invoice booked"
    );

    order.invoice_id = Some(invoice.id);
    Ok(invoice)
}

/// Drop the order's current invoice unless it has been paid
///
/// Returns true when the order no longer references an invoice.
pub async fn release_invoice<T: StoreTx>(tx: &mut T, order: &mut Order) -> AppResult<bool> {
    let Some(invoice_id) = order.invoice_id else {
        return Ok(true);
    };

    match tx.find_invoice(invoice_id).await? {
        Some(invoice) if invoice.status == InvoiceStatus::Success => Ok(false),
        Some(_) => {
            tx.delete_invoice(invoice_id).await?;
            order.invoice_id = None;
            Ok(true)
        }
        None => {
            order.invoice_id = None;
            Ok(true)
        }
    }
}
