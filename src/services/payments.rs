//! Booking payment saga.
//!
//! The payment transaction insert is the only step that gates the HTTP
//! response: the provider retries on non-2xx and retries are idempotent.
//! Ledger and booking writes are secondary; their failures are captured as
//! warnings for observability and never undo the committed primary record.

use bigdecimal::BigDecimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::models::{NewPaymentTransaction, PaymentTransaction, TransactionType};
use crate::db::queries;
use crate::domain::booking::PaymentOutcome;
use crate::domain::event::{amount_from_minor, ChargeData};
use crate::domain::ledger;
use crate::domain::plans;
use crate::error::AppError;

#[derive(Debug)]
pub struct ProcessedPayment {
    pub transaction: PaymentTransaction,
    pub created: bool,
    /// Secondary effects that failed or were skipped. Returned in the
    /// response body for observability; never request-fatal.
    pub warnings: Vec<String>,
}

pub async fn process_booking_payment(
    pool: &PgPool,
    default_commission_rate: &BigDecimal,
    data: &ChargeData,
    business_id: Uuid,
) -> Result<ProcessedPayment, AppError> {
    let gross = amount_from_minor(data.amount);
    let booking_id = data.metadata.booking_id;

    let recorded = queries::record_payment(
        pool,
        &NewPaymentTransaction {
            reference: data.reference.clone(),
            amount: gross.clone(),
            currency: data.currency.clone(),
            payment_method: data.channel.clone(),
            transaction_type: TransactionType::BookingPayment,
            business_id,
            booking_id,
            subscription_id: None,
            metadata: serde_json::json!({ "channel": data.channel.clone() }),
        },
    )
    .await?;

    if !recorded.created {
        tracing::info!(
            reference = %data.reference,
            "duplicate delivery for settled payment, skipping downstream effects"
        );
        return Ok(ProcessedPayment {
            transaction: recorded.transaction,
            created: false,
            warnings: Vec::new(),
        });
    }

    let mut warnings = Vec::new();

    let commission_rate =
        commission_rate_for_business(pool, business_id, default_commission_rate, &mut warnings)
            .await;

    // A rate at or above 1 is a misconfigured catalog or environment. The
    // primary record is already durable, so fail the request loudly and let
    // reconciliation pick the ledger up once the rate is fixed.
    let split = ledger::split(&gross, &commission_rate)
        .map_err(|e| AppError::Configuration(e.to_string()))?;

    let (payer_email, payer_phone) = match &data.customer {
        Some(c) => (c.email.as_deref(), c.phone.as_deref()),
        None => (None, None),
    };
    if let Err(e) = queries::insert_ledger_entry(
        pool,
        business_id,
        booking_id,
        &gross,
        &split.fee,
        &split.net,
        payer_email,
        payer_phone,
    )
    .await
    {
        tracing::error!(reference = %data.reference, error = %e, "ledger entry write failed");
        warnings.push(format!("ledger entry not recorded: {}", e));
    }

    match booking_id {
        Some(id) => match queries::apply_booking_payment_outcome(pool, id, PaymentOutcome::Success)
            .await
        {
            Ok(0) => {
                // Booking deleted or already settled; the payment record
                // stays authoritative either way.
                tracing::warn!(booking_id = %id, "booking missing or already settled");
                warnings.push(format!("booking {} missing or already settled", id));
            }
            Ok(_) => {
                tracing::info!(booking_id = %id, "booking confirmed after payment");
            }
            Err(e) => {
                tracing::error!(booking_id = %id, error = %e, "booking update failed");
                warnings.push(format!("booking {} not updated: {}", id, e));
            }
        },
        None => {
            warnings.push("no bookingId in event metadata; no booking updated".to_string());
        }
    }

    Ok(ProcessedPayment {
        transaction: recorded.transaction,
        created: true,
        warnings,
    })
}

/// Marks the booking's payment attempt failed. Guarded so a booking that
/// already settled never regresses on a stale failure event.
pub async fn process_booking_payment_failure(
    pool: &PgPool,
    booking_id: Uuid,
) -> Result<u64, AppError> {
    let rows = queries::apply_booking_payment_outcome(pool, booking_id, PaymentOutcome::Failure)
        .await?;
    if rows == 0 {
        tracing::info!(booking_id = %booking_id, "failure event ignored, booking not awaiting payment");
    }
    Ok(rows)
}

/// Commission rate from the business's active subscription plan, falling
/// back to the platform default when there is no active plan or the lookup
/// fails.
async fn commission_rate_for_business(
    pool: &PgPool,
    business_id: Uuid,
    default_rate: &BigDecimal,
    warnings: &mut Vec<String>,
) -> BigDecimal {
    match queries::active_plan_for_business(pool, business_id).await {
        Ok(Some(plan_type)) => match plans::limits_for_plan(&plan_type) {
            Some(limits) => limits.commission_rate.clone(),
            None => {
                tracing::warn!(%business_id, plan_type = %plan_type, "active plan missing from catalog");
                warnings.push(format!(
                    "plan '{}' not in catalog; default commission applied",
                    plan_type
                ));
                default_rate.clone()
            }
        },
        Ok(None) => default_rate.clone(),
        Err(e) => {
            tracing::error!(%business_id, error = %e, "commission lookup failed");
            warnings.push(format!(
                "commission lookup failed ({}); default rate applied",
                e
            ));
            default_rate.clone()
        }
    }
}
