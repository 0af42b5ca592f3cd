use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Result};
use uuid::Uuid;

use crate::db::models::{NewPaymentTransaction, PaymentTransaction, Subscription};
use crate::domain::booking::PaymentOutcome;
use crate::domain::plans::PlanLimits;

/// Outcome of the idempotent recorder: the durable row plus whether this
/// call created it.
#[derive(Debug)]
pub struct RecordedPayment {
    pub transaction: PaymentTransaction,
    pub created: bool,
}

/// Atomic insert-or-fetch keyed on the provider reference.
///
/// Concurrent duplicate deliveries race on the unique constraint, not on
/// application-level check-then-insert: `ON CONFLICT DO NOTHING` makes the
/// loser observe no returned row and fall through to fetching the winner's.
pub async fn record_payment(pool: &PgPool, new: &NewPaymentTransaction) -> Result<RecordedPayment> {
    let inserted: Option<PaymentTransaction> = sqlx::query_as(
        r#"
        INSERT INTO payment_transactions (
            id, reference, amount, currency, status, payment_method,
            transaction_type, business_id, booking_id, subscription_id, metadata,
            created_at, updated_at
        ) VALUES ($1, $2, $3, $4, 'success', $5, $6, $7, $8, $9, $10, now(), now())
        ON CONFLICT (reference) DO NOTHING
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&new.reference)
    .bind(&new.amount)
    .bind(&new.currency)
    .bind(&new.payment_method)
    .bind(new.transaction_type.as_str())
    .bind(new.business_id)
    .bind(new.booking_id)
    .bind(new.subscription_id)
    .bind(&new.metadata)
    .fetch_optional(pool)
    .await?;

    if let Some(transaction) = inserted {
        return Ok(RecordedPayment {
            transaction,
            created: true,
        });
    }

    // Duplicate delivery. Status moves forward only: a row stuck in
    // 'pending' or 'failed' is corrected by an out-of-order success retry,
    // a 'success' row is left untouched.
    let existing = sqlx::query_as::<_, PaymentTransaction>(
        r#"
        UPDATE payment_transactions
        SET status = 'success', updated_at = now()
        WHERE reference = $1 AND status <> 'success'
        RETURNING *
        "#,
    )
    .bind(&new.reference)
    .fetch_optional(pool)
    .await?;

    let transaction = match existing {
        Some(tx) => tx,
        None => find_payment_by_reference(pool, &new.reference)
            .await?
            .ok_or(sqlx::Error::RowNotFound)?,
    };

    Ok(RecordedPayment {
        transaction,
        created: false,
    })
}

pub async fn find_payment_by_reference(
    pool: &PgPool,
    reference: &str,
) -> Result<Option<PaymentTransaction>> {
    sqlx::query_as::<_, PaymentTransaction>(
        "SELECT * FROM payment_transactions WHERE reference = $1",
    )
    .bind(reference)
    .fetch_optional(pool)
    .await
}

#[allow(clippy::too_many_arguments)]
pub async fn insert_ledger_entry(
    pool: &PgPool,
    business_id: Uuid,
    booking_id: Option<Uuid>,
    gross: &BigDecimal,
    fee: &BigDecimal,
    net: &BigDecimal,
    payer_email: Option<&str>,
    payer_phone: Option<&str>,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO client_business_transactions (
            id, business_id, booking_id, gross_amount, platform_fee,
            business_amount, payer_email, payer_phone, status, created_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'success', now())
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(business_id)
    .bind(booking_id)
    .bind(gross)
    .bind(fee)
    .bind(net)
    .bind(payer_email)
    .bind(payer_phone)
    .execute(pool)
    .await?;
    Ok(())
}

/// Applies a payment outcome to a booking as a single guarded UPDATE.
///
/// Success marks the booking paid and promotes a pending booking to
/// confirmed. Failure only touches bookings still awaiting payment, so a
/// paid booking never regresses on a stale or duplicate failure event.
/// Returns the number of rows changed; 0 means the booking is missing or
/// already in the target state.
pub async fn apply_booking_payment_outcome(
    pool: &PgPool,
    booking_id: Uuid,
    outcome: PaymentOutcome,
) -> Result<u64> {
    let result = match outcome {
        PaymentOutcome::Success => {
            sqlx::query(
                r#"
                UPDATE bookings
                SET payment_status = 'paid',
                    status = CASE WHEN status = 'pending' THEN 'confirmed' ELSE status END,
                    updated_at = now()
                WHERE id = $1 AND payment_status <> 'paid'
                "#,
            )
            .bind(booking_id)
            .execute(pool)
            .await?
        }
        PaymentOutcome::Failure => {
            sqlx::query(
                r#"
                UPDATE bookings
                SET payment_status = 'failed', updated_at = now()
                WHERE id = $1 AND payment_status = 'pending'
                "#,
            )
            .bind(booking_id)
            .execute(pool)
            .await?
        }
    };
    Ok(result.rows_affected())
}

/// One active subscription per business: repeats overwrite rather than
/// duplicate.
pub async fn upsert_subscription(
    pool: &PgPool,
    business_id: Uuid,
    plan_type: &str,
    limits: &PlanLimits,
    period_end: DateTime<Utc>,
) -> Result<Subscription> {
    sqlx::query_as::<_, Subscription>(
        r#"
        INSERT INTO subscriptions (
            id, business_id, plan_type, status, current_period_end,
            staff_limit, bookings_limit, created_at, updated_at
        ) VALUES ($1, $2, $3, 'active', $4, $5, $6, now(), now())
        ON CONFLICT (business_id) DO UPDATE SET
            plan_type = EXCLUDED.plan_type,
            status = 'active',
            current_period_end = EXCLUDED.current_period_end,
            staff_limit = EXCLUDED.staff_limit,
            bookings_limit = EXCLUDED.bookings_limit,
            updated_at = now()
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(business_id)
    .bind(plan_type)
    .bind(period_end)
    .bind(limits.staff_limit)
    .bind(limits.bookings_limit)
    .fetch_one(pool)
    .await
}

/// Plan type of the business's active subscription, if any. Drives the
/// commission rate used by the ledger split.
pub async fn active_plan_for_business(pool: &PgPool, business_id: Uuid) -> Result<Option<String>> {
    sqlx::query_scalar::<_, String>(
        "SELECT plan_type FROM subscriptions WHERE business_id = $1 AND status = 'active'",
    )
    .bind(business_id)
    .fetch_optional(pool)
    .await
}

pub async fn insert_security_event(
    pool: &PgPool,
    event_type: &str,
    description: &str,
    metadata: &serde_json::Value,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO security_events (id, event_type, description, metadata, created_at)
        VALUES ($1, $2, $3, $4, now())
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(event_type)
    .bind(description)
    .bind(metadata)
    .execute(pool)
    .await?;
    Ok(())
}
