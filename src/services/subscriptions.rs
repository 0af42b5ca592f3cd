//! Subscription purchase saga.
//!
//! Records the payment transaction, then applies the purchased plan's
//! entitlements. Activation is an upsert keyed by business id (one active
//! subscription per business), so concurrent repeats overwrite rather than
//! duplicate.

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::models::{NewPaymentTransaction, TransactionType};
use crate::db::queries;
use crate::domain::event::{amount_from_minor, ChargeData};
use crate::domain::plans;
use crate::error::AppError;
use crate::services::payments::ProcessedPayment;

pub async fn process_subscription_payment(
    pool: &PgPool,
    data: &ChargeData,
    business_id: Uuid,
    plan_id: &str,
) -> Result<ProcessedPayment, AppError> {
    let recorded = queries::record_payment(
        pool,
        &NewPaymentTransaction {
            reference: data.reference.clone(),
            amount: amount_from_minor(data.amount),
            currency: data.currency.clone(),
            payment_method: data.channel.clone(),
            transaction_type: TransactionType::SubscriptionPayment,
            business_id,
            booking_id: None,
            subscription_id: data.metadata.subscription_id,
            metadata: serde_json::json!({ "planId": plan_id, "channel": data.channel.clone() }),
        },
    )
    .await?;

    if !recorded.created {
        tracing::info!(
            reference = %data.reference,
            "duplicate subscription payment delivery, activation already applied"
        );
        return Ok(ProcessedPayment {
            transaction: recorded.transaction,
            created: false,
            warnings: Vec::new(),
        });
    }

    let mut warnings = Vec::new();

    match plans::limits_for_plan(plan_id) {
        Some(limits) => {
            let period_end = Utc::now() + plans::billing_cycle();
            match queries::upsert_subscription(pool, business_id, plan_id, limits, period_end).await
            {
                Ok(subscription) => {
                    tracing::info!(
                        %business_id,
                        plan = plan_id,
                        period_end = %subscription.current_period_end.unwrap_or(period_end),
                        "subscription activated"
                    );
                }
                Err(e) => {
                    tracing::error!(%business_id, plan = plan_id, error = %e, "subscription activation failed");
                    warnings.push(format!("subscription not activated: {}", e));
                }
            }
        }
        None => {
            tracing::warn!(%business_id, plan = plan_id, "unknown plan id in subscription payment");
            warnings.push(format!("unknown plan '{}'; subscription not activated", plan_id));
        }
    }

    Ok(ProcessedPayment {
        transaction: recorded.transaction,
        created: true,
        warnings,
    })
}
