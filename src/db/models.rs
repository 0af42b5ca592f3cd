//! Row types for the payment reconciliation tables.

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// One settled payment attempt, keyed by the provider-issued reference.
/// Exactly one row exists per reference; status only moves forward.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PaymentTransaction {
    pub id: Uuid,
    pub reference: String,
    pub amount: BigDecimal,
    pub currency: String,
    pub status: String,
    pub payment_method: Option<String>,
    pub transaction_type: String,
    pub business_id: Uuid,
    pub booking_id: Option<Uuid>,
    pub subscription_id: Option<Uuid>,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload for a payment transaction. The id and timestamps are
/// assigned at insert time.
#[derive(Debug, Clone)]
pub struct NewPaymentTransaction {
    pub reference: String,
    pub amount: BigDecimal,
    pub currency: String,
    pub payment_method: Option<String>,
    pub transaction_type: TransactionType,
    pub business_id: Uuid,
    pub booking_id: Option<Uuid>,
    pub subscription_id: Option<Uuid>,
    pub metadata: serde_json::Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionType {
    BookingPayment,
    SubscriptionPayment,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::BookingPayment => "booking_payment",
            TransactionType::SubscriptionPayment => "subscription_payment",
        }
    }
}

/// Business-facing earnings ledger entry derived from a payment.
/// Immutable after creation; `gross_amount = platform_fee + business_amount`.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ClientBusinessTransaction {
    pub id: Uuid,
    pub business_id: Uuid,
    pub booking_id: Option<Uuid>,
    pub gross_amount: BigDecimal,
    pub platform_fee: BigDecimal,
    pub business_amount: BigDecimal,
    pub payer_email: Option<String>,
    pub payer_phone: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Booking {
    pub id: Uuid,
    pub business_id: Uuid,
    pub payment_status: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Subscription {
    pub id: Uuid,
    pub business_id: Uuid,
    pub plan_type: String,
    pub status: String,
    pub current_period_end: Option<DateTime<Utc>>,
    pub staff_limit: i32,
    pub bookings_limit: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct SecurityEvent {
    pub id: Uuid,
    pub event_type: String,
    pub description: String,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
}
