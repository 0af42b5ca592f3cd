//! Inbound webhook event envelope.
//!
//! Deserialized only after the signature check has passed; the signature is
//! always computed over the raw request bytes, never a reserialized form.

use bigdecimal::BigDecimal;
use serde::Deserialize;
use uuid::Uuid;

pub const CHARGE_SUCCESS: &str = "charge.success";

#[derive(Debug, Deserialize)]
pub struct WebhookEvent {
    pub event: String,
    pub data: ChargeData,
}

#[derive(Debug, Deserialize)]
pub struct ChargeData {
    pub reference: String,
    pub status: String,
    /// Minor currency units (e.g. cents); divided by 100 before storage.
    pub amount: i64,
    pub currency: String,
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub customer: Option<Customer>,
    #[serde(default)]
    pub metadata: ChargeMetadata,
}

#[derive(Debug, Deserialize)]
pub struct Customer {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChargeMetadata {
    pub business_id: Option<Uuid>,
    pub booking_id: Option<Uuid>,
    pub subscription_id: Option<Uuid>,
    pub plan_id: Option<String>,
}

/// Converts a provider amount in minor units to a 2-decimal major amount.
pub fn amount_from_minor(minor: i64) -> BigDecimal {
    BigDecimal::new(minor.into(), 2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn converts_minor_units() {
        assert_eq!(amount_from_minor(500000), BigDecimal::from_str("5000.00").unwrap());
        assert_eq!(amount_from_minor(1), BigDecimal::from_str("0.01").unwrap());
        assert_eq!(amount_from_minor(0), BigDecimal::from_str("0.00").unwrap());
    }

    #[test]
    fn parses_charge_success_envelope() {
        let body = serde_json::json!({
            "event": "charge.success",
            "data": {
                "reference": "R1",
                "status": "success",
                "amount": 500000,
                "currency": "KES",
                "channel": "card",
                "metadata": {
                    "businessId": "7f1e9c1a-64d4-4c2e-9f4e-2b6d7a8c0e11",
                    "bookingId": "11111111-2222-3333-4444-555555555555"
                }
            }
        });
        let event: WebhookEvent = serde_json::from_value(body).unwrap();
        assert_eq!(event.event, CHARGE_SUCCESS);
        assert_eq!(event.data.reference, "R1");
        assert!(event.data.metadata.business_id.is_some());
        assert!(event.data.metadata.plan_id.is_none());
    }

    #[test]
    fn metadata_defaults_when_absent() {
        let body = serde_json::json!({
            "event": "charge.success",
            "data": {
                "reference": "R2",
                "status": "success",
                "amount": 100,
                "currency": "KES"
            }
        });
        let event: WebhookEvent = serde_json::from_value(body).unwrap();
        assert!(event.data.metadata.business_id.is_none());
        assert!(event.data.customer.is_none());
    }
}
