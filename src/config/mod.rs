use bigdecimal::BigDecimal;
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;

/// Default platform commission applied when a business has no active
/// subscription plan.
pub const DEFAULT_COMMISSION_RATE: &str = "0.05";

#[derive(Debug, Clone)]
pub struct Config {
    pub server_port: u16,
    pub database_url: String,
    /// Shared signing secret for inbound provider webhooks. Optional so the
    /// service can boot without it; the webhook endpoint answers 500 until
    /// it is configured.
    pub webhook_secret: Option<String>,
    pub default_commission_rate: BigDecimal,
    pub rate_limit_max_requests: u32,
    pub rate_limit_window_secs: u64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Config> {
        dotenv().ok();

        let server_port = env::var("SERVER_PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(8080);

        let database_url =
            env::var("DATABASE_URL").map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?;

        let webhook_secret = env::var("WEBHOOK_SECRET").ok().filter(|s| !s.is_empty());
        if webhook_secret.is_none() {
            tracing::warn!("WEBHOOK_SECRET is not set; webhook deliveries will be rejected");
        }

        let rate = env::var("DEFAULT_COMMISSION_RATE")
            .unwrap_or_else(|_| DEFAULT_COMMISSION_RATE.to_string());
        let default_commission_rate = BigDecimal::from_str(&rate)
            .map_err(|e| anyhow::anyhow!("DEFAULT_COMMISSION_RATE is not a decimal: {}", e))?;
        validate_commission_rate(&default_commission_rate)?;

        let rate_limit_max_requests = env::var("RATE_LIMIT_MAX_REQUESTS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(50);

        let rate_limit_window_secs = env::var("RATE_LIMIT_WINDOW_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(60);

        Ok(Config {
            server_port,
            database_url,
            webhook_secret,
            default_commission_rate,
            rate_limit_max_requests,
            rate_limit_window_secs,
        })
    }
}

/// A commission rate at or above 1.0 would wipe out or invert business
/// earnings; refuse to start rather than split money incorrectly.
pub fn validate_commission_rate(rate: &BigDecimal) -> anyhow::Result<()> {
    let one = BigDecimal::from(1);
    let zero = BigDecimal::from(0);
    if rate < &zero || rate >= &one {
        anyhow::bail!("commission rate must satisfy 0 <= rate < 1, got {}", rate);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_rates_below_one() {
        validate_commission_rate(&BigDecimal::from_str("0.05").unwrap()).unwrap();
        validate_commission_rate(&BigDecimal::from_str("0").unwrap()).unwrap();
        validate_commission_rate(&BigDecimal::from_str("0.99").unwrap()).unwrap();
    }

    #[test]
    fn rejects_rates_at_or_above_one() {
        assert!(validate_commission_rate(&BigDecimal::from_str("1").unwrap()).is_err());
        assert!(validate_commission_rate(&BigDecimal::from_str("1.5").unwrap()).is_err());
    }

    #[test]
    fn rejects_negative_rates() {
        assert!(validate_commission_rate(&BigDecimal::from_str("-0.01").unwrap()).is_err());
    }
}
