//! Service configuration from the environment
//!
//! Credentials are required up front; a missing one stops startup instead
//! of surfacing later as malformed Cloud API requests.

use std::time::Duration;
use thiserror::Error;

const DEFAULT_API_BASE_URL: &str = "https://graph.facebook.com";
const DEFAULT_API_VERSION: &str = "v21.0";
const DEFAULT_PORT: u16 = 8000;
const DEFAULT_FALLBACK_CURRENCY: &str = "INR";
const DEFAULT_PAYMENT_PROMPT_DELAY_MS: u64 = 2000;
const DEFAULT_GATEWAY_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value {value:?} for {var}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Everything the service needs to start
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub gateway: GatewayConfig,
    pub webhook: WebhookConfig,
    pub conversation: ConversationSettings,
}

/// Cloud API send endpoint and credentials
#[derive(Clone)]
pub struct GatewayConfig {
    pub access_token: String,
    pub phone_number_id: String,
    pub base_url: String,
    pub api_version: String,
    pub timeout: Duration,
}

// Keep the token out of logs
impl std::fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("access_token", &"<redacted>")
            .field("phone_number_id", &self.phone_number_id)
            .field("base_url", &self.base_url)
            .field("api_version", &self.api_version)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Webhook subscription verification and payload signing secrets
#[derive(Clone, Default)]
pub struct WebhookConfig {
    pub verify_token: String,
    /// App secret for `X-Hub-Signature-256`; signature checks are off without it
    pub app_secret: Option<String>,
}

impl std::fmt::Debug for WebhookConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookConfig")
            .field("verify_token", &"<redacted>")
            .field("app_secret", &self.app_secret.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Knobs of the ordering conversation
#[derive(Debug, Clone)]
pub struct ConversationSettings {
    /// Currency used for orders without line items
    pub fallback_currency: String,
    /// Gap between the order summary and the payment prompt
    pub payment_prompt_delay: Duration,
    pub catalog_thumbnail_product_id: Option<String>,
}

impl Default for ConversationSettings {
    fn default() -> Self {
        Self {
            fallback_currency: DEFAULT_FALLBACK_CURRENCY.to_string(),
            payment_prompt_delay: Duration::from_millis(DEFAULT_PAYMENT_PROMPT_DELAY_MS),
            catalog_thumbnail_product_id: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from any variable lookup (the environment in production)
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Blank values count as unset
        let get = |var: &str| lookup(var).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let require = |var: &'static str| get(var).ok_or(ConfigError::Missing(var));

        let gateway = GatewayConfig {
            access_token: require("WHATSAPP_ACCESS_TOKEN")?,
            phone_number_id: require("WHATSAPP_PHONE_NUMBER_ID")?,
            base_url: get("WHATSAPP_API_BASE_URL")
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
            api_version: get("WHATSAPP_API_VERSION")
                .unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
            timeout: Duration::from_secs(parse_or(
                "ORDERLINE_GATEWAY_TIMEOUT_SECS",
                get("ORDERLINE_GATEWAY_TIMEOUT_SECS"),
                DEFAULT_GATEWAY_TIMEOUT_SECS,
            )?),
        };

        if gateway.timeout.is_zero() {
            return Err(ConfigError::Invalid {
                var: "ORDERLINE_GATEWAY_TIMEOUT_SECS",
                value: "0".to_string(),
                reason: "timeout must be at least one second".to_string(),
            });
        }

        if !gateway.base_url.starts_with("http://") && !gateway.base_url.starts_with("https://") {
            return Err(ConfigError::Invalid {
                var: "WHATSAPP_API_BASE_URL",
                value: gateway.base_url,
                reason: "expected an http(s) URL".to_string(),
            });
        }

        let webhook = WebhookConfig {
            verify_token: require("WHATSAPP_VERIFY_TOKEN")?,
            app_secret: get("WHATSAPP_APP_SECRET"),
        };

        let fallback_currency = get("ORDERLINE_FALLBACK_CURRENCY")
            .unwrap_or_else(|| DEFAULT_FALLBACK_CURRENCY.to_string())
            .to_uppercase();
        if fallback_currency.len() != 3 || !fallback_currency.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ConfigError::Invalid {
                var: "ORDERLINE_FALLBACK_CURRENCY",
                value: fallback_currency,
                reason: "expected a three-letter currency code".to_string(),
            });
        }

        let conversation = ConversationSettings {
            fallback_currency,
            payment_prompt_delay: Duration::from_millis(parse_or(
                "ORDERLINE_PAYMENT_PROMPT_DELAY_MS",
                get("ORDERLINE_PAYMENT_PROMPT_DELAY_MS"),
                DEFAULT_PAYMENT_PROMPT_DELAY_MS,
            )?),
            catalog_thumbnail_product_id: get("WHATSAPP_CATALOG_THUMBNAIL_PRODUCT_ID"),
        };

        Ok(Self {
            port: parse_or("ORDERLINE_PORT", get("ORDERLINE_PORT"), DEFAULT_PORT)?,
            gateway,
            webhook,
            conversation,
        })
    }
}

fn parse_or<T>(var: &'static str, value: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        None => Ok(default),
        Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
            var,
            reason: e.to_string(),
            value: raw,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |var| map.get(var).cloned()
    }

    fn required() -> Vec<(&'static str, &'static str)> {
        vec![
            ("WHATSAPP_ACCESS_TOKEN", "tok-secret-1"),
            ("WHATSAPP_VERIFY_TOKEN", "verify-secret-2"),
            ("WHATSAPP_PHONE_NUMBER_ID", "10987"),
        ]
    }

    #[test]
    fn defaults_apply() {
        let config = Config::from_lookup(lookup_from(&required())).unwrap();
        assert_eq!(config.port, 8000);
        assert_eq!(config.gateway.base_url, "https://graph.facebook.com");
        assert_eq!(config.gateway.api_version, "v21.0");
        assert_eq!(config.gateway.timeout, Duration::from_secs(30));
        assert_eq!(config.webhook.verify_token, "verify-secret-2");
        assert!(config.webhook.app_secret.is_none());
        assert_eq!(config.conversation.fallback_currency, "INR");
        assert_eq!(config.conversation.payment_prompt_delay, Duration::from_secs(2));
        assert!(config.conversation.catalog_thumbnail_product_id.is_none());
    }

    #[test]
    fn each_credential_is_required() {
        for missing in ["WHATSAPP_ACCESS_TOKEN", "WHATSAPP_VERIFY_TOKEN", "WHATSAPP_PHONE_NUMBER_ID"] {
            let pairs: Vec<_> = required().into_iter().filter(|(k, _)| *k != missing).collect();
            let err = Config::from_lookup(lookup_from(&pairs)).unwrap_err();
            assert_eq!(err, ConfigError::Missing(missing));
        }
    }

    #[test]
    fn blank_credential_counts_as_missing() {
        let mut pairs = required();
        pairs[0] = ("WHATSAPP_ACCESS_TOKEN", "   ");
        let err = Config::from_lookup(lookup_from(&pairs)).unwrap_err();
        assert_eq!(err, ConfigError::Missing("WHATSAPP_ACCESS_TOKEN"));
    }

    #[test]
    fn overrides_are_read() {
        let mut pairs = required();
        pairs.extend([
            ("WHATSAPP_APP_SECRET", "shh"),
            ("WHATSAPP_API_BASE_URL", "http://localhost:9999"),
            ("WHATSAPP_API_VERSION", "v19.0"),
            ("WHATSAPP_CATALOG_THUMBNAIL_PRODUCT_ID", "sku-1"),
            ("ORDERLINE_PORT", "9000"),
            ("ORDERLINE_FALLBACK_CURRENCY", "usd"),
            ("ORDERLINE_PAYMENT_PROMPT_DELAY_MS", "0"),
        ]);
        let config = Config::from_lookup(lookup_from(&pairs)).unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.gateway.base_url, "http://localhost:9999");
        assert_eq!(config.gateway.api_version, "v19.0");
        assert_eq!(config.webhook.app_secret.as_deref(), Some("shh"));
        assert_eq!(config.conversation.fallback_currency, "USD");
        assert_eq!(config.conversation.payment_prompt_delay, Duration::ZERO);
        assert_eq!(
            config.conversation.catalog_thumbnail_product_id.as_deref(),
            Some("sku-1")
        );
    }

    #[test]
    fn bad_number_is_rejected() {
        let mut pairs = required();
        pairs.push(("ORDERLINE_PORT", "eighty"));
        let err = Config::from_lookup(lookup_from(&pairs)).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "ORDERLINE_PORT", .. }));
    }

    #[test]
    fn zero_gateway_timeout_is_rejected() {
        let mut pairs = required();
        pairs.push(("ORDERLINE_GATEWAY_TIMEOUT_SECS", "0"));
        let err = Config::from_lookup(lookup_from(&pairs)).unwrap_err();
        assert_eq!(
            err,
            ConfigError::Invalid {
                var: "ORDERLINE_GATEWAY_TIMEOUT_SECS",
                value: "0".to_string(),
                reason: "timeout must be at least one second".to_string(),
            }
        );

        let mut pairs = required();
        pairs.push(("ORDERLINE_GATEWAY_TIMEOUT_SECS", "5"));
        let config = Config::from_lookup(lookup_from(&pairs)).unwrap();
        assert_eq!(config.gateway.timeout, Duration::from_secs(5));
    }

    #[test]
    fn bad_currency_is_rejected() {
        let mut pairs = required();
        pairs.push(("ORDERLINE_FALLBACK_CURRENCY", "rupees"));
        let err = Config::from_lookup(lookup_from(&pairs)).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid { var: "ORDERLINE_FALLBACK_CURRENCY", .. }
        ));
    }

    #[test]
    fn debug_redacts_secrets() {
        let mut pairs = required();
        pairs.push(("WHATSAPP_APP_SECRET", "shh"));
        let config = Config::from_lookup(lookup_from(&pairs)).unwrap();
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("tok-secret-1"));
        assert!(!rendered.contains("verify-secret-2"));
        assert!(!rendered.contains("shh"));
    }
}
