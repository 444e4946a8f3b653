use rust_decimal::Decimal;
use shared::error::{AppError, AppResult};

use crate::orders::OrderSettings;
use crate::pricing::PricingSettings;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// 服务器配置
///
/// # 环境变量
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | DATABASE_URL | (必填) | PostgreSQL 连接地址 |
/// | HTTP_PORT | 3000 | HTTP 服务端口 |
/// | ENVIRONMENT | development | 运行环境 |
/// | APP_KEY | (非 development 必填) | 订单编码密钥 |
/// | OPERATING_COUNTRY | BJ | 默认收款账户所在国家 |
/// | STANDALONE_MERCHANT_KG_COST | 300 | 单次订单商户每公斤基础成本 |
/// | STANDALONE_DELIVERY_COST | 500 | 单次订单配送成本 |
/// | SUBSCRIPTION_DELIVERY_DELAY_HOURS | 48 | 订阅有效期的配送缓冲(小时) |
/// | LOG_LEVEL | info | 日志级别 |
/// | LOG_DIR | - | 日志目录 (不设置则只输出到 stdout) |
/// | REQUEST_TIMEOUT_MS | 30000 | 请求超时(毫秒) |
///
/// # 示例
///
/// ```ignore
/// DATABASE_URL=postgres://localhost/laundry HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection URL
    pub database_url: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// 运行环境: development | staging | production
    pub environment: String,
    /// Secret mixed into order codes
    pub app_key: String,
    /// ISO country code used to resolve the default payment account
    pub operating_country: String,

    // === Pricing ===
    pub standalone_merchant_kg_cost: Decimal,
    pub standalone_delivery_cost: Decimal,
    pub subscription_delivery_delay_hours: i64,

    // === Runtime ===
    pub log_level: String,
    pub log_dir: Option<String>,
    /// 请求超时时间 (毫秒)
    pub request_timeout_ms: u64,
}

impl Config {
    /// Require a secret env var: must be set and non-empty in non-development environments.
    fn require_secret(name: &str, environment: &str) -> AppResult<String> {
        let val = match std::env::var(name) {
            Ok(v) => v,
            Err(_) => {
                if environment != "development" {
                    return Err(AppError::config(format!(
                        "{name} must be set in {environment} environment"
                    )));
                }
                format!("dev-{name}-not-for-production")
            }
        };
        if val.is_empty() && environment != "development" {
            return Err(AppError::config(format!(
                "{name} must not be empty in {environment} environment"
            )));
        }
        Ok(val)
    }

    fn decimal_var(name: &str, default: Decimal) -> AppResult<Decimal> {
        match std::env::var(name) {
            Ok(raw) => raw
                .trim()
                .parse::<Decimal>()
                .map_err(|e| AppError::config(format!("{name} is not a decimal ({raw}): {e}"))),
            Err(_) => Ok(default),
        }
    }

    /// 从环境变量加载配置
    pub fn from_env() -> AppResult<Self> {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());

        Ok(Self {
            database_url: std::env::var("DATABASE_URL")
                .map_err(|_| AppError::config("DATABASE_URL must be set"))?,
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            environment: environment.clone(),
            app_key: Self::require_secret("APP_KEY", &environment)?,
            operating_country: std::env::var("OPERATING_COUNTRY")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "BJ".into()),
            standalone_merchant_kg_cost: Self::decimal_var(
                "STANDALONE_MERCHANT_KG_COST",
                Decimal::from(300),
            )?,
            standalone_delivery_cost: Self::decimal_var(
                "STANDALONE_DELIVERY_COST",
                Decimal::from(500),
            )?,
            subscription_delivery_delay_hours: std::env::var("SUBSCRIPTION_DELIVERY_DELAY_HOURS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(48),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("LOG_DIR").ok().filter(|s| !s.is_empty()),
            request_timeout_ms: std::env::var("REQUEST_TIMEOUT_MS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(30000),
        })
    }

    /// 是否为开发环境
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    pub fn pricing_settings(&self) -> PricingSettings {
        PricingSettings {
            standalone_merchant_kg_cost: self.standalone_merchant_kg_cost,
            standalone_delivery_cost: self.standalone_delivery_cost,
            subscription_delivery_delay_hours: self.subscription_delivery_delay_hours,
        }
    }

    pub fn order_settings(&self) -> OrderSettings {
        OrderSettings {
            app_key: self.app_key.clone(),
            operating_country: self.operating_country.clone(),
            pricing: self.pricing_settings(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::error::ErrorCode;

    fn sample() -> Config {
        Config {
            database_url: "postgres://localhost/laundry".into(),
            http_port: 3000,
            environment: "development".into(),
            app_key: "secret".into(),
            operating_country: "BJ".into(),
            standalone_merchant_kg_cost: Decimal::from(300),
            standalone_delivery_cost: Decimal::from(500),
            subscription_delivery_delay_hours: 48,
            log_level: "info".into(),
            log_dir: None,
            request_timeout_ms: 30000,
        }
    }

    #[test]
    fn test_pricing_settings_projection() {
        let settings = sample().pricing_settings();
        assert_eq!(settings.standalone_merchant_kg_cost, Decimal::from(300));
        assert_eq!(settings.standalone_delivery_cost, Decimal::from(500));
        assert_eq!(settings.subscription_delivery_delay_hours, 48);
    }

    #[test]
    fn test_order_settings_projection() {
        let settings = sample().order_settings();
        assert_eq!(settings.app_key, "secret");
        assert_eq!(settings.operating_country, "BJ");
        assert_eq!(settings.pricing, sample().pricing_settings());
    }

    #[test]
    fn test_missing_secret_is_config_error() {
        let err = Config::require_secret("LAUNDRY_TEST_UNSET_SECRET", "production").unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigError);
        assert!(err.message.contains("LAUNDRY_TEST_UNSET_SECRET"));

        let dev = Config::require_secret("LAUNDRY_TEST_UNSET_SECRET", "development").unwrap();
        assert!(dev.starts_with("dev-"));
    }

    #[test]
    fn test_malformed_decimal_is_config_error() {
        // SAFETY: the variable name is private to this test
        unsafe { std::env::set_var("LAUNDRY_TEST_BAD_DECIMAL", "three hundred") };
        let err = Config::decimal_var("LAUNDRY_TEST_BAD_DECIMAL", Decimal::ONE).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigError);

        let fallback = Config::decimal_var("LAUNDRY_TEST_UNSET_DECIMAL", Decimal::ONE).unwrap();
        assert_eq!(fallback, Decimal::ONE);
    }

    #[test]
    fn test_is_development() {
        let mut config = sample();
        assert!(config.is_development());
        config.environment = "production".into();
        assert!(!config.is_development());
    }
}
