use std::env;
use std::fmt;

/// Top-level configuration for the fare engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub pricing: PricingConfig,
    pub telemetry: TelemetryConfig,
}

impl EngineConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let currency = env::var("FARE_CURRENCY").unwrap_or_else(|_| "INR".to_string());
        if currency.trim().is_empty() {
            return Err(ConfigError::EmptyCurrency);
        }

        let display_scale = env::var("FARE_DISPLAY_SCALE")
            .unwrap_or_else(|_| "2".to_string())
            .parse::<u32>()
            .map_err(|_| ConfigError::InvalidDisplayScale)?;
        if display_scale > MAX_DISPLAY_SCALE {
            return Err(ConfigError::InvalidDisplayScale);
        }

        let log_level = env::var("FARE_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            pricing: PricingConfig {
                currency,
                display_scale,
            },
            telemetry: TelemetryConfig { log_level },
        })
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            pricing: PricingConfig::default(),
            telemetry: TelemetryConfig {
                log_level: "info".to_string(),
            },
        }
    }
}

const MAX_DISPLAY_SCALE: u32 = 6;

/// Settings controlling fare presentation.
#[derive(Debug, Clone)]
pub struct PricingConfig {
    pub currency: String,
    pub display_scale: u32,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            currency: "INR".to_string(),
            display_scale: 2,
        }
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    EmptyCurrency,
    InvalidDisplayScale,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::EmptyCurrency => write!(f, "FARE_CURRENCY must not be blank"),
            ConfigError::InvalidDisplayScale => {
                write!(
                    f,
                    "FARE_DISPLAY_SCALE must be a whole number no greater than {MAX_DISPLAY_SCALE}"
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {}
