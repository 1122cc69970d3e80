//! CLI configuration shared across subcommands.

use std::time::Duration;

use clap::Args;
use storefront_app::{
    database::PoolSettings,
    domain::orders::{
        WorkflowSettings, aggregate::CustomizationPolicy, loyalty::LoyaltyPolicy,
        status::TransitionPolicy,
    },
    retry::RetryPolicy,
};

/// Log output format.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    /// Compact, human-readable logs.
    Compact,

    /// Structured JSON logs.
    Json,
}

/// Logging settings.
#[derive(Debug, Args)]
pub(crate) struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RUST_LOG", default_value = "warn", global = true)]
    pub log_level: String,

    /// Log format (compact, json)
    #[arg(
        long,
        env = "LOG_FORMAT",
        value_enum,
        default_value_t = LogFormat::Compact,
        global = true
    )]
    pub log_format: LogFormat,
}

/// Database settings.
#[derive(Debug, Args)]
pub(crate) struct DatabaseConfig {
    /// `PostgreSQL` connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: String,

    /// Maximum pooled connections
    #[arg(long, env = "DATABASE_MAX_CONNECTIONS", default_value_t = 10)]
    pub database_max_connections: u32,

    /// Seconds to wait for a pooled connection
    #[arg(long, env = "DATABASE_ACQUIRE_TIMEOUT_SECONDS", default_value_t = 5)]
    pub database_acquire_timeout_seconds: u64,
}

impl DatabaseConfig {
    pub(crate) fn pool_settings(&self) -> PoolSettings {
        PoolSettings {
            max_connections: self.database_max_connections,
            acquire_timeout: Duration::from_secs(self.database_acquire_timeout_seconds),
        }
    }
}

/// Which status changes the workflow accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub(crate) enum TransitionMode {
    /// Follow the order lifecycle.
    Enforced,

    /// Accept any known status.
    Unrestricted,
}

/// Order workflow settings.
#[derive(Debug, Args)]
pub(crate) struct WorkflowConfig {
    /// Attempts per checkout before giving up on transient failures
    #[arg(long, env = "CHECKOUT_MAX_ATTEMPTS", default_value_t = 3)]
    pub checkout_max_attempts: u32,

    /// Upper bound for one checkout transaction, in milliseconds
    #[arg(long, env = "CHECKOUT_TRANSACTION_TIMEOUT_MS", default_value_t = 5_000)]
    pub checkout_transaction_timeout_ms: u64,

    /// Minor currency units per loyalty point
    #[arg(long, env = "LOYALTY_AMOUNT_PER_POINT", default_value_t = 1_000)]
    pub loyalty_amount_per_point: u64,

    /// Status transition mode (enforced, unrestricted)
    #[arg(
        long,
        env = "ORDER_TRANSITIONS",
        value_enum,
        default_value_t = TransitionMode::Enforced
    )]
    pub order_transitions: TransitionMode,

    /// Reject customizations the bicycle does not offer
    #[arg(long, env = "VALIDATE_CUSTOMIZATIONS", default_value_t = false)]
    pub validate_customizations: bool,
}

impl WorkflowConfig {
    pub(crate) fn settings(&self) -> WorkflowSettings {
        WorkflowSettings {
            retry: RetryPolicy {
                max_attempts: self.checkout_max_attempts.max(1),
                ..RetryPolicy::default()
            },
            loyalty: LoyaltyPolicy {
                amount_per_point: self.loyalty_amount_per_point,
            },
            transitions: match self.order_transitions {
                TransitionMode::Enforced => TransitionPolicy::Enforced,
                TransitionMode::Unrestricted => TransitionPolicy::Unrestricted,
            },
            customizations: if self.validate_customizations {
                CustomizationPolicy::Validated
            } else {
                CustomizationPolicy::Unchecked
            },
            transaction_timeout: Duration::from_millis(self.checkout_transaction_timeout_ms),
        }
    }
}
