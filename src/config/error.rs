use thiserror::Error;

/// Why `AppConfig::load` gave up.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not read configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// A loaded value that the server cannot run with.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// Names the variable, without the `WIGVO__` prefix.
    #[error("WIGVO__{0} must be set")]
    MissingRequired(&'static str),

    #[error("server host/port do not form a socket address")]
    InvalidHost,

    #[error("server port must not be 0")]
    InvalidPort,

    #[error("timeout must be between 1 and 300 seconds")]
    InvalidTimeout,

    #[error("database url must start with postgres:// or postgresql://")]
    InvalidDatabaseUrl,

    #[error("redis url must start with redis:// or rediss://")]
    InvalidRedisUrl,

    #[error("database pool needs at least one connection")]
    InvalidPoolSize,

    #[error("database pool is capped at 100 connections")]
    PoolSizeTooLarge,

    #[error("model temperature must be between 0.0 and 2.0")]
    InvalidTemperature,

    #[error("{0} is out of range")]
    OutOfRange(&'static str),
}
