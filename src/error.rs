use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("tick interval must be greater than zero")]
    ZeroTickInterval,

    #[error("step must be between 1 and 100 (got {step})")]
    StepOutOfRange { step: u8 },

    #[error("stop-at must be between 1 and 100 (got {percent})")]
    StopAtOutOfRange { percent: u8 },

    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
