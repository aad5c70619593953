use thiserror::Error;

use crate::config::ConfigError;

#[derive(Error, Debug)]
pub enum SizingError {
    #[error("Invalid sizing request: {field}: {message}")]
    Validation { field: String, message: String },

    #[error(
        "No suitable instance: requires {required_vcpu} vCPU, {ram_bytes} bytes of RAM and {storage_bytes} bytes of storage"
    )]
    NoSuitableInstance {
        required_vcpu: u32,
        ram_bytes: u64,
        storage_bytes: u64,
    },

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

impl SizingError {
    pub(crate) fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        SizingError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SizingError>;
