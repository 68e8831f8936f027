use crate::locations::LocationAllowList;
use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

pub const DEFAULT_PORT: u16 = 8000;

#[derive(Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("Port cannot be 0")]
    InvalidPort,

    #[error("Admin listener cannot share the main listener address {0}")]
    ListenerConflict(String),

    #[error("Location allow-list is empty")]
    EmptyLocations,

    #[error("Empty location in allow-list")]
    EmptyLocation,
}

/// Review service configuration
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct Config {
    /// Listener serving review reads and writes
    #[serde(default)]
    pub listener: Listener,
    /// Optional listener for `/health` and `/ready`
    pub admin_listener: Option<Listener>,
    /// Overrides the built-in location allow-list
    pub locations: Option<Vec<String>>,
    /// JSON file of reviews appended to the store at startup
    pub seed_file: Option<PathBuf>,
}

impl Config {
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.listener.validate()?;

        if let Some(admin) = &self.admin_listener {
            admin.validate()?;
            if admin.port == self.listener.port && admin.host == self.listener.host {
                return Err(ValidationError::ListenerConflict(format!(
                    "{}:{}",
                    admin.host, admin.port
                )));
            }
        }

        if let Some(locations) = &self.locations {
            if locations.is_empty() {
                return Err(ValidationError::EmptyLocations);
            }
            if locations.iter().any(|l| l.trim().is_empty()) {
                return Err(ValidationError::EmptyLocation);
            }
        }

        Ok(())
    }

    /// The allow-list the service runs with, fixed for its lifetime.
    pub fn allow_list(&self) -> LocationAllowList {
        match &self.locations {
            Some(locations) => LocationAllowList::new(locations.iter().cloned()),
            None => LocationAllowList::default(),
        }
    }
}

/// Network listener configuration
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Listener {
    /// Host address to bind to (e.g., "0.0.0.0" or "127.0.0.1")
    pub host: String,
    /// Port number to listen on
    pub port: u16,
}

impl Default for Listener {
    fn default() -> Self {
        Listener {
            host: "0.0.0.0".into(),
            port: DEFAULT_PORT,
        }
    }
}

impl Listener {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.port == 0 {
            return Err(ValidationError::InvalidPort);
        }
        Ok(())
    }
}
