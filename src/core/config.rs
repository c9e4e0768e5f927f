/*!
 * File Subsystem Configuration
 * Table capacities and the reserved standard streams
 */

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

use super::data_structures::InlineString;
use super::limits::{CONSOLE_DEVICE, FD_MAX, OPEN_MAX};
use super::types::Fd;
use crate::vfs::AccessMode;

/// Configuration errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} must be greater than zero")]
    ZeroCapacity { name: &'static str },

    #[error("{streams} standard streams do not fit in {slots} open-file slots")]
    TooManyStreams { streams: usize, slots: usize },

    #[error("standard stream fd {fd} outside [0, {fd_max})")]
    StreamOutOfRange { fd: Fd, fd_max: usize },

    #[error("standard stream fd {0} configured twice")]
    DuplicateStream(Fd),

    #[error("invalid value for {var}: {value}")]
    BadEnv { var: &'static str, value: String },

    #[error("invalid configuration document: {0}")]
    Parse(String),
}

/// A console record reserved at start-up and attached to every process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StdStream {
    pub fd: Fd,
    pub access: AccessMode,
}

impl StdStream {
    pub const fn new(fd: Fd, access: AccessMode) -> Self {
        Self { fd, access }
    }
}

/// File subsystem configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FsConfig {
    /// Descriptors per process
    pub fd_max: usize,
    /// Kernel-wide open-file records
    pub open_max: usize,
    /// Device opened for the standard streams
    pub console_device: InlineString,
    /// Reserved console records, in slot order
    pub std_streams: Vec<StdStream>,
}

impl Default for FsConfig {
    fn default() -> Self {
        Self {
            fd_max: FD_MAX,
            open_max: OPEN_MAX,
            console_device: CONSOLE_DEVICE.into(),
            std_streams: vec![
                StdStream::new(0, AccessMode::ReadOnly),
                StdStream::new(1, AccessMode::WriteOnly),
                StdStream::new(2, AccessMode::WriteOnly),
            ],
        }
    }
}

impl FsConfig {
    /// Defaults overlaid with `KERNEL_FD_MAX` and `KERNEL_OPEN_MAX`
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(fd_max) = env_usize("KERNEL_FD_MAX")? {
            config.fd_max = fd_max;
        }
        if let Some(open_max) = env_usize("KERNEL_OPEN_MAX")? {
            config.open_max = open_max;
        }
        config.validate()?;
        Ok(config)
    }

    /// Parse a JSON document; absent fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Configuration without standard streams
    pub fn without_std_streams(mut self) -> Self {
        self.std_streams.clear();
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fd_max == 0 {
            return Err(ConfigError::ZeroCapacity { name: "fd_max" });
        }
        if self.open_max == 0 {
            return Err(ConfigError::ZeroCapacity { name: "open_max" });
        }
        if self.std_streams.len() > self.open_max {
            return Err(ConfigError::TooManyStreams {
                streams: self.std_streams.len(),
                slots: self.open_max,
            });
        }

        let mut seen = HashSet::with_capacity(self.std_streams.len());
        for stream in &self.std_streams {
            if usize::try_from(stream.fd).map_or(true, |fd| fd >= self.fd_max) {
                return Err(ConfigError::StreamOutOfRange {
                    fd: stream.fd,
                    fd_max: self.fd_max,
                });
            }
            if !seen.insert(stream.fd) {
                return Err(ConfigError::DuplicateStream(stream.fd));
            }
        }
        Ok(())
    }
}

fn env_usize(var: &'static str) -> Result<Option<usize>, ConfigError> {
    match std::env::var(var) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::BadEnv { var, value }),
        Err(_) => Ok(None),
    }
}
