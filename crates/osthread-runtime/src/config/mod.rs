//! osthread Configuration
//!
//! Provides compile-time defaults with runtime environment overrides.
//!
//! # Configuration Priority (highest wins)
//!
//! 1. `config::install()` called before the first thread is started
//! 2. Environment variables (read once, on first use)
//! 3. User's ost_config.rs (compile-time, via `OST_CONFIG_RS`)
//! 4. Library defaults
//!
//! # Example
//!
//! ```rust,ignore
//! use osthread_runtime::config::{self, ThreadConfig};
//!
//! config::install(ThreadConfig::from_env().stack_size(512 * 1024))?;
//! ```

pub mod defaults;

use std::fmt;
use std::sync::OnceLock;

use osthread_core::env::{env_get, env_get_bool};
use osthread_core::kprint::{self, LogLevel};
use osthread_core::kwarn;

/// Smallest explicit stack size accepted (glibc's PTHREAD_STACK_MIN)
const MIN_STACK_SIZE: usize = 16 * 1024;

/// Process-wide thread configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadConfig {
    /// Stack size for new threads, 0 = pthread default
    pub stack_size: usize,
    /// Suspend signal, as an offset above SIGRTMIN
    pub suspend_signal_offset: i32,
    /// Terminate signal, as an offset above SIGRTMIN
    pub terminate_signal_offset: i32,
    /// Raise the log level to debug when the configuration is installed
    pub debug_logging: bool,
}

impl Default for ThreadConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

impl ThreadConfig {
    /// Create config from compile-time defaults with environment overrides.
    ///
    /// Environment variables (all optional):
    /// - `OST_STACK_SIZE` - Stack size in bytes, 0 for the pthread default
    /// - `OST_SUSPEND_SIGNAL` - Suspend signal offset above SIGRTMIN
    /// - `OST_TERMINATE_SIGNAL` - Terminate signal offset above SIGRTMIN
    /// - `OST_DEBUG` - Enable debug logging (0/1)
    pub fn from_env() -> Self {
        Self {
            stack_size: env_get("OST_STACK_SIZE", defaults::STACK_SIZE),
            suspend_signal_offset: env_get("OST_SUSPEND_SIGNAL", defaults::SUSPEND_SIGNAL_OFFSET),
            terminate_signal_offset: env_get(
                "OST_TERMINATE_SIGNAL",
                defaults::TERMINATE_SIGNAL_OFFSET,
            ),
            debug_logging: env_get_bool("OST_DEBUG", defaults::DEBUG_LOGGING),
        }
    }

    /// Create config with compile-time defaults only (no env override).
    pub fn new() -> Self {
        Self {
            stack_size: defaults::STACK_SIZE,
            suspend_signal_offset: defaults::SUSPEND_SIGNAL_OFFSET,
            terminate_signal_offset: defaults::TERMINATE_SIGNAL_OFFSET,
            debug_logging: defaults::DEBUG_LOGGING,
        }
    }

    // Builder methods

    pub fn stack_size(mut self, size: usize) -> Self {
        self.stack_size = size;
        self
    }

    pub fn suspend_signal_offset(mut self, offset: i32) -> Self {
        self.suspend_signal_offset = offset;
        self
    }

    pub fn terminate_signal_offset(mut self, offset: i32) -> Self {
        self.terminate_signal_offset = offset;
        self
    }

    pub fn debug_logging(mut self, enable: bool) -> Self {
        self.debug_logging = enable;
        self
    }

    /// Suspend signal number
    pub fn suspend_signal(&self) -> libc::c_int {
        libc::SIGRTMIN() + self.suspend_signal_offset
    }

    /// Terminate signal number
    pub fn terminate_signal(&self) -> libc::c_int {
        libc::SIGRTMIN() + self.terminate_signal_offset
    }

    /// Validate configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.stack_size != 0 && self.stack_size < MIN_STACK_SIZE {
            return Err(ConfigError::InvalidValue("stack_size must be 0 or >= 16KB"));
        }
        let span = libc::SIGRTMAX() - libc::SIGRTMIN();
        for offset in [self.suspend_signal_offset, self.terminate_signal_offset] {
            if offset < 0 || offset > span {
                return Err(ConfigError::InvalidValue(
                    "signal offsets must lie within SIGRTMIN..=SIGRTMAX",
                ));
            }
        }
        if self.suspend_signal_offset == self.terminate_signal_offset {
            return Err(ConfigError::InvalidValue(
                "suspend and terminate signals must differ",
            ));
        }
        Ok(())
    }

    /// Print configuration (for debugging)
    pub fn print(&self) {
        eprintln!("osthread Configuration:");
        eprintln!("  stack_size:         {}", self.stack_size);
        eprintln!(
            "  suspend_signal:     SIGRTMIN+{} ({})",
            self.suspend_signal_offset,
            self.suspend_signal()
        );
        eprintln!(
            "  terminate_signal:   SIGRTMIN+{} ({})",
            self.terminate_signal_offset,
            self.terminate_signal()
        );
        eprintln!("  debug_logging:      {}", self.debug_logging);
    }
}

static GLOBAL: OnceLock<ThreadConfig> = OnceLock::new();

/// The process-wide configuration, loaded from the environment on first use.
///
/// An invalid environment falls back to the compile-time defaults.
pub fn global() -> &'static ThreadConfig {
    GLOBAL.get_or_init(|| {
        let config = ThreadConfig::from_env();
        let config = match config.validate() {
            Ok(()) => config,
            Err(e) => {
                kwarn!("{}; using compile-time defaults", e);
                ThreadConfig::new()
            }
        };
        apply_logging(&config);
        config
    })
}

/// Install `config` as the process-wide configuration.
///
/// Must run before anything reads the configuration (the first thread
/// start, suspend or terminate does).
pub fn install(config: ThreadConfig) -> Result<(), ConfigError> {
    config.validate()?;
    let debug = config.debug_logging;
    GLOBAL.set(config).map_err(|_| ConfigError::AlreadyInstalled)?;
    if debug {
        kprint::set_log_level(LogLevel::Debug);
    }
    Ok(())
}

fn apply_logging(config: &ThreadConfig) {
    if config.debug_logging && !kprint::level_enabled(LogLevel::Debug) {
        kprint::set_log_level(LogLevel::Debug);
    }
}

/// Configuration error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidValue(&'static str),
    AlreadyInstalled,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidValue(msg) => write!(f, "Invalid config: {}", msg),
            ConfigError::AlreadyInstalled => write!(f, "configuration already in use"),
        }
    }
}

impl std::error::Error for ConfigError {}
