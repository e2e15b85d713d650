use crate::platform::Platform;
use anyhow::Result;
use std::time::Duration;

/// How often the pointer is nudged.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(30);

/// Values stamped in by the release pipeline. Informational only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildInfo {
    pub version: &'static str,
    pub build_time: &'static str,
    pub environment: &'static str,
}

impl Default for BuildInfo {
    fn default() -> Self {
        Self {
            version: option_env!("KEEPALIVE_VERSION").unwrap_or(env!("CARGO_PKG_VERSION")),
            build_time: option_env!("KEEPALIVE_BUILD_TIME").unwrap_or("unknown"),
            environment: option_env!("KEEPALIVE_ENVIRONMENT").unwrap_or("dev"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub interval: Duration,
    pub platform: Platform,
    pub build: BuildInfo,
}

impl RunConfig {
    pub fn detect() -> Result<Self> {
        Self::new(DEFAULT_INTERVAL, Platform::detect())
    }

    pub fn new(interval: Duration, platform: Platform) -> Result<Self> {
        if interval.is_zero() {
            anyhow::bail!("Interval must be greater than zero");
        }
        Ok(Self {
            interval,
            platform,
            build: BuildInfo::default(),
        })
    }
}
