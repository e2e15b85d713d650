use std::fmt;
use thiserror::Error;

/// Operating systems the tool knows how to keep awake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Platform {
    MacOs,
    Windows,
    Unsupported(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("This tool supports macOS and Windows only (detected: {os})")]
pub struct UnsupportedPlatform {
    pub os: String,
}

impl Platform {
    pub fn detect() -> Self {
        Self::from_os(std::env::consts::OS)
    }

    /// Map a `std::env::consts::OS` style identifier to a platform.
    pub fn from_os(os: &str) -> Self {
        match os {
            "macos" => Platform::MacOs,
            "windows" => Platform::Windows,
            other => Platform::Unsupported(other.to_string()),
        }
    }

    pub fn os(&self) -> &str {
        match self {
            Platform::MacOs => "macos",
            Platform::Windows => "windows",
            Platform::Unsupported(os) => os,
        }
    }

    /// Startup gate. Only this check is allowed to stop the program.
    pub fn ensure_supported(&self) -> Result<(), UnsupportedPlatform> {
        match self {
            Platform::Unsupported(os) => Err(UnsupportedPlatform { os: os.clone() }),
            _ => Ok(()),
        }
    }

    /// Banner lines describing how activity is simulated on this platform.
    pub fn notes(&self) -> Vec<&'static str> {
        match self {
            Platform::MacOs => vec![
                "macOS detected - Using cliclick for mouse simulation",
                "Note: If mouse movement fails, install cliclick: brew install cliclick",
            ],
            Platform::Windows => vec!["Windows detected - Using PowerShell with Windows API"],
            Platform::Unsupported(_) => vec![],
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.os(), std::env::consts::ARCH)
    }
}
