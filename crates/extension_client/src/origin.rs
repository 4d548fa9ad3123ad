use std::fmt;
use std::path::{Path, PathBuf};

use reqwest::Url;

use crate::error::ExtensionError;

/// Where an extension lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    /// Executable entrypoint, always absolute.
    File(PathBuf),
    Http(Url),
}

impl Origin {
    /// `http://` and `https://` strings are remote; anything else is a path,
    /// with `~` expanded against `$HOME` and relative paths resolved against
    /// the current directory.
    pub fn parse(raw: &str) -> Result<Self, ExtensionError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ExtensionError::invalid_origin(raw, "origin is empty"));
        }
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            let url = Url::parse(trimmed)
                .map_err(|error| ExtensionError::invalid_origin(raw, error.to_string()))?;
            return Ok(Self::Http(url));
        }

        let expanded = expand_home(trimmed);
        if expanded.is_absolute() {
            return Ok(Self::File(expanded));
        }
        let cwd = std::env::current_dir()
            .map_err(|error| ExtensionError::invalid_origin(raw, error.to_string()))?;
        Ok(Self::File(cwd.join(expanded)))
    }

    #[must_use]
    pub fn is_local(&self) -> bool {
        matches!(self, Self::File(_))
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Http(url) => write!(f, "{url}"),
        }
    }
}

fn expand_home(raw: &str) -> PathBuf {
    let rest = if raw == "~" {
        ""
    } else if let Some(rest) = raw.strip_prefix("~/") {
        rest
    } else {
        return PathBuf::from(raw);
    };
    match std::env::var_os("HOME") {
        Some(home) if !home.is_empty() => Path::new(&home).join(rest),
        _ => PathBuf::from(raw),
    }
}
