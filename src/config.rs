use std::fmt::{Display, Formatter};
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::ui::{OutputMode, Theme, DEFAULT_PRINT_TIME_MS};
use crate::CliArgs;

/// Contents of a `--config` file. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub ascii: Option<bool>,
    pub print_time: Option<u64>,
    pub color: Option<OutputMode>,
    pub json: Option<bool>,
}

#[derive(Debug)]
pub enum ConfigError {
    Read {
        path: PathBuf,
        error: std::io::Error,
    },
    Parse {
        path: PathBuf,
        error: toml::de::Error,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Read { path, error } => {
                write!(f, "failed to read {}: {error}", path.display())
            }
            ConfigError::Parse { path, error } => {
                write!(f, "failed to parse {}: {error}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

pub fn load_config_file(path: &Path) -> Result<ConfigFile, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|error| ConfigError::Read {
        path: path.to_path_buf(),
        error,
    })?;
    toml::from_str(&raw).map_err(|error| ConfigError::Parse {
        path: path.to_path_buf(),
        error,
    })
}

/// Effective settings after layering defaults, file, environment and flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub ascii: bool,
    pub print_time: u64,
    pub color: OutputMode,
    pub json: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            ascii: false,
            print_time: DEFAULT_PRINT_TIME_MS,
            color: OutputMode::Auto,
            json: false,
        }
    }
}

impl Settings {
    pub fn resolve(
        args: &CliArgs,
        file: Option<&ConfigFile>,
        env_color: Option<OutputMode>,
    ) -> Self {
        let mut settings = Settings::default();
        if let Some(file) = file {
            if let Some(ascii) = file.ascii {
                settings.ascii = ascii;
            }
            if let Some(print_time) = file.print_time {
                settings.print_time = print_time;
            }
            if let Some(color) = file.color {
                settings.color = color;
            }
            if let Some(json) = file.json {
                settings.json = json;
            }
        }
        if let Some(color) = env_color {
            settings.color = color;
        }
        if args.ascii {
            settings.ascii = true;
        }
        if let Some(print_time) = args.print_time {
            settings.print_time = print_time;
        }
        if let Some(color) = args.color {
            settings.color = color;
        }
        if args.json {
            settings.json = true;
        }
        settings
    }

    /// Reads the config file named by `args`, if any, then layers everything.
    pub fn load(args: &CliArgs) -> Result<Self, ConfigError> {
        let file = args
            .config
            .as_deref()
            .map(load_config_file)
            .transpose()?;
        if let Some(path) = &args.config {
            log::debug!("loaded config from {}", path.display());
        }
        Ok(Self::resolve(args, file.as_ref(), OutputMode::from_env()))
    }

    pub fn theme(&self) -> Theme {
        if self.ascii {
            Theme::plain()
        } else {
            Theme::rich()
        }
    }
}
