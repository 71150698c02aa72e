use platform_dirs::AppDirs;
use serde::{Serialize, Deserialize};
use ron::ser::{to_string_pretty, PrettyConfig};
use ron::de::from_reader;
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no config directory on this platform")]
    NoConfigDir,
    #[error("config io: {0}")]
    Io(#[from] io::Error),
    #[error("config parse: {0}")]
    Parse(#[from] ron::de::SpannedError),
    #[error("config serialize: {0}")]
    Serialize(#[from] ron::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "defaults::decimal_places")]
    pub decimal_places: Option<u32>,
    #[serde(default = "defaults::reject_zero_coefficients")]
    pub reject_zero_coefficients: bool,
    #[serde(default = "defaults::color")]
    pub color: bool,
}

macro_rules! default_ {
    ($name:ident, $type:ty) => {
        pub fn $name() -> $type {
            Config::default().$name
        }
    };
}

mod defaults {
    use super::Config;
    default_!(decimal_places, Option<u32>);
    default_!(reject_zero_coefficients, bool);
    default_!(color, bool);
}

impl Default for Config {
    fn default() -> Self {
        Self {
            decimal_places: None,
            reject_zero_coefficients: true,
            color: true,
        }
    }
}

impl Config {
    /// Loads the config file, falling back to defaults when it can't be read.
    pub fn load() -> Self {
        match Self::try_load() {
            Ok(conf) => conf,
            Err(e) => {
                warn!("using default config: {e}");
                Self::default()
            },
        }
    }

    pub fn try_load() -> Result<Self, ConfigError> {
        let dirs = AppDirs::new(Some("contfrac"), false).ok_or(ConfigError::NoConfigDir)?;
        let config_dir = dirs.config_dir;
        if let Err(e) = fs::create_dir_all(&config_dir) {
            warn!(path = %config_dir.display(), "cannot create config dir: {e}");
        }
        Self::load_from(&config_dir.join("contfrac.cfg"), |path, text| fs::write(path, text))
    }

    /// Reads the config at `path`. Writing defaults for a missing file and
    /// writing back filled-in fields go through `write` and only warn on
    /// failure.
    pub fn load_from(path: &Path, write: impl FnOnce(&Path, &str) -> io::Result<()>) -> Result<Self, ConfigError> {
        let (conf, action) = match fs::File::open(path) {
            Ok(file) => {
                let conf = from_reader::<fs::File, Self>(file)?;
                debug!(path = %path.display(), ?conf, "loaded config");
                // write back default values of any fields not present
                (conf, "write back config")
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "writing default config");
                (Self::default(), "write default config")
            },
            Err(e) => return Err(e.into()),
        };
        let written = conf.to_ron().and_then(|text| Ok(write(path, &text)?));
        if let Err(e) = written {
            warn!(path = %path.display(), "cannot {action}: {e}");
        }
        Ok(conf)
    }

    pub fn from_ron(s: &str) -> Result<Self, ConfigError> {
        Ok(ron::from_str(s)?)
    }

    pub fn to_ron(&self) -> Result<String, ConfigError> {
        Ok(to_string_pretty(self, PrettyConfig::default())?)
    }
}

#[test]
fn missing_fields_take_defaults() {
    let conf = Config::from_ron("(decimal_places: Some(3))").unwrap();
    assert_eq!(conf.decimal_places, Some(3));
    assert!(conf.reject_zero_coefficients);
    assert!(conf.color);

    let conf = Config::from_ron("(reject_zero_coefficients: false, color: false)").unwrap();
    assert_eq!(conf.decimal_places, None);
    assert!(!conf.reject_zero_coefficients);
    assert!(!conf.color);
}

#[test]
fn config_round_trips_through_ron() {
    let conf = Config {
        decimal_places: Some(6),
        reject_zero_coefficients: false,
        color: true,
    };
    let text = conf.to_ron().unwrap();
    assert_eq!(Config::from_ron(&text).unwrap(), conf);
}

#[cfg(test)]
fn scratch_path(name: &str) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!("contfrac-test-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    dir.join(name)
}

#[test]
fn failed_write_back_keeps_loaded_config() {
    let path = scratch_path("readonly.cfg");
    fs::write(&path, "(decimal_places: Some(3), reject_zero_coefficients: false)").unwrap();
    let conf = Config::load_from(&path, |_, _| {
        Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"))
    })
    .unwrap();
    assert_eq!(conf.decimal_places, Some(3));
    assert!(!conf.reject_zero_coefficients);
    assert!(conf.color);
    fs::remove_file(&path).unwrap();
}

#[test]
fn write_back_fills_in_missing_fields() {
    let path = scratch_path("partial.cfg");
    fs::write(&path, "(color: false)").unwrap();
    let conf = Config::load_from(&path, |path, text| fs::write(path, text)).unwrap();
    assert!(!conf.color);
    let written = fs::read_to_string(&path).unwrap();
    assert!(written.contains("reject_zero_coefficients"));
    assert_eq!(Config::from_ron(&written).unwrap(), conf);
    fs::remove_file(&path).unwrap();
}

#[test]
fn missing_config_gives_defaults_even_if_unwritable() {
    let path = scratch_path("missing.cfg");
    let _ = fs::remove_file(&path);
    let conf = Config::load_from(&path, |_, _| {
        Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"))
    })
    .unwrap();
    assert_eq!(conf, Config::default());
}

#[test]
fn unparsable_file_is_an_error() {
    let path = scratch_path("broken.cfg");
    fs::write(&path, "(decimal_places: \"many\")").unwrap();
    assert!(matches!(
        Config::load_from(&path, |_, _| Ok(())),
        Err(ConfigError::Parse(_))
    ));
    fs::remove_file(&path).unwrap();
}

#[test]
fn broken_config_is_an_error() {
    assert!(matches!(
        Config::from_ron("(decimal_places: \"many\")"),
        Err(ConfigError::Parse(_))
    ));
}
