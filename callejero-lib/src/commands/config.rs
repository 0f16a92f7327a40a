use crate::Result;
use camino::{Utf8Path, Utf8PathBuf};
use core::time::Duration;
use ohno::{IntoAppError, app_err};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use url::Url;

/// The default configuration TOML content, embedded from `default_config.toml`
pub const DEFAULT_CONFIG_TOML: &str = include_str!("../../default_config.toml");

/// File looked up in the working directory when no `--config` is given.
pub const CONFIG_FILE_NAME: &str = "callejero.toml";

/// Log target for configuration loading
const LOG_TARGET: &str = "    config";

const DEFAULT_ARCHIVE_BASE_URL: &str = "https://www.ine.es/prodyser/callejero/caj_esp/";
const DEFAULT_MIRROR_OBJECT: &str = "callejero-snapshot.tar.zst";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Base URL under which the `caj_esp_MMYYYY.zip` archives are published
    #[serde(default = "default_archive_base_url")]
    pub archive_base_url: String,

    /// Connect and read timeout for archive downloads and mirror requests
    #[serde(default = "default_download_timeout", with = "humantime_serde")]
    pub download_timeout: Duration,

    /// Number of snapshot versions kept after a successful build
    #[serde(default = "default_snapshot_retention")]
    pub snapshot_retention: usize,

    /// Optional mirror receiving a compressed copy of each new snapshot
    #[serde(default)]
    pub mirror_url: Option<String>,

    /// Object name of the snapshot copy on the mirror
    #[serde(default = "default_mirror_object")]
    pub mirror_object: String,
}

fn default_archive_base_url() -> String {
    DEFAULT_ARCHIVE_BASE_URL.to_string()
}

const fn default_download_timeout() -> Duration {
    Duration::from_secs(5 * 60)
}

const fn default_snapshot_retention() -> usize {
    3
}

fn default_mirror_object() -> String {
    DEFAULT_MIRROR_OBJECT.to_string()
}

impl Config {
    /// Load configuration from a file or use defaults
    ///
    /// Without an explicit path, `callejero.toml` in `base_dir` is used when it exists.
    pub fn load(base_dir: &Utf8Path, config_path: Option<&Utf8Path>) -> Result<Self> {
        let (final_path, text) = if let Some(path) = config_path {
            let text = fs::read_to_string(path).into_app_err_with(|| format!("reading configuration file '{path}'"))?;
            (path.to_path_buf(), text)
        } else {
            let path: Utf8PathBuf = base_dir.join(CONFIG_FILE_NAME);
            match fs::read_to_string(&path) {
                Ok(text) => (path, text),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    log::debug!(target: LOG_TARGET, "No {CONFIG_FILE_NAME} found in '{base_dir}', using the default configuration");
                    return Ok(Self::default());
                }
                Err(e) => return Err(e).into_app_err_with(|| format!("reading configuration file '{path}'")),
            }
        };

        let config: Self = toml::from_str(&text).into_app_err_with(|| format!("parsing configuration file '{final_path}'"))?;
        config.validate()?;

        Ok(config)
    }

    /// Save the default configuration to a TOML file
    pub fn save_default(output_path: &Utf8Path) -> Result<()> {
        fs::write(output_path, DEFAULT_CONFIG_TOML).into_app_err_with(|| format!("writing default configuration to {output_path}"))?;
        Ok(())
    }

    pub fn archive_base_url(&self) -> Result<Url> {
        parse_http_url("archive_base_url", &self.archive_base_url)
    }

    pub fn mirror_url(&self) -> Result<Option<Url>> {
        self.mirror_url.as_deref().map(|url| parse_http_url("mirror_url", url)).transpose()
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        let _ = self.archive_base_url()?;
        let _ = self.mirror_url()?;

        if self.download_timeout.is_zero() {
            return Err(app_err!("download_timeout must be greater than zero"));
        }

        if self.snapshot_retention == 0 {
            return Err(app_err!("snapshot_retention must keep at least the current snapshot"));
        }

        if self.mirror_object.trim().is_empty() || self.mirror_object.contains(char::is_whitespace) {
            return Err(app_err!("mirror_object must be a non-empty name without whitespace, got '{}'", self.mirror_object));
        }

        Ok(())
    }
}

fn parse_http_url(key: &str, text: &str) -> Result<Url> {
    let url = Url::parse(text).into_app_err_with(|| format!("{key} is not a valid URL: '{text}'"))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(app_err!("{key} must be an http or https URL, got '{text}'"));
    }
    Ok(url)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            archive_base_url: default_archive_base_url(),
            download_timeout: default_download_timeout(),
            snapshot_retention: default_snapshot_retention(),
            mirror_url: None,
            mirror_object: default_mirror_object(),
        }
    }
}
