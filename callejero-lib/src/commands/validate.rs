use super::Host;
use super::common::GlobalArgs;
use super::config::Config;
use crate::Result;
use camino::Utf8Path;
use std::io::Write;

/// Loads and checks the configuration named by `--config`, reporting the outcome on the host.
pub fn validate_config<H: Host>(host: &mut H, global: &GlobalArgs) -> Result<()> {
    let config_path = global.config.as_deref();

    match Config::load(Utf8Path::new("."), config_path) {
        Ok(config) => {
            let _ = writeln!(host.output(), "Configuration file is valid");
            if let Some(path) = config_path {
                let _ = writeln!(host.output(), "Config file: {path}");
            } else {
                let _ = writeln!(host.output(), "Using default configuration (no config file given)");
            }
            let _ = writeln!(host.output(), "Archive source: {}", config.archive_base_url);
            if let Some(mirror) = &config.mirror_url {
                let _ = writeln!(host.output(), "Mirror: {mirror}{}", config.mirror_object);
            }
            Ok(())
        }
        Err(e) => {
            let _ = writeln!(host.error(), "Configuration validation failed: {e}");
            host.exit(1);
            Err(e)
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::commands::common::{ColorMode, LogLevel};
    use crate::commands::host::TestHost;
    use crate::commands::init::{InitArgs, init_config};
    use camino::Utf8PathBuf;

    fn global_with(config: Utf8PathBuf) -> GlobalArgs {
        GlobalArgs {
            config: Some(config),
            data_dir: None,
            color: ColorMode::Never,
            log_level: LogLevel::None,
        }
    }

    fn write_config(dir: &tempfile::TempDir, name: &str, text: &str) -> Utf8PathBuf {
        let path = Utf8PathBuf::try_from(dir.path().join(name)).unwrap();
        std::fs::write(&path, text).unwrap();
        path
    }

    #[test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    fn test_default_config_is_valid() {
        let tmp = tempfile::tempdir().unwrap();
        let config_path = Utf8PathBuf::try_from(tmp.path().join("callejero.toml")).unwrap();

        let mut init_host = TestHost::new();
        init_config(&mut init_host, &InitArgs { output: Some(config_path.clone()) }).unwrap();

        let mut host = TestHost::new();
        let result = validate_config(&mut host, &global_with(config_path));

        assert!(result.is_ok(), "default configuration should validate: {result:?}");
        assert!(host.output_text().contains("Configuration file is valid"));
        assert_eq!(host.exit_code, None);
    }

    #[test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    fn test_invalid_toml_syntax() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_config(&tmp, "invalid.toml", "snapshot_retention = [\n");

        let mut host = TestHost::new();
        let result = validate_config(&mut host, &global_with(path));

        assert!(result.is_err());
        assert_eq!(host.exit_code, Some(1));
        assert!(host.error_text().contains("Configuration validation failed"));
    }

    #[test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    fn test_unknown_field() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_config(&tmp, "unknown.toml", "unknown_field = \"value\"\n");

        let mut host = TestHost::new();
        assert!(validate_config(&mut host, &global_with(path)).is_err());
    }

    #[test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    fn test_invalid_duration_format() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_config(&tmp, "duration.toml", "download_timeout = \"not a valid duration\"\n");

        let mut host = TestHost::new();
        assert!(validate_config(&mut host, &global_with(path)).is_err());
    }

    #[test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    fn test_mirror_is_reported() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_config(&tmp, "mirror.toml", "mirror_url = \"https://storage.example.com/bucket/\"\n");

        let mut host = TestHost::new();
        validate_config(&mut host, &global_with(path)).unwrap();
        assert!(host.output_text().contains("Mirror: https://storage.example.com/bucket/callejero-snapshot.tar.zst"));
    }

    #[test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    fn test_empty_config_is_valid() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_config(&tmp, "empty.toml", "# Empty config file\n");

        let mut host = TestHost::new();
        assert!(validate_config(&mut host, &global_with(path)).is_ok());
    }
}
