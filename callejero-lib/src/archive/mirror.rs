use crate::Result;
use core::time::Duration;
use ohno::IntoAppError;
use reqwest::Client;
use std::path::{Path, PathBuf};
use url::Url;

/// Log target for the snapshot mirror
const LOG_TARGET: &str = "    mirror";

/// Metadata header recording which archive a mirrored snapshot was built from.
pub const SOURCE_HEADER: &str = "x-amz-meta-source";

/// A remote copy of the latest snapshot, reachable through plain HTTP HEAD and PUT.
///
/// Every mirror operation is best effort. Failures are logged and reported as `false`, and
/// never affect the local snapshot.
#[derive(Debug, Clone)]
pub struct HttpMirror {
    client: Client,
    object_url: Url,
}

impl HttpMirror {
    pub fn new(base_url: &Url, object: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("callejero/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .into_app_err("unable to create HTTP client")?;

        let mut base_url = base_url.clone();
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let object_url = base_url
            .join(object)
            .into_app_err_with(|| format!("invalid mirror object name '{object}'"))?;

        Ok(Self { client, object_url })
    }

    #[must_use]
    pub const fn object_url(&self) -> &Url {
        &self.object_url
    }

    /// Whether the mirrored object was built from the archive named `source`.
    pub async fn holds_source(&self, source: &str) -> bool {
        let response = match self.client.head(self.object_url.clone()).send().await {
            Ok(response) => response,
            Err(e) => {
                log::warn!(target: LOG_TARGET, "Could not query mirror at {}: {e}", self.object_url);
                return false;
            }
        };

        if !response.status().is_success() {
            log::debug!(target: LOG_TARGET, "Mirror answered HTTP {} for {}", response.status(), self.object_url);
            return false;
        }

        let mirrored = response.headers().get(SOURCE_HEADER).and_then(|v| v.to_str().ok());
        log::debug!(target: LOG_TARGET, "Mirror holds source {mirrored:?}");
        mirrored == Some(source)
    }

    /// Uploads a packed copy of `snapshot_dir`, tagged with `source`.
    pub async fn upload(&self, snapshot_dir: &Path, source: &str) -> bool {
        let dir = snapshot_dir.to_path_buf();
        let body = match tokio::task::spawn_blocking(move || pack_snapshot(&dir)).await {
            Ok(Ok(body)) => body,
            Ok(Err(e)) => {
                log::warn!(target: LOG_TARGET, "Could not pack snapshot for the mirror: {e:#}");
                return false;
            }
            Err(e) => {
                log::warn!(target: LOG_TARGET, "Snapshot packing task failed: {e}");
                return false;
            }
        };

        let size = body.len();
        let result = self
            .client
            .put(self.object_url.clone())
            .header(SOURCE_HEADER, source)
            .body(body)
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                log::info!(target: LOG_TARGET, "Uploaded snapshot ({size} bytes) to {}", self.object_url);
                true
            }
            Ok(response) => {
                log::warn!(target: LOG_TARGET, "Mirror rejected the upload: HTTP {}", response.status());
                false
            }
            Err(e) => {
                log::warn!(target: LOG_TARGET, "Could not upload snapshot to the mirror: {e}");
                false
            }
        }
    }
}

/// Packs a snapshot directory as a zstd-compressed tar archive.
pub fn pack_snapshot(dir: &Path) -> Result<Vec<u8>> {
    let encoder = zstd::Encoder::new(Vec::new(), 0).into_app_err("could not create zstd encoder")?;
    let mut builder = tar::Builder::new(encoder);

    let name = dir.file_name().map_or_else(|| PathBuf::from("snapshot"), PathBuf::from);
    builder
        .append_dir_all(&name, dir)
        .into_app_err_with(|| format!("could not archive '{}'", dir.display()))?;

    let encoder = builder.into_inner().into_app_err("could not finish tar archive")?;
    encoder.finish().into_app_err("could not finish zstd stream")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn mirror(server: &MockServer) -> HttpMirror {
        let base = Url::parse(&format!("{}/bucket", server.uri())).unwrap();
        HttpMirror::new(&base, "callejero.tar.zst", Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_holds_matching_source() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/bucket/callejero.tar.zst"))
            .respond_with(ResponseTemplate::new(200).insert_header(SOURCE_HEADER, "caj_esp_072025.zip"))
            .mount(&server)
            .await;

        let mirror = mirror(&server);
        assert!(mirror.holds_source("caj_esp_072025.zip").await);
        assert!(!mirror.holds_source("caj_esp_012025.zip").await);
    }

    #[tokio::test]
    async fn test_missing_object_is_not_held() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD")).respond_with(ResponseTemplate::new(404)).mount(&server).await;

        assert!(!mirror(&server).holds_source("caj_esp_072025.zip").await);
    }

    #[tokio::test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    async fn test_upload_sends_source_header() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/bucket/callejero.tar.zst"))
            .and(header(SOURCE_HEADER, "caj_esp_072025.zip"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("manifest.json"), "{}").unwrap();

        assert!(mirror(&server).upload(dir.path(), "caj_esp_072025.zip").await);
    }

    #[tokio::test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    async fn test_upload_failure_is_swallowed() {
        let server = MockServer::start().await;
        Mock::given(method("PUT")).respond_with(ResponseTemplate::new(500)).mount(&server).await;

        let dir = tempfile::tempdir().unwrap();
        assert!(!mirror(&server).upload(dir.path(), "caj_esp_072025.zip").await);
        assert!(!mirror(&server).upload(Path::new("no/such/snapshot"), "caj_esp_072025.zip").await);
    }

    #[test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    fn test_pack_snapshot_contains_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("VIAS.table"), b"vias").unwrap();
        fs::write(dir.path().join("manifest.json"), b"{}").unwrap();

        let packed = pack_snapshot(dir.path()).unwrap();
        let decoded = zstd::decode_all(packed.as_slice()).unwrap();
        let mut archive = tar::Archive::new(decoded.as_slice());
        let names: Vec<String> = archive
            .entries()
            .unwrap()
            .map(|e| e.unwrap().path().unwrap().file_name().unwrap().to_string_lossy().into_owned())
            .collect();

        assert!(names.iter().any(|n| n == "VIAS.table"));
        assert!(names.iter().any(|n| n == "manifest.json"));
    }
}
