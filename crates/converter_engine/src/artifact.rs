use std::path::{Path, PathBuf};

use bytes::BytesMut;
use converter_core::ErrorOrigin;
use engine_logging::{engine_debug, engine_info};
use futures_util::StreamExt;
use url::Url;

use crate::client::{ensure_success, map_reqwest_error};
use crate::persist::AtomicFileWriter;
use crate::ClientError;

/// Local file name for a downloaded artifact: `conversion-{id}.zip`.
pub fn artifact_file_name(conversion_id: &str) -> String {
    let safe: String = conversion_id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("conversion-{safe}.zip")
}

/// Buffers the artifact body in memory, refusing more than `max_bytes`, then
/// writes it to `dir` in one atomic step.
pub(crate) async fn fetch_artifact(
    http: &reqwest::Client,
    url: Url,
    conversion_id: &str,
    dir: &Path,
    max_bytes: u64,
) -> Result<PathBuf, ClientError> {
    engine_info!("Downloading artifact {} from {}", conversion_id, url);
    let response = http.get(url).send().await.map_err(map_reqwest_error)?;
    let response = ensure_success(response).await?;

    let mut bytes = BytesMut::new();
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(map_reqwest_error)?;
        let next_len = bytes.len() as u64 + chunk.len() as u64;
        if next_len > max_bytes {
            return Err(ClientError::new(
                ErrorOrigin::Unexpected,
                format!("artifact {conversion_id} exceeds {max_bytes} bytes"),
            ));
        }
        bytes.extend_from_slice(&chunk);
        engine_debug!("artifact {}: {} bytes received", conversion_id, bytes.len());
    }

    let writer = AtomicFileWriter::new(dir.to_path_buf());
    let path = writer
        .write(&artifact_file_name(conversion_id), &bytes)
        .map_err(|err| {
            ClientError::new(
                ErrorOrigin::Unexpected,
                format!("could not save artifact: {err}"),
            )
        })?;
    engine_info!("Saved artifact {} to {:?}", conversion_id, path);
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_is_filesystem_safe() {
        assert_eq!(artifact_file_name("c1"), "conversion-c1.zip");
        assert_eq!(
            artifact_file_name("../etc/passwd"),
            "conversion-___etc_passwd.zip"
        );
    }
}
