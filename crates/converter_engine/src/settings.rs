use std::time::Duration;

use converter_core::ErrorOrigin;
use url::Url;

use crate::ClientError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000/";
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);
/// The artifact is buffered in memory before it is written, so its size is capped.
pub const DEFAULT_MAX_ARTIFACT_BYTES: u64 = 1024 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct ServiceSettings {
    pub base_url: Url,
    pub poll_interval: Duration,
    /// `None` leaves the transport default in place.
    pub connect_timeout: Option<Duration>,
    pub request_timeout: Option<Duration>,
    pub max_artifact_bytes: u64,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            connect_timeout: None,
            request_timeout: None,
            max_artifact_bytes: DEFAULT_MAX_ARTIFACT_BYTES,
        }
    }
}

impl ServiceSettings {
    pub fn with_base_url(base_url: &str) -> Result<Self, ClientError> {
        Ok(Self {
            base_url: parse_base_url(base_url)?,
            ..Self::default()
        })
    }

    pub fn convert_url(&self) -> Result<Url, ClientError> {
        endpoint(&self.base_url, &["convert"])
    }

    pub fn status_url(&self, task_id: &str) -> Result<Url, ClientError> {
        endpoint(&self.base_url, &["status", task_id])
    }

    /// Where the finished artifact for `conversion_id` can be fetched.
    pub fn download_url(&self, conversion_id: &str) -> Result<Url, ClientError> {
        endpoint(&self.base_url, &["download", conversion_id])
    }
}

/// Parses a service base URL, forcing a trailing slash so endpoints append below it.
pub fn parse_base_url(raw: &str) -> Result<Url, ClientError> {
    let mut url = Url::parse(raw.trim())
        .map_err(|err| ClientError::new(ErrorOrigin::RequestSetupFailure, err.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(ClientError::new(
            ErrorOrigin::RequestSetupFailure,
            format!("'{raw}' cannot be used as a service base URL"),
        ));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn default_base_url() -> Url {
    Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid")
}

fn endpoint(base: &Url, segments: &[&str]) -> Result<Url, ClientError> {
    let mut url = base.clone();
    {
        let mut path = url.path_segments_mut().map_err(|()| {
            ClientError::new(
                ErrorOrigin::RequestSetupFailure,
                format!("'{base}' cannot be used as a service base URL"),
            )
        })?;
        path.pop_if_empty();
        path.extend(segments);
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn download_url_follows_fixed_template() {
        let settings = ServiceSettings::default();
        assert_eq!(
            settings.download_url("c1").unwrap().as_str(),
            "http://localhost:5000/download/c1"
        );
    }

    #[test]
    fn base_path_is_preserved() {
        let settings = ServiceSettings::with_base_url("https://example.com/api").unwrap();
        assert_eq!(
            settings.status_url("t1").unwrap().as_str(),
            "https://example.com/api/status/t1"
        );
        assert_eq!(
            settings.convert_url().unwrap().as_str(),
            "https://example.com/api/convert"
        );
    }

    #[test]
    fn identifiers_are_escaped_as_one_segment() {
        let settings = ServiceSettings::default();
        assert_eq!(
            settings.download_url("a/b c").unwrap().as_str(),
            "http://localhost:5000/download/a%2Fb%20c"
        );
    }

    #[test]
    fn malformed_base_url_is_a_setup_failure() {
        let err = ServiceSettings::with_base_url("not a url").unwrap_err();
        assert_eq!(err.origin, ErrorOrigin::RequestSetupFailure);

        let err = ServiceSettings::with_base_url("mailto:someone@example.com").unwrap_err();
        assert_eq!(err.origin, ErrorOrigin::RequestSetupFailure);
    }

    #[test]
    fn default_poll_interval_is_one_second() {
        assert_eq!(ServiceSettings::default().poll_interval, Duration::from_secs(1));
    }
}
