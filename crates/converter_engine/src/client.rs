use std::path::{Path, PathBuf};

use converter_core::{ErrorOrigin, JobHandle, JobStatus, Payload, SubmitAck};
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use url::Url;

use crate::artifact::fetch_artifact;
use crate::types::ErrorBody;
use crate::{ClientError, ServiceSettings, StatusResponse, SubmitResponse};

#[async_trait::async_trait]
pub trait JobClient: Send + Sync {
    /// One `POST /convert`. No retries.
    async fn submit(&self, payload: &Payload) -> Result<SubmitAck, ClientError>;

    /// One `GET /status/{task_id}`.
    async fn poll_once(&self, job: &JobHandle) -> Result<JobStatus, ClientError>;

    fn download_url(&self, conversion_id: &str) -> Result<Url, ClientError>;

    /// Retrieves the artifact into `dir` and returns the written path.
    async fn fetch_artifact(&self, conversion_id: &str, dir: &Path)
        -> Result<PathBuf, ClientError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestJobClient {
    settings: ServiceSettings,
    http: reqwest::Client,
}

impl ReqwestJobClient {
    pub fn new(settings: ServiceSettings) -> Result<Self, ClientError> {
        let http = build_client(&settings)?;
        Ok(Self { settings, http })
    }

    pub fn settings(&self) -> &ServiceSettings {
        &self.settings
    }
}

fn build_client(settings: &ServiceSettings) -> Result<reqwest::Client, ClientError> {
    let mut builder = reqwest::Client::builder();
    if let Some(timeout) = settings.connect_timeout {
        builder = builder.connect_timeout(timeout);
    }
    if let Some(timeout) = settings.request_timeout {
        builder = builder.timeout(timeout);
    }
    builder
        .build()
        .map_err(|err| ClientError::new(ErrorOrigin::RequestSetupFailure, err.to_string()))
}

#[async_trait::async_trait]
impl JobClient for ReqwestJobClient {
    async fn submit(&self, payload: &Payload) -> Result<SubmitAck, ClientError> {
        let url = self.settings.convert_url()?;
        let form = build_form(payload)?;

        let response = self
            .http
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let body: SubmitResponse = read_json(response).await?;
        Ok(body.into())
    }

    async fn poll_once(&self, job: &JobHandle) -> Result<JobStatus, ClientError> {
        let url = self.settings.status_url(&job.task_id)?;

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let body: StatusResponse = read_json(response).await?;
        Ok(body.into())
    }

    fn download_url(&self, conversion_id: &str) -> Result<Url, ClientError> {
        self.settings.download_url(conversion_id)
    }

    async fn fetch_artifact(
        &self,
        conversion_id: &str,
        dir: &Path,
    ) -> Result<PathBuf, ClientError> {
        let url = self.settings.download_url(conversion_id)?;
        fetch_artifact(
            &self.http,
            url,
            conversion_id,
            dir,
            self.settings.max_artifact_bytes,
        )
        .await
    }
}

fn build_form(payload: &Payload) -> Result<Form, ClientError> {
    // Keys contain '/', which must reach the service verbatim.
    let mut form = Form::new().percent_encode_noop();
    for part in &payload.parts {
        let file_part = Part::bytes(part.file.bytes.to_vec())
            .file_name(part.file.name.clone())
            .mime_str(mime_for(&part.file.name))
            .map_err(|err| ClientError::new(ErrorOrigin::RequestSetupFailure, err.to_string()))?;
        form = form.part(part.key.clone(), file_part);
    }
    for (name, value) in &payload.fields {
        form = form.text(name.clone(), value.clone());
    }
    Ok(form)
}

fn mime_for(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}

/// Decodes a 2xx JSON body, or turns a non-2xx response into `ServerRejected`.
pub(crate) async fn read_json<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ClientError> {
    let response = ensure_success(response).await?;
    let bytes = response.bytes().await.map_err(map_reqwest_error)?;
    serde_json::from_slice(&bytes).map_err(|err| {
        ClientError::new(
            ErrorOrigin::Unexpected,
            format!("malformed response body: {err}"),
        )
    })
}

pub(crate) async fn ensure_success(
    response: reqwest::Response,
) -> Result<reqwest::Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&text)
        .map(|body| body.error)
        .unwrap_or_else(|_| status.to_string());
    Err(ClientError::rejected(status.as_u16(), message))
}

pub(crate) fn map_reqwest_error(err: reqwest::Error) -> ClientError {
    let origin = if err.is_builder() {
        ErrorOrigin::RequestSetupFailure
    } else if err.is_timeout() || err.is_connect() || err.is_request() {
        ErrorOrigin::NoResponse
    } else if let Some(status) = err.status() {
        return ClientError::rejected(status.as_u16(), err.to_string());
    } else {
        ErrorOrigin::Unexpected
    };
    ClientError::new(origin, err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mime_follows_extension() {
        assert_eq!(mime_for("a.JPG"), "image/jpeg");
        assert_eq!(mime_for("a.webp"), "image/webp");
        assert_eq!(mime_for("README"), "application/octet-stream");
    }
}
