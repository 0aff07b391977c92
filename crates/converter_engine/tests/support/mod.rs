#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use converter_core::{ErrorOrigin, JobHandle, JobStatus, Payload, SubmitAck};
use converter_engine::{ClientError, EngineEvent, EventSink, JobClient};
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Submit,
    Poll(String),
    Download(String),
}

/// In-memory service: queued submit answers and per-task status scripts.
/// The last status of a task script repeats forever.
#[derive(Default)]
pub struct ScriptedClient {
    acks: Mutex<VecDeque<Result<SubmitAck, ClientError>>>,
    statuses: Mutex<HashMap<String, VecDeque<Result<JobStatus, ClientError>>>>,
    calls: Mutex<Vec<Call>>,
    poll_delay: Duration,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_poll_delay(mut self, delay: Duration) -> Self {
        self.poll_delay = delay;
        self
    }

    pub fn ack(self, task_id: &str, status: JobStatus) -> Self {
        self.acks.lock().unwrap().push_back(Ok(SubmitAck {
            job: JobHandle::new(task_id),
            status,
        }));
        self
    }

    pub fn statuses(self, task_id: &str, script: Vec<Result<JobStatus, ClientError>>) -> Self {
        self.statuses
            .lock()
            .unwrap()
            .insert(task_id.to_string(), script.into());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn poll_count(&self, task_id: &str) -> usize {
        self.calls()
            .iter()
            .filter(|call| **call == Call::Poll(task_id.to_string()))
            .count()
    }
}

#[async_trait::async_trait]
impl JobClient for ScriptedClient {
    async fn submit(&self, _payload: &Payload) -> Result<SubmitAck, ClientError> {
        self.calls.lock().unwrap().push(Call::Submit);
        self.acks.lock().unwrap().pop_front().unwrap_or_else(|| {
            Err(ClientError::new(ErrorOrigin::Unexpected, "no scripted ack"))
        })
    }

    async fn poll_once(&self, job: &JobHandle) -> Result<JobStatus, ClientError> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Poll(job.task_id.clone()));
        if !self.poll_delay.is_zero() {
            tokio::time::sleep(self.poll_delay).await;
        }
        let mut statuses = self.statuses.lock().unwrap();
        let script = statuses.entry(job.task_id.clone()).or_default();
        match script.len() {
            0 => Err(ClientError::new(ErrorOrigin::Unexpected, "no scripted status")),
            1 => script[0].clone(),
            _ => script.pop_front().unwrap(),
        }
    }

    fn download_url(&self, conversion_id: &str) -> Result<Url, ClientError> {
        Ok(Url::parse("http://service.test/download/")
            .unwrap()
            .join(conversion_id)
            .unwrap())
    }

    async fn fetch_artifact(
        &self,
        conversion_id: &str,
        dir: &Path,
    ) -> Result<PathBuf, ClientError> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Download(conversion_id.to_string()));
        Ok(dir.join(format!("conversion-{conversion_id}.zip")))
    }
}

#[derive(Default, Clone)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<EngineEvent>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&self) -> Vec<EngineEvent> {
        self.events.lock().unwrap().drain(..).collect()
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: EngineEvent) {
        self.events.lock().unwrap().push(event);
    }
}
