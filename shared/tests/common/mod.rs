//! Scripted collaborators for driving the core from tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};
use shared::{
    ApiRequest, ConfirmationPrompt, DataSource, FetchError, HttpReply, Job, JobId, JobStatus,
    MutationError, Mutator, NavigationHost, Page, PageParams, RawDataSource, Record,
};
use tokio::sync::{oneshot, Notify};

type Reply<T> = oneshot::Sender<Result<Page<T>, FetchError>>;

/// Holds every fetch open until the test answers it, in any order.
pub struct GatedSource<T: Record> {
    calls: Mutex<Vec<PageParams<T::Status>>>,
    replies: Mutex<Vec<Option<Reply<T>>>>,
}

impl<T: Record> GatedSource<T> {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            replies: Mutex::new(Vec::new()),
        })
    }

    pub fn request_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn request(&self, index: usize) -> PageParams<T::Status> {
        self.calls.lock().unwrap()[index].clone()
    }

    pub async fn wait_for_requests(&self, count: usize) {
        while self.request_count() < count {
            tokio::task::yield_now().await;
        }
    }

    /// Answers the `index`-th request (0-based, in issue order).
    pub fn respond(&self, index: usize, result: Result<Page<T>, FetchError>) {
        let reply = self.replies.lock().unwrap()[index]
            .take()
            .expect("request already answered");
        let _ = reply.send(result);
    }
}

#[async_trait]
impl<T: Record> DataSource<T> for GatedSource<T> {
    async fn fetch_page(&self, params: PageParams<T::Status>) -> Result<Page<T>, FetchError> {
        let (tx, rx) = oneshot::channel();
        self.replies.lock().unwrap().push(Some(tx));
        self.calls.lock().unwrap().push(params);
        rx.await
            .unwrap_or_else(|_| Err(FetchError::network("request dropped")))
    }
}

pub fn job(id: u64) -> Job {
    Job {
        id: JobId(id),
        title: format!("Job {id}"),
        description: String::new(),
        location: None,
        budget: None,
        status: JobStatus::Open,
    }
}

pub fn jobs(ids: std::ops::RangeInclusive<u64>) -> Vec<Job> {
    ids.map(job).collect()
}

pub fn job_ids(items: &[Job]) -> Vec<u64> {
    items.iter().map(|j| j.id.get()).collect()
}

/// In-memory job board speaking the raw JSON list shape and accepting
/// actions against its jobs.
pub struct JobBoard {
    jobs: Mutex<Vec<Job>>,
    pub fetches: Mutex<Vec<PageParams<JobStatus>>>,
    pub mutations: Mutex<Vec<(String, Value)>>,
}

impl JobBoard {
    pub fn with_jobs(jobs: Vec<Job>) -> Arc<Self> {
        Arc::new(Self {
            jobs: Mutex::new(jobs),
            fetches: Mutex::new(Vec::new()),
            mutations: Mutex::new(Vec::new()),
        })
    }

    pub fn status_of(&self, id: u64) -> Option<JobStatus> {
        self.jobs
            .lock()
            .unwrap()
            .iter()
            .find(|j| j.id.get() == id)
            .map(|j| j.status)
    }

    /// The raw list response for one page, filtered by `status` if given.
    pub fn page_body(&self, page: u32, page_size: u32, status: Option<JobStatus>) -> Value {
        let matching: Vec<Job> = self
            .jobs
            .lock()
            .unwrap()
            .iter()
            .filter(|j| status.map_or(true, |s| j.status == s))
            .cloned()
            .collect();

        let size = page_size as usize;
        let total_pages = matching.len().div_ceil(size).max(1);
        let start = (page as usize - 1) * size;
        let items: Vec<&Job> = matching.iter().skip(start).take(size).collect();
        json!({
            "jobs": items,
            "pagination": {"current_page": page, "total_pages": total_pages}
        })
    }

    pub fn apply_action(&self, action: &str, payload: &Value) -> Result<Value, MutationError> {
        self.mutations
            .lock()
            .unwrap()
            .push((action.to_string(), payload.clone()));
        let id = payload["id"]
            .as_u64()
            .ok_or_else(|| MutationError::validation("Missing job id"))?;

        let mut jobs = self.jobs.lock().unwrap();
        let job = jobs
            .iter_mut()
            .find(|j| j.id.get() == id)
            .ok_or_else(|| MutationError::Server {
                status: Some(404),
                message: "not found".into(),
            })?;
        match action {
            "cancel" if job.status == JobStatus::Cancelled => {
                Err(MutationError::validation("This job is already cancelled"))
            }
            "cancel" => {
                job.status = JobStatus::Cancelled;
                Ok(json!({"id": id, "status": "cancelled"}))
            }
            "complete" => {
                job.status = JobStatus::Completed;
                Ok(json!({"id": id, "status": "completed"}))
            }
            other => Err(MutationError::server(format!("unsupported action {other}"))),
        }
    }

    /// Plays the shell's HTTP client for one API effect.
    pub fn answer(&self, request: &ApiRequest) -> HttpReply {
        match request {
            ApiRequest::FetchPage {
                page,
                page_size,
                status,
                ..
            } => {
                let status: Option<JobStatus> = status
                    .as_ref()
                    .map(|s| serde_json::from_value(json!(s)).unwrap());
                self.fetches.lock().unwrap().push(PageParams {
                    page: *page,
                    page_size: *page_size,
                    status,
                });
                HttpReply::json(200, &self.page_body(*page, *page_size, status))
            }
            ApiRequest::Mutate { action, payload } => match self.apply_action(action, payload) {
                Ok(body) => HttpReply::json(200, &body),
                Err(MutationError::Validation(message)) => {
                    HttpReply::json(422, &json!({ "message": message }))
                }
                Err(MutationError::Server { status, message }) => {
                    HttpReply::json(status.unwrap_or(500), &json!({ "message": message }))
                }
                Err(e) => HttpReply::Unreachable(e.to_string()),
            },
        }
    }
}

#[async_trait]
impl RawDataSource<JobStatus> for JobBoard {
    async fn fetch_json(&self, params: &PageParams<JobStatus>) -> Result<Value, FetchError> {
        self.fetches.lock().unwrap().push(params.clone());
        Ok(self.page_body(params.page, params.page_size, params.status))
    }
}

#[async_trait]
impl Mutator for JobBoard {
    async fn mutate(&self, action: &str, payload: &Value) -> Result<Value, MutationError> {
        self.apply_action(action, payload)
    }
}

/// Records actions and holds each one until `release` is called.
#[derive(Default)]
pub struct HeldMutator {
    pub calls: Mutex<Vec<(String, Value)>>,
    release: Notify,
}

impl HeldMutator {
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub async fn wait_for_calls(&self, count: usize) {
        while self.call_count() < count {
            tokio::task::yield_now().await;
        }
    }

    pub fn release(&self) {
        self.release.notify_one();
    }
}

#[async_trait]
impl Mutator for HeldMutator {
    async fn mutate(&self, action: &str, payload: &Value) -> Result<Value, MutationError> {
        self.calls
            .lock()
            .unwrap()
            .push((action.to_string(), payload.clone()));
        self.release.notified().await;
        Ok(json!({"ok": true}))
    }
}

#[derive(Default)]
pub struct RecordingHost {
    pub routes: Mutex<Vec<String>>,
}

impl RecordingHost {
    pub fn navigations(&self) -> Vec<String> {
        self.routes.lock().unwrap().clone()
    }
}

impl NavigationHost<String> for RecordingHost {
    fn navigate(&self, route: &String, _params: Option<Value>) {
        self.routes.lock().unwrap().push(route.clone());
    }
}

pub struct ScriptedPrompt {
    answer: bool,
    pub messages: Mutex<Vec<String>>,
}

impl ScriptedPrompt {
    pub fn answering(answer: bool) -> Arc<Self> {
        Arc::new(Self {
            answer,
            messages: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl ConfirmationPrompt for ScriptedPrompt {
    async fn confirm(&self, message: &str) -> bool {
        self.messages.lock().unwrap().push(message.to_string());
        self.answer
    }
}
