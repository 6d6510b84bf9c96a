use crux_core::capability::{Capability, CapabilityContext, Operation};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::PageParams;
use crate::error::{FetchError, MutationError};
use crate::mutation::MutationRequest;

/// A call the shell makes against the marketplace API on the core's behalf.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum ApiRequest {
    FetchPage {
        collection: String,
        page: u32,
        page_size: u32,
        /// Wire value of the status filter, e.g. `"in_progress"`.
        status: Option<String>,
    },
    Mutate {
        action: String,
        payload: Value,
    },
}

impl ApiRequest {
    pub fn fetch_page<S: Serialize>(collection: impl Into<String>, params: &PageParams<S>) -> Self {
        let status = params
            .status
            .as_ref()
            .and_then(|s| serde_json::to_value(s).ok())
            .and_then(|v| v.as_str().map(str::to_owned));
        Self::FetchPage {
            collection: collection.into(),
            page: params.page,
            page_size: params.page_size,
            status,
        }
    }

    pub fn mutate(request: &MutationRequest) -> Self {
        Self::Mutate {
            action: request.action.clone(),
            payload: request.payload.clone(),
        }
    }
}

/// What the shell got back. `Unreachable` covers everything that kept the
/// request from producing a response at all.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum HttpReply {
    Received { status: u16, body: Vec<u8> },
    Unreachable(String),
}

impl HttpReply {
    pub fn json(status: u16, body: &Value) -> Self {
        Self::Received {
            status,
            body: body.to_string().into_bytes(),
        }
    }

    const fn is_success(status: u16) -> bool {
        matches!(status, 200..=299)
    }

    pub fn into_fetch_result(self) -> Result<Value, FetchError> {
        match self {
            Self::Received { status, body } if Self::is_success(status) => {
                serde_json::from_slice(&body)
                    .map_err(|e| FetchError::server(format!("response is not JSON: {e}")))
            }
            Self::Received { status, body } => {
                Err(FetchError::from_http_status(status, Some(&body)))
            }
            Self::Unreachable(reason) => Err(FetchError::network(reason)),
        }
    }

    /// An empty success body is reported as `Value::Null`.
    pub fn into_mutation_result(self) -> Result<Value, MutationError> {
        match self {
            Self::Received { status, body } if Self::is_success(status) => {
                if body.is_empty() {
                    return Ok(Value::Null);
                }
                serde_json::from_slice(&body)
                    .map_err(|e| MutationError::server(format!("response is not JSON: {e}")))
            }
            Self::Received { status, body } => {
                Err(MutationError::from_http_status(status, Some(&body)))
            }
            Self::Unreachable(reason) => Err(MutationError::Network(reason)),
        }
    }
}

impl Operation for ApiRequest {
    type Output = HttpReply;
}

#[derive(Clone)]
pub struct Api<E> {
    context: CapabilityContext<ApiRequest, E>,
}

impl<Ev> Capability<Ev> for Api<Ev> {
    type Operation = ApiRequest;
    type MappedSelf<MappedEv> = Api<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static + Send,
    {
        Api::new(self.context.map_event(f))
    }
}

impl<E> Api<E>
where
    E: 'static,
{
    pub fn new(context: CapabilityContext<ApiRequest, E>) -> Self {
        Self { context }
    }

    pub fn send<F>(&self, request: ApiRequest, callback: F)
    where
        F: FnOnce(HttpReply) -> E + Send + 'static,
    {
        let context = self.context.clone();
        self.context.spawn(async move {
            let reply = context.request_from_shell(request).await;
            context.update_app(callback(reply));
        });
    }
}
