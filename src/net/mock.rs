//! Recording transport for tests: replays canned responses in order and
//! captures every request it receives.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use serde_json::Value;

use super::api::ApiClient;
use super::error::ApiError;
use super::http::{ApiRequest, ApiResponse, Transport};

#[derive(Default)]
pub struct MockTransport {
    responses: Mutex<VecDeque<Result<ApiResponse, ApiError>>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queue a JSON response.
    pub fn reply(self: &Arc<Self>, status: u16, body: Value) -> Arc<Self> {
        self.push(Ok(ApiResponse::json(status, &body)));
        Arc::clone(self)
    }

    pub fn push(&self, response: Result<ApiResponse, ApiError>) {
        self.responses.lock().unwrap().push_back(response);
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> ApiRequest {
        self.requests.lock().unwrap().last().cloned().unwrap()
    }

    pub fn client(self: &Arc<Self>) -> ApiClient {
        ApiClient::new(Arc::clone(self) as Arc<dyn Transport>)
    }
}

#[async_trait::async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ApiError::Transport("no canned response".to_owned())))
    }
}
