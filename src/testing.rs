//! In-memory [`RestClient`] double for unit tests

use crate::client::{RawResponse, RequestOptions, RestClient};
use crate::error::ClientError;
use async_trait::async_trait;
use reqwest::Method;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub options: RequestOptions,
}

impl RecordedRequest {
    pub fn body(&self) -> Option<&Value> {
        self.options.body.as_ref()
    }
}

/// Scripted responses keyed by method and path.
///
/// Responses queue up per route; the last one keeps answering once the
/// queue is drained. Unknown routes answer 404.
pub struct MockClient {
    endpoint: String,
    routes: Mutex<HashMap<(Method, String), VecDeque<RawResponse>>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockClient {
    pub fn new() -> Self {
        Self::with_endpoint("https://appliance.local")
    }

    pub fn with_endpoint(endpoint: &str) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            routes: Mutex::new(HashMap::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn on(&self, method: Method, path: &str, response: RawResponse) -> &Self {
        self.routes
            .lock()
            .unwrap()
            .entry((method, path.to_string()))
            .or_default()
            .push_back(response);
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests_with(&self, method: Method) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method)
            .collect()
    }
}

#[async_trait]
impl RestClient for MockClient {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn rest_api(
        &self,
        method: Method,
        path: &str,
        options: RequestOptions,
    ) -> Result<RawResponse, ClientError> {
        self.requests.lock().unwrap().push(RecordedRequest {
            method: method.clone(),
            path: path.to_string(),
            options,
        });

        let mut routes = self.routes.lock().unwrap();
        let response = match routes.get_mut(&(method, path.to_string())) {
            Some(queue) if queue.len() > 1 => queue.pop_front(),
            Some(queue) => queue.front().cloned(),
            None => None,
        };

        Ok(response.unwrap_or_else(|| {
            RawResponse::json(404, &json!({"message": format!("no route for {}", path)}))
        }))
    }
}
