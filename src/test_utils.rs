// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Test utilities for mocking Kubernetes API responses.

use bytes::Bytes;
use futures::future::BoxFuture;
use http::{Request, Response};
use http_body_util::BodyExt;
use k8s_openapi::api::apps::v1::{DaemonSet, DaemonSetStatus, Deployment, DeploymentStatus};
use kube::api::ObjectMeta;
use kube::client::Body;
use kube::Client;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tower::Service;

/// Either an HTTP status and JSON body, or a transport error message
type Reply = Result<(u16, String), String>;

/// A request the mock received
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub body: String,
}

#[derive(Default)]
struct Inner {
    responses: HashMap<(String, String), VecDeque<Reply>>,
    requests: Vec<RecordedRequest>,
}

/// A mock HTTP service answering by (method, path).
///
/// Replies registered for the same key are served in order; the last one repeats forever.
/// Unmatched requests get a 404 Status.
#[derive(Clone, Default)]
pub struct MockService {
    inner: Arc<Mutex<Inner>>,
}

impl MockService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for requests matching the exact method and path
    pub fn on(self, method: &str, path: &str, status: u16, body: &str) -> Self {
        self.push(method, path, Ok((status, body.to_string())))
    }

    pub fn on_get(self, path: &str, status: u16, body: &str) -> Self {
        self.on("GET", path, status, body)
    }

    pub fn on_put(self, path: &str, status: u16, body: &str) -> Self {
        self.on("PUT", path, status, body)
    }

    /// Queue a transport-level failure (the request never reaches a server)
    pub fn on_error(self, method: &str, path: &str, message: &str) -> Self {
        self.push(method, path, Err(message.to_string()))
    }

    /// Build a kube Client from this mock service
    pub fn into_client(self) -> Client {
        Client::new(self, "default")
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.inner.lock().unwrap().requests.clone()
    }

    /// Number of requests received for a method and path
    pub fn count(&self, method: &str, path: &str) -> usize {
        self.inner
            .lock()
            .unwrap()
            .requests
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }

    fn push(self, method: &str, path: &str, reply: Reply) -> Self {
        self.inner
            .lock()
            .unwrap()
            .responses
            .entry((method.to_string(), path.to_string()))
            .or_default()
            .push_back(reply);
        self
    }

    fn next_reply(&self, request: RecordedRequest) -> Option<Reply> {
        let mut inner = self.inner.lock().unwrap();
        let key = (request.method.clone(), request.path.clone());
        inner.requests.push(request);

        let queue = inner.responses.get_mut(&key)?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

impl Service<Request<Body>> for MockService {
    type Response = Response<Body>;
    type Error = tower::BoxError;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let method = req.method().to_string();
        let path = req.uri().path().to_string();
        let mock = self.clone();

        Box::pin(async move {
            let body = req
                .into_body()
                .collect()
                .await
                .map(|collected| collected.to_bytes())
                .unwrap_or_default();
            let request = RecordedRequest {
                method,
                path,
                body: String::from_utf8_lossy(&body).into_owned(),
            };

            match mock.next_reply(request) {
                Some(Ok((status, body))) => Ok(json_response(status, body)),
                Some(Err(message)) => Err(message.into()),
                None => Ok(json_response(404, status_json(404, "NotFound", "not found"))),
            }
        })
    }
}

fn json_response(status: u16, body: String) -> Response<Body> {
    Response::builder()
        .status(status)
        .header("content-type", "application/json")
        .body(Body::from(Bytes::from(body)))
        .unwrap()
}

/// Create a Kubernetes Status failure response
pub fn status_json(code: u16, reason: &str, message: &str) -> String {
    serde_json::json!({
        "kind": "Status",
        "apiVersion": "v1",
        "status": "Failure",
        "message": message,
        "reason": reason,
        "code": code
    })
    .to_string()
}

/// Create a 404 not found response
pub fn not_found_json(resource: &str, name: &str) -> String {
    status_json(404, "NotFound", &format!("{} \"{}\" not found", resource, name))
}

/// Create a 409 optimistic concurrency conflict response
pub fn conflict_json(resource: &str, name: &str) -> String {
    status_json(
        409,
        "Conflict",
        &format!(
            "Operation cannot be fulfilled on {} \"{}\": the object has been modified; please apply your changes to the latest version and try again",
            resource, name
        ),
    )
}

pub fn version_json() -> String {
    serde_json::json!({
        "major": "1",
        "minor": "30",
        "gitVersion": "v1.30.0",
        "gitCommit": "7c48c2bd72b9bf5c44d21d7338cc7bea77d0ad2a",
        "gitTreeState": "clean",
        "buildDate": "2024-04-17T17:27:03Z",
        "goVersion": "go1.22.2",
        "compiler": "gc",
        "platform": "linux/amd64"
    })
    .to_string()
}

pub fn deployment_path(namespace: &str, name: &str) -> String {
    format!("/apis/apps/v1/namespaces/{}/deployments/{}", namespace, name)
}

pub fn daemonset_path(namespace: &str, name: &str) -> String {
    format!("/apis/apps/v1/namespaces/{}/daemonsets/{}", namespace, name)
}

/// Create a Deployment with the given status replica counts
pub fn deployment_json(
    namespace: &str,
    name: &str,
    replicas: i32,
    updated: i32,
    available: i32,
) -> String {
    let deployment = Deployment {
        metadata: meta(namespace, name),
        status: Some(DeploymentStatus {
            replicas: Some(replicas),
            updated_replicas: Some(updated),
            available_replicas: Some(available),
            ..Default::default()
        }),
        ..Default::default()
    };
    serde_json::to_string(&deployment).unwrap()
}

/// Create a DaemonSet with the given scheduling counts
pub fn daemonset_json(
    namespace: &str,
    name: &str,
    desired: i32,
    updated: i32,
    unavailable: i32,
) -> String {
    let daemonset = DaemonSet {
        metadata: meta(namespace, name),
        status: Some(DaemonSetStatus {
            desired_number_scheduled: desired,
            current_number_scheduled: desired,
            updated_number_scheduled: Some(updated),
            number_unavailable: Some(unavailable),
            number_ready: desired - unavailable,
            ..Default::default()
        }),
        ..Default::default()
    };
    serde_json::to_string(&daemonset).unwrap()
}

fn meta(namespace: &str, name: &str) -> ObjectMeta {
    ObjectMeta {
        name: Some(name.to_string()),
        namespace: Some(namespace.to_string()),
        ..Default::default()
    }
}

pub fn oci_repository_path(namespace: &str, name: &str) -> String {
    format!(
        "/apis/source.toolkit.fluxcd.io/v1/namespaces/{}/ocirepositories/{}",
        namespace, name
    )
}

pub fn kustomization_path(namespace: &str, name: &str) -> String {
    format!(
        "/apis/kustomize.toolkit.fluxcd.io/v1/namespaces/{}/kustomizations/{}",
        namespace, name
    )
}

/// A condition as (type, status, reason, message)
pub type ConditionTuple<'a> = (&'a str, &'a str, &'a str, &'a str);

/// Create a Flux object with generation bookkeeping and status conditions
pub fn flux_object_json(
    api_version: &str,
    kind: &str,
    name: &str,
    generation: i64,
    observed_generation: i64,
    conditions: &[ConditionTuple<'_>],
) -> String {
    let conditions: Vec<_> = conditions
        .iter()
        .map(|(condition_type, status, reason, message)| {
            serde_json::json!({
                "type": condition_type,
                "status": status,
                "reason": reason,
                "message": message,
                "lastTransitionTime": "2026-01-01T00:00:00Z"
            })
        })
        .collect();

    serde_json::json!({
        "apiVersion": api_version,
        "kind": kind,
        "metadata": {
            "name": name,
            "namespace": "flux-system",
            "generation": generation,
            "resourceVersion": "1000",
            "uid": "test-uid"
        },
        "spec": {
            "interval": "10m"
        },
        "status": {
            "observedGeneration": observed_generation,
            "conditions": conditions
        }
    })
    .to_string()
}

pub fn oci_repository_json(conditions: &[ConditionTuple<'_>]) -> String {
    flux_object_json(
        "source.toolkit.fluxcd.io/v1",
        "OCIRepository",
        "flux-system",
        1,
        1,
        conditions,
    )
}

pub fn kustomization_json(
    generation: i64,
    observed_generation: i64,
    conditions: &[ConditionTuple<'_>],
) -> String {
    flux_object_json(
        "kustomize.toolkit.fluxcd.io/v1",
        "Kustomization",
        "flux-system",
        generation,
        observed_generation,
        conditions,
    )
}
