#![allow(dead_code)]

use std::{
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, Response, StatusCode},
};
use employee_hr::{
    AppState,
    db::EmployeeStore,
    error::StoreError,
    model::{Employee, EmployeeDocument, EmployeeInput},
    router,
};
use mongodb::bson::{Bson, oid::ObjectId};
use serde_json::Value;
use tower::util::ServiceExt;

/// In-memory stand-in for the employees collection.
#[derive(Clone, Default)]
pub struct MemoryStore {
    docs: Arc<Mutex<Vec<EmployeeDocument>>>,
    calls: Arc<AtomicUsize>,
}

impl MemoryStore {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.docs.lock().unwrap().len()
    }

    fn touch(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl EmployeeStore for MemoryStore {
    async fn list(&self) -> Result<Vec<Employee>, StoreError> {
        self.touch();
        let docs = self.docs.lock().unwrap();
        Ok(docs.iter().cloned().map(Employee::from).collect())
    }

    async fn get(&self, id: ObjectId) -> Result<Option<Employee>, StoreError> {
        self.touch();
        let docs = self.docs.lock().unwrap();
        Ok(docs
            .iter()
            .find(|d| d.id == Some(Bson::ObjectId(id)))
            .cloned()
            .map(Employee::from))
    }

    async fn insert(&self, input: &EmployeeInput) -> Result<ObjectId, StoreError> {
        self.touch();
        let id = ObjectId::new();
        let mut doc = EmployeeDocument::from(input);
        doc.id = Some(Bson::ObjectId(id));
        self.docs.lock().unwrap().push(doc);
        Ok(id)
    }

    async fn update(&self, id: ObjectId, input: &EmployeeInput) -> Result<bool, StoreError> {
        self.touch();
        let mut docs = self.docs.lock().unwrap();
        match docs.iter_mut().find(|d| d.id == Some(Bson::ObjectId(id))) {
            Some(doc) => {
                doc.name = input.name.clone();
                doc.age = input.age;
                doc.salary = input.salary;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: ObjectId) -> Result<u64, StoreError> {
        self.touch();
        let mut docs = self.docs.lock().unwrap();
        let before = docs.len();
        docs.retain(|d| d.id != Some(Bson::ObjectId(id)));
        Ok((before - docs.len()) as u64)
    }
}

/// Store whose every operation times out.
pub struct TimedOutStore;

#[async_trait]
impl EmployeeStore for TimedOutStore {
    async fn list(&self) -> Result<Vec<Employee>, StoreError> {
        Err(timeout())
    }

    async fn get(&self, _id: ObjectId) -> Result<Option<Employee>, StoreError> {
        Err(timeout())
    }

    async fn insert(&self, _input: &EmployeeInput) -> Result<ObjectId, StoreError> {
        Err(timeout())
    }

    async fn update(&self, _id: ObjectId, _input: &EmployeeInput) -> Result<bool, StoreError> {
        Err(timeout())
    }

    async fn delete(&self, _id: ObjectId) -> Result<u64, StoreError> {
        Err(timeout())
    }
}

fn timeout() -> StoreError {
    StoreError::Timeout(Duration::from_secs(10))
}

pub fn app_with(store: impl EmployeeStore + 'static) -> Router {
    router(AppState::new(store))
}

pub async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> Response<Body> {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(serde_json::to_vec(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(request).await.unwrap()
}

pub async fn send_raw(app: &Router, method: &str, uri: &str, body: &str) -> Response<Body> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

pub async fn read_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn read_json(response: Response<Body>) -> Value {
    serde_json::from_str(&read_text(response).await).unwrap()
}

/// Creates an employee through the API and returns the stored record.
pub async fn create_employee(app: &Router, body: Value) -> Employee {
    let response = send(app, "POST", "/employee", Some(body)).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    serde_json::from_value(read_json(response).await).unwrap()
}
