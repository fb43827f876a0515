#![allow(dead_code)]

use std::net::TcpListener;

use awc::http::StatusCode;
use awc::{Client, ClientRequest};
use serde_json::Value;

use marketing_server::database::memory::MemoryDatabase;
use marketing_server::permission::TokenPermissionChecker;

pub const ADMIN_TOKEN: &str = "admin-test-token";
pub const MEMBER_TOKEN: &str = "member-test-token";

/// A server on an ephemeral port backed by a fresh in-memory store.
pub struct TestApp {
    address: String,
    client: Client,
}

impl TestApp {
    pub fn spawn() -> TestApp {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let address = format!("http://{}", listener.local_addr().unwrap());

        let server = marketing_server::server(
            Box::new(MemoryDatabase::new()),
            Box::new(TokenPermissionChecker::new(vec![ADMIN_TOKEN])),
            listener,
        )
        .unwrap();
        actix_rt::spawn(server);

        TestApp {
            address,
            client: Client::default(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    fn authorize(request: ClientRequest, token: Option<&str>) -> ClientRequest {
        match token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    pub async fn get(&self, path: &str) -> (StatusCode, Value) {
        send(self.client.get(self.url(path)), None).await
    }

    pub async fn post(&self, path: &str, body: &Value) -> (StatusCode, Value) {
        self.post_as(None, path, body).await
    }

    pub async fn post_as(
        &self,
        token: Option<&str>,
        path: &str,
        body: &Value,
    ) -> (StatusCode, Value) {
        let request = TestApp::authorize(self.client.post(self.url(path)), token);
        send(request, Some(body)).await
    }

    pub async fn put(&self, path: &str, body: &Value) -> (StatusCode, Value) {
        self.put_as(None, path, body).await
    }

    pub async fn put_as(
        &self,
        token: Option<&str>,
        path: &str,
        body: &Value,
    ) -> (StatusCode, Value) {
        let request = TestApp::authorize(self.client.put(self.url(path)), token);
        send(request, Some(body)).await
    }

    pub async fn post_raw(&self, path: &str, body: &'static str) -> (StatusCode, Value) {
        let mut response = self
            .client
            .post(self.url(path))
            .insert_header(("content-type", "application/json"))
            .send_body(body)
            .await
            .unwrap();

        let status = response.status();
        let body: Value = response.json().await.unwrap();
        (status, body)
    }
}

async fn send(request: ClientRequest, body: Option<&Value>) -> (StatusCode, Value) {
    let mut response = match body {
        Some(body) => request.send_json(body).await,
        None => request.send().await,
    }
    .unwrap();

    let status = response.status();
    let body: Value = response.json().await.unwrap();
    (status, body)
}

/// The string id of a rendered record.
pub fn id_of(body: &Value) -> String {
    body["id"].as_str().unwrap().to_owned()
}

pub fn error_paths(body: &Value) -> Vec<String> {
    body["errorMeta"]["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|error| error["path"].as_str().unwrap().to_owned())
        .collect()
}
