//! Shared harness for the HTTP integration tests
#![allow(dead_code)]

use std::net::TcpListener;
use std::sync::Arc;

use chirpy::clock::MockClock;
use chirpy::configuration::{ApplicationSettings, AuthSettings, DatabaseSettings, Settings};
use chirpy::startup::run_with_clock;
use chirpy::store::InMemoryStore;
use serde_json::{json, Value};

pub const POLKA_KEY: &str = "f271c81ff7084ee5b99a5091b42d486e";
pub const PASSWORD: &str = "04234secret";

pub struct TestApp {
    pub address: String,
    pub clock: Arc<MockClock>,
    pub client: reqwest::Client,
}

fn settings(platform: &str) -> Settings {
    Settings {
        application: ApplicationSettings {
            host: "127.0.0.1".to_string(),
            port: 0,
            platform: platform.to_string(),
            static_dir: "./public".to_string(),
        },
        database: DatabaseSettings {
            username: "unused".to_string(),
            password: "unused".to_string(),
            port: 5432,
            host: "localhost".to_string(),
            database_name: "unused".to_string(),
        },
        auth: AuthSettings {
            jwt_secret: "integration-secret".to_string(),
            polka_key: POLKA_KEY.to_string(),
            bcrypt_cost: 4,
        },
    }
}

pub fn spawn_app() -> TestApp {
    spawn_app_on("dev")
}

pub fn spawn_app_on(platform: &str) -> TestApp {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let clock = Arc::new(MockClock::default());

    let server = run_with_clock(
        listener,
        Arc::new(InMemoryStore::new()),
        settings(platform),
        clock.clone(),
    )
    .expect("Failed to bind address");
    let _ = tokio::spawn(server);

    TestApp {
        address: format!("http://127.0.0.1:{}", port),
        clock,
        client: reqwest::Client::new(),
    }
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub async fn create_user(&self, email: &str) -> Value {
        let response = self
            .client
            .post(self.url("/api/users"))
            .json(&json!({ "email": email, "password": PASSWORD }))
            .send()
            .await
            .expect("Failed to execute request.");
        assert_eq!(201, response.status().as_u16());
        response.json().await.expect("Failed to parse response")
    }

    pub async fn login(&self, email: &str, password: &str) -> reqwest::Response {
        self.client
            .post(self.url("/api/login"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    /// Registers and logs in, returning `(access token, refresh token, user id)`
    pub async fn signed_in_user(&self, email: &str) -> (String, String, String) {
        let user = self.create_user(email).await;
        let body: Value = self
            .login(email, PASSWORD)
            .await
            .json()
            .await
            .expect("Failed to parse response");
        (
            body["token"].as_str().unwrap().to_string(),
            body["refresh_token"].as_str().unwrap().to_string(),
            user["id"].as_str().unwrap().to_string(),
        )
    }
}
