#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};

pub const SECRET_KEY: &str = "jobly-integration-secret";

// Shared by the tests of one binary; the child is killed once no test holds it.
static SERVER: Mutex<Weak<TestServer>> = Mutex::new(Weak::new());
static COUNTER: AtomicU32 = AtomicU32::new(0);

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    child: Child,
}

impl TestServer {
    fn spawn(database_url: &str) -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        // Cargo builds the binary before integration tests run
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_jobly"));
        cmd.args(["serve", "--migrate", "--port", &port.to_string()])
            .env("APP_ENV", "test")
            .env("DATABASE_URL", database_url)
            .env("SECRET_KEY", SECRET_KEY)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self { port, base_url, child })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        let url = format!("{}/health", self.base_url);
        while Instant::now() < deadline {
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// Spawn, or share the running, server against `DATABASE_URL`.
///
/// Returns `None` when no database is configured so the suite can be run
/// without Postgres.
pub async fn ensure_server() -> Result<Option<Arc<TestServer>>> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set, skipping integration test");
        return Ok(None);
    };

    let server = {
        let mut shared = SERVER.lock().unwrap_or_else(|e| e.into_inner());
        match shared.upgrade() {
            Some(server) => server,
            None => {
                let server = Arc::new(TestServer::spawn(&database_url)?);
                *shared = Arc::downgrade(&server);
                server
            }
        }
    };
    server.wait_ready(Duration::from_secs(15)).await?;
    Ok(Some(server))
}

/// A name no other test run has used, for handles and usernames.
pub fn unique(prefix: &str) -> String {
    let n = COUNTER.fetch_add(1, Ordering::SeqCst);
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or(0);
    format!("{}{}{}{}", prefix, std::process::id() % 10_000, nanos % 100_000, n)
}

/// Sign a token the spawned server will accept.
pub fn token_for(username: &str, is_admin: bool) -> String {
    let now = chrono::Utc::now().timestamp();
    let claims = json!({
        "username": username,
        "isAdmin": is_admin,
        "iat": now,
        "exp": now + 3600,
    });
    jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(SECRET_KEY.as_bytes()),
    )
    .expect("sign test token")
}

pub fn admin_token() -> String {
    token_for("test-admin", true)
}

/// Create a company through the API and return its handle.
pub async fn create_company(server: &TestServer, num_employees: i32) -> Result<String> {
    let handle = unique("c");
    let res = reqwest::Client::new()
        .post(server.url("/companies"))
        .bearer_auth(admin_token())
        .json(&json!({
            "handle": handle,
            "name": format!("Company {}", handle),
            "description": "Integration test company",
            "numEmployees": num_employees,
        }))
        .send()
        .await?;
    anyhow::ensure!(res.status() == StatusCode::CREATED, "create company: {}", res.status());
    Ok(handle)
}

/// Create a job through the API and return its id.
pub async fn create_job(server: &TestServer, company: &str, body: Value) -> Result<i64> {
    let mut body = body;
    body["companyHandle"] = json!(company);
    let res = reqwest::Client::new()
        .post(server.url("/jobs"))
        .bearer_auth(admin_token())
        .json(&body)
        .send()
        .await?;
    anyhow::ensure!(res.status() == StatusCode::CREATED, "create job: {}", res.status());
    let json: Value = res.json().await?;
    json["job"]["id"].as_i64().context("job id missing")
}

/// Register a regular user and return `(username, token)`.
pub async fn register_user(server: &TestServer) -> Result<(String, String)> {
    let username = unique("u");
    let res = reqwest::Client::new()
        .post(server.url("/auth/register"))
        .json(&json!({
            "username": username,
            "password": "password1",
            "firstName": "Test",
            "lastName": "User",
            "email": "test@example.com",
        }))
        .send()
        .await?;
    anyhow::ensure!(res.status() == StatusCode::CREATED, "register: {}", res.status());
    let json: Value = res.json().await?;
    let token = json["token"].as_str().context("token missing")?.to_string();
    Ok((username, token))
}
