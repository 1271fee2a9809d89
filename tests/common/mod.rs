#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use chrono::Utc;
use reqwest::StatusCode;
use uuid::Uuid;

use orchard_api::auth::{generate_jwt, Claims, TokenUse};
use orchard_api::database::models::user::{User, UserRole};

static SERVER: OnceLock<TestServer> = OnceLock::new();

/// Shared by the spawned server and by tokens minted in-process, so both
/// sides verify against the same signing key.
pub const TEST_JWT_SECRET: &str = "orchard-integration-test-secret";

/// Registering this email against a live database yields an admin account.
pub const ADMIN_EMAIL: &str = "admin@orchard.test";
pub const TEST_PASSWORD: &str = "orchard-test-pass-1";

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // This process mints tokens through the library, which reads the
        // secret from the environment on first use. Pin it before anything
        // touches the config.
        std::env::set_var("JWT_SECRET", TEST_JWT_SECRET);

        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let media_root = std::env::temp_dir().join("orchard-test-media");

        let mut cmd = Command::new(env!("CARGO_BIN_EXE_orchard-api"));
        cmd.env("HOST", "127.0.0.1")
            .env("PORT", port.to_string())
            .env("JWT_SECRET", TEST_JWT_SECRET)
            .env("ORCHARD_ADMIN_EMAIL", ADMIN_EMAIL)
            .env("MEDIA_ROOT", &media_root)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        // DATABASE_URL is inherited; without one the server still starts and
        // /health reports 503
        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self {
            port,
            base_url,
            child,
        })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            match client.get(&url).send().await {
                Ok(resp) => {
                    // Ready means the router answers, even degraded
                    if resp.status() == StatusCode::OK
                        || resp.status() == StatusCode::SERVICE_UNAVAILABLE
                    {
                        return Ok(());
                    }
                }
                Err(_) => {}
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!(
            "server did not become ready on {} within {:?}",
            self.base_url,
            timeout
        )
    }
}

pub async fn ensure_server() -> Result<&'static TestServer> {
    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

fn stub_user(role: UserRole) -> User {
    User {
        id: Uuid::new_v4(),
        email: format!("{}@orchard.test", Uuid::new_v4().simple()),
        password_hash: String::new(),
        name: "Test User".to_string(),
        role,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

/// Access token for a user that exists only in the claims. Good enough for
/// routes that never touch the database before the guard answers.
pub fn mint_access_token(role: UserRole) -> String {
    let user = stub_user(role);
    generate_jwt(&Claims::new(&user, TokenUse::Access)).expect("token generation")
}

/// Refresh token minted the same way, for asserting it is refused on
/// access-guarded routes.
pub fn mint_refresh_token() -> String {
    let user = stub_user(UserRole::Customer);
    generate_jwt(&Claims::new(&user, TokenUse::Refresh)).expect("token generation")
}
