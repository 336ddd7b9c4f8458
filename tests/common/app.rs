use std::path::PathBuf;

use axum_test::TestServer;
use taskflow::build_router;
use taskflow::config::Config;
use taskflow::state::AppState;
use uuid::Uuid;

/// Test configuration: a private in-memory database per test
pub fn test_config() -> Config {
    Config {
        static_dir: concat!(env!("CARGO_MANIFEST_DIR"), "/static").to_string(),
        ..Config::in_memory()
    }
}

/// A database file in the temp dir, removed with its WAL files on drop
pub struct TempDatabase {
    path: PathBuf,
}

impl TempDatabase {
    pub fn new() -> Self {
        let path = std::env::temp_dir().join(format!("taskflow-{}.db", Uuid::new_v4().simple()));
        Self { path }
    }

    /// File-backed configuration with a multi-connection pool
    pub fn config(&self) -> Config {
        Config {
            database_url: format!("sqlite://{}?mode=rwc", self.path.display()),
            database_max_connections: 5,
            ..test_config()
        }
    }
}

impl Drop for TempDatabase {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{}", self.path.display(), suffix));
        }
    }
}

/// Test application wrapper
pub struct TestApp {
    pub server: TestServer,
    pub state: AppState,
}

impl TestApp {
    /// Create a new test application
    pub async fn new() -> Self {
        Self::with_config(test_config()).await
    }

    /// Create a test application over the given configuration
    pub async fn with_config(config: Config) -> Self {
        let state = AppState::new(config)
            .await
            .expect("Failed to create test app state");

        let router = build_router(state.clone());
        let server = TestServer::new(router).expect("Failed to create test server");

        Self { server, state }
    }
}
