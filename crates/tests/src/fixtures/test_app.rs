use groupframe_api::{build_router, state::AppState};
use groupframe_config::Settings;
use groupframe_db::{connection::connect_named, indexes::ensure_indexes};
use mongodb::Database;
use std::net::SocketAddr;
use tokio::net::TcpListener;

/// A running test application with its own MongoDB database.
pub struct TestApp {
    pub addr: SocketAddr,
    pub base_url: String,
    pub db: Database,
    pub settings: Settings,
    pub client: reqwest::Client,
    /// Render output lands here; removed with the app.
    pub output_dir: tempfile::TempDir,
}

impl TestApp {
    /// Spawn a new test server connected to the test MongoDB.
    ///
    /// Requires a running MongoDB; set GROUPFRAME__DATABASE__URL to point
    /// at it. Each test gets a unique database name for isolation.
    pub async fn spawn() -> Self {
        Self::spawn_with_settings(|_| {}).await
    }

    /// Spawn a test server with customized settings.
    ///
    /// The `mutator` closure receives a `&mut Settings` after defaults are
    /// applied, allowing tests to tweak specific fields.
    pub async fn spawn_with_settings(mutator: impl FnOnce(&mut Settings)) -> Self {
        let db_name = format!("groupframe_test_{}", uuid::Uuid::new_v4().simple());
        let output_dir = tempfile::tempdir().expect("Failed to create output dir");

        let mut settings = Settings::load().expect("Failed to load settings");
        settings.database.name = db_name.clone();
        settings.jwt.secret = "test-secret-key-for-jwt-signing-minimum-32-chars".to_string();
        settings.sms.api_url = None;
        settings.render.output_dir = output_dir.path().display().to_string();

        mutator(&mut settings);

        let db = connect_named(&settings.database, &db_name)
            .await
            .expect("Failed to connect to MongoDB");
        ensure_indexes(&db).await.expect("Failed to create indexes");

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let addr = listener.local_addr().expect("No local address");
        let base_url = format!("http://{}", addr);
        settings.render.api_base = format!("{}/api", base_url);

        let app = build_router(AppState::new(db.clone(), settings.clone()));
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Test server failed");
        });

        let client = reqwest::Client::builder()
            .cookie_store(true)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            addr,
            base_url,
            db,
            settings,
            client,
            output_dir,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let db = self.db.clone();
        // Best effort cleanup: drop the test database
        tokio::spawn(async move {
            let _ = db.drop().await;
        });
    }
}
