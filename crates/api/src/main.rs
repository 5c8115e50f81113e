use groupframe_api::{build_router, state::AppState};
use groupframe_config::Settings;
use groupframe_db::{connect, indexes::ensure_indexes};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file (silently ignore if missing)
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "groupframe_api=debug,groupframe_services=debug,groupframe_db=debug,groupframe_render=debug,tower_http=debug"
                .into()
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Settings::load()?;
    info!("Starting GroupFrame API on {}:{}", settings.app.host, settings.app.port);
    info!(
        render_api_base = %settings.render.api_base,
        output_dir = %settings.render.output_dir,
        sms_configured = settings.sms.api_url.is_some(),
        "Render/SMS config"
    );

    let db = connect(&settings).await?;
    ensure_indexes(&db).await?;

    let app = build_router(AppState::new(db, settings.clone()));

    let addr = format!("{}:{}", settings.app.host, settings.app.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
