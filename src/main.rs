use anyhow::Context;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use taskflow::config::Config;
use taskflow::handlers::{
    CreateProjectRequest, CreateTaskRequest, ProjectResponse, TaskResponse, TaskSummaryResponse,
    UpdateProjectRequest, UpdateTaskRequest,
};
use taskflow::state::AppState;
use taskflow::{build_router, handlers};

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::project::create_project,
        handlers::project::list_projects,
        handlers::project::update_project,
        handlers::project::delete_project,
        handlers::task::create_task,
        handlers::task::list_tasks,
        handlers::task::get_task,
        handlers::task::update_task,
        handlers::task::toggle_task,
        handlers::task::delete_task,
        handlers::task::task_summary,
    ),
    components(schemas(
        CreateProjectRequest,
        UpdateProjectRequest,
        ProjectResponse,
        CreateTaskRequest,
        UpdateTaskRequest,
        TaskResponse,
        TaskSummaryResponse,
    )),
    tags(
        (name = "Projects", description = "Project management endpoints"),
        (name = "Tasks", description = "Task management, filtering and summary endpoints")
    )
)]
struct ApiDoc;

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,sqlx=warn"));

    if std::env::var("LOG_FORMAT").is_ok_and(|f| f == "json") {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    init_tracing();
    let addr = config.server_addr();

    // Connect, migrate and seed the Inbox
    tracing::info!("Connecting to database...");
    let state = AppState::new(config)
        .await
        .context("Failed to initialize application state")?;
    tracing::info!("Database ready");

    // Build the main application router
    let app = build_router(state.clone())
        // Add Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!("Server started on http://{}", addr);
    tracing::info!("Swagger UI: http://{}/swagger-ui/", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    state.close().await.context("Failed to close database")?;
    tracing::info!("Server stopped");
    Ok(())
}
