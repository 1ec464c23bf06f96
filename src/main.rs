mod core;
mod features;
mod modules;
mod shared;

use crate::core::config::{Config, SwaggerConfig};
use crate::core::openapi::{ApiDoc, SwaggerInfoModifier};
use crate::core::{database, middleware};
use crate::features::admin::{routes as admin_routes, StatsService};
use crate::features::articles::routes as articles_routes;
use crate::features::articles::services::{ArticleService, FeedChannel, FeedService};
use crate::features::auth;
use crate::features::auth::routes as auth_routes;
use crate::features::auth::services::AuthService;
use crate::features::categories::routes as categories_routes;
use crate::features::categories::services::CategoryService;
use crate::features::chat::routes as chat_routes;
use crate::features::chat::services::ChatService;
use crate::features::comments::routes as comments_routes;
use crate::features::comments::services::CommentService;
use crate::features::contact::routes as contact_routes;
use crate::features::contact::services::ContactService;
use crate::features::settings::routes as settings_routes;
use crate::features::settings::services::SettingsService;
use crate::features::subscribers::routes as subscribers_routes;
use crate::features::subscribers::services::{NewsletterNotifier, SubscriberService};
use crate::features::uploads::routes as uploads_routes;
use crate::features::uploads::services::UploadService;
use crate::modules::llm::{ChatCompletion, OpenAiClient};
use crate::modules::storage::{MinIOClient, ObjectStore};
use axum::extract::DefaultBodyLimit;
use axum::{middleware::from_fn_with_state, Router};
use std::sync::Arc;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::Modify;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

fn main() -> anyhow::Result<()> {
    // Build Tokio runtime with configurable worker threads
    let worker_threads = std::env::var("TOKIO_WORKER_THREADS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(4)
        });

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(worker_threads)
        .max_blocking_threads(worker_threads * 4)
        .enable_all()
        .build()?;

    runtime.block_on(async_main(worker_threads))
}

async fn async_main(worker_threads: usize) -> anyhow::Result<()> {
    // Load .env file BEFORE initializing logger so RUST_LOG is available
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    // Log system info
    let available_cpus = std::thread::available_parallelism()
        .map(|p| p.get())
        .unwrap_or(1);
    tracing::info!(
        "System info: available_cpus={}, tokio_worker_threads={}, pid={}",
        available_cpus,
        worker_threads,
        std::process::id()
    );

    tracing::info!("Configuration loaded successfully");

    // Create database connection pool
    let pool = database::create_pool(&config.database).await?;
    tracing::info!("Database connection pool created");

    // Run migrations automatically
    tracing::info!("Running database migrations...");
    database::run_migrations(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;
    tracing::info!("Database migrations completed successfully");

    // Initialize auth
    let jwt_validator = Arc::new(auth::JwtValidator::new(
        &config.admin_auth.jwt_secret,
        config.admin_auth.jwt_leeway,
    ));
    let auth_service = Arc::new(
        AuthService::new(&config.admin_auth)
            .map_err(|e| anyhow::anyhow!("Failed to initialize auth: {}", e))?,
    );
    tracing::info!("Auth initialized for admin '{}'", config.admin_auth.username);

    // Initialize MinIO client for storage
    let minio_client = MinIOClient::new(config.minio.clone())
        .await
        .map_err(|e| anyhow::anyhow!("Failed to initialize MinIO client: {}", e))?;
    // Ensure bucket exists (create if not)
    minio_client
        .ensure_bucket_exists()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to ensure MinIO bucket exists: {}", e))?;
    tracing::info!(
        "MinIO client initialized for bucket: {}",
        minio_client.bucket_name()
    );
    let object_store: Arc<dyn ObjectStore> = Arc::new(minio_client);

    // Outgoing mail
    let mailer = modules::mailer::from_config(&config.mail)
        .map_err(|e| anyhow::anyhow!("Failed to initialize mailer: {}", e))?;

    // Language model for the chat assistant (optional)
    let llm: Option<Arc<dyn ChatCompletion>> = match OpenAiClient::from_config(&config.llm)
        .map_err(|e| anyhow::anyhow!("Failed to initialize LLM client: {}", e))?
    {
        Some(client) => {
            tracing::info!("Chat assistant enabled (models: {:?})", config.llm.models);
            Some(Arc::new(client))
        }
        None => {
            tracing::warn!("OPENAI_API_KEY not set, chat assistant disabled");
            None
        }
    };

    let category_service = Arc::new(CategoryService::new(pool.clone()));
    let article_service = Arc::new(ArticleService::new(pool.clone()));
    let feed_service = Arc::new(FeedService::new(
        Arc::clone(&article_service),
        FeedChannel {
            title: config.app.site_title.clone(),
            description: config.app.site_description.clone(),
            site_url: config.app.site_url.clone(),
        },
    ));
    let comment_service = Arc::new(CommentService::new(
        pool.clone(),
        config.comments.auto_approve,
    ));
    let subscriber_service = Arc::new(SubscriberService::new(
        pool.clone(),
        NewsletterNotifier::new(
            Arc::clone(&mailer),
            config.mail.admin_email.clone(),
            config.app.site_title.clone(),
            config.app.site_url.clone(),
        ),
    ));
    let contact_service = Arc::new(ContactService::new(
        Arc::clone(&mailer),
        config.mail.admin_email.clone(),
        config.app.site_title.clone(),
    ));
    let upload_service = Arc::new(UploadService::new(pool.clone(), object_store));
    let settings_service = Arc::new(SettingsService::new(pool.clone()));
    let chat_service = Arc::new(ChatService::new(
        pool.clone(),
        Arc::clone(&settings_service),
        llm,
        config.app.site_title.clone(),
    ));
    let stats_service = Arc::new(StatsService::new(pool.clone()));
    tracing::info!("Services initialized");

    let swagger = swagger_router(&config.swagger);

    // Admin routes (require JWT authentication)
    let protected_routes = Router::new()
        .merge(auth_routes::protected_routes(Arc::clone(&auth_service)))
        .merge(categories_routes::admin_routes(Arc::clone(&category_service)))
        .merge(articles_routes::admin_routes(Arc::clone(&article_service)))
        .merge(comments_routes::admin_routes(Arc::clone(&comment_service)))
        .merge(subscribers_routes::admin_routes(Arc::clone(
            &subscriber_service,
        )))
        .merge(uploads_routes::admin_routes(Arc::clone(&upload_service)))
        .merge(chat_routes::admin_routes(Arc::clone(&chat_service)))
        .merge(settings_routes::admin_routes(settings_service))
        .merge(admin_routes::routes(stats_service))
        .route_layer(from_fn_with_state(
            jwt_validator,
            middleware::auth_middleware,
        ));

    // Simple health check endpoint (no auth required)
    async fn health_check() -> axum::http::StatusCode {
        axum::http::StatusCode::OK
    }
    let health_route = Router::new().route("/health", axum::routing::get(health_check));

    // Public routes (no auth required)
    let public_routes = Router::new()
        .merge(auth_routes::public_routes(auth_service))
        .merge(categories_routes::routes(category_service))
        .merge(articles_routes::routes(article_service, feed_service))
        .merge(comments_routes::routes(comment_service))
        .merge(subscribers_routes::routes(subscriber_service))
        .merge(contact_routes::routes(contact_service))
        .merge(uploads_routes::routes(upload_service))
        .merge(chat_routes::routes(chat_service));

    let app = Router::new()
        .merge(swagger)
        .merge(protected_routes)
        .merge(public_routes)
        .merge(health_route)
        .layer(DefaultBodyLimit::max(config.app.max_request_body_size))
        .layer(middleware::cors_layer(
            config.app.cors_allowed_origins.clone(),
        ))
        // Propagate X-Request-Id to response headers
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(middleware::MakeSpanWithRequestId)
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Generate X-Request-Id using UUID v7 (or use client-provided one)
        .layer(SetRequestIdLayer::x_request_id(middleware::MakeRequestUuid));

    let addr = config.app.server_address();
    let listener = bind_listener(&addr)?;
    tracing::info!("Server listening on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui/", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Swagger UI and the OpenAPI document, behind basic auth when credentials are set
fn swagger_router(config: &SwaggerConfig) -> Router {
    let mut openapi = ApiDoc::openapi();
    SwaggerInfoModifier {
        title: config.title.clone(),
        version: config.version.clone(),
        description: config.description.clone(),
    }
    .modify(&mut openapi);

    let router =
        Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi));

    match config.credentials() {
        Some(credentials) => {
            tracing::info!("Swagger UI basic auth enabled");
            router.layer(from_fn_with_state(
                Arc::new(credentials),
                middleware::swagger_basic_auth,
            ))
        }
        None => {
            tracing::warn!("Swagger UI is public (no credentials configured)");
            router
        }
    }
}

/// Listening socket with address reuse, no Nagle and TCP keepalive
fn bind_listener(addr: &str) -> anyhow::Result<tokio::net::TcpListener> {
    let socket_addr: std::net::SocketAddr = addr
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid address {}: {}", addr, e))?;

    let socket = socket2::Socket::new(
        socket2::Domain::for_address(socket_addr),
        socket2::Type::STREAM,
        Some(socket2::Protocol::TCP),
    )?;

    socket.set_reuse_address(true)?;
    #[cfg(unix)]
    socket.set_reuse_port(true)?;
    socket.set_nodelay(true)?;
    socket.set_tcp_keepalive(
        &socket2::TcpKeepalive::new().with_time(std::time::Duration::from_secs(60)),
    )?;

    socket.set_nonblocking(true)?;
    socket.bind(&socket_addr.into())?;
    socket.listen(1024)?;

    Ok(tokio::net::TcpListener::from_std(socket.into())?)
}
