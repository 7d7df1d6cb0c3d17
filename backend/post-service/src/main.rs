use actix_web::{web, App, HttpResponse, HttpServer};
use aws_config::BehaviorVersion;
use post_service::media::{DisabledImageUploader, ImageUploader, S3ImageUploader};
use post_service::middleware::{JwtAuthMiddleware, TokenVerifier};
use post_service::repository::{InMemoryPostStore, PgPostStore, PostStore};
use post_service::services::PostEngine;
use post_service::users::{InMemoryUserDirectory, PgUserDirectory, UserDirectory};
use post_service::{db, handlers, Config};
use sqlx::PgPool;
use std::io;
use std::sync::Arc;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

struct HealthState {
    db_pool: Option<PgPool>,
}

impl HealthState {
    async fn check_postgres(&self) -> Result<(), sqlx::Error> {
        match &self.db_pool {
            Some(pool) => sqlx::query("SELECT 1").fetch_one(pool).await.map(|_| ()),
            None => Ok(()),
        }
    }
}

async fn liveness_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "service": "post-service",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn readiness_check(state: web::Data<HealthState>) -> HttpResponse {
    let storage = match state.db_pool {
        Some(_) => "postgresql",
        None => "memory",
    };
    match state.check_postgres().await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({
            "ready": true,
            "storage": storage,
        })),
        Err(e) => HttpResponse::ServiceUnavailable().json(serde_json::json!({
            "ready": false,
            "error": format!("PostgreSQL connection failed: {}", e),
        })),
    }
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = terminate.recv() => {},
                }
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {}", e);
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

fn fail(context: &str, err: impl std::fmt::Display) -> io::Error {
    io::Error::new(io::ErrorKind::Other, format!("{context}: {err}"))
}

/// Post Service
///
/// Serves the social-feed Post aggregate: posts, likes, comments and replies
/// under `/api/posts`, plus `/api/v1/health` checks.
///
/// Pass `--in-memory` to run without PostgreSQL (local development and demos).
#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenvy::dotenv().ok();

    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("ERROR: Failed to load configuration: {:#}", e);
            std::process::exit(1);
        }
    };

    let json_logs = config.app.json_logs;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,actix_web=info,sqlx=warn".into()),
        )
        .with(json_logs.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json_logs).then(tracing_subscriber::fmt::layer))
        .init();

    tracing::info!("Starting post-service v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {}", config.app.env);

    let in_memory = std::env::args().skip(1).any(|arg| arg == "--in-memory");

    let (store, users, db_pool): (Arc<dyn PostStore>, Arc<dyn UserDirectory>, Option<PgPool>) =
        if in_memory {
            tracing::warn!("Running with in-memory storage; data is lost on exit");
            (
                Arc::new(InMemoryPostStore::new()),
                Arc::new(InMemoryUserDirectory::new()),
                None,
            )
        } else {
            let pool = match db::init_pool(&config.database).await {
                Ok(pool) => pool,
                Err(e) => {
                    tracing::error!("Database pool creation failed: {:#}", e);
                    eprintln!("ERROR: Failed to create database pool: {}", e);
                    std::process::exit(1);
                }
            };
            db::MIGRATOR
                .run(&pool)
                .await
                .map_err(|e| fail("Failed to run migrations", e))?;
            tracing::info!("Database migrations applied");

            (
                Arc::new(PgPostStore::new(pool.clone())),
                Arc::new(PgUserDirectory::new(pool.clone())),
                Some(pool),
            )
        };

    let uploader: Arc<dyn ImageUploader> = match &config.media.bucket {
        Some(bucket) => {
            let aws = aws_config::load_defaults(BehaviorVersion::latest()).await;
            tracing::info!(%bucket, "Image uploads go to S3");
            Arc::new(S3ImageUploader::new(
                aws_sdk_s3::Client::new(&aws),
                bucket.clone(),
                config.media.public_base_url.clone(),
                config.media.key_prefix.clone(),
            ))
        }
        None => {
            tracing::warn!("MEDIA_BUCKET not set; posts with images will be refused");
            Arc::new(DisabledImageUploader)
        }
    };

    let verifier = TokenVerifier::new(&config.auth.jwt_secret)
        .map_err(|e| fail("Failed to initialize JWT verification", e))?;
    let auth = JwtAuthMiddleware::new(Arc::new(verifier));

    let engine = web::Data::new(PostEngine::new(store, users, uploader));
    let health = web::Data::new(HealthState { db_pool });

    let bind_address = format!("{}:{}", config.app.host, config.app.http_port);
    tracing::info!("Starting HTTP server at {}", bind_address);

    let http_config = config.http.clone();
    tracing::info!(origins = %http_config.allowed_origins, "CORS configured");

    let server = HttpServer::new(move || {
        let auth = auth.clone();
        let http_config = http_config.clone();
        App::new()
            .wrap(TracingLogger::default())
            .app_data(engine.clone())
            .app_data(health.clone())
            .route("/api/v1/health", web::get().to(liveness_check))
            .route("/api/v1/health/live", web::get().to(liveness_check))
            .route("/api/v1/health/ready", web::get().to(readiness_check))
            .configure(move |cfg| handlers::configure(cfg, auth, &http_config))
    })
    .bind(&bind_address)?
    .disable_signals()
    .shutdown_timeout(30)
    .run();

    let handle = server.handle();
    tokio::spawn(async move {
        shutdown_signal().await;
        tracing::info!("Shutdown signal received, draining connections");
        handle.stop(true).await;
    });

    server.await?;
    tracing::info!("post-service stopped");
    Ok(())
}
