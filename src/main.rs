use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use liveqa::api;
use liveqa::config::ServerConfig;
use liveqa::moderation::{ClassifierConfig, ResponseClassifier};
use liveqa::service::EventService;
use liveqa::store::MemoryStore;

#[tokio::main]
async fn main() {
    // Load .env file if present (before any env var reads)
    if let Err(e) = dotenvy::dotenv() {
        // Not an error if .env doesn't exist, only log if it's a different issue
        if !matches!(e, dotenvy::Error::Io(_)) {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "liveqa=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting LiveQA...");

    let config = ServerConfig::from_env();

    // Optional response screening, off unless an endpoint is configured
    let classifier = match ClassifierConfig::from_env().build() {
        Ok(Some(classifier)) => {
            tracing::info!("Response classifier enabled ({})", classifier.name());
            Some(Arc::new(classifier) as Arc<dyn ResponseClassifier>)
        }
        Ok(None) => {
            tracing::info!("No classifier configured, responses are posted unscreened");
            None
        }
        Err(e) => {
            tracing::warn!(
                "Failed to initialize the response classifier: {}. Responses are posted unscreened.",
                e
            );
            None
        }
    };

    let store = Arc::new(MemoryStore::new());
    let service = Arc::new(match classifier {
        Some(classifier) => EventService::with_classifier(store, classifier),
        None => EventService::new(store),
    });

    let app = api::router(service)
        .fallback_service(ServeDir::new(&config.static_dir))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    tracing::info!("Listening on http://{}", config.addr);

    let listener = tokio::net::TcpListener::bind(config.addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
