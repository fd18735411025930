//! Swipe Server - local paper feed backend
//!
//! HTTP API over the topic color assigner, feed assembly and the reader
//! library. Topic colors and the library share one SQLite file so several
//! server processes can run against the same data.

pub mod http;

use std::path::Path;
use std::sync::{Arc, Mutex};

use axum::{
    http::Method,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use swipe_feed::FeedAssembler;
use swipe_library::Repository;
use swipe_topics::{
    MemoryTopicColorStore, Palette, SqliteTopicColorStore, SwipeConfig, TopicColorAssigner,
};

/// Shared application state
pub struct AppState {
    pub assigner: Arc<TopicColorAssigner>,
    pub feed: FeedAssembler,
    pub library: Mutex<Repository>,
}

impl AppState {
    pub fn new(assigner: Arc<TopicColorAssigner>, library: Repository) -> Self {
        Self {
            feed: FeedAssembler::new(assigner.clone()),
            assigner,
            library: Mutex::new(library),
        }
    }

    /// Process-local state with the default palette (for testing)
    pub fn in_memory() -> Result<Self, Box<dyn std::error::Error>> {
        let assigner = TopicColorAssigner::new(
            Arc::new(MemoryTopicColorStore::new()),
            Palette::default(),
        );
        Ok(Self::new(Arc::new(assigner), Repository::in_memory()?))
    }

    /// Open the configured database for both topic colors and the library.
    pub fn from_config(config: &SwipeConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let db_path = config.store.database_path();
        Self::with_database(&db_path, config)
    }

    pub fn with_database(
        db_path: &Path,
        config: &SwipeConfig,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        // A statement abandoned by the assigner's timeout should not hold
        // the connection much longer than that.
        let store = match config.store.timeout() {
            Some(limit) => SqliteTopicColorStore::open_with_busy_timeout(db_path, limit)?,
            None => SqliteTopicColorStore::open(db_path)?,
        };
        let assigner = TopicColorAssigner::from_config(Arc::new(store), config)?;
        let library = Repository::new(db_path)?;
        tracing::info!("Using database {:?}", db_path);

        Ok(Self::new(Arc::new(assigner), library))
    }
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::HEAD,
            Method::POST,
            Method::PUT,
            Method::DELETE,
        ])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(http::health))
        // Topic colors
        .route("/topic-colors", get(http::list_topic_colors))
        .route("/topic-colors/{topic}", get(http::get_topic_color))
        // Feed
        .route("/feed/page", post(http::build_feed_page))
        // Library
        .route("/users/{user}/likes", get(http::list_likes))
        .route("/users/{user}/likes", post(http::toggle_like))
        .route("/users/{user}/likes/{title}", delete(http::delete_like))
        .route("/users/{user}/profile", get(http::get_profile))
        .route("/users/{user}/profile", put(http::save_profile))
        .route("/update-interests", post(http::update_interests))
        // Ranked papers
        .route("/papers", post(http::add_paper))
        .route("/papers/search", post(http::search_papers))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Start the server
pub async fn serve(addr: &str, state: Arc<AppState>) -> Result<(), Box<dyn std::error::Error>> {
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Swipe server listening on {}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}
