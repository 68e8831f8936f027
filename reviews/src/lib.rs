pub mod config;
pub mod errors;
pub mod handler;
pub mod locations;
pub mod metrics_defs;
pub mod query;
pub mod ranker;
pub mod seed;
pub mod sentiment;
pub mod service;
pub mod store;
pub mod types;

#[cfg(test)]
mod testutils;

use errors::ReviewsError;
use handler::ReviewHandler;
use sentiment::LexiconScorer;
use service::ReviewService;
use shared::admin_service::AdminService;
use shared::http::{run_http_service, serve_listener};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use store::ReviewStore;
use tokio::net::TcpListener;

/// Builds the handler for a validated config, preloading the seed file if one is set.
pub fn build_handler(config: &config::Config) -> Result<ReviewHandler, ReviewsError> {
    config.validate()?;

    let store = ReviewStore::new();
    if let Some(path) = &config.seed_file {
        seed::load_seed(path, &store)?;
    }

    let allow_list = config.allow_list();
    tracing::info!(
        locations = allow_list.len(),
        reviews = store.len(),
        "review store initialised"
    );

    Ok(ReviewHandler::new(
        store,
        allow_list,
        Arc::new(LexiconScorer::new()),
    ))
}

/// Binds the review listener, marking the service ready only once the bind succeeded.
async fn bind_reviews_listener(
    listener: &config::Listener,
    ready: &AtomicBool,
) -> Result<TcpListener, ReviewsError> {
    let bound = TcpListener::bind(format!("{}:{}", listener.host, listener.port)).await?;
    tracing::info!(host = %listener.host, port = listener.port, "listening");
    ready.store(true, Ordering::Relaxed);
    Ok(bound)
}

fn admin_service(
    ready: Arc<AtomicBool>,
) -> AdminService<impl Fn() -> bool + Send + Sync + 'static, ReviewsError> {
    AdminService::new(move || ready.load(Ordering::Relaxed))
}

pub async fn run(config: config::Config) -> Result<(), ReviewsError> {
    shared::metrics_defs::describe_all(metrics_defs::ALL_METRICS);

    let handler = build_handler(&config)?;
    let ready = Arc::new(AtomicBool::new(false));

    let reviews_task = async {
        let listener = bind_reviews_listener(&config.listener, &ready).await?;
        serve_listener::<_, ReviewsError>(listener, ReviewService::new(handler)).await
    };

    let admin_task = async {
        match &config.admin_listener {
            Some(admin) => {
                run_http_service(&admin.host, admin.port, admin_service(ready.clone())).await
            }
            None => std::future::pending().await,
        }
    };

    tokio::try_join!(reviews_task, admin_task)?;
    Ok(())
}
