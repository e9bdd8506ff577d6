#[macro_use]
extern crate tracing;

use std::sync::Arc;

use actix_web::web::Data;
use actix_web::{middleware, web, App, HttpServer};
use anyhow::Context;
use helper::{env_load, env_load_or, env_var};
#[cfg(feature = "mimalloc")]
use mimalloc::MiMalloc;
use model::domain::pagination::PerPage;
use reqwest_middleware::ClientBuilder;
use reqwest_tracing::TracingMiddleware;
use tracing_actix_web::TracingLogger;

use crate::config::{EngineBaseUrl, SeedPath, ServerPort};
use crate::handler::*;
use crate::repository::negotiation_engine::{
    NegotiationEngine, NegotiationEngineRESTImpl,
};
use crate::repository::offer::{OfferRepository, OfferRepositoryHashMapImpl};
use crate::repository::seed::Seed;
use crate::repository::user::{UserRepository, UserRepositoryHashMapImpl};
use crate::service::eligibility::Eligibility;

#[cfg(feature = "mimalloc")]
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

mod config;
mod controller;
mod handler;
mod repository;
mod service;

env_var!(SERVER_PORT);
env_var!(NEGOTIATION_ENGINE_BASE_URL);
env_var!(SEED_PATH);
env_var!(PAGE_SIZE);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _guard = helper::init::init_subscriber("digiprime", "info")?;
    debug!("Tracing initialized.");

    let port = env_load!(ServerPort, SERVER_PORT, u16);
    let engine_url = env_load_or!(
        EngineBaseUrl,
        NEGOTIATION_ENGINE_BASE_URL,
        "http://localhost:5000"
    )
    .into_inner();
    let seed_path = env_load!(SeedPath, SEED_PATH).into_inner();
    let per_page = env_load_or!(PerPage, PAGE_SIZE, usize, 10);

    let seed = Seed::load(&seed_path)
        .await
        .with_context(|| format!("Cannot load the seed at {}", seed_path))?;
    info!(
        "Loaded {} users and {} offers",
        seed.users.len(),
        seed.offers.len()
    );

    let http_client = Arc::new(
        ClientBuilder::new(reqwest::Client::new())
            .with(TracingMiddleware::default())
            .build(),
    );

    // Repositories
    let offers: Arc<dyn OfferRepository> =
        Arc::new(OfferRepositoryHashMapImpl::new(seed.offers));
    let users: Arc<dyn UserRepository> =
        Arc::new(UserRepositoryHashMapImpl::new(seed.users));
    let engine: Arc<dyn NegotiationEngine> = Arc::new(
        NegotiationEngineRESTImpl::new(&engine_url, http_client),
    );

    // Services
    let eligibility = Arc::new(Eligibility::new(offers.clone(), users.clone()));

    info!(
        "Starting HTTP server on 0.0.0.0:{} against the engine at {}",
        port.into_inner(),
        engine_url
    );

    let offers = Data::from(offers);
    let users = Data::from(users);
    let engine = Data::from(engine);
    let eligibility = Data::from(eligibility);
    let per_page = Data::new(per_page);

    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Compress::default())
            .wrap(middleware::Logger::default())
            .wrap(TracingLogger::default())
            .app_data(Data::clone(&offers))
            .app_data(Data::clone(&users))
            .app_data(Data::clone(&engine))
            .app_data(Data::clone(&eligibility))
            .app_data(Data::clone(&per_page))
            .app_data(web::PathConfig::default().error_handler(bad_request))
            .app_data(web::JsonConfig::default().error_handler(bad_request))
            .app_data(web::QueryConfig::default().error_handler(bad_request))
            .service(
                web::scope("/api")
                    .route("/auctions", web::get().to(get_auctions))
                    .route("/auctions", web::post().to(post_auction))
                    .route(
                        "/auctions/history",
                        web::get().to(get_auction_history),
                    )
                    .route(
                        "/auctions/public",
                        web::get().to(get_public_auctions),
                    )
                    .route(
                        "/auctions/create",
                        web::get().to(get_auction_create_page),
                    )
                    .route("/auctions/{id}", web::get().to(get_auction))
                    .route("/auctions/{id}", web::post().to(post_auction_bid))
                    .route(
                        "/auctions/{id}/end",
                        web::post().to(post_auction_winner),
                    )
                    .route(
                        "/auctions/{id}/bids",
                        web::get().to(get_auction_bids),
                    )
                    .route(
                        "/auctions/{id}/join",
                        web::post().to(post_auction_join),
                    )
                    .route("/negotiations", web::get().to(get_negotiations))
                    .route(
                        "/negotiations/create/{offer_id}",
                        web::get().to(get_negotiation_create_page),
                    )
                    .route(
                        "/negotiations/create/{offer_id}",
                        web::post().to(post_negotiation),
                    )
                    .route(
                        "/negotiations/{id}",
                        web::get().to(get_negotiation),
                    )
                    .route(
                        "/negotiations/{id}",
                        web::post().to(post_negotiation_bid),
                    )
                    .route(
                        "/negotiations/{id}/accept",
                        web::post().to(post_negotiation_accept),
                    )
                    .route(
                        "/negotiations/{id}/cancel",
                        web::get().to(get_negotiation_cancel),
                    )
                    .route("/signup", web::post().to(post_signup))
                    .route("/health", web::get().to(health)),
            )
    })
    .bind(("0.0.0.0", port.into_inner()))?
    .run()
    .await?;

    Ok(())
}
