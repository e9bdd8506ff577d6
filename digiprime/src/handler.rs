use actix_web::dev::Payload;
use actix_web::error::ErrorUnauthorized;
use actix_web::web::{Data, Json, Path, Query};
use actix_web::{FromRequest, HttpRequest, HttpResponse};
use chrono::Utc;
use futures::future::{ready, Ready};
use helper::log_err;
use model::domain::pagination::PerPage;
use model::dto::engine::Signup;
use model::view::auction::{
    CreateAuctionRequest, CreatePageQuery, PageQuery, PlaceBid, SelectWinner,
};
use model::view::negotiation::CreateNegotiationRequest;
use model::{AuctionId, NegotiationId, OfferId};

use crate::controller::{self, ControllerError};
use crate::repository::negotiation_engine::NegotiationEngine;
use crate::repository::offer::OfferRepository;
use crate::repository::user::UserRepository;
use crate::service::eligibility::Eligibility;

/// Set by the session layer in front of this service.
pub const USERNAME_HEADER: &str = "X-Username";

/// The user on whose behalf the request is made.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub String);

impl FromRequest for AuthenticatedUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let username = req
            .headers()
            .get(USERNAME_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(|value| AuthenticatedUser(value.to_string()));
        ready(username.ok_or_else(|| {
            ErrorUnauthorized(format!("Missing the {} header", USERNAME_HEADER))
        }))
    }
}

/// Auctions still running or waiting for a winner.
pub async fn get_auctions(
    user: AuthenticatedUser,
    query: Query<PageQuery>,
    per_page: Data<PerPage>,
    engine: Data<dyn NegotiationEngine>,
) -> Result<HttpResponse, ControllerError> {
    let res = controller::auction::list_active(
        &user.0,
        query.page.as_deref(),
        *per_page.get_ref(),
        engine.get_ref(),
    )
    .await;
    log_err!(res);
    Ok(HttpResponse::Ok().json(res?))
}

pub async fn get_auction_history(
    user: AuthenticatedUser,
    query: Query<PageQuery>,
    per_page: Data<PerPage>,
    engine: Data<dyn NegotiationEngine>,
) -> Result<HttpResponse, ControllerError> {
    let res = controller::auction::list_history(
        &user.0,
        query.page.as_deref(),
        *per_page.get_ref(),
        engine.get_ref(),
    )
    .await;
    log_err!(res);
    Ok(HttpResponse::Ok().json(res?))
}

pub async fn get_public_auctions(
    user: AuthenticatedUser,
    query: Query<PageQuery>,
    per_page: Data<PerPage>,
    engine: Data<dyn NegotiationEngine>,
) -> Result<HttpResponse, ControllerError> {
    let res = controller::auction::list_public(
        &user.0,
        query.page.as_deref(),
        *per_page.get_ref(),
        engine.get_ref(),
    )
    .await;
    log_err!(res);
    Ok(HttpResponse::Ok().json(res?))
}

pub async fn get_auction_create_page(
    user: AuthenticatedUser,
    query: Query<CreatePageQuery>,
    eligibility: Data<Eligibility>,
) -> Result<HttpResponse, ControllerError> {
    let res = controller::auction::create_page(
        &user.0,
        query.into_inner(),
        &eligibility,
    )
    .await;
    log_err!(res);
    Ok(HttpResponse::Ok().json(res?))
}

pub async fn post_auction(
    user: AuthenticatedUser,
    payload: Json<CreateAuctionRequest>,
    eligibility: Data<Eligibility>,
    engine: Data<dyn NegotiationEngine>,
) -> Result<HttpResponse, ControllerError> {
    let res = controller::auction::create(
        &user.0,
        payload.into_inner(),
        Utc::now(),
        &eligibility,
        engine.get_ref(),
    )
    .await;
    log_err!(res);
    Ok(HttpResponse::Created().json(res?))
}

pub async fn get_auction(
    user: AuthenticatedUser,
    id: Path<AuctionId>,
    engine: Data<dyn NegotiationEngine>,
    offers: Data<dyn OfferRepository>,
) -> Result<HttpResponse, ControllerError> {
    let res = controller::auction::show(
        &user.0,
        &id,
        engine.get_ref(),
        offers.get_ref(),
    )
    .await;
    log_err!(res);
    Ok(HttpResponse::Ok().json(res?))
}

pub async fn post_auction_bid(
    user: AuthenticatedUser,
    id: Path<AuctionId>,
    payload: Json<PlaceBid>,
    engine: Data<dyn NegotiationEngine>,
) -> Result<HttpResponse, ControllerError> {
    let res = controller::auction::place_bid(
        &user.0,
        &id,
        payload.into_inner(),
        engine.get_ref(),
    )
    .await;
    log_err!(res);
    res?;
    Ok(HttpResponse::Ok().finish())
}

pub async fn post_auction_winner(
    user: AuthenticatedUser,
    id: Path<AuctionId>,
    payload: Json<SelectWinner>,
    engine: Data<dyn NegotiationEngine>,
) -> Result<HttpResponse, ControllerError> {
    let res = controller::auction::select_winner(
        &user.0,
        &id,
        payload.into_inner(),
        engine.get_ref(),
    )
    .await;
    log_err!(res);
    res?;
    Ok(HttpResponse::Ok().finish())
}

pub async fn get_auction_bids(
    user: AuthenticatedUser,
    id: Path<AuctionId>,
    engine: Data<dyn NegotiationEngine>,
) -> Result<HttpResponse, ControllerError> {
    let res =
        controller::auction::get_bids(&user.0, &id, engine.get_ref()).await;
    log_err!(res);
    Ok(HttpResponse::Ok().json(res?))
}

pub async fn post_auction_join(
    user: AuthenticatedUser,
    id: Path<AuctionId>,
    engine: Data<dyn NegotiationEngine>,
) -> Result<HttpResponse, ControllerError> {
    let res = controller::auction::join(&user.0, &id, engine.get_ref()).await;
    log_err!(res);
    res?;
    Ok(HttpResponse::Ok().finish())
}

pub async fn get_negotiations(
    user: AuthenticatedUser,
    query: Query<PageQuery>,
    per_page: Data<PerPage>,
    engine: Data<dyn NegotiationEngine>,
) -> Result<HttpResponse, ControllerError> {
    let res = controller::negotiation::list(
        &user.0,
        query.page.as_deref(),
        *per_page.get_ref(),
        engine.get_ref(),
    )
    .await;
    log_err!(res);
    Ok(HttpResponse::Ok().json(res?))
}

pub async fn get_negotiation_create_page(
    user: AuthenticatedUser,
    offer_id: Path<OfferId>,
    eligibility: Data<Eligibility>,
    engine: Data<dyn NegotiationEngine>,
) -> Result<HttpResponse, ControllerError> {
    let res = controller::negotiation::create_page(
        &user.0,
        &offer_id,
        &eligibility,
        engine.get_ref(),
    )
    .await;
    log_err!(res);
    Ok(HttpResponse::Ok().json(res?))
}

pub async fn post_negotiation(
    user: AuthenticatedUser,
    offer_id: Path<OfferId>,
    payload: Json<CreateNegotiationRequest>,
    eligibility: Data<Eligibility>,
    engine: Data<dyn NegotiationEngine>,
) -> Result<HttpResponse, ControllerError> {
    let res = controller::negotiation::create(
        &user.0,
        &offer_id,
        payload.into_inner(),
        &eligibility,
        engine.get_ref(),
    )
    .await;
    log_err!(res);
    Ok(HttpResponse::Created().json(res?))
}

pub async fn get_negotiation(
    user: AuthenticatedUser,
    id: Path<NegotiationId>,
    engine: Data<dyn NegotiationEngine>,
) -> Result<HttpResponse, ControllerError> {
    let res =
        controller::negotiation::show(&user.0, &id, engine.get_ref()).await;
    log_err!(res);
    Ok(HttpResponse::Ok().json(res?))
}

pub async fn post_negotiation_bid(
    user: AuthenticatedUser,
    id: Path<NegotiationId>,
    payload: Json<PlaceBid>,
    engine: Data<dyn NegotiationEngine>,
) -> Result<HttpResponse, ControllerError> {
    let res = controller::negotiation::place_bid(
        &user.0,
        &id,
        payload.into_inner(),
        engine.get_ref(),
    )
    .await;
    log_err!(res);
    res?;
    Ok(HttpResponse::Ok().finish())
}

pub async fn post_negotiation_accept(
    user: AuthenticatedUser,
    id: Path<NegotiationId>,
    engine: Data<dyn NegotiationEngine>,
) -> Result<HttpResponse, ControllerError> {
    let res =
        controller::negotiation::accept(&user.0, &id, engine.get_ref()).await;
    log_err!(res);
    res?;
    Ok(HttpResponse::Ok().finish())
}

pub async fn get_negotiation_cancel(
    user: AuthenticatedUser,
    id: Path<NegotiationId>,
    engine: Data<dyn NegotiationEngine>,
) -> Result<HttpResponse, ControllerError> {
    let res =
        controller::negotiation::cancel(&user.0, &id, engine.get_ref()).await;
    log_err!(res);
    res?;
    Ok(HttpResponse::Ok().finish())
}

/// Called by the registration flow, before any session exists.
pub async fn post_signup(
    payload: Json<Signup>,
    users: Data<dyn UserRepository>,
    engine: Data<dyn NegotiationEngine>,
) -> Result<HttpResponse, ControllerError> {
    let res = controller::user::signup(
        payload.into_inner(),
        users.get_ref(),
        engine.get_ref(),
    )
    .await;
    log_err!(res);
    res?;
    Ok(HttpResponse::Ok().finish())
}

pub async fn health() -> HttpResponse { HttpResponse::Ok().finish() }

/// Malformed bodies, queries and ids are the client's fault.
pub fn bad_request<E: std::fmt::Display>(
    err: E,
    _req: &HttpRequest,
) -> actix_web::Error {
    ControllerError::InvalidInput(err.to_string()).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::fake_engine::{auction, FakeEngine, A, AUCTION};
    use actix_web::http::StatusCode;
    use actix_web::{test, web, App};
    use chrono::Duration;
    use model::domain::auction::Privacy;
    use std::sync::Arc;

    fn engine() -> Arc<FakeEngine> {
        let engine = FakeEngine::default();
        let mut public = auction(A, Duration::days(1));
        public.privacy = Some(Privacy::Public);
        engine.insert(public);
        Arc::new(engine)
    }

    #[actix_web::test]
    async fn test_join_over_http() {
        let engine: Arc<dyn NegotiationEngine> = engine();
        let app = test::init_service(
            App::new()
                .app_data(Data::from(engine))
                .app_data(
                    web::PathConfig::default().error_handler(bad_request),
                )
                .route(
                    "/api/auctions/{id}/join",
                    web::post().to(post_auction_join),
                ),
        )
        .await;
        let uri = format!("/api/auctions/{}/join", AUCTION);

        let req = test::TestRequest::post().uri(&uri).to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

        let req = test::TestRequest::post()
            .uri(&uri)
            .insert_header((USERNAME_HEADER, "dave"))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = test::TestRequest::post()
            .uri(&uri)
            .insert_header((USERNAME_HEADER, "dave"))
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::BAD_REQUEST
        );

        let req = test::TestRequest::post()
            .uri("/api/auctions/not-an-id/join")
            .insert_header((USERNAME_HEADER, "dave"))
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::BAD_REQUEST
        );
    }
}
