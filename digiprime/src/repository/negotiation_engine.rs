use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;

use helper::reqwest_helper::deserialize_response;
use model::domain::auction::{
    sort_by_closing_time, split_active, Auction, Bid,
};
use model::domain::negotiation::{LiveNegotiation, NegotiationDetails};
use model::dto::engine::{
    BidForm, BidsResponse, ContractResponse, CreateNegotiation, CreateRoom,
    EngineMessage, RawAuction, Signup, WinnerForm,
};
use model::dto::protocol::{
    self, parse_created_id, ContractDetails, WINNER_SELECTED,
};
use model::{AuctionId, NegotiationId, OfferId};

type HttpClient = reqwest_middleware::ClientWithMiddleware;
type HttpRequestBuilder = reqwest_middleware::RequestBuilder;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),
    #[error(transparent)]
    ReqwestMiddleware(#[from] reqwest_middleware::Error),
    #[error("The negotiation engine has no such resource: {0}")]
    NotFound(String),
    /// The engine refused the request with a message meant for the user.
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },
    #[error("The request failed with error code {status}: {body}")]
    RequestStatus { status: StatusCode, body: String },
    #[error(transparent)]
    Deserialize(#[from] helper::reqwest_helper::Error),
    #[error(transparent)]
    Protocol(#[from] protocol::Error),
    #[error("{0}")]
    WinnerNotSelected(String),
}

/// Client of the Negotiation Engine. Every call but the account
/// provisioning acts on behalf of `username`.
#[async_trait]
pub trait NegotiationEngine: Debug + Sync + Send {
    /// Returns the id of the new auction.
    async fn create_auction(
        &self,
        username: &str,
        room: &CreateRoom,
    ) -> Result<AuctionId, Error>;

    async fn get_auction(
        &self,
        username: &str,
        id: &AuctionId,
    ) -> Result<Auction, Error>;

    /// Every auction the user takes part in, by descending closing time.
    /// Rooms the engine returns malformed are left out.
    async fn get_auctions(&self, username: &str) -> Result<Vec<Auction>, Error>;

    async fn get_public_auctions(
        &self,
        username: &str,
    ) -> Result<Vec<Auction>, Error>;

    async fn get_active_auctions(
        &self,
        username: &str,
    ) -> Result<Vec<Auction>, Error> {
        Ok(split_active(self.get_auctions(username).await?).0)
    }

    async fn get_auction_history(
        &self,
        username: &str,
    ) -> Result<Vec<Auction>, Error> {
        Ok(split_active(self.get_auctions(username).await?).1)
    }

    /// Whether the bid beats the current one is for the engine to decide.
    async fn place_bid(
        &self,
        username: &str,
        id: &AuctionId,
        amount: f64,
    ) -> Result<(), Error>;

    async fn select_winner(
        &self,
        username: &str,
        id: &AuctionId,
        winner: &str,
    ) -> Result<(), Error>;

    /// Contract of an ended auction, with the winning offer spliced in.
    async fn get_winner(
        &self,
        username: &str,
        id: &AuctionId,
        offer_id: &OfferId,
        offer_title: &str,
    ) -> Result<ContractDetails, Error>;

    async fn get_bids(
        &self,
        username: &str,
        id: &AuctionId,
    ) -> Result<Vec<Bid>, Error>;

    async fn join_auction(
        &self,
        username: &str,
        id: &AuctionId,
    ) -> Result<(), Error>;

    async fn create_negotiation(
        &self,
        username: &str,
        negotiation: &CreateNegotiation,
    ) -> Result<NegotiationId, Error>;

    async fn get_negotiation(
        &self,
        username: &str,
        id: &NegotiationId,
    ) -> Result<NegotiationDetails, Error>;

    async fn list_negotiations(
        &self,
        username: &str,
    ) -> Result<Vec<LiveNegotiation>, Error>;

    async fn negotiation_bid(
        &self,
        username: &str,
        id: &NegotiationId,
        amount: f64,
    ) -> Result<(), Error>;

    async fn negotiation_accept(
        &self,
        username: &str,
        id: &NegotiationId,
    ) -> Result<(), Error>;

    async fn negotiation_cancel(
        &self,
        username: &str,
        id: &NegotiationId,
    ) -> Result<(), Error>;

    /// Names of the contract templates a negotiation can be based on.
    async fn contract_templates(&self) -> Result<Vec<String>, Error>;

    /// Provision the engine account of a local user. Provisioning an
    /// existing account succeeds.
    async fn signup(&self, signup: &Signup) -> Result<(), Error>;
}

#[derive(Debug)]
pub struct NegotiationEngineRESTImpl {
    base_url: String,
    client:   Arc<HttpClient>,
}

impl NegotiationEngineRESTImpl {
    pub fn new(base_url: &str, client: Arc<HttpClient>) -> Self {
        Self { base_url: base_url.trim_end_matches('/').to_string(), client }
    }

    fn url(&self, route: &str) -> String {
        let url = format!("{}/{}", self.base_url, route);
        debug!("negotiation engine url: {}", url);
        url
    }

    /// The engine trusts the username alone, no password is sent.
    fn get(&self, username: &str, route: &str) -> HttpRequestBuilder {
        self.client.get(self.url(route)).basic_auth(username, None::<&str>)
    }

    fn post(&self, username: &str, route: &str) -> HttpRequestBuilder {
        self.client.post(self.url(route)).basic_auth(username, None::<&str>)
    }

    /// Sort the failures between the ones worth showing to the user and
    /// the others.
    async fn send(&self, request: HttpRequestBuilder) -> Result<Response, Error> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await?;
        let message = serde_json::from_str::<EngineMessage>(&body)
            .map(|msg| msg.message)
            .unwrap_or(body);
        Err(match status {
            StatusCode::NOT_FOUND => Error::NotFound(message),
            StatusCode::BAD_REQUEST | StatusCode::FORBIDDEN => {
                Error::Rejected { status, message }
            }
            status => Error::RequestStatus { status, body: message },
        })
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        request: HttpRequestBuilder,
    ) -> Result<T, Error> {
        let response = self.send(request).await?;
        Ok(deserialize_response(response).await?)
    }

    async fn fetch_auctions(
        &self,
        request: HttpRequestBuilder,
    ) -> Result<Vec<Auction>, Error> {
        let raw: Vec<RawAuction> = self.fetch(request).await?;
        let now = Utc::now();
        let mut auctions: Vec<Auction> = raw
            .into_iter()
            .filter_map(|auction| {
                let id = auction.id.clone();
                auction
                    .normalize(now)
                    .map_err(|err| {
                        warn!("skipping the malformed room {:?}: {}", id, err)
                    })
                    .ok()
            })
            .collect();
        sort_by_closing_time(&mut auctions);
        Ok(auctions)
    }
}

#[async_trait]
impl NegotiationEngine for NegotiationEngineRESTImpl {
    #[instrument(level = "trace", skip(self))]
    async fn create_auction(
        &self,
        username: &str,
        room: &CreateRoom,
    ) -> Result<AuctionId, Error> {
        let EngineMessage { message } =
            self.fetch(self.post(username, "create-room").form(room)).await?;
        Ok(parse_created_id(&message)?)
    }

    #[instrument(level = "trace", skip(self))]
    async fn get_auction(
        &self,
        username: &str,
        id: &AuctionId,
    ) -> Result<Auction, Error> {
        let raw: RawAuction = self
            .fetch(self.get(username, &format!("rooms/{}/info", id)))
            .await?;
        let mut auction = raw.normalize(Utc::now())?;
        auction.id.get_or_insert_with(|| id.clone());
        Ok(auction)
    }

    #[instrument(level = "trace", skip(self))]
    async fn get_auctions(&self, username: &str) -> Result<Vec<Auction>, Error> {
        self.fetch_auctions(self.get(username, "rooms/all")).await
    }

    #[instrument(level = "trace", skip(self))]
    async fn get_public_auctions(
        &self,
        username: &str,
    ) -> Result<Vec<Auction>, Error> {
        self.fetch_auctions(self.get(username, "rooms/public")).await
    }

    #[instrument(level = "trace", skip(self))]
    async fn place_bid(
        &self,
        username: &str,
        id: &AuctionId,
        amount: f64,
    ) -> Result<(), Error> {
        self.send(
            self.post(username, &format!("rooms/{}", id))
                .form(&BidForm { message_input: amount }),
        )
        .await?;
        Ok(())
    }

    #[instrument(level = "trace", skip(self))]
    async fn select_winner(
        &self,
        username: &str,
        id: &AuctionId,
        winner: &str,
    ) -> Result<(), Error> {
        let EngineMessage { message } = self
            .fetch(
                self.post(username, &format!("rooms/{}/end", id))
                    .form(&WinnerForm { winner }),
            )
            .await?;
        if message != WINNER_SELECTED {
            return Err(Error::WinnerNotSelected(message));
        }
        Ok(())
    }

    #[instrument(level = "trace", skip(self))]
    async fn get_winner(
        &self,
        username: &str,
        id: &AuctionId,
        offer_id: &OfferId,
        offer_title: &str,
    ) -> Result<ContractDetails, Error> {
        let ContractResponse { contract } = self
            .fetch(self.get(username, &format!("rooms/{}/end", id)))
            .await?;
        Ok(ContractDetails::parse(&contract, offer_id.as_str(), offer_title)?)
    }

    #[instrument(level = "trace", skip(self))]
    async fn get_bids(
        &self,
        username: &str,
        id: &AuctionId,
    ) -> Result<Vec<Bid>, Error> {
        let BidsResponse { bids } = self
            .fetch(self.get(username, &format!("rooms/{}", id)))
            .await?;
        Ok(bids)
    }

    #[instrument(level = "trace", skip(self))]
    async fn join_auction(
        &self,
        username: &str,
        id: &AuctionId,
    ) -> Result<(), Error> {
        self.send(self.post(username, &format!("rooms/{}/join", id)))
            .await?;
        Ok(())
    }

    #[instrument(level = "trace", skip(self))]
    async fn create_negotiation(
        &self,
        username: &str,
        negotiation: &CreateNegotiation,
    ) -> Result<NegotiationId, Error> {
        let EngineMessage { message } = self
            .fetch(self.post(username, "negotiate").form(negotiation))
            .await?;
        Ok(parse_created_id(&message)?)
    }

    #[instrument(level = "trace", skip(self))]
    async fn get_negotiation(
        &self,
        username: &str,
        id: &NegotiationId,
    ) -> Result<NegotiationDetails, Error> {
        self.fetch(self.get(username, &format!("negotiate/{}/full", id)))
            .await
    }

    #[instrument(level = "trace", skip(self))]
    async fn list_negotiations(
        &self,
        username: &str,
    ) -> Result<Vec<LiveNegotiation>, Error> {
        self.fetch(self.get(username, "negotiate/list")).await
    }

    #[instrument(level = "trace", skip(self))]
    async fn negotiation_bid(
        &self,
        username: &str,
        id: &NegotiationId,
        amount: f64,
    ) -> Result<(), Error> {
        self.send(
            self.post(username, &format!("negotiate/{}", id))
                .form(&BidForm { message_input: amount }),
        )
        .await?;
        Ok(())
    }

    #[instrument(level = "trace", skip(self))]
    async fn negotiation_accept(
        &self,
        username: &str,
        id: &NegotiationId,
    ) -> Result<(), Error> {
        self.send(self.get(username, &format!("negotiate/{}/accept", id)))
            .await?;
        Ok(())
    }

    #[instrument(level = "trace", skip(self))]
    async fn negotiation_cancel(
        &self,
        username: &str,
        id: &NegotiationId,
    ) -> Result<(), Error> {
        self.send(self.get(username, &format!("negotiate/{}/cancel", id)))
            .await?;
        Ok(())
    }

    #[instrument(level = "trace", skip(self))]
    async fn contract_templates(&self) -> Result<Vec<String>, Error> {
        self.fetch(self.client.get(self.url("contracts"))).await
    }

    #[instrument(level = "trace", skip(self, signup), fields(username = %signup.username))]
    async fn signup(&self, signup: &Signup) -> Result<(), Error> {
        match self.send(self.client.post(self.url("signup")).json(signup)).await
        {
            Ok(_) => Ok(()),
            Err(Error::Rejected { status: StatusCode::BAD_REQUEST, message })
                if message.to_lowercase().contains("already exist") =>
            {
                warn!("engine account of {} already exists", signup.username);
                Ok(())
            }
            Err(err) => Err(err),
        }
    }
}
