// ═══════════════════════════════════════════════════════════════════════
// Remote Agent — a player reached through a request/response service
//
// Contract of the service (transport is up to the implementation):
//   POST {base}/action_trump/{name}      body: observation record + gameId
//                                        answer: {"trump": <code>}
//   POST {base}/action_play_card/{name}  body: observation record + gameId
//                                        answer: {"card": "DA"}
//
// A remote failure never ends the round: on timeout, transport error or
// an unusable answer the agent logs a warning and lets its stand-in
// RandomAgent decide instead.
// ═══════════════════════════════════════════════════════════════════════

use std::time::Duration;

use crate::agent::Agent;
use crate::random::RandomAgent;
use jass_engine::cards::Card;
use jass_engine::rules::{GameRule, RuleSchieber};
use jass_engine::types::TrumpAction;
use jass_engine::visibility::Observation;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub const SELECT_TRUMP_PATH_PREFIX: &str = "/action_trump";
pub const PLAY_CARD_PATH_PREFIX: &str = "/action_play_card";

/// Body of a request to a player service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRequest {
    pub game_id: u64,
    #[serde(flatten)]
    pub observation: Observation,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrumpResponse {
    pub trump: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardResponse {
    pub card: String,
}

#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("no answer within {0:?}")]
    Timeout(Duration),
    #[error("transport: {0}")]
    Transport(String),
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("push is not allowed at this point")]
    IllegalPush,
    #[error("card {0} is not a legal play")]
    IllegalCard(Card),
}

impl From<serde_json::Error> for RemoteError {
    fn from(err: serde_json::Error) -> Self {
        RemoteError::Malformed(err.to_string())
    }
}

/// Transport-neutral access to a remote player.
pub trait PlayerService: Send {
    fn select_trump(&mut self, request: &ServiceRequest) -> Result<TrumpResponse, RemoteError>;
    fn play_card(&mut self, request: &ServiceRequest) -> Result<CardResponse, RemoteError>;
}

pub struct RemoteAgent<S: PlayerService> {
    name: String,
    service: S,
    game_id: u64,
    rule: RuleSchieber,
    standin: RandomAgent,
}

impl<S: PlayerService> RemoteAgent<S> {
    /// `seed` drives the stand-in random player.
    pub fn new(name: impl Into<String>, service: S, seed: u64) -> Self {
        RemoteAgent {
            name: name.into(),
            service,
            game_id: 0,
            rule: RuleSchieber,
            standin: RandomAgent::new(seed),
        }
    }

    pub fn with_game_id(mut self, game_id: u64) -> Self {
        self.game_id = game_id;
        self
    }

    fn request(&self, obs: &Observation) -> ServiceRequest {
        ServiceRequest {
            game_id: self.game_id,
            observation: obs.clone(),
        }
    }

    fn remote_trump(&mut self, obs: &Observation) -> Result<TrumpAction, RemoteError> {
        let response = self.service.select_trump(&self.request(obs))?;
        let action = TrumpAction::from_code(response.trump)
            .map_err(|err| RemoteError::Malformed(err.to_string()))?;
        if action == TrumpAction::Push && obs.forehand.is_some() {
            return Err(RemoteError::IllegalPush);
        }
        Ok(action)
    }

    fn remote_card(&mut self, obs: &Observation) -> Result<Card, RemoteError> {
        let response = self.service.play_card(&self.request(obs))?;
        let card: Card = response
            .card
            .parse()
            .map_err(|_| RemoteError::Malformed(format!("unknown card {:?}", response.card)))?;
        if !self.rule.legal_cards_from_obs(obs).contains(card) {
            return Err(RemoteError::IllegalCard(card));
        }
        Ok(card)
    }
}

impl<S: PlayerService> Agent for RemoteAgent<S> {
    fn name(&self) -> &str {
        &self.name
    }

    fn action_trump(&mut self, obs: &Observation) -> TrumpAction {
        match self.remote_trump(obs) {
            Ok(action) => {
                debug!(agent = %self.name, ?action, "remote trump");
                action
            }
            Err(err) => {
                warn!(agent = %self.name, error = %err, "remote trump failed, using stand-in");
                self.standin.action_trump(obs)
            }
        }
    }

    fn action_play_card(&mut self, obs: &Observation) -> Card {
        match self.remote_card(obs) {
            Ok(card) => {
                debug!(agent = %self.name, %card, "remote card");
                card
            }
            Err(err) => {
                warn!(agent = %self.name, error = %err, "remote card failed, using stand-in");
                self.standin.action_play_card(obs)
            }
        }
    }
}
