//! Bluff room state machine.
//!
//! A [`Room`] owns every card of the current deck instance and moves them
//! between the deck, the players' hands and the face-down pile. All public
//! operations validate fully before mutating, so a rejected call leaves the
//! room exactly as it was.

use log::debug;
use rand::Rng;
use std::collections::{HashMap, HashSet};

use super::{
    constants::{MAX_CARDS_PER_PLAY, MIN_CARDS_PER_PLAY, MIN_PLAYERS},
    entities::{Card, CardId, ClientId, Deck, PendingPlay, Player, Rank, RoomId, RoomStatus},
    errors::GameError,
    views::{ChallengeOutcome, HandView, PlayerView, RoomView},
};
use crate::room::config::RoomConfig;

/// Result of a successful accept.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AcceptOutcome {
    /// Recorded; other members still have to respond.
    Recorded,
    /// Everyone accepted and the turn moved on.
    Closed,
}

#[derive(Debug)]
pub struct Room {
    id: RoomId,
    config: RoomConfig,
    status: RoomStatus,
    players: Vec<Player>,
    host: Option<ClientId>,
    deck: Deck,
    hands: HashMap<ClientId, Vec<Card>>,
    pile: Vec<Card>,
    turn: Option<ClientId>,
    last_claim_rank: Option<Rank>,
    pending: Option<PendingPlay>,
    /// Insertion-ordered set of members who let the pending play stand.
    accepts: Vec<ClientId>,
    winner: Option<ClientId>,
    /// Size of the current deck instance; 0 until the first game starts.
    cards_in_play: usize,
}

impl Room {
    pub fn new(id: RoomId, config: RoomConfig) -> Self {
        Self {
            id,
            config,
            status: RoomStatus::Waiting,
            players: Vec::new(),
            host: None,
            deck: Deck::default(),
            hands: HashMap::new(),
            pile: Vec::new(),
            turn: None,
            last_claim_rank: None,
            pending: None,
            accepts: Vec::new(),
            winner: None,
            cards_in_play: 0,
        }
    }

    pub fn id(&self) -> &RoomId {
        &self.id
    }

    pub fn config(&self) -> &RoomConfig {
        &self.config
    }

    pub fn status(&self) -> RoomStatus {
        self.status
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn is_member(&self, client: &ClientId) -> bool {
        self.players.iter().any(|p| &p.id == client)
    }

    pub fn host(&self) -> Option<&ClientId> {
        self.host.as_ref()
    }

    pub fn turn(&self) -> Option<&ClientId> {
        self.turn.as_ref()
    }

    pub fn winner(&self) -> Option<&ClientId> {
        self.winner.as_ref()
    }

    pub fn last_claim_rank(&self) -> Option<Rank> {
        self.last_claim_rank
    }

    pub fn is_awaiting_challenge(&self) -> bool {
        self.pending.is_some()
    }

    pub fn accepts(&self) -> &[ClientId] {
        &self.accepts
    }

    pub fn pile_len(&self) -> usize {
        self.pile.len()
    }

    pub fn deck_len(&self) -> usize {
        self.deck.len()
    }

    pub fn hand(&self, client: &ClientId) -> &[Card] {
        self.hands.get(client).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Seats a new player at the end of the list. The first player in an
    /// empty room becomes host.
    pub fn join(&mut self, client: ClientId, name: &str) -> Result<(), GameError> {
        if self.is_member(&client) {
            return Err(GameError::AlreadyInRoom);
        }
        if self.players.len() >= self.config.max_players {
            return Err(GameError::RoomFull);
        }

        if self.host.is_none() {
            self.host = Some(client.clone());
        }
        self.hands.insert(client.clone(), Vec::new());
        self.players.push(Player::new(client, name));

        Ok(())
    }

    /// Removes a player in any status. Host and turn pass to the first
    /// remaining player. The departing hand goes back to the deck; a pending
    /// play is left unresolved.
    pub fn leave(&mut self, client: &ClientId) -> Result<(), GameError> {
        let idx = self
            .players
            .iter()
            .position(|p| &p.id == client)
            .ok_or(GameError::NotInRoom)?;

        self.players.remove(idx);
        if let Some(hand) = self.hands.remove(client) {
            self.deck.return_cards(hand);
        }
        self.accepts.retain(|c| c != client);

        let successor = self.players.first().map(|p| p.id.clone());
        if self.host.as_ref() == Some(client) {
            self.host = successor.clone();
        }
        if self.turn.as_ref() == Some(client) {
            self.turn = successor;
        }

        Ok(())
    }

    /// Deals a fresh shuffled deck and hands the turn to the first player.
    /// Allowed from any status, so it also restarts a running or finished game.
    pub fn start_game<R: Rng + ?Sized>(
        &mut self,
        caller: &ClientId,
        rng: &mut R,
    ) -> Result<(), GameError> {
        if self.host.as_ref() != Some(caller) {
            return Err(GameError::NotHost);
        }
        if self.players.len() < MIN_PLAYERS {
            return Err(GameError::NotEnoughPlayers);
        }

        self.deck = Deck::shuffled(rng);
        self.cards_in_play = self.deck.len();
        self.pile.clear();
        self.last_claim_rank = None;
        self.pending = None;
        self.accepts.clear();
        self.winner = None;

        self.hands.clear();
        for player in &self.players {
            let hand = self.deck.deal(self.config.hand_size);
            self.hands.insert(player.id.clone(), hand);
        }

        self.turn = self.players.first().map(|p| p.id.clone());
        self.status = RoomStatus::Playing;

        Ok(())
    }

    /// Moves `card_ids` from the caller's hand onto the pile under a claimed
    /// rank and opens the challenge window.
    pub fn play(
        &mut self,
        caller: &ClientId,
        card_ids: &[CardId],
        claim_rank: &str,
    ) -> Result<(), GameError> {
        if self.status != RoomStatus::Playing {
            return Err(GameError::GameNotInProgress);
        }
        if self.turn.as_ref() != Some(caller) {
            return Err(GameError::OutOfTurn);
        }
        if self.pending.is_some() {
            return Err(GameError::ChallengePending);
        }
        if !(MIN_CARDS_PER_PLAY..=MAX_CARDS_PER_PLAY).contains(&card_ids.len()) {
            return Err(GameError::InvalidCardCount);
        }
        let claim_rank: Rank = claim_rank.parse()?;
        if let Some(previous) = self.last_claim_rank
            && claim_rank < previous
        {
            return Err(GameError::ClaimTooLow);
        }
        let unique: HashSet<&CardId> = card_ids.iter().collect();
        if unique.len() != card_ids.len() {
            return Err(GameError::DuplicateCard);
        }

        let hand = self.hands.get_mut(caller).ok_or(GameError::CardNotInHand)?;
        if !unique.iter().all(|id| hand.iter().any(|c| &c.id == *id)) {
            return Err(GameError::CardNotInHand);
        }

        let (played, kept): (Vec<Card>, Vec<Card>) = std::mem::take(hand)
            .into_iter()
            .partition(|c| unique.contains(&c.id));
        *hand = kept;

        debug!(
            "Room {}: {} played {} card(s) as {}",
            self.id,
            caller,
            played.len(),
            claim_rank
        );

        self.pile.extend(played.iter().cloned());
        self.last_claim_rank = Some(claim_rank);
        self.pending = Some(PendingPlay {
            claimant: caller.clone(),
            cards: played,
            claim_rank,
        });
        self.accepts = vec![caller.clone()];

        Ok(())
    }

    /// Lets the pending play stand. Once every member has accepted, the turn
    /// passes and the claimant may win.
    pub fn accept(&mut self, caller: &ClientId) -> Result<AcceptOutcome, GameError> {
        let claimant = self.validate_response(caller)?.claimant.clone();

        if !self.accepts.contains(caller) {
            self.accepts.push(caller.clone());
        }

        let unanimous = self.players.iter().all(|p| self.accepts.contains(&p.id));
        if !unanimous {
            return Ok(AcceptOutcome::Recorded);
        }

        self.pending = None;
        self.accepts.clear();
        self.turn = self.next_after(&claimant);
        self.check_win(&claimant);

        Ok(AcceptOutcome::Closed)
    }

    /// Calls the pending play. The losing side picks up the whole pile and
    /// the claim chain restarts.
    pub fn challenge(&mut self, caller: &ClientId) -> Result<ChallengeOutcome, GameError> {
        self.validate_response(caller)?;
        let Some(pending) = self.pending.take() else {
            return Err(GameError::NoPendingPlay);
        };

        let truthful = pending.is_truthful();
        let claimant = pending.claimant;
        let (loser, dispute_winner) = if truthful {
            (caller.clone(), claimant.clone())
        } else {
            (claimant.clone(), caller.clone())
        };

        let pile = std::mem::take(&mut self.pile);
        match self.hands.get_mut(&loser) {
            Some(hand) => hand.extend(pile),
            // The claimant already left; the cards go back under the deck.
            None => self.deck.return_cards(pile),
        }

        self.accepts.clear();
        self.last_claim_rank = None;

        if truthful {
            self.check_win(&claimant);
        }
        if self.winner.is_none() {
            self.turn = self.next_after(&claimant);
        }

        debug!(
            "Room {}: {} challenged {} (truthful: {}), {} picks up",
            self.id, caller, claimant, truthful, loser
        );

        Ok(ChallengeOutcome {
            truthful,
            claimant,
            challenger: caller.clone(),
            loser,
            dispute_winner,
        })
    }

    fn validate_response(&self, caller: &ClientId) -> Result<&PendingPlay, GameError> {
        if self.status != RoomStatus::Playing {
            return Err(GameError::GameNotInProgress);
        }
        if !self.is_member(caller) {
            return Err(GameError::NotInRoom);
        }
        let pending = self.pending.as_ref().ok_or(GameError::NoPendingPlay)?;
        if &pending.claimant == caller {
            return Err(GameError::OwnPlay);
        }
        Ok(pending)
    }

    /// Player after `client` in seat order, wrapping. Falls back to the
    /// first player when `client` is no longer seated.
    fn next_after(&self, client: &ClientId) -> Option<ClientId> {
        match self.players.iter().position(|p| &p.id == client) {
            Some(idx) => {
                let next = (idx + 1) % self.players.len();
                Some(self.players[next].id.clone())
            }
            None => self.players.first().map(|p| p.id.clone()),
        }
    }

    fn check_win(&mut self, claimant: &ClientId) {
        let emptied = self
            .hands
            .get(claimant)
            .is_some_and(|hand| hand.is_empty());
        if emptied {
            self.winner = Some(claimant.clone());
            self.status = RoomStatus::Ended;
            self.turn = None;
        }
    }

    pub fn public_view(&self) -> RoomView {
        RoomView {
            room_id: self.id.clone(),
            status: self.status,
            players: self
                .players
                .iter()
                .map(|p| PlayerView {
                    id: p.id.clone(),
                    name: p.name.clone(),
                })
                .collect(),
            max_players: self.config.max_players,
            host_id: self.host.clone(),
            turn_player_id: self.turn.clone(),
            last_claim_rank: self.last_claim_rank,
            pile_count: self.pile.len(),
            awaiting_challenge: self.pending.is_some(),
            last_play_by: self.pending.as_ref().map(|p| p.claimant.clone()),
            accepts: self.accepts.clone(),
            winner_id: self.winner.clone(),
        }
    }

    pub fn hand_view(&self, client: &ClientId) -> HandView {
        self.hand(client).to_vec()
    }

    /// Checks card conservation, pending-play placement, turn membership and
    /// the seat limit.
    pub fn check_invariants(&self) -> Result<(), String> {
        let mut seen = HashSet::new();
        let located = self
            .deck
            .iter()
            .chain(self.hands.values().flatten())
            .chain(self.pile.iter());
        for card in located {
            if !seen.insert(card.id.clone()) {
                return Err(format!("card {} is in two places", card.id));
            }
        }
        if seen.len() != self.cards_in_play {
            return Err(format!(
                "{} cards located, expected {}",
                seen.len(),
                self.cards_in_play
            ));
        }

        if let Some(pending) = &self.pending {
            let on_pile = pending
                .cards
                .iter()
                .all(|card| self.pile.iter().any(|c| c.id == card.id));
            if !on_pile {
                return Err("pending cards are not on the pile".to_string());
            }
        }

        if let Some(turn) = &self.turn
            && !self.is_member(turn)
        {
            return Err(format!("turn holder {turn} is not a member"));
        }

        if self.players.len() > self.config.max_players {
            return Err(format!(
                "{} players exceed the limit of {}",
                self.players.len(),
                self.config.max_players
            ));
        }

        if self.hands.len() != self.players.len() {
            return Err("hands do not match seated players".to_string());
        }

        Ok(())
    }
}
