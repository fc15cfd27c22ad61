//! Scripted in-memory client.
//!
//! Responses are queued per operation and handed out in order. A gated
//! client holds every call open until [`ScriptedClient::release`] is called,
//! which lets tests observe a session while a call is in flight.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tokio::sync::Semaphore;

use super::{DrawnCard, RemoteDeckClient, RemoteOutcome, Shuffled};
use crate::state::card::{Card, Deck, DeckId};

/// A call the client received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Create,
    Draw(DeckId),
    Shuffle(DeckId),
}

#[derive(Debug, Default)]
struct Script {
    creates: VecDeque<RemoteOutcome<Deck>>,
    draws: VecDeque<RemoteOutcome<DrawnCard>>,
    shuffles: VecDeque<RemoteOutcome<Shuffled>>,
    calls: Vec<Call>,
}

#[derive(Debug, Default)]
pub struct ScriptedClient {
    script: Mutex<Script>,
    gate: Option<Semaphore>,
}

fn unscripted<T>() -> RemoteOutcome<T> {
    RemoteOutcome::RemoteError("no scripted response".to_string())
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// A client whose calls wait for [`release`](Self::release).
    pub fn gated() -> Self {
        Self {
            script: Mutex::default(),
            gate: Some(Semaphore::new(0)),
        }
    }

    fn script(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Let one held call complete.
    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.add_permits(1);
        }
    }

    pub fn push_create(&self, outcome: RemoteOutcome<Deck>) -> &Self {
        self.script().creates.push_back(outcome);
        self
    }

    pub fn push_draw(&self, outcome: RemoteOutcome<DrawnCard>) -> &Self {
        self.script().draws.push_back(outcome);
        self
    }

    pub fn push_shuffle(&self, outcome: RemoteOutcome<Shuffled>) -> &Self {
        self.script().shuffles.push_back(outcome);
        self
    }

    /// Queue a successful deck creation.
    pub fn push_deck(&self, deck_id: &str, remaining: u32) -> &Self {
        self.push_create(RemoteOutcome::Ok(Deck::new(DeckId::new(deck_id), remaining)))
    }

    /// Queue a successful draw.
    pub fn push_card(&self, card: Card, remaining: u32) -> &Self {
        self.push_draw(RemoteOutcome::Ok(DrawnCard { card, remaining }))
    }

    pub fn calls(&self) -> Vec<Call> {
        self.script().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.script().calls.len()
    }

    async fn wait_for_release(&self) {
        if let Some(gate) = &self.gate {
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }
    }
}

#[async_trait]
impl RemoteDeckClient for ScriptedClient {
    async fn create_shuffled_deck(&self) -> RemoteOutcome<Deck> {
        self.script().calls.push(Call::Create);
        self.wait_for_release().await;
        self.script().creates.pop_front().unwrap_or_else(unscripted)
    }

    async fn draw_one(&self, deck_id: &DeckId) -> RemoteOutcome<DrawnCard> {
        self.script().calls.push(Call::Draw(deck_id.clone()));
        self.wait_for_release().await;
        self.script().draws.pop_front().unwrap_or_else(unscripted)
    }

    async fn shuffle(&self, deck_id: &DeckId) -> RemoteOutcome<Shuffled> {
        self.script().calls.push(Call::Shuffle(deck_id.clone()));
        self.wait_for_release().await;
        self.script().shuffles.pop_front().unwrap_or_else(unscripted)
    }
}
