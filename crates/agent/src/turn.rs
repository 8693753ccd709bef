//! One conversational turn, end to end.
//!
//! A turn appends the user's utterance, derives the map filter from it,
//! asks the responder for a reply grounded in the *whole* knowledge base
//! (not the filtered subset), and appends that reply.

use std::sync::Arc;

use baymed_config::AppConfig;
use baymed_core::{Credentials, FilterCategory, Message, ProviderError};
use baymed_dataset::{Dataset, MapView};
use baymed_session::ConversationState;
use serde::Serialize;
use tracing::info;

use crate::responder::{AssistantResponder, ResponderSettings};

/// What a completed turn produced.
#[derive(Debug, Clone, Serialize)]
pub struct TurnOutcome {
    pub reply: Message,
    pub filter: FilterCategory,
    pub view: MapView,
}

pub struct TurnEngine {
    dataset: Arc<Dataset>,
    knowledge_base: String,
    responder: AssistantResponder,
    credentials: Option<Credentials>,
}

impl TurnEngine {
    pub fn new(
        dataset: Arc<Dataset>,
        responder: AssistantResponder,
        credentials: Option<Credentials>,
    ) -> Self {
        let knowledge_base = dataset.knowledge_base();
        Self {
            dataset,
            knowledge_base,
            responder,
            credentials,
        }
    }

    /// Wire the configured provider and credentials around `dataset`.
    pub fn from_config(config: &AppConfig, dataset: Arc<Dataset>) -> Result<Self, ProviderError> {
        let provider = baymed_providers::build_from_config(config)?;
        let responder = AssistantResponder::new(provider, ResponderSettings::from_config(config));
        Ok(Self::new(dataset, responder, config.credentials()))
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn has_credentials(&self) -> bool {
        self.credentials.is_some()
    }

    /// Run one turn against `state`. Always yields exactly one reply.
    pub async fn handle_turn(&self, state: &mut ConversationState, utterance: &str) -> TurnOutcome {
        state.push(Message::user(utterance));

        let filter = state
            .store
            .last_user_message()
            .map(baymed_dataset::classify)
            .unwrap_or_default();
        state.last_filter = filter;
        let view = self.view_for(filter);

        let reply = self
            .responder
            .respond(
                state.store.messages(),
                &self.knowledge_base,
                self.credentials.as_ref(),
            )
            .await;
        state.push(reply.clone());

        info!(
            filter = ?filter,
            markers = view.markers.len(),
            history = state.store.len(),
            "Turn complete"
        );

        TurnOutcome {
            reply,
            filter,
            view,
        }
    }

    /// The map as it should currently look for `state`.
    pub fn view(&self, state: &ConversationState) -> MapView {
        self.view_for(state.last_filter)
    }

    /// The map for an ad-hoc query, without touching any conversation.
    pub fn preview(&self, query: &str) -> MapView {
        self.view_for(baymed_dataset::classify(query))
    }

    fn view_for(&self, filter: FilterCategory) -> MapView {
        let selected = baymed_dataset::filter(&self.dataset.records, filter);
        MapView::build(&selected, filter, &self.dataset.status)
    }
}
