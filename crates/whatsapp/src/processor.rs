use std::sync::Arc;

use aseobi_core::{ApplicationError, Catalog};
use tracing::{debug, info};

use crate::dispatch::{DispatchOutcome, PlanDispatcher};
use crate::events::{classify, EventContext, WebhookPayload};
use crate::gateway::MessageGateway;
use crate::navigation::{NavigationAction, NavigationEngine};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProcessOutcome {
    NoIntent,
    Dispatched { action: NavigationAction, outcome: DispatchOutcome },
}

/// Handles one webhook delivery end to end: classify, route, dispatch.
pub struct WebhookProcessor {
    engine: NavigationEngine,
    dispatcher: PlanDispatcher,
}

impl WebhookProcessor {
    pub fn new(catalog: Arc<Catalog>, gateway: Arc<dyn MessageGateway>) -> Self {
        Self { engine: NavigationEngine::new(catalog), dispatcher: PlanDispatcher::new(gateway) }
    }

    pub fn gateway_mode(&self) -> &'static str {
        self.dispatcher.gateway_mode()
    }

    /// Decodes a raw request body. Bodies that are not a webhook payload at all
    /// are the only failure; gateway problems are absorbed into the outcome.
    pub async fn process_body(
        &self,
        body: &[u8],
        context: &EventContext,
    ) -> Result<ProcessOutcome, ApplicationError> {
        let payload: WebhookPayload = serde_json::from_slice(body)
            .map_err(|error| ApplicationError::MalformedPayload(error.to_string()))?;
        Ok(self.process(&payload, context).await)
    }

    pub async fn process(
        &self,
        payload: &WebhookPayload,
        context: &EventContext,
    ) -> ProcessOutcome {
        let Some(event) = classify(payload) else {
            debug!(
                event_name = "whatsapp.webhook.ignored",
                correlation_id = %context.correlation_id,
                "delivery carried no actionable message"
            );
            return ProcessOutcome::NoIntent;
        };

        let plan = self.engine.route(&event.sender, &event.intent);
        info!(
            event_name = "whatsapp.webhook.routed",
            correlation_id = %context.correlation_id,
            sender = %mask_sender(&event.sender),
            message_id = event.message_id.as_deref().unwrap_or("unknown"),
            intent = event.intent.label(),
            action = plan.action.label(),
            messages = plan.len(),
            "inbound message routed"
        );

        let outcome = self.dispatcher.dispatch(&plan, context).await;
        ProcessOutcome::Dispatched { action: plan.action, outcome }
    }
}

/// Masks all but the last four characters of a sender identifier.
pub fn mask_sender(sender: &str) -> String {
    let count = sender.chars().count();
    if count <= 4 {
        return "*".repeat(count);
    }

    sender
        .chars()
        .enumerate()
        .map(|(index, character)| if index < count - 4 { '*' } else { character })
        .collect()
}
