use std::sync::Arc;

use tracing::{info, warn};

use crate::events::EventContext;
use crate::gateway::{GatewayError, MessageGateway};
use crate::navigation::OutboundPlan;
use crate::processor::mask_sender;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DispatchOutcome {
    Completed { delivered: usize },
    Aborted { delivered: usize, remaining: usize, error: GatewayError },
}

impl DispatchOutcome {
    pub fn delivered(&self) -> usize {
        match self {
            Self::Completed { delivered } | Self::Aborted { delivered, .. } => *delivered,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }
}

/// Sends a plan one message at a time. Each send is awaited before the next is
/// issued; the first failure abandons the rest of the plan. Already delivered
/// messages are not recalled and nothing is retried.
pub struct PlanDispatcher {
    gateway: Arc<dyn MessageGateway>,
}

impl PlanDispatcher {
    pub fn new(gateway: Arc<dyn MessageGateway>) -> Self {
        Self { gateway }
    }

    pub fn gateway_mode(&self) -> &'static str {
        self.gateway.mode()
    }

    pub async fn dispatch(&self, plan: &OutboundPlan, context: &EventContext) -> DispatchOutcome {
        let total = plan.messages.len();

        for (index, message) in plan.messages.iter().enumerate() {
            if let Err(error) = self.gateway.send(&plan.recipient, message).await {
                let remaining = total - index;
                warn!(
                    event_name = "whatsapp.dispatch.aborted",
                    correlation_id = %context.correlation_id,
                    sender = %mask_sender(&plan.recipient),
                    action = plan.action.label(),
                    delivered = index,
                    remaining,
                    message_kind = message.kind(),
                    error = %error,
                    "outbound plan aborted after gateway failure"
                );
                return DispatchOutcome::Aborted { delivered: index, remaining, error };
            }
        }

        info!(
            event_name = "whatsapp.dispatch.completed",
            correlation_id = %context.correlation_id,
            sender = %mask_sender(&plan.recipient),
            action = plan.action.label(),
            delivered = total,
            "outbound plan delivered"
        );
        DispatchOutcome::Completed { delivered: total }
    }
}
