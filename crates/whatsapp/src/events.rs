use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Webhook body as delivered by the Cloud API. Every level is optional so that
/// batched or irrelevant deliveries (status updates, empty changes) decode
/// cleanly and classify to "no intent".
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct WebhookPayload {
    pub object: Option<String>,
    pub entry: Option<Vec<WebhookEntry>>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct WebhookEntry {
    pub id: Option<String>,
    pub changes: Option<Vec<WebhookChange>>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct WebhookChange {
    pub field: Option<String>,
    pub value: Option<ChangeValue>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct ChangeValue {
    pub messaging_product: Option<String>,
    pub messages: Option<Vec<InboundMessage>>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct InboundMessage {
    pub from: Option<String>,
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub text: Option<TextContent>,
    pub interactive: Option<InteractiveContent>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct TextContent {
    pub body: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct InteractiveContent {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub button_reply: Option<ReplyContent>,
    pub list_reply: Option<ReplyContent>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct ReplyContent {
    pub id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionKind {
    Button,
    List,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "intent", rename_all = "snake_case")]
pub enum InboundIntent {
    FreeText { body: String },
    Selection { kind: SelectionKind, choice_id: String },
    Unsupported { raw_kind: String },
}

impl InboundIntent {
    pub fn label(&self) -> &'static str {
        match self {
            Self::FreeText { .. } => "free_text",
            Self::Selection { kind: SelectionKind::Button, .. } => "button_selection",
            Self::Selection { kind: SelectionKind::List, .. } => "list_selection",
            Self::Unsupported { .. } => "unsupported",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InboundEvent {
    pub sender: String,
    pub message_id: Option<String>,
    pub intent: InboundIntent,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventContext {
    pub correlation_id: String,
}

impl EventContext {
    /// Fresh context for one webhook delivery.
    pub fn generate() -> Self {
        Self { correlation_id: Uuid::new_v4().to_string() }
    }
}

impl Default for EventContext {
    fn default() -> Self {
        Self { correlation_id: "unknown-correlation-id".to_owned() }
    }
}

/// Extracts the first message of the first change of the first entry.
///
/// Returns `None` when the delivery carries no message or no sender; that is
/// expected traffic, not an error.
pub fn classify(payload: &WebhookPayload) -> Option<InboundEvent> {
    let message = payload
        .entry
        .as_deref()?
        .first()?
        .changes
        .as_deref()?
        .first()?
        .value
        .as_ref()?
        .messages
        .as_deref()?
        .first()?;

    let sender = message.from.as_deref().map(str::trim).filter(|from| !from.is_empty())?;

    Some(InboundEvent {
        sender: sender.to_owned(),
        message_id: message.id.clone(),
        intent: classify_message(message),
    })
}

pub fn classify_message(message: &InboundMessage) -> InboundIntent {
    match message.kind.as_deref().unwrap_or_default() {
        "text" => match message.text.as_ref().and_then(|text| text.body.as_deref()) {
            Some(body) if !body.trim().is_empty() => {
                InboundIntent::FreeText { body: body.to_owned() }
            }
            _ => InboundIntent::Unsupported { raw_kind: "text".to_owned() },
        },
        "interactive" => classify_interactive(message.interactive.as_ref()),
        "" => InboundIntent::Unsupported { raw_kind: "unknown".to_owned() },
        other => InboundIntent::Unsupported { raw_kind: other.to_owned() },
    }
}

fn classify_interactive(interactive: Option<&InteractiveContent>) -> InboundIntent {
    let Some(interactive) = interactive else {
        return InboundIntent::Unsupported { raw_kind: "interactive".to_owned() };
    };

    let sub_kind = interactive.kind.as_deref().unwrap_or_default();
    let (kind, reply) = match sub_kind {
        "button_reply" => (SelectionKind::Button, interactive.button_reply.as_ref()),
        "list_reply" => (SelectionKind::List, interactive.list_reply.as_ref()),
        _ => return InboundIntent::Unsupported { raw_kind: format!("interactive.{sub_kind}") },
    };

    match reply.and_then(|reply| reply.id.as_deref()).filter(|id| !id.is_empty()) {
        Some(choice_id) => InboundIntent::Selection { kind, choice_id: choice_id.to_owned() },
        None => InboundIntent::Unsupported { raw_kind: format!("interactive.{sub_kind}") },
    }
}
