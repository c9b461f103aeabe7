use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use aseobi_core::config::AppConfig;
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::messages::{ButtonPrompt, ListPrompt, ListSection, OutboundMessage, PromptHeader};
use crate::processor::mask_sender;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SentMessage {
    pub message_id: Option<String>,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum GatewayError {
    #[error("http client could not be built: {0}")]
    Client(String),
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("provider rejected message with status {status}: {detail}")]
    Rejected { status: u16, detail: String },
    #[error("unexpected provider response: {0}")]
    Decode(String),
}

#[async_trait]
pub trait MessageGateway: Send + Sync {
    async fn send(
        &self,
        recipient: &str,
        message: &OutboundMessage,
    ) -> Result<SentMessage, GatewayError>;

    fn mode(&self) -> &'static str;
}

/// Delivers messages through the Cloud API `/messages` endpoint.
pub struct CloudApiGateway {
    client: Client,
    messages_url: String,
    access_token: SecretString,
}

impl CloudApiGateway {
    pub fn new(
        messages_url: impl Into<String>,
        access_token: SecretString,
        timeout: Duration,
    ) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| GatewayError::Client(error.to_string()))?;

        Ok(Self { client, messages_url: messages_url.into(), access_token })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, GatewayError> {
        Self::new(
            config.messages_url(),
            config.whatsapp.access_token.clone(),
            Duration::from_secs(config.whatsapp.timeout_secs),
        )
    }

    pub fn messages_url(&self) -> &str {
        &self.messages_url
    }
}

#[async_trait]
impl MessageGateway for CloudApiGateway {
    async fn send(
        &self,
        recipient: &str,
        message: &OutboundMessage,
    ) -> Result<SentMessage, GatewayError> {
        let request = WireMessage::new(recipient, message);

        let response = self
            .client
            .post(&self.messages_url)
            .bearer_auth(self.access_token.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|error| {
                if error.is_timeout() {
                    GatewayError::Transport(format!("request timed out: {error}"))
                } else if error.is_connect() {
                    GatewayError::Transport(format!("connection failed: {error}"))
                } else {
                    GatewayError::Transport(error.to_string())
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|error| GatewayError::Transport(format!("failed to read response: {error}")))?;

        if !status.is_success() {
            let detail = serde_json::from_str::<WireErrorResponse>(&body)
                .map(|error| error.error.message)
                .unwrap_or(body);
            return Err(GatewayError::Rejected { status: status.as_u16(), detail });
        }

        let accepted: WireSendResponse = serde_json::from_str(&body)
            .map_err(|error| GatewayError::Decode(format!("{error}: {body}")))?;
        let message_id = accepted.messages.into_iter().next().map(|sent| sent.id);

        debug!(
            event_name = "whatsapp.gateway.sent",
            recipient = %mask_sender(recipient),
            message_kind = message.kind(),
            message_id = message_id.as_deref().unwrap_or("unknown"),
            "outbound message accepted"
        );

        Ok(SentMessage { message_id })
    }

    fn mode(&self) -> &'static str {
        "cloud_api"
    }
}

/// Logs messages instead of delivering them. Only a counter is kept.
#[derive(Default)]
pub struct DryRunGateway {
    sequence: AtomicU64,
}

impl DryRunGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent_count(&self) -> u64 {
        self.sequence.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MessageGateway for DryRunGateway {
    async fn send(
        &self,
        recipient: &str,
        message: &OutboundMessage,
    ) -> Result<SentMessage, GatewayError> {
        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        info!(
            event_name = "whatsapp.gateway.dry_run",
            recipient = %mask_sender(recipient),
            message_kind = message.kind(),
            sequence,
            "outbound message not delivered (dry run)"
        );

        Ok(SentMessage { message_id: Some(format!("dry-run-{sequence}")) })
    }

    fn mode(&self) -> &'static str {
        "dry_run"
    }
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    messaging_product: &'static str,
    recipient_type: &'static str,
    to: &'a str,
    #[serde(flatten)]
    content: WireContent<'a>,
}

impl<'a> WireMessage<'a> {
    fn new(recipient: &'a str, message: &'a OutboundMessage) -> Self {
        let content = match message {
            OutboundMessage::Text { body } => {
                WireContent::Text { text: WireText { preview_url: false, body } }
            }
            OutboundMessage::Image { link, caption } => WireContent::Image {
                image: WireMedia { link, caption: caption.as_deref() },
            },
            OutboundMessage::Buttons(prompt) => {
                WireContent::Interactive { interactive: WireInteractive::from_buttons(prompt) }
            }
            OutboundMessage::List(prompt) => {
                WireContent::Interactive { interactive: WireInteractive::from_list(prompt) }
            }
        };

        Self { messaging_product: "whatsapp", recipient_type: "individual", to: recipient, content }
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WireContent<'a> {
    Text { text: WireText<'a> },
    Image { image: WireMedia<'a> },
    Interactive { interactive: WireInteractive<'a> },
}

#[derive(Debug, Serialize)]
struct WireText<'a> {
    preview_url: bool,
    body: &'a str,
}

#[derive(Debug, Serialize)]
struct WireMedia<'a> {
    link: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    caption: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct WireBody<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WireHeader<'a> {
    Text { text: &'a str },
    Image { image: WireMedia<'a> },
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WireInteractive<'a> {
    Button {
        #[serde(skip_serializing_if = "Option::is_none")]
        header: Option<WireHeader<'a>>,
        body: WireBody<'a>,
        #[serde(skip_serializing_if = "Option::is_none")]
        footer: Option<WireBody<'a>>,
        action: WireButtonAction<'a>,
    },
    List {
        #[serde(skip_serializing_if = "Option::is_none")]
        header: Option<WireHeader<'a>>,
        body: WireBody<'a>,
        #[serde(skip_serializing_if = "Option::is_none")]
        footer: Option<WireBody<'a>>,
        action: WireListAction<'a>,
    },
}

impl<'a> WireInteractive<'a> {
    fn from_buttons(prompt: &'a ButtonPrompt) -> Self {
        let header = prompt.header.as_ref().map(|header| match header {
            PromptHeader::Text { text } => WireHeader::Text { text },
            PromptHeader::Image { link } => {
                WireHeader::Image { image: WireMedia { link, caption: None } }
            }
        });

        Self::Button {
            header,
            body: WireBody { text: &prompt.body },
            footer: prompt.footer.as_deref().map(|text| WireBody { text }),
            action: WireButtonAction {
                buttons: prompt
                    .buttons
                    .iter()
                    .map(|button| WireButton {
                        kind: "reply",
                        reply: WireReply { id: &button.id, title: &button.title },
                    })
                    .collect(),
            },
        }
    }

    fn from_list(prompt: &'a ListPrompt) -> Self {
        Self::List {
            header: prompt.header.as_deref().map(|text| WireHeader::Text { text }),
            body: WireBody { text: &prompt.body },
            footer: prompt.footer.as_deref().map(|text| WireBody { text }),
            action: WireListAction { button: &prompt.button_label, sections: &prompt.sections },
        }
    }
}

#[derive(Debug, Serialize)]
struct WireButtonAction<'a> {
    buttons: Vec<WireButton<'a>>,
}

#[derive(Debug, Serialize)]
struct WireButton<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    reply: WireReply<'a>,
}

#[derive(Debug, Serialize)]
struct WireReply<'a> {
    id: &'a str,
    title: &'a str,
}

#[derive(Debug, Serialize)]
struct WireListAction<'a> {
    button: &'a str,
    sections: &'a [ListSection],
}

#[derive(Debug, Deserialize)]
struct WireSendResponse {
    #[serde(default)]
    messages: Vec<WireSentMessage>,
}

#[derive(Debug, Deserialize)]
struct WireSentMessage {
    id: String,
}

#[derive(Debug, Deserialize)]
struct WireErrorResponse {
    error: WireErrorDetail,
}

#[derive(Debug, Deserialize)]
struct WireErrorDetail {
    message: String,
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::extract::State;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use tokio::net::TcpListener;
    use tokio::sync::Mutex;

    use super::{CloudApiGateway, DryRunGateway, GatewayError, MessageGateway, WireMessage};
    use crate::messages::{
        browse_navigation_message, category_list_message, category_promo_card, OutboundMessage,
    };
    use aseobi_core::Catalog;

    #[derive(Clone, Default)]
    struct FakeProvider {
        requests: Arc<Mutex<Vec<(Option<String>, Value)>>>,
    }

    async fn accept(
        State(provider): State<FakeProvider>,
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> (StatusCode, Json<Value>) {
        let auth = headers
            .get("authorization")
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        provider.requests.lock().await.push((auth, body));
        (
            StatusCode::OK,
            Json(json!({
                "messaging_product": "whatsapp",
                "contacts": [{ "input": "2348000000001", "wa_id": "2348000000001" }],
                "messages": [{ "id": "wamid.HBgM" }]
            })),
        )
    }

    async fn reject() -> (StatusCode, Json<Value>) {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": {
                    "message": "(#131030) Recipient phone number not in allowed list",
                    "type": "OAuthException",
                    "code": 131030
                }
            })),
        )
    }

    async fn spawn_provider() -> (String, FakeProvider) {
        let provider = FakeProvider::default();
        let app = Router::new()
            .route("/v21.0/PN-1/messages", post(accept))
            .route("/v21.0/PN-REJECT/messages", post(reject))
            .with_state(provider.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind fake provider");
        let address = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("fake provider");
        });

        (format!("http://{address}"), provider)
    }

    fn gateway(url: String) -> CloudApiGateway {
        CloudApiGateway::new(url, "test-token".to_owned().into(), Duration::from_secs(5))
            .expect("gateway")
    }

    #[tokio::test]
    async fn text_message_is_posted_with_bearer_token() {
        let (base_url, provider) = spawn_provider().await;
        let gateway = gateway(format!("{base_url}/v21.0/PN-1/messages"));

        let sent = gateway
            .send("2348000000001", &OutboundMessage::text("Hello"))
            .await
            .expect("send should succeed");

        assert_eq!(sent.message_id.as_deref(), Some("wamid.HBgM"));
        let requests = provider.requests.lock().await;
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].0.as_deref(), Some("Bearer test-token"));
        assert_eq!(
            requests[0].1,
            json!({
                "messaging_product": "whatsapp",
                "recipient_type": "individual",
                "to": "2348000000001",
                "type": "text",
                "text": { "preview_url": false, "body": "Hello" }
            })
        );
    }

    #[tokio::test]
    async fn provider_rejection_surfaces_error_message() {
        let (base_url, _provider) = spawn_provider().await;
        let gateway = gateway(format!("{base_url}/v21.0/PN-REJECT/messages"));

        let error = gateway
            .send("2348000000001", &OutboundMessage::text("Hello"))
            .await
            .expect_err("send should be rejected");

        assert_eq!(
            error,
            GatewayError::Rejected {
                status: 400,
                detail: "(#131030) Recipient phone number not in allowed list".to_owned()
            }
        );
    }

    #[tokio::test]
    async fn unreachable_provider_is_a_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let address = listener.local_addr().expect("local addr");
        drop(listener);

        let error = gateway(format!("http://{address}/v21.0/PN-1/messages"))
            .send("1", &OutboundMessage::text("Hello"))
            .await
            .expect_err("send should fail");

        assert!(matches!(error, GatewayError::Transport(_)));
    }

    #[test]
    fn promo_card_serializes_as_interactive_button_with_image_header() {
        let catalog = Catalog::builtin();
        let category = catalog.find_id("casual").expect("casual");
        let message = category_promo_card(category);
        let wire = serde_json::to_value(WireMessage::new("1", &message)).expect("serialize");

        assert_eq!(wire["type"], "interactive");
        assert_eq!(wire["interactive"]["type"], "button");
        assert_eq!(wire["interactive"]["header"]["type"], "image");
        assert_eq!(wire["interactive"]["header"]["image"]["link"], category.products[0].image_url);
        assert_eq!(wire["interactive"]["action"]["buttons"][0]["type"], "reply");
        assert_eq!(wire["interactive"]["action"]["buttons"][0]["reply"]["id"], "view_casual");
    }

    #[test]
    fn list_and_buttons_serialize_to_provider_shapes() {
        let catalog = Catalog::builtin();
        let list = serde_json::to_value(WireMessage::new("1", &category_list_message(&catalog)))
            .expect("serialize list");

        assert_eq!(list["interactive"]["type"], "list");
        assert_eq!(
            list["interactive"]["header"],
            json!({ "type": "text", "text": "Aseobi Collections" })
        );
        assert_eq!(list["interactive"]["action"]["button"], "View categories");
        assert_eq!(
            list["interactive"]["action"]["sections"][0]["rows"][0]["id"],
            "category_traditional"
        );

        let buttons = serde_json::to_value(WireMessage::new("1", &browse_navigation_message()))
            .expect("serialize buttons");
        assert!(buttons["interactive"].get("header").is_none());
        assert_eq!(buttons["interactive"]["body"]["text"], "What would you like to do next?");
        assert_eq!(buttons["interactive"]["action"]["buttons"].as_array().map(Vec::len), Some(2));

        let image = serde_json::to_value(WireMessage::new(
            "1",
            &OutboundMessage::image("https://img.example/a.jpg", None),
        ))
        .expect("serialize image");
        assert_eq!(image["image"], json!({ "link": "https://img.example/a.jpg" }));
    }

    #[tokio::test]
    async fn dry_run_gateway_counts_instead_of_sending() {
        let gateway = DryRunGateway::new();
        let first =
            gateway.send("2348000000001", &OutboundMessage::text("one")).await.expect("send");
        let second =
            gateway.send("2348000000001", &OutboundMessage::text("two")).await.expect("send");

        assert_eq!(first.message_id.as_deref(), Some("dry-run-1"));
        assert_eq!(second.message_id.as_deref(), Some("dry-run-2"));
        assert_eq!(gateway.mode(), "dry_run");
        assert_eq!(gateway.sent_count(), 2);
    }

    #[tokio::test]
    async fn dry_run_gateway_holds_no_message_history() {
        let gateway = DryRunGateway::new();
        let message = OutboundMessage::text("x".repeat(4096));
        for _ in 0..10_000 {
            gateway.send("2348000000001", &message).await.expect("send");
        }

        assert_eq!(gateway.sent_count(), 10_000);
        assert_eq!(std::mem::size_of::<DryRunGateway>(), std::mem::size_of::<u64>());
    }
}
