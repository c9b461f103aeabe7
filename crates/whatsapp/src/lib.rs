//! WhatsApp Integration - webhook-driven catalog browsing
//!
//! This crate provides the WhatsApp Cloud API interface for aseobi:
//! - **Events** (`events`) - webhook payload model and the inbound event classifier
//! - **Navigation** (`navigation`) - maps an inbound intent to a catalog navigation action
//!   and composes the ordered outbound plan
//! - **Messages** (`messages`) - outbound message intents, builders and templates
//! - **Gateway** (`gateway`) - delivery of outbound messages to the Cloud API
//! - **Dispatch** (`dispatch`) - ordered, abort-on-failure plan execution
//! - **Processor** (`processor`) - classify → route → dispatch for one webhook delivery
//! - **Verify** (`verify`) - subscription handshake token check
//!
//! # Architecture
//!
//! ```text
//! Webhook POST → classify → InboundIntent → NavigationEngine → OutboundPlan
//!                                                                  ↓
//!                                  Cloud API ← MessageGateway ← PlanDispatcher
//! ```
//!
//! # Key Types
//!
//! - `NavigationEngine` - pure routing over an injected, read-only `Catalog`
//! - `MessageGateway` - trait for delivering one outbound message
//! - `PlanDispatcher` - sends a plan strictly in order
//! - `WebhookProcessor` - per-delivery orchestration used by the HTTP layer

pub mod dispatch;
pub mod events;
pub mod gateway;
pub mod messages;
pub mod navigation;
pub mod processor;
pub mod verify;
