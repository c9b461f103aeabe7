use std::path::Path;
use std::sync::Arc;

use aseobi_whatsapp::events::{InboundIntent, SelectionKind};
use aseobi_whatsapp::navigation::NavigationEngine;

use crate::commands::{resolve_catalog, CommandResult};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PreviewIntent {
    Text(String),
    Select { choice_id: String, list: bool },
}

impl PreviewIntent {
    fn into_inbound(self) -> InboundIntent {
        match self {
            Self::Text(body) if body.trim().is_empty() => {
                InboundIntent::Unsupported { raw_kind: "text".to_string() }
            }
            Self::Text(body) => InboundIntent::FreeText { body },
            Self::Select { choice_id, list } => InboundIntent::Selection {
                kind: if list { SelectionKind::List } else { SelectionKind::Button },
                choice_id,
            },
        }
    }
}

/// Routes a simulated message through the navigation engine and prints the
/// resulting plan. Nothing is sent.
pub fn run(intent: PreviewIntent, recipient: &str, catalog_path: Option<&Path>) -> CommandResult {
    let catalog = match resolve_catalog("preview", catalog_path) {
        Ok(catalog) => catalog,
        Err(failure) => return failure,
    };

    let engine = NavigationEngine::new(Arc::new(catalog));
    let plan = engine.route(recipient, &intent.into_inbound());

    match serde_json::to_string_pretty(&plan) {
        Ok(output) => CommandResult::raw(0, output),
        Err(error) => CommandResult::failure("preview", "serialization", error.to_string(), 1),
    }
}
