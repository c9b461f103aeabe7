use std::sync::Arc;

use aseobi_core::{Catalog, Category, CategoryId};
use serde::Serialize;

use crate::events::InboundIntent;
use crate::messages::{
    browse_navigation_message, category_header_message, category_list_message,
    category_not_found_message, category_promo_card, product_card, text_browse_closing,
    text_browse_intro, welcome_message, OutboundMessage,
};

pub const CATEGORY_CHOICE_PREFIX: &str = "category_";
pub const VIEW_CHOICE_PREFIX: &str = "view_";
pub const BACK_TO_CATEGORIES_CHOICE: &str = "back_to_categories";
pub const CONTINUE_SHOPPING_CHOICE: &str = "continue_shopping";
pub const SHOP_TRIGGER_WORD: &str = "shop";

pub fn category_choice_id(id: &CategoryId) -> String {
    format!("{CATEGORY_CHOICE_PREFIX}{id}")
}

pub fn view_choice_id(id: &CategoryId) -> String {
    format!("{VIEW_CHOICE_PREFIX}{id}")
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WelcomeReason {
    UnknownSelection,
    UnsupportedEvent,
    UnmatchedText,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum NavigationAction {
    ShowWelcome { reason: WelcomeReason },
    ShowCategoryList,
    ShowCategoryPromo { category_id: CategoryId },
    ShowCategoryProducts { category_id: CategoryId },
    ShowCategoryNotFound { requested: String },
    ShowCategoryByTextMatch { category_id: CategoryId, query: String },
}

impl NavigationAction {
    /// Decides what an intent means for catalog browsing. Every intent maps to
    /// some action; unrecognized selections fall back to the welcome message.
    pub fn resolve(intent: &InboundIntent, catalog: &Catalog) -> Self {
        match intent {
            InboundIntent::Selection { choice_id, .. } => resolve_selection(choice_id, catalog),
            InboundIntent::FreeText { body } => resolve_text(body, catalog),
            InboundIntent::Unsupported { .. } => {
                Self::ShowWelcome { reason: WelcomeReason::UnsupportedEvent }
            }
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::ShowWelcome { .. } => "show_welcome",
            Self::ShowCategoryList => "show_category_list",
            Self::ShowCategoryPromo { .. } => "show_category_promo",
            Self::ShowCategoryProducts { .. } => "show_category_products",
            Self::ShowCategoryNotFound { .. } => "show_category_not_found",
            Self::ShowCategoryByTextMatch { .. } => "show_category_by_text_match",
        }
    }
}

fn resolve_selection(choice_id: &str, catalog: &Catalog) -> NavigationAction {
    if let Some(requested) = choice_id.strip_prefix(CATEGORY_CHOICE_PREFIX) {
        return match catalog.find_id(requested) {
            Some(category) => {
                NavigationAction::ShowCategoryPromo { category_id: category.id.clone() }
            }
            None => NavigationAction::ShowCategoryNotFound { requested: requested.to_owned() },
        };
    }

    if let Some(requested) = choice_id.strip_prefix(VIEW_CHOICE_PREFIX) {
        return match catalog.find_id(requested) {
            Some(category) => {
                NavigationAction::ShowCategoryProducts { category_id: category.id.clone() }
            }
            None => NavigationAction::ShowCategoryNotFound { requested: requested.to_owned() },
        };
    }

    match choice_id {
        BACK_TO_CATEGORIES_CHOICE | CONTINUE_SHOPPING_CHOICE => NavigationAction::ShowCategoryList,
        _ => NavigationAction::ShowWelcome { reason: WelcomeReason::UnknownSelection },
    }
}

fn resolve_text(body: &str, catalog: &Catalog) -> NavigationAction {
    if let Some(category) = match_category_text(body, catalog) {
        return NavigationAction::ShowCategoryByTextMatch {
            category_id: category.id.clone(),
            query: body.to_owned(),
        };
    }

    if body.to_lowercase().contains(SHOP_TRIGGER_WORD) {
        NavigationAction::ShowCategoryList
    } else {
        NavigationAction::ShowWelcome { reason: WelcomeReason::UnmatchedText }
    }
}

/// A 1-based position wins over a name match; out-of-range numbers fall through
/// to the substring search.
pub fn match_category_text<'a>(body: &str, catalog: &'a Catalog) -> Option<&'a Category> {
    let query = body.trim();
    query
        .parse::<usize>()
        .ok()
        .and_then(|position| catalog.by_position(position))
        .or_else(|| catalog.search(query))
}

/// Ordered messages for one recipient, produced from one navigation action.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct OutboundPlan {
    pub recipient: String,
    pub action: NavigationAction,
    pub messages: Vec<OutboundMessage>,
}

impl OutboundPlan {
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[derive(Clone, Debug)]
pub struct NavigationEngine {
    catalog: Arc<Catalog>,
}

impl NavigationEngine {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn route(&self, sender: &str, intent: &InboundIntent) -> OutboundPlan {
        let action = NavigationAction::resolve(intent, &self.catalog);
        let messages = self.compose(&action);
        OutboundPlan { recipient: sender.to_owned(), action, messages }
    }

    pub fn compose(&self, action: &NavigationAction) -> Vec<OutboundMessage> {
        match action {
            NavigationAction::ShowWelcome { .. } => vec![welcome_message()],
            NavigationAction::ShowCategoryList => vec![category_list_message(&self.catalog)],
            NavigationAction::ShowCategoryNotFound { .. } => vec![category_not_found_message()],
            NavigationAction::ShowCategoryPromo { category_id } => self
                .catalog
                .find(category_id)
                .map(|category| vec![category_promo_card(category)])
                .unwrap_or_else(|| vec![category_not_found_message()]),
            NavigationAction::ShowCategoryProducts { category_id } => {
                match self.catalog.find(category_id) {
                    Some(category) => {
                        let mut messages = Vec::with_capacity(category.item_count() + 2);
                        messages.push(category_header_message(category));
                        messages.extend(self.product_cards(category));
                        messages.push(browse_navigation_message());
                        messages
                    }
                    None => vec![category_not_found_message()],
                }
            }
            NavigationAction::ShowCategoryByTextMatch { category_id, .. } => {
                match self.catalog.find(category_id) {
                    Some(category) => {
                        let mut messages = Vec::with_capacity(category.item_count() + 2);
                        messages.push(text_browse_intro(category));
                        messages.extend(self.product_cards(category));
                        messages.push(text_browse_closing());
                        messages
                    }
                    None => vec![category_not_found_message()],
                }
            }
        }
    }

    fn product_cards<'a>(
        &'a self,
        category: &'a Category,
    ) -> impl Iterator<Item = OutboundMessage> + 'a {
        let currency = self.catalog.currency_symbol();
        category.products.iter().map(move |product| product_card(product, currency))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use aseobi_core::{Catalog, Category, CategoryId, Product, ProductId};

    use super::{NavigationAction, NavigationEngine, WelcomeReason};
    use crate::events::{InboundIntent, SelectionKind};
    use crate::messages::{
        category_not_found_message, welcome_message, OutboundMessage, PromptHeader,
    };

    fn engine() -> NavigationEngine {
        NavigationEngine::new(Arc::new(Catalog::builtin()))
    }

    fn button(choice_id: &str) -> InboundIntent {
        InboundIntent::Selection { kind: SelectionKind::Button, choice_id: choice_id.to_owned() }
    }

    fn list(choice_id: &str) -> InboundIntent {
        InboundIntent::Selection { kind: SelectionKind::List, choice_id: choice_id.to_owned() }
    }

    fn text(body: &str) -> InboundIntent {
        InboundIntent::FreeText { body: body.to_owned() }
    }

    fn fixture_catalog() -> Catalog {
        let product = |id: &str| Product {
            id: ProductId(id.to_owned()),
            name: format!("Item {id}"),
            image_url: format!("https://img.example/{id}.jpg"),
            colors: vec!["Blue".to_owned()],
            price: 1_000,
            description: "Fixture".to_owned(),
            sizes: None,
            material: None,
            care_instructions: None,
        };

        Catalog::new(
            "$",
            vec![
                Category {
                    id: CategoryId("lace".to_owned()),
                    name: "Lace".to_owned(),
                    description: "Lace fabrics".to_owned(),
                    products: vec![product("l1"), product("l2"), product("l3")],
                },
                Category {
                    id: CategoryId("shopping-bags".to_owned()),
                    name: "Bags".to_owned(),
                    description: "Matching bags".to_owned(),
                    products: vec![],
                },
            ],
        )
        .expect("fixture catalog is valid")
    }

    #[test]
    fn numeric_text_routes_to_category_at_that_position() {
        let engine = engine();
        for (index, category) in engine.catalog().categories().iter().enumerate() {
            let plan = engine.route("2348000000001", &text(&(index + 1).to_string()));
            assert_eq!(
                plan.action,
                NavigationAction::ShowCategoryByTextMatch {
                    category_id: category.id.clone(),
                    query: (index + 1).to_string(),
                }
            );
        }
    }

    #[test]
    fn out_of_range_numbers_do_not_match_a_category() {
        let plan = engine().route("1", &text("0"));
        assert_eq!(
            plan.action,
            NavigationAction::ShowWelcome { reason: WelcomeReason::UnmatchedText }
        );

        let plan = engine().route("1", &text("4"));
        assert_eq!(plan.messages, vec![welcome_message()]);
    }

    #[test]
    fn view_selection_emits_header_products_and_trailing_buttons() {
        let engine = engine();
        for category in engine.catalog().categories() {
            let plan = engine.route("1", &button(&format!("view_{}", category.id)));

            assert_eq!(plan.len(), 2 + category.products.len());
            assert!(matches!(
                &plan.messages[0],
                OutboundMessage::Text { body } if body.contains(&category.name)
            ));
            let product_cards = &plan.messages[1..=category.products.len()];
            for (message, product) in product_cards.iter().zip(&category.products) {
                assert!(matches!(
                    message,
                    OutboundMessage::Image { link, caption: Some(caption) }
                        if link == &product.image_url && caption.contains(&product.name)
                ));
            }
            let Some(OutboundMessage::Buttons(prompt)) = plan.messages.last() else {
                panic!("trailing message should be the navigation buttons");
            };
            assert_eq!(prompt.buttons[0].id, "back_to_categories");
            assert_eq!(prompt.buttons[1].id, "continue_shopping");
        }
    }

    #[test]
    fn category_selection_emits_single_promo_card_with_view_choice() {
        let engine = engine();
        for category in engine.catalog().categories() {
            let plan = engine.route("1", &list(&format!("category_{}", category.id)));

            assert_eq!(plan.len(), 1);
            let OutboundMessage::Buttons(card) = &plan.messages[0] else {
                panic!("promo card should be a button prompt");
            };
            assert!(matches!(card.header, Some(PromptHeader::Image { .. })));
            assert_eq!(card.buttons.len(), 1);
            assert_eq!(card.buttons[0].id, format!("view_{}", category.id));
        }
    }

    #[test]
    fn back_and_continue_produce_identical_category_lists() {
        let engine = engine();
        let back = engine.route("1", &button("back_to_categories"));
        let resume = engine.route("1", &button("continue_shopping"));

        assert_eq!(back.messages, resume.messages);
        assert_eq!(back.action, NavigationAction::ShowCategoryList);
        assert!(matches!(back.messages.as_slice(), [OutboundMessage::List(_)]));
    }

    #[test]
    fn text_matching_ignores_case() {
        let engine = engine();
        let upper = engine.route("1", &text("CASUAL"));
        let lower = engine.route("1", &text("casual"));

        assert_eq!(upper.messages, lower.messages);
        assert!(matches!(
            upper.action,
            NavigationAction::ShowCategoryByTextMatch { ref category_id, .. }
                if category_id.as_str() == "casual"
        ));
    }

    #[test]
    fn text_browse_has_no_navigation_buttons() {
        let plan = engine().route("1", &text("formal"));

        assert_eq!(plan.len(), 4);
        assert!(plan
            .messages
            .iter()
            .all(|message| !matches!(message, OutboundMessage::Buttons(_))));
        assert!(matches!(plan.messages.last(), Some(OutboundMessage::Text { .. })));
    }

    #[test]
    fn unknown_category_reference_yields_single_not_found_text() {
        let engine = engine();
        for intent in [button("view_nonexistent"), list("category_nonexistent")] {
            let plan = engine.route("1", &intent);
            assert_eq!(plan.messages, vec![category_not_found_message()]);
            assert_eq!(
                plan.action,
                NavigationAction::ShowCategoryNotFound { requested: "nonexistent".to_owned() }
            );
        }
    }

    #[test]
    fn shop_trigger_shows_category_list_when_nothing_matches() {
        let plan = engine().route("1", &text("I want to SHOP please"));
        assert_eq!(plan.action, NavigationAction::ShowCategoryList);
    }

    #[test]
    fn catalog_match_takes_precedence_over_shop_trigger() {
        let engine = NavigationEngine::new(Arc::new(fixture_catalog()));
        let plan = engine.route("1", &text("shop"));

        assert!(matches!(
            plan.action,
            NavigationAction::ShowCategoryByTextMatch { ref category_id, .. }
                if category_id.as_str() == "shopping-bags"
        ));
        assert_eq!(plan.len(), 2);
    }

    #[test]
    fn fixture_catalog_drives_message_counts_and_currency() {
        let engine = NavigationEngine::new(Arc::new(fixture_catalog()));
        let plan = engine.route("1", &button("view_lace"));

        assert_eq!(plan.len(), 5);
        assert!(matches!(
            &plan.messages[1],
            OutboundMessage::Image { caption: Some(caption), .. } if caption.contains("$1,000")
        ));
    }

    #[test]
    fn everything_else_falls_back_to_welcome() {
        let engine = engine();

        let unknown = engine.route("1", &button("checkout"));
        assert_eq!(
            unknown.action,
            NavigationAction::ShowWelcome { reason: WelcomeReason::UnknownSelection }
        );
        assert_eq!(unknown.messages, vec![welcome_message()]);

        let unsupported =
            engine.route("1", &InboundIntent::Unsupported { raw_kind: "image".to_owned() });
        assert_eq!(
            unsupported.action,
            NavigationAction::ShowWelcome { reason: WelcomeReason::UnsupportedEvent }
        );

        let chatter = engine.route("1", &text("hello"));
        assert_eq!(chatter.messages, vec![welcome_message()]);
        assert_eq!(chatter.recipient, "1");
    }
}
