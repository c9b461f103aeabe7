use aseobi_core::{Catalog, Category, Product};
use serde::Serialize;

use crate::navigation::{
    category_choice_id, view_choice_id, BACK_TO_CATEGORIES_CHOICE, CONTINUE_SHOPPING_CHOICE,
};

pub const MAX_REPLY_BUTTONS: usize = 3;
pub const MAX_LIST_ROWS: usize = 10;
const BUTTON_TITLE_LIMIT: usize = 20;
const LIST_BUTTON_LIMIT: usize = 20;
const SECTION_TITLE_LIMIT: usize = 24;
const ROW_TITLE_LIMIT: usize = 24;
const ROW_DESCRIPTION_LIMIT: usize = 72;
const HEADER_TEXT_LIMIT: usize = 60;
const FOOTER_TEXT_LIMIT: usize = 60;
const CAPTION_LIMIT: usize = 1024;
const TEXT_BODY_LIMIT: usize = 4096;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OutboundMessage {
    Text {
        body: String,
    },
    Image {
        link: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        caption: Option<String>,
    },
    Buttons(ButtonPrompt),
    List(ListPrompt),
}

impl OutboundMessage {
    pub fn text(body: impl Into<String>) -> Self {
        Self::Text { body: truncate(body.into(), TEXT_BODY_LIMIT) }
    }

    pub fn image(link: impl Into<String>, caption: Option<String>) -> Self {
        let caption = caption.map(|value| truncate(value, CAPTION_LIMIT));
        Self::Image { link: link.into(), caption }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Text { .. } => "text",
            Self::Image { .. } => "image",
            Self::Buttons(_) => "buttons",
            Self::List(_) => "list",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PromptHeader {
    Text { text: String },
    Image { link: String },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ReplyButton {
    pub id: String,
    pub title: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ButtonPrompt {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header: Option<PromptHeader>,
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<String>,
    pub buttons: Vec<ReplyButton>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ListRow {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ListSection {
    pub title: String,
    pub rows: Vec<ListRow>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ListPrompt {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header: Option<String>,
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<String>,
    pub button_label: String,
    pub sections: Vec<ListSection>,
}

pub struct ButtonPromptBuilder {
    header: Option<PromptHeader>,
    body: String,
    footer: Option<String>,
    buttons: Vec<ReplyButton>,
}

impl ButtonPromptBuilder {
    pub fn new(body: impl Into<String>) -> Self {
        Self { header: None, body: body.into(), footer: None, buttons: Vec::new() }
    }

    pub fn text_header(mut self, text: impl Into<String>) -> Self {
        self.header = Some(PromptHeader::Text { text: truncate(text.into(), HEADER_TEXT_LIMIT) });
        self
    }

    pub fn image_header(mut self, link: impl Into<String>) -> Self {
        self.header = Some(PromptHeader::Image { link: link.into() });
        self
    }

    pub fn footer(mut self, text: impl Into<String>) -> Self {
        self.footer = Some(truncate(text.into(), FOOTER_TEXT_LIMIT));
        self
    }

    pub fn buttons<F>(mut self, build: F) -> Self
    where
        F: FnOnce(&mut ButtonsBuilder),
    {
        let mut builder = ButtonsBuilder::default();
        build(&mut builder);
        self.buttons = builder.build();
        self
    }

    pub fn build(self) -> OutboundMessage {
        OutboundMessage::Buttons(ButtonPrompt {
            header: self.header,
            body: truncate(self.body, CAPTION_LIMIT),
            footer: self.footer,
            buttons: self.buttons,
        })
    }
}

#[derive(Default)]
pub struct ButtonsBuilder {
    buttons: Vec<ReplyButton>,
}

impl ButtonsBuilder {
    pub fn reply(&mut self, id: impl Into<String>, title: impl Into<String>) -> &mut Self {
        self.buttons
            .push(ReplyButton { id: id.into(), title: truncate(title.into(), BUTTON_TITLE_LIMIT) });
        self
    }

    // The provider rejects prompts with more than three reply buttons.
    fn build(mut self) -> Vec<ReplyButton> {
        self.buttons.truncate(MAX_REPLY_BUTTONS);
        self.buttons
    }
}

pub struct ListPromptBuilder {
    header: Option<String>,
    body: String,
    footer: Option<String>,
    button_label: String,
    sections: Vec<ListSection>,
}

impl ListPromptBuilder {
    pub fn new(body: impl Into<String>, button_label: impl Into<String>) -> Self {
        Self {
            header: None,
            body: body.into(),
            footer: None,
            button_label: truncate(button_label.into(), LIST_BUTTON_LIMIT),
            sections: Vec::new(),
        }
    }

    pub fn header(mut self, text: impl Into<String>) -> Self {
        self.header = Some(truncate(text.into(), HEADER_TEXT_LIMIT));
        self
    }

    pub fn footer(mut self, text: impl Into<String>) -> Self {
        self.footer = Some(truncate(text.into(), FOOTER_TEXT_LIMIT));
        self
    }

    pub fn section<F>(mut self, title: impl Into<String>, build: F) -> Self
    where
        F: FnOnce(&mut SectionBuilder),
    {
        let mut builder = SectionBuilder::default();
        build(&mut builder);
        self.sections.push(ListSection {
            title: truncate(title.into(), SECTION_TITLE_LIMIT),
            rows: builder.build(),
        });
        self
    }

    // Rows past the provider's total are dropped from the end.
    pub fn build(mut self) -> OutboundMessage {
        let mut remaining = MAX_LIST_ROWS;
        for section in &mut self.sections {
            section.rows.truncate(remaining);
            remaining -= section.rows.len();
        }
        self.sections.retain(|section| !section.rows.is_empty());

        OutboundMessage::List(ListPrompt {
            header: self.header,
            body: truncate(self.body, CAPTION_LIMIT),
            footer: self.footer,
            button_label: self.button_label,
            sections: self.sections,
        })
    }
}

#[derive(Default)]
pub struct SectionBuilder {
    rows: Vec<ListRow>,
}

impl SectionBuilder {
    pub fn row(
        &mut self,
        id: impl Into<String>,
        title: impl Into<String>,
        description: Option<&str>,
    ) -> &mut Self {
        self.rows.push(ListRow {
            id: id.into(),
            title: truncate(title.into(), ROW_TITLE_LIMIT),
            description: description.map(|value| truncate(value.to_owned(), ROW_DESCRIPTION_LIMIT)),
        });
        self
    }

    fn build(self) -> Vec<ListRow> {
        self.rows
    }
}

pub fn welcome_message() -> OutboundMessage {
    OutboundMessage::text(
        "👋 Welcome to Aseobi!\n\nWe make beautiful aso-ebi for every occasion.\n\n\
         Type *shop* to see our collections, or send a category number or name \
         (for example *1* or *casual*).",
    )
}

pub fn category_not_found_message() -> OutboundMessage {
    OutboundMessage::text(
        "Sorry, we couldn't find that category. Type *shop* to see all our collections.",
    )
}

pub fn category_list_message(catalog: &Catalog) -> OutboundMessage {
    ListPromptBuilder::new(
        "Browse our collections and pick a category to see what's in it.",
        "View categories",
    )
    .header("Aseobi Collections")
    .footer("Tap a category to view items")
    .section("Categories", |section| {
        for category in catalog.categories() {
            section.row(
                category_choice_id(&category.id),
                category.name.as_str(),
                Some(category.description.as_str()),
            );
        }
    })
    .build()
}

/// Single-card teaser for a category: cover image, caption and a "view" button.
pub fn category_promo_card(category: &Category) -> OutboundMessage {
    let caption = format!(
        "*{}*\n{}\n\n{} available",
        category.name,
        category.description,
        item_count_label(category.item_count())
    );

    let builder = ButtonPromptBuilder::new(caption);
    let builder = match category.cover_image() {
        Some(link) => builder.image_header(link),
        None => builder.text_header(category.name.as_str()),
    };

    builder
        .buttons(|buttons| {
            buttons.reply(view_choice_id(&category.id), "View items");
        })
        .build()
}

pub fn category_header_message(category: &Category) -> OutboundMessage {
    OutboundMessage::text(format!(
        "*{}* ({})\n{}",
        category.name,
        item_count_label(category.item_count()),
        category.description
    ))
}

pub fn product_card(product: &Product, currency_symbol: &str) -> OutboundMessage {
    let caption = product_caption(product, currency_symbol);
    OutboundMessage::image(product.image_url.as_str(), Some(caption))
}

pub fn product_caption(product: &Product, currency_symbol: &str) -> String {
    let mut lines = vec![
        format!("*{}*", product.name),
        format!("Price: {}", format_price(currency_symbol, product.price)),
        product.description.clone(),
        format!("Colors: {}", product.colors.join(", ")),
    ];

    if let Some(sizes) = product.sizes.as_ref().filter(|sizes| !sizes.is_empty()) {
        lines.push(format!("Sizes: {}", sizes.join(", ")));
    }
    if let Some(material) = &product.material {
        lines.push(format!("Material: {material}"));
    }
    if let Some(care) = &product.care_instructions {
        lines.push(format!("Care: {care}"));
    }

    lines.join("\n")
}

pub fn browse_navigation_message() -> OutboundMessage {
    ButtonPromptBuilder::new("What would you like to do next?")
        .buttons(|buttons| {
            buttons
                .reply(BACK_TO_CATEGORIES_CHOICE, "Back to categories")
                .reply(CONTINUE_SHOPPING_CHOICE, "Continue shopping");
        })
        .build()
}

pub fn text_browse_intro(category: &Category) -> OutboundMessage {
    OutboundMessage::text(format!(
        "Here are our *{}* items ({}):\n{}",
        category.name,
        item_count_label(category.item_count()),
        category.description
    ))
}

pub fn text_browse_closing() -> OutboundMessage {
    OutboundMessage::text(
        "Reply with another category number or name, or type *shop* to see all categories.",
    )
}

pub fn item_count_label(count: usize) -> String {
    if count == 1 {
        "1 item".to_owned()
    } else {
        format!("{count} items")
    }
}

/// `₦45,000`-style rendering: currency symbol followed by a comma-grouped integer.
pub fn format_price(currency_symbol: &str, amount: u64) -> String {
    let digits = amount.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    format!("{currency_symbol}{grouped}")
}

fn truncate(value: String, limit: usize) -> String {
    if value.chars().count() <= limit {
        return value;
    }

    let mut truncated: String = value.chars().take(limit.saturating_sub(1)).collect();
    truncated.push('…');
    truncated
}

#[cfg(test)]
mod tests {
    use aseobi_core::{Catalog, Category, CategoryId, Product, ProductId};

    use super::{
        browse_navigation_message, category_list_message, category_promo_card, format_price,
        item_count_label, product_caption, ButtonPromptBuilder, ListPromptBuilder,
        OutboundMessage, PromptHeader, MAX_LIST_ROWS, MAX_REPLY_BUTTONS,
    };

    fn bare_product() -> Product {
        Product {
            id: ProductId("p-1".to_owned()),
            name: "Plain Wrapper".to_owned(),
            image_url: "https://img.example/p-1.jpg".to_owned(),
            colors: vec!["Red".to_owned(), "Gold".to_owned()],
            price: 1_250_000,
            description: "Hand-woven aso-oke wrapper".to_owned(),
            sizes: None,
            material: None,
            care_instructions: None,
        }
    }

    #[test]
    fn prices_are_grouped_by_thousands() {
        assert_eq!(format_price("₦", 45_000), "₦45,000");
        assert_eq!(format_price("₦", 999), "₦999");
        assert_eq!(format_price("₦", 1_000), "₦1,000");
        assert_eq!(format_price("$", 1_250_000), "$1,250,000");
    }

    #[test]
    fn caption_omits_absent_optional_fields() {
        let caption = product_caption(&bare_product(), "₦");

        assert_eq!(
            caption,
            "*Plain Wrapper*\nPrice: ₦1,250,000\nHand-woven aso-oke wrapper\nColors: Red, Gold"
        );
    }

    #[test]
    fn caption_lists_present_optional_fields_on_their_own_lines() {
        let mut product = bare_product();
        product.sizes = Some(vec!["S".to_owned(), "M".to_owned()]);
        product.care_instructions = Some("Dry clean only".to_owned());

        let caption = product_caption(&product, "₦");
        let lines: Vec<&str> = caption.lines().collect();

        assert_eq!(lines.len(), 6);
        assert_eq!(lines[4], "Sizes: S, M");
        assert_eq!(lines[5], "Care: Dry clean only");
        assert!(!caption.contains("Material"));
    }

    #[test]
    fn list_rows_follow_catalog_order() {
        let catalog = Catalog::builtin();
        let OutboundMessage::List(list) = category_list_message(&catalog) else {
            panic!("category list should be a list prompt");
        };

        assert_eq!(list.sections.len(), 1);
        let ids: Vec<&str> = list.sections[0].rows.iter().map(|row| row.id.as_str()).collect();
        assert_eq!(ids, vec!["category_traditional", "category_casual", "category_formal"]);
        assert_eq!(list.sections[0].rows[1].title, "Casual Aseobi");
        assert_eq!(
            list.sections[0].rows[1].description.as_deref(),
            Some("Comfortable everyday wear with African prints")
        );
    }

    #[test]
    fn promo_card_uses_first_product_image_and_view_button() {
        let catalog = Catalog::builtin();
        let category = catalog.find_id("formal").expect("formal category");
        let OutboundMessage::Buttons(card) = category_promo_card(category) else {
            panic!("promo card should be a button prompt");
        };

        assert_eq!(
            card.header,
            Some(PromptHeader::Image { link: category.products[0].image_url.clone() })
        );
        assert!(card.body.contains("Formal Aseobi"));
        assert!(card.body.contains("2 items"));
        assert_eq!(card.buttons.len(), 1);
        assert_eq!(card.buttons[0].id, "view_formal");
    }

    #[test]
    fn promo_card_for_empty_category_falls_back_to_text_header() {
        let category = Category {
            id: CategoryId("bridal".to_owned()),
            name: "Bridal".to_owned(),
            description: "Coming soon".to_owned(),
            products: vec![],
        };
        let OutboundMessage::Buttons(card) = category_promo_card(&category) else {
            panic!("promo card should be a button prompt");
        };

        assert_eq!(card.header, Some(PromptHeader::Text { text: "Bridal".to_owned() }));
        assert!(card.body.contains("0 items"));
    }

    #[test]
    fn navigation_buttons_offer_back_and_continue() {
        let OutboundMessage::Buttons(prompt) = browse_navigation_message() else {
            panic!("navigation should be a button prompt");
        };
        let ids: Vec<&str> = prompt.buttons.iter().map(|button| button.id.as_str()).collect();
        assert_eq!(ids, vec!["back_to_categories", "continue_shopping"]);
    }

    #[test]
    fn builders_enforce_provider_limits() {
        let OutboundMessage::Buttons(prompt) = ButtonPromptBuilder::new("pick one")
            .buttons(|buttons| {
                for index in 0..5 {
                    buttons.reply(format!("b{index}"), "A very long button title indeed");
                }
            })
            .build()
        else {
            panic!("expected buttons");
        };
        assert_eq!(prompt.buttons.len(), MAX_REPLY_BUTTONS);
        assert_eq!(prompt.buttons[0].title.chars().count(), 20);
        assert!(prompt.buttons[0].title.ends_with('…'));

        let OutboundMessage::List(list) = ListPromptBuilder::new("body", "Choose")
            .section("Section", |section| {
                section.row("r1", "Short", Some(&"d".repeat(100)));
            })
            .build()
        else {
            panic!("expected list");
        };
        let description = list.sections[0].rows[0].description.as_deref().unwrap_or_default();
        assert_eq!(description.chars().count(), 72);
    }

    #[test]
    fn list_rows_are_capped_across_sections() {
        let OutboundMessage::List(list) = ListPromptBuilder::new("body", "Choose")
            .section("First", |section| {
                for index in 0..8 {
                    section.row(format!("a{index}"), "Row", None);
                }
            })
            .section("Second", |section| {
                for index in 0..4 {
                    section.row(format!("b{index}"), "Row", None);
                }
            })
            .section("Third", |section| {
                section.row("c0", "Row", None);
            })
            .build()
        else {
            panic!("expected list");
        };

        let rows: usize = list.sections.iter().map(|section| section.rows.len()).sum();
        assert_eq!(rows, MAX_LIST_ROWS);
        assert_eq!(list.sections.len(), 2);
        assert_eq!(list.sections[1].rows.last().map(|row| row.id.as_str()), Some("b1"));
    }

    #[test]
    fn item_count_label_is_pluralized() {
        assert_eq!(item_count_label(1), "1 item");
        assert_eq!(item_count_label(2), "2 items");
    }
}
