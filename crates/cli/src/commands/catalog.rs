use std::path::Path;

use aseobi_core::{Catalog, Category};
use aseobi_whatsapp::messages::{format_price, item_count_label};
use serde::Serialize;

use crate::commands::{resolve_catalog, CommandResult};

#[derive(Debug, Serialize)]
struct CatalogListing<'a> {
    currency_symbol: &'a str,
    categories: &'a [Category],
}

pub fn run(path: Option<&Path>, json_output: bool) -> CommandResult {
    let catalog = match resolve_catalog("catalog", path) {
        Ok(catalog) => catalog,
        Err(failure) => return failure,
    };

    if json_output {
        let listing = CatalogListing {
            currency_symbol: catalog.currency_symbol(),
            categories: catalog.categories(),
        };
        return match serde_json::to_string_pretty(&listing) {
            Ok(output) => CommandResult::raw(0, output),
            Err(error) => CommandResult::failure("catalog", "serialization", error.to_string(), 1),
        };
    }

    CommandResult::raw(0, render_human(&catalog))
}

fn render_human(catalog: &Catalog) -> String {
    let mut lines = vec![format!(
        "catalog: {} categories, {} products",
        catalog.len(),
        catalog.product_count()
    )];

    for (index, category) in catalog.categories().iter().enumerate() {
        lines.push(format!(
            "{}. {} [{}] ({})",
            index + 1,
            category.name,
            category.id,
            item_count_label(category.item_count())
        ));
        for product in &category.products {
            lines.push(format!(
                "   - {} ({}) {}",
                product.name,
                product.id.0,
                format_price(catalog.currency_symbol(), product.price)
            ));
        }
    }

    lines.join("\n")
}
