use crate::domain::category::{Category, CategoryId};
use crate::domain::product::{Product, ProductId};

struct ProductSeed {
    id: &'static str,
    name: &'static str,
    image_url: &'static str,
    colors: &'static [&'static str],
    price: u64,
    description: &'static str,
    sizes: Option<&'static [&'static str]>,
    material: Option<&'static str>,
    care_instructions: Option<&'static str>,
}

impl ProductSeed {
    fn build(&self) -> Product {
        Product {
            id: ProductId(self.id.to_owned()),
            name: self.name.to_owned(),
            image_url: self.image_url.to_owned(),
            colors: owned(self.colors),
            price: self.price,
            description: self.description.to_owned(),
            sizes: self.sizes.map(owned),
            material: self.material.map(str::to_owned),
            care_instructions: self.care_instructions.map(str::to_owned),
        }
    }
}

fn owned(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| (*value).to_owned()).collect()
}

fn category(id: &str, name: &str, description: &str, products: &[ProductSeed]) -> Category {
    Category {
        id: CategoryId(id.to_owned()),
        name: name.to_owned(),
        description: description.to_owned(),
        products: products.iter().map(ProductSeed::build).collect(),
    }
}

const TRADITIONAL: &[ProductSeed] = &[
    ProductSeed {
        id: "trad-001",
        name: "Royal Ankara Gown",
        image_url: "https://images.unsplash.com/photo-1572804013309-59a88b7e92f1",
        colors: &["Blue", "Gold", "Red"],
        price: 45_000,
        description: "Elegant traditional gown with intricate patterns",
        sizes: Some(&["S", "M", "L", "XL"]),
        material: Some("Premium Ankara"),
        care_instructions: Some("Dry clean only"),
    },
    ProductSeed {
        id: "trad-002",
        name: "Modern Agbada",
        image_url: "https://images.unsplash.com/photo-1591369822096-ffd140ec948f",
        colors: &["White", "Black", "Green"],
        price: 55_000,
        description: "Contemporary take on the classic Agbada",
        sizes: Some(&["M", "L", "XL", "XXL"]),
        material: Some("Cotton blend"),
        care_instructions: None,
    },
];

const CASUAL: &[ProductSeed] = &[
    ProductSeed {
        id: "cas-001",
        name: "Print Maxi Dress",
        image_url: "https://images.unsplash.com/photo-1572804013427-4d7ca7268217",
        colors: &["Yellow", "Orange", "Brown"],
        price: 25_000,
        description: "Light and flowy maxi dress perfect for casual outings",
        sizes: Some(&["S", "M", "L"]),
        material: Some("Cotton"),
        care_instructions: Some("Machine wash cold"),
    },
    ProductSeed {
        id: "cas-002",
        name: "African Print Shirt",
        image_url: "https://images.unsplash.com/photo-1591369822096-ffd140ec948f",
        colors: &["Blue", "Red", "Green"],
        price: 15_000,
        description: "Comfortable shirt with traditional patterns",
        sizes: Some(&["S", "M", "L", "XL"]),
        material: Some("Cotton blend"),
        care_instructions: None,
    },
];

const FORMAL: &[ProductSeed] = &[
    ProductSeed {
        id: "for-001",
        name: "Executive Suit",
        image_url: "https://images.unsplash.com/photo-1591369822096-ffd140ec948f",
        colors: &["Black", "Navy", "Grey"],
        price: 75_000,
        description: "Professional suit with subtle African patterns",
        sizes: Some(&["S", "M", "L", "XL"]),
        material: Some("Wool blend"),
        care_instructions: Some("Dry clean only"),
    },
    ProductSeed {
        id: "for-002",
        name: "Business Dress",
        image_url: "https://images.unsplash.com/photo-1572804013427-4d7ca7268217",
        colors: &["Black", "Navy", "Burgundy"],
        price: 35_000,
        description: "Elegant business dress with African print accents",
        sizes: Some(&["S", "M", "L"]),
        material: Some("Polyester blend"),
        care_instructions: None,
    },
];

pub(super) fn categories() -> Vec<Category> {
    vec![
        category(
            "traditional",
            "Traditional Aseobi",
            "Classic Nigerian traditional wear with modern touches",
            TRADITIONAL,
        ),
        category(
            "casual",
            "Casual Aseobi",
            "Comfortable everyday wear with African prints",
            CASUAL,
        ),
        category("formal", "Formal Aseobi", "Professional wear with African influence", FORMAL),
    ]
}
