//! Product data model
//!
//! A search page yields one [`ProductSummary`] per listed item. A detail page
//! yields a [`ProductDetail`]. The two are merged into an [`EnrichedProduct`]
//! by [`EnrichedProduct::merge`], which never fails.

use serde::{Deserialize, Serialize};

/// A single product as listed on a search results page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSummary {
    pub product_name: String,
    pub product_link: String,
    pub thumbnail: String,
    pub current_price: u32,
    pub original_price: u32,
}

/// Fields scraped from a product's own page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductDetail {
    #[serde(default)]
    pub highlights: Vec<String>,
    pub product_id: Option<String>,
    pub in_stock: Option<bool>,
    pub rating: Option<f32>,
}

/// A summary merged with at most one detail record
///
/// # Defaults
///
/// | Field        | Detail present, field missing | Detail absent |
/// |--------------|-------------------------------|---------------|
/// | `highlights` | `[]`                          | `[]`          |
/// | `product_id` | `null`                        | `null`        |
/// | `in_stock`   | `false`                       | `null`        |
/// | `rating`     | `null`                        | `null`        |
///
/// An empty `product_id` and a zero `rating` count as missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedProduct {
    pub product_name: String,
    pub product_link: String,
    pub thumbnail: String,
    pub current_price: u32,
    pub original_price: u32,
    pub highlights: Vec<String>,
    pub product_id: Option<String>,
    pub in_stock: Option<bool>,
    pub rating: Option<f32>,
}

impl EnrichedProduct {
    /// Merges a summary with an optional detail record
    pub fn merge(summary: ProductSummary, detail: Option<ProductDetail>) -> Self {
        let ProductSummary {
            product_name,
            product_link,
            thumbnail,
            current_price,
            original_price,
        } = summary;

        let (highlights, product_id, in_stock, rating) = match detail {
            Some(detail) => (
                detail.highlights,
                detail.product_id.filter(|id| !id.is_empty()),
                Some(detail.in_stock.unwrap_or(false)),
                detail.rating.filter(|r| *r > 0.0),
            ),
            None => (Vec::new(), None, None, None),
        };

        Self {
            product_name,
            product_link,
            thumbnail,
            current_price,
            original_price,
            highlights,
            product_id,
            in_stock,
            rating,
        }
    }

    /// Builds the record used when the detail page could not be fetched or parsed
    pub fn fallback(summary: ProductSummary) -> Self {
        Self::merge(summary, None)
    }

    /// Renders the human-readable block logged after each product
    pub fn summary_lines(&self, position: usize) -> Vec<String> {
        let rating = match self.rating {
            Some(rating) => format!("{}/5 ⭐", rating),
            None => "Not available".to_string(),
        };
        let stock = match self.in_stock {
            Some(true) => "✅ Yes",
            Some(false) => "❌ No",
            None => "Not available",
        };
        let highlights = if self.highlights.is_empty() {
            "None".to_string()
        } else {
            self.highlights.join(", ")
        };

        vec![
            format!("\n{}", "=".repeat(50)),
            format!("📱 Product {}:", position),
            format!("Name: {}", self.product_name),
            format!(
                "Price: ₹{} (was ₹{})",
                self.current_price, self.original_price
            ),
            format!("Rating: {}", rating),
            format!("In Stock: {}", stock),
            format!(
                "Product ID: {}",
                self.product_id.as_deref().unwrap_or("Not available")
            ),
            format!("Highlights: {}", highlights),
            format!("Link: {}", self.product_link),
        ]
    }
}
