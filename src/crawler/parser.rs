//! HTML parser for catalog pages
//!
//! This module turns raw HTML into:
//! - A list of [`ProductSummary`] from a search results page
//! - A single [`ProductDetail`] from a product page
//!
//! Catalog markup changes often, so every field is looked up through a list
//! of CSS selectors tried in order. The first selector that yields non-empty
//! text wins.

use crate::product::{ProductDetail, ProductSummary};
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;
use url::Url;

/// Errors raised while parsing a page
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Invalid CSS selector '{selector}': {message}")]
    InvalidSelector { selector: String, message: String },

    #[error("Page is empty")]
    EmptyDocument,

    #[error("Not a product page: no {0} found")]
    MissingElement(&'static str),
}

/// Converts raw page content into structured product data
pub trait PageParser: Send + Sync {
    /// Extracts one summary per listed product, in page order
    ///
    /// Relative product links and thumbnails are resolved against `base_url`.
    fn parse_search_results(
        &self,
        html: &str,
        base_url: &Url,
    ) -> Result<Vec<ProductSummary>, ParseError>;

    /// Extracts the detail fields of a single product page
    fn parse_product_details(&self, html: &str) -> Result<ProductDetail, ParseError>;
}

/// Selector lists used by [`FlipkartParser`]
#[derive(Debug, Clone)]
pub struct FlipkartSelectors {
    pub product_card: Vec<String>,
    pub product_link: Vec<String>,
    pub product_name: Vec<String>,
    pub current_price: Vec<String>,
    pub original_price: Vec<String>,
    pub thumbnail: Vec<String>,
    pub detail_title: Vec<String>,
    pub highlights: Vec<String>,
    pub rating: Vec<String>,
    pub sold_out: Vec<String>,
    pub buy_button: Vec<String>,
    pub canonical: Vec<String>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for FlipkartSelectors {
    fn default() -> Self {
        Self {
            product_card: strings(&["div[data-id]", "div._1AtVbE", "div.cPHDOP"]),
            product_link: strings(&["a[href*='/p/']", "a[href]"]),
            product_name: strings(&[
                "div.KzDlHZ",
                "a.wjcEIp",
                "a.WKTcLC",
                "div._4rR01T",
                "a.s1Q9rs",
                "a.IRpwTa",
                "a[title]",
            ]),
            current_price: strings(&["div.Nx9bqj", "div._30jeq3", "div._25b18c > div"]),
            original_price: strings(&["div.yRaY8j", "div._3I9_wc"]),
            thumbnail: strings(&["img.DByuf4", "img._396cs4", "img._2r_T1I", "img[src]"]),
            detail_title: strings(&["span.VU-ZEz", "span.B_NuCI", "h1"]),
            highlights: strings(&["div.xFVion li", "li._21Ahn-", "div._2418kt li"]),
            rating: strings(&["div.XQDdHH", "div._3LWZlK"]),
            sold_out: strings(&["div.Z8JjpR", "div._16FRp0"]),
            buy_button: strings(&["button.QqFHMw", "button._2KpZ6l", "form button"]),
            canonical: strings(&["link[rel='canonical']", "meta[property='og:url']"]),
        }
    }
}

/// [`PageParser`] for Flipkart search and product pages
pub struct FlipkartParser {
    product_card: Vec<Selector>,
    product_link: Vec<Selector>,
    product_name: Vec<Selector>,
    current_price: Vec<Selector>,
    original_price: Vec<Selector>,
    thumbnail: Vec<Selector>,
    detail_title: Vec<Selector>,
    highlights: Vec<Selector>,
    rating: Vec<Selector>,
    sold_out: Vec<Selector>,
    buy_button: Vec<Selector>,
    canonical: Vec<Selector>,
}

impl FlipkartParser {
    /// Creates a parser with the default selectors
    pub fn new() -> Result<Self, ParseError> {
        Self::with_selectors(&FlipkartSelectors::default())
    }

    /// Creates a parser from custom selector lists
    pub fn with_selectors(selectors: &FlipkartSelectors) -> Result<Self, ParseError> {
        Ok(Self {
            product_card: compile(&selectors.product_card)?,
            product_link: compile(&selectors.product_link)?,
            product_name: compile(&selectors.product_name)?,
            current_price: compile(&selectors.current_price)?,
            original_price: compile(&selectors.original_price)?,
            thumbnail: compile(&selectors.thumbnail)?,
            detail_title: compile(&selectors.detail_title)?,
            highlights: compile(&selectors.highlights)?,
            rating: compile(&selectors.rating)?,
            sold_out: compile(&selectors.sold_out)?,
            buy_button: compile(&selectors.buy_button)?,
            canonical: compile(&selectors.canonical)?,
        })
    }

    /// Extracts a summary from a single product card, or None if it lacks a name, link or price
    fn parse_card(&self, card: ElementRef<'_>, base_url: &Url) -> Option<ProductSummary> {
        let link = first_attr(card, &self.product_link, "href")?;
        let product_link = base_url.join(&link).ok()?.to_string();

        let product_name = first_text(card, &self.product_name)
            .or_else(|| first_attr(card, &self.product_name, "title"))
            .or_else(|| first_attr(card, &self.thumbnail, "alt"))?;

        let current_price = first_text(card, &self.current_price).and_then(|t| parse_price(&t))?;
        let original_price = first_text(card, &self.original_price)
            .and_then(|t| parse_price(&t))
            .unwrap_or(current_price);

        let thumbnail = first_attr(card, &self.thumbnail, "src")
            .and_then(|src| base_url.join(&src).ok())
            .map(|u| u.to_string())
            .unwrap_or_default();

        Some(ProductSummary {
            product_name,
            product_link,
            thumbnail,
            current_price,
            original_price,
        })
    }

    fn stock_status(&self, root: ElementRef<'_>) -> Option<bool> {
        let sold_out = self
            .sold_out
            .iter()
            .flat_map(|sel| root.select(sel))
            .map(|el| collapse_whitespace(&el.text().collect::<String>()).to_lowercase())
            .any(|text| text.contains("sold out") || text.contains("unavailable"));
        if sold_out {
            return Some(false);
        }

        let can_buy = self
            .buy_button
            .iter()
            .flat_map(|sel| root.select(sel))
            .map(|el| el.text().collect::<String>().to_lowercase())
            .any(|text| text.contains("buy now") || text.contains("add to cart"));
        can_buy.then_some(true)
    }

    fn product_id(&self, root: ElementRef<'_>) -> Option<String> {
        let canonical = first_attr(root, &self.canonical, "href")
            .or_else(|| first_attr(root, &self.canonical, "content"))?;
        let url = Url::parse(&canonical).ok()?;
        let pid = url
            .query_pairs()
            .find(|(key, _)| key == "pid")
            .map(|(_, value)| value.into_owned());
        pid.filter(|id| !id.is_empty())
    }
}

impl PageParser for FlipkartParser {
    fn parse_search_results(
        &self,
        html: &str,
        base_url: &Url,
    ) -> Result<Vec<ProductSummary>, ParseError> {
        if html.trim().is_empty() {
            return Err(ParseError::EmptyDocument);
        }

        let document = Html::parse_document(html);
        let root = document.root_element();

        for selector in &self.product_card {
            let products: Vec<ProductSummary> = root
                .select(selector)
                .filter_map(|card| self.parse_card(card, base_url))
                .collect();

            if !products.is_empty() {
                tracing::debug!("Parsed {} product cards", products.len());
                return Ok(products);
            }
        }

        tracing::debug!("No product cards matched any selector");
        Ok(Vec::new())
    }

    fn parse_product_details(&self, html: &str) -> Result<ProductDetail, ParseError> {
        if html.trim().is_empty() {
            return Err(ParseError::EmptyDocument);
        }

        let document = Html::parse_document(html);
        let root = document.root_element();

        first_text(root, &self.detail_title).ok_or(ParseError::MissingElement("product title"))?;

        let highlights = self
            .highlights
            .iter()
            .map(|sel| {
                root.select(sel)
                    .map(|el| collapse_whitespace(&el.text().collect::<String>()))
                    .filter(|text| !text.is_empty())
                    .collect::<Vec<_>>()
            })
            .find(|items| !items.is_empty())
            .unwrap_or_default();

        let rating = first_text(root, &self.rating).and_then(|t| parse_rating(&t));

        Ok(ProductDetail {
            highlights,
            product_id: self.product_id(root),
            in_stock: self.stock_status(root),
            rating,
        })
    }
}

fn compile(selectors: &[String]) -> Result<Vec<Selector>, ParseError> {
    selectors
        .iter()
        .map(|s| {
            Selector::parse(s).map_err(|e| ParseError::InvalidSelector {
                selector: s.clone(),
                message: e.to_string(),
            })
        })
        .collect()
}

/// Text of the first element matched by any selector, whitespace-collapsed
fn first_text(root: ElementRef<'_>, selectors: &[Selector]) -> Option<String> {
    selectors.iter().find_map(|sel| {
        root.select(sel)
            .map(|el| collapse_whitespace(&el.text().collect::<String>()))
            .find(|text| !text.is_empty())
    })
}

/// Non-empty attribute of the first element matched by any selector
fn first_attr(root: ElementRef<'_>, selectors: &[Selector], attr: &str) -> Option<String> {
    selectors.iter().find_map(|sel| {
        root.select(sel)
            .filter_map(|el| el.value().attr(attr))
            .map(str::trim)
            .find(|value| !value.is_empty())
            .map(str::to_string)
    })
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parses the first number in a price label such as `₹1,299`
pub fn parse_price(text: &str) -> Option<u32> {
    let digits: String = text
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit() || *c == ',')
        .filter(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}

/// Parses a leading decimal rating such as `4.3★`
pub fn parse_rating(text: &str) -> Option<f32> {
    let number: String = text
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    number.parse().ok()
}
