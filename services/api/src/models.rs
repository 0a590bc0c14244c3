//! Data models and request/response shapes for the catalog API

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A catalog product as stored and served.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i32,
    pub name: String,
    pub price: Decimal,
    #[serde(default)]
    pub description: Option<String>,
}

/// Payload for creating a product; the id is assigned by the system.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    pub name: String,
    pub price: Decimal,
    #[serde(default)]
    pub description: Option<String>,
}

/// Query parameters accepted by the product search endpoint.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    pub search: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

/// Search strategy, decided once per query.
///
/// A term that parses as an integer is an exact id match and nothing else:
/// products whose name or description merely contain the digits are not
/// returned. Any other term is a case-insensitive substring match over name
/// and description.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchFilter {
    None,
    Id(i32),
    Text(String),
}

impl SearchFilter {
    pub fn parse(term: Option<&str>) -> Self {
        let Some(term) = term.filter(|t| !t.is_empty()) else {
            return SearchFilter::None;
        };
        match term.trim().parse::<i32>() {
            Ok(id) => SearchFilter::Id(id),
            Err(_) => SearchFilter::Text(term.to_string()),
        }
    }
}

/// One page of search results.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPage {
    pub data: Vec<Product>,
    pub page: i64,
    pub total_pages: i64,
    pub total_count: i64,
}

/// Response for a successful identity exchange.
#[derive(Debug, Serialize)]
pub struct ExchangeResponse {
    pub token: String,
    pub user: ExchangedUser,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangedUser {
    pub subject: String,
    pub display_name: String,
}

/// Response for the description enrichment endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedDescription {
    pub message: String,
    pub generated_text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_terms_filter_on_id_only() {
        assert_eq!(SearchFilter::parse(Some("42")), SearchFilter::Id(42));
        assert_eq!(SearchFilter::parse(Some("-7")), SearchFilter::Id(-7));
        assert_eq!(SearchFilter::parse(Some(" 42 ")), SearchFilter::Id(42));
    }

    #[test]
    fn non_numeric_terms_search_text() {
        assert_eq!(
            SearchFilter::parse(Some("widget")),
            SearchFilter::Text("widget".to_string())
        );
        assert_eq!(
            SearchFilter::parse(Some("12 gauge")),
            SearchFilter::Text("12 gauge".to_string())
        );
        // Out of i32 range falls back to text search.
        assert_eq!(
            SearchFilter::parse(Some("99999999999")),
            SearchFilter::Text("99999999999".to_string())
        );
    }

    #[test]
    fn missing_or_empty_terms_do_not_filter() {
        assert_eq!(SearchFilter::parse(None), SearchFilter::None);
        assert_eq!(SearchFilter::parse(Some("")), SearchFilter::None);
    }

    #[test]
    fn product_serializes_camel_case() {
        let product = Product {
            id: 1,
            name: "Widget".to_string(),
            price: Decimal::new(9_990, 3),
            description: None,
        };
        let value = serde_json::to_value(&product).unwrap();
        assert_eq!(value["id"], 1);
        assert_eq!(value["name"], "Widget");
        assert_eq!(value["price"], 9.99);
        assert!(value["description"].is_null());
    }
}
