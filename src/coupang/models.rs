//! Review rows and the raw shapes of the review API envelope.

use serde::{Deserialize, Deserializer, Serialize};

/// Separator between the product name and its option segments in `itemName`.
pub const ITEM_NAME_DELIMITER: &str = ", ";

/// One normalized review row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub product_id: String,
    /// Text of `itemName` before the first delimiter
    pub product_name: String,
    pub review_id: String,
    /// Remaining `itemName` segments, re-joined with the same delimiter
    pub options: String,
    pub user_name: String,
    pub rating: i64,
    /// `YYYY-MM-DD`
    pub date: String,
    pub title: String,
    pub content: String,
}

/// All reviews collected for one product, in page order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductReviewSet {
    pub product_id: String,
    pub reviews: Vec<Review>,
}

impl ProductReviewSet {
    pub fn new(product_id: impl Into<String>, reviews: Vec<Review>) -> Self {
        Self { product_id: product_id.into(), reviews }
    }

    /// An empty set, recorded for a product whose collection failed.
    pub fn empty(product_id: impl Into<String>) -> Self {
        Self::new(product_id, Vec::new())
    }

    pub fn len(&self) -> usize {
        self.reviews.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reviews.is_empty()
    }
}

/// Splits a compound item name into `(product_name, options)`.
///
/// Without a delimiter the whole string is the product name and options are empty.
pub fn split_item_name(item_name: &str) -> (String, String) {
    match item_name.split_once(ITEM_NAME_DELIMITER) {
        Some((name, options)) => (name.to_string(), options.to_string()),
        None => (item_name.to_string(), String::new()),
    }
}

// Raw API shapes. Every level is optional because the upstream omits
// fields instead of returning errors.

#[derive(Debug, Deserialize)]
pub(crate) struct Envelope {
    #[serde(rename = "rData")]
    pub r_data: Option<ReviewData>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReviewData {
    pub paging: Option<Paging>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Paging {
    pub contents: Option<Vec<RawReview>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawReview {
    #[serde(deserialize_with = "string_or_number")]
    pub product_id: String,
    pub item_name: String,
    #[serde(deserialize_with = "string_or_number")]
    pub review_id: String,
    pub member: Member,
    pub rating: i64,
    pub review_at: i64,
    #[serde(default, deserialize_with = "nullable_string")]
    pub title: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Member {
    #[serde(default, deserialize_with = "nullable_string")]
    pub name: String,
}

/// Identifiers arrive as numbers or strings depending on the endpoint version.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(s) => s,
        Id::Number(n) => n.to_string(),
    })
}

fn nullable_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_item_name_with_options() {
        let (name, options) = split_item_name("Test Product, Option1, Option2");
        assert_eq!(name, "Test Product");
        assert_eq!(options, "Option1, Option2");
    }

    #[test]
    fn test_split_item_name_single_option() {
        let (name, options) = split_item_name("Coffee Beans, 1kg");
        assert_eq!(name, "Coffee Beans");
        assert_eq!(options, "1kg");
    }

    #[test]
    fn test_split_item_name_without_delimiter() {
        let (name, options) = split_item_name("Plain Product");
        assert_eq!(name, "Plain Product");
        assert_eq!(options, "");
    }

    #[test]
    fn test_split_item_name_comma_without_space() {
        let (name, options) = split_item_name("A,B");
        assert_eq!(name, "A,B");
        assert_eq!(options, "");
    }

    #[test]
    fn test_product_review_set_empty() {
        let set = ProductReviewSet::empty("123");
        assert_eq!(set.product_id, "123");
        assert!(set.is_empty());
        assert_eq!(set.len(), 0);
    }

    #[test]
    fn test_raw_review_numeric_ids() {
        let raw: RawReview = serde_json::from_value(serde_json::json!({
            "productId": 5720576807u64,
            "itemName": "Name, Red",
            "reviewId": 987654321,
            "member": { "name": "kim" },
            "rating": 4,
            "reviewAt": 1673785845000i64,
            "title": null
        }))
        .unwrap();

        assert_eq!(raw.product_id, "5720576807");
        assert_eq!(raw.review_id, "987654321");
        assert_eq!(raw.title, "");
        assert_eq!(raw.content, "");
    }

    #[test]
    fn test_raw_review_requires_member() {
        let result = serde_json::from_value::<RawReview>(serde_json::json!({
            "productId": "1",
            "itemName": "Name",
            "reviewId": "r1",
            "rating": 4,
            "reviewAt": 0
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_review_serializes_camel_case() {
        let review = Review {
            product_id: "1".to_string(),
            product_name: "P".to_string(),
            review_id: "r".to_string(),
            options: String::new(),
            user_name: "u".to_string(),
            rating: 5,
            date: "2023-01-15".to_string(),
            title: String::new(),
            content: String::new(),
        };
        let json = serde_json::to_string(&review).unwrap();
        assert!(json.contains("\"productName\":\"P\""));
        assert!(json.contains("\"userName\":\"u\""));
    }
}
