//! Decoding of the review API envelope into normalized rows.

use crate::coupang::models::{split_item_name, Envelope, RawReview, Review};
use crate::dates::format_review_date;
use serde_json::Value;

/// Result of looking for the review listing inside a response body.
#[derive(Debug)]
pub enum Listing {
    /// `rData.paging.contents` was present
    Present(Vec<Review>),
    /// Some level of the path was null or missing
    Absent,
}

/// Extracts and normalizes the review listing from a response body.
///
/// A missing path is [`Listing::Absent`]; a path whose contents do not match
/// the expected record shape is an error.
pub fn parse_listing(body: Value) -> Result<Listing, serde_json::Error> {
    let envelope: Option<Envelope> = serde_json::from_value(body)?;

    let contents = envelope
        .and_then(|e| e.r_data)
        .and_then(|d| d.paging)
        .and_then(|p| p.contents);

    Ok(match contents {
        Some(raw) => Listing::Present(raw.into_iter().map(normalize).collect()),
        None => Listing::Absent,
    })
}

/// Reads `rData.paging.totalPage`. Anything else, including a null body, is `None`.
pub fn parse_total_page(body: &Value) -> Option<u32> {
    body.pointer("/rData/paging/totalPage")
        .and_then(Value::as_u64)
        .and_then(|n| u32::try_from(n).ok())
}

/// Maps one raw record to a row.
pub(crate) fn normalize(raw: RawReview) -> Review {
    let (product_name, options) = split_item_name(&raw.item_name);

    Review {
        product_id: raw.product_id,
        product_name,
        review_id: raw.review_id,
        options,
        user_name: raw.member.name,
        rating: raw.rating,
        date: format_review_date(raw.review_at),
        title: raw.title,
        content: raw.content,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(item_name: &str) -> Value {
        json!({
            "productId": "123456789",
            "itemName": item_name,
            "reviewId": "review123",
            "member": { "name": "User1" },
            "rating": 5,
            "reviewAt": 1673785845000i64,
            "title": "Great product!",
            "content": "I really liked this product."
        })
    }

    #[test]
    fn test_parse_listing_present() {
        let body = json!({ "rData": { "paging": { "contents": [record("Test Product, Option1, Option2")] } } });

        let Listing::Present(reviews) = parse_listing(body).unwrap() else {
            panic!("expected listing");
        };
        assert_eq!(
            reviews,
            vec![Review {
                product_id: "123456789".to_string(),
                product_name: "Test Product".to_string(),
                review_id: "review123".to_string(),
                options: "Option1, Option2".to_string(),
                user_name: "User1".to_string(),
                rating: 5,
                date: format_review_date(1673785845000),
                title: "Great product!".to_string(),
                content: "I really liked this product.".to_string(),
            }]
        );
    }

    #[test]
    fn test_parse_listing_keeps_api_order() {
        let body = json!({ "rData": { "paging": { "contents": [record("A"), record("B"), record("C")] } } });

        let Listing::Present(reviews) = parse_listing(body).unwrap() else {
            panic!("expected listing");
        };
        let names: Vec<_> = reviews.iter().map(|r| r.product_name.as_str()).collect();
        assert_eq!(names, ["A", "B", "C"]);
    }

    #[test]
    fn test_parse_listing_empty_contents() {
        let body = json!({ "rData": { "paging": { "contents": [] } } });
        assert!(matches!(parse_listing(body).unwrap(), Listing::Present(r) if r.is_empty()));
    }

    #[test]
    fn test_parse_listing_absent_levels() {
        for body in [
            Value::Null,
            json!({}),
            json!({ "rData": null }),
            json!({ "rData": {} }),
            json!({ "rData": { "paging": null } }),
            json!({ "rData": { "paging": { "totalPage": 3 } } }),
        ] {
            assert!(matches!(parse_listing(body).unwrap(), Listing::Absent));
        }
    }

    #[test]
    fn test_parse_listing_ignores_odd_total_page() {
        for total_page in [json!("3"), json!(-1), json!(2.5), Value::Null] {
            let body = json!({
                "rData": { "paging": { "totalPage": total_page, "contents": [record("Name, Blue")] } }
            });

            let Listing::Present(reviews) = parse_listing(body).unwrap() else {
                panic!("expected listing for totalPage {}", total_page);
            };
            assert_eq!(reviews.len(), 1);
        }
    }

    #[test]
    fn test_parse_listing_malformed() {
        assert!(parse_listing(json!({ "rData": "maintenance" })).is_err());
        assert!(parse_listing(json!({ "rData": { "paging": { "contents": "x" } } })).is_err());

        let mut bad = record("Name");
        bad.as_object_mut().unwrap().remove("itemName");
        assert!(parse_listing(json!({ "rData": { "paging": { "contents": [bad] } } })).is_err());
    }

    #[test]
    fn test_parse_total_page() {
        assert_eq!(parse_total_page(&json!({ "rData": { "paging": { "totalPage": 25 } } })), Some(25));
        assert_eq!(parse_total_page(&json!({ "rData": { "paging": {} } })), None);
        assert_eq!(parse_total_page(&json!({ "rData": null })), None);
        assert_eq!(parse_total_page(&Value::Null), None);
        assert_eq!(parse_total_page(&json!({ "rData": { "paging": { "totalPage": "25" } } })), None);
    }
}
