// Nettikone search API mapping
use super::Parser;
use crate::model::{Listing, ParserError, or_sentinel};
use crate::normalizer::normalize_all;
use serde_json::Value;
use tracing::debug;

pub struct NettikoneParser;

impl NettikoneParser {
    pub fn new() -> Self {
        Self
    }

    /// Maps one decoded API item. Every field is read on its own, so a
    /// field of unexpected type only costs that field.
    pub fn parse_item(&self, item: &Value) -> Listing {
        if !item.is_object() {
            debug!("Skipping non-object Nettikone item: {}", item);
            return Listing::empty();
        }

        let field = |name: &str| item.get(name).and_then(value_to_string);

        let image_url = item
            .get("images")
            .and_then(Value::as_array)
            .and_then(|images| images.first())
            .and_then(|img| img.get("smallThumbnail"))
            .and_then(|thumb| thumb.get("url"))
            .and_then(Value::as_str)
            .map(str::to_string);

        // the search endpoint usually has no price, the ad id stands in for it
        let price = field("price").or_else(|| field("id"));
        let model = field("model");

        Listing {
            title: or_sentinel(model.clone()),
            price: or_sentinel(price),
            details: or_sentinel(model),
            link: or_sentinel(item.get("adUrl").and_then(Value::as_str).map(str::to_string)),
            image_url,
        }
    }
}

fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

impl Parser for NettikoneParser {
    fn parse(&self, body: &str) -> Result<Vec<Listing>, ParserError> {
        let data: Value = serde_json::from_str(body)?;
        let items = data.as_array().ok_or(ParserError::NotAnArray)?;

        let mut listings: Vec<Listing> = items.iter().map(|item| self.parse_item(item)).collect();
        normalize_all(&mut listings);
        Ok(listings)
    }
}
