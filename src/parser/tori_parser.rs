// Tori-specific HTML parsing
use super::Parser;
use crate::model::{Listing, ParserError, or_sentinel};
use crate::normalizer::{collapse_whitespace, normalize_all};
use crate::utils::resolve_link;
use scraper::{ElementRef, Html, Selector};

pub const TORI_BASE_URL: &str = "https://autot.tori.fi";

const CARD: &str = "div.w-full.p-2";
const TITLE: &str = "h2.mb-1.truncate";
const PRICE: &str = "p.typography_subtitle2__nF6ow";
const DETAILS: &str = "p.text-gray-dark.truncate";
const LINK: &str = "a.adCard_anchor__hJqwV";
const IMAGE: &str = "img.adCardImageCarousel_image__PzAHL";

pub struct ToriParser {
    base_url: String,
    card: Selector,
    title: Selector,
    price: Selector,
    details: Selector,
    link: Selector,
    image: Selector,
}

fn selector(css: &str) -> Result<Selector, ParserError> {
    Selector::parse(css).map_err(|e| ParserError::HtmlParseError(format!("{}: {}", css, e)))
}

impl ToriParser {
    pub fn new() -> Result<Self, ParserError> {
        Self::with_base_url(TORI_BASE_URL)
    }

    pub fn with_base_url(base_url: &str) -> Result<Self, ParserError> {
        Ok(Self {
            base_url: base_url.to_string(),
            card: selector(CARD)?,
            title: selector(TITLE)?,
            price: selector(PRICE)?,
            details: selector(DETAILS)?,
            link: selector(LINK)?,
            image: selector(IMAGE)?,
        })
    }

    /// Extracts a single listing card. Each field is looked up on its own.
    #[cfg(test)]
    pub fn parse_fragment(&self, fragment: &str) -> Listing {
        let html = Html::parse_fragment(fragment);
        let mut listing = self.extract(html.root_element());
        normalize_all(std::slice::from_mut(&mut listing));
        listing
    }

    fn extract(&self, card: ElementRef<'_>) -> Listing {
        let text_of = |sel: &Selector| {
            card.select(sel)
                .next()
                .map(|el| collapse_whitespace(&el.text().collect::<String>()))
        };

        let link = card
            .select(&self.link)
            .next()
            .and_then(|a| a.value().attr("href"))
            .and_then(|href| resolve_link(&self.base_url, href));

        let image_url = card
            .select(&self.image)
            .next()
            .and_then(|img| img.value().attr("src"))
            .and_then(|src| resolve_link(&self.base_url, src));

        Listing {
            title: or_sentinel(text_of(&self.title)),
            price: or_sentinel(text_of(&self.price)),
            details: or_sentinel(text_of(&self.details)),
            link: or_sentinel(link),
            image_url,
        }
    }
}

impl Parser for ToriParser {
    fn parse(&self, body: &str) -> Result<Vec<Listing>, ParserError> {
        let document = Html::parse_document(body);

        let mut listings: Vec<Listing> = document
            .select(&self.card)
            .map(|card| self.extract(card))
            .collect();

        normalize_all(&mut listings);
        Ok(listings)
    }
}
