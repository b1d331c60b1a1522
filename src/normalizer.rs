use crate::model::{Listing, SENTINEL};

pub fn normalize_all(listings: &mut [Listing]) {
    for listing in listings.iter_mut() {
        normalize_listing(listing);
    }
}

fn normalize_listing(listing: &mut Listing) {
    for field in [
        &mut listing.title,
        &mut listing.price,
        &mut listing.details,
        &mut listing.link,
    ] {
        *field = collapse_whitespace(field);
        if field.is_empty() {
            *field = SENTINEL.to_string();
        }
    }

    // blank image urls behave like a missing image
    if listing.image_url.as_deref().is_some_and(|u| u.trim().is_empty()) {
        listing.image_url = None;
    }
}

/// Trims and collapses runs of whitespace (card markup is full of newlines).
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
