// Utility functions
use reqwest::Url;

/// Joins make names into the comma-separated slug the marketplace expects.
pub fn makes_to_slug(makes: &[String]) -> String {
    makes.join(",").replace(' ', "-")
}

/// Resolves `href` against `base`, leaving absolute URLs untouched.
pub fn resolve_link(base: &str, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    let base = Url::parse(base).ok()?;
    base.join(href).ok().map(|u| u.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_joins_and_dashes() {
        let makes = vec!["Volvo".to_string(), "Mercedes Benz".to_string()];
        assert_eq!(makes_to_slug(&makes), "Volvo,Mercedes-Benz");
        assert_eq!(makes_to_slug(&[]), "");
    }

    #[test]
    fn relative_links_are_resolved() {
        assert_eq!(
            resolve_link("https://autot.tori.fi", "/vaihtoautot/123").as_deref(),
            Some("https://autot.tori.fi/vaihtoautot/123")
        );
        assert_eq!(
            resolve_link("https://autot.tori.fi", "https://example.com/x").as_deref(),
            Some("https://example.com/x")
        );
        assert_eq!(resolve_link("https://autot.tori.fi", "  "), None);
    }
}
