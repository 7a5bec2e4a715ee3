//! `Accept-Language` negotiation against the configured cultures.

use axum::{
    extract::Request,
    http::{HeaderValue, header},
    middleware::Next,
    response::Response,
};

use crate::context::RequestCulture;
use crate::settings::Settings;

const FALLBACK_CULTURE: &str = "en";

/// Language ranges from an `Accept-Language` value, best first.
///
/// Ranges with `q=0` and the wildcard are dropped. Equal weights keep their
/// header order.
fn preferred_ranges(accept_language: &str) -> Vec<&str> {
    let mut ranges: Vec<(&str, f32)> = accept_language
        .split(',')
        .filter_map(|item| {
            let mut parts = item.split(';');
            let tag = parts.next()?.trim();
            if tag.is_empty() || tag == "*" {
                return None;
            }
            let quality = parts
                .filter_map(|p| p.trim().strip_prefix("q="))
                .find_map(|q| q.trim().parse::<f32>().ok())
                .unwrap_or(1.0);
            (quality > 0.0).then_some((tag, quality))
        })
        .collect();
    ranges.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranges.into_iter().map(|(tag, _)| tag).collect()
}

/// Pick the culture for a request.
///
/// Tries each requested range for an exact match, then for its parent
/// language (`fr-CA` matches `fr`). Falls back to the first supported culture.
pub fn negotiate_culture<'a>(accept_language: Option<&str>, supported: &'a [String]) -> &'a str {
    let fallback = supported.first().map(String::as_str).unwrap_or(FALLBACK_CULTURE);
    let Some(accept_language) = accept_language else {
        return fallback;
    };

    for range in preferred_ranges(accept_language) {
        if let Some(exact) = supported.iter().find(|c| c.eq_ignore_ascii_case(range)) {
            return exact;
        }
        let parent = range.split('-').next().unwrap_or(range);
        if let Some(parent) = supported.iter().find(|c| c.eq_ignore_ascii_case(parent)) {
            return parent;
        }
    }
    fallback
}

pub async fn request_localization(settings: &Settings, mut req: Request, next: Next) -> Response {
    let accept_language = req
        .headers()
        .get(header::ACCEPT_LANGUAGE)
        .and_then(|v| v.to_str().ok());
    let culture = negotiate_culture(accept_language, &settings.app.supported_cultures).to_string();

    req.extensions_mut().insert(RequestCulture(culture.clone()));
    let mut response = next.run(req).await;
    if !response.headers().contains_key(header::CONTENT_LANGUAGE) {
        if let Ok(value) = HeaderValue::from_str(&culture) {
            response.headers_mut().insert(header::CONTENT_LANGUAGE, value);
        }
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cultures(list: &[&str]) -> Vec<String> {
        list.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn missing_header_uses_the_first_culture() {
        assert_eq!(negotiate_culture(None, &cultures(&["nl", "en"])), "nl");
    }

    #[test]
    fn exact_match_wins() {
        let supported = cultures(&["en", "fr-CA", "fr"]);
        assert_eq!(negotiate_culture(Some("fr-CA"), &supported), "fr-CA");
    }

    #[test]
    fn parent_language_is_tried() {
        let supported = cultures(&["en", "fr"]);
        assert_eq!(negotiate_culture(Some("fr-BE"), &supported), "fr");
    }

    #[test]
    fn quality_ordering_is_respected() {
        let supported = cultures(&["en", "de", "fr"]);
        assert_eq!(
            negotiate_culture(Some("de;q=0.4, fr;q=0.9, en;q=0.1"), &supported),
            "fr"
        );
    }

    #[test]
    fn zero_quality_and_wildcard_are_ignored() {
        let supported = cultures(&["en", "de"]);
        assert_eq!(negotiate_culture(Some("de;q=0, *"), &supported), "en");
    }

    #[test]
    fn matching_ignores_case() {
        let supported = cultures(&["en-GB"]);
        assert_eq!(negotiate_culture(Some("EN-gb"), &supported), "en-GB");
    }

    #[test]
    fn unsupported_languages_fall_back() {
        let supported = cultures(&["en", "nl"]);
        assert_eq!(negotiate_culture(Some("ja, ko;q=0.5"), &supported), "en");
    }

    #[test]
    fn empty_culture_list_falls_back_to_english() {
        assert_eq!(negotiate_culture(Some("de"), &[]), "en");
    }
}
