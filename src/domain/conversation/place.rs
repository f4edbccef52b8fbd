//! Venue candidates from local business search, and the heuristics that
//! decide when to look them up.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::domain::collection::phone;

/// Most candidates ever shown to the model or stored for selection.
pub const MAX_PLACE_CANDIDATES: usize = 5;

/// WGS84 position used to bias searches and place venues on a map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

/// A venue returned by the search provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub name: String,
    pub telephone: Option<String>,
    pub address: String,
    pub road_address: Option<String>,
    pub category: String,
    pub location: Option<GeoPoint>,
}

impl Place {
    /// One-line rendering used in prompts and tool results.
    pub fn describe(&self) -> String {
        let address = self.road_address.as_deref().unwrap_or(&self.address);
        format!(
            "{} | {} | {} | {}",
            self.name,
            self.telephone.as_deref().unwrap_or("전화번호 없음"),
            address,
            self.category
        )
    }
}

const LOOKUP_KEYWORDS: [&str; 12] = [
    "근처", "주변", "찾아", "검색", "어디", "직방", "네이버", "다음", "카카오맵", "지도", "알려줘",
    "알려",
];

const QUERY_FILLER_WORDS: [&str; 7] = ["근처", "주변", "에서", "본", "알려줘", "알려", "찾아"];

static VENUE_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[가-힣]{2,10}(미용실|식당|병원|카페|마트|센터|매장|점|상가)").expect("static regex")
});

/// Whether the user's message warrants a venue lookup.
///
/// Never once a phone number is known. Otherwise yes if the message asks
/// for a lookup outright, or names a venue without giving its number.
pub fn should_search_places(message: &str, has_phone: bool) -> bool {
    if has_phone {
        return false;
    }
    if LOOKUP_KEYWORDS.iter().any(|k| message.contains(k)) {
        return true;
    }
    VENUE_NAME.is_match(message) && !phone::contains_dashed_phone(message)
}

/// Reduces a chat message to a search query by dropping filler words.
pub fn extract_search_query(message: &str) -> String {
    let mut query = message.to_string();
    // "알려줘" is listed ahead of "알려" and goes whole; "찾아줘" has no
    // entry of its own and leaves a stray "줘" behind.
    for word in QUERY_FILLER_WORDS {
        query = query.replace(word, " ");
    }
    query.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Removes markup the provider puts around matched terms (`<b>…</b>`).
pub fn strip_html_tags(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_tag = false;
    for c in text.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}

/// Numbered list for the model, or a plain "nothing found" line.
pub fn format_places_for_model(places: &[Place]) -> String {
    if places.is_empty() {
        return "검색 결과가 없습니다.".to_string();
    }
    places
        .iter()
        .take(MAX_PLACE_CANDIDATES)
        .enumerate()
        .map(|(i, p)| format!("{}. {}", i + 1, p.describe()))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub fn place(name: &str, telephone: Option<&str>) -> Place {
        Place {
            name: name.to_string(),
            telephone: telephone.map(str::to_string),
            address: "서울 강남구".to_string(),
            road_address: None,
            category: "미용".to_string(),
            location: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::place;
    use super::*;

    #[test]
    fn known_phone_suppresses_search() {
        assert!(!should_search_places("강남역 근처 미용실 찾아줘", true));
    }

    #[test]
    fn lookup_keyword_triggers_search() {
        assert!(should_search_places("강남역 근처 미용실", false));
        assert!(should_search_places("여기 어디예요?", false));
    }

    #[test]
    fn venue_name_without_number_triggers_search() {
        assert!(should_search_places("행복미용실 커트 예약", false));
    }

    #[test]
    fn latin_placeholder_names_are_not_venue_names() {
        assert!(!should_search_places("내일 오후 3시에 OO미용실 커트 예약해줘", false));
    }

    #[test]
    fn venue_name_with_number_does_not_trigger() {
        assert!(!should_search_places("행복미용실 02-123-4567 예약", false));
    }

    #[test]
    fn plain_chat_does_not_trigger() {
        assert!(!should_search_places("네 맞아요", false));
    }

    #[test]
    fn query_drops_fillers_and_collapses_spaces() {
        assert_eq!(extract_search_query("강남역  근처 미용실 알려줘"), "강남역 미용실");
        assert_eq!(extract_search_query("홍대에서 카페 찾아"), "홍대 카페");
        assert_eq!(extract_search_query("강남역 미용실 찾아줘"), "강남역 미용실 줘");
    }

    #[test]
    fn html_tags_are_stripped() {
        assert_eq!(strip_html_tags("<b>행복</b>미용실"), "행복미용실");
        assert_eq!(strip_html_tags("a < b"), "a ");
    }

    #[test]
    fn places_are_numbered_for_the_model() {
        let text = format_places_for_model(&[
            place("행복미용실", Some("02-123-4567")),
            place("미소헤어", None),
        ]);
        assert_eq!(
            text,
            "1. 행복미용실 | 02-123-4567 | 서울 강남구 | 미용\n2. 미소헤어 | 전화번호 없음 | 서울 강남구 | 미용"
        );
    }

    #[test]
    fn empty_result_has_explicit_message() {
        assert_eq!(format_places_for_model(&[]), "검색 결과가 없습니다.");
    }
}
