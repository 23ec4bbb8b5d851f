//! Structured popup content.
//!
//! The popup is a value object the presentation layer renders; formatting
//! decisions (weekday display names, address line breaks, social-link
//! abbreviation) live here where they are testable without a DOM.

use url::Url;

use crate::location::LocationInfo;

/// Day-code to display-name mapping used by popups and the category
/// dropdown. Unrecognized codes pass through unchanged.
const WEEKDAY_NAMES: &[(&str, &str)] = &[
    ("mo", "Lunedì"),
    ("tue", "Martedì"),
    ("wed", "Mercoledì"),
    ("thu", "Giovedì"),
    ("fri", "Venerdì"),
    ("sa", "Sabato"),
    ("so", "Domenica"),
];

pub fn weekday_name(code: &str) -> &str {
    WEEKDAY_NAMES
        .iter()
        .find(|(known, _)| *known == code)
        .map(|(_, name)| *name)
        .unwrap_or(code)
}

pub fn format_weekdays(codes: &[String]) -> String {
    codes
        .iter()
        .map(|code| weekday_name(code))
        .collect::<Vec<_>>()
        .join(", ")
}

/// The popup's link line. Recognizable social URLs render as
/// `Service: @account`; everything else as a plain labelled link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkLine {
    Social {
        service: String,
        account: String,
        href: String,
    },
    Plain {
        href: String,
        label: String,
    },
}

/// Decompose a location URL into its popup presentation.
pub fn link_line(raw_url: &str) -> LinkLine {
    let Ok(parsed) = Url::parse(raw_url) else {
        return LinkLine::Plain {
            href: raw_url.to_string(),
            label: raw_url.to_string(),
        };
    };

    let hostname = parsed
        .host_str()
        .unwrap_or("")
        .trim_start_matches("www.")
        .to_string();
    let service = if hostname == "instagram.com" {
        "Insta".to_string()
    } else {
        hostname.clone()
    };
    let account = parsed
        .path_segments()
        .and_then(|mut segments| segments.find(|s| !s.is_empty()).map(str::to_string));

    match account {
        Some(account) => LinkLine::Social {
            service,
            account,
            href: raw_url.to_string(),
        },
        None => LinkLine::Plain {
            href: raw_url.to_string(),
            label: service,
        },
    }
}

/// Popup content in display order: title, weekday line, address lines, link.
#[derive(Debug, Clone, PartialEq)]
pub struct PopupContent {
    pub title: String,
    pub weekday_line: Option<String>,
    pub address_lines: Vec<String>,
    pub link: LinkLine,
}

impl PopupContent {
    pub fn for_location(info: &LocationInfo) -> Self {
        let weekday_line = if info.weekdays().is_empty() {
            None
        } else {
            Some(format_weekdays(info.weekdays()))
        };

        // The city stands in for a missing address.
        let address_lines = if info.address.is_empty() {
            vec![info.city.clone()]
        } else {
            info.address.split(", ").map(str::to_string).collect()
        };

        Self {
            title: info.name.clone(),
            weekday_line,
            address_lines,
            link: link_line(&info.url),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn location(props: serde_json::Value) -> LocationInfo {
        LocationInfo::parse(&props).unwrap()
    }

    #[test]
    fn test_weekday_name_mapping() {
        assert_eq!(weekday_name("mo"), "Lunedì");
        assert_eq!(weekday_name("so"), "Domenica");
    }

    #[test]
    fn test_weekday_name_passes_unknown_codes_through() {
        assert_eq!(weekday_name("xyz"), "xyz");
    }

    #[test]
    fn test_format_weekdays_joins_with_comma() {
        let codes = vec!["mo".to_string(), "wed".to_string(), "xyz".to_string()];
        assert_eq!(format_weekdays(&codes), "Lunedì, Mercoledì, xyz");
    }

    #[test]
    fn test_link_line_instagram_account() {
        let link = link_line("https://www.instagram.com/cypheramsee/");
        assert_eq!(
            link,
            LinkLine::Social {
                service: "Insta".to_string(),
                account: "cypheramsee".to_string(),
                href: "https://www.instagram.com/cypheramsee/".to_string(),
            }
        );
    }

    #[test]
    fn test_link_line_other_host_keeps_hostname() {
        let link = link_line("https://www.facebook.com/somecypher");
        assert_eq!(
            link,
            LinkLine::Social {
                service: "facebook.com".to_string(),
                account: "somecypher".to_string(),
                href: "https://www.facebook.com/somecypher".to_string(),
            }
        );
    }

    #[test]
    fn test_link_line_without_path_is_plain() {
        let link = link_line("https://rapscript.de");
        assert_eq!(
            link,
            LinkLine::Plain {
                href: "https://rapscript.de".to_string(),
                label: "rapscript.de".to_string(),
            }
        );
    }

    #[test]
    fn test_link_line_unparseable_keeps_raw_string() {
        let link = link_line("not a url");
        assert_eq!(
            link,
            LinkLine::Plain {
                href: "not a url".to_string(),
                label: "not a url".to_string(),
            }
        );
    }

    #[test]
    fn test_popup_content_full() {
        let info = location(json!({
            "city": "Leipzig",
            "name": "Cypher am See",
            "url": "https://instagram.com/cypheramsee",
            "address": "Parkweg 1, 04177 Leipzig",
            "weekdays": ["mo", "wed"],
        }));
        let popup = PopupContent::for_location(&info);
        assert_eq!(popup.title, "Cypher am See");
        assert_eq!(popup.weekday_line.as_deref(), Some("Lunedì, Mercoledì"));
        assert_eq!(popup.address_lines, ["Parkweg 1", "04177 Leipzig"]);
        assert!(matches!(popup.link, LinkLine::Social { .. }));
    }

    #[test]
    fn test_popup_content_city_fallback_and_no_weekdays() {
        let info = location(json!({
            "city": "Berlin",
            "name": "Open Cypher",
            "url": "https://opencypher.test",
        }));
        let popup = PopupContent::for_location(&info);
        assert_eq!(popup.weekday_line, None);
        assert_eq!(popup.address_lines, ["Berlin"]);
    }
}
