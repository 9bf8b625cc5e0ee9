use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

static RE_TAGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)</?[a-z][^>]*>").unwrap());
static RE_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static RE_ISO: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(\d{4})-(\d{2})-(\d{2})").unwrap());
static RE_SWEDISH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{1,2})\s+([a-zåäö]+)\s+(\d{4})\b").unwrap());
static RE_NUMERIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{1,2})/(\d{1,2})/(\d{4})\b").unwrap());

const SWEDISH_MONTHS: [(&str, u32); 12] = [
    ("januari", 1),
    ("februari", 2),
    ("mars", 3),
    ("april", 4),
    ("maj", 5),
    ("juni", 6),
    ("juli", 7),
    ("augusti", 8),
    ("september", 9),
    ("oktober", 10),
    ("november", 11),
    ("december", 12),
];

/// Clean extracted text: decode HTML entities, drop residual markup,
/// collapse whitespace runs and trim. Normalizing already-normalized text
/// returns it unchanged.
pub fn normalize_text(text: &str) -> String {
    let decoded = html_escape::decode_html_entities(text);
    let stripped = RE_TAGS.replace_all(&decoded, " ");
    let collapsed = RE_WS.replace_all(&stripped, " ");
    collapsed.trim().to_string()
}

/// Parse a free-form date string into ISO `YYYY-MM-DD`.
///
/// Patterns are tried in a fixed order: ISO date (also the date part of
/// `datetime` attributes), Swedish long form ("3 mars 2024"), then numeric
/// day/month/year. Unparseable or calendar-invalid input yields the empty
/// string; this function never guesses and never fails.
pub fn normalize_date(date_text: &str) -> String {
    for parse in [parse_iso, parse_swedish, parse_numeric] {
        if let Some(date) = parse(date_text) {
            return date.format("%Y-%m-%d").to_string();
        }
    }
    String::new()
}

fn parse_iso(text: &str) -> Option<NaiveDate> {
    let caps = RE_ISO.captures(text)?;
    NaiveDate::from_ymd_opt(
        caps[1].parse().ok()?,
        caps[2].parse().ok()?,
        caps[3].parse().ok()?,
    )
}

fn parse_swedish(text: &str) -> Option<NaiveDate> {
    let lower = text.to_lowercase();
    let caps = RE_SWEDISH.captures(&lower)?;
    let month_name = &caps[2];
    let month = SWEDISH_MONTHS
        .iter()
        .find(|(name, _)| *name == month_name)
        .map(|(_, number)| *number)?;
    NaiveDate::from_ymd_opt(caps[3].parse().ok()?, month, caps[1].parse().ok()?)
}

fn parse_numeric(text: &str) -> Option<NaiveDate> {
    let caps = RE_NUMERIC.captures(text)?;
    NaiveDate::from_ymd_opt(
        caps[3].parse().ok()?,
        caps[2].parse().ok()?,
        caps[1].parse().ok()?,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_text_collapses_whitespace() {
        assert_eq!(normalize_text("  Skolkort \n\t till  elever  "), "Skolkort till elever");
    }

    #[test]
    fn test_normalize_text_decodes_entities_and_strips_tags() {
        assert_eq!(normalize_text("Skolor &amp; f&ouml;rskolor"), "Skolor & förskolor");
        assert_eq!(normalize_text("<p>Nyheter <b>idag</b></p>"), "Nyheter idag");
    }

    #[test]
    fn test_normalize_text_is_idempotent() {
        let inputs = [
            "  Skolkort \n till  elever  ",
            "Skolor &amp; f&ouml;rskolor",
            "<div>Drottninggatan</div> byggs\tom",
            "redan normaliserad text",
            "",
        ];
        for input in inputs {
            let once = normalize_text(input);
            assert_eq!(normalize_text(&once), once, "not idempotent for {:?}", input);
        }
    }

    #[test]
    fn test_normalize_date_iso() {
        assert_eq!(normalize_date("2024-03-03"), "2024-03-03");
        assert_eq!(normalize_date("Publicerad 2024-09-01"), "2024-09-01");
        assert_eq!(normalize_date("2024-09-01T12:34"), "2024-09-01");
    }

    #[test]
    fn test_normalize_date_swedish() {
        assert_eq!(normalize_date("3 mars 2024"), "2024-03-03");
        assert_eq!(normalize_date("28 Augusti 2024"), "2024-08-28");
        assert_eq!(normalize_date("Publicerad den 1 maj 2023"), "2023-05-01");
    }

    #[test]
    fn test_normalize_date_numeric() {
        assert_eq!(normalize_date("3/3/2024"), "2024-03-03");
        assert_eq!(normalize_date("28/08/2024"), "2024-08-28");
    }

    #[test]
    fn test_normalize_date_fallback_is_empty() {
        assert_eq!(normalize_date(""), "");
        assert_eq!(normalize_date("snart"), "");
        assert_eq!(normalize_date("i förra veckan"), "");
        // calendar-invalid dates are rejected, not clamped
        assert_eq!(normalize_date("31 februari 2024"), "");
        assert_eq!(normalize_date("2024-13-40"), "");
    }

    #[test]
    fn test_normalize_date_is_deterministic() {
        for input in ["3 mars 2024", "snart", "2024-09-01T12:34"] {
            assert_eq!(normalize_date(input), normalize_date(input));
        }
    }
}
