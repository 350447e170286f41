//! Naming conventions and abbreviation-aware case conversion.
//!
//! Names are split into words on non-alphanumeric delimiters, or on
//! camel-case boundaries when there is only one delimited token. All-caps
//! words that are a run of known abbreviations (`APIID`) are split further.

use std::collections::BTreeSet;
use std::fmt;
use std::ops::Range;
use std::str::FromStr;

/// Abbreviations recognized when `auto_detect_abbreviations` is on.
pub const COMMON_ABBREVIATIONS: [&str; 69] = [
    "API", "HTTP", "HTTPS", "XML", "JSON", "SQL", "URL", "URI", "UUID", "CPU", "GPU", "RAM", "SSD",
    "HDD", "PDF", "CSV", "ZIP", "GIF", "PNG", "JPG", "JPEG", "SVG", "CSS", "HTML", "JS", "TS",
    "PHP", "ASP", "JSP", "CGI", "FTP", "SSH", "TCP", "UDP", "IP", "DNS", "DHCP", "VPN", "SSL",
    "TLS", "JWT", "CRUD", "REST", "SOAP", "AJAX", "DOM", "UI", "UX", "GUI", "CLI", "OS", "AWS",
    "GCP", "IBM", "AI", "ML", "NLP", "OCR", "QR", "RFID", "NFC", "GPS", "LED", "LCD", "OLED",
    "CRT", "ID", "PLC", "HMI",
];

/// A predefined naming convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamingConvention {
    PascalCase,
    CamelCase,
    SnakeCase,
    KebabCase,
    ScreamingSnakeCase,
    TitleCase,
    LowerCase,
}

impl NamingConvention {
    /// Every convention.
    pub const ALL: [NamingConvention; 7] = [
        NamingConvention::PascalCase,
        NamingConvention::CamelCase,
        NamingConvention::SnakeCase,
        NamingConvention::KebabCase,
        NamingConvention::ScreamingSnakeCase,
        NamingConvention::TitleCase,
        NamingConvention::LowerCase,
    ];

    /// The name used in configuration and messages.
    pub fn name(&self) -> &'static str {
        match self {
            NamingConvention::PascalCase => "PascalCase",
            NamingConvention::CamelCase => "camelCase",
            NamingConvention::SnakeCase => "snake_case",
            NamingConvention::KebabCase => "kebab-case",
            NamingConvention::ScreamingSnakeCase => "SCREAMING_SNAKE_CASE",
            NamingConvention::TitleCase => "Title Case",
            NamingConvention::LowerCase => "lower case",
        }
    }

    fn base_pattern(&self) -> &'static str {
        match self {
            NamingConvention::PascalCase => r"^[A-Z][a-zA-Z0-9]*$",
            NamingConvention::CamelCase => r"^[a-z][a-zA-Z0-9]*$",
            NamingConvention::SnakeCase => r"^[a-z][a-z0-9_]*$",
            NamingConvention::KebabCase => r"^[a-z][a-z0-9-]*$",
            NamingConvention::ScreamingSnakeCase => r"^[A-Z][A-Z0-9_]*$",
            NamingConvention::TitleCase => r"^[A-Z][a-z0-9]*(\s[A-Z0-9][a-z0-9]*)*$",
            NamingConvention::LowerCase => r"^[a-z][a-z0-9\s]*$",
        }
    }

    /// The regex source for this convention.
    pub fn pattern(&self, allow_numbers: bool) -> String {
        if allow_numbers {
            self.base_pattern().to_string()
        } else {
            self.base_pattern().replace("0-9", "")
        }
    }

    fn separator(&self) -> &'static str {
        match self {
            NamingConvention::PascalCase | NamingConvention::CamelCase => "",
            NamingConvention::SnakeCase | NamingConvention::ScreamingSnakeCase => "_",
            NamingConvention::KebabCase => "-",
            NamingConvention::TitleCase | NamingConvention::LowerCase => " ",
        }
    }

    /// Spell a known abbreviation the way a plain word is spelled here.
    fn spell_abbreviation(&self, word: &str, first: bool) -> String {
        match self {
            NamingConvention::PascalCase | NamingConvention::TitleCase => capitalize(word),
            NamingConvention::CamelCase if first => word.to_ascii_lowercase(),
            NamingConvention::CamelCase => capitalize(word),
            NamingConvention::SnakeCase | NamingConvention::KebabCase | NamingConvention::LowerCase => {
                word.to_ascii_lowercase()
            }
            NamingConvention::ScreamingSnakeCase => word.to_ascii_uppercase(),
        }
    }

    /// Rewrite abbreviations written in capitals so the result can be
    /// matched against [`NamingConvention::pattern`].
    ///
    /// `getAPIData` normalizes to `getApiData` under camelCase. Every other
    /// character is left alone.
    pub fn normalize(&self, name: &str, abbreviations: &Abbreviations) -> String {
        if abbreviations.is_empty() {
            return name.to_string();
        }

        let mut normalized = String::with_capacity(name.len());
        let mut cursor = 0;
        for (i, range) in split_words(name, abbreviations).into_iter().enumerate() {
            normalized.push_str(&name[cursor..range.start]);
            let word = &name[range.clone()];
            if is_all_caps(word) && abbreviations.contains(word) {
                normalized.push_str(&self.spell_abbreviation(word, i == 0));
            } else {
                normalized.push_str(word);
            }
            cursor = range.end;
        }
        normalized.push_str(&name[cursor..]);
        normalized
    }

    /// Best-effort conversion of `name` into this convention.
    ///
    /// Known abbreviations stay in capitals in PascalCase, camelCase (after
    /// the first word) and Title Case. Returns `None` when `name` has no
    /// usable letters.
    pub fn suggest(
        &self,
        name: &str,
        abbreviations: &Abbreviations,
        allow_numbers: bool,
    ) -> Option<String> {
        let mut words: Vec<String> = split_words(name, abbreviations)
            .into_iter()
            .map(|range| name[range].to_string())
            .collect();

        if !allow_numbers {
            for word in &mut words {
                word.retain(|c| !c.is_ascii_digit());
            }
        }
        words.retain(|w| !w.is_empty());

        // A name must start with a letter.
        while let Some(first) = words.first_mut() {
            let trimmed = first.trim_start_matches(|c: char| c.is_ascii_digit());
            if trimmed.is_empty() {
                words.remove(0);
            } else {
                *first = trimmed.to_string();
                break;
            }
        }
        if words.is_empty() {
            return None;
        }

        let converted: Vec<String> = words
            .iter()
            .enumerate()
            .map(|(i, word)| {
                let known = abbreviations.contains(&word.to_ascii_uppercase());
                match self {
                    NamingConvention::PascalCase | NamingConvention::TitleCase if known => {
                        word.to_ascii_uppercase()
                    }
                    NamingConvention::PascalCase | NamingConvention::TitleCase => capitalize(word),
                    NamingConvention::CamelCase if i == 0 => word.to_ascii_lowercase(),
                    NamingConvention::CamelCase if known => word.to_ascii_uppercase(),
                    NamingConvention::CamelCase => capitalize(word),
                    NamingConvention::SnakeCase
                    | NamingConvention::KebabCase
                    | NamingConvention::LowerCase => word.to_ascii_lowercase(),
                    NamingConvention::ScreamingSnakeCase => word.to_ascii_uppercase(),
                }
            })
            .collect();

        Some(converted.join(self.separator()))
    }
}

impl fmt::Display for NamingConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for NamingConvention {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.name() == s)
            .ok_or_else(|| format!("unknown naming convention: {}", s))
    }
}

/// Known abbreviations, stored in capitals.
#[derive(Debug, Clone, Default)]
pub struct Abbreviations {
    known: BTreeSet<String>,
    /// Longest first, for segmenting all-caps runs.
    by_length: Vec<String>,
}

impl Abbreviations {
    /// Build from user-supplied abbreviations, plus the common list if `auto_detect`.
    pub fn new(allowed: &[String], auto_detect: bool) -> Self {
        let mut known: BTreeSet<String> = allowed
            .iter()
            .filter(|a| !a.is_empty())
            .map(|a| a.to_ascii_uppercase())
            .collect();
        if auto_detect {
            known.extend(COMMON_ABBREVIATIONS.iter().map(|a| a.to_string()));
        }

        let mut by_length: Vec<String> = known.iter().cloned().collect();
        by_length.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        Self { known, by_length }
    }

    /// Check a word, given in capitals.
    pub fn contains(&self, word: &str) -> bool {
        self.known.contains(word)
    }

    pub fn is_empty(&self) -> bool {
        self.known.is_empty()
    }

    /// Split `word` into known abbreviations, if it is made only of them.
    fn segment<'a>(&self, word: &'a str) -> Option<Vec<&'a str>> {
        if word.is_empty() {
            return Some(Vec::new());
        }
        for abbreviation in &self.by_length {
            if let Some(rest) = word.strip_prefix(abbreviation.as_str()) {
                if let Some(mut parts) = self.segment(rest) {
                    parts.insert(0, &word[..abbreviation.len()]);
                    return Some(parts);
                }
            }
        }
        None
    }
}

/// Byte ranges of the words in `name`.
pub fn split_words(name: &str, abbreviations: &Abbreviations) -> Vec<Range<usize>> {
    let mut words = Vec::new();

    for range in raw_words(name) {
        let word = &name[range.clone()];
        if is_all_caps(word) && !abbreviations.contains(word) {
            if let Some(parts) = abbreviations.segment(word) {
                let mut start = range.start;
                for part in parts {
                    words.push(start..start + part.len());
                    start += part.len();
                }
                continue;
            }
        }
        words.push(range);
    }

    words
}

/// Delimiter split, falling back to camel-case boundaries for a single token.
fn raw_words(name: &str) -> Vec<Range<usize>> {
    let bytes = name.as_bytes();
    let mut tokens = Vec::new();
    let mut start = None;

    for (i, b) in bytes.iter().enumerate() {
        match (b.is_ascii_alphanumeric(), start) {
            (true, None) => start = Some(i),
            (false, Some(s)) => {
                tokens.push(s..i);
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        tokens.push(s..bytes.len());
    }

    match tokens.as_slice() {
        [single] => camel_words(bytes, single.clone()),
        _ => tokens,
    }
}

/// Split on lower→Upper and digit→Upper, and before the last capital of a
/// capital run followed by a lowercase letter (`XMLParser` → `XML`, `Parser`).
fn camel_words(bytes: &[u8], token: Range<usize>) -> Vec<Range<usize>> {
    let mut words = Vec::new();
    let mut start = token.start;

    for i in token.start + 1..token.end {
        let (prev, cur) = (bytes[i - 1], bytes[i]);
        if !cur.is_ascii_uppercase() {
            continue;
        }
        let next_lower = i + 1 < token.end && bytes[i + 1].is_ascii_lowercase();
        if prev.is_ascii_lowercase()
            || prev.is_ascii_digit()
            || (prev.is_ascii_uppercase() && next_lower)
        {
            words.push(start..i);
            start = i;
        }
    }
    words.push(start..token.end);
    words
}

fn is_all_caps(word: &str) -> bool {
    word.bytes().any(|b| b.is_ascii_uppercase()) && !word.bytes().any(|b| b.is_ascii_lowercase())
}

fn capitalize(word: &str) -> String {
    let lower = word.to_ascii_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;

    fn abbreviations() -> Abbreviations {
        Abbreviations::new(&[], true)
    }

    fn words(name: &str) -> Vec<&str> {
        split_words(name, &abbreviations())
            .into_iter()
            .map(|r| &name[r])
            .collect()
    }

    fn suggest(convention: NamingConvention, name: &str) -> Option<String> {
        convention.suggest(name, &abbreviations(), true)
    }

    #[test]
    fn splits_on_delimiters() {
        assert_eq!(words("my_button-label one"), vec!["my", "button", "label", "one"]);
        assert_eq!(words("__lead__"), vec!["lead"]);
    }

    #[test]
    fn splits_camel_boundaries() {
        assert_eq!(words("VeryVeryBadProperty"), vec!["Very", "Very", "Bad", "Property"]);
        assert_eq!(words("getAPIData"), vec!["get", "API", "Data"]);
        assert_eq!(words("XMLParser"), vec!["XML", "Parser"]);
        assert_eq!(words("Button1Label"), vec!["Button1", "Label"]);
    }

    #[test]
    fn camel_split_only_for_single_token() {
        assert_eq!(words("my_XmlParser"), vec!["my", "XmlParser"]);
    }

    #[test]
    fn segments_runs_of_abbreviations() {
        assert_eq!(words("APIID"), vec!["API", "ID"]);
        assert_eq!(words("HTTPURL"), vec!["HTTP", "URL"]);
        assert_eq!(words("ABCDEF"), vec!["ABCDEF"]);
    }

    #[test]
    fn conversions_keep_abbreviations() {
        use NamingConvention::*;

        assert_eq!(suggest(PascalCase, "xml_http_request").as_deref(), Some("XMLHTTPRequest"));
        assert_eq!(suggest(PascalCase, "my_button").as_deref(), Some("MyButton"));
        assert_eq!(suggest(CamelCase, "get_api_data").as_deref(), Some("getAPIData"));
        assert_eq!(suggest(CamelCase, "API_data").as_deref(), Some("apiData"));
        assert_eq!(suggest(SnakeCase, "getAPIData").as_deref(), Some("get_api_data"));
        assert_eq!(suggest(KebabCase, "XMLParser").as_deref(), Some("xml-parser"));
        assert_eq!(suggest(ScreamingSnakeCase, "maxValue").as_deref(), Some("MAX_VALUE"));
        assert_eq!(suggest(TitleCase, "json_data_view").as_deref(), Some("JSON Data View"));
        assert_eq!(suggest(LowerCase, "MyAPIButton").as_deref(), Some("my api button"));
    }

    #[test]
    fn suggestion_starts_with_a_letter() {
        assert_eq!(suggest(NamingConvention::PascalCase, "1st_place").as_deref(), Some("StPlace"));
        assert_eq!(
            NamingConvention::SnakeCase
                .suggest("value2_total", &abbreviations(), false)
                .as_deref(),
            Some("value_total")
        );
        assert_eq!(suggest(NamingConvention::PascalCase, "___"), None);
        assert_eq!(suggest(NamingConvention::PascalCase, "123"), None);
    }

    #[test]
    fn without_abbreviations_words_are_plain() {
        let none = Abbreviations::new(&[], false);
        assert_eq!(
            NamingConvention::PascalCase.suggest("xml_parser", &none, true).as_deref(),
            Some("XmlParser")
        );
        assert_eq!(NamingConvention::CamelCase.normalize("getAPIData", &none), "getAPIData");
    }

    #[test]
    fn custom_abbreviations_are_uppercased() {
        let custom = Abbreviations::new(&["opc".to_string()], false);
        assert!(custom.contains("OPC"));
        assert_eq!(
            NamingConvention::PascalCase.suggest("opc_server", &custom, true).as_deref(),
            Some("OPCServer")
        );
    }

    #[test]
    fn normalizes_capitalized_abbreviations() {
        let abbr = abbreviations();
        assert_eq!(NamingConvention::CamelCase.normalize("getAPIData", &abbr), "getApiData");
        assert_eq!(NamingConvention::CamelCase.normalize("XMLParser", &abbr), "xmlParser");
        assert_eq!(NamingConvention::PascalCase.normalize("APIID", &abbr), "ApiId");
        assert_eq!(NamingConvention::SnakeCase.normalize("XML_parser", &abbr), "xml_parser");
        assert_eq!(NamingConvention::TitleCase.normalize("Data XML View", &abbr), "Data Xml View");
    }

    #[test]
    fn patterns_drop_digits_when_disallowed() {
        assert_eq!(NamingConvention::PascalCase.pattern(false), r"^[A-Z][a-zA-Z]*$");
        assert_eq!(NamingConvention::TitleCase.pattern(false), r"^[A-Z][a-z]*(\s[A-Z][a-z]*)*$");
    }

    #[test]
    fn convention_names_round_trip() {
        for convention in NamingConvention::ALL {
            assert_eq!(convention.name().parse::<NamingConvention>(), Ok(convention));
        }
        assert!("Sentence case".parse::<NamingConvention>().is_err());
    }

    #[test]
    fn suggestions_satisfy_their_convention() {
        let abbr = abbreviations();
        let names = [
            "my_button",
            "MyButton",
            "myButton",
            "my-button",
            "MY_BUTTON",
            "My Button",
            "my button",
            "getAPIData",
            "xml_http_request",
            "APIID",
            "api 2go",
            "Button1Label",
            "2nd_value",
            "user_id",
            "HTTPServer2",
            "data__XML--view",
        ];

        for convention in NamingConvention::ALL {
            for allow_numbers in [true, false] {
                let pattern = Regex::new(&convention.pattern(allow_numbers)).unwrap();
                for name in names {
                    let Some(suggestion) = convention.suggest(name, &abbr, allow_numbers) else {
                        continue;
                    };
                    let normalized = convention.normalize(&suggestion, &abbr);
                    assert!(
                        pattern.is_match(&normalized),
                        "{} suggestion '{}' for '{}' does not validate",
                        convention,
                        suggestion,
                        name
                    );
                }
            }
        }
    }
}
