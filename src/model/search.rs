use regex::Regex;

/// Query text that does not compile as a regex is matched literally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPattern(String);

impl SearchPattern {
    pub fn new(raw: Option<&str>) -> Option<Self> {
        let raw = raw.filter(|raw| !raw.is_empty())?;
        let pattern = if Regex::new(raw).is_ok() {
            raw.to_string()
        } else {
            regex::escape(raw)
        };
        Some(Self(pattern))
    }

    pub fn case_insensitive(&self) -> String {
        format!("(?i){}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_query_is_no_filter() {
        assert_eq!(SearchPattern::new(None), None);
        assert_eq!(SearchPattern::new(Some("")), None);
    }

    #[test]
    fn pattern_matches_any_case() {
        let pattern = SearchPattern::new(Some("an")).unwrap();
        let re = Regex::new(&pattern.case_insensitive()).unwrap();
        for name in ["Anna", "DIANNE", "swan"] {
            assert!(re.is_match(name), "{name} should match");
        }
        assert!(!re.is_match("Bob"));
    }

    #[test]
    fn invalid_regex_is_matched_literally() {
        let pattern = SearchPattern::new(Some("c++(")).unwrap();
        let re = Regex::new(&pattern.case_insensitive()).unwrap();
        assert!(re.is_match("Learning C++(and more)"));
        assert!(!re.is_match("Learning C"));
    }
}
