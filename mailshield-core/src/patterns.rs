//! Regex detection of structured PII: email addresses and phone numbers.

use regex::{NoExpand, Regex};

use crate::error::Result;

pub const EMAIL_PATTERN: &str = r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Z|a-z]{2,}\b";

/// 10-digit or 7-digit numbers, optionally split by `-` or `.`
pub const PHONE_PATTERN: &str = r"\b(?:\d{3}[-.]?)?\d{3}[-.]?\d{4}\b";

pub const EMAIL_PLACEHOLDER: &str = "[EMAIL]";
pub const PHONE_PLACEHOLDER: &str = "[PHONE]";

/// A named pattern and the placeholder that replaces its matches
#[derive(Debug, Clone)]
pub struct PatternRule {
    pub name: &'static str,
    pub pattern: &'static str,
    pub placeholder: &'static str,
}

/// Email first, then phone. The order matters: digits inside an address are
/// gone before the phone pattern runs.
pub const DEFAULT_RULES: &[PatternRule] = &[
    PatternRule {
        name: "email",
        pattern: EMAIL_PATTERN,
        placeholder: EMAIL_PLACEHOLDER,
    },
    PatternRule {
        name: "phone",
        pattern: PHONE_PATTERN,
        placeholder: PHONE_PLACEHOLDER,
    },
];

/// Compiled substitution rules, applied in order.
#[derive(Debug, Clone)]
pub struct PatternMatcher {
    rules: Vec<(&'static str, Regex, &'static str)>,
}

impl PatternMatcher {
    /// Email and phone rules
    pub fn new() -> Result<Self> {
        Self::with_rules(DEFAULT_RULES)
    }

    pub fn with_rules(rules: &[PatternRule]) -> Result<Self> {
        let rules = rules
            .iter()
            .map(|rule| Ok((rule.name, Regex::new(rule.pattern)?, rule.placeholder)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { rules })
    }

    /// Applies every rule in order.
    pub fn mask(&self, text: &str) -> String {
        let mut masked = text.to_string();
        for (_, regex, placeholder) in &self.rules {
            masked = regex.replace_all(&masked, NoExpand(placeholder)).into_owned();
        }
        masked
    }

    pub fn mask_emails(&self, text: &str) -> String {
        self.mask_rule("email", text)
    }

    pub fn mask_phones(&self, text: &str) -> String {
        self.mask_rule("phone", text)
    }

    fn mask_rule(&self, name: &str, text: &str) -> String {
        self.rules
            .iter()
            .filter(|(rule_name, _, _)| *rule_name == name)
            .fold(text.to_string(), |acc, (_, regex, placeholder)| {
                regex.replace_all(&acc, NoExpand(placeholder)).into_owned()
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher() -> PatternMatcher {
        PatternMatcher::new().unwrap()
    }

    #[test]
    fn test_email_masked() {
        let masked = matcher().mask("Write to jane.doe+billing@example.co.uk today");
        assert_eq!(masked, "Write to [EMAIL] today");
    }

    #[test]
    fn test_phone_formats() {
        let m = matcher();
        assert_eq!(m.mask("call 555-0199"), "call [PHONE]");
        assert_eq!(m.mask("call 312.555.0142 now"), "call [PHONE] now");
        assert_eq!(m.mask("call 3125550142"), "call [PHONE]");
        assert_eq!(m.mask("call 5550199"), "call [PHONE]");
    }

    #[test]
    fn test_short_numbers_untouched() {
        let m = matcher();
        assert_eq!(m.mask("order 12345 shipped"), "order 12345 shipped");
        assert_eq!(m.mask("room 42"), "room 42");
    }

    #[test]
    fn test_email_before_phone() {
        let masked = matcher().mask("ping 5550199@corp.example.com or 555-0100");
        assert_eq!(masked, "ping [EMAIL] or [PHONE]");
    }

    #[test]
    fn test_idempotent() {
        let m = matcher();
        let once = m.mask("Mail a.b@c.io or call 555-123-4567.");
        assert_eq!(m.mask(&once), once);
        assert!(!once.contains("a.b@c.io"));
        assert!(!once.contains("4567"));
    }

    #[test]
    fn test_single_rule_helpers() {
        let m = matcher();
        let text = "x@y.com 555-0199";
        assert_eq!(m.mask_emails(text), "[EMAIL] 555-0199");
        assert_eq!(m.mask_phones(text), "x@y.com [PHONE]");
    }

    #[test]
    fn test_bad_pattern_is_an_error() {
        let rules = [PatternRule {
            name: "broken",
            pattern: r"(\d{3}",
            placeholder: "[X]",
        }];
        assert!(matches!(
            PatternMatcher::with_rules(&rules),
            Err(crate::error::Error::Pattern(_))
        ));
    }
}
