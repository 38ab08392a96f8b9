//! # Tokenizer for English email text
//!
//! Splits raw text into word and punctuation tokens. Every token keeps its byte
//! offsets into the original text, which is what lets the masker cut entities
//! out of the string without re-searching for them.
//!
//! ## Rules
//!
//! - Letters, digits and inner hyphens form words (`e-mail`, `follow-up`).
//! - A period after a known abbreviation stays attached (`Mr.`, `Inc.`).
//! - A period between digits stays attached (`3.5`).
//! - Apostrophes stay inside words (`O'Brien`, `don't`).
//! - Every other non-space character is its own token, so a mask placeholder
//!   such as `[PHONE]` becomes `[`, `PHONE`, `]`.
//!
//! ```rust
//! use mailshield_core::tokenizer::tokenize;
//!
//! let tokens = tokenize("Ask Mr. Brown.");
//! let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
//! assert_eq!(texts, vec!["Ask", "Mr.", "Brown", "."]);
//! ```

use serde::{Deserialize, Serialize};

/// A token cut from the original text.
///
/// `start`/`end` are byte offsets, always on char boundaries, so
/// `&text[token.start..token.end] == token.text` holds for every token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Token {
    /// Token text (e.g. "Smith", ",", "Mr.").
    pub text: String,
    /// Start byte offset (inclusive).
    pub start: usize,
    /// End byte offset (exclusive).
    pub end: usize,
    /// Position in the token list.
    pub index: usize,
}

/// Abbreviations whose trailing period is part of the token
const ABBREVIATIONS: &[&str] = &[
    "Mr", "Mrs", "Ms", "Dr", "Prof", "Sr", "Jr", "St", "Rev", "Hon",
    "Inc", "Ltd", "Corp", "Co", "Bros", "Dept", "Ave", "Rd", "Blvd",
    "No", "etc", "vs", "approx", "Jan", "Feb", "Mar", "Apr", "Jun", "Jul",
    "Aug", "Sep", "Sept", "Oct", "Nov", "Dec",
];

/// Tokenizes text into words and punctuation with byte offsets.
pub fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut current_start = 0;
    let mut current_text = String::new();
    let chars: Vec<(usize, char)> = text.char_indices().collect();

    for (i, &(byte_pos, ch)) in chars.iter().enumerate() {
        if ch.is_alphanumeric() || (ch == '-' && !current_text.is_empty()) {
            if current_text.is_empty() {
                current_start = byte_pos;
            }
            current_text.push(ch);
        } else if ch == '.' && !current_text.is_empty() {
            let is_abbrev = ABBREVIATIONS.contains(&current_text.as_str());
            let current_is_num = current_text.chars().all(char::is_numeric);
            let next_is_num = chars
                .get(i + 1)
                .map(|(_, c)| c.is_numeric())
                .unwrap_or(false);

            if is_abbrev || (current_is_num && next_is_num) {
                current_text.push('.');
            } else {
                flush_token(&mut tokens, &mut current_text, current_start, byte_pos);
                push_token(&mut tokens, ".".to_string(), byte_pos, byte_pos + 1);
            }
        } else if (ch == '\'' || ch == '\u{2019}') && !current_text.is_empty() {
            current_text.push(ch);
        } else if ch.is_whitespace() {
            flush_token(&mut tokens, &mut current_text, current_start, byte_pos);
        } else {
            flush_token(&mut tokens, &mut current_text, current_start, byte_pos);
            push_token(&mut tokens, ch.to_string(), byte_pos, byte_pos + ch.len_utf8());
        }
    }

    flush_token(&mut tokens, &mut current_text, current_start, text.len());

    for (i, token) in tokens.iter_mut().enumerate() {
        token.index = i;
    }
    tokens
}

/// Closes the accumulated word (if any)
fn flush_token(tokens: &mut Vec<Token>, text: &mut String, start: usize, end: usize) {
    if !text.is_empty() {
        // Trailing hyphens and apostrophes are not part of the word.
        let trimmed_len = text.trim_end_matches(['-', '\'', '\u{2019}']).len();
        let word_end = start + trimmed_len;
        if trimmed_len > 0 {
            tokens.push(Token {
                text: text[..trimmed_len].to_string(),
                start,
                end: word_end,
                index: 0,
            });
        }
        let rest = &text[trimmed_len..];
        let mut offset = word_end;
        for ch in rest.chars() {
            push_token(tokens, ch.to_string(), offset, offset + ch.len_utf8());
            offset += ch.len_utf8();
        }
        debug_assert_eq!(offset, end);
        text.clear();
    }
}

fn push_token(tokens: &mut Vec<Token>, text: String, start: usize, end: usize) {
    tokens.push(Token {
        text,
        start,
        end,
        index: 0,
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(text: &str) -> Vec<String> {
        tokenize(text).into_iter().map(|t| t.text).collect()
    }

    #[test]
    fn test_tokenize_basic() {
        assert_eq!(texts("Call John at noon."), vec!["Call", "John", "at", "noon", "."]);
    }

    #[test]
    fn test_offsets_match_source() {
        let text = "Hi Zoë, ping Acme Inc. about the follow-up!";
        for token in tokenize(text) {
            assert_eq!(&text[token.start..token.end], token.text);
        }
    }

    #[test]
    fn test_abbreviation_keeps_period() {
        assert_eq!(texts("Dr. Patel and Globex Corp. agreed"), vec![
            "Dr.", "Patel", "and", "Globex", "Corp.", "agreed"
        ]);
    }

    #[test]
    fn test_placeholder_splits_into_brackets() {
        assert_eq!(texts("reach me at [PHONE]"), vec!["reach", "me", "at", "[", "PHONE", "]"]);
    }

    #[test]
    fn test_decimal_number_stays_whole() {
        assert_eq!(texts("version 3.5 shipped"), vec!["version", "3.5", "shipped"]);
    }

    #[test]
    fn test_apostrophe_inside_word() {
        assert_eq!(texts("Sean O'Brien's laptop"), vec!["Sean", "O'Brien's", "laptop"]);
    }

    #[test]
    fn test_trailing_hyphen_is_split() {
        let tokens = tokenize("well- done");
        assert_eq!(tokens[0].text, "well");
        assert_eq!(tokens[1].text, "-");
        assert_eq!(tokens[1].start, 4);
    }

    #[test]
    fn test_indices_are_sequential() {
        let tokens = tokenize("a, b. c");
        for (i, t) in tokens.iter().enumerate() {
            assert_eq!(t.index, i);
        }
    }
}
