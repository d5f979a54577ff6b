use crate::{
    lang::source_buffer::{SourceBuffer, SourceLocation},
    runtime::error::{self, ErrorKind, ScriptError},
};
use std::{
    fmt::{self, Debug, Display, Formatter},
    fs::read_to_string,
};

/// A single lexeme of the language and where it was found.
///
/// Tokens are not classified when they are read.  Whether a token is a primitive, a control
/// keyword, a literal or a word reference is decided by the compiler from the context it appears
/// in.  String literals keep their surrounding quotes in the token text.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Token {
    location: SourceLocation,
    text: String,
}

/// A list of tokens found in the source code.
pub type TokenList = Vec<Token>;

impl Display for Token {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

/// Include the location when debugging.
impl Debug for Token {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}: {}", self.location, self.text)
    }
}

impl Token {
    pub fn new(location: SourceLocation, text: String) -> Token {
        Token { location, text }
    }

    /// Get the token's location in the original source text.
    pub fn location(&self) -> &SourceLocation {
        &self.location
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Does this token hold a quoted string literal?
    pub fn is_string(&self) -> bool {
        self.string().is_some()
    }

    /// The contents of a string literal token, without the quotes.
    pub fn string(&self) -> Option<&str> {
        if self.text.len() >= 2 {
            self.text.strip_prefix('"')?.strip_suffix('"')
        } else {
            None
        }
    }
}

/// Check if the given character is considered whitespace.  Any Unicode white space separates
/// tokens, form feeds and non-breaking spaces included.
fn is_whitespace(next: &char) -> bool {
    next.is_whitespace()
}

/// Skip over whitespace in the text.  Stopping only at either the end of the buffer or the next
/// non-whitespace character.
fn skip_whitespace(buffer: &mut SourceBuffer) {
    while let Some(next) = buffer.peek_next()
        && is_whitespace(&next)
    {
        let _ = buffer.next_char();
    }
}

/// Read a string literal, quotes included.  The literal ends at the next `"` and may not cross a
/// line.  Anything directly after the closing quote starts a new token.
fn process_string(buffer: &mut SourceBuffer) -> error::Result<(SourceLocation, String)> {
    let location = buffer.location().clone();
    let mut text = String::new();

    if let Some(quote) = buffer.next_char() {
        text.push(quote);
    }

    loop {
        match buffer.next_char() {
            Some('"') => {
                text.push('"');
                break;
            }

            Some('\n') => ScriptError::new_as_result(
                ErrorKind::Parse,
                Some(location.clone()),
                "Unexpected new line in string literal.".to_string(),
                None,
            )?,

            Some(next) => text.push(next),

            None => ScriptError::new_as_result(
                ErrorKind::Parse,
                Some(location.clone()),
                "Unexpected end of file in string literal.".to_string(),
                None,
            )?,
        }
    }

    Ok((location, text))
}

/// Pull text out of the buffer until we hit a whitespace character.  Words can contain any
/// character except whitespace, quotes included.
fn process_until_whitespace(buffer: &mut SourceBuffer) -> (SourceLocation, String) {
    let location = buffer.location().clone();
    let mut text = String::new();

    while let Some(next) = buffer.peek_next()
        && !is_whitespace(&next)
    {
        let _ = buffer.next_char();
        text.push(next);
    }

    (location, text)
}

/// Does it look like we're dealing with a numeric literal?
fn is_number(text: &str) -> bool {
    text.chars().any(|c| c.is_ascii_digit())
        && text
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '+' || c == '_')
}

/// Split a `0x`, `0b` or `0o` prefix, in either case, off the front of the text.
fn radix_prefix(text: &str) -> Option<(u32, &str)> {
    let radix = match text.get(..2)?.to_ascii_lowercase().as_str() {
        "0x" => 16,
        "0b" => 2,
        "0o" => 8,
        _ => return None,
    };

    Some((radix, &text[2..]))
}

/// Accumulate the digits as a float so literals wider than 64 bits still convert, rounding like
/// any other large number.
fn parse_radix_digits(digits: &str, radix: u32) -> Option<f64> {
    if digits.is_empty() {
        return None;
    }

    digits.chars().try_fold(0.0, |total: f64, c| {
        Some(total * radix as f64 + c.to_digit(radix)? as f64)
    })
}

/// Attempt to convert the text into a numeric literal.  Decimal integers and floats are accepted
/// along with `0x`, `0b` and `0o` prefixed integers and `Infinity`.  An optional leading sign
/// applies to all forms and `_` may be used as a separator for readability.
pub fn to_numeric(text: &str) -> Option<f64> {
    match text {
        "Infinity" | "+Infinity" => return Some(f64::INFINITY),
        "-Infinity" => return Some(f64::NEG_INFINITY),
        _ => {}
    }

    if !is_number(text) {
        return None;
    }

    let (negative, unsigned) = if let Some(stripped) = text.strip_prefix('-') {
        (true, stripped)
    } else {
        (false, text.strip_prefix('+').unwrap_or(text))
    };

    if !unsigned.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
        return None;
    }

    let cleaned = unsigned.replace('_', "");

    let magnitude = match radix_prefix(&cleaned) {
        Some((radix, digits)) => parse_radix_digits(digits, radix)?,
        None => cleaned.parse::<f64>().ok()?,
    };

    Some(if negative { -magnitude } else { magnitude })
}

/// Tokenize the source code from a string.  The path is only used to tag token locations.
pub fn tokenize_from_source(path: &str, source: &str) -> error::Result<TokenList> {
    let mut buffer = SourceBuffer::new(path, source);
    let mut token_list = TokenList::new();

    while let Some(next) = buffer.peek_next() {
        if is_whitespace(&next) {
            skip_whitespace(&mut buffer);
            continue;
        }

        let (location, text) = if next == '"' {
            process_string(&mut buffer)?
        } else {
            process_until_whitespace(&mut buffer)
        };

        token_list.push(Token::new(location, text));
    }

    Ok(token_list)
}

/// Load the code from a file and then tokenize it.
pub fn tokenize_from_file(path: &str) -> error::Result<TokenList> {
    match read_to_string(path) {
        Ok(source) => tokenize_from_source(path, &source),
        Err(error) => ScriptError::new_as_result(
            ErrorKind::Io,
            None,
            format!("Could not read file {}: {}", path, error),
            None,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(source: &str) -> Vec<String> {
        tokenize_from_source("<test>", source)
            .unwrap()
            .iter()
            .map(|token| token.text().to_string())
            .collect()
    }

    #[test]
    fn splits_on_any_whitespace() {
        assert_eq!(texts(" 1\t2\r\n  dup\n+ "), vec!["1", "2", "dup", "+"]);
    }

    #[test]
    fn empty_source_has_no_tokens() {
        assert!(texts("").is_empty());
        assert!(texts(" \n\t ").is_empty());
    }

    #[test]
    fn string_literal_is_one_token_with_quotes() {
        assert_eq!(
            texts("\"hello  world\" elem"),
            vec!["\"hello  world\"", "elem"]
        );
    }

    #[test]
    fn text_after_closing_quote_starts_a_new_token() {
        assert_eq!(texts("\"div\"elem"), vec!["\"div\"", "elem"]);
    }

    #[test]
    fn quote_inside_a_word_is_ordinary() {
        assert_eq!(texts("say\"hi\" x"), vec!["say\"hi\"", "x"]);
    }

    #[test]
    fn unicode_whitespace_separates_tokens() {
        assert_eq!(texts("1\u{000C}2\u{000B}3"), vec!["1", "2", "3"]);
        assert_eq!(texts("1\u{00A0}2\u{2003}dup"), vec!["1", "2", "dup"]);
    }

    #[test]
    fn locations_track_lines_and_columns() {
        let tokens = tokenize_from_source("<test>", "1\n  dup").unwrap();

        assert_eq!(tokens[1].location().line(), 2);
        assert_eq!(tokens[1].location().column(), 3);
    }

    #[test]
    fn unterminated_string_is_a_parse_error() {
        let error = tokenize_from_source("<test>", "1 \"open").unwrap_err();

        assert_eq!(error.kind(), ErrorKind::Parse);
        assert_eq!(error.location().as_ref().map(|l| l.column()), Some(3));
    }

    #[test]
    fn string_may_not_cross_lines() {
        let error = tokenize_from_source("<test>", "\"one\ntwo\"").unwrap_err();

        assert_eq!(error.kind(), ErrorKind::Parse);
    }

    #[test]
    fn numeric_literals() {
        assert_eq!(to_numeric("42"), Some(42.0));
        assert_eq!(to_numeric("0"), Some(0.0));
        assert_eq!(to_numeric("-3.5"), Some(-3.5));
        assert_eq!(to_numeric("1e3"), Some(1000.0));
        assert_eq!(to_numeric("0x1f"), Some(31.0));
        assert_eq!(to_numeric("-0b101"), Some(-5.0));
        assert_eq!(to_numeric("1_000"), Some(1000.0));
    }

    #[test]
    fn prefixes_are_case_insensitive() {
        assert_eq!(to_numeric("0X10"), Some(16.0));
        assert_eq!(to_numeric("0XfF"), Some(255.0));
        assert_eq!(to_numeric("0B11"), Some(3.0));
        assert_eq!(to_numeric("0O17"), Some(15.0));
    }

    #[test]
    fn wide_hex_literals_convert() {
        assert_eq!(to_numeric("0x10000000000000000"), Some(18446744073709551616.0));
        assert_eq!(to_numeric("0x100000000000000000000"), Some(2f64.powi(80)));
    }

    #[test]
    fn infinity_is_a_number() {
        assert_eq!(to_numeric("Infinity"), Some(f64::INFINITY));
        assert_eq!(to_numeric("+Infinity"), Some(f64::INFINITY));
        assert_eq!(to_numeric("-Infinity"), Some(f64::NEG_INFINITY));
    }

    #[test]
    fn malformed_radix_literals_are_not_numbers() {
        assert_eq!(to_numeric("0x"), None);
        assert_eq!(to_numeric("0b102"), None);
        assert_eq!(to_numeric("0xg"), None);
    }

    #[test]
    fn words_are_not_numbers() {
        assert_eq!(to_numeric("dup"), None);
        assert_eq!(to_numeric("2dup"), None);
        assert_eq!(to_numeric("-"), None);
        assert_eq!(to_numeric("--5"), None);
        assert_eq!(to_numeric("inf"), None);
        assert_eq!(to_numeric("1.2.3"), None);
    }
}
