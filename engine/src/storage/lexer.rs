//! Lexers for the table-file grammar.
//!
//! The table file has its own token set, separate from the command
//! language: section markers, column declarations and row values.

use crate::error::{Error, Result};

pub const TITLE: &str = "Title";
pub const TABLE_SECTION: &str = "TABLE_S";
pub const SECTION_BEGIN: &str = "BEGIN";
pub const SECTION_END: &str = "END";
pub const DATA_SECTION: &str = "DATA_SECTION";
pub const ROW_PREFIX: &str = "Data->";
pub const ROW_SUFFIX: &str = "->End";

#[derive(Debug, Clone, PartialEq)]
pub enum TffToken {
    Title,
    TableName(String),
    TableSection,
    SectionBegin,
    SectionEnd,
    NumberType,
    TextType,
    ColumnName(String),
    Key,
    NotNull,
    Comma,
    Number(f64),
    Text(String),
}

impl TffToken {
    /// Row value as stored text. Numbers are rendered without decimals.
    pub fn value_text(&self) -> Option<String> {
        match self {
            TffToken::Number(n) => Some(format!("{:.0}", n)),
            TffToken::Text(s) => Some(s.clone()),
            _ => None,
        }
    }
}

/// Lexes everything before the `DATA_SECTION` marker: the title line and
/// the schema section.
pub fn lex_header(raw: &str) -> Result<Vec<TffToken>> {
    let mut tokens = Vec::new();
    let mut lines = raw
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .take_while(|line| !line.starts_with(DATA_SECTION));

    let title = lines
        .next()
        .ok_or_else(|| Error::Decode("empty table file".to_string()))?;
    lex_title(title, &mut tokens);

    for line in lines {
        lex_schema_line(line, &mut tokens)?;
    }
    Ok(tokens)
}

/// The first line is free text. When it has the `Title : "name"` shape
/// the quoted part also yields the table name.
fn lex_title(line: &str, tokens: &mut Vec<TffToken>) {
    tokens.push(TffToken::Title);

    let name = line
        .strip_prefix(TITLE)
        .map(str::trim_start)
        .and_then(|s| s.strip_prefix(':'))
        .map(str::trim)
        .and_then(|s| s.strip_prefix('"'))
        .and_then(|s| s.strip_suffix('"'));
    if let Some(name) = name {
        tokens.push(TffToken::TableName(name.to_string()));
    }
}

fn lex_schema_line(line: &str, tokens: &mut Vec<TffToken>) -> Result<()> {
    let mut chars = line.char_indices().peekable();
    while let Some((start, ch)) = chars.next() {
        if ch.is_whitespace() {
            continue;
        }
        if ch == ',' {
            tokens.push(TffToken::Comma);
            continue;
        }
        if !(ch.is_ascii_alphanumeric() || ch == '_') {
            return Err(Error::Decode(format!(
                "unexpected character '{}' in table section",
                ch
            )));
        }

        let mut end = line.len();
        while let Some(&(pos, next)) = chars.peek() {
            if !(next.is_ascii_alphanumeric() || next == '_') {
                end = pos;
                break;
            }
            chars.next();
        }
        let word = &line[start..end];

        // A word right after a column type is always a name, even if it
        // spells a section keyword.
        if matches!(
            tokens.last(),
            Some(TffToken::NumberType | TffToken::TextType)
        ) {
            tokens.push(TffToken::ColumnName(word.to_string()));
            continue;
        }

        let token = match word.to_ascii_uppercase().as_str() {
            TABLE_SECTION => TffToken::TableSection,
            SECTION_BEGIN => TffToken::SectionBegin,
            SECTION_END => TffToken::SectionEnd,
            "NUMBER" => TffToken::NumberType,
            "TEXT" => TffToken::TextType,
            "KEY" => TffToken::Key,
            "NOTNULL" => TffToken::NotNull,
            _ => {
                return Err(Error::Decode(format!(
                    "unexpected word '{}' in table section",
                    word
                )));
            }
        };
        tokens.push(token);
    }
    Ok(())
}

/// True for lines of the shape `Data-> ... ->End` (already trimmed).
pub fn is_row_line(line: &str) -> bool {
    line.len() >= ROW_PREFIX.len() + ROW_SUFFIX.len()
        && line.starts_with(ROW_PREFIX)
        && line.ends_with(ROW_SUFFIX)
}

/// Lexes the bracketed values of one `Data-> [..] ->End` line. Returns
/// `None` when the brackets are missing.
pub fn lex_row(line: &str) -> Option<Vec<TffToken>> {
    let inner = line
        .strip_prefix(ROW_PREFIX)?
        .strip_suffix(ROW_SUFFIX)?
        .trim()
        .strip_prefix('[')?
        .strip_suffix(']')?;
    if inner.trim().is_empty() {
        return Some(Vec::new());
    }
    Some(split_values(inner).into_iter().map(lex_value).collect())
}

/// Splits on commas outside quoted values. A value is quoted only when
/// its first non-blank character is `"`; inside it `\` escapes the next
/// character.
fn split_values(inner: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut at_piece_start = true;
    let mut quoted = false;
    let mut escaped = false;
    for (pos, ch) in inner.char_indices() {
        if quoted {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => quoted = false,
                _ => {}
            }
            continue;
        }
        match ch {
            ',' => {
                pieces.push(&inner[start..pos]);
                start = pos + 1;
                at_piece_start = true;
            }
            '"' if at_piece_start => {
                quoted = true;
                at_piece_start = false;
            }
            c if c.is_whitespace() => {}
            _ => at_piece_start = false,
        }
    }
    pieces.push(&inner[start..]);
    pieces
}

fn lex_value(piece: &str) -> TffToken {
    let piece = piece.trim();
    if piece.starts_with('"') {
        if let Some(text) = unquote_value(piece) {
            return TffToken::Text(text);
        }
    }
    if is_number_literal(piece) {
        if let Ok(n) = piece.parse::<f64>() {
            return TffToken::Number(n);
        }
    }
    TffToken::Text(piece.to_string())
}

/// Wraps a value in quotes, escaping `"`, `\` and line breaks.
pub fn quote_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Reverses `quote_value`. `None` unless the whole piece is one quoted
/// value.
fn unquote_value(piece: &str) -> Option<String> {
    let mut chars = piece.strip_prefix('"')?.chars();
    let mut out = String::new();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' => match chars.next()? {
                'n' => out.push('\n'),
                'r' => out.push('\r'),
                other => out.push(other),
            },
            '"' => return chars.as_str().is_empty().then_some(out),
            c => out.push(c),
        }
    }
    None
}

/// Same shape the command lexer accepts: optional leading `-`, digits and
/// at most one `.`.
fn is_number_literal(piece: &str) -> bool {
    let digits = piece.strip_prefix('-').unwrap_or(piece);
    !digits.is_empty()
        && digits.chars().all(|c| c.is_ascii_digit() || c == '.')
        && digits.chars().filter(|&c| c == '.').count() <= 1
        && digits.chars().any(|c| c.is_ascii_digit())
}
