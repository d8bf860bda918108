use std::iter::Peekable;
use std::str::CharIndices;

use thiserror::Error;

use crate::error::Error;
use crate::script::token::Token;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    #[error("unterminated string starting at position {0}")]
    UnterminatedString(usize),
    #[error("unrecognized identifier '{word}' at position {pos}")]
    UnknownIdent { word: String, pos: usize },
    #[error("unexpected character '{ch}' at position {pos}")]
    InvalidChar { ch: char, pos: usize },
}

impl From<LexError> for Error {
    fn from(err: LexError) -> Self {
        Error::Syntax(err.to_string())
    }
}

/// Turns a statement into its token stream.
pub fn tokenize(input: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(input).run()
}

struct Lexer<'a> {
    src: &'a str,
    chars: Peekable<CharIndices<'a>>,
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            chars: src.char_indices().peekable(),
            tokens: Vec::new(),
        }
    }

    fn is_ident_start(ch: char) -> bool {
        ch.is_ascii_alphabetic() || ch == '_'
    }

    fn is_ident_part(ch: char) -> bool {
        Self::is_ident_start(ch) || ch.is_ascii_digit()
    }

    fn curr(&mut self) -> Option<(usize, char)> {
        self.chars.peek().copied()
    }

    /// Byte offset of the next unread character.
    fn offset(&mut self) -> usize {
        match self.curr() {
            Some((pos, _)) => pos,
            None => self.src.len(),
        }
    }

    fn run(mut self) -> Result<Vec<Token>, LexError> {
        while let Some((pos, ch)) = self.chars.next() {
            let token = match ch {
                _ if ch.is_whitespace() => continue,
                ',' => Token::Comma,
                '(' => Token::ParenOpen,
                ')' => Token::ParenClose,
                ';' => Token::End,
                '"' => self.lex_string(pos)?,
                _ if Self::is_ident_start(ch) => self.lex_word(pos)?,
                _ if ch.is_ascii_digit() || ch == '-' => self.lex_number(pos),
                _ => return Err(LexError::InvalidChar { ch, pos }),
            };
            self.tokens.push(token);
        }
        Ok(self.tokens)
    }

    fn lex_string(&mut self, open: usize) -> Result<Token, LexError> {
        let start = open + 1;
        let mut escaped = false;
        while let Some((pos, ch)) = self.chars.next() {
            if ch == '\\' && !escaped {
                escaped = true;
                continue;
            }
            if ch == '"' && !escaped {
                return Ok(Token::Str(self.src[start..pos].to_string()));
            }
            escaped = false;
        }
        Err(LexError::UnterminatedString(open))
    }

    fn lex_word(&mut self, start: usize) -> Result<Token, LexError> {
        while let Some((_, ch)) = self.curr() {
            if !Self::is_ident_part(ch) {
                break;
            }
            self.chars.next();
        }
        let src = self.src;
        let end = self.offset();
        let word = &src[start..end];

        let keyword = match word.to_ascii_lowercase().as_str() {
            "create_table" | "createtable" => Some(Token::CreateTable),
            "add" => Some(Token::Add),
            "update" => Some(Token::Update),
            "get" => Some(Token::Get),
            "delete" | "del" => Some(Token::Delete),
            "key" => Some(Token::Key),
            "notnull" => Some(Token::NotNull),
            "number" => Some(Token::NumberType),
            "text" => Some(Token::TextType),
            _ => None,
        };
        if let Some(token) = keyword {
            return Ok(token);
        }

        // Bare identifiers are named by the token right before them.
        match self.tokens.last() {
            Some(prev) if prev.is_column_type() => Ok(Token::ColumnName(word.to_string())),
            Some(prev) if prev.is_command() => Ok(Token::TableName(word.to_string())),
            _ => Err(LexError::UnknownIdent {
                word: word.to_string(),
                pos: start,
            }),
        }
    }

    fn lex_number(&mut self, start: usize) -> Token {
        let mut dots = 0;
        while let Some((_, ch)) = self.curr() {
            if ch.is_ascii_digit() {
                self.chars.next();
            } else if ch == '.' {
                dots += 1;
                if dots > 1 {
                    break;
                }
                self.chars.next();
            } else {
                break;
            }
        }
        let end = self.offset();
        Token::Number(self.src[start..end].to_string())
    }
}
