use std::fmt;

/// A lexical unit of the command language.
///
/// Literal and contextual tokens carry their raw source text; keyword and
/// structural tokens carry nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    // command keywords
    CreateTable, // CREATE_TABLE, CREATETABLE
    Add,         // ADD
    Update,      // UPDATE
    Get,         // GET
    Delete,      // DELETE, DEL
    // column attributes
    Key,     // KEY
    NotNull, // NOTNULL
    // column types
    NumberType, // NUMBER
    TextType,   // TEXT
    // literals
    Number(String),
    Str(String),
    // contextual identifiers
    TableName(String),
    ColumnName(String),
    // structural
    Comma,      // ,
    ParenOpen,  // (
    ParenClose, // )
    End,        // ;
}

impl Token {
    pub fn is_command(&self) -> bool {
        matches!(
            self,
            Token::CreateTable | Token::Add | Token::Update | Token::Get | Token::Delete
        )
    }

    pub fn is_column_type(&self) -> bool {
        matches!(self, Token::NumberType | Token::TextType)
    }

    /// Raw text of a number or string literal.
    pub fn literal(&self) -> Option<&str> {
        match self {
            Token::Number(raw) | Token::Str(raw) => Some(raw),
            _ => None,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::CreateTable => write!(f, "CREATE_TABLE"),
            Token::Add => write!(f, "ADD"),
            Token::Update => write!(f, "UPDATE"),
            Token::Get => write!(f, "GET"),
            Token::Delete => write!(f, "DELETE"),
            Token::Key => write!(f, "KEY"),
            Token::NotNull => write!(f, "NOTNULL"),
            Token::NumberType => write!(f, "NUMBER"),
            Token::TextType => write!(f, "TEXT"),
            Token::Number(raw) => write!(f, "{}", raw),
            Token::Str(raw) => write!(f, "\"{}\"", raw),
            Token::TableName(name) | Token::ColumnName(name) => write!(f, "{}", name),
            Token::Comma => write!(f, ","),
            Token::ParenOpen => write!(f, "("),
            Token::ParenClose => write!(f, ")"),
            Token::End => write!(f, ";"),
        }
    }
}
