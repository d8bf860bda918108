use tracing::debug;

use crate::catalog::schema::ColumnType;
use crate::error::{Error, Result};
use crate::script::lexer::tokenize;
use crate::script::token::Token;
use crate::script::{ColumnDef, Command};

/// Tokenizes a statement and checks it against the command grammar.
///
/// ```text
/// CREATE_TABLE <name> ( <TYPE> <col> [NOTNULL] [KEY] (, <TYPE> <col> [...])* ) ;
/// ADD <name> ( <value> (, <value>)* ) ;
/// UPDATE <name> <key> ( <value> (, <value>)* ) ;
/// GET <name> <key> ;
/// DELETE <name> <key> ;
/// ```
pub fn parse(input: &str) -> Result<Command> {
    let tokens = tokenize(input)?;
    debug!(tokens = tokens.len(), "tokenized statement");
    parse_tokens(&tokens)
}

pub fn parse_tokens(tokens: &[Token]) -> Result<Command> {
    check_frame(tokens)?;
    Parser { tokens, pos: 0 }.parse()
}

/// Checks that hold for every command: a leading command keyword, one
/// trailing `;`, and at most one level of balanced parentheses.
fn check_frame(tokens: &[Token]) -> Result<()> {
    let first = tokens
        .first()
        .ok_or_else(|| Error::Syntax("empty statement".to_string()))?;
    if !first.is_command() {
        return Err(Error::UnknownCommand);
    }

    let ends = tokens.iter().filter(|t| **t == Token::End).count();
    if ends != 1 || tokens.last() != Some(&Token::End) {
        return Err(Error::Syntax(
            "statement must end with a single ';'".to_string(),
        ));
    }

    let mut depth = 0usize;
    for token in tokens {
        match token {
            Token::ParenOpen => {
                depth += 1;
                if depth > 1 {
                    return Err(Error::Syntax("nested parentheses".to_string()));
                }
            }
            Token::ParenClose => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| Error::Syntax("unbalanced parentheses".to_string()))?;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(Error::Syntax("unbalanced parentheses".to_string()));
    }
    Ok(())
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn curr(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn walk(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.pos);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn unexpected(&self, expected: &str) -> Error {
        match self.curr() {
            Some(found) => Error::Syntax(format!("expected {}, found '{}'", expected, found)),
            None => Error::Syntax(format!("expected {}, found end of statement", expected)),
        }
    }

    fn expect(&mut self, token: Token) -> Result<()> {
        if self.curr() == Some(&token) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.unexpected(&format!("'{}'", token)))
        }
    }

    fn parse(mut self) -> Result<Command> {
        let command = match self.walk() {
            Some(Token::CreateTable) => {
                let name = self.table_name()?;
                let columns = self.column_defs()?;
                Command::CreateTable { name, columns }
            }
            Some(Token::Add) => {
                let table_name = self.table_name()?;
                let values = self.values()?;
                Command::Add { table_name, values }
            }
            Some(Token::Update) => {
                let table_name = self.table_name()?;
                let key = self.key()?;
                let values = self.values()?;
                Command::Update {
                    table_name,
                    key,
                    values,
                }
            }
            Some(Token::Get) => {
                let table_name = self.table_name()?;
                let key = self.key()?;
                Command::Get { table_name, key }
            }
            Some(Token::Delete) => {
                let table_name = self.table_name()?;
                let key = self.key()?;
                Command::Delete { table_name, key }
            }
            _ => return Err(Error::UnknownCommand),
        };
        self.expect(Token::End)?;
        Ok(command)
    }

    fn table_name(&mut self) -> Result<String> {
        match self.curr() {
            Some(Token::TableName(name)) => {
                self.pos += 1;
                Ok(name.clone())
            }
            _ => Err(self.unexpected("table name")),
        }
    }

    fn key(&mut self) -> Result<String> {
        match self.curr().and_then(Token::literal) {
            Some(raw) => {
                self.pos += 1;
                Ok(raw.to_string())
            }
            None => Err(self.unexpected("key value")),
        }
    }

    /// `( value (, value)* )`, possibly empty.
    fn values(&mut self) -> Result<Vec<String>> {
        self.expect(Token::ParenOpen)?;
        let mut values = Vec::new();
        if self.curr() == Some(&Token::ParenClose) {
            self.pos += 1;
            return Ok(values);
        }
        loop {
            match self.curr().and_then(Token::literal) {
                Some(raw) => {
                    values.push(raw.to_string());
                    self.pos += 1;
                }
                None => return Err(self.unexpected("value")),
            }
            match self.curr() {
                Some(Token::Comma) => self.pos += 1,
                Some(Token::ParenClose) => {
                    self.pos += 1;
                    return Ok(values);
                }
                _ => return Err(self.unexpected("',' or ')'")),
            }
        }
    }

    /// `( TYPE name attr* (, TYPE name attr*)* )`, possibly empty.
    fn column_defs(&mut self) -> Result<Vec<ColumnDef>> {
        self.expect(Token::ParenOpen)?;
        let mut columns = Vec::new();
        if self.curr() == Some(&Token::ParenClose) {
            self.pos += 1;
            return Ok(columns);
        }
        loop {
            let column_type = match self.curr() {
                Some(Token::NumberType) => ColumnType::Number,
                Some(Token::TextType) => ColumnType::Text,
                _ => return Err(self.unexpected("column type")),
            };
            self.pos += 1;

            let name = match self.curr() {
                Some(Token::ColumnName(name)) => name.clone(),
                _ => return Err(self.unexpected("column name")),
            };
            self.pos += 1;

            let mut def = ColumnDef {
                name,
                column_type,
                key_marks: 0,
                not_null: false,
            };
            loop {
                match self.curr() {
                    Some(Token::Key) => def.key_marks += 1,
                    Some(Token::NotNull) => def.not_null = true,
                    _ => break,
                }
                self.pos += 1;
            }
            columns.push(def);

            match self.curr() {
                Some(Token::Comma) => self.pos += 1,
                Some(Token::ParenClose) => {
                    self.pos += 1;
                    return Ok(columns);
                }
                _ => return Err(self.unexpected("column attribute, ',' or ')'")),
            }
        }
    }
}
