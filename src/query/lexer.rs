use std::str::FromStr;

use miette::{Result, miette};

use crate::query::keyword::Keyword;

#[derive(Debug, Clone, PartialEq)]
pub enum Token<'a> {
    Keyword(Keyword),
    /// Identifier, type name, attribute or bare literal.
    Word(&'a str),
    Integer(i32),
    /// Single-quoted string, quotes stripped.
    String(&'a str),
    /// `0x`-prefixed hex run, kept verbatim including the prefix.
    Hex(&'a str),

    Comma,
    Colon,
    Asterisk,

    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    LeftBracket,
    RightBracket,

    Equal,
    NotEqual,
    LessThan,
    GreaterThan,
    LessThanEqual,
    GreaterThanEqual,
}

pub(crate) struct Lexer<'a> {
    pub rest: &'a str,
    pub position: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            rest: input,
            position: 0,
        }
    }

    fn bump(&mut self, bytes: usize) {
        self.position += bytes;
        self.rest = &self.rest[bytes..];
    }

    fn skip_whitespace(&mut self) {
        let non_whitespace_pos = self
            .rest
            .char_indices()
            .find(|(_, ch)| !ch.is_whitespace())
            .map(|(pos, _)| pos)
            .unwrap_or(self.rest.len());

        self.bump(non_whitespace_pos);
    }

    fn consume_word(&mut self) -> &'a str {
        let word_end = self
            .rest
            .find(|c: char| !c.is_alphanumeric() && c != '_')
            .unwrap_or(self.rest.len());

        let word = &self.rest[..word_end];
        self.bump(word_end);
        word
    }

    fn consume_string(&mut self) -> Result<&'a str> {
        match self.rest[1..].find('\'') {
            Some(len) => {
                let string_value = &self.rest[1..1 + len];
                self.bump(len + 2);
                Ok(string_value)
            }
            None => Err(miette!(
                "unterminated string literal at position {}",
                self.position
            )),
        }
    }

    fn consume_digits(&mut self) -> &'a str {
        let number_end = self
            .rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(self.rest.len());

        let number_str = &self.rest[..number_end];
        self.bump(number_end);
        number_str
    }

    fn consume_integer(&mut self, negative: bool) -> Result<Token<'a>> {
        let start = self.position;
        let digits = self.consume_digits();
        let number = if negative {
            format!("-{digits}")
        } else {
            digits.to_string()
        };

        number
            .parse::<i32>()
            .map(Token::Integer)
            .map_err(|_| miette!("integer literal out of range at position {start}: {number}"))
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Result<Token<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.skip_whitespace();

        if self.rest.is_empty() {
            return None;
        }

        let char = self.rest.chars().next()?;

        let token = match char {
            ',' => {
                self.bump(1);
                Ok(Token::Comma)
            }
            ':' => {
                self.bump(1);
                Ok(Token::Colon)
            }
            '*' => {
                self.bump(1);
                Ok(Token::Asterisk)
            }
            '(' => {
                self.bump(1);
                Ok(Token::LeftParen)
            }
            ')' => {
                self.bump(1);
                Ok(Token::RightParen)
            }
            '{' => {
                self.bump(1);
                Ok(Token::LeftBrace)
            }
            '}' => {
                self.bump(1);
                Ok(Token::RightBrace)
            }
            '[' => {
                self.bump(1);
                Ok(Token::LeftBracket)
            }
            ']' => {
                self.bump(1);
                Ok(Token::RightBracket)
            }
            '=' => {
                self.bump(1);
                Ok(Token::Equal)
            }
            '!' => {
                if self.rest[1..].starts_with('=') {
                    self.bump(2);
                    Ok(Token::NotEqual)
                } else {
                    Err(miette!(
                        "Unexpected character '{}' at position {}",
                        char,
                        self.position
                    ))
                }
            }
            '<' => {
                if self.rest[1..].starts_with('=') {
                    self.bump(2);
                    Ok(Token::LessThanEqual)
                } else {
                    self.bump(1);
                    Ok(Token::LessThan)
                }
            }
            '>' => {
                if self.rest[1..].starts_with('=') {
                    self.bump(2);
                    Ok(Token::GreaterThanEqual)
                } else {
                    self.bump(1);
                    Ok(Token::GreaterThan)
                }
            }
            '\'' => self.consume_string().map(Token::String),
            '-' => {
                let start = self.position;
                self.bump(1);
                if self.rest.starts_with(|c: char| c.is_ascii_digit()) {
                    self.consume_integer(true)
                } else {
                    Err(miette!("Unexpected character '-' at position {start}"))
                }
            }
            _ if char.is_ascii_digit() => {
                if self.rest.starts_with("0x") {
                    Ok(Token::Hex(self.consume_word()))
                } else {
                    self.consume_integer(false)
                }
            }
            _ if char.is_alphabetic() || char == '_' => {
                let word = self.consume_word();

                match Keyword::from_str(word) {
                    Ok(keyword) => Ok(Token::Keyword(keyword)),
                    Err(_) => Ok(Token::Word(word)),
                }
            }
            _ => Err(miette!(
                "Unexpected character '{}' at position {}",
                char,
                self.position
            )),
        };

        Some(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_token_eq(actual: Option<Result<Token>>, expected: Token) {
        match actual {
            Some(Ok(token)) => assert_eq!(token, expected),
            _ => panic!("Expected token {expected:?}, got {actual:?}"),
        }
    }

    #[test]
    fn test_lexer_create() {
        let mut lexer = Lexer::new("CREATE TABLE users ({autoincrement} id : int32)");

        assert_token_eq(lexer.next(), Token::Keyword(Keyword::Create));
        assert_token_eq(lexer.next(), Token::Keyword(Keyword::Table));
        assert_token_eq(lexer.next(), Token::Word("users"));
        assert_token_eq(lexer.next(), Token::LeftParen);
        assert_token_eq(lexer.next(), Token::LeftBrace);
        assert_token_eq(lexer.next(), Token::Word("autoincrement"));
        assert_token_eq(lexer.next(), Token::RightBrace);
        assert_token_eq(lexer.next(), Token::Word("id"));
        assert_token_eq(lexer.next(), Token::Colon);
        assert_token_eq(lexer.next(), Token::Word("int32"));
        assert_token_eq(lexer.next(), Token::RightParen);
        assert!(lexer.next().is_none());
    }

    #[test]
    fn test_lexer_sized_type_with_default() {
        let mut lexer = Lexer::new("login: string[32] = anonymous");

        assert_token_eq(lexer.next(), Token::Word("login"));
        assert_token_eq(lexer.next(), Token::Colon);
        assert_token_eq(lexer.next(), Token::Word("string"));
        assert_token_eq(lexer.next(), Token::LeftBracket);
        assert_token_eq(lexer.next(), Token::Integer(32));
        assert_token_eq(lexer.next(), Token::RightBracket);
        assert_token_eq(lexer.next(), Token::Equal);
        assert_token_eq(lexer.next(), Token::Word("anonymous"));
        assert!(lexer.next().is_none());
    }

    #[test]
    fn test_lexer_insert_values() {
        let mut lexer = Lexer::new("INSERT INTO users VALUES ('Alice' 0x123abc true -7)");

        assert_token_eq(lexer.next(), Token::Keyword(Keyword::Insert));
        assert_token_eq(lexer.next(), Token::Keyword(Keyword::Into));
        assert_token_eq(lexer.next(), Token::Word("users"));
        assert_token_eq(lexer.next(), Token::Keyword(Keyword::Values));
        assert_token_eq(lexer.next(), Token::LeftParen);
        assert_token_eq(lexer.next(), Token::String("Alice"));
        assert_token_eq(lexer.next(), Token::Hex("0x123abc"));
        assert_token_eq(lexer.next(), Token::Word("true"));
        assert_token_eq(lexer.next(), Token::Integer(-7));
        assert_token_eq(lexer.next(), Token::RightParen);
        assert!(lexer.next().is_none());
    }

    #[test]
    fn test_lexer_keywords_case_insensitive() {
        let mut lexer = Lexer::new("select * from users where");

        assert_token_eq(lexer.next(), Token::Keyword(Keyword::Select));
        assert_token_eq(lexer.next(), Token::Asterisk);
        assert_token_eq(lexer.next(), Token::Keyword(Keyword::From));
        assert_token_eq(lexer.next(), Token::Word("users"));
        assert_token_eq(lexer.next(), Token::Keyword(Keyword::Where));
        assert!(lexer.next().is_none());
    }

    #[test]
    fn test_lexer_comparison_operators() {
        let mut lexer = Lexer::new("= != < > <= >=");

        assert_token_eq(lexer.next(), Token::Equal);
        assert_token_eq(lexer.next(), Token::NotEqual);
        assert_token_eq(lexer.next(), Token::LessThan);
        assert_token_eq(lexer.next(), Token::GreaterThan);
        assert_token_eq(lexer.next(), Token::LessThanEqual);
        assert_token_eq(lexer.next(), Token::GreaterThanEqual);
        assert!(lexer.next().is_none());
    }

    #[test]
    fn test_lexer_unterminated_string() {
        let mut lexer = Lexer::new("'oops");
        assert!(matches!(lexer.next(), Some(Err(_))));
    }

    #[test]
    fn test_lexer_unexpected_character() {
        let mut lexer = Lexer::new("id ; name");
        assert_token_eq(lexer.next(), Token::Word("id"));
        assert!(matches!(lexer.next(), Some(Err(_))));
    }

    #[test]
    fn test_lexer_integer_out_of_range() {
        let mut lexer = Lexer::new("99999999999");
        assert!(matches!(lexer.next(), Some(Err(_))));
    }
}
