use std::{iter::Peekable, str::FromStr};

use miette::{Result, miette};

use crate::{
    core::types::DataType,
    query::{
        ast::{
            ColumnSpec, Comparison, CreateStatement, InsertStatement, Predicate, Projection,
            SelectStatement, Statement, ValueToken,
        },
        keyword::Keyword,
        lexer::{Lexer, Token},
    },
};

/// Parser turning a query line into a [`Statement`].
///
/// Uses recursive descent over a peekable token stream.
pub(crate) struct Parser<'src> {
    lexer: Peekable<Lexer<'src>>,
}

impl<'src> Parser<'src> {
    pub fn new(query: &'src str) -> Self {
        Self {
            lexer: Lexer::new(query).peekable(),
        }
    }

    /// Parses the query and returns the top-level AST node.
    pub fn parse(&mut self) -> Result<Statement<'src>> {
        let statement = match self.peek_token()? {
            Token::Keyword(Keyword::Create) => self.parse_create()?,
            Token::Keyword(Keyword::Insert) => self.parse_insert()?,
            Token::Keyword(Keyword::Select) => self.parse_select()?,
            token => return Err(miette!("unsupported statement: {token:?}")),
        };

        if let Some(token) = self.lexer.next() {
            return Err(miette!("unexpected trailing input: {:?}", token?));
        }

        Ok(statement)
    }

    fn parse_create(&mut self) -> Result<Statement<'src>> {
        self.expect_keyword(Keyword::Create)?;
        self.expect_keyword(Keyword::Table)?;

        let table_name = self.expect_word()?;

        self.expect_token(Token::LeftParen)?;

        let mut columns = Vec::new();
        while !self.peek_is(Token::RightParen) {
            columns.push(self.parse_column_spec()?);
            self.consume_if(Token::Comma);
        }

        self.expect_token(Token::RightParen)?;

        Ok(Statement::Create(CreateStatement {
            table_name,
            columns,
        }))
    }

    /// Parses one `{attrs}? name : type[size]? (= default)?` definition.
    fn parse_column_spec(&mut self) -> Result<ColumnSpec<'src>> {
        let mut autoincrement = false;
        let mut unique = false;

        if self.consume_if(Token::LeftBrace) {
            // Attribute blob; only these two words carry meaning,
            // anything else is ignored.
            while !self.peek_is(Token::RightBrace) {
                match self.expect_word()? {
                    "autoincrement" => autoincrement = true,
                    "unique" => unique = true,
                    _ => {}
                }
            }
            self.expect_token(Token::RightBrace)?;
        }

        let name = self.expect_word()?;
        self.expect_token(Token::Colon)?;

        let type_name = self.expect_word()?;
        let data_type = DataType::from_str(type_name)
            .map_err(|_| miette!("unknown column type: {type_name}"))?;

        let max_len = if self.consume_if(Token::LeftBracket) {
            if !matches!(data_type, DataType::String | DataType::Bytes) {
                return Err(miette!(
                    "a length only applies to string and bytes columns, not {data_type}"
                ));
            }
            let len = self.expect_integer()?;
            let len = usize::try_from(len)
                .map_err(|_| miette!("column length must not be negative: {len}"))?;
            self.expect_token(Token::RightBracket)?;
            Some(len)
        } else {
            None
        };

        let default = if self.consume_if(Token::Equal) {
            let token = self.expect_value_token()?;
            let value = token
                .parse_as(data_type)
                .map_err(|e| miette!("invalid default for {data_type} column '{name}': {e}"))?;
            Some(value)
        } else {
            None
        };

        Ok(ColumnSpec {
            name,
            data_type,
            max_len,
            autoincrement,
            unique,
            default,
        })
    }

    fn parse_insert(&mut self) -> Result<Statement<'src>> {
        self.expect_keyword(Keyword::Insert)?;
        self.expect_keyword(Keyword::Into)?;

        let table_name = self.expect_word()?;

        self.expect_keyword(Keyword::Values)?;
        self.expect_token(Token::LeftParen)?;

        let mut values = Vec::new();
        while !self.peek_is(Token::RightParen) {
            values.push(self.expect_value_token()?);
        }

        self.expect_token(Token::RightParen)?;

        Ok(Statement::Insert(InsertStatement { table_name, values }))
    }

    fn parse_select(&mut self) -> Result<Statement<'src>> {
        self.expect_keyword(Keyword::Select)?;

        let projection = if self.consume_if(Token::Asterisk) {
            Projection::All
        } else {
            let mut columns = vec![self.expect_word()?];
            while self.consume_if(Token::Comma) {
                columns.push(self.expect_word()?);
            }
            Projection::Columns(columns)
        };

        self.expect_keyword(Keyword::From)?;
        let table_name = self.expect_word()?;

        let predicate = if self.consume_if(Token::Keyword(Keyword::Where)) {
            let column = self.expect_word()?;
            let op = match self.next_token()? {
                Token::Equal => Comparison::Equal,
                Token::NotEqual => Comparison::NotEqual,
                Token::LessThan => Comparison::LessThan,
                Token::GreaterThan => Comparison::GreaterThan,
                Token::LessThanEqual => Comparison::LessThanEqual,
                Token::GreaterThanEqual => Comparison::GreaterThanEqual,
                token => return Err(miette!("expected a comparison operator, found {token:?}")),
            };
            let value = self.expect_value_token()?;

            Some(Predicate { column, op, value })
        } else {
            None
        };

        Ok(Statement::Select(SelectStatement {
            projection,
            table_name,
            predicate,
        }))
    }

    fn next_token(&mut self) -> Result<Token<'src>> {
        self.lexer
            .next()
            .transpose()?
            .ok_or_else(|| miette!("Unexpected end of input"))
    }

    fn peek_token(&mut self) -> Result<&Token<'src>> {
        match self.lexer.peek() {
            Some(Ok(token)) => Ok(token),
            Some(Err(_)) => Err(miette!("Lexer error occurred")),
            None => Err(miette!("Unexpected end of input")),
        }
    }

    fn peek_is(&mut self, expected: Token) -> bool {
        matches!(self.lexer.peek(), Some(Ok(token)) if *token == expected)
    }

    fn consume_if(&mut self, expected: Token) -> bool {
        if self.peek_is(expected) {
            self.lexer.next();
            true
        } else {
            false
        }
    }

    fn expect_token(&mut self, expected: Token) -> Result<()> {
        let token = self.next_token()?;
        if token == expected {
            Ok(())
        } else {
            Err(miette!("Expected {expected:?}, found {token:?}"))
        }
    }

    fn expect_keyword(&mut self, expected: Keyword) -> Result<()> {
        match self.next_token()? {
            Token::Keyword(keyword) if keyword == expected => Ok(()),
            token => Err(miette!("Expected {expected:?}, found {token:?}")),
        }
    }

    fn expect_word(&mut self) -> Result<&'src str> {
        match self.next_token()? {
            Token::Word(word) => Ok(word),
            token => Err(miette!("Expected an identifier, found {token:?}")),
        }
    }

    fn expect_integer(&mut self) -> Result<i32> {
        match self.next_token()? {
            Token::Integer(number) => Ok(number),
            token => Err(miette!("Expected an integer, found {token:?}")),
        }
    }

    fn expect_value_token(&mut self) -> Result<ValueToken<'src>> {
        match self.next_token()? {
            Token::Word(word) => Ok(ValueToken::Word(word)),
            Token::Integer(number) => Ok(ValueToken::Integer(number)),
            Token::String(text) => Ok(ValueToken::Quoted(text)),
            Token::Hex(hex) => Ok(ValueToken::Hex(hex)),
            token => Err(miette!("Expected a value, found {token:?}")),
        }
    }
}
