/// Recursive-descent parser for the component definition language.
///
/// ```text
/// file      := component*
/// component := 'component' IDENT '{' (prop (',' prop)* ','?)? '}'
/// prop      := IDENT ':' type ('as' IDENT '[' INT ']')? ('=' default)?
/// type      := 'ref' '<' IDENT '>' | 'ref' | IDENT
/// default   := 'true' | 'false' | number | '[' (number (',' number)* ','?)? ']'
/// number    := '-'? (INT | FLOAT)
/// ```
use crate::definition::{ComponentDefinition, PropDefinition};
use crate::lexer::{LexError, Lexer, SpannedToken, Token};
use crate::schema::DefaultValue;
use std::fmt;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct ParseError {
    pub line: usize,
    pub col: usize,
    pub message: String,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", self.line, self.col, self.message)
    }
}

impl std::error::Error for ParseError {}

impl From<LexError> for ParseError {
    fn from(e: LexError) -> Self {
        Self {
            line: e.line,
            col: e.col,
            message: e.message,
        }
    }
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

pub struct Parser {
    tokens: Vec<SpannedToken>,
    pos: usize,
}

impl Parser {
    /// Parse every component definition in `input`, in source order.
    pub fn parse(input: &str) -> Result<Vec<ComponentDefinition>, ParseError> {
        let mut lexer = Lexer::new(input);
        let tokens = lexer.tokenize()?;
        let mut parser = Self { tokens, pos: 0 };
        parser.parse_file()
    }

    // -- Helpers --

    fn peek(&self) -> &Token {
        &self.tokens[self.pos].token
    }

    fn current_span(&self) -> (usize, usize) {
        let t = &self.tokens[self.pos];
        (t.line, t.col)
    }

    fn advance(&mut self) -> &Token {
        let tok = &self.tokens[self.pos].token;
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn error(&self, message: String) -> ParseError {
        let (line, col) = self.current_span();
        ParseError { line, col, message }
    }

    fn expect(&mut self, expected: &Token) -> Result<(), ParseError> {
        if self.peek() == expected {
            self.advance();
            Ok(())
        } else {
            Err(self.error(format!("expected {expected}, got {}", self.peek())))
        }
    }

    fn expect_ident(&mut self) -> Result<String, ParseError> {
        match self.peek().clone() {
            Token::Ident(s) => {
                self.advance();
                Ok(s)
            }
            other => Err(self.error(format!("expected identifier, got {other}"))),
        }
    }

    fn expect_integer(&mut self) -> Result<u64, ParseError> {
        match self.peek().clone() {
            Token::Integer(n) => {
                self.advance();
                Ok(n)
            }
            other => Err(self.error(format!("expected integer, got {other}"))),
        }
    }

    fn at(&self, token: &Token) -> bool {
        self.peek() == token
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.at(token) {
            self.advance();
            true
        } else {
            false
        }
    }

    // -- Top-level --

    fn parse_file(&mut self) -> Result<Vec<ComponentDefinition>, ParseError> {
        let mut components = Vec::new();
        while !self.at(&Token::Eof) {
            components.push(self.parse_component()?);
        }
        Ok(components)
    }

    // -- Components --

    fn parse_component(&mut self) -> Result<ComponentDefinition, ParseError> {
        self.expect(&Token::Component)?;
        let name = self.expect_ident()?;
        self.expect(&Token::LBrace)?;
        let mut props = Vec::new();
        while !self.at(&Token::RBrace) {
            props.push(self.parse_prop()?);
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        self.expect(&Token::RBrace)?;
        Ok(ComponentDefinition { name, props })
    }

    fn parse_prop(&mut self) -> Result<PropDefinition, ParseError> {
        let name = self.expect_ident()?;
        self.expect(&Token::Colon)?;
        let mut prop = self.parse_type(name)?;

        if self.eat(&Token::As) {
            let storage = self.expect_ident()?;
            self.expect(&Token::LBracket)?;
            let size = self.expect_integer()?;
            let size = u32::try_from(size)
                .map_err(|_| self.error(format!("storage size {size} out of range")))?;
            self.expect(&Token::RBracket)?;
            prop = prop.with_storage(storage, size);
        }

        if self.eat(&Token::Eq) {
            prop = prop.with_default(self.parse_default()?);
        }
        Ok(prop)
    }

    // -- Types --

    fn parse_type(&mut self, name: String) -> Result<PropDefinition, ParseError> {
        if self.eat(&Token::Ref) {
            let mut prop = PropDefinition::new(name, "ref");
            if self.eat(&Token::LAngle) {
                let target = self.expect_ident()?;
                self.expect(&Token::RAngle)?;
                prop = prop.with_ref_type(target);
            }
            return Ok(prop);
        }

        let keyword = self.expect_ident()?;
        let prop = PropDefinition::new(name, keyword.as_str());
        // `node` is shorthand for `ref<node>`.
        if keyword == "node" {
            return Ok(prop.with_ref_type("node"));
        }
        Ok(prop)
    }

    // -- Defaults --

    fn parse_default(&mut self) -> Result<DefaultValue, ParseError> {
        match self.peek() {
            Token::True => {
                self.advance();
                Ok(DefaultValue::Bool(true))
            }
            Token::False => {
                self.advance();
                Ok(DefaultValue::Bool(false))
            }
            Token::LBracket => {
                self.advance();
                let mut values = Vec::new();
                while !self.at(&Token::RBracket) {
                    values.push(self.parse_number()?);
                    if !self.eat(&Token::Comma) {
                        break;
                    }
                }
                self.expect(&Token::RBracket)?;
                Ok(DefaultValue::List(values))
            }
            _ => Ok(DefaultValue::Number(self.parse_number()?)),
        }
    }

    fn parse_number(&mut self) -> Result<f64, ParseError> {
        let negative = self.eat(&Token::Minus);
        let value = match self.peek().clone() {
            Token::Integer(n) => n as f64,
            Token::Float(n) => n,
            other => return Err(self.error(format!("expected number, got {other}"))),
        };
        self.advance();
        Ok(if negative { -value } else { value })
    }
}
