/// Lexer for the component definition language.
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Keywords
    Component,
    Ref,
    As,
    True,
    False,

    // Literals
    Ident(String),
    Integer(u64),
    Float(f64),

    // Punctuation
    Colon,
    Comma,
    Eq,
    Minus,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    LAngle,
    RAngle,

    // Special
    Eof,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Component => write!(f, "component"),
            Token::Ref => write!(f, "ref"),
            Token::As => write!(f, "as"),
            Token::True => write!(f, "true"),
            Token::False => write!(f, "false"),
            Token::Ident(s) => write!(f, "{s}"),
            Token::Integer(n) => write!(f, "{n}"),
            Token::Float(n) => write!(f, "{n}"),
            Token::Colon => write!(f, ":"),
            Token::Comma => write!(f, ","),
            Token::Eq => write!(f, "="),
            Token::Minus => write!(f, "-"),
            Token::LBrace => write!(f, "{{"),
            Token::RBrace => write!(f, "}}"),
            Token::LBracket => write!(f, "["),
            Token::RBracket => write!(f, "]"),
            Token::LAngle => write!(f, "<"),
            Token::RAngle => write!(f, ">"),
            Token::Eof => write!(f, "EOF"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SpannedToken {
    pub token: Token,
    pub line: usize,
    pub col: usize,
}

pub struct Lexer<'a> {
    input: &'a [u8],
    pos: usize,
    line: usize,
    col: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input: input.as_bytes(),
            pos: 0,
            line: 1,
            col: 1,
        }
    }

    pub fn tokenize(&mut self) -> Result<Vec<SpannedToken>, LexError> {
        let mut tokens = Vec::new();
        loop {
            let tok = self.next_token()?;
            let is_eof = tok.token == Token::Eof;
            tokens.push(tok);
            if is_eof {
                break;
            }
        }
        Ok(tokens)
    }

    fn peek_byte(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn peek_byte_at(&self, offset: usize) -> Option<u8> {
        self.input.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let b = self.input.get(self.pos).copied()?;
        self.pos += 1;
        if b == b'\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(b)
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            while let Some(b) = self.peek_byte() {
                if b.is_ascii_whitespace() {
                    self.advance();
                } else {
                    break;
                }
            }

            // Line comments
            if self.peek_byte() == Some(b'/') && self.peek_byte_at(1) == Some(b'/') {
                while let Some(b) = self.advance() {
                    if b == b'\n' {
                        break;
                    }
                }
                continue;
            }

            // Block comments
            if self.peek_byte() == Some(b'/') && self.peek_byte_at(1) == Some(b'*') {
                self.advance();
                self.advance();
                loop {
                    match self.advance() {
                        None => break,
                        Some(b'*') if self.peek_byte() == Some(b'/') => {
                            self.advance();
                            break;
                        }
                        _ => {}
                    }
                }
                continue;
            }

            break;
        }
    }

    fn next_token(&mut self) -> Result<SpannedToken, LexError> {
        self.skip_whitespace_and_comments();

        let line = self.line;
        let col = self.col;

        let Some(b) = self.peek_byte() else {
            return Ok(SpannedToken {
                token: Token::Eof,
                line,
                col,
            });
        };

        let punct = match b {
            b':' => Some(Token::Colon),
            b',' => Some(Token::Comma),
            b'=' => Some(Token::Eq),
            b'-' => Some(Token::Minus),
            b'{' => Some(Token::LBrace),
            b'}' => Some(Token::RBrace),
            b'[' => Some(Token::LBracket),
            b']' => Some(Token::RBracket),
            b'<' => Some(Token::LAngle),
            b'>' => Some(Token::RAngle),
            _ => None,
        };

        if let Some(token) = punct {
            self.advance();
            return Ok(SpannedToken { token, line, col });
        }

        if b.is_ascii_digit() {
            return self.lex_number(line, col);
        }

        if b.is_ascii_alphabetic() || b == b'_' {
            let start = self.pos;
            while let Some(c) = self.peek_byte() {
                if c.is_ascii_alphanumeric() || c == b'_' {
                    self.advance();
                } else {
                    break;
                }
            }
            // Identifier bytes are ASCII by construction.
            let word = String::from_utf8_lossy(&self.input[start..self.pos]);
            let token = match word.as_ref() {
                "component" => Token::Component,
                "ref" => Token::Ref,
                "as" => Token::As,
                "true" => Token::True,
                "false" => Token::False,
                other => Token::Ident(other.to_string()),
            };
            return Ok(SpannedToken { token, line, col });
        }

        Err(LexError {
            line,
            col,
            message: format!("unexpected character: '{}'", b as char),
        })
    }

    fn lex_number(&mut self, line: usize, col: usize) -> Result<SpannedToken, LexError> {
        let start = self.pos;
        while self.peek_byte().is_some_and(|d| d.is_ascii_digit()) {
            self.advance();
        }
        let is_float = self.peek_byte() == Some(b'.')
            && self.peek_byte_at(1).is_some_and(|d| d.is_ascii_digit());
        if is_float {
            self.advance();
            while self.peek_byte().is_some_and(|d| d.is_ascii_digit()) {
                self.advance();
            }
        }

        let text = String::from_utf8_lossy(&self.input[start..self.pos]);
        let token = if is_float {
            text.parse().map(Token::Float).ok()
        } else {
            text.parse().map(Token::Integer).ok()
        };
        token
            .map(|token| SpannedToken { token, line, col })
            .ok_or_else(|| LexError {
                line,
                col,
                message: format!("invalid number: {text}"),
            })
    }
}

#[derive(Debug, Clone)]
pub struct LexError {
    pub line: usize,
    pub col: usize,
    pub message: String,
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", self.line, self.col, self.message)
    }
}

impl std::error::Error for LexError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &str) -> Vec<Token> {
        Lexer::new(input)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| t.token)
            .collect()
    }

    #[test]
    fn test_basic_tokens() {
        let toks = tokens("component health { hp: i32 }");
        assert_eq!(toks[0], Token::Component);
        assert!(matches!(toks[1], Token::Ident(ref s) if s == "health"));
        assert_eq!(toks[2], Token::LBrace);
        assert_eq!(toks[4], Token::Colon);
        assert_eq!(toks.last(), Some(&Token::Eof));
    }

    #[test]
    fn test_comments() {
        let toks = tokens("// line comment\ncomponent /* block */ foo {}");
        assert_eq!(toks[0], Token::Component);
        assert!(matches!(toks[1], Token::Ident(ref s) if s == "foo"));
    }

    #[test]
    fn test_numbers() {
        let toks = tokens("= [0, -1.5, 42]");
        assert_eq!(
            toks,
            vec![
                Token::Eq,
                Token::LBracket,
                Token::Integer(0),
                Token::Comma,
                Token::Minus,
                Token::Float(1.5),
                Token::Comma,
                Token::Integer(42),
                Token::RBracket,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_ref_type() {
        let toks = tokens("target: ref<node>");
        assert_eq!(toks[2], Token::Ref);
        assert_eq!(toks[3], Token::LAngle);
        assert!(matches!(toks[4], Token::Ident(ref s) if s == "node"));
        assert_eq!(toks[5], Token::RAngle);
    }

    #[test]
    fn test_spans() {
        let toks = Lexer::new("component\n  foo").tokenize().unwrap();
        assert_eq!((toks[1].line, toks[1].col), (2, 3));
    }

    #[test]
    fn test_unexpected_character() {
        let err = Lexer::new("component $").tokenize().unwrap_err();
        assert_eq!((err.line, err.col), (1, 11));
    }
}
