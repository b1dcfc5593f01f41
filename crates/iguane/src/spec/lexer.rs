//! Tokenizer for the legacy GPU record format.
//!
//! Produces a flat token stream with 1-based line numbers. Comments run
//! from an unquoted `#` to end of line and never reach the parser.

use crate::error::IguaneError;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TokenKind {
    Ident(String),
    Number(f64),
    Str(String),
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Equals,
    Eof,
}

impl TokenKind {
    pub(crate) fn describe(&self) -> String {
        match self {
            Self::Ident(s) => format!("identifier '{s}'"),
            Self::Number(n) => format!("number {n}"),
            Self::Str(s) => format!("string {s:?}"),
            Self::LParen => "'('".to_string(),
            Self::RParen => "')'".to_string(),
            Self::LBracket => "'['".to_string(),
            Self::RBracket => "']'".to_string(),
            Self::Comma => "','".to_string(),
            Self::Equals => "'='".to_string(),
            Self::Eof => "end of input".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Token {
    pub kind: TokenKind,
    pub line: usize,
}

struct Lexer<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    line: usize,
    tokens: Vec<Token>,
}

/// Split `src` into tokens. Always ends with [`TokenKind::Eof`].
pub(crate) fn tokenize(src: &str) -> Result<Vec<Token>, IguaneError> {
    let mut lexer = Lexer {
        chars: src.chars().peekable(),
        line: 1,
        tokens: Vec::new(),
    };
    lexer.run()?;
    Ok(lexer.tokens)
}

impl Lexer<'_> {
    fn run(&mut self) -> Result<(), IguaneError> {
        while let Some(&c) = self.chars.peek() {
            match c {
                '\n' => {
                    self.chars.next();
                    self.line += 1;
                }
                c if c.is_whitespace() => {
                    self.chars.next();
                }
                '#' => self.skip_comment(),
                '(' => self.single(TokenKind::LParen),
                ')' => self.single(TokenKind::RParen),
                '[' => self.single(TokenKind::LBracket),
                ']' => self.single(TokenKind::RBracket),
                ',' => self.single(TokenKind::Comma),
                '=' => self.single(TokenKind::Equals),
                '"' | '\'' => self.string(c)?,
                c if c.is_ascii_digit() || matches!(c, '.' | '-' | '+') => self.number()?,
                c if c.is_alphabetic() || c == '_' => self.ident(),
                other => {
                    return Err(IguaneError::parse(
                        self.line,
                        format!("unexpected character '{other}'"),
                    ));
                }
            }
        }
        self.push(TokenKind::Eof);
        Ok(())
    }

    fn push(&mut self, kind: TokenKind) {
        self.tokens.push(Token {
            kind,
            line: self.line,
        });
    }

    fn single(&mut self, kind: TokenKind) {
        self.chars.next();
        self.push(kind);
    }

    fn skip_comment(&mut self) {
        while let Some(&c) = self.chars.peek() {
            if c == '\n' {
                break;
            }
            self.chars.next();
        }
    }

    /// A quoted string. A backslash before a newline continues the string
    /// on the next line and contributes nothing to the value.
    fn string(&mut self, quote: char) -> Result<(), IguaneError> {
        self.chars.next();
        let start = self.line;
        let mut value = String::new();
        loop {
            match self.chars.next() {
                Some(c) if c == quote => break,
                Some('\\') => match self.chars.next() {
                    Some('n') => value.push('\n'),
                    Some('t') => value.push('\t'),
                    Some('\n') => self.line += 1,
                    Some(c @ ('\\' | '\'' | '"' | '#')) => value.push(c),
                    Some(other) => {
                        value.push('\\');
                        value.push(other);
                    }
                    None => {
                        return Err(IguaneError::parse(self.line, "unterminated string"));
                    }
                },
                Some('\n') | None => {
                    return Err(IguaneError::parse(self.line, "unterminated string"));
                }
                Some(c) => value.push(c),
            }
        }
        self.tokens.push(Token {
            kind: TokenKind::Str(value),
            line: start,
        });
        Ok(())
    }

    fn number(&mut self) -> Result<(), IguaneError> {
        let mut text = String::new();
        if let Some(&sign @ ('-' | '+')) = self.chars.peek() {
            text.push(sign);
            self.chars.next();
        }
        while let Some(&c) = self.chars.peek() {
            let exponent_sign =
                matches!(c, '-' | '+') && text.ends_with(|p: char| p == 'e' || p == 'E');
            if c.is_ascii_digit() || matches!(c, '.' | '_' | 'e' | 'E') || exponent_sign {
                text.push(c);
                self.chars.next();
            } else {
                break;
            }
        }
        let value: f64 = text
            .replace('_', "")
            .parse()
            .map_err(|_| IguaneError::parse(self.line, format!("invalid number '{text}'")))?;
        self.push(TokenKind::Number(value));
        Ok(())
    }

    fn ident(&mut self) {
        let mut text = String::new();
        while let Some(&c) = self.chars.peek() {
            if c.is_alphanumeric() || c == '_' {
                text.push(c);
                self.chars.next();
            } else {
                break;
            }
        }
        self.push(TokenKind::Ident(text));
    }
}
