/// SQL Lexer - converts SQL string into tokens

use super::token::{Token, TokenType};
use crate::error::{QuillError, Result};

pub struct Lexer {
    input: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
        }
    }

    /// Tokenize the whole input; the last token is always `Eof`
    pub fn tokenize(&mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();

        loop {
            let token = self.next_token()?;
            let is_eof = matches!(token.token_type, TokenType::Eof);
            tokens.push(token);
            if is_eof {
                break;
            }
        }

        Ok(tokens)
    }

    pub fn next_token(&mut self) -> Result<Token> {
        loop {
            self.skip_whitespace();
            if self.current_char() == '-' && self.peek_char() == Some('-') {
                self.skip_line_comment();
            } else {
                break;
            }
        }

        let line = self.line;
        let column = self.column;

        if self.is_eof() {
            return Ok(Token::new(TokenType::Eof, line, column));
        }

        let ch = self.current_char();

        let token_type = match ch {
            '\'' => self.read_string(line, column)?,

            '0'..='9' => self.read_number(false, line, column)?,
            '-' if self.peek_char().is_some_and(|c| c.is_ascii_digit()) => {
                self.advance();
                self.read_number(true, line, column)?
            }

            'a'..='z' | 'A'..='Z' | '_' => self.read_identifier(),

            '=' => {
                self.advance();
                TokenType::Eq
            }
            '!' if self.peek_char() == Some('=') => {
                self.advance();
                self.advance();
                TokenType::Ne
            }
            '<' => {
                self.advance();
                match self.current_char() {
                    '=' => {
                        self.advance();
                        TokenType::Le
                    }
                    '>' => {
                        self.advance();
                        TokenType::Ne
                    }
                    _ => TokenType::Lt,
                }
            }
            '>' => {
                self.advance();
                if self.current_char() == '=' {
                    self.advance();
                    TokenType::Ge
                } else {
                    TokenType::Gt
                }
            }
            '*' => {
                self.advance();
                TokenType::Star
            }
            '(' => {
                self.advance();
                TokenType::LParen
            }
            ')' => {
                self.advance();
                TokenType::RParen
            }
            ',' => {
                self.advance();
                TokenType::Comma
            }
            ';' => {
                self.advance();
                TokenType::Semicolon
            }
            '.' => {
                self.advance();
                TokenType::Dot
            }
            _ => {
                return Err(QuillError::syntax(
                    format!("Unexpected character '{}'", ch),
                    line,
                    column,
                ));
            }
        };

        Ok(Token::new(token_type, line, column))
    }

    fn current_char(&self) -> char {
        if self.is_eof() {
            '\0'
        } else {
            self.input[self.position]
        }
    }

    fn peek_char(&self) -> Option<char> {
        self.input.get(self.position + 1).copied()
    }

    fn advance(&mut self) {
        if !self.is_eof() {
            if self.input[self.position] == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
            self.position += 1;
        }
    }

    fn is_eof(&self) -> bool {
        self.position >= self.input.len()
    }

    fn skip_whitespace(&mut self) {
        while !self.is_eof() && self.current_char().is_whitespace() {
            self.advance();
        }
    }

    fn skip_line_comment(&mut self) {
        while !self.is_eof() && self.current_char() != '\n' {
            self.advance();
        }
    }

    /// Single-quoted string; `''` is an escaped quote, newlines are kept
    fn read_string(&mut self, line: usize, column: usize) -> Result<TokenType> {
        self.advance(); // skip opening quote
        let mut value = String::new();

        loop {
            if self.is_eof() {
                return Err(QuillError::syntax("Unterminated string literal", line, column));
            }
            let ch = self.current_char();
            self.advance();
            if ch == '\'' {
                if self.current_char() == '\'' {
                    value.push('\'');
                    self.advance();
                } else {
                    break;
                }
            } else {
                value.push(ch);
            }
        }

        Ok(TokenType::String(value))
    }

    fn read_number(&mut self, negative: bool, line: usize, column: usize) -> Result<TokenType> {
        let mut value = String::new();
        if negative {
            value.push('-');
        }

        while !self.is_eof() && self.current_char().is_ascii_digit() {
            value.push(self.current_char());
            self.advance();
        }

        value
            .parse::<i64>()
            .map(TokenType::Number)
            .map_err(|_| QuillError::syntax(format!("Integer out of range: {}", value), line, column))
    }

    fn read_identifier(&mut self) -> TokenType {
        let mut value = String::new();

        while !self.is_eof() {
            let ch = self.current_char();
            if ch.is_ascii_alphanumeric() || ch == '_' {
                value.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        TokenType::from_keyword(&value).unwrap_or(TokenType::Identifier(value))
    }
}

/// Convenience wrapper: tokenize `input` in one call
pub fn tokenize(input: &str) -> Result<Vec<Token>> {
    Lexer::new(input).tokenize()
}
