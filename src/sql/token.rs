/// Token types for SQL lexer

#[derive(Debug, Clone, PartialEq)]
pub enum TokenType {
    // Keywords
    Create,
    Table,
    Insert,
    Into,
    Values,
    Select,
    From,
    Where,
    Update,
    Set,
    Delete,
    Inner,
    Join,
    On,
    Primary,
    Key,
    Unique,
    Null,
    Show,
    Tables,
    Describe,
    // Reserved, no grammar production uses them yet
    And,
    Or,
    Not,
    Drop,

    // Data types
    Int,
    Text,
    Bool,

    // Operators
    Eq, // =
    Ne, // != or <>
    Lt, // <
    Gt, // >
    Le, // <=
    Ge, // >=

    // Delimiters
    LParen,    // (
    RParen,    // )
    Comma,     // ,
    Semicolon, // ;
    Dot,       // .
    Star,      // * (wildcard)

    // Literals
    Number(i64),
    String(String),
    Identifier(String),
    Boolean(bool),

    // Special
    Eof,
}

#[derive(Debug, Clone)]
pub struct Token {
    pub token_type: TokenType,
    pub line: usize,
    pub column: usize,
}

impl Token {
    pub fn new(token_type: TokenType, line: usize, column: usize) -> Self {
        Self { token_type, line, column }
    }
}

impl TokenType {
    /// Case-insensitive keyword lookup; TRUE/FALSE come back as boolean literals
    pub fn from_keyword(s: &str) -> Option<Self> {
        let token = match s.to_lowercase().as_str() {
            "create" => TokenType::Create,
            "table" => TokenType::Table,
            "insert" => TokenType::Insert,
            "into" => TokenType::Into,
            "values" => TokenType::Values,
            "select" => TokenType::Select,
            "from" => TokenType::From,
            "where" => TokenType::Where,
            "update" => TokenType::Update,
            "set" => TokenType::Set,
            "delete" => TokenType::Delete,
            "inner" => TokenType::Inner,
            "join" => TokenType::Join,
            "on" => TokenType::On,
            "primary" => TokenType::Primary,
            "key" => TokenType::Key,
            "unique" => TokenType::Unique,
            "null" => TokenType::Null,
            "show" => TokenType::Show,
            "tables" => TokenType::Tables,
            "describe" => TokenType::Describe,
            "and" => TokenType::And,
            "or" => TokenType::Or,
            "not" => TokenType::Not,
            "drop" => TokenType::Drop,
            "int" => TokenType::Int,
            "text" => TokenType::Text,
            "bool" => TokenType::Bool,
            "true" => TokenType::Boolean(true),
            "false" => TokenType::Boolean(false),
            _ => return None,
        };
        Some(token)
    }

    /// Lowercase spelling of a reserved word, so the parser can accept it
    /// where an identifier is expected
    pub fn keyword_text(&self) -> Option<&'static str> {
        let text = match self {
            TokenType::Create => "create",
            TokenType::Table => "table",
            TokenType::Insert => "insert",
            TokenType::Into => "into",
            TokenType::Values => "values",
            TokenType::Select => "select",
            TokenType::From => "from",
            TokenType::Where => "where",
            TokenType::Update => "update",
            TokenType::Set => "set",
            TokenType::Delete => "delete",
            TokenType::Inner => "inner",
            TokenType::Join => "join",
            TokenType::On => "on",
            TokenType::Primary => "primary",
            TokenType::Key => "key",
            TokenType::Unique => "unique",
            TokenType::Null => "null",
            TokenType::Show => "show",
            TokenType::Tables => "tables",
            TokenType::Describe => "describe",
            TokenType::And => "and",
            TokenType::Or => "or",
            TokenType::Not => "not",
            TokenType::Drop => "drop",
            TokenType::Int => "int",
            TokenType::Text => "text",
            TokenType::Bool => "bool",
            TokenType::Boolean(true) => "true",
            TokenType::Boolean(false) => "false",
            _ => return None,
        };
        Some(text)
    }

    /// Short human-readable form for error messages
    pub fn describe(&self) -> String {
        match self {
            TokenType::Number(n) => format!("number {}", n),
            TokenType::String(s) => format!("string '{}'", s),
            TokenType::Identifier(s) => format!("identifier '{}'", s),
            TokenType::Eq => "'='".to_string(),
            TokenType::Ne => "'<>'".to_string(),
            TokenType::Lt => "'<'".to_string(),
            TokenType::Gt => "'>'".to_string(),
            TokenType::Le => "'<='".to_string(),
            TokenType::Ge => "'>='".to_string(),
            TokenType::LParen => "'('".to_string(),
            TokenType::RParen => "')'".to_string(),
            TokenType::Comma => "','".to_string(),
            TokenType::Semicolon => "';'".to_string(),
            TokenType::Dot => "'.'".to_string(),
            TokenType::Star => "'*'".to_string(),
            TokenType::Eof => "end of input".to_string(),
            other => match other.keyword_text() {
                Some(kw) => kw.to_uppercase(),
                None => format!("{:?}", other),
            },
        }
    }
}
