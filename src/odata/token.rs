// Filter tokens for lexical analysis

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Literals
    Identifier(String),
    Integer(String),
    Float(String),
    String(String),

    // Keywords
    And,
    Or,
    Not,
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
    True,
    False,
    Null,

    // Operators
    Minus,

    // Delimiters
    LeftParen,
    RightParen,
    Comma,

    // Special
    Eof,
}

impl Token {
    /// Convert a word to a keyword token if it matches.
    ///
    /// Keywords are lowercase only; `And` or `EQ` stay identifiers.
    pub fn keyword_from_str(s: &str) -> Option<Token> {
        match s {
            "and" => Some(Token::And),
            "or" => Some(Token::Or),
            "not" => Some(Token::Not),
            "eq" => Some(Token::Eq),
            "ne" => Some(Token::Ne),
            "gt" => Some(Token::Gt),
            "ge" => Some(Token::Ge),
            "lt" => Some(Token::Lt),
            "le" => Some(Token::Le),
            "true" => Some(Token::True),
            "false" => Some(Token::False),
            "null" => Some(Token::Null),
            _ => None,
        }
    }
}
