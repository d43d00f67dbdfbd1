// OData query option parsing - $filter, $select and $expand

pub mod lexer;
pub mod options;
pub mod parser;
pub mod token;

pub use lexer::Lexer;
pub use options::{parse_expand, parse_select};
pub use parser::{parse_filter, Parser};
pub use token::Token;
