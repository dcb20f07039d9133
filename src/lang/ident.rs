// Used in both Token and Ast

use super::ast::Kind;

#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub enum Ident {
    Plain(String),
    String(String),
    Single(String),
    Double(String),
    Integer(String),
    Long(String),
}

impl Ident {
    /// Full name including the type suffix, as the lexer produced it.
    pub fn name(&self) -> &str {
        use Ident::*;
        match self {
            Plain(s) | String(s) | Single(s) | Double(s) | Integer(s) | Long(s) => s,
        }
    }

    /// The kind fixed by the suffix, if any.
    pub fn kind(&self) -> Option<Kind> {
        use Ident::*;
        match self {
            Plain(_) => None,
            String(_) => Some(Kind::String),
            Single(_) => Some(Kind::Single),
            Double(_) => Some(Kind::Double),
            Integer(_) => Some(Kind::Integer),
            Long(_) => Some(Kind::Long),
        }
    }
}

impl std::fmt::Display for Ident {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
