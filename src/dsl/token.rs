//! Token types for the city DSL scanner.

use std::fmt;

/// A token produced by the scanner.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub line: usize,
    pub col: usize,
}

impl Token {
    /// String literal contents without the surrounding quotes.
    pub fn unquoted(&self) -> &str {
        self.lexeme
            .strip_prefix('"')
            .and_then(|s| s.strip_suffix('"'))
            .unwrap_or(&self.lexeme)
    }
}

/// The kind of token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Literals
    Integer,
    Double,
    Str,
    Ident,

    // Element keywords
    City,
    Street,
    Institution,
    Square,
    Statue,
    Lake,

    // Primitive keywords
    Block,
    Bend,
    Line,
    Point,
    Circle,
    Address,
    Events,

    // Control flow
    If,
    Else,

    // Declarations
    DeclString,
    DeclInt,
    DeclDouble,
    DeclCoord,

    // Coordinate projections
    Fst,
    Snd,

    // Delimiters
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
    Assign,

    // Operators
    Plus,
    Minus,
    EqEq,
    NotEq,
    Less,
    Greater,

    // Special
    Eof,
    Skip,
}

impl TokenKind {
    /// Every keyword spelling paired with its kind.
    pub const KEYWORDS: &'static [(&'static str, TokenKind)] = &[
        ("city", TokenKind::City),
        ("street", TokenKind::Street),
        ("institution", TokenKind::Institution),
        ("square", TokenKind::Square),
        ("statue", TokenKind::Statue),
        ("lake", TokenKind::Lake),
        ("block", TokenKind::Block),
        ("bend", TokenKind::Bend),
        ("line", TokenKind::Line),
        ("point", TokenKind::Point),
        ("circle", TokenKind::Circle),
        ("address", TokenKind::Address),
        ("events", TokenKind::Events),
        ("if", TokenKind::If),
        ("else", TokenKind::Else),
        ("string", TokenKind::DeclString),
        ("int", TokenKind::DeclInt),
        ("double", TokenKind::DeclDouble),
        ("coordinate", TokenKind::DeclCoord),
        ("fst", TokenKind::Fst),
        ("snd", TokenKind::Snd),
    ];

    /// Short lowercase name used in token dumps.
    pub fn name(self) -> &'static str {
        match self {
            TokenKind::Integer => "int",
            TokenKind::Double => "double",
            TokenKind::Str => "string",
            TokenKind::Ident => "variable",
            TokenKind::City => "city",
            TokenKind::Street => "street",
            TokenKind::Institution => "institution",
            TokenKind::Square => "square",
            TokenKind::Statue => "statue",
            TokenKind::Lake => "lake",
            TokenKind::Block => "block",
            TokenKind::Bend => "bend",
            TokenKind::Line => "line",
            TokenKind::Point => "point",
            TokenKind::Circle => "circle",
            TokenKind::Address => "address",
            TokenKind::Events => "events",
            TokenKind::If => "if",
            TokenKind::Else => "else",
            TokenKind::DeclString => "stringVar",
            TokenKind::DeclInt => "intVar",
            TokenKind::DeclDouble => "doubleVar",
            TokenKind::DeclCoord => "coordinateVar",
            TokenKind::Fst => "first",
            TokenKind::Snd => "second",
            TokenKind::LParen => "lparen",
            TokenKind::RParen => "rparen",
            TokenKind::LBracket => "lsparen",
            TokenKind::RBracket => "rsparen",
            TokenKind::LBrace => "lcparen",
            TokenKind::RBrace => "rcparen",
            TokenKind::Comma => "comma",
            TokenKind::Assign => "assign",
            TokenKind::Plus => "plus",
            TokenKind::Minus => "minus",
            TokenKind::EqEq => "equals",
            TokenKind::NotEq => "notequal",
            TokenKind::Less => "smaller",
            TokenKind::Greater => "bigger",
            TokenKind::Eof => "eof",
            TokenKind::Skip => "skip",
        }
    }

    /// How the kind reads in a script, quoted when it has a fixed spelling.
    pub fn describe(self) -> &'static str {
        match self {
            TokenKind::Integer => "integer",
            TokenKind::Double => "decimal number",
            TokenKind::Str => "string literal",
            TokenKind::Ident => "identifier",
            TokenKind::City => "'city'",
            TokenKind::Street => "'street'",
            TokenKind::Institution => "'institution'",
            TokenKind::Square => "'square'",
            TokenKind::Statue => "'statue'",
            TokenKind::Lake => "'lake'",
            TokenKind::Block => "'block'",
            TokenKind::Bend => "'bend'",
            TokenKind::Line => "'line'",
            TokenKind::Point => "'point'",
            TokenKind::Circle => "'circle'",
            TokenKind::Address => "'address'",
            TokenKind::Events => "'events'",
            TokenKind::If => "'if'",
            TokenKind::Else => "'else'",
            TokenKind::DeclString => "'string'",
            TokenKind::DeclInt => "'int'",
            TokenKind::DeclDouble => "'double'",
            TokenKind::DeclCoord => "'coordinate'",
            TokenKind::Fst => "'fst'",
            TokenKind::Snd => "'snd'",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::LBracket => "'['",
            TokenKind::RBracket => "']'",
            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
            TokenKind::Comma => "','",
            TokenKind::Assign => "'='",
            TokenKind::Plus => "'+'",
            TokenKind::Minus => "'-'",
            TokenKind::EqEq => "'=='",
            TokenKind::NotEq => "'!='",
            TokenKind::Less => "'<'",
            TokenKind::Greater => "'>'",
            TokenKind::Eof => "end of input",
            TokenKind::Skip => "whitespace",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unquoted_strips_quotes() {
        let token = Token {
            kind: TokenKind::Str,
            lexeme: "\"Main Square\"".to_string(),
            line: 1,
            col: 1,
        };
        assert_eq!(token.unquoted(), "Main Square");
    }

    #[test]
    fn unquoted_leaves_plain_lexeme() {
        let token = Token {
            kind: TokenKind::Ident,
            lexeme: "x1".to_string(),
            line: 1,
            col: 1,
        };
        assert_eq!(token.unquoted(), "x1");
    }

    #[test]
    fn describe_uses_script_spelling() {
        assert_eq!(TokenKind::LBrace.describe(), "'{'");
        assert_eq!(TokenKind::NotEq.describe(), "'!='");
        assert_eq!(TokenKind::DeclCoord.describe(), "'coordinate'");
        assert_eq!(TokenKind::Eof.describe(), "end of input");
        for (spelling, kind) in TokenKind::KEYWORDS {
            assert_eq!(kind.describe(), format!("'{spelling}'"));
        }
    }

    #[test]
    fn keyword_spellings_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for (spelling, _) in TokenKind::KEYWORDS {
            assert!(seen.insert(*spelling), "duplicate keyword {spelling}");
        }
    }
}
