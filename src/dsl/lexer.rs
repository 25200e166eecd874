//! Scanner for the city DSL.
//!
//! Drives a [`Dfa`] over a byte stream with maximal munch: the automaton is
//! fed codes until a transition dies, the last live state decides the token,
//! and the code that killed the transition is kept as the first code of the
//! next token.

use std::iter::Fuse;

use super::automaton::{CityAutomaton, Code, Dfa, ERROR_STATE};
use super::error::CompileError;
use super::token::{Token, TokenKind};

pub struct Scanner<'a, I: Iterator<Item = u8>> {
    dfa: &'a dyn Dfa,
    input: Fuse<I>,
    pending: Option<Code>,
    line: usize,
    col: usize,
}

impl<I: Iterator<Item = u8>> Scanner<'static, I> {
    /// Scan `input` with the city automaton.
    pub fn new(input: I) -> Self {
        Scanner::with_automaton(CityAutomaton::shared(), input)
    }
}

impl<'a, I: Iterator<Item = u8>> Scanner<'a, I> {
    pub fn with_automaton(dfa: &'a dyn Dfa, input: I) -> Self {
        Self {
            dfa,
            input: input.fuse(),
            pending: None,
            line: 1,
            col: 1,
        }
    }

    /// Produce the next non-whitespace token.
    ///
    /// After the `Eof` token has been returned the scanner must not be polled again.
    pub fn next_token(&mut self) -> Result<Token, CompileError> {
        loop {
            let line = self.line;
            let col = self.col;
            let mut lexeme = Vec::new();
            let mut state = self.dfa.start();
            let mut code = self.read_code();

            loop {
                let next = self.dfa.next(state, code);
                if next == ERROR_STATE {
                    self.pending = Some(code);
                    break;
                }
                state = next;
                match code {
                    Code::Byte(b) => {
                        self.advance_position(b);
                        lexeme.push(b);
                        code = self.read_code();
                    }
                    Code::End => break,
                }
            }

            match self.dfa.symbol(state) {
                Some(TokenKind::Skip) => continue,
                Some(kind) => {
                    return Ok(Token {
                        kind,
                        lexeme: String::from_utf8_lossy(&lexeme).into_owned(),
                        line,
                        col,
                    });
                }
                None => return Err(self.invalid_pattern(&lexeme)),
            }
        }
    }

    /// Scan the whole input, including the trailing `Eof` token.
    pub fn tokenize(&mut self) -> Result<Vec<Token>, CompileError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }

    fn read_code(&mut self) -> Code {
        self.pending
            .take()
            .unwrap_or_else(|| self.input.next().map_or(Code::End, Code::Byte))
    }

    fn advance_position(&mut self, byte: u8) {
        if byte == b'\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
    }

    fn invalid_pattern(&self, lexeme: &[u8]) -> CompileError {
        let found = match self.pending {
            Some(Code::Byte(b)) => format!("'{}'", (b as char).escape_default()),
            Some(Code::End) | None => "end of input".to_string(),
        };
        let message = if lexeme.is_empty() {
            format!("unexpected {found}")
        } else {
            format!(
                "invalid pattern '{}' before {found}",
                String::from_utf8_lossy(lexeme)
            )
        };
        CompileError::lex(message, self.line, self.col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsl::error::ErrorKind;

    fn kinds(src: &str) -> Vec<TokenKind> {
        Scanner::new(src.bytes())
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn lex_each_keyword_alone() {
        for &(word, kind) in TokenKind::KEYWORDS {
            assert_eq!(kinds(word), vec![kind, TokenKind::Eof], "keyword {word}");
        }
    }

    #[test]
    fn lex_keyword_with_extra_letter_is_identifier() {
        for &(word, _) in TokenKind::KEYWORDS {
            let src = format!("{word}s");
            let tokens = Scanner::new(src.bytes()).tokenize().unwrap();
            assert_eq!(tokens.len(), 2, "{src}");
            assert_eq!(tokens[0].kind, TokenKind::Ident);
            assert_eq!(tokens[0].lexeme, src);
        }
    }

    #[test]
    fn lex_integer_then_fraction_is_one_double() {
        let tokens = Scanner::new("15.646".bytes()).tokenize().unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Double);
        assert_eq!(tokens[0].lexeme, "15.646");
        assert_eq!(tokens[1].kind, TokenKind::Eof);
    }

    #[test]
    fn lex_dangling_dot_is_error() {
        let err = Scanner::new("5.".bytes()).tokenize().unwrap_err();
        assert_eq!(err.kind, ErrorKind::Lex);
        assert_eq!((err.line, err.col), (1, 3));
    }

    #[test]
    fn lex_whitespace_is_skipped_and_positions_hold() {
        let tokens = Scanner::new("city  \"A\"\n\t{\r\n}".bytes())
            .tokenize()
            .unwrap();
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::City,
                TokenKind::Str,
                TokenKind::LBrace,
                TokenKind::RBrace,
                TokenKind::Eof
            ]
        );
        assert_eq!((tokens[0].line, tokens[0].col), (1, 1));
        assert_eq!((tokens[1].line, tokens[1].col), (1, 7));
        assert_eq!((tokens[2].line, tokens[2].col), (2, 2));
        assert_eq!((tokens[3].line, tokens[3].col), (3, 1));
    }

    #[test]
    fn lex_lookahead_is_reused() {
        // `x+` dies on '+', which must start the next token.
        assert_eq!(
            kinds("x+1-y2"),
            vec![
                TokenKind::Ident,
                TokenKind::Plus,
                TokenKind::Integer,
                TokenKind::Minus,
                TokenKind::Ident,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn lex_comparisons() {
        assert_eq!(
            kinds("== != < > ="),
            vec![
                TokenKind::EqEq,
                TokenKind::NotEq,
                TokenKind::Less,
                TokenKind::Greater,
                TokenKind::Assign,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn lex_string_keeps_quotes() {
        let tokens = Scanner::new("\"Glavni trg 1, Maribor.\"".bytes())
            .tokenize()
            .unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Str);
        assert_eq!(tokens[0].lexeme, "\"Glavni trg 1, Maribor.\"");
        assert_eq!(tokens[0].unquoted(), "Glavni trg 1, Maribor.");
    }

    #[test]
    fn lex_unclosed_string_is_error() {
        let err = Scanner::new("\"open".bytes()).tokenize().unwrap_err();
        assert_eq!(err.kind, ErrorKind::Lex);
    }

    #[test]
    fn lex_unexpected_character_reports_position() {
        let err = Scanner::new("city\n  @".bytes()).tokenize().unwrap_err();
        assert_eq!(err.kind, ErrorKind::Lex);
        assert_eq!((err.line, err.col), (2, 3));
        assert!(err.message.contains('@'));
    }

    #[test]
    fn lex_digit_then_letter_splits() {
        assert_eq!(
            kinds("12ab"),
            vec![TokenKind::Integer, TokenKind::Ident, TokenKind::Eof]
        );
    }

    #[test]
    fn lex_empty_input() {
        assert_eq!(kinds(""), vec![TokenKind::Eof]);
        assert_eq!(kinds(" \n\t "), vec![TokenKind::Eof]);
    }

    #[test]
    fn lex_brackets() {
        assert_eq!(
            kinds("[]"),
            vec![TokenKind::LBracket, TokenKind::RBracket, TokenKind::Eof]
        );
    }
}
