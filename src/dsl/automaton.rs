//! Deterministic finite automaton driving the scanner.
//!
//! The transition table is generated once from the keyword set: keywords are
//! laid out as a trie on top of the identifier states, so every keyword prefix
//! is still an identifier and any extra letter or digit falls back into the
//! generic identifier region. No separate keyword lookup happens after
//! scanning.

use std::sync::OnceLock;

use super::token::TokenKind;

/// Index of a state in the transition table.
pub type StateId = usize;

/// The dead state. Every undefined transition leads here.
pub const ERROR_STATE: StateId = 0;

/// Number of input codes: every byte plus end-of-input.
pub const ALPHABET_SIZE: usize = 257;

const LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGITS: &[u8] = b"0123456789";
const WHITESPACE: &[u8] = b" \t\r\n";
const STRING_PUNCT: &[u8] = b" .,";

/// One input code: a byte or the end-of-input marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Code {
    Byte(u8),
    End,
}

impl Code {
    fn index(self) -> usize {
        match self {
            Code::Byte(b) => b as usize,
            Code::End => ALPHABET_SIZE - 1,
        }
    }
}

/// A deterministic automaton over [`Code`]s whose accepting states carry a token kind.
pub trait Dfa {
    fn start(&self) -> StateId;

    /// Total transition function; undefined pairs yield [`ERROR_STATE`].
    fn next(&self, state: StateId, code: Code) -> StateId;

    /// Token kind of an accepting state, `None` for non-accepting states.
    fn symbol(&self, state: StateId) -> Option<TokenKind>;

    fn is_accepting(&self, state: StateId) -> bool {
        self.symbol(state).is_some()
    }
}

/// The automaton recognizing the city DSL's tokens.
#[derive(Debug, Clone)]
pub struct CityAutomaton {
    transitions: Vec<[StateId; ALPHABET_SIZE]>,
    symbols: Vec<Option<TokenKind>>,
    start: StateId,
}

impl CityAutomaton {
    /// The process-wide automaton, built on first use.
    pub fn shared() -> &'static CityAutomaton {
        static AUTOMATON: OnceLock<CityAutomaton> = OnceLock::new();
        AUTOMATON.get_or_init(CityAutomaton::build)
    }

    fn build() -> Self {
        let mut b = TableBuilder::new();
        let start = b.add_state(None);

        // Identifiers: [a-zA-Z]+[0-9]*
        let ident_letters = b.add_state(Some(TokenKind::Ident));
        let ident_digits = b.add_state(Some(TokenKind::Ident));
        b.set_all(start, LETTERS, ident_letters);
        b.set_all(ident_letters, LETTERS, ident_letters);
        b.set_all(ident_letters, DIGITS, ident_digits);
        b.set_all(ident_digits, DIGITS, ident_digits);

        // Numbers: [0-9]+ and [0-9]+\.[0-9]+
        let int = b.add_state(Some(TokenKind::Integer));
        let fraction_start = b.add_state(None);
        let double = b.add_state(Some(TokenKind::Double));
        b.set_all(start, DIGITS, int);
        b.set_all(int, DIGITS, int);
        b.set(int, Code::Byte(b'.'), fraction_start);
        b.set_all(fraction_start, DIGITS, double);
        b.set_all(double, DIGITS, double);

        // Strings: "[a-zA-Z0-9 .,]*"
        let string_body = b.add_state(None);
        let string_end = b.add_state(Some(TokenKind::Str));
        b.set(start, Code::Byte(b'"'), string_body);
        b.set_all(string_body, LETTERS, string_body);
        b.set_all(string_body, DIGITS, string_body);
        b.set_all(string_body, STRING_PUNCT, string_body);
        b.set(string_body, Code::Byte(b'"'), string_end);

        for (byte, kind) in [
            (b'(', TokenKind::LParen),
            (b')', TokenKind::RParen),
            (b'[', TokenKind::LBracket),
            (b']', TokenKind::RBracket),
            (b'{', TokenKind::LBrace),
            (b'}', TokenKind::RBrace),
            (b',', TokenKind::Comma),
            (b'+', TokenKind::Plus),
            (b'-', TokenKind::Minus),
            (b'<', TokenKind::Less),
            (b'>', TokenKind::Greater),
        ] {
            let state = b.add_state(Some(kind));
            b.set(start, Code::Byte(byte), state);
        }

        // = and ==
        let assign = b.add_state(Some(TokenKind::Assign));
        let eq_eq = b.add_state(Some(TokenKind::EqEq));
        b.set(start, Code::Byte(b'='), assign);
        b.set(assign, Code::Byte(b'='), eq_eq);

        // !=
        let bang = b.add_state(None);
        let not_eq = b.add_state(Some(TokenKind::NotEq));
        b.set(start, Code::Byte(b'!'), bang);
        b.set(bang, Code::Byte(b'='), not_eq);

        let whitespace = b.add_state(Some(TokenKind::Skip));
        b.set_all(start, WHITESPACE, whitespace);
        b.set_all(whitespace, WHITESPACE, whitespace);

        let eof = b.add_state(Some(TokenKind::Eof));
        b.set(start, Code::End, eof);

        for &(word, kind) in TokenKind::KEYWORDS {
            b.add_keyword(start, word, kind, ident_letters, ident_digits);
        }

        CityAutomaton {
            transitions: b.transitions,
            symbols: b.symbols,
            start,
        }
    }
}

impl Dfa for CityAutomaton {
    fn start(&self) -> StateId {
        self.start
    }

    fn next(&self, state: StateId, code: Code) -> StateId {
        self.transitions
            .get(state)
            .map_or(ERROR_STATE, |row| row[code.index()])
    }

    fn symbol(&self, state: StateId) -> Option<TokenKind> {
        self.symbols.get(state).copied().flatten()
    }
}

struct TableBuilder {
    transitions: Vec<[StateId; ALPHABET_SIZE]>,
    symbols: Vec<Option<TokenKind>>,
}

impl TableBuilder {
    fn new() -> Self {
        Self {
            transitions: vec![[ERROR_STATE; ALPHABET_SIZE]],
            symbols: vec![None],
        }
    }

    fn add_state(&mut self, symbol: Option<TokenKind>) -> StateId {
        self.transitions.push([ERROR_STATE; ALPHABET_SIZE]);
        self.symbols.push(symbol);
        self.transitions.len() - 1
    }

    fn set(&mut self, from: StateId, code: Code, to: StateId) {
        self.transitions[from][code.index()] = to;
    }

    fn set_all(&mut self, from: StateId, bytes: &[u8], to: StateId) {
        for &byte in bytes {
            self.set(from, Code::Byte(byte), to);
        }
    }

    /// Thread `word` through the trie hanging off `start`, creating nodes that
    /// behave like identifier states for every letter or digit not on a
    /// keyword path.
    fn add_keyword(
        &mut self,
        start: StateId,
        word: &str,
        kind: TokenKind,
        ident_letters: StateId,
        ident_digits: StateId,
    ) {
        let mut state = start;
        for byte in word.bytes() {
            let existing = self.transitions[state][byte as usize];
            state = if existing != ERROR_STATE && existing != ident_letters {
                existing
            } else {
                let node = self.add_state(Some(TokenKind::Ident));
                self.set_all(node, LETTERS, ident_letters);
                self.set_all(node, DIGITS, ident_digits);
                self.set(state, Code::Byte(byte), node);
                node
            };
        }
        self.symbols[state] = Some(kind);
    }
}
