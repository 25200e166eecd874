//! Parser and evaluator for the city DSL.
//!
//! A single pass over the token stream: productions are recognized,
//! expressions are evaluated, variables are declared and resolved, and every
//! completed element is drawn and appended to the GeoJSON document. No syntax
//! tree is built.
//!
//! Conditionals thread an `active` flag through the productions they contain.
//! Inactive productions still consume and validate their tokens but declare
//! nothing and never fail on lookups.

use crate::compile_log::CompileLog;
use crate::geojson::{Element, FeatureCollection, GeoJsonEmitter};
use crate::geometry::{bend_curve, Coordinate};
use crate::render::{draw_element, DrawingSink, Projection};

use super::error::CompileError;
use super::lexer::Scanner;
use super::scope::{Level, Scopes};
use super::token::{Token, TokenKind};

/// Longest `a + b - c ...` chain accepted in one expression.
pub const MAX_EXPR_TERMS: usize = 4096;

/// Deepest nesting of `if` blocks.
pub const MAX_NESTING: usize = 256;

/// Result of a successful compilation.
#[derive(Debug, Clone)]
pub struct CompiledCity {
    pub name: String,
    pub document: FeatureCollection,
    /// Variables left in scope; the element scope is always empty here.
    pub scopes: Scopes,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Comparison {
    Eq,
    NotEq,
    Less,
    Greater,
}

impl Comparison {
    fn holds(self, lhs: f64, rhs: f64) -> bool {
        match self {
            Comparison::Eq => lhs == rhs,
            Comparison::NotEq => lhs != rhs,
            Comparison::Less => lhs < rhs,
            Comparison::Greater => lhs > rhs,
        }
    }
}

pub struct Parser<'s, I: Iterator<Item = u8>> {
    scanner: Scanner<'static, I>,
    current: Token,
    scopes: Scopes,
    emitter: GeoJsonEmitter,
    projection: &'s dyn Projection,
    sink: &'s mut dyn DrawingSink,
    log: &'s mut CompileLog,
    depth: usize,
}

impl<'s, I: Iterator<Item = u8>> Parser<'s, I> {
    /// Prime the parser with the first token of `scanner`.
    pub fn new(
        mut scanner: Scanner<'static, I>,
        projection: &'s dyn Projection,
        sink: &'s mut dyn DrawingSink,
        log: &'s mut CompileLog,
    ) -> Result<Self, CompileError> {
        let current = scanner.next_token()?;
        Ok(Self {
            scanner,
            current,
            scopes: Scopes::new(),
            emitter: GeoJsonEmitter::new(),
            projection,
            sink,
            log,
            depth: 0,
        })
    }

    /// Parse a whole city. Succeeds only if the grammar matches and the input
    /// is exhausted right after the closing brace.
    pub fn parse(mut self) -> Result<CompiledCity, CompileError> {
        let name = self.city()?;
        self.expect(TokenKind::Eof)?;
        Ok(CompiledCity {
            name,
            document: self.emitter.finish(),
            scopes: self.scopes,
        })
    }

    // City ::= city STRING { Operations Mandatory Optional }
    fn city(&mut self) -> Result<String, CompileError> {
        self.expect(TokenKind::City)?;
        let name = self.expect(TokenKind::Str)?.unquoted().to_string();
        self.expect(TokenKind::LBrace)?;
        self.log.record(self.current.line, format!("city \"{name}\""));

        self.operations(Level::City, true)?;
        self.mandatory_elements()?;
        self.optional_elements()?;

        self.expect(TokenKind::RBrace)?;
        Ok(name)
    }

    // Mandatory ::= (Street | Institution)+, with at least one of each
    fn mandatory_elements(&mut self) -> Result<(), CompileError> {
        let start = self.current.clone();
        let mut streets = 0;
        let mut institutions = 0;
        loop {
            match self.peek() {
                TokenKind::Street => {
                    self.street()?;
                    streets += 1;
                }
                TokenKind::Institution => {
                    self.institution()?;
                    institutions += 1;
                }
                _ => break,
            }
        }

        if streets == 0 && institutions == 0 {
            return Err(self.unexpected("'street' or 'institution'"));
        }
        if streets == 0 || institutions == 0 {
            return Err(CompileError::semantic(
                "a city needs at least one street and one institution",
                start.line,
                start.col,
            ));
        }
        Ok(())
    }

    // Optional ::= { Square | Statue | Lake }
    fn optional_elements(&mut self) -> Result<(), CompileError> {
        loop {
            match self.peek() {
                TokenKind::Square => self.square()?,
                TokenKind::Statue => self.statue()?,
                TokenKind::Lake => self.lake()?,
                _ => return Ok(()),
            }
        }
    }

    // ---- elements ----------------------------------------------------------

    /// `keyword STRING { Operations`. The element scope is reset before the
    /// operations run.
    fn element_header(&mut self, keyword: TokenKind) -> Result<(String, usize), CompileError> {
        let line = self.expect(keyword)?.line;
        let name = self.expect(TokenKind::Str)?.unquoted().to_string();
        self.expect(TokenKind::LBrace)?;
        self.scopes.clear_element();
        self.operations(Level::Element, true)?;
        Ok((name, line))
    }

    /// Closing `}`, then draw and emit.
    fn element_footer(&mut self, element: Element, line: usize) -> Result<(), CompileError> {
        self.expect(TokenKind::RBrace)?;

        draw_element(&element, self.projection, &mut *self.sink);
        self.emitter.push(&element);
        self.log.record(
            line,
            format!(
                "{} \"{}\" emitted as feature {}",
                element.kind_name(),
                element.name(),
                self.emitter.len()
            ),
        );
        self.scopes.clear_element();
        Ok(())
    }

    // Street ::= street STRING { Operations Bend Line }
    fn street(&mut self) -> Result<(), CompileError> {
        let (name, line) = self.element_header(TokenKind::Street)?;
        let (from, to, angle) = self.bend()?;
        let segment = self.line_segment()?;
        let element = Element::Street {
            name,
            bend: bend_curve(&from, &to, angle),
            line: segment,
        };
        self.element_footer(element, line)
    }

    // Institution ::= institution STRING { Operations Address Events Block }
    fn institution(&mut self) -> Result<(), CompileError> {
        let (name, line) = self.element_header(TokenKind::Institution)?;
        let address = self.address()?;
        let events = self.events()?;
        let block = self.block()?;
        let element = Element::Institution {
            name,
            address,
            events,
            block,
        };
        self.element_footer(element, line)
    }

    // Square ::= square STRING { Operations Block }
    fn square(&mut self) -> Result<(), CompileError> {
        let (name, line) = self.element_header(TokenKind::Square)?;
        let block = self.block()?;
        self.element_footer(Element::Square { name, block }, line)
    }

    // Statue ::= statue STRING { Operations Point }
    fn statue(&mut self) -> Result<(), CompileError> {
        let (name, line) = self.element_header(TokenKind::Statue)?;
        self.expect(TokenKind::Point)?;
        let point = self.active_coordinate()?.renamed("point");
        self.element_footer(Element::Statue { name, point }, line)
    }

    // Lake ::= lake STRING { Operations Circle }
    fn lake(&mut self) -> Result<(), CompileError> {
        let (name, line) = self.element_header(TokenKind::Lake)?;
        let (center, radius) = self.circle()?;
        self.element_footer(Element::lake(name, center, radius), line)
    }

    // ---- primitives --------------------------------------------------------

    // Bend ::= bend ( Coordinate , Coordinate , DoubleExpr )
    fn bend(&mut self) -> Result<(Coordinate, Coordinate, f64), CompileError> {
        self.expect(TokenKind::Bend)?;
        self.expect(TokenKind::LParen)?;
        let from = self.active_coordinate()?.renamed("bendFirst");
        self.expect(TokenKind::Comma)?;
        let to = self.active_coordinate()?.renamed("bendSecond");
        self.expect(TokenKind::Comma)?;
        let angle = self.active_number()?;
        self.expect(TokenKind::RParen)?;
        Ok((from, to, angle))
    }

    // Line ::= line ( Coordinate , Coordinate )
    fn line_segment(&mut self) -> Result<[Coordinate; 2], CompileError> {
        self.expect(TokenKind::Line)?;
        self.expect(TokenKind::LParen)?;
        let first = self.active_coordinate()?.renamed("first");
        self.expect(TokenKind::Comma)?;
        let second = self.active_coordinate()?.renamed("second");
        self.expect(TokenKind::RParen)?;
        Ok([first, second])
    }

    // Block ::= block ( Coordinate , Coordinate , Coordinate , Coordinate )
    fn block(&mut self) -> Result<[Coordinate; 4], CompileError> {
        self.expect(TokenKind::Block)?;
        self.expect(TokenKind::LParen)?;
        let first = self.active_coordinate()?.renamed("first");
        self.expect(TokenKind::Comma)?;
        let second = self.active_coordinate()?.renamed("second");
        self.expect(TokenKind::Comma)?;
        let third = self.active_coordinate()?.renamed("third");
        self.expect(TokenKind::Comma)?;
        let fourth = self.active_coordinate()?.renamed("fourth");
        self.expect(TokenKind::RParen)?;
        Ok([first, second, third, fourth])
    }

    // Circle ::= circle ( Coordinate , DoubleExpr )
    fn circle(&mut self) -> Result<(Coordinate, f64), CompileError> {
        self.expect(TokenKind::Circle)?;
        self.expect(TokenKind::LParen)?;
        let center = self.active_coordinate()?.renamed("center");
        self.expect(TokenKind::Comma)?;
        let radius = self.active_number()?;
        self.expect(TokenKind::RParen)?;
        Ok((center, radius))
    }

    // Address ::= address = (STRING | VAR)
    fn address(&mut self) -> Result<String, CompileError> {
        self.expect(TokenKind::Address)?;
        self.expect(TokenKind::Assign)?;
        let value = self.string_value(true)?;
        self.required(value, "address")
    }

    // Events ::= events = DoubleExpr
    fn events(&mut self) -> Result<f64, CompileError> {
        self.expect(TokenKind::Events)?;
        self.expect(TokenKind::Assign)?;
        self.active_number()
    }

    // ---- operations --------------------------------------------------------

    // Operations ::= { Operation }
    fn operations(&mut self, level: Level, active: bool) -> Result<(), CompileError> {
        loop {
            match self.peek() {
                TokenKind::DeclString => self.declare_string(level, active)?,
                TokenKind::DeclInt => self.declare_int(level, active)?,
                TokenKind::DeclDouble => self.declare_double(level, active)?,
                TokenKind::DeclCoord => self.declare_coord(level, active)?,
                TokenKind::If => self.if_else(level, active)?,
                _ => return Ok(()),
            }
        }
    }

    /// `keyword VAR =`, returning the variable token.
    fn declaration_head(&mut self, keyword: TokenKind) -> Result<Token, CompileError> {
        self.expect(keyword)?;
        let var = self.expect(TokenKind::Ident)?;
        self.expect(TokenKind::Assign)?;
        Ok(var)
    }

    // string VAR = (STRING | VAR)
    fn declare_string(&mut self, level: Level, active: bool) -> Result<(), CompileError> {
        let var = self.declaration_head(TokenKind::DeclString)?;
        let value = self.string_value(active)?;
        if let (true, Some(value)) = (active, value) {
            self.log
                .record(var.line, format!("string {} = \"{value}\"", var.lexeme));
            self.scopes.declare_string(level, &var.lexeme, value);
        }
        Ok(())
    }

    // int VAR = DoubleExpr, where the expression starts with an integer or variable
    fn declare_int(&mut self, level: Level, active: bool) -> Result<(), CompileError> {
        let var = self.declaration_head(TokenKind::DeclInt)?;
        if self.check(TokenKind::Double) {
            return Err(self.unexpected("integer expression"));
        }
        let value = self.double_expr(active)?;
        if let (true, Some(value)) = (active, value) {
            let value = value.trunc() as i64;
            self.log
                .record(var.line, format!("int {} = {value}", var.lexeme));
            self.scopes.declare_int(level, &var.lexeme, value);
        }
        Ok(())
    }

    // double VAR = DoubleExpr
    fn declare_double(&mut self, level: Level, active: bool) -> Result<(), CompileError> {
        let var = self.declaration_head(TokenKind::DeclDouble)?;
        let value = self.double_expr(active)?;
        if let (true, Some(value)) = (active, value) {
            self.log
                .record(var.line, format!("double {} = {value}", var.lexeme));
            self.scopes.declare_double(level, &var.lexeme, value);
        }
        Ok(())
    }

    // coordinate VAR = Coordinate
    fn declare_coord(&mut self, level: Level, active: bool) -> Result<(), CompileError> {
        let var = self.declaration_head(TokenKind::DeclCoord)?;
        let value = self.coordinate(active)?;
        if let (true, Some(value)) = (active, value) {
            self.log.record(
                var.line,
                format!("coordinate {} = ({}, {})", var.lexeme, value.x, value.y),
            );
            self.scopes
                .declare_coord(level, &var.lexeme, value.renamed(var.lexeme.as_str()));
        }
        Ok(())
    }

    // if ( DoubleExpr Cmp DoubleExpr ) { Operations } [ else { Operations } ]
    fn if_else(&mut self, level: Level, active: bool) -> Result<(), CompileError> {
        let keyword = self.expect(TokenKind::If)?;
        if self.depth >= MAX_NESTING {
            return Err(CompileError::semantic(
                format!("conditionals nested deeper than {MAX_NESTING}"),
                keyword.line,
                keyword.col,
            ));
        }
        self.expect(TokenKind::LParen)?;
        let lhs = self.double_expr(active)?;
        let comparison = self.comparison()?;
        let rhs = self.double_expr(active)?;
        self.expect(TokenKind::RParen)?;

        let holds = match (lhs, rhs) {
            (Some(lhs), Some(rhs)) => comparison.holds(lhs, rhs),
            _ => false,
        };
        if active {
            let taken = if holds { "then" } else { "else" };
            self.log
                .record(keyword.line, format!("if: taking {taken} branch"));
        }

        self.depth += 1;
        let result = self.branches(level, active && holds, active && !holds);
        self.depth -= 1;
        result
    }

    fn branches(
        &mut self,
        level: Level,
        then_active: bool,
        else_active: bool,
    ) -> Result<(), CompileError> {
        self.expect(TokenKind::LBrace)?;
        self.operations(level, then_active)?;
        self.expect(TokenKind::RBrace)?;
        if self.check(TokenKind::Else) {
            self.advance()?;
            self.expect(TokenKind::LBrace)?;
            self.operations(level, else_active)?;
            self.expect(TokenKind::RBrace)?;
        }
        Ok(())
    }

    fn comparison(&mut self) -> Result<Comparison, CompileError> {
        let comparison = match self.peek() {
            TokenKind::EqEq => Comparison::Eq,
            TokenKind::NotEq => Comparison::NotEq,
            TokenKind::Less => Comparison::Less,
            TokenKind::Greater => Comparison::Greater,
            _ => return Err(self.unexpected("'==', '!=', '<' or '>'")),
        };
        self.advance()?;
        Ok(comparison)
    }

    // ---- values ------------------------------------------------------------

    /// STRING | VAR. `None` only when inactive and the variable is unknown.
    fn string_value(&mut self, active: bool) -> Result<Option<String>, CompileError> {
        match self.peek() {
            TokenKind::Str => Ok(Some(self.advance()?.unquoted().to_string())),
            TokenKind::Ident => {
                let var = self.advance()?;
                match self.scopes.string(&var.lexeme) {
                    Some(value) => Ok(Some(value.to_string())),
                    None if active => Err(CompileError::semantic(
                        format!("undefined string variable '{}'", var.lexeme),
                        var.line,
                        var.col,
                    )),
                    None => Ok(None),
                }
            }
            _ => Err(self.unexpected("string or variable")),
        }
    }

    /// Coordinate ::= ( Component , Component ) | VAR
    fn coordinate(&mut self, active: bool) -> Result<Option<Coordinate>, CompileError> {
        match self.peek() {
            TokenKind::LParen => {
                self.advance()?;
                let x = self.component(active)?;
                self.expect(TokenKind::Comma)?;
                let y = self.component(active)?;
                self.expect(TokenKind::RParen)?;
                Ok(x.zip(y).map(|(x, y)| Coordinate::anonymous(x, y)))
            }
            TokenKind::Ident => {
                let var = self.advance()?;
                self.lookup_coord(&var, active)
            }
            _ => Err(self.unexpected("coordinate")),
        }
    }

    /// Component ::= fst ( VAR ) | snd ( VAR ) | DoubleExpr
    ///
    /// A projection stands alone; it is not an arithmetic operand.
    fn component(&mut self, active: bool) -> Result<Option<f64>, CompileError> {
        let projection = match self.peek() {
            TokenKind::Fst | TokenKind::Snd => self.advance()?.kind,
            _ => return self.double_expr(active),
        };
        self.expect(TokenKind::LParen)?;
        let var = self.expect(TokenKind::Ident)?;
        self.expect(TokenKind::RParen)?;
        let coord = self.lookup_coord(&var, active)?;
        Ok(coord.map(|c| if projection == TokenKind::Fst { c.x } else { c.y }))
    }

    fn active_coordinate(&mut self) -> Result<Coordinate, CompileError> {
        let value = self.coordinate(true)?;
        self.required(value, "coordinate")
    }

    fn active_number(&mut self) -> Result<f64, CompileError> {
        let value = self.double_expr(true)?;
        self.required(value, "number")
    }

    /// DoubleExpr ::= Operand [ (+ | -) DoubleExpr ]
    ///
    /// Evaluated right to left, so `5 - 3 - 1` is `5 - (3 - 1)`.
    fn double_expr(&mut self, active: bool) -> Result<Option<f64>, CompileError> {
        let start = self.current.clone();
        let mut operands = vec![self.operand(active)?];
        let mut operators = Vec::new();
        while matches!(self.peek(), TokenKind::Plus | TokenKind::Minus) {
            if operands.len() >= MAX_EXPR_TERMS {
                return Err(CompileError::semantic(
                    format!("expression longer than {MAX_EXPR_TERMS} terms"),
                    start.line,
                    start.col,
                ));
            }
            operators.push(self.advance()?.kind);
            operands.push(self.operand(active)?);
        }

        let mut operands = operands.into_iter().rev();
        let mut acc = operands.next().flatten();
        for (operand, operator) in operands.zip(operators.into_iter().rev()) {
            acc = match (operand, acc) {
                (Some(lhs), Some(rhs)) if operator == TokenKind::Plus => Some(lhs + rhs),
                (Some(lhs), Some(rhs)) => Some(lhs - rhs),
                _ => None,
            };
        }
        Ok(acc)
    }

    /// Operand ::= INT | DOUBLE | VAR
    fn operand(&mut self, active: bool) -> Result<Option<f64>, CompileError> {
        match self.peek() {
            TokenKind::Integer | TokenKind::Double => {
                let literal = self.advance()?;
                literal.lexeme.parse::<f64>().map(Some).map_err(|_| {
                    CompileError::lex(
                        format!("invalid number: {}", literal.lexeme),
                        literal.line,
                        literal.col,
                    )
                })
            }
            TokenKind::Ident => {
                let var = self.advance()?;
                match self.scopes.number(&var.lexeme) {
                    Some(value) => Ok(Some(value)),
                    None if active => Err(CompileError::semantic(
                        format!("undefined numeric variable '{}'", var.lexeme),
                        var.line,
                        var.col,
                    )),
                    None => Ok(None),
                }
            }
            _ => Err(self.unexpected("number or variable")),
        }
    }

    fn lookup_coord(&self, var: &Token, active: bool) -> Result<Option<Coordinate>, CompileError> {
        match self.scopes.coord(&var.lexeme) {
            Some(coord) => Ok(Some(coord.clone())),
            None if active => Err(CompileError::semantic(
                format!("undefined coordinate variable '{}'", var.lexeme),
                var.line,
                var.col,
            )),
            None => Ok(None),
        }
    }

    /// Unwrap a value that active evaluation always produces.
    fn required<T>(&self, value: Option<T>, what: &str) -> Result<T, CompileError> {
        value.ok_or_else(|| {
            CompileError::semantic(
                format!("{what} could not be evaluated"),
                self.current.line,
                self.current.col,
            )
        })
    }

    // ---- token helpers -----------------------------------------------------

    fn peek(&self) -> TokenKind {
        self.current.kind
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.current.kind == kind
    }

    /// Move to the next token, returning the one just consumed. The scanner is
    /// never polled past `Eof`.
    fn advance(&mut self) -> Result<Token, CompileError> {
        let next = if self.current.kind == TokenKind::Eof {
            self.current.clone()
        } else {
            self.scanner.next_token()?
        };
        Ok(std::mem::replace(&mut self.current, next))
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, CompileError> {
        if self.check(kind) {
            self.advance()
        } else {
            Err(self.unexpected(kind.describe()))
        }
    }

    fn unexpected(&self, expected: &str) -> CompileError {
        let found = match self.current.kind {
            TokenKind::Eof => "end of input".to_string(),
            _ => format!("'{}'", self.current.lexeme),
        };
        CompileError::parse(
            format!("expected {expected}, got {found}"),
            self.current.line,
            self.current.col,
        )
    }
}
