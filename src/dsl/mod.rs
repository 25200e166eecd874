//! DSL compiler — city script → tokens → evaluated elements → GeoJSON.

pub mod automaton;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod scope;
pub mod token;

pub use error::{CompileError, ErrorKind};
pub use parser::CompiledCity;
pub use token::{Token, TokenKind};

use std::path::Path;

use crate::compile_log::CompileLog;
use crate::render::{DrawingSink, NullSink, Projection, TileProjection};

use lexer::Scanner;
use parser::Parser;

/// The city DSL compiler.
pub struct Compiler;

impl Compiler {
    /// Scan source text into tokens, ending with `Eof`.
    pub fn tokenize(source: &str) -> Result<Vec<Token>, CompileError> {
        Scanner::new(source.bytes()).tokenize()
    }

    /// Compile source text without drawing anything.
    pub fn compile(source: &str) -> Result<CompiledCity, CompileError> {
        let mut log = CompileLog::default();
        Self::compile_with(
            source.as_bytes(),
            &TileProjection::default(),
            &mut NullSink,
            &mut log,
        )
    }

    /// Compile raw script bytes, forwarding every completed element to `sink`.
    ///
    /// `log` keeps whatever was recorded even when compilation fails.
    pub fn compile_with(
        source: &[u8],
        projection: &dyn Projection,
        sink: &mut dyn DrawingSink,
        log: &mut CompileLog,
    ) -> Result<CompiledCity, CompileError> {
        let scanner = Scanner::new(source.iter().copied());
        Parser::new(scanner, projection, sink, log)?.parse()
    }

    /// Compile `script` and write the document to `output`.
    ///
    /// Nothing is written unless the whole script is accepted.
    pub fn compile_file(
        script: &Path,
        output: &Path,
        projection: &dyn Projection,
        sink: &mut dyn DrawingSink,
        log: &mut CompileLog,
    ) -> Result<CompiledCity, CompileError> {
        let source = std::fs::read(script)?;
        let compiled = Self::compile_with(&source, projection, sink, log)?;
        compiled.write_to(output)?;
        Ok(compiled)
    }
}

impl CompiledCity {
    /// Write the GeoJSON document, creating parent directories as needed.
    pub fn write_to(&self, path: &Path) -> Result<(), CompileError> {
        let json = self
            .document
            .to_json()
            .map_err(|e| CompileError::io(std::io::Error::other(e)))?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, json)?;
        Ok(())
    }
}
