//! Async rewriting of shell scripts.
//!
//! Scripts are written as if every shell call returned immediately. This
//! crate turns them into scripts that are safe to run against the
//! asynchronous API: every consumed deferred value is awaited and every
//! function that now suspends becomes `async`.
//!
//! ## Pipeline
//!
//! ```text
//! source -> Lexer -> Parser -> CST -> infer (Registry, SymbolTable) -> emit -> source
//! ```

pub mod emit;

pub use asyncify_typeck::{Registry, RewriteError};
pub use emit::emit;

use tracing::debug;

/// Result of [`compile_with_symbols`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compiled {
    /// The rewritten script.
    pub output: String,
    /// Listing of the final symbol table.
    pub symbols: String,
}

/// Rewrite `source` against `registry`.
///
/// All or nothing: the first syntax error or unsupported construct aborts
/// the compilation and no output is produced.
pub fn compile(source: &str, registry: &Registry) -> Result<String, RewriteError> {
    compile_with_symbols(source, registry).map(|compiled| compiled.output)
}

/// Like [`compile`], also returning the symbol table listing.
pub fn compile_with_symbols(source: &str, registry: &Registry) -> Result<Compiled, RewriteError> {
    let parse = asyncify_parser::parse(source);
    let result = asyncify_typeck::infer(&parse, registry)?;
    let output = emit(&parse, &result);
    debug!(
        awaits = result.suspensions.len(),
        promoted = result.promoted.len(),
        bytes_in = source.len(),
        bytes_out = output.len(),
        "rewrite finished"
    );
    Ok(Compiled {
        output,
        symbols: result.symbols.dump(),
    })
}
