//! Deferred-value inference for shell scripts.
//!
//! Decides, for every expression of a parsed script, whether its runtime
//! value is deferred and must be awaited before use. The decisions come
//! from an API type registry describing the shell's domain shapes.
//!
//! # Architecture
//!
//! - [`ty`]: descriptors (`Ty`)
//! - [`registry`]: the shape catalogue, loaded from JSON or TOML
//! - [`env`]: symbol table with scope stack
//! - [`infer`]: the inference walk, producing suspension sites and
//!   promoted functions
//! - [`error`]: compilation errors with stable codes
//! - [`diagnostics`]: ariadne and JSON rendering

pub mod diagnostics;
pub mod env;
pub mod error;
pub mod infer;
pub mod registry;
pub mod ty;

pub use env::SymbolTable;
pub use error::RewriteError;
pub use infer::{infer, InferResult};
pub use registry::{Registry, RegistryBuilder, RegistryError};
pub use ty::Ty;
