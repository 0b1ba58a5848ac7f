//! britescript-compiler — transpileur Britescript → TypeScript.
//!
//! - Détection rapide de syntaxe étendue (`struct`, `trait`, `impl … for`, `let`, `|>`)
//! - Lexer tolérant + parseur récursif → AST minimal, émission par tranches
//! - Markup `.bsx` recopié octet pour octet
//! - Source maps v3, extraction des imports
//! - API orientée hôte : `Compiler::transform` / `Compiler::compile` / `compile_str`
//!
//! Exemple :
//! ```
//! use britescript_compiler::{compile_str, Options};
//!
//! let r = compile_str("user.bs", "struct User { name: string; }", &Options::default());
//! assert!(r.code.starts_with("type User = {"));
//! assert!(r.errors.is_empty());
//! ```

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms, unused_must_use)]

pub mod ast;
pub mod codegen;
pub mod config;
pub mod deps;
pub mod detect;
pub mod diagnostics;
pub mod error;
pub mod filter;
pub mod lexer;
pub mod markup;
pub mod parser;
pub mod passes;
pub mod pipeline;
pub mod source;
pub mod sourcemap;

pub use config::{Options, Overrides, Target};
pub use deps::extract_dependencies;
pub use detect::{contains_extended_syntax, detect_markers, Marker};
pub use diagnostics::{Diagnostic, Severity};
pub use error::{CompileError, Result};
pub use filter::Filter;
pub use passes::{PassKind, Passes};
pub use pipeline::{compile_str, CompileResult, Compiler, TransformRequest};
pub use source::{SourceKind, SourceUnit};
