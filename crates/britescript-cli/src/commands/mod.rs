pub mod build;
pub mod check;
pub mod deps;
pub mod emit;

use camino::Utf8Path;
use color_eyre::eyre::{Result, WrapErr};

use britescript_compiler::{CompileResult, Compiler, TransformRequest};

/// Lit et compile un fichier (identifiant = chemin tel que fourni).
pub(crate) fn compile_file(compiler: &Compiler, path: &Utf8Path, build: bool) -> Result<CompileResult> {
    let code = std::fs::read_to_string(path).wrap_err_with(|| format!("lecture {path}"))?;
    Ok(compiler.compile(&TransformRequest::new(path.as_str(), &code).build(build)))
}
