use std::io::Write;

use camino::Utf8PathBuf;
use clap::Args as ClapArgs;
use color_eyre::eyre::{bail, Result};

use britescript_compiler::Compiler;

#[derive(ClapArgs, Debug)]
pub struct Args {
    /// Fichier source
    pub file: Utf8PathBuf,

    /// Affiche tout le résultat (code, map, deps, warnings, errors) en JSON
    #[arg(long)]
    pub json: bool,
}

pub fn exec(args: &Args, compiler: &Compiler, out: &mut impl Write) -> Result<()> {
    let result = super::compile_file(compiler, &args.file, false)?;
    if args.json {
        writeln!(out, "{}", serde_json::to_string_pretty(&result)?)?;
        return Ok(());
    }
    if let Some(e) = result.errors.first() {
        bail!("{}: {e}", args.file);
    }
    for w in &result.warnings {
        eprintln!("warning: {w}");
    }
    out.write_all(result.code.as_bytes())?;
    Ok(())
}
