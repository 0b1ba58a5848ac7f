use std::io::Write;

use camino::Utf8PathBuf;
use clap::Args as ClapArgs;
use color_eyre::eyre::{bail, Result};

use britescript_compiler::Compiler;

#[derive(ClapArgs, Debug)]
pub struct Args {
    /// Fichier source
    pub file: Utf8PathBuf,

    /// Sortie JSON (tableau)
    #[arg(long)]
    pub json: bool,
}

pub fn exec(args: &Args, compiler: &Compiler, out: &mut impl Write) -> Result<()> {
    let result = super::compile_file(compiler, &args.file, false)?;
    if let Some(e) = result.errors.first() {
        bail!("{}: {e}", args.file);
    }
    if args.json {
        writeln!(out, "{}", serde_json::to_string(&result.dependencies)?)?;
    } else {
        for d in &result.dependencies {
            writeln!(out, "{d}")?;
        }
    }
    Ok(())
}
