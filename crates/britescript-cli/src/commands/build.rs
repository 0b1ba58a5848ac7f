use std::io::Write;

use camino::Utf8PathBuf;
use clap::Args as ClapArgs;
use color_eyre::eyre::{bail, Result};
use tracing::info;

use britescript_compiler::Compiler;

use crate::fs_util::{collect_inputs, map_path, output_path, write_all};

#[derive(ClapArgs, Debug)]
pub struct Args {
    /// Fichiers ou dossiers sources
    #[arg(required = true)]
    pub inputs: Vec<Utf8PathBuf>,

    /// Dossier de sortie (défaut: à côté des sources)
    #[arg(long)]
    pub out_dir: Option<Utf8PathBuf>,
}

/// Bilan d’un build.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Report {
    pub written: Vec<Utf8PathBuf>,
    pub skipped: usize,
    pub failed: usize,
    pub warnings: usize,
}

pub fn exec(args: &Args, compiler: &Compiler, out: &mut impl Write) -> Result<()> {
    let report = build(args, compiler, out)?;
    writeln!(
        out,
        "{} fichier(s) écrit(s), {} ignoré(s), {} avertissement(s)",
        report.written.len(),
        report.skipped,
        report.warnings
    )?;
    if report.failed > 0 {
        bail!("{} fichier(s) en erreur", report.failed);
    }
    Ok(())
}

/// Compile toutes les sources éligibles ; les erreurs sont comptées, pas propagées.
pub fn build(args: &Args, compiler: &Compiler, out: &mut impl Write) -> Result<Report> {
    let mut report = Report::default();
    for input in collect_inputs(&args.inputs)? {
        if !compiler.accepts(input.path.as_str()) {
            report.skipped += 1;
            continue;
        }
        let result = super::compile_file(compiler, &input.path, true)?;
        for w in &result.warnings {
            writeln!(out, "warning: {w}")?;
        }
        report.warnings += result.warnings.len();
        if !result.is_ok() {
            for e in &result.errors {
                writeln!(out, "error: {}: {e}", input.path)?;
            }
            report.failed += 1;
            continue;
        }

        let dst = output_path(&input, args.out_dir.as_deref());
        write_all(&dst, &result.code)?;
        if let Some(map) = &result.map {
            write_all(&map_path(&dst), map)?;
        }
        info!(src = %input.path, dst = %dst, "écrit");
        report.written.push(dst);
    }
    Ok(report)
}
