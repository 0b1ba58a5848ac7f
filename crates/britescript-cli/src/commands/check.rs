use std::io::Write;

use camino::Utf8PathBuf;
use clap::Args as ClapArgs;
use color_eyre::eyre::{bail, Result, WrapErr};

use britescript_compiler::{detect_markers, Compiler, Marker, TransformRequest};

use crate::fs_util::collect_inputs;

#[derive(ClapArgs, Debug)]
pub struct Args {
    /// Fichiers ou dossiers sources
    #[arg(required = true)]
    pub inputs: Vec<Utf8PathBuf>,
}

pub fn exec(args: &Args, compiler: &Compiler, out: &mut impl Write) -> Result<()> {
    let mut failed = 0usize;
    for input in collect_inputs(&args.inputs)? {
        if !compiler.accepts(input.path.as_str()) {
            continue;
        }
        let text = std::fs::read_to_string(&input.path).wrap_err_with(|| format!("lecture {}", input.path))?;
        let markers = detect_markers(&text);
        let result = compiler.compile(&TransformRequest::new(input.path.as_str(), &text));

        let label = if markers.is_empty() { "-".to_string() } else { marker_names(&markers) };
        writeln!(out, "{}: {label}", input.path)?;
        for w in &result.warnings {
            writeln!(out, "  warning: {w}")?;
        }
        for e in &result.errors {
            writeln!(out, "  error: {e}")?;
        }
        if !result.is_ok() {
            failed += 1;
        }
    }
    if failed > 0 {
        bail!("{failed} fichier(s) en erreur");
    }
    Ok(())
}

fn marker_names(markers: &[Marker]) -> String {
    markers
        .iter()
        .map(|m| match m {
            Marker::Struct => "struct",
            Marker::Trait => "trait",
            Marker::Impl => "impl",
            Marker::Let => "let",
            Marker::Pipe => "|>",
        })
        .collect::<Vec<_>>()
        .join(", ")
}
