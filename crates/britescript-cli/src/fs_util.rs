//! fs_util.rs — Découverte des sources et écriture des sorties.

use std::fs;
use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use color_eyre::eyre::{eyre, Result, WrapErr};

use britescript_compiler::SourceKind;

/// Source trouvée : chemin réel + chemin relatif à sa racine d’entrée.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Input {
    pub path: Utf8PathBuf,
    pub rel: Utf8PathBuf,
}

/// Développe fichiers et dossiers (récursif, ordre trié). Le filtrage reste à l’appelant.
pub fn collect_inputs(roots: &[Utf8PathBuf]) -> Result<Vec<Input>> {
    let mut out = Vec::new();
    for root in roots {
        if root.is_dir() {
            walk(root, root, &mut out)?;
        } else if root.is_file() {
            let name = root.file_name().ok_or_else(|| eyre!("chemin sans nom de fichier: {root}"))?;
            out.push(Input { path: root.clone(), rel: name.into() });
        } else {
            return Err(eyre!("introuvable: {root}"));
        }
    }
    Ok(out)
}

fn walk(root: &Utf8Path, dir: &Utf8Path, out: &mut Vec<Input>) -> Result<()> {
    let mut entries = dir
        .read_dir_utf8()
        .wrap_err_with(|| format!("lecture du dossier {dir}"))?
        .collect::<io::Result<Vec<_>>>()?;
    entries.sort_by(|a, b| a.file_name().cmp(b.file_name()));
    for e in entries {
        let path = e.path();
        if path.is_dir() {
            walk(root, path, out)?;
        } else {
            let rel = path.strip_prefix(root).unwrap_or(path).to_path_buf();
            out.push(Input { path: path.to_path_buf(), rel });
        }
    }
    Ok(())
}

/// `a/b.bs` → `a/b.ts`, `a/b.bsx` → `a/b.tsx` ; sous `out_dir` si fourni.
pub fn output_path(input: &Input, out_dir: Option<&Utf8Path>) -> Utf8PathBuf {
    let ext = SourceKind::detect(input.path.as_str()).output_extension();
    match out_dir {
        Some(dir) => dir.join(&input.rel).with_extension(ext),
        None => input.path.with_extension(ext),
    }
}

/// `<out>.map`
pub fn map_path(output: &Utf8Path) -> Utf8PathBuf {
    let mut s = output.as_str().to_string();
    s.push_str(".map");
    s.into()
}

pub fn ensure_parent(p: &Utf8Path) -> io::Result<()> {
    if let Some(dir) = p.parent() {
        if !dir.as_str().is_empty() {
            fs::create_dir_all(dir)?;
        }
    }
    Ok(())
}

pub fn write_all(p: &Utf8Path, text: &str) -> Result<()> {
    ensure_parent(p).wrap_err_with(|| format!("création du dossier de {p}"))?;
    fs::write(p, text).wrap_err_with(|| format!("écriture {p}"))
}
