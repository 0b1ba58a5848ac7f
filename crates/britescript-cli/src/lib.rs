//! britescript-cli/src/lib.rs — CLI lib pour Britescript
//!
//! Sous-commandes :
//!   - build : compile des fichiers/dossiers .bs/.bsx vers .ts/.tsx (+ .map)
//!   - check : détecte la syntaxe étendue et rapporte warnings/erreurs sans écrire
//!   - deps  : liste les imports d’un fichier compilé
//!   - emit  : affiche le code compilé (ou le résultat complet en JSON)
//!
//! Options : defaults ← britescript.toml ← ENV ← flags CLI (dernier mot).

use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use britescript_compiler::{Compiler, Options, Overrides, Target};

pub mod commands;
pub mod fs_util;

/// Fichier de config lu par défaut s’il existe dans le dossier courant.
pub const DEFAULT_CONFIG: &str = "britescript.toml";

#[derive(Parser, Debug)]
#[command(name = "britescript", version, about = "Britescript → TypeScript transpiler")]
pub struct Cli {
    /// Verbosité (répéter pour plus de bruit)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Fichier de configuration TOML (défaut: ./britescript.toml s’il existe)
    #[arg(long, global = true)]
    pub config: Option<Utf8PathBuf>,

    /// Ne pas produire de source maps
    #[arg(long, global = true)]
    pub no_source_maps: bool,

    /// Niveau de langage transmis à l’outil aval (es5, es2015, es2020, esnext)
    #[arg(long, global = true)]
    pub target: Option<Target>,

    #[command(subcommand)]
    pub cmd: Cmd,
}

#[derive(Subcommand, Debug)]
pub enum Cmd {
    /// Compile et écrit les sorties .ts/.tsx
    Build(commands::build::Args),
    /// Analyse sans écrire
    Check(commands::check::Args),
    /// Liste les dépendances d’un fichier
    Deps(commands::deps::Args),
    /// Affiche la sortie compilée
    Emit(commands::emit::Args),
}

/// Point d’entrée du binaire (à appeler depuis src/main.rs)
pub fn run(cli: Cli) -> Result<()> {
    init_tracing(cli.verbose);
    let options = load_options(&cli)?;
    debug!(?options, "options chargées");
    let compiler = Compiler::new(options).wrap_err("options invalides")?;

    let mut stdout = std::io::stdout().lock();
    match cli.cmd {
        Cmd::Build(args) => commands::build::exec(&args, &compiler, &mut stdout),
        Cmd::Check(args) => commands::check::exec(&args, &compiler, &mut stdout),
        Cmd::Deps(args) => commands::deps::exec(&args, &compiler, &mut stdout),
        Cmd::Emit(args) => commands::emit::exec(&args, &compiler, &mut stdout),
    }
}

/// `RUST_LOG` prioritaire, sinon niveau déduit de `-v`.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    // déjà installé (tests) → on ignore
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).try_init();
}

/// defaults ← fichier ← ENV ← flags.
pub fn load_options(cli: &Cli) -> Result<Options> {
    let mut options = match &cli.config {
        Some(path) => read_config(path)?,
        None if Utf8Path::new(DEFAULT_CONFIG).is_file() => read_config(Utf8Path::new(DEFAULT_CONFIG))?,
        None => Options::default(),
    };
    options.apply_env();
    options.apply_overrides(&overrides(cli));
    Ok(options)
}

fn overrides(cli: &Cli) -> Overrides {
    Overrides {
        source_maps: cli.no_source_maps.then_some(false),
        target: cli.target,
        verbose: (cli.verbose > 0).then_some(true),
        ..Default::default()
    }
}

pub fn read_config(path: &Utf8Path) -> Result<Options> {
    let s = fs::read_to_string(path).wrap_err_with(|| format!("lecture {path}"))?;
    let o: Options = toml::from_str(&s).wrap_err_with(|| format!("TOML invalide dans {path}"))?;
    Ok(o)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::parse_from(["britescript", "--no-source-maps", "--target", "es5", "-vv", "emit", "a.bs"]);
        let o = overrides(&cli);
        assert_eq!(o.source_maps, Some(false));
        assert_eq!(o.target, Some(Target::Es5));
        assert_eq!(o.verbose, Some(true));
    }
}
