//! error.rs — Erreurs du compilateur Britescript.
//!
//! Une `CompileError` interrompt la compilation **d’un seul fichier** ; la
//! façade (`pipeline`) la convertit en `CompileResult { code: "", errors }`.
//! Les entrées simplement mal formées ne sont jamais des erreurs : elles
//! traversent la réécriture inchangées.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompileError {
    /// Imbrication de groupes/corps trop profonde pour le parseur récursif.
    #[error("{file}:{line}:{col}: imbrication trop profonde (limite {limit})")]
    NestingTooDeep {
        file: String,
        line: u32,
        col: u32,
        limit: usize,
    },

    /// Motif include/exclude invalide.
    #[error("motif invalide `{pattern}`: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// Un span ne tombe pas dans la source (invariant interne rompu).
    #[error("span {start}..{end} hors source ({len} octets)")]
    Span { start: usize, end: usize, len: usize },

    /// Sérialisation de la source map.
    #[error("source map: {0}")]
    SourceMap(#[from] serde_json::Error),

    /// Options incohérentes.
    #[error("config: {0}")]
    Config(String),
}

pub type Result<T, E = CompileError> = std::result::Result<T, E>;

/// Découpe `src[start..end]` sans paniquer.
pub(crate) fn slice(src: &str, start: usize, end: usize) -> Result<&str> {
    src.get(start..end).ok_or(CompileError::Span {
        start,
        end,
        len: src.len(),
    })
}
