//! filter.rs — Éligibilité d’un identifiant de fichier (include / exclude).
//!
//! Un motif écrit `/…/` est une expression régulière, tout autre motif une
//! sous-chaîne littérale. Les identifiants sont normalisés (`\` → `/`) ;
//! ceux qui commencent par `\0` (modules virtuels) ne sont jamais éligibles.

use std::fmt;

use regex::Regex;

use crate::config::Options;
use crate::error::{CompileError, Result};

#[derive(Debug, Clone)]
pub enum Pattern {
    Literal(String),
    Regex(Regex),
}

impl Pattern {
    pub fn parse(raw: &str) -> Result<Self> {
        match raw.strip_prefix('/').and_then(|r| r.strip_suffix('/')) {
            Some(body) if raw.len() >= 2 => Regex::new(body)
                .map(Pattern::Regex)
                .map_err(|source| CompileError::Pattern { pattern: raw.to_string(), source }),
            _ => Ok(Pattern::Literal(raw.to_string())),
        }
    }

    pub fn is_match(&self, id: &str) -> bool {
        match self {
            Pattern::Literal(s) => id.contains(s.as_str()),
            Pattern::Regex(re) => re.is_match(id),
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pattern::Literal(s) => f.write_str(s),
            Pattern::Regex(re) => write!(f, "/{}/", re.as_str()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Filter {
    include: Vec<Pattern>,
    exclude: Vec<Pattern>,
}

impl Filter {
    pub fn new<S: AsRef<str>>(include: &[S], exclude: &[S]) -> Result<Self> {
        let parse = |v: &[S]| v.iter().map(|p| Pattern::parse(p.as_ref())).collect::<Result<Vec<_>>>();
        Ok(Self { include: parse(include)?, exclude: parse(exclude)? })
    }

    pub fn from_options(o: &Options) -> Result<Self> {
        Self::new(o.include.as_slice(), o.exclude.as_slice())
    }

    pub fn accepts(&self, id: &str) -> bool {
        if id.starts_with('\0') {
            return false;
        }
        let id = id.replace('\\', "/");
        self.include.iter().any(|p| p.is_match(&id)) && !self.exclude.iter().any(|p| p.is_match(&id))
    }
}
