//! passes.rs — Passes de réécriture nommées, en ordre déclaré.
//!
//! Chaque passe cible un seul genre de nœud. Une passe absente du jeu laisse
//! ses nœuds tels quels (les nœuds imbriqués restent traités par les autres),
//! ce qui permet de tester chaque passe isolément.

use std::fmt;

use crate::ast::Node;
use crate::error::{CompileError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PassKind { Struct, Trait, Impl, Let, Pipe }

impl PassKind {
    /// Ordre standard : déclarations d’abord, puis `let` et pipes.
    pub const ALL: [PassKind; 5] = [
        PassKind::Struct,
        PassKind::Trait,
        PassKind::Impl,
        PassKind::Let,
        PassKind::Pipe,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PassKind::Struct => "struct",
            PassKind::Trait => "trait",
            PassKind::Impl => "impl",
            PassKind::Let => "let",
            PassKind::Pipe => "pipe",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "struct" => Some(PassKind::Struct),
            "trait" => Some(PassKind::Trait),
            "impl" => Some(PassKind::Impl),
            "let" => Some(PassKind::Let),
            "pipe" => Some(PassKind::Pipe),
            _ => None,
        }
    }

    /// Passe responsable d’un nœud (`None` pour `Other`).
    pub fn of(node: &Node) -> Option<Self> {
        match node {
            Node::Struct(_) => Some(PassKind::Struct),
            Node::Trait(_) => Some(PassKind::Trait),
            Node::Impl(_) => Some(PassKind::Impl),
            Node::Let(_) => Some(PassKind::Let),
            Node::Pipe(_) => Some(PassKind::Pipe),
            Node::Other(_) => None,
        }
    }
}

impl fmt::Display for PassKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Jeu ordonné de passes actives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Passes {
    order: Vec<PassKind>,
}

impl Default for Passes {
    fn default() -> Self {
        Self::standard()
    }
}

impl Passes {
    pub fn standard() -> Self {
        Self { order: PassKind::ALL.to_vec() }
    }

    pub fn none() -> Self {
        Self { order: Vec::new() }
    }

    /// Depuis des noms (`["struct", "let"]`) ; liste vide → jeu standard.
    pub fn from_names(names: &[String]) -> Result<Self> {
        if names.is_empty() {
            return Ok(Self::standard());
        }
        let mut p = Self::none();
        for n in names {
            let k = PassKind::parse(n)
                .ok_or_else(|| CompileError::Config(format!("passe inconnue `{n}`")))?;
            p = p.with(k);
        }
        Ok(p)
    }

    pub fn with(mut self, kind: PassKind) -> Self {
        if !self.order.contains(&kind) {
            self.order.push(kind);
            self.order.sort_by_key(|k| PassKind::ALL.iter().position(|a| a == k));
        }
        self
    }

    pub fn without(mut self, kind: PassKind) -> Self {
        self.order.retain(|k| *k != kind);
        self
    }

    pub fn enabled(&self, kind: PassKind) -> bool {
        self.order.contains(&kind)
    }

    fn iter(&self) -> impl Iterator<Item = PassKind> + '_ {
        self.order.iter().copied()
    }
}

impl fmt::Display for Passes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<_> = self.iter().map(PassKind::name).collect();
        f.write_str(&names.join(" → "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_order_is_declared() {
        assert_eq!(Passes::standard().to_string(), "struct → trait → impl → let → pipe");
        let p = Passes::none().with(PassKind::Pipe).with(PassKind::Struct);
        assert_eq!(p.iter().collect::<Vec<_>>(), vec![PassKind::Struct, PassKind::Pipe]);
    }

    #[test]
    fn from_names_rejects_unknown() {
        let p = Passes::from_names(&["let".into(), "Trait".into()]).unwrap();
        assert!(p.enabled(PassKind::Let) && p.enabled(PassKind::Trait));
        assert!(!p.enabled(PassKind::Struct));
        assert!(Passes::from_names(&["macro".into()]).is_err());
        assert_eq!(Passes::from_names(&[]).unwrap(), Passes::standard());
    }

    #[test]
    fn without_disables() {
        assert!(!Passes::standard().without(PassKind::Let).enabled(PassKind::Let));
    }
}
