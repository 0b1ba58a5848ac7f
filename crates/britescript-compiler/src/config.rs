//! config.rs — Options du compilateur Britescript.
//!
//! - Defaults (`Options::default()`)
//! - Désérialisation serde (TOML/JSON, clés camelCase ou snake_case)
//! - Lecture **ENV** une seule fois, côté appelant, via `Options::from_env()`
//! - **Overrides CLI** via `Overrides` (appliqués avec `apply_overrides`)
//! - `validate()` avant construction d’un `Compiler`
//!
//! ENV supportés (tous facultatifs) :
//!   NODE_ENV | BRITESCRIPT_ENV=development|production
//!   BRITESCRIPT_VERBOSE=0|1
//!   BRITESCRIPT_SOURCE_MAPS=0|1
//!   BRITESCRIPT_TARGET=es5|es2015|es2020|esnext

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CompileError, Result};
use crate::passes::Passes;

/* ─────────────────────────── Types publics ─────────────────────────── */

/// Niveau de langage visé par l’outil aval (transmis, non utilisé par la réécriture).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    Es5,
    Es2015,
    #[default]
    Es2020,
    EsNext,
}

impl FromStr for Target {
    type Err = CompileError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "es5" => Ok(Target::Es5),
            "es2015" | "es6" => Ok(Target::Es2015),
            "es2020" => Ok(Target::Es2020),
            "esnext" => Ok(Target::EsNext),
            other => Err(CompileError::Config(format!("cible inconnue `{other}`"))),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Target::Es5 => "es5",
            Target::Es2015 => "es2015",
            Target::Es2020 => "es2020",
            Target::EsNext => "esnext",
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Options {
    /// Motifs d’inclusion : `/regex/` ou sous-chaîne littérale.
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    #[serde(alias = "source_maps", alias = "sourcemap")]
    pub source_maps: bool,
    pub target: Target,
    /// Markup (.bsx) recopié tel quel.
    #[serde(alias = "markup_passthrough", alias = "jsx")]
    pub markup_passthrough: bool,
    #[serde(alias = "markup_factory", alias = "jsxFactory")]
    pub markup_factory: String,
    #[serde(alias = "markup_fragment", alias = "jsxFragment")]
    pub markup_fragment: String,
    pub development: bool,
    pub verbose: bool,
    /// Options opaques destinées à l’outil aval.
    #[serde(alias = "compiler_options")]
    pub compiler_options: BTreeMap<String, serde_json::Value>,
    /// Passes actives (vide → toutes).
    pub passes: Vec<String>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            include: vec![r"/\.bs$/".into(), r"/\.bsx$/".into()],
            exclude: vec!["/(^|/)node_modules(/|$)/".into()],
            source_maps: true,
            target: Target::default(),
            markup_passthrough: true,
            markup_factory: "React.createElement".into(),
            markup_fragment: "React.Fragment".into(),
            development: false,
            verbose: false,
            compiler_options: BTreeMap::new(),
            passes: Vec::new(),
        }
    }
}

/// Overrides “dernier mot” fournis par une CLI. Toutes les valeurs sont optionnelles.
#[derive(Default, Clone, Debug)]
pub struct Overrides {
    pub source_maps: Option<bool>,
    pub target: Option<Target>,
    pub markup_passthrough: Option<bool>,
    pub development: Option<bool>,
    pub verbose: Option<bool>,
    pub include: Option<Vec<String>>,
    pub exclude: Option<Vec<String>>,
    pub passes: Option<Vec<String>>,
}

impl Options {
    /// Defaults + ENV. À appeler à la frontière (CLI, hôte), jamais dans le cœur.
    pub fn from_env() -> Self {
        let mut o = Self::default();
        o.apply_env();
        o
    }

    pub fn apply_env(&mut self) {
        self.apply_vars(|k| std::env::var(k).ok());
    }

    /// Applique des variables fournies par `get` (testable sans toucher l’ENV).
    pub fn apply_vars(&mut self, get: impl Fn(&str) -> Option<String>) {
        if let Some(v) = get("BRITESCRIPT_ENV").or_else(|| get("NODE_ENV")) {
            self.development = v.trim().eq_ignore_ascii_case("development");
        }
        if let Some(v) = get("BRITESCRIPT_VERBOSE")     { if let Some(b) = parse_bool(&v) { self.verbose = b; } }
        if let Some(v) = get("BRITESCRIPT_SOURCE_MAPS") { if let Some(b) = parse_bool(&v) { self.source_maps = b; } }
        if let Some(v) = get("BRITESCRIPT_TARGET")      { if let Ok(t) = v.parse()        { self.target = t; } }
    }

    pub fn apply_overrides(&mut self, o: &Overrides) {
        if let Some(x) = o.source_maps        { self.source_maps = x; }
        if let Some(x) = o.target             { self.target = x; }
        if let Some(x) = o.markup_passthrough { self.markup_passthrough = x; }
        if let Some(x) = o.development        { self.development = x; }
        if let Some(x) = o.verbose            { self.verbose = x; }
        if let Some(x) = &o.include           { self.include = x.clone(); }
        if let Some(x) = &o.exclude           { self.exclude = x.clone(); }
        if let Some(x) = &o.passes            { self.passes = x.clone(); }
    }

    /// Jeu de passes décrit par `passes`.
    pub fn passes(&self) -> Result<Passes> {
        Passes::from_names(&self.passes)
    }

    pub fn validate(&self) -> Result<()> {
        if self.include.is_empty() {
            return Err(CompileError::Config("`include` ne peut pas être vide".into()));
        }
        if self.markup_factory.trim().is_empty() || self.markup_fragment.trim().is_empty() {
            return Err(CompileError::Config("fabriques markup vides".into()));
        }
        self.passes().map(|_| ())
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" | "on" => Some(true),
        "0" | "false" | "no" | "n" | "off" => Some(false),
        _ => None,
    }
}

/* ───────────────────────────── Tests ───────────────────────────── */

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_are_sane() {
        let o = Options::default();
        assert!(o.source_maps && o.markup_passthrough);
        assert!(!o.development && !o.verbose);
        assert_eq!(o.target, Target::Es2020);
        assert_eq!(o.markup_factory, "React.createElement");
        assert_eq!(o.include.len(), 2);
        assert!(o.validate().is_ok());
    }

    #[test]
    fn env_derives_development_once() {
        let vars: HashMap<&str, &str> =
            [("NODE_ENV", "development"), ("BRITESCRIPT_SOURCE_MAPS", "off"), ("BRITESCRIPT_TARGET", "esnext")].into();
        let mut o = Options::default();
        o.apply_vars(|k| vars.get(k).map(|v| v.to_string()));
        assert!(o.development);
        assert!(!o.source_maps);
        assert_eq!(o.target, Target::EsNext);

        let mut p = Options::default();
        p.apply_vars(|k| (k == "NODE_ENV").then(|| "production".to_string()));
        assert!(!p.development);
    }

    #[test]
    fn cli_overrides_last_word() {
        let mut o = Options::default();
        let ov = Overrides { source_maps: Some(false), target: Some(Target::Es5), ..Default::default() };
        o.apply_overrides(&ov);
        assert!(!o.source_maps);
        assert_eq!(o.target, Target::Es5);
        assert!(o.markup_passthrough);
    }

    #[test]
    fn deserialises_both_key_styles() {
        let camel: Options = serde_json::from_str(
            r#"{"sourceMaps": false, "markupFactory": "h", "target": "es2015", "compilerOptions": {"strict": true}}"#,
        )
        .unwrap();
        assert!(!camel.source_maps);
        assert_eq!(camel.markup_factory, "h");
        assert_eq!(camel.target, Target::Es2015);
        assert_eq!(camel.compiler_options["strict"], serde_json::Value::Bool(true));

        let snake: Options = serde_json::from_str(r#"{"source_maps": false, "jsxFragment": "Frag"}"#).unwrap();
        assert!(!snake.source_maps);
        assert_eq!(snake.markup_fragment, "Frag");
        assert_eq!(snake.include, Options::default().include);
    }

    #[test]
    fn validate_rejects_bad_values() {
        let o = Options { passes: vec!["macro".into()], ..Default::default() };
        assert!(o.validate().is_err());
        let o = Options { include: Vec::new(), ..Default::default() };
        assert!(o.validate().is_err());
        assert!("es3".parse::<Target>().is_err());
    }
}
