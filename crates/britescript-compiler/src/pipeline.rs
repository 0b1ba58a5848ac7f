//! pipeline.rs — Orchestrateur : détection → parse → passes → émission → map → deps.
//!
//! `Compiler::compile` ne retourne jamais `Err` : toute `CompileError` devient
//! `CompileResult { code: "", errors: [message] }`.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::codegen::Emitter;
use crate::config::Options;
use crate::deps::extract_dependencies;
use crate::detect::detect_markers;
use crate::diagnostics::Diagnostic;
use crate::error::Result;
use crate::filter::Filter;
use crate::parser::Parser;
use crate::passes::Passes;
use crate::source::SourceUnit;
use crate::sourcemap;

/// Requête d’un hôte (bundler, CLI…).
#[derive(Debug, Clone, Copy)]
pub struct TransformRequest<'a> {
    pub id: &'a str,
    pub code: &'a str,
    pub build: bool,
    pub ssr: bool,
}

impl<'a> TransformRequest<'a> {
    pub fn new(id: &'a str, code: &'a str) -> Self {
        Self { id, code, build: false, ssr: false }
    }

    pub fn build(mut self, yes: bool) -> Self { self.build = yes; self }
    pub fn ssr(mut self, yes: bool) -> Self { self.ssr = yes; self }
}

/// Produit d’une compilation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompileResult {
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub map: Option<String>,
    pub dependencies: Vec<String>,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl CompileResult {
    pub fn failure(msg: impl Into<String>) -> Self {
        Self { errors: vec![msg.into()], ..Default::default() }
    }

    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Compilateur configuré (options validées, filtre et passes prêts).
#[derive(Debug, Clone)]
pub struct Compiler {
    options: Options,
    filter: Filter,
    passes: Passes,
}

impl Compiler {
    pub fn new(options: Options) -> Result<Self> {
        options.validate()?;
        let filter = Filter::from_options(&options)?;
        let passes = options.passes()?;
        Ok(Self { options, filter, passes })
    }

    pub fn options(&self) -> &Options { &self.options }
    pub fn passes(&self) -> &Passes { &self.passes }

    /// Remplace le jeu de passes (tests d’une passe isolée).
    pub fn with_passes(mut self, passes: Passes) -> Self {
        self.passes = passes;
        self
    }

    pub fn accepts(&self, id: &str) -> bool {
        self.filter.accepts(id)
    }

    /// Hook hôte : `None` si le fichier n’est pas éligible.
    pub fn transform(&self, req: &TransformRequest<'_>) -> Option<CompileResult> {
        if !self.accepts(req.id) {
            return None;
        }
        Some(self.compile(req))
    }

    /// Compile un fichier, sans jamais échouer.
    pub fn compile(&self, req: &TransformRequest<'_>) -> CompileResult {
        match self.try_compile(req) {
            Ok(r) => r,
            Err(e) => {
                let diag = Diagnostic::from(&e);
                warn!(id = req.id, line = ?diag.line, error = %e, "échec de compilation");
                CompileResult::failure(diag.to_string())
            }
        }
    }

    fn try_compile(&self, req: &TransformRequest<'_>) -> Result<CompileResult> {
        let unit = SourceUnit::new(req.id, req.code);
        let markup = unit.is_markup_variant() && self.options.markup_passthrough;

        let markers = detect_markers(unit.text);
        if markers.is_empty() {
            debug!(id = unit.identifier, "aucune syntaxe étendue");
            return Ok(CompileResult {
                code: unit.text.to_string(),
                dependencies: extract_dependencies(unit.text, markup),
                ..Default::default()
            });
        }

        let (module, diags) = Parser::new(unit.text, unit.identifier, markup).parse_module()?;
        let out = Emitter::new(unit.text, &self.passes).emit_module(&module)?;
        let map = if self.options.source_maps {
            Some(sourcemap::render(unit.identifier, unit.text, &out.code, &out.anchors)?)
        } else {
            None
        };
        let dependencies = extract_dependencies(&out.code, markup);

        if self.options.verbose {
            info!(id = unit.identifier, ?markers, passes = %self.passes, build = req.build, ssr = req.ssr, "compilé");
            info!(preview = %preview(&out.code), "sortie");
        } else {
            debug!(id = unit.identifier, ?markers, deps = dependencies.len(), "compilé");
        }

        Ok(CompileResult {
            code: out.code,
            map,
            dependencies,
            warnings: diags.iter().map(ToString::to_string).collect(),
            errors: Vec::new(),
        })
    }
}

/// Compile une chaîne avec des options ponctuelles.
pub fn compile_str(id: &str, code: &str, options: &Options) -> CompileResult {
    match Compiler::new(options.clone()) {
        Ok(c) => c.compile(&TransformRequest::new(id, code)),
        Err(e) => CompileResult::failure(e.to_string()),
    }
}

fn preview(code: &str) -> &str {
    match code.char_indices().nth(200) {
        Some((i, _)) => &code[..i],
        None => code,
    }
}
