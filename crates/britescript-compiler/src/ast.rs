//! ast.rs — AST minimal de Britescript.
//!
//! On ne modélise que ce qui se réécrit ; tout le reste est une tranche
//! `Other` recopiée telle quelle. Les nœuds d’une séquence sont contigus et
//! couvrent exactement le span de la séquence : concaténer leurs sources
//! redonne le texte d’origine.

use crate::lexer::Span;

/// Fichier complet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    pub nodes: Vec<Node>,
    pub span: Span,
}

/// Suite contiguë de nœuds (corps, tête de pipe, arguments…).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Seq {
    pub nodes: Vec<Node>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Struct(StructDecl),
    Trait(TraitDecl),
    Impl(ImplDecl),
    Let(LetBinding),
    Pipe(PipeExpr),
    Other(Span),
}

/// `struct Name<G> { f; f; }`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructDecl {
    pub name: String,
    pub generics: Option<String>,
    /// Champs nettoyés (sans `;` final, jamais vides).
    pub fields: Vec<String>,
    pub span: Span,
}

/// `trait Name<G> { … }`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraitDecl {
    pub name: String,
    pub generics: Option<String>,
    /// Intérieur des accolades.
    pub body: Seq,
    pub span: Span,
}

/// `impl Trait<G> for Target<TG> { … }`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImplDecl {
    pub trait_name: String,
    pub generics: Option<String>,
    pub target: String,
    pub target_generics: Option<String>,
    pub body: Seq,
    pub span: Span,
}

/// Le mot-clé `let` seul.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LetBinding {
    pub span: Span,
}

/// `head |> stage |> stage …`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipeExpr {
    pub head: Seq,
    pub stages: Vec<PipeStage>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipeStage {
    pub callee: Callee,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Callee {
    /// `f`, `ns.f`, `f(a, b)` — `args` couvre l’intérieur des parenthèses.
    Path { path: String, args: Option<Seq> },
    /// `( … )` parenthèses comprises.
    Expr(Seq),
}

impl Node {
    pub fn span(&self) -> Span {
        match self {
            Node::Struct(d) => d.span,
            Node::Trait(d) => d.span,
            Node::Impl(d) => d.span,
            Node::Let(b) => b.span,
            Node::Pipe(p) => p.span,
            Node::Other(s) => *s,
        }
    }

    /// Sous-séquences à émettre récursivement quand le nœud est recopié tel quel.
    pub fn holes(&self) -> Vec<&Seq> {
        match self {
            Node::Trait(d) => vec![&d.body],
            Node::Impl(d) => vec![&d.body],
            Node::Pipe(p) => {
                let mut v = vec![&p.head];
                for st in &p.stages {
                    match &st.callee {
                        Callee::Path { args: Some(a), .. } => v.push(a),
                        Callee::Expr(g) => v.push(g),
                        Callee::Path { args: None, .. } => {}
                    }
                }
                v
            }
            Node::Struct(_) | Node::Let(_) | Node::Other(_) => Vec::new(),
        }
    }
}
