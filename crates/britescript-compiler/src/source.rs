//! source.rs — Unité source (identifiant + texte + variante de fichier).

/// Variante déduite du suffixe de l’identifiant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// `.bs`
    Plain,
    /// `.bsx` : peut embarquer du markup (JSX-like).
    Markup,
    /// Autre suffixe (traité comme `Plain`).
    Foreign,
}

impl SourceKind {
    /// Détecte la variante par suffixe. Les suffixes de requête (`?raw`…) sont ignorés.
    pub fn detect(identifier: &str) -> Self {
        let path = identifier.split('?').next().unwrap_or(identifier);
        if path.ends_with(".bsx") {
            SourceKind::Markup
        } else if path.ends_with(".bs") {
            SourceKind::Plain
        } else {
            SourceKind::Foreign
        }
    }

    /// Extension TypeScript de sortie correspondante.
    pub fn output_extension(self) -> &'static str {
        match self {
            SourceKind::Markup => "tsx",
            SourceKind::Plain | SourceKind::Foreign => "ts",
        }
    }
}

/// Entrée immuable d’une compilation.
#[derive(Debug, Clone, Copy)]
pub struct SourceUnit<'a> {
    pub identifier: &'a str,
    pub text: &'a str,
    pub kind: SourceKind,
}

impl<'a> SourceUnit<'a> {
    pub fn new(identifier: &'a str, text: &'a str) -> Self {
        Self { identifier, text, kind: SourceKind::detect(identifier) }
    }

    pub fn is_markup_variant(&self) -> bool {
        self.kind == SourceKind::Markup
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_from_suffix() {
        assert_eq!(SourceKind::detect("src/app.bs"), SourceKind::Plain);
        assert_eq!(SourceKind::detect("src/App.bsx"), SourceKind::Markup);
        assert_eq!(SourceKind::detect("src/App.bsx?import"), SourceKind::Markup);
        assert_eq!(SourceKind::detect("src/main.ts"), SourceKind::Foreign);
        assert!(SourceUnit::new("x.bsx", "").is_markup_variant());
        assert_eq!(SourceKind::Markup.output_extension(), "tsx");
    }
}
