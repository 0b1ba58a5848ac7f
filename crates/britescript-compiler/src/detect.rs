//! detect.rs — Détection rapide de syntaxe étendue.
//!
//! Filtre grossier avant l’analyse : si aucun marqueur n’apparaît, le fichier
//! traverse le compilateur sans être tokenisé. Les faux positifs (mot-clé dans
//! une chaîne ou un commentaire) sont sans conséquence, le parseur tranche.
//! La sortie du compilateur ne contient plus de marqueur : `const` n’est pas
//! détecté, `implements` non plus (`\b` + espace obligatoire).

use once_cell::sync::Lazy;
use regex::RegexSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Struct,
    Trait,
    Impl,
    Let,
    Pipe,
}

impl Marker {
    pub const ALL: [Marker; 5] = [Marker::Struct, Marker::Trait, Marker::Impl, Marker::Let, Marker::Pipe];
}

static MARKERS: Lazy<RegexSet> = Lazy::new(|| {
    RegexSet::new([
        r"\bstruct\s+[A-Za-z_$]",
        r"\btrait\s+[A-Za-z_$]",
        r"\bimpl\s+[A-Za-z_$]",
        r"\blet\s+[A-Za-z_$\[{]",
        r"\|>",
    ])
    .expect("motifs de détection constants")
});

/// Vrai si au moins un marqueur est présent.
pub fn contains_extended_syntax(text: &str) -> bool {
    MARKERS.is_match(text)
}

/// Marqueurs présents, dans l’ordre de `Marker::ALL`.
pub fn detect_markers(text: &str) -> Vec<Marker> {
    MARKERS.matches(text).iter().map(|i| Marker::ALL[i]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_each_marker() {
        assert_eq!(detect_markers("struct User { a: string }"), vec![Marker::Struct]);
        assert_eq!(detect_markers("let x = a |> f;"), vec![Marker::Let, Marker::Pipe]);
        assert_eq!(detect_markers("impl Show for User {}"), vec![Marker::Impl]);
        assert!(contains_extended_syntax("let [a, b] = pair;"));
    }

    #[test]
    fn plain_typescript_is_not_detected() {
        let ts = "const x = 1;\ninterface Show { show(): string }\nclass A implements Show {}\n";
        assert!(!contains_extended_syntax(ts));
        assert!(!contains_extended_syntax("const outlet = 1; a || b;"));
    }

    #[test]
    fn compiled_output_is_stable() {
        let out = "type User = {\n  name: string;\n};\nconst x = f(y);";
        assert!(detect_markers(out).is_empty());
    }
}
