use std::fmt;

use crate::error::CompileError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub file: Option<String>,
    pub line: Option<u32>,
    pub column: Option<u32>,
}

impl Diagnostic {
    pub fn error(msg: impl Into<String>) -> Self {
        Self { severity: Severity::Error, message: msg.into(), file: None, line: None, column: None }
    }

    pub fn warning(msg: impl Into<String>) -> Self {
        Self { severity: Severity::Warning, message: msg.into(), file: None, line: None, column: None }
    }

    pub fn at(mut self, file: &str, line: u32, column: u32) -> Self {
        self.file = Some(file.to_string());
        self.line = Some(line);
        self.column = Some(column);
        self
    }
}

/// Erreur fatale d’un fichier, localisée quand l’erreur porte une position.
impl From<&CompileError> for Diagnostic {
    fn from(e: &CompileError) -> Self {
        match e {
            CompileError::NestingTooDeep { file, line, col, limit } => {
                Diagnostic::error(format!("imbrication trop profonde (limite {limit})")).at(file, *line, *col)
            }
            other => Diagnostic::error(other.to_string()),
        }
    }
}

/// `file:line:col: message` (les morceaux absents sont omis).
impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(file) = &self.file {
            write!(f, "{file}:")?;
            if let (Some(l), Some(c)) = (self.line, self.column) {
                write!(f, "{l}:{c}:")?;
            }
            write!(f, " ")?;
        }
        f.write_str(&self.message)
    }
}
