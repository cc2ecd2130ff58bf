use serde::{Deserialize, Serialize};

/// Broad category of a [`CompileError`], used for diagnostics and JSON output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Unmatched delimiters or braces, unknown command, bad arity or flag.
    Syntax,
    /// A bound or size argument is not numeric.
    Conversion,
    /// `get` of a logical name that was never bound.
    Binding,
    /// The template could not be read or the output could not be written.
    Io,
    /// Expansion kept producing commands past the configured pass ceiling.
    Diverged,
}

/// A compilation error. Parse and collapse failures abort the whole
/// compilation of a document; nothing is written for that attempt.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CompileError {
    #[error("syntax error: {0}")]
    Syntax(String),

    #[error("conversion error: {0}")]
    Conversion(String),

    #[error("binding error: {0}")]
    Binding(String),

    #[error("expansion did not settle after {passes} passes")]
    Diverged { passes: usize },

    #[error("cannot access '{path}': {message}")]
    Io { path: String, message: String },

    /// Any of the above, raised while a specific template line was being
    /// parsed or compiled.
    #[error("error in [{file}] on line {line}: {source}")]
    Located {
        file: String,
        line: u32,
        source: Box<CompileError>,
    },
}

impl CompileError {
    pub fn syntax(message: impl Into<String>) -> Self {
        CompileError::Syntax(message.into())
    }

    pub fn conversion(message: impl Into<String>) -> Self {
        CompileError::Conversion(message.into())
    }

    pub fn binding(message: impl Into<String>) -> Self {
        CompileError::Binding(message.into())
    }

    pub fn io(path: &str, err: &std::io::Error) -> Self {
        CompileError::Io {
            path: path.to_owned(),
            message: err.to_string(),
        }
    }

    /// Attach a file and 1-based line number. An error that already carries
    /// a location keeps the innermost one.
    pub fn at(self, file: &str, line: u32) -> Self {
        match self {
            CompileError::Located { .. } => self,
            other => CompileError::Located {
                file: file.to_owned(),
                line,
                source: Box::new(other),
            },
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            CompileError::Syntax(_) => ErrorKind::Syntax,
            CompileError::Conversion(_) => ErrorKind::Conversion,
            CompileError::Binding(_) => ErrorKind::Binding,
            CompileError::Diverged { .. } => ErrorKind::Diverged,
            CompileError::Io { .. } => ErrorKind::Io,
            CompileError::Located { source, .. } => source.kind(),
        }
    }

    /// The bare message, without kind prefix or location.
    pub fn message(&self) -> String {
        match self {
            CompileError::Syntax(m) | CompileError::Conversion(m) | CompileError::Binding(m) => {
                m.clone()
            }
            CompileError::Located { source, .. } => source.message(),
            other => other.to_string(),
        }
    }

    pub fn location(&self) -> Option<(&str, u32)> {
        match self {
            CompileError::Located { file, line, .. } => Some((file.as_str(), *line)),
            _ => None,
        }
    }

    /// Serialize for `--output json`. Always includes every field, `null`
    /// when the error carries no location.
    pub fn to_json_value(&self) -> serde_json::Value {
        let (file, line) = match self.location() {
            Some((f, l)) => (Some(f), Some(l)),
            None => (None, None),
        };
        serde_json::json!({
            "file":    file,
            "kind":    self.kind(),
            "line":    line,
            "message": self.message(),
        })
    }
}
