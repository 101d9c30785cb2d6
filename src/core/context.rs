//! Substitution context - named values rendered into command templates

use regex::Regex;
use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;
use thiserror::Error;

/// Name of the file being run, e.g. `main.cpp`
pub const FILE_NAME: &str = "fileName";
/// File name with its extension stripped, e.g. `main`
pub const FILE_NAME_WITHOUT_EXT: &str = "fileNameWithoutExt";
/// Directory holding judger resources
pub const JUDGER_DIR: &str = "judgerDir";
/// Expected output file
pub const EXPECT_FILE: &str = "expectFile";
/// Actual output file
pub const REAL_FILE: &str = "realFile";

/// Error while rendering a template
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RenderError {
    #[error("unknown variable '{{{0}}}'")]
    UnknownVariable(String),

    #[error("unbalanced '{brace}' at offset {offset}")]
    UnbalancedBrace { brace: char, offset: usize },
}

/// Values available to a pipeline's command templates
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubstitutionContext {
    variables: HashMap<String, String>,
}

fn placeholder_regex() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| {
        Regex::new(r"\{\{|\}\}|\{([^{}]*)\}|[{}]").expect("placeholder pattern is valid")
    })
}

impl SubstitutionContext {
    /// Create an empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Context for running a single source file
    pub fn for_file(file_name: &str) -> Self {
        let stem = Path::new(file_name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(file_name);

        let mut ctx = Self::new();
        ctx.set_variable(FILE_NAME, file_name);
        ctx.set_variable(FILE_NAME_WITHOUT_EXT, stem);
        ctx
    }

    /// Context for running a judger
    pub fn for_judger(judger_dir: &Path, expect_file: &Path, real_file: &Path) -> Self {
        let mut ctx = Self::new();
        ctx.set_variable(JUDGER_DIR, judger_dir.display().to_string());
        ctx.set_variable(EXPECT_FILE, expect_file.display().to_string());
        ctx.set_variable(REAL_FILE, real_file.display().to_string());
        ctx
    }

    /// Set a variable
    pub fn set_variable(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.variables.insert(key.into(), value.into());
    }

    /// Get a variable
    pub fn get_variable(&self, key: &str) -> Option<&String> {
        self.variables.get(key)
    }

    /// Render a template
    ///
    /// `{name}` is replaced by the variable's value, `{{` and `}}` produce
    /// literal braces. A placeholder with no value, or a lone brace, is an
    /// error rather than being passed through to the shell.
    pub fn render(&self, template: &str) -> Result<String, RenderError> {
        let mut rendered = String::with_capacity(template.len());
        let mut last = 0;

        for caps in placeholder_regex().captures_iter(template) {
            let Some(whole) = caps.get(0) else { continue };
            rendered.push_str(&template[last..whole.start()]);

            match whole.as_str() {
                "{{" => rendered.push('{'),
                "}}" => rendered.push('}'),
                "{" => {
                    return Err(RenderError::UnbalancedBrace { brace: '{', offset: whole.start() })
                }
                "}" => {
                    return Err(RenderError::UnbalancedBrace { brace: '}', offset: whole.start() })
                }
                _ => {
                    let name = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
                    let value = self
                        .variables
                        .get(name)
                        .ok_or_else(|| RenderError::UnknownVariable(name.to_string()))?;
                    rendered.push_str(value);
                }
            }

            last = whole.end();
        }

        rendered.push_str(&template[last..]);
        Ok(rendered)
    }
}
