//! Template entity
//!
//! Only the parameter declarations matter here: they drive default parameter
//! injection and required-parameter checks.

use std::path::Path;

use serde_json::Value;

use crate::error::{DeployError, DeployResult};

/// Source format of a template
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateFormat {
    /// ARM JSON template
    ArmJson,
    /// Bicep source
    Bicep,
}

impl TemplateFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("json") | Some("jsonc") => Some(TemplateFormat::ArmJson),
            Some("bicep") => Some(TemplateFormat::Bicep),
            _ => None,
        }
    }
}

/// One declared template parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateParameter {
    pub name: String,
    /// No default value and not nullable
    pub required: bool,
}

/// Parameter declarations of a template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateInfo {
    pub format: TemplateFormat,
    pub parameters: Vec<TemplateParameter>,
}

impl TemplateInfo {
    /// Parse template content; the format is taken from the file extension,
    /// falling back to JSON for unknown extensions.
    pub fn parse(path: &Path, content: &str) -> DeployResult<Self> {
        let format = TemplateFormat::from_path(path).unwrap_or(TemplateFormat::ArmJson);
        let parameters = match format {
            TemplateFormat::ArmJson => parse_arm_parameters(path, content)?,
            TemplateFormat::Bicep => parse_bicep_parameters(content),
        };
        Ok(Self { format, parameters })
    }

    /// Whether the template declares a parameter (case-insensitive, as the
    /// provider treats parameter names)
    pub fn declares(&self, name: &str) -> bool {
        self.parameters
            .iter()
            .any(|p| p.name.eq_ignore_ascii_case(name))
    }

    pub fn required(&self) -> impl Iterator<Item = &TemplateParameter> {
        self.parameters.iter().filter(|p| p.required)
    }
}

/// Strip a UTF-8 byte order mark and `//` or `/* */` comments from JSON text.
///
/// ARM templates and parameter files may carry comments; text inside string
/// literals is kept as is. Line breaks inside block comments are kept so
/// parse errors still point at the right line.
pub fn strip_json_comments(content: &str) -> String {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut out = String::with_capacity(content.len());
    let mut chars = content.chars().peekable();
    let mut in_string = false;

    while let Some(c) = chars.next() {
        if in_string {
            out.push(c);
            match c {
                '\\' => {
                    if let Some(escaped) = chars.next() {
                        out.push(escaped);
                    }
                }
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match (c, chars.peek().copied()) {
            ('"', _) => {
                in_string = true;
                out.push(c);
            }
            ('/', Some('/')) => {
                while let Some(&next) = chars.peek() {
                    if next == '\n' {
                        break;
                    }
                    chars.next();
                }
            }
            ('/', Some('*')) => {
                chars.next();
                let mut prev = '\0';
                for next in chars.by_ref() {
                    if prev == '*' && next == '/' {
                        break;
                    }
                    if next == '\n' {
                        out.push('\n');
                    }
                    prev = next;
                }
                out.push(' ');
            }
            _ => out.push(c),
        }
    }
    out
}

fn parse_arm_parameters(path: &Path, content: &str) -> DeployResult<Vec<TemplateParameter>> {
    let doc: Value = serde_json::from_str(&strip_json_comments(content)).map_err(|e| {
        DeployError::InvalidTemplate {
            path: path.to_path_buf(),
            message: e.to_string(),
        }
    })?;

    let Some(root) = doc.as_object() else {
        return Err(DeployError::InvalidTemplate {
            path: path.to_path_buf(),
            message: "template root must be a JSON object".to_string(),
        });
    };

    let Some(params) = root.get("parameters").and_then(Value::as_object) else {
        return Ok(Vec::new());
    };

    Ok(params
        .iter()
        .map(|(name, decl)| {
            let has_default = decl.get("defaultValue").is_some();
            let nullable = decl
                .get("nullable")
                .and_then(Value::as_bool)
                .unwrap_or(false);
            TemplateParameter {
                name: name.clone(),
                required: !has_default && !nullable,
            }
        })
        .collect())
}

fn parse_bicep_parameters(content: &str) -> Vec<TemplateParameter> {
    content
        .lines()
        .filter_map(|line| {
            let rest = line.trim_start().strip_prefix("param ")?;
            let mut parts = rest.split_whitespace();
            let name = parts.next()?.to_string();
            let ty = parts.next().unwrap_or_default();
            let required = !rest.contains('=') && !ty.ends_with('?');
            Some(TemplateParameter { name, required })
        })
        .collect()
}
