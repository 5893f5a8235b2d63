//! Instruction templates with `{{variable}}` substitution.

use std::collections::HashMap;

/// Result alias for template operations.
pub type TemplateResult<T> = Result<T, TemplateError>;

/// Errors that can occur during template operations.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    /// A required variable was not provided.
    #[error("missing required variable: {name}")]
    MissingVariable {
        /// Name of the missing variable.
        name: String,
    },

    /// A structured value could not be encoded for insertion.
    #[error("failed to encode template context: {reason}")]
    Context {
        /// Reason for the failure.
        reason: String,
    },

    /// The template text is malformed.
    #[error("malformed template: {reason}")]
    Malformed {
        /// Reason for the failure.
        reason: String,
    },
}

/// An instruction template rendered with caller-supplied values.
///
/// Placeholders use `{{name}}` syntax. Rendering is a single left-to-right
/// pass, so values containing `{{...}}` are inserted verbatim and never
/// expanded again. Undeclared optional placeholders render as empty text.
///
/// # Examples
///
/// ```
/// use scene_prompts::template::PromptTemplate;
///
/// let template = PromptTemplate::builder("Divide the script into {{count}} scenes.")
///     .with_required_variable("count")
///     .build()
///     .unwrap();
///
/// let rendered = template.render_with(&[("count", "3")]).unwrap();
/// assert_eq!(rendered, "Divide the script into 3 scenes.");
/// ```
#[derive(Clone, Debug)]
pub struct PromptTemplate {
    template: String,
    defaults: HashMap<String, String>,
    required_variables: Vec<String>,
}

impl PromptTemplate {
    /// Returns a builder for constructing templates.
    #[must_use]
    pub fn builder(template: impl Into<String>) -> TemplateBuilder {
        TemplateBuilder::new(template)
    }

    /// Renders the template, with `values` taking precedence over defaults.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::MissingVariable`] if a required variable is
    /// neither supplied nor defaulted.
    pub fn render_with(&self, values: &[(&str, &str)]) -> TemplateResult<String> {
        for name in &self.required_variables {
            if self.lookup(values, name).is_none() {
                return Err(TemplateError::MissingVariable { name: name.clone() });
            }
        }

        let mut rendered = String::with_capacity(self.template.len());
        let mut rest = self.template.as_str();
        while let Some(start) = rest.find("{{") {
            rendered.push_str(&rest[..start]);
            let after_open = &rest[start + 2..];
            let Some(end) = after_open.find("}}") else {
                let offset = self.template.len() - rest.len() + start;
                return Err(TemplateError::Malformed {
                    reason: format!("unclosed placeholder at byte {offset}"),
                });
            };
            let name = after_open[..end].trim();
            rendered.push_str(self.lookup(values, name).unwrap_or_default());
            rest = &after_open[end + 2..];
        }
        rendered.push_str(rest);

        Ok(rendered)
    }

    fn lookup<'a>(&'a self, values: &[(&str, &'a str)], name: &str) -> Option<&'a str> {
        values
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| *value)
            .or_else(|| self.defaults.get(name).map(String::as_str))
    }
}

/// Builder for constructing prompt templates.
pub struct TemplateBuilder {
    template: String,
    defaults: HashMap<String, String>,
    required_variables: Vec<String>,
}

impl TemplateBuilder {
    /// Creates a new builder with the supplied template text.
    #[must_use]
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            defaults: HashMap::new(),
            required_variables: Vec::new(),
        }
    }

    /// Sets a default value for a variable.
    #[must_use]
    pub fn with_variable(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.defaults.insert(name.into(), value.into());
        self
    }

    /// Declares a variable that must be supplied at render time.
    #[must_use]
    pub fn with_required_variable(mut self, name: impl Into<String>) -> Self {
        self.required_variables.push(name.into());
        self
    }

    /// Builds the template.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::Malformed`] if a placeholder is never closed or
    /// a required variable does not appear in the template text.
    pub fn build(self) -> TemplateResult<PromptTemplate> {
        let open = self.template.matches("{{").count();
        let placeholders = extract_placeholders(&self.template);
        if placeholders.len() != open {
            return Err(TemplateError::Malformed {
                reason: "template contains an unclosed placeholder".to_owned(),
            });
        }
        if let Some(unused) = self
            .required_variables
            .iter()
            .find(|name| !placeholders.contains(&name.as_str()))
        {
            return Err(TemplateError::Malformed {
                reason: format!("required variable `{unused}` is not referenced"),
            });
        }

        Ok(PromptTemplate {
            template: self.template,
            defaults: self.defaults,
            required_variables: self.required_variables,
        })
    }
}

/// Extracts placeholder names from a template string.
fn extract_placeholders(template: &str) -> Vec<&str> {
    let mut names = Vec::new();
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        let after_open = &rest[start + 2..];
        let Some(end) = after_open.find("}}") else {
            break;
        };
        names.push(after_open[..end].trim());
        rest = &after_open[end + 2..];
    }
    names
}
