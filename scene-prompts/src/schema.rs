//! Response schemas requested from the model and their local enforcement.
//!
//! The same [`ResponseSchema`] value is serialised into the generation request
//! (the provider's OpenAPI-style subset) and used to validate the reply before
//! it is deserialised into typed records. Validation fails closed: wrong
//! types, missing required properties and undeclared properties are all
//! rejected.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde_json::Value;

/// JSON types understood by the provider's schema dialect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SchemaType {
    /// UTF-8 string.
    String,
    /// Whole number.
    Integer,
    /// Key/value object.
    Object,
    /// Ordered list.
    Array,
}

impl fmt::Display for SchemaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Object => "object",
            Self::Array => "array",
        })
    }
}

/// Declared shape of a structured model response.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseSchema {
    #[serde(rename = "type")]
    kind: SchemaType,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    items: Option<Box<ResponseSchema>>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    properties: BTreeMap<String, ResponseSchema>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    required: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    property_ordering: Vec<String>,
}

impl ResponseSchema {
    fn scalar(kind: SchemaType) -> Self {
        Self {
            kind,
            description: None,
            items: None,
            properties: BTreeMap::new(),
            required: Vec::new(),
            property_ordering: Vec::new(),
        }
    }

    /// A string value.
    #[must_use]
    pub fn string() -> Self {
        Self::scalar(SchemaType::String)
    }

    /// An integer value.
    #[must_use]
    pub fn integer() -> Self {
        Self::scalar(SchemaType::Integer)
    }

    /// An array whose elements all match `items`.
    #[must_use]
    pub fn array(items: Self) -> Self {
        Self {
            items: Some(Box::new(items)),
            ..Self::scalar(SchemaType::Array)
        }
    }

    /// An empty object; add members with [`ResponseSchema::required_property`].
    #[must_use]
    pub fn object() -> Self {
        Self::scalar(SchemaType::Object)
    }

    /// Attaches a description that guides the model.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Adds a property that must be present.
    #[must_use]
    pub fn required_property(mut self, name: impl Into<String>, schema: Self) -> Self {
        let name = name.into();
        self.required.push(name.clone());
        self.property_ordering.push(name.clone());
        self.properties.insert(name, schema);
        self
    }

    /// Adds a property that may be omitted.
    #[must_use]
    pub fn optional_property(mut self, name: impl Into<String>, schema: Self) -> Self {
        let name = name.into();
        self.property_ordering.push(name.clone());
        self.properties.insert(name, schema);
        self
    }

    /// Returns the top-level type.
    #[must_use]
    pub const fn kind(&self) -> SchemaType {
        self.kind
    }

    /// Checks `value` against this schema.
    ///
    /// # Errors
    ///
    /// Returns the first [`SchemaViolation`] found, with a JSON-pointer-like
    /// path to the offending value.
    pub fn validate(&self, value: &Value) -> Result<(), SchemaViolation> {
        self.validate_at(value, &mut String::new())
    }

    fn validate_at(&self, value: &Value, path: &mut String) -> Result<(), SchemaViolation> {
        match self.kind {
            SchemaType::String if value.is_string() => Ok(()),
            SchemaType::Integer if value.is_i64() || value.is_u64() => Ok(()),
            SchemaType::Array => {
                let Some(elements) = value.as_array() else {
                    return Err(SchemaViolation::type_mismatch(path, self.kind, value));
                };
                let Some(items) = self.items.as_deref() else {
                    return Ok(());
                };
                for (index, element) in elements.iter().enumerate() {
                    let len = path.len();
                    path.push('/');
                    path.push_str(&index.to_string());
                    items.validate_at(element, path)?;
                    path.truncate(len);
                }
                Ok(())
            }
            SchemaType::Object => {
                let Some(members) = value.as_object() else {
                    return Err(SchemaViolation::type_mismatch(path, self.kind, value));
                };
                if let Some(missing) = self.required.iter().find(|name| !members.contains_key(*name)) {
                    return Err(SchemaViolation::new(
                        path,
                        format!("missing required property `{missing}`"),
                    ));
                }
                for (name, member) in members {
                    let Some(schema) = self.properties.get(name) else {
                        return Err(SchemaViolation::new(
                            path,
                            format!("undeclared property `{name}`"),
                        ));
                    };
                    let len = path.len();
                    path.push('/');
                    path.push_str(name);
                    schema.validate_at(member, path)?;
                    path.truncate(len);
                }
                Ok(())
            }
            _ => Err(SchemaViolation::type_mismatch(path, self.kind, value)),
        }
    }

    /// Schema for the image prompt list.
    #[must_use]
    pub fn image_prompts() -> Self {
        Self::array(
            Self::object()
                .required_property(
                    "scene",
                    Self::integer().with_description("The scene number, starting from 1."),
                )
                .required_property(
                    "image_prompt",
                    Self::string().with_description(
                        "The highly detailed, infographic-style prompt for the AI image generator.",
                    ),
                ),
        )
    }

    /// Schema for the video prompt list.
    #[must_use]
    pub fn video_prompts() -> Self {
        Self::array(
            Self::object()
                .required_property(
                    "scene",
                    Self::integer().with_description("The scene number, starting from 1."),
                )
                .required_property(
                    "video_prompt",
                    Self::string().with_description(
                        "The corresponding cinematic, motion-based prompt for the AI video generator.",
                    ),
                ),
        )
    }

    /// Schema for the structured scene record list.
    #[must_use]
    pub fn json_prompts() -> Self {
        let element = Self::object()
            .required_property(
                "type",
                Self::string()
                    .with_description("The type of element (e.g., map, character, icon, text)."),
            )
            .required_property(
                "description",
                Self::string().with_description("A detailed description of the element."),
            );

        Self::array(
            Self::object()
                .required_property("scene", Self::integer())
                .required_property(
                    "scene_description",
                    Self::string()
                        .with_description("A concise summary of the scene's content from the image prompt."),
                )
                .required_property(
                    "style",
                    Self::string().with_description(
                        "The overall visual style (e.g., Minimalistic infographic, cinematic, hyperrealistic).",
                    ),
                )
                .required_property(
                    "camera_motion",
                    Self::string()
                        .with_description("The specific camera movement or animation from the video prompt."),
                )
                .required_property(
                    "elements",
                    Self::array(element).with_description("Key visual elements in the scene."),
                )
                .required_property(
                    "duration",
                    Self::string()
                        .with_description("An estimated duration for the video clip, e.g., '8 seconds'."),
                )
                .required_property(
                    "resolution",
                    Self::string().with_description("The target resolution, e.g., '4K', '1080p'."),
                ),
        )
    }
}

/// A response value that does not match its declared schema.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("schema violation at `{path}`: {reason}")]
pub struct SchemaViolation {
    path: String,
    reason: String,
}

impl SchemaViolation {
    fn new(path: &str, reason: impl Into<String>) -> Self {
        let path = if path.is_empty() { "/" } else { path };
        Self {
            path: path.to_owned(),
            reason: reason.into(),
        }
    }

    fn type_mismatch(path: &str, expected: SchemaType, found: &Value) -> Self {
        let found = match found {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(number) if number.is_f64() => "fractional number",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        };
        Self::new(path, format!("expected {expected}, found {found}"))
    }

    /// Location of the offending value, `/` for the root.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Human-readable description of the mismatch.
    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }
}
