//! Validation of the repository settings form.

use gitview_types::AccessRestriction;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use validator::{ValidationError, ValidationErrors};

/// Regex for owner usernames.
pub static USERNAME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9][a-zA-Z0-9._@-]*$").expect("Invalid regex"));

/// Maximum length of a repository description.
pub const MAX_DESCRIPTION_LENGTH: usize = 1000;

/// Maximum length of an owner username.
pub const MAX_USERNAME_LENGTH: usize = 100;

/// A submitted settings form. Unchecked checkboxes are absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EditForm {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub access_restriction: String,
    #[serde(default)]
    pub use_tickets: Option<String>,
    #[serde(default)]
    pub use_docs: Option<String>,
}

impl EditForm {
    /// Validates every field, collecting all failures.
    pub fn validate(&self) -> Result<AccessRestriction, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Err(e) = validate_description(&self.description) {
            errors.add("description", e);
        }
        if let Err(e) = validate_owner(&self.owner) {
            errors.add("owner", e);
        }
        let restriction = validate_access_restriction(&self.access_restriction);
        if let Err(e) = &restriction {
            errors.add("access_restriction", e.clone());
        }
        match restriction {
            Ok(restriction) if errors.is_empty() => Ok(restriction),
            _ => Err(errors),
        }
    }

    /// Owner username, `None` when left blank.
    pub fn owner(&self) -> Option<String> {
        Some(self.owner.trim())
            .filter(|owner| !owner.is_empty())
            .map(str::to_string)
    }

    /// Returns true when the tickets checkbox was ticked.
    pub fn use_tickets(&self) -> bool {
        self.use_tickets.is_some()
    }

    /// Returns true when the docs checkbox was ticked.
    pub fn use_docs(&self) -> bool {
        self.use_docs.is_some()
    }
}

/// Validate a repository description.
pub fn validate_description(description: &str) -> Result<(), ValidationError> {
    if description.chars().count() > MAX_DESCRIPTION_LENGTH {
        let mut err = ValidationError::new("length");
        err.message = Some(
            format!("Description must be at most {} characters", MAX_DESCRIPTION_LENGTH).into(),
        );
        return Err(err);
    }
    if description.contains(['\n', '\r']) {
        let mut err = ValidationError::new("newline");
        err.message = Some("Description must be a single line".into());
        return Err(err);
    }
    Ok(())
}

/// Validate an owner username. Blank means no owner.
pub fn validate_owner(owner: &str) -> Result<(), ValidationError> {
    let owner = owner.trim();
    if owner.is_empty() {
        return Ok(());
    }
    if owner.len() > MAX_USERNAME_LENGTH {
        let mut err = ValidationError::new("length");
        err.message =
            Some(format!("Owner must be at most {} characters", MAX_USERNAME_LENGTH).into());
        return Err(err);
    }
    if !USERNAME_REGEX.is_match(owner) {
        let mut err = ValidationError::new("pattern");
        err.message = Some("Owner is not a valid username".into());
        return Err(err);
    }
    Ok(())
}

/// Validate and parse an access restriction.
pub fn validate_access_restriction(value: &str) -> Result<AccessRestriction, ValidationError> {
    AccessRestriction::parse(value).ok_or_else(|| {
        let mut err = ValidationError::new("restriction");
        err.message = Some(format!("Unknown access restriction '{}'", value).into());
        err
    })
}

/// Flattens validation errors into display messages, sorted by field.
pub fn error_messages(errors: &ValidationErrors) -> Vec<String> {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));
    fields
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Validation failed for field '{}'", field))
            })
        })
        .collect()
}
