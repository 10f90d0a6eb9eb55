//! Pure validate/build step for the create, view, modify and delete forms.
//!
//! Form values arrive already extracted from the UI. Content always travels
//! in the multipart field `content`, the display name in `name`, the
//! expiration in `expire_after` (minutes), and the modify key in the `Key`
//! header. Optional inputs left empty produce no field at all, which the
//! service reads as "leave unchanged".


use crate::constants::{CONTENT_FIELD, EXPIRE_AFTER_FIELD, NAME_FIELD};
use crate::error::ValidationError;
use std::fmt;
use std::str::FromStr;

/// HTTP method of a paste request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

/// A file picked for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Unit selected next to the expire-after amount.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExpireUnit {
    #[default]
    Minutes,
    Hours,
    Days,
    Weeks,
}

impl ExpireUnit {
    /// Length of one unit in minutes, the quantity the service interprets.
    pub fn multiplier(self) -> u64 {
        match self {
            ExpireUnit::Minutes => 1,
            ExpireUnit::Hours => 60,
            ExpireUnit::Days => 60 * 24,
            ExpireUnit::Weeks => 60 * 24 * 7,
        }
    }

    fn from_suffix(suffix: char) -> Option<Self> {
        match suffix.to_ascii_lowercase() {
            'm' => Some(ExpireUnit::Minutes),
            'h' => Some(ExpireUnit::Hours),
            'd' => Some(ExpireUnit::Days),
            'w' => Some(ExpireUnit::Weeks),
            _ => None,
        }
    }
}

/// Expire-after input: a raw amount and its unit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Expiration {
    pub amount: String,
    pub unit: ExpireUnit,
}

impl Expiration {
    pub fn new(amount: impl Into<String>, unit: ExpireUnit) -> Self {
        Self {
            amount: amount.into(),
            unit,
        }
    }

    /// Resolve to a quantity in minutes.
    ///
    /// # Returns
    /// `None` when the amount is blank (the paste never expires).
    ///
    /// # Errors
    /// Rejects non-integer amounts and products that overflow.
    pub fn minutes(&self) -> Result<Option<u64>, ValidationError> {
        let amount = self.amount.trim();
        if amount.is_empty() {
            return Ok(None);
        }
        let amount: u64 = amount
            .parse()
            .map_err(|_| ValidationError::InvalidExpireAmount(amount.to_string()))?;
        amount
            .checked_mul(self.unit.multiplier())
            .map(Some)
            .ok_or(ValidationError::ExpireAmountTooLarge)
    }
}

impl FromStr for Expiration {
    type Err = ValidationError;

    /// Parse shorthand such as `90`, `30m`, `2h`, `1d` or `1w`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (amount, unit) = match s.chars().last() {
            Some(last) if last.is_ascii_alphabetic() => {
                let unit = ExpireUnit::from_suffix(last)
                    .ok_or_else(|| ValidationError::InvalidExpireAmount(s.to_string()))?;
                (&s[..s.len() - 1], unit)
            }
            _ => (s, ExpireUnit::Minutes),
        };
        if amount.trim().is_empty() {
            return Err(ValidationError::InvalidExpireAmount(s.to_string()));
        }
        let expiration = Expiration::new(amount.trim(), unit);
        expiration.minutes()?;
        Ok(expiration)
    }
}

/// One multipart form part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormField {
    Text {
        name: &'static str,
        value: String,
    },
    File {
        name: &'static str,
        file_name: String,
        bytes: Vec<u8>,
    },
}

impl FormField {
    pub fn name(&self) -> &'static str {
        match self {
            FormField::Text { name, .. } | FormField::File { name, .. } => name,
        }
    }
}

/// Transport-independent description of one paste request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasteRequest {
    pub method: Method,
    /// Path segments below the service root; empty for `/`.
    pub path: Vec<String>,
    /// Modify key for the `Key` header.
    pub key: Option<String>,
    /// Multipart body parts; an empty list means no body.
    pub fields: Vec<FormField>,
}

impl PasteRequest {
    pub fn field(&self, name: &str) -> Option<&FormField> {
        self.fields.iter().find(|field| field.name() == name)
    }

    /// Value of a text field, if present.
    pub fn text_field(&self, name: &str) -> Option<&str> {
        match self.field(name)? {
            FormField::Text { value, .. } => Some(value),
            FormField::File { .. } => None,
        }
    }

    /// Path as written on the wire, without percent-encoding.
    pub fn display_path(&self) -> String {
        format!("/{}", self.path.join("/"))
    }
}

impl fmt::Display for PasteRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method.as_str(), self.display_path())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateForm {
    pub text: String,
    pub file: Option<FileUpload>,
    pub name: String,
    pub expiration: Expiration,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModifyForm {
    pub id: String,
    pub key: String,
    pub text: String,
    pub file: Option<FileUpload>,
    pub name: String,
    pub expiration: Expiration,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteForm {
    pub id: String,
    pub key: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewForm {
    pub id: String,
    /// File-extension hint used by the service for highlighting.
    pub ext: String,
}

fn required_id(id: &str) -> Result<String, ValidationError> {
    let id = id.trim();
    if id.is_empty() {
        return Err(ValidationError::MissingId);
    }
    Ok(id.to_string())
}

fn required_key(key: &str) -> Result<String, ValidationError> {
    if key.trim().is_empty() {
        return Err(ValidationError::MissingKey);
    }
    Ok(key.to_string())
}

/// Content part: the file wins over inline text, empty text is no content.
fn content_field(text: &str, file: Option<&FileUpload>) -> Option<FormField> {
    if let Some(file) = file {
        return Some(FormField::File {
            name: CONTENT_FIELD,
            file_name: file.file_name.clone(),
            bytes: file.bytes.clone(),
        });
    }
    (!text.is_empty()).then(|| FormField::Text {
        name: CONTENT_FIELD,
        value: text.to_string(),
    })
}

fn metadata_fields(
    name: &str,
    expiration: &Expiration,
    fields: &mut Vec<FormField>,
) -> Result<(), ValidationError> {
    if let Some(minutes) = expiration.minutes()? {
        fields.push(FormField::Text {
            name: EXPIRE_AFTER_FIELD,
            value: minutes.to_string(),
        });
    }
    if !name.is_empty() {
        fields.push(FormField::Text {
            name: NAME_FIELD,
            value: name.to_string(),
        });
    }
    Ok(())
}

/// Validate the create form and build `POST /`.
///
/// # Errors
/// [`ValidationError::EmptyPaste`] when neither text nor a file is given.
pub fn build_create(form: &CreateForm) -> Result<PasteRequest, ValidationError> {
    let content =
        content_field(&form.text, form.file.as_ref()).ok_or(ValidationError::EmptyPaste)?;
    let mut fields = vec![content];
    metadata_fields(&form.name, &form.expiration, &mut fields)?;
    Ok(PasteRequest {
        method: Method::Post,
        path: Vec::new(),
        key: None,
        fields,
    })
}

/// Validate the modify form and build `PUT /{id}`.
///
/// # Errors
/// Missing id or key, or a malformed expiration.
pub fn build_modify(form: &ModifyForm) -> Result<PasteRequest, ValidationError> {
    let id = required_id(&form.id)?;
    let key = required_key(&form.key)?;
    let mut fields: Vec<FormField> = content_field(&form.text, form.file.as_ref())
        .into_iter()
        .collect();
    metadata_fields(&form.name, &form.expiration, &mut fields)?;
    Ok(PasteRequest {
        method: Method::Put,
        path: vec![id],
        key: Some(key),
        fields,
    })
}

/// Validate the delete form and build `DELETE /{id}`.
///
/// # Errors
/// Missing id or key.
pub fn build_delete(form: &DeleteForm) -> Result<PasteRequest, ValidationError> {
    Ok(PasteRequest {
        method: Method::Delete,
        path: vec![required_id(&form.id)?],
        key: Some(required_key(&form.key)?),
        fields: Vec::new(),
    })
}

/// Path segments of the view URL, `/{id}` or `/{id}/{ext}`.
///
/// # Errors
/// [`ValidationError::MissingId`] when the id is blank.
pub fn view_path(form: &ViewForm) -> Result<Vec<String>, ValidationError> {
    let mut path = vec![required_id(&form.id)?];
    let ext = form.ext.trim().trim_start_matches('.');
    if !ext.is_empty() {
        path.push(ext.to_string());
    }
    Ok(path)
}
