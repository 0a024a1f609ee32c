use std::collections::HashMap;
use std::io;

use bytes::Bytes;

use crate::error::FormError;

/// Named text fields of a `multipart/form-data` body.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FormFields(HashMap<String, String>);

impl FormFields {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Decode a multipart body using the boundary declared in `content_type`.
///
/// Parts without a name are ignored. A later part with the same name replaces
/// an earlier one.
pub async fn parse_form(content_type: Option<&str>, body: Bytes) -> Result<FormFields, FormError> {
    let content_type = content_type.ok_or(FormError::MissingContentType)?;
    let boundary = multer::parse_boundary(content_type)?;

    let stream = futures::stream::once(async move { Ok::<Bytes, io::Error>(body) });
    let mut multipart = multer::Multipart::new(stream, boundary);

    let mut fields = HashMap::new();
    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };
        let value = field.text().await?;
        fields.insert(name, value);
    }

    Ok(FormFields(fields))
}
