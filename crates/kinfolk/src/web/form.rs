//! Person form parsing.
//!
//! The add and edit forms are accepted as `multipart/form-data` (needed for
//! a photo) or as `application/x-www-form-urlencoded`. Either way a malformed
//! body surfaces as [`Error::Form`].

use axum::body::Bytes;
use axum::extract::{FromRequest, Multipart, Request};
use axum::http::header;
use axum::Form;
use tracing::debug;

use crate::error::{Error, Result};
use crate::person::PersonDraft;

/// An uploaded photo, not yet saved.
#[derive(Debug, Clone)]
pub struct Photo {
    /// File name as sent by the client.
    pub file_name: String,
    /// File contents.
    pub bytes: Bytes,
}

/// A submitted add/edit form.
#[derive(Debug, Clone, Default)]
pub struct PersonForm {
    /// Person fields.
    pub draft: PersonDraft,
    /// Photo, if a file was chosen.
    pub photo: Option<Photo>,
}

impl PersonForm {
    /// Read a submitted person form, choosing the decoder by `Content-Type`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Form`] if the content type is neither multipart nor
    /// urlencoded, the body is malformed, or a parent id is not an integer.
    pub async fn extract(request: Request) -> Result<Self> {
        let content_type = request
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        if content_type.starts_with("multipart/form-data") {
            let multipart = Multipart::from_request(request, &())
                .await
                .map_err(|rejection| Error::form(rejection.body_text()))?;
            Self::read(multipart).await
        } else if content_type.starts_with("application/x-www-form-urlencoded") {
            let Form(fields) = Form::<Vec<(String, String)>>::from_request(request, &())
                .await
                .map_err(|rejection| Error::form(rejection.body_text()))?;
            Self::from_fields(fields)
        } else {
            Err(Error::form(format!("unsupported content type {content_type:?}")))
        }
    }

    /// Read every field of a multipart person form.
    ///
    /// Unknown fields are ignored. A file field with no file name is treated
    /// as "no photo".
    ///
    /// # Errors
    ///
    /// Returns [`Error::Form`] if the body is malformed or a parent id is not
    /// an integer.
    pub async fn read(mut multipart: Multipart) -> Result<Self> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await.map_err(form_error)? {
            let name = field.name().unwrap_or_default().to_string();

            if name == "photo" {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await.map_err(form_error)?;
                if file_name.is_empty() {
                    continue;
                }
                debug!("Received photo {:?} ({} bytes)", file_name, bytes.len());
                form.photo = Some(Photo { file_name, bytes });
                continue;
            }

            let value = field.text().await.map_err(form_error)?;
            set_field(&mut form.draft, &name, value)?;
        }

        Ok(form)
    }

    /// Build a form from decoded urlencoded pairs. Such a form never carries
    /// a photo.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Form`] if a parent id is not an integer.
    pub fn from_fields(fields: Vec<(String, String)>) -> Result<Self> {
        let mut form = Self::default();
        for (name, value) in fields {
            set_field(&mut form.draft, &name, value)?;
        }
        Ok(form)
    }
}

fn set_field(draft: &mut PersonDraft, name: &str, value: String) -> Result<()> {
    match name {
        "firstName" => draft.first_name = value,
        "lastName" => draft.last_name = value,
        "identityNum" => draft.identity_num = value,
        "phone" => draft.phone = value,
        "birthDate" => draft.birth_date = value,
        "gender" => draft.gender = value,
        "about" => draft.about = value,
        "motherId" => draft.mother_id = parse_parent_id(&value)?,
        "fatherId" => draft.father_id = parse_parent_id(&value)?,
        _ => debug!("Ignoring unknown form field {:?}", name),
    }
    Ok(())
}

fn form_error(err: axum::extract::multipart::MultipartError) -> Error {
    Error::form(err.body_text())
}

/// Parse an optional parent reference. Blank means no link.
fn parse_parent_id(value: &str) -> Result<Option<i64>> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    value
        .parse()
        .map(Some)
        .map_err(|_| Error::form("invalid parent reference"))
}
