//! Person records and the rules they must satisfy.
//!
//! A [`PersonDraft`] holds raw candidate input as it arrives from a form.
//! Validating it yields a [`Person`], the shape the store persists.

use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

/// Required length of a national identity number.
pub const IDENTITY_NUM_LEN: usize = 11;

/// Reasons a candidate record is rejected.
///
/// Rules are checked in declaration order and the first failure wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// First or last name is empty.
    #[error("name required")]
    NameRequired,

    /// Gender is not one of the accepted codes.
    #[error("invalid gender")]
    InvalidGender,

    /// Identity number is present but not exactly eleven characters.
    #[error("invalid identity number")]
    InvalidIdentityNum,
}

/// Gender code stored with each person.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Gender {
    /// Male (`"E"`).
    E,
    /// Female (`"K"`).
    K,
}

impl Gender {
    /// The literal code persisted in the store.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::E => "E",
            Self::K => "K",
        }
    }

    /// Human-readable label for forms and listings.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::E => "Male",
            Self::K => "Female",
        }
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Gender {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "E" => Ok(Self::E),
            "K" => Ok(Self::K),
            _ => Err(ValidationError::InvalidGender),
        }
    }
}

/// A stored individual.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Person {
    /// Store-assigned identifier; `None` until the person is created.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// National identity number, empty or eleven characters.
    pub identity_num: String,
    /// Phone number, free-form.
    pub phone: String,
    /// Birth date, free-form.
    pub birth_date: String,
    /// Id of the mother, if linked. Not checked for existence.
    pub mother_id: Option<i64>,
    /// Id of the father, if linked. Not checked for existence.
    pub father_id: Option<i64>,
    /// Gender code.
    pub gender: Gender,
    /// Free-text notes.
    pub about: String,
    /// Public relative path of the photo, empty when there is none.
    pub photo_path: String,
}

impl Person {
    /// Full display name.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Whether a photo has been uploaded for this person.
    #[must_use]
    pub fn has_photo(&self) -> bool {
        !self.photo_path.is_empty()
    }

    /// Replace every field an edit may touch with the draft's values.
    ///
    /// The id, the parent links and the photo path are kept; a new photo is
    /// attached separately once it has been saved.
    ///
    /// # Errors
    ///
    /// Returns the first rule the draft violates.
    pub fn apply(&mut self, draft: &PersonDraft) -> Result<(), ValidationError> {
        let gender = draft.check()?;
        self.first_name.clone_from(&draft.first_name);
        self.last_name.clone_from(&draft.last_name);
        self.identity_num.clone_from(&draft.identity_num);
        self.phone.clone_from(&draft.phone);
        self.birth_date.clone_from(&draft.birth_date);
        self.gender = gender;
        self.about.clone_from(&draft.about);
        Ok(())
    }
}

/// Unvalidated person input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonDraft {
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// National identity number.
    pub identity_num: String,
    /// Phone number.
    pub phone: String,
    /// Birth date.
    pub birth_date: String,
    /// Raw gender code as submitted.
    pub gender: String,
    /// Free-text notes.
    pub about: String,
    /// Mother link.
    pub mother_id: Option<i64>,
    /// Father link.
    pub father_id: Option<i64>,
}

impl PersonDraft {
    /// Check the draft against the record rules.
    ///
    /// # Errors
    ///
    /// Returns the first rule the draft violates.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.check().map(|_| ())
    }

    /// Validate the draft and build the person it describes.
    ///
    /// # Errors
    ///
    /// Returns the first rule the draft violates.
    pub fn into_person(self) -> Result<Person, ValidationError> {
        let gender = self.check()?;
        Ok(Person {
            id: None,
            first_name: self.first_name,
            last_name: self.last_name,
            identity_num: self.identity_num,
            phone: self.phone,
            birth_date: self.birth_date,
            mother_id: self.mother_id,
            father_id: self.father_id,
            gender,
            about: self.about,
            photo_path: String::new(),
        })
    }

    fn check(&self) -> Result<Gender, ValidationError> {
        if self.first_name.is_empty() || self.last_name.is_empty() {
            return Err(ValidationError::NameRequired);
        }

        let gender = self.gender.parse::<Gender>()?;

        if !self.identity_num.is_empty() && self.identity_num.chars().count() != IDENTITY_NUM_LEN {
            return Err(ValidationError::InvalidIdentityNum);
        }

        Ok(gender)
    }
}
