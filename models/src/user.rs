use crate::error::model_error::ModelError;

use common::ErrorLocation;

use std::panic::Location;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Profile record of the signed-in user as returned by `auth/me/`.
///
/// Fields the server adds later land in `extra`, so a round trip through
/// [`User::merge`] never drops data the client does not know about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub user_type: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub organization: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub is_verified: Option<bool>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl User {
    /// Minimal record with only an id, everything else unset.
    pub fn with_id(id: u64) -> Self {
        Self {
            id,
            username: None,
            email: None,
            first_name: None,
            last_name: None,
            user_type: None,
            phone: None,
            organization: None,
            bio: None,
            avatar: None,
            is_verified: None,
            is_active: None,
            created_at: None,
            updated_at: None,
            extra: Map::new(),
        }
    }

    /// Shallow merge: every top-level key in `patch` replaces the same key on
    /// this record. Keys absent from `patch` are left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Validation`] if the merged record no longer
    /// deserializes (e.g. the patch sets `id` to a string). `self` is left
    /// unchanged in that case.
    #[track_caller]
    pub fn merge(&mut self, patch: &Map<String, Value>) -> Result<(), ModelError> {
        let location = ErrorLocation::from(Location::caller());

        let mut fields = match serde_json::to_value(&*self) {
            Ok(Value::Object(fields)) => fields,
            Ok(_) => {
                return Err(ModelError::Validation {
                    message: String::from("User did not serialize to an object"),
                    location,
                });
            }
            Err(e) => {
                return Err(ModelError::Validation {
                    message: format!("User serialization failed: {e}"),
                    location,
                });
            }
        };

        for (key, value) in patch {
            fields.insert(key.clone(), value.clone());
        }

        *self = serde_json::from_value(Value::Object(fields)).map_err(|e| {
            ModelError::Validation {
                message: format!("Merged user is invalid: {e}"),
                location,
            }
        })?;

        Ok(())
    }

    /// Best human-readable label: full name, then username, then `user #id`.
    pub fn display_name(&self) -> String {
        let full_name = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        if !full_name.is_empty() {
            return full_name;
        }

        match &self.username {
            Some(username) if !username.is_empty() => username.clone(),
            _ => format!("user #{}", self.id),
        }
    }
}
