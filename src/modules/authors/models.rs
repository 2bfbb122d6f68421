use bookshelf_db::{coerce, NewAuthor};
use serde::Deserialize;

/// Request body for creating an author. Every field is optional and
/// stored as given.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateAuthor {
    #[serde(rename = "firstName", default, deserialize_with = "coerce::text")]
    pub first_name: Option<String>,
    #[serde(rename = "lastName", default, deserialize_with = "coerce::text")]
    pub last_name: Option<String>,
    #[serde(default, deserialize_with = "coerce::text")]
    pub bio: Option<String>,
}

impl From<CreateAuthor> for NewAuthor {
    fn from(request: CreateAuthor) -> Self {
        NewAuthor {
            first_name: request.first_name,
            last_name: request.last_name,
            bio: request.bio,
        }
    }
}
