//! Record types returned by every [`Store`](crate::Store) implementation.
//!
//! Records serialize to the JSON shape clients see: the identifier lives
//! under `_id` as a hex string and absent fields are omitted.

use mongodb::bson::oid::ObjectId;
use serde::{Serialize, Serializer};

fn serialize_hex<S: Serializer>(id: &ObjectId, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&id.to_hex())
}

/// A stored author document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Author {
    #[serde(rename = "_id", serialize_with = "serialize_hex")]
    pub id: ObjectId,
    #[serde(rename = "firstName", skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(rename = "lastName", skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

/// Fields accepted when creating an author.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewAuthor {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
}

impl NewAuthor {
    pub fn into_author(self, id: ObjectId) -> Author {
        Author {
            id,
            first_name: self.first_name,
            last_name: self.last_name,
            bio: self.bio,
        }
    }
}

/// A book's link to its author: the raw identifier as stored, or the
/// author document after population.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthorRef {
    Id(ObjectId),
    Populated(Box<Author>),
}

impl AuthorRef {
    pub fn id(&self) -> ObjectId {
        match self {
            AuthorRef::Id(id) => *id,
            AuthorRef::Populated(author) => author.id,
        }
    }
}

impl Serialize for AuthorRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            AuthorRef::Id(id) => serialize_hex(id, serializer),
            AuthorRef::Populated(author) => author.serialize(serializer),
        }
    }
}

/// A stored book document.
///
/// `author` is `None` both when no author was ever set and when a populated
/// reference points at a missing author; both serialize as `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Book {
    #[serde(rename = "_id", serialize_with = "serialize_hex")]
    pub id: ObjectId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i64>,
    #[serde(rename = "codeISBN", skip_serializing_if = "Option::is_none")]
    pub code_isbn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    pub author: Option<AuthorRef>,
}

/// Fields accepted when creating a book.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewBook {
    pub title: Option<String>,
    pub year: Option<i64>,
    pub code_isbn: Option<String>,
    pub quantity: Option<i64>,
    pub genre: Option<String>,
    pub author: Option<ObjectId>,
}

impl NewBook {
    pub fn into_book(self, id: ObjectId) -> Book {
        Book {
            id,
            title: self.title,
            year: self.year,
            code_isbn: self.code_isbn,
            quantity: self.quantity,
            genre: self.genre,
            author: self.author.map(AuthorRef::Id),
        }
    }
}

/// Partial update for a book; only `Some` fields are written.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookPatch {
    pub title: Option<String>,
    pub year: Option<i64>,
    pub code_isbn: Option<String>,
    pub quantity: Option<i64>,
    pub genre: Option<String>,
    pub author: Option<ObjectId>,
}

impl BookPatch {
    pub fn is_empty(&self) -> bool {
        *self == BookPatch::default()
    }

    /// Apply the patch to an in-memory record.
    pub fn apply(self, book: &mut Book) {
        if let Some(title) = self.title {
            book.title = Some(title);
        }
        if let Some(year) = self.year {
            book.year = Some(year);
        }
        if let Some(code_isbn) = self.code_isbn {
            book.code_isbn = Some(code_isbn);
        }
        if let Some(quantity) = self.quantity {
            book.quantity = Some(quantity);
        }
        if let Some(genre) = self.genre {
            book.genre = Some(genre);
        }
        if let Some(author) = self.author {
            book.author = Some(AuthorRef::Id(author));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn author() -> Author {
        Author {
            id: ObjectId::parse_str("65a1f0c2e4b0a1b2c3d4e5f6").unwrap(),
            first_name: Some("Jane".to_string()),
            last_name: Some("Doe".to_string()),
            bio: None,
        }
    }

    #[test]
    fn author_serializes_hex_id_and_skips_missing_fields() {
        let value = serde_json::to_value(author()).unwrap();
        assert_eq!(
            value,
            json!({
                "_id": "65a1f0c2e4b0a1b2c3d4e5f6",
                "firstName": "Jane",
                "lastName": "Doe"
            })
        );
    }

    #[test]
    fn book_author_serializes_as_id_or_document() {
        let id = ObjectId::parse_str("65a1f0c2e4b0a1b2c3d4e5f7").unwrap();
        let mut book = NewBook {
            title: Some("Dune".to_string()),
            code_isbn: Some("978-0441013593".to_string()),
            author: Some(author().id),
            ..NewBook::default()
        }
        .into_book(id);

        let raw = serde_json::to_value(&book).unwrap();
        assert_eq!(raw["author"], json!("65a1f0c2e4b0a1b2c3d4e5f6"));
        assert_eq!(raw["codeISBN"], json!("978-0441013593"));
        assert!(raw.get("year").is_none());

        book.author = Some(AuthorRef::Populated(Box::new(author())));
        let populated = serde_json::to_value(&book).unwrap();
        assert_eq!(populated["author"]["firstName"], json!("Jane"));

        book.author = None;
        let dangling = serde_json::to_value(&book).unwrap();
        assert!(dangling["author"].is_null());
    }

    #[test]
    fn patch_only_touches_provided_fields() {
        let mut book = NewBook {
            title: Some("Dune".to_string()),
            quantity: Some(3),
            ..NewBook::default()
        }
        .into_book(ObjectId::new());

        BookPatch {
            quantity: Some(7),
            ..BookPatch::default()
        }
        .apply(&mut book);

        assert_eq!(book.quantity, Some(7));
        assert_eq!(book.title.as_deref(), Some("Dune"));
        assert!(BookPatch::default().is_empty());
    }
}
