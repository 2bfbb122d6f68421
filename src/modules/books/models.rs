use bookshelf_db::{coerce, parse_id, BookPatch, NewBook, StoreResult};
use serde::Deserialize;

/// Request body for creating a book. Scalars are cast to the field's type
/// (`"1965"` and `3.0` are integers, `42` is a title); fractional numbers
/// and an `author` that is not an identifier fail the cast.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateBook {
    #[serde(default, deserialize_with = "coerce::text")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "coerce::integer")]
    pub year: Option<i64>,
    #[serde(rename = "codeISBN", default, deserialize_with = "coerce::text")]
    pub code_isbn: Option<String>,
    #[serde(default, deserialize_with = "coerce::integer")]
    pub quantity: Option<i64>,
    #[serde(default, deserialize_with = "coerce::text")]
    pub genre: Option<String>,
    pub author: Option<String>,
}

impl CreateBook {
    pub fn into_new_book(self) -> StoreResult<NewBook> {
        Ok(NewBook {
            author: self.author.as_deref().map(parse_id).transpose()?,
            title: self.title,
            year: self.year,
            code_isbn: self.code_isbn,
            quantity: self.quantity,
            genre: self.genre,
        })
    }
}

/// Request body for updating a book. Omitted or `null` fields keep their
/// stored value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateBook {
    #[serde(default, deserialize_with = "coerce::text")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "coerce::integer")]
    pub year: Option<i64>,
    #[serde(rename = "codeISBN", default, deserialize_with = "coerce::text")]
    pub code_isbn: Option<String>,
    #[serde(default, deserialize_with = "coerce::integer")]
    pub quantity: Option<i64>,
    #[serde(default, deserialize_with = "coerce::text")]
    pub genre: Option<String>,
    pub author: Option<String>,
}

impl UpdateBook {
    pub fn into_patch(self) -> StoreResult<BookPatch> {
        Ok(BookPatch {
            author: self.author.as_deref().map(parse_id).transpose()?,
            title: self.title,
            year: self.year,
            code_isbn: self.code_isbn,
            quantity: self.quantity,
            genre: self.genre,
        })
    }
}
