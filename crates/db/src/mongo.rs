//! MongoDB-backed store.

use std::time::Duration;

use async_trait::async_trait;
use bookshelf_kernel::settings::DatabaseSettings;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId, Bson, Document},
    options::{ClientOptions, ReturnDocument},
    Client, Collection, Database,
};
use serde::Deserialize;

use crate::coerce;
use crate::records::{Author, AuthorRef, Book, BookPatch, NewAuthor, NewBook};
use crate::{Store, StoreError, StoreResult};

const AUTHORS: &str = "authors";
const BOOKS: &str = "books";
const APP_NAME: &str = "bookshelf";

#[derive(Debug, Deserialize)]
struct AuthorDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    #[serde(rename = "firstName")]
    first_name: Option<String>,
    #[serde(rename = "lastName")]
    last_name: Option<String>,
    bio: Option<String>,
}

impl From<AuthorDocument> for Author {
    fn from(document: AuthorDocument) -> Self {
        Author {
            id: document.id,
            first_name: document.first_name,
            last_name: document.last_name,
            bio: document.bio,
        }
    }
}

#[derive(Debug, Deserialize)]
struct BookDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    title: Option<String>,
    #[serde(default, deserialize_with = "coerce::integer")]
    year: Option<i64>,
    #[serde(rename = "codeISBN")]
    code_isbn: Option<String>,
    #[serde(default, deserialize_with = "coerce::integer")]
    quantity: Option<i64>,
    genre: Option<String>,
    author: Option<ObjectId>,
}

impl From<BookDocument> for Book {
    fn from(document: BookDocument) -> Self {
        Book {
            id: document.id,
            title: document.title,
            year: document.year,
            code_isbn: document.code_isbn,
            quantity: document.quantity,
            genre: document.genre,
            author: document.author.map(AuthorRef::Id),
        }
    }
}

fn set_if(document: &mut Document, key: &str, value: Option<impl Into<Bson>>) {
    if let Some(value) = value {
        document.insert(key, value.into());
    }
}

fn author_fields(author: &NewAuthor) -> Document {
    let mut document = Document::new();
    set_if(&mut document, "firstName", author.first_name.clone());
    set_if(&mut document, "lastName", author.last_name.clone());
    set_if(&mut document, "bio", author.bio.clone());
    document
}

fn book_fields(
    title: &Option<String>,
    year: Option<i64>,
    code_isbn: &Option<String>,
    quantity: Option<i64>,
    genre: &Option<String>,
    author: Option<ObjectId>,
) -> Document {
    let mut document = Document::new();
    set_if(&mut document, "title", title.clone());
    set_if(&mut document, "year", year);
    set_if(&mut document, "codeISBN", code_isbn.clone());
    set_if(&mut document, "quantity", quantity);
    set_if(&mut document, "genre", genre.clone());
    set_if(&mut document, "author", author);
    document
}

/// Store backed by the `authors` and `books` collections of one database.
#[derive(Clone)]
pub struct MongoStore {
    database: Database,
    authors: Collection<AuthorDocument>,
    books: Collection<BookDocument>,
}

impl MongoStore {
    /// Create the client. No network traffic happens until the first operation.
    pub async fn connect(settings: &DatabaseSettings) -> StoreResult<Self> {
        let mut options = ClientOptions::parse(&settings.uri).await?;
        options.app_name = Some(APP_NAME.to_string());
        if let Some(timeout_ms) = settings.server_selection_timeout_ms {
            options.server_selection_timeout = Some(Duration::from_millis(timeout_ms));
        }

        let client = Client::with_options(options)?;
        Ok(Self::with_database(client.database(&settings.name)))
    }

    pub fn with_database(database: Database) -> Self {
        Self {
            authors: database.collection(AUTHORS),
            books: database.collection(BOOKS),
            database,
        }
    }

    fn by_id(id: ObjectId) -> Document {
        doc! { "_id": id }
    }
}

#[async_trait]
impl Store for MongoStore {
    fn backend(&self) -> &'static str {
        "mongo"
    }

    async fn ping(&self) -> StoreResult<()> {
        self.database.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }

    async fn list_authors(&self) -> StoreResult<Vec<Author>> {
        let cursor = self.authors.find(doc! {}).await?;
        let documents: Vec<AuthorDocument> = cursor.try_collect().await?;
        Ok(documents.into_iter().map(Author::from).collect())
    }

    async fn create_author(&self, author: NewAuthor) -> StoreResult<Author> {
        let result = self
            .authors
            .clone_with_type::<Document>()
            .insert_one(author_fields(&author))
            .await?;
        let id = result
            .inserted_id
            .as_object_id()
            .ok_or(StoreError::MissingInsertedId("author"))?;
        Ok(author.into_author(id))
    }

    async fn find_author(&self, id: ObjectId) -> StoreResult<Option<Author>> {
        let document = self.authors.find_one(Self::by_id(id)).await?;
        Ok(document.map(Author::from))
    }

    async fn list_books(&self) -> StoreResult<Vec<Book>> {
        let cursor = self.books.find(doc! {}).await?;
        let documents: Vec<BookDocument> = cursor.try_collect().await?;
        Ok(documents.into_iter().map(Book::from).collect())
    }

    async fn find_book(&self, id: ObjectId) -> StoreResult<Option<Book>> {
        let document = self.books.find_one(Self::by_id(id)).await?;
        Ok(document.map(Book::from))
    }

    async fn create_book(&self, book: NewBook) -> StoreResult<Book> {
        let fields = book_fields(
            &book.title,
            book.year,
            &book.code_isbn,
            book.quantity,
            &book.genre,
            book.author,
        );
        let result = self
            .books
            .clone_with_type::<Document>()
            .insert_one(fields)
            .await?;
        let id = result
            .inserted_id
            .as_object_id()
            .ok_or(StoreError::MissingInsertedId("book"))?;
        Ok(book.into_book(id))
    }

    async fn update_book(&self, id: ObjectId, patch: BookPatch) -> StoreResult<Option<Book>> {
        // `$set` with no fields is rejected by the server.
        if patch.is_empty() {
            return self.find_book(id).await;
        }

        let fields = book_fields(
            &patch.title,
            patch.year,
            &patch.code_isbn,
            patch.quantity,
            &patch.genre,
            patch.author,
        );
        let document = self
            .books
            .find_one_and_update(Self::by_id(id), doc! { "$set": fields })
            .return_document(ReturnDocument::After)
            .await?;
        Ok(document.map(Book::from))
    }

    async fn delete_book(&self, id: ObjectId) -> StoreResult<bool> {
        let result = self.books.delete_one(Self::by_id(id)).await?;
        Ok(result.deleted_count > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson;

    #[test]
    fn book_document_accepts_mixed_numeric_encodings() {
        let id = ObjectId::new();
        let author = ObjectId::new();
        let raw = doc! {
            "_id": id,
            "title": "Dune",
            "year": 1965_i32,
            "quantity": 4.0_f64,
            "codeISBN": "978-0441013593",
            "author": author,
            "__v": 0,
        };

        let book: Book = bson::from_document::<BookDocument>(raw).unwrap().into();
        assert_eq!(book.year, Some(1965));
        assert_eq!(book.quantity, Some(4));
        assert_eq!(book.genre, None);
        assert_eq!(book.author, Some(AuthorRef::Id(author)));
    }

    #[test]
    fn fractional_quantity_is_rejected() {
        let raw = doc! { "_id": ObjectId::new(), "quantity": 2.5_f64 };
        assert!(bson::from_document::<BookDocument>(raw).is_err());
    }

    #[test]
    fn out_of_range_whole_double_is_rejected() {
        let raw = doc! { "_id": ObjectId::new(), "year": 1e300_f64 };
        assert!(bson::from_document::<BookDocument>(raw).is_err());
    }

    #[test]
    fn patch_fields_only_include_provided_values() {
        let patch = BookPatch {
            quantity: Some(9),
            ..BookPatch::default()
        };
        let fields = book_fields(
            &patch.title,
            patch.year,
            &patch.code_isbn,
            patch.quantity,
            &patch.genre,
            patch.author,
        );
        assert_eq!(fields, doc! { "quantity": 9_i64 });
    }

    #[test]
    fn author_fields_skip_missing_values() {
        let author = NewAuthor {
            first_name: Some("Jane".to_string()),
            ..NewAuthor::default()
        };
        assert_eq!(author_fields(&author), doc! { "firstName": "Jane" });
    }
}
