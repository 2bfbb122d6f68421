//! In-process store for local development and tests.

use std::collections::BTreeMap;

use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use tokio::sync::RwLock;

use crate::records::{Author, Book, BookPatch, NewAuthor, NewBook};
use crate::{Store, StoreResult};

/// Keeps records in `BTreeMap`s keyed by ObjectId. Fresh ObjectIds sort
/// after every earlier one, so iteration follows insertion order.
#[derive(Default)]
pub struct MemoryStore {
    authors: RwLock<BTreeMap<ObjectId, Author>>,
    books: RwLock<BTreeMap<ObjectId, Book>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn list_authors(&self) -> StoreResult<Vec<Author>> {
        Ok(self.authors.read().await.values().cloned().collect())
    }

    async fn create_author(&self, author: NewAuthor) -> StoreResult<Author> {
        let author = author.into_author(ObjectId::new());
        self.authors.write().await.insert(author.id, author.clone());
        Ok(author)
    }

    async fn find_author(&self, id: ObjectId) -> StoreResult<Option<Author>> {
        Ok(self.authors.read().await.get(&id).cloned())
    }

    async fn list_books(&self) -> StoreResult<Vec<Book>> {
        Ok(self.books.read().await.values().cloned().collect())
    }

    async fn find_book(&self, id: ObjectId) -> StoreResult<Option<Book>> {
        Ok(self.books.read().await.get(&id).cloned())
    }

    async fn create_book(&self, book: NewBook) -> StoreResult<Book> {
        let book = book.into_book(ObjectId::new());
        self.books.write().await.insert(book.id, book.clone());
        Ok(book)
    }

    async fn update_book(&self, id: ObjectId, patch: BookPatch) -> StoreResult<Option<Book>> {
        let mut books = self.books.write().await;
        Ok(books.get_mut(&id).map(|book| {
            patch.apply(book);
            book.clone()
        }))
    }

    async fn delete_book(&self, id: ObjectId) -> StoreResult<bool> {
        Ok(self.books.write().await.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::AuthorRef;

    fn jane() -> NewAuthor {
        NewAuthor {
            first_name: Some("Jane".to_string()),
            last_name: Some("Doe".to_string()),
            bio: Some("x".to_string()),
        }
    }

    #[tokio::test]
    async fn lists_records_in_insertion_order() {
        let store = MemoryStore::new();
        for title in ["first", "second", "third"] {
            store
                .create_book(NewBook {
                    title: Some(title.to_string()),
                    ..NewBook::default()
                })
                .await
                .unwrap();
        }

        let titles: Vec<_> = store
            .list_books()
            .await
            .unwrap()
            .into_iter()
            .filter_map(|book| book.title)
            .collect();
        assert_eq!(titles, ["first", "second", "third"]);
    }

    #[tokio::test]
    async fn populates_existing_author_and_nulls_dangling_one() {
        let store = MemoryStore::new();
        let author = store.create_author(jane()).await.unwrap();

        let linked = store
            .create_book(NewBook {
                author: Some(author.id),
                ..NewBook::default()
            })
            .await
            .unwrap();
        let dangling = store
            .create_book(NewBook {
                author: Some(ObjectId::new()),
                ..NewBook::default()
            })
            .await
            .unwrap();

        let book = store.find_book_populated(linked.id).await.unwrap().unwrap();
        assert_eq!(book.author, Some(AuthorRef::Populated(Box::new(author))));

        let book = store
            .find_book_populated(dangling.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(book.author, None);

        // listing keeps raw references
        let listed = store.list_books().await.unwrap();
        assert!(matches!(listed[0].author, Some(AuthorRef::Id(_))));
    }

    #[tokio::test]
    async fn update_and_delete_miss_quietly() {
        let store = MemoryStore::new();
        let missing = ObjectId::new();

        let updated = store
            .update_book(
                missing,
                BookPatch {
                    quantity: Some(1),
                    ..BookPatch::default()
                },
            )
            .await
            .unwrap();
        assert!(updated.is_none());
        assert!(!store.delete_book(missing).await.unwrap());
    }

    #[tokio::test]
    async fn delete_removes_record() {
        let store = MemoryStore::new();
        let book = store.create_book(NewBook::default()).await.unwrap();

        assert!(store.delete_book(book.id).await.unwrap());
        assert!(store.find_book(book.id).await.unwrap().is_none());
    }
}
