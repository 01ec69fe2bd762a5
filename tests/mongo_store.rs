//! Runs the MongoDB store against a real server.
//!
//! `DATABASE_URI=mongodb://localhost:27017 cargo test --test mongo_store -- --ignored`

use std::time::Duration;

use bookshelf::{
    book::{BookId, NewBook},
    seed::{ensure_seed_books, seed_books},
    store::{mongo::MongoBookStore, BookRepository, InsertOutcome, StoreError},
};
use futures::future::try_join_all;
use mongodb::{
    bson::{doc, oid::ObjectId, Document},
    Client,
};

const DATABASE: &str = "bookshelf-test";

/// A collection that exists only for one test and is dropped afterwards.
struct Scratch {
    uri: String,
    collection: String,
}

impl Scratch {
    fn new() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();

        let uri = std::env::var("DATABASE_URI")
            .map_err(|_| anyhow::anyhow!("DATABASE_URI missing; point it at a MongoDB server"))?;

        Ok(Self {
            uri,
            collection: format!("books-{}", ObjectId::new()),
        })
    }

    async fn connect(&self) -> Result<MongoBookStore, StoreError> {
        MongoBookStore::connect(
            &self.uri,
            DATABASE,
            &self.collection,
            Duration::from_secs(10),
        )
        .await
    }

    async fn raw(&self) -> anyhow::Result<mongodb::Collection<Document>> {
        let client = Client::with_uri_str(&self.uri).await?;

        Ok(client.database(DATABASE).collection(&self.collection))
    }

    async fn remove(self) -> anyhow::Result<()> {
        self.raw().await?.drop(None).await?;

        Ok(())
    }
}

#[tokio::test]
#[ignore = "needs a MongoDB server at DATABASE_URI"]
async fn seeding_twice_stores_each_seed_once() -> anyhow::Result<()> {
    let scratch = Scratch::new()?;
    let store = scratch.connect().await?;

    let first = ensure_seed_books(&store).await?;
    assert_eq!((first.inserted, first.present), (3, 0));

    let second = ensure_seed_books(&store).await?;
    assert_eq!((second.inserted, second.present), (0, 3));

    assert_eq!(store.list().await?.len(), 3);
    for seed in seed_books() {
        assert_eq!(store.count_exact(&seed).await?, 1, "{}", seed.name);
    }

    scratch.remove().await
}

#[tokio::test]
#[ignore = "needs a MongoDB server at DATABASE_URI"]
async fn services_starting_together_store_each_seed_once() -> anyhow::Result<()> {
    let scratch = Scratch::new()?;

    let stores = try_join_all((0..5).map(|_| scratch.connect())).await?;
    try_join_all(stores.iter().map(|store| ensure_seed_books(store))).await?;

    for seed in seed_books() {
        assert_eq!(stores[0].count_exact(&seed).await?, 1, "{}", seed.name);
    }

    let restarted = scratch.connect().await?;
    let report = ensure_seed_books(&restarted).await?;
    assert_eq!(report.present, 3);

    scratch.remove().await
}

#[tokio::test]
#[ignore = "needs a MongoDB server at DATABASE_URI"]
async fn concurrent_identical_inserts_agree_on_one_book() -> anyhow::Result<()> {
    let scratch = Scratch::new()?;
    let store = scratch.connect().await?;
    let dune = NewBook::new("Dune", "Frank Herbert", "978-0441013593", 412, 1965);

    let outcomes = try_join_all((0..8).map(|_| store.insert_if_absent(&dune))).await?;

    let ids: Vec<BookId> = outcomes
        .iter()
        .map(|outcome| match outcome {
            InsertOutcome::Inserted(id) | InsertOutcome::Existing(id) => *id,
        })
        .collect();
    let inserted = outcomes
        .iter()
        .filter(|outcome| matches!(outcome, InsertOutcome::Inserted(_)))
        .count();

    assert_eq!(inserted, 1);
    assert!(ids.iter().all(|id| *id == ids[0]));
    assert_eq!(store.count_exact(&dune).await?, 1);

    scratch.remove().await
}

#[tokio::test]
#[ignore = "needs a MongoDB server at DATABASE_URI"]
async fn insert_replace_and_delete() -> anyhow::Result<()> {
    let scratch = Scratch::new()?;
    let store = scratch.connect().await?;
    let dune = NewBook::new("Dune", "Frank Herbert", "", 412, 1965);
    let emma = NewBook::new("Emma", "Jane Austen", "", 474, 1815);

    let InsertOutcome::Inserted(id) = store.insert_if_absent(&dune).await? else {
        anyhow::bail!("Dune was not inserted");
    };
    assert_eq!(
        store.insert_if_absent(&dune).await?,
        InsertOutcome::Existing(id)
    );

    let stored = scratch
        .raw()
        .await?
        .find_one(doc! { "_id": id.object_id() }, None)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Dune not stored"))?;
    assert_eq!(stored.get_str("bookname")?, "Dune");
    assert_eq!(stored.get_str("bookauthor")?, "Frank Herbert");
    assert_eq!(stored.get_i32("bookpages")?, 412);
    assert_eq!(stored.get_i32("bookyear")?, 1965);

    let InsertOutcome::Inserted(emma_id) = store.insert_if_absent(&emma).await? else {
        anyhow::bail!("Emma was not inserted");
    };

    let dune_messiah = NewBook::new("Dune Messiah", "Frank Herbert", "", 256, 1969);
    assert!(store.replace(id, &dune_messiah).await?);
    assert!(!store.replace(BookId::new(), &dune_messiah).await?);
    assert!(matches!(
        store.replace(emma_id, &dune_messiah).await,
        Err(StoreError::Duplicate)
    ));

    let books = store.list().await?;
    let replaced = books
        .iter()
        .find(|book| book.id == id)
        .ok_or_else(|| anyhow::anyhow!("replaced book not listed"))?;
    assert_eq!(replaced.fields, dune_messiah);

    assert!(store.delete(id).await?);
    assert!(!store.delete(id).await?);
    assert_eq!(store.list().await?.len(), 1);

    scratch.remove().await
}
