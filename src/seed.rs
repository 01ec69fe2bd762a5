use crate::{
    book::NewBook,
    store::{BookRepository, InsertOutcome, StoreError},
};

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("Seed book `{name}` is stored {count} times")]
    Duplicated { name: String, count: u64 },
    #[error("Failed to seed book `{name}`: {source}")]
    Store {
        name: String,
        #[source]
        source: StoreError,
    },
}

/// The sample books every service makes sure are present at startup.
pub fn seed_books() -> [NewBook; 3] {
    [
        NewBook::new(
            "The Vortex",
            "José Eustasio Rivera",
            "958-30-0804-4",
            292,
            1924,
        ),
        NewBook::new("Frankenstein", "Mary Shelley", "978-3-649-64609-9", 280, 1818),
        NewBook::new(
            "The Black Cat",
            "Edgar Allan Poe",
            "978-3-99168-238-7",
            280,
            1843,
        ),
    ]
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub inserted: usize,
    pub present: usize,
}

/// Inserts every seed book that is not stored yet.
///
/// A seed book stored more than once is an error the caller can not recover from.
#[tracing::instrument(skip_all)]
pub async fn ensure_seed_books<R>(books: &R) -> Result<SeedReport, SeedError>
where
    R: BookRepository + ?Sized,
{
    let mut report = SeedReport::default();

    for seed in seed_books() {
        let store_error = |source| SeedError::Store {
            name: seed.name.clone(),
            source,
        };

        let count = books.count_exact(&seed).await.map_err(store_error)?;

        if count > 1 {
            return Err(SeedError::Duplicated {
                name: seed.name.clone(),
                count,
            });
        }

        match books.insert_if_absent(&seed).await.map_err(store_error)? {
            InsertOutcome::Inserted(id) => {
                tracing::info!(name = %seed.name, %id, "Seed book inserted");

                report.inserted += 1;
            }
            InsertOutcome::Existing(id) => {
                tracing::debug!(name = %seed.name, %id, "Seed book present");

                report.present += 1;
            }
        }
    }

    Ok(report)
}
