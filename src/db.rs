use std::{future::IntoFuture, time::Duration};

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    Client, Collection, Database,
    bson::{Document, doc, oid::ObjectId},
    options::ClientOptions,
};
use tracing::info;

use crate::{
    config::{COLLECTION_NAME, Config},
    error::StoreError,
    model::{Employee, EmployeeDocument, EmployeeInput},
};

/// Opens the client, selects the configured database and pings it.
///
/// The driver connects lazily, so without the ping an unreachable server would
/// only show up on the first request.
pub async fn connect(config: &Config) -> Result<Database, StoreError> {
    let mut options = ClientOptions::parse(&config.mongo_uri).await?;
    options.connect_timeout = Some(config.connect_timeout);
    options.server_selection_timeout = Some(config.connect_timeout);

    let client = Client::with_options(options)?;
    let db = client.database(&config.database);

    tokio::time::timeout(config.connect_timeout, db.run_command(doc! { "ping": 1 }))
        .await
        .map_err(|_| StoreError::Timeout(config.connect_timeout))??;

    info!(database = %config.database, "connected to MongoDB");
    Ok(db)
}

#[async_trait]
pub trait EmployeeStore: Send + Sync {
    /// Every stored employee, in storage order.
    async fn list(&self) -> Result<Vec<Employee>, StoreError>;

    async fn get(&self, id: ObjectId) -> Result<Option<Employee>, StoreError>;

    /// Inserts a new record and returns the id the database assigned.
    async fn insert(&self, input: &EmployeeInput) -> Result<ObjectId, StoreError>;

    /// Sets name, age and salary on the matching record. `false` when nothing matched.
    async fn update(&self, id: ObjectId, input: &EmployeeInput) -> Result<bool, StoreError>;

    /// Returns the number of deleted records (0 or 1).
    async fn delete(&self, id: ObjectId) -> Result<u64, StoreError>;
}

#[derive(Clone)]
pub struct MongoEmployeeStore {
    coll: Collection<EmployeeDocument>,
    op_timeout: Duration,
}

impl MongoEmployeeStore {
    pub fn new(db: &Database, op_timeout: Duration) -> Self {
        Self {
            coll: db.collection(COLLECTION_NAME),
            op_timeout,
        }
    }

    async fn bounded<T, F>(&self, op: F) -> Result<T, StoreError>
    where
        F: IntoFuture<Output = mongodb::error::Result<T>> + Send,
        F::IntoFuture: Send,
        T: Send,
    {
        bounded(self.op_timeout, op).await
    }
}

/// Runs one driver operation, failing with [`StoreError::Timeout`] once `limit` elapses.
async fn bounded<T, F>(limit: Duration, op: F) -> Result<T, StoreError>
where
    F: IntoFuture<Output = mongodb::error::Result<T>>,
{
    tokio::time::timeout(limit, op)
        .await
        .map_err(|_| StoreError::Timeout(limit))?
        .map_err(StoreError::from)
}

fn set_fields(input: &EmployeeInput) -> Document {
    doc! {
        "$set": {
            "name": input.name.as_str(),
            "age": input.age,
            "salary": input.salary,
        }
    }
}

#[async_trait]
impl EmployeeStore for MongoEmployeeStore {
    async fn list(&self) -> Result<Vec<Employee>, StoreError> {
        let docs: Vec<EmployeeDocument> = self
            .bounded(async {
                let cursor = self.coll.find(doc! {}).await?;
                cursor.try_collect::<Vec<_>>().await
            })
            .await?;
        Ok(docs.into_iter().map(Employee::from).collect())
    }

    async fn get(&self, id: ObjectId) -> Result<Option<Employee>, StoreError> {
        let found = self.bounded(self.coll.find_one(doc! { "_id": id })).await?;
        Ok(found.map(Employee::from))
    }

    async fn insert(&self, input: &EmployeeInput) -> Result<ObjectId, StoreError> {
        let document = EmployeeDocument::from(input);
        let result = self.bounded(self.coll.insert_one(&document)).await?;
        result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| StoreError::Unexpected(format!("inserted id {}", result.inserted_id)))
    }

    async fn update(&self, id: ObjectId, input: &EmployeeInput) -> Result<bool, StoreError> {
        let previous = self
            .bounded(
                self.coll
                    .find_one_and_update(doc! { "_id": id }, set_fields(input)),
            )
            .await?;
        Ok(previous.is_some())
    }

    async fn delete(&self, id: ObjectId) -> Result<u64, StoreError> {
        let result = self.bounded(self.coll.delete_one(doc! { "_id": id })).await?;
        Ok(result.deleted_count)
    }
}
