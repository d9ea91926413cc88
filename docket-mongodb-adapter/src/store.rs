use bson::Document;
use docket::errors::{DocketError, DocketResult, ErrorKind};
use docket::store::{DocumentCollection, DocumentStoreProvider};
use mongodb::{Client, Database};

use crate::{MongoAdapterError, MongoCollection};

/// A MongoDB database seen as a docket document store.
#[derive(Clone)]
pub struct MongoStore {
    client: Client,
    database: Database,
}

impl MongoStore {
    pub(crate) fn new(client: Client, database_name: &str) -> MongoStore {
        let database = client.database(database_name);
        MongoStore { client, database }
    }

    /// The driver client this store was opened with.
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// The driver's database handle.
    pub fn native(&self) -> &Database {
        &self.database
    }
}

impl DocumentStoreProvider for MongoStore {
    fn database_name(&self) -> String {
        self.database.name().to_string()
    }

    fn collection(&self, name: &str) -> DocketResult<DocumentCollection> {
        if name.trim().is_empty() || name.contains('$') || name.contains('\0') {
            let cause = MongoAdapterError::InvalidCollectionName(name.to_string());
            log::error!("{}", cause);
            return Err(DocketError::new_with_cause(
                &cause.to_string(),
                ErrorKind::ConfigurationError,
                cause,
            ));
        }

        let collection = self.database.collection::<Document>(name);
        Ok(DocumentCollection::new(MongoCollection::new(collection)))
    }
}
