use std::marker::PhantomData;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::config::{ConnectionUrl, RepositoryConfig};
use crate::errors::{DocketError, DocketResult};
use crate::repository::{Entity, OperationGuard, Repository};
use crate::store::StoreModule;

/// Builder for opening a [`Repository<T>`].
///
/// `RepositoryBuilder` collects the connection target, the collection name
/// and the operation bounds before a repository is opened. Configuration
/// errors are captured as they happen and the first one is returned by
/// [`open`](RepositoryBuilder::open); later setters are ignored once an error
/// is captured.
///
/// # Examples
///
/// ```rust,ignore
/// let orders: Repository<Order> = Repository::builder()
///     .connection_entry("ORDERS_DB")
///     .collection_name("orders_2024")
///     .operation_timeout(Duration::from_secs(3))
///     .open(&MongoModule::new())
///     .await?;
/// ```
pub struct RepositoryBuilder<T: Entity> {
    error: Option<DocketError>,
    config: RepositoryConfig,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity> Default for RepositoryBuilder<T> {
    fn default() -> Self {
        RepositoryBuilder::new()
    }
}

impl<T: Entity> RepositoryBuilder<T> {
    /// Creates a builder targeting the `DOCKET_SERVER_SETTINGS` entry and the
    /// entity's default collection, with no timeout and no cancellation.
    pub fn new() -> Self {
        RepositoryBuilder {
            error: None,
            config: RepositoryConfig::new(),
            _entity: PhantomData,
        }
    }

    fn capture(mut self, result: DocketResult<()>) -> Self {
        if self.error.is_none() {
            if let Err(e) = result {
                self.error = Some(e);
            }
        }
        self
    }

    /// Reads the connection string from the configuration entry `name`.
    pub fn connection_entry(mut self, name: &str) -> Self {
        if self.error.is_some() {
            return self;
        }
        let result = self.config.set_connection_entry(name);
        self.capture(result)
    }

    pub fn connection_string(mut self, connection_string: &str) -> Self {
        if self.error.is_some() {
            return self;
        }
        let result = self.config.set_connection_string(connection_string);
        self.capture(result)
    }

    pub fn connection_url(mut self, url: &ConnectionUrl) -> Self {
        if self.error.is_some() {
            return self;
        }
        let result = self.config.set_connection_url(url);
        self.capture(result)
    }

    /// Overrides the entity's default collection name.
    pub fn collection_name(mut self, name: &str) -> Self {
        if self.error.is_some() {
            return self;
        }
        let result = self.config.set_collection_name(name);
        self.capture(result)
    }

    /// Bounds every round-trip; an operation still running after `timeout`
    /// fails with `Timeout`.
    pub fn operation_timeout(mut self, timeout: Duration) -> Self {
        if self.error.is_some() {
            return self;
        }
        let result = self.config.set_operation_timeout(timeout);
        self.capture(result)
    }

    /// Abandons round-trips with `Cancelled` once `token` is cancelled.
    pub fn cancellation(mut self, token: CancellationToken) -> Self {
        self.config.set_cancellation(token);
        self
    }

    pub fn config(&self) -> &RepositoryConfig {
        &self.config
    }

    /// Connects through `module` and binds the repository to its collection.
    ///
    /// Returns the first configuration error captured by the builder, if any.
    pub async fn open<M: StoreModule>(self, module: &M) -> DocketResult<Repository<T>> {
        if let Some(error) = self.error {
            return Err(error);
        }

        let connection_string = self.config.target().resolve()?;
        let collection_name = match self.config.collection_name() {
            Some(name) => name.to_string(),
            None => T::entity_name(),
        };

        log::debug!(
            "Opening repository of {} on collection {} at {}",
            std::any::type_name::<T>(),
            collection_name,
            masked(&connection_string)
        );

        let store = module.connect(&connection_string).await?;
        let collection = store.collection(&collection_name)?;
        let guard = OperationGuard::new(
            self.config.operation_timeout(),
            self.config.cancellation().cloned(),
        );
        Ok(Repository::with_guard(collection, guard))
    }
}

// connection strings are only logged with their password masked
fn masked(connection_string: &str) -> String {
    match connection_string.parse::<ConnectionUrl>() {
        Ok(url) => url.masked(),
        Err(_) => "<unparsed connection string>".to_string(),
    }
}
