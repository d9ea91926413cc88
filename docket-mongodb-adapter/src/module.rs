use async_trait::async_trait;
use dashmap::DashMap;
use docket::errors::{DocketError, DocketResult, ErrorKind};
use docket::store::{DocumentStore, StoreModule};
use mongodb::options::ClientOptions;
use mongodb::Client;
use std::sync::Arc;
use std::time::Duration;

use crate::{MongoAdapterError, MongoConfig, MongoStore};

/// Store module for `mongodb://` and `mongodb+srv://` connection strings.
///
/// One driver `Client` (and so one connection pool) is kept per distinct
/// connection string; clones of the module share them.
///
/// # Examples
///
/// ```rust,ignore
/// let module = MongoModule::new();
/// let store = module.connect("mongodb://localhost:27017/crm").await?;
/// let contacts = store.collection("contacts")?;
/// ```
#[derive(Clone, Default)]
pub struct MongoModule {
    config: MongoConfig,
    clients: Arc<DashMap<String, Client>>,
}

impl MongoModule {
    /// Creates a module with the driver's default client settings.
    pub fn new() -> MongoModule {
        MongoModule::default()
    }

    /// Creates a builder for configuring client settings.
    #[inline]
    pub fn with_config() -> MongoModuleBuilder {
        MongoModuleBuilder::new()
    }

    pub fn config(&self) -> &MongoConfig {
        &self.config
    }

    async fn client(&self, connection_string: &str) -> DocketResult<(Client, String)> {
        let mut options = ClientOptions::parse(connection_string).await.map_err(|e| {
            log::error!("Failed to parse MongoDB connection string: {}", e);
            DocketError::new_with_cause(
                "Invalid MongoDB connection string",
                ErrorKind::ConfigurationError,
                e,
            )
        })?;

        let database = match options.default_database.clone() {
            Some(database) if !database.is_empty() => database,
            _ => {
                let cause = MongoAdapterError::MissingDatabase(
                    options.hosts.iter().map(|h| h.to_string()).collect::<Vec<_>>().join(","),
                );
                log::error!("{}", cause);
                return Err(DocketError::new_with_cause(
                    "MongoDB connection string must name a database",
                    ErrorKind::ConfigurationError,
                    cause,
                ));
            }
        };

        if let Some(client) = self.clients.get(connection_string) {
            return Ok((client.clone(), database));
        }

        self.config.apply(&mut options);
        let client = Client::with_options(options).map_err(|e| {
            log::error!("Failed to create MongoDB client: {}", e);
            DocketError::new_with_cause(
                "Failed to create MongoDB client",
                ErrorKind::ConnectionError,
                e,
            )
        })?;

        let client = self
            .clients
            .entry(connection_string.to_string())
            .or_insert(client)
            .clone();
        Ok((client, database))
    }
}

#[async_trait]
impl StoreModule for MongoModule {
    async fn connect(&self, connection_string: &str) -> DocketResult<DocumentStore> {
        let (client, database) = self.client(connection_string).await?;
        log::debug!("Connected to MongoDB database {}", database);
        Ok(DocumentStore::new(MongoStore::new(client, &database)))
    }
}

/// Builder for configuring a MongoDB store module.
pub struct MongoModuleBuilder {
    config: MongoConfig,
}

impl MongoModuleBuilder {
    #[inline]
    pub fn new() -> MongoModuleBuilder {
        MongoModuleBuilder {
            config: MongoConfig::new(),
        }
    }

    /// Sets the application name reported to the server.
    pub fn app_name(mut self, app_name: &str) -> Self {
        self.config.set_app_name(app_name);
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.set_connect_timeout(timeout);
        self
    }

    /// Bounds how long the driver waits for a suitable server before failing
    /// an operation.
    pub fn server_selection_timeout(mut self, timeout: Duration) -> Self {
        self.config.set_server_selection_timeout(timeout);
        self
    }

    pub fn max_pool_size(mut self, size: u32) -> Self {
        self.config.set_max_pool_size(size);
        self
    }

    pub fn build(self) -> MongoModule {
        MongoModule {
            config: self.config,
            clients: Arc::new(DashMap::new()),
        }
    }
}

impl Default for MongoModuleBuilder {
    fn default() -> Self {
        MongoModuleBuilder::new()
    }
}
