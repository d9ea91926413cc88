use async_trait::async_trait;
use docket::config::ConnectionUrl;
use docket::errors::{DocketError, DocketResult, ErrorKind};
use docket::filter::Filter;
use docket::repository::{Entity, Repository};
use docket::store::memory::InMemoryModule;
use docket::store::{
    DocumentCollection, DocumentCollectionProvider, DocumentStore, DocumentStream, FindOptions,
    StoreModule, WriteResult,
};
use docket_mongodb_adapter::MongoModule;
use std::any::Any;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Environment entry holding a MongoDB connection string. When it is set,
/// tests run through [`run_test`] are repeated against that server.
pub const MONGODB_URL_ENTRY: &str = "DOCKET_TEST_MONGODB_URL";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Backend {
    Memory,
    MongoDb,
}

impl Backend {
    /// The in-memory backend, plus MongoDB when a server is configured.
    pub fn available() -> Vec<Backend> {
        let mut backends = vec![Backend::Memory];
        if mongodb_url().is_some() {
            backends.push(Backend::MongoDb);
        }
        backends
    }
}

pub fn mongodb_url() -> Option<String> {
    std::env::var(MONGODB_URL_ENTRY)
        .ok()
        .filter(|url| !url.trim().is_empty())
}

/// A store module for either backend.
#[derive(Clone)]
pub enum TestModule {
    Memory(InMemoryModule),
    MongoDb(MongoModule),
}

#[async_trait]
impl StoreModule for TestModule {
    async fn connect(&self, connection_string: &str) -> DocketResult<DocumentStore> {
        match self {
            TestModule::Memory(module) => module.connect(connection_string).await,
            TestModule::MongoDb(module) => module.connect(connection_string).await,
        }
    }
}

/// One isolated database on one backend.
#[derive(Clone)]
pub struct TestContext {
    backend: Backend,
    module: TestModule,
    connection_string: String,
    database: String,
}

impl TestContext {
    pub fn backend(&self) -> Backend {
        self.backend
    }

    pub fn module(&self) -> &TestModule {
        &self.module
    }

    pub fn connection_string(&self) -> &str {
        &self.connection_string
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    /// Opens a repository on the entity's default collection.
    pub async fn repository<T: Entity>(&self) -> DocketResult<Repository<T>> {
        Repository::open_with_connection_string(&self.module, &self.connection_string).await
    }

    /// Opens a repository on `collection`.
    pub async fn repository_on<T: Entity>(&self, collection: &str) -> DocketResult<Repository<T>> {
        Repository::open_collection(&self.module, &self.connection_string, collection).await
    }

    /// Opens a repository whose collection records every round-trip.
    pub async fn recorded_repository<T: Entity>(
        &self,
        delay: Option<Duration>,
    ) -> DocketResult<(Repository<T>, RecordingCollection)> {
        let store = self.module.connect(&self.connection_string).await?;
        let recording = RecordingCollection::new(store.collection(&T::entity_name())?, delay);
        let repository = Repository::from_collection(DocumentCollection::new(recording.clone()));
        Ok((repository, recording))
    }
}

pub fn random_database() -> String {
    format!("docket_test_{}", uuid::Uuid::new_v4().simple())
}

pub async fn create_test_context(backend: Backend) -> DocketResult<TestContext> {
    let database = random_database();
    match backend {
        Backend::Memory => Ok(TestContext {
            backend,
            module: TestModule::Memory(InMemoryModule::new()),
            connection_string: format!("memory://localhost/{}", database),
            database,
        }),
        Backend::MongoDb => {
            let url = mongodb_url().ok_or_else(|| {
                DocketError::new(
                    &format!("{} is not set", MONGODB_URL_ENTRY),
                    ErrorKind::ConfigurationError,
                )
            })?;
            let url = url.parse::<ConnectionUrl>()?.database(&database);
            let module = MongoModule::with_config()
                .app_name("docket-int-test")
                .server_selection_timeout(Duration::from_secs(5))
                .build();
            Ok(TestContext {
                backend,
                module: TestModule::MongoDb(module),
                connection_string: url.to_connection_string(),
                database,
            })
        }
    }
}

pub async fn cleanup(ctx: TestContext) -> DocketResult<()> {
    if ctx.backend != Backend::MongoDb {
        return Ok(());
    }

    let client = mongodb::Client::with_uri_str(ctx.connection_string())
        .await
        .map_err(|e| DocketError::backend("connect", e))?;
    client
        .database(ctx.database())
        .drop()
        .await
        .map_err(|e| DocketError::backend("drop_database", e))
}

/// Runs `test` once per available backend, each time on a fresh database.
///
/// The database is cleaned up whether the test passed or not; a failure
/// panics with the backend and the error.
pub async fn run_test<T, F>(test: T)
where
    T: Fn(TestContext) -> F,
    F: Future<Output = DocketResult<()>>,
{
    for backend in Backend::available() {
        let ctx = match create_test_context(backend).await {
            Ok(ctx) => ctx,
            Err(e) => panic!("Before run failed on {:?}: {:?}", backend, e),
        };

        let result = test(ctx.clone()).await;
        let after = cleanup(ctx).await;

        if let Err(e) = result {
            panic!("Test failed on {:?}: {:?}", backend, e);
        }
        if let Err(e) = after {
            panic!("After run failed on {:?}: {:?}", backend, e);
        }
    }
}

/// A collection that counts the round-trips made through it and can delay
/// each of them.
#[derive(Clone)]
pub struct RecordingCollection {
    inner: DocumentCollection,
    delay: Option<Duration>,
    round_trips: Arc<AtomicUsize>,
}

impl RecordingCollection {
    pub fn new(inner: DocumentCollection, delay: Option<Duration>) -> Self {
        RecordingCollection {
            inner,
            delay,
            round_trips: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn round_trips(&self) -> usize {
        self.round_trips.load(Ordering::SeqCst)
    }

    async fn record(&self) {
        self.round_trips.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl DocumentCollectionProvider for RecordingCollection {
    fn name(&self) -> String {
        self.inner.name()
    }

    async fn insert_one(&self, document: bson::Document) -> DocketResult<WriteResult> {
        self.record().await;
        self.inner.insert_one(document).await
    }

    async fn insert_many(&self, documents: Vec<bson::Document>) -> DocketResult<WriteResult> {
        self.record().await;
        self.inner.insert_many(documents).await
    }

    async fn replace_one(
        &self,
        filter: &Filter,
        replacement: bson::Document,
        upsert: bool,
    ) -> DocketResult<WriteResult> {
        self.record().await;
        self.inner.replace_one(filter, replacement, upsert).await
    }

    async fn delete_one(&self, filter: &Filter) -> DocketResult<WriteResult> {
        self.record().await;
        self.inner.delete_one(filter).await
    }

    async fn delete_many(&self, filter: &Filter) -> DocketResult<WriteResult> {
        self.record().await;
        self.inner.delete_many(filter).await
    }

    async fn count_documents(&self, filter: &Filter) -> DocketResult<u64> {
        self.record().await;
        self.inner.count_documents(filter).await
    }

    async fn find(&self, filter: &Filter, options: &FindOptions) -> DocketResult<DocumentStream> {
        self.record().await;
        self.inner.find(filter, options).await
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
