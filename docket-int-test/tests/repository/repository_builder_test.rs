use docket::common::DEFAULT_CONNECTION_ENTRY;
use docket::config::ConnectionUrl;
use docket::errors::ErrorKind;
use docket::repository::Repository;
use docket::store::memory::InMemoryModule;
use docket::store::StoreModule;

use crate::repository::{generate_employee, generate_ticket, Employee, Ticket};
use docket_int_test::test_util::{random_database, run_test};

#[tokio::test]
async fn test_open_reads_default_connection_entry() {
    let module = InMemoryModule::new();
    let database = random_database();
    std::env::set_var(
        DEFAULT_CONNECTION_ENTRY,
        format!("memory://localhost/{}", database),
    );

    let repo: Repository<Employee> = Repository::open(&module).await.unwrap();
    assert_eq!(repo.collection_name(), "employees");
    repo.add(generate_employee(1)).await.unwrap();

    let store = module
        .connect(&format!("memory://localhost/{}", database))
        .await
        .unwrap();
    assert_eq!(store.database_name(), database);
    let collection = store.collection("employees").unwrap();
    assert_eq!(collection.count_documents(&docket::filter::all()).await.unwrap(), 1);
}

#[tokio::test]
async fn test_open_reads_named_connection_entry() {
    let module = InMemoryModule::new();
    std::env::set_var(
        "DOCKET_BUILDER_TEST_SETTINGS",
        format!("memory://localhost/{}", random_database()),
    );

    let repo: Repository<Ticket> = Repository::builder()
        .connection_entry("DOCKET_BUILDER_TEST_SETTINGS")
        .open(&module)
        .await
        .unwrap();
    assert_eq!(repo.collection_name(), "Ticket");
    assert_eq!(repo.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_missing_connection_entry_is_a_configuration_error() {
    let module = InMemoryModule::new();
    let err = Repository::<Ticket>::builder()
        .connection_entry("DOCKET_BUILDER_TEST_UNSET_ENTRY")
        .open(&module)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::ConfigurationError);
    assert_eq!(module.database_count(), 0);
}

#[tokio::test]
async fn test_open_collection_overrides_entity_name() {
    run_test(|ctx| async move {
        let archive: Repository<Employee> = ctx.repository_on("employees_archive").await?;
        let current: Repository<Employee> = ctx.repository().await?;
        assert_eq!(archive.collection_name(), "employees_archive");
        assert_eq!(current.collection_name(), "employees");

        archive.add(generate_employee(1)).await?;
        assert_eq!(archive.count().await?, 1);
        assert_eq!(current.count().await?, 0);
        Ok(())
    })
    .await
}

#[tokio::test]
async fn test_open_url() {
    let module = InMemoryModule::new();
    let url = ConnectionUrl::new("memory")
        .host("localhost", None)
        .database(&random_database());

    let tickets: Repository<Ticket> = Repository::open_url(&module, &url, None).await.unwrap();
    assert_eq!(tickets.collection_name(), "Ticket");
    tickets.add(generate_ticket(2)).await.unwrap();

    let renamed: Repository<Ticket> = Repository::open_url(&module, &url, Some("tickets_v2"))
        .await
        .unwrap();
    assert_eq!(renamed.collection_name(), "tickets_v2");
    assert_eq!(renamed.count().await.unwrap(), 0);

    // both repositories live in the same database
    assert_eq!(module.database_count(), 1);
}

#[tokio::test]
async fn test_from_collection_shares_the_handle() {
    run_test(|ctx| async move {
        let store = ctx.module().connect(ctx.connection_string()).await?;
        let collection = store.collection("staff")?;

        let employees: Repository<Employee> = Repository::from_collection(collection.clone());
        assert_eq!(employees.collection_name(), "staff");
        employees.add(generate_employee(7)).await?;

        assert_eq!(collection.count_documents(&docket::filter::all()).await?, 1);
        let again: Repository<Employee> = ctx.repository_on("staff").await?;
        assert_eq!(again.get_by_id(&7).await?.emp_id, Some(7));
        Ok(())
    })
    .await
}

#[tokio::test]
async fn test_invalid_configuration_is_reported_by_open() {
    let module = InMemoryModule::new();

    let err = Repository::<Ticket>::builder()
        .connection_string("")
        .open(&module)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::ConfigurationError);

    let err = Repository::<Ticket>::builder()
        .connection_string("memory://localhost/builder")
        .collection_name("")
        .open(&module)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::ConfigurationError);

    let err = Repository::<Ticket>::builder()
        .connection_url(&ConnectionUrl::new("memory"))
        .open(&module)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::ConfigurationError);

    let err = Repository::<Ticket>::open_with_connection_string(&module, "redis://localhost/0")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::ConfigurationError);

    assert_eq!(module.database_count(), 0);
}
