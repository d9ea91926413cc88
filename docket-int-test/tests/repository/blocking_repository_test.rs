use docket::common::SortOrder;
use docket::errors::{DocketResult, ErrorKind};
use docket::filter::field;
use docket::repository::{BlockingRepository, Repository};
use docket::store::memory::InMemoryModule;

use crate::repository::{employee_with_age, generate_person, Employee, Person};
use docket_int_test::test_util::random_database;

fn open<T: docket::repository::Entity>(module: &InMemoryModule) -> DocketResult<BlockingRepository<T>> {
    BlockingRepository::open_with_connection_string(
        module,
        &format!("memory://localhost/{}", random_database()),
    )
}

#[test]
fn test_blocking_crud() -> DocketResult<()> {
    let module = InMemoryModule::new();
    let repo: BlockingRepository<Person> = open(&module)?;
    assert_eq!(repo.collection_name(), "people");

    let added = repo.add(generate_person())?;
    let id = added.id.clone().expect("store assigns an id");
    assert_eq!(repo.get_by_id(&id)?, added);

    let older = Person {
        age: added.age + 10,
        ..added.clone()
    };
    repo.update(older.clone())?;
    assert_eq!(repo.get_by_id(&id)?, older);

    assert_eq!(repo.count()?, 1);
    assert_eq!(repo.delete_by_id(&id)?, 1);
    assert_eq!(repo.delete_by_id(&id)?, 0);
    assert_eq!(repo.count()?, 0);
    Ok(())
}

#[test]
fn test_blocking_bulk_and_predicate_operations() -> DocketResult<()> {
    let module = InMemoryModule::new();
    let repo: BlockingRepository<Employee> = open(&module)?;

    repo.add_many(vec![
        employee_with_age(1, 20),
        employee_with_age(2, 30),
        employee_with_age(3, 40),
    ])?;
    assert!(repo.exists(field("age").eq(30))?);

    let updated = repo.update_many(vec![employee_with_age(3, 41), employee_with_age(4, 50)])?;
    assert_eq!(updated.len(), 2);
    assert_eq!(repo.count()?, 4);

    assert_eq!(repo.delete_where(field("age").gt(25))?, 3);
    assert_eq!(repo.delete(&employee_with_age(1, 20))?, 1);
    assert_eq!(repo.delete_all()?, 0);
    Ok(())
}

#[test]
fn test_blocking_iteration() -> DocketResult<()> {
    let module = InMemoryModule::new();
    let repo: BlockingRepository<Employee> = open(&module)?;
    repo.add_many((1..=5).map(|id| employee_with_age(id, 20 + id as i32)).collect())?;

    let mut seen = 0;
    for employee in &repo {
        employee?;
        seen += 1;
    }
    assert_eq!(seen, 5);

    let query = repo
        .query()
        .filter(field("age").gte(23))
        .sort_by("age", SortOrder::Descending);
    let ids: Vec<i64> = repo
        .iter_query(&query)
        .map(|employee| employee.map(|e| e.emp_id.unwrap_or_default()))
        .collect::<DocketResult<_>>()?;
    assert_eq!(ids, vec![5, 4, 3]);

    // the query can be fetched again, and lazily
    assert_eq!(repo.fetch(&query)?.len(), 3);
    assert_eq!(repo.iter_query(&query).take(1).count(), 1);
    Ok(())
}

#[test]
fn test_blocking_errors_match_async_errors() -> DocketResult<()> {
    let module = InMemoryModule::new();
    let repo: BlockingRepository<Person> = open(&module)?;

    let err = repo.get_by_id(&"zz".to_string()).unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::InvalidId);

    let missing = bson::oid::ObjectId::new().to_hex();
    let err = repo.get_by_id(&missing).unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::NotFound);
    Ok(())
}

#[test]
fn test_blocking_and_async_share_the_collection() -> DocketResult<()> {
    let module = InMemoryModule::new();
    let connection_string = format!("memory://localhost/{}", random_database());

    let blocking: BlockingRepository<Employee> =
        BlockingRepository::open_collection(&module, &connection_string, "staff")?;
    blocking.add(employee_with_age(1, 30))?;

    let runtime = tokio::runtime::Runtime::new()?;
    let count = runtime.block_on(async {
        let repo: Repository<Employee> =
            Repository::open_collection(&module, &connection_string, "staff").await?;
        repo.count().await
    })?;
    assert_eq!(count, 1);

    let wrapped = BlockingRepository::from_repository(blocking.as_async().clone())?;
    assert_eq!(wrapped.collection_name(), "staff");
    assert_eq!(wrapped.count()?, 1);
    Ok(())
}
