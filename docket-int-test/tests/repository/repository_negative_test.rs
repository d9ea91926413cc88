use docket::errors::ErrorKind;
use docket::repository::Repository;
use docket::store::memory::InMemoryStoreError;

use crate::repository::{generate_employee, Employee, LedgerEntry, Person};
use docket_int_test::test_util::{run_test, Backend};

fn entry(slot: &str, number: i64, amount: f64) -> LedgerEntry {
    LedgerEntry {
        slot: slot.to_string(),
        number: Some(number),
        amount,
    }
}

#[tokio::test]
async fn test_get_by_id_not_found() {
    run_test(|ctx| async move {
        let repo: Repository<Employee> = ctx.repository().await?;
        repo.add(generate_employee(1)).await?;

        let err = repo.get_by_id(&2).await.unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::NotFound);
        Ok(())
    })
    .await
}

#[tokio::test]
async fn test_get_by_id_with_duplicate_ids_is_not_unique() {
    run_test(|ctx| async move {
        let repo: Repository<LedgerEntry> = ctx.repository().await?;
        repo.add(entry("a", 7, 10.0)).await?;
        repo.add(entry("b", 7, 20.0)).await?;

        let err = repo.get_by_id(&7).await.unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::NotUnique);

        repo.add(entry("c", 8, 5.0)).await?;
        assert_eq!(repo.get_by_id(&8).await?, entry("c", 8, 5.0));
        Ok(())
    })
    .await
}

#[tokio::test]
async fn test_add_with_duplicate_id_keeps_store_error() {
    run_test(|ctx| async move {
        let repo: Repository<Employee> = ctx.repository().await?;
        repo.add(generate_employee(1)).await?;

        let err = repo.add(generate_employee(1)).await.unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::BackendError);
        match ctx.backend() {
            Backend::Memory => assert!(matches!(
                err.cause_as::<InMemoryStoreError>(),
                Some(InMemoryStoreError::DuplicateKey { .. })
            )),
            Backend::MongoDb => assert!(err.cause_as::<mongodb::error::Error>().is_some()),
        }
        assert_eq!(repo.count().await?, 1);
        Ok(())
    })
    .await
}

#[tokio::test]
async fn test_add_many_stops_at_first_failure() {
    run_test(|ctx| async move {
        let repo: Repository<Employee> = ctx.repository().await?;
        repo.add(generate_employee(2)).await?;

        let batch = vec![generate_employee(1), generate_employee(2), generate_employee(3)];
        let err = repo.add_many(batch).await.unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::BackendError);

        assert!(repo.get_by_id(&1).await.is_ok());
        assert_eq!(repo.get_by_id(&3).await.unwrap_err().kind(), &ErrorKind::NotFound);
        assert_eq!(repo.count().await?, 2);
        Ok(())
    })
    .await
}

#[tokio::test]
async fn test_update_many_stops_at_rejected_entity() {
    run_test(|ctx| async move {
        let repo: Repository<LedgerEntry> = ctx.repository().await?;

        // the second entry reuses the first one's _id, which the store rejects
        let batch = vec![entry("a", 1, 10.0), entry("a", 2, 20.0), entry("c", 3, 30.0)];
        let err = repo.update_many(batch).await.unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::BackendError);

        assert_eq!(repo.get_by_id(&1).await?, entry("a", 1, 10.0));
        assert_eq!(repo.get_by_id(&2).await.unwrap_err().kind(), &ErrorKind::NotFound);
        assert_eq!(repo.get_by_id(&3).await.unwrap_err().kind(), &ErrorKind::NotFound);
        assert_eq!(repo.count().await?, 1);
        Ok(())
    })
    .await
}

#[tokio::test]
async fn test_invalid_native_id_fails_before_round_trip() {
    run_test(|ctx| async move {
        let (repo, recording) = ctx.recorded_repository::<Person>(None).await?;
        let bad = "not-an-object-id".to_string();

        let err = repo.get_by_id(&bad).await.unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InvalidId);

        let err = repo.delete_by_id(&bad).await.unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InvalidId);

        let person = Person {
            id: Some(bad.clone()),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            age: 36,
        };
        assert_eq!(repo.update(person.clone()).await.unwrap_err().kind(), &ErrorKind::InvalidId);
        assert_eq!(repo.delete(&person).await.unwrap_err().kind(), &ErrorKind::InvalidId);
        assert_eq!(repo.add(person).await.unwrap_err().kind(), &ErrorKind::InvalidId);

        assert_eq!(recording.round_trips(), 0);
        Ok(())
    })
    .await
}

#[tokio::test]
async fn test_integer_key_without_id_fails_before_round_trip() {
    run_test(|ctx| async move {
        let (repo, recording) = ctx.recorded_repository::<Employee>(None).await?;
        let employee = Employee {
            emp_id: None,
            ..generate_employee(1)
        };

        let err = repo.add(employee.clone()).await.unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InvalidId);
        let err = repo.update(employee).await.unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InvalidId);

        assert_eq!(recording.round_trips(), 0);
        Ok(())
    })
    .await
}

#[tokio::test]
async fn test_unmappable_document_fails_the_stream() {
    run_test(|ctx| async move {
        use docket::filter::field;
        use futures::TryStreamExt;

        let repo: Repository<Employee> = ctx.repository().await?;
        repo.add(generate_employee(1)).await?;

        // an unknown shape in the collection fails mapping on that item only
        let raw = repo.collection().clone();
        raw.insert_one(bson::doc! { "_id": 2i64, "name": 5 }).await?;

        let err = repo
            .query()
            .filter(field("_id").eq(2i64))
            .stream()
            .try_collect::<Vec<_>>()
            .await
            .unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::ObjectMappingError);
        assert_eq!(repo.get_by_id(&1).await?.emp_id, Some(1));
        Ok(())
    })
    .await
}
