use bson::oid::ObjectId;
use bson::Bson;
use docket::filter::{all, field};
use docket::repository::{NativeObjectId, Repository};
use docket::store::FindOptions;
use futures::TryStreamExt;

use crate::repository::{generate_person, generate_ticket, Person, Ticket};
use docket_int_test::test_util::run_test;

#[tokio::test]
async fn test_native_id_is_stored_as_object_id() {
    run_test(|ctx| async move {
        let repo: Repository<Person> = ctx.repository().await?;
        let added = repo.add(generate_person()).await?;
        let id = added.id.clone().expect("store assigns an id");

        let stored: Vec<bson::Document> = repo
            .collection()
            .find(&all(), &FindOptions::new())
            .await?
            .try_collect()
            .await?;
        assert_eq!(stored.len(), 1);
        assert_eq!(
            stored[0].get("_id"),
            Some(&Bson::ObjectId(NativeObjectId::parse(&id)?))
        );
        Ok(())
    })
    .await
}

#[tokio::test]
async fn test_caller_assigned_native_id() {
    run_test(|ctx| async move {
        let repo: Repository<Person> = ctx.repository().await?;
        let id = ObjectId::new().to_hex();

        let person = Person {
            id: Some(id.clone()),
            ..generate_person()
        };
        repo.add(person.clone()).await?;

        assert_eq!(repo.get_by_id(&id).await?, person);
        assert!(repo.exists(field("_id").eq(ObjectId::parse_str(&id)?)).await?);

        // an upper-case hex string names the same ObjectId
        let found = repo.get_by_id(&id.to_uppercase()).await?;
        assert_eq!(found.id, Some(id.clone()));

        assert_eq!(repo.delete_by_id(&id).await?, 1);
        assert_eq!(repo.count().await?, 0);
        Ok(())
    })
    .await
}

#[tokio::test]
async fn test_opaque_string_id_is_generated_as_string() {
    run_test(|ctx| async move {
        let repo: Repository<Ticket> = ctx.repository().await?;
        assert_eq!(repo.collection_name(), "Ticket");

        let added = repo.add(generate_ticket(1)).await?;
        let id = added.id.clone().expect("an id is generated");
        assert!(ObjectId::parse_str(&id).is_ok());

        // stored in the same form the key takes, so lookups by it succeed
        let stored: Vec<bson::Document> = repo
            .collection()
            .find(&all(), &FindOptions::new())
            .await?
            .try_collect()
            .await?;
        assert_eq!(stored[0].get("_id"), Some(&Bson::String(id.clone())));
        assert_eq!(repo.get_by_id(&id).await?, added);

        let listed = repo.query().to_vec().await?;
        assert_eq!(listed, vec![added]);
        Ok(())
    })
    .await
}

#[tokio::test]
async fn test_update_after_add_with_generated_string_id_replaces() {
    run_test(|ctx| async move {
        let repo: Repository<Ticket> = ctx.repository().await?;
        let added = repo.add(generate_ticket(1)).await?;
        let id = added.id.clone().expect("an id is generated");

        let changed = Ticket {
            title: "changed".to_string(),
            ..added
        };
        repo.update(changed.clone()).await?;

        assert_eq!(repo.count().await?, 1);
        assert_eq!(repo.get_by_id(&id).await?, changed);
        Ok(())
    })
    .await
}

#[tokio::test]
async fn test_store_object_id_is_not_read_as_string_key() {
    run_test(|ctx| async move {
        let repo: Repository<Ticket> = ctx.repository().await?;
        repo.collection()
            .insert_one(bson::doc! { "_id": ObjectId::new(), "title": "raw", "priority": 1 })
            .await?;

        let err = repo.query().to_vec().await.unwrap_err();
        assert_eq!(err.kind(), &docket::errors::ErrorKind::InvalidId);
        Ok(())
    })
    .await
}

#[tokio::test]
async fn test_opaque_string_id_assigned_by_caller() {
    run_test(|ctx| async move {
        let repo: Repository<Ticket> = ctx.repository().await?;
        let ticket = Ticket {
            id: Some("TCK-1001".to_string()),
            ..generate_ticket(3)
        };

        repo.add(ticket.clone()).await?;
        assert_eq!(repo.get_by_id(&"TCK-1001".to_string()).await?, ticket);

        let renamed = Ticket {
            title: "Printer on fire".to_string(),
            ..ticket
        };
        repo.update(renamed.clone()).await?;
        assert_eq!(repo.get_by_id(&"TCK-1001".to_string()).await?, renamed);
        assert_eq!(repo.count().await?, 1);
        Ok(())
    })
    .await
}
