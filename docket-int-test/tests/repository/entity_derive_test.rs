use docket::repository::{Entity, KeyOf};

use crate::repository::{Employee, LedgerEntry, Person, Ticket};

fn key_type_of<T: Entity>() -> &'static str {
    std::any::type_name::<KeyOf<T>>()
}

#[test]
fn test_derive_uses_named_collection_or_type_name() {
    assert_eq!(Employee::entity_name(), "employees");
    assert_eq!(Person::entity_name(), "people");
    assert_eq!(LedgerEntry::entity_name(), "ledger");
    assert_eq!(Ticket::entity_name(), "Ticket");
}

#[test]
fn test_derive_follows_serde_rename_of_id_field() {
    assert_eq!(Employee::entity_id().field_name(), "_id");
    assert_eq!(Person::entity_id().field_name(), "_id");
    assert_eq!(Ticket::entity_id().field_name(), "_id");
    assert_eq!(LedgerEntry::entity_id().field_name(), "number");
    assert!(!LedgerEntry::entity_id().is_doc_id());
}

#[test]
fn test_derive_picks_key_strategy() {
    assert_eq!(key_type_of::<Employee>(), "i64");
    assert_eq!(key_type_of::<LedgerEntry>(), "i64");
    assert_eq!(key_type_of::<Ticket>(), std::any::type_name::<String>());
    assert_eq!(key_type_of::<Person>(), std::any::type_name::<String>());
    assert!(std::any::type_name::<<Person as Entity>::Id>().ends_with("NativeObjectId"));
    assert!(std::any::type_name::<<Ticket as Entity>::Id>().contains("OpaqueKey"));
}
