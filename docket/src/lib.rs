//! # Docket - Typed Repositories over Document Stores
//!
//! Docket maps Rust types to documents of a document store and exposes
//! CRUD, bulk and query operations on them through a generic
//! [`Repository<T>`](repository::Repository).
//!
//! ## Key Features
//!
//! - **Typed**: entities are plain serde types; the identifier field and its
//!   key strategy are declared once through [`Entity`](repository::Entity)
//! - **Lazy queries**: results stream from the store one document at a time
//!   and can be re-enumerated
//! - **Bounded**: every round-trip honours an optional timeout and
//!   cancellation token
//! - **Pluggable stores**: an in-memory store ships with the crate, drivers
//!   plug in through [`StoreModule`](store::StoreModule)
//! - **Blocking front end**: [`BlockingRepository`](repository::BlockingRepository)
//!   for synchronous callers
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use docket::filter::field;
//! use docket::repository::{Entity, NativeObjectId, Repository};
//! use docket::store::memory::InMemoryModule;
//! use futures::TryStreamExt;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize)]
//! struct Person {
//!     #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
//!     id: Option<String>,
//!     name: String,
//!     age: i32,
//! }
//!
//! impl Entity for Person {
//!     type Id = NativeObjectId;
//!
//!     fn entity_name() -> String {
//!         "people".to_string()
//!     }
//! }
//!
//! let module = InMemoryModule::new();
//! let people: Repository<Person> =
//!     Repository::open_with_connection_string(&module, "memory://localhost/crm").await?;
//!
//! let ada = people.add(Person { id: None, name: "Ada".into(), age: 36 }).await?;
//! let adults: Vec<Person> = people
//!     .query()
//!     .filter(field("age").gte(18))
//!     .to_vec()
//!     .await?;
//! ```
//!
//! ## Module Organization
//!
//! - [`common`] - Constants and BSON value helpers
//! - [`config`] - Connection targets and repository configuration
//! - [`errors`] - Error types and result definitions
//! - [`filter`] - Query filters
//! - [`repository`] - Typed repositories, queries and entity streams
//! - [`repository_builder`] - Fluent repository configuration
//! - [`store`] - The document-store seam and the in-memory store

pub mod common;
pub mod config;
pub mod errors;
pub mod filter;
pub mod repository;
pub mod repository_builder;
pub mod store;
