//! MongoDB store adapter for docket.
//!
//! [`MongoModule`] turns a MongoDB connection string into a docket
//! `DocumentStore` backed by the official driver. The connection string must
//! name a default database; repositories bind to collections of it.
//!
//! ```rust,ignore
//! use docket::repository::Repository;
//! use docket_mongodb_adapter::MongoModule;
//!
//! let module = MongoModule::with_config()
//!     .app_name("billing")
//!     .server_selection_timeout(Duration::from_secs(5))
//!     .build();
//!
//! let invoices: Repository<Invoice> =
//!     Repository::open_with_connection_string(&module, "mongodb://localhost:27017/billing")
//!         .await?;
//! ```
//!
//! Driver errors are not translated: they reach callers as the cause of a
//! `BackendError` and can be recovered with
//! `DocketError::cause_as::<mongodb::error::Error>()`.

mod collection;
mod config;
mod error;
mod module;
mod store;

pub use collection::*;
pub use config::*;
pub use error::*;
pub use module::*;
pub use store::*;

#[cfg(test)]
#[ctor::ctor]
fn init() {
    colog::init();
}
