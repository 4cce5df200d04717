//! In-memory adapters for the storefront's CRUD ports.
//!
//! The live core reaches catalog, customer and order storage only through
//! ports. These adapters back them for development and tests.

mod cart_store;
mod customer_repository;
mod order_repository;
mod visit_archive;

pub use cart_store::InMemoryCartStore;
pub use customer_repository::InMemoryCustomerRepository;
pub use order_repository::InMemoryOrderRepository;
pub use visit_archive::InMemoryVisitArchive;
