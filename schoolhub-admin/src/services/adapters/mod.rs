pub mod collection_adapter;
pub mod record_store;

pub use collection_adapter::CollectionAdapter;
pub use record_store::RecordStore;
