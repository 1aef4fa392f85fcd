pub mod collection;
pub mod dto;
pub mod links;
pub mod record;
pub mod tags;

// Re-export handler functions for use in routing
pub use collection::get as collection_get;
pub use collection::post as collection_post;

pub use record::delete as record_delete;
pub use record::get as record_get;
pub use record::patch as record_patch;
pub use record::put as record_put;

pub use tags::delete as tags_delete;
pub use tags::put as tags_put;
