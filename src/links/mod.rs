pub mod link_service;
pub mod operation;

pub use link_service::{parse_base_url, rel, LinkBaseError, LinkDto, LinkParams, LinkService};
pub use operation::{Operation, Route};
