pub mod error;
pub mod fetch;
pub mod group;
pub mod map;
pub mod mapping;
pub mod parse;
pub mod price;
pub mod resolve;
pub mod text;
pub mod types;

pub use error::FeedError;
pub use fetch::load_feed;
pub use group::{group_items, GroupConfig, GroupStrategy};
pub use map::map_group;
pub use mapping::MappingTable;
pub use parse::parse_feed;
pub use types::{FieldValue, FlatItem, Group};
