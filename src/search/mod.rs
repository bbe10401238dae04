//! Fuzzy search derived from the store's ordered list.

pub mod feed;
pub mod highlight;
pub mod index;
pub mod view;

pub use feed::SearchFeed;
pub use highlight::highlight;
pub use index::Field;
