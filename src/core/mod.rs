pub mod error;
pub mod explorer;
pub mod image;
pub mod search;
pub mod tree;

pub use error::CoreError;
pub use explorer::{ExplorerState, Selection, TreeRow};
pub use image::ImagePayload;
pub use search::{ContentMatch, MatchKind, SearchEngine, SearchMode, SearchResult};
pub use tree::{parse_tree, FileNode};
