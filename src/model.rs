mod author;
mod book;
mod cover;
mod search;

pub use author::*;
pub use book::*;
pub use cover::*;
pub use search::*;
