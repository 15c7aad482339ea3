pub mod traits;
pub mod omdb;
pub mod error;

pub use traits::MovieSource;
pub use error::SourceError;
pub use omdb::OmdbClient;
