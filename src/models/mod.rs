pub mod url;

pub use url::{CreateShortUrlForm, ShortUrlRecord};
