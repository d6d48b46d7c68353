pub mod http;
pub mod render;

pub use http::{router, AppState, HttpServer};
pub use render::Templates;
