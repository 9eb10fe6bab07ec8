pub mod client;
pub mod request;
pub mod response;
pub mod types;

// 常用类型再导出
pub use client::Client;
pub use request::{Request, join_url};
pub use response::Response;
pub use types::{Status, parse_method};
