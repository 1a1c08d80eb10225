pub mod client;
pub mod config;
pub mod error;
pub mod response;
pub mod value;

pub use client::RestClient;
pub use config::{ApiKeyHeaders, ClientConfig, HeaderProvider, NoHeaders};
pub use error::{RestError, RestResult};
pub use response::RestResponse;
pub use value::{Payload, Row};

#[doc(hidden)]
pub use serde_json as __json;
