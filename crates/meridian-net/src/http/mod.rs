//! HTTP request execution.

mod executor;
mod request;
mod response;

pub use executor::HttpExecutor;
pub use request::{HttpMethod, Request, RequestParams};
pub use response::HttpResponse;
