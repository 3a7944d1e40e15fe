pub mod client;
pub mod response;

pub use client::{describe_error, describe_status, HttpClient, HttpClientBuilder};
pub use response::FetchedResponse;
