pub mod fetcher;

pub use fetcher::{FetchError, FetchResult, RoutingFetcher};
