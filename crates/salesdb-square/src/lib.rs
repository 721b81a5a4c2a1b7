pub mod client;
pub mod error;
pub mod normalize;
pub mod parse;
pub mod retry;
pub mod types;

pub use client::{Extraction, OrderPage, OrderPager, OrderQuery, SquareClient};
pub use error::SquareError;
pub use normalize::{transform_all, transform_transaction, TransformOptions, TransformOutput};
pub use parse::{parse_order, ParsedOrder, RawLineItem, RawModifier, RawTransaction};
pub use retry::RetryPolicy;
