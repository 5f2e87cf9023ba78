pub mod config;
pub mod convert;
pub mod decode;
pub mod error;
pub mod ids;
pub mod model;
pub mod query;
pub mod time;

pub use convert::convert_otlp_to_jaeger;
pub use decode::decode_trace_body;
pub use error::{Result, TempolensError};
pub use query::{extract_attributes, find_child_spans, find_span_by_id, root_spans};
pub use time::format_duration;
