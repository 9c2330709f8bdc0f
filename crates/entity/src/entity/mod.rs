//! Request entities and the builders that produce them.
//!
//! - [`Entity`]: the single-use body handed to the transport, implementing
//!   `http_body::Body`
//! - [`ByteRange`]: a validated window into a caller buffer
//! - [`BodySource`]: a tagged union over every supported body input
//! - `build_*` functions: one builder per body kind

mod body;
pub use body::Entity;

mod range;
pub use range::ByteRange;

mod source;
pub use source::BodySource;

mod builder;
pub use builder::build_byte_range_body;
pub use builder::build_bytes_body;
pub use builder::build_file_body;
pub use builder::build_form_body;
pub use builder::build_serialized_form_body;
pub use builder::build_stream_body;
pub use builder::build_text_body;
