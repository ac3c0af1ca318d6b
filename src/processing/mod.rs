//! Request/response processing for the interceptor.
//!
//! # Responsibilities
//! - Decide request modifications (blocking, request headers)
//! - Decide response modifications (show overrides, transformation, debug aids)
//! - Finalize a response description with deterministic header merging

pub mod finalizer;
pub mod headers;
pub mod html;
pub mod request;
pub mod response;
pub mod types;

pub use finalizer::ResponseFinalizer;
pub use request::RequestProcessor;
pub use response::ResponseProcessor;
pub use types::{Modifications, ProcessingResult, RequestFields, ResponseFields};
