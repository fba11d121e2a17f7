//! Mentor Tools
//!
//! The natural-language-to-operation pipeline, independent of any concrete
//! remote API:
//! - `command_parser` - fence stripping and `StructuredRequest` extraction
//! - `json_repair` - recovery of truncated record arrays
//! - `dispatcher` - handler lookup, credential guard and error rendering

pub mod command_parser;
pub mod dispatcher;
pub mod json_repair;

pub use command_parser::{
    build_classification_prompt, extract_json_from_response, parse_structured_request,
    strip_code_fence, ParseOutcome,
};
pub use dispatcher::{
    render_dispatch_error, CredentialGuard, DispatchOutcome, OperationDispatcher,
    CREDENTIAL_PLACEHOLDER,
};
pub use json_repair::{
    repair_truncated_array, RecordShape, RepairError, RepairedDocument, STARTUP_RECORD_FIELDS,
};
