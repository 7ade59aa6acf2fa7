mod exception;
mod exception_code;
mod exception_info;

pub use exception::{ErrorCode, ErrorCodeBacktrace, SgResult};
