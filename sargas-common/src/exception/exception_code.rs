#![allow(non_snake_case)]

use std::backtrace::Backtrace;
use std::sync::Arc;

use super::exception::{ErrorCode, ErrorCodeBacktrace};

macro_rules! build_exceptions {
    ($($body:ident($code:expr)),*$(,)*) => {
            impl ErrorCode {
                $(
                pub fn $body(display_text: impl Into<String>) -> ErrorCode {
                    let bt = Some(ErrorCodeBacktrace::Origin(Arc::new(Backtrace::capture())));
                    ErrorCode::create(
                        $code,
                        display_text.into(),
                        None,
                        bt,
                    )
                }
                paste::paste! {
                    pub fn [< $body:snake _ code >] ()  -> u16{
                        $code
                    }
                }
                )*
            }
    }
}

// Internal errors [0, 2000].
impl ErrorCode {
    pub const TERMINATE_WORKFLOW_CODE: u16 = 1006;
}
build_exceptions! {
    Ok(0),
    InvalidInput(1001),
    NotFound(1002),
    Conflict(1003),
    SendEventFailed(1004),
    NonTransient(1005),
    TerminateWorkflow(ErrorCode::TERMINATE_WORKFLOW_CODE),
    TransientException(1007),
    UnknownException(1999),
}
