#[rustfmt::skip]
pub use crate::exception::{ErrorCode, SgResult};
pub use crate::{fmt_err, str_err};

#[rustfmt::skip]
// std
pub use std::cmp::Ordering;
pub use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
pub use std::sync::atomic::{AtomicBool, AtomicI32, AtomicI64, Ordering as AtomicOrdering};
pub use std::sync::Arc;

#[rustfmt::skip]
pub type InlineStr = smartstring::SmartString<smartstring::Compact>;
pub use lazy_static::lazy_static;
pub use once_cell::sync::{Lazy, OnceCell};
pub use parking_lot::{Mutex, RwLock};

#[rustfmt::skip]
pub use log::{debug, error, info, log_enabled, trace, warn, LevelFilter};

#[rustfmt::skip]
pub use crate::common::Object;
