mod external_payload_storage_utils;
mod id_generator;
mod parameters_utils;
mod queue_utils;

pub use external_payload_storage_utils::{ExternalPayloadStorageUtils, PayloadOperation, PayloadType};
pub use id_generator::IdGenerator;
pub use parameters_utils::ParametersUtils;
pub use queue_utils::QueueUtils;
