mod execution_dao;
mod index_dao;
mod metadata_dao;
mod payload_storage_dao;
mod poll_data_dao;
mod queue_dao;

pub use execution_dao::ExecutionDao;
pub use index_dao::IndexDao;
pub use metadata_dao::MetadataDao;
pub use payload_storage_dao::PayloadStorageDao;
pub use poll_data_dao::{PollData, PollDataDao};
pub use queue_dao::QueueDao;
