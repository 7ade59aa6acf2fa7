use base58::ToBase58;
use sargas_common::prelude::*;
use uuid::Uuid;

/// ID Generator. The default ID generator uses UUID v4 rendered as base58.
/// Task ids are the sole correlation key across the queue, the store and the
/// index, so they must be globally unique.
pub struct IdGenerator;

impl IdGenerator {
    pub fn generate() -> InlineStr {
        Uuid::new_v4().as_bytes().to_base58().into()
    }
}
