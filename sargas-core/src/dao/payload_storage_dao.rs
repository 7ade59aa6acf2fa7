use dashmap::DashMap;
use sargas_common::prelude::*;

/// Content-addressed store for externalized payloads. Paths are opaque
/// handles; concurrent readers of the same path are safe.
pub struct PayloadStorageDao;

static STORE: Lazy<DashMap<InlineStr, HashMap<InlineStr, Object>>> = Lazy::new(DashMap::new);

impl PayloadStorageDao {
    pub fn upload(path: &InlineStr, payload: HashMap<InlineStr, Object>) {
        STORE.insert(path.clone(), payload);
    }

    pub fn download(path: &str) -> SgResult<HashMap<InlineStr, Object>> {
        STORE
            .get(&InlineStr::from(path))
            .map(|x| x.clone())
            .ok_or_else(|| {
                ErrorCode::NotFound(format!("No payload found at external storage path: {}", path))
            })
    }
}
