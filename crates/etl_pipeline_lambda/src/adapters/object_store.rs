/// One page of keys returned by a listing call, in ascending key order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyListing {
    pub keys: Vec<String>,
    pub is_truncated: bool,
}

pub trait ObjectStore {
    /// Lists up to `max_keys` keys sorting strictly after `start_after`.
    fn list_keys(&self, start_after: Option<&str>, max_keys: usize) -> Result<KeyListing, String>;
    fn read_object(&self, key: &str) -> Result<Vec<u8>, String>;
    /// Replaces the object at `key` with `body`.
    fn write_object(&self, key: &str, body: &[u8]) -> Result<(), String>;
}
