/// Object-storage operations the resolver needs from S3.
pub trait ObjectStore {
    fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, String>;

    /// True when at least one object in `bucket` starts with `prefix`.
    fn has_objects_with_prefix(&self, bucket: &str, prefix: &str) -> Result<bool, String>;

    fn put_object(&self, bucket: &str, key: &str, body: &[u8]) -> Result<(), String>;
}
