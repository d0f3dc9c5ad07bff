pub const DEFAULT_ERROR_LOG_PREFIX: &str = "error";
/// `chrono`/`strftime` layout for error-log names; sorts lexically by time.
pub const ERROR_LOG_TIMESTAMP_FORMAT: &str = "%Y%m%d-%H%M%S";

pub fn error_log_object_key(base_prefix: &str, timestamp: &str) -> String {
    let trimmed = base_prefix.trim_matches('/');
    if trimmed.is_empty() {
        format!("{timestamp}.log")
    } else {
        format!("{trimmed}/{timestamp}.log")
    }
}

/// Error-log body: a header naming the target bucket, then one missing key per line.
pub fn render_error_log(target_bucket: &str, not_found: &[String]) -> String {
    let mut body =
        format!("The following files were not found in the S3 bucket {target_bucket}:\n");
    for key in not_found {
        body.push_str(key);
        body.push('\n');
    }
    body
}
