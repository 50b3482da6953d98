use std::env;

use object_storage::s3_image_storage::S3Settings;

fn non_empty(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Environment variables: AWS_ACCESS_KEY_ID, AWS_SECRET_ACCESS_KEY, AWS_REGION, S3_BUCKET.
pub fn s3_settings_from_env() -> S3Settings {
    S3Settings {
        access_key_id: non_empty("AWS_ACCESS_KEY_ID"),
        secret_access_key: non_empty("AWS_SECRET_ACCESS_KEY"),
        region: non_empty("AWS_REGION"),
        bucket: non_empty("S3_BUCKET"),
    }
}
