use super::schema::Config;

/// Validate configuration at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_config(config: &Config) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if config.partitions == 0 {
        errors.push("partitions: must be at least 1".to_string());
    }

    for (name, path) in [
        ("input", &config.input),
        ("shard_dir", &config.shard_dir),
        ("merge_dir", &config.merge_dir),
    ] {
        if path.as_os_str().is_empty() {
            errors.push(format!("{}: must not be empty", name));
        }
    }

    if !config.shard_dir.as_os_str().is_empty() && config.shard_dir == config.merge_dir {
        errors.push(format!(
            "merge_dir: must differ from shard_dir ({})",
            config.shard_dir.display()
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
