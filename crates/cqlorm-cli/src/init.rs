use crate::cli::InitArgs;
use std::path::Path;

pub(crate) const TEMPLATE: &str = r#"
hosts = ["127.0.0.1:9042"]
keyspace = "example_keyspace"

# Credentials are optional; give both or neither.
# username = "${SCYLLA_USER}"
# password = "${SCYLLA_PASSWORD}"

[replication]
strategy = "SimpleStrategy"
factor = 1

[logging]
queries = true
# slow_query_ms = 500
"#;

pub fn run(args: InitArgs) -> anyhow::Result<()> {
    write_template(&args.config)?;
    println!("wrote {}", args.config.display());
    Ok(())
}

fn write_template(path: &Path) -> anyhow::Result<()> {
    if path.exists() {
        anyhow::bail!("refusing to overwrite existing file: {}", path.display());
    }

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| {
            anyhow::anyhow!("failed to create directory {}: {e}", parent.display())
        })?;
    }

    std::fs::write(path, TEMPLATE.trim_start_matches('\n'))
        .map_err(|e| anyhow::anyhow!("failed to write {}: {e}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cqlorm::SessionConfig;

    #[test]
    fn template_is_a_valid_config() {
        let config = SessionConfig::from_toml_str(TEMPLATE).unwrap();
        assert_eq!(config.hosts, vec!["127.0.0.1:9042"]);
        assert_eq!(config.keyspace, "example_keyspace");
        assert!(config.username.is_none());
        assert!(config.logging.queries);
    }

    #[test]
    fn refuses_to_overwrite() {
        let dir = std::env::temp_dir().join(format!("cqlorm-init-{}", std::process::id()));
        let path = dir.join("nested").join("cqlorm.toml");
        let _ = std::fs::remove_dir_all(&dir);

        write_template(&path).unwrap();
        assert!(path.exists());
        let err = write_template(&path).unwrap_err();
        assert!(err.to_string().contains("refusing to overwrite"));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
