use std::collections::BTreeMap;
use std::path::Path;

use crate::error::RcmpError;
use crate::query::model::TestDefinition;

/// Read a test-definition file from disk.
///
/// The file is a JSON object mapping test names to query targets. Any read or
/// parse problem is reported as [`RcmpError::Setup`] naming the file, so the
/// caller can skip it and carry on with the rest of the run.
pub async fn read_definition(path: impl AsRef<Path>) -> Result<TestDefinition, RcmpError> {
    let path = path.as_ref();
    let setup_error = |reason: String| RcmpError::Setup {
        path: path.display().to_string(),
        reason,
    };

    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| setup_error(e.to_string()))?;
    let tests: BTreeMap<String, String> =
        serde_json::from_str(&content).map_err(|e| setup_error(e.to_string()))?;

    Ok(TestDefinition {
        source: path.to_path_buf(),
        tests,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    async fn write_temp(dir: &tempfile::TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        tokio::fs::write(&path, content)
            .await
            .expect("writing temp file should succeed");
        path
    }

    #[tokio::test]
    async fn reads_name_to_target_mapping() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let path = write_temp(
            &dir,
            "suite.json",
            r#"{"cpu": "server.*.cpu", "mem": "sumSeries(server.*.mem)"}"#,
        )
        .await;

        let def = read_definition(&path).await.expect("read should succeed");
        assert_eq!(def.source, path);
        assert_eq!(def.len(), 2);
        assert_eq!(def.tests["cpu"], "server.*.cpu");
        assert_eq!(def.tests["mem"], "sumSeries(server.*.mem)");
    }

    #[tokio::test]
    async fn tests_are_ordered_by_name() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let path = write_temp(&dir, "suite.json", r#"{"zeta": "z", "alpha": "a", "mid": "m"}"#).await;

        let def = read_definition(&path).await.unwrap();
        let names: Vec<&str> = def.tests.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["alpha", "mid", "zeta"]);
    }

    #[tokio::test]
    async fn empty_object_is_a_valid_empty_definition() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let path = write_temp(&dir, "empty.json", "{}").await;
        let def = read_definition(&path).await.unwrap();
        assert!(def.is_empty());
    }

    #[tokio::test]
    async fn missing_file_is_a_setup_error() {
        let result = read_definition("/nonexistent/path/suite.json").await;
        match result {
            Err(RcmpError::Setup { path, .. }) => assert!(path.contains("suite.json")),
            other => panic!("expected Setup error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn invalid_json_is_a_setup_error() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let path = write_temp(&dir, "bad.json", "not valid json at all").await;
        assert!(matches!(
            read_definition(&path).await,
            Err(RcmpError::Setup { .. })
        ));
    }

    #[tokio::test]
    async fn non_string_targets_are_a_setup_error() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let path = write_temp(&dir, "numbers.json", r#"{"cpu": 42}"#).await;
        assert!(matches!(
            read_definition(&path).await,
            Err(RcmpError::Setup { .. })
        ));
    }

    #[tokio::test]
    async fn top_level_array_is_a_setup_error() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let path = write_temp(&dir, "array.json", r#"["server.*.cpu"]"#).await;
        assert!(read_definition(&path).await.is_err());
    }
}
