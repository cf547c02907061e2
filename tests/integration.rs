use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn sqlclean_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_sqlclean"))
}

fn setup_test_env() -> (TempDir, PathBuf, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let repo = root.join("repo");
    fs::create_dir_all(repo.join("docs")).unwrap();
    fs::create_dir_all(repo.join("queries")).unwrap();
    fs::write(
        repo.join("docs/alpha.md"),
        "# Alpha\n\nThe billing service stores invoices in the invoices table.\n\nAlways filter invoices by tenant_id.",
    )
    .unwrap();
    fs::write(
        repo.join("docs/beta.md"),
        "# Beta\n\nDeployment notes for the kubernetes cluster and docker images.",
    )
    .unwrap();
    fs::write(
        repo.join("queries/report.sql"),
        "SELECT customer_id, SUM(amount) FROM payments GROUP BY customer_id;",
    )
    .unwrap();
    fs::write(repo.join("notes.txt"), "invoices invoices invoices").unwrap();

    let config_path = root.join("sqlclean.toml");
    fs::write(
        &config_path,
        r#"[corpus]
chunk_size = 500

[retrieval]
mode = "hybrid"
top_k = 3

[embedding]
provider = "hashing"
dims = 128

[logging]
level = "warn"
"#,
    )
    .unwrap();

    (tmp, config_path, repo)
}

fn run_sqlclean(config_path: Option<&Path>, args: &[&str]) -> (String, String, bool) {
    let binary = sqlclean_binary();
    let mut cmd = Command::new(&binary);
    if let Some(path) = config_path {
        cmd.arg("--config").arg(path);
    }
    let output = cmd
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run sqlclean binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

#[test]
fn test_index_reports_stats() {
    let (_tmp, config_path, repo) = setup_test_env();

    let (stdout, stderr, success) =
        run_sqlclean(Some(&config_path), &["index", repo.to_str().unwrap()]);
    assert!(success, "index failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("files indexed: 3"), "stdout={}", stdout);
    assert!(stdout.contains("files skipped: 0"));
    assert!(stdout.contains("fragments: 3"));
    assert!(stdout.contains("backends: lexical, collection, flat"));
}

#[test]
fn test_index_without_config_uses_defaults() {
    let (_tmp, _config_path, repo) = setup_test_env();

    let (stdout, stderr, success) = run_sqlclean(None, &["index", repo.to_str().unwrap()]);
    assert!(success, "index failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("hybrid mode"));
}

#[test]
fn test_index_missing_repo_is_empty() {
    let (tmp, config_path, _repo) = setup_test_env();
    let missing = tmp.path().join("nowhere");

    let (stdout, _, success) =
        run_sqlclean(Some(&config_path), &["index", missing.to_str().unwrap()]);
    assert!(success);
    assert!(stdout.contains("files indexed: 0"));
    assert!(stdout.contains("fragments: 0"));
}

#[test]
fn test_search_json_ranks_relevant_file_first() {
    let (_tmp, config_path, repo) = setup_test_env();

    let (stdout, stderr, success) = run_sqlclean(
        Some(&config_path),
        &[
            "search",
            "invoices tenant_id",
            "--repo",
            repo.to_str().unwrap(),
            "--format",
            "json",
        ],
    );
    assert!(success, "search failed: stdout={}, stderr={}", stdout, stderr);

    let results: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let results = results.as_array().unwrap();
    assert!(!results.is_empty());
    assert!(results.len() <= 3);
    assert!(results[0]["source"].as_str().unwrap().ends_with("alpha.md"));
    assert!(results[0]["content"].as_str().unwrap().contains("tenant_id"));
}

#[test]
fn test_search_simple_mode_only_returns_matches() {
    let (_tmp, config_path, repo) = setup_test_env();

    let (stdout, _, success) = run_sqlclean(
        Some(&config_path),
        &[
            "search",
            "payments",
            "--repo",
            repo.to_str().unwrap(),
            "--mode",
            "simple",
            "--format",
            "json",
        ],
    );
    assert!(success);

    let results: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let results = results.as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert!(results[0]["source"].as_str().unwrap().ends_with("report.sql"));
}

#[test]
fn test_search_top_k_bounds_output() {
    let (_tmp, config_path, repo) = setup_test_env();

    let (stdout, _, success) = run_sqlclean(
        Some(&config_path),
        &[
            "search",
            "invoices",
            "--repo",
            repo.to_str().unwrap(),
            "--top-k",
            "1",
            "--format",
            "json",
        ],
    );
    assert!(success);
    let results: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(results.as_array().unwrap().len(), 1);
}

#[test]
fn test_search_prompt_format() {
    let (_tmp, config_path, repo) = setup_test_env();

    let (stdout, _, success) = run_sqlclean(
        Some(&config_path),
        &[
            "search",
            "invoices",
            "--repo",
            repo.to_str().unwrap(),
            "--format",
            "prompt",
        ],
    );
    assert!(success);
    assert!(stdout.starts_with("Relevant repository context:"));
    assert!(stdout.contains("alpha.md ---"));
}

#[test]
fn test_search_text_format() {
    let (_tmp, config_path, repo) = setup_test_env();

    let (stdout, _, success) = run_sqlclean(
        Some(&config_path),
        &["search", "invoices", "--repo", repo.to_str().unwrap()],
    );
    assert!(success);
    assert!(stdout.starts_with("1. ["));
    assert!(stdout.contains("excerpt:"));
}

#[test]
fn test_search_no_results_on_empty_repo() {
    let (tmp, config_path, _repo) = setup_test_env();
    let empty = tmp.path().join("empty");
    fs::create_dir_all(&empty).unwrap();

    let (stdout, _, success) = run_sqlclean(
        Some(&config_path),
        &["search", "anything", "--repo", empty.to_str().unwrap()],
    );
    assert!(success);
    assert!(stdout.contains("No results."));
}

#[test]
fn test_search_unknown_mode_errors() {
    let (_tmp, config_path, repo) = setup_test_env();

    let (_, stderr, success) = run_sqlclean(
        Some(&config_path),
        &["search", "x", "--repo", repo.to_str().unwrap(), "--mode", "fancy"],
    );
    assert!(!success);
    assert!(stderr.contains("fancy"));
}

#[test]
fn test_search_hybrid_errors_when_disabled() {
    let (tmp, _config_path, repo) = setup_test_env();
    let config_path = tmp.path().join("disabled.toml");
    fs::write(
        &config_path,
        "[retrieval]\nmode = \"simple\"\n\n[embedding]\nprovider = \"disabled\"\n",
    )
    .unwrap();

    let (_, _, success) = run_sqlclean(
        Some(&config_path),
        &["search", "invoices", "--repo", repo.to_str().unwrap()],
    );
    assert!(success, "simple mode should work without embeddings");

    let (_, stderr, success) = run_sqlclean(
        Some(&config_path),
        &["search", "invoices", "--repo", repo.to_str().unwrap(), "--mode", "hybrid"],
    );
    assert!(!success);
    assert!(stderr.contains("requires embeddings"));
}

#[test]
fn test_invalid_config_errors() {
    let (tmp, _config_path, repo) = setup_test_env();
    let config_path = tmp.path().join("bad.toml");
    fs::write(&config_path, "[corpus]\nchunk_size = 0\n").unwrap();

    let (_, stderr, success) = run_sqlclean(Some(&config_path), &["index", repo.to_str().unwrap()]);
    assert!(!success);
    assert!(stderr.contains("Error"));
    assert!(stderr.contains("chunk_size"));
}

#[test]
fn test_strategies_lists_modes() {
    let (stdout, _, success) = run_sqlclean(None, &["strategies"]);
    assert!(success);
    assert!(stdout.contains("simple"));
    assert!(stdout.contains("hybrid"));
    assert!(stdout.contains("components:"));
}
