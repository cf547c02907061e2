use std::fs;
use std::path::Path;
use tempfile::TempDir;

use sqlclean::config::Config;
use sqlclean::rag::Rag;
use sqlclean::strategy::RetrievalMode;

fn hybrid_config() -> Config {
    let mut config = Config::default();
    config.embedding.dims = Some(128);
    config
}

fn simple_config() -> Config {
    let mut config = Config::default();
    config.retrieval.mode = RetrievalMode::Simple;
    config.embedding.provider = "disabled".to_string();
    config
}

fn write(dir: &Path, rel: &str, body: impl AsRef<[u8]>) {
    let path = dir.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, body).unwrap();
}

#[tokio::test]
async fn test_600_char_file_yields_two_fragments() {
    let tmp = TempDir::new().unwrap();
    let body: String = "SELECT id FROM t; ".repeat(40).chars().take(600).collect();
    assert_eq!(body.chars().count(), 600);
    write(tmp.path(), "a.sql", &body);

    let rag = Rag::new(&hybrid_config()).unwrap();
    let stats = rag.index_directory(tmp.path()).await.unwrap();
    assert_eq!(stats.files_indexed, 1);
    assert_eq!(stats.fragments, 2);

    let results = rag.retrieve("SELECT", 5).await.unwrap();
    assert_eq!(results.len(), 2);
    let mut lengths: Vec<usize> = results.iter().map(|f| f.content.chars().count()).collect();
    lengths.sort_unstable();
    assert_eq!(lengths, vec![100, 500]);
    assert!(results.iter().all(|f| f.source.ends_with("a.sql")));
}

#[tokio::test]
async fn test_empty_directory_returns_nothing() {
    let tmp = TempDir::new().unwrap();

    let rag = Rag::new(&hybrid_config()).unwrap();
    let stats = rag.index_directory(tmp.path()).await.unwrap();
    assert_eq!(stats.fragments, 0);
    assert!(rag.retrieve("anything", 5).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_unreadable_file_is_skipped() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "good.sql", "SELECT name FROM customers;");
    write(tmp.path(), "broken.sql", [0xffu8, 0xfe, 0xfd]);

    let rag = Rag::new(&hybrid_config()).unwrap();
    let stats = rag.index_directory(tmp.path()).await.unwrap();
    assert_eq!(stats.files_indexed, 1);
    assert_eq!(stats.files_skipped, 1);

    let results = rag.retrieve("customers", 5).await.unwrap();
    assert_eq!(results.len(), 1);
    assert!(results[0].source.ends_with("good.sql"));
}

#[tokio::test]
async fn test_unbounded_k_returns_every_fragment() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "a.sql", "SELECT id FROM orders WHERE total > 100;");

    let rag = Rag::new(&hybrid_config()).unwrap();
    rag.index_directory(tmp.path()).await.unwrap();

    let results = rag.retrieve("orders", usize::MAX).await.unwrap();
    assert_eq!(results.len(), 1);
    assert!(results[0].source.ends_with("a.sql"));
}

#[tokio::test]
async fn test_reindex_is_idempotent() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "orders.sql", "SELECT * FROM orders WHERE status = 'open';");
    write(tmp.path(), "docs/orders.md", "Orders are archived nightly. Query orders by status.");
    write(tmp.path(), "docs/users.md", "Users belong to exactly one tenant.");

    let rag = Rag::new(&hybrid_config()).unwrap();
    rag.index_directory(tmp.path()).await.unwrap();
    let first = rag.retrieve("orders status", 3).await.unwrap();
    rag.index_directory(tmp.path()).await.unwrap();
    let second = rag.retrieve("orders status", 3).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(rag.fragment_count(), 3);
}

#[tokio::test]
async fn test_reindex_replaces_corpus() {
    let first = TempDir::new().unwrap();
    write(first.path(), "old.sql", "SELECT legacy_column FROM legacy_table;");
    let second = TempDir::new().unwrap();
    write(second.path(), "new.sql", "SELECT fresh_column FROM fresh_table;");

    let rag = Rag::new(&simple_config()).unwrap();
    rag.index_directory(first.path()).await.unwrap();
    assert_eq!(rag.retrieve("legacy_table", 5).await.unwrap().len(), 1);

    rag.index_directory(second.path()).await.unwrap();
    assert!(rag.retrieve("legacy_table", 5).await.unwrap().is_empty());
    assert_eq!(rag.retrieve("fresh_table", 5).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_identical_content_different_sources_stay_distinct() {
    let tmp = TempDir::new().unwrap();
    let body = "SELECT amount FROM refunds;";
    write(tmp.path(), "a.sql", body);
    write(tmp.path(), "b.sql", body);

    let rag = Rag::new(&hybrid_config()).unwrap();
    rag.index_directory(tmp.path()).await.unwrap();

    let results = rag.retrieve("refunds", 5).await.unwrap();
    assert_eq!(results.len(), 2);
    assert_ne!(results[0].source, results[1].source);
    assert_eq!(results[0].content, results[1].content);
    // Equal scores keep corpus order.
    assert!(results[0].source.ends_with("a.sql"));
}

#[tokio::test]
async fn test_output_bounded_by_k() {
    let tmp = TempDir::new().unwrap();
    for i in 0..8 {
        write(
            tmp.path(),
            &format!("q{}.sql", i),
            format!("SELECT col_{} FROM shipments;", i),
        );
    }

    let rag = Rag::new(&hybrid_config()).unwrap();
    rag.index_directory(tmp.path()).await.unwrap();
    for k in [1, 3, 8, 20] {
        let results = rag.retrieve("shipments", k).await.unwrap();
        assert!(results.len() <= k);
        assert!(results.len() <= 8);
    }
}

#[tokio::test]
async fn test_simple_mode_enforces_floor() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "a.sql", "SELECT total FROM invoices;");
    write(tmp.path(), "b.md", "Deployment runbook for the kubernetes cluster.");

    let rag = Rag::new(&simple_config()).unwrap();
    let stats = rag.index_directory(tmp.path()).await.unwrap();
    assert_eq!(stats.backends, vec!["lexical".to_string()]);

    let results = rag.retrieve("invoices", 5).await.unwrap();
    assert_eq!(results.len(), 1);
    assert!(results[0].source.ends_with("a.sql"));
    assert!(rag.retrieve("zebra", 5).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_scored_results_are_descending() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "a.sql", "SELECT * FROM orders JOIN customers USING (customer_id);");
    write(tmp.path(), "b.sql", "SELECT * FROM orders;");
    write(tmp.path(), "c.md", "Release notes for version two.");

    let rag = Rag::new(&hybrid_config()).unwrap();
    rag.index_directory(tmp.path()).await.unwrap();
    let results = rag.retrieve_scored("orders customers", 3).await.unwrap();
    assert!(!results.is_empty());
    for pair in results.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
}
