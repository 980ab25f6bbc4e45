use std::fs;
use std::path::PathBuf;

use llmrec::config::Config;
use llmrec::test_utils::{TestCase, run_table_tests};

fn fixture_path(relative: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(relative)
}

#[test]
fn config_sections_from_fixture() -> Result<(), String> {
    let cases = vec![
        TestCase {
            name: "default",
            input: "tests/fixtures/configs/default.toml",
            expected: (
                1.0f64,
                PathBuf::from("artifacts/policy.json"),
                PathBuf::from("data/models.yaml"),
                5000u64,
                None,
                3usize,
            ),
            should_panic: false,
        },
        TestCase {
            name: "custom",
            input: "tests/fixtures/configs/custom.toml",
            expected: (
                0.35f64,
                PathBuf::from("/var/lib/llmrec/policy.json"),
                PathBuf::from("data/models.yaml"),
                20000u64,
                Some(7u64),
                5usize,
            ),
            should_panic: false,
        },
    ];

    run_table_tests(cases, |relative_path| {
        let path = fixture_path(relative_path);
        let content = fs::read_to_string(&path).expect("read fixture");
        let config: Config = toml::from_str(&content).expect("parse config");
        (
            config.policy.alpha,
            config.policy.path,
            config.catalog.path,
            config.train.steps,
            config.train.seed,
            config.serve.top_k,
        )
    })
}

#[test]
fn explicit_config_skips_project_layer() {
    let root = tempfile::tempdir().unwrap();
    fs::write(root.path().join("config.toml"), "[serve]\ntop_k = 9\n").unwrap();
    let explicit = fixture_path("tests/fixtures/configs/custom.toml");

    let config = Config::load(Some(&explicit), root.path()).unwrap();
    assert_eq!(config.serve.top_k, 5);
    assert_eq!(config.policy.alpha, 0.35);
}

#[test]
fn relative_paths_resolve_against_root() {
    let root = PathBuf::from("/srv/llmrec");
    let config = Config::default();
    assert_eq!(
        Config::resolve(&root, &config.policy.path),
        PathBuf::from("/srv/llmrec/artifacts/policy.json")
    );
}
