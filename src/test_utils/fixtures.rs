use std::path::PathBuf;

use tempfile::TempDir;

/// Six-model catalog covering open/closed, fast/slow and every strength the
/// heuristic rewarder looks at.
pub const SAMPLE_CATALOG_YAML: &str = r"models:
  - id: gpt-4o
    provider: openai
    open_source: false
    cost_tier: high
    latency_tier: medium
    strengths: [reasoning, coding, multilingual, safety]
  - id: gpt-4o-mini
    provider: openai
    open_source: false
    cost_tier: low
    latency_tier: low
    strengths: [general, speed]
  - id: claude-3-5-sonnet
    provider: anthropic
    open_source: false
    cost_tier: high
    latency_tier: medium
    strengths: [reasoning, safety, general]
  - id: llama-3-70b
    provider: meta
    open_source: true
    cost_tier: medium
    latency_tier: medium
    strengths: [general, fine_tuning, multilingual]
  - id: mistral-7b
    provider: mistral
    open_source: true
    cost_tier: very_low
    latency_tier: very_low
    strengths: [speed, fine_tuning]
  - id: qwen-2-5-coder
    provider: alibaba
    open_source: true
    cost_tier: low
    latency_tier: low
    strengths: [coding, speed, multilingual]
";

/// Test fixture providing an isolated llmrec root.
pub struct UnitTestFixture {
    pub temp_dir: TempDir,
    pub root: PathBuf,
}

impl UnitTestFixture {
    /// Create a temp root containing `data/models.yaml`.
    #[must_use]
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let root = temp_dir.path().to_path_buf();
        let fixture = Self { temp_dir, root };
        let _ = fixture.create_file("data/models.yaml", SAMPLE_CATALOG_YAML);
        fixture
    }

    /// Create a file under the root, making parent directories as needed.
    #[must_use]
    pub fn create_file(&self, relative_path: &str, content: &str) -> PathBuf {
        let full_path = self.root.join(relative_path);
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent dirs");
        }
        std::fs::write(&full_path, content).expect("Failed to write file");
        full_path
    }

    #[must_use]
    pub fn policy_path(&self) -> PathBuf {
        self.root.join("artifacts/policy.json")
    }
}

impl Default for UnitTestFixture {
    fn default() -> Self {
        Self::new()
    }
}
