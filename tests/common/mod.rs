use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Isolated working directory plus a binary invocation with a scrubbed
/// environment, so host OPENAI/OLLAMA settings never leak into a test.
pub struct TestEnv {
    _tmp: TempDir,
    pub dir: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let dir = tmp.path().to_path_buf();
        Self { _tmp: tmp, dir }
    }

    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("geoflag").expect("binary builds");
        cmd.current_dir(&self.dir);
        for var in [
            "ANALYZER_BACKEND",
            "OPENAI_API_KEY",
            "OPENAI_KEY",
            "OPENAI_BASE_URL",
            "OPENAI_MODEL",
            "OLLAMA_BASE_URL",
            "OLLAMA_MODEL",
            "GLOSSARY_PATH",
        ] {
            cmd.env_remove(var);
        }
        cmd
    }

    pub fn write_file(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.dir.join(name);
        fs::write(&path, contents).expect("write fixture");
        path
    }

    pub fn output_path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }
}

/// Read a CSV back as raw rows, header included.
pub fn read_csv_rows(path: &Path) -> Vec<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(path)
        .expect("open output csv");
    reader
        .records()
        .map(|r| r.expect("csv record").iter().map(str::to_string).collect())
        .collect()
}

pub const INPUT_HEADER: &str = "feature_name,feature_description,owner";

pub fn input_row(name: &str, description: &str, owner: &str) -> String {
    format!("{name},\"{description}\",{owner}")
}
