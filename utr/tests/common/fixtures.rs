use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// `utr` with no `UTR_*` or `RUST_LOG` settings inherited from the caller.
pub fn utr_command() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_utr"));
    for (key, _) in std::env::vars_os() {
        if key.to_string_lossy().starts_with("UTR_") {
            cmd.env_remove(&key);
        }
    }
    cmd.env_remove("RUST_LOG");
    cmd
}

pub const TEST_SOURCE: &str = r#"import unittest


class Helper(object):
    pass


class FooTest(unittest.TestCase):
    def test_alpha(self):
        self.assertTrue(True)

    def test_beta(self):
        self.assertTrue(True)
"#;

/// A Python project with `src/pkg/foo.py` and `src/pkg/tests/test_foo.py`.
///
/// Test commands are `echo` so running them is harmless and observable.
pub struct TestProject {
    pub dir: TempDir,
    pub root: PathBuf,
    pub state_dir: PathBuf,
    pub source_file: PathBuf,
    pub test_file: PathBuf,
    pub config_file: PathBuf,
}

impl TestProject {
    pub fn new() -> Self {
        Self::with_config(
            r#"[python_unit_test_runner]
project_roots = ["src"]
use_project_root = true
test_command = "echo ran "
show_color = false

[python_test_runner]
test_command = "echo generic "
show_color = false
"#,
        )
    }

    pub fn with_config(config: &str) -> Self {
        crate::test_log!("FIXTURE: Creating test Python project");

        let dir = TempDir::new().expect("Failed to create temp dir");
        let root = dir.path().join("project");
        let state_dir = dir.path().join("state");
        let pkg = root.join("src").join("pkg");
        let tests = pkg.join("tests");
        fs::create_dir_all(&tests).expect("Failed to create package dirs");

        let source_file = pkg.join("foo.py");
        let test_file = tests.join("test_foo.py");
        let config_file = root.join(".utr.toml");

        fs::write(pkg.join("__init__.py"), "").expect("Failed to write __init__.py");
        fs::write(tests.join("__init__.py"), "").expect("Failed to write __init__.py");
        fs::write(&source_file, "def foo():\n    return 1\n").expect("Failed to write foo.py");
        fs::write(&test_file, TEST_SOURCE).expect("Failed to write test_foo.py");
        fs::write(&config_file, config).expect("Failed to write .utr.toml");

        Self {
            dir,
            root,
            state_dir,
            source_file,
            test_file,
            config_file,
        }
    }

    /// `utr` pointed at this project's folder and state directory.
    pub fn command(&self) -> Command {
        let mut cmd = utr_command();
        cmd.current_dir(&self.root)
            .arg("--folder")
            .arg(&self.root)
            .arg("--state-dir")
            .arg(&self.state_dir);
        cmd
    }

    pub fn run(&self, args: &[&str]) -> Output {
        self.command()
            .args(args)
            .output()
            .expect("Failed to run utr")
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    pub fn store_file(&self, name: &str) -> PathBuf {
        self.state_dir.join(format!("{name}.json"))
    }

    pub fn write(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.root.join(relative);
        if let Some(parent) = Path::new(&path).parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dir");
        }
        fs::write(&path, content).expect("Failed to write file");
        path
    }
}
