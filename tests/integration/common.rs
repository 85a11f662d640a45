//! Shared helpers: an isolated project tree with fake bundler tools.

use std::{
    os::unix::fs::PermissionsExt,
    path::{Path, PathBuf},
    sync::Arc,
};

use kodegen_bundler_onefile::{
    bundler::{BuildConfig, BuildConfigBuilder},
    logger::{Logger, MemoryLog},
};
use tempfile::TempDir;

/// Fake bundler: answers `--version`, otherwise writes `<dist>/<name>`
/// unless the script asks it to fail (`FAIL`) or to skip output (`NOOUT`).
const FAKE_BUNDLER: &str = r#"#!/bin/sh
if [ "$1" = "--version" ]; then
  echo "6.3.0"
  exit 0
fi
dist=""
name=""
script=""
for arg in "$@"; do
  case "$arg" in
    --dist-path=*) dist="${arg#--dist-path=}" ;;
    --name=*) name="${arg#--name=}" ;;
    *) script="$arg" ;;
  esac
done
if grep -q FAIL "$script"; then
  echo "boom while bundling $name" >&2
  exit 1
fi
if grep -q NOOUT "$script"; then
  exit 0
fi
mkdir -p "$dist"
echo "bundled $name" > "$dist/$name"
"#;

const FAKE_INSTALLER_OK: &str = "#!/bin/sh\nexit 0\n";
const FAKE_INSTALLER_BROKEN: &str = "#!/bin/sh\necho 'no matching distribution' >&2\nexit 1\n";

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Isolated project tree.
pub struct TestProject {
    pub temp: TempDir,
    pub sink: Arc<MemoryLog>,
}

impl TestProject {
    /// Project with a `src/` root, a requirements file and working tools.
    pub fn new() -> Self {
        init_logging();
        let project = Self {
            temp: TempDir::new().unwrap(),
            sink: Arc::new(MemoryLog::new()),
        };
        std::fs::create_dir_all(project.root().join("src")).unwrap();
        project.write_file("requirements.txt", "scikit-learn\n");
        project.write_tool("fake-bundler", FAKE_BUNDLER);
        project.write_tool("fake-pip", FAKE_INSTALLER_OK);
        project
    }

    pub fn root(&self) -> &Path {
        self.temp.path()
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.root().join(relative)
    }

    pub fn write_file(&self, relative: &str, content: &str) {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, content).unwrap();
    }

    fn write_tool(&self, name: &str, body: &str) {
        let path = self.path(name);
        std::fs::write(&path, body).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    }

    /// Makes the dependency installer fail.
    pub fn break_installer(&self) {
        self.write_tool("fake-pip", FAKE_INSTALLER_BROKEN);
    }

    pub fn logger(&self) -> Logger {
        Logger::memory(self.sink.clone())
    }

    pub fn builder(&self, scripts: &[&str]) -> BuildConfigBuilder {
        BuildConfigBuilder::new()
            .name("hello-scikit-learn")
            .version("0.1.0")
            .root_dir(self.root())
            .scripts(scripts.iter().copied())
            .bundler_program("./fake-bundler")
            .installer_command(["./fake-pip"])
    }

    pub fn config(&self, scripts: &[&str]) -> Arc<BuildConfig> {
        Arc::new(self.builder(scripts).build().unwrap())
    }

    /// Warnings containing `needle`.
    pub fn warnings_containing(&self, needle: &str) -> Vec<String> {
        self.sink
            .warnings()
            .into_iter()
            .filter(|w| w.contains(needle))
            .collect()
    }
}
