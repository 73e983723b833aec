use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A throwaway system: one main repository, one overlay, an empty `ROOT`
/// and an isolated `HOME`.
pub struct TestEnv {
    _tmp: TempDir,
    pub home: PathBuf,
    pub root: PathBuf,
    pub config_root: PathBuf,
    pub tree: PathBuf,
    pub overlay: PathBuf,
    /// A repository that is not in the repository configuration.
    pub loose: PathBuf,
}

fn write(path: &Path, body: &str) {
    fs::create_dir_all(path.parent().expect("parent dir")).expect("create parent dir");
    fs::write(path, body).expect("write fixture file");
}

fn ebuild(dir: &Path, pf: &str, slot: &str, keywords: &str) {
    write(
        &dir.join(format!("{}.ebuild", pf)),
        &format!("EAPI=8\nSLOT=\"{}\"\nKEYWORDS=\"{}\"\n", slot, keywords),
    );
}

impl TestEnv {
    pub fn new() -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let home = tmp.path().join("home");
        let root = tmp.path().join("root");
        let config_root = tmp.path().join("config");
        for dir in [&home, &root, &config_root] {
            fs::create_dir_all(dir).expect("create isolated dir");
        }

        let tree = tmp.path().join("gentoo");
        write(&tree.join("profiles/repo_name"), "fixture\n");
        write(&tree.join("profiles/arch.list"), "amd64\nx86\namd64-linux\n");
        write(
            &tree.join("profiles/arches.desc"),
            "amd64 stable\nx86 stable\namd64-linux testing\n",
        );
        let foo = tree.join("app-misc/foo");
        ebuild(&foo, "foo-1.0", "0", "amd64 ~x86");
        ebuild(&foo, "foo-1.1", "0", "~amd64");
        ebuild(&foo, "foo-2.0", "2", "-* ~amd64");
        write(&foo.join("metadata.xml"), "<pkgmetadata/>\n");

        let overlay = tmp.path().join("extra");
        write(&overlay.join("profiles/repo_name"), "extra\n");
        ebuild(&overlay.join("app-misc/foo"), "foo-3.0", "0", "~amd64");

        let loose = tmp.path().join("loose");
        write(&loose.join("profiles/repo_name"), "loose-overlay\n");
        ebuild(&loose.join("dev-util/thing"), "thing-0.1", "0", "~x86");

        Self {
            _tmp: tmp,
            home,
            root,
            config_root,
            tree,
            overlay,
            loose,
        }
    }

    pub fn repos_conf(&self) -> String {
        format!(
            "[DEFAULT]\nmain-repo = fixture\n[fixture]\nlocation = {}\n[extra]\nlocation = {}\n",
            self.tree.display(),
            self.overlay.display()
        )
    }

    pub fn cmd(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("eshowkw");
        cmd.env("HOME", &self.home)
            .env("ROOT", &self.root)
            .env("PORTAGE_CONFIGROOT", &self.config_root)
            .env("PORTAGE_REPOSITORIES", self.repos_conf())
            .env_remove("NO_COLOR")
            .env_remove("RUST_LOG");
        cmd
    }

    pub fn write_config(&self, body: &str) {
        write(&self.home.join(".config/eshowkw/config.toml"), body);
    }

    pub fn write_package_mask(&self, body: &str) {
        write(&self.tree.join("profiles/package.mask"), body);
    }

    pub fn write_repos_conf_bytes(&self, body: &[u8]) {
        let path = self.config_root.join("etc/portage/repos.conf");
        fs::create_dir_all(path.parent().expect("parent dir")).expect("create parent dir");
        fs::write(path, body).expect("write repos.conf");
    }

    pub fn run_stdout(&self, args: &[&str]) -> String {
        let out = self
            .cmd()
            .args(args)
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        String::from_utf8(out).expect("utf8 output")
    }

    pub fn run_json(&self, args: &[&str]) -> Value {
        let out = self
            .cmd()
            .arg("--json")
            .args(args)
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        serde_json::from_slice(&out).expect("valid json output")
    }
}
