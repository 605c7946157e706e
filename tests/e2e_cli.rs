#[cfg(unix)]
mod unix_e2e {
    use serde::Deserialize;
    use std::collections::BTreeMap;
    use std::fs;
    use std::path::{Path, PathBuf};
    use std::process::{Command, Output};
    use std::time::{SystemTime, UNIX_EPOCH};

    const ORCHESTRATION_FAILURE: i32 = 125;

    struct TempDirGuard {
        path: PathBuf,
    }

    impl TempDirGuard {
        fn new(test_name: &str) -> Self {
            let nanos = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .expect("clock should be after epoch")
                .as_nanos();
            let path = std::env::temp_dir().join(format!(
                "gows-e2e-{test_name}-{}-{nanos}",
                std::process::id()
            ));

            fs::create_dir_all(&path).expect("failed to create temp root");
            let path = path.canonicalize().expect("failed to canonicalize temp root");
            Self { path }
        }
    }

    impl Drop for TempDirGuard {
        fn drop(&mut self) {
            let _ = fs::remove_dir_all(&self.path);
        }
    }

    struct TestEnv {
        _guard: TempDirGuard,
        home_dir: PathBuf,
        project_dir: PathBuf,
        gopath: PathBuf,
    }

    impl TestEnv {
        fn new(test_name: &str) -> Self {
            let guard = TempDirGuard::new(test_name);
            let home_dir = guard.path.join("home");
            let project_dir = guard.path.join("work").join("myapp");
            let gopath = guard.path.join("go");

            fs::create_dir_all(&home_dir).expect("failed to create home");
            fs::create_dir_all(&project_dir).expect("failed to create project");
            fs::create_dir_all(gopath.join("bin")).expect("failed to create GOPATH/bin");
            fs::write(project_dir.join("main.go"), "package main\n")
                .expect("failed to write main.go");

            Self {
                _guard: guard,
                home_dir,
                project_dir,
                gopath,
            }
        }

        fn run(&self, args: &[&str]) -> Output {
            self.build_command(args)
                .output()
                .expect("failed to execute gows")
        }

        fn run_without_gopath(&self, args: &[&str]) -> Output {
            self.build_command(args)
                .env_remove("GOPATH")
                .output()
                .expect("failed to execute gows")
        }

        fn build_command(&self, args: &[&str]) -> Command {
            let mut cmd = Command::new(env!("CARGO_BIN_EXE_gows"));
            cmd.args(args)
                .current_dir(&self.project_dir)
                .env("HOME", &self.home_dir)
                .env("GOPATH", &self.gopath)
                .env_remove("GOWS_HOME")
                .env_remove("GOWS_LOG");
            cmd
        }

        fn gows_home(&self) -> PathBuf {
            self.home_dir.join(".config").join("gows")
        }

        fn write_user_config(&self, yaml: &str) {
            fs::create_dir_all(self.gows_home()).expect("failed to create gows home");
            fs::write(self.gows_home().join("config.yml"), yaml)
                .expect("failed to write config.yml");
        }

        fn workspace_root(&self) -> PathBuf {
            let raw = fs::read_to_string(self.gows_home().join("workspaces.yml"))
                .expect("failed to read workspaces.yml");
            let registry: RegistryMeta =
                serde_yaml::from_str(&raw).expect("invalid workspaces.yml");
            registry
                .workspaces
                .get(&self.project_dir)
                .map(|record| record.workspace_root_path.clone())
                .expect("project should be registered")
        }

        fn package_dir(&self) -> PathBuf {
            self.workspace_root()
                .join("src")
                .join("example.com")
                .join("myapp")
        }
    }

    #[derive(Debug, Deserialize)]
    struct RegistryMeta {
        workspaces: BTreeMap<PathBuf, RecordMeta>,
    }

    #[derive(Debug, Deserialize)]
    struct RecordMeta {
        workspace_root_path: PathBuf,
    }

    fn stdout(output: &Output) -> String {
        String::from_utf8_lossy(&output.stdout).to_string()
    }

    fn stderr(output: &Output) -> String {
        String::from_utf8_lossy(&output.stderr).to_string()
    }

    fn assert_success(output: &Output) {
        assert!(
            output.status.success(),
            "expected success, exit={:?}\nstdout:\n{}\nstderr:\n{}",
            output.status.code(),
            stdout(output),
            stderr(output)
        );
    }

    fn assert_exit_code(output: &Output, expected: i32) {
        assert_eq!(
            output.status.code(),
            Some(expected),
            "unexpected exit code\nstdout:\n{}\nstderr:\n{}",
            stdout(output),
            stderr(output)
        );
    }

    fn assert_stderr_contains(output: &Output, expected: &str) {
        let err = stderr(output);
        assert!(
            err.contains(expected),
            "stderr should contain `{expected}`\nstdout:\n{}\nstderr:\n{}",
            stdout(output),
            err
        );
    }

    fn is_symlink(path: &Path) -> bool {
        fs::symlink_metadata(path).is_ok_and(|meta| meta.file_type().is_symlink())
    }

    #[test]
    fn init_then_run_links_project_and_points_gopath_at_workspace() {
        let env = TestEnv::new("init-run");

        let init = env.run(&["init", "example.com/myapp"]);
        assert_success(&init);
        assert!(stdout(&init).contains("initialized `example.com/myapp`"));
        let config = fs::read_to_string(env.project_dir.join("gows.yml")).expect("gows.yml");
        assert!(config.contains("example.com/myapp"));

        let run = env.run(&["sh", "-c", r#"printf '%s' "$GOPATH" > gopath.txt"#]);
        assert_success(&run);

        let root = env.workspace_root();
        let seen = fs::read_to_string(env.project_dir.join("gopath.txt")).expect("gopath.txt");
        assert_eq!(PathBuf::from(seen), root);
        assert_eq!(
            fs::read_link(env.package_dir()).expect("package link"),
            env.project_dir
        );
        assert_eq!(
            fs::read_link(root.join("bin")).expect("bin link"),
            env.gopath.join("bin")
        );
    }

    #[test]
    fn wrapped_command_arguments_are_passed_verbatim() {
        let env = TestEnv::new("args");
        assert_success(&env.run(&["init", "example.com/myapp"]));

        let run = env.run(&[
            "sh",
            "-c",
            r#"printf '%s|' "$@" > args.txt"#,
            "sh",
            "-v",
            "--x",
            "a b",
        ]);
        assert_success(&run);

        let args = fs::read_to_string(env.project_dir.join("args.txt")).expect("args.txt");
        assert_eq!(args, "-v|--x|a b|");
    }

    #[test]
    fn package_name_with_trailing_slash_still_runs() {
        let env = TestEnv::new("trailing-slash");
        assert_success(&env.run(&["init", "example.com/myapp/"]));

        assert_success(&env.run(&["true"]));
        assert_success(&env.run(&["true"]));
        assert_eq!(
            fs::read_link(env.package_dir()).expect("package link"),
            env.project_dir
        );
    }

    #[test]
    fn absolute_package_name_is_rejected() {
        let env = TestEnv::new("absolute-package");

        let init = env.run(&["init", "/tmp/victim"]);
        assert_exit_code(&init, ORCHESTRATION_FAILURE);
        assert_stderr_contains(&init, "invalid package name");
        assert!(!env.project_dir.join("gows.yml").exists());
    }

    #[test]
    fn wrapped_exit_code_is_passed_through() {
        let env = TestEnv::new("exit-code");
        assert_success(&env.run(&["init", "example.com/myapp"]));

        let run = env.run(&["sh", "-c", "exit 3"]);
        assert_exit_code(&run, 3);
    }

    #[test]
    fn missing_executable_exits_127() {
        let env = TestEnv::new("missing-exe");
        assert_success(&env.run(&["init", "example.com/myapp"]));

        let run = env.run(&["gows-definitely-not-a-real-binary"]);
        assert_exit_code(&run, 127);
        assert_stderr_contains(&run, "gows-definitely-not-a-real-binary");
    }

    #[test]
    fn run_without_project_config_fails_with_sentinel_code() {
        let env = TestEnv::new("no-config");

        let run = env.run(&["true"]);
        assert_exit_code(&run, ORCHESTRATION_FAILURE);
        assert_stderr_contains(&run, "gows init");
    }

    #[test]
    fn run_without_gopath_fails_with_sentinel_code() {
        let env = TestEnv::new("no-gopath");
        assert_success(&env.run(&["init", "example.com/myapp"]));

        let run = env.run_without_gopath(&["true"]);
        assert_exit_code(&run, ORCHESTRATION_FAILURE);
        assert_stderr_contains(&run, "GOPATH");
    }

    #[test]
    fn copy_mode_flag_syncs_results_back_into_project() {
        let env = TestEnv::new("copy-flag");
        assert_success(&env.run(&["init", "example.com/myapp"]));

        let run = env.run(&[
            "--sync-mode",
            "copy",
            "sh",
            "-c",
            "echo built > artifact.txt; exit 2",
        ]);
        assert_exit_code(&run, 2);

        assert_eq!(
            fs::read_to_string(env.project_dir.join("artifact.txt")).expect("artifact"),
            "built\n"
        );
        assert!(!is_symlink(&env.package_dir()));
        assert!(env.package_dir().join("main.go").is_file());
    }

    #[test]
    fn copy_mode_from_user_config() {
        let env = TestEnv::new("copy-config");
        env.write_user_config("sync_mode: copy\n");
        assert_success(&env.run(&["init", "example.com/myapp"]));

        let run = env.run(&["sh", "-c", "rm main.go"]);
        assert_success(&run);

        assert!(!env.project_dir.join("main.go").exists());
        assert!(!is_symlink(&env.package_dir()));
    }

    #[test]
    fn workspaces_lists_registry_and_marks_current_project() {
        let env = TestEnv::new("list");
        assert_success(&env.run(&["init", "example.com/myapp"]));

        let list = env.run(&["workspaces"]);
        assert_success(&list);

        let expected = format!(
            "* {} -> {}",
            env.project_dir.display(),
            env.workspace_root().display()
        );
        assert!(
            stdout(&list).contains(&expected),
            "stdout should contain `{expected}`\nstdout:\n{}",
            stdout(&list)
        );
    }

    #[test]
    fn clear_replaces_the_workspace_with_a_fresh_one() {
        let env = TestEnv::new("clear");
        assert_success(&env.run(&["init", "example.com/myapp"]));
        assert_success(&env.run(&["true"]));
        let before = env.workspace_root();

        let clear = env.run(&["clear"]);
        assert_success(&clear);
        assert!(stdout(&clear).contains("workspace is clean"));

        let after = env.workspace_root();
        assert_ne!(before, after);
        assert!(!before.exists());
        assert!(after.join("src").is_dir());
    }

    #[test]
    fn reinit_without_reset_keeps_the_workspace() {
        let env = TestEnv::new("reinit");
        assert_success(&env.run(&["init", "example.com/myapp"]));
        let before = env.workspace_root();

        let again = env.run(&["init", "example.com/myapp"]);
        assert_success(&again);
        assert_stderr_contains(&again, "will be reused");

        assert_eq!(env.workspace_root(), before);
    }
}
