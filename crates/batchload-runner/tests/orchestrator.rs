use std::collections::HashMap;
use std::ffi::OsStr;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use batchload_config::Settings;
use batchload_runner::{
    CompatShim, FileOutcome, Invocation, ProcessExit, ProcessRunner, RunError, RunMode, RunPlan,
    run_batch,
};
use tempfile::TempDir;
use tracing_subscriber::fmt::MakeWriter;

const PART_TEMPLATE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<AML>
	<Item type="Part" action="add" where="[Part].item_number='@1'">
		<item_number>@1</item_number>
		<name>@2</name>
	</Item>
</AML>
"#;

#[derive(Debug)]
struct Call {
    program: PathBuf,
    args: Vec<String>,
    working_dir: PathBuf,
}

impl Call {
    fn flag(&self, flag: &str) -> &str {
        let position = self.args.iter().position(|arg| arg == flag).unwrap();
        &self.args[position + 1]
    }

    fn data_stem(&self) -> String {
        Path::new(self.flag("-d"))
            .file_stem()
            .unwrap()
            .to_string_lossy()
            .into_owned()
    }
}

/// Records every invocation and answers with a scripted exit code per data
/// file stem (0 when unscripted).
#[derive(Default)]
struct ScriptedRunner {
    exit_codes: HashMap<String, i32>,
    launch_failures: Vec<String>,
    calls: Vec<Call>,
}

impl ScriptedRunner {
    fn exit_with(mut self, stem: &str, code: i32) -> Self {
        self.exit_codes.insert(stem.to_string(), code);
        self
    }

    fn fail_launch(mut self, stem: &str) -> Self {
        self.launch_failures.push(stem.to_string());
        self
    }

    fn stems(&self) -> Vec<String> {
        self.calls.iter().map(Call::data_stem).collect()
    }
}

impl ProcessRunner for ScriptedRunner {
    fn run(&mut self, invocation: &Invocation, working_dir: &Path) -> io::Result<ProcessExit> {
        let call = Call {
            program: invocation.program().to_path_buf(),
            args: invocation
                .args()
                .iter()
                .map(|arg| arg.to_string_lossy().into_owned())
                .collect(),
            working_dir: working_dir.to_path_buf(),
        };
        let stem = call.data_stem();
        self.calls.push(call);
        if self.launch_failures.contains(&stem) {
            return Err(io::Error::new(io::ErrorKind::NotFound, "no such program"));
        }
        Ok(ProcessExit::from_code(
            self.exit_codes.get(&stem).copied().unwrap_or(0),
        ))
    }
}

struct Fixture {
    root: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let root = TempDir::new().unwrap();
        for dir in ["runtime", "data", "templates"] {
            fs::create_dir(root.path().join(dir)).unwrap();
        }
        fs::write(root.path().join("runtime/BatchLoaderCmd.exe"), "MZ").unwrap();
        fs::write(root.path().join("CLIBatchLoaderConfig.xml"), "<BatchLoaderConfig/>")
            .unwrap();
        Self { root }
    }

    fn path(&self, relative: &str) -> PathBuf {
        self.root.path().join(relative)
    }

    fn data(&self, name: &str, content: &str) -> &Self {
        fs::write(self.path("data").join(name), content).unwrap();
        self
    }

    fn template(&self, name: &str) -> &Self {
        fs::write(self.path("templates").join(name), PART_TEMPLATE).unwrap();
        self
    }

    fn plan(&self, mode: RunMode) -> RunPlan {
        RunPlan {
            mode,
            executable: self.path("runtime/BatchLoaderCmd.exe"),
            runtime_dir: self.path("runtime"),
            config: self.path("CLIBatchLoaderConfig.xml"),
            settings: Settings::default(),
            data_dir: self.path("data"),
            templates_dir: Some(self.path("templates")),
            logs_dir: self.path("logs"),
            retry_dir: None,
            delete_templates_dir: self.path("templates_delete"),
            shim: CompatShim::Native,
        }
    }
}

/// Shared buffer the fmt subscriber writes into.
#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

fn capture_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(logs.clone())
        .with_ansi(false)
        .without_time()
        .finish();
    let value = tracing::subscriber::with_default(subscriber, f);
    (value, logs.contents())
}

fn standard_fixture() -> Fixture {
    let fixture = Fixture::new();
    fixture
        .data("001-User.txt", "u1\tAlice\n")
        .data("010-Part.txt", "P-1\tBolt\n")
        .data("020-Part BOM.txt", "P-1\tP-2\n")
        .template("001-User.xml")
        .template("010-Part.xml")
        .template("020-Part BOM.xml");
    fixture
}

#[test]
fn test_load_continues_after_non_zero_exit() {
    let fixture = standard_fixture();
    let mut runner = ScriptedRunner::default().exit_with("010-Part", 5);

    let report = run_batch(&fixture.plan(RunMode::Load), &mut runner).unwrap();

    assert_eq!(runner.stems(), vec!["001-User", "010-Part", "020-Part BOM"]);
    assert_eq!(report.files.len(), 3);
    assert_eq!(report.files[1].outcome, FileOutcome::Failed { code: Some(5) });
    assert_eq!(report.files[1].outcome.to_string(), "non-zero exit (5)");
    assert_eq!(report.files[2].outcome, FileOutcome::Succeeded);
    assert_eq!((report.succeeded(), report.failed(), report.skipped()), (2, 1, 0));
}

#[test]
fn test_non_zero_exit_logs_code_and_log_path() {
    let fixture = standard_fixture();
    let mut runner = ScriptedRunner::default().exit_with("010-Part", 5);
    let plan = fixture.plan(RunMode::Load);

    let (report, logs) = capture_logs(|| run_batch(&plan, &mut runner).unwrap());

    assert_eq!(report.failed(), 1);
    let log_path = fixture.path("logs/010-Part.log").display().to_string();
    let warning = logs
        .lines()
        .find(|line| line.contains("WARN") && line.contains("non-zero exit (5)"))
        .unwrap_or_else(|| panic!("no exit warning in:\n{logs}"));
    assert!(warning.contains(&log_path), "{warning}");
    assert_eq!(logs.matches("non-zero exit").count(), 1, "{logs}");
}

#[test]
fn test_load_invocation_shape() {
    let fixture = standard_fixture();
    let mut runner = ScriptedRunner::default();

    run_batch(&fixture.plan(RunMode::Load), &mut runner).unwrap();

    let call = &runner.calls[0];
    assert_eq!(call.program, fixture.path("runtime/BatchLoaderCmd.exe"));
    assert_eq!(call.working_dir, fixture.path("runtime"));
    let flags: Vec<&str> = call
        .args
        .iter()
        .step_by(2)
        .map(String::as_str)
        .collect();
    assert_eq!(flags, vec!["-d", "-c", "-t", "-l"]);
    assert_eq!(
        Path::new(call.flag("-t")),
        fixture.path("templates/001-User.xml")
    );
    assert_eq!(Path::new(call.flag("-l")), fixture.path("logs/001-User.log"));
    assert!(fixture.path("logs").is_dir());
}

#[test]
fn test_wine_shim_prefixes_program() {
    let fixture = standard_fixture();
    let mut plan = fixture.plan(RunMode::Load);
    plan.shim = CompatShim::Wine;
    let mut runner = ScriptedRunner::default();

    run_batch(&plan, &mut runner).unwrap();

    let call = &runner.calls[0];
    assert_eq!(call.program.as_os_str(), OsStr::new("wine"));
    assert_eq!(
        Path::new(&call.args[0]),
        fixture.path("runtime/BatchLoaderCmd.exe")
    );
    assert_eq!(call.args[1], "-d");
}

#[test]
fn test_missing_template_is_skipped() {
    let fixture = standard_fixture();
    fixture.data("030-Document.txt", "D-1\n");
    let mut runner = ScriptedRunner::default();

    let report = run_batch(&fixture.plan(RunMode::Load), &mut runner).unwrap();

    assert_eq!(runner.calls.len(), 3);
    let skipped = report
        .files
        .iter()
        .find(|file| file.name == "030-Document")
        .unwrap();
    let FileOutcome::Skipped { reason } = &skipped.outcome else {
        panic!("expected a skip, got {:?}", skipped.outcome);
    };
    assert!(reason.starts_with("missing template"));
    assert!(reason.contains("030-Document_Template.xml"));
    assert_eq!(skipped.log, None);
    assert_eq!(report.skipped(), 1);
}

#[test]
fn test_template_next_to_data_file() {
    let fixture = Fixture::new();
    fixture.data("001-User.txt", "u1\n");
    fs::write(fixture.path("data/001-User_Template.xml"), PART_TEMPLATE).unwrap();
    let mut plan = fixture.plan(RunMode::Load);
    plan.templates_dir = None;
    let mut runner = ScriptedRunner::default();

    run_batch(&plan, &mut runner).unwrap();

    assert_eq!(
        Path::new(runner.calls[0].flag("-t")),
        fixture.path("data/001-User_Template.xml")
    );
}

#[test]
fn test_delete_runs_in_reverse_with_generated_templates() {
    let fixture = standard_fixture();
    let mut runner = ScriptedRunner::default();

    let report = run_batch(&fixture.plan(RunMode::Delete), &mut runner).unwrap();

    assert_eq!(runner.stems(), vec!["020-Part BOM", "010-Part", "001-User"]);
    assert_eq!(report.mode, RunMode::Delete);

    let call = &runner.calls[0];
    let generated = fixture.path("templates_delete/020-Part BOM.xml");
    assert_eq!(Path::new(call.flag("-t")), generated);
    assert_eq!(
        Path::new(call.flag("-l")),
        fixture.path("logs/delete/020-Part BOM.log")
    );

    let xml = fs::read_to_string(&generated).unwrap();
    assert!(xml.contains(r#"action="delete""#));
    assert!(xml.contains(r#"id="@1""#));
    assert!(!xml.contains("where="));
    assert!(!xml.contains("<item_number>"));
}

#[test]
fn test_delete_template_failure_is_skipped() {
    let fixture = Fixture::new();
    fixture
        .data("001-User.txt", "login\tname\nu1\tAlice\n")
        .data("010-Part.txt", "id\titem_number\nabc\tP-1\n")
        .template("001-User.xml")
        .template("010-Part.xml");
    let mut plan = fixture.plan(RunMode::Delete);
    plan.settings.first_row = Some(2);
    let mut runner = ScriptedRunner::default();

    let report = run_batch(&plan, &mut runner).unwrap();

    assert_eq!(runner.stems(), vec!["010-Part"]);
    let user = report
        .files
        .iter()
        .find(|file| file.name == "001-User")
        .unwrap();
    let FileOutcome::Skipped { reason } = &user.outcome else {
        panic!("expected a skip, got {:?}", user.outcome);
    };
    assert!(reason.contains("id"), "{reason}");
    assert!(!fixture.path("templates_delete/001-User.xml").exists());

    let xml = fs::read_to_string(fixture.path("templates_delete/010-Part.xml")).unwrap();
    assert!(xml.contains(r#"id="@1""#));
}

#[test]
fn test_retry_uses_failed_markers() {
    let fixture = standard_fixture();
    let retry_dir = fixture.path("failed");
    fs::create_dir(&retry_dir).unwrap();
    fs::write(retry_dir.join("010-Part.failed"), "P-1\tBolt\n").unwrap();
    fs::write(retry_dir.join("030-Document.failed"), "D-1\n").unwrap();
    fs::write(fixture.path("data/030-Document_Template.xml"), PART_TEMPLATE).unwrap();

    let mut plan = fixture.plan(RunMode::Retry);
    plan.retry_dir = Some(retry_dir.clone());
    let mut runner = ScriptedRunner::default();

    let report = run_batch(&plan, &mut runner).unwrap();

    assert_eq!(runner.stems(), vec!["010-Part", "030-Document"]);
    assert_eq!(
        Path::new(runner.calls[0].flag("-d")),
        retry_dir.join("010-Part.failed")
    );
    assert_eq!(
        Path::new(runner.calls[0].flag("-l")),
        fixture.path("logs/retry/010-Part.retry.log")
    );
    assert_eq!(
        Path::new(runner.calls[1].flag("-t")),
        fixture.path("data/030-Document_Template.xml")
    );
    assert!(!report.has_failures());
}

#[test]
fn test_retry_missing_template_lists_data_dir_fallback() {
    let fixture = standard_fixture();
    let retry_dir = fixture.path("failed");
    fs::create_dir(&retry_dir).unwrap();
    fs::write(retry_dir.join("030-Document.failed"), "D-1\n").unwrap();

    let mut plan = fixture.plan(RunMode::Retry);
    plan.retry_dir = Some(retry_dir);
    let mut runner = ScriptedRunner::default();

    let report = run_batch(&plan, &mut runner).unwrap();

    assert!(runner.calls.is_empty());
    let FileOutcome::Skipped { reason } = &report.files[0].outcome else {
        panic!("expected a skip, got {:?}", report.files[0].outcome);
    };
    let fallback = fixture.path("data/030-Document_Template.xml");
    assert!(reason.contains(&fallback.display().to_string()), "{reason}");
    assert!(reason.contains("templates"), "{reason}");
}

#[test]
fn test_launch_failure_is_reported() {
    let fixture = standard_fixture();
    let mut runner = ScriptedRunner::default().fail_launch("001-User");

    let report = run_batch(&fixture.plan(RunMode::Load), &mut runner).unwrap();

    assert_eq!(runner.calls.len(), 3);
    assert!(matches!(
        report.files[0].outcome,
        FileOutcome::LaunchFailed { .. }
    ));
    assert_eq!(report.failed(), 1);
}

#[test]
fn test_no_candidates() {
    let fixture = Fixture::new();
    let mut runner = ScriptedRunner::default();

    let err = run_batch(&fixture.plan(RunMode::Retry), &mut runner).unwrap_err();

    assert!(matches!(err, RunError::NoCandidates { extension: "failed", .. }));
    assert!(runner.calls.is_empty());
    assert!(!fixture.path("logs").exists());
}

#[test]
fn test_missing_templates_dir() {
    let fixture = standard_fixture();
    let mut plan = fixture.plan(RunMode::Load);
    plan.templates_dir = Some(fixture.path("absent"));

    let err = run_batch(&plan, &mut ScriptedRunner::default()).unwrap_err();

    assert!(matches!(
        err,
        RunError::DirectoryNotFound {
            what: "templates dir",
            ..
        }
    ));
}
