use anyhow::Result;
use pretty_assertions::assert_eq;

use crate::{CliTest, stderr, stdout};

fn state_config(test: &CliTest) -> Result<()> {
    let state = test.root().join("state/app.conf");
    test.write_config(&format!(
        r#"
[app.conf]
type = file
file = {state}

[app-listing]
type = command
command = cat {state}
sort = yes
"#,
        state = state.display()
    ))?;
    Ok(())
}

#[test]
fn test_collects_custom_entries() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file("state/app.conf", "workers = 4\nport = 8080\n")?;
    state_config(&test)?;

    let output = test.snap_command("pre").output()?;

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(test.read_artifact("app.conf.pre")?, "workers = 4\nport = 8080\n");
    assert_eq!(test.read_artifact("app-listing.pre")?, "port = 8080\nworkers = 4\n");
    assert!(stdout(&output).contains("Collected 2 artifacts for phase 'pre'"));

    Ok(())
}

#[test]
fn test_second_run_without_overwrite_fails() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file("state/app.conf", "workers = 4\n")?;
    state_config(&test)?;

    assert!(test.snap_command("pre").output()?.status.success());

    test.write_file("state/app.conf", "workers = 8\n")?;
    let output = test.snap_command("pre").output()?;

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("--overwrite"));
    assert_eq!(test.read_artifact("app.conf.pre")?, "workers = 4\n");

    let output = test.snap_command("pre").arg("--overwrite").output()?;
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(test.read_artifact("app.conf.pre")?, "workers = 8\n");

    Ok(())
}

#[test]
fn test_post_phase_diffs_against_pre() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file("state/app.conf", "workers = 4\nport = 8080\n")?;
    state_config(&test)?;

    assert!(test.snap_command("pre").output()?.status.success());

    test.write_file("state/app.conf", "workers = 4\nport = 9090\n")?;
    let output = test.snap_command("post").output()?;

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("Differences found in app.conf\n"));
    assert!(out.contains("-port = 8080\n+port = 9090\n"));
    assert!(out.contains("Differences found against 'pre': 2 changed, 0 added, 0 removed"));

    Ok(())
}

#[test]
fn test_unlabelled_phase_is_not_compared() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file("state/app.conf", "workers = 4\n")?;
    state_config(&test)?;

    assert!(test.snap_command("pre").output()?.status.success());
    test.write_file("state/app.conf", "workers = 5\n")?;

    let output = test.snap_command("midway").output()?;
    assert!(output.status.success());
    assert!(!stdout(&output).contains("Differences"));

    let output = test.snap_command("later").arg("--force-compare").output()?;
    assert!(output.status.success());
    assert!(stdout(&output).contains("Differences found in app.conf"));

    Ok(())
}

#[test]
fn test_silent_prints_nothing() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file("state/app.conf", "workers = 4\n")?;
    state_config(&test)?;

    let output = test.snap_command("pre").arg("--silent").output()?;

    assert!(output.status.success());
    assert_eq!(stdout(&output), "");
    assert_eq!(stderr(&output), "");

    Ok(())
}

#[test]
fn test_missing_required_file_aborts() -> Result<()> {
    let test = CliTest::new()?;
    test.write_config(&format!(
        "[gone]\ntype = file\nfile = {}\n",
        test.root().join("does/not/exist").display()
    ))?;

    let output = test.snap_command("pre").output()?;

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Required file"));

    Ok(())
}

#[test]
fn test_archive_refuses_overwrite() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file("state/app.conf", "workers = 4\n")?;
    state_config(&test)?;

    let output = test.snap_command("pre").arg("--archive").output()?;
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("Archive created:"));

    let archive = test
        .root()
        .join("snapshots/CHG-42/configsnap-CHG-42-pre.tar.gz");
    assert!(archive.exists());

    let compare_and_archive = || {
        test.command()
            .args(["--tag", "CHG-42", "--phase", "post", "--compare-only", "--archive"])
            .arg("--basedir")
            .arg(test.root().join("snapshots"))
            .output()
    };

    let output = compare_and_archive()?;
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(
        test.root()
            .join("snapshots/CHG-42/configsnap-CHG-42-post.tar.gz")
            .exists()
    );

    let output = compare_and_archive()?;
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("already exists"));

    Ok(())
}
