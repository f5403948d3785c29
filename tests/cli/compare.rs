use std::process::Command;

use anyhow::Result;
use pretty_assertions::assert_eq;

use crate::{CliTest, stderr, stdout};

fn compare_command(test: &CliTest, phase: &str) -> Command {
    let mut cmd = test.command();
    cmd.args(["--tag", "CHG-42", "--compare-only", "--phase", phase])
        .arg("--basedir")
        .arg(test.root().join("snapshots"));
    cmd
}

#[test]
fn test_identical_phases() -> Result<()> {
    let test = CliTest::new()?;
    for phase in ["pre", "post"] {
        test.write_artifact(&format!("fstab.{phase}"), "/dev/sda1 / xfs defaults 0 0\n")?;
        test.write_artifact(&format!("lsmod.{phase}"), "ext4\nxfs\n")?;
    }

    let output = compare_command(&test, "post").output()?;

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(
        stdout(&output),
        "\u{2713} No differences against 'pre' (2 files compared)\n"
    );

    Ok(())
}

#[test]
fn test_line_change_is_reported() -> Result<()> {
    let test = CliTest::new()?;
    test.write_artifact("hosts.pre", "127.0.0.1 localhost\n10.0.0.5 db\n")?;
    test.write_artifact("hosts.post", "127.0.0.1   localhost\n\n10.0.0.6 db\n")?;

    let output = compare_command(&test, "post").output()?;

    assert!(output.status.success());
    assert_eq!(
        stdout(&output),
        "Differences found in hosts\n\
         --- hosts.pre\n\
         +++ hosts.post\n\
         @@ -1,2 +1,3 @@\n \
         127.0.0.1 localhost\n\
         -10.0.0.5 db\n\
         +\n\
         +10.0.0.6 db\n\
         \n\
         \n\
         \u{2718} Differences found against 'pre': 1 changed, 0 added, 0 removed\n"
    );

    Ok(())
}

#[test]
fn test_added_and_removed_files() -> Result<()> {
    let test = CliTest::new()?;
    test.write_artifact("network-scripts/ifcfg-eth0.rollback", "DEVICE=eth0\n")?;
    test.write_artifact("network-scripts/ifcfg-eth0.pre", "DEVICE=eth0\n")?;
    test.write_artifact("network-scripts/ifcfg-bond0.rollback", "DEVICE=bond0\n")?;
    test.write_artifact("network-scripts/route-eth0.pre", "default via 10.0.0.1\n")?;

    let output = compare_command(&test, "rollback").output()?;

    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains("added: network-scripts/ifcfg-bond0 (present in 'rollback' only)"));
    assert!(out.contains("removed: network-scripts/route-eth0 (present in 'pre' only)"));
    assert!(out.contains("0 changed, 1 added, 1 removed"));

    Ok(())
}

#[test]
fn test_volatile_outputs_are_skipped() -> Result<()> {
    let test = CliTest::new()?;
    test.write_artifact("ps.pre", "root 1 init\n")?;
    test.write_artifact("ps.post", "root 1 init\nroot 2 kthreadd\n")?;
    test.write_artifact("dmesg.pre", "boot\n")?;
    test.write_artifact("dmesg.post", "boot\nlink up\n")?;

    let output = compare_command(&test, "post").output()?;

    assert!(output.status.success());
    assert!(stdout(&output).contains("No differences against 'pre' (0 files compared)"));

    let output = compare_command(&test, "post").arg("--verbose").output()?;
    assert!(stdout(&output).contains("not compared (volatile): dmesg, ps"));

    Ok(())
}

#[test]
fn test_custom_pre_suffix() -> Result<()> {
    let test = CliTest::new()?;
    test.write_artifact("uname.baseline", "Linux 5.14\n")?;
    test.write_artifact("uname.post", "Linux 5.15\n")?;

    let output = compare_command(&test, "post")
        .args(["--pre", "baseline"])
        .output()?;

    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains("--- uname.baseline\n+++ uname.post\n"));
    assert!(out.contains("Differences found against 'baseline'"));

    Ok(())
}

#[test]
fn test_compare_only_unknown_tag() -> Result<()> {
    let test = CliTest::new()?;

    let output = compare_command(&test, "post").output()?;

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("No artifacts for tag 'CHG-42'"));

    Ok(())
}

#[test]
fn test_pairs_that_cannot_be_diffed_fail_the_run() -> Result<()> {
    let test = CliTest::new()?;
    test.write_artifact("hosts.pre", "10.0.0.1 db\n")?;
    test.write_artifact("hosts.post", "10.0.0.2 db\n")?;

    let output = compare_command(&test, "post")
        .env("PATH", "/nonexistent")
        .output()?;

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(
        stdout(&output),
        "\n\u{2718} Comparison against 'pre' incomplete: 0 compared, 1 could not be compared\n"
    );
    assert!(stderr(&output).contains("error: could not compare hosts"));

    let output = compare_command(&test, "post")
        .env("PATH", "/nonexistent")
        .arg("--silent")
        .output()?;

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(stdout(&output), "");
    assert!(stderr(&output).contains("could not compare hosts"));

    Ok(())
}
