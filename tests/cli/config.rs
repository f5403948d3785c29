use std::{fs, os::unix::fs::PermissionsExt};

use anyhow::Result;

use crate::{CliTest, stderr};

#[test]
fn test_invalid_section_is_skipped() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file("state/motd", "welcome\n")?;
    test.write_config(&format!(
        r#"
[socket]
type = pipe
command = ls

[motd]
type = file
file = {}
"#,
        test.root().join("state/motd").display()
    ))?;

    let output = test.snap_command("pre").output()?;

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stderr(&output).contains("[socket] (line 2): unknown type 'pipe'"));
    assert_eq!(test.read_artifact("motd.pre")?, "welcome\n");
    assert!(!test.workdir().join("socket.pre").exists());

    Ok(())
}

#[test]
fn test_world_writable_config_is_rejected() -> Result<()> {
    let test = CliTest::new()?;
    let path = test.write_config("[uptime]\ntype = command\ncommand = echo up\n")?;
    fs::set_permissions(&path, fs::Permissions::from_mode(0o666))?;

    let output = test.snap_command("pre").output()?;

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Refusing to use config file"));
    assert!(!test.workdir().join("uptime.pre").exists());

    Ok(())
}

#[test]
fn test_explicit_missing_config_is_fatal() -> Result<()> {
    let test = CliTest::new()?;

    let output = test.snap_command("pre").output()?;

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Config file not found"));

    Ok(())
}

#[test]
fn test_fail_ok_command() -> Result<()> {
    let test = CliTest::new()?;
    test.write_config(
        r#"
[flaky]
type = command
command = exit 3
failok = yes

[noisy]
type = command
command = echo partial; exit 3
"#,
    )?;

    let output = test.snap_command("pre").output()?;

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let err = stderr(&output);
    assert!(!err.contains("flaky"));
    assert!(err.contains("exited with status 3"));
    assert_eq!(test.read_artifact("noisy.pre")?, "partial\n");

    Ok(())
}
