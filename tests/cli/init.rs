use anyhow::{Context, Result};
use serde_json::Value;

use crate::{CliTest, run};

/// Validates config file structure and default values.
fn assert_config_content(content: &str) -> Result<()> {
    let parsed: Value = serde_json::from_str(content).context("Config should be valid JSON")?;

    assert_eq!(parsed["language"], "en");
    assert_eq!(parsed["outDir"], "./public/data");
    assert_eq!(parsed["flatten"], "shallow");
    assert_eq!(parsed["localeDetection"], "closedSet");
    assert_eq!(parsed["requiredFields"], serde_json::json!(["value"]));
    assert!(
        parsed.get("referenceFields").is_some(),
        "Config should have 'referenceFields' field"
    );

    assert!(
        content.contains("\n  \""),
        "Config should use 2-space indentation"
    );

    Ok(())
}

#[test]
fn test_init_creates_config() -> Result<()> {
    let test = CliTest::new()?;

    let (output, stdout, _) = run(test.command().arg("init"))?;

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout, "\u{2713} Created .raidtablerc.json\n");
    assert!(test.root().join(".raidtablerc.json").exists());

    let content = test.read_file(".raidtablerc.json")?;
    assert_config_content(&content)?;

    Ok(())
}

#[test]
fn test_init_fails_if_exists() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file(".raidtablerc.json", "{}")?;

    let (output, _, stderr) = run(test.command().arg("init"))?;

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr.contains(".raidtablerc.json already exists"));
    assert_eq!(test.read_file(".raidtablerc.json")?, "{}");

    Ok(())
}

#[test]
fn test_init_output_is_loadable() -> Result<()> {
    let test = CliTest::new()?;
    run(test.command().arg("init"))?;

    let content = test.read_file(".raidtablerc.json")?;
    let config: raidtable::config::Config = serde_json::from_str(&content)?;
    config.validate()?;

    Ok(())
}
