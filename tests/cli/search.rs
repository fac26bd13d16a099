use anyhow::Result;
use pretty_assertions::assert_eq;

use crate::{CliTest, run};

fn with_artifacts() -> Result<CliTest> {
    let test = CliTest::new()?;
    test.write_file(
        "public/data/items.json",
        r#"[
            {"id": "nail", "name": "Nail", "value": "10", "craftBench": "workbench"},
            {"id": "bolt", "name": "Bolt", "value": "2", "recipe": {"metal_parts": 1}},
            {"id": "gear", "name": "Gear", "value": ""}
        ]"#,
    )?;
    test.write_file(
        "public/data/columns.json",
        r#"["name", "value", "recipe", "craftBench"]"#,
    )?;
    test.write_file(
        "public/data/itemIdToName.json",
        r#"{"metal_parts": "Metal Parts"}"#,
    )?;
    test.write_file(
        "public/data/craftBenchIdToName.json",
        r#"{"workbench": "Workbench"}"#,
    )?;
    Ok(test)
}

/// First cell of every table body line.
fn names(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .skip(1)
        .take_while(|line| !line.is_empty())
        .filter_map(|line| line.split_whitespace().next())
        .map(str::to_string)
        .collect()
}

#[test]
fn test_search_missing_artifacts() -> Result<()> {
    let test = CliTest::new()?;

    let (output, stdout, stderr) = run(&mut test.search_command())?;

    assert_eq!(output.status.code(), Some(2));
    assert!(stdout.is_empty());
    assert_eq!(stderr.lines().count(), 1);
    assert!(stderr.contains("items.json not found. Run `raidtable build` to generate the data."));

    Ok(())
}

#[test]
fn test_search_unparsable_artifacts() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file("public/data/items.json", r#"[{"name":"#)?;

    let (output, stdout, stderr) = run(&mut test.search_command())?;

    assert_eq!(output.status.code(), Some(2));
    assert!(stdout.is_empty());
    assert_eq!(stderr.lines().count(), 1);
    assert!(stderr.contains("failed to parse"));
    assert!(stderr.contains("items.json"));
    assert_eq!(stderr.matches("EOF while parsing").count(), 1);
    assert!(stderr.contains("Run `raidtable build` to generate the data."));
    assert!(!stderr.starts_with("Error:"));

    Ok(())
}

#[test]
fn test_search_lists_all_rows() -> Result<()> {
    let test = with_artifacts()?;

    let (output, stdout, _) = run(&mut test.search_command())?;

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(names(&stdout), vec!["Nail", "Bolt", "Gear"]);
    assert!(stdout.contains("Metal Parts: 1"));
    assert!(stdout.contains("Workbench"));
    assert!(stdout.ends_with("3 of 3 items\n"));

    Ok(())
}

#[test]
fn test_search_single_keyword() -> Result<()> {
    let test = with_artifacts()?;

    let (_, stdout, _) = run(test.search_command().arg("bolt"))?;

    assert_eq!(names(&stdout), vec!["Bolt"]);

    Ok(())
}

#[test]
fn test_search_requires_every_term() -> Result<()> {
    let test = with_artifacts()?;

    let (output, stdout, _) = run(test.search_command().args(["bo", "na"]))?;

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout, "No matching items.\n");

    Ok(())
}

#[test]
fn test_search_sort_numeric() -> Result<()> {
    let test = with_artifacts()?;

    let (_, asc, _) = run(test.search_command().args(["--sort", "value"]))?;
    let (_, desc, _) = run(test.search_command().args(["--sort", "value", "--desc"]))?;

    assert_eq!(names(&asc), vec!["Bolt", "Nail", "Gear"]);
    assert_eq!(names(&desc), vec!["Nail", "Bolt", "Gear"]);

    Ok(())
}

#[test]
fn test_search_sort_unknown_column() -> Result<()> {
    let test = with_artifacts()?;

    let (output, stdout, stderr) = run(test.search_command().args(["--sort", "weight"]))?;

    assert_eq!(output.status.code(), Some(0));
    assert!(stderr.contains("unknown column `weight`"));
    assert_eq!(names(&stdout), vec!["Nail", "Bolt", "Gear"]);

    Ok(())
}

#[test]
fn test_search_limit() -> Result<()> {
    let test = with_artifacts()?;

    let (_, stdout, _) = run(test.search_command().args(["--sort", "name", "--limit", "2"]))?;

    assert_eq!(names(&stdout), vec!["Bolt", "Gear"]);
    assert!(stdout.ends_with("2 of 3 items\n"));

    Ok(())
}

#[test]
fn test_search_data_flag() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file("snapshot/items.json", r#"[{"name": "Bolt"}]"#)?;
    test.write_file("snapshot/columns.json", r#"["name"]"#)?;

    let (output, stdout, _) = run(test.search_command().args(["--data", "snapshot"]))?;

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout, "name\nBolt\n\n1 of 1 item\n");

    Ok(())
}
