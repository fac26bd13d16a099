use anyhow::Result;
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::{CliTest, run};

/// Five items, one craft bench, and the default column/exclude files.
fn corpus() -> Result<CliTest> {
    let test = CliTest::new()?;
    test.write_file(
        "corpus/items/bolt.json",
        r#"{
            "id": "bolt",
            "name": {"en": "Bolt", "fr": "Boulon"},
            "type": "Basic Material",
            "rarity": "Common",
            "value": 2,
            "weightKg": 0.1,
            "stackSize": 100
        }"#,
    )?;
    test.write_file(
        "corpus/items/metal_parts.json",
        r#"{
            "id": "metal_parts",
            "name": {"en": "Metal Parts", "fr": "Pièces métalliques"},
            "type": "Basic Material",
            "value": 75
        }"#,
    )?;
    test.write_file(
        "corpus/items/shield.json",
        r#"{
            "id": "shield",
            "name": {"en": "Light Shield"},
            "type": "Shield",
            "value": 640,
            "recipe": {"metal_parts": 4, "bolt": 2},
            "craftBench": "workbench",
            "effects": {"charge": {"en": "Shield Charge", "value": 40}}
        }"#,
    )?;
    test.write_file(
        "corpus/items/shield_blueprint.json",
        r#"{"id": "shield_blueprint", "name": {"en": "Shield Blueprint"}, "type": "Blueprint", "value": 0}"#,
    )?;
    test.write_file(
        "corpus/items/quest_token.json",
        r#"{"id": "quest_token", "name": {"en": "Token"}, "type": "Quest Item"}"#,
    )?;
    test.write_file(
        "corpus/hideout/workbench.json",
        r#"{"id": "workbench", "name": {"en": "Workbench", "fr": "Établi"}}"#,
    )?;
    test.write_file(
        "public/columns.json",
        r#"["id", "name", "type", "value", "recipe", "craftBench", "effects"]"#,
    )?;
    test.write_file("public/exclude_types.json", r#"["Blueprint"]"#)?;
    Ok(test)
}

#[test]
fn test_build_writes_artifacts() -> Result<()> {
    let test = corpus()?;

    let (output, stdout, _) = run(&mut test.build_command())?;

    assert_eq!(output.status.code(), Some(0));
    assert!(stdout.contains("Built 3 rows with 7 columns (language: en)"));
    assert_eq!(
        test.read_json("public/data/items.json")?,
        json!([
            {"id": "bolt", "name": "Bolt", "type": "Basic Material", "value": 2},
            {"id": "metal_parts", "name": "Metal Parts", "type": "Basic Material", "value": 75},
            {
                "id": "shield",
                "name": "Light Shield",
                "type": "Shield",
                "value": 640,
                "recipe": {"Metal Parts": 4, "Bolt": 2},
                "craftBench": "workbench",
                "effects": "Shield Charge: 40"
            }
        ])
    );
    assert_eq!(
        test.read_json("public/data/columns.json")?,
        json!(["id", "name", "type", "value", "recipe", "craftBench", "effects"])
    );
    assert_eq!(
        test.read_json("public/data/itemIdToName.json")?,
        json!({
            "bolt": "Bolt",
            "metal_parts": "Metal Parts",
            "quest_token": "Token",
            "shield": "Light Shield",
            "shield_blueprint": "Shield Blueprint"
        })
    );
    assert_eq!(
        test.read_json("public/data/craftBenchIdToName.json")?,
        json!({"workbench": "Workbench"})
    );
    assert_eq!(
        test.read_json("public/data/meta.json")?,
        json!({
            "language": "en",
            "rowCount": 3,
            "columnCount": 7,
            "benchCount": 1,
            "skippedByType": 1,
            "skippedMissingRequired": 1,
            "failedRecords": 0
        })
    );

    Ok(())
}

#[test]
fn test_build_rows_file_is_compact() -> Result<()> {
    let test = corpus()?;
    run(&mut test.build_command())?;

    let rows = test.read_file("public/data/items.json")?;
    assert!(rows.starts_with(r#"[{"id":"bolt","name":"Bolt","#));
    assert!(!rows.contains('\n'));

    let meta = test.read_file("public/data/meta.json")?;
    assert!(meta.starts_with("{\n  \"language\": \"en\","));
    assert!(meta.ends_with("}\n"));

    Ok(())
}

#[test]
fn test_build_with_language_flag() -> Result<()> {
    let test = corpus()?;

    let (output, _, _) = run(test.build_command().args(["--lang", "fr"]))?;

    assert_eq!(output.status.code(), Some(0));
    let rows = test.read_json("public/data/items.json")?;
    assert_eq!(rows[0]["name"], "Boulon");
    assert_eq!(rows[2]["name"], "Light Shield");
    assert_eq!(rows[2]["recipe"], json!({"Pièces métalliques": 4, "Boulon": 2}));
    assert_eq!(
        test.read_json("public/data/craftBenchIdToName.json")?,
        json!({"workbench": "Établi"})
    );
    assert_eq!(test.read_json("public/data/meta.json")?["language"], "fr");

    Ok(())
}

#[test]
fn test_build_with_language_env() -> Result<()> {
    let test = corpus()?;

    run(test.build_command().env("ARC_DATA_LANG", "fr"))?;

    let rows = test.read_json("public/data/items.json")?;
    assert_eq!(rows[1]["name"], "Pièces métalliques");

    Ok(())
}

#[test]
fn test_build_flag_wins_over_env() -> Result<()> {
    let test = corpus()?;

    run(test
        .build_command()
        .env("ARC_DATA_LANG", "fr")
        .args(["--lang", "en"]))?;

    let rows = test.read_json("public/data/items.json")?;
    assert_eq!(rows[0]["name"], "Bolt");

    Ok(())
}

#[test]
fn test_build_discover_columns() -> Result<()> {
    let test = corpus()?;

    run(test.build_command().arg("--discover-columns"))?;

    assert_eq!(
        test.read_json("public/data/columns.json")?,
        json!([
            "id", "name", "type", "rarity", "value", "weightKg", "stackSize",
            "craftBench", "effects", "recipe"
        ])
    );
    let rows = test.read_json("public/data/items.json")?;
    assert_eq!(rows[0]["stackSize"], 100);
    assert_eq!(rows.as_array().map(Vec::len), Some(3));

    Ok(())
}

#[test]
fn test_build_broken_record_exits_with_failure() -> Result<()> {
    let test = corpus()?;
    test.write_file("corpus/items/broken.json", "{ \"id\": ")?;

    let (output, _, stderr) = run(&mut test.build_command())?;

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr.contains("broken.json"));
    let meta = test.read_json("public/data/meta.json")?;
    assert_eq!(meta["failedRecords"], 1);
    assert_eq!(meta["rowCount"], 3);

    Ok(())
}

#[test]
fn test_build_missing_columns_file() -> Result<()> {
    let test = corpus()?;
    std::fs::remove_file(test.root().join("public/columns.json"))?;

    let (output, _, stderr) = run(&mut test.build_command())?;

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr.contains("missing columns file"));
    assert!(stderr.contains("columns.json"));
    assert!(stderr.contains("Hint:"));
    assert!(!test.root().join("public/data/items.json").exists());

    Ok(())
}

#[test]
fn test_build_checks_columns_file_before_fetching() -> Result<()> {
    let test = CliTest::new()?;

    let (output, _, stderr) = run(test.command().arg("build"))?;

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr.contains("missing columns file"));
    assert!(!stderr.contains("git clone"));
    assert!(!test.root().join("repos").exists());

    Ok(())
}

#[test]
fn test_build_missing_corpus() -> Result<()> {
    let test = CliTest::new()?;

    let (output, _, stderr) = run(test.command().args(["build", "--corpus-dir", "nowhere"]))?;

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr.contains("corpus directory not found"));

    Ok(())
}

#[test]
fn test_build_is_deterministic() -> Result<()> {
    let test = corpus()?;

    run(&mut test.build_command())?;
    let first = test.read_file("public/data/items.json")?;
    let first_index = test.read_file("public/data/itemIdToName.json")?;
    run(&mut test.build_command())?;

    assert_eq!(test.read_file("public/data/items.json")?, first);
    assert_eq!(test.read_file("public/data/itemIdToName.json")?, first_index);

    Ok(())
}

#[test]
fn test_build_removes_stale_bench_index() -> Result<()> {
    let test = corpus()?;
    run(&mut test.build_command())?;
    assert!(test.root().join("public/data/craftBenchIdToName.json").exists());

    std::fs::remove_dir_all(test.root().join("corpus/hideout"))?;
    run(&mut test.build_command())?;

    assert!(!test.root().join("public/data/craftBenchIdToName.json").exists());
    assert!(test.read_json("public/data/meta.json")?.get("benchCount").is_none());

    Ok(())
}

#[test]
fn test_build_reads_config_file() -> Result<()> {
    let test = corpus()?;
    test.write_file(
        ".raidtablerc.json",
        r#"{
            "outDir": "./dist",
            "columnsFile": null,
            "excludeTypesFile": null,
            "requiredFields": [],
            "ignores": ["quest_*"]
        }"#,
    )?;

    let (output, _, _) = run(&mut test.build_command())?;

    assert_eq!(output.status.code(), Some(0));
    let rows = test.read_json("dist/items.json")?;
    let ids: Vec<&str> = rows
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(|row| row["id"].as_str())
        .collect();
    assert_eq!(ids, vec!["bolt", "metal_parts", "shield", "shield_blueprint"]);

    Ok(())
}

#[test]
fn test_build_dot_path_flattening() -> Result<()> {
    let test = corpus()?;
    test.write_file(
        "corpus/items/rifle.json",
        r#"{"id": "rifle", "name": {"en": "Rifle"}, "value": 900, "stats": {"damage": 30}}"#,
    )?;

    run(test
        .build_command()
        .args(["--flatten", "dot-path", "--discover-columns"]))?;

    let columns = test.read_json("public/data/columns.json")?;
    assert!(
        columns
            .as_array()
            .is_some_and(|c| c.contains(&json!("stats.damage")))
    );

    Ok(())
}
