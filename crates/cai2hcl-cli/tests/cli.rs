//! Running the converter end to end over files

use std::path::Path;

use cai2hcl_cli::{run, Cli};
use clap::Parser;
use pretty_assertions::assert_eq;

const INVENTORY: &str = r#"{"name":"//cloudresourcemanager.googleapis.com/projects/1234","asset_type":"cloudresourcemanager.googleapis.com/Project","ancestors":["projects/1234","folders/77"],"resource":{"version":"v1","data":{"projectId":"my-proj","name":"My Project","labels":{"team":"infra"}}},"iam_policy":{"bindings":[{"role":"roles/viewer","members":["user:b@example.com","user:a@example.com"]}]}}
{"name":"//cloudbilling.googleapis.com/projects/my-proj/billingInfo","asset_type":"cloudbilling.googleapis.com/ProjectBillingInfo","resource":{"data":{"projectId":"my-proj","billingAccountName":"billingAccounts/AAA-BBB"}}}
{"name":"//container.googleapis.com/projects/my-proj/locations/us-central1/clusters/c1","asset_type":"container.googleapis.com/Cluster","resource":{"data":{"name":"c1"}}}
{"name":"//storage.googleapis.com/bucket","asset_type":"storage.googleapis.com/Bucket","resource":{"data":{"name":"bucket"}}}
"#;

fn cli(dir: &Path, extra: &[&str]) -> Cli {
    let input = dir.join("inventory.json");
    std::fs::write(&input, INVENTORY).unwrap();
    let output = dir.join("main.tf");
    let errors = dir.join("errors.json");
    let mut args = vec![
        "cai2hcl".to_string(),
        input.display().to_string(),
        "--output".into(),
        output.display().to_string(),
        "--errors-json".into(),
        errors.display().to_string(),
    ];
    args.extend(extra.iter().map(|s| (*s).to_string()));
    Cli::try_parse_from(args).unwrap()
}

#[test]
fn writes_text_and_error_report() {
    let dir = tempfile::tempdir().unwrap();
    let summary = run(&cli(dir.path(), &[])).unwrap();
    assert_eq!(summary.records, 4);
    assert_eq!(summary.blocks, 2);
    assert_eq!(summary.errors.len(), 1);

    let text = std::fs::read_to_string(dir.path().join("main.tf")).unwrap();
    assert_eq!(
        text,
        "resource \"google_project\" \"my-proj\" {\n  \
         name = \"My Project\"\n  \
         project_id = \"my-proj\"\n  \
         folder_id = \"77\"\n  \
         billing_account = \"AAA-BBB\"\n  \
         labels = {\n    team = \"infra\"\n  }\n\
         }\n\
         \n\
         resource \"google_project_iam_policy\" \"my-proj\" {\n  \
         project = \"my-proj\"\n  \
         policy_data = \"{\\\"bindings\\\":[{\\\"role\\\":\\\"roles/viewer\\\",\\\"members\\\":[\\\"user:a@example.com\\\",\\\"user:b@example.com\\\"]}]}\"\n\
         }\n"
    );

    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(dir.path().join("errors.json")).unwrap()).unwrap();
    assert_eq!(report[0]["transform_id"], "google_container_cluster");
    assert_eq!(report[0]["kind"], "transform_not_implemented");
}

#[test]
fn fail_on_error_is_fatal_after_writing() {
    let dir = tempfile::tempdir().unwrap();
    let err = run(&cli(dir.path(), &["--fail-on-error"])).unwrap_err();
    assert!(err.to_string().contains("1 resources failed"));
    assert!(dir.path().join("main.tf").exists());
}

#[test]
fn iam_style_and_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("cai2hcl.toml");
    std::fs::write(&config, "[convert]\niam_style = \"member\"\nmax_workers = 2\n").unwrap();
    let summary = run(&cli(dir.path(), &["--config", config.to_str().unwrap()])).unwrap();
    assert_eq!(summary.blocks, 3);
    let text = std::fs::read_to_string(dir.path().join("main.tf")).unwrap();
    assert_eq!(text.matches("resource \"google_project_iam_member\"").count(), 2);
}

#[test]
fn schema_override_restricts_fields() {
    let dir = tempfile::tempdir().unwrap();
    let schemas = dir.path().join("schemas.yaml");
    std::fs::write(
        &schemas,
        "google_project:\n  fields:\n    project_id: { type: string, required: true }\n",
    )
    .unwrap();
    run(&cli(dir.path(), &["--schemas", schemas.to_str().unwrap()])).unwrap();
    let text = std::fs::read_to_string(dir.path().join("main.tf")).unwrap();
    assert!(text.starts_with("resource \"google_project\" \"my-proj\" {\n  project_id = \"my-proj\"\n}\n"));
}

#[test]
fn malformed_input_reports_line() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("bad.json");
    std::fs::write(&input, "{\"name\":\"a\",\"asset_type\":\"t\"}\n{not json}\n").unwrap();
    let cli = Cli::try_parse_from(["cai2hcl", input.to_str().unwrap(), "-o", dir.path().join("out.tf").to_str().unwrap()]).unwrap();
    let err = run(&cli).unwrap_err();
    assert!(format!("{err:#}").contains("line 2"));
}

#[test]
fn missing_input_is_fatal() {
    let cli = Cli::try_parse_from(["cai2hcl", "/nonexistent/inventory.json"]).unwrap();
    assert!(run(&cli).is_err());
}
