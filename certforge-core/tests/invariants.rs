//! Contract Invariant Tests
//!
//! These tests verify the guarantees the certifications page relies on.

use certforge_core::{
    config::CertificationConfig, content_digest, placeholder::style_for, CertificationCompiler,
    Compilation,
};
use chrono::{TimeZone, Utc};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const CONFIG: &str = r##"
categories:
  cloud:
    display_name: Cloud Platforms
    icon: "☁️"
    color: "#3B82F6"
    description: Hyperscaler certifications
    sort_order: 2
  devops:
    display_name: DevOps
    sort_order: 1
  learning: {}

certifications:
  - title: AWS Solutions Architect
    provider: Amazon Web Services
    category: cloud
    badge_image: aws-saa.png
    verification_url: https://verify.example/aws
    issue_date: "2023-06-01"
  - title: GCP Associate Engineer
    provider: Google Cloud
    category: cloud
    badge_image: gcp-ace.png
    verification_url: https://verify.example/gcp
    issue_date: "2024-01-01"
  - title: Cloud Practitioner
    provider: Amazon Web Services
    category: cloud
    badge_image: aws-ccp.png
    verification_url: https://verify.example/ccp
  - title: Terraform Associate
    provider: HashiCorp
    category: devops
    badge_image: tf.png
    verification_url: https://www.credly.com/badges/YOUR-BADGE-ID
    credential_id: 98765
  - title: Deep Learning
    provider: Some Bootcamp
    category: learning
    badge_image: dl.png
    verification_url: https://verify.example/dl
    description: ""
"##;

fn fixture(yaml: &str) -> (TempDir, CertificationConfig, CertificationCompiler) {
    let dir = TempDir::new().unwrap();
    let badges = dir.path().join("badges");
    fs::create_dir_all(&badges).unwrap();
    for name in ["aws-saa.png", "gcp-ace.png", "aws-ccp.png", "tf.png", "dl.png"] {
        fs::write(badges.join(name), b"png").unwrap();
    }
    let config = CertificationConfig::from_yaml_str(yaml, Path::new("fixture.yaml")).unwrap();
    let compiler = CertificationCompiler::new(badges);
    (dir, config, compiler)
}

fn compile(yaml: &str) -> Compilation {
    let (_dir, config, compiler) = fixture(yaml);
    compiler.compile(&config)
}

#[test]
fn invariant_total_count_matches_groups() {
    let out = compile(CONFIG);
    let doc = &out.document;
    assert!(out.is_success());
    assert_eq!(doc.total_count, 5);
    let sum: usize = doc.categories.iter().map(|(_, g)| g.count).sum();
    assert_eq!(sum, doc.total_count);
    for (_, group) in doc.categories.iter() {
        assert_eq!(group.count, group.certifications.len());
    }
}

#[test]
fn invariant_missing_required_field_never_ships() {
    let yaml = format!(
        "{}  - provider: Coursera\n    category: learning\n    badge_image: x.png\n",
        CONFIG
    );
    let out = compile(&yaml);
    assert!(!out.is_success());
    assert_eq!(out.error_count, 1);
    assert_eq!(out.document.total_count, 5);
    let all_titles: Vec<_> = out
        .document
        .categories
        .iter()
        .flat_map(|(_, g)| g.certifications.iter().map(|c| c.title.clone()))
        .collect();
    assert!(all_titles.iter().all(|t| !t.is_empty()));
}

#[test]
fn invariant_unknown_category_is_dropped_and_counted() {
    let yaml = format!(
        "{}  - title: Stray\n    provider: Coursera\n    category: misc\n    badge_image: dl.png\n",
        CONFIG
    );
    let out = compile(&yaml);
    assert_eq!(out.error_count, 1);
    assert_eq!(out.rejected_count(), 1);
    assert!(out.document.categories.get("misc").is_none());
    assert_eq!(out.document.total_count, 5);
}

#[test]
fn invariant_categories_in_sort_order() {
    let out = compile(CONFIG);
    let keys: Vec<_> = out.document.categories.keys().collect();
    assert_eq!(keys, vec!["devops", "cloud", "learning"]);
    let orders: Vec<_> = out
        .document
        .categories
        .iter()
        .map(|(_, g)| g.sort_order)
        .collect();
    assert!(orders.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn invariant_issue_date_descending_missing_last() {
    let out = compile(CONFIG);
    let cloud = out.document.categories.get("cloud").unwrap();
    let dates: Vec<_> = cloud
        .certifications
        .iter()
        .map(|c| c.issue_date.as_deref())
        .collect();
    assert_eq!(dates, vec![Some("2024-01-01"), Some("2023-06-01"), None]);
}

#[test]
fn invariant_recompile_is_identical_modulo_timestamp() {
    let (_dir, config, compiler) = fixture(CONFIG);
    let first = compiler.compile_at(&config, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
    let second = compiler.compile_at(&config, Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap());
    assert_eq!(first.document.categories, second.document.categories);
    assert_eq!(
        content_digest(&first.document).unwrap(),
        content_digest(&second.document).unwrap()
    );
    assert_ne!(
        serde_json::to_string(&first.document).unwrap(),
        serde_json::to_string(&second.document).unwrap()
    );
}

#[test]
fn invariant_provider_placeholder_styles() {
    let out = compile(CONFIG);
    let cloud = out.document.categories.get("cloud").unwrap();
    let aws = cloud
        .certifications
        .iter()
        .find(|c| c.provider == "Amazon Web Services")
        .unwrap();
    assert!(aws.fallback_svg.contains("fill='#232f3e'"));
    assert!(aws.fallback_svg.contains("%3EAWS%3C/text%3E"));
    assert_eq!(style_for("Amazon Web Services").label, "AWS");

    let learning = out.document.categories.get("learning").unwrap();
    let other = &learning.certifications[0];
    assert!(other.fallback_svg.contains("fill='#4A90E2'"));
    assert!(other.fallback_svg.contains("%3ECERT%3C/text%3E"));
}

#[test]
fn invariant_empty_config_succeeds() {
    let out = compile("certifications: []\ncategories: {}\n");
    assert!(out.is_success());
    assert_eq!(out.document.total_count, 0);
    assert!(out.document.categories.is_empty());
    let json = serde_json::to_value(&out.document).unwrap();
    assert_eq!(json["categories"], serde_json::json!({}));
}

#[test]
fn invariant_warnings_do_not_fail() {
    let out = compile(CONFIG);
    // Terraform's URL still carries the placeholder marker.
    assert_eq!(out.warning_count, 1);
    assert!(out.is_success());
    let devops = out.document.categories.get("devops").unwrap();
    let tf = &devops.certifications[0];
    assert_eq!(tf.credential_id.as_deref(), Some("98765"));
    assert!(tf.verification_url.contains("YOUR-"));
}

#[test]
fn invariant_category_metadata_defaults() {
    let out = compile(CONFIG);
    let learning = out.document.categories.get("learning").unwrap();
    assert_eq!(learning.display_name, "Learning");
    assert_eq!(learning.icon, "📄");
    assert_eq!(learning.color, "#60A5FA");
    assert_eq!(learning.sort_order, 999);
    assert_eq!(learning.certifications[0].description, None);
}

#[test]
fn invariant_malformed_dates_never_outrank_dateless() {
    let yaml = r#"
categories:
  learning: {}
certifications:
  - title: NoDate
    provider: Coursera
    category: learning
    badge_image: dl.png
    verification_url: https://verify.example/a
  - title: Signed
    provider: Coursera
    category: learning
    badge_image: dl.png
    verification_url: https://verify.example/b
    issue_date: '+2024-01-01'
  - title: Spaced
    provider: Coursera
    category: learning
    badge_image: dl.png
    verification_url: https://verify.example/c
    issue_date: ' 2024-06-01'
"#;
    let out = compile(yaml);
    assert_eq!(out.error_count, 2);
    assert_eq!(out.rejected_count(), 2);
    let learning = out.document.categories.get("learning").unwrap();
    let titles: Vec<_> = learning
        .certifications
        .iter()
        .map(|c| c.title.as_str())
        .collect();
    assert_eq!(titles, vec!["NoDate"]);
}
