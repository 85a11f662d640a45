use chrono::{Duration, TimeZone, Utc};
use kodegen_bundler_onefile::{
    metadata::{MetadataStore, PackageMetadata},
    package::{DEFAULT_KEEP_LATEST, PackageManager},
};
use serde_json::json;

use super::common::TestProject;

fn record(version: &str, platform: &str, minutes: i64) -> PackageMetadata {
    let mut record = PackageMetadata::new("hello-scikit-learn", version, platform, "x86_64");
    record.build_time = Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap() + Duration::minutes(minutes);
    record.build_info = json!({ "successful": 1, "note": format!("build {version}") });
    record
}

#[tokio::test]
async fn missing_distribution_creates_nothing() {
    let project = TestProject::new();
    let manager = PackageManager::new(project.config(&[]), project.logger()).await.unwrap();

    let package = manager.create_release_package("linux", "x86_64", "zip").await;

    assert!(package.is_none());
    let leftovers: Vec<_> = std::fs::read_dir(project.path("packages")).unwrap().collect();
    assert!(leftovers.is_empty());
}

#[tokio::test]
async fn unknown_format_creates_nothing() {
    let project = TestProject::new();
    project.write_file("dist/linux-x86_64/predict", "bin");
    let manager = PackageManager::new(project.config(&[]), project.logger()).await.unwrap();

    assert!(manager.create_release_package("linux", "x86_64", "rar").await.is_none());
    let leftovers: Vec<_> = std::fs::read_dir(project.path("packages")).unwrap().collect();
    assert!(leftovers.is_empty());
}

#[tokio::test]
async fn release_archives_are_named_by_release() {
    let project = TestProject::new();
    project.write_file("dist/linux-x86_64/predict", "bin");
    project.write_file("dist/linux-x86_64/data/train.csv", "a,b\n");
    let manager = PackageManager::new(project.config(&[]), project.logger()).await.unwrap();

    let zip = manager.create_release_package("linux", "x86_64", "zip").await.unwrap();
    assert_eq!(zip, project.path("packages/hello-scikit-learn-0.1.0-linux-x86_64.zip"));
    assert!(zip.is_file());

    let tgz = manager.create_release_package("linux", "x86_64", "TGZ").await.unwrap();
    assert_eq!(tgz, project.path("packages/hello-scikit-learn-0.1.0-linux-x86_64.tar.gz"));
    assert!(tgz.is_file());
}

#[tokio::test]
async fn corrupt_record_is_skipped_with_one_warning() {
    let project = TestProject::new();
    let manager = PackageManager::new(project.config(&[]), project.logger()).await.unwrap();
    manager.store().save(&record("0.1.0", "linux", 0)).await.unwrap();
    manager.store().save(&record("0.1.0", "windows", 5)).await.unwrap();
    project.write_file("packages/broken.json", "{ not json");

    let records = manager.list_packages().await;

    assert_eq!(records.len(), 2);
    assert_eq!(project.sink.warnings().len(), 1);
    assert_eq!(project.warnings_containing("broken.json").len(), 1);
}

#[tokio::test]
async fn records_round_trip_through_listing() {
    let project = TestProject::new();
    let manager = PackageManager::new(project.config(&[]), project.logger()).await.unwrap();

    let mut saved = PackageMetadata::new("hello-scikit-learn", "0.1.0", "macos", "arm64");
    saved.build_info = json!({ "failed_builds": [{ "script": "b.py", "message": "boom" }] });
    manager.store().save(&saved).await.unwrap();

    let listed = manager.get_package_info("macos", "arm64").await.unwrap();
    assert_eq!(listed.platform, saved.platform);
    assert_eq!(listed.arch, saved.arch);
    assert_eq!(listed.version, saved.version);
    assert_eq!(listed.build_time, saved.build_time);
    assert_eq!(listed.build_info, saved.build_info);
}

#[tokio::test]
async fn clean_packages_keeps_newest_per_platform() {
    let project = TestProject::new();
    let manager = PackageManager::new(project.config(&[]), project.logger()).await.unwrap();
    let store: &MetadataStore = manager.store();

    // Saved out of chronological order on purpose.
    let linux: Vec<PackageMetadata> = [3, 0, 6, 1, 5, 2, 4]
        .into_iter()
        .map(|i| record(&format!("0.{i}.0"), "linux", i * 10))
        .collect();
    for r in &linux {
        store.save(r).await.unwrap();
        project.write_file(&format!("packages/{}.zip", r.key()), "zip");
    }
    for i in 0..2 {
        store.save(&record(&format!("0.{i}.0"), "windows", i)).await.unwrap();
    }

    let removed = manager.clean_packages(3).await;
    assert_eq!(removed.len(), 4);

    let remaining = manager.list_packages().await;
    let mut linux_versions: Vec<String> = remaining
        .iter()
        .filter(|r| r.platform == "linux")
        .map(|r| r.version.clone())
        .collect();
    linux_versions.sort();
    assert_eq!(linux_versions, ["0.4.0", "0.5.0", "0.6.0"]);
    assert_eq!(remaining.iter().filter(|r| r.platform == "windows").count(), 2);

    for r in &removed {
        assert!(!project.path(&format!("packages/{}.zip", r.key())).exists());
    }
    assert!(project.path("packages/hello-scikit-learn-0.6.0-linux-x86_64.zip").exists());

    assert!(manager.clean_packages(DEFAULT_KEEP_LATEST).await.is_empty());
}

#[tokio::test]
async fn release_summary_groups_records() {
    let project = TestProject::new();
    let manager = PackageManager::new(project.config(&[]), project.logger()).await.unwrap();
    manager.store().save(&record("0.1.0", "linux", 0)).await.unwrap();
    manager.store().save(&record("0.2.0", "linux", 30)).await.unwrap();
    manager.store().save(&record("0.2.0", "windows", 10)).await.unwrap();

    let summary = manager.create_release_summary().await;

    assert_eq!(summary.project_name, "hello-scikit-learn");
    assert_eq!(summary.total_packages, 3);
    assert_eq!(summary.platforms["linux-x86_64"].len(), 2);
    assert_eq!(summary.platforms["windows-x86_64"].len(), 1);
    let latest = summary.latest_build.unwrap();
    assert_eq!(latest.platform, "linux-x86_64");
    assert_eq!(latest.version, "0.2.0");
}

#[tokio::test]
async fn daily_log_file_collects_manager_messages() {
    let project = TestProject::new();
    let config = project.config(&[]);
    let log = project.logger().with_daily_file(config.logs_dir(), "package_manager");
    let manager = PackageManager::new(config.clone(), log).await.unwrap();
    project.write_file("packages/broken.json", "{ not json");

    manager.list_packages().await;

    let files: Vec<_> = std::fs::read_dir(project.path("logs"))
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    assert_eq!(files.len(), 1);
    let content = std::fs::read_to_string(&files[0]).unwrap();
    assert!(content.contains("Package manager ready for hello-scikit-learn 0.1.0"));
    assert!(content.lines().any(|l| l.contains("WARN") && l.contains("broken.json")));
    assert_eq!(project.warnings_containing("broken.json").len(), 1);
}
