use std::{
    fs::File,
    path::Path,
    time::{Duration, SystemTime},
};

use kodegen_bundler_onefile::package::{PackageManager, spec_group};

use super::common::TestProject;

fn age(project: &TestProject, relative: &str, seconds_ago: u64) {
    let file = File::options().write(true).open(project.path(relative)).unwrap();
    file.set_modified(SystemTime::now() - Duration::from_secs(seconds_ago))
        .unwrap();
}

fn build_specs(project: &TestProject) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(project.path("build"))
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|n| n.ends_with(".spec"))
        .collect();
    names.sort();
    names
}

#[tokio::test]
async fn spec_in_project_root_is_misplaced() {
    let project = TestProject::new();
    project.write_file("predict.spec", "# stray");
    project.write_file("predict.py", "print('x')");
    let manager = PackageManager::new(project.config(&[]), project.logger()).await.unwrap();

    let cleanup = manager.clean_spec_files(true).await;

    assert!(!project.path("predict.spec").exists());
    assert!(project.path("predict.py").exists());
    assert_eq!(cleanup.removed, vec![project.path("predict.spec")]);
    assert_eq!(project.warnings_containing("misplaced").len(), 1);
}

#[tokio::test]
async fn keeps_newest_spec_per_script_and_is_idempotent() {
    let project = TestProject::new();
    project.write_file("build/predict.spec", "new");
    project.write_file("build/predict.old.spec", "old");
    project.write_file("build/train_model.spec", "train");
    project.write_file("build/notes.txt", "keep me");
    age(&project, "build/predict.old.spec", 3600);
    let manager = PackageManager::new(project.config(&[]), project.logger()).await.unwrap();

    let first = manager.clean_spec_files(true).await;
    assert_eq!(first.removed, vec![project.path("build/predict.old.spec")]);
    assert_eq!(build_specs(&project), ["predict.spec", "train_model.spec"]);

    let second = manager.clean_spec_files(true).await;
    assert!(second.removed.is_empty());
    assert_eq!(second.kept.len(), 2);

    let specs = build_specs(&project);
    let mut groups: Vec<String> = specs.iter().map(|n| spec_group(Path::new(n))).collect();
    groups.dedup();
    assert_eq!(groups.len(), specs.len());
    assert!(project.path("build/notes.txt").exists());
    assert!(project.sink.warnings().is_empty());
}

#[tokio::test]
async fn keep_latest_disabled_removes_every_build_spec() {
    let project = TestProject::new();
    project.write_file("build/a.spec", "");
    project.write_file("build/b.spec", "");
    let manager = PackageManager::new(project.config(&[]), project.logger()).await.unwrap();

    let cleanup = manager.clean_spec_files(false).await;

    assert_eq!(cleanup.removed.len(), 2);
    assert!(cleanup.kept.is_empty());
    assert!(build_specs(&project).is_empty());
}

#[tokio::test]
async fn nested_specs_in_output_directories_are_removed() {
    let project = TestProject::new();
    project.write_file("dist/linux-x86_64/predict.spec", "");
    project.write_file("temp/deep/er/a.spec", "");
    project.write_file("packages/b.spec", "");
    project.write_file("src/nested/c.spec", "");
    let manager = PackageManager::new(project.config(&[]), project.logger()).await.unwrap();

    let cleanup = manager.clean_spec_files(true).await;

    assert_eq!(cleanup.removed.len(), 3);
    assert_eq!(project.warnings_containing("misplaced").len(), 3);
    assert!(project.path("src/nested/c.spec").exists());
}
