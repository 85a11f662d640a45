use kodegen_bundler_onefile::{
    bundler::{
        BuilderFactory, HostPlatform, PlatformStatus,
        builder::result::{DEPENDENCY_INSTALL, ENVIRONMENT_CHECK},
    },
    package::PackageManager,
};

use super::common::TestProject;

#[tokio::test]
async fn partial_failure_reports_both_scripts() {
    let project = TestProject::new();
    project.write_file("a.py", "print('a')\n");
    project.write_file("b.py", "# FAIL\n");

    let builder = BuilderFactory::create(project.config(&["a.py", "b.py"]), None, project.logger()).unwrap();
    let results = builder.build_all().await;

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].script, "a.py");
    assert!(results[0].success());
    assert!(results[0].executable_path().unwrap().is_file());

    assert_eq!(results[1].script, "b.py");
    assert!(!results[1].success());
    assert!(results[1].error_message().unwrap().contains("boom while bundling b"));

    let summary = builder.build_summary(&results);
    assert_eq!(summary.successful(), 1);
    assert_eq!(summary.failed(), 1);
    assert_eq!(summary.success_rate(), 0.5);
    assert_eq!(summary.successful_builds, ["a.py"]);
    assert_eq!(summary.failed_builds[0].script, "b.py");
}

#[tokio::test]
async fn zero_exit_without_artifact_fails() {
    let project = TestProject::new();
    project.write_file("quiet.py", "# NOOUT\n");

    let builder = BuilderFactory::create(project.config(&["quiet.py"]), None, project.logger()).unwrap();
    let result = builder.build_one("quiet.py").await;

    assert!(!result.success());
    assert!(result.error_message().unwrap().starts_with("output file not found"));
}

#[tokio::test]
async fn failed_installer_short_circuits() {
    let project = TestProject::new();
    project.write_file("a.py", "print('a')\n");
    project.break_installer();

    let builder = BuilderFactory::create(project.config(&["a.py"]), None, project.logger()).unwrap();
    let results = builder.build_all().await;

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].script, DEPENDENCY_INSTALL);
    assert!(!builder.output_directory().exists());
    assert!(
        project
            .sink
            .messages_at(log::Level::Error)
            .iter()
            .any(|m| m.contains("no matching distribution"))
    );
}

#[tokio::test]
async fn missing_bundler_short_circuits() {
    let project = TestProject::new();
    project.write_file("a.py", "print('a')\n");
    let config = std::sync::Arc::new(
        project
            .builder(&["a.py"])
            .bundler_program("./no-such-bundler")
            .build()
            .unwrap(),
    );

    let builder = BuilderFactory::create(config, None, project.logger()).unwrap();
    let results = builder.build_all().await;

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].script, ENVIRONMENT_CHECK);
}

#[tokio::test]
async fn current_platform_build_is_recorded_and_packaged() {
    let project = TestProject::new();
    project.write_file("a.py", "print('a')\n");
    project.write_file("README.md", "# hello\n");
    let config = std::sync::Arc::new(
        project
            .builder(&["a.py"])
            .distribution_files(["README.md", "config.py"])
            .build()
            .unwrap(),
    );

    let manager = PackageManager::new(config, project.logger()).await.unwrap();
    let summary = manager.build_current_platform().await;

    let host = HostPlatform::detect();
    assert_eq!(summary.identifier(), host.identifier());
    assert_eq!(summary.successful(), 1);

    let dist = project.path("dist").join(host.identifier());
    assert!(dist.join("README.md").is_file());
    for dir in ["data", "models", "logs"] {
        assert!(dist.join(dir).is_dir());
    }

    let record = manager.get_package_info(&host.platform, &host.arch).await.unwrap();
    assert_eq!(record.version, "0.1.0");
    assert_eq!(record.build_info["successful"], 1);
}

#[tokio::test]
async fn failed_current_platform_build_is_still_recorded() {
    let project = TestProject::new();
    project.write_file("b.py", "# FAIL\n");

    let manager = PackageManager::new(project.config(&["b.py"]), project.logger()).await.unwrap();
    let summary = manager.build_current_platform().await;

    assert_eq!(summary.successful(), 0);
    let records = manager.list_packages().await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].build_info["failed"], 1);
}

#[tokio::test]
async fn cross_build_records_only_successful_platforms() {
    let project = TestProject::new();
    project.write_file("a.py", "print('a')\n");

    let manager = PackageManager::new(project.config(&["a.py"]), project.logger()).await.unwrap();
    let summary = manager
        .build_cross_platform(Some(&["linux", "windows", "../bad"]))
        .await;

    // The host bundler never produces `a.exe`, so windows fails.
    assert_eq!(summary.status("linux"), Some(PlatformStatus::Succeeded));
    assert_eq!(summary.status("windows"), Some(PlatformStatus::Failed));
    assert_eq!(summary.status("../bad"), Some(PlatformStatus::NotAttempted));
    assert_eq!(summary.total_platforms, 3);
    assert_eq!(summary.not_attempted, ["../bad"]);
    assert!(
        summary.platform_results["windows"].counts.failed == 1
            && summary.platform_results["windows"].counts.total == 1
    );

    let records = manager.list_packages().await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].platform, "linux");
}

#[tokio::test]
async fn unsupported_requested_platform_fails_fast() {
    let project = TestProject::new();
    project.write_file("a.py", "print('a')\n");

    let manager = PackageManager::new(project.config(&["a.py"]), project.logger()).await.unwrap();
    let summary = manager.build_cross_platform(Some(&["haiku"])).await;

    assert_eq!(summary.status("haiku"), Some(PlatformStatus::NotAttempted));
    assert_eq!(summary.total_platforms, 1);
    assert!(summary.platforms.is_empty());
    let report = &summary.platform_results["haiku"];
    assert_eq!(report.counts.total, 0);
    assert!(report.reason.as_deref().unwrap().contains("unsupported platform haiku"));

    let host = HostPlatform::detect();
    assert!(!project.path("dist").join(format!("haiku-{}", host.arch)).exists());
    assert!(manager.list_packages().await.is_empty());
}

#[tokio::test]
async fn empty_platform_list_builds_every_supported_platform() {
    let project = TestProject::new();
    project.write_file("a.py", "print('a')\n");

    let manager = PackageManager::new(project.config(&["a.py"]), project.logger()).await.unwrap();
    let summary = manager.build_cross_platform(Some(&[])).await;

    assert_eq!(summary.total_platforms, BuilderFactory::supported_platforms().len());
    assert!(summary.not_attempted.is_empty());
    for platform in BuilderFactory::supported_platforms() {
        assert!(summary.status(platform).is_some());
    }
    // No `.exe` from the host bundler, so windows is never recorded.
    assert_eq!(summary.status("windows"), Some(PlatformStatus::Failed));
    let mut recorded: Vec<String> = manager.list_packages().await.into_iter().map(|r| r.platform).collect();
    recorded.sort();
    assert_eq!(recorded, ["linux", "macos"]);
}
