#[cfg(test)]
mod cli_help_tests {
    use assert_cmd::prelude::*;
    use predicates::prelude::*;
    use std::process::Command;

    #[test]
    fn test_cli_help_output() {
        let mut cmd = Command::cargo_bin("kitdm").unwrap();

        let assert_result = cmd.arg("--help").assert().success();
        let output = assert_result.get_output();
        let help_output = String::from_utf8_lossy(&output.stdout);

        println!("CLI Help Output:\n{}", help_output);

        assert!(help_output.contains("Usage:"));
        assert!(help_output.contains("Options:"));
        assert!(help_output.contains("Commands:"));

        // the three services and the configuration
        assert!(help_output.contains("base-repo"));
        assert!(help_output.contains("metastore"));
        assert!(help_output.contains("pid"));
        assert!(help_output.contains("config"));

        assert!(help_output.contains("--auth"));
        assert!(help_output.contains("--render-as"));
        assert!(help_output.contains("-h, --help"));
        assert!(help_output.contains("-V, --version"));
    }

    #[test]
    fn test_cli_subcommand_help_outputs() {
        let expectations: Vec<(&str, Vec<&str>)> = vec![
            (
                "base-repo",
                vec![
                    "create-resource",
                    "create-content",
                    "get-resource",
                    "get-resources",
                    "get-content",
                    "download-content",
                    "update-resource",
                    "patch-resource",
                    "patch-content",
                    "delete-resource",
                    "delete-content",
                ],
            ),
            (
                "metastore",
                vec![
                    "create-schema",
                    "create-document",
                    "get-schema",
                    "get-schemas",
                    "get-document",
                    "get-documents",
                    "download-schema",
                    "download-document",
                    "update-schema",
                    "update-document",
                    "delete-schema",
                    "delete-document",
                ],
            ),
            (
                "pid",
                vec![
                    "create-record",
                    "get-pid",
                    "get-known-pid",
                    "get-known-pids",
                    "update-record",
                ],
            ),
            ("config", vec!["path", "show"]),
        ];

        for (subcommand, operations) in expectations {
            let mut cmd = Command::cargo_bin("kitdm").unwrap();
            let assert_result = cmd.arg(subcommand).arg("--help").assert().success();
            let output = assert_result.get_output();
            let help_output = String::from_utf8_lossy(&output.stdout);

            println!("Help Output for '{}':\n{}", subcommand, help_output);

            assert!(help_output.contains("Usage:"));
            assert!(help_output.contains(subcommand));
            for operation in operations {
                assert!(
                    help_output.contains(operation),
                    "{} help is missing {}",
                    subcommand,
                    operation
                );
            }
        }
    }

    #[test]
    fn test_historic_operation_names_are_accepted() {
        let mut cmd = Command::cargo_bin("kitdm").unwrap();
        cmd.args(["base-repo", "getResources", "--help"])
            .assert()
            .success()
            .stdout(predicate::str::contains("--from"));
    }

    #[test]
    fn test_missing_subcommand_prints_help() {
        let mut cmd = Command::cargo_bin("kitdm").unwrap();
        cmd.assert()
            .failure()
            .stderr(predicate::str::contains("Usage:"));
    }

    #[test]
    fn test_unknown_render_format_is_rejected() {
        let mut cmd = Command::cargo_bin("kitdm").unwrap();
        cmd.args(["-r", "tree", "config", "path"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("tree"));
    }
}
