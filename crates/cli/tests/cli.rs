use assert_cmd::Command;

#[test]
fn help_lists_subcommands() {
    let output = Command::cargo_bin("shelf")
        .unwrap()
        .arg("--help")
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    for command in ["serve", "migrate", "openapi"] {
        assert!(stdout.contains(command), "missing {command} in help");
    }
}

#[test]
fn openapi_prints_the_books_paths() {
    let output = Command::cargo_bin("shelf")
        .unwrap()
        .arg("openapi")
        .output()
        .unwrap();

    assert!(output.status.success());
    let document: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(document["paths"]["/books"].is_object());
    assert!(document["paths"]["/books/{id}"].is_object());
    assert!(document["paths"]["/api/users/signup"].is_object());
}

#[test]
fn unknown_subcommand_fails() {
    Command::cargo_bin("shelf")
        .unwrap()
        .arg("reindex")
        .assert()
        .failure();
}
