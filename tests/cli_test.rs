use std::fs;
use std::process::{Command, Output};
use tempfile::TempDir;

fn run_command(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_bitacora"))
        .args(args)
        .env("RUST_LOG", "warn")
        .output()
        .expect("Failed to execute command")
}

#[test]
fn test_talks_command_lists_bundled_talks() {
    let output = run_command(&["talks"]);
    assert!(output.status.success(), "Command failed: {:?}", output);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("01  "), "Unexpected output: {}", stdout);
}

#[test]
fn test_talks_command_reads_custom_dataset() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let data_path = temp_dir.path().join("charlas.json");
    fs::write(
        &data_path,
        r#"[{"titulo": "Solo una", "descripcion": "Única charla"}]"#,
    )
    .unwrap();

    let output = run_command(&["talks", "--data", data_path.to_str().unwrap()]);
    assert!(output.status.success(), "Command failed: {:?}", output);
    assert_eq!(String::from_utf8_lossy(&output.stdout), "01  Solo una\n");
}

#[test]
fn test_talks_command_fails_on_empty_dataset() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let data_path = temp_dir.path().join("empty.json");
    fs::write(&data_path, "[]").unwrap();

    let output = run_command(&["talks", "--data", data_path.to_str().unwrap()]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error: Failed to load talks:"), "Unexpected stderr: {}", stderr);
}

#[test]
fn test_list_images_command() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let folder = temp_dir.path().join("img").join("2");
    fs::create_dir_all(&folder).unwrap();
    fs::write(folder.join("photo.WEBP"), b"webp").unwrap();
    fs::write(folder.join("notes.txt"), b"text").unwrap();

    let public_dir = temp_dir.path().to_str().unwrap();
    let output = run_command(&["list-images", "2", "--public-dir", public_dir]);
    assert!(output.status.success(), "Command failed: {:?}", output);
    assert_eq!(String::from_utf8_lossy(&output.stdout), "/img/2/photo.WEBP\n");

    let output = run_command(&["list-images", "7", "--public-dir", public_dir]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("No images found"));
}

#[test]
fn test_list_images_remote_rejects_padded_folder() {
    // Nothing listens on port 9, so any request would fail the command
    let output = run_command(&["list-images", "03", "--remote", "http://127.0.0.1:9"]);
    assert!(output.status.success(), "Command failed: {:?}", output);
    assert!(String::from_utf8_lossy(&output.stdout).contains("No images found for folder 03"));

    let output = run_command(&["list-images", "3", "--remote", "http://127.0.0.1:9"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to list images from"));
}
