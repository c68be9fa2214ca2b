use automata_kernel::config::load_config;
use automata_kernel::domain::config::AppSettings;
use automata_kernel::error::KernelError;
use std::io::Write;

#[test]
fn file_values_override_defaults() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(
        file,
        "debug = false\ndisable_cache = \"false\"\n\n[server]\nport = 9100\n\n[window]\nsize = [800, 600]"
    )
    .unwrap();

    let settings: AppSettings = load_config(Some(file.path())).unwrap();
    assert!(!settings.debug);
    assert!(!settings.disable_cache);
    assert_eq!(settings.server.port, 9100);
    assert_eq!(settings.server.host, "localhost");
    assert_eq!(settings.window.size, (800, 600));
    assert_eq!(settings.app.name, "Automata");
}

#[test]
fn explicit_missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = load_config::<AppSettings>(Some(dir.path().join("absent.toml")));
    assert!(matches!(result, Err(KernelError::Config { .. })));
}
