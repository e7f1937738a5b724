//! End-to-end conversion runs over temporary directories

use std::fs;
use std::path::Path;

use keyvert::{execute, NamingMode, PairError, RunConfig, RunError};
use keyvert_keystore::{
    preprocess, KdfFunction, KdfParams, Keystore, KeystoreBuilder, KeystoreError, RecryptOptions,
};
use secrecy::ExposeSecret;
use tempfile::TempDir;

const SECRET: [u8; 32] = [0x11; 32];
const PASSWORD: &str = "e2e-test-password\n";
const PUBKEY: &str = "8b17b1964fdfa87e8f172b09abf0a1dcf256e1137b7c43a2f2b4c3b54fcd639e7a054da77e3667c02c5dc5112c969fdc";

fn test_options() -> RecryptOptions {
    RecryptOptions {
        kdf: KdfFunction::Pbkdf2,
        pbkdf2_count: 2,
        scrypt_n: 2,
        scrypt_r: 8,
        scrypt_p: 1,
    }
}

fn make_keystore_json(password: &str) -> Vec<u8> {
    let processed = preprocess(password.as_bytes()).unwrap();
    KeystoreBuilder::new(&SECRET, processed.as_bytes())
        .params(KdfParams::Pbkdf2 {
            dklen: 32,
            c: 4,
            salt: vec![0xAB; 32],
        })
        .pubkey(PUBKEY)
        .path("m/12381/3600/0/0/0")
        .description("fixture")
        .build()
        .unwrap()
        .to_json()
        .unwrap()
}

fn config(src: &Path, dest: &Path, passwords: &Path, mode: NamingMode) -> RunConfig {
    RunConfig {
        src: src.to_path_buf(),
        dest: dest.to_path_buf(),
        password_dir: passwords.to_path_buf(),
        mode,
        options: test_options(),
    }
}

fn assert_output_decrypts(path: &Path) {
    let bytes = fs::read(path).unwrap();
    let keystore = Keystore::from_json(&bytes).unwrap();
    assert_eq!(keystore.pubkey, PUBKEY);

    let processed = preprocess(PASSWORD.as_bytes()).unwrap();
    let secret = keystore.decrypt(processed.as_bytes()).unwrap();
    assert_eq!(secret.expose_secret().as_slice(), &SECRET);
}

#[test]
fn web3signer_single_pair() {
    let src = TempDir::new().unwrap();
    let passwords = TempDir::new().unwrap();
    let dest = TempDir::new().unwrap();

    fs::write(src.path().join("0xabc.json"), make_keystore_json(PASSWORD)).unwrap();
    fs::write(passwords.path().join("0xabc.txt"), PASSWORD).unwrap();

    let summary = execute(&config(
        src.path(),
        dest.path(),
        passwords.path(),
        NamingMode::Web3signer,
    ))
    .unwrap();

    assert!(summary.is_success());
    assert_eq!(summary.converted, 1);
    assert_output_decrypts(&dest.path().join("0xabc.json"));
}

#[test]
fn nimbus_single_pair() {
    let src = TempDir::new().unwrap();
    let passwords = TempDir::new().unwrap();
    let dest = TempDir::new().unwrap();

    fs::create_dir(src.path().join("0xabc")).unwrap();
    fs::write(
        src.path().join("0xabc").join("keystore.json"),
        make_keystore_json(PASSWORD),
    )
    .unwrap();
    fs::write(passwords.path().join("0xabc"), PASSWORD).unwrap();

    let summary = execute(&config(
        src.path(),
        dest.path(),
        passwords.path(),
        NamingMode::Nimbus,
    ))
    .unwrap();

    assert!(summary.is_success());
    assert_eq!(summary.converted, 1);
    assert_output_decrypts(&dest.path().join("0xabc").join("keystore.json"));
}

#[test]
fn bad_password_fails_pair_without_output_and_others_continue() {
    let src = TempDir::new().unwrap();
    let passwords = TempDir::new().unwrap();
    let dest = TempDir::new().unwrap();

    fs::write(src.path().join("bad.json"), make_keystore_json(PASSWORD)).unwrap();
    fs::write(passwords.path().join("bad.txt"), "wrong-password\n").unwrap();
    fs::write(src.path().join("good.json"), make_keystore_json(PASSWORD)).unwrap();
    fs::write(passwords.path().join("good.txt"), PASSWORD).unwrap();

    let summary = execute(&config(
        src.path(),
        dest.path(),
        passwords.path(),
        NamingMode::Web3signer,
    ))
    .unwrap();

    assert!(!summary.is_success());
    assert_eq!(summary.converted, 1);
    assert_eq!(summary.failed.len(), 1);
    assert_eq!(summary.failed[0].0, "bad");
    assert!(matches!(
        summary.failed[0].1,
        PairError::Keystore(KeystoreError::InvalidPassword)
    ));

    assert!(!dest.path().join("bad.json").exists());
    assert_output_decrypts(&dest.path().join("good.json"));
}

#[test]
fn empty_source_directory_is_success_with_zero_records() {
    let src = TempDir::new().unwrap();
    let passwords = TempDir::new().unwrap();
    let dest = TempDir::new().unwrap();

    let summary = execute(&config(
        src.path(),
        dest.path(),
        passwords.path(),
        NamingMode::Web3signer,
    ))
    .unwrap();

    assert!(summary.is_success());
    assert_eq!(summary.converted, 0);
}

#[test]
fn missing_password_file_fails_that_pair() {
    let src = TempDir::new().unwrap();
    let passwords = TempDir::new().unwrap();
    let dest = TempDir::new().unwrap();

    fs::write(src.path().join("0xabc.json"), make_keystore_json(PASSWORD)).unwrap();

    let summary = execute(&config(
        src.path(),
        dest.path(),
        passwords.path(),
        NamingMode::Web3signer,
    ))
    .unwrap();

    assert_eq!(summary.failed.len(), 1);
    assert!(matches!(
        summary.failed[0].1,
        PairError::MissingPasswordFile(_)
    ));
}

#[test]
fn nimbus_directory_without_keystore_fails_that_pair() {
    let src = TempDir::new().unwrap();
    let passwords = TempDir::new().unwrap();
    let dest = TempDir::new().unwrap();

    fs::create_dir(src.path().join("0xabc")).unwrap();
    fs::write(passwords.path().join("0xabc"), PASSWORD).unwrap();

    let summary = execute(&config(
        src.path(),
        dest.path(),
        passwords.path(),
        NamingMode::Nimbus,
    ))
    .unwrap();

    assert_eq!(summary.failed.len(), 1);
    assert!(matches!(
        summary.failed[0].1,
        PairError::MissingKeystoreFile(_)
    ));
}

#[test]
fn invalid_source_directory_aborts_the_run() {
    let passwords = TempDir::new().unwrap();
    let dest = TempDir::new().unwrap();

    let result = execute(&config(
        Path::new("/nonexistent/source"),
        dest.path(),
        passwords.path(),
        NamingMode::Web3signer,
    ));

    assert!(matches!(
        result,
        Err(RunError::InvalidSourceDirectory { .. })
    ));
}

#[test]
fn unusable_output_kdf_settings_abort_the_run() {
    let src = TempDir::new().unwrap();
    let passwords = TempDir::new().unwrap();
    let dest = TempDir::new().unwrap();

    let mut cfg = config(
        src.path(),
        dest.path(),
        passwords.path(),
        NamingMode::Web3signer,
    );
    cfg.options.pbkdf2_count = 0;

    assert!(matches!(
        execute(&cfg),
        Err(RunError::InvalidOutputParams(_))
    ));
}

#[test]
fn scrypt_run_writes_scrypt_envelopes() {
    let src = TempDir::new().unwrap();
    let passwords = TempDir::new().unwrap();
    let dest = TempDir::new().unwrap();

    fs::write(src.path().join("0xabc.json"), make_keystore_json(PASSWORD)).unwrap();
    fs::write(passwords.path().join("0xabc.txt"), PASSWORD).unwrap();

    let mut cfg = config(
        src.path(),
        dest.path(),
        passwords.path(),
        NamingMode::Web3signer,
    );
    cfg.options.kdf = KdfFunction::Scrypt;
    cfg.options.scrypt_n = 4;

    let summary = execute(&cfg).unwrap();
    assert!(summary.is_success());

    let bytes = fs::read(dest.path().join("0xabc.json")).unwrap();
    let keystore = Keystore::from_json(&bytes).unwrap();
    assert!(matches!(
        keystore.crypto.kdf.params,
        KdfParams::Scrypt { n: 4, .. }
    ));
}

#[test]
#[cfg(unix)]
fn output_files_are_owner_only() {
    use std::os::unix::fs::PermissionsExt;

    let src = TempDir::new().unwrap();
    let passwords = TempDir::new().unwrap();
    let dest = TempDir::new().unwrap();

    fs::write(src.path().join("0xabc.json"), make_keystore_json(PASSWORD)).unwrap();
    fs::write(passwords.path().join("0xabc.txt"), PASSWORD).unwrap();

    execute(&config(
        src.path(),
        dest.path(),
        passwords.path(),
        NamingMode::Web3signer,
    ))
    .unwrap();

    let mode = fs::metadata(dest.path().join("0xabc.json"))
        .unwrap()
        .permissions()
        .mode();
    assert_eq!(mode & 0o777, 0o600);
}
