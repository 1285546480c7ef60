use super::*;

use std::{
    env,
    time::{SystemTime, UNIX_EPOCH},
};

fn temp_store(label: &str) -> (PathBuf, PreferenceStore) {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let root = env::temp_dir().join(format!("study_coach_prefs_{label}_{suffix}"));
    let store = PreferenceStore::new(root.join("nested").join("preferences.json"));
    (root, store)
}

#[test]
fn missing_file_loads_dark_theme() {
    let (_root, store) = temp_store("missing");
    assert_eq!(store.load(), Preferences { theme: Theme::Dark });
}

#[test]
fn save_then_load_persists_theme() {
    let (root, store) = temp_store("persist");

    store
        .save(&Preferences {
            theme: Theme::Light,
        })
        .expect("save");
    assert!(store.path().exists());
    assert_eq!(store.load().theme, Theme::Light);

    let raw = fs::read_to_string(store.path()).expect("read");
    assert!(raw.contains("\"light\""), "{raw}");

    fs::remove_dir_all(root).expect("cleanup");
}

#[test]
fn malformed_file_falls_back_to_defaults() {
    let (root, store) = temp_store("malformed");
    fs::create_dir_all(store.path().parent().expect("parent")).expect("dir");
    fs::write(store.path(), "{\"theme\": \"sepia\"}").expect("write");

    assert_eq!(store.load(), Preferences::default());

    fs::remove_dir_all(root).expect("cleanup");
}

#[test]
fn theme_toggles_and_parses() {
    assert_eq!(Theme::Dark.toggled(), Theme::Light);
    assert_eq!(Theme::Light.toggled(), Theme::Dark);
    assert_eq!(" Light ".parse::<Theme>().expect("parse"), Theme::Light);
    assert!(matches!(
        "sepia".parse::<Theme>(),
        Err(PreferenceError::UnknownTheme(_))
    ));
    assert_eq!(Theme::Dark.to_string(), "dark");
}
