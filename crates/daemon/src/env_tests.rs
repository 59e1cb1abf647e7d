// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serial_test::serial;

fn clear() {
    std::env::remove_var("PATROL_STATE_DIR");
    std::env::remove_var("XDG_STATE_HOME");
    std::env::remove_var("PATROL_CONFIG");
}

#[test]
#[serial]
fn explicit_state_dir_wins() {
    clear();
    std::env::set_var("PATROL_STATE_DIR", "/tmp/patrol-a");
    std::env::set_var("XDG_STATE_HOME", "/tmp/xdg");
    assert_eq!(state_dir().unwrap(), PathBuf::from("/tmp/patrol-a"));
    clear();
}

#[test]
#[serial]
fn xdg_state_home_is_next() {
    clear();
    std::env::set_var("XDG_STATE_HOME", "/tmp/xdg");
    assert_eq!(state_dir().unwrap(), PathBuf::from("/tmp/xdg/patrol"));
    clear();
}

#[test]
#[serial]
fn home_is_the_fallback() {
    clear();
    let home = std::env::var("HOME").unwrap();
    assert_eq!(
        state_dir().unwrap(),
        PathBuf::from(home).join(".local/state/patrol")
    );
}

#[test]
#[serial]
fn config_path_from_env() {
    clear();
    assert_eq!(config_path(), None);
    std::env::set_var("PATROL_CONFIG", "/etc/patrol.toml");
    assert_eq!(config_path(), Some(PathBuf::from("/etc/patrol.toml")));
    clear();
}
