mod common;

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

use common::{Install, craft, part_block};

fn cli(install: &Install) -> Command {
    let mut cmd = cargo_bin_cmd!("kspace");
    cmd.env("RUST_LOG", "error")
        .env_remove("KSP_GAME_PATH")
        .arg("--game-path")
        .arg(install.root());
    cmd
}

fn install_with_hopper() -> Install {
    let install = Install::new().with_stock_parts();
    install.add_craft(
        "hopper.craft",
        &craft(
            "Hopper",
            &[
                part_block("commandPod_1", 0, 0),
                part_block("fuelTank_2", 1, 0),
                part_block("liquidEngine_3", 1, 0),
            ],
        ),
    );
    install
}

#[test]
fn lists_parts() {
    let install = install_with_hopper();
    cli(&install)
        .arg("parts")
        .assert()
        .success()
        .stdout(predicate::str::contains("liquidEngine"))
        .stdout(predicate::str::contains("LiquidEngine"))
        .stdout(predicate::str::contains("215.0"));
}

#[test]
fn lists_ships_with_stage_counts() {
    let install = install_with_hopper();
    cli(&install)
        .arg("ships")
        .assert()
        .success()
        .stdout(predicate::str::contains("Hopper (3 parts, 2 stages)"));
}

#[test]
fn prints_stage_breakdown() {
    let install = install_with_hopper();
    cli(&install)
        .args(["ship", "Hopper"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Engines: 1"))
        .stdout(predicate::str::contains("stage 1 (fires #1): mass 2.500, vehicle mass 3.300"))
        .stdout(predicate::str::contains("<liquidEngine: liquidEngine_3> (215.0 total)"));
}

#[test]
fn unknown_ship_fails() {
    let install = install_with_hopper();
    cli(&install)
        .args(["ship", "Nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("ship 'Nope' not found"));
}

#[test]
fn missing_game_path_fails() {
    let dir = tempfile::tempdir().unwrap();
    let mut cmd = cargo_bin_cmd!("kspace");
    cmd.env_remove("KSP_GAME_PATH")
        .arg("--game-path")
        .arg(dir.path().join("KSP_win"))
        .arg("parts")
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid game path"));
}

#[test]
fn unset_game_path_fails() {
    let mut cmd = cargo_bin_cmd!("kspace");
    cmd.env_remove("KSP_GAME_PATH")
        .arg("parts")
        .assert()
        .failure()
        .stderr(predicate::str::contains("game path not set"));
}
