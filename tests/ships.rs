mod common;

use kspace::{Error, GameConfig, Part, PartCatalog, PartModule, Ship};

use common::{Install, craft, part_block};

fn two_stage_rocket() -> String {
    craft(
        "Kerbal Hopper",
        &[
            part_block("commandPod_4293385398", 0, 0),
            part_block("liquidEngine_4293374216", 1, 0),
            part_block("decoupler_4293360770", 1, 1),
            part_block("fuelTank_4293372840", 2, 1),
            part_block("liquidEngine_4293351124", 2, 1),
        ],
    )
}

#[test]
fn loads_ships_in_file_order() {
    let install = Install::new().with_stock_parts();
    install
        .add_craft("b_hopper.craft", &two_stage_rocket())
        .add_craft(
            "a_booster.craft",
            &craft("Booster", &[part_block("solidBooster_1", 0, 0)]),
        )
        .add_craft("notes.txt", "not a craft");
    let config = GameConfig::new(install.root()).unwrap();
    let catalog = PartCatalog::load_all(&config).unwrap();

    let ships = Ship::load_all(&config, &catalog).expect("ships load");
    let names: Vec<&str> = ships.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["Booster", "Kerbal Hopper"]);
    assert_eq!(ships[1].parts().len(), 5);
    assert_eq!(ships[1].version.as_deref(), Some("0.14.2"));
}

#[test]
fn ships_in_editor_subdirectories_are_found() {
    let install = Install::new().with_stock_parts();
    install.add_craft("VAB/hopper.craft", &two_stage_rocket());
    let config = GameConfig::new(install.root()).unwrap();
    let catalog = PartCatalog::load_all(&config).unwrap();

    let ships = Ship::load_all(&config, &catalog).unwrap();
    assert_eq!(ships.len(), 1);
}

#[test]
fn stage_mass_and_thrust_for_a_two_stage_rocket() {
    let install = Install::new().with_stock_parts();
    install.add_craft("hopper.craft", &two_stage_rocket());
    let config = GameConfig::new(install.root()).unwrap();
    let catalog = PartCatalog::load_all(&config).unwrap();
    let ships = Ship::load_all(&config, &catalog).unwrap();
    let ship = &ships[0];

    assert_eq!(ship.stage_count(), 3);
    let launch = ship.launch_stage().unwrap();
    assert_eq!(launch.game_stage(), 2);
    // tank + lower engine
    assert!((launch.mass() - 2.5).abs() < 1e-9);
    assert!((launch.dry_mass() - 1.5).abs() < 1e-9);
    // plus decoupler, upper engine and pod
    assert!((launch.vehicle_mass() - 4.6).abs() < 1e-9);

    let thrusters: Vec<&str> = launch
        .available_thrusters()
        .iter()
        .map(|p| p.instance_id.as_str())
        .collect();
    assert_eq!(thrusters, vec!["liquidEngine_4293351124"]);
    assert_eq!(launch.available_thrust(), 215.0);

    let upper = ship.stage(1).unwrap();
    assert_eq!(upper.game_stage(), 1);
    assert!((upper.mass() - 1.3).abs() < 1e-9);
    let detached: Vec<&str> = upper.detached().map(|p| p.instance_id.as_str()).collect();
    assert_eq!(
        detached,
        vec!["decoupler_4293360770", "fuelTank_4293372840", "liquidEngine_4293351124"]
    );
    let thrusters: Vec<&str> = upper
        .available_thrusters()
        .iter()
        .map(|p| p.instance_id.as_str())
        .collect();
    assert_eq!(thrusters, vec!["liquidEngine_4293374216"]);

    let last = ship.stage(2).unwrap();
    assert!(last.available_thrusters().is_empty());
}

#[test]
fn empty_stage_has_zero_mass() {
    let catalog = PartCatalog::from_parts([Part::new("commandPod", PartModule::CommandPod)]);
    let craft_file = kspace::CraftFile::parse(
        std::path::Path::new("gap.craft"),
        &craft("Gap", &[part_block("commandPod_1", 0, 1)]),
    )
    .unwrap();
    let ship = Ship::from_craft(craft_file, &catalog).unwrap();

    let launch = ship.launch_stage().unwrap();
    assert_eq!(launch.parts().count(), 0);
    assert_eq!(launch.mass(), 0.0);
}

#[test]
fn stage_mass_sums_catalog_masses() {
    let parts = [("partA", 1.0), ("partB", 2.5), ("partC", 3.0)].map(|(name, mass)| {
        let mut part = Part::new(name, PartModule::FuelTank);
        part.mass = mass;
        part
    });
    let catalog = PartCatalog::from_parts(parts);
    let craft_file = kspace::CraftFile::parse(
        std::path::Path::new("sum.craft"),
        &craft(
            "Sum",
            &[
                part_block("partA_1", 0, 0),
                part_block("partB_2", 0, 0),
                part_block("partC_3", 0, 0),
            ],
        ),
    )
    .unwrap();
    let ship = Ship::from_craft(craft_file, &catalog).unwrap();

    assert_eq!(ship.stage_count(), 1);
    assert_eq!(ship.launch_stage().unwrap().mass(), 6.5);
}

#[test]
fn later_stage_thrusters_are_not_available_yet() {
    let mut first = Part::new("firstEngine", PartModule::LiquidEngine);
    first.max_thrust = Some(100.0);
    let mut second = Part::new("secondEngine", PartModule::SolidRocket);
    second.solid_thrust = Some(50.0);
    let catalog = PartCatalog::from_parts([first, second, Part::new("fuelTank", PartModule::FuelTank)]);

    // game stage 1 fires first, so it is activation index 0
    let craft_file = kspace::CraftFile::parse(
        std::path::Path::new("pair.craft"),
        &craft(
            "Pair",
            &[
                part_block("firstEngine_1", 1, 0),
                part_block("fuelTank_2", 1, 0),
                part_block("secondEngine_3", 0, 0),
            ],
        ),
    )
    .unwrap();
    let ship = Ship::from_craft(craft_file, &catalog).unwrap();

    let current = ship.stage(0).unwrap();
    let thrusters = current.available_thrusters();
    assert_eq!(thrusters.len(), 1);
    assert_eq!(thrusters[0].part.name, "firstEngine");
}

#[test]
fn unknown_part_fails_the_ship_load() {
    let install = Install::new().with_stock_parts();
    install
        .add_craft("good.craft", &two_stage_rocket())
        .add_craft(
            "mystery.craft",
            &craft("Mystery", &[part_block("commandPod_1", 0, 0), part_block("warpDrive_2", 0, 0)]),
        );
    let config = GameConfig::new(install.root()).unwrap();
    let catalog = PartCatalog::load_all(&config).unwrap();

    match Ship::load_all(&config, &catalog) {
        Err(Error::UnresolvedReference { path, part }) => {
            assert_eq!(part, "warpDrive");
            assert!(path.ends_with("mystery.craft"));
        }
        other => panic!("unexpected result: {:?}", other.map(|s| s.len())),
    }
}

#[test]
fn ships_require_a_loaded_catalog() {
    let install = Install::new().with_stock_parts();
    install.add_craft("hopper.craft", &two_stage_rocket());
    let config = GameConfig::new(install.root()).unwrap();

    let catalog = PartCatalog::default();
    assert!(matches!(
        Ship::load_all(&config, &catalog),
        Err(Error::CatalogNotLoaded)
    ));
}

#[test]
fn missing_ships_directory_is_a_configuration_error() {
    let install = Install::new().with_stock_parts();
    std::fs::remove_dir(install.root().join("Ships")).unwrap();
    let config = GameConfig::new(install.root()).unwrap();
    let catalog = PartCatalog::load_all(&config).unwrap();

    assert!(matches!(
        Ship::load_all(&config, &catalog),
        Err(Error::Configuration { .. })
    ));
}
