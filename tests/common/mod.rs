#![allow(dead_code)]

use std::fs;
use std::path::Path;

use tempfile::TempDir;

/// A throwaway game install with `Parts/` and `Ships/` directories.
pub struct Install {
    pub dir: TempDir,
}

impl Install {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp install");
        fs::create_dir_all(dir.path().join("Parts")).expect("create Parts");
        fs::create_dir_all(dir.path().join("Ships")).expect("create Ships");
        Self { dir }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Write `Parts/<dir>/part.cfg`.
    pub fn add_part_file(&self, dir: &str, contents: &str) -> &Self {
        let part_dir = self.root().join("Parts").join(dir);
        fs::create_dir_all(&part_dir).expect("create part dir");
        fs::write(part_dir.join("part.cfg"), contents).expect("write part.cfg");
        self
    }

    pub fn add_part(&self, name: &str, module: &str, mass: f64, extra: &str) -> &Self {
        self.add_part_file(
            name,
            &format!(
                "// {name}\nname = {name}\nmodule = {module}\nauthor = Squad\nmass = {mass}\n{extra}"
            ),
        )
    }

    /// Write `Ships/<file>`.
    pub fn add_craft(&self, file: &str, contents: &str) -> &Self {
        let path = self.root().join("Ships").join(file);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create ships subdir");
        }
        fs::write(path, contents).expect("write craft");
        self
    }

    /// A small stock-like part set.
    pub fn with_stock_parts(self) -> Self {
        self.add_part("commandPod", "CommandPod", 0.8, "")
            .add_part("fuelTank", "FuelTank", 1.25, "dryMass = 0.25\nfuel = 400\n")
            .add_part("decoupler", "Decoupler", 0.05, "ejectionForce = 15\n")
            .add_part("liquidEngine", "LiquidEngine", 1.25, "maxThrust = 215\nminThrust = 0\n")
            .add_part("solidBooster", "SolidRocket", 0.36, "thrust = 250\ndryMass = 0.06\n");
        self
    }
}

pub fn part_block(id: &str, istg: u32, dstg: u32) -> String {
    format!("{{\npart = {id}\npos = 0,0,0\nrot = 0,0,0,1\nistg = {istg}\ndstg = {dstg}\nsidx = 0\nsqor = {istg}\nattm = 0\n}}\n")
}

pub fn craft(name: &str, blocks: &[String]) -> String {
    format!("ship = {name}\nversion = 0.14.2\n{}", blocks.concat())
}
