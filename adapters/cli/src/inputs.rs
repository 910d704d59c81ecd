use std::{fs, path::Path};

use anyhow::{Context, Result};
use traverse_core::RepairPlan;
use traverse_level::{Level, LevelDocument};
use traverse_system_repair::serialize_plan;

/// Level document together with the grid built from it.
#[derive(Clone, Debug)]
pub(crate) struct LoadedLevel {
    /// Parsed document, kept for objectives and stage targets.
    pub document: LevelDocument,
    /// Grid ready for validation.
    pub level: Level,
}

/// Reads and parses the level document at `path`.
pub(crate) fn load_level(path: &Path) -> Result<LoadedLevel> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read level document at {}", path.display()))?;
    let document = LevelDocument::from_json(&text)
        .with_context(|| format!("failed to parse level document {}", path.display()))?;
    let level = Level::from_document(&document)
        .with_context(|| format!("level document {} is not a valid grid", path.display()))?;
    Ok(LoadedLevel { document, level })
}

/// Reads and parses the repair plan at `path`.
pub(crate) fn load_repairs(path: &Path) -> Result<RepairPlan> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read repair plan at {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("failed to parse repair plan {}", path.display()))
}

/// Writes the plan as sorted, pretty JSON.
pub(crate) fn save_repairs(path: &Path, plan: &RepairPlan) -> Result<()> {
    let text = serialize_plan(plan).context("failed to serialise repair plan")?;
    fs::write(path, text + "\n")
        .with_context(|| format!("failed to write repair plan to {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::{load_level, load_repairs, save_repairs};
    use std::{env, fs, path::PathBuf, process};
    use traverse_core::{RepairPlan, TileCoord};

    fn scratch(name: &str) -> PathBuf {
        env::temp_dir().join(format!("traverse-cli-{}-{name}", process::id()))
    }

    #[test]
    fn missing_level_names_the_path() {
        let path = scratch("absent.json");
        let error = load_level(&path).expect_err("missing file fails");

        assert!(format!("{error:#}").contains("failed to read level document"));
    }

    #[test]
    fn ragged_level_is_rejected() {
        let path = scratch("ragged.json");
        fs::write(&path, r###"{ "tiles": ["...", "##"] }"###).expect("fixture written");

        let error = load_level(&path).expect_err("ragged grid fails");
        let _ = fs::remove_file(&path);

        assert!(format!("{error:#}").contains("is not a valid grid"));
    }

    #[test]
    fn saved_plan_loads_back() {
        let path = scratch("plan.json");
        let plan = RepairPlan {
            enabled: true,
            spawn_override: Some(TileCoord::new(2, 5)),
            ..RepairPlan::default()
        };

        save_repairs(&path, &plan).expect("plan saved");
        let restored = load_repairs(&path).expect("plan loads");
        let _ = fs::remove_file(&path);

        assert_eq!(restored, plan);
    }
}
