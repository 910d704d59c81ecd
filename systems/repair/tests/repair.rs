use traverse_core::{
    AbilityState, AbilityTable, MovementConstants, ObjectiveTarget, PlayerStats, RepairPlan,
    StageReport, Status, TileCoord, TileGrid,
};
use traverse_level::{Level, LevelEvent};
use traverse_system_feasibility::FeasibilityValidator;
use traverse_system_repair::{AutoRepair, RepairSubject, RepairTarget, DEFAULT_MAX_ATTEMPTS};

fn plan(json: &str) -> RepairPlan {
    serde_json::from_str(json).expect("plan parses")
}

fn validate(subject: &RepairSubject<'_>, target: TileCoord) -> StageReport {
    let player = PlayerStats::default();
    let validator = FeasibilityValidator::for_level(subject.level(), subject.constants(), &player);
    validator.run_single_stage(
        AbilityState::none(),
        &[ObjectiveTarget::new("exit", target)],
        "base",
    )
}

fn walled_level() -> Level {
    Level::from_rows(&["..#.........", "############"], 32.0, AbilityTable::classic())
        .expect("level builds")
}

#[test]
fn tile_patch_fix_opens_the_wall() {
    let mut level = walled_level();
    let mut constants = MovementConstants::default();
    let mut subject = RepairSubject::new(&mut level, &mut constants);
    let mut repair = AutoRepair::new(plan(
        r##"{
            "tilePatches": [{ "id": "open-wall", "changes": [{ "x": 2, "y": 0, "value": "." }] }],
            "autoFixes": [{ "id": "fix-wall", "type": "tilePatch", "ref": "open-wall" }]
        }"##,
    ));
    let mut calls = 0;

    let report = repair.run_repair_loop(&mut subject, DEFAULT_MAX_ATTEMPTS, |subject| {
        calls += 1;
        validate(subject, TileCoord::new(10, 0))
    });

    assert_eq!(calls, 2);
    assert_eq!(report.status, Status::Pass);
    assert!(!report.hard_fail);
    assert_eq!(
        report.lines,
        vec![
            "✓ exit feasible".to_owned(),
            "↺ Patch applied: open-wall".to_owned(),
        ]
    );
    assert_eq!(
        report.applied_fixes,
        vec!["open-wall".to_owned(), "fix-wall".to_owned()]
    );
    assert_eq!(subject.level().glyph(TileCoord::new(2, 0)), '.');
    assert!(subject.events().contains(&LevelEvent::CachesRebuilt));
}

#[test]
fn movement_tweak_fix_raises_the_jump() {
    let mut level = Level::from_rows(
        &["......", "....##", "......", "......", "......", "######"],
        32.0,
        AbilityTable::classic(),
    )
    .expect("level builds");
    let mut constants = MovementConstants::default();
    let mut subject = RepairSubject::new(&mut level, &mut constants);
    let target = TileCoord::new(5, 0);
    subject.move_spawn(TileCoord::new(0, 4));

    let before = validate(&subject, target);
    assert!(before
        .lines
        .contains(&"  Constraint: jump height too high".to_owned()));

    let mut repair = AutoRepair::new(plan(
        r#"{
            "autoFixes": [
                { "id": "higher-jump", "type": "movementTweaks", "values": { "baseJumpPower": 700, "unknown": 3 } }
            ]
        }"#,
    ));
    let report = repair.run_repair_loop(&mut subject, DEFAULT_MAX_ATTEMPTS, |subject| {
        validate(subject, target)
    });

    assert_eq!(report.status, Status::Pass);
    assert_eq!(report.applied_fixes, vec!["higher-jump".to_owned()]);
    assert_eq!(report.logs, vec!["Movement tweak: baseJumpPower -> 700".to_owned()]);
    assert_eq!(subject.constants().base_jump_power, 700.0);
}

#[test]
fn loop_stops_after_the_attempt_budget() {
    let mut level = walled_level();
    let mut constants = MovementConstants::default();
    let mut subject = RepairSubject::new(&mut level, &mut constants);
    let mut repair = AutoRepair::new(plan(
        r#"{
            "autoFixes": [
                { "id": "a", "type": "movementTweaks", "values": { "coyoteTime": 0.2 } },
                { "id": "b", "type": "movementTweaks", "values": { "coyoteTime": 0.3 } },
                { "id": "c", "type": "movementTweaks", "values": { "coyoteTime": 0.4 } },
                { "id": "d", "type": "movementTweaks", "values": { "coyoteTime": 0.5 } },
                { "id": "e", "type": "movementTweaks", "values": { "coyoteTime": 0.6 } }
            ]
        }"#,
    ));
    let mut calls = 0;

    let report = repair.run_repair_loop(&mut subject, 3, |subject| {
        calls += 1;
        validate(subject, TileCoord::new(10, 0))
    });

    assert_eq!(calls, 4);
    assert!(report.hard_fail);
    assert_eq!(report.status, Status::Fail);
    assert_eq!(
        report.applied_fixes,
        vec!["a".to_owned(), "b".to_owned(), "c".to_owned()]
    );
    let tail: Vec<&str> = report.lines.iter().rev().take(4).rev().map(String::as_str).collect();
    assert_eq!(
        tail,
        vec![
            "✗ Auto-repair exceeded attempts.",
            "↺ Movement tweak: coyoteTime -> 0.2",
            "↺ Movement tweak: coyoteTime -> 0.3",
            "↺ Movement tweak: coyoteTime -> 0.4",
        ]
    );
}

#[test]
fn duplicate_fix_ids_apply_once() {
    let mut level = walled_level();
    let mut constants = MovementConstants::default();
    let mut subject = RepairSubject::new(&mut level, &mut constants);
    let mut repair = AutoRepair::new(plan(
        r#"{
            "autoFixes": [
                { "id": "same", "type": "movementTweaks", "values": { "gravity": 1400 } },
                { "id": "same", "type": "movementTweaks", "values": { "gravity": 1300 } },
                { "id": "other", "type": "movementTweaks", "values": { "gravity": 1200 } }
            ]
        }"#,
    ));
    let mut calls = 0;

    let report = repair.run_repair_loop(&mut subject, 10, |subject| {
        calls += 1;
        validate(subject, TileCoord::new(10, 0))
    });

    assert_eq!(calls, 3);
    assert!(report.hard_fail);
    assert_eq!(report.applied_fixes, vec!["same".to_owned(), "other".to_owned()]);
    assert_eq!(subject.constants().gravity, 1200.0);
}

#[test]
fn missing_patch_reference_stops_the_loop() {
    let mut level = walled_level();
    let mut constants = MovementConstants::default();
    let mut subject = RepairSubject::new(&mut level, &mut constants);
    let mut repair = AutoRepair::new(plan(
        r#"{ "autoFixes": [{ "id": "dangling", "type": "tilePatch", "ref": "nowhere" }] }"#,
    ));
    let mut calls = 0;

    let report = repair.run_repair_loop(&mut subject, DEFAULT_MAX_ATTEMPTS, |subject| {
        calls += 1;
        validate(subject, TileCoord::new(10, 0))
    });

    assert_eq!(calls, 1);
    assert!(report.hard_fail);
    assert!(report.applied_fixes.is_empty());
    assert_eq!(
        report.lines.last().map(String::as_str),
        Some("✗ Auto-repair exceeded attempts.")
    );
}

#[test]
fn persistent_patches_apply_only_when_enabled() {
    let json = r##"{
        "enabled": ENABLED,
        "spawnOverride": { "tx": 3, "ty": 0 },
        "movementTweaks": { "gravity": 1400, "bogus": 1 },
        "tilePatches": [{ "id": "open-wall", "changes": [{ "x": 2, "y": 0, "value": "." }] }]
    }"##;

    let mut level = walled_level();
    let mut constants = MovementConstants::default();
    let mut subject = RepairSubject::new(&mut level, &mut constants);
    let mut disabled = AutoRepair::new(plan(&json.replace("ENABLED", "false")));
    disabled.apply_persistent_patches(&mut subject);
    assert!(!disabled.apply_spawn_override(&mut subject));
    assert!(disabled.logs().is_empty());
    assert_eq!(subject.level().glyph(TileCoord::new(2, 0)), '#');
    assert_eq!(subject.constants().gravity, 1500.0);

    let mut enabled = AutoRepair::new(plan(&json.replace("ENABLED", "true")));
    enabled.apply_persistent_patches(&mut subject);
    assert!(enabled.apply_spawn_override(&mut subject));
    assert_eq!(
        enabled.logs(),
        [
            "Movement tweak: gravity -> 1400".to_owned(),
            "Patch applied: open-wall".to_owned(),
            "Applied spawn override to 3,0.".to_owned(),
        ]
    );
    assert_eq!(enabled.applied(), ["open-wall".to_owned()]);
    assert_eq!(subject.level().glyph(TileCoord::new(2, 0)), '.');
    assert_eq!(subject.level().spawn_tile(), TileCoord::new(3, 0));
    assert_eq!(subject.constants().gravity, 1400.0);
}
