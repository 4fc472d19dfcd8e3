use isleweave_catalog::{Catalog, Group, Tile};
use isleweave_core::{ConnectionMask, Direction, GridSpec, GroupId, TileId};
use isleweave_system_analytics::LayoutReport;
use isleweave_system_generation::{seeded_rng, CellGraphGenerator, Generation, GenerationOptions};

fn catalog_with(tiles: Vec<Tile>) -> Catalog {
    Catalog::new(vec![Group::new(
        GroupId::new(4),
        "lagoon",
        (0, 100),
        1.0,
        tiles,
    )])
    .expect("catalog")
}

fn full_shapes() -> Vec<Tile> {
    use Direction::{East, North, South};
    vec![
        Tile::new(TileId::new(0), "dead_end", North.to_mask()),
        Tile::new(TileId::new(1), "straight", North.to_mask().with(South)),
        Tile::new(TileId::new(2), "corner", North.to_mask().with(East)),
        Tile::new(TileId::new(3), "tee", North.to_mask().with(East).with(South)),
        Tile::new(TileId::new(4), "crossroads", ConnectionMask::ALL),
    ]
}

fn generate(catalog: &Catalog, options: GenerationOptions, seed: u64) -> Generation {
    CellGraphGenerator::new(catalog, options)
        .generate(&mut seeded_rng(seed))
        .expect("valid options")
}

#[test]
fn two_lane_layout_report() {
    let catalog = catalog_with(full_shapes());
    let generation = generate(
        &catalog,
        GenerationOptions {
            grid: GridSpec::with_radius(12),
            target_cells: 5,
            starting_forks: 2,
            fork_weights: [0.0, 1.0, 0.0, 0.0],
        },
        31,
    );

    let report = LayoutReport::from_generation(&generation);
    assert_eq!(report.requested, 5);
    assert_eq!(report.created, 5);
    assert_eq!(report.resolved, 5);
    assert_eq!(report.dropped, 0);
    assert_eq!(report.deepest_level, 2);
    assert_eq!(report.dead_ends, 2, "each lane ends in one dead end");
    assert_eq!(report.branch_points, 0);
    assert_eq!(report.cells_per_group.get(&GroupId::new(4)), Some(&5));
    assert_eq!(report.reachable_from_origin, 5);
    assert_eq!(report.dangling_bridges, 0);
    assert!(report.reached_target);
    assert!((report.resolution_rate() - 1.0).abs() < f64::EPSILON);
}

#[test]
fn unmatched_shapes_are_attributed_to_missing_variants() {
    let catalog = catalog_with(vec![
        Tile::new(TileId::new(0), "straight", Direction::North.to_mask().with(Direction::South)),
        Tile::new(TileId::new(1), "corner", Direction::North.to_mask().with(Direction::East)),
    ]);
    let generation = generate(
        &catalog,
        GenerationOptions {
            target_cells: 60,
            ..GenerationOptions::default()
        },
        8,
    );

    let report = LayoutReport::from_generation(&generation);
    assert!(report.dropped > 0, "dead ends always fail to match");
    assert_eq!(report.drops.no_matching_variant, report.dropped);
    assert_eq!(report.drops.no_eligible_group, 0);
    assert_eq!(report.dead_ends, 0, "no single-connection tile exists");
    assert!(report.reachable_from_origin <= report.resolved);
    assert!(report.resolution_rate() < 1.0);
}

#[test]
fn report_totals_agree_across_seeds() {
    let catalog = Catalog::standard();
    for seed in 0..20 {
        let generation = generate(
            &catalog,
            GenerationOptions {
                target_cells: 10 + seed as u32 * 3,
                ..GenerationOptions::default()
            },
            seed,
        );
        let report = LayoutReport::from_generation(&generation);

        assert_eq!(report.resolved + report.dropped, report.created);
        assert_eq!(report.drops.total(), report.dropped);
        assert_eq!(report.cells_per_group.values().sum::<u32>(), report.resolved);
        assert!(report.dead_ends + report.branch_points <= report.resolved);
        assert!(report.reachable_from_origin <= report.resolved);
        assert_eq!(report.resolved as usize, generation.layout().len());

        let max_level = generation
            .cells()
            .iter()
            .map(|cell| cell.level)
            .max()
            .unwrap_or_default();
        assert_eq!(report.deepest_level, max_level);
    }
}

#[test]
fn report_serializes_as_json() {
    let generation = generate(&Catalog::standard(), GenerationOptions::default(), 99);
    let report = LayoutReport::from_generation(&generation);

    let json = serde_json::to_string(&report).expect("serialize");
    assert!(json.contains("\"cells_per_group\""));
    let decoded: LayoutReport = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(decoded, report);
}
