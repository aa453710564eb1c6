//! Building FEA Example - two-level building on piles

use anyhow::Context;
use building_fea::prelude::*;

fn demo_building() -> BuildingInput {
    //   Top  (z = 12) ---------------------------
    //          |                |               |
    //        columns on a 12 ft grid
    //          |                |               |
    //   Mat  (z = 0)  ---------------------------
    //          piles under every column
    let mut building = BuildingInput {
        levels: vec![
            SlabLevel::rectangle("Mat", 0.0, 0.0, 24.0, 24.0, 0.0, 2.0),
            SlabLevel::rectangle("Top", 0.0, 0.0, 24.0, 24.0, 12.0, 0.75),
        ],
        ..Default::default()
    };

    for x in [1.0, 12.0, 23.0] {
        for y in [1.0, 12.0, 23.0] {
            building.columns.push(ColumnSpec::square(x, y, 0.0, 12.0, 1.5));
            building.piles.push(PileSpec::new(x, y, 0.0, -40.0, 2.0));
        }
    }
    building
        .beams
        .push(BeamSpec::new([1.0, 12.0, 12.0], [23.0, 12.0, 12.0], 1.0, 2.0));
    building
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    println!("=== Building FEA Example: two-level building ===\n");

    let options = AnalysisOptions::default();
    let model = StructuralModel::from_building(&demo_building(), &options)
        .context("failed to mesh the demo building")?;

    println!("Mesh:");
    println!("  Nodes:    {}", model.nodes.len());
    println!("  Shells:   {}", model.count(ElementKind::Shell));
    println!("  Columns:  {}", model.count(ElementKind::Column));
    println!("  Piles:    {}", model.count(ElementKind::Pile));
    println!("  Beams:    {}", model.count(ElementKind::Beam));
    println!("  Links:    {}", model.count(ElementKind::Link));
    for level in &model.levels {
        println!(
            "  Level {:<5} z={:>5.1}  {} nodes, {} quads, {} triangles",
            level.name,
            level.elevation,
            level.nodes.len(),
            level.quads,
            level.triangles
        );
    }

    // Lateral load spread over the top slab
    let top = model
        .levels
        .iter()
        .find(|l| l.name == "Top")
        .context("demo building has no top level")?;
    let per_node = 50.0 / top.nodes.len().max(1) as f64;
    let mut seismic = LoadCase::new("Seismic X");
    for &node in &top.nodes {
        seismic.add_load(NodeLoad::force(node, per_node, 0.0, 0.0));
    }

    let dead = model.self_weight(&options, "Dead");
    let combo = LoadCombination::new("0.9D + E")
        .with_case("Dead", 0.9)
        .with_case("Seismic X", 1.0);
    let combined = combo.combine(&[dead.clone(), seismic.clone()])?;

    let results = model.analyze(&[dead, seismic, combined], &options)?;

    for (name, result) in &results {
        let summary = &result.summary;
        println!("\n=== {} ({:?}) ===", name, result.status);
        println!(
            "  Max displacement: {:.4e} at node {:?}",
            summary.max_displacement, summary.max_displacement_node
        );
        println!(
            "  Max axial force:  {:.3} in element {:?}",
            summary.max_axial, summary.max_axial_element
        );
        println!(
            "  Max moment:       {:.3} in element {:?}",
            summary.max_moment, summary.max_moment_element
        );
        for drift in result.drifts_in_order() {
            println!(
                "  Story {} ({:.1} -> {:.1}): drift {:.6} {}",
                drift.story,
                drift.lower_elevation,
                drift.upper_elevation,
                drift.drift_ratio,
                if drift.passes { "OK" } else { "EXCEEDS LIMIT" }
            );
        }
    }

    println!("\n=== Analysis Complete ===");
    Ok(())
}
