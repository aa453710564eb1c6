use approx::assert_relative_eq;
use building_fea::assembly;
use building_fea::prelude::*;

fn two_level_building() -> BuildingInput {
    let mut building = BuildingInput {
        levels: vec![
            SlabLevel::rectangle("Mat", 0.0, 0.0, 20.0, 20.0, 0.0, 2.0),
            SlabLevel::rectangle("Top", 0.0, 0.0, 20.0, 20.0, 12.0, 0.75),
        ],
        beams: vec![BeamSpec::new([1.0, 10.0, 12.0], [19.0, 10.0, 12.0], 1.0, 2.0)],
        ..Default::default()
    };
    for (x, y) in [(1.0, 1.0), (19.0, 1.0), (19.0, 19.0), (1.0, 19.0)] {
        building.columns.push(ColumnSpec::new(x, y, 0.0, 12.0, 1.5, 1.5));
        building.piles.push(PileSpec::new(x, y, 0.0, -30.0, 1.5));
    }
    building
}

fn lateral_case(model: &StructuralModel, name: &str) -> LoadCase {
    let top = model.levels.iter().find(|l| l.name == "Top").unwrap();
    let mut case = LoadCase::new(name);
    for &node in &top.nodes {
        case.add_load(NodeLoad::force(node, 0.5, 0.25, -1.0));
    }
    case
}

#[test]
fn cantilever_tip_deflection_matches_closed_form() {
    let length = 10.0;
    let load = 10.0;
    let section = FrameSection::rectangular(0.3, 0.5);
    let options = AnalysisOptions {
        regularization_factor: 0.0,
        ..AnalysisOptions::default()
    };

    let mut model = StructuralModel::new();
    let root = model.add_node(Node::new(0.0, 0.0, 0.0));
    let tip = model.add_node(Node::new(length, 0.0, 0.0));
    model
        .add_element(Element::Beam(FrameElement::new(root, tip, section)))
        .unwrap();
    model.add_support(root, Support::fixed()).unwrap();

    let case = LoadCase::new("Tip").with_load(NodeLoad::force(tip, 0.0, 0.0, -load));
    let results = model.analyze(&[case], &options).unwrap();
    let disp = results["Tip"].node_displacement(tip).unwrap();

    // δ = P L³ / (3 E I)
    let expected = load * length.powi(3) / (3.0 * options.material.e * section.iy);
    assert_relative_eq!(-disp.dz, expected, max_relative = 1e-9);
    // θ = P L² / (2 E I)
    let rotation = load * length.powi(2) / (2.0 * options.material.e * section.iy);
    assert_relative_eq!(disp.ry.abs(), rotation, max_relative = 1e-9);
}

#[test]
fn cantilever_with_default_regularization_stays_close() {
    let section = FrameSection::rectangular(0.3, 0.5);
    let options = AnalysisOptions::default();

    let mut model = StructuralModel::new();
    let root = model.add_node(Node::new(0.0, 0.0, 0.0));
    let tip = model.add_node(Node::new(0.0, 10.0, 0.0));
    model
        .add_element(Element::Beam(FrameElement::new(root, tip, section)))
        .unwrap();
    model.add_support(root, Support::fixed()).unwrap();

    let case = LoadCase::new("Tip").with_load(NodeLoad::force(tip, 0.0, 0.0, -10.0));
    let results = model.analyze(&[case], &options).unwrap();
    let disp = results["Tip"].node_displacement(tip).unwrap();

    let expected = 10.0 * 1000.0 / (3.0 * options.material.e * section.iy);
    assert_relative_eq!(-disp.dz, expected, max_relative = 1e-2);
}

#[test]
fn rectangular_slab_grid_counts() {
    let input = BuildingInput {
        levels: vec![SlabLevel::rectangle("Mat", 0.0, 0.0, 20.0, 20.0, 0.0, 1.0)],
        ..Default::default()
    };
    let model = StructuralModel::from_building(&input, &AnalysisOptions::default().with_mesh_size(2.0)).unwrap();

    assert_eq!(model.nodes.len(), 121);
    assert_eq!(model.count(ElementKind::Shell), 100);
}

#[test]
fn small_triangular_slab_is_triangulated() {
    let input = BuildingInput {
        levels: vec![SlabLevel::new(
            "Mezz",
            vec![
                SlabVertex::new(0.0, 0.0, 6.0, 0.5),
                SlabVertex::new(3.0, 0.0, 6.0, 0.5),
                SlabVertex::new(0.0, 3.0, 6.0, 0.5),
            ],
        )],
        ..Default::default()
    };
    let model = StructuralModel::from_building(&input, &AnalysisOptions::default()).unwrap();

    let level = &model.levels[0];
    assert!(level.triangulated);
    assert_eq!(level.quads, 0);
    assert_eq!(level.triangles, model.count(ElementKind::Shell));
    assert!(level.triangles > 0);
}

#[test]
fn degenerate_level_contributes_nothing() {
    let input = BuildingInput {
        levels: vec![
            SlabLevel::new("Line", vec![SlabVertex::new(0.0, 0.0, 0.0, 1.0), SlabVertex::new(5.0, 0.0, 0.0, 1.0)]),
            SlabLevel::rectangle("Top", 0.0, 0.0, 4.0, 4.0, 10.0, 0.5),
        ],
        ..Default::default()
    };
    let model = StructuralModel::from_building(&input, &AnalysisOptions::default()).unwrap();

    assert!(model.levels[0].is_empty());
    assert!(model.levels[0].nodes.is_empty());
    assert_eq!(model.levels[1].nodes.len(), 9);
}

#[test]
fn mesh_generation_is_deterministic() {
    let options = AnalysisOptions::default();
    let a = StructuralModel::from_building(&two_level_building(), &options).unwrap();
    let b = StructuralModel::from_building(&two_level_building(), &options).unwrap();

    assert_eq!(a.nodes, b.nodes);
    assert_eq!(a.elements, b.elements);
}

#[test]
fn result_vectors_have_six_entries_per_node() {
    let options = AnalysisOptions::default();
    let model = StructuralModel::from_building(&two_level_building(), &options).unwrap();
    let cases = vec![lateral_case(&model, "Lateral"), model.self_weight(&options, "Dead")];
    let results = model.analyze(&cases, &options).unwrap();

    assert_eq!(results.len(), 2);
    for result in results.values() {
        assert!(!result.status.is_degraded());
        assert_eq!(result.displacements.len(), 6 * model.nodes.len());
        assert_eq!(result.reactions.len(), 6 * model.nodes.len());
        assert!(result.displacements.iter().all(|d| d.is_finite()));
        assert_eq!(
            result.element_forces.len(),
            model.elements.iter().filter(|e| e.is_frame()).count()
        );
    }
}

#[test]
fn assembled_stiffness_is_symmetric() {
    let options = AnalysisOptions::default();
    let model = StructuralModel::from_building(&two_level_building(), &options).unwrap();
    let case = lateral_case(&model, "Lateral");
    let system = assembly::assemble(&model.nodes, &model.elements, &case, &options);

    let dense = system.to_dense();
    let scale = dense.amax();
    assert!((&dense - dense.transpose()).amax() <= 1e-12 * scale);
}

#[test]
fn zero_loads_give_exactly_zero_displacement() {
    let options = AnalysisOptions::default();
    let model = StructuralModel::from_building(&two_level_building(), &options).unwrap();
    let case = LoadCase::new("Nothing")
        .with_load(NodeLoad::force(0, 0.0, 0.0, 0.0))
        .with_load(NodeLoad::moment(3, 0.0, 0.0, 0.0));
    let results = model.analyze(&[case], &options).unwrap();
    let result = &results["Nothing"];

    assert_eq!(result.status, SolveStatus::Solved);
    assert!(result.displacements.iter().all(|d| *d == 0.0));
    assert!(result.story_drifts.values().all(|d| d.drift_ratio == 0.0));
}

#[test]
fn malformed_load_entry_is_ignored() {
    let options = AnalysisOptions::default();
    let model = StructuralModel::from_building(&two_level_building(), &options).unwrap();
    let clean = lateral_case(&model, "Clean");
    let mut dirty = lateral_case(&model, "Dirty");
    dirty.loads.insert(1, NodeLoad::force(model.nodes.len() + 10, 100.0, 0.0, 0.0));

    let results = model.analyze(&[clean, dirty], &options).unwrap();
    let (clean, dirty) = (&results["Clean"], &results["Dirty"]);

    assert_eq!(clean.displacements, dirty.displacements);
    assert_eq!(clean.reactions, dirty.reactions);
    assert_eq!(clean.element_forces, dirty.element_forces);
    assert_eq!(clean.story_drifts, dirty.story_drifts);
}

#[test]
fn lateral_load_produces_story_drifts() {
    let options = AnalysisOptions::default();
    let model = StructuralModel::from_building(&two_level_building(), &options).unwrap();
    let results = model.analyze(&[lateral_case(&model, "Lateral")], &options).unwrap();
    let result = &results["Lateral"];

    // Pile tips, mat and top slab give three distinct elevations
    let drifts = result.drifts_in_order();
    assert_eq!(drifts.len(), 2);
    assert_eq!(drifts[0].lower_elevation, -30.0);
    assert_eq!(drifts[1].upper_elevation, 12.0);
    assert!(result.story_drifts.contains_key("Story 1"));
    assert!(result.story_drifts.contains_key("Story 2"));
    for drift in drifts {
        assert!(drift.drift_ratio.is_finite());
        assert_eq!(drift.passes, drift.drift_ratio <= options.drift_limit);
    }
    assert!(result.summary.max_displacement > 0.0);
    assert!(!result.joint_forces.is_empty());
}

#[test]
fn combinations_scale_cases() {
    let options = AnalysisOptions::default();
    let model = StructuralModel::from_building(&two_level_building(), &options).unwrap();
    let lateral = lateral_case(&model, "Lateral");
    let combos = vec![LoadCombination::new("2E").with_case("Lateral", 2.0)];

    let single = model.analyze(std::slice::from_ref(&lateral), &options).unwrap();
    let doubled = model.analyze_combinations(&[lateral], &combos, &options).unwrap();

    let a = &single["Lateral"].displacements;
    let b = &doubled["2E"].displacements;
    for (x, y) in a.iter().zip(b) {
        assert_relative_eq!(2.0 * x, *y, epsilon = 1e-9, max_relative = 1e-9);
    }
}
