use whale_route::graph::{EdgeDefinition, Graph, GraphDefinition};
use whale_route::heuristics::shortest_path::shortest_distance;
use whale_route::heuristics::whale::{optimize, WhaleConfig, WhaleOptimization};
use whale_route::Error;

fn line_graph() -> Graph {
    let mut graph = Graph::new("line");
    for name in ["A", "B", "C"] {
        graph.add_node(name).unwrap();
    }
    graph.connect("A", "B", 1.0).unwrap();
    graph.connect("B", "C", 1.0).unwrap();
    graph
}

fn diamond_graph() -> Graph {
    let definition = GraphDefinition {
        name: "diamond".to_string(),
        nodes: ["S", "L", "R", "T"].iter().map(|s| s.to_string()).collect(),
        edges: vec![
            EdgeDefinition { from: "S".into(), to: "L".into(), weight: 1.0 },
            EdgeDefinition { from: "L".into(), to: "T".into(), weight: 1.0 },
            EdgeDefinition { from: "S".into(), to: "R".into(), weight: 2.0 },
            EdgeDefinition { from: "R".into(), to: "T".into(), weight: 2.0 },
        ],
    };
    Graph::from_definition(&definition).unwrap()
}

fn small_config(seed: u64) -> WhaleConfig {
    WhaleConfig {
        num_whales: 10,
        max_iterations: 20,
        seed,
        ..Default::default()
    }
}

#[test]
fn test_line_route() {
    let graph = line_graph();
    let solution = optimize(&graph, 0, 2, &small_config(1)).unwrap();

    assert_eq!(solution.path, vec![0, 1, 2]);
    assert!((solution.cost - 2.0).abs() < 1e-9);
    assert_eq!(solution.route_string(&graph), "A -> B -> C");
}

#[test]
fn test_line_route_with_five_whales() {
    let graph = line_graph();
    let config = WhaleConfig { num_whales: 5, max_iterations: 2, ..Default::default() };
    let solution = optimize(&graph, 0, 2, &config).unwrap();

    assert_eq!(solution.path, vec![0, 1, 2]);
    assert_eq!(solution.history, vec![2.0, 2.0, 2.0]);
}

#[test]
fn test_square_with_equal_sides() {
    let mut graph = Graph::new("square");
    for name in ["A", "B", "C", "D"] {
        graph.add_node(name).unwrap();
    }
    graph.connect("A", "B", 1.0).unwrap();
    graph.connect("B", "D", 1.0).unwrap();
    graph.connect("A", "C", 1.0).unwrap();
    graph.connect("C", "D", 1.0).unwrap();

    let solution = optimize(&graph, 0, 3, &small_config(4)).unwrap();
    assert!((solution.cost - 2.0).abs() < 1e-9);
    assert_eq!(solution.path.len(), 3);
    assert!(solution.is_consistent(&graph, 0, 3));
}

#[test]
fn test_diamond_prefers_cheaper_side() {
    let graph = diamond_graph();
    let solution = optimize(&graph, 0, 3, &small_config(5)).unwrap();

    assert_eq!(solution.path, vec![0, 1, 3]);
    assert!((solution.cost - 2.0).abs() < 1e-9);
}

#[test]
fn test_solution_invariants_on_baja() {
    let graph = Graph::baja_california();
    let start = graph.node_id("Tijuana").unwrap();

    for end in 1..graph.num_nodes() {
        for seed in [0, 17, 123] {
            let config = small_config(seed);
            let solution = optimize(&graph, start, end, &config).unwrap();

            assert_eq!(solution.history.len(), config.max_iterations + 1);
            assert!(solution.history_is_monotone());
            assert_eq!(solution.history.last().copied(), Some(solution.cost));
            assert!(solution.is_consistent(&graph, start, end));
            assert!((graph.path_cost(&solution.path).unwrap() - solution.cost).abs() < 1e-9);
            assert!(solution.cost + 1e-9 >= shortest_distance(&graph, start, end));
        }
    }
}

#[test]
fn test_known_baja_routes() {
    let graph = Graph::baja_california();
    let tijuana = graph.node_id("Tijuana").unwrap();
    let mexicali = graph.node_id("Mexicali").unwrap();
    let guerrero_negro = graph.node_id("Guerrero Negro").unwrap();

    let solution = optimize(&graph, tijuana, mexicali, &WhaleConfig::default()).unwrap();
    assert_eq!(solution.route_string(&graph), "Tijuana -> Tecate -> Mexicali");
    assert!((solution.cost - 187.0).abs() < 1e-9);

    let solution = optimize(&graph, tijuana, guerrero_negro, &WhaleConfig::default()).unwrap();
    assert!((solution.cost - 715.0).abs() < 1e-9);
    assert_eq!(
        solution.route_names(&graph),
        vec!["Tijuana", "Rosarito", "Ensenada", "San Quintín", "Guerrero Negro"]
    );
}

#[test]
fn test_same_seed_same_result() {
    let graph = Graph::baja_california();
    let start = graph.node_id("Rosarito").unwrap();
    let end = graph.node_id("San Felipe").unwrap();

    let a = optimize(&graph, start, end, &small_config(99)).unwrap();
    let b = optimize(&graph, start, end, &small_config(99)).unwrap();

    assert_eq!(a.path, b.path);
    assert_eq!(a.history, b.history);
    assert_eq!(a.seed, 99);
}

#[test]
fn test_zero_iterations_keeps_initial_best() {
    let graph = Graph::baja_california();
    let config = WhaleConfig { max_iterations: 0, ..small_config(3) };
    let solution = optimize(&graph, 0, 5, &config).unwrap();

    assert_eq!(solution.history.len(), 1);
    assert_eq!(solution.iterations, 0);
    assert!(solution.is_consistent(&graph, 0, 5));
}

#[test]
fn test_single_whale() {
    let graph = Graph::baja_california();
    let config = WhaleConfig { num_whales: 1, ..small_config(8) };
    let solution = optimize(&graph, 1, 7, &config).unwrap();

    assert!(solution.is_consistent(&graph, 1, 7));
    assert_eq!(solution.history.len(), config.max_iterations + 1);
}

#[test]
fn test_configuration_errors() {
    let graph = line_graph();

    let empty = WhaleConfig { num_whales: 0, ..small_config(0) };
    assert!(matches!(optimize(&graph, 0, 2, &empty), Err(Error::Configuration(_))));
    assert!(matches!(optimize(&graph, 1, 1, &small_config(0)), Err(Error::Configuration(_))));
    assert!(matches!(optimize(&graph, 0, 9, &small_config(0)), Err(Error::Configuration(_))));

    let no_time = WhaleConfig { time_limit: Some(0.0), ..small_config(0) };
    assert!(matches!(
        WhaleOptimization::new(&graph, 0, 2, no_time),
        Err(Error::Configuration(_))
    ));
}

#[test]
fn test_disconnected_nodes_have_no_route() {
    let mut graph = line_graph();
    graph.add_node("Island").unwrap();

    match optimize(&graph, 0, 3, &small_config(0)) {
        Err(Error::NoRoute { start, end }) => {
            assert_eq!(start, "A");
            assert_eq!(end, "Island");
        }
        other => panic!("expected NoRoute, got {:?}", other),
    }
}

#[test]
fn test_observer_frames_follow_history() {
    let graph = Graph::baja_california();
    let mut woa = WhaleOptimization::new(&graph, 0, 7, small_config(21)).unwrap();

    let mut seen = Vec::new();
    let solution = woa
        .run_with_observer(|snapshot| {
            assert!(snapshot.population.iter().all(|c| c.cost >= snapshot.best.cost));
            seen.push(snapshot.best.cost);
        })
        .unwrap();

    assert_eq!(seen, solution.history);
}

#[test]
fn test_graph_file_round_trip() {
    let graph = Graph::baja_california();
    let path = std::env::temp_dir().join(format!("whale_route_{}.json", std::process::id()));
    std::fs::write(&path, serde_json::to_string_pretty(&graph.to_definition()).unwrap()).unwrap();

    let loaded = Graph::from_file(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(loaded.num_nodes(), 8);
    assert_eq!(loaded.num_edges(), 10);
    let solution = optimize(&loaded, 0, 4, &small_config(2)).unwrap();
    assert!((solution.cost - 187.0).abs() < 1e-9);
}

#[test]
fn test_bundled_graph_matches_built_in_network() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("data/baja.json");
    let loaded = Graph::from_file(path).unwrap();
    let built_in = Graph::baja_california();

    assert_eq!(loaded.nodes(), built_in.nodes());
    assert_eq!(loaded.edges(), built_in.edges());
}
