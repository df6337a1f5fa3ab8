//! End-to-end checks through the public API and the binary.

use maxclique::prelude::*;
use maxclique::skeleton::SkeletonConfig;
use rand::SeedableRng;
use rand_xorshift::XorShiftRng;
use std::process::Command;

fn config(algorithm: Algorithm) -> SearchConfig {
    SearchConfig {
        algorithm,
        permute: true,
        skeleton: SkeletonConfig {
            workers: 4,
            spawn_depth: 2,
            target_tasks: Some(8),
            ..SkeletonConfig::default()
        },
    }
}

fn brute_omega(graph: &BitGraph) -> usize {
    let n = graph.order();
    (0u32..(1u32 << n))
        .filter(|&mask| {
            let subset: Vec<usize> = (0..n).filter(|&v| mask & (1 << v) != 0).collect();
            graph.is_clique(&subset)
        })
        .map(|mask| mask.count_ones() as usize)
        .max()
        .unwrap_or(0)
}

#[test]
fn named_scenarios_for_every_algorithm() {
    let cycle = BitGraph::build(5, &[(0, 1), (1, 2), (2, 3), (3, 4), (4, 0)]).unwrap();
    let triangles = BitGraph::build(6, &[(0, 1), (1, 2), (0, 2), (3, 4), (4, 5), (3, 5)]).unwrap();
    let cases = [
        ("K5", BitGraph::complete(5), 5),
        ("C5", cycle, 2),
        ("edgeless", BitGraph::empty(8), 1),
        ("two triangles", triangles, 3),
        ("no vertices", BitGraph::empty(0), 0),
    ];
    for (name, graph, omega) in &cases {
        for algorithm in Algorithm::ALL {
            let outcome = run(graph, &config(algorithm)).unwrap();
            assert_eq!(outcome.size, *omega, "{name} [{algorithm}]");
            assert!(outcome.valid, "{name} [{algorithm}]");
        }
    }

    let k5 = run(&cases[0].1, &config(Algorithm::SafeExchange)).unwrap();
    assert_eq!(k5.clique, vec![0, 1, 2, 3, 4]);
}

#[test]
fn all_algorithms_match_brute_force() {
    let mut rng = XorShiftRng::seed_from_u64(0xB7F0);
    for case in 0..36 {
        let n = 1 + case % 12;
        let p = [0.3, 0.6, 0.9][case % 3];
        let g = BitGraph::random(n, p, &mut rng);
        let omega = brute_omega(&g);
        for algorithm in Algorithm::ALL {
            let outcome = run(&g, &config(algorithm)).unwrap();
            assert_eq!(outcome.size, omega, "{algorithm} case={case} n={n} p={p}");
            assert!(check_clique(&g, &outcome.clique).is_ok());
        }
    }
}

#[test]
fn strategies_agree_on_larger_graphs() {
    let mut rng = XorShiftRng::seed_from_u64(0x1A26E);
    for &(n, p) in &[(80, 0.5), (120, 0.3), (60, 0.8)] {
        let g = BitGraph::random(n, p, &mut rng);
        let sizes: Vec<usize> = Algorithm::ALL
            .iter()
            .map(|&a| run(&g, &config(a)).unwrap().size)
            .collect();
        assert!(sizes.windows(2).all(|w| w[0] == w[1]), "n={n} p={p}: {sizes:?}");
    }
}

#[test]
fn dimacs_file_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wheel.clq");
    // Wheel on 6 vertices: hub 1, rim 2..6.
    std::fs::write(
        &path,
        "c wheel\np edge 6 10\ne 1 2\ne 1 3\ne 1 4\ne 1 5\ne 1 6\n\
         e 2 3\ne 3 4\ne 4 5\ne 5 6\ne 6 2\n",
    )
    .unwrap();
    let g = read_graph(&path, Format::Dimacs).unwrap();
    let outcome = run(&g, &SearchConfig::default()).unwrap();
    assert_eq!(outcome.size, 3);
    assert!(outcome.clique.contains(&0));
}

#[test]
fn cli_reports_clique_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("k4.clq");
    std::fs::write(&path, "p edge 5 6\ne 1 2\ne 1 3\ne 1 4\ne 2 3\ne 2 4\ne 3 4\n").unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_maxclique"))
        .arg(&path)
        .args(["-a", "safe", "-w", "2"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("size: 4"), "{stdout}");
    assert!(stdout.contains("clique: 1 2 3 4"), "{stdout}");
    assert!(stdout.contains("valid: yes"), "{stdout}");
}

#[test]
fn cli_random_graph_with_dynamic_strategy() {
    let output = Command::new(env!("CARGO_BIN_EXE_maxclique"))
        .args(["--random", "60", "--density", "0.5", "--seed", "9"])
        .args(["-a", "dynamic", "-w", "3", "-t", "6"])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("valid: yes"));
}

#[test]
fn cli_fails_on_bad_input() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.clq");
    std::fs::write(&path, "p edge 3 1\ne 1 x\n").unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_maxclique"))
        .arg(&path)
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));

    let missing_target = Command::new(env!("CARGO_BIN_EXE_maxclique"))
        .args(["--random", "10", "-a", "dynamic"])
        .output()
        .unwrap();
    assert_eq!(missing_target.status.code(), Some(1));
}

#[test]
fn cli_validate_mode() {
    let output = Command::new(env!("CARGO_BIN_EXE_maxclique"))
        .args(["--validate", "-w", "2"])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Validation OK"));
}

#[test]
fn cli_rejects_non_probability_density() {
    for density in ["NaN", "2"] {
        let output = Command::new(env!("CARGO_BIN_EXE_maxclique"))
            .args(["--random", "10", "--density", density])
            .output()
            .unwrap();
        assert!(!output.status.success(), "--density {density}");
        assert!(String::from_utf8_lossy(&output.stderr).contains("probability"));
    }
}
