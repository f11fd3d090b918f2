use petgraph::graph::UnGraph;
use slpa::{Configurable, OverlappingCommunityDetection, Slpa};
use std::collections::HashMap;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Two 5-cliques sharing node 4: the shared node should end up in both.
    let mut graph = UnGraph::<(), ()>::new_undirected();
    let nodes: Vec<_> = (0..9).map(|_| graph.add_node(())).collect();
    for group in [&nodes[0..5], &nodes[4..9]] {
        for (i, &a) in group.iter().enumerate() {
            for &b in &group[i + 1..] {
                let _ = graph.add_edge(a, b, ());
            }
        }
    }

    // Configure through the string view, the way a hosting layer would.
    let mut slpa = Slpa::new().with_seed(7);
    slpa.apply_parameters(HashMap::from([
        ("memorySize".to_string(), "200".to_string()),
        ("probabilityThreshold".to_string(), "0.1".to_string()),
    ]))?;

    let cover = slpa.detect_overlapping(&graph)?;

    println!(
        "n_nodes={} n_edges={} communities={}",
        graph.node_count(),
        graph.edge_count(),
        cover.community_count()
    );
    for node in 0..cover.node_count() {
        let memberships: Vec<String> = cover
            .communities_of(node)
            .into_iter()
            .map(|(c, degree)| format!("c{c}={degree:.2}"))
            .collect();
        println!("  node {node}: {}", memberships.join(" "));
    }

    Ok(())
}
