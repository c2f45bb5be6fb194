//! Tests for MapGraph construction and shortest path search

#[cfg(test)]
mod tests {
    use crate::models::{Edge, Node};
    use crate::routing::{MapGraph, RouteError, SearchStrategy};

    const STRATEGIES: [SearchStrategy; 2] = [SearchStrategy::Dijkstra, SearchStrategy::AStar];

    fn triangle() -> MapGraph {
        let nodes = vec![
            Node::new("A", 0.0, 0.0),
            Node::new("B", 3.0, 4.0),
            Node::new("C", 10.0, 0.0),
        ];
        let edges = vec![Edge::new("A", "B"), Edge::new("B", "C"), Edge::new("A", "C")];
        MapGraph::from_snapshot(&nodes, &edges)
    }

    fn square(edges: &[(&str, &str)]) -> MapGraph {
        let nodes = vec![
            Node::new("A", 0.0, 0.0),
            Node::new("B", 1.0, 0.0),
            Node::new("C", 0.0, 1.0),
            Node::new("D", 1.0, 1.0),
        ];
        let edges: Vec<Edge> = edges.iter().map(|(s, e)| Edge::new(*s, *e)).collect();
        MapGraph::from_snapshot(&nodes, &edges)
    }

    /// Exhaustive search over simple paths, for cross-checking
    fn brute_force(nodes: &[Node], edges: &[Edge], start: &str, end: &str) -> Option<f64> {
        fn walk(
            current: &str,
            end: &str,
            nodes: &[Node],
            edges: &[Edge],
            visited: &mut Vec<String>,
            cost: f64,
            best: &mut Option<f64>,
        ) {
            if current == end {
                if best.map_or(true, |b| cost < b) {
                    *best = Some(cost);
                }
                return;
            }
            for edge in edges {
                let Some(next) = edge.other_end(current) else {
                    continue;
                };
                if visited.iter().any(|v| v == next) {
                    continue;
                }
                let a = nodes.iter().find(|n| n.node_id == current).unwrap();
                let b = nodes.iter().find(|n| n.node_id == next).unwrap();
                visited.push(next.to_string());
                walk(next, end, nodes, edges, visited, cost + a.distance_to(b), best);
                visited.pop();
            }
        }

        let mut best = None;
        let mut visited = vec![start.to_string()];
        walk(start, end, nodes, edges, &mut visited, 0.0, &mut best);
        best
    }

    #[test]
    fn test_direct_edge_beats_longer_detour() {
        let graph = triangle();
        for strategy in STRATEGIES {
            let route = graph.shortest_path("A", "C", strategy).unwrap().unwrap();
            assert_eq!(route.node_ids, vec!["A", "C"]);
            assert!((route.distance - 10.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_edges_are_traversed_both_ways() {
        let graph = triangle();
        let route = graph
            .shortest_path("C", "B", SearchStrategy::Dijkstra)
            .unwrap()
            .unwrap();
        assert_eq!(route.node_ids, vec!["C", "B"]);
        assert!((route.distance - 65f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn test_start_equals_end() {
        let graph = triangle();
        let route = graph
            .shortest_path("B", "B", SearchStrategy::Dijkstra)
            .unwrap()
            .unwrap();
        assert_eq!(route.node_ids, vec!["B"]);
        assert_eq!(route.distance, 0.0);
    }

    #[test]
    fn test_disconnected_nodes_have_no_route() {
        let nodes = vec![Node::new("A", 0.0, 0.0), Node::new("B", 1.0, 1.0)];
        let graph = MapGraph::from_snapshot(&nodes, &[]);
        for strategy in STRATEGIES {
            assert_eq!(graph.shortest_path("A", "B", strategy).unwrap(), None);
        }
    }

    #[test]
    fn test_unknown_node_is_an_error() {
        let graph = triangle();
        assert_eq!(
            graph.shortest_path("A", "Z", SearchStrategy::Dijkstra),
            Err(RouteError::UnknownNode("Z".to_string()))
        );
        assert_eq!(
            graph.shortest_path("Q", "A", SearchStrategy::AStar),
            Err(RouteError::UnknownNode("Q".to_string()))
        );
    }

    #[test]
    fn test_orphan_edges_are_skipped() {
        let nodes = vec![Node::new("A", 0.0, 0.0), Node::new("B", 0.0, 2.0)];
        let edges = vec![
            Edge::new("A", "GHOST"),
            Edge::new("A", "B"),
            Edge {
                edge_id: "B_B".to_string(),
                start_node_id: "B".to_string(),
                end_node_id: "B".to_string(),
            },
        ];
        let graph = MapGraph::from_snapshot(&nodes, &edges);

        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.skipped_edges(), 2);
        let route = graph
            .shortest_path("A", "B", SearchStrategy::Dijkstra)
            .unwrap()
            .unwrap();
        assert_eq!(route.node_ids, vec!["A", "B"]);
    }

    #[test]
    fn test_ties_follow_edge_order() {
        let via_b = square(&[("A", "B"), ("A", "C"), ("B", "D"), ("C", "D")]);
        let via_c = square(&[("A", "C"), ("A", "B"), ("C", "D"), ("B", "D")]);

        for strategy in STRATEGIES {
            let first = via_b.shortest_path("A", "D", strategy).unwrap().unwrap();
            assert_eq!(first.node_ids, vec!["A", "B", "D"]);
            let second = via_c.shortest_path("A", "D", strategy).unwrap().unwrap();
            assert_eq!(second.node_ids, vec!["A", "C", "D"]);
        }
    }

    #[test]
    fn test_repeated_searches_are_identical() {
        let graph = square(&[("A", "B"), ("A", "C"), ("B", "D"), ("C", "D")]);
        let first = graph.shortest_path("A", "D", SearchStrategy::Dijkstra).unwrap();
        for _ in 0..10 {
            assert_eq!(graph.shortest_path("A", "D", SearchStrategy::Dijkstra).unwrap(), first);
        }
    }

    #[test]
    fn test_matches_exhaustive_search() {
        let nodes = vec![
            Node::new("N1", 0.0, 0.0),
            Node::new("N2", 2.0, 1.0),
            Node::new("N3", 4.0, 0.0),
            Node::new("N4", 1.0, 3.0),
            Node::new("N5", 3.0, 4.0),
            Node::new("N6", 6.0, 2.0),
            Node::new("N7", 5.0, 5.0),
        ];
        let edges = vec![
            Edge::new("N1", "N2"),
            Edge::new("N2", "N3"),
            Edge::new("N1", "N4"),
            Edge::new("N4", "N5"),
            Edge::new("N2", "N5"),
            Edge::new("N3", "N6"),
            Edge::new("N5", "N7"),
            Edge::new("N6", "N7"),
            Edge::new("N1", "N3"),
        ];
        let graph = MapGraph::from_snapshot(&nodes, &edges);

        for start in &nodes {
            for end in &nodes {
                let expected = brute_force(&nodes, &edges, &start.node_id, &end.node_id).unwrap();
                for strategy in STRATEGIES {
                    let route = graph
                        .shortest_path(&start.node_id, &end.node_id, strategy)
                        .unwrap()
                        .unwrap();
                    assert!(
                        (route.distance - expected).abs() < 1e-9,
                        "{} -> {} via {}: {} != {}",
                        start.node_id,
                        end.node_id,
                        strategy,
                        route.distance,
                        expected
                    );
                    assert_eq!(route.node_ids.first(), Some(&start.node_id));
                    assert_eq!(route.node_ids.last(), Some(&end.node_id));
                }
            }
        }
    }

    #[test]
    fn test_strategy_parsing() {
        assert_eq!("astar".parse::<SearchStrategy>(), Ok(SearchStrategy::AStar));
        assert_eq!("Dijkstra".parse::<SearchStrategy>(), Ok(SearchStrategy::Dijkstra));
        assert!("bfs".parse::<SearchStrategy>().is_err());
        assert_eq!(SearchStrategy::default(), SearchStrategy::Dijkstra);
    }

    #[test]
    fn test_strategy_deserializes_like_parse() {
        for (text, expected) in [
            ("AStar", SearchStrategy::AStar),
            ("a*", SearchStrategy::AStar),
            ("astar", SearchStrategy::AStar),
            ("DIJKSTRA", SearchStrategy::Dijkstra),
        ] {
            let parsed: SearchStrategy = serde_json::from_value(serde_json::json!(text)).unwrap();
            assert_eq!(parsed, expected, "{}", text);
            assert_eq!(text.parse::<SearchStrategy>(), Ok(expected));
        }

        assert!(serde_json::from_value::<SearchStrategy>(serde_json::json!("bfs")).is_err());
        assert_eq!(
            serde_json::to_value(SearchStrategy::AStar).unwrap(),
            serde_json::json!("astar")
        );
    }
}
