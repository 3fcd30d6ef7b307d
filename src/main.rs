use std::sync::Arc;
use vertexgraph::{
    Cardinality, DataType, Direction, GraphConfig, GraphTransaction, SchemaRegistry,
};

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    println!("Vertexgraph v{}", vertexgraph::version());
    println!("==========================================");
    println!();

    let config = match std::env::args().nth(1) {
        Some(path) => GraphConfig::from_file(path)?,
        None => GraphConfig::default(),
    };

    demo_social_graph(config)?;
    Ok(())
}

fn demo_social_graph(config: GraphConfig) -> anyhow::Result<()> {
    println!("=== Social Graph (auto_schema = {}) ===", config.auto_schema);
    let registry = Arc::new(SchemaRegistry::new());
    registry.define_property_key("name", DataType::String, Cardinality::Single)?;
    registry.define_property_key("age", DataType::Integer, Cardinality::Single)?;
    registry.define_property_key("nickname", DataType::String, Cardinality::Set)?;
    registry.define_edge_label("knows")?;
    registry.define_edge_label("follows")?;
    registry.define_vertex_label("person")?;

    let mut tx = GraphTransaction::new(registry, config)?;

    let alice = tx.add_vertex_with_label("person")?;
    let bob = tx.add_vertex_with_label("person")?;
    let charlie = tx.add_vertex_with_label("person")?;

    for (id, name, age) in [(alice, "Alice", 30i64), (bob, "Bob", 25), (charlie, "Charlie", 35)] {
        if let Some(mut v) = tx.vertex_mut(id) {
            v.property("name", name)?;
            v.property("age", age)?;
            println!("✓ Created person: {} (age {})", name, age);
        }
    }

    if let Some(mut v) = tx.vertex_mut(alice) {
        v.add_property("nickname", "Al")?;
        v.add_property("nickname", "Ally")?;
        v.add_edge("knows", bob)?;
        v.add_edge("follows", charlie)?;
        v.add_edge("follows", alice)?;
        println!("✓ Alice -[knows]-> Bob, Alice -[follows]-> Charlie, Alice -[follows]-> Alice");
    }
    if let Some(mut v) = tx.vertex_mut(bob) {
        v.add_edge("knows", charlie)?;
        println!("✓ Bob -[knows]-> Charlie");
    }

    match tx.vertex_mut(charlie).map(|mut v| v.add_property("age", "thirty-five")) {
        Some(Err(e)) => println!("✗ Rejected: {}", e),
        _ => println!("✗ Expected a schema mismatch"),
    }

    if let Some(v) = tx.vertex(alice) {
        println!("\nAlice ({}):", v.label());
        println!("  Edges: {} (the self-loop counts twice)", v.edge_count());
        println!("  Properties: {}", v.property_count());
        println!("  Keys: {:?}", v.property_keys());
        let followed: Vec<_> = v.get_vertices(Direction::Out, &["follows"]).collect();
        println!("  Follows: {:?}", followed);
        let knows = v.query().direction(Direction::Out).labels(["knows"]);
        println!("  Knows (query): {}", knows.edges(&tx).count());
    }

    println!("\nModified vertices before commit: {}", tx.modified_vertices().count());
    tx.commit();
    println!("Modified vertices after commit: {}", tx.modified_vertices().count());
    Ok(())
}
