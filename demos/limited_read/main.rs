//! Limited-read relationship example
//!
//! This example demonstrates:
//! - Loading lists and access rules from YAML
//! - Seeding fixtures without going through access control
//! - Querying a relationship whose target list restricts reads
//!
//! Try it:
//!
//! ```bash
//! curl -s localhost:3000/graphql -H 'content-type: application/json' \
//!   -d '{"query":"{ allUserToPostLimitedReads { username posts { id content } } }"}'
//! curl -s localhost:3000/graphql -H 'content-type: application/json' \
//!   -d '{"query":"{ allUserToPostLimitedReads { posts(where: { content: \"b\" }) { id } } }"}'
//! ```

use listgate::prelude::*;
use listgate::server::build_router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

const POST_IDS: [&str; 3] = ["gjfp463bxqtf", "43cg2hr9tmt3", "3qr8zpg7n4k6"];

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("listgate=debug")),
        )
        .init();

    println!("🚀 Listgate Limited Read Example");
    println!("================================\n");

    let config = ListsConfig::from_yaml_str(include_str!("lists.yaml"))?;
    println!("✅ Loaded {} lists", config.lists.len());

    let host = Arc::new(ServerBuilder::new().with_config(config).build_host()?);

    for (id, content) in POST_IDS.iter().zip(["a", "b", "c"]) {
        host.create_unchecked("PostLimitedRead", json!({ "id": id, "content": content }))
            .await?;
    }
    let user = host
        .create_unchecked(
            "UserToPostLimitedRead",
            json!({ "username": "alice", "posts": [POST_IDS[0], POST_IDS[1], POST_IDS[2]] }),
        )
        .await?;

    println!("📋 Seeded 3 posts, only {} is readable", POST_IDS[1]);
    println!("👤 User {} references all of them\n", user.id);

    let app = build_router(host, vec![]);
    let listener = TcpListener::bind("127.0.0.1:3000").await?;

    println!("🌐 GraphQL endpoint: http://127.0.0.1:3000/graphql");
    println!("📄 Schema:           http://127.0.0.1:3000/graphql/schema\n");

    axum::serve(listener, app).await?;
    Ok(())
}
