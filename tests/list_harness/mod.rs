//! Shared fixtures for the GraphQL integration tests
//!
//! Every test gets its own host and in-memory store, cleared on setup.
//! Fixtures are written with [`ServerHost::create_unchecked`] so they do not
//! depend on the access rules under test.

#![allow(dead_code)]

use axum::http::StatusCode;
use axum_test::TestServer;
use futures::future::try_join_all;
use listgate::prelude::*;
use listgate::server::build_router;
use rand::Rng;
use rand::distr::Alphanumeric;
use std::sync::Arc;

/// Post ids in raw 12-character form
pub const POST_IDS: [&str; 3] = ["gjfp463bxqtf", "43cg2hr9tmt3", "3qr8zpg7n4k6"];

/// Users relate to posts, readable only when their id is `POST_IDS[1]`,
/// and to secrets, which are never readable
pub const LISTS_YAML: &str = r#"
lists:
  - key: UserToPostLimitedRead
    fields:
      username: { type: text }
      posts: { type: relationship, ref: PostLimitedRead, many: true }
      pinned: { type: relationship, ref: PostLimitedRead }
      secrets: { type: relationship, ref: Secret, many: true }

  - key: PostLimitedRead
    fields:
      content: { type: text }
    access:
      read: { id_in: ["43cg2hr9tmt3"] }
      create: { content_starts_with: "public" }
      delete: { id_not_in: ["43cg2hr9tmt3"] }

  - key: Secret
    fields:
      value: { type: text }
    access:
      read: false
      create: false
      delete: false
"#;

/// Canonical hex form of a post id, as returned by the API
pub fn post_id(index: usize) -> String {
    POST_IDS[index]
        .parse::<ItemId>()
        .expect("fixture ids are valid")
        .to_string()
}

/// Random alphanumeric string for fixture content
pub fn sample_text(len: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Parsed GraphQL response
#[derive(Debug)]
pub struct GraphQLResult {
    pub status: StatusCode,
    pub body: Value,
}

impl GraphQLResult {
    pub fn data(&self) -> &Value {
        &self.body["data"]
    }

    pub fn errors(&self) -> Vec<Value> {
        self.body
            .get("errors")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default()
    }

    pub fn has_errors(&self) -> bool {
        self.body.get("errors").is_some()
    }

    /// Error codes in response order
    pub fn error_codes(&self) -> Vec<String> {
        self.errors()
            .iter()
            .filter_map(|e| e["extensions"]["code"].as_str().map(str::to_string))
            .collect()
    }
}

pub struct TestContext {
    pub host: Arc<ServerHost>,
    pub server: TestServer,
}

impl TestContext {
    pub async fn setup() -> Self {
        Self::setup_with(ExecutorConfig::default()).await
    }

    pub async fn setup_with(executor: ExecutorConfig) -> Self {
        let config = ListsConfig::from_yaml_str(LISTS_YAML).expect("fixture config is valid");
        let host = Arc::new(
            ServerBuilder::new()
                .with_config(config)
                .with_executor_config(executor)
                .build_host()
                .expect("Failed to build host"),
        );
        host.drop_database().await.expect("Failed to clear lists");

        let server = TestServer::new(build_router(host.clone(), vec![]));

        Self { host, server }
    }

    /// Insert an item without access checks
    pub async fn create(&self, list: &str, payload: Value) -> Item {
        self.host
            .create_unchecked(list, payload)
            .await
            .expect("Failed to create fixture")
    }

    /// Insert the three posts concurrently, returning them in `POST_IDS` order
    pub async fn seed_posts(&self) -> Vec<Item> {
        try_join_all(POST_IDS.iter().map(|id| {
            self.host.create_unchecked(
                "PostLimitedRead",
                json!({ "id": id, "content": sample_text(12) }),
            )
        }))
        .await
        .expect("Failed to seed posts")
    }

    /// Insert a user linked to the posts at `post_indexes`
    pub async fn seed_user(&self, post_indexes: &[usize]) -> Item {
        let posts: Vec<&str> = post_indexes.iter().map(|i| POST_IDS[*i]).collect();
        self.create(
            "UserToPostLimitedRead",
            json!({ "username": sample_text(8), "posts": posts }),
        )
        .await
    }

    pub async fn graphql_request(&self, query: &str, variables: Value) -> GraphQLResult {
        let response = self
            .server
            .post("/graphql")
            .json(&json!({ "query": query, "variables": variables }))
            .await;

        GraphQLResult {
            status: response.status_code(),
            body: response.json(),
        }
    }

    pub async fn query(&self, query: &str) -> GraphQLResult {
        self.graphql_request(query, Value::Null).await
    }
}
