//! GraphQL schema generator
//!
//! Generates SDL from the registered lists. The executor does not validate
//! against it; it documents what `POST /graphql` accepts.

use crate::core::filter::Operator;
use crate::core::list::{FieldType, ListDefinition, relationship_meta_name};
use crate::server::exposure::graphql::executor::META_TYPE_NAME;
use crate::server::host::ServerHost;
use std::fmt::Write;
use std::sync::Arc;

/// Schema generator that creates GraphQL SDL from ServerHost
pub struct SchemaGenerator {
    host: Arc<ServerHost>,
}

impl SchemaGenerator {
    pub fn new(host: Arc<ServerHost>) -> Self {
        Self { host }
    }

    /// Generate the complete SDL schema
    pub fn generate_sdl(&self) -> String {
        let mut sdl = String::new();

        for list in self.host.registry.iter() {
            sdl.push_str(&Self::list_type(list));
            sdl.push_str(&Self::where_input(list));
            sdl.push_str(&Self::where_unique_input(list));
            sdl.push_str(&Self::create_input(list));
        }

        for list in self.host.registry.iter() {
            for (_, target, many) in list.relationships() {
                let input = Self::relate_input_name(target, many);
                if !sdl.contains(&format!("input {} {{", input)) {
                    sdl.push_str(&Self::relate_input(target, many));
                }
            }
        }

        sdl.push_str(&format!("type {} {{\n  count: Int\n}}\n\n", META_TYPE_NAME));
        sdl.push_str(&self.query_root());
        sdl.push_str(&self.mutation_root());

        sdl.push_str("schema {\n");
        sdl.push_str("  query: Query\n");
        sdl.push_str("  mutation: Mutation\n");
        sdl.push_str("}\n");

        sdl
    }

    fn list_type(list: &ListDefinition) -> String {
        let mut type_def = format!("type {} {{\n  id: ID!\n", list.key);

        for (name, field_type) in &list.fields {
            match field_type {
                FieldType::Text => {
                    let _ = writeln!(type_def, "  {}: String", name);
                }
                FieldType::Relationship { target, many: true } => {
                    let _ = writeln!(
                        type_def,
                        "  {}({}): [{}!]!",
                        name,
                        Self::list_arguments(target),
                        target
                    );
                    let _ = writeln!(
                        type_def,
                        "  {}(where: {}WhereInput): {}",
                        relationship_meta_name(name),
                        target,
                        META_TYPE_NAME
                    );
                }
                FieldType::Relationship { target, many: false } => {
                    let _ = writeln!(type_def, "  {}(where: {}WhereInput): {}", name, target, target);
                }
            }
        }

        type_def.push_str("}\n\n");
        type_def
    }

    fn list_arguments(key: &str) -> String {
        format!(
            "where: {}WhereInput, first: Int, skip: Int, orderBy: String",
            key
        )
    }

    fn where_input(list: &ListDefinition) -> String {
        let mut input = format!("input {}WhereInput {{\n", list.key);
        let _ = writeln!(input, "  AND: [{}WhereInput!]", list.key);
        let _ = writeln!(input, "  OR: [{}WhereInput!]", list.key);

        Self::push_conditions(&mut input, "id", "ID", Operator::id_operators());
        for (name, field_type) in &list.fields {
            if let FieldType::Text = field_type {
                Self::push_conditions(&mut input, name, "String", Operator::text_operators());
            }
        }

        input.push_str("}\n\n");
        input
    }

    fn push_conditions(input: &mut String, field: &str, scalar: &str, operators: &[Operator]) {
        for op in operators {
            if op.is_set() {
                let _ = writeln!(input, "  {}{}: [{}]", field, op.suffix(), scalar);
            } else {
                let _ = writeln!(input, "  {}{}: {}", field, op.suffix(), scalar);
            }
        }
    }

    fn where_unique_input(list: &ListDefinition) -> String {
        format!("input {}WhereUniqueInput {{\n  id: ID!\n}}\n\n", list.key)
    }

    fn create_input(list: &ListDefinition) -> String {
        let mut input = format!("input {}CreateInput {{\n", list.key);

        for (name, field_type) in &list.fields {
            let ty = match field_type {
                FieldType::Text => "String".to_string(),
                FieldType::Relationship { target, many } => Self::relate_input_name(target, *many),
            };
            let _ = writeln!(input, "  {}: {}", name, ty);
        }

        // Input objects need at least one field
        if list.fields.is_empty() {
            input.push_str("  _: Boolean\n");
        }

        input.push_str("}\n\n");
        input
    }

    fn relate_input_name(target: &str, many: bool) -> String {
        if many {
            format!("{}RelateToManyInput", target)
        } else {
            format!("{}RelateToOneInput", target)
        }
    }

    fn relate_input(target: &str, many: bool) -> String {
        let connect = if many {
            format!("[{}WhereUniqueInput]", target)
        } else {
            format!("{}WhereUniqueInput", target)
        };
        format!(
            "input {} {{\n  connect: {}\n}}\n\n",
            Self::relate_input_name(target, many),
            connect
        )
    }

    fn query_root(&self) -> String {
        let mut query = String::from("type Query {\n");

        for list in self.host.registry.iter() {
            let _ = writeln!(
                query,
                "  {}(where: {}WhereUniqueInput!): {}",
                list.key, list.key, list.key
            );
            let _ = writeln!(
                query,
                "  {}({}): [{}!]!",
                list.list_query_name(),
                Self::list_arguments(&list.key),
                list.key
            );
            let _ = writeln!(
                query,
                "  {}(where: {}WhereInput): {}",
                list.meta_query_name(),
                list.key,
                META_TYPE_NAME
            );
        }

        query.push_str("}\n\n");
        query
    }

    fn mutation_root(&self) -> String {
        let mut mutation = String::from("type Mutation {\n");

        for list in self.host.registry.iter() {
            let _ = writeln!(
                mutation,
                "  {}(data: {}CreateInput): {}",
                list.create_mutation_name(),
                list.key,
                list.key
            );
            let _ = writeln!(
                mutation,
                "  {}(id: ID!): {}",
                list.delete_mutation_name(),
                list.key
            );
        }

        mutation.push_str("}\n\n");
        mutation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::builder::ServerBuilder;

    fn generator() -> SchemaGenerator {
        let host = ServerBuilder::new()
            .create_list(
                ListDefinition::new("UserToPostLimitedRead")
                    .with_field("username", FieldType::text())
                    .with_field("posts", FieldType::to_many("PostLimitedRead"))
                    .with_field("pinned", FieldType::to_one("PostLimitedRead")),
            )
            .create_list(ListDefinition::new("PostLimitedRead").with_field("content", FieldType::text()))
            .create_list(ListDefinition::new("Empty"))
            .build_host()
            .unwrap();
        SchemaGenerator::new(Arc::new(host))
    }

    #[test]
    fn test_generated_sdl_parses() {
        let sdl = generator().generate_sdl();
        if let Err(e) = graphql_parser::schema::parse_schema::<String>(&sdl) {
            panic!("generated SDL does not parse: {}\n{}", e, sdl);
        }
    }

    #[test]
    fn test_generated_sdl_contents() {
        let sdl = generator().generate_sdl();

        assert!(sdl.contains("type UserToPostLimitedRead {"));
        assert!(sdl.contains(
            "  posts(where: PostLimitedReadWhereInput, first: Int, skip: Int, orderBy: String): [PostLimitedRead!]!"
        ));
        assert!(sdl.contains("  _postsMeta(where: PostLimitedReadWhereInput): _QueryMeta"));
        assert!(sdl.contains("  id_in: [ID]"));
        assert!(sdl.contains("  content_not_starts_with: String"));
        assert!(sdl.contains("  allPostLimitedReads("));
        assert!(sdl.contains("  _allPostLimitedReadsMeta(where: PostLimitedReadWhereInput): _QueryMeta"));
        assert!(sdl.contains("  createPostLimitedRead(data: PostLimitedReadCreateInput): PostLimitedRead"));
        assert!(sdl.contains("  deletePostLimitedRead(id: ID!): PostLimitedRead"));
        assert_eq!(sdl.matches("input PostLimitedReadRelateToManyInput {").count(), 1);
        assert!(sdl.contains("input PostLimitedReadRelateToOneInput {"));
    }
}
