//! Reference validation, table grouping, and graph assembly.

use crate::diag::{DiagKind, Diagnostic};
use crate::model::{ReferenceDeclaration, SchemaModel};
use thiserror::Error;

/// A validated relationship. `from` is the referencing side, `to` the
/// referenced side.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub from_table: String,
    pub from_column: String,
    pub to_table: String,
    pub to_column: String,
}

/// A named category of tables, in model order.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub name: String,
    pub tables: Vec<String>,
}

/// The resolved, render-ready graph: a partition of the model's tables into
/// groups plus validated edges in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaGraph {
    pub groups: Vec<Group>,
    pub edges: Vec<Edge>,
}

impl SchemaGraph {
    pub fn group_of(&self, table: &str) -> Option<&str> {
        self.groups
            .iter()
            .find(|g| g.tables.iter().any(|t| t == table))
            .map(|g| g.name.as_str())
    }
}

/// Assigns table names to named groups: ordered prefix rules, then an
/// optional fallback group for everything else.
///
/// The policy must be total over the model being resolved; a table claimed
/// by no rule and no fallback is a configuration error.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupingPolicy {
    rules: Vec<GroupRule>,
    fallback: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
struct GroupRule {
    group: String,
    prefix: String,
}

impl GroupingPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tables whose name starts with `prefix` go to `group`; rules match in
    /// the order they were added.
    pub fn rule(mut self, group: &str, prefix: &str) -> Self {
        self.rules.push(GroupRule {
            group: group.to_string(),
            prefix: prefix.to_string(),
        });
        self
    }

    /// Group for any table no rule claims.
    pub fn fallback(mut self, group: &str) -> Self {
        self.fallback = Some(group.to_string());
        self
    }

    /// The canonical two-way split: `prefix`-named tables form the "master"
    /// group, everything else "detail".
    pub fn master_detail(prefix: &str) -> Self {
        Self::new().rule("master", prefix).fallback("detail")
    }

    pub fn group_for(&self, table: &str) -> Option<&str> {
        self.rules
            .iter()
            .find(|r| table.starts_with(&r.prefix))
            .map(|r| r.group.as_str())
            .or(self.fallback.as_deref())
    }

    /// Declared group names: rule order first, fallback last, repeats
    /// collapsed to the first mention.
    fn group_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for rule in &self.rules {
            if !names.contains(&rule.group.as_str()) {
                names.push(&rule.group);
            }
        }
        if let Some(fallback) = &self.fallback {
            if !names.contains(&fallback.as_str()) {
                names.push(fallback);
            }
        }
        names
    }
}

/// Fatal resolution failures. Recoverable findings go to the diagnostics
/// list instead.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("grouping policy assigns no group to table `{0}`")]
    UngroupedTable(String),
}

/// Validates raw reference declarations against a model and assembles the
/// graph.
pub struct Resolver<'a> {
    model: &'a SchemaModel,
    policy: &'a GroupingPolicy,
}

impl<'a> Resolver<'a> {
    pub fn new(model: &'a SchemaModel, policy: &'a GroupingPolicy) -> Self {
        Self { model, policy }
    }

    pub fn resolve(
        &self,
        references: &[ReferenceDeclaration],
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<SchemaGraph, ResolveError> {
        // Partition first: an incomplete policy aborts before any output.
        let groups = self.partition()?;
        let edges = self.validate(references, diagnostics);
        Ok(SchemaGraph { groups, edges })
    }

    fn partition(&self) -> Result<Vec<Group>, ResolveError> {
        let mut groups: Vec<Group> = self
            .policy
            .group_names()
            .into_iter()
            .map(|name| Group {
                name: name.to_string(),
                tables: Vec::new(),
            })
            .collect();

        for table in self.model.tables() {
            let Some(assigned) = self.policy.group_for(&table.name) else {
                return Err(ResolveError::UngroupedTable(table.name.clone()));
            };
            if let Some(group) = groups.iter_mut().find(|g| g.name == assigned) {
                group.tables.push(table.name.clone());
            }
        }

        Ok(groups)
    }

    fn validate(
        &self,
        references: &[ReferenceDeclaration],
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Vec<Edge> {
        let mut edges = Vec::new();

        for decl in references {
            if let Some(reason) = self.check(decl) {
                diagnostics.push(Diagnostic::new(
                    DiagKind::UnresolvedReference,
                    format!("table `{}`", decl.source_table),
                    format!(
                        "dropping foreign key {}.{} -> {}.{}: {}",
                        decl.source_table,
                        decl.source_column,
                        decl.target_table,
                        decl.target_column,
                        reason
                    ),
                ));
                continue;
            }
            edges.push(Edge {
                from_table: decl.source_table.clone(),
                from_column: decl.source_column.clone(),
                to_table: decl.target_table.clone(),
                to_column: decl.target_column.clone(),
            });
        }

        edges
    }

    /// Why the declaration cannot be resolved, or None if it checks out.
    fn check(&self, decl: &ReferenceDeclaration) -> Option<String> {
        let Some(target) = self.model.get(&decl.target_table) else {
            return Some(format!("unknown table `{}`", decl.target_table));
        };
        if !target.has_column(&decl.target_column) {
            return Some(format!(
                "`{}` has no column `{}`",
                decl.target_table, decl.target_column
            ));
        }
        let Some(source) = self.model.get(&decl.source_table) else {
            return Some(format!("unknown table `{}`", decl.source_table));
        };
        if !source.has_column(&decl.source_column) {
            return Some(format!(
                "`{}` has no column `{}`",
                decl.source_table, decl.source_column
            ));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ddl::SchemaExtractor;

    const RSVP: &str = "CREATE TABLE rsvp_master_event (\n id INTEGER PRIMARY KEY,\n name\n);\nCREATE TABLE rsvp_detail_guest (\n id INTEGER PRIMARY KEY,\n event_id,\n FOREIGN KEY (event_id) REFERENCES rsvp_master_event(id)\n);";

    fn resolve(input: &str, policy: &GroupingPolicy) -> (SchemaGraph, Vec<Diagnostic>) {
        let out = SchemaExtractor::new().extract(input);
        let mut diagnostics = out.diagnostics;
        let graph = Resolver::new(&out.model, policy)
            .resolve(&out.references, &mut diagnostics)
            .unwrap();
        (graph, diagnostics)
    }

    #[test]
    fn test_master_detail_partition() {
        let policy = GroupingPolicy::master_detail("rsvp_master_");
        let (graph, diags) = resolve(RSVP, &policy);
        assert!(diags.is_empty());
        assert_eq!(graph.groups.len(), 2);
        assert_eq!(graph.groups[0].name, "master");
        assert_eq!(graph.groups[0].tables, vec!["rsvp_master_event"]);
        assert_eq!(graph.groups[1].name, "detail");
        assert_eq!(graph.groups[1].tables, vec!["rsvp_detail_guest"]);
    }

    #[test]
    fn test_valid_reference_becomes_edge() {
        let policy = GroupingPolicy::master_detail("rsvp_master_");
        let (graph, _) = resolve(RSVP, &policy);
        assert_eq!(graph.edges.len(), 1);
        let edge = &graph.edges[0];
        assert_eq!(edge.from_table, "rsvp_detail_guest");
        assert_eq!(edge.from_column, "event_id");
        assert_eq!(edge.to_table, "rsvp_master_event");
        assert_eq!(edge.to_column, "id");
    }

    #[test]
    fn test_unknown_target_table_drops_edge() {
        let input = "CREATE TABLE t (\n a,\n FOREIGN KEY (a) REFERENCES ghost(id)\n);";
        let policy = GroupingPolicy::new().fallback("all");
        let (graph, diags) = resolve(input, &policy);
        assert!(graph.edges.is_empty());
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].kind, DiagKind::UnresolvedReference);
        assert!(diags[0].message.contains("unknown table `ghost`"));
        // The rest of the model is intact.
        assert_eq!(graph.groups[0].tables, vec!["t"]);
    }

    #[test]
    fn test_unknown_target_column_drops_edge() {
        let input = "CREATE TABLE x (\n id INTEGER PRIMARY KEY\n);\nCREATE TABLE t (\n a,\n FOREIGN KEY (a) REFERENCES x(bogus)\n);";
        let policy = GroupingPolicy::new().fallback("all");
        let (graph, diags) = resolve(input, &policy);
        assert!(graph.edges.is_empty());
        assert_eq!(diags.len(), 1);
        assert!(diags[0].message.contains("no column `bogus`"));
    }

    #[test]
    fn test_unknown_source_column_drops_edge() {
        let input = "CREATE TABLE x (\n id INTEGER PRIMARY KEY\n);\nCREATE TABLE t (\n a,\n FOREIGN KEY (missing) REFERENCES x(id)\n);";
        let policy = GroupingPolicy::new().fallback("all");
        let (graph, diags) = resolve(input, &policy);
        assert!(graph.edges.is_empty());
        assert!(diags[0].message.contains("no column `missing`"));
    }

    #[test]
    fn test_target_primary_key_counts_as_column() {
        // PK also appears in the column list here, but has_column must
        // accept the PK even when it does not.
        let input = "CREATE TABLE x (\n id INTEGER PRIMARY KEY\n);\nCREATE TABLE t (\n a,\n FOREIGN KEY (a) REFERENCES x(id)\n);";
        let policy = GroupingPolicy::new().fallback("all");
        let (graph, diags) = resolve(input, &policy);
        assert!(diags.is_empty());
        assert_eq!(graph.edges.len(), 1);
    }

    #[test]
    fn test_edges_keep_declaration_order() {
        let input = "CREATE TABLE x (\n id INTEGER PRIMARY KEY\n);\nCREATE TABLE y (\n id INTEGER PRIMARY KEY\n);\nCREATE TABLE t (\n a,\n b,\n FOREIGN KEY (b) REFERENCES y(id),\n FOREIGN KEY (a) REFERENCES x(id)\n);";
        let policy = GroupingPolicy::new().fallback("all");
        let (graph, _) = resolve(input, &policy);
        assert_eq!(graph.edges.len(), 2);
        assert_eq!(graph.edges[0].to_table, "y");
        assert_eq!(graph.edges[1].to_table, "x");
    }

    #[test]
    fn test_ungrouped_table_is_fatal() {
        let out = SchemaExtractor::new().extract("CREATE TABLE orphan (\n id\n);");
        let policy = GroupingPolicy::new().rule("master", "master_");
        let mut diagnostics = out.diagnostics;
        let err = Resolver::new(&out.model, &policy)
            .resolve(&out.references, &mut diagnostics)
            .unwrap_err();
        assert!(matches!(err, ResolveError::UngroupedTable(name) if name == "orphan"));
    }

    #[test]
    fn test_three_way_grouping() {
        let input = "CREATE TABLE ref_country (\n id\n);\nCREATE TABLE master_event (\n id\n);\nCREATE TABLE guest (\n id\n);";
        let policy = GroupingPolicy::new()
            .rule("reference", "ref_")
            .rule("master", "master_")
            .fallback("detail");
        let (graph, _) = resolve(input, &policy);
        assert_eq!(graph.group_of("ref_country"), Some("reference"));
        assert_eq!(graph.group_of("master_event"), Some("master"));
        assert_eq!(graph.group_of("guest"), Some("detail"));
    }

    #[test]
    fn test_rules_match_in_declaration_order() {
        let policy = GroupingPolicy::new()
            .rule("first", "ab_")
            .rule("second", "ab_x_")
            .fallback("rest");
        assert_eq!(policy.group_for("ab_x_table"), Some("first"));
    }

    #[test]
    fn test_empty_groups_are_emitted() {
        let input = "CREATE TABLE plain (\n id\n);";
        let policy = GroupingPolicy::master_detail("master_");
        let (graph, _) = resolve(input, &policy);
        assert_eq!(graph.groups.len(), 2);
        assert!(graph.groups[0].tables.is_empty());
        assert_eq!(graph.groups[1].tables, vec!["plain"]);
    }

    #[test]
    fn test_every_table_in_exactly_one_group() {
        let out = SchemaExtractor::new().extract(RSVP);
        let policy = GroupingPolicy::master_detail("rsvp_master_");
        let mut diagnostics = out.diagnostics;
        let graph = Resolver::new(&out.model, &policy)
            .resolve(&out.references, &mut diagnostics)
            .unwrap();
        for table in out.model.tables() {
            let memberships: usize = graph
                .groups
                .iter()
                .map(|g| g.tables.iter().filter(|t| *t == &table.name).count())
                .sum();
            assert_eq!(memberships, 1, "table {}", table.name);
        }
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let policy = GroupingPolicy::master_detail("rsvp_master_");
        let (first, _) = resolve(RSVP, &policy);
        let (second, _) = resolve(RSVP, &policy);
        assert_eq!(first, second);
    }
}
