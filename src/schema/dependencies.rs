use super::tables::{get_table, ALL_TABLES};
use super::types::TableSchema;
use std::collections::{HashMap, HashSet};

/// Orders tables so that every foreign-key parent precedes its children
pub struct DependencyResolver {
    /// Map of table name -> tables it depends on
    deps: HashMap<&'static str, HashSet<&'static str>>,
    /// Map of table name -> tables that depend on it
    reverse_deps: HashMap<&'static str, HashSet<&'static str>>,
}

impl DependencyResolver {
    pub fn new() -> Self {
        let mut deps: HashMap<&'static str, HashSet<&'static str>> = HashMap::new();
        let mut reverse_deps: HashMap<&'static str, HashSet<&'static str>> = HashMap::new();

        for table in ALL_TABLES {
            let table_deps = table.dependencies();
            deps.insert(table.name, table_deps.clone());

            for dep in table_deps {
                reverse_deps.entry(dep).or_default().insert(table.name);
            }
        }

        Self { deps, reverse_deps }
    }

    /// All tables in creation order (parents before children)
    pub fn creation_order(&self) -> Result<Vec<&'static TableSchema>, String> {
        let all: Vec<&str> = ALL_TABLES.iter().map(|t| t.name).collect();
        self.topological_sort(&all)
    }

    /// All tables in drop order (children before parents)
    pub fn drop_order(&self) -> Result<Vec<&'static TableSchema>, String> {
        let mut order = self.creation_order()?;
        order.reverse();
        Ok(order)
    }

    /// Tables holding foreign keys into `table`
    pub fn dependents_of(&self, table: &str) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self
            .reverse_deps
            .get(table)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default();
        names.sort_unstable();
        names
    }

    /// Topological sort of tables by dependencies. Ties keep the order of
    /// `names`, so output is stable between runs.
    fn topological_sort(&self, names: &[&str]) -> Result<Vec<&'static TableSchema>, String> {
        let included: HashSet<&str> = names.iter().copied().collect();
        let mut result = Vec::new();
        let mut visited: HashSet<&str> = HashSet::new();
        let mut temp_visited: HashSet<&str> = HashSet::new();

        for &table_name in names {
            if !visited.contains(table_name) {
                self.visit(
                    table_name,
                    &included,
                    &mut visited,
                    &mut temp_visited,
                    &mut result,
                )?;
            }
        }

        Ok(result)
    }

    fn visit<'a>(
        &self,
        name: &'a str,
        included: &HashSet<&'a str>,
        visited: &mut HashSet<&'a str>,
        temp_visited: &mut HashSet<&'a str>,
        result: &mut Vec<&'static TableSchema>,
    ) -> Result<(), String> {
        if temp_visited.contains(name) {
            return Err(format!("Circular dependency detected at: {}", name));
        }
        if visited.contains(name) {
            return Ok(());
        }

        temp_visited.insert(name);

        if let Some(deps) = self.deps.get(name) {
            let mut ordered: Vec<&'static str> = deps.iter().copied().collect();
            ordered.sort_unstable();
            for dep in ordered {
                if dep != name && included.contains(dep) {
                    self.visit(dep, included, visited, temp_visited, result)?;
                }
            }
        }

        temp_visited.remove(name);
        visited.insert(name);

        match get_table(name) {
            Some(table) => result.push(table),
            None => return Err(format!("Unknown table: {}", name)),
        }

        Ok(())
    }
}

impl Default for DependencyResolver {
    fn default() -> Self {
        Self::new()
    }
}
