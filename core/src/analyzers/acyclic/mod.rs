use std::collections::HashMap;

use crate::analyzers::functions::FunctionTable;
use crate::error::FunkyErrorExt;

pub mod err;

pub use err::RecursiveFunctionError;

/// Reject user functions whose call graph contains a cycle.
pub fn analyze_acyclic_functions(functions: &FunctionTable) -> Result<(), Box<dyn FunkyErrorExt>> {
    // function -> callees, in body order
    let mut edges: HashMap<String, Vec<String>> = HashMap::new();
    for def in functions.iter() {
        let callees = edges.entry(def.name.clone()).or_default();
        for statement in &def.body {
            for callee in functions.calls_in_statement(statement) {
                if !callees.contains(&callee) {
                    callees.push(callee);
                }
            }
        }
    }

    #[derive(PartialEq, Eq, Clone, Copy)]
    enum VisitState { Unseen, Visiting, Done }

    fn dfs(
        node: &str,
        edges: &HashMap<String, Vec<String>>,
        state: &mut HashMap<String, VisitState>,
        stack: &mut Vec<String>,
    ) -> Option<Vec<String>> {
        state.insert(node.to_string(), VisitState::Visiting);
        stack.push(node.to_string());

        if let Some(neighbors) = edges.get(node) {
            for n in neighbors.iter() {
                match state.get(n).copied().unwrap_or(VisitState::Unseen) {
                    VisitState::Unseen => {
                        if let Some(cycle) = dfs(n, edges, state, stack) {
                            return Some(cycle);
                        }
                    }
                    VisitState::Visiting => {
                        // capture the cycle slice from the stack
                        if let Some(pos) = stack.iter().position(|s| s == n) {
                            let mut cycle = stack[pos..].to_vec();
                            cycle.push(n.clone());
                            return Some(cycle);
                        }
                    }
                    VisitState::Done => {}
                }
            }
        }

        stack.pop();
        state.insert(node.to_string(), VisitState::Done);
        None
    }

    let mut state: HashMap<String, VisitState> = HashMap::new();
    let mut stack: Vec<String> = Vec::new();

    for def in functions.iter() {
        if state.get(&def.name).copied().unwrap_or(VisitState::Unseen) != VisitState::Unseen {
            continue;
        }
        if let Some(cycle) = dfs(&def.name, &edges, &mut state, &mut stack) {
            let location = functions.lookup(&cycle[0]).and_then(|f| f.location.clone());
            return Err(Box::new(RecursiveFunctionError::with(
                cycle,
                "funkytrees.analyzers.acyclic".to_string(),
                location,
            )));
        }
    }

    Ok(())
}
