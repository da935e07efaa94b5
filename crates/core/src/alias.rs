// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Alias expansion for service groups.

use indexmap::IndexMap;

use crate::errors::UserError;

/// Literal token that expands to every subdirectory of the playground.
pub const ALL_SERVICES: &str = "(all services)";

/// Expand one name through the alias table into concrete service names.
///
/// Expansion is iterative with a visited set: revisiting any name (alias or
/// plain) raises `CircularAliases`. The `(all services)` token expands to
/// `all_services` and is exempt from the visited set, so `default ->
/// [(all services)]` works no matter how often it recurs.
pub fn expand_aliases(
    aliases: &IndexMap<String, Vec<String>>,
    name: &str,
    all_services: &[String],
) -> Result<Vec<String>, UserError> {
    let mut visited: Vec<String> = Vec::new();
    let mut stack: Vec<String> = vec![name.to_string()];
    let mut result: Vec<String> = Vec::new();

    while let Some(name) = stack.pop() {
        if name == ALL_SERVICES {
            result.extend(all_services.iter().cloned());
        } else if visited.iter().any(|seen| *seen == name) {
            return Err(UserError::CircularAliases { name });
        } else {
            visited.push(name.clone());
            match aliases.get(&name) {
                Some(expansion) => stack.extend(expansion.iter().rev().cloned()),
                None => result.push(name),
            }
        }
    }

    Ok(result)
}

/// Remove duplicates while preserving ordering; the first occurrence wins.
pub fn unique(names: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for name in names {
        if !seen.iter().any(|s| *s == name) {
            seen.push(name);
        }
    }
    seen
}

#[cfg(test)]
#[path = "alias_tests.rs"]
mod tests;
