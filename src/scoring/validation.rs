use std::collections::{BTreeMap, HashSet};

use crate::config::Config;
use crate::records::{AliasTable, CanonicalField};

fn validate_overrides(
    section: &str,
    table: &AliasTable,
    overrides: &BTreeMap<String, Vec<String>>,
    errors: &mut Vec<String>,
) {
    for (name, candidates) in overrides {
        match CanonicalField::parse(name) {
            None => errors.push(format!("{}.{}: unknown field", section, name)),
            Some(field) if !table.supports(field) => errors.push(format!(
                "{}.{}: not a field of {} records",
                section,
                name,
                table.kind()
            )),
            Some(_) => {
                if candidates.is_empty() {
                    errors.push(format!("{}.{}: alias list is empty", section, name));
                }
                for (i, alias) in candidates.iter().enumerate() {
                    if alias.trim().is_empty() {
                        errors.push(format!("{}.{}[{}]: alias is blank", section, name, i));
                    }
                }
            }
        }
    }
}

/// Validate configuration at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_config(config: &Config) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if let Some(ref scoring) = config.scoring {
        if let Err(e) = scoring.identity_mode() {
            errors.push(format!("scoring.identity: {}", e));
        }
        if let Some(ref label) = scoring.unassigned_label {
            if label.trim().is_empty() {
                errors.push("scoring.unassigned_label: must not be blank".to_string());
            }
        }
    }

    if let Some(ref fields) = config.fields {
        if let Some(ref actions) = fields.actions {
            validate_overrides("fields.actions", &AliasTable::for_actions(), actions, &mut errors);
        }
        if let Some(ref analyses) = fields.analyses {
            validate_overrides(
                "fields.analyses",
                &AliasTable::for_analyses(),
                analyses,
                &mut errors,
            );
        }
    }

    if let Some(ref roster) = config.roster {
        let mut seen = HashSet::new();
        for (i, entry) in roster.iter().enumerate() {
            let id = entry.id.trim();
            if id.is_empty() {
                errors.push(format!("roster[{}].id: must not be blank", i));
            } else if !seen.insert(id) {
                errors.push(format!("roster[{}].id: duplicate id '{}'", i, id));
            }
            if entry.name.trim().is_empty() {
                errors.push(format!("roster[{}].name: must not be blank", i));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
