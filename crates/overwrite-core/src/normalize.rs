//! Raw row to bundle normalization.

use serde_json::Value;

use crate::bundle::MinimalOverwriteBundle;
use crate::error::{Error, RequirementFieldError, RequirementValidationError, Result};
use crate::logic::NormalizedLogic;
use crate::requirement::{parse_flat_list, parse_requirement_list};
use crate::rule::RawOverwriteRule;

/// Turn one raw row into a single-row bundle.
///
/// Every requirement field is validated; all problems in the row are
/// reported together. Empty requirement lists normalize to `None`.
pub fn normalize(rule: &RawOverwriteRule) -> Result<MinimalOverwriteBundle> {
    let mut errors: Vec<RequirementFieldError> = Vec::new();

    let required_channels = collect(
        parse_flat_list::<String>("required_channels", rule.required_channels.as_ref()),
        &mut errors,
    )
    .flatten();

    let required_roles = logic_field("required_roles", rule.required_roles.as_ref(), &mut errors);
    let required_permissions = logic_field(
        "required_permissions",
        rule.required_permissions.as_ref(),
        &mut errors,
    );
    let required_system_permissions = logic_field(
        "required_system_permissions",
        rule.required_system_permissions.as_ref(),
        &mut errors,
    );
    let required_users = logic_field("required_users", rule.required_users.as_ref(), &mut errors);

    if !errors.is_empty() {
        return Err(Error::InvalidOverwrite {
            rule_id: rule.id,
            source: RequirementValidationError::new(errors),
        });
    }

    Ok(MinimalOverwriteBundle {
        ids: vec![rule.id],
        required_channels,
        required_roles,
        required_level: rule.required_level,
        required_permissions,
        required_system_permissions,
        required_users,
    })
}

fn logic_field(
    field: &str,
    value: Option<&Value>,
    errors: &mut Vec<RequirementFieldError>,
) -> Option<NormalizedLogic<String>> {
    collect(parse_requirement_list::<String>(field, value), errors)
        .flatten()
        .map(NormalizedLogic::build)
        .filter(|logic| !logic.is_empty())
}

fn collect<T>(
    parsed: std::result::Result<T, Vec<RequirementFieldError>>,
    errors: &mut Vec<RequirementFieldError>,
) -> Option<T> {
    match parsed {
        Ok(v) => Some(v),
        Err(mut errs) => {
            errors.append(&mut errs);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::OverwriteAction;
    use serde_json::json;
    use std::collections::BTreeSet;

    fn group(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_normalize_projects_every_field() {
        let rule = RawOverwriteRule::new(9, "guildA", ["ban"], OverwriteAction::Allow)
            .with_channels(json!(["c1", "c2"]))
            .with_roles(json!(["r1", ["r2", "r3"]]))
            .with_permissions(json!(["BanMembers"]))
            .with_system_permissions(json!([["system.admin", "system.moderator"]]))
            .with_users(json!([123456789012345678u64]))
            .with_level(40);

        let bundle = normalize(&rule).unwrap();
        assert_eq!(bundle.ids, vec![9]);
        assert_eq!(
            bundle.required_channels,
            Some(vec!["c1".to_string(), "c2".to_string()])
        );

        let roles = bundle.required_roles.unwrap();
        assert_eq!(roles.and, Some(group(&["r1"])));
        assert_eq!(roles.deep_and, Some(vec![group(&["r2", "r3"])]));

        assert_eq!(
            bundle.required_permissions.unwrap().and,
            Some(group(&["BanMembers"]))
        );
        assert_eq!(
            bundle.required_system_permissions.unwrap().deep_and,
            Some(vec![group(&["system.admin", "system.moderator"])])
        );
        assert_eq!(
            bundle.required_users.unwrap().and,
            Some(group(&["123456789012345678"]))
        );
        assert_eq!(bundle.required_level, Some(40));
    }

    #[test]
    fn test_missing_fields_are_none() {
        let rule = RawOverwriteRule::new(1, "guildA", ["ban"], OverwriteAction::Deny);
        let bundle = normalize(&rule).unwrap();
        assert_eq!(
            bundle,
            MinimalOverwriteBundle {
                ids: vec![1],
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_empty_lists_mean_no_constraint() {
        let rule = RawOverwriteRule::new(1, "guildA", ["ban"], OverwriteAction::Allow)
            .with_roles(json!([]))
            .with_users(json!(null));

        let bundle = normalize(&rule).unwrap();
        assert_eq!(bundle.required_roles, None);
        assert_eq!(bundle.required_users, None);
    }

    #[test]
    fn test_empty_channel_list_is_kept() {
        let rule = RawOverwriteRule::new(1, "guildA", ["ban"], OverwriteAction::Allow)
            .with_channels(json!([]));
        assert_eq!(normalize(&rule).unwrap().required_channels, Some(Vec::new()));
    }

    #[test]
    fn test_collects_errors_across_fields() {
        let rule = RawOverwriteRule::new(5, "guildA", ["ban"], OverwriteAction::Allow)
            .with_channels(json!("c1"))
            .with_roles(json!(["r1", {"bad": true}]))
            .with_users(json!([[["nested"]]]));

        let err = normalize(&rule).unwrap_err();
        let Error::InvalidOverwrite { rule_id, source } = err else {
            panic!("unexpected error variant");
        };
        assert_eq!(rule_id, 5);
        let paths: Vec<&str> = source.errors.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(
            paths,
            vec!["required_channels", "required_roles[1]", "required_users[0][0]"]
        );
    }
}
