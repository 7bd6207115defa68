/*!
 * Role hierarchy loading and validation
 */

use pitch_guard::permissions::{Action, Permission, Resource};
use pitch_guard::{ConfigError, Role, RoleHierarchy};
use pretty_assertions::assert_eq;

#[test]
fn test_defaults_expose_direct_edges_only() {
    let hierarchy = RoleHierarchy::football_defaults().unwrap();

    assert_eq!(
        hierarchy.inherited_roles(Role::Coach),
        &[Role::AssistantCoach, Role::Parent]
    );
    assert_eq!(hierarchy.inherited_roles(Role::Fan), &[] as &[Role]);

    // Fan's grants are inherited, not copied into coach's own list
    let team_read = Permission::new(Resource::Team, Action::Read);
    assert!(hierarchy.permissions_for_role(Role::Fan).contains(&team_read));
    assert!(!hierarchy.permissions_for_role(Role::Coach).contains(&team_read));
}

#[test]
fn test_every_role_is_defined() {
    let hierarchy = RoleHierarchy::football_defaults().unwrap();
    assert_eq!(hierarchy.roles(), Role::ALL.to_vec());
}

#[test]
fn test_json_hierarchy() {
    let hierarchy = RoleHierarchy::from_json(
        r#"{
            "roles": [
                { "name": "fan", "permissions": [{ "resource": "match", "action": "read" }] },
                {
                    "name": "parent",
                    "inherits": ["fan"],
                    "permissions": [
                        { "resource": "player", "action": "read", "conditions": { "guardian": true } }
                    ]
                }
            ]
        }"#,
    )
    .unwrap();

    assert_eq!(hierarchy.inherited_roles(Role::Parent), &[Role::Fan]);
    let direct = hierarchy.permissions_for_role(Role::Parent);
    assert_eq!(direct.len(), 1);
    assert!(direct[0].is_conditional());
    assert!(!hierarchy.contains(Role::Coach));
    assert!(hierarchy.permissions_for_role(Role::Coach).is_empty());
}

#[test]
fn test_mutual_cycle_is_fatal() {
    let err = RoleHierarchy::from_json(
        r#"{
            "roles": [
                { "name": "coach", "inherits": ["parent"] },
                { "name": "parent", "inherits": ["fan"] },
                { "name": "fan", "inherits": ["coach"] }
            ]
        }"#,
    )
    .unwrap_err();

    match err {
        ConfigError::CyclicInheritance(cycle) => {
            assert_eq!(cycle.first(), cycle.last());
            assert_eq!(cycle.len(), 4);
        }
        other => panic!("expected cycle, got {other}"),
    }
}

#[test]
fn test_self_inheritance_is_fatal() {
    let err = RoleHierarchy::from_json(r#"{ "roles": [{ "name": "fan", "inherits": ["fan"] }] }"#)
        .unwrap_err();
    assert!(matches!(err, ConfigError::SelfInheritance(Role::Fan)));
}

#[test]
fn test_unknown_role_name_is_parse_error() {
    let err = RoleHierarchy::from_json(r#"{ "roles": [{ "name": "groundskeeper" }] }"#).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
}

#[test]
fn test_missing_file_is_io_error() {
    let path = std::env::temp_dir().join(format!("pitch-guard-missing-{}.json", uuid::Uuid::new_v4()));
    let err = RoleHierarchy::load(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
}
