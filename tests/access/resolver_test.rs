/*!
 * Permission resolution: inheritance, diamonds, tie-breaks and conditions
 */

use pitch_guard::permissions::{
    has_permission, Action, ConditionContext, Permission, PermissionKey, PermissionResolver,
    PermissionSet, Resource,
};
use pitch_guard::{Role, RoleDefinition, RoleHierarchy};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::collections::BTreeSet;
use std::sync::Arc;

fn defaults() -> PermissionResolver {
    PermissionResolver::new(Arc::new(RoleHierarchy::football_defaults().unwrap()))
}

fn keys(set: &PermissionSet) -> BTreeSet<PermissionKey> {
    set.keys().collect()
}

#[test]
fn test_inheritance_chain_is_superset() {
    let resolver = defaults();
    let chain = [
        Role::SuperAdmin,
        Role::Admin,
        Role::ClubOfficial,
        Role::Coach,
        Role::AssistantCoach,
        Role::Parent,
        Role::Fan,
    ];

    for pair in chain.windows(2) {
        let child = resolver.resolve_permissions([pair[0]]);
        let parent = resolver.resolve_permissions([pair[1]]);
        assert!(
            child.is_superset(&parent),
            "{} should include everything {} has",
            pair[0],
            pair[1]
        );
        assert!(child.len() > parent.len());
    }
}

#[test]
fn test_diamond_collapses_to_exact_union() {
    // coach -> {assistant_coach, parent} -> fan
    let hierarchy = RoleHierarchy::builder()
        .role(RoleDefinition::new(Role::Fan).grant(Permission::new(Resource::Match, Action::Read)))
        .role(
            RoleDefinition::new(Role::AssistantCoach)
                .inherit(Role::Fan)
                .grant(Permission::new(Resource::Training, Action::Create)),
        )
        .role(
            RoleDefinition::new(Role::Parent)
                .inherit(Role::Fan)
                .grant(Permission::new(Resource::Payment, Action::Create)),
        )
        .role(
            RoleDefinition::new(Role::Coach)
                .inherit(Role::AssistantCoach)
                .inherit(Role::Parent)
                .grant(Permission::new(Resource::Roster, Action::Manage)),
        )
        .build()
        .unwrap();
    let resolver = PermissionResolver::new(Arc::new(hierarchy));

    assert_eq!(
        resolver.expand_roles([Role::Coach]),
        vec![Role::Coach, Role::AssistantCoach, Role::Fan, Role::Parent]
    );

    let resolved = resolver.resolve_permissions([Role::Coach]);
    let expected: BTreeSet<PermissionKey> = [
        (Resource::Match, Action::Read),
        (Resource::Training, Action::Create),
        (Resource::Payment, Action::Create),
        (Resource::Roster, Action::Manage),
    ]
    .into_iter()
    .map(|(resource, action)| PermissionKey { resource, action })
    .collect();

    assert_eq!(keys(&resolved), expected);
    assert_eq!(resolved.len(), 4);
}

#[test]
fn test_unconditioned_grant_wins_regardless_of_order() {
    let resolver = defaults();
    for roles in [vec![Role::Fan, Role::Coach], vec![Role::Coach, Role::Fan]] {
        let resolved = resolver.resolve_permissions(roles);
        let grant = resolved.get(Resource::Message, Action::Read).unwrap();
        assert!(!grant.is_conditional());
        assert!(has_permission(&resolved, Resource::Message, Action::Read, None));
    }
}

#[test]
fn test_conditions_are_checked_against_context() {
    let resolver = defaults();
    let parent = resolver.resolve_permissions([Role::Parent]);

    assert!(!has_permission(&parent, Resource::Player, Action::Read, None));
    assert!(!has_permission(
        &parent,
        Resource::Player,
        Action::Read,
        Some(&ConditionContext::new().with("guardian", false))
    ));
    assert!(has_permission(
        &parent,
        Resource::Player,
        Action::Read,
        Some(&ConditionContext::new().with("guardian", true))
    ));

    let fan = resolver.resolve_permissions([Role::Fan]);
    let public = ConditionContext::new().with("visibility", "public");
    let private = ConditionContext::new().with("visibility", "private");
    assert!(has_permission(&fan, Resource::Message, Action::Read, Some(&public)));
    assert!(!has_permission(&fan, Resource::Message, Action::Read, Some(&private)));
    assert!(!has_permission(&fan, Resource::Roster, Action::Update, Some(&public)));
}

#[test]
fn test_unknown_role_names_contribute_nothing() {
    let resolver = defaults();
    assert_eq!(
        resolver.resolve_names(&["coach", "groundskeeper"]),
        resolver.resolve_permissions([Role::Coach])
    );
    assert!(resolver.resolve_names(&["groundskeeper"]).is_empty());
}

fn role_set() -> impl Strategy<Value = Vec<Role>> {
    prop::collection::vec(prop::sample::select(Role::ALL.to_vec()), 0..6)
}

proptest! {
    #[test]
    fn prop_union_covers_each_member(roles in role_set()) {
        let resolver = defaults();
        let union = resolver.resolve_permissions(roles.iter().copied());
        for role in &roles {
            prop_assert!(union.is_superset(&resolver.resolve_permissions([*role])));
        }
    }

    #[test]
    fn prop_input_order_does_not_change_keys(roles in role_set()) {
        let resolver = defaults();
        let forward = resolver.resolve_permissions(roles.iter().copied());
        let backward = resolver.resolve_permissions(roles.iter().rev().copied());
        prop_assert_eq!(keys(&forward), keys(&backward));
    }

    #[test]
    fn prop_each_role_expanded_once(roles in role_set()) {
        let expanded = defaults().expand_roles(roles.iter().copied());
        let unique: BTreeSet<Role> = expanded.iter().copied().collect();
        prop_assert_eq!(unique.len(), expanded.len());
    }
}
