/*!
 * Default Football Roles
 * Built-in hierarchy for a grassroots football club
 */

use super::hierarchy::RoleHierarchy;
use super::types::{Role, RoleDefinition};
use crate::core::errors::ConfigError;
use crate::permissions::types::{Action, Permission, Resource};

fn p(resource: Resource, action: Action) -> Permission {
    Permission::new(resource, action)
}

impl RoleHierarchy {
    /// Built-in hierarchy: coach > assistant coach > parent > fan, with
    /// player and referee on fan, and the club/admin chain above coach.
    pub fn football_defaults() -> Result<Self, ConfigError> {
        use Action::*;
        use Resource::{
            Announcement, Club, Match, Message, Payment, Player, Report, Roster, Schedule,
            Settings, Stats, System, Team, Training, User,
        };

        RoleHierarchy::builder()
            .role(
                RoleDefinition::new(Role::Fan)
                    .grant(p(Team, Read))
                    .grant(p(Match, Read))
                    .grant(p(Schedule, Read))
                    .grant(p(Announcement, Read))
                    .grant(p(Message, Read).when_eq("visibility", "public")),
            )
            .role(
                RoleDefinition::new(Role::Parent)
                    .inherit(Role::Fan)
                    .grant(p(Player, Read).when("guardian"))
                    .grant(p(Stats, Read).when("guardian"))
                    .grant(p(Message, Create).when("team_member"))
                    .grant(p(Payment, Create).when("guardian"))
                    .grant(p(Training, Read)),
            )
            .role(
                RoleDefinition::new(Role::Player)
                    .inherit(Role::Fan)
                    .grant(p(Training, Read))
                    .grant(p(Stats, Read).when("own"))
                    .grant(p(Message, Create).when("team_member"))
                    .grant(p(Roster, Read).when("team_member")),
            )
            .role(
                RoleDefinition::new(Role::AssistantCoach)
                    .inherit(Role::Parent)
                    .grant(p(Roster, Read))
                    .grant(p(Training, Create))
                    .grant(p(Training, Update).when("assigned"))
                    .grant(p(Team, Update).when("assigned"))
                    .grant(p(Player, Read))
                    .grant(p(Stats, Update).when("assigned"))
                    .grant(p(Announcement, Create).when("assigned")),
            )
            .role(
                RoleDefinition::new(Role::Coach)
                    .inherit(Role::AssistantCoach)
                    .inherit(Role::Parent)
                    .grant(p(Team, Update))
                    .grant(p(Roster, Update))
                    .grant(p(Roster, Manage))
                    .grant(p(Player, Invite))
                    .grant(p(Training, Manage))
                    .grant(p(Stats, Update))
                    .grant(p(Match, Update))
                    .grant(p(Announcement, Create))
                    .grant(p(Message, Create))
                    .grant(p(Message, Read)),
            )
            .role(
                RoleDefinition::new(Role::Referee)
                    .inherit(Role::Fan)
                    .grant(p(Match, Score).when("assigned"))
                    .grant(p(Report, Create).when("assigned"))
                    .grant(p(Report, Read)),
            )
            .role(
                RoleDefinition::new(Role::ClubOfficial)
                    .inherit(Role::Coach)
                    .grant(p(Club, Read))
                    .grant(p(Club, Update).when("assigned"))
                    .grant(p(Team, Create))
                    .grant(p(Team, Delete).when("assigned"))
                    .grant(p(Payment, Read))
                    .grant(p(Report, Read)),
            )
            .role(
                RoleDefinition::new(Role::Admin)
                    .inherit(Role::ClubOfficial)
                    .inherit(Role::Referee)
                    .grant(p(User, Read))
                    .grant(p(User, Update))
                    .grant(p(Resource::Role, Manage))
                    .grant(p(Club, Manage))
                    .grant(p(Settings, Update)),
            )
            .role(
                RoleDefinition::new(Role::SuperAdmin)
                    .inherit(Role::Admin)
                    .grant(p(System, Manage))
                    .grant(p(User, Delete)),
            )
            .build()
    }
}
