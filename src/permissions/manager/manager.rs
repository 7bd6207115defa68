/*!
 * Access Manager
 * Central entry point every enforcement surface calls into
 */

use super::verdict::{Denial, Grant, Verdict};
use crate::core::errors::FetchError;
use crate::core::AccessConfig;
use crate::monitoring::AccessSpan;
use crate::permissions::audit::{AuditEvent, AuditLogger, AuditStats};
use crate::permissions::cache::{AccessCache, CacheStats, CleanupTask, RouteAccessKey};
use crate::permissions::policy::{normalize_path, RoutePolicy};
use crate::permissions::resolver::{PermissionResolver, PermissionSet};
use crate::permissions::types::{
    AccessDecision, AccessType, DenialReason, RoleAssignment, RoleSource, RoleWriter, ScopedRole,
    Surface, UserContext, UserData,
};
use crate::roles::{Role, RoleHierarchy};
use std::sync::Arc;
use tracing::{debug, info, warn, Instrument};

/// Central access manager. Cheap to clone; all state is shared.
#[derive(Clone)]
pub struct AccessManager {
    source: Arc<dyn RoleSource>,
    resolver: Arc<PermissionResolver>,
    policy: Arc<RoutePolicy>,
    cache: Arc<AccessCache>,
    audit: Arc<AuditLogger>,
    config: AccessConfig,
}

impl AccessManager {
    pub fn new(
        source: Arc<dyn RoleSource>,
        hierarchy: RoleHierarchy,
        policy: RoutePolicy,
        config: AccessConfig,
    ) -> Self {
        debug!("Initializing access manager");
        Self {
            source,
            resolver: Arc::new(PermissionResolver::new(Arc::new(hierarchy))),
            policy: Arc::new(policy),
            cache: Arc::new(AccessCache::new(&config)),
            audit: Arc::new(AuditLogger::new()),
            config,
        }
    }

    /// Share an existing cache (e.g. between managers in one process)
    pub fn with_cache(mut self, cache: Arc<AccessCache>) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_audit(mut self, audit: Arc<AuditLogger>) -> Self {
        self.audit = audit;
        self
    }

    /// Start the background expiry sweep for this manager's cache
    pub fn spawn_cleanup(&self) -> CleanupTask {
        CleanupTask::spawn(&self.cache, self.config.cleanup_interval)
    }

    pub fn policy(&self) -> &RoutePolicy {
        &self.policy
    }

    pub fn resolver(&self) -> &PermissionResolver {
        &self.resolver
    }

    pub fn cache(&self) -> &Arc<AccessCache> {
        &self.cache
    }

    pub fn audit(&self) -> &AuditLogger {
        &self.audit
    }

    pub fn config(&self) -> &AccessConfig {
        &self.config
    }

    /// Pure route policy check
    pub fn check_access(&self, pathname: &str, roles: &[Role]) -> AccessDecision {
        self.policy.check_access(pathname, roles)
    }

    /// Resolved data for a user, from cache or the role source.
    ///
    /// The fetch runs on its own task: if the caller is dropped mid-flight the
    /// result still lands in the cache. Failures and timeouts are not cached,
    /// and neither is a result that raced an invalidation of the same user.
    pub async fn user_data(&self, user_id: &str) -> Result<Arc<UserData>, FetchError> {
        if let Some(data) = self.cache.get_user_data(user_id) {
            return Ok(data);
        }
        let generation = self.cache.user_generation(user_id);

        let source = Arc::clone(&self.source);
        let resolver = Arc::clone(&self.resolver);
        let cache = Arc::clone(&self.cache);
        let timeout = self.config.fetch_timeout;
        let ttl = self.config.user_ttl;
        let user_id = user_id.to_string();

        let task = tokio::spawn(async move {
            let data = tokio::time::timeout(timeout, load_user_data(&*source, &resolver, &user_id))
                .await
                .map_err(|_| FetchError::Timeout(timeout))??;
            let data = Arc::new(data);
            cache.set_user_data_if_current(user_id, Arc::clone(&data), ttl, generation);
            Ok::<_, FetchError>(data)
        });

        task.await.map_err(|e| FetchError::Task(e.to_string()))?
    }

    pub async fn user_context(&self, user_id: &str) -> Result<UserContext, FetchError> {
        let data = self.user_data(user_id).await?;
        Ok(UserContext::new(user_id, data))
    }

    /// Decide whether `user_id` (if any) may reach `path` on `surface`.
    ///
    /// Never fails: upstream errors resolve to zero roles and a denial.
    pub async fn authorize(&self, surface: Surface, user_id: Option<&str>, path: &str) -> Verdict {
        let pathname = normalize_path(path);
        let span = AccessSpan::new(surface, pathname, user_id);

        let verdict = self
            .decide(user_id, pathname)
            .instrument(span.span().clone())
            .await;

        let event = match &verdict {
            Verdict::Granted(grant) => {
                span.record_granted(grant.cached);
                AuditEvent::granted(surface, pathname, user_id, Some(grant.access_type))
            }
            Verdict::Denied(denial) => {
                span.record_denied(denial.reason);
                AuditEvent::denied(surface, pathname, user_id, denial.access_type, denial.reason)
            }
        };
        self.audit.log(event);

        verdict
    }

    async fn decide(&self, user_id: Option<&str>, pathname: &str) -> Verdict {
        if self.policy.is_public(pathname) {
            return Verdict::Granted(Grant {
                context: None,
                access_type: AccessType::Public,
                cached: false,
            });
        }

        let Some(user_id) = user_id else {
            return Verdict::Denied(Denial {
                reason: DenialReason::LoginRequired,
                access_type: None,
                required_roles: None,
                redirect_to: self.policy.login_path().to_string(),
                context: None,
            });
        };

        let (context, upstream_failed) = match self.user_context(user_id).await {
            Ok(context) => (context, false),
            Err(e) => {
                warn!(user_id, error = %e, "role lookup failed, treating user as holding no roles");
                (UserContext::without_roles(user_id), true)
            }
        };

        // An identified user can always finish setting up their profile
        if pathname == self.policy.profile_setup_path() {
            return Verdict::Granted(Grant {
                context: Some(context),
                access_type: AccessType::Authenticated,
                cached: false,
            });
        }

        let roles = context.roles();
        let key = RouteAccessKey::new(user_id, pathname, roles);
        let cached = if upstream_failed {
            None
        } else {
            self.cache.get_route_access(&key)
        };

        let from_cache = cached.is_some();
        let decision = match cached {
            Some(decision) => decision,
            None => {
                let decision = self.policy.check_access(pathname, roles);
                if !upstream_failed {
                    self.cache
                        .set_route_access(key, decision.clone(), self.config.route_ttl);
                }
                decision
            }
        };

        if decision.has_access {
            return Verdict::Granted(Grant {
                context: Some(context),
                access_type: decision.access_type,
                cached: from_cache,
            });
        }

        let reason = if upstream_failed {
            DenialReason::UpstreamUnavailable
        } else if roles.is_empty() {
            DenialReason::ProfileSetupRequired
        } else {
            DenialReason::InsufficientRole
        };
        let redirect_to = decision
            .suggested_redirect
            .unwrap_or_else(|| self.policy.redirect_for(roles).to_string());

        Verdict::Denied(Denial {
            reason,
            access_type: Some(decision.access_type),
            required_roles: decision.required_roles,
            redirect_to,
            context: Some(context),
        })
    }

    /// `authorize`, then additionally require one of `roles` (empty means no extra gate).
    ///
    /// Public routes still resolve the identified user so the role gate can apply.
    pub async fn authorize_with_roles(
        &self,
        surface: Surface,
        user_id: Option<&str>,
        path: &str,
        roles: &[Role],
    ) -> Verdict {
        let verdict = self.authorize(surface, user_id, path).await;
        if roles.is_empty() {
            return verdict;
        }
        let grant = match verdict {
            Verdict::Granted(grant) => grant,
            denied => return denied,
        };

        let context = match (grant.context, user_id) {
            (Some(context), _) => context,
            (None, Some(user_id)) => self.user_context(user_id).await.unwrap_or_else(|e| {
                warn!(user_id, error = %e, "role lookup failed, treating user as holding no roles");
                UserContext::without_roles(user_id)
            }),
            (None, None) => {
                self.audit.log(AuditEvent::denied(
                    surface,
                    normalize_path(path),
                    None,
                    Some(grant.access_type),
                    DenialReason::LoginRequired,
                ));
                return Verdict::Denied(Denial {
                    reason: DenialReason::LoginRequired,
                    access_type: Some(grant.access_type),
                    required_roles: Some(roles.to_vec()),
                    redirect_to: self.policy.login_path().to_string(),
                    context: None,
                });
            }
        };

        match self.require_any_role(surface, &context, path, roles) {
            Ok(()) => Verdict::Granted(Grant {
                context: Some(context),
                access_type: grant.access_type,
                cached: grant.cached,
            }),
            Err(denial) => Verdict::Denied(denial),
        }
    }

    /// Extra role gate on top of a granted verdict (layout and API checks)
    pub fn require_any_role(
        &self,
        surface: Surface,
        context: &UserContext,
        path: &str,
        roles: &[Role],
    ) -> Result<(), Denial> {
        if context.has_any_role(roles) {
            return Ok(());
        }

        let reason = if context.roles().is_empty() {
            DenialReason::ProfileSetupRequired
        } else {
            DenialReason::InsufficientRole
        };
        let pathname = normalize_path(path);
        self.audit.log(AuditEvent::denied(
            surface,
            pathname,
            Some(context.user_id()),
            Some(AccessType::RoleSpecific),
            reason,
        ));

        Err(Denial {
            reason,
            access_type: Some(AccessType::RoleSpecific),
            required_roles: Some(roles.to_vec()),
            redirect_to: self.policy.redirect_for(context.roles()).to_string(),
            context: Some(context.clone()),
        })
    }

    /// Drop every cached entry for the user. Call on any role assignment change.
    pub fn invalidate_user(&self, user_id: &str) {
        self.cache.invalidate_user(user_id);
        info!(user_id, "cached access invalidated");
    }

    pub async fn assign_role(
        &self,
        writer: &dyn RoleWriter,
        user_id: &str,
        assignment: RoleAssignment,
    ) -> Result<(), FetchError> {
        writer.assign_role(user_id, assignment).await?;
        self.invalidate_user(user_id);
        Ok(())
    }

    pub async fn revoke_role(
        &self,
        writer: &dyn RoleWriter,
        user_id: &str,
        role: Role,
    ) -> Result<bool, FetchError> {
        let removed = writer.revoke_role(user_id, role).await?;
        if removed {
            self.invalidate_user(user_id);
        }
        Ok(removed)
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn audit_stats(&self) -> AuditStats {
        self.audit.stats()
    }
}

/// Fetch assignments and grants for one user and resolve them
async fn load_user_data(
    source: &dyn RoleSource,
    resolver: &PermissionResolver,
    user_id: &str,
) -> Result<UserData, FetchError> {
    let assignments = source.fetch_role_assignments(user_id).await?;

    let mut data = UserData::default();
    for assignment in assignments.into_iter().filter(|a| a.active) {
        let role = match assignment.role.parse::<Role>() {
            Ok(role) => role,
            Err(e) => {
                warn!(user_id, error = %e, "skipping unknown role assignment");
                continue;
            }
        };

        if !data.roles.contains(&role) {
            data.roles.push(role);
        }
        if let Some(team_id) = &assignment.team_id {
            if !data.active_teams.contains(team_id) {
                data.active_teams.push(team_id.clone());
            }
        }
        if let Some(club_id) = &assignment.club_id {
            if !data.active_clubs.contains(club_id) {
                data.active_clubs.push(club_id.clone());
            }
        }
        data.assignments.push(ScopedRole {
            role,
            team_id: assignment.team_id,
            club_id: assignment.club_id,
        });
    }

    let expanded = resolver.expand_roles(data.roles.iter().copied());
    let mut permissions: PermissionSet = resolver.resolve_permissions(expanded.iter().copied());
    if !expanded.is_empty() {
        let grants = source.fetch_permission_grants(&expanded).await?;
        permissions.extend(
            grants
                .into_iter()
                .filter(|g| expanded.contains(&g.role))
                .map(|g| g.permission),
        );
    }
    data.permissions = permissions;

    debug!(
        user_id,
        roles = data.roles.len(),
        permissions = data.permissions.len(),
        "user access data resolved"
    );
    Ok(data)
}
