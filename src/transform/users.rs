//! User identity and placeholder synthesis.

use std::collections::BTreeMap;

use rand::Rng;
use rand::distributions::Alphanumeric;

use super::Transformer;
use super::models::IntermediateUser;
use crate::export::RawUser;
use crate::report::{Reporter, Warning, WarningKind};

const PASSWORD_LEN: usize = 26;

/// Generates a random 26 character lowercase alphanumeric password.
pub fn new_password() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(PASSWORD_LEN)
        .map(char::from)
        .collect::<String>()
        .to_lowercase()
}

impl IntermediateUser {
    /// Fills in a placeholder email when the export has none.
    pub fn sanitize(&mut self, reporter: &dyn Reporter) {
        if self.email.is_empty() {
            self.email = format!("{}@example.com", self.username);
            reporter.report(Warning::new(
                WarningKind::MissingEmail,
                format!(
                    "User {} does not have an email address in the Slack export. Used {} as a placeholder.",
                    self.username, self.email
                ),
            ));
        }
    }

    fn placeholder(user_id: &str) -> Self {
        Self {
            id: user_id.to_string(),
            username: user_id.to_lowercase(),
            first_name: "Deleted".to_string(),
            last_name: "User".to_string(),
            email: format!("{user_id}@local"),
            password: new_password(),
            ..Self::default()
        }
    }
}

impl Transformer {
    /// Builds the user index. Bots are keyed by their bot id.
    pub fn transform_users(&mut self, users: &[RawUser]) {
        tracing::info!("Transforming users");

        let mut result = BTreeMap::new();
        for raw in users {
            let id = if raw.is_bot {
                raw.profile.bot_id.clone()
            } else {
                raw.id.clone()
            };
            let mut user = IntermediateUser {
                id,
                username: raw.username.clone(),
                first_name: raw.profile.first_name.clone(),
                last_name: raw.profile.last_name.clone(),
                position: raw.profile.title.clone(),
                email: raw.profile.email.clone(),
                password: new_password(),
                memberships: Vec::new(),
            };

            self.overrides.apply_user(&mut user, &*self.reporter);
            user.sanitize(&*self.reporter);
            tracing::debug!(username = %user.username, email = %user.email, "Imported Slack user");
            result.insert(user.id.clone(), user);
        }

        self.intermediate.users_by_id = result;
    }

    /// Returns the username for `user_id`, creating a "Deleted User" when the
    /// id is unknown.
    pub(crate) fn resolve_username(&mut self, user_id: &str) -> String {
        let overrides = &self.overrides;
        let reporter = &*self.reporter;
        self.intermediate
            .users_by_id
            .entry(user_id.to_string())
            .or_insert_with(|| {
                let mut user = IntermediateUser::placeholder(user_id);
                overrides.apply_user(&mut user, reporter);
                reporter.report(Warning::new(
                    WarningKind::PlaceholderUser,
                    format!(
                        "Created a new user because the original user was missing from the import files. user={user_id}"
                    ),
                ));
                user
            })
            .username
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::CollectingReporter;
    use std::sync::Arc;

    #[test]
    fn test_new_password() {
        let password = new_password();
        assert_eq!(password.len(), PASSWORD_LEN);
        assert!(
            password
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        );
        assert_ne!(new_password(), new_password());
    }

    #[test]
    fn test_sanitize_fills_placeholder_email() {
        let reporter = CollectingReporter::new();
        let mut user = IntermediateUser {
            username: "bob".into(),
            ..IntermediateUser::default()
        };
        user.sanitize(&reporter);
        assert_eq!(user.email, "bob@example.com");
        assert_eq!(reporter.count(WarningKind::MissingEmail), 1);

        user.sanitize(&reporter);
        assert_eq!(reporter.count(WarningKind::MissingEmail), 1);
    }

    #[test]
    fn test_transform_users_keys_bots_by_bot_id() {
        let reporter = Arc::new(CollectingReporter::new());
        let mut transformer = Transformer::new().with_reporter(reporter.clone());
        transformer.transform_users(&[
            RawUser::new("U1", "alice").with_email("alice@x.io"),
            RawUser::new("U2", "deploybot").with_bot_id("B9"),
        ]);

        let users = &transformer.intermediate.users_by_id;
        assert_eq!(users.len(), 2);
        assert_eq!(users["U1"].email, "alice@x.io");
        assert_eq!(users["B9"].username, "deploybot");
        assert_eq!(users["B9"].email, "deploybot@example.com");
        assert!(!users.contains_key("U2"));
        assert_eq!(reporter.count(WarningKind::MissingEmail), 1);
    }

    #[test]
    fn test_resolve_username_creates_placeholder_once() {
        let reporter = Arc::new(CollectingReporter::new());
        let mut transformer = Transformer::new().with_reporter(reporter.clone());

        assert_eq!(transformer.resolve_username("UGONE"), "ugone");
        assert_eq!(transformer.resolve_username("UGONE"), "ugone");
        assert_eq!(reporter.count(WarningKind::PlaceholderUser), 1);

        let user = &transformer.intermediate.users_by_id["UGONE"];
        assert_eq!(user.first_name, "Deleted");
        assert_eq!(user.last_name, "User");
        assert_eq!(user.email, "UGONE@local");
    }
}
