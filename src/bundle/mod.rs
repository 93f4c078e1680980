// ABOUTME: Action bundles: the ordered, non-empty action sequence built for one package.
// ABOUTME: Re-exports the factory that builds them and the executor that runs them.

mod error;
mod executor;
mod factory;
mod result;
mod state;

pub use error::BundleError;
pub use executor::{BundleExecutor, execute, invoke};
pub use factory::{BundleFactory, Policy, Step};
pub use result::ActionBundleExecutionResult;
pub use state::{Finished, NotStarted, Running};

use nonempty::NonEmpty;
use std::fmt;

use crate::actions::{Action, Simulated};
use crate::types::TargetEnvironment;

/// An ordered sequence of actions for one package.
///
/// Always holds at least one action; [`ActionBundle::new`] refuses an empty
/// list, so the executor never sees one.
pub struct ActionBundle {
    package: String,
    target_environment: TargetEnvironment,
    actions: NonEmpty<Box<dyn Action>>,
}

impl ActionBundle {
    pub fn new(
        package: impl Into<String>,
        target_environment: TargetEnvironment,
        actions: Vec<Box<dyn Action>>,
    ) -> Result<Self, BundleError> {
        let package = package.into();
        let actions = NonEmpty::from_vec(actions).ok_or_else(|| BundleError::Empty {
            package: package.clone(),
        })?;
        Ok(Self {
            package,
            target_environment,
            actions,
        })
    }

    /// Name of the package the bundle deploys.
    pub fn package(&self) -> &str {
        &self.package
    }

    pub fn target_environment(&self) -> TargetEnvironment {
        self.target_environment
    }

    pub fn actions(&self) -> impl Iterator<Item = &dyn Action> {
        self.actions.iter().map(|a| a.as_ref())
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn action_names(&self) -> Vec<String> {
        self.actions().map(|a| a.name().into_owned()).collect()
    }

    /// Wrap every action so running the bundle changes nothing.
    pub fn simulated(self) -> Self {
        Self {
            package: self.package,
            target_environment: self.target_environment,
            actions: self
                .actions
                .map(|action| Box::new(Simulated::new(action)) as Box<dyn Action>),
        }
    }
}

impl fmt::Debug for ActionBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionBundle")
            .field("package", &self.package)
            .field("target_environment", &self.target_environment)
            .field("actions", &self.action_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::{ActionError, ActionKind, ActionOutcome};

    struct Fixed(ActionKind);

    impl Action for Fixed {
        fn kind(&self) -> ActionKind {
            self.0
        }

        fn describe(&self) -> String {
            String::new()
        }

        fn execute(&self) -> Result<ActionOutcome, ActionError> {
            Ok(ActionOutcome::done())
        }
    }

    #[test]
    fn empty_bundle_is_rejected() {
        let err = ActionBundle::new("Shop", TargetEnvironment::Test, Vec::new()).unwrap_err();
        assert!(matches!(err, BundleError::Empty { ref package } if package == "Shop"));
    }

    #[test]
    fn keeps_action_order() {
        let bundle = ActionBundle::new(
            "Shop",
            TargetEnvironment::Test,
            vec![
                Box::new(Fixed(ActionKind::StopSite)),
                Box::new(Fixed(ActionKind::StartSite)),
            ],
        )
        .unwrap();
        assert_eq!(bundle.len(), 2);
        assert_eq!(bundle.action_names(), vec!["Stop site", "Start site"]);
    }

    #[test]
    fn simulated_bundle_keeps_names() {
        let bundle = ActionBundle::new(
            "Shop",
            TargetEnvironment::Test,
            vec![Box::new(Fixed(ActionKind::ReleaseNotes))],
        )
        .unwrap()
        .simulated();
        assert_eq!(bundle.action_names(), vec!["Release notes"]);
    }
}
