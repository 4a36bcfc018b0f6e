use crate::definition::{DefinitionDocument, Entries, GroupDefinition, SettingDefinition};
use crate::error::{SettingsError, SettingsErrorExt};
use crate::group::{GroupPlan, HandlerKind, SettingGroup, SettingPlan};
use crate::registry::HandlerRegistry;
use crate::setting::Setting;
use fxhash::{FxHashMap, FxHashSet};
use std::path::Path;
use std::sync::{Arc, Weak};
use tracing::{debug, info};

/// A named collection of setting groups, immutable once loaded.
#[derive(Debug)]
pub struct Solution {
    id: String,
    groups: Vec<Arc<SettingGroup>>,
    index: FxHashMap<String, usize>,
}

impl Solution {
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Groups in declaration order.
    #[must_use]
    pub fn groups(&self) -> &[Arc<SettingGroup>] {
        &self.groups
    }

    #[must_use]
    pub fn group(&self, id: &str) -> Option<&Arc<SettingGroup>> {
        self.index.get(id).map(|&i| &self.groups[i])
    }

    /// # Errors
    /// Returns [`SettingsError::NotFound`] if the solution has no group `id`.
    pub fn get_group(&self, id: &str) -> Result<Arc<SettingGroup>, SettingsError> {
        self.group(id)
            .cloned()
            .ok_or_else(|| SettingsError::not_found("group", id))
            .context(format!("Solution `{}`", self.id))
    }

    /// Looks up a setting by group id and setting id.
    ///
    /// # Errors
    /// Returns [`SettingsError::NotFound`] if either id is unknown.
    pub fn get_setting(
        &self,
        group_id: &str,
        setting_id: &str,
    ) -> Result<Arc<Setting>, SettingsError> {
        let group = self.get_group(group_id)?;
        group
            .setting(setting_id)
            .cloned()
            .ok_or_else(|| SettingsError::not_found("setting", setting_id))
            .context(format!("Group `{}.{group_id}`", self.id))
    }
}

/// Every solution loaded from one definition source.
///
/// Loading is all or nothing: either every group is bound to a handler, or the load
/// fails and nothing is returned.
#[derive(Debug, Default)]
pub struct Solutions {
    solutions: Vec<Arc<Solution>>,
    index: FxHashMap<String, usize>,
}

struct SolutionPlan {
    id: String,
    groups: Vec<GroupPlan>,
}

impl Solutions {
    /// Builds the solution tree for `document`, resolving every group's handler.
    ///
    /// # Errors
    /// * [`SettingsError::DuplicateIdentifier`] for a repeated solution, group or setting id.
    /// * [`SettingsError::UnknownHandlerType`] for a group whose tag is not registered.
    /// * Any error raised by a handler factory.
    pub fn load(
        document: &DefinitionDocument,
        registry: &HandlerRegistry,
    ) -> Result<Self, SettingsError> {
        let mut seen = FxHashSet::default();
        let mut plans = Vec::new();

        for (solution_id, groups) in document.solutions() {
            ensure_unique(&mut seen, solution_id, "Solution")?;
            plans.push(SolutionPlan {
                id: solution_id.to_owned(),
                groups: plan_groups(solution_id, groups, registry)?,
            });
        }

        let solutions: Vec<Arc<Solution>> = plans.into_iter().map(build_solution).collect();
        let index = solutions.iter().enumerate().map(|(i, s)| (s.id.clone(), i)).collect();

        info!(solutions = solutions.len(), "Loaded solutions");
        Ok(Self { solutions, index })
    }

    /// Parses a JSON document and loads it.
    ///
    /// # Errors
    /// See [`DefinitionDocument::from_json`] and [`Solutions::load`].
    pub fn from_json_str(input: &str, registry: &HandlerRegistry) -> Result<Self, SettingsError> {
        Self::load(&DefinitionDocument::from_json(input)?, registry)
    }

    /// Reads a JSON or TOML document from disk and loads it.
    ///
    /// # Errors
    /// See [`DefinitionDocument::from_path`] and [`Solutions::load`].
    pub fn from_path(
        path: impl AsRef<Path>,
        registry: &HandlerRegistry,
    ) -> Result<Self, SettingsError> {
        Self::load(&DefinitionDocument::from_path(path)?, registry)
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Arc<Solution>> {
        self.index.get(id).map(|&i| &self.solutions[i])
    }

    /// Solutions in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Solution>> {
        self.solutions.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.solutions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.solutions.is_empty()
    }
}

impl<'a> IntoIterator for &'a Solutions {
    type Item = &'a Arc<Solution>;
    type IntoIter = std::slice::Iter<'a, Arc<Solution>>;

    fn into_iter(self) -> Self::IntoIter {
        self.solutions.iter()
    }
}

fn ensure_unique<'a>(
    seen: &mut FxHashSet<&'a str>,
    id: &'a str,
    scope: &'static str,
) -> Result<(), SettingsError> {
    if seen.insert(id) {
        Ok(())
    } else {
        Err(SettingsError::DuplicateIdentifier {
            message: id.to_owned().into(),
            context: Some(scope.into()),
        })
    }
}

fn plan_groups(
    solution_id: &str,
    groups: &Entries<GroupDefinition>,
    registry: &HandlerRegistry,
) -> Result<Vec<GroupPlan>, SettingsError> {
    let mut seen = FxHashSet::default();
    let mut plans = Vec::with_capacity(groups.len());

    for (group_id, group) in groups.iter() {
        let scope = format!("Group `{solution_id}.{group_id}`");
        ensure_unique(&mut seen, group_id, "Group")
            .context(format!("Group id in solution `{solution_id}`"))?;

        let settings = plan_settings(&group.settings).context(scope.clone())?;
        let handler = registry.resolve(&group.handler_type).context(scope)?;
        debug!(
            solution = solution_id,
            group = group_id,
            handler = %group.handler_type,
            "Resolved handler"
        );

        plans.push(GroupPlan {
            id: group_id.to_owned(),
            path: group.path.clone(),
            kind: HandlerKind::from_tag(&group.handler_type),
            handler,
            settings,
        });
    }

    Ok(plans)
}

fn plan_settings(settings: &Entries<SettingDefinition>) -> Result<Vec<SettingPlan>, SettingsError> {
    let mut seen = FxHashSet::default();
    settings
        .iter()
        .map(|(id, setting)| {
            ensure_unique(&mut seen, id, "Setting")?;
            Ok(SettingPlan {
                id: id.to_owned(),
                name: setting.name.clone(),
                data_type: setting.data_type,
            })
        })
        .collect()
}

fn build_solution(plan: SolutionPlan) -> Arc<Solution> {
    Arc::new_cyclic(|me: &Weak<Solution>| {
        let groups: Vec<Arc<SettingGroup>> =
            plan.groups.into_iter().map(|g| SettingGroup::build(g, me.clone())).collect();
        let index = groups.iter().enumerate().map(|(i, g)| (g.id().to_owned(), i)).collect();
        Solution { id: plan.id, groups, index }
    })
}
