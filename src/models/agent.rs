//! Agent (contributor) model and agent deduplication

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use strsim::jaro_winkler;

use super::{DataObject, Date};

/// Minimum name similarity for two agents to be considered the same person
pub const AGENT_MATCH_THRESHOLD: f64 = 0.8;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub name: String,
    #[serde(default)]
    pub sort_name: Option<String>,
    #[serde(default)]
    pub lcnaf: Option<String>,
    #[serde(default)]
    pub viaf: Option<String>,
    #[serde(default)]
    pub biography: Option<String>,
    #[serde(default)]
    pub aliases: Vec<String>,
    /// Always a list, even when a single role string or code was supplied
    #[serde(default, alias = "role", deserialize_with = "deserialize_roles")]
    pub roles: Vec<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub dates: Vec<Date>,
}

impl Agent {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sort_name: None,
            lcnaf: None,
            viaf: None,
            biography: None,
            aliases: Vec::new(),
            roles: Vec::new(),
            link: None,
            dates: Vec::new(),
        }
    }

    /// Agent with a single role; numeric relator codes are accepted too
    pub fn with_role(name: impl Into<String>, role: impl ToString) -> Self {
        let mut agent = Self::new(name);
        agent.roles.push(role.to_string());
        agent
    }

    pub fn aliases(mut self, aliases: Vec<String>) -> Self {
        self.aliases = aliases;
        self
    }

    /// Fold `other` into this agent. Aliases and roles are concatenated, any
    /// field still unset here is taken from `other`; set fields are kept.
    pub fn merge_from(&mut self, other: &Agent) {
        self.aliases.extend(other.aliases.iter().cloned());
        self.roles.extend(other.roles.iter().cloned());
        backfill(&mut self.sort_name, &other.sort_name);
        backfill(&mut self.lcnaf, &other.lcnaf);
        backfill(&mut self.viaf, &other.viaf);
        backfill(&mut self.biography, &other.biography);
        backfill(&mut self.link, &other.link);
    }
}

impl DataObject for Agent {}

fn backfill(target: &mut Option<String>, source: &Option<String>) {
    if target.is_none() {
        target.clone_from(source);
    }
}

fn deserialize_roles<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Role {
        Text(String),
        Code(i64),
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Roles {
        One(Role),
        Many(Vec<Role>),
    }

    let to_string = |role: Role| match role {
        Role::Text(s) => s,
        Role::Code(c) => c.to_string(),
    };

    Ok(match Option::<Roles>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(Roles::One(role)) => vec![to_string(role)],
        Some(Roles::Many(roles)) => roles.into_iter().map(to_string).collect(),
    })
}

/// Case-insensitive Jaro-Winkler similarity of two display names
pub fn name_similarity(a: &str, b: &str) -> f64 {
    jaro_winkler(&a.to_lowercase(), &b.to_lowercase())
}

/// Merge a freshly parsed agent list with a previously known one.
///
/// Each existing agent is folded into the first new agent whose name is
/// similar enough, and the result is keyed by the new agent's name. Unmatched
/// existing agents are kept as they are; new agents not yet present are added
/// unchanged. Ties go to the first match in list order.
pub fn merge_agents(new_agents: Vec<Agent>, existing: Vec<Agent>) -> IndexMap<String, Agent> {
    let mut merged: IndexMap<String, Agent> = IndexMap::new();

    for agent in existing {
        let candidate = new_agents
            .iter()
            .find(|new| name_similarity(&new.name, &agent.name) > AGENT_MATCH_THRESHOLD);

        match candidate {
            Some(new) => {
                tracing::debug!("Merging agent '{}' into '{}'", agent.name, new.name);
                merged
                    .entry(new.name.clone())
                    .or_insert_with(|| new.clone())
                    .merge_from(&agent);
            }
            None => {
                merged.insert(agent.name.clone(), agent);
            }
        }
    }

    for agent in new_agents {
        if !merged.contains_key(&agent.name) {
            merged.insert(agent.name.clone(), agent);
        }
    }

    merged
}
