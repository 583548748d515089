//! Name authority enrichment of contributors

use crate::{
    models::Agent,
    services::lookup::{AgentAuthority, AgentLookup},
};

/// Roles looked up as corporate names
const CORPORATE_ROLES: [&str; 2] = ["publisher", "manufacturer"];

fn is_corporate(agent: &Agent) -> bool {
    agent.roles.iter().any(|role| CORPORATE_ROLES.contains(&role.as_str()))
}

/// Look up every agent in turn. Failed lookups leave the agent unchanged.
pub async fn enrich_agents(lookup: &dyn AgentLookup, agents: &mut [Agent]) -> usize {
    let mut enriched = 0;
    for agent in agents.iter_mut() {
        if enrich_agent(lookup, agent).await {
            enriched += 1;
        }
    }
    enriched
}

/// Returns whether the authority answer carried a VIAF id
pub async fn enrich_agent(lookup: &dyn AgentLookup, agent: &mut Agent) -> bool {
    match lookup.lookup_agent(&agent.name, is_corporate(agent)).await {
        Ok(authority) => apply_authority(agent, authority),
        Err(e) => {
            tracing::warn!("Authority lookup failed for '{}': {}", agent.name, e);
            false
        }
    }
}

/// A differing authority name becomes the agent name and the old name an
/// alias. Answers without a VIAF id are ignored.
pub fn apply_authority(agent: &mut Agent, authority: AgentAuthority) -> bool {
    let Some(viaf) = authority.viaf else {
        tracing::debug!("No authority match for '{}'", agent.name);
        return false;
    };

    if let Some(name) = authority.name.filter(|name| *name != agent.name) {
        let previous = std::mem::replace(&mut agent.name, name);
        agent.aliases.push(previous);
    }
    agent.viaf = Some(viaf);
    agent.lcnaf = authority.lcnaf;
    true
}
