//! Jersey-number-set identity mapping, shared by the providers (Opta,
//! Statsbomb, Impect) that don't carry a pre-linked player id. The idea:
//! a team's jersey-number set is a near-unique fingerprint, so matching
//! provider-team jersey sets against catalogue-team jersey sets resolves
//! both the team-id and player-id mapping at once, without ever reading
//! a name.

use std::collections::{HashMap, HashSet};

use sync_core::model::MatchCatalogue;

use crate::error::AdapterError;

/// `skc_team_id -> {jersey numbers of rostered (start_time present) players}`.
pub fn skc_team_jno_sets(catalogue: &MatchCatalogue) -> HashMap<u64, HashSet<u32>> {
    let mut out: HashMap<u64, HashSet<u32>> = HashMap::new();
    for player in &catalogue.players {
        if player.start_time.is_some() {
            out.entry(player.team_id).or_default().insert(player.number);
        }
    }
    out
}

/// Matches two jersey-number-set maps against each other. Returns `None`
/// when either side's two teams share an identical jersey set (the
/// fingerprint is ambiguous) or when the match isn't a clean bijection.
pub fn jno_set_mapping(
    skc: &HashMap<u64, HashSet<u32>>,
    provider: &HashMap<i64, HashSet<u32>>,
) -> Option<HashMap<u64, i64>> {
    let skc_ids: Vec<u64> = skc.keys().copied().collect();
    if skc_ids.len() != 2 {
        return None;
    }
    if skc[&skc_ids[0]] == skc[&skc_ids[1]] {
        return None;
    }

    let provider_ids: Vec<i64> = provider.keys().copied().collect();
    if provider_ids.len() != 2 {
        return None;
    }
    if provider[&provider_ids[0]] == provider[&provider_ids[1]] {
        return None;
    }

    let mut mapping = HashMap::new();
    for (&skc_id, skc_jnos) in skc {
        for (&provider_id, provider_jnos) in provider {
            if skc_jnos == provider_jnos {
                mapping.insert(skc_id, provider_id);
            }
        }
    }
    if mapping.len() == 2 {
        Some(mapping)
    } else {
        None
    }
}

/// One provider player record, reduced to what identity resolution needs.
pub struct ProviderPlayer {
    pub provider_player_id: i64,
    pub provider_team_id: i64,
    pub jersey_number: u32,
}

/// Resolves provider player ids to catalogue player ids given an already
/// established team mapping. A provider player whose `(team, jersey)`
/// pair isn't found in the catalogue maps to `None` rather than failing
/// the whole adapter — unmapped players are reported later via
/// `sync_core::warnings`.
pub fn provider_player_id_to_skc(
    catalogue: &MatchCatalogue,
    skc_team_id_to_provider_team_id: &HashMap<u64, i64>,
    provider_players: &[ProviderPlayer],
) -> HashMap<i64, Option<u64>> {
    let provider_team_id_jno_to_skc_ply_id: HashMap<(i64, u32), u64> = catalogue
        .players
        .iter()
        .filter_map(|p| {
            let provider_team_id = *skc_team_id_to_provider_team_id.get(&p.team_id)?;
            Some(((provider_team_id, p.number), p.id))
        })
        .collect();

    provider_players
        .iter()
        .map(|pp| {
            let skc_id = provider_team_id_jno_to_skc_ply_id
                .get(&(pp.provider_team_id, pp.jersey_number))
                .copied();
            (pp.provider_player_id, skc_id)
        })
        .collect()
}

/// Runs the whole jersey-fingerprint pipeline: team mapping, then player
/// mapping. `provider_team_jno_sets` groups the same `provider_players`
/// slice by team for the team-level fingerprint match.
pub fn resolve(
    provider: &'static str,
    catalogue: &MatchCatalogue,
    provider_players: &[ProviderPlayer],
) -> crate::error::Result<(HashMap<i64, u64>, HashMap<i64, Option<u64>>)> {
    let mut provider_team_jno_sets: HashMap<i64, HashSet<u32>> = HashMap::new();
    for pp in provider_players {
        provider_team_jno_sets.entry(pp.provider_team_id).or_default().insert(pp.jersey_number);
    }

    let skc = skc_team_jno_sets(catalogue);
    let skc_team_id_to_provider_team_id =
        jno_set_mapping(&skc, &provider_team_jno_sets).ok_or_else(|| AdapterError::PlayerMappingFailed {
            provider,
            detail: "jersey-number sets did not uniquely match either team".into(),
        })?;

    let provider_team_id_to_skc_team_id: HashMap<i64, u64> =
        skc_team_id_to_provider_team_id.iter().map(|(&skc, &prov)| (prov, skc)).collect();

    let provider_ply_id_to_skc_ply_id =
        provider_player_id_to_skc(catalogue, &skc_team_id_to_provider_team_id, provider_players);

    Ok((provider_team_id_to_skc_team_id, provider_ply_id_to_skc_ply_id))
}
