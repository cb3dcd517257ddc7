//! Multi-hop routing for finding a good path between tokens.
//!
//! The search is greedy on purpose: candidate token paths come from a
//! bounded depth-first walk over a liquidity-weighted graph, and each hop
//! of a candidate picks its best pool on its own.

use crate::config::EstimatorConfig;
use crate::error::PoolError;
use crate::matching::estimate_path_output;
use crate::pair::PoolPairId;
use crate::pool::{PoolPair, PoolSnapshot};
use crate::types::{Amount, TokenId};
use num_bigint::BigInt;
use std::collections::{HashMap, HashSet};
use std::slice;
use tracing::{debug, trace};

/// A directed edge of the liquidity graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// Token at the far end of the edge.
    pub token: TokenId,
    /// Liquidity of the source side, normalized to the base amplifier.
    pub weight: BigInt,
}

/// Router for finding paths between tokens.
#[derive(Debug, Clone)]
pub struct Router {
    /// Outgoing edges per token, deepest liquidity first.
    graph: HashMap<TokenId, Vec<Node>>,
    base_amplifier: u32,
    max_paths: usize,
}

/// The best pool found for one hop.
#[derive(Debug, Clone, Copy)]
pub struct PoolChoice<'a> {
    pub pool_id: &'a PoolPairId,
    pub pool: &'a PoolPair,
    pub received: Amount,
}

/// A trading path picked by [`find_good_trade_path`].
#[derive(Debug, Clone)]
pub struct TradePath<'a> {
    /// Pools in trade order.
    pub pools: Vec<&'a PoolPair>,
    pub pool_ids: Vec<PoolPairId>,
    /// Tokens visited, from the sell token to the buy token.
    pub tokens: Vec<TokenId>,
    /// Simulated output of the whole path.
    pub received: Amount,
}

impl TradePath<'_> {
    pub fn hops(&self) -> usize {
        self.pool_ids.len()
    }
}

impl Router {
    /// Create a router with an empty graph.
    pub fn new(config: &EstimatorConfig) -> Self {
        Self {
            graph: HashMap::new(),
            base_amplifier: config.base_amplifier,
            max_paths: config.max_paths,
        }
    }

    /// Create a router over the pools of a snapshot.
    pub fn from_pools(config: &EstimatorConfig, pools: &PoolSnapshot) -> Self {
        let mut router = Self::new(config);
        router.build_graph(pools);
        router
    }

    /// Rebuild the graph: two directed edges per pool, weighted by the
    /// liquidity on their source side.
    pub fn build_graph(&mut self, pools: &PoolSnapshot) {
        self.graph.clear();

        for (pool_id, pool) in pools {
            let state = &pool.state;
            if state.amplifier == 0 {
                debug!(%pool_id, "Skipping pool with zero amplifier");
                continue;
            }
            let weight0 = &state.token0_virtual_amount * self.base_amplifier / state.amplifier;
            let weight1 = &state.token1_virtual_amount * self.base_amplifier / state.amplifier;
            self.add_edge(state.token0_id, state.token1_id, weight0);
            self.add_edge(state.token1_id, state.token0_id, weight1);
        }

        for nodes in self.graph.values_mut() {
            nodes.sort_by(|a, b| b.weight.cmp(&a.weight));
        }
    }

    /// Add an edge, keeping only the heaviest one per ordered token pair.
    fn add_edge(&mut self, source: TokenId, dest: TokenId, weight: BigInt) {
        let nodes = self.graph.entry(source).or_default();
        match nodes.iter_mut().find(|node| node.token == dest) {
            Some(existing) => {
                if existing.weight < weight {
                    existing.weight = weight;
                }
            }
            None => nodes.push(Node {
                token: dest,
                weight,
            }),
        }
    }

    /// Outgoing edges of `token`, deepest liquidity first.
    pub fn neighbors(&self, token: TokenId) -> &[Node] {
        self.graph.get(&token).map(Vec::as_slice).unwrap_or_default()
    }

    /// Find token paths from `source` to `dest` with at most `max_len` tokens.
    ///
    /// No token repeats within a path. At most `max_paths` paths are
    /// recorded; after that the walk stops exploring.
    pub fn find_paths(
        &self,
        max_len: usize,
        source: TokenId,
        dest: TokenId,
    ) -> Vec<Vec<TokenId>> {
        let mut paths = Vec::new();
        let mut path = Vec::with_capacity(max_len);
        let mut visited = HashSet::new();
        self.find_path(max_len, source, dest, &mut visited, &mut path, &mut paths);
        paths
    }

    fn find_path(
        &self,
        max_len: usize,
        current: TokenId,
        dest: TokenId,
        visited: &mut HashSet<TokenId>,
        path: &mut Vec<TokenId>,
        paths: &mut Vec<Vec<TokenId>>,
    ) {
        if paths.len() >= self.max_paths {
            debug!(max_paths = self.max_paths, "Path search reached the path cap");
            return;
        }
        path.push(current);
        visited.insert(current);

        if current == dest {
            paths.push(path.clone());
        } else if path.len() < max_len {
            for node in self.neighbors(current) {
                if visited.contains(&node.token) {
                    continue;
                }
                self.find_path(max_len, node.token, dest, visited, path, paths);
            }
        }

        path.pop();
        visited.remove(&current);
    }
}

/// Among the pools connecting `source` and `dest`, pick the one that pays
/// the most for `sell_amount`. Each pool is simulated on its own with its
/// current order book.
///
/// Returns `None` when no pool pays anything. Ties go to the pool with the
/// smallest identifier.
pub fn choose_best_pool_from_pair<'a>(
    pools: &'a PoolSnapshot,
    source: TokenId,
    dest: TokenId,
    sell_amount: Amount,
) -> Option<PoolChoice<'a>> {
    let mut best: Option<PoolChoice<'a>> = None;

    for (pool_id, pool) in pools.iter().filter(|(_, pool)| pool.connects(source, dest)) {
        let received =
            match estimate_path_output(pools, slice::from_ref(pool_id), source, sell_amount, 0, 0) {
                Ok(received) => received,
                Err(err) => {
                    trace!(%pool_id, %err, "Pool cannot take the trade");
                    continue;
                }
            };
        if received > best.map_or(0, |choice| choice.received) {
            best = Some(PoolChoice {
                pool_id,
                pool,
                received,
            });
        }
    }

    best
}

/// Find a good path selling `sell_amount` of `sell_token` for `buy_token`
/// in at most `max_hops` hops.
///
/// Every candidate token path is priced hop by hop, carrying each hop's
/// output into the next. The candidate with the highest output wins and
/// ties go to the path found first.
pub fn find_good_trade_path<'a>(
    config: &EstimatorConfig,
    max_hops: usize,
    pools: &'a PoolSnapshot,
    sell_token: TokenId,
    buy_token: TokenId,
    sell_amount: Amount,
) -> Result<TradePath<'a>, PoolError> {
    let router = Router::from_pools(config, pools);
    let candidates = router.find_paths(max_hops.saturating_add(1), sell_token, buy_token);
    debug!(candidates = candidates.len(), max_hops, "Found candidate paths");

    let mut best: Option<TradePath<'a>> = None;
    for tokens in candidates {
        if tokens.len() < 2 {
            continue;
        }

        let mut amount = sell_amount;
        let mut choices = Vec::with_capacity(tokens.len() - 1);
        for hop in tokens.windows(2) {
            let Some(choice) = choose_best_pool_from_pair(pools, hop[0], hop[1], amount) else {
                break;
            };
            amount = choice.received;
            choices.push(choice);
        }
        if choices.len() != tokens.len() - 1 {
            trace!(?tokens, "Candidate path has a hop with no output");
            continue;
        }

        if best.as_ref().map_or(true, |path| amount > path.received) {
            best = Some(TradePath {
                pools: choices.iter().map(|choice| choice.pool).collect(),
                pool_ids: choices.iter().map(|choice| choice.pool_id.clone()).collect(),
                tokens,
                received: amount,
            });
        }
    }

    let path = best.ok_or(PoolError::NoPathFound {
        sell: sell_token,
        buy: buy_token,
        max_hops,
    })?;
    debug!(hops = path.hops(), received = path.received, "Chose trade path");
    Ok(path)
}
