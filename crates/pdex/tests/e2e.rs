//! End-to-end tests for trade estimation over pool snapshots.

use pdex::{
    EstimatorConfig, Order, PoolError, PoolManager, PoolPair, PoolPairId, Rate, TokenId,
    TradeDirection, TradingPair, B256, PRV_TOKEN,
};

// Token IDs for testing
fn prv() -> TokenId {
    PRV_TOKEN
}

fn usdt() -> TokenId {
    B256::repeat_byte(0x01)
}

fn btc() -> TokenId {
    B256::repeat_byte(0x02)
}

fn eth() -> TokenId {
    B256::repeat_byte(0x03)
}

fn xmr() -> TokenId {
    B256::repeat_byte(0x04)
}

// NFT IDs that tell parallel pools apart
fn nft(n: u8) -> B256 {
    B256::repeat_byte(n)
}

/// Add an unamplified pool and return its ID.
fn add_pool(
    pm: &mut PoolManager,
    nft_id: u8,
    token0: TokenId,
    token1: TokenId,
    reserve0: u64,
    reserve1: u64,
) -> PoolPairId {
    let id = PoolPairId::new(token0, token1, nft(nft_id));
    pm.insert_pool(
        id.clone(),
        PoolPair::new(TradingPair::new(token0, token1, reserve0, reserve1)),
    );
    id
}

/// Set up a market where PRV reaches BTC both directly, through a shallow
/// pool, and through deep PRV/USDT and USDT/BTC pools.
fn setup_market() -> (PoolManager, PoolPairId, PoolPairId, PoolPairId) {
    let mut pm = PoolManager::default();

    let prv_usdt = add_pool(&mut pm, 0xa1, prv(), usdt(), 1_000_000, 1_000_000);
    let usdt_btc = add_pool(&mut pm, 0xa2, usdt(), btc(), 1_000_000, 1_000_000);
    let prv_btc = add_pool(&mut pm, 0xa3, prv(), btc(), 10_000, 10_000);

    (pm, prv_usdt, usdt_btc, prv_btc)
}

/// A two-pool snapshot in the node's JSON layout.
fn snapshot_json() -> (String, PoolPairId, PoolPairId) {
    let prv_usdt = PoolPairId::new(prv(), usdt(), nft(0xa1));
    let usdt_eth = PoolPairId::new(usdt(), eth(), nft(0xa2));

    let json = format!(
        r#"{{
        "{prv_usdt}": {{
            "State": {{
                "Token0ID": "{prv:#x}",
                "Token1ID": "{usdt:#x}",
                "Token0RealAmount": 1000000,
                "Token1RealAmount": 1000000,
                "Token0VirtualAmount": "2000000",
                "Token1VirtualAmount": "2000000",
                "Amplifier": 20000,
                "ShareAmount": 1000000
            }},
            "Orderbook": {{
                "orders": [
                    {{
                        "Id": "resting-sell0",
                        "NftID": "{nft_hex}",
                        "Token0Rate": 100,
                        "Token1Rate": 90,
                        "Token0Balance": 50000,
                        "Token1Balance": 0,
                        "TradeDirection": 0,
                        "Fee": 0
                    }}
                ]
            }}
        }},
        "{usdt_eth}": {{
            "State": {{
                "Token0ID": "{usdt:#x}",
                "Token1ID": "{eth:#x}",
                "Token0RealAmount": 1000000,
                "Token1RealAmount": 1000000,
                "Token0VirtualAmount": 1000000,
                "Token1VirtualAmount": 1000000,
                "Amplifier": 10000
            }}
        }}
    }}"#,
        prv = prv(),
        usdt = usdt(),
        eth = eth(),
        nft_hex = nft(0x77),
    );

    (json, prv_usdt, usdt_eth)
}

// ============================================================================
// Test Cases
// ============================================================================

#[test]
fn test_single_pool_quote() {
    let mut pm = PoolManager::default();
    let id = add_pool(&mut pm, 0xa1, prv(), usdt(), 1_000_000, 1_000_000);

    let quote = pm.get_quote(prv(), usdt(), 1_000, 0, 0, None).unwrap();

    // floor(1000 * 1_000_000 / (1000 + 1_000_000))
    assert_eq!(quote.amount_out, 999);
    assert_eq!(quote.pool_ids, vec![id]);
    assert_eq!(quote.sell_token, prv());
    assert_eq!(quote.buy_token, usdt());
}

#[test]
fn test_two_hop_beats_shallow_direct_pool() {
    let (pm, prv_usdt, usdt_btc, prv_btc) = setup_market();

    // Direct pool is shallow
    let direct = pm.check_price(prv(), btc(), 1_000).unwrap();
    assert_eq!(direct.pool_id, &prv_btc);
    assert_eq!(direct.received, 909);

    let quote = pm.get_quote(prv(), btc(), 1_000, 0, 0, None).unwrap();
    assert_eq!(quote.pool_ids, vec![prv_usdt, usdt_btc]);
    assert_eq!(quote.amount_out, 998);
}

#[test]
fn test_two_hop_path_without_direct_pool() {
    let mut pm = PoolManager::default();
    let xy = add_pool(&mut pm, 0xa1, prv(), usdt(), 1_000_000, 1_000_000);
    let yz = add_pool(&mut pm, 0xa2, usdt(), eth(), 1_000_000, 1_000_000);

    let path = pm.find_good_trade_path(3, prv(), eth(), 1_000).unwrap();

    assert_eq!(path.tokens, vec![prv(), usdt(), eth()]);
    assert_eq!(path.pool_ids, vec![xy, yz]);
    assert_eq!(path.received, 998);
}

#[test]
fn test_parallel_pools_pick_deepest() {
    let mut pm = PoolManager::default();
    add_pool(&mut pm, 0xa1, prv(), usdt(), 1_000_000, 1_000_000);
    let deep = add_pool(&mut pm, 0xa2, prv(), usdt(), 2_000_000, 2_000_000);

    let quote = pm.get_quote(prv(), usdt(), 100_000, 0, 0, None).unwrap();
    assert_eq!(quote.pool_ids, vec![deep]);
    assert_eq!(quote.amount_out, 95_238);

    // The shallow pool on its own
    let shallow = pm.pools().keys().next().unwrap().clone();
    let out = pm
        .estimate_output(&[shallow], prv(), 100_000, 0, 0)
        .unwrap();
    assert_eq!(out, 90_909);
}

#[test]
fn test_equal_pools_tie_break() {
    let mut pm = PoolManager::default();
    let first = add_pool(&mut pm, 0xa1, prv(), usdt(), 1_000_000, 1_000_000);
    add_pool(&mut pm, 0xa2, prv(), usdt(), 1_000_000, 1_000_000);

    for _ in 0..3 {
        let quote = pm.get_quote(prv(), usdt(), 5_000, 0, 0, None).unwrap();
        assert_eq!(quote.pool_ids, vec![first.clone()]);
    }
}

#[test]
fn test_slippage_protection() {
    let mut pm = PoolManager::default();
    add_pool(&mut pm, 0xa1, prv(), usdt(), 1_000_000, 1_000_000);

    let result = pm.get_quote(prv(), usdt(), 1_000, 0, 1_000, None);
    assert_eq!(
        result,
        Err(PoolError::SlippageNotMet {
            min_amount: 1_000,
            received: 999
        })
    );

    // Exactly the output is fine
    let quote = pm.get_quote(prv(), usdt(), 1_000, 0, 999, None).unwrap();
    assert_eq!(quote.amount_out, 999);
}

#[test]
fn test_trading_fee() {
    let mut pm = PoolManager::default();
    let id = add_pool(&mut pm, 0xa1, prv(), usdt(), 1_000_000, 1_000_000);

    // Fee comes off the input once
    let quote = pm.get_quote(prv(), usdt(), 1_010, 10, 0, None).unwrap();
    assert_eq!(quote.amount_out, 999);
    assert_eq!(quote.fee, 10);

    assert_eq!(
        pm.estimate_output(&[id], prv(), 5, 6, 0),
        Err(PoolError::FeeExceedsInput {
            amount_in: 5,
            fee: 6
        })
    );
}

#[test]
fn test_hybrid_pool_and_order_book() {
    let mut pm = PoolManager::default();
    let id = PoolPairId::new(prv(), usdt(), nft(0xa1));
    let order = Order::new("maker", TradeDirection::Sell1, Rate::new(100, 99), 1_000_000);
    pm.insert_pool(
        id.clone(),
        PoolPair::with_orders(
            TradingPair::new(prv(), usdt(), 1_000_000, 1_000_000),
            [order],
        ),
    );

    // 5011 from the pool, 4913 from the order
    let quote = pm.get_quote(prv(), usdt(), 10_000, 0, 0, None).unwrap();
    assert_eq!(quote.amount_out, 9_924);

    // The snapshot is untouched
    let pool = pm.pool(&id).unwrap();
    assert_eq!(pool.state.token0_real_amount, 1_000_000);
    assert_eq!(
        pool.order_book.get_order("maker").unwrap().token1_balance,
        1_000_000
    );
}

#[test]
fn test_order_better_than_pool_fills_first() {
    let mut pm = PoolManager::default();
    let id = PoolPairId::new(prv(), usdt(), nft(0xa1));
    let order = Order::new("maker", TradeDirection::Sell1, Rate::new(100, 101), 500);
    pm.insert_pool(
        id.clone(),
        PoolPair::with_orders(
            TradingPair::new(prv(), usdt(), 1_000_000, 1_000_000),
            [order],
        ),
    );

    let out = pm.estimate_output(&[id], prv(), 1_000, 0, 0).unwrap();
    assert_eq!(out, 1_003);
}

#[test]
fn test_explicit_path() {
    let (pm, prv_usdt, usdt_btc, prv_btc) = setup_market();

    let path = [prv_btc.clone()];
    let quote = pm
        .get_quote(prv(), btc(), 1_000, 0, 0, Some(&path[..]))
        .unwrap();
    assert_eq!(quote.pool_ids, vec![prv_btc]);
    assert_eq!(quote.amount_out, 909);

    // Hops out of order
    let reversed = [usdt_btc.clone(), prv_usdt];
    assert_eq!(
        pm.get_quote(prv(), btc(), 1_000, 0, 0, Some(&reversed[..])),
        Err(PoolError::IncompatibleSellToken {
            token: prv(),
            pool_id: usdt_btc
        })
    );
}

#[test]
fn test_snapshot_from_json() {
    let (json, prv_usdt, usdt_eth) = snapshot_json();
    let pm = PoolManager::from_json(&json).unwrap();

    assert_eq!(pm.pools().len(), 2);
    let pool = pm.pool(&prv_usdt).unwrap();
    assert_eq!(pool.state.amplifier, 20_000);
    assert_eq!(pool.order_book.len(), 1);

    // Amplified pool: floor(10_000 * 2_000_000 / 2_010_000)
    let out = pm
        .estimate_output(&[prv_usdt.clone()], prv(), 10_000, 0, 0)
        .unwrap();
    assert_eq!(out, 9_950);

    let quote = pm.get_quote(prv(), eth(), 10_000, 0, 0, None).unwrap();
    assert_eq!(quote.pool_ids, vec![prv_usdt, usdt_eth]);
}

#[test]
fn test_snapshot_with_wide_virtual_reserves() {
    let id = PoolPairId::new(prv(), xmr(), nft(0xb1));
    // Big virtual reserves arrive as bare JSON numbers
    let json = format!(
        r#"{{
        "{id}": {{
            "State": {{
                "Token0ID": "{prv:#x}",
                "Token1ID": "{xmr:#x}",
                "Token0RealAmount": 1000000,
                "Token1RealAmount": 1000000,
                "Token0VirtualAmount": 20000000000000000000000,
                "Token1VirtualAmount": 20000000000000000000000,
                "Amplifier": 20000
            }}
        }}
    }}"#,
        prv = prv(),
        xmr = xmr(),
    );

    let pm = PoolManager::from_json(&json).unwrap();
    let pool = pm.pool(&id).unwrap();
    assert_eq!(
        pool.state.token0_virtual_amount.to_string(),
        "20000000000000000000000"
    );

    // Deep virtual reserves price 1000 in at just under 1000 out
    let quote = pm.get_quote(prv(), xmr(), 1_000, 0, 0, None).unwrap();
    assert_eq!(quote.pool_ids, vec![id]);
    assert_eq!(quote.amount_out, 999);
}

#[test]
fn test_order_book_used_against_sell1() {
    let (json, prv_usdt, _) = snapshot_json();
    let pm = PoolManager::from_json(&json).unwrap();

    // The resting sell0 order pays 100 PRV per 90 USDT, better than the pool
    let with_book = pm
        .estimate_output(&[prv_usdt.clone()], usdt(), 500_000, 0, 0)
        .unwrap();

    let mut without_book = pm.pool(&prv_usdt).unwrap().clone();
    without_book.order_book = Default::default();
    let mut bare = PoolManager::default();
    bare.insert_pool(prv_usdt.clone(), without_book);
    let pool_only = bare
        .estimate_output(&[prv_usdt], usdt(), 500_000, 0, 0)
        .unwrap();

    assert!(with_book > pool_only);
}

#[test]
fn test_deterministic_quotes() {
    let (json, _, _) = snapshot_json();
    let first = PoolManager::from_json(&json).unwrap();
    let second = PoolManager::from_json(&json).unwrap();

    let a = first.get_quote(prv(), eth(), 77_777, 3, 0, None).unwrap();
    let b = second.get_quote(prv(), eth(), 77_777, 3, 0, None).unwrap();
    assert_eq!(a, b);

    // Quoting does not mutate the snapshot
    let before = serde_json::to_string(second.pools()).unwrap();
    second.get_quote(prv(), eth(), 77_777, 3, 0, None).unwrap();
    assert_eq!(serde_json::to_string(second.pools()).unwrap(), before);
    assert_eq!(serde_json::to_string(first.pools()).unwrap(), before);
}

#[test]
fn test_no_path_found() {
    let (pm, _, _, _) = setup_market();

    assert_eq!(
        pm.get_quote(prv(), xmr(), 1_000, 0, 0, None),
        Err(PoolError::NoPathFound {
            sell: prv(),
            buy: xmr(),
            max_hops: 5
        })
    );
}

#[test]
fn test_hop_limits() {
    let mut pm = PoolManager::default();
    add_pool(&mut pm, 0xa1, prv(), usdt(), 1_000_000, 1_000_000);
    add_pool(&mut pm, 0xa2, usdt(), btc(), 1_000_000, 1_000_000);
    add_pool(&mut pm, 0xa3, btc(), eth(), 1_000_000, 1_000_000);

    assert!(matches!(
        pm.find_good_trade_path(2, prv(), eth(), 1_000),
        Err(PoolError::NoPathFound { max_hops: 2, .. })
    ));
    assert_eq!(
        pm.find_good_trade_path(3, prv(), eth(), 1_000)
            .unwrap()
            .hops(),
        3
    );
    assert!(matches!(
        pm.find_good_trade_path(6, prv(), eth(), 1_000),
        Err(PoolError::InvalidMaxPathLength { max: 5, got: 6 })
    ));

    let mut strict = pm.clone();
    strict.set_config(EstimatorConfig::default().with_max_path_len(2));
    assert!(matches!(
        strict.get_quote(prv(), eth(), 1_000, 0, 0, None),
        Err(PoolError::NoPathFound { max_hops: 2, .. })
    ));
}

#[test]
fn test_amplified_pool_bounded_by_real_reserve() {
    let mut pm = PoolManager::default();
    let id = PoolPairId::new(prv(), usdt(), nft(0xa1));
    pm.insert_pool(
        id.clone(),
        PoolPair::new(TradingPair::new(prv(), usdt(), 1_000, 1_000).with_amplifier(100_000)),
    );

    assert_eq!(
        pm.estimate_output(&[id], prv(), 5_000, 0, 0),
        Err(PoolError::NegativeReserve { token: 1 })
    );
    assert!(matches!(
        pm.get_quote(prv(), usdt(), 5_000, 0, 0, None),
        Err(PoolError::NoPathFound { .. })
    ));

    // Small trades still go through
    let quote = pm.get_quote(prv(), usdt(), 100, 0, 0, None).unwrap();
    assert_eq!(quote.amount_out, 99);
}

#[test]
fn test_invalid_requests() {
    let (pm, _, _, _) = setup_market();

    assert_eq!(
        pm.get_quote(prv(), prv(), 1_000, 0, 0, None),
        Err(PoolError::InvalidPair)
    );
    assert_eq!(
        pm.get_quote(prv(), usdt(), 0, 0, 0, None),
        Err(PoolError::InvalidAmount)
    );
    assert_eq!(
        pm.estimate_output(&[], prv(), 1_000, 0, 0),
        Err(PoolError::EmptyPath)
    );
    assert!(matches!(
        PoolManager::from_json("[1, 2]"),
        Err(PoolError::Snapshot(_))
    ));
}
