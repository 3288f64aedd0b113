//! Several nodes mining one shared chain.

use std::time::Duration;

use powchain::{
    genesis, ChainConfig, ChainError, Difficulty, MinerConfig, Node, SharedChain, StopReason,
    Transaction,
};
use powchain_testkit::{abc_transfers, init_test_tracing, multi_node_configs};

fn cheap_config() -> ChainConfig {
    ChainConfig::default()
        .with_difficulty(Difficulty::leading(2).unwrap())
        .with_miner(MinerConfig::single_threaded())
        .with_miner_id("tim")
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_nodes_extend_one_chain() -> anyhow::Result<()> {
    init_test_tracing();
    let first = Node::bootstrap(cheap_config()).await?;
    let chain = first.chain().clone();

    let mut tasks = Vec::new();
    for mut config in multi_node_configs(4) {
        config.difficulty = Difficulty::leading(2)?;
        config.max_append_retries = 64;
        let node = Node::new(chain.clone(), config);
        tasks.push(tokio::spawn(async move {
            for round in 0..3u64 {
                let memo = Transaction::memo("2017-12-13", format!("{} round {round}", node.miner_id()));
                node.mine_next(vec![memo]).await?;
            }
            Ok::<_, ChainError>(())
        }));
    }
    for task in tasks {
        task.await??;
    }

    // Genesis plus three blocks from each of four nodes, none sharing a height.
    assert_eq!(chain.len(), 13);
    chain.validate()?;

    let snapshot = chain.snapshot();
    for pair in snapshot.blocks().windows(2) {
        assert_eq!(pair[1].previous_hash, pair[0].hash);
    }
    Ok(())
}

#[tokio::test]
async fn test_mine_next_carries_transactions_and_reward() -> anyhow::Result<()> {
    let node = Node::bootstrap(cheap_config()).await?;
    let block = node.mine_next(abc_transfers()).await?;

    assert_eq!(block.transactions.len(), 3);
    assert_eq!(block.transactions[..2], abc_transfers()[..]);
    assert!(block.reward().is_some());
    assert!(block.hash.unwrap().to_hex().starts_with("00"));
    node.chain().validate()?;
    Ok(())
}

#[tokio::test]
async fn test_deadline_cancels_search() {
    let node = Node::new(
        SharedChain::new(powchain::Chain::from_untrusted(Vec::new(), cheap_config().rules())),
        cheap_config().with_miner(MinerConfig::default().with_workers(2)),
    );
    let hopeless = genesis(0, Difficulty::trailing(40).unwrap());

    let err = node
        .mine_block_within(hopeless, Duration::from_millis(100))
        .await
        .unwrap_err();
    assert_eq!(err, ChainError::MiningStopped(StopReason::TimedOut));
}

#[tokio::test]
async fn test_miner_time_limit_surfaces_as_stop() {
    let config = cheap_config()
        .with_difficulty(Difficulty::leading(40).unwrap())
        .with_miner(MinerConfig::single_threaded().with_time_limit(Duration::from_millis(50)));

    let err = Node::bootstrap(config).await.unwrap_err();
    assert_eq!(err, ChainError::MiningStopped(StopReason::TimedOut));
}

#[tokio::test]
async fn test_config_from_json_drives_node() -> anyhow::Result<()> {
    let config = ChainConfig::from_json(
        r#"{
            "difficulty": { "zeros": 1, "position": "trailing" },
            "block_reward": 5,
            "miner_id": "kevin",
            "miner": { "workers": 1 }
        }"#,
    )?;
    let node = Node::bootstrap(config).await?;
    let genesis = node.chain().tip().unwrap();

    assert!(genesis.hash.unwrap().to_hex().ends_with('0'));
    let reward = genesis.reward().unwrap();
    assert_eq!(
        reward.payload,
        powchain::core::Payload::Transfer {
            from: "network".into(),
            to: "kevin".into(),
            amount: 5
        }
    );
    Ok(())
}
