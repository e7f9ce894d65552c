//! # Administration Scenarios
//!
//! Owner-gated reward changes, sweeps and ownership handover.

#[cfg(test)]
mod tests {
    use crate::fixtures::{World, ADMIN, AUCTION, REWARD_POOL};
    use relay_auction::{Address, AuctionError, LedgerError, RelayAuctionApi, SweepTarget};

    const ALICE: Address = [0xa1; 20];
    const SUCCESSOR: Address = [0x5c; 20];

    #[tokio::test]
    async fn test_sweep_collects_forfeited_deposit() {
        let mut world = World::new(1296).await;
        world.fund(ALICE);
        world.auction.bid(ALICE, 1440, 100).await.unwrap();
        world.auction.bid(ALICE, 1440, -5).await.unwrap();
        assert_eq!(world.deposit.balance(&AUCTION), 100);

        assert!(matches!(
            world.auction.sweep(ALICE, SweepTarget::Deposit).await,
            Err(AuctionError::Unauthorized)
        ));
        assert_eq!(
            world
                .auction
                .sweep(ADMIN, SweepTarget::Deposit)
                .await
                .unwrap(),
            100
        );
        assert_eq!(world.deposit.balance(&ADMIN), 100);
        assert_eq!(world.deposit.balance(&AUCTION), 0);
    }

    #[tokio::test]
    async fn test_reward_amount_change_applies_to_next_payout() {
        let mut world = World::new(1296).await;
        world.auction.bid(ALICE, 1440, -1).await.unwrap();
        world.advance_to(ALICE, 1440).await.unwrap();

        world.auction.set_reward_amount(ADMIN, 77).await.unwrap();
        world.advance_to(ALICE, 1584).await.unwrap();
        assert_eq!(world.reward.balance(&ALICE), 77);
    }

    #[tokio::test]
    async fn test_empty_reward_pool_blocks_round_advance() {
        let mut world = World::new(1296).await;
        world.auction.bid(ALICE, 1440, -1).await.unwrap();
        world.advance_to(ALICE, 1440).await.unwrap();

        assert_eq!(
            world
                .auction
                .sweep(ADMIN, SweepTarget::Reward)
                .await
                .unwrap(),
            REWARD_POOL
        );
        world.grow(ALICE, 144).await.unwrap();
        let before = world.snapshot(&[ALICE]);

        let err = world.auction.update_round().await.unwrap_err();
        assert!(matches!(err, AuctionError::RewardTransferRejected));
        assert_eq!(world.auction.current_round().start_height, 1440);
        assert_eq!(world.auction.current_round().winner, Some(ALICE));
        // The subsidy is not minted for a round that did not close.
        assert_eq!(world.deposit.total_supply(), 0);
        assert_eq!(world.snapshot(&[ALICE]), before);
    }

    #[tokio::test]
    async fn test_emptied_custody_blocks_settlement() {
        let mut world = World::new(1296).await;
        world.fund(ALICE);
        world.auction.bid(ALICE, 1440, 100).await.unwrap();
        world.advance_to(ALICE, 1440).await.unwrap();
        assert_eq!(
            world
                .auction
                .sweep(ADMIN, SweepTarget::Deposit)
                .await
                .unwrap(),
            50
        );
        world.grow(ALICE, 144).await.unwrap();
        let before = world.snapshot(&[ALICE]);

        for _ in 0..3 {
            let err = world.auction.update_round().await.unwrap_err();
            assert!(matches!(
                err,
                AuctionError::Ledger(LedgerError::InsufficientBalance {
                    required: 50,
                    available: 0
                })
            ));
        }
        assert_eq!(world.snapshot(&[ALICE]), before);
        assert_eq!(world.reward.balance(&ALICE), 0);
        assert_eq!(world.auction.stats().total_rewarded, 0);
        assert_eq!(world.auction.current_round().start_height, 1440);
    }

    #[tokio::test]
    async fn test_ownership_handover() {
        let mut world = World::new(1296).await;
        world
            .auction
            .transfer_ownership(ADMIN, SUCCESSOR)
            .await
            .unwrap();
        assert_eq!(world.auction.admin(), SUCCESSOR);

        assert!(matches!(
            world.auction.set_reward_amount(ADMIN, 1).await,
            Err(AuctionError::Unauthorized)
        ));
        assert!(matches!(
            world.auction.transfer_ownership(ADMIN, ADMIN).await,
            Err(AuctionError::Unauthorized)
        ));
        world.auction.set_reward_amount(SUCCESSOR, 1).await.unwrap();
        assert_eq!(world.auction.reward_amount(), 1);
    }
}
