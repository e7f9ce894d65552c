//! # Round Economics Scenarios
//!
//! Rewards, settlements, burns and multi-slot jumps.

#[cfg(test)]
mod tests {
    use crate::fixtures::{World, AUCTION, REWARD_POOL, STARTING_BALANCE};
    use relay_auction::{Address, AuctionEvent, RelayAuctionApi};

    const ALICE: Address = [0xa1; 20];
    const BOB: Address = [0xb0; 20];
    const CAROL: Address = [0xca; 20];
    const DAVE: Address = [0xda; 20];

    fn new_rounds(world: &World) -> Vec<(u64, Option<Address>, i128)> {
        world
            .events
            .history()
            .into_iter()
            .filter_map(|event| match event {
                AuctionEvent::NewRound {
                    slot_start,
                    winner,
                    winning_amount,
                } => Some((slot_start, winner, winning_amount)),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_lone_subsidy_bid_is_minted() {
        let mut world = World::new(1296).await;
        world.auction.bid(BOB, 1440, -200).await.unwrap();

        world.advance_to(BOB, 1440).await.unwrap();
        assert_eq!(world.auction.current_round().winner, Some(BOB));
        assert_eq!(world.deposit.total_supply(), 0);

        world.advance_to(BOB, 1584).await.unwrap();
        let reward = world.auction.config().reward_amount;
        assert_eq!(world.deposit.balance(&BOB), 200);
        assert_eq!(world.deposit.total_supply(), 200);
        assert_eq!(world.reward.balance(&BOB), reward);
        assert_eq!(world.reward.balance(&AUCTION), REWARD_POOL - reward);
        assert_eq!(world.auction.stats().total_burned, 0);

        assert_eq!(
            new_rounds(&world),
            vec![(1440, Some(BOB), -200), (1584, None, 0)]
        );
    }

    #[tokio::test]
    async fn test_subsidy_capped_at_max_mint() {
        let mut world = World::new(1296).await;
        let max_mint = world.auction.config().max_mint;
        world
            .auction
            .bid(BOB, 1440, -(max_mint as i128) * 5)
            .await
            .unwrap();

        world.advance_to(BOB, 1440).await.unwrap();
        world.advance_to(BOB, 1584).await.unwrap();
        assert_eq!(world.deposit.balance(&BOB), max_mint);
        assert_eq!(world.auction.stats().total_minted, max_mint);
    }

    #[tokio::test]
    async fn test_deposit_winner_split_between_burn_and_operator() {
        let mut world = World::new(1296).await;
        world.fund(ALICE);
        world.auction.bid(ALICE, 1440, 300).await.unwrap();
        let supply = world.deposit.total_supply();

        world.advance_to(ALICE, 1440).await.unwrap();
        assert_eq!(world.deposit.total_supply(), supply - 150);
        assert_eq!(world.deposit.balance(&AUCTION), 150);
        assert_eq!(world.auction.bid_of(1440, ALICE), 0);

        world.advance_to(ALICE, 1584).await.unwrap();
        assert_eq!(world.deposit.balance(&AUCTION), 0);
        assert_eq!(world.deposit.balance(&ALICE), STARTING_BALANCE - 150);
        assert_eq!(
            world.reward.balance(&ALICE),
            world.auction.config().reward_amount
        );
    }

    #[tokio::test]
    async fn test_height_jump_skips_intermediate_slots() {
        let mut world = World::new(1296).await;
        for who in [ALICE, BOB, CAROL, DAVE] {
            world.fund(who);
        }
        world.auction.bid(ALICE, 1440, 100).await.unwrap();
        world.auction.bid(BOB, 1584, 40).await.unwrap();
        world.auction.bid(CAROL, 1728, 60).await.unwrap();
        world.auction.bid(DAVE, 1872, 20).await.unwrap();

        world.advance_to(ALICE, 1440).await.unwrap();
        assert_eq!(world.auction.current_round().winner, Some(ALICE));

        // The relay jumps from inside slot 1440 straight into slot 1872.
        world.relay_headers(ALICE, 460).await.unwrap();
        world.promote(ALICE, 1440).await.unwrap();
        assert_eq!(world.auction.current_round().start_height, 1440);

        let settlement = world.auction.update_round().await.unwrap().unwrap();
        assert_eq!(settlement.opened.start_height, 1872);
        assert_eq!(settlement.opened.winner, Some(DAVE));
        assert_eq!(settlement.skipped_slots(144), 2);

        let reward = world.auction.config().reward_amount;
        assert_eq!(world.reward.balance(&ALICE), reward);
        assert_eq!(world.reward.balance(&BOB), 0);
        assert_eq!(world.reward.balance(&CAROL), 0);
        assert_eq!(world.reward.balance(&AUCTION), REWARD_POOL - reward);

        assert_eq!(
            new_rounds(&world),
            vec![(1440, Some(ALICE), 100), (1872, Some(DAVE), 20)]
        );

        // Bids on the skipped slots stay in custody until withdrawn.
        assert_eq!(world.auction.withdraw_bid(BOB, 1584).await.unwrap(), 40);
        assert_eq!(world.auction.withdraw_bid(CAROL, 1728).await.unwrap(), 60);
        assert_eq!(world.deposit.balance(&AUCTION), 10);
    }

    #[tokio::test]
    async fn test_update_round_is_idempotent() {
        let mut world = World::new(1296).await;
        world.fund(ALICE);
        world.auction.bid(ALICE, 1440, 10).await.unwrap();
        world.grow(ALICE, 150).await.unwrap();

        assert!(world.auction.update_round().await.unwrap().is_some());
        let events = world.events.history().len();
        let balance = world.deposit.balance(&AUCTION);

        for _ in 0..3 {
            assert!(world.auction.update_round().await.unwrap().is_none());
        }
        assert_eq!(world.events.history().len(), events);
        assert_eq!(world.deposit.balance(&AUCTION), balance);
        assert_eq!(world.auction.stats().rounds_advanced, 1);
    }
}
