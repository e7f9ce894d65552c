//! # Liveness Scenarios
//!
//! Snapping an idle winner's slot to the caller doing the relaying.

#[cfg(test)]
mod tests {
    use crate::fixtures::{World, AUCTION, STARTING_BALANCE};
    use relay_auction::{
        chain_on, Address, AuctionError, AuctionEvent, RelayAuctionApi, RelayError,
    };

    const WINNER: Address = [0x01; 20];
    const UPDATER: Address = [0x02; 20];

    /// Winner holds slot 1440 and has relayed up to 1444, anchored at 1440.
    async fn world_with_winner() -> World {
        let mut world = World::new(1296).await;
        world.fund(WINNER);
        world.auction.bid(WINNER, 1440, 100).await.unwrap();
        world.advance_to(WINNER, 1440).await.unwrap();
        world.grow(WINNER, 4).await.unwrap();
        assert_eq!(world.auction.current_round().winner, Some(WINNER));
        assert_eq!(world.auction.last_ancestor(), Some(world.digest_at(1440)));
        world
    }

    fn snaps(world: &World) -> Vec<AuctionEvent> {
        world
            .events
            .history()
            .into_iter()
            .filter(|event| matches!(event, AuctionEvent::Snap { .. }))
            .collect()
    }

    #[tokio::test]
    async fn test_idle_winner_snapped_at_threshold() {
        let mut world = world_with_winner().await;

        world.relay_from(UPDATER, 1444).await.unwrap();
        assert_eq!(world.auction.current_round().winner, Some(UPDATER));
        assert_eq!(
            snaps(&world),
            vec![AuctionEvent::Snap {
                slot_start: 1440,
                old_winner: Some(WINNER),
                new_winner: UPDATER,
            }]
        );
        assert_eq!(world.auction.stats().snaps, 1);
    }

    #[tokio::test]
    async fn test_no_snap_below_threshold() {
        let mut world = world_with_winner().await;

        world.relay_from(UPDATER, 1443).await.unwrap();
        assert_eq!(world.auction.current_round().winner, Some(WINNER));

        // The window restarts from the last observed ancestor.
        world.relay_from(UPDATER, 1444).await.unwrap();
        assert_eq!(world.auction.current_round().winner, Some(WINNER));
        assert!(snaps(&world).is_empty());
    }

    #[tokio::test]
    async fn test_winner_cannot_be_snapped_by_itself() {
        let mut world = world_with_winner().await;
        world.relay_from(WINNER, 1444).await.unwrap();
        assert_eq!(world.auction.current_round().winner, Some(WINNER));
        assert!(snaps(&world).is_empty());
    }

    #[tokio::test]
    async fn test_snapper_collects_the_round() {
        let mut world = world_with_winner().await;
        world.relay_from(UPDATER, 1444).await.unwrap();

        world.advance_to(UPDATER, 1584).await.unwrap();
        let reward = world.auction.config().reward_amount;
        assert_eq!(world.reward.balance(&UPDATER), reward);
        assert_eq!(world.reward.balance(&WINNER), 0);
        // Half of the idle winner's deposit goes to the actual operator.
        assert_eq!(world.deposit.balance(&UPDATER), 50);
    }

    #[tokio::test]
    async fn test_rejected_submission_voids_snap() {
        let mut world = world_with_winner().await;
        let anchor = world.header_at(1444);
        let mut headers = chain_on(&anchor, 2, 99);
        headers.reverse();
        let before = world.snapshot(&[WINNER, UPDATER]);

        let err = world
            .auction
            .add_headers(UPDATER, &anchor, &headers)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AuctionError::Relay(RelayError::BrokenChain { index: 0 })
        ));
        assert_eq!(world.auction.current_round().winner, Some(WINNER));
        assert_eq!(world.auction.last_ancestor(), Some(world.digest_at(1440)));
        assert!(snaps(&world).is_empty());
        assert_eq!(world.snapshot(&[WINNER, UPDATER]), before);

        // The same caller succeeds once the batch links up.
        headers.reverse();
        world
            .auction
            .add_headers(UPDATER, &anchor, &headers)
            .await
            .unwrap();
        assert_eq!(world.auction.current_round().winner, Some(UPDATER));
    }

    #[tokio::test]
    async fn test_ancestor_past_slot_end_advances_round() {
        let mut world = world_with_winner().await;
        world.relay_headers(WINNER, 156).await.unwrap();
        assert_eq!(world.tip_height(), 1600);

        world.relay_from(UPDATER, 1590).await.unwrap();
        let round = world.auction.current_round();
        assert_eq!(round.start_height, 1584);
        assert_eq!(round.winner, None);
        assert!(snaps(&world).is_empty());
        assert_eq!(
            world.reward.balance(&WINNER),
            world.auction.config().reward_amount
        );
    }

    #[tokio::test]
    async fn test_rejected_submission_past_slot_end_pays_nothing() {
        let mut world = world_with_winner().await;
        world.relay_headers(WINNER, 156).await.unwrap();
        let before = world.snapshot(&[WINNER, UPDATER]);

        let anchor = world.header_at(1590);
        let mut headers = chain_on(&anchor, 2, 7);
        headers.reverse();
        for _ in 0..3 {
            let err = world
                .auction
                .add_headers(UPDATER, &anchor, &headers)
                .await
                .unwrap_err();
            assert!(matches!(
                err,
                AuctionError::Relay(RelayError::BrokenChain { index: 0 })
            ));
            assert_eq!(world.auction.current_round().start_height, 1440);
            assert_eq!(world.snapshot(&[WINNER, UPDATER]), before);
        }
        assert_eq!(world.auction.stats().total_rewarded, 0);

        // Settled exactly once when the submission goes through.
        headers.reverse();
        world
            .auction
            .add_headers(UPDATER, &anchor, &headers)
            .await
            .unwrap();
        let reward = world.auction.config().reward_amount;
        assert_eq!(world.auction.current_round().start_height, 1584);
        assert_eq!(world.reward.balance(&WINNER), reward);
        assert_eq!(world.deposit.balance(&WINNER), STARTING_BALANCE - 100 + 50);
        assert_eq!(world.deposit.balance(&AUCTION), 0);
    }

    #[tokio::test]
    async fn test_unknown_ancestor_fails_call() {
        let mut world = world_with_winner().await;
        let stranger = chain_on(&world.header_at(1444), 2, 42);
        let err = world
            .auction
            .add_headers(UPDATER, &stranger[1], &[])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AuctionError::Relay(RelayError::UnknownDigest(_))
        ));
        assert!(!err.is_precondition());
    }
}
