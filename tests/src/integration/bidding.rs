//! # Bidding Scenarios
//!
//! Bid placement, revision and withdrawal through the full service.

#[cfg(test)]
mod tests {
    use crate::fixtures::{World, AUCTION, STARTING_BALANCE};
    use relay_auction::{
        Address, AuctionError, AuctionEvent, BestBid, Bid, LedgerError, RelayAuctionApi,
    };

    const ALICE: Address = [0xa1; 20];
    const BOB: Address = [0xb0; 20];
    const CAROL: Address = [0xca; 20];
    const OPERATOR: Address = [0x0e; 20];

    #[tokio::test]
    async fn test_raise_after_lower_bid_rejected() {
        let mut world = World::new(1296).await;
        world.fund(ALICE);

        world.auction.bid(ALICE, 1440, 100).await.unwrap();
        let err = world.auction.bid(ALICE, 1440, 50).await.unwrap_err();
        assert!(err.to_string().contains("can not bet lower"));
        world.auction.bid(ALICE, 1440, 150).await.unwrap();

        assert_eq!(
            world.auction.best_bid(1440),
            BestBid {
                bidder: Some(ALICE),
                bid: Bid::Deposit(150)
            }
        );
        assert_eq!(world.deposit.balance(&AUCTION), 150);
        assert_eq!(world.deposit.balance(&ALICE), STARTING_BALANCE - 150);

        let bids: Vec<i128> = world
            .events
            .history()
            .into_iter()
            .filter_map(|event| match event {
                AuctionEvent::Bid { amount, .. } => Some(amount),
                _ => None,
            })
            .collect();
        assert_eq!(bids, vec![100, 150]);
    }

    #[tokio::test]
    async fn test_unaligned_and_closed_slots_rejected() {
        let mut world = World::new(1296).await;
        world.fund(ALICE);

        assert!(matches!(
            world.auction.bid(ALICE, 1441, 10).await,
            Err(AuctionError::UnalignedSlot { slot: 1441, .. })
        ));
        assert!(matches!(
            world.auction.withdraw_bid(ALICE, 1300).await,
            Err(AuctionError::UnalignedSlot { .. })
        ));
        assert!(matches!(
            world.auction.bid(ALICE, 1296, 10).await,
            Err(AuctionError::BiddingClosed {
                slot: 1296,
                current_start: 1296
            })
        ));
        assert!(matches!(
            world.auction.withdraw_bid(ALICE, 1440).await,
            Err(AuctionError::SlotNotClosed { .. })
        ));
        assert!(world.events.history().is_empty());
        assert_eq!(world.auction.stats().failed_calls, 4);
    }

    #[tokio::test]
    async fn test_subsidy_bids_only_fall() {
        let mut world = World::new(1296).await;

        world.auction.bid(BOB, 1440, -100).await.unwrap();
        world.auction.bid(CAROL, 1440, -150).await.unwrap();
        assert_eq!(world.auction.best_bid(1440).bidder, Some(CAROL));

        world.auction.bid(BOB, 1440, -200).await.unwrap();
        assert_eq!(world.auction.best_bid(1440).amount(), -200);

        let err = world.auction.bid(BOB, 1440, -150).await.unwrap_err();
        assert!(err.to_string().contains("can not bet higher"));
        assert_eq!(world.auction.bid_of(1440, BOB), -200);

        // Subsidy bids never touch the deposit ledger.
        assert_eq!(world.deposit.balance(&AUCTION), 0);
    }

    #[tokio::test]
    async fn test_bid_without_allowance_leaves_no_trace() {
        let mut world = World::new(1296).await;
        world.fund_only(ALICE);

        let err = world.auction.bid(ALICE, 1440, 100).await.unwrap_err();
        assert!(matches!(
            err,
            AuctionError::Ledger(LedgerError::InsufficientAllowance { .. })
        ));
        assert_eq!(world.auction.bid_of(1440, ALICE), 0);
        assert_eq!(world.auction.best_bid(1440), BestBid::default());
        assert!(world.events.history().is_empty());
    }

    #[tokio::test]
    async fn test_losing_bid_withdrawn_after_slot_opens() {
        let mut world = World::new(1296).await;
        world.fund(ALICE);
        world.fund(BOB);

        world.auction.bid(ALICE, 1584, 100).await.unwrap();
        world.auction.bid(BOB, 1584, 200).await.unwrap();

        world.advance_to(OPERATOR, 1440).await.unwrap();
        world.advance_to(OPERATOR, 1584).await.unwrap();
        assert_eq!(world.auction.current_round().winner, Some(BOB));

        assert_eq!(world.auction.withdraw_bid(ALICE, 1584).await.unwrap(), 100);
        assert_eq!(world.deposit.balance(&ALICE), STARTING_BALANCE);
        assert!(matches!(
            world.auction.withdraw_bid(ALICE, 1584).await,
            Err(AuctionError::NothingToWithdraw { slot: 1584 })
        ));

        // The winner's bid was consumed when the slot opened.
        assert!(matches!(
            world.auction.withdraw_bid(BOB, 1584).await,
            Err(AuctionError::NothingToWithdraw { .. })
        ));
        assert_eq!(world.auction.stats().withdrawals, 1);
    }
}
