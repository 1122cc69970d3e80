//! Inventory Ledger
//!
//! Stock is only ever changed through [`StockLedger::reserve`], a conditional decrement that
//! refuses to go below zero, and [`StockLedger::release`], an unconditional increment. Both run
//! inside whatever unit of work the ledger belongs to, so a batch of reservations is undone
//! when that unit of work is dropped.

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use crate::{domain::catalog::records::BicycleUuid, store::StoreError};

/// Outcome of a single conditional reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reservation {
    /// Stock was decremented; `remaining` is the new counter value.
    Reserved { remaining: u32 },

    /// Nothing changed; only `available` units are in stock.
    Insufficient { available: u32 },

    /// The bicycle does not exist.
    Missing,
}

#[async_trait]
pub trait StockLedger: Send {
    /// Decrement stock by `quantity` if at least that many units are available.
    async fn reserve(
        &mut self,
        bicycle: BicycleUuid,
        quantity: u32,
    ) -> Result<Reservation, StoreError>;

    /// Increment stock by `quantity`, returning the new counter value.
    ///
    /// Fails with [`StoreError::NotFound`] for an unknown bicycle.
    async fn release(&mut self, bicycle: BicycleUuid, quantity: u32) -> Result<u32, StoreError>;
}

/// One line of a batch reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockLine {
    pub bicycle: BicycleUuid,
    pub quantity: u32,
}

#[derive(Debug, Error)]
pub enum BatchReservationError {
    #[error("bicycle {bicycle} has {available} units, {requested} requested")]
    Shortfall {
        bicycle: BicycleUuid,
        requested: u32,
        available: u32,
    },

    #[error("bicycle {0} not found")]
    Missing(BicycleUuid),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Reserve every line in order, stopping at the first one that cannot be satisfied.
///
/// Earlier reservations are not undone here; the caller drops its unit of work instead.
///
/// # Errors
///
/// Returns the first shortfall, missing bicycle, or storage failure.
pub async fn reserve_all<L>(ledger: &mut L, lines: &[StockLine]) -> Result<(), BatchReservationError>
where
    L: StockLedger + ?Sized,
{
    for line in lines {
        match ledger.reserve(line.bicycle, line.quantity).await? {
            Reservation::Reserved { remaining } => {
                debug!(
                    bicycle_uuid = %line.bicycle,
                    quantity = line.quantity,
                    remaining,
                    "reserved stock"
                );
            }
            Reservation::Insufficient { available } => {
                return Err(BatchReservationError::Shortfall {
                    bicycle: line.bicycle,
                    requested: line.quantity,
                    available,
                });
            }
            Reservation::Missing => return Err(BatchReservationError::Missing(line.bicycle)),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use rustc_hash::FxHashMap;

    use super::*;

    #[derive(Debug, Default)]
    struct CountingLedger {
        stock: FxHashMap<BicycleUuid, u32>,
        calls: usize,
    }

    #[async_trait]
    impl StockLedger for CountingLedger {
        async fn reserve(
            &mut self,
            bicycle: BicycleUuid,
            quantity: u32,
        ) -> Result<Reservation, StoreError> {
            self.calls += 1;

            let Some(stock) = self.stock.get_mut(&bicycle) else {
                return Ok(Reservation::Missing);
            };

            if *stock < quantity {
                return Ok(Reservation::Insufficient { available: *stock });
            }

            *stock -= quantity;

            Ok(Reservation::Reserved { remaining: *stock })
        }

        async fn release(
            &mut self,
            bicycle: BicycleUuid,
            quantity: u32,
        ) -> Result<u32, StoreError> {
            let stock = self.stock.get_mut(&bicycle).ok_or(StoreError::NotFound)?;

            *stock += quantity;

            Ok(*stock)
        }
    }

    #[tokio::test]
    async fn reserves_every_line() {
        let road = BicycleUuid::new();
        let gravel = BicycleUuid::new();

        let mut ledger = CountingLedger::default();
        ledger.stock.insert(road, 4);
        ledger.stock.insert(gravel, 2);

        let result = reserve_all(
            &mut ledger,
            &[
                StockLine {
                    bicycle: road,
                    quantity: 3,
                },
                StockLine {
                    bicycle: gravel,
                    quantity: 2,
                },
            ],
        )
        .await;

        assert!(result.is_ok(), "got {result:?}");
        assert_eq!(ledger.stock.get(&road), Some(&1));
        assert_eq!(ledger.stock.get(&gravel), Some(&0));
    }

    #[tokio::test]
    async fn stops_at_first_shortfall() {
        let road = BicycleUuid::new();
        let gravel = BicycleUuid::new();
        let touring = BicycleUuid::new();

        let mut ledger = CountingLedger::default();
        ledger.stock.insert(road, 4);
        ledger.stock.insert(gravel, 1);
        ledger.stock.insert(touring, 9);

        let result = reserve_all(
            &mut ledger,
            &[
                StockLine {
                    bicycle: road,
                    quantity: 1,
                },
                StockLine {
                    bicycle: gravel,
                    quantity: 2,
                },
                StockLine {
                    bicycle: touring,
                    quantity: 1,
                },
            ],
        )
        .await;

        assert!(
            matches!(
                result,
                Err(BatchReservationError::Shortfall {
                    bicycle,
                    requested: 2,
                    available: 1,
                }) if bicycle == gravel
            ),
            "expected Shortfall, got {result:?}"
        );
        assert_eq!(ledger.calls, 2, "touring line should not be attempted");
        assert_eq!(ledger.stock.get(&touring), Some(&9));
    }

    #[tokio::test]
    async fn reports_missing_bicycle() {
        let unknown = BicycleUuid::new();
        let mut ledger = CountingLedger::default();

        let result = reserve_all(
            &mut ledger,
            &[StockLine {
                bicycle: unknown,
                quantity: 1,
            }],
        )
        .await;

        assert!(
            matches!(result, Err(BatchReservationError::Missing(bicycle)) if bicycle == unknown),
            "expected Missing, got {result:?}"
        );
    }
}
