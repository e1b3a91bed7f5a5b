use tracing::info;

use crate::domain::Record;
use crate::storage::LedgerStore;

use super::AppError;
use super::service::{EntityService, parse_record_id};

impl<R: Record, S: LedgerStore> EntityService<R, S> {
    /// Move `amount` between two live records of this type.
    ///
    /// Balance floors are enforced here, not in the CRUD engine: a plain
    /// update may set any balance, but a transfer may not overdraw its
    /// source. Both sides are re-encoded and written, and a single
    /// `transferred` notification covers the whole operation.
    pub fn transfer(&mut self, from_id: &str, to_id: &str, amount: &str) -> Result<(), AppError> {
        let from_id = parse_record_id(from_id)?;
        let to_id = parse_record_id(to_id)?;
        if from_id == to_id {
            return Err(AppError::InvalidArgument(
                "cannot transfer a record to itself".into(),
            ));
        }

        let amount: i64 = amount
            .parse()
            .map_err(|_| AppError::InvalidArgument("amount must be a numeric string".into()))?;
        if amount <= 0 {
            return Err(AppError::InvalidArgument("amount must be positive".into()));
        }

        let mut from = self.fetch(from_id)?;
        let mut to = self.fetch(to_id)?;

        if from.balance() < amount {
            return Err(AppError::InsufficientFunds {
                kind: R::KIND,
                id: from_id,
                balance: from.balance(),
                required: amount,
            });
        }

        // Balances are unbounded integers as far as the CRUD engine is
        // concerned, so the destination may already sit near i64::MAX.
        let debited = from
            .balance()
            .checked_sub(amount)
            .ok_or_else(|| overflow_error(from_id))?;
        let credited = to
            .balance()
            .checked_add(amount)
            .ok_or_else(|| overflow_error(to_id))?;

        from.set_balance(debited);
        to.set_balance(credited);

        self.put_record(&from)?;
        self.put_record(&to)?;

        info!(kind = R::KIND, from_id, to_id, amount, "transfer applied");
        self.notify("transferred", format!("{from_id}>{to_id}:{amount}").as_bytes())
    }
}

fn overflow_error(id: u64) -> AppError {
    AppError::InvalidArgument(format!("transfer would overflow the balance of record {id}"))
}
