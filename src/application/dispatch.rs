use tracing::debug;

use crate::domain::Record;
use crate::storage::LedgerStore;

use super::AppError;
use super::service::EntityService;

impl<R: Record, S: LedgerStore> EntityService<R, S> {
    /// Route an external invocation: a function name plus ordered string
    /// arguments, as delivered by whatever transport fronts the service.
    ///
    /// Mutations return an empty payload; reads return serialized bytes.
    /// Callers see failures as the error's display string.
    pub fn invoke(&mut self, function: &str, args: &[String]) -> Result<Vec<u8>, AppError> {
        debug!(kind = R::KIND, function, argc = args.len(), "invoking");

        match function {
            "Init" => {
                expect_args(function, args, 0)?;
                self.init()?;
                Ok(Vec::new())
            }
            "Create" => {
                expect_args(function, args, 3)?;
                self.create(&args[0], &args[1], &args[2])?;
                Ok(Vec::new())
            }
            "Read" => {
                expect_args(function, args, 1)?;
                self.read(&args[0])
            }
            "GetAll" => {
                expect_args(function, args, 0)?;
                self.get_all()
            }
            "QueryByOwner" => {
                expect_args(function, args, 1)?;
                self.query_by_owner(&args[0])
            }
            "Update" => {
                expect_args(function, args, 1)?;
                self.update(&args[0])?;
                Ok(Vec::new())
            }
            "Delete" => {
                expect_args(function, args, 1)?;
                self.delete(&args[0])?;
                Ok(Vec::new())
            }
            "GetHistory" => {
                expect_args(function, args, 1)?;
                self.get_history(&args[0])
            }
            "Transfer" => {
                expect_args(function, args, 3)?;
                self.transfer(&args[0], &args[1], &args[2])?;
                Ok(Vec::new())
            }
            _ => Err(AppError::InvalidArgument(format!(
                "unknown function {function:?}"
            ))),
        }
    }
}

fn expect_args(function: &str, args: &[String], expected: usize) -> Result<(), AppError> {
    if args.len() != expected {
        return Err(AppError::InvalidArgument(format!(
            "incorrect number of arguments for {function}: {expected} expected, got {}",
            args.len()
        )));
    }
    Ok(())
}
