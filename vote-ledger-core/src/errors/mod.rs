mod ledger;
mod request;

pub use ledger::LedgerError;
pub use request::RequestError;
