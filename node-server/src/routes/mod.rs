pub mod amount;
pub mod chain;
pub mod consensus;
pub mod mining;
pub mod transactions;
