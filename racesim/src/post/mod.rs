pub mod race_result;
pub mod score_ledger;
