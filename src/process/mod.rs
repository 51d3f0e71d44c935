// src/process/mod.rs
pub mod load;
pub mod transform;

pub use load::{load_transactions, Transaction};
pub use transform::{add_reg_year, lowercase_columns, uppercase_text_fields};
