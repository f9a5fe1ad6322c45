pub mod id;

pub use id::generate_withdrawal_id;
