pub mod printer;
pub mod worker;
