pub mod codes;
pub mod shuffle;
