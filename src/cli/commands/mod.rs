pub mod blacklist;
pub mod migrate;
pub mod serve;
