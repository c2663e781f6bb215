pub mod init;
pub mod load;
pub mod lookup;
pub mod sparql;
pub mod status;
